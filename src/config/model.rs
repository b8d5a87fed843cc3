// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use std::path::PathBuf;

use super::{env_opt, env_or};
use crate::vision::{DetectorConfig, VisionModelConfig};

/// Detection model and rendering settings
#[derive(Debug, Clone)]
pub struct ModelConfig {
    pub model_path: PathBuf,
    pub input_size: u32,
    pub confidence_threshold: f32,
    pub iou_threshold: f32,
    pub intra_threads: usize,
    /// TrueType font for box labels; system fonts are searched when unset
    pub label_font_path: Option<PathBuf>,
}

impl Default for ModelConfig {
    fn default() -> Self {
        let detector = DetectorConfig::default();
        Self {
            model_path: PathBuf::from("./models/acne-yolov8.onnx"),
            input_size: detector.input_size,
            confidence_threshold: detector.confidence_threshold,
            iou_threshold: detector.iou_threshold,
            intra_threads: detector.intra_threads,
            label_font_path: None,
        }
    }
}

impl ModelConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            model_path: env_opt("ACNE_MODEL_PATH")
                .map(PathBuf::from)
                .unwrap_or(defaults.model_path),
            input_size: env_or("MODEL_INPUT_SIZE", defaults.input_size),
            confidence_threshold: env_or("CONFIDENCE_THRESHOLD", defaults.confidence_threshold),
            iou_threshold: env_or("IOU_THRESHOLD", defaults.iou_threshold),
            intra_threads: env_or("MODEL_INTRA_THREADS", defaults.intra_threads),
            label_font_path: env_opt("LABEL_FONT_PATH").map(PathBuf::from),
        }
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.input_size == 0 || self.input_size % 32 != 0 {
            return Err(format!(
                "Model input size must be a positive multiple of 32, got {}",
                self.input_size
            ));
        }
        if !(0.0..1.0).contains(&self.confidence_threshold) {
            return Err(format!(
                "Confidence threshold must be in [0, 1), got {}",
                self.confidence_threshold
            ));
        }
        if !(0.0..=1.0).contains(&self.iou_threshold) {
            return Err(format!(
                "IoU threshold must be in [0, 1], got {}",
                self.iou_threshold
            ));
        }
        if self.intra_threads == 0 {
            return Err("intra_threads must be at least 1".to_string());
        }
        Ok(())
    }

    pub fn detector_config(&self) -> DetectorConfig {
        DetectorConfig {
            input_size: self.input_size,
            confidence_threshold: self.confidence_threshold,
            iou_threshold: self.iou_threshold,
            intra_threads: self.intra_threads,
        }
    }

    pub fn vision_config(&self) -> VisionModelConfig {
        VisionModelConfig {
            acne_model_path: Some(self.model_path.clone()),
            detector: self.detector_config(),
        }
    }
}
