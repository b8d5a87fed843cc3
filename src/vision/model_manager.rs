// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Vision model manager for loading and sharing the acne detector

use std::path::PathBuf;
use std::sync::Arc;

use crate::vision::acne::{AcneDetectionModel, AcneDetector, DetectorConfig};

/// Configuration for loading vision models
#[derive(Debug, Clone)]
pub struct VisionModelConfig {
    /// Path to the acne detection ONNX file (optional)
    pub acne_model_path: Option<PathBuf>,
    /// Inference parameters
    pub detector: DetectorConfig,
}

impl Default for VisionModelConfig {
    fn default() -> Self {
        Self {
            acne_model_path: Some(PathBuf::from("./models/acne-yolov8.onnx")),
            detector: DetectorConfig::default(),
        }
    }
}

/// Information about a loaded vision model
#[derive(Debug, Clone, serde::Serialize)]
pub struct VisionModelInfo {
    /// Model name
    pub name: String,
    /// Model type
    pub model_type: String,
    /// Whether the model is available
    pub available: bool,
}

/// Owns the detector shared by every request
///
/// A missing or broken model file is not fatal: the manager comes up empty
/// and callers report the service as unavailable.
pub struct VisionModelManager {
    detector: Option<Arc<dyn AcneDetector>>,
}

impl VisionModelManager {
    /// Create a new VisionModelManager with the given configuration
    pub async fn new(config: VisionModelConfig) -> anyhow::Result<Self> {
        let detector: Option<Arc<dyn AcneDetector>> = if let Some(ref path) = config.acne_model_path {
            match AcneDetectionModel::new(path, config.detector.clone()).await {
                Ok(model) => {
                    tracing::info!("✅ Acne detection model loaded from {}", path.display());
                    Some(Arc::new(model))
                }
                Err(e) => {
                    tracing::warn!(
                        "⚠️ Failed to load acne detection model from {}: {:#}",
                        path.display(),
                        e
                    );
                    None
                }
            }
        } else {
            None
        };

        Ok(Self { detector })
    }

    /// Wrap an already constructed detector
    pub fn with_detector(detector: Arc<dyn AcneDetector>) -> Self {
        Self {
            detector: Some(detector),
        }
    }

    /// Manager with no model loaded
    pub fn empty() -> Self {
        Self { detector: None }
    }

    /// Get the detector if available
    pub fn get_detector(&self) -> Option<Arc<dyn AcneDetector>> {
        self.detector.clone()
    }

    /// Check if detection is available
    pub fn has_detector(&self) -> bool {
        self.detector.is_some()
    }

    /// List all vision models and their availability
    pub fn list_models(&self) -> Vec<VisionModelInfo> {
        vec![VisionModelInfo {
            name: self
                .detector
                .as_ref()
                .map(|d| d.name().to_string())
                .unwrap_or_else(|| "yolov8-acne".to_string()),
            model_type: "detection".to_string(),
            available: self.detector.is_some(),
        }]
    }
}
