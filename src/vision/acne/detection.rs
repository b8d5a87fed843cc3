// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Acne/pimple detection on ONNX Runtime
//!
//! Runs a YOLOv8 export with a two-class head. The raw output is a tensor of
//! shape [1, 4 + classes, anchors] (or its transpose) holding (cx, cy, w, h)
//! in letterboxed pixels followed by per-class scores.

use anyhow::{Context, Result};
use image::DynamicImage;
use ndarray::{ArrayViewD, Axis, Ix2};
use ort::execution_providers::CPUExecutionProvider;
use ort::session::builder::GraphOptimizationLevel;
use ort::session::Session;
use ort::value::Value;
use std::path::Path;
use std::sync::{Arc, Mutex};
use tracing::{debug, info};

use super::model::{AcneClass, BoundingBox, Detection};
use super::preprocessing::{preprocess_for_detection, PreprocessInfo, DEFAULT_INPUT_SIZE};

/// Upper bound on detections kept after NMS
pub const MAX_DETECTIONS: usize = 300;

/// Anything that can turn an image into acne detections
#[cfg_attr(test, mockall::automock)]
pub trait AcneDetector: Send + Sync {
    /// Detect acne and pimples, boxes in original image coordinates
    fn detect(&self, image: &DynamicImage) -> Result<Vec<Detection>>;

    /// Detector name for logs and health output
    fn name(&self) -> &'static str;
}

/// Inference parameters for the detection model
#[derive(Debug, Clone)]
pub struct DetectorConfig {
    pub input_size: u32,
    pub confidence_threshold: f32,
    pub iou_threshold: f32,
    pub intra_threads: usize,
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            input_size: DEFAULT_INPUT_SIZE,
            confidence_threshold: 0.25,
            iou_threshold: 0.7,
            intra_threads: 4,
        }
    }
}

/// Raw box before mapping back to the original image
#[derive(Debug, Clone, PartialEq)]
pub struct Candidate {
    pub cx: f32,
    pub cy: f32,
    pub width: f32,
    pub height: f32,
    pub confidence: f32,
    pub class_id: usize,
}

impl Candidate {
    fn corners(&self) -> (f32, f32, f32, f32) {
        (
            self.cx - self.width / 2.0,
            self.cy - self.height / 2.0,
            self.cx + self.width / 2.0,
            self.cy + self.height / 2.0,
        )
    }
}

/// YOLOv8 acne detection model
#[derive(Clone)]
pub struct AcneDetectionModel {
    /// ONNX Runtime session (run needs &mut)
    session: Arc<Mutex<Session>>,
    input_name: String,
    config: DetectorConfig,
}

impl std::fmt::Debug for AcneDetectionModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AcneDetectionModel")
            .field("input_name", &self.input_name)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl AcneDetectionModel {
    /// Load the detection model from an ONNX file
    ///
    /// # Errors
    /// Returns error if the file is missing or ONNX Runtime rejects it.
    pub async fn new<P: AsRef<Path>>(model_path: P, config: DetectorConfig) -> Result<Self> {
        let model_path = model_path.as_ref();

        if !model_path.exists() {
            anyhow::bail!("Acne detection model not found: {}", model_path.display());
        }

        info!("Loading acne detection model from {}", model_path.display());

        let session = Session::builder()
            .context("Failed to create session builder")?
            .with_execution_providers([CPUExecutionProvider::default().build()])
            .context("Failed to set CPU execution provider")?
            .with_optimization_level(GraphOptimizationLevel::Level3)
            .context("Failed to set optimization level")?
            .with_intra_threads(config.intra_threads)
            .context("Failed to set intra threads")?
            .commit_from_file(model_path)
            .context(format!(
                "Failed to load acne detection model from {}",
                model_path.display()
            ))?;

        let input_name = session
            .inputs
            .first()
            .map(|input| input.name.clone())
            .unwrap_or_else(|| "images".to_string());

        debug!(
            "Detection model loaded - input: {}, outputs: {}",
            input_name,
            session.outputs.len()
        );

        info!("✅ Acne detection model loaded (CPU, {}px input)", config.input_size);

        Ok(Self {
            session: Arc::new(Mutex::new(session)),
            input_name,
            config,
        })
    }

    pub fn config(&self) -> &DetectorConfig {
        &self.config
    }
}

impl AcneDetector for AcneDetectionModel {
    fn detect(&self, image: &DynamicImage) -> Result<Vec<Detection>> {
        let (tensor, info) = preprocess_for_detection(image, self.config.input_size);

        let mut session = self
            .session
            .lock()
            .map_err(|_| anyhow::anyhow!("Detection session lock poisoned"))?;

        let input_value = Value::from_array(tensor).context("Failed to create input tensor")?;

        let outputs = session
            .run(ort::inputs![&self.input_name => input_value])
            .context("Acne detection inference failed")?;

        let output = outputs[0]
            .try_extract_array::<f32>()
            .context("Failed to extract output tensor")?;

        debug!("Detection output shape: {:?}", output.shape());

        let candidates = decode_predictions(
            output.view(),
            self.config.confidence_threshold,
            AcneClass::COUNT,
        )?;
        let kept = non_maximum_suppression(candidates, self.config.iou_threshold);
        let detections = to_detections(&kept, &info);

        debug!("Detected {} regions", detections.len());
        Ok(detections)
    }

    fn name(&self) -> &'static str {
        "yolov8-acne"
    }
}

/// Decode the raw YOLOv8 head into scored candidates above the threshold
pub fn decode_predictions(
    output: ArrayViewD<f32>,
    confidence_threshold: f32,
    num_classes: usize,
) -> Result<Vec<Candidate>> {
    let shape = output.shape().to_vec();
    let features = 4 + num_classes;

    if shape.len() != 3 || shape[0] != 1 {
        anyhow::bail!("Unexpected detection output shape: {:?}", shape);
    }

    let batch = output
        .index_axis(Axis(0), 0)
        .into_dimensionality::<Ix2>()
        .context("Detection output is not two-dimensional per batch")?;
    // Normalize to [features, anchors]
    let predictions = if shape[1] == features {
        batch
    } else if shape[2] == features {
        batch.reversed_axes()
    } else {
        anyhow::bail!(
            "Detection output {:?} does not match {} classes",
            shape,
            num_classes
        );
    };

    let mut candidates = Vec::new();

    for column in predictions.axis_iter(Axis(1)) {
        let (class_id, confidence) = column
            .iter()
            .skip(4)
            .copied()
            .enumerate()
            .fold((0, f32::MIN), |best, (id, score)| {
                if score > best.1 {
                    (id, score)
                } else {
                    best
                }
            });

        if confidence > confidence_threshold {
            candidates.push(Candidate {
                cx: column[0],
                cy: column[1],
                width: column[2],
                height: column[3],
                confidence,
                class_id,
            });
        }
    }

    Ok(candidates)
}

/// Class-aware Non-Maximum Suppression
pub fn non_maximum_suppression(mut candidates: Vec<Candidate>, iou_threshold: f32) -> Vec<Candidate> {
    candidates.sort_by(|a, b| {
        b.confidence
            .partial_cmp(&a.confidence)
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    let mut keep: Vec<Candidate> = Vec::new();

    for candidate in candidates {
        if keep.len() >= MAX_DETECTIONS {
            break;
        }
        let suppressed = keep.iter().any(|kept| {
            kept.class_id == candidate.class_id && calculate_iou(kept, &candidate) > iou_threshold
        });
        if !suppressed {
            keep.push(candidate);
        }
    }

    keep
}

/// Intersection over Union between two candidates
pub fn calculate_iou(a: &Candidate, b: &Candidate) -> f32 {
    let (ax1, ay1, ax2, ay2) = a.corners();
    let (bx1, by1, bx2, by2) = b.corners();

    let inter_w = (ax2.min(bx2) - ax1.max(bx1)).max(0.0);
    let inter_h = (ay2.min(by2) - ay1.max(by1)).max(0.0);
    let inter_area = inter_w * inter_h;

    let union_area = a.width * a.height + b.width * b.height - inter_area;
    if union_area <= 0.0 {
        return 0.0;
    }

    inter_area / union_area
}

/// Map candidates to integer boxes in the original image
///
/// Coordinates are truncated toward zero. Unknown classes and boxes that
/// collapse entirely into the letterbox padding are dropped.
pub fn to_detections(candidates: &[Candidate], info: &PreprocessInfo) -> Vec<Detection> {
    candidates
        .iter()
        .filter_map(|c| {
            let class = AcneClass::from_class_id(c.class_id)?;
            let (x1, y1, x2, y2) = c.corners();
            let (x1, y1) = info.map_to_original(x1, y1);
            let (x2, y2) = info.map_to_original(x2, y2);
            let bbox = BoundingBox::new(x1 as u32, y1 as u32, x2 as u32, y2 as u32);

            if bbox.x2 <= bbox.x1 || bbox.y2 <= bbox.y1 {
                return None;
            }

            Some(Detection::new(class, bbox, c.confidence))
        })
        .collect()
}
