// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Detection summary, severity grading and annotation for one image

pub mod annotate;
pub mod severity;

pub use annotate::{
    load_label_font, sanitize_file_stem, unique_output_name, AnnotationStyle, Annotator,
};
pub use severity::{classify_severity, SeverityCategory, SeverityThresholds};

use anyhow::Result;
use image::DynamicImage;
use serde::Serialize;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;
use tracing::info;

use crate::vision::acne::{AcneClass, AcneDetector, Detection};

/// Counts and area over a set of detections
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DetectionSummary {
    pub acne_count: u32,
    pub pimple_count: u32,
    /// Sum of box areas over every detection, both classes
    pub total_area: u64,
}

/// Tally detections by class and sum their areas
pub fn summarize(detections: &[Detection]) -> DetectionSummary {
    detections
        .iter()
        .fold(DetectionSummary::default(), |mut summary, det| {
            summary.total_area += det.bbox.area();
            match det.class {
                AcneClass::Acne => summary.acne_count += 1,
                AcneClass::Pimple => summary.pimple_count += 1,
            }
            summary
        })
}

/// Outcome of analyzing one image
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisResult {
    pub acne_count: u32,
    pub pimple_count: u32,
    pub total_area: u64,
    pub severity: SeverityCategory,
    /// Where the annotated copy was written
    pub annotated_image_path: PathBuf,
    pub detections: Vec<Detection>,
    pub processing_time_ms: u64,
}

/// Runs detection, grading and annotation over a single image
#[derive(Clone)]
pub struct AcneAnalyzer {
    detector: Arc<dyn AcneDetector>,
    annotator: Annotator,
    thresholds: SeverityThresholds,
}

impl AcneAnalyzer {
    pub fn new(
        detector: Arc<dyn AcneDetector>,
        annotator: Annotator,
        thresholds: SeverityThresholds,
    ) -> Self {
        Self {
            detector,
            annotator,
            thresholds,
        }
    }

    pub fn annotator(&self) -> &Annotator {
        &self.annotator
    }

    pub fn thresholds(&self) -> &SeverityThresholds {
        &self.thresholds
    }

    /// Analyze `image` and write the annotated copy as `output_name`
    ///
    /// Blocking; run it off the async runtime.
    pub fn analyze(&self, image: &DynamicImage, output_name: &str) -> Result<AnalysisResult> {
        let start = Instant::now();

        let detections = self.detector.detect(image)?;
        let summary = summarize(&detections);
        let severity = classify_severity(summary.acne_count, summary.total_area, &self.thresholds);

        let annotated_image_path =
            self.annotator
                .annotate_to_file(image, &detections, Some(severity), output_name)?;

        let processing_time_ms = start.elapsed().as_millis() as u64;
        info!(
            "Analysis complete: {} acne, {} pimples, area {}, severity {} ({}ms, {})",
            summary.acne_count,
            summary.pimple_count,
            summary.total_area,
            severity,
            processing_time_ms,
            self.detector.name()
        );

        Ok(AnalysisResult {
            acne_count: summary.acne_count,
            pimple_count: summary.pimple_count,
            total_area: summary.total_area,
            severity,
            annotated_image_path,
            detections,
            processing_time_ms,
        })
    }
}
