// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! End-to-end analysis with a fixed detector

use acne_analyzer::analysis::{
    summarize, AcneAnalyzer, AnnotationStyle, Annotator, SeverityCategory, SeverityThresholds,
};
use acne_analyzer::vision::{AcneClass, AcneDetector, BoundingBox, Detection};
use image::{DynamicImage, Rgb, RgbImage};
use std::sync::Arc;

struct FixedDetector(Vec<Detection>);

impl AcneDetector for FixedDetector {
    fn detect(&self, _image: &DynamicImage) -> anyhow::Result<Vec<Detection>> {
        Ok(self.0.clone())
    }

    fn name(&self) -> &'static str {
        "fixed"
    }
}

fn skin(width: u32, height: u32) -> DynamicImage {
    DynamicImage::ImageRgb8(RgbImage::from_pixel(width, height, Rgb([224, 172, 150])))
}

fn grid(class: AcneClass, count: u32, size: u32) -> Vec<Detection> {
    (0..count)
        .map(|i| {
            let x = (i % 10) * (size + 2);
            let y = (i / 10) * (size + 2);
            Detection::new(class, BoundingBox::new(x, y, x + size, y + size), 0.8)
        })
        .collect()
}

#[test]
fn test_summary_counts_pimples_in_area_only() {
    let mut detections = grid(AcneClass::Acne, 4, 10);
    detections.extend(grid(AcneClass::Pimple, 20, 10));

    let summary = summarize(&detections);
    assert_eq!(summary.acne_count, 4);
    assert_eq!(summary.pimple_count, 20);
    assert_eq!(summary.total_area, 24 * 100);
}

#[test]
fn test_pipeline_grades_and_writes_output() {
    let dir = tempfile::tempdir().unwrap();
    // 20 acne boxes of 20x20: 8000 px
    let analyzer = AcneAnalyzer::new(
        Arc::new(FixedDetector(grid(AcneClass::Acne, 20, 20))),
        Annotator::without_font(dir.path(), AnnotationStyle::default()),
        SeverityThresholds::default(),
    );

    let result = analyzer.analyze(&skin(400, 300), "patient_1.jpg").unwrap();
    assert_eq!(result.acne_count, 20);
    assert_eq!(result.total_area, 8000);
    assert_eq!(result.severity, SeverityCategory::Severe);
    assert_eq!(result.annotated_image_path, dir.path().join("patient_1.jpg"));

    let written = image::open(&result.annotated_image_path).unwrap();
    assert_eq!((written.width(), written.height()), (400, 300));
}

#[test]
fn test_pipeline_many_small_spots_stay_moderate() {
    let dir = tempfile::tempdir().unwrap();
    // 20 boxes of 5x5: 500 px, below the area threshold
    let analyzer = AcneAnalyzer::new(
        Arc::new(FixedDetector(grid(AcneClass::Acne, 20, 5))),
        Annotator::without_font(dir.path(), AnnotationStyle::batch()),
        SeverityThresholds::default(),
    );

    let result = analyzer.analyze(&skin(200, 200), "small.png").unwrap();
    assert_eq!(result.severity, SeverityCategory::Moderate);
    assert!(dir.path().join("small.png").exists());
}

#[test]
fn test_custom_thresholds_flow_through() {
    let dir = tempfile::tempdir().unwrap();
    let thresholds = SeverityThresholds {
        mild_max: 1,
        moderate_max: 2,
        severe_area: 50,
    };
    let analyzer = AcneAnalyzer::new(
        Arc::new(FixedDetector(grid(AcneClass::Acne, 2, 10))),
        Annotator::without_font(dir.path(), AnnotationStyle::default()),
        thresholds,
    );

    let result = analyzer.analyze(&skin(100, 100), "custom.jpg").unwrap();
    assert_eq!(result.severity, SeverityCategory::Severe);
}

#[test]
fn test_annotation_marks_box_edges() {
    let annotator = Annotator::without_font("unused", AnnotationStyle::default());
    let detections = vec![
        Detection::new(AcneClass::Acne, BoundingBox::new(10, 10, 40, 40), 0.9),
        Detection::new(AcneClass::Pimple, BoundingBox::new(60, 10, 90, 40), 0.9),
    ];

    let canvas = annotator.draw(&skin(100, 60), &detections, Some(SeverityCategory::Mild));
    assert_eq!(canvas.get_pixel(10, 25), &Rgb([0, 255, 0]));
    assert_eq!(canvas.get_pixel(75, 40), &Rgb([255, 0, 0]));
    assert_eq!(canvas.get_pixel(25, 25), &Rgb([224, 172, 150]));
}
