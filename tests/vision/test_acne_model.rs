// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! Acne detector tests
//!
//! The decode path is exercised with synthetic YOLO output. Tests that need
//! the real ONNX export are ignored; run them with:
//! `ACNE_MODEL_PATH=/path/to/acne.onnx cargo test -- --ignored`

use acne_analyzer::vision::acne::detection::{
    decode_predictions, non_maximum_suppression, to_detections,
};
use acne_analyzer::vision::acne::preprocessing::preprocess_for_detection;
use acne_analyzer::vision::{AcneClass, AcneDetectionModel, AcneDetector, DetectorConfig};
use image::{DynamicImage, Rgb, RgbImage};
use ndarray::Array3;

fn model_path() -> String {
    std::env::var("ACNE_MODEL_PATH").unwrap_or_else(|_| "./models/acne-yolov8.onnx".to_string())
}

/// Synthetic head with `anchors` columns laid out as [1, 6, anchors]
fn synthetic_head(columns: &[[f32; 6]]) -> Array3<f32> {
    let mut head = Array3::<f32>::zeros((1, 6, columns.len()));
    for (i, column) in columns.iter().enumerate() {
        for (f, v) in column.iter().enumerate() {
            head[[0, f, i]] = *v;
        }
    }
    head
}

#[test]
fn test_decode_nms_and_mapping_for_portrait_photo() {
    // 480x960 portrait letterboxed into 640: scale 2/3, offset_x 160
    let image = DynamicImage::ImageRgb8(RgbImage::from_pixel(480, 960, Rgb([200, 160, 140])));
    let (tensor, info) = preprocess_for_detection(&image, 640);
    assert_eq!(tensor.shape(), &[1, 3, 640, 640]);
    assert_eq!(info.offset_x, 160);

    let head = synthetic_head(&[
        // Strong acne at letterbox (320, 320), 30px
        [320.0, 320.0, 30.0, 30.0, 0.92, 0.05],
        // Overlapping weaker duplicate, suppressed
        [322.0, 321.0, 30.0, 30.0, 0.80, 0.10],
        // Pimple elsewhere
        [200.0, 500.0, 15.0, 15.0, 0.05, 0.66],
        // Below threshold
        [100.0, 100.0, 10.0, 10.0, 0.10, 0.12],
    ]);

    let candidates = decode_predictions(head.view().into_dyn(), 0.25, 2).unwrap();
    assert_eq!(candidates.len(), 3);

    let kept = non_maximum_suppression(candidates, 0.7);
    assert_eq!(kept.len(), 2);

    let detections = to_detections(&kept, &info);
    assert_eq!(detections.len(), 2);

    let acne = detections.iter().find(|d| d.class == AcneClass::Acne).unwrap();
    // (305 - 160) * 1.5 = 217.5, (335 - 160) * 1.5 = 262.5
    assert_eq!(acne.bbox.x1, 217);
    assert_eq!(acne.bbox.x2, 262);
    assert_eq!(acne.bbox.y1, 457);
    assert_eq!(acne.bbox.y2, 502);

    let pimple = detections.iter().find(|d| d.class == AcneClass::Pimple).unwrap();
    assert!(pimple.bbox.x2 <= 480 && pimple.bbox.y2 <= 960);
}

#[tokio::test]
#[ignore] // Requires the acne ONNX export
async fn test_real_model_on_blank_image() {
    let model = AcneDetectionModel::new(model_path(), DetectorConfig::default())
        .await
        .expect("Failed to load acne model");

    let image = DynamicImage::ImageRgb8(RgbImage::from_pixel(640, 480, Rgb([230, 190, 170])));
    let detections = model.detect(&image).expect("Detection failed");

    for det in &detections {
        assert!(det.bbox.x2 <= 640 && det.bbox.y2 <= 480);
        assert!(det.confidence > 0.25);
    }
}

#[tokio::test]
#[ignore] // Requires the acne ONNX export
async fn test_real_model_is_reentrant() {
    let model = std::sync::Arc::new(
        AcneDetectionModel::new(model_path(), DetectorConfig::default())
            .await
            .expect("Failed to load acne model"),
    );

    let mut handles = Vec::new();
    for _ in 0..4 {
        let model = model.clone();
        handles.push(tokio::task::spawn_blocking(move || {
            let image = DynamicImage::new_rgb8(320, 320);
            model.detect(&image).map(|d| d.len())
        }));
    }
    for handle in handles {
        assert!(handle.await.unwrap().is_ok());
    }
}
