// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! VisionModelManager tests
//!
//! Verify that the manager:
//! - Comes up empty when the model file is missing
//! - Exposes an injected detector
//! - Lists model availability

use acne_analyzer::vision::{
    AcneDetector, Detection, DetectorConfig, VisionModelConfig, VisionModelManager,
};
use image::DynamicImage;
use std::path::PathBuf;
use std::sync::Arc;

struct NoopDetector;

impl AcneDetector for NoopDetector {
    fn detect(&self, _image: &DynamicImage) -> anyhow::Result<Vec<Detection>> {
        Ok(Vec::new())
    }

    fn name(&self) -> &'static str {
        "noop"
    }
}

#[test]
fn test_default_config_has_expected_path() {
    let config = VisionModelConfig::default();
    let path = config.acne_model_path.unwrap();
    assert!(path.to_string_lossy().contains("acne"));
    assert_eq!(config.detector.input_size, 640);
}

#[tokio::test]
async fn test_missing_model_file_is_not_fatal() {
    let config = VisionModelConfig {
        acne_model_path: Some(PathBuf::from("/nonexistent/models/acne.onnx")),
        detector: DetectorConfig::default(),
    };

    let manager = VisionModelManager::new(config).await.unwrap();
    assert!(!manager.has_detector());

    let models = manager.list_models();
    assert_eq!(models.len(), 1);
    assert_eq!(models[0].model_type, "detection");
    assert!(!models[0].available);
}

#[tokio::test]
async fn test_invalid_model_file_is_not_fatal() {
    let dir = tempfile::tempdir().unwrap();
    let bogus = dir.path().join("acne.onnx");
    std::fs::write(&bogus, b"this is not an onnx graph").unwrap();

    let config = VisionModelConfig {
        acne_model_path: Some(bogus),
        detector: DetectorConfig::default(),
    };
    let manager = VisionModelManager::new(config).await.unwrap();
    assert!(!manager.has_detector());
}

#[test]
fn test_injected_detector_is_shared() {
    let manager = VisionModelManager::with_detector(Arc::new(NoopDetector));
    let a = manager.get_detector().unwrap();
    let b = manager.get_detector().unwrap();
    assert!(Arc::ptr_eq(&a, &b));
    assert_eq!(manager.list_models()[0].name, "noop");
}
