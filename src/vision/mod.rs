// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Vision processing module for CPU-based acne detection
//!
//! This module provides:
//! - Upload decoding and format sniffing
//! - The YOLOv8 acne detector
//! - A model manager that owns the loaded detector

pub mod acne;
pub mod image_utils;
pub mod model_manager;

pub use acne::{AcneClass, AcneDetectionModel, AcneDetector, BoundingBox, Detection, DetectorConfig};
pub use image_utils::{decode_image_bytes, detect_format, ImageError, ImageInfo};
pub use model_manager::{VisionModelConfig, VisionModelInfo, VisionModelManager};
