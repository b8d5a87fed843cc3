// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Acne detection on ONNX Runtime
//!
//! Components:
//! - `model` - Detection, bounding box and class types
//! - `preprocessing` - Letterbox resize into the model input
//! - `detection` - Session wrapper, YOLO output decoding and NMS

pub mod detection;
pub mod model;
pub mod preprocessing;

pub use detection::{AcneDetectionModel, AcneDetector, DetectorConfig};
pub use model::{AcneClass, BoundingBox, Detection};
pub use preprocessing::{PreprocessInfo, DEFAULT_INPUT_SIZE};
