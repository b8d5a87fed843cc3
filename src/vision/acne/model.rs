// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Detection types shared by the detector, classifier and annotator

use serde::{Deserialize, Serialize};
use std::fmt;

/// Classes the acne model was trained on, in model output order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AcneClass {
    Acne,
    Pimple,
}

impl AcneClass {
    /// Number of classes in the model head
    pub const COUNT: usize = 2;

    /// Map a model class index to a class; unknown indices are dropped
    pub fn from_class_id(class_id: usize) -> Option<Self> {
        match class_id {
            0 => Some(AcneClass::Acne),
            1 => Some(AcneClass::Pimple),
            _ => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            AcneClass::Acne => "Acne",
            AcneClass::Pimple => "Pimple",
        }
    }

    /// Box and label color (RGB)
    pub fn color(&self) -> [u8; 3] {
        match self {
            AcneClass::Acne => [0, 255, 0],
            AcneClass::Pimple => [255, 0, 0],
        }
    }
}

impl fmt::Display for AcneClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Axis-aligned box in original image pixels, corners (x1, y1) - (x2, y2)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub x1: u32,
    pub y1: u32,
    pub x2: u32,
    pub y2: u32,
}

impl BoundingBox {
    pub fn new(x1: u32, y1: u32, x2: u32, y2: u32) -> Self {
        Self { x1, y1, x2, y2 }
    }

    pub fn width(&self) -> u32 {
        self.x2.saturating_sub(self.x1)
    }

    pub fn height(&self) -> u32 {
        self.y2.saturating_sub(self.y1)
    }

    /// Pixel area, (x2 - x1) * (y2 - y1)
    pub fn area(&self) -> u64 {
        self.width() as u64 * self.height() as u64
    }
}

/// A located, classified region
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Detection {
    pub class: AcneClass,
    pub bbox: BoundingBox,
    pub confidence: f32,
}

impl Detection {
    pub fn new(class: AcneClass, bbox: BoundingBox, confidence: f32) -> Self {
        Self {
            class,
            bbox,
            confidence,
        }
    }
}
