// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Acne analysis response types

use serde::{Deserialize, Serialize};

use crate::analysis::SeverityCategory;

/// Response from POST /analyze_acne/
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalyzeResponse {
    pub name: String,
    pub age: u32,
    pub user_id: String,
    /// Number of Acne detections
    pub acne_spots: u32,
    /// Number of Pimple detections
    pub pimple_spots: u32,
    /// Summed box area of all detections, in pixels
    pub total_acne_area: u64,
    pub severity: SeverityCategory,
    /// Public URL of the annotated image
    pub processed_image: String,
    /// Up to three recommendations for the severity
    pub treatments: Vec<String>,
}
