// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Severity classification from detection counts and area

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::config::env_or;

/// Overall acne severity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SeverityCategory {
    Mild,
    Moderate,
    Severe,
}

impl SeverityCategory {
    pub const ALL: [SeverityCategory; 3] = [
        SeverityCategory::Mild,
        SeverityCategory::Moderate,
        SeverityCategory::Severe,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SeverityCategory::Mild => "Mild",
            SeverityCategory::Moderate => "Moderate",
            SeverityCategory::Severe => "Severe",
        }
    }
}

impl fmt::Display for SeverityCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SeverityCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "mild" => Ok(SeverityCategory::Mild),
            "moderate" => Ok(SeverityCategory::Moderate),
            "severe" => Ok(SeverityCategory::Severe),
            other => Err(format!("unknown severity '{}'", other)),
        }
    }
}

/// Count and area cut-offs for classification
///
/// Area is in raw pixels of the uploaded image and is not normalized by
/// image size.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeverityThresholds {
    /// Fewer acne spots than this is Mild
    pub mild_max: u32,
    /// Fewer acne spots than this (and not Mild) is Moderate
    pub moderate_max: u32,
    /// Total area above this (with enough spots) is Severe
    pub severe_area: u64,
}

impl Default for SeverityThresholds {
    fn default() -> Self {
        Self {
            mild_max: 5,
            moderate_max: 15,
            severe_area: 5000,
        }
    }
}

impl SeverityThresholds {
    /// Load thresholds from environment variables, falling back to defaults
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            mild_max: env_or("SEVERITY_MILD_MAX", defaults.mild_max),
            moderate_max: env_or("SEVERITY_MODERATE_MAX", defaults.moderate_max),
            severe_area: env_or("SEVERITY_AREA", defaults.severe_area),
        }
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.mild_max > self.moderate_max {
            return Err(format!(
                "mild_max ({}) must not exceed moderate_max ({})",
                self.mild_max, self.moderate_max
            ));
        }
        Ok(())
    }
}

/// Classify severity
///
/// Mild below `mild_max` acne spots, Moderate below `moderate_max`; above
/// that, Severe only if the total area also exceeds `severe_area`, otherwise
/// Moderate.
pub fn classify_severity(
    acne_count: u32,
    total_area: u64,
    thresholds: &SeverityThresholds,
) -> SeverityCategory {
    if acne_count < thresholds.mild_max {
        SeverityCategory::Mild
    } else if acne_count < thresholds.moderate_max {
        SeverityCategory::Moderate
    } else if total_area > thresholds.severe_area {
        SeverityCategory::Severe
    } else {
        SeverityCategory::Moderate
    }
}
