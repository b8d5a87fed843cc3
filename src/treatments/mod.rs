// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Treatment advice per severity category
//!
//! The catalog is fixed at startup: either the built-in lists or a TOML file
//! with one string array per category:
//!
//! ```toml
//! mild = ["Use a gentle cleanser", "..."]
//! moderate = ["..."]
//! severe = ["..."]
//! ```

use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

use crate::analysis::SeverityCategory;

/// Number of recommendations returned per request
pub const RECOMMENDATION_COUNT: usize = 3;

#[derive(Debug, Error)]
pub enum TreatmentError {
    #[error("Failed to read treatment catalog {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid treatment catalog: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Treatment catalog has no entries for {0}")]
    EmptyCategory(SeverityCategory),
}

/// Advice strings for each severity category
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TreatmentCatalog {
    #[serde(alias = "Mild")]
    mild: Vec<String>,
    #[serde(alias = "Moderate")]
    moderate: Vec<String>,
    #[serde(alias = "Severe")]
    severe: Vec<String>,
}

impl Default for TreatmentCatalog {
    fn default() -> Self {
        Self::builtin()
    }
}

impl TreatmentCatalog {
    /// The catalog shipped with the service
    pub fn builtin() -> Self {
        Self {
            mild: to_strings(&[
                "Use a gentle cleanser with salicylic acid",
                "Apply a non-comedogenic moisturizer",
                "Avoid touching your face frequently",
                "Use sunscreen with SPF 30+",
                "Salicylic Acid Cleanser: A gentle cleanser that helps unclog pores and reduce acne breakouts. Use twice daily, morning and night. Apply to wet skin, massage gently, and rinse thoroughly.",
                "Apply ice to inflamed pimples to reduce swelling",
                "Use tea tree oil as a natural spot treatment (diluted)",
                "Keep pillowcases and phone screens clean",
                "Avoid heavy makeup or use non-comedogenic products",
            ]),
            moderate: to_strings(&[
                "Use a benzoyl peroxide or salicylic acid cleanser",
                "Apply topical retinoids",
                "Consider a mild chemical exfoliant (AHA/BHA)",
                "Hydrate with an oil-free moisturizer",
                "Benzoyl Peroxide Gel: A topical treatment that kills acne-causing bacteria and reduces inflammation. Apply a thin layer to affected areas once daily. Increase usage gradually if needed.",
                "Niacinamide Serum: A soothing serum that reduces redness, controls oil production, and improves skin texture. Apply a few drops to clean skin before moisturizing, twice daily.",
                "Azelaic Acid Cream: Helps reduce swelling and kills bacteria. Use twice daily after cleansing and before moisturizing.",
                "Use hydrocolloid patches on active pimples to absorb oil and protect from picking",
                "Introduce gentle exfoliation 1-2 times a week to prevent buildup of dead skin",
            ]),
            severe: to_strings(&[
                "Consult a dermatologist for prescription treatments",
                "Consider oral antibiotics or isotretinoin",
                "Use medical-grade acne treatments",
                "Follow a strict skincare routine with dermatologist-approved products",
                "Retinol Cream: A vitamin A derivative that promotes skin renewal and prevents clogged pores. Use at night, apply a small amount to dry skin after cleansing. Use sunscreen during the day.",
                "Clay Mask: A detoxifying mask that absorbs excess oil and unclogs pores. Apply a thin layer to clean skin, leave for 10-15 minutes, and rinse off. Use 1-2 times per week.",
                "Oral Isotretinoin (Accutane): A potent prescription drug for severe cystic acne, must be taken under close medical supervision due to potential side effects.",
                "Spironolactone: A hormonal treatment option for women with acne caused by hormonal imbalances.",
                "Use a gentle foaming cleanser to avoid over-drying skin",
                "Avoid picking or popping deep cysts as it can cause scarring",
            ]),
        }
    }

    /// Parse a catalog from TOML; every category needs at least one entry
    pub fn from_toml_str(content: &str) -> Result<Self, TreatmentError> {
        let catalog: TreatmentCatalog = toml::from_str(content)?;
        catalog.validate()?;
        Ok(catalog)
    }

    /// Load a catalog from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, TreatmentError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| TreatmentError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml_str(&content)
    }

    pub fn validate(&self) -> Result<(), TreatmentError> {
        for severity in SeverityCategory::ALL {
            if self.get(severity).is_empty() {
                return Err(TreatmentError::EmptyCategory(severity));
            }
        }
        Ok(())
    }

    /// Full advice list for a category
    pub fn get(&self, severity: SeverityCategory) -> &[String] {
        match severity {
            SeverityCategory::Mild => &self.mild,
            SeverityCategory::Moderate => &self.moderate,
            SeverityCategory::Severe => &self.severe,
        }
    }

    /// Sample up to three distinct entries for `severity` using `rng`
    pub fn select<R: Rng + ?Sized>(&self, severity: SeverityCategory, rng: &mut R) -> Vec<String> {
        let options = self.get(severity);
        options
            .choose_multiple(rng, RECOMMENDATION_COUNT.min(options.len()))
            .cloned()
            .collect()
    }

    /// Sample recommendations with the thread-local RNG
    pub fn recommend(&self, severity: SeverityCategory) -> Vec<String> {
        self.select(severity, &mut rand::thread_rng())
    }
}

fn to_strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}
