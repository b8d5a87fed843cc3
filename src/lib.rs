// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
pub mod analysis;
pub mod api;
pub mod cli;
pub mod config;
pub mod treatments;
pub mod version;
pub mod vision;

pub use analysis::{AcneAnalyzer, AnalysisResult, SeverityCategory, SeverityThresholds};
pub use treatments::TreatmentCatalog;
pub use vision::{AcneClass, AcneDetector, BoundingBox, Detection};
