// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Acne analysis API endpoint module
//!
//! Provides POST /analyze_acne/ taking a multipart photo upload.

pub mod handler;
pub mod request;
pub mod response;

pub use handler::analyze_acne_handler;
pub use request::AnalyzeRequest;
pub use response::AnalyzeResponse;
