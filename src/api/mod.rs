// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
pub mod analyze;
pub mod errors;
pub mod handlers;
pub mod http_server;

pub use analyze::{analyze_acne_handler, AnalyzeRequest, AnalyzeResponse};
pub use errors::{ApiError, ErrorResponse};
pub use handlers::{health_handler, version_handler, HealthResponse, ModelStatus};
pub use http_server::{create_router, start_server, AppState};
