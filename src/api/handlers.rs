// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::api::http_server::AppState;
use crate::vision::VisionModelInfo;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub model_loaded: bool,
    pub version: String,
    #[serde(default)]
    pub models: Vec<ModelStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub issues: Option<Vec<String>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelStatus {
    pub name: String,
    pub model_type: String,
    pub available: bool,
}

impl From<VisionModelInfo> for ModelStatus {
    fn from(info: VisionModelInfo) -> Self {
        Self {
            name: info.name,
            model_type: info.model_type,
            available: info.available,
        }
    }
}

/// GET /health
pub async fn health_handler(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(state.health_check().await)
}

/// GET /version
pub async fn version_handler() -> Json<serde_json::Value> {
    Json(crate::version::get_version_info())
}
