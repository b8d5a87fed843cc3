// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use anyhow::{Context, Result};
use axum::extract::DefaultBodyLimit;
use axum::http::HeaderValue;
use axum::routing::{get, post};
use axum::Router;
use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;
use tokio::sync::RwLock;
use tower_http::cors::{AllowHeaders, AllowMethods, AllowOrigin, CorsLayer};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use super::analyze::analyze_acne_handler;
use super::handlers::{health_handler, version_handler, HealthResponse};
use crate::analysis::{AnnotationStyle, Annotator, SeverityThresholds};
use crate::config::ServerConfig;
use crate::treatments::TreatmentCatalog;
use crate::vision::VisionModelManager;

/// Room for multipart boundaries and the text fields on top of the file
pub const MULTIPART_OVERHEAD: usize = 64 * 1024;

/// Shared state for every request
#[derive(Clone)]
pub struct AppState {
    pub vision_model_manager: Arc<RwLock<Option<Arc<VisionModelManager>>>>,
    pub treatments: Arc<TreatmentCatalog>,
    pub annotator: Annotator,
    pub thresholds: SeverityThresholds,
    pub config: Arc<ServerConfig>,
}

impl AppState {
    pub fn new(
        config: ServerConfig,
        annotator: Annotator,
        treatments: TreatmentCatalog,
        thresholds: SeverityThresholds,
    ) -> Self {
        Self {
            vision_model_manager: Arc::new(RwLock::new(None)),
            treatments: Arc::new(treatments),
            annotator,
            thresholds,
            config: Arc::new(config),
        }
    }

    /// State writing into `results_dir` with built-in treatments and no model
    pub fn new_for_test(results_dir: &Path) -> Self {
        let config = ServerConfig {
            results_dir: results_dir.to_path_buf(),
            ..ServerConfig::default()
        };
        let annotator = Annotator::without_font(results_dir, AnnotationStyle::default());
        Self::new(
            config,
            annotator,
            TreatmentCatalog::builtin(),
            SeverityThresholds::default(),
        )
    }

    pub async fn set_vision_model_manager(&self, manager: Arc<VisionModelManager>) {
        *self.vision_model_manager.write().await = Some(manager);
    }

    pub async fn get_vision_model_manager(&self) -> Option<Arc<VisionModelManager>> {
        self.vision_model_manager.read().await.clone()
    }

    pub async fn health_check(&self) -> HealthResponse {
        let mut issues = Vec::new();

        let manager = self.get_vision_model_manager().await;
        let model_loaded = manager.as_ref().map(|m| m.has_detector()).unwrap_or(false);
        if !model_loaded {
            issues.push("Acne detection model not loaded".to_string());
        }

        if !self.annotator.has_font() {
            issues.push("No label font available, annotations show boxes only".to_string());
        }

        let status = if model_loaded && issues.is_empty() {
            "healthy"
        } else if model_loaded {
            "degraded"
        } else {
            "unhealthy"
        };

        HealthResponse {
            status: status.to_string(),
            model_loaded,
            version: crate::version::VERSION_NUMBER.to_string(),
            models: manager
                .map(|m| m.list_models().into_iter().map(Into::into).collect())
                .unwrap_or_default(),
            issues: if issues.is_empty() { None } else { Some(issues) },
        }
    }
}

/// Build the application router
pub fn create_router(state: AppState) -> Router {
    let body_limit = state.config.max_upload_bytes.saturating_add(MULTIPART_OVERHEAD);
    let cors = cors_layer(&state.config.cors_allowed_origins);
    let processed = ServeDir::new(&state.config.results_dir);

    Router::new()
        .route("/health", get(health_handler))
        .route("/version", get(version_handler))
        .route("/analyze_acne/", post(analyze_acne_handler))
        .route("/analyze_acne", post(analyze_acne_handler))
        .nest_service("/processed", processed)
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

/// CORS for the configured origins with credentials
///
/// Credentials rule out wildcards, so methods and headers mirror the
/// preflight request and a `*` origin mirrors the request origin.
pub fn cors_layer(origins: &[String]) -> CorsLayer {
    let allow_origin = if origins.iter().any(|o| o == "*") {
        AllowOrigin::mirror_request()
    } else {
        let values: Vec<HeaderValue> = origins
            .iter()
            .filter_map(|origin| match HeaderValue::from_str(origin) {
                Ok(value) => Some(value),
                Err(_) => {
                    warn!("Ignoring invalid CORS origin: {}", origin);
                    None
                }
            })
            .collect();
        AllowOrigin::list(values)
    };

    CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_credentials(true)
        .allow_methods(AllowMethods::mirror_request())
        .allow_headers(AllowHeaders::mirror_request())
}

/// Serve until ctrl-c
pub async fn start_server(state: AppState) -> Result<()> {
    let addr: SocketAddr = state
        .config
        .listen_addr
        .parse()
        .with_context(|| format!("Invalid listen address {}", state.config.listen_addr))?;

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;

    info!("API server listening on {}", listener.local_addr()?);

    let app = create_router(state);
    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            if tokio::signal::ctrl_c().await.is_ok() {
                info!("Shutdown signal received");
            }
        })
        .await
        .context("HTTP server error")?;

    Ok(())
}
