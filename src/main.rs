// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use acne_analyzer::{
    analysis::{AnnotationStyle, Annotator, SeverityThresholds},
    api::{start_server, AppState},
    config::{ModelConfig, ServerConfig},
    treatments::TreatmentCatalog,
    vision::VisionModelManager,
};
use anyhow::{anyhow, Context, Result};
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();

    // Initialize tracing subscriber for logging
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    println!("🚀 Starting Acne Analyzer...\n");
    println!("📦 BUILD VERSION: {}", acne_analyzer::version::VERSION);
    println!("📅 Build Date: {}", acne_analyzer::version::BUILD_DATE);
    println!();
    info!("{}", acne_analyzer::version::get_version_string());

    let server_config = ServerConfig::from_env();
    server_config.validate().map_err(|e| anyhow!(e))?;

    let model_config = ModelConfig::from_env();
    model_config.validate().map_err(|e| anyhow!(e))?;

    let thresholds = SeverityThresholds::from_env();
    thresholds.validate().map_err(|e| anyhow!(e))?;

    tokio::fs::create_dir_all(&server_config.results_dir)
        .await
        .with_context(|| {
            format!(
                "Failed to create results directory {}",
                server_config.results_dir.display()
            )
        })?;

    let treatments = match &server_config.treatments_file {
        Some(path) => {
            let catalog = TreatmentCatalog::from_file(path)?;
            info!("Loaded treatment catalog from {}", path.display());
            catalog
        }
        None => TreatmentCatalog::builtin(),
    };

    let annotator = Annotator::new(
        &server_config.results_dir,
        AnnotationStyle::default(),
        model_config.label_font_path.as_deref(),
    );

    // Model load failure is logged; requests get 503 until a model is present
    println!("🧠 Loading acne detection model...");
    let manager = VisionModelManager::new(model_config.vision_config()).await?;
    if manager.has_detector() {
        println!("✅ Acne detection model ready");
    } else {
        warn!(
            "Serving without a detection model ({}), /analyze_acne/ will return 503",
            model_config.model_path.display()
        );
    }

    let state = AppState::new(server_config, annotator, treatments, thresholds);
    state.set_vision_model_manager(Arc::new(manager)).await;

    println!("🌐 Listening on {}", state.config.listen_addr);
    start_server(state).await?;

    println!("👋 Shut down cleanly");
    Ok(())
}
