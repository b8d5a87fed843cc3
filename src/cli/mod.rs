// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
pub mod analyze;
pub mod batch;

use anyhow::{anyhow, Result};
use clap::{Args, Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::analysis::{AcneAnalyzer, AnnotationStyle, Annotator, SeverityThresholds};
use crate::config::ModelConfig;
use crate::vision::AcneDetectionModel;

/// Acne Analyzer CLI
#[derive(Parser, Debug)]
#[command(name = "acne-cli")]
#[command(version)]
#[command(about = "Offline acne severity analysis", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Annotate every image in a folder
    Batch(batch::BatchArgs),

    /// Analyze a single image and print the result as JSON
    Analyze(analyze::AnalyzeArgs),
}

/// Detection model options shared by all commands
#[derive(Args, Debug, Clone)]
pub struct ModelArgs {
    /// Path to the acne detection ONNX model
    #[arg(long = "model", env = "ACNE_MODEL_PATH", default_value = "./models/acne-yolov8.onnx")]
    pub model_path: PathBuf,

    /// TrueType font for labels (system fonts are searched otherwise)
    #[arg(long = "font", env = "LABEL_FONT_PATH")]
    pub font_path: Option<PathBuf>,

    /// Minimum detection confidence
    #[arg(long, env = "CONFIDENCE_THRESHOLD", default_value_t = 0.25)]
    pub confidence: f32,

    /// IoU threshold for non-maximum suppression
    #[arg(long, env = "IOU_THRESHOLD", default_value_t = 0.7)]
    pub iou: f32,

    /// Model input size in pixels
    #[arg(long, env = "MODEL_INPUT_SIZE", default_value_t = 640)]
    pub input_size: u32,

    /// ONNX Runtime intra-op threads
    #[arg(long, env = "MODEL_INTRA_THREADS", default_value_t = 4)]
    pub threads: usize,
}

impl ModelArgs {
    pub fn to_config(&self) -> ModelConfig {
        ModelConfig {
            model_path: self.model_path.clone(),
            input_size: self.input_size,
            confidence_threshold: self.confidence,
            iou_threshold: self.iou,
            intra_threads: self.threads,
            label_font_path: self.font_path.clone(),
        }
    }
}

/// Load the model and build an analyzer writing into `output_dir`
///
/// Unlike the server, a missing model is fatal here.
pub async fn load_analyzer(
    model: &ModelArgs,
    output_dir: &Path,
    style: AnnotationStyle,
) -> Result<AcneAnalyzer> {
    let config = model.to_config();
    config.validate().map_err(|e| anyhow!(e))?;

    let thresholds = SeverityThresholds::from_env();
    thresholds.validate().map_err(|e| anyhow!(e))?;

    let detector = AcneDetectionModel::new(&config.model_path, config.detector_config()).await?;
    let annotator = Annotator::new(output_dir, style, config.label_font_path.as_deref());

    Ok(AcneAnalyzer::new(Arc::new(detector), annotator, thresholds))
}

/// Execute CLI command
pub async fn execute(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Batch(args) => batch::run(args).await,
        Commands::Analyze(args) => analyze::run(args).await,
    }
}
