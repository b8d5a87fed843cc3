// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use anyhow::{Context, Result};
use clap::Args;
use serde::Serialize;
use std::path::PathBuf;

use super::{load_analyzer, ModelArgs};
use crate::analysis::{sanitize_file_stem, AnalysisResult, AnnotationStyle};
use crate::treatments::TreatmentCatalog;
use crate::vision::decode_image_bytes;

/// Arguments for the analyze command
#[derive(Args, Debug)]
pub struct AnalyzeArgs {
    /// Image to analyze
    pub image: PathBuf,

    /// Folder for the annotated copy
    #[arg(long, default_value = "results")]
    pub output: PathBuf,

    /// Treatment catalog TOML (built-in catalog otherwise)
    #[arg(long, env = "TREATMENTS_FILE")]
    pub treatments: Option<PathBuf>,

    /// Draw confidences and a severity banner
    #[arg(long)]
    pub verbose_labels: bool,

    #[command(flatten)]
    pub model: ModelArgs,
}

#[derive(Debug, Serialize)]
pub struct AnalyzeOutput {
    #[serde(flatten)]
    pub result: AnalysisResult,
    pub treatments: Vec<String>,
}

/// Entry point for `acne-cli analyze`
pub async fn run(args: AnalyzeArgs) -> Result<()> {
    let catalog = match &args.treatments {
        Some(path) => TreatmentCatalog::from_file(path)?,
        None => TreatmentCatalog::builtin(),
    };

    let bytes = tokio::fs::read(&args.image)
        .await
        .with_context(|| format!("Failed to read {}", args.image.display()))?;
    let (image, _) = decode_image_bytes(&bytes, bytes.len())
        .with_context(|| format!("Failed to decode {}", args.image.display()))?;

    let style = if args.verbose_labels {
        AnnotationStyle::batch()
    } else {
        AnnotationStyle::default()
    };
    let analyzer = load_analyzer(&args.model, &args.output, style).await?;

    let stem = args
        .image
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let output_name = format!("{}_annotated.jpg", sanitize_file_stem(&stem));

    let result = tokio::task::spawn_blocking(move || analyzer.analyze(&image, &output_name))
        .await
        .context("Analysis task panicked")??;

    let output = AnalyzeOutput {
        treatments: catalog.recommend(result.severity),
        result,
    };
    println!("{}", serde_json::to_string_pretty(&output)?);

    Ok(())
}
