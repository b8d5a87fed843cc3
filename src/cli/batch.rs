// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Folder-at-a-time annotation

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use clap::Args;
use indicatif::{ProgressBar, ProgressStyle};
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use walkdir::WalkDir;

use super::{load_analyzer, ModelArgs};
use crate::analysis::{AcneAnalyzer, AnnotationStyle, SeverityCategory};
use crate::vision::image_utils::has_image_extension;

/// Arguments for the batch command
#[derive(Args, Debug)]
pub struct BatchArgs {
    /// Folder of input images (not searched recursively)
    #[arg(long, default_value = "test_images")]
    pub input: PathBuf,

    /// Folder for annotated copies, written under the same file names
    #[arg(long, default_value = "results")]
    pub output: PathBuf,

    /// Print a JSON report instead of per-image lines
    #[arg(long)]
    pub json: bool,

    #[command(flatten)]
    pub model: ModelArgs,
}

/// Outcome for one input image
#[derive(Debug, Clone, Serialize)]
pub struct BatchItem {
    pub file: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub severity: Option<SeverityCategory>,
    pub acne_count: u32,
    pub pimple_count: u32,
    pub total_area: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct BatchReport {
    pub generated_at: DateTime<Utc>,
    pub input_dir: PathBuf,
    pub output_dir: PathBuf,
    pub processed: usize,
    pub failed: usize,
    /// Images per severity category
    pub severity_totals: BTreeMap<String, usize>,
    pub items: Vec<BatchItem>,
}

impl BatchItem {
    pub fn summary_line(&self) -> String {
        match (&self.severity, &self.error) {
            (Some(severity), _) => format!(
                "Processed {}: Severity={}, Acne={}, Pimples={}",
                self.file, severity, self.acne_count, self.pimple_count
            ),
            (None, Some(error)) => format!("Failed {}: {}", self.file, error),
            (None, None) => format!("Skipped {}", self.file),
        }
    }
}

/// Image files directly inside `dir`, sorted by name
pub fn discover_images(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut images = Vec::new();

    for entry in WalkDir::new(dir).min_depth(1).max_depth(1).follow_links(true) {
        let entry = entry.with_context(|| format!("Failed to read {}", dir.display()))?;
        let path = entry.path();
        if entry.file_type().is_file() && has_image_extension(path) {
            images.push(path.to_path_buf());
        }
    }

    images.sort();
    debug!("Found {} images in {}", images.len(), dir.display());
    Ok(images)
}

/// Analyze each image, continuing past failures
pub fn run_batch(
    analyzer: &AcneAnalyzer,
    images: &[PathBuf],
    input_dir: &Path,
    progress: &ProgressBar,
) -> BatchReport {
    let mut items = Vec::with_capacity(images.len());
    let mut severity_totals: BTreeMap<String, usize> = SeverityCategory::ALL
        .iter()
        .map(|s| (s.to_string(), 0))
        .collect();

    for path in images {
        let file = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        progress.set_message(file.clone());

        let item = match analyze_file(analyzer, path, &file) {
            Ok(item) => {
                if let Some(severity) = item.severity {
                    *severity_totals.entry(severity.to_string()).or_insert(0) += 1;
                }
                item
            }
            Err(e) => {
                warn!("Failed to process {}: {:#}", path.display(), e);
                BatchItem {
                    file,
                    severity: None,
                    acne_count: 0,
                    pimple_count: 0,
                    total_area: 0,
                    output: None,
                    error: Some(format!("{:#}", e)),
                }
            }
        };

        items.push(item);
        progress.inc(1);
    }

    progress.finish_and_clear();

    let failed = items.iter().filter(|i| i.error.is_some()).count();
    BatchReport {
        generated_at: Utc::now(),
        input_dir: input_dir.to_path_buf(),
        output_dir: analyzer.annotator().output_dir().to_path_buf(),
        processed: items.len() - failed,
        failed,
        severity_totals,
        items,
    }
}

fn analyze_file(analyzer: &AcneAnalyzer, path: &Path, file: &str) -> Result<BatchItem> {
    let target = analyzer.annotator().output_dir().join(file);
    if same_location(path, &target) {
        anyhow::bail!("Refusing to overwrite input image {}", path.display());
    }

    let image = image::open(path).with_context(|| format!("Failed to open {}", path.display()))?;
    let result = analyzer.analyze(&image, file)?;

    Ok(BatchItem {
        file: file.to_string(),
        severity: Some(result.severity),
        acne_count: result.acne_count,
        pimple_count: result.pimple_count,
        total_area: result.total_area,
        output: Some(result.annotated_image_path),
        error: None,
    })
}

/// True when both paths exist and resolve to the same file or folder
fn same_location(a: &Path, b: &Path) -> bool {
    match (a.canonicalize(), b.canonicalize()) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}

/// Annotated copies keep their input names, so the folders must differ
pub fn ensure_distinct_dirs(input: &Path, output: &Path) -> Result<()> {
    std::fs::create_dir_all(output)
        .with_context(|| format!("Failed to create output folder {}", output.display()))?;
    if same_location(input, output) {
        anyhow::bail!(
            "Output folder {} is the input folder; choose a different --output",
            output.display()
        );
    }
    Ok(())
}

fn progress_bar(total: u64, hidden: bool) -> ProgressBar {
    if hidden {
        return ProgressBar::hidden();
    }
    let pb = ProgressBar::new(total);
    if let Ok(style) = ProgressStyle::with_template(
        "{spinner:.green} [{elapsed_precise}] [{wide_bar:.cyan/blue}] {pos}/{len} {msg}",
    ) {
        pb.set_style(style.progress_chars("#>-"));
    }
    pb
}

/// Entry point for `acne-cli batch`
pub async fn run(args: BatchArgs) -> Result<()> {
    if !args.input.is_dir() {
        anyhow::bail!("Input folder not found: {}", args.input.display());
    }
    ensure_distinct_dirs(&args.input, &args.output)?;

    let images = discover_images(&args.input)?;
    if images.is_empty() {
        println!("No images found in {}", args.input.display());
        return Ok(());
    }

    let analyzer = load_analyzer(&args.model, &args.output, AnnotationStyle::batch()).await?;
    let progress = progress_bar(images.len() as u64, args.json);
    let input_dir = args.input.clone();

    let report = tokio::task::spawn_blocking(move || {
        run_batch(&analyzer, &images, &input_dir, &progress)
    })
    .await
    .context("Batch task panicked")?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        for item in &report.items {
            println!("{}", item.summary_line());
        }
        println!();
        for (severity, count) in &report.severity_totals {
            println!("{}: {}", severity, count);
        }
        println!(
            "✅ {} processed, {} failed, results in {}",
            report.processed,
            report.failed,
            report.output_dir.display()
        );
    }

    Ok(())
}
