// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Draws detections onto a copy of the analyzed image and writes it out

use ab_glyph::{FontArc, PxScale};
use anyhow::{Context, Result};
use image::{DynamicImage, Rgb, RgbImage};
use imageproc::drawing::{draw_hollow_rect_mut, draw_text_mut};
use imageproc::rect::Rect;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use uuid::Uuid;

use super::severity::SeverityCategory;
use crate::vision::acne::{BoundingBox, Detection};

/// Labels sit with their baseline this many pixels above the box
const LABEL_OFFSET: i32 = 10;

/// Banner baseline position for batch output
const BANNER_ORIGIN: (i32, i32) = (20, 40);
const BANNER_COLOR: [u8; 3] = [255, 0, 0];

/// DejaVu Sans, used when no system font loads
static BUNDLED_FONT: &[u8] = include_bytes!("../../assets/DejaVuSans.ttf");

/// System fonts tried after an explicit font path
const FALLBACK_FONTS: &[&str] = &[
    "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/TTF/DejaVuSans.ttf",
    "/usr/share/fonts/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/truetype/liberation/LiberationSans-Regular.ttf",
    "/usr/share/fonts/liberation/LiberationSans-Regular.ttf",
    "/System/Library/Fonts/Supplemental/Arial.ttf",
    "/Library/Fonts/Arial.ttf",
    "C:\\Windows\\Fonts\\arial.ttf",
];

/// How detections are rendered
#[derive(Debug, Clone)]
pub struct AnnotationStyle {
    pub line_thickness: u32,
    pub font_size: f32,
    /// Append the confidence to each label ("Acne 0.87")
    pub show_confidence: bool,
    /// Draw a "Severity: <category>" banner in the top-left corner
    pub severity_banner: bool,
}

impl Default for AnnotationStyle {
    fn default() -> Self {
        Self {
            line_thickness: 2,
            font_size: 16.0,
            show_confidence: false,
            severity_banner: false,
        }
    }
}

impl AnnotationStyle {
    /// Style used by the batch CLI
    pub fn batch() -> Self {
        Self {
            show_confidence: true,
            severity_banner: true,
            ..Self::default()
        }
    }
}

/// Renders and persists annotated images
#[derive(Clone)]
pub struct Annotator {
    output_dir: PathBuf,
    style: AnnotationStyle,
    font: Option<FontArc>,
}

impl std::fmt::Debug for Annotator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Annotator")
            .field("output_dir", &self.output_dir)
            .field("style", &self.style)
            .field("has_font", &self.font.is_some())
            .finish()
    }
}

impl Annotator {
    /// Create an annotator writing into `output_dir`
    ///
    /// Falls back to the bundled font when `font_path` and the system fonts
    /// are unusable.
    pub fn new<P: Into<PathBuf>>(output_dir: P, style: AnnotationStyle, font_path: Option<&Path>) -> Self {
        let font = load_label_font(font_path);
        if font.is_none() {
            warn!("No usable label font found, annotations will contain boxes only");
        }

        Self {
            output_dir: output_dir.into(),
            style,
            font,
        }
    }

    /// Annotator that never renders text
    pub fn without_font<P: Into<PathBuf>>(output_dir: P, style: AnnotationStyle) -> Self {
        Self {
            output_dir: output_dir.into(),
            style,
            font: None,
        }
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    pub fn style(&self) -> &AnnotationStyle {
        &self.style
    }

    pub fn has_font(&self) -> bool {
        self.font.is_some()
    }

    /// Draw detections on a copy of `image`
    pub fn draw(
        &self,
        image: &DynamicImage,
        detections: &[Detection],
        severity: Option<SeverityCategory>,
    ) -> RgbImage {
        let mut canvas = image.to_rgb8();

        for detection in detections {
            let color = Rgb(detection.class.color());
            draw_box(&mut canvas, &detection.bbox, color, self.style.line_thickness);

            let label = if self.style.show_confidence {
                format!("{} {:.2}", detection.class.label(), detection.confidence)
            } else {
                detection.class.label().to_string()
            };
            let baseline_y = detection.bbox.y1 as i32 - LABEL_OFFSET;
            self.draw_label(&mut canvas, &label, detection.bbox.x1 as i32, baseline_y, color, self.style.font_size);
        }

        if self.style.severity_banner {
            if let Some(severity) = severity {
                self.draw_label(
                    &mut canvas,
                    &format!("Severity: {}", severity),
                    BANNER_ORIGIN.0,
                    BANNER_ORIGIN.1,
                    Rgb(BANNER_COLOR),
                    self.style.font_size * 2.0,
                );
            }
        }

        canvas
    }

    /// Write `image` as `<output_dir>/<file_name>`, format from the extension
    pub fn save(&self, image: &RgbImage, file_name: &str) -> Result<PathBuf> {
        fs::create_dir_all(&self.output_dir).with_context(|| {
            format!("Failed to create output directory {}", self.output_dir.display())
        })?;

        let path = self.output_dir.join(file_name);
        image
            .save(&path)
            .with_context(|| format!("Failed to write annotated image {}", path.display()))?;

        debug!("Annotated image written to {}", path.display());
        Ok(path)
    }

    /// `draw` followed by `save`
    pub fn annotate_to_file(
        &self,
        image: &DynamicImage,
        detections: &[Detection],
        severity: Option<SeverityCategory>,
        file_name: &str,
    ) -> Result<PathBuf> {
        let canvas = self.draw(image, detections, severity);
        self.save(&canvas, file_name)
    }

    fn draw_label(&self, canvas: &mut RgbImage, text: &str, x: i32, baseline_y: i32, color: Rgb<u8>, size: f32) {
        let Some(font) = self.font.as_ref() else {
            return;
        };
        // draw_text_mut positions the top of the line box
        let top = (baseline_y - size.round() as i32).max(0);
        draw_text_mut(canvas, color, x.max(0), top, PxScale::from(size), font, text);
    }
}

/// Hollow rectangle grown inward by `thickness` pixels
fn draw_box(canvas: &mut RgbImage, bbox: &BoundingBox, color: Rgb<u8>, thickness: u32) {
    let width = bbox.width() + 1;
    let height = bbox.height() + 1;

    for t in 0..thickness {
        let inset = 2 * t;
        if width <= inset || height <= inset {
            break;
        }
        let rect = Rect::at((bbox.x1 + t) as i32, (bbox.y1 + t) as i32)
            .of_size(width - inset, height - inset);
        draw_hollow_rect_mut(canvas, rect, color);
    }
}

/// Output name for an upload: `<user_id>_<uuid>.jpg`
pub fn unique_output_name(user_id: &str) -> String {
    format!("{}_{}.jpg", sanitize_file_stem(user_id), Uuid::new_v4().simple())
}

/// Keep only `[A-Za-z0-9_-]`, replacing anything else with `_`
pub fn sanitize_file_stem(raw: &str) -> String {
    let cleaned: String = raw
        .chars()
        .take(64)
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect();

    if cleaned.is_empty() {
        "anonymous".to_string()
    } else {
        cleaned
    }
}

/// Load the label font
///
/// Order: explicit path, common system locations, bundled DejaVu Sans.
pub fn load_label_font(font_path: Option<&Path>) -> Option<FontArc> {
    if let Some(path) = font_path {
        match load_font_from_path(path) {
            Ok(font) => return Some(font),
            Err(e) => warn!("{:#}, trying system fonts", e),
        }
    }

    FALLBACK_FONTS
        .iter()
        .map(Path::new)
        .filter(|p| p.exists())
        .find_map(|p| load_font_from_path(p).ok())
        .or_else(bundled_font)
}

/// The font compiled into the binary
pub fn bundled_font() -> Option<FontArc> {
    match FontArc::try_from_slice(BUNDLED_FONT) {
        Ok(font) => Some(font),
        Err(e) => {
            warn!("Bundled label font is invalid: {}", e);
            None
        }
    }
}

fn load_font_from_path(path: &Path) -> Result<FontArc> {
    let bytes = fs::read(path).with_context(|| format!("Font file not readable: {}", path.display()))?;
    let font = FontArc::try_from_vec(bytes)
        .with_context(|| format!("Invalid font file: {}", path.display()))?;
    debug!("Loaded label font {}", path.display());
    Ok(font)
}
