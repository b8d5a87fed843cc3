// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Letterbox preprocessing for the acne detector

use image::{imageops, DynamicImage, GenericImageView, Rgb, RgbImage};
use ndarray::Array4;

/// Default square input size of the YOLOv8 export
pub const DEFAULT_INPUT_SIZE: u32 = 640;

/// Padding color used by the YOLO letterbox
pub const PAD_VALUE: u8 = 114;

/// Preprocess an image for detection
///
/// Steps:
/// 1. Letterbox into `input_size` x `input_size` (aspect preserved, centered, gray 114 padding)
/// 2. Scale pixels to [0, 1]
/// 3. Lay out as NCHW tensor [1, 3, H, W]
pub fn preprocess_for_detection(image: &DynamicImage, input_size: u32) -> (Array4<f32>, PreprocessInfo) {
    let info = PreprocessInfo::new(image, input_size);
    let letterboxed = letterbox(image, &info, input_size);

    let size = input_size as usize;
    let mut tensor = Array4::zeros((1, 3, size, size));

    for (x, y, pixel) in letterboxed.enumerate_pixels() {
        for c in 0..3 {
            tensor[[0, c, y as usize, x as usize]] = pixel[c] as f32 / 255.0;
        }
    }

    (tensor, info)
}

/// Resize with aspect ratio preservation and center the result on a gray canvas
pub fn letterbox(image: &DynamicImage, info: &PreprocessInfo, input_size: u32) -> RgbImage {
    let mut canvas = RgbImage::from_pixel(input_size, input_size, Rgb([PAD_VALUE; 3]));

    if info.original_width == 0 || info.original_height == 0 {
        return canvas;
    }

    let resized = image
        .resize_exact(info.scaled_width, info.scaled_height, imageops::FilterType::Triangle)
        .to_rgb8();

    imageops::overlay(
        &mut canvas,
        &resized,
        info.offset_x as i64,
        info.offset_y as i64,
    );

    canvas
}

/// Scale factor and padding applied during letterboxing
///
/// Used to map detector coordinates back to the uploaded image.
#[derive(Debug, Clone, PartialEq)]
pub struct PreprocessInfo {
    /// Scale factor applied
    pub scale: f32,
    /// X offset from padding
    pub offset_x: u32,
    /// Y offset from padding
    pub offset_y: u32,
    /// Width after scaling, before padding
    pub scaled_width: u32,
    /// Height after scaling, before padding
    pub scaled_height: u32,
    /// Original image width
    pub original_width: u32,
    /// Original image height
    pub original_height: u32,
}

impl PreprocessInfo {
    /// Calculate letterbox geometry for an image
    pub fn new(image: &DynamicImage, input_size: u32) -> Self {
        let (orig_w, orig_h) = image.dimensions();
        Self::from_dimensions(orig_w, orig_h, input_size)
    }

    pub fn from_dimensions(orig_w: u32, orig_h: u32, input_size: u32) -> Self {
        if orig_w == 0 || orig_h == 0 {
            return Self {
                scale: 1.0,
                offset_x: 0,
                offset_y: 0,
                scaled_width: 0,
                scaled_height: 0,
                original_width: orig_w,
                original_height: orig_h,
            };
        }

        let scale = (input_size as f32 / orig_w as f32).min(input_size as f32 / orig_h as f32);
        let scaled_width = ((orig_w as f32 * scale).round() as u32).clamp(1, input_size);
        let scaled_height = ((orig_h as f32 * scale).round() as u32).clamp(1, input_size);

        Self {
            scale,
            offset_x: (input_size - scaled_width) / 2,
            offset_y: (input_size - scaled_height) / 2,
            scaled_width,
            scaled_height,
            original_width: orig_w,
            original_height: orig_h,
        }
    }

    /// Map a point from letterboxed space back to original image space,
    /// clamped to the image bounds
    pub fn map_to_original(&self, x: f32, y: f32) -> (f32, f32) {
        let orig_x = (x - self.offset_x as f32) / self.scale;
        let orig_y = (y - self.offset_y as f32) / self.scale;
        (
            orig_x.clamp(0.0, self.original_width as f32),
            orig_y.clamp(0.0, self.original_height as f32),
        )
    }
}
