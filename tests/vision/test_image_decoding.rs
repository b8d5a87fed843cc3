// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! Upload decoding across the accepted formats

use acne_analyzer::vision::{decode_image_bytes, detect_format, ImageError};
use image::{DynamicImage, ImageFormat};
use std::io::Cursor;

fn encode(format: ImageFormat) -> Vec<u8> {
    let img = DynamicImage::new_rgb8(48, 32);
    let mut bytes = Vec::new();
    img.write_to(&mut Cursor::new(&mut bytes), format).unwrap();
    bytes
}

#[test]
fn test_accepted_formats_decode() {
    for format in [
        ImageFormat::Png,
        ImageFormat::Jpeg,
        ImageFormat::Bmp,
        ImageFormat::Gif,
        ImageFormat::Tiff,
    ] {
        let bytes = encode(format);
        assert_eq!(detect_format(&bytes).unwrap(), format);

        let (image, info) = decode_image_bytes(&bytes, 1024 * 1024).unwrap();
        assert_eq!((image.width(), image.height()), (48, 32));
        assert_eq!(info.format, format);
        assert_eq!(info.size_bytes, bytes.len());
    }
}

#[test]
fn test_size_limit_checked_before_decoding() {
    let bytes = encode(ImageFormat::Png);
    let err = decode_image_bytes(&bytes, 10).unwrap_err();
    assert!(matches!(err, ImageError::TooLarge(_, 10)));
}

#[test]
fn test_client_extension_is_irrelevant() {
    // Only magic bytes matter
    let err = decode_image_bytes(b"GIF-but-not-really", 1024).unwrap_err();
    assert!(matches!(err, ImageError::UnsupportedFormat));

    let err = decode_image_bytes(&[], 1024).unwrap_err();
    assert!(matches!(err, ImageError::EmptyData));
}
