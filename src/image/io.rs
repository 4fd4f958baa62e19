//! I/O helpers for frame images and JSON reports.
//!
//! - [`load_image`]: read a PNG/JPEG/etc. into normalized f32 samples.
//! - [`save_image`]: clamp to [0, 1], quantize to 8 bits and encode.
//! - [`write_json_file`]: pretty-print a serializable value to disk.
use super::Image;
use crate::error::{AlignError, Result};
use image::{DynamicImage, GrayImage, RgbImage};
use serde::Serialize;
use std::fs;
use std::path::Path;

/// Load an image from disk. Grayscale sources keep a single channel,
/// everything else is converted to 3-channel RGB. Samples are normalized to
/// [0, 1].
pub fn load_image(path: &Path) -> Result<Image> {
    let decoded = image::open(path).map_err(|source| AlignError::ImageRead {
        path: path.to_path_buf(),
        source,
    })?;

    let img = match decoded {
        DynamicImage::ImageLuma8(gray) => {
            let (w, h) = (gray.width() as usize, gray.height() as usize);
            let data = gray.into_raw().iter().map(|&v| v as f32 / 255.0).collect();
            Image::from_raw(w, h, 1, data)
        }
        DynamicImage::ImageLuma16(gray) => {
            let (w, h) = (gray.width() as usize, gray.height() as usize);
            let data = gray
                .into_raw()
                .iter()
                .map(|&v| v as f32 / 65535.0)
                .collect();
            Image::from_raw(w, h, 1, data)
        }
        other => {
            let rgb = other.into_rgb8();
            let (w, h) = (rgb.width() as usize, rgb.height() as usize);
            let data = rgb.into_raw().iter().map(|&v| v as f32 / 255.0).collect();
            Image::from_raw(w, h, 3, data)
        }
    };
    Ok(img)
}

/// Save an image to disk, clamping samples to [0, 1] and quantizing to 8-bit.
/// Only 1-channel and 3-channel images are supported.
pub fn save_image(path: &Path, img: &Image) -> Result<()> {
    ensure_parent_dir(path)?;
    let quantized: Vec<u8> = img
        .data
        .iter()
        .map(|&v| (v.clamp(0.0, 1.0) * 255.0) as u8)
        .collect();

    let dynamic = match img.channels {
        1 => GrayImage::from_raw(img.w as u32, img.h as u32, quantized)
            .map(DynamicImage::ImageLuma8),
        3 => {
            RgbImage::from_raw(img.w as u32, img.h as u32, quantized).map(DynamicImage::ImageRgb8)
        }
        n => {
            return Err(AlignError::InvalidParameter(format!(
                "cannot save {n}-channel image (supported: 1 or 3)"
            )))
        }
    }
    .ok_or_else(|| {
        AlignError::InvalidParameter("sample buffer does not match image geometry".into())
    })?;

    dynamic.save(path).map_err(|source| AlignError::ImageWrite {
        path: path.to_path_buf(),
        source,
    })
}

/// Serialize a value as pretty JSON to `path`, creating parent directories.
pub fn write_json_file<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    ensure_parent_dir(path)?;
    let json = serde_json::to_string_pretty(value).map_err(|source| AlignError::Json {
        path: path.to_path_buf(),
        source,
    })?;
    fs::write(path, json).map_err(|source| AlignError::Io {
        path: path.to_path_buf(),
        source,
    })
}

fn ensure_parent_dir(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).map_err(|source| AlignError::Io {
                path: parent.to_path_buf(),
                source,
            })?;
        }
    }
    Ok(())
}
