//! Local photo discovery and encoding for `walksafe analyze`

use analysis_core::AnalysisRequest;
use anyhow::{Context, Result};
use base64::{engine::general_purpose, Engine as _};
use image::ImageFormat;
use std::io::Cursor;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

const IMAGE_EXTENSIONS: [&str; 4] = ["jpg", "jpeg", "png", "webp"];

/// A single file, or every image below a directory in name order
pub fn collect_images(input: &Path) -> Result<Vec<PathBuf>> {
    if input.is_file() {
        return Ok(vec![input.to_path_buf()]);
    }
    if !input.is_dir() {
        anyhow::bail!("Input not found: {}", input.display());
    }

    let mut images = Vec::new();
    for entry in WalkDir::new(input).sort_by_file_name() {
        let entry = entry.with_context(|| format!("Failed to walk {}", input.display()))?;
        if entry.file_type().is_file() && is_image(entry.path()) {
            images.push(entry.into_path());
        }
    }
    Ok(images)
}

fn is_image(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| IMAGE_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()))
        .unwrap_or(false)
}

/// Decode an image file and re-encode it as JPEG, the format the data URL claims
pub fn encode_image(path: &Path) -> Result<AnalysisRequest> {
    let img = image::open(path).with_context(|| format!("Failed to open {}", path.display()))?;

    let mut jpeg = Vec::new();
    image::DynamicImage::ImageRgb8(img.to_rgb8())
        .write_to(&mut Cursor::new(&mut jpeg), ImageFormat::Jpeg)
        .with_context(|| format!("Failed to encode {} as JPEG", path.display()))?;

    Ok(AnalysisRequest {
        image_base64: general_purpose::STANDARD.encode(&jpeg),
    })
}
