// SPDX-License-Identifier: GPL-3.0-only

//! Photo storage

use crate::errors::{AppError, AppResult};
use crate::sensor::Frame;
use std::path::PathBuf;
use tracing::info;

/// Directory where captured photos are stored
pub fn photo_directory() -> PathBuf {
    dirs::picture_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("blackspot")
}

/// Save the frame as a timestamped JPEG in the photo directory
pub fn save_photo(frame: &Frame) -> AppResult<PathBuf> {
    let rgb_data = frame.packed_rgb();

    let img: image::RgbImage = image::ImageBuffer::from_raw(frame.width, frame.height, rgb_data)
        .ok_or_else(|| AppError::Storage("Failed to create image from frame".to_string()))?;

    let photo_dir = photo_directory();
    std::fs::create_dir_all(&photo_dir)?;

    let timestamp = chrono::Local::now().format("%Y%m%d_%H%M%S");
    let filename = format!("IMG_{}.jpg", timestamp);
    let filepath = photo_dir.join(&filename);

    img.save(&filepath)
        .map_err(|e| AppError::Storage(e.to_string()))?;
    info!(path = %filepath.display(), "Photo saved");

    Ok(filepath)
}
