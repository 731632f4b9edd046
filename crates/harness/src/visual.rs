//! Pixel-level screenshot comparison
//!
//! Renders are expected to be pixel-identical by default; the percent
//! threshold exists so a suite can opt into a perceptual tolerance. A
//! diff image is written whenever any pixel differs and is kept for
//! inspection even when the comparison passes.

use image::{GenericImageView, Pixel, RgbaImage};
use sha2::{Digest, Sha256};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use crate::error::{HarnessError, HarnessResult};

/// Result of one screenshot comparison.
#[derive(Debug, Clone)]
pub struct VisualDiff {
    /// Whether the images match (within threshold)
    pub matches: bool,

    /// Percentage of pixels that differ
    pub diff_percent: f64,

    /// Number of different pixels
    pub diff_pixels: u64,

    /// Total pixels compared
    pub total_pixels: u64,

    /// Path to the diff image (if generated)
    pub diff_image_path: Option<PathBuf>,

    /// Hash of the actual screenshot
    pub actual_hash: String,

    /// Hash of the expected screenshot
    pub expected_hash: String,
}

/// Compares screenshot pairs pixel-by-pixel.
#[derive(Debug, Clone)]
pub struct VisualComparator {
    /// Allowed percentage of differing pixels (0.0 - 100.0)
    pub threshold: f64,
}

impl Default for VisualComparator {
    fn default() -> Self {
        // Renders of the same stylesheet+font pair must be identical
        Self { threshold: 0.0 }
    }
}

impl VisualComparator {
    pub fn new(threshold: f64) -> Self {
        Self { threshold }
    }

    /// Compare two screenshots, writing a diff image next to them when
    /// any pixel differs.
    pub fn compare(
        &self,
        actual_path: &Path,
        expected_path: &Path,
        diff_path: &Path,
    ) -> HarnessResult<VisualDiff> {
        if !actual_path.exists() {
            return Err(HarnessError::MissingOutput(actual_path.to_path_buf()));
        }
        if !expected_path.exists() {
            return Err(HarnessError::MissingOutput(expected_path.to_path_buf()));
        }

        let actual_hash = hash_file(actual_path)?;
        let expected_hash = hash_file(expected_path)?;

        let actual_img = image::open(actual_path)?;
        let expected_img = image::open(expected_path)?;

        // Quick hash comparison
        if actual_hash == expected_hash {
            debug!("Screenshots match exactly (same hash)");
            return Ok(VisualDiff {
                matches: true,
                diff_percent: 0.0,
                diff_pixels: 0,
                total_pixels: (actual_img.width() * actual_img.height()) as u64,
                diff_image_path: None,
                actual_hash,
                expected_hash,
            });
        }

        let (width, height) = actual_img.dimensions();
        if (width, height) != expected_img.dimensions() {
            return Err(HarnessError::DimensionMismatch {
                actual_w: width,
                actual_h: height,
                expected_w: expected_img.width(),
                expected_h: expected_img.height(),
            });
        }

        let actual_rgba = actual_img.to_rgba8();
        let expected_rgba = expected_img.to_rgba8();

        let mut diff_img = RgbaImage::new(width, height);
        let mut diff_pixels = 0u64;
        let total_pixels = (width as u64) * (height as u64);

        for y in 0..height {
            for x in 0..width {
                let actual_pixel = actual_rgba.get_pixel(x, y);
                let expected_pixel = expected_rgba.get_pixel(x, y);

                if actual_pixel != expected_pixel {
                    diff_pixels += 1;
                    // Mark diff pixels in red
                    diff_img.put_pixel(x, y, image::Rgba([255, 0, 0, 255]));
                } else {
                    // Keep original but dim it
                    let channels = actual_pixel.channels();
                    diff_img.put_pixel(
                        x,
                        y,
                        image::Rgba([channels[0] / 2, channels[1] / 2, channels[2] / 2, 128]),
                    );
                }
            }
        }

        let diff_percent = (diff_pixels as f64 / total_pixels as f64) * 100.0;
        let matches = diff_percent <= self.threshold;

        let diff_image_path = if diff_pixels > 0 {
            if let Some(parent) = diff_path.parent() {
                std::fs::create_dir_all(parent)?;
            }
            diff_img.save(diff_path)?;
            Some(diff_path.to_path_buf())
        } else {
            None
        };

        if !matches {
            warn!(
                "Screenshot mismatch: {} - {:.2}% pixels differ (threshold: {:.2}%)",
                actual_path.display(),
                diff_percent,
                self.threshold
            );
        }

        Ok(VisualDiff {
            matches,
            diff_percent,
            diff_pixels,
            total_pixels,
            diff_image_path,
            actual_hash,
            expected_hash,
        })
    }
}

/// Hash a file using SHA-256.
fn hash_file(path: &Path) -> HarnessResult<String> {
    let data = std::fs::read(path)?;
    let mut hasher = Sha256::new();
    hasher.update(&data);
    Ok(hex::encode(hasher.finalize()))
}
