//! RAW image reader implementation using the rawloader library.
//!
//! This module provides support for reading vendor RAW formats (ARW, CR2, NEF, DNG, etc.)
//! using the rawloader library. It handles decoding RAW sensor data and extracting the
//! level and white balance metadata needed to develop it.

use std::io::Cursor;

use tracing::{debug, warn};
use rawloader::RawImageData as RawloaderImageData;
use crate::image_pipeline::color;
use crate::image_pipeline::common::error::{Result, PipelineError};
use crate::image_pipeline::raw::types::{CfaPattern, RawImage};
use crate::image_pipeline::raw::reader::RawImageReader;

/// RAW image reader that uses the rawloader library for decoding.
///
/// Only 2x2 Bayer sensors are accepted. X-Trans and linear (already
/// demosaiced) files are reported as unsupported.
#[derive(Debug, Clone, Copy, Default)]
pub struct RawLoaderReader;

/// Visible sensor area left after rawloader's masked-border crops.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct CropWindow {
    left: usize,
    top: usize,
    width: usize,
    height: usize,
}

impl CropWindow {
    /// Builds the window from `[top, right, bottom, left]` crops. Crops that
    /// would leave less than one CFA block are ignored.
    fn from_crops(width: usize, height: usize, crops: [usize; 4]) -> Self {
        let [top, right, bottom, left] = crops;
        let cropped_width = width.checked_sub(left).and_then(|w| w.checked_sub(right));
        let cropped_height = height.checked_sub(top).and_then(|h| h.checked_sub(bottom));
        match (cropped_width, cropped_height) {
            (Some(w), Some(h)) if w >= 2 && h >= 2 => Self { left, top, width: w, height: h },
            _ => {
                warn!(?crops, "Crops exceed the {}x{} sensor, keeping the full area", width, height);
                Self { left: 0, top: 0, width, height }
            }
        }
    }

    fn is_full(&self, width: usize, height: usize) -> bool {
        self.left == 0 && self.top == 0 && self.width == width && self.height == height
    }

    /// Copies the window out of a row-major mosaic `stride` samples wide.
    fn extract(&self, samples: &[u16], stride: usize) -> Vec<u16> {
        samples
            .chunks(stride)
            .skip(self.top)
            .take(self.height)
            .flat_map(|row| row.iter().skip(self.left).take(self.width).copied())
            .collect()
    }
}

impl RawLoaderReader {
    /// Bayer layout seen from (`top`, `left`), the origin of the visible area.
    fn bayer_pattern(cfa: &rawloader::CFA, top: usize, left: usize) -> Result<CfaPattern> {
        if cfa.width == 0 || cfa.height == 0 {
            return Err(PipelineError::UnsupportedFormat("image has no CFA".to_string()));
        }

        // Some layouts carry a fourth color index for the second green.
        let color = |row: usize, col: usize| match cfa.color_at(row + top, col + left) {
            3 => 1,
            c => c,
        };

        let block = [[color(0, 0), color(0, 1)], [color(1, 0), color(1, 1)]];
        let pattern = CfaPattern::from_block(block).ok_or_else(|| {
            PipelineError::UnsupportedFormat(format!("CFA layout {}", cfa.name))
        })?;

        // A larger descriptor must still repeat the 2x2 block.
        let rows = cfa.height.max(2);
        let cols = cfa.width.max(2);
        let periodic = (0..rows).all(|r| (0..cols).all(|c| color(r, c) == pattern.color_at(r, c)));
        if !periodic {
            return Err(PipelineError::UnsupportedFormat(format!("non-Bayer CFA {}", cfa.name)));
        }

        Ok(pattern)
    }

    /// Camera white balance coefficients normalized to green, if usable.
    fn as_shot_multipliers(wb_coeffs: &[f32; 4]) -> Option<[f32; 3]> {
        let g = wb_coeffs[1];
        if !g.is_finite() || g <= 0.0 {
            return None;
        }
        let multipliers = [wb_coeffs[0] / g, 1.0, wb_coeffs[2] / g];
        multipliers
            .iter()
            .all(|m| m.is_finite() && *m > 0.0)
            .then_some(multipliers)
    }
}

impl RawImageReader for RawLoaderReader {
    /// Reads and decodes RAW image data from a byte array.
    ///
    /// This method:
    /// 1. Decodes the RAW file using rawloader
    /// 2. Converts the data to u16 format (handles both integer and float RAW data)
    /// 3. Reads black/white levels and derives the bit depth from the white level
    /// 4. Turns the camera white balance coefficients into as-shot multipliers
    ///    and estimates the neutral temperature/tint they correspond to
    ///
    /// Missing white balance falls back to the engine defaults instead of failing.
    fn read_raw(&self, data: &[u8]) -> Result<RawImage> {
        debug!("Decoding camera RAW image, {} bytes", data.len());
        
        let decoded = rawloader::decode(&mut Cursor::new(data))
            .map_err(|e| PipelineError::CorruptData(e.to_string()))?;
        
        let width = decoded.width;
        let height = decoded.height;
        
        debug!("Decoded image: {}x{} ({} {})", width, height, decoded.clean_make, decoded.clean_model);

        if decoded.cpp != 1 {
            return Err(PipelineError::UnsupportedFormat(format!(
                "{} components per pixel, expected a single-channel mosaic",
                decoded.cpp
            )));
        }

        let window = CropWindow::from_crops(width, height, decoded.crops);
        let cfa = Self::bayer_pattern(&decoded.cfa, window.top, window.left)?;
        
        // Integer data is cast directly, float data (normalized 0.0-1.0) is scaled to u16 range
        let samples: Vec<u16> = match decoded.data {
            RawloaderImageData::Integer(values) => values,
            RawloaderImageData::Float(values) => {
                values.iter().map(|&v| (v.clamp(0.0, 1.0) * u16::MAX as f32) as u16).collect()
            }
        };

        let samples = if window.is_full(width, height) {
            samples
        } else {
            debug!(?window, "Cropping masked sensor borders");
            window.extract(&samples, width)
        };

        // Black levels are indexed by CFA color; index 3 is a second green.
        let black_levels = [
            decoded.blacklevels[0],
            decoded.blacklevels[1],
            decoded.blacklevels[2],
        ];
        let darkest = black_levels.iter().copied().max().unwrap_or(0);
        let white_level = decoded.whitelevels.iter().max().copied().unwrap_or(u16::MAX);
        let white_level = if white_level <= darkest { u16::MAX } else { white_level };

        let image = RawImage::from_mosaic(window.width, window.height, samples, cfa)?
            .with_channel_levels(black_levels, white_level)?
            .with_camera(format!("{} {}", decoded.clean_make, decoded.clean_model));

        let image = match Self::as_shot_multipliers(&decoded.wb_coeffs)
            .and_then(|m| color::estimate_neutral(m).map(|neutral| (m, neutral)))
        {
            Some((multipliers, (temperature, tint))) => {
                debug!(temperature, tint, "Estimated as-shot neutral point");
                image.with_white_balance(multipliers, temperature, tint)
            }
            None => {
                warn!("No usable white balance coefficients, using defaults");
                image.with_white_balance(
                    [1.0; 3],
                    color::DEFAULT_NEUTRAL_TEMPERATURE,
                    color::DEFAULT_NEUTRAL_TINT,
                )
            }
        };

        debug!(
            "Calculated bits_per_sample: {} (white level: {}, black levels: {:?})",
            image.bits_per_sample(),
            white_level,
            black_levels
        );
        
        Ok(image)
    }
}
