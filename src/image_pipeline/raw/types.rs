//! RAW image data types

use std::fmt;
use std::str::FromStr;

use crate::image_pipeline::color::{DEFAULT_NEUTRAL_TEMPERATURE, DEFAULT_NEUTRAL_TINT};
use crate::image_pipeline::common::error::{PipelineError, Result};
use crate::image_pipeline::common::geometry::Size;

/// Channel index of a CFA site: 0 = red, 1 = green, 2 = blue.
pub type Channel = usize;

/// 2x2 Bayer color filter layouts, named by the top-left block read row by row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CfaPattern {
    #[default]
    Rggb,
    Bggr,
    Grbg,
    Gbrg,
}

impl CfaPattern {
    /// Color of the sensor site at (`row`, `col`).
    pub fn color_at(&self, row: usize, col: usize) -> Channel {
        let block = match self {
            CfaPattern::Rggb => [[0, 1], [1, 2]],
            CfaPattern::Bggr => [[2, 1], [1, 0]],
            CfaPattern::Grbg => [[1, 0], [2, 1]],
            CfaPattern::Gbrg => [[1, 2], [0, 1]],
        };
        block[row % 2][col % 2]
    }

    /// Builds a pattern from the colors of the top-left 2x2 block.
    pub fn from_block(block: [[Channel; 2]; 2]) -> Option<Self> {
        [CfaPattern::Rggb, CfaPattern::Bggr, CfaPattern::Grbg, CfaPattern::Gbrg]
            .into_iter()
            .find(|p| {
                (0..2).all(|r| (0..2).all(|c| p.color_at(r, c) == block[r][c]))
            })
    }

    pub fn to_bayer(self) -> bayer::CFA {
        match self {
            CfaPattern::Rggb => bayer::CFA::RGGB,
            CfaPattern::Bggr => bayer::CFA::BGGR,
            CfaPattern::Grbg => bayer::CFA::GRBG,
            CfaPattern::Gbrg => bayer::CFA::GBRG,
        }
    }
}

impl FromStr for CfaPattern {
    type Err = PipelineError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_uppercase().as_str() {
            "RGGB" => Ok(CfaPattern::Rggb),
            "BGGR" => Ok(CfaPattern::Bggr),
            "GRBG" => Ok(CfaPattern::Grbg),
            "GBRG" => Ok(CfaPattern::Gbrg),
            other => Err(PipelineError::UnsupportedFormat(format!("CFA pattern {other}"))),
        }
    }
}

impl fmt::Display for CfaPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            CfaPattern::Rggb => "RGGB",
            CfaPattern::Bggr => "BGGR",
            CfaPattern::Grbg => "GRBG",
            CfaPattern::Gbrg => "GBRG",
        };
        f.write_str(name)
    }
}

/// Decoded sensor mosaic and the metadata needed to develop it.
///
/// Immutable once built. Construction checks that the mosaic covers the whole
/// grid, so a `RawImage` is never partially populated.
#[derive(Debug, Clone)]
pub struct RawImage {
    width: usize,
    height: usize,
    data: Vec<u16>,
    bits_per_sample: u32,
    cfa: CfaPattern,
    black_levels: [u16; 3],
    white_level: u16,
    as_shot_multipliers: [f32; 3],
    neutral_temperature: f32,
    neutral_tint: f32,
    camera: Option<String>,
}

/// Default bit depth when no white level information is available.
const DEFAULT_BITS_PER_SAMPLE: u32 = 16;

/// The bit width of the u16 data type, used for calculating actual bits per sample.
const U16_BITS: u32 = 16;

impl RawImage {
    /// Wraps a full-resolution mosaic. Levels default to the full 16-bit range,
    /// white balance to the engine defaults.
    pub fn from_mosaic(width: usize, height: usize, data: Vec<u16>, cfa: CfaPattern) -> Result<Self> {
        if width < 2 || height < 2 {
            return Err(PipelineError::CorruptData(format!(
                "sensor grid {width}x{height} is smaller than one CFA block"
            )));
        }
        let expected = width.checked_mul(height).ok_or_else(|| {
            PipelineError::CorruptData(format!("sensor grid {width}x{height} overflows"))
        })?;
        if data.len() != expected {
            return Err(PipelineError::CorruptData(format!(
                "expected {expected} sensor samples, found {}",
                data.len()
            )));
        }

        Ok(Self {
            width,
            height,
            data,
            bits_per_sample: DEFAULT_BITS_PER_SAMPLE,
            cfa,
            black_levels: [0; 3],
            white_level: u16::MAX,
            as_shot_multipliers: [1.0; 3],
            neutral_temperature: DEFAULT_NEUTRAL_TEMPERATURE,
            neutral_tint: DEFAULT_NEUTRAL_TINT,
            camera: None,
        })
    }

    /// Sets one black level for every site and the white level. The bit
    /// depth follows the white level.
    pub fn with_levels(self, black_level: u16, white_level: u16) -> Result<Self> {
        self.with_channel_levels([black_level; 3], white_level)
    }

    /// Sets per-color black levels (R, G, B) and the shared white level.
    pub fn with_channel_levels(mut self, black_levels: [u16; 3], white_level: u16) -> Result<Self> {
        let darkest = black_levels.iter().copied().max().unwrap_or(0);
        if white_level <= darkest {
            return Err(PipelineError::CorruptData(format!(
                "white level {white_level} is not above black levels {black_levels:?}"
            )));
        }
        self.black_levels = black_levels;
        self.white_level = white_level;
        // e.g., white_level = 4095 (0xFFF) -> 12 bits
        //       white_level = 16383 (0x3FFF) -> 14 bits
        self.bits_per_sample = U16_BITS - white_level.leading_zeros();
        Ok(self)
    }

    /// Sets the as-shot multipliers and the neutral point they correspond to.
    /// Non-finite or non-positive multipliers are replaced by unity gains.
    pub fn with_white_balance(mut self, multipliers: [f32; 3], neutral_temperature: f32, neutral_tint: f32) -> Self {
        self.as_shot_multipliers = if multipliers.iter().all(|m| m.is_finite() && *m > 0.0) {
            multipliers
        } else {
            [1.0; 3]
        };
        self.neutral_temperature = neutral_temperature;
        self.neutral_tint = neutral_tint;
        self
    }

    pub fn with_camera(mut self, camera: impl Into<String>) -> Self {
        self.camera = Some(camera.into());
        self
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn native_size(&self) -> Size {
        Size::from((self.width, self.height))
    }

    /// Single channel mosaic, row-major.
    pub fn data(&self) -> &[u16] {
        &self.data
    }

    /// Actual bits per sample from the sensor (e.g., 12, 14, or 16)
    pub fn bits_per_sample(&self) -> u32 {
        self.bits_per_sample
    }

    pub fn cfa(&self) -> CfaPattern {
        self.cfa
    }

    /// Black level per color channel, indexed like [`CfaPattern::color_at`].
    pub fn black_levels(&self) -> [u16; 3] {
        self.black_levels
    }

    pub fn white_level(&self) -> u16 {
        self.white_level
    }

    pub fn as_shot_multipliers(&self) -> [f32; 3] {
        self.as_shot_multipliers
    }

    pub fn neutral_temperature(&self) -> f32 {
        self.neutral_temperature
    }

    pub fn neutral_tint(&self) -> f32 {
        self.neutral_tint
    }

    pub fn camera(&self) -> Option<&str> {
        self.camera.as_deref()
    }
}
