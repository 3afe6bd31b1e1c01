//! Reader for Bayer mosaics stored as single-channel TIFF files.
//!
//! This is the layout a RAW→TIFF dump without debayering produces: one gray
//! sample per sensor site. Capture metadata travels in the ImageDescription
//! tag as `key=value` tokens, e.g. `cfa=GRBG temperature=5200 tint=4 black=256 white=4095`.

use std::io::Cursor;

use tiff::decoder::{Decoder, DecodingResult};
use tiff::tags::Tag;
use tiff::{ColorType, TiffError};
use tracing::debug;

use crate::image_pipeline::color;
use crate::image_pipeline::common::error::{PipelineError, Result};
use crate::image_pipeline::raw::reader::RawImageReader;
use crate::image_pipeline::raw::types::{CfaPattern, RawImage};

#[derive(Debug, Clone, Copy, Default)]
pub struct TiffMosaicReader;

/// Capture metadata parsed from the ImageDescription tag.
#[derive(Debug, Clone, Default, PartialEq)]
pub(crate) struct MosaicMetadata {
    pub cfa: Option<CfaPattern>,
    pub temperature: Option<f32>,
    pub tint: Option<f32>,
    pub black: Option<u16>,
    pub white: Option<u16>,
}

impl MosaicMetadata {
    pub(crate) fn parse(description: &str) -> Self {
        let mut meta = Self::default();
        for token in description.split(|c: char| c.is_whitespace() || c == ';') {
            let Some((key, value)) = token.split_once('=') else {
                continue;
            };
            let value = value.trim();
            match key.trim().to_ascii_lowercase().as_str() {
                "cfa" => meta.cfa = value.parse().ok(),
                "temperature" => meta.temperature = value.parse().ok().filter(|t: &f32| t.is_finite()),
                "tint" => meta.tint = value.parse().ok().filter(|t: &f32| t.is_finite()),
                "black" => meta.black = value.parse().ok(),
                "white" => meta.white = value.parse().ok(),
                other => debug!("Ignoring mosaic metadata key {}", other),
            }
        }
        meta
    }
}

fn map_tiff_error(e: TiffError) -> PipelineError {
    match e {
        TiffError::UnsupportedError(e) => PipelineError::UnsupportedFormat(e.to_string()),
        other => PipelineError::CorruptData(other.to_string()),
    }
}

impl RawImageReader for TiffMosaicReader {
    fn read_raw(&self, data: &[u8]) -> Result<RawImage> {
        debug!("Decoding TIFF mosaic, {} bytes", data.len());

        let mut decoder = Decoder::new(Cursor::new(data)).map_err(map_tiff_error)?;
        let (width, height) = decoder.dimensions().map_err(map_tiff_error)?;
        let colortype = decoder.colortype().map_err(map_tiff_error)?;

        let bits = match colortype {
            ColorType::Gray(bits @ (8 | 16)) => bits,
            other => {
                return Err(PipelineError::UnsupportedFormat(format!(
                    "TIFF color type {:?} is not a single-channel mosaic",
                    other
                )));
            }
        };

        let meta = decoder
            .get_tag_ascii_string(Tag::ImageDescription)
            .map(|d| MosaicMetadata::parse(&d))
            .unwrap_or_default();

        debug!("TIFF mosaic {}x{}, {} bits, {:?}", width, height, bits, meta);

        let samples: Vec<u16> = match decoder.read_image().map_err(map_tiff_error)? {
            DecodingResult::U8(values) => values.into_iter().map(u16::from).collect(),
            DecodingResult::U16(values) => values,
            _ => {
                return Err(PipelineError::UnsupportedFormat(
                    "TIFF sample format is not unsigned integer".to_string(),
                ));
            }
        };

        let full_scale = if bits == 8 { u8::MAX as u16 } else { u16::MAX };
        let black = meta.black.unwrap_or(0);
        let white = meta.white.unwrap_or(full_scale);

        let image = RawImage::from_mosaic(
            width as usize,
            height as usize,
            samples,
            meta.cfa.unwrap_or_default(),
        )?
        .with_levels(black, white)?;

        let image = match meta.temperature {
            Some(temperature) => {
                let tint = meta.tint.unwrap_or(color::DEFAULT_NEUTRAL_TINT);
                image.with_white_balance(color::correction_gains(temperature, tint), temperature, tint)
            }
            None => {
                if meta.tint.is_some() {
                    debug!("Ignoring tint without a temperature");
                }
                image.with_white_balance(
                    [1.0; 3],
                    color::DEFAULT_NEUTRAL_TEMPERATURE,
                    color::DEFAULT_NEUTRAL_TINT,
                )
            }
        };

        Ok(image)
    }
}
