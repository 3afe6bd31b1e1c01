//! RAW image reading module
//!
//! This module provides format-agnostic RAW image reading capabilities: format
//! detection from a hint or the content, and readers for camera RAW files and
//! single-channel TIFF mosaics.

mod reader;
mod rawloader_reader;
mod tiff_reader;
mod format;
mod decoder;
pub mod types;

#[cfg(test)]
pub(crate) mod fixtures;
#[cfg(test)]
mod tests;

pub use reader::RawImageReader;
pub use rawloader_reader::RawLoaderReader;
pub use tiff_reader::TiffMosaicReader;
pub use format::RawFormat;
pub use decoder::RawDecoder;
pub use types::{CfaPattern, RawImage};
