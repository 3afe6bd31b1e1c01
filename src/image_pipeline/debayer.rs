//! Debayering module for converting Bayer pattern RAW images to RGB

pub mod cpu_debayer;
pub mod types;

pub use cpu_debayer::CpuDebayer;
pub use types::{DemosaicMethod, LinearImage};

use crate::image_pipeline::common::error::Result;
use crate::image_pipeline::raw::CfaPattern;

/// Reconstructs a linear RGB image from a normalized 16-bit mosaic.
pub trait Demosaicer {
    fn demosaic(
        &self,
        mosaic: &[u16],
        width: usize,
        height: usize,
        cfa: CfaPattern,
        method: DemosaicMethod,
    ) -> Result<LinearImage>;
}
