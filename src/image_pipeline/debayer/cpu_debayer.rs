use std::io::Cursor;

use bayer::{BayerDepth, RasterDepth, RasterMut};
use tracing::debug;

use crate::image_pipeline::common::error::{PipelineError, Result};
use crate::image_pipeline::debayer::types::{DemosaicMethod, LinearImage};
use crate::image_pipeline::debayer::Demosaicer;
use crate::image_pipeline::raw::CfaPattern;

const CUBIC_MIN_SIZE: usize = 4;

/// Demosaics on the CPU with the bayer crate.
#[derive(Debug, Clone, Copy, Default)]
pub struct CpuDebayer;

impl CpuDebayer {
    pub fn new() -> Self {
        Self
    }
}

impl Demosaicer for CpuDebayer {
    fn demosaic(
        &self,
        mosaic: &[u16],
        width: usize,
        height: usize,
        cfa: CfaPattern,
        method: DemosaicMethod,
    ) -> Result<LinearImage> {
        debug!("Starting CPU debayering for image {}x{}, CFA={}, algo={:?}", width, height, cfa, method);

        if mosaic.len() != width * height {
            return Err(PipelineError::Render(format!(
                "mosaic holds {} samples, expected {}x{}",
                mosaic.len(),
                width,
                height
            )));
        }

        // Cubic interpolation needs a 4x4 neighbourhood
        let method = if method == DemosaicMethod::Cubic && (width < CUBIC_MIN_SIZE || height < CUBIC_MIN_SIZE) {
            debug!("{}x{} is too small for cubic, using linear", width, height);
            DemosaicMethod::Linear
        } else {
            method
        };

        // The bayer crate reads 16-bit samples as little-endian bytes
        let bayer_bytes: Vec<u8> = mosaic.iter()
            .flat_map(|&val| val.to_le_bytes())
            .collect();
        
        // Allocate output buffer for 16-bit RGB data
        let mut output_buf = vec![0u8; width * height * 3 * 2];
        
        {
            let mut cursor = Cursor::new(&bayer_bytes[..]);
            let mut output_raster = RasterMut::new(
                width,
                height,
                RasterDepth::Depth16,
                &mut output_buf
            );
            
            bayer::run_demosaic(
                &mut cursor,
                BayerDepth::Depth16LE,
                cfa.to_bayer(),
                method.to_bayer(),
                &mut output_raster
            ).map_err(|e| PipelineError::Render(format!("Demosaic failed: {:?}", e)))?;
        }
        
        // The output raster holds native-endian u16 samples
        let data: Vec<f32> = output_buf.chunks_exact(2)
            .map(|b| u16::from_ne_bytes([b[0], b[1]]) as f32 / u16::MAX as f32)
            .collect();

        LinearImage::from_raw(width as u32, height as u32, data)
            .ok_or_else(|| PipelineError::Render("demosaic output has the wrong length".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flat_field_stays_flat() {
        let mosaic = vec![32768u16; 8 * 6];
        let image = CpuDebayer::new()
            .demosaic(&mosaic, 8, 6, CfaPattern::Rggb, DemosaicMethod::Linear)
            .unwrap();

        assert_eq!(image.dimensions(), (8, 6));
        let expected = 32768.0 / 65535.0;
        for pixel in image.pixels() {
            for channel in pixel.0 {
                assert!((channel - expected).abs() < 1e-4, "channel {channel}");
            }
        }
    }

    #[test]
    fn test_channels_follow_cfa() {
        // Red sites bright, everything else dark.
        let cfa = CfaPattern::Bggr;
        let (width, height) = (8, 8);
        let mosaic: Vec<u16> = (0..width * height)
            .map(|i| if cfa.color_at(i / width, i % width) == 0 { 60000 } else { 1000 })
            .collect();

        let image = CpuDebayer
            .demosaic(&mosaic, width, height, cfa, DemosaicMethod::NearestNeighbour)
            .unwrap();

        let center = image.get_pixel(4, 4).0;
        assert!(center[0] > 0.8, "red {}", center[0]);
        assert!(center[1] < 0.1, "green {}", center[1]);
        assert!(center[2] < 0.1, "blue {}", center[2]);
    }

    #[test]
    fn test_cubic_on_small_grid_falls_back_to_linear() {
        for (width, height) in [(2, 2), (3, 3), (2, 6)] {
            let mosaic = vec![20000u16; width * height];
            let cubic = CpuDebayer
                .demosaic(&mosaic, width, height, CfaPattern::Rggb, DemosaicMethod::Cubic)
                .unwrap();
            let linear = CpuDebayer
                .demosaic(&mosaic, width, height, CfaPattern::Rggb, DemosaicMethod::Linear)
                .unwrap();
            assert_eq!(cubic, linear, "{width}x{height}");
        }
    }

    #[test]
    fn test_length_mismatch_is_render_error() {
        let result = CpuDebayer.demosaic(&[0u16; 10], 4, 4, CfaPattern::Rggb, DemosaicMethod::Linear);
        assert!(matches!(result, Err(PipelineError::Render(_))));
    }
}
