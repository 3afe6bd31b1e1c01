//! The individual render stages. Each is a pure function of its inputs.

use image::imageops;
use rayon::prelude::*;

use crate::image_pipeline::color;
use crate::image_pipeline::common::geometry::Size;
use crate::image_pipeline::debayer::LinearImage;
use crate::image_pipeline::raw::RawImage;
use crate::image_pipeline::render::types::ResampleFilter;

/// Black level subtraction, scaling to the full 16-bit range and as-shot
/// white balance per CFA site.
pub(crate) fn normalize(raw: &RawImage) -> Vec<u16> {
    let multipliers = raw.as_shot_multipliers();
    let black_levels = raw.black_levels();
    if black_levels == [0; 3] && raw.white_level() == u16::MAX && multipliers == [1.0; 3] {
        return raw.data().to_vec();
    }

    let white = raw.white_level() as f32;
    let cfa = raw.cfa();
    let width = raw.width();

    // (black, range, gain) for each site of a CFA block
    let site = |row: usize, col: usize| {
        let channel = cfa.color_at(row, col);
        let black = black_levels[channel] as f32;
        (black, (white - black).max(1.0), multipliers[channel])
    };
    let sites = [[site(0, 0), site(0, 1)], [site(1, 0), site(1, 1)]];

    let mut out = vec![0u16; raw.data().len()];
    out.par_chunks_mut(width)
        .zip(raw.data().par_chunks(width))
        .enumerate()
        .for_each(|(y, (dst, src))| {
            let row_sites = sites[y % 2];
            for (x, (d, &s)) in dst.iter_mut().zip(src).enumerate() {
                let (black, range, gain) = row_sites[x % 2];
                let v = (s as f32 - black).max(0.0) / range * gain;
                *d = (v * u16::MAX as f32).round().clamp(0.0, u16::MAX as f32) as u16;
            }
        });
    out
}

/// Multiplies each channel by its gain.
pub(crate) fn white_balance(image: &mut LinearImage, gains: [f32; 3]) {
    if gains == [1.0; 3] {
        return;
    }
    let buffer: &mut [f32] = image;
    buffer.par_chunks_mut(3).for_each(|px| {
        px[0] *= gains[0];
        px[1] *= gains[1];
        px[2] *= gains[2];
    });
}

/// Multiplies linear values by `2^stops`.
pub(crate) fn exposure(image: &mut LinearImage, stops: f32) {
    let factor = stops.exp2();
    if factor == 1.0 {
        return;
    }
    let buffer: &mut [f32] = image;
    buffer.par_iter_mut().for_each(|v| *v *= factor);
}

/// Output dimensions for a native image at `scale`, bounded by `bound`.
///
/// A scale that would overflow the bound is reduced uniformly so the aspect
/// ratio survives.
pub(crate) fn target_size(native: Size, scale: f64, bound: Size) -> (u32, u32) {
    let fit = (bound.width.ceil() / native.width).min(bound.height.ceil() / native.height);
    let scale = scale.min(fit);
    let width = (native.width * scale).round().max(1.0);
    let height = (native.height * scale).round().max(1.0);
    (width as u32, height as u32)
}

/// Resamples to `width` x `height`. Same-size requests return the input.
pub(crate) fn resample(image: LinearImage, width: u32, height: u32, filter: ResampleFilter) -> LinearImage {
    if image.dimensions() == (width, height) {
        return image;
    }
    imageops::resize(&image, width, height, filter.to_filter_type())
}

/// sRGB transfer and 8-bit quantization.
pub(crate) fn encode(image: &LinearImage) -> Vec<u8> {
    let buffer: &[f32] = image;
    buffer.par_iter().map(|&v| color::encode_srgb(v)).collect()
}
