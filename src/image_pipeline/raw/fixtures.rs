//! Synthetic sensor data for tests.

use std::io::Cursor;

use tiff::encoder::{colortype, TiffEncoder};
use tiff::tags::Tag;

use crate::image_pipeline::raw::types::{CfaPattern, RawImage};

/// Mosaic of a smooth gradient scene: red grows left to right, blue top to
/// bottom, green stays mid-gray. Values stay well inside `white`.
pub(crate) fn gradient_mosaic(width: usize, height: usize, cfa: CfaPattern, white: u16) -> Vec<u16> {
    let mut data = Vec::with_capacity(width * height);
    for y in 0..height {
        for x in 0..width {
            let rgb = [
                0.1 + 0.6 * x as f32 / width as f32,
                0.4,
                0.1 + 0.6 * y as f32 / height as f32,
            ];
            let value = rgb[cfa.color_at(y, x)] * white as f32;
            data.push(value as u16);
        }
    }
    data
}

pub(crate) fn gradient_image(width: usize, height: usize) -> RawImage {
    let data = gradient_mosaic(width, height, CfaPattern::Rggb, u16::MAX);
    match RawImage::from_mosaic(width, height, data, CfaPattern::Rggb) {
        Ok(image) => image,
        Err(e) => panic!("fixture mosaic rejected: {e}"),
    }
}

/// Encodes a Gray16 TIFF, optionally with an ImageDescription tag.
pub(crate) fn mosaic_tiff(width: u32, height: u32, data: &[u16], description: Option<&str>) -> Vec<u8> {
    let mut buffer = Cursor::new(Vec::new());
    {
        let mut encoder = TiffEncoder::new(&mut buffer).unwrap();
        let mut image = encoder.new_image::<colortype::Gray16>(width, height).unwrap();
        if let Some(description) = description {
            image.encoder().write_tag(Tag::ImageDescription, description).unwrap();
        }
        image.write_data(data).unwrap();
    }
    buffer.into_inner()
}

/// Encodes an RGB8 TIFF, which is not a mosaic.
pub(crate) fn rgb_tiff(width: u32, height: u32) -> Vec<u8> {
    let data = vec![128u8; (width * height * 3) as usize];
    let mut buffer = Cursor::new(Vec::new());
    {
        let mut encoder = TiffEncoder::new(&mut buffer).unwrap();
        encoder.write_image::<colortype::RGB8>(width, height, &data).unwrap();
    }
    buffer.into_inner()
}
