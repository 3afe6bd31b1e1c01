//! Types for debayering operations

/// Linear RGB working image, interleaved f32 in [0, 1] before adjustments.
pub type LinearImage = image::Rgb32FImage;

/// Interpolation used to reconstruct full RGB from the mosaic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DemosaicMethod {
    /// Copies the nearest sample of each color.
    NearestNeighbour,
    /// Bilinear interpolation per channel.
    #[default]
    Linear,
    /// Bicubic interpolation per channel. Grids smaller than 4x4 are
    /// interpolated linearly instead.
    Cubic,
}

impl DemosaicMethod {
    pub fn to_bayer(self) -> bayer::Demosaic {
        match self {
            DemosaicMethod::NearestNeighbour => bayer::Demosaic::NearestNeighbour,
            DemosaicMethod::Linear => bayer::Demosaic::Linear,
            DemosaicMethod::Cubic => bayer::Demosaic::Cubic,
        }
    }
}
