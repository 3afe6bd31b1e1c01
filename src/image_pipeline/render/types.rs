//! Render configuration and output types

use image::imageops::FilterType;

use crate::image_pipeline::debayer::DemosaicMethod;

/// Filter used when resampling to the output size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ResampleFilter {
    Nearest,
    /// Bilinear (tent) filter
    #[default]
    Triangle,
    CatmullRom,
    Lanczos3,
}

impl ResampleFilter {
    pub fn to_filter_type(self) -> FilterType {
        match self {
            ResampleFilter::Nearest => FilterType::Nearest,
            ResampleFilter::Triangle => FilterType::Triangle,
            ResampleFilter::CatmullRom => FilterType::CatmullRom,
            ResampleFilter::Lanczos3 => FilterType::Lanczos3,
        }
    }
}

/// Configuration for preview rendering
#[derive(Debug, Clone)]
pub struct RenderConfig {
    /// Demosaic interpolation used by the default CPU debayer
    pub demosaic: DemosaicMethod,
    /// Filter used when the output size differs from the native size
    pub resample: ResampleFilter,
    /// Whether to validate output dimensions before rendering
    pub validate_dimensions: bool,
    /// Largest allowed output width or height
    pub max_dimension: Option<usize>,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            demosaic: DemosaicMethod::Linear,
            resample: ResampleFilter::Triangle,
            validate_dimensions: true,
            max_dimension: Some(50000),
        }
    }
}

impl RenderConfig {
    pub fn builder() -> RenderConfigBuilder {
        RenderConfigBuilder::default()
    }
}

/// Builder for RenderConfig
#[derive(Default)]
pub struct RenderConfigBuilder {
    demosaic: Option<DemosaicMethod>,
    resample: Option<ResampleFilter>,
    validate_dimensions: Option<bool>,
    max_dimension: Option<Option<usize>>,
}

impl RenderConfigBuilder {
    pub fn demosaic(mut self, method: DemosaicMethod) -> Self {
        self.demosaic = Some(method);
        self
    }
    
    pub fn resample(mut self, filter: ResampleFilter) -> Self {
        self.resample = Some(filter);
        self
    }
    
    pub fn validate_dimensions(mut self, validate: bool) -> Self {
        self.validate_dimensions = Some(validate);
        self
    }
    
    pub fn max_dimension(mut self, max: Option<usize>) -> Self {
        self.max_dimension = Some(max);
        self
    }
    
    pub fn build(self) -> RenderConfig {
        let default = RenderConfig::default();
        RenderConfig {
            demosaic: self.demosaic.unwrap_or(default.demosaic),
            resample: self.resample.unwrap_or(default.resample),
            validate_dimensions: self.validate_dimensions.unwrap_or(default.validate_dimensions),
            max_dimension: self.max_dimension.unwrap_or(default.max_dimension),
        }
    }
}

/// Non-fatal conditions noticed while rendering.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RenderWarning {
    /// Temperature outside the white balance curve; rendered at the nearest bound.
    TemperatureOutOfRange(f32),
}

/// Display-ready raster: interleaved 8-bit sRGB, row-major, 3 bytes per pixel.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderedFrame {
    pub width: usize,
    pub height: usize,
    pub pixels: Vec<u8>,
    pub warnings: Vec<RenderWarning>,
}

impl RenderedFrame {
    pub const BYTES_PER_PIXEL: usize = 3;

    /// RGB of the pixel at (`x`, `y`), if inside the frame.
    pub fn pixel(&self, x: usize, y: usize) -> Option<[u8; 3]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let i = (y * self.width + x) * Self::BYTES_PER_PIXEL;
        Some([self.pixels[i], self.pixels[i + 1], self.pixels[i + 2]])
    }
}
