use tracing::{debug, info, info_span, instrument, warn};

use crate::image_pipeline::{
    color,
    common::error::{PipelineError, Result},
    common::geometry::Size,
    adjustments::AdjustmentParameters,
    debayer::{CpuDebayer, Demosaicer, LinearImage},
    raw::RawImage,
    render::stages,
    render::timing::{PipelineTimings, Timer},
    render::types::{RenderConfig, RenderWarning, RenderedFrame},
};

/// Bumped whenever a stage changes in a way that alters output pixels.
pub const PIPELINE_VERSION: u32 = 1;

/// Turns a decoded mosaic plus adjustments into a display-ready frame.
///
/// Stages run in a fixed order: normalize, demosaic, white balance, exposure,
/// resample and encode. Nothing is cached between calls.
pub struct RenderPipeline<D: Demosaicer = CpuDebayer> {
    debayer: D,
    config: RenderConfig,
}

impl RenderPipeline<CpuDebayer> {
    pub fn new(config: RenderConfig) -> Self {
        Self {
            debayer: CpuDebayer::new(),
            config,
        }
    }
}

impl<D: Demosaicer> RenderPipeline<D> {
    pub fn with_custom(debayer: D, config: RenderConfig) -> Self {
        Self { debayer, config }
    }

    fn validate_output(&self, width: u32, height: u32) -> Result<()> {
        if !self.config.validate_dimensions {
            return Ok(());
        }

        if let Some(max) = self.config.max_dimension {
            if width as usize > max || height as usize > max {
                warn!("Output dimensions {}x{} exceed maximum {}", width, height, max);
                return Err(PipelineError::InvalidDimensions(width as f64, height as f64));
            }
        }

        Ok(())
    }

    /// Normalizes and demosaics `raw` with no adjustments applied.
    pub fn develop(&self, raw: &RawImage) -> Result<LinearImage> {
        let normalized = stages::normalize(raw);
        self.debayer.demosaic(
            &normalized,
            raw.width(),
            raw.height(),
            raw.cfa(),
            self.config.demosaic,
        )
    }

    /// Renders `raw` with `params`, bounded by `output_size` device pixels.
    #[instrument(skip(self, raw), fields(width = raw.width(), height = raw.height()))]
    pub fn render(
        &self,
        raw: &RawImage,
        params: &AdjustmentParameters,
        output_size: Size,
    ) -> Result<RenderedFrame> {
        self.render_with_timings(raw, params, output_size)
            .map(|(frame, _)| frame)
    }

    pub fn render_with_timings(
        &self,
        raw: &RawImage,
        params: &AdjustmentParameters,
        output_size: Size,
    ) -> Result<(RenderedFrame, PipelineTimings)> {
        params.validate()?;
        if !output_size.is_positive() {
            return Err(PipelineError::InvalidParameters(format!(
                "output size must be positive, got {}x{}",
                output_size.width, output_size.height
            )));
        }

        let (width, height) = stages::target_size(raw.native_size(), params.scale_factor, output_size);
        self.validate_output(width, height)?;

        let mut warnings = Vec::new();
        if !color::is_plausible_temperature(params.temperature) {
            warn!(
                temperature = params.temperature,
                "Temperature outside {}-{} K, rendering at the nearest bound",
                color::MIN_KELVIN,
                color::MAX_KELVIN
            );
            warnings.push(RenderWarning::TemperatureOutOfRange(params.temperature));
        }

        let mut timings = PipelineTimings::new();
        debug!(width, height, ?params, "Starting render");

        let timer = Timer::start("normalize");
        let normalized = {
            let _span = info_span!("normalize").entered();
            stages::normalize(raw)
        };
        timings.record(timer);

        let timer = Timer::start("demosaic");
        let mut image = {
            let _span = info_span!("demosaic", method = ?self.config.demosaic).entered();
            self.debayer.demosaic(
                &normalized,
                raw.width(),
                raw.height(),
                raw.cfa(),
                self.config.demosaic,
            )?
        };
        drop(normalized);
        timings.record(timer);

        let timer = Timer::start("white_balance");
        {
            let gains = color::relative_gains(
                params.temperature,
                params.tint,
                raw.neutral_temperature(),
                raw.neutral_tint(),
            );
            let _span = info_span!("white_balance", ?gains).entered();
            stages::white_balance(&mut image, gains);
        }
        timings.record(timer);

        let timer = Timer::start("exposure");
        {
            let _span = info_span!("exposure", stops = params.exposure).entered();
            stages::exposure(&mut image, params.exposure);
        }
        timings.record(timer);

        let timer = Timer::start("resample");
        let image = {
            let _span = info_span!("resample", width, height).entered();
            stages::resample(image, width, height, self.config.resample)
        };
        timings.record(timer);

        let timer = Timer::start("encode");
        let pixels = {
            let _span = info_span!("encode").entered();
            stages::encode(&image)
        };
        timings.record(timer);

        if pixels.len() != width as usize * height as usize * RenderedFrame::BYTES_PER_PIXEL {
            return Err(PipelineError::Render(format!(
                "encoded {} bytes for a {}x{} frame",
                pixels.len(),
                width,
                height
            )));
        }

        timings.log_summary();
        info!(
            "Render complete: {}x{} in {:.3}ms",
            width,
            height,
            timings.total_duration().as_secs_f64() * 1000.0
        );

        let frame = RenderedFrame {
            width: width as usize,
            height: height as usize,
            pixels,
            warnings,
        };
        Ok((frame, timings))
    }

    pub fn config(&self) -> &RenderConfig {
        &self.config
    }

    pub fn set_config(&mut self, config: RenderConfig) {
        self.config = config;
    }
}
