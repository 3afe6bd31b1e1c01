//! Editable rendering parameters for one viewing session.

use tracing::debug;

use crate::image_pipeline::common::error::{PipelineError, Result};
use crate::image_pipeline::raw::RawImage;

/// Snapshot of the parameters a render is driven by.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AdjustmentParameters {
    /// Exposure bias in stops; linear values are multiplied by `2^exposure`.
    pub exposure: f32,
    /// Neutral temperature in Kelvin.
    pub temperature: f32,
    /// Neutral tint; positive is toward magenta.
    pub tint: f32,
    /// Output scale relative to the native size, set from the viewport mapping.
    pub scale_factor: f64,
}

impl AdjustmentParameters {
    pub fn validate(&self) -> Result<()> {
        let finite = self.exposure.is_finite() && self.temperature.is_finite() && self.tint.is_finite();
        if !finite {
            return Err(PipelineError::InvalidParameters(format!("non-finite adjustment in {self:?}")));
        }
        check_scale(self.scale_factor)
    }
}

fn check_finite(name: &str, value: f32) -> Result<()> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(PipelineError::InvalidParameters(format!("{name} must be finite, got {value}")))
    }
}

fn check_scale(scale: f64) -> Result<()> {
    if scale.is_finite() && scale > 0.0 {
        Ok(())
    } else {
        Err(PipelineError::InvalidParameters(format!("scale factor must be positive, got {scale}")))
    }
}

/// Current adjustments plus the defaults captured when the session began.
///
/// Values are passed through unclamped; range limits belong to the UI. Not
/// synchronized: callers serialize access.
#[derive(Debug, Clone)]
pub struct AdjustmentState {
    current: AdjustmentParameters,
    defaults: AdjustmentParameters,
}

impl AdjustmentState {
    pub fn new(neutral_temperature: f32, neutral_tint: f32) -> Self {
        let defaults = AdjustmentParameters {
            exposure: 0.0,
            temperature: neutral_temperature,
            tint: neutral_tint,
            scale_factor: 1.0,
        };
        Self { current: defaults, defaults }
    }

    /// Defaults copied from the image's embedded white balance.
    pub fn for_image(image: &RawImage) -> Self {
        Self::new(image.neutral_temperature(), image.neutral_tint())
    }

    pub fn set_exposure(&mut self, value: f32) -> Result<()> {
        check_finite("exposure", value)?;
        self.current.exposure = value;
        Ok(())
    }

    pub fn set_temperature(&mut self, value: f32) -> Result<()> {
        check_finite("temperature", value)?;
        self.current.temperature = value;
        Ok(())
    }

    pub fn set_tint(&mut self, value: f32) -> Result<()> {
        check_finite("tint", value)?;
        self.current.tint = value;
        Ok(())
    }

    /// Records the scale computed by the viewport mapper.
    pub fn set_scale_factor(&mut self, value: f64) -> Result<()> {
        check_scale(value)?;
        self.current.scale_factor = value;
        Ok(())
    }

    /// Restores exposure, temperature and tint. The scale factor belongs to
    /// the viewport and is kept.
    pub fn reset(&mut self) {
        debug!("Resetting adjustments to {:?}", self.defaults);
        self.current = AdjustmentParameters {
            scale_factor: self.current.scale_factor,
            ..self.defaults
        };
    }

    pub fn get(&self) -> AdjustmentParameters {
        self.current
    }

    pub fn defaults(&self) -> AdjustmentParameters {
        self.defaults
    }

    pub fn is_modified(&self) -> bool {
        self.current.exposure != self.defaults.exposure
            || self.current.temperature != self.defaults.temperature
            || self.current.tint != self.defaults.tint
    }
}
