//! Fit-to-viewport geometry.
//!
//! The image is scaled uniformly so it fits entirely inside the viewport and
//! is centered on both axes. Nothing is cropped.

use tracing::debug;

use crate::image_pipeline::common::error::{PipelineError, Result};
use crate::image_pipeline::common::geometry::{Rect, Size};

/// Drawing area supplied by the caller for each render request.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    /// Size in points.
    pub size: Size,
    /// Device pixels per point.
    pub device_scale: f64,
}

impl Viewport {
    pub const fn new(size: Size, device_scale: f64) -> Self {
        Self { size, device_scale }
    }

    /// Size in device pixels.
    pub fn pixel_size(&self) -> Size {
        self.size.scaled(self.device_scale)
    }
}

/// Scale to render at and where the result lands in the viewport.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DisplayMapping {
    pub scale: f64,
    pub rect: Rect,
}

pub struct ViewportMapper;

impl ViewportMapper {
    /// Computes the fit scale and the centered destination rectangle for an
    /// image of `native` size drawn into `viewport`.
    pub fn compute_display_rect(native: Size, viewport: Size) -> Result<DisplayMapping> {
        if !native.is_positive() {
            return Err(PipelineError::InvalidDimensions(native.width, native.height));
        }
        if !viewport.is_positive() {
            return Err(PipelineError::InvalidDimensions(viewport.width, viewport.height));
        }

        let scale = (viewport.width / native.width).min(viewport.height / native.height);
        let dest = native.scaled(scale);
        let rect = Rect::new(
            (viewport.width - dest.width) / 2.0,
            (viewport.height - dest.height) / 2.0,
            dest.width,
            dest.height,
        );

        debug!(scale, ?rect, "Mapped {:?} into {:?}", native, viewport);
        Ok(DisplayMapping { scale, rect })
    }

    /// Same as [`Self::compute_display_rect`] in device pixels, after applying
    /// the viewport's device scale. Recompute on every resize or rotation.
    pub fn map_viewport(native: Size, viewport: &Viewport) -> Result<DisplayMapping> {
        if !(viewport.device_scale.is_finite() && viewport.device_scale > 0.0) {
            return Err(PipelineError::InvalidParameters(format!(
                "device scale must be positive, got {}",
                viewport.device_scale
            )));
        }
        Self::compute_display_rect(native, viewport.pixel_size())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPSILON: f64 = 1e-9;

    fn assert_close(actual: f64, expected: f64) {
        assert!((actual - expected).abs() < EPSILON, "{actual} != {expected}");
    }

    fn assert_rect(actual: Rect, expected: Rect) {
        assert_close(actual.x, expected.x);
        assert_close(actual.y, expected.y);
        assert_close(actual.width, expected.width);
        assert_close(actual.height, expected.height);
    }

    #[test]
    fn test_exact_fit() {
        let mapping = ViewportMapper::compute_display_rect(Size::new(4000.0, 3000.0), Size::new(400.0, 300.0)).unwrap();
        assert_close(mapping.scale, 0.1);
        assert_rect(mapping.rect, Rect::new(0.0, 0.0, 400.0, 300.0));
    }

    #[test]
    fn test_letterbox_is_centered_vertically() {
        let mapping = ViewportMapper::compute_display_rect(Size::new(4000.0, 3000.0), Size::new(400.0, 400.0)).unwrap();
        assert_close(mapping.scale, 0.1);
        assert_rect(mapping.rect, Rect::new(0.0, 50.0, 400.0, 300.0));
    }

    #[test]
    fn test_pillarbox_is_centered_horizontally() {
        let mapping = ViewportMapper::compute_display_rect(Size::new(3000.0, 4000.0), Size::new(800.0, 400.0)).unwrap();
        assert_close(mapping.scale, 0.1);
        assert_rect(mapping.rect, Rect::new(250.0, 0.0, 300.0, 400.0));
    }

    #[test]
    fn test_small_image_is_enlarged_to_fit() {
        let mapping = ViewportMapper::compute_display_rect(Size::new(100.0, 50.0), Size::new(1000.0, 1000.0)).unwrap();
        assert_close(mapping.scale, 10.0);
        assert_rect(mapping.rect, Rect::new(0.0, 250.0, 1000.0, 500.0));
    }

    #[test]
    fn test_fit_properties_hold_across_sizes() {
        let natives = [(4000.0, 3000.0), (6000.0, 4000.0), (3024.0, 4032.0), (17.0, 5.0), (1.0, 1.0)];
        let viewports = [(400.0, 300.0), (375.0, 667.0), (1024.5, 768.25), (3.0, 2000.0), (0.5, 0.5)];

        for (nw, nh) in natives {
            for (vw, vh) in viewports {
                let native = Size::new(nw, nh);
                let viewport = Size::new(vw, vh);
                let DisplayMapping { scale, rect } = ViewportMapper::compute_display_rect(native, viewport).unwrap();

                assert!(scale > 0.0);
                let aspect_error = (rect.width / rect.height - native.aspect_ratio()).abs();
                assert!(aspect_error < 1e-9 * native.aspect_ratio().max(1.0), "aspect drift for {native:?} in {viewport:?}");
                assert!(rect.width <= vw * (1.0 + 1e-12));
                assert!(rect.height <= vh * (1.0 + 1e-12));
                assert_close(rect.x, (vw - rect.width) / 2.0);
                assert_close(rect.y, (vh - rect.height) / 2.0);
                assert!(rect.x >= -EPSILON && rect.y >= -EPSILON);
            }
        }
    }

    #[test]
    fn test_invalid_dimensions() {
        let ok = Size::new(100.0, 100.0);
        for bad in [Size::new(0.0, 10.0), Size::new(10.0, -1.0), Size::new(f64::NAN, 10.0)] {
            assert!(matches!(
                ViewportMapper::compute_display_rect(bad, ok),
                Err(PipelineError::InvalidDimensions(_, _))
            ));
            assert!(matches!(
                ViewportMapper::compute_display_rect(ok, bad),
                Err(PipelineError::InvalidDimensions(_, _))
            ));
        }
    }

    #[test]
    fn test_device_scale_applies_before_fit() {
        let viewport = Viewport::new(Size::new(200.0, 200.0), 2.0);
        let mapping = ViewportMapper::map_viewport(Size::new(4000.0, 3000.0), &viewport).unwrap();
        assert_close(mapping.scale, 0.1);
        assert_rect(mapping.rect, Rect::new(0.0, 50.0, 400.0, 300.0));

        let broken = Viewport::new(Size::new(200.0, 200.0), 0.0);
        assert!(ViewportMapper::map_viewport(Size::new(4000.0, 3000.0), &broken).is_err());
    }
}
