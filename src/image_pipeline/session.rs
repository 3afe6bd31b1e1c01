//! One open image and the state needed to redraw it.

use std::sync::atomic::{AtomicU64, Ordering};

use tracing::{debug, instrument};

use crate::image_pipeline::{
    adjustments::AdjustmentState,
    common::error::Result,
    common::geometry::Rect,
    debayer::{CpuDebayer, Demosaicer},
    raw::{RawDecoder, RawImage},
    render::{RenderConfig, RenderPipeline, RenderedFrame},
    viewport::{Viewport, ViewportMapper},
};

/// A rendered frame and where to composite it in the viewport, in device pixels.
#[derive(Debug, Clone, PartialEq)]
pub struct PreviewDraw {
    pub frame: RenderedFrame,
    pub rect: Rect,
    pub scale: f64,
}

/// Owns a decoded image, its adjustments and a render pipeline.
///
/// Requests are served one at a time; wrap the session in a mutex or keep it
/// on one task if several callers share it.
pub struct ViewingSession<D: Demosaicer = CpuDebayer> {
    image: RawImage,
    state: AdjustmentState,
    pipeline: RenderPipeline<D>,
}

impl ViewingSession<CpuDebayer> {
    pub fn new(image: RawImage, config: RenderConfig) -> Self {
        Self::with_pipeline(image, RenderPipeline::new(config))
    }

    /// Decodes `data` and starts a session with the image's default adjustments.
    pub fn open(data: &[u8], format_hint: Option<&str>, config: RenderConfig) -> Result<Self> {
        let image = RawDecoder::new().decode(data, format_hint)?;
        Ok(Self::new(image, config))
    }

    /// Like [`Self::open`], decoding on the tokio blocking pool.
    pub async fn open_async(
        data: Vec<u8>,
        format_hint: Option<String>,
        config: RenderConfig,
    ) -> Result<Self> {
        let image = RawDecoder::new().decode_async(data, format_hint).await?;
        Ok(Self::new(image, config))
    }
}

impl<D: Demosaicer> ViewingSession<D> {
    pub fn with_pipeline(image: RawImage, pipeline: RenderPipeline<D>) -> Self {
        let state = AdjustmentState::for_image(&image);
        Self { image, state, pipeline }
    }

    pub fn image(&self) -> &RawImage {
        &self.image
    }

    pub fn adjustments(&self) -> &AdjustmentState {
        &self.state
    }

    pub fn adjustments_mut(&mut self) -> &mut AdjustmentState {
        &mut self.state
    }

    pub fn pipeline(&self) -> &RenderPipeline<D> {
        &self.pipeline
    }

    /// Fits the image into `viewport`, stores the fit scale and renders at it.
    #[instrument(skip(self))]
    pub fn draw(&mut self, viewport: &Viewport) -> Result<PreviewDraw> {
        let mapping = ViewportMapper::map_viewport(self.image.native_size(), viewport)?;
        self.state.set_scale_factor(mapping.scale)?;

        let frame = self
            .pipeline
            .render(&self.image, &self.state.get(), viewport.pixel_size())?;

        debug!(
            scale = mapping.scale,
            width = frame.width,
            height = frame.height,
            "Preview ready"
        );
        Ok(PreviewDraw {
            frame,
            rect: mapping.rect,
            scale: mapping.scale,
        })
    }
}

/// Monotonic ticket counter for discarding stale render results.
///
/// Take a ticket before starting a request and drop the result if the ticket
/// is no longer current when it arrives. In-flight work is never cancelled.
#[derive(Debug, Default)]
pub struct RequestSequence {
    latest: AtomicU64,
}

impl RequestSequence {
    pub fn new() -> Self {
        Self::default()
    }

    /// Issues a ticket newer than every ticket issued before it.
    pub fn next(&self) -> u64 {
        self.latest.fetch_add(1, Ordering::AcqRel) + 1
    }

    pub fn is_current(&self, ticket: u64) -> bool {
        self.latest.load(Ordering::Acquire) == ticket
    }
}
