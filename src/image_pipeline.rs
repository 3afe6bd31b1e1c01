//! Image processing pipeline module
//!
//! Decoding lives in [`raw`], demosaicing in [`debayer`] and the stage chain
//! in [`render`]. [`session`] ties an image, its adjustments and a pipeline
//! together for callers that redraw into a viewport.

pub mod common;
pub mod color;
pub mod raw;
pub mod debayer;
pub mod adjustments;
pub mod viewport;
pub mod render;
pub mod session;

pub use common::{
    PipelineError,
    Rect,
    Result,
    Size,
};

pub use raw::{
    CfaPattern,
    RawDecoder,
    RawFormat,
    RawImage,
    RawImageReader,
};

pub use adjustments::{AdjustmentParameters, AdjustmentState};
pub use viewport::{DisplayMapping, Viewport, ViewportMapper};

pub use debayer::{CpuDebayer, DemosaicMethod, Demosaicer};

pub use render::{
    PipelineTimings,
    RenderConfig,
    RenderConfigBuilder,
    RenderPipeline,
    RenderWarning,
    RenderedFrame,
    ResampleFilter,
    PIPELINE_VERSION,
};

pub use session::{PreviewDraw, RequestSequence, ViewingSession};

/// Decodes `data` with the default readers.
pub fn decode(data: &[u8], format_hint: Option<&str>) -> Result<RawImage> {
    RawDecoder::new().decode(data, format_hint)
}
