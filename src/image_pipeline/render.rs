//! Preview rendering module
//!
//! Develops a [`RawImage`](crate::image_pipeline::RawImage) through a fixed
//! sequence of pure stages: normalize → demosaic → white balance → exposure →
//! resample → display encode.

mod types;
mod pipeline;
mod timing;
pub(crate) mod stages;


pub use types::{RenderConfig, RenderConfigBuilder, RenderedFrame, RenderWarning, ResampleFilter};
pub use pipeline::{RenderPipeline, PIPELINE_VERSION};
pub use timing::{PipelineTimings, StepTiming, Timer};
