//! Common utilities module
//!
//! This module contains shared error and geometry types used across the image pipeline.

pub mod error;
pub mod geometry;

pub use error::{PipelineError, Result};
pub use geometry::{Rect, Size};
