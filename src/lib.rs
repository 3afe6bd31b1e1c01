//! RAW photo adjustment and preview rendering engine.
//!
//! Decode a RAW file into a sensor mosaic, adjust exposure and white balance,
//! and render an aspect-correct preview sized for a viewport.

pub mod image_pipeline;
pub mod logger;
