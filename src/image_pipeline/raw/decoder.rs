use std::path::Path;

use tracing::{debug, info, instrument};

use crate::image_pipeline::common::error::{PipelineError, Result};
use crate::image_pipeline::raw::format::RawFormat;
use crate::image_pipeline::raw::reader::RawImageReader;
use crate::image_pipeline::raw::rawloader_reader::RawLoaderReader;
use crate::image_pipeline::raw::tiff_reader::TiffMosaicReader;
use crate::image_pipeline::raw::types::RawImage;

/// Picks a reader for a byte stream and decodes it into a [`RawImage`].
#[derive(Debug, Clone, Copy, Default)]
pub struct RawDecoder<C: RawImageReader = RawLoaderReader, M: RawImageReader = TiffMosaicReader> {
    camera: C,
    mosaic: M,
}

impl RawDecoder {
    pub fn new() -> Self {
        Self::default()
    }
}

impl<C: RawImageReader, M: RawImageReader> RawDecoder<C, M> {
    pub fn with_custom(camera: C, mosaic: M) -> Self {
        Self { camera, mosaic }
    }

    /// Decodes `data`, using `format_hint` (extension, UTI or MIME type) to
    /// select the decode path and sniffing the content when there is none.
    ///
    /// Fails with `UnsupportedFormat` when neither hint nor content names a
    /// supported RAW encoding, and `CorruptData` when the selected path cannot
    /// extract a complete sensor grid.
    #[instrument(skip(self, data), fields(input_size = data.len()))]
    pub fn decode(&self, data: &[u8], format_hint: Option<&str>) -> Result<RawImage> {
        if data.is_empty() {
            return Err(PipelineError::CorruptData("empty input".to_string()));
        }

        let format = match format_hint {
            Some(hint) => RawFormat::from_hint(hint)
                .ok_or_else(|| PipelineError::UnsupportedFormat(format!("format hint {hint:?}")))?,
            None => RawFormat::sniff(data).ok_or_else(|| {
                PipelineError::UnsupportedFormat("content is not a recognized RAW encoding".to_string())
            })?,
        };
        debug!(?format, "Selected decode path");

        let image = {
            let _span = tracing::info_span!("read_raw", ?format).entered();
            match format {
                RawFormat::Camera => self.camera.read_raw(data)?,
                RawFormat::TiffMosaic => self.mosaic.read_raw(data)?,
                RawFormat::TiffContainer => self.decode_tiff_container(data)?,
            }
        };

        info!(
            width = image.width(),
            height = image.height(),
            bits = image.bits_per_sample(),
            cfa = %image.cfa(),
            temperature = image.neutral_temperature(),
            tint = image.neutral_tint(),
            "RAW decoded"
        );
        Ok(image)
    }

    /// A plain mosaic is tried first; TIFF-based vendor files (DNG, NEF,
    /// ARW, ...) are rejected by it as unsupported and go to the camera reader.
    fn decode_tiff_container(&self, data: &[u8]) -> Result<RawImage> {
        match self.mosaic.read_raw(data) {
            Err(PipelineError::UnsupportedFormat(reason)) => {
                debug!("Not a TIFF mosaic ({}), trying camera reader", reason);
                self.camera.read_raw(data).map_err(|e| match e {
                    PipelineError::CorruptData(camera) => PipelineError::UnsupportedFormat(format!(
                        "TIFF is neither a mosaic ({reason}) nor a camera RAW ({camera})"
                    )),
                    other => other,
                })
            }
            other => other,
        }
    }

    /// Reads and decodes a file, using its extension as the format hint.
    #[instrument(skip(self, path))]
    pub fn decode_file<P: AsRef<Path>>(&self, path: P) -> Result<RawImage> {
        let path = path.as_ref();
        info!(input = %path.display(), "Decoding file");

        let data = {
            let _span = tracing::info_span!("read_input_file").entered();
            std::fs::read(path)?
        };
        let hint = path.extension().and_then(|e| e.to_str());

        self.decode(&data, hint)
    }
}

impl<C, M> RawDecoder<C, M>
where
    C: RawImageReader + Clone + Send + 'static,
    M: RawImageReader + Clone + Send + 'static,
{
    /// Decodes on the tokio blocking pool so the caller's thread stays free
    /// for adjustment input. Must be awaited inside a tokio runtime.
    pub async fn decode_async(&self, data: Vec<u8>, format_hint: Option<String>) -> Result<RawImage> {
        let decoder = self.clone();
        tokio::task::spawn_blocking(move || decoder.decode(&data, format_hint.as_deref()))
            .await
            .map_err(|e| PipelineError::TaskFailed(e.to_string()))?
    }
}
