#[cfg(test)]
mod tests {
    use std::io::Write;

    use crate::image_pipeline::color;
    use crate::image_pipeline::common::error::{PipelineError, Result};
    use crate::image_pipeline::raw::fixtures::{gradient_mosaic, mosaic_tiff, rgb_tiff};
    use crate::image_pipeline::raw::{CfaPattern, RawDecoder, RawImage, RawImageReader, TiffMosaicReader};

    struct MockReader {
        outcome: fn() -> Result<RawImage>,
    }

    impl RawImageReader for MockReader {
        fn read_raw(&self, _data: &[u8]) -> Result<RawImage> {
            (self.outcome)()
        }
    }

    fn mock_image() -> Result<RawImage> {
        RawImage::from_mosaic(4, 4, vec![0u16; 16], CfaPattern::Bggr)
    }

    fn mock_corrupt() -> Result<RawImage> {
        Err(PipelineError::CorruptData("Mock decode error".to_string()))
    }

    fn mock_unsupported() -> Result<RawImage> {
        Err(PipelineError::UnsupportedFormat("Mock layout".to_string()))
    }

    #[test]
    fn test_from_mosaic_rejects_incomplete_grid() {
        let result = RawImage::from_mosaic(10, 10, vec![0u16; 99], CfaPattern::Rggb);
        assert!(matches!(result, Err(PipelineError::CorruptData(_))));

        let result = RawImage::from_mosaic(1, 8, vec![0u16; 8], CfaPattern::Rggb);
        assert!(matches!(result, Err(PipelineError::CorruptData(_))));
    }

    #[test]
    fn test_levels_drive_bit_depth() {
        let image = RawImage::from_mosaic(2, 2, vec![0u16; 4], CfaPattern::Rggb)
            .unwrap()
            .with_levels(512, 16383)
            .unwrap();
        assert_eq!(image.bits_per_sample(), 14);
        assert_eq!(image.black_levels(), [512, 512, 512]);

        let inverted = RawImage::from_mosaic(2, 2, vec![0u16; 4], CfaPattern::Rggb)
            .unwrap()
            .with_levels(4095, 4095);
        assert!(matches!(inverted, Err(PipelineError::CorruptData(_))));
    }

    #[test]
    fn test_channel_black_levels_must_sit_below_white() {
        let image = RawImage::from_mosaic(2, 2, vec![0u16; 4], CfaPattern::Rggb)
            .unwrap()
            .with_channel_levels([510, 512, 514], 4095)
            .unwrap();
        assert_eq!(image.black_levels(), [510, 512, 514]);
        assert_eq!(image.bits_per_sample(), 12);

        let too_dark = RawImage::from_mosaic(2, 2, vec![0u16; 4], CfaPattern::Rggb)
            .unwrap()
            .with_channel_levels([0, 0, 4095], 4095);
        assert!(matches!(too_dark, Err(PipelineError::CorruptData(_))));
    }

    #[test]
    fn test_decode_tiff_mosaic_with_metadata() {
        let data = gradient_mosaic(8, 6, CfaPattern::Grbg, 4095);
        let bytes = mosaic_tiff(8, 6, &data, Some("cfa=GRBG temperature=5200 tint=6 black=64 white=4095"));

        let image = RawDecoder::new().decode(&bytes, Some("public.tiff")).unwrap();

        assert_eq!(image.width(), 8);
        assert_eq!(image.height(), 6);
        assert_eq!(image.cfa(), CfaPattern::Grbg);
        assert_eq!(image.bits_per_sample(), 12);
        assert_eq!(image.black_levels(), [64, 64, 64]);
        assert_eq!(image.neutral_temperature(), 5200.0);
        assert_eq!(image.neutral_tint(), 6.0);
        assert_eq!(image.as_shot_multipliers(), color::correction_gains(5200.0, 6.0));
        assert_eq!(image.data(), &data[..]);
    }

    #[test]
    fn test_decode_without_white_balance_uses_defaults() {
        let data = gradient_mosaic(4, 4, CfaPattern::Rggb, u16::MAX);
        let bytes = mosaic_tiff(4, 4, &data, None);

        let image = RawDecoder::new().decode(&bytes, None).unwrap();

        assert_eq!(image.neutral_temperature(), 6500.0);
        assert_eq!(image.neutral_tint(), 0.0);
        assert_eq!(image.as_shot_multipliers(), [1.0, 1.0, 1.0]);
        assert_eq!(image.cfa(), CfaPattern::Rggb);
        assert_eq!(image.bits_per_sample(), 16);
    }

    #[test]
    fn test_tint_without_temperature_uses_defaults() {
        let data = gradient_mosaic(4, 4, CfaPattern::Rggb, u16::MAX);
        let bytes = mosaic_tiff(4, 4, &data, Some("cfa=RGGB tint=12"));

        let image = RawDecoder::new().decode(&bytes, Some("tiff")).unwrap();

        assert_eq!(image.neutral_temperature(), color::DEFAULT_NEUTRAL_TEMPERATURE);
        assert_eq!(image.neutral_tint(), color::DEFAULT_NEUTRAL_TINT);
        assert_eq!(image.as_shot_multipliers(), [1.0, 1.0, 1.0]);
    }

    #[test]
    fn test_truncated_tiff_is_corrupt() {
        let data = gradient_mosaic(32, 32, CfaPattern::Rggb, u16::MAX);
        let bytes = mosaic_tiff(32, 32, &data, None);

        for len in [4, 16, bytes.len() / 2, bytes.len() - 8] {
            let result = RawDecoder::new().decode(&bytes[..len], Some("tiff"));
            assert!(
                matches!(result, Err(PipelineError::CorruptData(_))),
                "truncated to {len} bytes: {result:?}"
            );
        }
    }

    #[test]
    fn test_empty_input_is_corrupt() {
        let result = RawDecoder::new().decode(&[], Some("arw"));
        assert!(matches!(result, Err(PipelineError::CorruptData(_))));
    }

    #[test]
    fn test_unknown_hint_is_unsupported() {
        let data = gradient_mosaic(4, 4, CfaPattern::Rggb, u16::MAX);
        let bytes = mosaic_tiff(4, 4, &data, None);

        let result = RawDecoder::new().decode(&bytes, Some("public.jpeg"));
        assert!(matches!(result, Err(PipelineError::UnsupportedFormat(_))));
    }

    #[test]
    fn test_unrecognized_content_is_unsupported() {
        let result = RawDecoder::new().decode(b"\xff\xd8\xff\xe0 jpeg bytes", None);
        assert!(matches!(result, Err(PipelineError::UnsupportedFormat(_))));
    }

    #[test]
    fn test_camera_hint_with_garbage_is_corrupt() {
        let result = RawDecoder::new().decode(b"definitely not a raw file", Some("com.sony.arw-raw-image"));
        assert!(matches!(result, Err(PipelineError::CorruptData(_))));
    }

    #[test]
    fn test_rgb_tiff_is_unsupported() {
        let bytes = rgb_tiff(4, 4);
        let result = RawDecoder::new().decode(&bytes, Some("tif"));
        assert!(matches!(result, Err(PipelineError::UnsupportedFormat(_))));
    }

    #[test]
    fn test_tiff_container_falls_back_to_camera_reader() {
        let decoder = RawDecoder::with_custom(
            MockReader { outcome: mock_image },
            MockReader { outcome: mock_unsupported },
        );
        let image = decoder.decode(b"II*\0\x08\0\0\0", None).unwrap();
        assert_eq!(image.cfa(), CfaPattern::Bggr);
    }

    #[test]
    fn test_tiff_container_rejected_by_both_readers_is_unsupported() {
        let decoder = RawDecoder::with_custom(
            MockReader { outcome: mock_corrupt },
            MockReader { outcome: mock_unsupported },
        );
        let result = decoder.decode(b"II*\0\x08\0\0\0", None);
        assert!(matches!(result, Err(PipelineError::UnsupportedFormat(_))));
    }

    #[test]
    fn test_corrupt_mosaic_does_not_fall_back() {
        let decoder = RawDecoder::with_custom(
            MockReader { outcome: mock_image },
            MockReader { outcome: mock_corrupt },
        );
        let result = decoder.decode(b"MM\0*\0\0\0\x08", None);
        assert!(matches!(result, Err(PipelineError::CorruptData(_))));
    }

    #[test]
    fn test_camera_magic_routes_to_camera_reader() {
        let decoder = RawDecoder::with_custom(
            MockReader { outcome: mock_image },
            TiffMosaicReader,
        );
        let image = decoder.decode(b"FUJIFILMCCD-RAW 0201", None).unwrap();
        assert_eq!(image.width(), 4);
    }

    #[test]
    fn test_decode_file_uses_extension() {
        let data = gradient_mosaic(6, 4, CfaPattern::Rggb, u16::MAX);
        let bytes = mosaic_tiff(6, 4, &data, Some("temperature=3200"));

        let mut file = tempfile::Builder::new().suffix(".tiff").tempfile().unwrap();
        file.write_all(&bytes).unwrap();

        let image = RawDecoder::new().decode_file(file.path()).unwrap();
        assert_eq!(image.native_size().width, 6.0);
        assert_eq!(image.neutral_temperature(), 3200.0);
    }

    #[test]
    fn test_decode_file_missing_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let result = RawDecoder::new().decode_file(dir.path().join("missing.arw"));
        assert!(matches!(result, Err(PipelineError::IoError(_))));
    }

    #[tokio::test]
    async fn test_decode_async() {
        let data = gradient_mosaic(8, 8, CfaPattern::Rggb, u16::MAX);
        let bytes = mosaic_tiff(8, 8, &data, None);

        let image = RawDecoder::new()
            .decode_async(bytes, Some("tiff".to_string()))
            .await
            .unwrap();
        assert_eq!(image.width(), 8);

        let result = RawDecoder::new().decode_async(Vec::new(), None).await;
        assert!(matches!(result, Err(PipelineError::CorruptData(_))));
    }
}
