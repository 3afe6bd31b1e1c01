//! Decode path selection from a caller hint or the leading bytes.

/// List of camera RAW file extensions routed to the camera reader
pub const CAMERA_RAW_EXTENSIONS: &[&str] = &[
    "arw", "cr2", "cr3", "crw", "nef", "nrw", "raf", "rw2", "orf", "pef", "dng", "3fr", "fff",
    "iiq", "rwl", "srw", "mrw", "x3f", "raw",
];

const TIFF_HINTS: &[&str] = &["tif", "tiff", "public.tiff", "image/tiff"];

/// Which reader a RAW byte stream is handed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RawFormat {
    /// Vendor RAW file decoded by rawloader.
    Camera,
    /// Single-channel TIFF holding a Bayer mosaic.
    TiffMosaic,
    /// TIFF container whose content decides between the two readers.
    TiffContainer,
}

impl RawFormat {
    /// Resolves a file extension, UTI or MIME type. Returns `None` for hints
    /// that do not name a RAW encoding.
    pub fn from_hint(hint: &str) -> Option<Self> {
        let hint = hint.trim().trim_start_matches('.').to_ascii_lowercase();

        if TIFF_HINTS.contains(&hint.as_str()) {
            return Some(RawFormat::TiffMosaic);
        }
        if CAMERA_RAW_EXTENSIONS.contains(&hint.as_str()) || hint.ends_with("raw-image") {
            return Some(RawFormat::Camera);
        }
        if let Some(subtype) = hint.strip_prefix("image/x-") {
            // e.g. image/x-sony-arw, image/x-nikon-nef
            let ext = subtype.rsplit('-').next().unwrap_or(subtype);
            if CAMERA_RAW_EXTENSIONS.contains(&ext) {
                return Some(RawFormat::Camera);
            }
        }
        None
    }

    /// Recognizes the format from magic bytes.
    pub fn sniff(data: &[u8]) -> Option<Self> {
        const CAMERA_MAGICS: &[(usize, &[u8])] = &[
            (0, b"FUJIFILM"),
            (0, b"IIRO"),
            (0, b"IIRS"),
            (0, b"MMOR"),
            (0, b"IIU\0"),
            (0, b"\0MRM"),
            (0, b"FOVb"),
            (4, b"ftypcrx"),
            (6, b"HEAPCCDR"),
        ];

        let matches_at = |offset: usize, magic: &[u8]| {
            data.get(offset..offset + magic.len()) == Some(magic)
        };

        if CAMERA_MAGICS.iter().any(|(offset, magic)| matches_at(*offset, magic)) {
            return Some(RawFormat::Camera);
        }
        if matches_at(0, b"II*\0") || matches_at(0, b"MM\0*") {
            return Some(RawFormat::TiffContainer);
        }
        None
    }
}
