use std::fmt;

/// Image types accepted for analysis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ImageMime {
    Jpeg,
    Png,
}

impl ImageMime {
    pub fn as_str(self) -> &'static str {
        match self {
            ImageMime::Jpeg => "image/jpeg",
            ImageMime::Png => "image/png",
        }
    }

    pub fn image_format(self) -> image::ImageFormat {
        match self {
            ImageMime::Jpeg => image::ImageFormat::Jpeg,
            ImageMime::Png => image::ImageFormat::Png,
        }
    }

    /// Parses a declared content type against the allow-list.
    ///
    /// Parameters such as `; charset=...` are ignored and matching is
    /// case-insensitive. Browsers still send `image/jpg` and `image/pjpeg`
    /// for JPEG files, so both are accepted.
    pub fn from_declared(content_type: &str) -> Option<Self> {
        let essence = content_type
            .split(';')
            .next()
            .unwrap_or_default()
            .trim()
            .to_ascii_lowercase();
        match essence.as_str() {
            "image/jpeg" | "image/jpg" | "image/pjpeg" => Some(ImageMime::Jpeg),
            "image/png" => Some(ImageMime::Png),
            _ => None,
        }
    }
}

impl fmt::Display for ImageMime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Identifies an allow-listed image type from its magic bytes.
pub fn detect_image_mime(bytes: &[u8]) -> Option<ImageMime> {
    match bytes {
        [0xFF, 0xD8, 0xFF, ..] => Some(ImageMime::Jpeg),
        [0x89, 0x50, 0x4E, 0x47, ..] => Some(ImageMime::Png),
        _ => {
            tracing::debug!(
                "Unrecognized image signature (first 4 bytes: {:02X?})",
                &bytes[..bytes.len().min(4)]
            );
            None
        }
    }
}

/// True for content types that say nothing about the file, so sniffing decides.
pub fn is_generic_content_type(content_type: &str) -> bool {
    let essence = content_type.split(';').next().unwrap_or_default().trim();
    essence.is_empty() || essence.eq_ignore_ascii_case("application/octet-stream")
}
