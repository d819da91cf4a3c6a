//! Data models and structures
//!
//! Defines the generation parameters, safety policy, image payload and
//! analysis result shared by the inference client and the web page.

use crate::ai::mime::{detect_image_mime, is_generic_content_type, ImageMime};
use crate::error::{ConfigError, ValidationError};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::io::Cursor;

/// Output format requested from the model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ResponseFormat {
    #[default]
    PlainText,
    Json,
}

impl ResponseFormat {
    pub fn mime_type(self) -> &'static str {
        match self {
            ResponseFormat::PlainText => "text/plain",
            ResponseFormat::Json => "application/json",
        }
    }
}

/// Sampling controls sent with every request.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationConfig {
    pub temperature: f64,
    pub top_p: f64,
    pub top_k: u32,
    pub max_output_tokens: u32,
    pub response_format: ResponseFormat,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            temperature: 0.4,
            top_p: 1.0,
            top_k: 32,
            max_output_tokens: 4096,
            response_format: ResponseFormat::PlainText,
        }
    }
}

impl GenerationConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        check_range("temperature", self.temperature, 0.0, 2.0)?;
        check_range("top_p", self.top_p, 0.0, 1.0)?;
        if self.top_k < 1 {
            return Err(ConfigError::InvalidParameter {
                name: "top_k",
                reason: "must be at least 1".to_string(),
            });
        }
        if self.max_output_tokens < 1 {
            return Err(ConfigError::InvalidParameter {
                name: "max_output_tokens",
                reason: "must be at least 1".to_string(),
            });
        }
        Ok(())
    }
}

fn check_range(name: &'static str, value: f64, min: f64, max: f64) -> Result<(), ConfigError> {
    // NaN fails the containment check as well.
    if !(min..=max).contains(&value) {
        return Err(ConfigError::InvalidParameter {
            name,
            reason: format!("{} is outside [{}, {}]", value, min, max),
        });
    }
    Ok(())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum HarmCategory {
    #[serde(rename = "HARM_CATEGORY_HATE_SPEECH")]
    HateSpeech,
    #[serde(rename = "HARM_CATEGORY_HARASSMENT")]
    Harassment,
    #[serde(rename = "HARM_CATEGORY_SEXUALLY_EXPLICIT")]
    SexuallyExplicit,
    #[serde(rename = "HARM_CATEGORY_DANGEROUS_CONTENT")]
    DangerousContent,
}

impl HarmCategory {
    pub const ALL: [HarmCategory; 4] = [
        HarmCategory::HateSpeech,
        HarmCategory::Harassment,
        HarmCategory::SexuallyExplicit,
        HarmCategory::DangerousContent,
    ];
}

/// Block thresholds, ordered from most permissive to strictest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BlockThreshold {
    BlockNone,
    BlockOnlyHigh,
    BlockMediumAndAbove,
    BlockLowAndAbove,
}

/// Per-category block thresholds applied to every request.
#[derive(Debug, Clone, PartialEq)]
pub struct SafetyPolicy {
    thresholds: BTreeMap<HarmCategory, BlockThreshold>,
}

impl SafetyPolicy {
    /// Same threshold for every harm category.
    pub fn uniform(threshold: BlockThreshold) -> Self {
        Self {
            thresholds: HarmCategory::ALL
                .iter()
                .map(|category| (*category, threshold))
                .collect(),
        }
    }

    pub fn with_threshold(mut self, category: HarmCategory, threshold: BlockThreshold) -> Self {
        self.thresholds.insert(category, threshold);
        self
    }

    pub fn threshold(&self, category: HarmCategory) -> Option<BlockThreshold> {
        self.thresholds.get(&category).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (HarmCategory, BlockThreshold)> + '_ {
        self.thresholds.iter().map(|(c, t)| (*c, *t))
    }
}

impl Default for SafetyPolicy {
    fn default() -> Self {
        Self::uniform(BlockThreshold::BlockMediumAndAbove)
    }
}

/// An uploaded image, validated against the allow-list and the size cap.
#[derive(Clone, PartialEq)]
pub struct ImagePayload {
    bytes: Vec<u8>,
    mime: ImageMime,
    dimensions: (u32, u32),
}

impl ImagePayload {
    /// Validates raw upload bytes.
    ///
    /// A generic or missing declared type falls back to sniffing; any other
    /// declared type must be allow-listed and must match the file's signature.
    pub fn from_upload(
        bytes: Vec<u8>,
        declared: Option<&str>,
        max_bytes: usize,
    ) -> Result<Self, ValidationError> {
        if bytes.is_empty() {
            return Err(ValidationError::EmptyFile);
        }
        if bytes.len() > max_bytes {
            return Err(ValidationError::TooLarge {
                size: bytes.len(),
                limit: max_bytes,
            });
        }

        let sniffed = detect_image_mime(&bytes);
        let mime = match declared {
            Some(content_type) if !is_generic_content_type(content_type) => {
                let mime = ImageMime::from_declared(content_type)
                    .ok_or_else(|| ValidationError::UnsupportedType(content_type.to_string()))?;
                if sniffed != Some(mime) {
                    return Err(ValidationError::ContentMismatch {
                        declared: mime.as_str(),
                    });
                }
                mime
            }
            _ => sniffed.ok_or_else(|| {
                ValidationError::UnsupportedType(
                    declared.unwrap_or("application/octet-stream").to_string(),
                )
            })?,
        };

        let dimensions = image::ImageReader::with_format(Cursor::new(&bytes), mime.image_format())
            .into_dimensions()
            .map_err(|e| ValidationError::Unreadable(e.to_string()))?;

        Ok(Self {
            bytes,
            mime,
            dimensions,
        })
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn mime(&self) -> ImageMime {
        self.mime
    }

    pub fn dimensions(&self) -> (u32, u32) {
        self.dimensions
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    pub fn to_base64(&self) -> String {
        use base64::Engine as _;
        base64::engine::general_purpose::STANDARD.encode(&self.bytes)
    }
}

impl std::fmt::Debug for ImagePayload {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ImagePayload")
            .field("mime", &self.mime)
            .field("len", &self.bytes.len())
            .field("dimensions", &self.dimensions)
            .finish()
    }
}

/// Outcome of one analysis call.
#[derive(Debug, Clone, PartialEq)]
pub enum AnalysisResult {
    Success { text: String },
    Failure { message: String },
}

impl AnalysisResult {
    pub fn is_success(&self) -> bool {
        matches!(self, AnalysisResult::Success { .. })
    }
}
