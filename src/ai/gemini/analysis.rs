use super::client::GeminiHttpClient;
use super::types::{
    safety_settings, Content, GenerateContentRequest, GenerateContentResponse, InlineData, Part,
    WireGenerationConfig,
};
use crate::ai::AnalysisService;
use crate::config::AnalysisConfig;
use crate::error::{ConfigError, RequestError};
use crate::models::{AnalysisResult, GenerationConfig, ImagePayload, SafetyPolicy};
use async_trait::async_trait;
use std::time::{Duration, Instant};
use uuid::Uuid;

/// Finish reasons that mean the candidate was cut off by content filtering.
const BLOCKING_FINISH_REASONS: [&str; 5] = [
    "SAFETY",
    "PROHIBITED_CONTENT",
    "BLOCKLIST",
    "SPII",
    "IMAGE_SAFETY",
];

/// Sends one image plus instructions to Gemini and returns the text verbatim.
pub struct GeminiAnalysisClient {
    http: GeminiHttpClient,
    generation: GenerationConfig,
    safety: SafetyPolicy,
}

impl GeminiAnalysisClient {
    /// Validates the configuration. Performs no network I/O.
    pub fn new(config: &AnalysisConfig) -> Result<Self, ConfigError> {
        let client = reqwest::Client::builder()
            .build()
            .map_err(|e| ConfigError::HttpClient(e.to_string()))?;
        Self::new_with_client(config, client)
    }

    pub fn new_with_client(
        config: &AnalysisConfig,
        client: reqwest::Client,
    ) -> Result<Self, ConfigError> {
        config.generation.validate()?;

        let model = config.model_id.trim();
        if model.strip_prefix("models/").unwrap_or(model).is_empty() {
            return Err(ConfigError::EmptyModelId);
        }
        if config.timeout.is_zero() {
            return Err(ConfigError::InvalidSetting {
                name: "ANALYSIS_TIMEOUT_SECS",
                value: "0".to_string(),
                reason: "must be at least 1".to_string(),
            });
        }

        Ok(Self {
            http: GeminiHttpClient::new_with_client(
                config.credential.expose().to_string(),
                model,
                config.timeout,
                client,
            ),
            generation: config.generation.clone(),
            safety: config.safety.clone(),
        })
    }

    pub fn with_base_url(mut self, base_url: String) -> Self {
        self.http = self.http.with_base_url(base_url);
        self
    }

    pub fn model(&self) -> &str {
        self.http.model()
    }

    pub fn generation(&self) -> &GenerationConfig {
        &self.generation
    }

    pub fn safety(&self) -> &SafetyPolicy {
        &self.safety
    }

    pub fn timeout(&self) -> Duration {
        self.http.timeout()
    }

    /// Image part first, prompt second.
    fn build_request(&self, image: &ImagePayload, prompt: &str) -> GenerateContentRequest {
        GenerateContentRequest {
            contents: vec![Content {
                role: Some("user".to_string()),
                parts: vec![
                    Part::InlineData {
                        inline_data: InlineData {
                            mime_type: image.mime().as_str().to_string(),
                            data: image.to_base64(),
                        },
                    },
                    Part::Text {
                        text: prompt.to_string(),
                    },
                ],
            }],
            generation_config: WireGenerationConfig::from(&self.generation),
            safety_settings: safety_settings(&self.safety),
        }
    }

    async fn request_text(&self, image: &ImagePayload, prompt: &str) -> Result<String, RequestError> {
        let request = self.build_request(image, prompt);
        let response: GenerateContentResponse = self.http.generate_content(&request).await?;
        extract_text(response)
    }
}

fn extract_text(response: GenerateContentResponse) -> Result<String, RequestError> {
    if let Some(reason) = response
        .prompt_feedback
        .and_then(|feedback| feedback.block_reason)
    {
        return Err(RequestError::SafetyBlocked(reason));
    }

    let candidate = response
        .candidates
        .into_iter()
        .next()
        .ok_or(RequestError::EmptyResponse)?;

    if let Some(reason) = candidate
        .finish_reason
        .filter(|r| BLOCKING_FINISH_REASONS.contains(&r.as_str()))
    {
        return Err(RequestError::SafetyBlocked(reason));
    }

    let text: String = candidate
        .content
        .map(|content| content.parts)
        .unwrap_or_default()
        .into_iter()
        .filter_map(|part| match part {
            Part::Text { text } => Some(text),
            Part::InlineData { .. } => None,
        })
        .collect();

    if text.is_empty() {
        return Err(RequestError::EmptyResponse);
    }
    Ok(text)
}

#[async_trait]
impl AnalysisService for GeminiAnalysisClient {
    async fn analyze(&self, image: &ImagePayload, prompt: &str) -> AnalysisResult {
        let request_id = Uuid::new_v4();
        let started = Instant::now();
        tracing::info!(
            %request_id,
            model = self.model(),
            mime = %image.mime(),
            bytes = image.len(),
            "Sending analysis request"
        );

        match self.request_text(image, prompt).await {
            Ok(text) => {
                tracing::info!(
                    %request_id,
                    chars = text.len(),
                    elapsed_ms = started.elapsed().as_millis() as u64,
                    "Analysis succeeded"
                );
                AnalysisResult::Success { text }
            }
            Err(err) => {
                tracing::warn!(
                    %request_id,
                    safety_block = err.is_safety_block(),
                    elapsed_ms = started.elapsed().as_millis() as u64,
                    "Analysis failed: {}",
                    err
                );
                AnalysisResult::Failure {
                    message: err.to_string(),
                }
            }
        }
    }
}
