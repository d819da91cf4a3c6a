//! Inference service integration for medical image analysis
//!
//! [`AnalysisService`] is the seam between the web page and the remote
//! model: the Gemini client talks to the real service, the mock records calls
//! for tests.

pub mod gemini;
pub mod mime;
pub mod mock;

pub use gemini::GeminiAnalysisClient;
pub use mock::{MockAnalysisClient, RecordedCall};

use crate::models::{AnalysisResult, ImagePayload};
use async_trait::async_trait;

#[async_trait]
pub trait AnalysisService: Send + Sync {
    /// Sends the image followed by `prompt` and returns the model's text.
    ///
    /// Every failure is reported as [`AnalysisResult::Failure`].
    async fn analyze(&self, image: &ImagePayload, prompt: &str) -> AnalysisResult;
}
