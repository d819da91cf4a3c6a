//! Per-request page state.
//!
//! A session holds at most one image. The analysis only runs on an explicit
//! trigger and only when an image is present.

use crate::ai::AnalysisService;
use crate::error::ValidationError;
use crate::models::{AnalysisResult, ImagePayload};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    NoImage,
    ImageReady,
    ResultDisplayed,
    ErrorDisplayed,
}

#[derive(Debug, Default)]
pub struct Session {
    image: Option<ImagePayload>,
    outcome: Option<AnalysisResult>,
    notice: Option<ValidationError>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn phase(&self) -> Phase {
        match (&self.image, &self.outcome) {
            (None, _) => Phase::NoImage,
            (Some(_), None) => Phase::ImageReady,
            (Some(_), Some(AnalysisResult::Success { .. })) => Phase::ResultDisplayed,
            (Some(_), Some(AnalysisResult::Failure { .. })) => Phase::ErrorDisplayed,
        }
    }

    /// Makes `image` the active image, replacing any previous one and its result.
    pub fn upload(&mut self, image: ImagePayload) {
        self.image = Some(image);
        self.outcome = None;
        self.notice = None;
    }

    /// A rejected upload leaves the session without an image.
    pub fn reject_upload(&mut self, err: ValidationError) {
        self.image = None;
        self.outcome = None;
        self.notice = Some(err);
    }

    /// Runs one fresh analysis of the active image.
    ///
    /// Without an image the service is not called and the session stays in
    /// [`Phase::NoImage`].
    pub async fn analyze(
        &mut self,
        service: &dyn AnalysisService,
        prompt: &str,
    ) -> Result<Phase, ValidationError> {
        let image = self.image.as_ref().ok_or(ValidationError::MissingImage)?;
        self.outcome = Some(service.analyze(image, prompt).await);
        Ok(self.phase())
    }

    pub fn image(&self) -> Option<&ImagePayload> {
        self.image.as_ref()
    }

    pub fn report(&self) -> Option<&str> {
        match &self.outcome {
            Some(AnalysisResult::Success { text }) => Some(text),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match &self.outcome {
            Some(AnalysisResult::Failure { message }) => Some(message),
            _ => None,
        }
    }

    pub fn notice(&self) -> Option<&ValidationError> {
        self.notice.as_ref()
    }
}
