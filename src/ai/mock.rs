use super::mime::ImageMime;
use super::AnalysisService;
use crate::models::{AnalysisResult, ImagePayload};
use crate::prompts::REPORT_HEADINGS;
use async_trait::async_trait;
use std::sync::{Arc, Mutex};

/// What the mock saw for one `analyze` call.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedCall {
    pub mime: ImageMime,
    pub image_len: usize,
    pub prompt: String,
}

/// Scripted stand-in for the remote service.
///
/// Responses are returned in order and cycle; with none scripted, a
/// four-section report is returned.
#[derive(Clone, Default)]
pub struct MockAnalysisClient {
    responses: Arc<Mutex<Vec<AnalysisResult>>>,
    calls: Arc<Mutex<Vec<RecordedCall>>>,
}

impl MockAnalysisClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_success(self, text: impl Into<String>) -> Self {
        self.responses
            .lock()
            .unwrap()
            .push(AnalysisResult::Success { text: text.into() });
        self
    }

    pub fn with_failure(self, message: impl Into<String>) -> Self {
        self.responses.lock().unwrap().push(AnalysisResult::Failure {
            message: message.into(),
        });
        self
    }

    pub fn get_call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn default_report() -> String {
        REPORT_HEADINGS
            .iter()
            .map(|heading| format!("**{}**\n\nNo abnormal findings.\n", heading))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

#[async_trait]
impl AnalysisService for MockAnalysisClient {
    async fn analyze(&self, image: &ImagePayload, prompt: &str) -> AnalysisResult {
        let mut calls = self.calls.lock().unwrap();
        calls.push(RecordedCall {
            mime: image.mime(),
            image_len: image.len(),
            prompt: prompt.to_string(),
        });

        let responses = self.responses.lock().unwrap();
        if responses.is_empty() {
            AnalysisResult::Success {
                text: Self::default_report(),
            }
        } else {
            let index = (calls.len() - 1) % responses.len();
            responses[index].clone()
        }
    }
}
