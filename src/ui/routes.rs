use super::session::Session;
use super::view;
use crate::ai::AnalysisService;
use crate::error::ValidationError;
use crate::models::ImagePayload;
use crate::prompts::ANALYSIS_PROMPT;
use axum::{
    extract::{multipart::MultipartError, DefaultBodyLimit, Multipart, State},
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    routing::get,
    Router,
};
use std::sync::Arc;
use tracing::{info, warn};

/// Shared, read-only state for every request.
#[derive(Clone)]
pub struct AppState {
    pub service: Arc<dyn AnalysisService>,
    pub max_upload_bytes: usize,
}

/// Multipart headers, the action field and the carried MIME type.
const FORM_OVERHEAD_BYTES: usize = 64 * 1024;

/// Largest form body: a new file at the cap plus a carried preview at the cap
/// encoded as padded base64.
pub fn body_limit(max_upload_bytes: usize) -> usize {
    let carried_base64 = max_upload_bytes.div_ceil(3).saturating_mul(4);
    max_upload_bytes
        .saturating_add(carried_base64)
        .saturating_add(FORM_OVERHEAD_BYTES)
}

pub fn router(state: AppState) -> Router {
    let limit = body_limit(state.max_upload_bytes);

    Router::new()
        .route("/", get(index).post(submit))
        .route("/healthz", get(|| async { "ok" }))
        .layer(DefaultBodyLimit::max(limit))
        .with_state(state)
}

async fn index() -> Html<String> {
    Html(view::render(&Session::new()))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
enum Action {
    #[default]
    Upload,
    Analyze,
}

struct Upload {
    file_name: Option<String>,
    content_type: Option<String>,
    bytes: Vec<u8>,
}

#[derive(Default)]
struct Submission {
    upload: Option<Upload>,
    carried_image: Option<String>,
    carried_mime: Option<String>,
    action: Action,
}

async fn read_submission(
    mut multipart: Multipart,
) -> Result<Submission, (StatusCode, ValidationError)> {
    let malformed = |e: MultipartError| (e.status(), ValidationError::MalformedForm(e.body_text()));

    let mut submission = Submission::default();
    while let Some(field) = multipart.next_field().await.map_err(malformed)? {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "image" => {
                let file_name = field.file_name().map(str::to_string);
                let content_type = field.content_type().map(str::to_string);
                let bytes = field.bytes().await.map_err(malformed)?;
                // An untouched file input still sends an empty, unnamed part.
                let picked = file_name.as_deref().is_some_and(|n| !n.is_empty());
                if picked || !bytes.is_empty() {
                    submission.upload = Some(Upload {
                        file_name,
                        content_type,
                        bytes: bytes.to_vec(),
                    });
                }
            }
            "carried_image" => {
                submission.carried_image = Some(field.text().await.map_err(malformed)?);
            }
            "carried_mime" => {
                submission.carried_mime = Some(field.text().await.map_err(malformed)?);
            }
            "action" => {
                if field.text().await.map_err(malformed)?.trim() == "analyze" {
                    submission.action = Action::Analyze;
                }
            }
            _ => {}
        }
    }
    Ok(submission)
}

fn restore_carried(
    data: &str,
    mime: Option<&str>,
    max_upload_bytes: usize,
) -> Result<ImagePayload, ValidationError> {
    use base64::Engine as _;
    let bytes = base64::engine::general_purpose::STANDARD
        .decode(data.trim())
        .map_err(|_| ValidationError::MalformedForm("the preview image is corrupt".to_string()))?;
    ImagePayload::from_upload(bytes, mime, max_upload_bytes)
}

async fn submit(State(state): State<AppState>, multipart: Multipart) -> Response {
    let mut session = Session::new();

    let submission = match read_submission(multipart).await {
        Ok(submission) => submission,
        Err((status, err)) => {
            warn!("Rejected form submission: {}", err);
            session.reject_upload(err);
            return (status, Html(view::render(&session))).into_response();
        }
    };

    if let Some(data) = submission.carried_image.as_deref().filter(|d| !d.is_empty()) {
        match restore_carried(
            data,
            submission.carried_mime.as_deref(),
            state.max_upload_bytes,
        ) {
            Ok(image) => session.upload(image),
            Err(err) => {
                warn!("Dropping carried image: {}", err);
                session.reject_upload(err);
            }
        }
    }

    if let Some(upload) = submission.upload {
        let file_name = upload.file_name.unwrap_or_default();
        match ImagePayload::from_upload(
            upload.bytes,
            upload.content_type.as_deref(),
            state.max_upload_bytes,
        ) {
            Ok(image) => {
                info!(
                    file = %file_name,
                    mime = %image.mime(),
                    bytes = image.len(),
                    "Accepted upload"
                );
                session.upload(image);
            }
            Err(err) => {
                warn!(file = %file_name, "Rejected upload: {}", err);
                session.reject_upload(err);
            }
        }
    }

    if submission.action == Action::Analyze {
        if let Err(err) = session.analyze(state.service.as_ref(), ANALYSIS_PROMPT).await {
            info!("Analyze triggered without an image: {}", err);
        }
    }

    Html(view::render(&session)).into_response()
}
