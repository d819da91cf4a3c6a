use image::{DynamicImage, ImageFormat, RgbImage};
use medical_image_analysis::{
    ai::{mime::ImageMime, AnalysisService, GeminiAnalysisClient, MockAnalysisClient},
    app::App,
    config::{AnalysisConfig, Credential, Settings},
    prompts::{ANALYSIS_PROMPT, REPORT_HEADINGS},
};
use reqwest::multipart::{Form, Part};
use std::io::Cursor;
use std::sync::Arc;
use tokio::net::TcpListener;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, Request, ResponseTemplate};

const WARNING: &str = "Please upload an image to proceed.";

fn encode(format: ImageFormat, width: u32, height: u32) -> Vec<u8> {
    let img = RgbImage::from_fn(width, height, |x, y| {
        image::Rgb([(x * 31 % 256) as u8, (y * 17 % 256) as u8, ((x ^ y) % 256) as u8])
    });
    let mut buf = Vec::new();
    DynamicImage::ImageRgb8(img)
        .write_to(&mut Cursor::new(&mut buf), format)
        .unwrap();
    buf
}

/// Pseudo-random pixels so the encoded file stays close to the raw size.
fn encode_noisy(format: ImageFormat, width: u32, height: u32, seed: u32) -> Vec<u8> {
    let mut state = seed;
    let img = RgbImage::from_fn(width, height, |_, _| {
        let mut channel = || {
            state = state.wrapping_mul(1_664_525).wrapping_add(1_013_904_223);
            (state >> 24) as u8
        };
        image::Rgb([channel(), channel(), channel()])
    });
    let mut buf = Vec::new();
    DynamicImage::ImageRgb8(img)
        .write_to(&mut Cursor::new(&mut buf), format)
        .unwrap();
    buf
}

/// A scan-sized JPEG of at least 10 KiB.
fn realistic_jpeg() -> Vec<u8> {
    let mut side = 64;
    loop {
        let jpeg = encode_noisy(ImageFormat::Jpeg, side, side, 7);
        if jpeg.len() >= 10 * 1024 {
            return jpeg;
        }
        side += 32;
    }
}

fn four_section_report() -> String {
    REPORT_HEADINGS
        .iter()
        .map(|h| format!("**{}**\n\nNothing of concern.", h))
        .collect::<Vec<_>>()
        .join("\n\n")
}

async fn spawn_app(service: Arc<dyn AnalysisService>, settings: Settings) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(App::with_service(service, settings).serve(listener));
    format!("http://{}", addr)
}

fn file_part(bytes: Vec<u8>, file_name: &str, mime: &str) -> Part {
    Part::bytes(bytes)
        .file_name(file_name.to_string())
        .mime_str(mime)
        .unwrap()
}

async fn submit(base: &str, form: Form) -> (u16, String) {
    let response = reqwest::Client::new()
        .post(format!("{}/", base))
        .multipart(form)
        .send()
        .await
        .unwrap();
    let status = response.status().as_u16();
    (status, response.text().await.unwrap())
}

fn hidden_value(html: &str, name: &str) -> Option<String> {
    let marker = format!("name=\"{}\" value=\"", name);
    let start = html.find(&marker)? + marker.len();
    let end = html[start..].find('"')? + start;
    Some(html[start..end].to_string())
}

#[tokio::test]
async fn test_new_session_starts_without_image() {
    let base = spawn_app(Arc::new(MockAnalysisClient::new()), Settings::default()).await;

    let html = reqwest::get(format!("{}/", base))
        .await
        .unwrap()
        .text()
        .await
        .unwrap();

    assert!(html.contains("Medical Image Analysis"));
    assert!(html.contains(WARNING));
    assert!(!html.contains("<figure>"));
}

#[tokio::test]
async fn test_jpeg_report_displayed_under_heading() {
    let report = four_section_report();
    let mock = MockAnalysisClient::new().with_success(report.clone());
    let base = spawn_app(Arc::new(mock.clone()), Settings::default()).await;

    let jpeg = realistic_jpeg();
    let jpeg_len = jpeg.len();
    assert!(jpeg_len >= 10 * 1024);
    let form = Form::new()
        .part("image", file_part(jpeg, "scan.jpg", "image/jpeg"))
        .text("action", "analyze");
    let (status, html) = submit(&base, form).await;

    assert_eq!(status, 200);
    assert!(html.contains("<h1>Analysis Report</h1>"));
    for heading in REPORT_HEADINGS {
        assert!(html.contains(&format!("<strong>{}</strong>", heading)));
    }
    assert!(html.contains("data:image/jpeg;base64,"));

    let calls = mock.calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].mime, ImageMime::Jpeg);
    assert_eq!(calls[0].image_len, jpeg_len);
    assert_eq!(calls[0].prompt, ANALYSIS_PROMPT);
}

#[tokio::test]
async fn test_analyze_without_upload_shows_warning_and_skips_client() {
    let mock = MockAnalysisClient::new();
    let base = spawn_app(Arc::new(mock.clone()), Settings::default()).await;

    let form = Form::new()
        .part("image", Part::bytes(Vec::new()).file_name(""))
        .text("action", "analyze");
    let (status, html) = submit(&base, form).await;

    assert_eq!(status, 200);
    assert!(html.contains(WARNING));
    assert!(!html.contains("Analysis Report"));
    assert_eq!(mock.get_call_count(), 0);
}

#[tokio::test]
async fn test_transport_error_shown_and_session_stays_usable() {
    let mock = MockAnalysisClient::new().with_failure("transport error: connection refused");
    let base = spawn_app(Arc::new(mock.clone()), Settings::default()).await;

    let form = Form::new()
        .part(
            "image",
            file_part(encode(ImageFormat::Png, 32, 32), "scan.png", "image/png"),
        )
        .text("action", "analyze");
    let (status, html) = submit(&base, form).await;

    assert_eq!(status, 200);
    assert!(html.contains("An error occurred during analysis: transport error: connection refused"));

    let form = Form::new()
        .part(
            "image",
            file_part(encode(ImageFormat::Png, 16, 16), "other.png", "image/png"),
        )
        .text("action", "upload");
    let (status, html) = submit(&base, form).await;

    assert_eq!(status, 200);
    assert!(html.contains("Uploaded Image (16×16)"));
    assert!(!html.contains("An error occurred"));
    assert_eq!(mock.get_call_count(), 1);
}

#[tokio::test]
async fn test_upload_then_analyze_uses_carried_preview() {
    let mock = MockAnalysisClient::new().with_success("**Detailed Analysis**\nfoo");
    let base = spawn_app(Arc::new(mock.clone()), Settings::default()).await;

    let form = Form::new()
        .part(
            "image",
            file_part(encode(ImageFormat::Png, 20, 10), "scan.png", "image/png"),
        )
        .text("action", "upload");
    let (_, preview) = submit(&base, form).await;
    assert_eq!(mock.get_call_count(), 0);

    let carried_image = hidden_value(&preview, "carried_image").expect("preview carries image");
    let carried_mime = hidden_value(&preview, "carried_mime").expect("preview carries mime");
    assert_eq!(carried_mime, "image/png");

    let form = Form::new()
        .part("image", Part::bytes(Vec::new()).file_name(""))
        .text("carried_mime", carried_mime)
        .text("carried_image", carried_image)
        .text("action", "analyze");
    let (_, html) = submit(&base, form).await;

    assert!(html.contains("<strong>Detailed Analysis</strong>"));
    assert_eq!(mock.get_call_count(), 1);
    assert_eq!(mock.calls()[0].mime, ImageMime::Png);
}

#[tokio::test]
async fn test_disallowed_type_is_a_warning_not_a_call() {
    let mock = MockAnalysisClient::new();
    let base = spawn_app(Arc::new(mock.clone()), Settings::default()).await;

    let form = Form::new()
        .part(
            "image",
            file_part(b"GIF89a\x01\x00\x01\x00".to_vec(), "scan.gif", "image/gif"),
        )
        .text("action", "analyze");
    let (status, html) = submit(&base, form).await;

    assert_eq!(status, 200);
    assert!(html.contains("Unsupported file type"));
    assert!(html.contains(WARNING));
    assert_eq!(mock.get_call_count(), 0);
}

#[tokio::test]
async fn test_oversized_upload_is_rejected() {
    let mock = MockAnalysisClient::new();
    let settings = Settings {
        max_upload_bytes: 16,
        ..Settings::default()
    };
    let base = spawn_app(Arc::new(mock.clone()), settings).await;

    let form = Form::new()
        .part(
            "image",
            file_part(encode(ImageFormat::Png, 8, 8), "scan.png", "image/png"),
        )
        .text("action", "analyze");
    let (_, html) = submit(&base, form).await;

    assert!(html.contains("the limit is 16 bytes"));
    assert_eq!(mock.get_call_count(), 0);
}

#[tokio::test]
async fn test_new_upload_at_cap_replaces_carried_preview_at_cap() {
    use base64::Engine;

    let current = encode_noisy(ImageFormat::Png, 512, 512, 1);
    let replacement = encode_noisy(ImageFormat::Png, 512, 512, 2);
    let cap = current.len().max(replacement.len());
    let expected = base64::engine::general_purpose::STANDARD.encode(&replacement);
    let settings = Settings {
        max_upload_bytes: cap,
        ..Settings::default()
    };
    let mock = MockAnalysisClient::new();
    let base = spawn_app(Arc::new(mock.clone()), settings).await;

    let form = Form::new()
        .part("image", file_part(replacement, "next.png", "image/png"))
        .text("carried_mime", "image/png")
        .text(
            "carried_image",
            base64::engine::general_purpose::STANDARD.encode(&current),
        )
        .text("action", "upload");
    let (status, html) = submit(&base, form).await;

    assert_eq!(status, 200);
    assert!(html.contains("Uploaded Image (512×512)"));
    assert!(!html.contains(WARNING));
    assert_eq!(hidden_value(&html, "carried_image"), Some(expected));
    assert_eq!(mock.get_call_count(), 0);
}

#[tokio::test]
async fn test_health_endpoint() {
    let base = spawn_app(Arc::new(MockAnalysisClient::new()), Settings::default()).await;
    let body = reqwest::get(format!("{}/healthz", base))
        .await
        .unwrap()
        .text()
        .await
        .unwrap();
    assert_eq!(body, "ok");
}

#[tokio::test]
async fn test_page_to_gemini_end_to_end() {
    let server = MockServer::start().await;
    let report = four_section_report();

    Mock::given(method("POST"))
        .and(path(
            "/v1beta/models/gemini-2.0-flash-lite-preview-02-05:generateContent",
        ))
        .and(header("x-goog-api-key", "e2e-key"))
        .and(|req: &Request| {
            let body: serde_json::Value = match serde_json::from_slice(&req.body) {
                Ok(body) => body,
                Err(_) => return false,
            };
            let parts = &body["contents"][0]["parts"];
            parts[0]["inlineData"]["mimeType"] == "image/png"
                && parts[1]["text"] == ANALYSIS_PROMPT
                && body["safetySettings"].as_array().map(Vec::len) == Some(4)
        })
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "candidates": [{
                "content": { "role": "model", "parts": [{ "text": report }] },
                "finishReason": "STOP"
            }]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let settings = Settings::default();
    let config = AnalysisConfig::new(Credential::new("e2e-key").unwrap(), &settings);
    let client = GeminiAnalysisClient::new(&config)
        .unwrap()
        .with_base_url(server.uri());
    let base = spawn_app(Arc::new(client), settings).await;

    let form = Form::new()
        .part(
            "image",
            file_part(encode(ImageFormat::Png, 24, 24), "xray.png", "image/png"),
        )
        .text("action", "analyze");
    let (status, html) = submit(&base, form).await;

    assert_eq!(status, 200);
    assert!(html.contains("<h1>Analysis Report</h1>"));
    assert!(html.contains("<strong>Treatment Suggestions</strong>"));
}
