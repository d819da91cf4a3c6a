use wiremock::matchers::{header, method, path_regex};
use wiremock::{Mock, MockBuilder, ResponseTemplate};

pub const GENERATE_CONTENT_PATH_REGEX: &str = r"^/v1beta/models/.+:generateContent$";

pub fn post_generate_content() -> MockBuilder {
    Mock::given(method("POST")).and(path_regex(GENERATE_CONTENT_PATH_REGEX))
}

pub fn post_generate_content_with_key(api_key: &str) -> MockBuilder {
    post_generate_content().and(header("x-goog-api-key", api_key))
}

pub fn text_response(text: &str) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(serde_json::json!({
        "candidates": [{
            "content": {
                "role": "model",
                "parts": [{ "text": text }]
            },
            "finishReason": "STOP"
        }]
    }))
}
