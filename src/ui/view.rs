//! HTML for the single analysis page.

use super::markdown::{escape_html, render_markdown};
use super::session::{Phase, Session};
use crate::error::ValidationError;

pub const TITLE: &str = "👨‍⚕️ Medical Image Analysis";
pub const SUBHEADER: &str = "An AI-powered tool to analyze medical images";
pub const REPORT_HEADING: &str = "Analysis Report";
pub const PREVIEW_CAPTION: &str = "Uploaded Image";
pub const ERROR_PREFIX: &str = "An error occurred during analysis: ";

const STYLE: &str = r#"
body { color: #ffffff; background-color: #1e1e1e; font-family: sans-serif; max-width: 48rem; margin: 2rem auto; padding: 0 1rem; }
button { background-color: #4CAF50; color: white; border: none; padding: 10px 20px; font-size: 16px; margin: 4px 2px; cursor: pointer; border-radius: 12px; }
figure img { border: 2px solid #444444; border-radius: 10px; }
.warning { background-color: #ffcc00; color: #000000; padding: 0.75rem; border-radius: 6px; }
.error { background-color: #ff4d4d; color: #ffffff; padding: 0.75rem; border-radius: 6px; }
"#;

pub fn render(session: &Session) -> String {
    let mut body = String::new();

    body.push_str(&format!(
        "<h1>{}</h1>\n<h3>{}</h3>\n",
        escape_html(TITLE),
        escape_html(SUBHEADER)
    ));
    body.push_str(&render_form(session));

    if let Some(image) = session.image() {
        let (width, height) = image.dimensions();
        body.push_str(&format!(
            "<figure><img src=\"data:{};base64,{}\" width=\"400\" alt=\"{}\">\
             <figcaption>{} ({}×{})</figcaption></figure>\n",
            image.mime(),
            image.to_base64(),
            PREVIEW_CAPTION,
            PREVIEW_CAPTION,
            width,
            height
        ));
    }

    if let Some(notice) = session.notice() {
        if *notice != ValidationError::MissingImage {
            body.push_str(&format!(
                "<div class=\"warning\" role=\"alert\">{}</div>\n",
                escape_html(&notice.to_string())
            ));
        }
    }

    match session.phase() {
        Phase::NoImage => body.push_str(&format!(
            "<div class=\"warning\" role=\"status\">{}</div>\n",
            escape_html(&ValidationError::MissingImage.to_string())
        )),
        Phase::ImageReady => {}
        Phase::ResultDisplayed => {
            if let Some(report) = session.report() {
                body.push_str(&format!(
                    "<h1>{}</h1>\n<article class=\"report\">\n{}</article>\n",
                    REPORT_HEADING,
                    render_markdown(report)
                ));
            }
        }
        Phase::ErrorDisplayed => {
            if let Some(message) = session.error() {
                body.push_str(&format!(
                    "<div class=\"error\" role=\"alert\">{}{}</div>\n",
                    ERROR_PREFIX,
                    escape_html(message)
                ));
            }
        }
    }

    format!(
        "<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n\
         <title>Medical Image Analysis</title>\n<style>{}</style>\n</head>\n\
         <body>\n{}</body>\n</html>\n",
        STYLE, body
    )
}

/// Upload control plus the analyze trigger. An active image rides along in
/// hidden fields so the next submission still has it.
fn render_form(session: &Session) -> String {
    let carried = session
        .image()
        .map(|image| {
            format!(
                "<input type=\"hidden\" name=\"carried_mime\" value=\"{}\">\n\
                 <input type=\"hidden\" name=\"carried_image\" value=\"{}\">\n",
                image.mime(),
                image.to_base64()
            )
        })
        .unwrap_or_default();

    format!(
        "<form method=\"post\" action=\"/\" enctype=\"multipart/form-data\">\n\
         <label for=\"image\">Choose an image...</label>\n\
         <input type=\"file\" id=\"image\" name=\"image\" \
         accept=\".jpg,.jpeg,.png,image/jpeg,image/png\">\n\
         {}<button type=\"submit\" name=\"action\" value=\"upload\">Upload</button>\n\
         <button type=\"submit\" name=\"action\" value=\"analyze\">Analyze</button>\n\
         </form>\n",
        carried
    )
}
