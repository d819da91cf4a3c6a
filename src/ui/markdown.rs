use pulldown_cmark::{html, Event, Options, Parser, Tag};

/// Renders model output as HTML.
///
/// Raw HTML is shown as text. Links keep only `http(s)` or relative
/// destinations, and images collapse to their alt text so nothing is fetched.
pub fn render_markdown(text: &str) -> String {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_TABLES);
    options.insert(Options::ENABLE_STRIKETHROUGH);

    let parser = Parser::new_ext(text, options).filter_map(|event| match event {
        Event::Html(raw) => Some(Event::Text(raw)),
        Event::Start(Tag::Image(..)) | Event::End(Tag::Image(..)) => None,
        Event::Start(Tag::Link(_, ref dest, _)) | Event::End(Tag::Link(_, ref dest, _))
            if !is_safe_destination(dest) =>
        {
            None
        }
        other => Some(other),
    });

    let mut out = String::with_capacity(text.len() * 3 / 2);
    html::push_html(&mut out, parser);
    out
}

/// `http:`/`https:` URLs and scheme-less relative references.
fn is_safe_destination(dest: &str) -> bool {
    let dest = dest.trim();
    let scheme_end = dest.find(|c| matches!(c, ':' | '/' | '?' | '#'));
    match scheme_end {
        Some(i) if dest[i..].starts_with(':') => {
            let scheme = &dest[..i];
            scheme.eq_ignore_ascii_case("http") || scheme.eq_ignore_ascii_case("https")
        }
        _ => true,
    }
}

pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}
