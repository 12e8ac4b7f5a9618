//! Body-to-HTML rendering for posts and comments.
//!
//! The input is treated as plain text: HTML is escaped, bare URLs become
//! links, blank lines separate paragraphs and single line breaks become
//! `<br>`. The result is stored next to the raw body so it is rendered
//! exactly once per write.

use once_cell::sync::Lazy;
use regex::Regex;

static URL_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"https?://[^\s<]+").expect("url regex"));

/// Characters a URL match should not end with; almost always surrounding
/// punctuation rather than part of the address.
const TRAILING_PUNCT: &[char] = &['.', ',', ';', ':', '!', '?', ')'];

/// Render untrusted body text into safe HTML.
pub fn render_body(body: &str) -> String {
    let escaped = html_escape::encode_safe(body.trim());

    let linkified = URL_RE.replace_all(&escaped, |caps: &regex::Captures<'_>| {
        let full = &caps[0];
        let url = trim_url(full);
        let rest = &full[url.len()..];
        format!(r#"<a href="{url}" rel="nofollow">{url}</a>{rest}"#)
    });

    linkified
        .split("\n\n")
        .filter(|para| !para.trim().is_empty())
        .map(|para| format!("<p>{}</p>", para.trim().replace('\n', "<br>")))
        .collect::<Vec<_>>()
        .join("")
}

fn trim_url(mut url: &str) -> &str {
    loop {
        // Quotes and angle brackets were escaped before matching, so they
        // show up as entities.
        if let Some(stripped) = url
            .strip_suffix("&quot;")
            .or_else(|| url.strip_suffix("&#x27;"))
            .or_else(|| url.strip_suffix("&gt;"))
        {
            url = stripped;
        } else if url.ends_with(TRAILING_PUNCT) {
            url = &url[..url.len() - 1];
        } else {
            return url;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escapes_html() {
        let html = render_body("<script>alert('x')</script>");
        assert!(html.contains("&lt;script&gt;"));
        assert!(!html.contains("<script>"));
    }

    #[test]
    fn paragraphs_and_line_breaks() {
        let html = render_body("one\ntwo\n\nthree");
        assert_eq!(html, "<p>one<br>two</p><p>three</p>");
    }

    #[test]
    fn linkifies_urls() {
        let html = render_body("see https://example.com/a?b=1 now");
        assert!(html.contains(r#"<a href="https://example.com/a?b=1" rel="nofollow">"#));
    }

    #[test]
    fn trailing_punctuation_stays_outside_link() {
        let html = render_body("go to https://example.com.");
        assert!(html.contains(r#"href="https://example.com""#));
        assert!(html.ends_with("</a>.</p>"));
    }

    #[test]
    fn quoted_url_does_not_break_attribute() {
        let html = render_body(r#"see "https://example.com""#);
        assert!(html.contains(r#"href="https://example.com""#));
        assert!(!html.contains(r#"href="https://example.com&quot"#));
    }

    #[test]
    fn angle_bracketed_url_keeps_brackets_outside_link() {
        let html = render_body("see <https://x.dev>");
        assert!(html.contains(r#"href="https://x.dev""#));
        assert!(!html.contains(r#"href="https://x.dev&gt"#));
        assert!(html.contains("</a>&gt;"));
    }

    #[test]
    fn empty_body_renders_empty() {
        assert_eq!(render_body("   \n\n  "), "");
    }
}
