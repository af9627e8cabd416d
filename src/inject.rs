//! # Response Injector
//!
//! Wraps rendered sections in the panel shell (namespaced CSS, container,
//! trigger button, toggle script) and splices the result into a response body.

use askama::Template;

use crate::error::Result;
use crate::render::RenderedPanel;

/// Marker the panel is inserted in front of.
pub const BODY_CLOSE: &str = "</body>";

/// Default label of the trigger button.
pub const DEFAULT_TITLE: &str = "multi-dump";

#[derive(Template)]
#[template(path = "panel.html")]
struct PanelTemplate<'a> {
    prefix: &'a str,
    sections: &'a str,
    badge: usize,
    environment: &'a str,
    title: &'a str,
}

/// Render the self-contained panel fragment for `panel`.
pub fn panel_fragment(panel: &RenderedPanel, prefix: &str, title: &str) -> Result<String> {
    let fragment = PanelTemplate {
        prefix,
        sections: &panel.sections_html,
        badge: panel.badge,
        environment: &panel.environment,
        title,
    }
    .render()?;
    Ok(fragment)
}

/// Insert `fragment` into `body`.
///
/// The fragment goes immediately before the last `</body>`; without one it is
/// appended. The input is left untouched.
pub fn splice(body: &str, fragment: &str) -> String {
    let mut out = String::with_capacity(body.len() + fragment.len());
    match body.rfind(BODY_CLOSE) {
        Some(pos) => {
            out.push_str(&body[..pos]);
            out.push_str(fragment);
            out.push_str(&body[pos..]);
        }
        None => {
            out.push_str(body);
            out.push_str(fragment);
        }
    }
    out
}

/// Build the panel for `panel` and splice it into `body`.
pub fn inject(body: &str, panel: &RenderedPanel, prefix: &str) -> Result<String> {
    inject_titled(body, panel, prefix, DEFAULT_TITLE)
}

/// [`inject`] with a custom trigger label.
pub fn inject_titled(body: &str, panel: &RenderedPanel, prefix: &str, title: &str) -> Result<String> {
    let fragment = panel_fragment(panel, prefix, title)?;
    Ok(splice(body, &fragment))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_splice_before_body_close() {
        assert_eq!(
            splice("<html><body>hi</body></html>", "<div>P</div>"),
            "<html><body>hi<div>P</div></body></html>"
        );
    }

    #[test]
    fn test_splice_appends_without_body_close() {
        assert_eq!(
            splice("<html>hi</html>", "<div>P</div>"),
            "<html>hi</html><div>P</div>"
        );
    }

    #[test]
    fn test_splice_uses_last_body_close() {
        let body = "<body><iframe srcdoc=\"<body></body>\"></iframe></body>";
        let out = splice(body, "X");
        assert!(out.ends_with("</iframe>X</body>"));
        assert_eq!(out.matches('X').count(), 1);
    }

    #[test]
    fn test_splice_empty_body() {
        assert_eq!(splice("", "X"), "X");
    }
}
