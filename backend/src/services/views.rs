//! HTML pages rendered by the feedback routes.
//!
//! Templates live in `backend/views` and are embedded into the binary. A
//! template marks substitution points as `{{name}}`; values are HTML-escaped
//! before they are inserted, and unknown names render as empty strings.

use crate::error::FeedbackError;
use common::model::link::LinkInfo;
use common::model::submission::SubmissionRecord;
use include_dir::{include_dir, Dir};
use regex::{Captures, Regex};
use std::sync::LazyLock;

static VIEWS_DIR: Dir = include_dir!("$CARGO_MANIFEST_DIR/views");

static PLACEHOLDER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{\{\s*([a-z_]+)\s*\}\}").unwrap());

pub fn render_form(link: &LinkInfo) -> Result<String, FeedbackError> {
    render("feedback_form.html", &[("customer_name", &link.customer_name)])
}

pub fn render_success(record: &SubmissionRecord) -> Result<String, FeedbackError> {
    render("success.html", &[("customer_name", &record.customer_name)])
}

pub fn render_not_found(message: &str) -> Result<String, FeedbackError> {
    render("not_found.html", &[("message", message)])
}

pub fn render_error(message: &str) -> Result<String, FeedbackError> {
    render("error.html", &[("message", message)])
}

fn render(view: &str, values: &[(&str, &str)]) -> Result<String, FeedbackError> {
    let template = VIEWS_DIR
        .get_file(view)
        .and_then(|file| file.contents_utf8())
        .ok_or_else(|| FeedbackError::Unhandled(format!("view {view} is missing")))?;

    let rendered = PLACEHOLDER.replace_all(template, |caps: &Captures| {
        values
            .iter()
            .find(|(key, _)| *key == &caps[1])
            .map(|(_, value)| escape_html(value))
            .unwrap_or_default()
    });

    Ok(rendered.into_owned())
}

fn escape_html(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for ch in raw.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}
