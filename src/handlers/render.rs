// Shared page rendering: template loading, escaping, flash messages and the
// theme sidebar used by every view.
use std::path::Path;
use axum::response::{Html, IntoResponse, Redirect, Response};
use crate::config::Config;
use crate::errors::{AppError, AppResult};
use crate::models::{PageQuery, SessionState};
use crate::services::presentation::{theme_url, DEFAULT_THEME, THEMES};

pub fn render_template(config: &Config, name: &str, vars: &[(&str, String)]) -> AppResult<Html<String>> {
    let path = Path::new(&config.server.templates_dir).join(name);
    let template = std::fs::read_to_string(&path).map_err(|e| {
        tracing::error!("Failed to read template {}: {}", path.display(), e);
        AppError::File(e)
    })?;

    Ok(Html(fill_placeholders(&template, vars)))
}

// Single pass over the template, so inserted values are never scanned again.
fn fill_placeholders(template: &str, vars: &[(&str, String)]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(start) = rest.find("{{") {
        out.push_str(&rest[..start]);
        let after = &rest[start + 2..];
        let value = after
            .find("}}")
            .and_then(|end| vars.iter().find(|(key, _)| *key == &after[..end]).map(|(_, v)| (end, v)));

        match value {
            Some((end, value)) => {
                out.push_str(value);
                rest = &after[end + 2..];
            }
            None => {
                out.push_str("{{");
                rest = after;
            }
        }
    }
    out.push_str(rest);
    out
}

pub fn escape_html(raw: &str) -> String {
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

pub fn redirect_with(path: &str, key: &str, message: &str) -> Response {
    Redirect::to(&format!("{}?{}={}", path, key, urlencoding::encode(message))).into_response()
}

pub fn messages(query: &PageQuery) -> String {
    let mut html = String::new();
    if let Some(error) = &query.error {
        html.push_str(&format!(r#"<div class="alert error">{}</div>"#, escape_html(error)));
    }
    if let Some(notice) = &query.notice {
        html.push_str(&format!(r#"<div class="alert success">{}</div>"#, escape_html(notice)));
    }
    html
}

pub fn theme_style(state: &SessionState) -> String {
    let url = state
        .theme
        .as_deref()
        .and_then(theme_url)
        .or_else(|| theme_url(DEFAULT_THEME))
        .unwrap_or_default();
    format!(
        r#"<style>body {{ background-image: url("{}"); background-attachment: fixed; background-size: cover; }}</style>"#,
        url
    )
}

pub fn theme_picker(state: &SessionState) -> String {
    let current = state.theme.as_deref().unwrap_or(DEFAULT_THEME);
    let options = THEMES
        .iter()
        .map(|(name, _)| {
            let selected = if *name == current { " selected" } else { "" };
            format!(r#"<option value="{0}"{1}>{0}</option>"#, name, selected)
        })
        .collect::<Vec<_>>()
        .join("");

    format!(
        r#"<form method="post" action="/theme" class="theme-picker">
            <label for="theme">🎨 Background Theme</label>
            <select id="theme" name="theme">{}</select>
            <button type="submit">Apply</button>
        </form>"#,
        options
    )
}
