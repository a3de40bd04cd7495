use axum::{
    http::{HeaderMap, HeaderValue, StatusCode},
    response::{Html, IntoResponse, Response},
};
use serde::Serialize;
use serde_json::json;

use crate::{AppState, models::CurrentUser};

pub fn is_htmx(headers: &HeaderMap) -> bool {
    headers
        .get("HX-Request")
        .and_then(|v| v.to_str().ok())
        .map(|v| v.eq_ignore_ascii_case("true"))
        .unwrap_or(false)
}

pub fn htmx_redirect(path: &str) -> Response {
    let mut headers = HeaderMap::new();
    if let Ok(v) = HeaderValue::from_str(path) {
        headers.insert("HX-Redirect", v);
    }
    (StatusCode::OK, headers, Html(String::new())).into_response()
}

/// HX-Trigger expects JSON: {"evt":true,...}
pub fn hx_trigger_value(events: &[&str]) -> HeaderValue {
    let body = events
        .iter()
        .map(|ev| format!("\"{ev}\":true"))
        .collect::<Vec<_>>()
        .join(",");
    HeaderValue::from_str(&format!("{{{body}}}")).unwrap_or_else(|_| HeaderValue::from_static("{}"))
}

pub fn fmt2(x: f64) -> String {
    format!("{:.2}", x)
}

/// Renders a template, turning template errors into visible text.
pub fn render_partial<T: Serialize>(state: &AppState, tpl: &str, ctx: &T) -> String {
    state
        .hbs
        .render(tpl, ctx)
        .unwrap_or_else(|e| format!("template error: {e}"))
}

pub fn render_full(
    state: &AppState,
    title: &str,
    body_html: String,
    user: Option<&CurrentUser>,
) -> Result<String, String> {
    let (is_logged_in, user_json) = match user {
        Some(u) => (
            true,
            json!({
                "username": u.username,
                "is_admin": u.is_admin,
            }),
        ),
        None => (false, serde_json::Value::Null),
    };

    let ctx = json!({
        "title": title,
        "body": body_html,
        "is_logged_in": is_logged_in,
        "user": user_json,
    });

    state
        .hbs
        .render("layouts/base", &ctx)
        .map_err(|e| e.to_string())
}

/// HTMX requests get the fragment, everything else the full layout.
pub fn page(
    state: &AppState,
    headers: &HeaderMap,
    status: StatusCode,
    title: &str,
    body: String,
    user: Option<&CurrentUser>,
) -> Response {
    if is_htmx(headers) {
        return (status, Html(body)).into_response();
    }

    match render_full(state, title, body, user) {
        Ok(page) => (status, Html(page)).into_response(),
        Err(e) => (StatusCode::INTERNAL_SERVER_ERROR, Html(e)).into_response(),
    }
}

pub fn alert(kind: &str, message: &str) -> Html<String> {
    Html(format!(
        r#"<div class="alert alert-{kind} mb-2">{}</div>"#,
        escape(message)
    ))
}

pub fn escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}
