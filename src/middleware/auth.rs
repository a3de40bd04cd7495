use axum::{
    extract::State,
    http::{HeaderMap, HeaderValue, Request, StatusCode, header},
    middleware::Next,
    response::{Html, IntoResponse, Redirect, Response},
};

use jsonwebtoken::{Algorithm, DecodingKey, Validation, decode};
use serde::{Deserialize, Serialize};

use crate::{AppState, models::CurrentUser};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    // username
    pub sub: String,
    // expiry (unix timestamp seconds)
    pub exp: usize,
}

fn get_cookie(headers: &HeaderMap, name: &str) -> Option<String> {
    let raw = headers.get(header::COOKIE)?.to_str().ok()?;

    raw.split(';')
        .filter_map(|part| part.trim().split_once('='))
        .find(|(k, _)| k.trim() == name)
        .map(|(_, v)| v.trim().to_string())
}

pub fn decode_token(state: &AppState, token: &str) -> Option<Claims> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.validate_exp = true;

    decode::<Claims>(
        token,
        &DecodingKey::from_secret(state.settings.jwt_secret.as_bytes()),
        &validation,
    )
    .ok()
    .map(|data| data.claims)
}

pub async fn inject_current_user(
    State(state): State<AppState>,
    mut req: Request<axum::body::Body>,
    next: Next,
) -> Response {
    let cookie_name = state.settings.jwt_cookie_name.as_str();

    if let Some(claims) = get_cookie(req.headers(), cookie_name).and_then(|t| decode_token(&state, &t)) {
        let user = {
            let store = state.store.lock().await;
            store.users.get(&claims.sub).map(CurrentUser::from)
        };

        if let Some(user) = user {
            // a valid cookie from before a restart still counts as logged in
            state.sessions.write().await.resume(&user.username);
            // Store user in request extensions so handlers can access it
            req.extensions_mut().insert(user);
        }
    }

    next.run(req).await
}

fn is_public_path(path: &str) -> bool {
    path == "/login"
        || path == "/register"
        || path == "/logout"
        || path == "/health"
        || path == "/favicon.ico"
        || path.starts_with("/static/")
}

pub async fn require_auth(req: Request<axum::body::Body>, next: Next) -> Response {
    let path = req.uri().path();

    if is_public_path(path) {
        return next.run(req).await;
    }

    // If inject_current_user already put CurrentUser in extensions => authenticated
    if req.extensions().get::<CurrentUser>().is_some() {
        return next.run(req).await;
    }

    // Not logged in:
    // - HTMX: force full redirect to /login
    // - event stream: 401
    // - Normal: 303 redirect to /login
    if path == "/events" {
        return StatusCode::UNAUTHORIZED.into_response();
    }

    if crate::render::is_htmx(req.headers()) {
        let mut headers = HeaderMap::new();
        headers.insert("HX-Redirect", HeaderValue::from_static("/login"));
        return (StatusCode::OK, headers, Html(String::new())).into_response();
    }

    Redirect::to("/login").into_response()
}
