use axum::{
    Form,
    extract::{Extension, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
};
use axum_extra::extract::cookie::CookieJar;
use serde::Deserialize;
use serde_json::json;

use crate::{
    AppState,
    error::AppError,
    models::CurrentUser,
    render,
    services::auth_service,
};

// ---------------- LOGIN ----------------

fn login_page(state: &AppState, headers: &HeaderMap, username: &str, errors: serde_json::Map<String, serde_json::Value>) -> Response {
    let body = render::render_partial(
        state,
        "pages/login",
        &json!({
            "values": { "username": username },
            "errors": errors,
            "seeded": state.settings.seed_default_users,
        }),
    );
    render::page(state, headers, StatusCode::OK, "Login", body, None)
}

pub async fn get_login(State(state): State<AppState>, headers: HeaderMap) -> Response {
    login_page(&state, &headers, "", serde_json::Map::new())
}

#[derive(Deserialize)]
pub struct LoginForm {
    pub username: String,
    pub password: String,
}

pub async fn post_login(
    State(state): State<AppState>,
    headers: HeaderMap,
    jar: CookieJar,
    Form(form): Form<LoginForm>,
) -> Response {
    let username = form.username.trim().to_string();
    let password = form.password;

    let mut errors = serde_json::Map::new();

    if username.is_empty() {
        errors.insert("username".into(), json!("Username is required."));
    }
    if password.is_empty() {
        errors.insert("password".into(), json!("Password is required."));
    }
    if !errors.is_empty() {
        return login_page(&state, &headers, &username, errors);
    }

    let user = match auth_service::login_user(&state, &username, &password).await {
        Ok(u) => u,
        Err(e) => {
            if !matches!(e, AppError::InvalidCredentials) {
                tracing::error!(error = %e, "login failed");
            }
            errors.insert("_form".into(), json!(e.to_string()));
            return login_page(&state, &headers, &username, errors);
        }
    };

    let token = match auth_service::make_jwt_with_days(&state.settings, &user.username, 7) {
        Ok(t) => t,
        Err(e) => {
            errors.insert("_form".into(), json!(format!("Auth error: {e}")));
            return login_page(&state, &headers, &username, errors);
        }
    };

    let jar = jar.add(auth_service::auth_cookie(&state.settings, token));

    if render::is_htmx(&headers) {
        return (jar, render::htmx_redirect("/")).into_response();
    }

    (jar, (StatusCode::SEE_OTHER, [("Location", "/")])).into_response()
}

// ---------------- REGISTER ----------------

fn register_page(
    state: &AppState,
    headers: &HeaderMap,
    username: &str,
    errors: serde_json::Map<String, serde_json::Value>,
    success: bool,
) -> Response {
    let body = render::render_partial(
        state,
        "pages/register",
        &json!({
            "values": { "username": username },
            "errors": errors,
            "success": success,
            "initial_balance": render::fmt2(state.settings.initial_balance),
        }),
    );
    render::page(state, headers, StatusCode::OK, "Register", body, None)
}

pub async fn get_register(State(state): State<AppState>, headers: HeaderMap) -> Response {
    register_page(&state, &headers, "", serde_json::Map::new(), false)
}

#[derive(Deserialize)]
pub struct RegisterForm {
    pub username: String,
    pub password: String,
}

pub async fn post_register(
    State(state): State<AppState>,
    headers: HeaderMap,
    Form(form): Form<RegisterForm>,
) -> Response {
    let username = form.username.trim().to_string();
    let password = form.password;

    let mut errors = serde_json::Map::new();

    if username.is_empty() {
        errors.insert("username".into(), json!("Username is required."));
    }
    if password.is_empty() {
        errors.insert("password".into(), json!("Password is required."));
    }
    if !errors.is_empty() {
        return register_page(&state, &headers, &username, errors, false);
    }

    match auth_service::register_user(&state, &username, &password).await {
        // registering does not log in; the user goes through /login next
        Ok(()) => register_page(&state, &headers, "", errors, true),
        Err(e) => {
            let field = match e {
                AppError::DuplicateUser(_) | AppError::InvalidInput(_) => "username",
                _ => "_form",
            };
            errors.insert(field.into(), json!(e.to_string()));
            register_page(&state, &headers, &username, errors, false)
        }
    }
}

// ---------------- LOGOUT ----------------

pub async fn logout(
    State(state): State<AppState>,
    user: Option<Extension<CurrentUser>>,
    jar: CookieJar,
) -> impl IntoResponse {
    if let Some(Extension(u)) = user {
        auth_service::logout_user(&state, &u.username).await;
    }
    let jar = jar.add(auth_service::clear_auth_cookie(&state.settings));
    (jar, (StatusCode::SEE_OTHER, [("Location", "/login")]))
}
