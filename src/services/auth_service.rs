use std::str::FromStr;

use axum_extra::extract::cookie::{Cookie, SameSite};
use chrono::{Duration, Utc};
use jsonwebtoken::{EncodingKey, Header, encode};
use regex::Regex;
use sha2::{Digest, Sha256};

use crate::{AppState, config::Settings, error::AppError, models::CurrentUser};

/// How new passwords are hashed.
///
/// `Sha256` is an unsalted hex digest. It is what existing users files
/// contain and what the simulator has always written, and it is weak:
/// identical passwords produce identical hashes and the digest is cheap to
/// brute-force. `Bcrypt` is the salted alternative; stored hashes of either
/// kind verify regardless of the configured scheme.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HashScheme {
    Sha256,
    Bcrypt,
}

impl FromStr for HashScheme {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "sha256" => Ok(HashScheme::Sha256),
            "bcrypt" => Ok(HashScheme::Bcrypt),
            other => Err(format!("unknown password hash scheme {other:?}")),
        }
    }
}

fn sha256_hex(password: &str) -> String {
    hex::encode(Sha256::digest(password.as_bytes()))
}

pub fn hash_password(scheme: HashScheme, password: &str) -> Result<String, AppError> {
    match scheme {
        HashScheme::Sha256 => Ok(sha256_hex(password)),
        HashScheme::Bcrypt => Ok(bcrypt::hash(password, bcrypt::DEFAULT_COST)?),
    }
}

pub fn verify_password(password: &str, stored: &str) -> bool {
    if stored.starts_with("$2") {
        bcrypt::verify(password, stored).unwrap_or(false)
    } else {
        sha256_hex(password).eq_ignore_ascii_case(stored)
    }
}

pub fn validate_username(username: &str) -> Result<(), AppError> {
    let re = Regex::new(r"^[A-Za-z0-9_.\-]{2,32}$")
        .map_err(|e| AppError::InvalidInput(e.to_string()))?;
    if re.is_match(username) {
        Ok(())
    } else {
        Err(AppError::InvalidInput(
            "Username must be 2-32 letters, digits, '.', '_' or '-'.".into(),
        ))
    }
}

#[derive(serde::Serialize)]
struct Claims {
    sub: String,
    exp: usize,
}

pub fn make_jwt_with_days(settings: &Settings, username: &str, days: i64) -> Result<String, AppError> {
    let exp = (Utc::now() + Duration::days(days)).timestamp() as usize;

    let claims = Claims {
        sub: username.to_string(),
        exp,
    };

    Ok(encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(settings.jwt_secret.as_bytes()),
    )?)
}

pub fn auth_cookie(settings: &Settings, token: String) -> Cookie<'static> {
    let mut cookie = Cookie::new(settings.jwt_cookie_name.clone(), token);
    cookie.set_http_only(true);
    cookie.set_same_site(SameSite::Lax);
    cookie.set_path("/");
    if settings.cookie_secure {
        cookie.set_secure(true);
    }
    cookie
}

pub fn clear_auth_cookie(settings: &Settings) -> Cookie<'static> {
    let mut cookie = Cookie::new(settings.jwt_cookie_name.clone(), "");
    cookie.set_path("/");
    cookie.set_http_only(true);
    cookie.set_same_site(SameSite::Lax);
    cookie.make_removal();
    cookie
}

/// Checks credentials and moves the user's session from `LoggedOut` to `Home`.
pub async fn login_user(state: &AppState, username: &str, password: &str) -> Result<CurrentUser, AppError> {
    let user = {
        let store = state.store.lock().await;
        CurrentUser::from(store.users.authenticate(username, password)?)
    };

    state.sessions.write().await.login(&user.username);
    tracing::info!(username = %user.username, "login");
    Ok(user)
}

pub async fn register_user(state: &AppState, username: &str, password: &str) -> Result<(), AppError> {
    validate_username(username)?;
    if password.is_empty() {
        return Err(AppError::InvalidInput("Password is required.".into()));
    }

    let hash = hash_password(state.settings.password_hash, password)?;

    let mut store = state.store.lock().await;
    store.users.register(username, hash)?;
    tracing::info!(username, "registered");
    Ok(())
}

pub async fn logout_user(state: &AppState, username: &str) {
    state.sessions.write().await.logout(username);
    tracing::info!(username, "logout");
}
