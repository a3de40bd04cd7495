use axum::{
    Json,
    extract::{Extension, State},
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};
use serde_json::json;

use crate::{AppState, models::CurrentUser, render::fmt2};

// GET /me
pub async fn me(State(state): State<AppState>, user: Option<Extension<CurrentUser>>) -> Response {
    let Some(Extension(u)) = user else {
        return (StatusCode::UNAUTHORIZED, Html("not logged in".to_string())).into_response();
    };

    let store = state.store.lock().await;
    match store.users.get(&u.username) {
        Some(rec) => (
            StatusCode::OK,
            Json(json!({
                "username": rec.username,
                "is_admin": rec.is_admin,
                "balance": rec.balance,
                "initial_balance": rec.initial_balance,
            })),
        )
            .into_response(),
        None => (StatusCode::NOT_FOUND, Html("unknown user".to_string())).into_response(),
    }
}

// GET /cash  (navbar badge)
pub async fn get_cash_badge(State(state): State<AppState>, user: Option<Extension<CurrentUser>>) -> Response {
    let Some(Extension(u)) = user else {
        return (StatusCode::OK, Html(String::new())).into_response();
    };

    let balance = state.store.lock().await.users.balance(&u.username);
    match balance {
        Ok(cash) => (StatusCode::OK, Html(format!("Cash: ${}", fmt2(cash)))).into_response(),
        Err(e) => (e.status(), Html(e.to_string())).into_response(),
    }
}
