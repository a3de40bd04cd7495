use axum::{
    extract::{Extension, Path, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Redirect, Response},
};
use serde_json::json;

use crate::{
    AppState,
    models::{CurrentUser, View},
    render,
};

fn view_body(state: &AppState, view: View) -> String {
    match view {
        View::Home => render::render_partial(state, "pages/home", &json!({})),
        View::Trade => render::render_partial(state, "pages/trade", &json!({ "ticker": state.prices.ticker() })),
        View::Portfolio => render::render_partial(state, "pages/portfolio", &json!({})),
        View::LoggedOut => String::new(),
    }
}

async fn select_and_render(
    state: &AppState,
    headers: &HeaderMap,
    user: Option<&CurrentUser>,
    target: View,
) -> Response {
    let Some(u) = user else {
        return Redirect::to(View::LoggedOut.path()).into_response();
    };

    let view = match state.sessions.write().await.select(&u.username, target) {
        Ok(v) => v,
        Err(e) => return (e.status(), render::alert("danger", &e.to_string())).into_response(),
    };
    tracing::debug!(username = %u.username, view = view.name(), "view selected");

    render::page(state, headers, StatusCode::OK, view.title(), view_body(state, view), Some(u))
}

// GET /  (whatever view the session has selected)
pub async fn root(
    State(state): State<AppState>,
    headers: HeaderMap,
    user: Option<Extension<CurrentUser>>,
) -> Response {
    let Some(Extension(u)) = user else {
        return Redirect::to(View::LoggedOut.path()).into_response();
    };

    let view = state.sessions.read().await.view_of(&u.username);
    if view == View::LoggedOut {
        return Redirect::to(View::LoggedOut.path()).into_response();
    }

    render::page(&state, &headers, StatusCode::OK, view.title(), view_body(&state, view), Some(&u))
}

// GET /view/:name  (HTMX menu)
pub async fn get_view(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(name): Path<String>,
    user: Option<Extension<CurrentUser>>,
) -> Response {
    let Some(view) = View::from_name(&name) else {
        return (StatusCode::NOT_FOUND, render::alert("warning", "Unknown view.")).into_response();
    };
    select_and_render(&state, &headers, user.as_ref().map(|Extension(u)| u), view).await
}

pub async fn get_home(
    State(state): State<AppState>,
    headers: HeaderMap,
    user: Option<Extension<CurrentUser>>,
) -> Response {
    select_and_render(&state, &headers, user.as_ref().map(|Extension(u)| u), View::Home).await
}

pub async fn get_trade(
    State(state): State<AppState>,
    headers: HeaderMap,
    user: Option<Extension<CurrentUser>>,
) -> Response {
    select_and_render(&state, &headers, user.as_ref().map(|Extension(u)| u), View::Trade).await
}

pub async fn get_portfolio(
    State(state): State<AppState>,
    headers: HeaderMap,
    user: Option<Extension<CurrentUser>>,
) -> Response {
    select_and_render(&state, &headers, user.as_ref().map(|Extension(u)| u), View::Portfolio).await
}
