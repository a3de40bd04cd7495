use axum::{
    extract::{Extension, State},
    http::{HeaderMap, StatusCode},
    response::{Html, IntoResponse, Response},
};
use serde_json::json;

use crate::{
    AppState,
    models::{CurrentUser, trade::TRADE_DATE_FORMAT},
    render::{self, fmt2},
};

// GET /market/quote  (HTMX partial, re-fetched on every clock tick)
pub async fn get_quote(State(state): State<AppState>) -> Response {
    let now = state.clock.read().await.now();
    let ticker = state.prices.ticker();

    let price = state.prices.current_price(now);
    let previous = state.prices.previous_close(now);
    let change = state.prices.day_change(now);

    let change_class = match change {
        Some((c, _)) if c > 0.0 => "text-success",
        Some((c, _)) if c < 0.0 => "text-danger",
        _ => "text-muted",
    };

    let ctx = json!({
        "market_time": now.format(TRADE_DATE_FORMAT).to_string(),
        "ticker": ticker,
        "has_price": price.is_some(),
        "price": price.map(fmt2),
        "has_change": change.is_some(),
        "previous_close": previous.map(fmt2),
        "change": change.map(|(c, _)| format!("{}{}", if c > 0.0 { "+" } else { "" }, fmt2(c))),
        "change_pct": change.map(|(_, p)| format!("{}{}", if p > 0.0 { "+" } else { "" }, fmt2(p))),
        "change_class": change_class,
    });

    (StatusCode::OK, Html(render::render_partial(&state, "partials/quote", &ctx))).into_response()
}

pub async fn not_found(
    State(state): State<AppState>,
    headers: HeaderMap,
    user: Option<Extension<CurrentUser>>,
) -> Response {
    let body = render::render_partial(&state, "pages/not_found", &json!({}));
    let user_ref = user.as_ref().map(|Extension(u)| u);
    render::page(&state, &headers, StatusCode::NOT_FOUND, "404", body, user_ref)
}

pub async fn health() -> impl IntoResponse {
    (StatusCode::OK, Html("ok".to_string()))
}
