use axum::{
    extract::{Extension, Form, Query, State},
    http::{HeaderMap, StatusCode},
    response::{Html, IntoResponse, Response},
};
use serde::Deserialize;
use serde_json::json;

use crate::{
    AppState,
    error::AppError,
    models::{CurrentUser, Side},
    render::{self, fmt2},
    services::trading_service::{self, CASH_UPDATED, ORDERS_UPDATED, POSITION_UPDATED},
};

fn unauthorized_snippet() -> Response {
    (StatusCode::UNAUTHORIZED, render::alert("danger", "Unauthorized")).into_response()
}

fn parse_quantity(raw: &str) -> Result<u64, AppError> {
    match raw.trim().parse::<u64>() {
        Ok(q) if q > 0 => Ok(q),
        _ => Err(AppError::InvalidQuantity),
    }
}

#[derive(Deserialize)]
pub struct EstimateQuery {
    #[serde(default)]
    pub quantity: Option<String>,
}

// GET /trade/estimate?quantity=3  (HTMX partial)
pub async fn get_estimate(
    State(state): State<AppState>,
    Query(q): Query<EstimateQuery>,
    user: Option<Extension<CurrentUser>>,
) -> Response {
    let Some(Extension(u)) = user else {
        return unauthorized_snippet();
    };

    // an empty box estimates one share; anything else must be a valid quantity
    let quantity = match q.quantity.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
        None => 1,
        Some(raw) => match parse_quantity(raw) {
            Ok(n) => n,
            Err(e) => return (StatusCode::OK, render::alert("warning", &e.to_string())).into_response(),
        },
    };
    let ticker = state.prices.ticker();
    let now = state.clock.read().await.now();
    let price = state.price_at(ticker, now);

    let (owned, cash) = match trading_service::holding(&state, &u.username, ticker).await {
        Ok(h) => h,
        Err(e) => return (e.status(), render::alert("danger", &e.to_string())).into_response(),
    };

    let html = render::render_partial(
        &state,
        "partials/trade_estimate",
        &json!({
            "has_price": price.is_some(),
            "price": price.map(fmt2),
            "owned": owned,
            "cash": fmt2(cash),
            "estimate": price.map(|p| fmt2(p * quantity as f64)),
        }),
    );

    (StatusCode::OK, Html(html)).into_response()
}

#[derive(Deserialize)]
pub struct TradeForm {
    #[serde(default)]
    pub ticker: Option<String>,
    pub side: String,
    pub quantity: String,
}

// POST /trade
pub async fn post_trade(
    State(state): State<AppState>,
    user: Option<Extension<CurrentUser>>,
    Form(form): Form<TradeForm>,
) -> Response {
    let Some(Extension(u)) = user else {
        return unauthorized_snippet();
    };

    let Some(side) = Side::parse(&form.side) else {
        return (StatusCode::OK, render::alert("danger", "Choose buy or sell.")).into_response();
    };

    let quantity = match parse_quantity(&form.quantity) {
        Ok(q) => q,
        Err(e) => return (StatusCode::OK, render::alert("danger", &e.to_string())).into_response(),
    };

    let ticker = form.ticker.unwrap_or_else(|| state.prices.ticker().to_string());

    let result = match trading_service::place_order(&state, &u.username, &ticker, side, quantity).await {
        Ok(r) => r,
        // every failure is reported in the form; nothing here is fatal
        Err(e) => return (StatusCode::OK, render::alert("danger", &e.to_string())).into_response(),
    };

    let verb = match side {
        Side::Buy => "Bought",
        Side::Sell => "Sold",
    };

    let mut headers = HeaderMap::new();
    headers.insert(
        "HX-Trigger",
        render::hx_trigger_value(&[CASH_UPDATED, POSITION_UPDATED, ORDERS_UPDATED]),
    );

    (
        StatusCode::OK,
        headers,
        render::alert(
            "success",
            &format!(
                "{} {} {} @ ${} (total ${}). Cash: ${}. You now own {}.",
                verb,
                result.trade.shares,
                result.trade.ticker,
                fmt2(result.trade.price),
                fmt2(result.trade.value()),
                fmt2(result.new_cash),
                result.owned
            ),
        ),
    )
        .into_response()
}
