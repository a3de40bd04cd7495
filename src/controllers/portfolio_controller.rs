use axum::{
    extract::{Extension, State},
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};
use serde_json::json;

use crate::{
    AppState,
    models::{AllocationSlice, CurrentUser, Side, trade::TRADE_DATE_FORMAT},
    render::{self, fmt2},
    services::portfolio_service,
};

const PIE_COLORS: &[&str] = &["#0d6efd", "#198754", "#fd7e14", "#6f42c1", "#d63384"];
const CASH_COLOR: &str = "#adb5bd";

fn slice_color(i: usize, slice: &AllocationSlice, last: bool) -> &'static str {
    // cash is always the final wedge
    if last && slice.label == "Cash" {
        CASH_COLOR
    } else {
        PIE_COLORS[i % PIE_COLORS.len()]
    }
}

/// `conic-gradient` stops for the allocation pie.
fn pie_gradient(slices: &[AllocationSlice]) -> String {
    let mut start = 0.0;
    let mut stops = Vec::with_capacity(slices.len());
    for (i, s) in slices.iter().enumerate() {
        let end = start + s.percent;
        stops.push(format!(
            "{} {:.2}% {:.2}%",
            slice_color(i, s, i + 1 == slices.len()),
            start,
            end
        ));
        start = end;
    }
    stops.join(", ")
}

// GET /portfolio/holdings (HTMX partial)
pub async fn get_holdings(
    State(state): State<AppState>,
    user: Option<Extension<CurrentUser>>,
) -> Response {
    let Some(Extension(u)) = user else {
        return (StatusCode::UNAUTHORIZED, Html("Unauthorized".to_string())).into_response();
    };

    let snapshot = match portfolio_service::snapshot_for(&state, &u.username).await {
        Ok(s) => s,
        Err(e) => return (StatusCode::OK, render::alert("warning", &e.to_string())).into_response(),
    };

    let slices = portfolio_service::allocation(&snapshot);

    let lines: Vec<serde_json::Value> = snapshot
        .lines
        .iter()
        .map(|l| {
            json!({
                "ticker": l.ticker,
                "net_shares": l.net_shares,
                "avg_cost": fmt2(l.avg_cost),
                "current_price": fmt2(l.current_price),
                "market_value": fmt2(l.market_value),
            })
        })
        .collect();

    let slice_items: Vec<serde_json::Value> = slices
        .iter()
        .enumerate()
        .map(|(i, s)| {
            json!({
                "label": s.label,
                "percent": format!("{:.1}", s.percent),
                "color": slice_color(i, s, i + 1 == slices.len()),
            })
        })
        .collect();

    let html = render::render_partial(
        &state,
        "partials/holdings",
        &json!({
            "has_lines": !lines.is_empty(),
            "lines": lines,
            "slices": slice_items,
            "pie_gradient": pie_gradient(&slices),
            "cash": fmt2(snapshot.cash),
            "stock_value": fmt2(snapshot.stock_value),
            "total_assets": fmt2(snapshot.total_assets),
        }),
    );

    (StatusCode::OK, Html(html)).into_response()
}

// GET /portfolio/trades (HTMX partial)
pub async fn get_trades(
    State(state): State<AppState>,
    user: Option<Extension<CurrentUser>>,
) -> Response {
    let Some(Extension(u)) = user else {
        let html = render::render_partial(&state, "partials/trades_list", &json!({ "items": [] }));
        return (StatusCode::OK, Html(html)).into_response();
    };

    let items: Vec<serde_json::Value> = portfolio_service::trade_history(&state, &u.username)
        .await
        .into_iter()
        .map(|t| {
            json!({
                "date": t.timestamp.format(TRADE_DATE_FORMAT).to_string(),
                "ticker": t.ticker,
                "side": t.side.as_str(),
                "side_class": if t.side == Side::Buy { "text-success" } else { "text-danger" },
                "shares": t.shares,
                "price": fmt2(t.price),
                "total": fmt2(t.value()),
            })
        })
        .collect();

    let html = render::render_partial(
        &state,
        "partials/trades_list",
        &json!({ "has_items": !items.is_empty(), "items": items }),
    );

    (StatusCode::OK, Html(html)).into_response()
}
