use axum::{Router, routing::get};

use crate::{AppState, controllers::{trading_controller, view_controller}};

pub fn add_routes(router: Router<AppState>) -> Router<AppState> {
    router
        .route("/trade", get(view_controller::get_trade).post(trading_controller::post_trade))
        .route("/trade/estimate", get(trading_controller::get_estimate))
}
