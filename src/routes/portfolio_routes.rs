use axum::{Router, routing::get};

use crate::{AppState, controllers::{portfolio_controller, view_controller}};

pub fn add_routes(router: Router<AppState>) -> Router<AppState> {
    router
        .route("/portfolio", get(view_controller::get_portfolio))
        .route("/portfolio/holdings", get(portfolio_controller::get_holdings))
        .route("/portfolio/trades", get(portfolio_controller::get_trades))
}
