use axum::{Router, routing::get};
use crate::{AppState, controllers::{home_controller, view_controller}};

pub fn add_routes(router: Router<AppState>) -> Router<AppState> {
    router
        .route("/", get(view_controller::root))
        .route("/home", get(view_controller::get_home))
        .route("/view/:name", get(view_controller::get_view))
        .route("/market/quote", get(home_controller::get_quote))
        .route("/health", get(home_controller::health))
}
