#![allow(dead_code)]

use axum::{
    body::Body,
    http::{Request, header},
    response::Response,
};
use http_body_util::BodyExt;
use mockinvest::{
    AppState,
    config::{Settings, parse_market_time},
    models::PriceBar,
    services::{auth_service, price_service::PriceSeries, store::Store},
};
use tempfile::TempDir;

pub struct TestApp {
    pub state: AppState,
    // keeps the store files alive for the test
    pub dir: TempDir,
}

fn bar(at: &str, close: f64) -> PriceBar {
    PriceBar {
        timestamp: parse_market_time(at).unwrap(),
        close,
    }
}

/// Seeded `admin`/`user1` accounts, AAPL at 100.00 on the opening bar
/// and 170.00 at the previous day's close.
pub fn test_app() -> TestApp {
    let dir = tempfile::tempdir().unwrap();

    let settings = Settings {
        users_file: dir.path().join("users_db.json"),
        portfolio_file: dir.path().join("portfolios.json"),
        jwt_secret: "test-secret".to_string(),
        ..Settings::default()
    };

    let prices = PriceSeries::new(
        "AAPL",
        vec![
            bar("2018-01-02 15:55", 170.0),
            bar("2018-01-03 09:30", 100.0),
            bar("2018-01-03 09:35", 101.0),
        ],
    );

    let store = Store::load(&settings).unwrap();
    let state = AppState::new(settings, prices, store).unwrap();
    TestApp { state, dir }
}

pub fn app(t: &TestApp) -> axum::Router {
    mockinvest::routes::app(t.state.clone())
}

pub fn auth_cookie(t: &TestApp, username: &str) -> String {
    let token = auth_service::make_jwt_with_days(&t.state.settings, username, 1).unwrap();
    format!("{}={}", t.state.settings.jwt_cookie_name, token)
}

pub fn get(uri: &str, cookie: Option<&str>) -> Request<Body> {
    let mut b = Request::builder().method("GET").uri(uri);
    if let Some(c) = cookie {
        b = b.header(header::COOKIE, c);
    }
    b.body(Body::empty()).unwrap()
}

pub fn post_form(uri: &str, body: &str, cookie: Option<&str>) -> Request<Body> {
    let mut b = Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded");
    if let Some(c) = cookie {
        b = b.header(header::COOKIE, c);
    }
    b.body(Body::from(body.to_string())).unwrap()
}

pub async fn response_body_string(res: Response) -> String {
    let bytes = res.into_body().collect().await.unwrap().to_bytes();
    String::from_utf8_lossy(&bytes).to_string()
}
