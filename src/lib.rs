//! Library entrypoint for mock-invest.
//!
//! The binary only loads settings and serves `routes::app`; integration tests
//! under `tests/` build the same `AppState` against temporary files.

use std::sync::Arc;

use chrono::NaiveDateTime;
use tokio::sync::{Mutex, RwLock, broadcast};

pub mod config;
pub mod error;
pub mod models;

#[path = "middleware/auth.rs"]
pub mod auth;

pub mod services;

#[path = "views/render.rs"]
pub mod render;
#[path = "views/templates.rs"]
pub mod templates;

pub mod controllers;
pub mod routes;

use error::AppError;
use models::Sessions;
use services::{clock::SimClock, price_service::PriceSeries, store::Store};

#[derive(Clone)]
pub struct AppState {
    pub hbs: templates::Hbs,
    pub settings: config::Settings,
    pub prices: Arc<PriceSeries>,
    pub store: Arc<Mutex<Store>>,
    pub clock: Arc<RwLock<SimClock>>,
    pub sessions: Arc<RwLock<Sessions>>,
    pub events_tx: broadcast::Sender<String>,
}

impl AppState {
    pub fn new(settings: config::Settings, prices: PriceSeries, store: Store) -> Result<Self, AppError> {
        let clock = SimClock::new(settings.market_start, settings.tick_step_minutes, prices.last_timestamp());
        let (events_tx, _events_rx) = broadcast::channel::<String>(64);

        Ok(AppState {
            hbs: templates::build_handlebars()?,
            settings,
            prices: Arc::new(prices),
            store: Arc::new(Mutex::new(store)),
            clock: Arc::new(RwLock::new(clock)),
            sessions: Arc::new(RwLock::new(Sessions::default())),
            events_tx,
        })
    }

    /// Loads the price series and both stores named in `settings`.
    pub fn init(settings: config::Settings) -> Result<Self, AppError> {
        let prices = PriceSeries::load_csv(&settings.price_csv, &settings.ticker)?;
        if prices.is_empty() {
            tracing::warn!(path = %settings.price_csv.display(), "price series has no bars");
        }
        let store = Store::load(&settings)?;
        if store.users.is_empty() {
            tracing::warn!("no users yet, register an account to log in");
        }
        Self::new(settings, prices, store)
    }

    /// Simulated price of `ticker` at `t`; `None` for tickers without a series.
    pub fn price_at(&self, ticker: &str, t: NaiveDateTime) -> Option<f64> {
        if ticker.eq_ignore_ascii_case(self.prices.ticker()) {
            self.prices.current_price(t)
        } else {
            None
        }
    }
}
