use std::{env, path::PathBuf, str::FromStr};

use chrono::NaiveDateTime;

use crate::services::auth_service::HashScheme;

pub const DEFAULT_MARKET_START: &str = "2018-01-03 09:30";

/// One year of market time per tick.
pub const MAX_TICK_STEP_MINUTES: i64 = 60 * 24 * 365;

#[derive(Debug, Clone)]
pub struct Settings {
    pub host: String,
    pub port: u16,

    pub jwt_secret: String,
    pub jwt_cookie_name: String,
    pub cookie_secure: bool,

    pub users_file: PathBuf,
    pub portfolio_file: PathBuf,
    pub price_csv: PathBuf,
    pub ticker: String,

    pub market_start: NaiveDateTime,
    pub tick_secs: u64,
    pub tick_step_minutes: i64,

    pub initial_balance: f64,
    pub password_hash: HashScheme,
    pub seed_default_users: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            host: "127.0.0.1".to_string(),
            port: 3000,
            jwt_secret: "change-me-dev-secret".to_string(),
            jwt_cookie_name: "auth".to_string(),
            cookie_secure: false,
            users_file: PathBuf::from("users_db.json"),
            portfolio_file: PathBuf::from("portfolios.json"),
            price_csv: PathBuf::from("aapl_2018_q1_5min.csv"),
            ticker: "AAPL".to_string(),
            market_start: parse_market_time(DEFAULT_MARKET_START)
                .unwrap_or_default(),
            tick_secs: 30,
            tick_step_minutes: 5,
            initial_balance: 10_000.0,
            password_hash: HashScheme::Sha256,
            seed_default_users: true,
        }
    }
}

/// Parses `2018-01-03 09:30` or `2018-01-03 09:30:00`.
pub fn parse_market_time(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M")
        .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S"))
        .ok()
}

fn parse_var<T: FromStr>(key: &str, default: T) -> T {
    match env::var(key) {
        Ok(raw) => match raw.trim().parse::<T>() {
            Ok(v) => v,
            Err(_) => {
                tracing::warn!(key, value = %raw, "unparsable setting, using default");
                default
            }
        },
        Err(_) => default,
    }
}

/// Keeps `value` when it is a usable cash amount: finite and not negative.
fn checked_balance(key: &str, value: f64, default: f64) -> f64 {
    if value.is_finite() && value >= 0.0 {
        value
    } else {
        tracing::warn!(key, value, "invalid amount, using default");
        default
    }
}

fn checked_step_minutes(key: &str, value: i64) -> i64 {
    let clamped = value.clamp(0, MAX_TICK_STEP_MINUTES);
    if clamped != value {
        tracing::warn!(key, value, clamped, "tick step out of range");
    }
    clamped
}

fn parse_flag(key: &str, default: bool) -> bool {
    match env::var(key) {
        Ok(raw) => match raw.trim().to_ascii_lowercase().as_str() {
            "1" | "true" | "yes" | "on" => true,
            "0" | "false" | "no" | "off" => false,
            _ => {
                tracing::warn!(key, value = %raw, "unparsable flag, using default");
                default
            }
        },
        Err(_) => default,
    }
}

pub fn load() -> Settings {
    // Loads .env if present (no crash if missing)
    dotenvy::dotenv().ok();

    let defaults = Settings::default();

    let host = env::var("HOST").unwrap_or(defaults.host);
    let port = parse_var("PORT", defaults.port);

    let jwt_secret = env::var("JWT_SECRET").unwrap_or(defaults.jwt_secret);
    let jwt_cookie_name = env::var("JWT_COOKIE_NAME").unwrap_or(defaults.jwt_cookie_name);
    let cookie_secure = parse_flag("COOKIE_SECURE", defaults.cookie_secure);

    let users_file = env::var("USERS_FILE").map(PathBuf::from).unwrap_or(defaults.users_file);
    let portfolio_file = env::var("PORTFOLIO_FILE")
        .map(PathBuf::from)
        .unwrap_or(defaults.portfolio_file);
    let price_csv = env::var("PRICE_CSV").map(PathBuf::from).unwrap_or(defaults.price_csv);
    let ticker = env::var("TICKER")
        .map(|t| t.trim().to_uppercase())
        .unwrap_or(defaults.ticker);

    let market_start = match env::var("MARKET_START") {
        Ok(raw) => parse_market_time(&raw).unwrap_or_else(|| {
            tracing::warn!(value = %raw, "unparsable MARKET_START, using default");
            defaults.market_start
        }),
        Err(_) => defaults.market_start,
    };

    let tick_secs = parse_var("TICK_SECS", defaults.tick_secs).max(1);
    let tick_step_minutes = checked_step_minutes(
        "TICK_STEP_MINUTES",
        parse_var("TICK_STEP_MINUTES", defaults.tick_step_minutes),
    );

    let initial_balance = checked_balance(
        "INITIAL_BALANCE",
        parse_var("INITIAL_BALANCE", defaults.initial_balance),
        defaults.initial_balance,
    );
    let password_hash = parse_var("PASSWORD_HASH", defaults.password_hash);
    let seed_default_users = parse_flag("SEED_DEFAULT_USERS", defaults.seed_default_users);

    Settings {
        host,
        port,
        jwt_secret,
        jwt_cookie_name,
        cookie_secure,
        users_file,
        portfolio_file,
        price_csv,
        ticker,
        market_start,
        tick_secs,
        tick_step_minutes,
        initial_balance,
        password_hash,
        seed_default_users,
    }
}
