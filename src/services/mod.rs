pub mod json_store;
pub mod store;
pub mod price_service;
pub mod clock;

pub mod auth_service;
pub mod user_store;
pub mod ledger;
pub mod trading_service;
pub mod portfolio_service;
