use chrono::NaiveDateTime;

use crate::{
    AppState,
    error::AppError,
    models::{Side, TradeRecord},
    services::store::Store,
};

pub const ORDERS_UPDATED: &str = "ordersUpdated";
pub const POSITION_UPDATED: &str = "positionUpdated";
pub const CASH_UPDATED: &str = "cashUpdated";

#[derive(Debug, Clone)]
pub struct TradeResult {
    pub trade: TradeRecord,
    pub new_cash: f64,
    pub owned: i64,
}

/// Applies one order at a known price and saves both documents.
///
/// If saving fails the balance and ledger are put back as they were, the
/// previous state is re-written best effort, and the write error is returned.
pub fn execute_trade(
    store: &mut Store,
    username: &str,
    ticker: &str,
    side: Side,
    shares: u64,
    price: f64,
    at: NaiveDateTime,
) -> Result<TradeResult, AppError> {
    if shares == 0 {
        return Err(AppError::InvalidQuantity);
    }
    if !price.is_finite() || price <= 0.0 {
        return Err(AppError::PriceDataUnavailable(ticker.to_string()));
    }

    let balance = store.users.balance(username)?;
    let value = price * shares as f64;

    let new_cash = match side {
        Side::Buy => {
            if balance < value {
                return Err(AppError::InsufficientFunds {
                    required: value,
                    available: balance,
                });
            }
            balance - value
        }
        Side::Sell => {
            let owned = store.ledger.net_shares(username, ticker);
            if owned < shares as i64 {
                return Err(AppError::InsufficientShares {
                    owned,
                    requested: shares,
                });
            }
            balance + value
        }
    };

    let trade = TradeRecord {
        ticker: ticker.to_string(),
        shares,
        price,
        side,
        timestamp: at,
    };

    store.users.set_balance(username, new_cash)?;
    store.ledger.append(username, trade.clone());

    if let Err(e) = store.save_all() {
        store.ledger.pop_last(username);
        store.users.set_balance(username, balance)?;
        if let Err(restore) = store.save_all() {
            tracing::warn!(error = %restore, "could not restore stores after failed trade");
        }
        tracing::error!(username, error = %e, "trade rolled back");
        return Err(e);
    }

    Ok(TradeResult {
        owned: store.ledger.net_shares(username, ticker),
        trade,
        new_cash,
    })
}

/// Executes a market order at the simulated clock's current price.
pub async fn place_order(
    state: &AppState,
    username: &str,
    ticker: &str,
    side: Side,
    shares: u64,
) -> Result<TradeResult, AppError> {
    let ticker = ticker.trim().to_uppercase();
    if ticker.is_empty() {
        return Err(AppError::InvalidInput("Missing ticker.".into()));
    }
    if shares == 0 {
        return Err(AppError::InvalidQuantity);
    }

    let now = state.clock.read().await.now();
    let price = state
        .price_at(&ticker, now)
        .ok_or_else(|| AppError::PriceDataUnavailable(ticker.clone()))?;

    let result = {
        let mut store = state.store.lock().await;
        execute_trade(&mut store, username, &ticker, side, shares, price, now)?
    };

    tracing::info!(
        username,
        ticker = %ticker,
        side = %side,
        shares,
        price,
        cash = result.new_cash,
        "trade executed"
    );

    // broadcast so other tabs/pages update
    let _ = state.events_tx.send(ORDERS_UPDATED.to_string());
    let _ = state.events_tx.send(POSITION_UPDATED.to_string());
    let _ = state.events_tx.send(CASH_UPDATED.to_string());

    Ok(result)
}

/// Shares the user holds of `ticker` and their cash, for the trade form.
pub async fn holding(state: &AppState, username: &str, ticker: &str) -> Result<(i64, f64), AppError> {
    let store = state.store.lock().await;
    Ok((store.ledger.net_shares(username, ticker), store.users.balance(username)?))
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::*;
    use crate::{
        config::parse_market_time,
        services::{auth_service, ledger::TradeLedger, user_store::UserStore},
    };

    fn at() -> NaiveDateTime {
        parse_market_time("2018-01-03 09:30").unwrap()
    }

    fn store_in(dir: &std::path::Path) -> Store {
        let mut users = UserStore::load(&dir.join("users_db.json"), 10_000.0, false).unwrap();
        let hash = auth_service::hash_password(auth_service::HashScheme::Sha256, "pw").unwrap();
        users.register("alice", hash).unwrap();
        Store {
            users,
            ledger: TradeLedger::load(&dir.join("portfolios.json")).unwrap(),
        }
    }

    #[test]
    fn buy_debits_exactly_and_sell_credits_exactly() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = store_in(dir.path());

        let before = store.users.balance("alice").unwrap();
        let r = execute_trade(&mut store, "alice", "AAPL", Side::Buy, 7, 172.53, at()).unwrap();
        assert_eq!(r.new_cash, before - 172.53 * 7.0);
        assert_eq!(store.users.balance("alice").unwrap(), r.new_cash);
        assert_eq!(r.owned, 7);

        let before = r.new_cash;
        let r = execute_trade(&mut store, "alice", "AAPL", Side::Sell, 3, 180.25, at()).unwrap();
        assert_eq!(r.new_cash, before + 180.25 * 3.0);
        assert_eq!(r.owned, 4);
    }

    #[test]
    fn buy_beyond_cash_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = store_in(dir.path());

        let err = execute_trade(&mut store, "alice", "AAPL", Side::Buy, 101, 100.0, at()).unwrap_err();
        assert!(matches!(err, AppError::InsufficientFunds { .. }));
        assert_eq!(store.users.balance("alice").unwrap(), 10_000.0);
        assert!(store.ledger.trades_for("alice").is_empty());

        // spending the whole balance is allowed
        let r = execute_trade(&mut store, "alice", "AAPL", Side::Buy, 100, 100.0, at()).unwrap();
        assert_eq!(r.new_cash, 0.0);
    }

    #[test]
    fn oversell_is_rejected_without_a_partial_trade() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = store_in(dir.path());
        execute_trade(&mut store, "alice", "AAPL", Side::Buy, 5, 100.0, at()).unwrap();
        let cash = store.users.balance("alice").unwrap();

        let err = execute_trade(&mut store, "alice", "AAPL", Side::Sell, 6, 100.0, at()).unwrap_err();
        assert!(matches!(err, AppError::InsufficientShares { owned: 5, requested: 6 }));
        assert_eq!(store.ledger.trades_for("alice").len(), 1);
        assert_eq!(store.users.balance("alice").unwrap(), cash);
    }

    #[test]
    fn net_shares_never_goes_negative() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = store_in(dir.path());

        let orders = [
            (Side::Sell, 1),
            (Side::Buy, 3),
            (Side::Sell, 2),
            (Side::Sell, 2),
            (Side::Buy, 1),
            (Side::Sell, 2),
            (Side::Sell, 1),
        ];
        for (side, qty) in orders {
            let _ = execute_trade(&mut store, "alice", "AAPL", side, qty, 10.0, at());
            assert!(store.ledger.net_shares("alice", "AAPL") >= 0);
        }
        assert_eq!(store.ledger.net_shares("alice", "AAPL"), 0);
    }

    #[test]
    fn zero_shares_and_unknown_user_are_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = store_in(dir.path());
        assert!(matches!(
            execute_trade(&mut store, "alice", "AAPL", Side::Buy, 0, 10.0, at()),
            Err(AppError::InvalidQuantity)
        ));
        assert!(matches!(
            execute_trade(&mut store, "mallory", "AAPL", Side::Buy, 1, 10.0, at()),
            Err(AppError::UnknownUser(_))
        ));
    }

    #[test]
    fn trade_is_saved_to_both_documents() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = store_in(dir.path());
        execute_trade(&mut store, "alice", "AAPL", Side::Buy, 2, 50.0, at()).unwrap();

        let users: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(dir.path().join("users_db.json")).unwrap()).unwrap();
        assert_eq!(users["alice"]["balance"], 9_900.0);

        let ledger = TradeLedger::load(&dir.path().join("portfolios.json")).unwrap();
        assert_eq!(ledger.net_shares("alice", "AAPL"), 2);
    }

    #[test]
    fn failed_save_rolls_back() {
        let dir = tempfile::tempdir().unwrap();
        let mut users = UserStore::load(&dir.path().join("users_db.json"), 10_000.0, false).unwrap();
        let hash = auth_service::hash_password(auth_service::HashScheme::Sha256, "pw").unwrap();
        users.register("alice", hash).unwrap();
        let mut store = Store {
            users,
            // the portfolios document cannot be written
            ledger: TradeLedger::load(&dir.path().join("missing/portfolios.json")).unwrap(),
        };

        let err = execute_trade(&mut store, "alice", "AAPL", Side::Buy, 2, 50.0, at()).unwrap_err();
        assert!(matches!(err, AppError::PersistenceWriteFailure { .. }));
        assert_eq!(store.users.balance("alice").unwrap(), 10_000.0);
        assert!(store.ledger.trades_for("alice").is_empty());

        let on_disk: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(dir.path().join("users_db.json")).unwrap()).unwrap();
        assert_eq!(on_disk["alice"]["balance"], 10_000.0);
    }
}
