//! Append-only trade log per user, backed by the portfolios document.

use std::{
    collections::BTreeMap,
    path::{Path, PathBuf},
};

use crate::{
    error::AppError,
    models::TradeRecord,
    services::{json_store, portfolio_service},
};

#[derive(Debug)]
pub struct TradeLedger {
    path: PathBuf,
    portfolios: BTreeMap<String, Vec<TradeRecord>>,
}

fn validate(path: &Path, portfolios: &BTreeMap<String, Vec<TradeRecord>>) -> Result<(), AppError> {
    for (user, trades) in portfolios {
        for (i, t) in trades.iter().enumerate() {
            let reason = if t.ticker.trim().is_empty() {
                Some("empty ticker")
            } else if t.shares == 0 {
                Some("zero shares")
            } else if !t.price.is_finite() || t.price <= 0.0 {
                Some("invalid price")
            } else {
                None
            };

            if let Some(reason) = reason {
                return Err(AppError::StoreCorrupt {
                    path: path.to_path_buf(),
                    reason: format!("trade #{i} of {user:?}: {reason}"),
                });
            }
        }
    }
    Ok(())
}

impl TradeLedger {
    pub fn load(path: &Path) -> Result<Self, AppError> {
        let portfolios = json_store::load::<BTreeMap<String, Vec<TradeRecord>>>(path)?.unwrap_or_default();
        validate(path, &portfolios)?;

        tracing::info!(
            users = portfolios.len(),
            trades = portfolios.values().map(Vec::len).sum::<usize>(),
            path = %path.display(),
            "loaded trade ledger"
        );

        Ok(TradeLedger {
            path: path.to_path_buf(),
            portfolios,
        })
    }

    /// Trades in the order they were placed.
    pub fn trades_for(&self, username: &str) -> &[TradeRecord] {
        self.portfolios.get(username).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn net_shares(&self, username: &str, ticker: &str) -> i64 {
        portfolio_service::net_shares(self.trades_for(username), ticker)
    }

    pub(crate) fn append(&mut self, username: &str, trade: TradeRecord) {
        self.portfolios.entry(username.to_string()).or_default().push(trade);
    }

    /// Undoes the latest `append` for `username`.
    pub(crate) fn pop_last(&mut self, username: &str) -> Option<TradeRecord> {
        let trades = self.portfolios.get_mut(username)?;
        let last = trades.pop();
        if trades.is_empty() {
            self.portfolios.remove(username);
        }
        last
    }

    pub fn save(&self) -> Result<(), AppError> {
        json_store::save(&self.path, &self.portfolios)
    }
}
