//! Holdings, average cost and valuation, recomputed from the ledger on every view.

use crate::{
    AppState,
    error::AppError,
    models::{AllocationSlice, PortfolioLine, PortfolioSnapshot, Side, TradeRecord},
};

pub fn net_shares(trades: &[TradeRecord], ticker: &str) -> i64 {
    trades
        .iter()
        .filter(|t| t.ticker == ticker)
        .map(|t| match t.side {
            Side::Buy => t.shares as i64,
            Side::Sell => -(t.shares as i64),
        })
        .sum()
}

/// Volume-weighted price over buys only; sells never move it.
pub fn avg_cost(trades: &[TradeRecord], ticker: &str) -> Option<f64> {
    let (qty, cost) = trades
        .iter()
        .filter(|t| t.ticker == ticker && t.side == Side::Buy)
        .fold((0u64, 0.0), |(q, c), t| (q + t.shares, c + t.value()));

    if qty == 0 { None } else { Some(cost / qty as f64) }
}

/// Tickers in the order they first appear in the ledger.
pub fn tickers(trades: &[TradeRecord]) -> Vec<&str> {
    let mut out: Vec<&str> = Vec::new();
    for t in trades {
        if !out.contains(&t.ticker.as_str()) {
            out.push(&t.ticker);
        }
    }
    out
}

pub fn portfolio_snapshot<F>(trades: &[TradeRecord], cash: f64, current_price: F) -> Result<PortfolioSnapshot, AppError>
where
    F: Fn(&str) -> Option<f64>,
{
    let mut lines = Vec::new();

    for ticker in tickers(trades) {
        let net = net_shares(trades, ticker);
        if net <= 0 {
            continue;
        }

        // net > 0 implies at least one buy
        let avg = avg_cost(trades, ticker).unwrap_or_default();
        let price = current_price(ticker).ok_or_else(|| AppError::PriceDataUnavailable(ticker.to_string()))?;

        lines.push(PortfolioLine {
            ticker: ticker.to_string(),
            net_shares: net,
            avg_cost: avg,
            current_price: price,
            market_value: net as f64 * price,
        });
    }

    let stock_value: f64 = lines.iter().map(|l| l.market_value).sum();

    Ok(PortfolioSnapshot {
        lines,
        cash,
        stock_value,
        total_assets: stock_value + cash,
    })
}

/// Pie wedges: one per holding plus cash, as shares of total assets.
pub fn allocation(snapshot: &PortfolioSnapshot) -> Vec<AllocationSlice> {
    let total = snapshot.total_assets;
    let pct = |v: f64| if total > 0.0 { v / total * 100.0 } else { 0.0 };

    snapshot
        .lines
        .iter()
        .map(|l| (l.ticker.clone(), l.market_value))
        .chain(std::iter::once(("Cash".to_string(), snapshot.cash)))
        .map(|(label, value)| AllocationSlice {
            label,
            value,
            percent: pct(value),
        })
        .collect()
}

pub async fn snapshot_for(state: &AppState, username: &str) -> Result<PortfolioSnapshot, AppError> {
    let now = state.clock.read().await.now();

    let store = state.store.lock().await;
    let cash = store.users.balance(username)?;
    portfolio_snapshot(store.ledger.trades_for(username), cash, |ticker| {
        state.price_at(ticker, now)
    })
}

/// The user's trades, newest first.
pub async fn trade_history(state: &AppState, username: &str) -> Vec<TradeRecord> {
    let store = state.store.lock().await;
    store.ledger.trades_for(username).iter().rev().cloned().collect()
}
