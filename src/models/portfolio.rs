use serde::Serialize;

/// A held ticker, derived from the ledger on every view.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PortfolioLine {
    pub ticker: String,
    pub net_shares: i64,
    pub avg_cost: f64,
    pub current_price: f64,
    pub market_value: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PortfolioSnapshot {
    pub lines: Vec<PortfolioLine>,
    pub cash: f64,
    pub stock_value: f64,
    pub total_assets: f64,
}

/// One wedge of the allocation pie.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AllocationSlice {
    pub label: String,
    pub value: f64,
    pub percent: f64,
}
