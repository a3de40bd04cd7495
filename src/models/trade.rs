use std::fmt;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

pub const TRADE_DATE_FORMAT: &str = "%Y-%m-%d %H:%M";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Side {
    // Korean labels are what the first portfolios.json files were written with
    #[serde(rename = "buy", alias = "BUY", alias = "매수")]
    Buy,
    #[serde(rename = "sell", alias = "SELL", alias = "매도")]
    Sell,
}

impl Side {
    pub fn as_str(&self) -> &'static str {
        match self {
            Side::Buy => "buy",
            Side::Sell => "sell",
        }
    }

    pub fn parse(raw: &str) -> Option<Side> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "buy" => Some(Side::Buy),
            "sell" => Some(Side::Sell),
            _ => None,
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An executed order. Appended to the ledger and never modified.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TradeRecord {
    pub ticker: String,
    pub shares: u64,
    pub price: f64,
    #[serde(rename = "type")]
    pub side: Side,
    #[serde(rename = "date", with = "trade_date")]
    pub timestamp: NaiveDateTime,
}

impl TradeRecord {
    pub fn value(&self) -> f64 {
        self.price * self.shares as f64
    }
}

mod trade_date {
    use chrono::NaiveDateTime;
    use serde::{Deserialize, Deserializer, Serializer, de::Error};

    use super::TRADE_DATE_FORMAT;

    pub fn serialize<S: Serializer>(t: &NaiveDateTime, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&t.format(TRADE_DATE_FORMAT).to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<NaiveDateTime, D::Error> {
        let raw = String::deserialize(d)?;
        crate::config::parse_market_time(&raw)
            .ok_or_else(|| D::Error::custom(format!("invalid trade date {raw:?}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_legacy_korean_side_labels() {
        let raw = r#"{"ticker":"AAPL","shares":3,"price":170.5,"type":"매도","date":"2018-01-03 09:30"}"#;
        let t: TradeRecord = serde_json::from_str(raw).unwrap();
        assert_eq!(t.side, Side::Sell);
        assert_eq!(t.timestamp.format(TRADE_DATE_FORMAT).to_string(), "2018-01-03 09:30");
    }

    #[test]
    fn writes_english_side_and_minute_date() {
        let t = TradeRecord {
            ticker: "AAPL".into(),
            shares: 2,
            price: 100.0,
            side: Side::Buy,
            timestamp: crate::config::parse_market_time("2018-01-04 10:05").unwrap(),
        };
        let v = serde_json::to_value(&t).unwrap();
        assert_eq!(v["type"], "buy");
        assert_eq!(v["date"], "2018-01-04 10:05");
        assert_eq!(t.value(), 200.0);
    }

    #[test]
    fn side_parse_is_case_insensitive() {
        assert_eq!(Side::parse(" Sell "), Some(Side::Sell));
        assert_eq!(Side::parse("hold"), None);
    }
}
