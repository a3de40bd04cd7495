//! Historical bar replay: nearest-bar price and previous day's close.

use std::path::Path;

use chrono::{DateTime, Duration, NaiveDateTime};

use crate::{error::AppError, models::PriceBar};

#[derive(Debug, Clone, Default)]
pub struct PriceSeries {
    ticker: String,
    // ascending by timestamp
    bars: Vec<PriceBar>,
}

fn parse_bar_time(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    if let Some(t) = crate::config::parse_market_time(raw) {
        return Some(t);
    }
    // exports with a UTC offset: keep the exchange wall clock
    DateTime::parse_from_rfc3339(raw)
        .or_else(|_| DateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S%:z"))
        .map(|t| t.naive_local())
        .ok()
}

impl PriceSeries {
    pub fn new(ticker: &str, mut bars: Vec<PriceBar>) -> Self {
        bars.sort_by_key(|b| b.timestamp);
        PriceSeries {
            ticker: ticker.to_uppercase(),
            bars,
        }
    }

    /// Reads a CSV with a header row. Only `Datetime` and `Close` are used.
    pub fn load_csv(path: &Path, ticker: &str) -> Result<Self, AppError> {
        let err = |reason: String| AppError::PriceData {
            path: path.to_path_buf(),
            reason,
        };

        let mut rdr = csv::Reader::from_path(path).map_err(|e| err(e.to_string()))?;

        let headers = rdr.headers().map_err(|e| err(e.to_string()))?.clone();
        let column = |name: &str| {
            headers
                .iter()
                .position(|h| h.trim().eq_ignore_ascii_case(name))
                .ok_or_else(|| err(format!("missing {name} column")))
        };
        let time_idx = column("Datetime")?;
        let close_idx = column("Close")?;

        let mut bars = Vec::new();
        for (i, result) in rdr.records().enumerate() {
            // header is line 1
            let line = i + 2;
            let record = result.map_err(|e| err(format!("line {line}: {e}")))?;

            let raw_time = record.get(time_idx).unwrap_or_default();
            let timestamp = parse_bar_time(raw_time)
                .ok_or_else(|| err(format!("line {line}: invalid Datetime {raw_time:?}")))?;

            let raw_close = record.get(close_idx).unwrap_or_default();
            let close: f64 = raw_close
                .trim()
                .parse()
                .ok()
                .filter(|c: &f64| c.is_finite() && *c > 0.0)
                .ok_or_else(|| err(format!("line {line}: invalid Close {raw_close:?}")))?;

            bars.push(PriceBar { timestamp, close });
        }

        tracing::info!(ticker, bars = bars.len(), path = %path.display(), "loaded price series");
        Ok(PriceSeries::new(ticker, bars))
    }

    pub fn ticker(&self) -> &str {
        &self.ticker
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    pub fn first_timestamp(&self) -> Option<NaiveDateTime> {
        self.bars.first().map(|b| b.timestamp)
    }

    pub fn last_timestamp(&self) -> Option<NaiveDateTime> {
        self.bars.last().map(|b| b.timestamp)
    }

    /// The bar closest to `t`. On a tie the earlier bar wins.
    pub fn nearest_bar(&self, t: NaiveDateTime) -> Option<&PriceBar> {
        let idx = self.bars.partition_point(|b| b.timestamp < t);
        let after = self.bars.get(idx);
        let before = idx.checked_sub(1).map(|i| {
            // first bar of a run of duplicate timestamps
            let ts = self.bars[i].timestamp;
            &self.bars[self.bars[..i].partition_point(|b| b.timestamp < ts)]
        });

        match (before, after) {
            (Some(b), Some(a)) => {
                if t - b.timestamp <= a.timestamp - t {
                    Some(b)
                } else {
                    Some(a)
                }
            }
            (b, a) => b.or(a),
        }
    }

    pub fn current_price(&self, t: NaiveDateTime) -> Option<f64> {
        self.nearest_bar(t).map(|b| b.close)
    }

    /// Last close on the calendar day before `t`'s date.
    pub fn previous_close(&self, t: NaiveDateTime) -> Option<f64> {
        let day_start = t.date().and_hms_opt(0, 0, 0)?;
        let prev_start = day_start - Duration::days(1);

        let start = self.bars.partition_point(|b| b.timestamp < prev_start);
        let end = self.bars.partition_point(|b| b.timestamp < day_start);
        if end > start {
            Some(self.bars[end - 1].close)
        } else {
            None
        }
    }

    /// Change against the previous close, absolute and in percent.
    pub fn day_change(&self, t: NaiveDateTime) -> Option<(f64, f64)> {
        let current = self.current_price(t)?;
        let prev = self.previous_close(t)?;
        let change = current - prev;
        Some((change, change / prev * 100.0))
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;
    use crate::config::parse_market_time;

    fn at(s: &str) -> NaiveDateTime {
        parse_market_time(s).unwrap()
    }

    fn bar(s: &str, close: f64) -> PriceBar {
        PriceBar { timestamp: at(s), close }
    }

    fn series() -> PriceSeries {
        PriceSeries::new(
            "aapl",
            vec![
                bar("2018-01-02 15:50", 171.0),
                bar("2018-01-02 15:55", 172.26),
                bar("2018-01-03 09:30", 172.53),
                bar("2018-01-03 09:35", 172.80),
                bar("2018-01-03 09:40", 172.40),
            ],
        )
    }

    #[test]
    fn exact_timestamp_returns_that_close() {
        let s = series();
        assert_eq!(s.current_price(at("2018-01-03 09:35")), Some(172.80));
        assert_eq!(s.ticker(), "AAPL");
    }

    #[test]
    fn nearest_bar_wins_and_ties_go_earlier() {
        let s = series();
        assert_eq!(s.current_price(at("2018-01-03 09:39")), Some(172.40));
        assert_eq!(s.current_price(at("2018-01-03 09:36")), Some(172.80));
        // 09:37:30 is equidistant from 09:35 and 09:40
        let mid = at("2018-01-03 09:37") + Duration::seconds(30);
        assert_eq!(s.current_price(mid), Some(172.80));
    }

    #[test]
    fn outside_the_range_clamps_to_the_ends() {
        let s = series();
        assert_eq!(s.current_price(at("2017-12-01 10:00")), Some(171.0));
        assert_eq!(s.current_price(at("2018-03-30 16:00")), Some(172.40));
    }

    #[test]
    fn empty_series_has_no_price() {
        let s = PriceSeries::new("AAPL", vec![]);
        assert!(s.current_price(at("2018-01-03 09:30")).is_none());
        assert!(s.previous_close(at("2018-01-03 09:30")).is_none());
    }

    #[test]
    fn duplicate_timestamps_pick_first() {
        let s = PriceSeries::new(
            "AAPL",
            vec![bar("2018-01-03 09:30", 1.0), bar("2018-01-03 09:30", 2.0), bar("2018-01-03 09:40", 3.0)],
        );
        assert_eq!(s.current_price(at("2018-01-03 09:31")), Some(1.0));
        assert_eq!(s.current_price(at("2018-01-03 09:30")), Some(1.0));
    }

    #[test]
    fn previous_close_is_last_bar_of_prior_day() {
        let s = series();
        assert_eq!(s.previous_close(at("2018-01-03 12:00")), Some(172.26));
        // the day before has no bars
        assert_eq!(s.previous_close(at("2018-01-02 10:00")), None);
        assert_eq!(s.previous_close(at("2018-01-05 10:00")), None);
    }

    #[test]
    fn day_change_against_previous_close() {
        let s = series();
        let (abs, pct) = s.day_change(at("2018-01-03 09:30")).unwrap();
        assert!((abs - 0.27).abs() < 1e-9);
        assert!((pct - 0.27 / 172.26 * 100.0).abs() < 1e-9);
    }

    #[test]
    fn loads_csv_and_ignores_extra_columns() {
        let mut f = tempfile::NamedTempFile::new().unwrap();
        writeln!(f, "Datetime,Open,High,Low,Close,Volume").unwrap();
        writeln!(f, "2018-01-03 09:35:00-05:00,172.5,172.9,172.4,172.80,1000").unwrap();
        writeln!(f, "2018-01-03 09:30:00,172.0,172.6,171.9,172.53,2000").unwrap();
        f.flush().unwrap();

        let s = PriceSeries::load_csv(f.path(), "AAPL").unwrap();
        assert_eq!(s.len(), 2);
        assert_eq!(s.first_timestamp(), Some(at("2018-01-03 09:30")));
        assert_eq!(s.last_timestamp(), Some(at("2018-01-03 09:35")));
        assert_eq!(s.current_price(at("2018-01-03 09:30")), Some(172.53));
    }

    #[test]
    fn csv_with_bad_close_is_rejected() {
        let mut f = tempfile::NamedTempFile::new().unwrap();
        writeln!(f, "Datetime,Close").unwrap();
        writeln!(f, "2018-01-03 09:30,abc").unwrap();
        f.flush().unwrap();

        let err = PriceSeries::load_csv(f.path(), "AAPL").unwrap_err();
        assert!(err.to_string().contains("line 2"));
    }

    #[test]
    fn csv_without_close_column_is_rejected() {
        let mut f = tempfile::NamedTempFile::new().unwrap();
        writeln!(f, "Datetime,Open").unwrap();
        f.flush().unwrap();

        let err = PriceSeries::load_csv(f.path(), "AAPL").unwrap_err();
        assert!(err.to_string().contains("missing Close column"));
    }
}
