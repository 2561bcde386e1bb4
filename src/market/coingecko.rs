// src/market/coingecko.rs
use crate::market::traits::{FetchOutcome, MarketDataSource};
use crate::types::Snapshot;
use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::Utc;
use reqwest::Client;
use rust_decimal::Decimal;
use serde::Deserialize;
use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;
use std::time::Duration;
use tracing::info;

/// One row of /api/v3/coins/markets. CoinGecko reports nulls for thin
/// markets, hence the options.
#[derive(Debug, Deserialize)]
struct MarketRow {
    id: String,
    current_price: Decimal,
    high_24h: Option<Decimal>,
    low_24h: Option<Decimal>,
    price_change_percentage_24h: Option<Decimal>,
    total_volume: Option<Decimal>,
}

/// Polls CoinGecko's markets endpoint and keeps the bounded rolling
/// price history each snapshot carries for indicator computation.
pub struct CoinGeckoSource {
    http_client: Client,
    base_url: String,
    history: Mutex<HashMap<String, VecDeque<Decimal>>>,
    history_capacity: usize,
}

impl CoinGeckoSource {
    pub fn new(history_capacity: usize, request_timeout: Duration) -> Self {
        Self::with_base_url(
            "https://api.coingecko.com".to_string(),
            history_capacity,
            request_timeout,
        )
    }

    pub fn with_base_url(
        base_url: String,
        history_capacity: usize,
        request_timeout: Duration,
    ) -> Self {
        let http_client = Client::builder()
            .timeout(request_timeout)
            .build()
            .unwrap_or_default();
        Self {
            http_client,
            base_url,
            history: Mutex::new(HashMap::new()),
            history_capacity,
        }
    }

    /// Appends the latest price and returns a copy of the series,
    /// oldest first.
    fn record_price(&self, symbol: &str, price: Decimal) -> Vec<Decimal> {
        let mut history = self.history.lock().unwrap_or_else(|e| e.into_inner());
        let series = history.entry(symbol.to_string()).or_default();
        series.push_back(price);
        while series.len() > self.history_capacity {
            series.pop_front();
        }
        series.iter().copied().collect()
    }
}

#[async_trait]
impl MarketDataSource for CoinGeckoSource {
    async fn fetch(&self, symbols: &[String]) -> Result<FetchOutcome> {
        let url = format!("{}/api/v3/coins/markets", self.base_url);
        let ids = symbols.join(",");

        let rows: Vec<MarketRow> = self
            .http_client
            .get(&url)
            .query(&[("vs_currency", "usd"), ("ids", ids.as_str())])
            .send()
            .await
            .context("market data request failed")?
            .error_for_status()
            .context("market data request rejected")?
            .json()
            .await
            .context("malformed market data response")?;

        let now = Utc::now();
        let mut outcome = FetchOutcome::default();
        for row in rows {
            let history = self.record_price(&row.id, row.current_price);
            outcome.snapshots.insert(
                row.id.clone(),
                Snapshot {
                    symbol: row.id,
                    price: row.current_price,
                    high_24h: row.high_24h.unwrap_or(row.current_price),
                    low_24h: row.low_24h.unwrap_or(row.current_price),
                    change_24h: row.price_change_percentage_24h.unwrap_or(Decimal::ZERO),
                    volume_24h: row.total_volume.unwrap_or(Decimal::ZERO),
                    fetched_at: now,
                    history,
                },
            );
        }

        // Symbols the API left out of the response get no data this tick.
        for symbol in symbols {
            if !outcome.snapshots.contains_key(symbol) {
                outcome
                    .failures
                    .insert(symbol.clone(), "missing from response".to_string());
            }
        }

        info!(
            fetched = outcome.snapshots.len(),
            failed = outcome.failures.len(),
            "market snapshots updated"
        );
        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn history_is_bounded_and_ordered() {
        let source = CoinGeckoSource::new(3, Duration::from_secs(5));
        for i in 1..=5i64 {
            source.record_price("bitcoin", Decimal::from(i));
        }
        let series = source.record_price("bitcoin", dec!(6));
        assert_eq!(series, vec![dec!(4), dec!(5), dec!(6)]);
    }

    #[test]
    fn history_is_per_symbol() {
        let source = CoinGeckoSource::new(10, Duration::from_secs(5));
        source.record_price("bitcoin", dec!(100));
        let eth = source.record_price("ethereum", dec!(10));
        assert_eq!(eth, vec![dec!(10)]);
    }

    #[test]
    fn market_row_parses_nulls() {
        let raw = r#"{
            "id": "bitcoin",
            "current_price": 64123.5,
            "high_24h": null,
            "low_24h": 62000.0,
            "price_change_percentage_24h": -1.25,
            "total_volume": null
        }"#;
        let row: MarketRow = serde_json::from_str(raw).unwrap();
        assert_eq!(row.id, "bitcoin");
        assert_eq!(row.low_24h, Some(dec!(62000.0)));
        assert!(row.high_24h.is_none());
        assert!(row.total_volume.is_none());
    }
}
