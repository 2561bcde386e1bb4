// src/market/traits.rs
use crate::types::Snapshot;
use anyhow::Result;
use async_trait::async_trait;
use std::collections::HashMap;

/// Result of one snapshot fetch: per-symbol success or failure. A symbol
/// in `failures` is simply "no data this tick" for the trading loop.
#[derive(Debug, Default)]
pub struct FetchOutcome {
    pub snapshots: HashMap<String, Snapshot>,
    pub failures: HashMap<String, String>,
}

#[async_trait]
pub trait MarketDataSource: Send + Sync {
    /// Fetches the latest snapshot for each symbol. Partial failure is
    /// expressed through `FetchOutcome::failures`; an `Err` means the
    /// whole request failed and every symbol is without data.
    async fn fetch(&self, symbols: &[String]) -> Result<FetchOutcome>;
}
