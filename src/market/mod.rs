// src/market/mod.rs
pub mod coingecko;
pub mod traits;

pub use coingecko::CoinGeckoSource;
pub use traits::{FetchOutcome, MarketDataSource};
