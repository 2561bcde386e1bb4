// src/config.rs

use config::{Config, ConfigError, File};
use rust_decimal::Decimal;
use serde::Deserialize;

#[derive(Debug, Deserialize, Clone)]
pub struct StrategyConfig {
    /// Precedence order: the first non-HOLD result wins a tick.
    pub order: Vec<String>,
    pub momentum_buy_threshold: Decimal,  // percent
    pub momentum_sell_threshold: Decimal, // percent
    pub bollinger_window: usize,
    pub bollinger_k: Decimal,
    pub ma_fast: usize,
    pub ma_slow: usize,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub initial_balance: Decimal,
    pub risk_per_trade: Decimal,
    pub max_positions: usize,
    pub max_trades_per_day: u32,
    pub emergency_stop_fraction: Decimal,
    pub stop_loss_pct: Decimal,
    pub take_profit_pct: Decimal,
    pub tick_interval_secs: u64,
    pub fetch_timeout_secs: u64,
    pub watchlist_capacity: usize,
    pub watchlist: Vec<String>,
    pub trade_log_capacity: usize,
    pub history_capacity: usize,
    pub quantity_step: Decimal,
    pub min_notional: Decimal,
    /// When unset the ledger lives purely in memory for the process.
    pub state_file: Option<String>,
    pub strategy: StrategyConfig,
}

impl AppConfig {
    pub fn new() -> Result<Self, ConfigError> {
        let builder = Config::builder()
            .add_source(File::with_name("Settings"))
            .add_source(config::Environment::with_prefix("APP"));

        let config = builder.build()?;
        config.try_deserialize()
    }
}
