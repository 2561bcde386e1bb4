// src/strategies/mod.rs
pub mod crossover;
pub mod mean_reversion;
pub mod momentum;
pub mod traits;

pub use crossover::MaCrossover;
pub use mean_reversion::MeanReversion;
pub use momentum::Momentum;
pub use traits::Strategy;

use crate::config::StrategyConfig;
use crate::types::{Direction, Signal, Snapshot};
use tracing::warn;

/// Runs the configured strategies in precedence order and yields the
/// first non-Hold signal for a snapshot. `None` means everyone held
/// (ties resolve to no action rather than guessing).
pub struct SignalEngine {
    strategies: Vec<Box<dyn Strategy>>,
}

impl SignalEngine {
    pub fn new(strategies: Vec<Box<dyn Strategy>>) -> Self {
        Self { strategies }
    }

    pub fn from_config(cfg: &StrategyConfig) -> Self {
        let mut strategies: Vec<Box<dyn Strategy>> = Vec::new();
        for name in &cfg.order {
            match name.as_str() {
                "momentum" => strategies.push(Box::new(Momentum::new(
                    cfg.momentum_buy_threshold,
                    cfg.momentum_sell_threshold,
                ))),
                "mean_reversion" => strategies.push(Box::new(MeanReversion::new(
                    cfg.bollinger_window,
                    cfg.bollinger_k,
                ))),
                "crossover" => {
                    strategies.push(Box::new(MaCrossover::new(cfg.ma_fast, cfg.ma_slow)))
                }
                other => warn!(strategy = other, "unknown strategy in config, skipping"),
            }
        }
        Self::new(strategies)
    }

    pub fn evaluate(&self, snapshot: &Snapshot) -> Option<Signal> {
        self.strategies
            .iter()
            .map(|strategy| strategy.evaluate(snapshot))
            .find(|signal| signal.direction != Direction::Hold)
    }
}
