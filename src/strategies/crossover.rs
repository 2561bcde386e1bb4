// src/strategies/crossover.rs
use crate::indicators::{crossover_state, simple_moving_average, Crossover};
use crate::strategies::traits::Strategy;
use crate::types::{Direction, Signal, Snapshot};

/// Moving-average crossover: buy when the fast MA crosses above the slow
/// MA, sell on the opposite cross. Only the transition itself fires, so
/// a trend already in place stays silent.
pub struct MaCrossover {
    fast: usize,
    slow: usize,
}

impl MaCrossover {
    pub fn new(fast: usize, slow: usize) -> Self {
        Self { fast, slow }
    }
}

impl Strategy for MaCrossover {
    fn name(&self) -> &'static str {
        "crossover"
    }

    fn evaluate(&self, snapshot: &Snapshot) -> Signal {
        let fast_ma = match simple_moving_average(&snapshot.history, self.fast) {
            Ok(series) => series,
            Err(_) => return Signal::hold(&snapshot.symbol, self.name(), snapshot.price),
        };
        let slow_ma = match simple_moving_average(&snapshot.history, self.slow) {
            Ok(series) => series,
            Err(_) => return Signal::hold(&snapshot.symbol, self.name(), snapshot.price),
        };

        let direction = match crossover_state(&fast_ma, &slow_ma) {
            Crossover::Bullish => Direction::Buy,
            Crossover::Bearish => Direction::Sell,
            Crossover::None => Direction::Hold,
        };
        // Gap between the lines at the latest point.
        let strength = match (fast_ma.last(), slow_ma.last()) {
            (Some(f), Some(s)) => (*f - *s).abs(),
            _ => rust_decimal::Decimal::ZERO,
        };

        Signal::new(
            &snapshot.symbol,
            direction,
            self.name(),
            strength,
            snapshot.price,
        )
    }
}
