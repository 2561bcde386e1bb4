// src/strategies/mean_reversion.rs
use crate::indicators::bollinger_bands;
use crate::strategies::traits::Strategy;
use crate::types::{Direction, Signal, Snapshot};
use rust_decimal::Decimal;

/// Fades extremes: buy below the lower Bollinger band, sell above the
/// upper one. Strength is the distance from the crossed band normalized
/// by the band width (0 for a degenerate zero-width band).
pub struct MeanReversion {
    window: usize,
    k: Decimal,
}

impl MeanReversion {
    pub fn new(window: usize, k: Decimal) -> Self {
        Self { window, k }
    }
}

impl Strategy for MeanReversion {
    fn name(&self) -> &'static str {
        "mean_reversion"
    }

    fn evaluate(&self, snapshot: &Snapshot) -> Signal {
        let bands = match bollinger_bands(&snapshot.history, self.window, self.k) {
            Ok(bands) => bands,
            // Window not satisfied yet: hold, never fail the tick.
            Err(_) => return Signal::hold(&snapshot.symbol, self.name(), snapshot.price),
        };

        let width = bands.upper - bands.lower;
        let normalized = |distance: Decimal| {
            if width.is_zero() {
                Decimal::ZERO
            } else {
                distance / width
            }
        };

        if snapshot.price < bands.lower {
            Signal::new(
                &snapshot.symbol,
                Direction::Buy,
                self.name(),
                normalized(bands.lower - snapshot.price),
                snapshot.price,
            )
        } else if snapshot.price > bands.upper {
            Signal::new(
                &snapshot.symbol,
                Direction::Sell,
                self.name(),
                normalized(snapshot.price - bands.upper),
                snapshot.price,
            )
        } else {
            Signal::hold(&snapshot.symbol, self.name(), snapshot.price)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use rust_decimal_macros::dec;

    fn snap(price: Decimal, history: &[i64]) -> Snapshot {
        Snapshot {
            symbol: "ethereum".into(),
            price,
            high_24h: price,
            low_24h: price,
            change_24h: Decimal::ZERO,
            volume_24h: dec!(500000),
            fetched_at: Utc::now(),
            history: history.iter().map(|v| Decimal::from(*v)).collect(),
        }
    }

    #[test]
    fn buys_below_lower_band() {
        // history mean 20, stddev > 0; price far below the lower band
        let strategy = MeanReversion::new(3, dec!(2));
        let signal = strategy.evaluate(&snap(dec!(1), &[10, 20, 30]));
        assert_eq!(signal.direction, Direction::Buy);
        assert!(signal.strength > Decimal::ZERO);
    }

    #[test]
    fn sells_above_upper_band() {
        let strategy = MeanReversion::new(3, dec!(2));
        let signal = strategy.evaluate(&snap(dec!(60), &[10, 20, 30]));
        assert_eq!(signal.direction, Direction::Sell);
    }

    #[test]
    fn holds_inside_bands() {
        let strategy = MeanReversion::new(3, dec!(2));
        let signal = strategy.evaluate(&snap(dec!(20), &[10, 20, 30]));
        assert_eq!(signal.direction, Direction::Hold);
    }

    #[test]
    fn holds_on_short_history() {
        let strategy = MeanReversion::new(20, dec!(2));
        let signal = strategy.evaluate(&snap(dec!(20), &[10, 20, 30]));
        assert_eq!(signal.direction, Direction::Hold);
    }

    #[test]
    fn zero_width_band_has_zero_strength() {
        // constant history collapses the bands onto the price
        let strategy = MeanReversion::new(3, dec!(2));
        let signal = strategy.evaluate(&snap(dec!(99), &[100, 100, 100]));
        assert_eq!(signal.direction, Direction::Buy);
        assert_eq!(signal.strength, Decimal::ZERO);
    }
}
