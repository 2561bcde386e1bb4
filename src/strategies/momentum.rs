// src/strategies/momentum.rs
use crate::strategies::traits::Strategy;
use crate::types::{Direction, Signal, Snapshot};
use rust_decimal::Decimal;

/// Rides the 24h move: buy strong gainers, sell strong losers.
/// Strength is the absolute 24h change in percent.
pub struct Momentum {
    buy_threshold: Decimal,  // percent, e.g. 2.0
    sell_threshold: Decimal, // percent, e.g. -1.0
}

impl Momentum {
    pub fn new(buy_threshold: Decimal, sell_threshold: Decimal) -> Self {
        Self {
            buy_threshold,
            sell_threshold,
        }
    }
}

impl Strategy for Momentum {
    fn name(&self) -> &'static str {
        "momentum"
    }

    fn evaluate(&self, snapshot: &Snapshot) -> Signal {
        let change = snapshot.change_24h;
        let direction = if change >= self.buy_threshold {
            Direction::Buy
        } else if change <= self.sell_threshold {
            Direction::Sell
        } else {
            Direction::Hold
        };

        Signal::new(
            &snapshot.symbol,
            direction,
            self.name(),
            change.abs(),
            snapshot.price,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use rust_decimal_macros::dec;

    fn snap(change_24h: Decimal) -> Snapshot {
        Snapshot {
            symbol: "bitcoin".into(),
            price: dec!(100),
            high_24h: dec!(110),
            low_24h: dec!(90),
            change_24h,
            volume_24h: dec!(1000000),
            fetched_at: Utc::now(),
            history: vec![],
        }
    }

    #[test]
    fn buys_at_threshold() {
        let strategy = Momentum::new(dec!(2), dec!(-1));
        let signal = strategy.evaluate(&snap(dec!(2.0)));
        assert_eq!(signal.direction, Direction::Buy);
        assert_eq!(signal.strength, dec!(2.0));
    }

    #[test]
    fn sells_on_drop() {
        let strategy = Momentum::new(dec!(2), dec!(-1));
        let signal = strategy.evaluate(&snap(dec!(-1.5)));
        assert_eq!(signal.direction, Direction::Sell);
        assert_eq!(signal.strength, dec!(1.5));
    }

    #[test]
    fn holds_in_between() {
        let strategy = Momentum::new(dec!(2), dec!(-1));
        assert_eq!(
            strategy.evaluate(&snap(dec!(0.5))).direction,
            Direction::Hold
        );
        assert_eq!(
            strategy.evaluate(&snap(dec!(-0.9))).direction,
            Direction::Hold
        );
    }
}
