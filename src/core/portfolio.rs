// src/core/portfolio.rs
use crate::core::risk::Action;
use crate::errors::LedgerError;
use crate::types::{Position, PositionStatus, Side, Trade, TradeAction};
use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use uuid::Uuid;

/// The ledger: sole owner of balance, positions and the trade log.
/// All mutation goes through `apply`; equity is always derived from
/// balance + open positions, never stored.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Portfolio {
    balance: Decimal,
    starting_balance: Decimal,
    daily_realized_pnl: Decimal,
    trades_today: u32,
    day: NaiveDate,
    positions: Vec<Position>,
    trades: VecDeque<Trade>,
    trade_log_capacity: usize,
}

impl Portfolio {
    pub fn new(initial_balance: Decimal, trade_log_capacity: usize) -> Self {
        Self {
            balance: initial_balance,
            starting_balance: initial_balance,
            daily_realized_pnl: Decimal::ZERO,
            trades_today: 0,
            day: Utc::now().date_naive(),
            positions: Vec::new(),
            trades: VecDeque::new(),
            trade_log_capacity,
        }
    }

    pub fn apply(&mut self, action: Action) -> Result<Trade, LedgerError> {
        match action {
            Action::Open {
                symbol,
                price,
                quantity,
                stop_loss,
                take_profit,
                strategy,
            } => self.open(symbol, price, quantity, stop_loss, take_profit, strategy),
            Action::Close {
                position_id,
                price,
                strategy,
            } => self.close(position_id, price, strategy),
        }
    }

    fn open(
        &mut self,
        symbol: String,
        price: Decimal,
        quantity: Decimal,
        stop_loss: Decimal,
        take_profit: Decimal,
        strategy: &'static str,
    ) -> Result<Trade, LedgerError> {
        let cost = price * quantity;
        if cost > self.balance {
            return Err(LedgerError::InsufficientBalance {
                needed: cost,
                available: self.balance,
            });
        }

        let now = Utc::now();
        let position = Position {
            id: Uuid::new_v4(),
            symbol: symbol.clone(),
            side: Side::Long,
            entry_price: price,
            quantity,
            entry_time: now,
            status: PositionStatus::Open,
            stop_loss,
            take_profit,
            current_price: price,
            unrealized_pnl: Decimal::ZERO,
            exit_price: None,
            exit_time: None,
            realized_pnl: None,
        };

        self.balance -= cost;
        self.trades_today += 1;
        let trade = Trade {
            id: Uuid::new_v4(),
            position_id: position.id,
            symbol,
            action: TradeAction::Open,
            price,
            quantity,
            strategy: strategy.to_string(),
            executed_at: now,
            pnl: None,
        };
        self.positions.push(position);
        self.push_trade(trade.clone());
        Ok(trade)
    }

    fn close(
        &mut self,
        position_id: Uuid,
        price: Decimal,
        strategy: &'static str,
    ) -> Result<Trade, LedgerError> {
        let position = self
            .positions
            .iter_mut()
            .find(|p| p.id == position_id)
            .ok_or(LedgerError::PositionNotFound(position_id))?;
        if position.status == PositionStatus::Closed {
            return Err(LedgerError::AlreadyClosed(position_id));
        }

        let now = Utc::now();
        let realized = (price - position.entry_price) * position.quantity;
        position.status = PositionStatus::Closed;
        position.current_price = price;
        position.unrealized_pnl = Decimal::ZERO;
        position.exit_price = Some(price);
        position.exit_time = Some(now);
        position.realized_pnl = Some(realized);
        let (symbol, quantity) = (position.symbol.clone(), position.quantity);

        self.balance += price * quantity;
        self.daily_realized_pnl += realized;
        self.trades_today += 1;
        let trade = Trade {
            id: Uuid::new_v4(),
            position_id,
            symbol,
            action: TradeAction::Close,
            price,
            quantity,
            strategy: strategy.to_string(),
            executed_at: now,
            pnl: Some(realized),
        };
        self.push_trade(trade.clone());
        Ok(trade)
    }

    fn push_trade(&mut self, trade: Trade) {
        self.trades.push_back(trade);
        while self.trades.len() > self.trade_log_capacity {
            self.trades.pop_front();
        }
    }

    /// Mark-to-market for every open position on `symbol`.
    /// Produces no trade.
    pub fn refresh(&mut self, symbol: &str, price: Decimal) {
        for position in self
            .positions
            .iter_mut()
            .filter(|p| p.is_open() && p.symbol == symbol)
        {
            position.current_price = price;
            position.unrealized_pnl = (price - position.entry_price) * position.quantity;
        }
    }

    /// Resets the daily counters when the UTC date rolls over.
    pub fn roll_day(&mut self, today: NaiveDate) {
        if today != self.day {
            self.day = today;
            self.daily_realized_pnl = Decimal::ZERO;
            self.trades_today = 0;
        }
    }

    pub fn equity(&self) -> Decimal {
        self.balance
            + self
                .open_positions()
                .map(Position::market_value)
                .sum::<Decimal>()
    }

    pub fn balance(&self) -> Decimal {
        self.balance
    }

    pub fn starting_balance(&self) -> Decimal {
        self.starting_balance
    }

    pub fn daily_realized_pnl(&self) -> Decimal {
        self.daily_realized_pnl
    }

    pub fn trades_today(&self) -> u32 {
        self.trades_today
    }

    pub fn open_positions(&self) -> impl Iterator<Item = &Position> {
        self.positions.iter().filter(|p| p.is_open())
    }

    pub fn open_position_count(&self) -> usize {
        self.open_positions().count()
    }

    pub fn find_open(&self, symbol: &str) -> Option<&Position> {
        self.open_positions().find(|p| p.symbol == symbol)
    }

    pub fn has_open(&self, symbol: &str) -> bool {
        self.find_open(symbol).is_some()
    }

    pub fn positions(&self) -> &[Position] {
        &self.positions
    }

    /// Most recent trades, oldest first, capped at the configured N.
    /// Double-ended so callers can walk newest-first without copying.
    pub fn trades(&self) -> impl DoubleEndedIterator<Item = &Trade> {
        self.trades.iter()
    }

    pub fn trade_count(&self) -> usize {
        self.trades.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn open_action(symbol: &str, price: Decimal, quantity: Decimal) -> Action {
        Action::Open {
            symbol: symbol.into(),
            price,
            quantity,
            stop_loss: price * dec!(0.98),
            take_profit: price * dec!(1.03),
            strategy: "momentum",
        }
    }

    fn close_action(position_id: Uuid, price: Decimal) -> Action {
        Action::Close {
            position_id,
            price,
            strategy: "momentum",
        }
    }

    #[test]
    fn full_round_trip_scenario() {
        // balance 10000, buy 2 @ 100, mark 110, close 110
        let mut portfolio = Portfolio::new(dec!(10000), 200);
        let trade = portfolio
            .apply(open_action("bitcoin", dec!(100), dec!(2)))
            .unwrap();
        assert_eq!(trade.action, TradeAction::Open);
        assert_eq!(portfolio.balance(), dec!(9800));
        assert_eq!(portfolio.open_position_count(), 1);

        portfolio.refresh("bitcoin", dec!(110));
        let position = portfolio.find_open("bitcoin").unwrap();
        assert_eq!(position.unrealized_pnl, dec!(20));
        assert_eq!(portfolio.equity(), dec!(9800) + dec!(220));

        let id = position.id;
        let trade = portfolio.apply(close_action(id, dec!(110))).unwrap();
        assert_eq!(trade.pnl, Some(dec!(20)));
        assert_eq!(portfolio.balance(), dec!(10020));
        assert_eq!(portfolio.daily_realized_pnl(), dec!(20));
        assert_eq!(portfolio.open_position_count(), 0);
        let closed = &portfolio.positions()[0];
        assert_eq!(closed.status, PositionStatus::Closed);
        assert_eq!(closed.exit_price, Some(dec!(110)));
    }

    #[test]
    fn balance_conservation_across_sequences() {
        let mut portfolio = Portfolio::new(dec!(10000), 200);
        portfolio
            .apply(open_action("bitcoin", dec!(100), dec!(10)))
            .unwrap();
        portfolio
            .apply(open_action("ethereum", dec!(50), dec!(20)))
            .unwrap();
        // before - sum(open cost)
        assert_eq!(portfolio.balance(), dec!(10000) - dec!(1000) - dec!(1000));

        let eth = portfolio.find_open("ethereum").unwrap().id;
        portfolio.apply(close_action(eth, dec!(60))).unwrap();
        let btc = portfolio.find_open("bitcoin").unwrap().id;
        portfolio.apply(close_action(btc, dec!(90))).unwrap();

        // before - opens + closes
        assert_eq!(
            portfolio.balance(),
            dec!(10000) - dec!(2000) + dec!(1200) + dec!(900)
        );
        assert_eq!(portfolio.daily_realized_pnl(), dec!(200) - dec!(100));
    }

    #[test]
    fn open_rejects_insufficient_balance() {
        let mut portfolio = Portfolio::new(dec!(100), 200);
        let err = portfolio
            .apply(open_action("bitcoin", dec!(100), dec!(2)))
            .unwrap_err();
        assert_eq!(
            err,
            LedgerError::InsufficientBalance {
                needed: dec!(200),
                available: dec!(100),
            }
        );
        // no state change on rejection
        assert_eq!(portfolio.balance(), dec!(100));
        assert!(portfolio.positions().is_empty());
    }

    #[test]
    fn close_is_terminal() {
        let mut portfolio = Portfolio::new(dec!(10000), 200);
        portfolio
            .apply(open_action("bitcoin", dec!(100), dec!(1)))
            .unwrap();
        let id = portfolio.find_open("bitcoin").unwrap().id;
        portfolio.apply(close_action(id, dec!(105))).unwrap();

        let balance = portfolio.balance();
        assert_eq!(
            portfolio.apply(close_action(id, dec!(120))).unwrap_err(),
            LedgerError::AlreadyClosed(id)
        );
        assert_eq!(portfolio.balance(), balance);
    }

    #[test]
    fn close_unknown_position() {
        let mut portfolio = Portfolio::new(dec!(10000), 200);
        let ghost = Uuid::new_v4();
        assert_eq!(
            portfolio.apply(close_action(ghost, dec!(100))).unwrap_err(),
            LedgerError::PositionNotFound(ghost)
        );
    }

    #[test]
    fn trade_log_evicts_fifo() {
        let mut portfolio = Portfolio::new(dec!(100000), 3);
        for i in 0..3 {
            portfolio
                .apply(open_action(&format!("coin{}", i), dec!(10), dec!(1)))
                .unwrap();
        }
        let first_kept = portfolio.trades().next().unwrap().symbol.clone();
        assert_eq!(first_kept, "coin0");

        portfolio
            .apply(open_action("coin3", dec!(10), dec!(1)))
            .unwrap();
        assert_eq!(portfolio.trade_count(), 3);
        assert_eq!(portfolio.trades().next().unwrap().symbol, "coin1");
    }

    #[test]
    fn day_roll_resets_counters() {
        let mut portfolio = Portfolio::new(dec!(10000), 200);
        portfolio
            .apply(open_action("bitcoin", dec!(100), dec!(1)))
            .unwrap();
        let id = portfolio.find_open("bitcoin").unwrap().id;
        portfolio.apply(close_action(id, dec!(90))).unwrap();
        assert_eq!(portfolio.trades_today(), 2);
        assert_eq!(portfolio.daily_realized_pnl(), dec!(-10));

        let today = Utc::now().date_naive();
        portfolio.roll_day(today); // same day: no-op
        assert_eq!(portfolio.trades_today(), 2);

        portfolio.roll_day(today.succ_opt().unwrap());
        assert_eq!(portfolio.trades_today(), 0);
        assert_eq!(portfolio.daily_realized_pnl(), Decimal::ZERO);
        // balance untouched by the roll
        assert_eq!(portfolio.balance(), dec!(9990));
    }

    #[test]
    fn refresh_ignores_closed_positions() {
        let mut portfolio = Portfolio::new(dec!(10000), 200);
        portfolio
            .apply(open_action("bitcoin", dec!(100), dec!(1)))
            .unwrap();
        let id = portfolio.find_open("bitcoin").unwrap().id;
        portfolio.apply(close_action(id, dec!(105))).unwrap();

        portfolio.refresh("bitcoin", dec!(50));
        let closed = &portfolio.positions()[0];
        assert_eq!(closed.current_price, dec!(105));
        assert_eq!(closed.unrealized_pnl, Decimal::ZERO);
    }
}
