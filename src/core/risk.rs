// src/core/risk.rs
use crate::config::AppConfig;
use crate::core::portfolio::Portfolio;
use crate::errors::RejectReason;
use crate::types::{Direction, Position, Signal};
use crate::utils::precision::normalize_quantity;
use rust_decimal::Decimal;
use uuid::Uuid;

/// An authorized ledger mutation. Produced only by the risk manager.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    Open {
        symbol: String,
        price: Decimal,
        quantity: Decimal,
        stop_loss: Decimal,
        take_profit: Decimal,
        strategy: &'static str,
    },
    Close {
        position_id: Uuid,
        price: Decimal,
        strategy: &'static str,
    },
}

#[derive(Debug, Clone)]
pub struct RiskParams {
    pub risk_per_trade: Decimal,
    pub max_positions: usize,
    pub max_trades_per_day: u32,
    pub emergency_stop_fraction: Decimal,
    pub stop_loss_pct: Decimal,
    pub take_profit_pct: Decimal,
    pub quantity_step: Decimal,
    pub min_notional: Decimal,
}

impl From<&AppConfig> for RiskParams {
    fn from(cfg: &AppConfig) -> Self {
        Self {
            risk_per_trade: cfg.risk_per_trade,
            max_positions: cfg.max_positions,
            max_trades_per_day: cfg.max_trades_per_day,
            emergency_stop_fraction: cfg.emergency_stop_fraction,
            stop_loss_pct: cfg.stop_loss_pct,
            take_profit_pct: cfg.take_profit_pct,
            quantity_step: cfg.quantity_step,
            min_notional: cfg.min_notional,
        }
    }
}

/// Turns signals into authorized actions, or rejects them. Pure over its
/// inputs: the same signal against unchanged portfolio state yields the
/// same verdict.
pub struct RiskManager {
    params: RiskParams,
}

impl RiskManager {
    pub fn new(params: RiskParams) -> Self {
        Self { params }
    }

    /// Rules run in order; the first failing rule rejects. A Sell against
    /// an open position becomes a Close and bypasses the entry gates
    /// (closing never increases risk).
    pub fn authorize(
        &self,
        signal: &Signal,
        portfolio: &Portfolio,
    ) -> Result<Action, RejectReason> {
        match signal.direction {
            Direction::Hold => Err(RejectReason::HoldSignal),
            Direction::Sell => portfolio
                .find_open(&signal.symbol)
                .map(|position| Action::Close {
                    position_id: position.id,
                    price: signal.price,
                    strategy: signal.strategy,
                })
                .ok_or(RejectReason::NoOpenPosition),
            Direction::Buy => self.authorize_entry(signal, portfolio),
        }
    }

    fn authorize_entry(
        &self,
        signal: &Signal,
        portfolio: &Portfolio,
    ) -> Result<Action, RejectReason> {
        // 1. Emergency stop: excessive daily loss halts new entries.
        let loss_limit = portfolio.starting_balance() * self.params.emergency_stop_fraction;
        if portfolio.daily_realized_pnl() <= -loss_limit {
            return Err(RejectReason::EmergencyStop);
        }

        // 2. Max concurrent positions.
        if portfolio.open_position_count() >= self.params.max_positions {
            return Err(RejectReason::MaxPositions {
                max: self.params.max_positions,
            });
        }

        // 3. Max trades per day.
        if portfolio.trades_today() >= self.params.max_trades_per_day {
            return Err(RejectReason::TradeCapReached {
                max: self.params.max_trades_per_day,
            });
        }

        // 4. Sizing: equity x risk-per-trade at the snapshot price,
        //    clamped to the cash on hand (open positions hold the rest
        //    of the equity) and floored to the tradable step.
        let raw_quantity = (portfolio.equity() * self.params.risk_per_trade / signal.price)
            .min(portfolio.balance() / signal.price);
        let quantity = normalize_quantity(raw_quantity, self.params.quantity_step);
        let notional = quantity * signal.price;
        if notional < self.params.min_notional {
            return Err(RejectReason::BelowMinNotional {
                notional,
                min: self.params.min_notional,
            });
        }

        // 5. No averaging-in: one open position per symbol.
        if portfolio.has_open(&signal.symbol) {
            return Err(RejectReason::DuplicatePosition);
        }

        Ok(Action::Open {
            symbol: signal.symbol.clone(),
            price: signal.price,
            quantity,
            stop_loss: signal.price * (Decimal::ONE - self.params.stop_loss_pct),
            take_profit: signal.price * (Decimal::ONE + self.params.take_profit_pct),
            strategy: signal.strategy,
        })
    }

    /// Stop-loss / take-profit check for an open position at its latest
    /// marked price. Runs ahead of new-signal processing every tick and
    /// is never gated by the daily trade cap.
    pub fn check_exit(&self, position: &Position) -> Option<Action> {
        if !position.is_open() {
            return None;
        }
        if position.current_price <= position.stop_loss {
            Some(Action::Close {
                position_id: position.id,
                price: position.current_price,
                strategy: "stop_loss",
            })
        } else if position.current_price >= position.take_profit {
            Some(Action::Close {
                position_id: position.id,
                price: position.current_price,
                strategy: "take_profit",
            })
        } else {
            None
        }
    }
}
