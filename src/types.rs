// src/types.rs
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Direction {
    Buy,
    Sell,
    Hold,
}

impl Direction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::Buy => "BUY",
            Direction::Sell => "SELL",
            Direction::Hold => "HOLD",
        }
    }
}

/// One market observation for a symbol, replaced wholesale every tick.
/// `history` is the bounded rolling price series (oldest first) the
/// snapshot source maintains for indicator computation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Snapshot {
    pub symbol: String,
    pub price: Decimal,
    pub high_24h: Decimal,
    pub low_24h: Decimal,
    pub change_24h: Decimal, // percent
    pub volume_24h: Decimal,
    pub fetched_at: DateTime<Utc>,
    pub history: Vec<Decimal>,
}

/// A strategy's directional recommendation for one symbol at one tick.
/// Consumed exactly once by the risk manager.
#[derive(Debug, Clone, PartialEq)]
pub struct Signal {
    pub symbol: String,
    pub direction: Direction,
    pub strategy: &'static str,
    pub strength: Decimal,
    pub price: Decimal,
    pub generated_at: DateTime<Utc>,
}

impl Signal {
    pub fn new(
        symbol: &str,
        direction: Direction,
        strategy: &'static str,
        strength: Decimal,
        price: Decimal,
    ) -> Self {
        Self {
            symbol: symbol.to_string(),
            direction,
            strategy,
            strength,
            price,
            generated_at: Utc::now(),
        }
    }

    pub fn hold(symbol: &str, strategy: &'static str, price: Decimal) -> Self {
        Self::new(symbol, Direction::Hold, strategy, Decimal::ZERO, price)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Side {
    // Long-only MVP; Short stays out until the ledger can model it.
    Long,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PositionStatus {
    Open,
    Closed,
}

/// A held quantity of a symbol. Transitions Open -> Closed exactly once;
/// re-entering the same symbol always creates a fresh position.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Position {
    pub id: Uuid,
    pub symbol: String,
    pub side: Side,
    pub entry_price: Decimal,
    pub quantity: Decimal,
    pub entry_time: DateTime<Utc>,
    pub status: PositionStatus,
    pub stop_loss: Decimal,
    pub take_profit: Decimal,
    pub current_price: Decimal,
    pub unrealized_pnl: Decimal,
    pub exit_price: Option<Decimal>,
    pub exit_time: Option<DateTime<Utc>>,
    pub realized_pnl: Option<Decimal>,
}

impl Position {
    pub fn is_open(&self) -> bool {
        self.status == PositionStatus::Open
    }

    /// Mark-to-market value at the latest known price.
    pub fn market_value(&self) -> Decimal {
        self.current_price * self.quantity
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TradeAction {
    Open,
    Close,
}

impl TradeAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            TradeAction::Open => "OPEN",
            TradeAction::Close => "CLOSE",
        }
    }
}

/// Trade log entry. `pnl` is present only on Close.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Trade {
    pub id: Uuid,
    pub position_id: Uuid,
    pub symbol: String,
    pub action: TradeAction,
    pub price: Decimal,
    pub quantity: Decimal,
    pub strategy: String,
    pub executed_at: DateTime<Utc>,
    pub pnl: Option<Decimal>,
}
