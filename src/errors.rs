// src/errors.rs
use rust_decimal::Decimal;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum IndicatorError {
    #[error("insufficient data: have {have} points, need {need}")]
    InsufficientData { have: usize, need: usize },
}

/// Why the risk manager refused to turn a signal into an action.
/// Rejections are ordinary control flow: logged, never fatal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum RejectReason {
    #[error("hold signal carries no action")]
    HoldSignal,
    #[error("emergency stop active: daily loss limit reached")]
    EmergencyStop,
    #[error("max concurrent positions reached ({max})")]
    MaxPositions { max: usize },
    #[error("daily trade cap reached ({max})")]
    TradeCapReached { max: u32 },
    #[error("notional {notional} below exchange minimum {min}")]
    BelowMinNotional { notional: Decimal, min: Decimal },
    #[error("already holding an open position for this symbol")]
    DuplicatePosition,
    #[error("no open position to close")]
    NoOpenPosition,
}

/// Ledger invariant violations. With correct risk gating these never
/// fire from the loop; when they do, the action is discarded and the
/// event logged as an invariant-violation error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum LedgerError {
    #[error("insufficient balance: need {needed}, have {available}")]
    InsufficientBalance { needed: Decimal, available: Decimal },
    #[error("position {0} not found")]
    PositionNotFound(Uuid),
    #[error("position {0} already closed")]
    AlreadyClosed(Uuid),
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum WatchlistError {
    #[error("watchlist full (capacity {max})")]
    CapacityExceeded { max: usize },
    #[error("{0} is already on the watchlist")]
    AlreadyWatched(String),
    #[error("{0} is not on the watchlist")]
    NotWatched(String),
    #[error("{0} has an open position")]
    OpenPosition(String),
}
