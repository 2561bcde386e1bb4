// src/strategies/traits.rs
use crate::types::{Signal, Snapshot};

/// A single capability: given the current snapshot (with its rolling
/// price history) emit a direction and strength. Strategies are pure and
/// deterministic; insufficient history yields Hold, never an error.
pub trait Strategy: Send + Sync {
    fn name(&self) -> &'static str;

    fn evaluate(&self, snapshot: &Snapshot) -> Signal;
}
