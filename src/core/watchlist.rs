// src/core/watchlist.rs
use crate::errors::WatchlistError;

/// Ordered, bounded set of symbols the trading loop evaluates each tick.
/// Membership changes only through add/remove; the loop copies the set at
/// tick start, so a mid-tick mutation never affects that tick.
#[derive(Debug, Clone)]
pub struct Watchlist {
    symbols: Vec<String>,
    capacity: usize,
}

impl Watchlist {
    pub fn new(capacity: usize) -> Self {
        Self {
            symbols: Vec::new(),
            capacity,
        }
    }

    pub fn add(&mut self, symbol: &str) -> Result<(), WatchlistError> {
        if self.contains(symbol) {
            return Err(WatchlistError::AlreadyWatched(symbol.to_string()));
        }
        if self.symbols.len() >= self.capacity {
            return Err(WatchlistError::CapacityExceeded { max: self.capacity });
        }
        self.symbols.push(symbol.to_string());
        Ok(())
    }

    /// Removal only checks membership; the open-position guard lives at
    /// the control surface where the portfolio is in reach.
    pub fn remove(&mut self, symbol: &str) -> Result<(), WatchlistError> {
        match self.symbols.iter().position(|s| s == symbol) {
            Some(idx) => {
                self.symbols.remove(idx);
                Ok(())
            }
            None => Err(WatchlistError::NotWatched(symbol.to_string())),
        }
    }

    pub fn contains(&self, symbol: &str) -> bool {
        self.symbols.iter().any(|s| s == symbol)
    }

    pub fn symbols(&self) -> &[String] {
        &self.symbols
    }
}
