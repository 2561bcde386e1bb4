// src/core/context.rs
use crate::core::portfolio::Portfolio;
use crate::core::watchlist::Watchlist;
use crate::errors::WatchlistError;
use crate::types::{Position, Snapshot, Trade};
use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{RwLock, RwLockWriteGuard};
use tracing::info;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopState {
    Stopped,
    Running,
}

impl LoopState {
    pub fn as_str(&self) -> &'static str {
        match self {
            LoopState::Stopped => "STOPPED",
            LoopState::Running => "RUNNING",
        }
    }
}

/// Everything mutable the bot owns. Guarded by one lock: at most one
/// mutator at a time, and readers never observe a half-applied action.
pub struct BotState {
    pub loop_state: LoopState,
    pub portfolio: Portfolio,
    pub watchlist: Watchlist,
    pub market: HashMap<String, Snapshot>,
}

/// Consistent read-only view for the presentation layer.
#[derive(Debug, Clone, Serialize)]
pub struct StatusReport {
    pub loop_state: &'static str,
    pub running: bool,
    pub balance: Decimal,
    pub equity: Decimal,
    pub daily_realized_pnl: Decimal,
    pub open_positions: usize,
    pub trades_today: u32,
    pub total_trades: usize,
    pub watchlist: Vec<String>,
}

/// The explicit context object: created at startup, passed to every
/// component, torn down at exit. No hidden statics. Cloning shares the
/// same underlying state (ploy-style `AppState`).
#[derive(Clone)]
pub struct BotContext {
    state: Arc<RwLock<BotState>>,
}

impl BotContext {
    pub fn new(portfolio: Portfolio, watchlist: Watchlist) -> Self {
        Self {
            state: Arc::new(RwLock::new(BotState {
                loop_state: LoopState::Stopped,
                portfolio,
                watchlist,
                market: HashMap::new(),
            })),
        }
    }

    /// Write access for the trading loop's tick application.
    pub(crate) async fn write(&self) -> RwLockWriteGuard<'_, BotState> {
        self.state.write().await
    }

    // --- queries (copy-out under the read lock) ---

    pub async fn status(&self) -> StatusReport {
        let state = self.state.read().await;
        StatusReport {
            loop_state: state.loop_state.as_str(),
            running: state.loop_state == LoopState::Running,
            balance: state.portfolio.balance(),
            equity: state.portfolio.equity(),
            daily_realized_pnl: state.portfolio.daily_realized_pnl(),
            open_positions: state.portfolio.open_position_count(),
            trades_today: state.portfolio.trades_today(),
            total_trades: state.portfolio.trade_count(),
            watchlist: state.watchlist.symbols().to_vec(),
        }
    }

    /// Open and closed positions, open first.
    pub async fn positions(&self) -> Vec<Position> {
        let state = self.state.read().await;
        let mut positions = state.portfolio.positions().to_vec();
        positions.sort_by_key(|p| !p.is_open());
        positions
    }

    /// Most recent trades, newest first.
    pub async fn trades(&self) -> Vec<Trade> {
        let state = self.state.read().await;
        state.portfolio.trades().rev().cloned().collect()
    }

    /// Last-known snapshot per watched symbol.
    pub async fn market_data(&self) -> Vec<Snapshot> {
        let state = self.state.read().await;
        let mut snapshots: Vec<Snapshot> = state.market.values().cloned().collect();
        snapshots.sort_by(|a, b| a.symbol.cmp(&b.symbol));
        snapshots
    }

    pub async fn watch_symbols(&self) -> Vec<String> {
        self.state.read().await.watchlist.symbols().to_vec()
    }

    pub async fn is_running(&self) -> bool {
        self.state.read().await.loop_state == LoopState::Running
    }

    // --- commands (serialized through the write lock) ---

    /// Idempotent: starting a running loop is a no-op success.
    /// Returns whether the state changed.
    pub async fn start(&self) -> bool {
        let mut state = self.state.write().await;
        if state.loop_state == LoopState::Running {
            return false;
        }
        state.loop_state = LoopState::Running;
        info!("trading loop started");
        true
    }

    /// The in-flight tick drains; the loop observes the flag at the next
    /// tick boundary.
    pub async fn stop(&self) -> bool {
        let mut state = self.state.write().await;
        if state.loop_state == LoopState::Stopped {
            return false;
        }
        state.loop_state = LoopState::Stopped;
        info!("🛑 trading loop stopped");
        true
    }

    pub async fn add_symbol(&self, symbol: &str) -> Result<(), WatchlistError> {
        let mut state = self.state.write().await;
        state.watchlist.add(symbol)?;
        info!(symbol, "added to watchlist");
        Ok(())
    }

    pub async fn remove_symbol(&self, symbol: &str) -> Result<(), WatchlistError> {
        let mut state = self.state.write().await;
        if state.portfolio.has_open(symbol) {
            return Err(WatchlistError::OpenPosition(symbol.to_string()));
        }
        state.watchlist.remove(symbol)?;
        state.market.remove(symbol);
        info!(symbol, "removed from watchlist");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::risk::Action;
    use crate::types::TradeAction;
    use rust_decimal_macros::dec;

    fn context() -> BotContext {
        let mut watchlist = Watchlist::new(3);
        watchlist.add("bitcoin").unwrap();
        watchlist.add("ethereum").unwrap();
        BotContext::new(Portfolio::new(dec!(10000), 200), watchlist)
    }

    #[tokio::test]
    async fn start_is_idempotent() {
        let ctx = context();
        assert!(!ctx.is_running().await);
        assert!(ctx.start().await);
        assert!(!ctx.start().await); // second start: no-op success
        assert!(ctx.is_running().await);
        assert!(ctx.stop().await);
        assert!(!ctx.stop().await);
        assert!(!ctx.is_running().await);
    }

    #[tokio::test]
    async fn add_symbol_honors_capacity() {
        let ctx = context();
        ctx.add_symbol("solana").await.unwrap();
        assert_eq!(
            ctx.add_symbol("cardano").await,
            Err(WatchlistError::CapacityExceeded { max: 3 })
        );
    }

    #[tokio::test]
    async fn remove_symbol_guards_open_positions() {
        let ctx = context();
        {
            let mut state = ctx.write().await;
            state
                .portfolio
                .apply(Action::Open {
                    symbol: "bitcoin".into(),
                    price: dec!(100),
                    quantity: dec!(1),
                    stop_loss: dec!(98),
                    take_profit: dec!(103),
                    strategy: "momentum",
                })
                .unwrap();
        }
        assert_eq!(
            ctx.remove_symbol("bitcoin").await,
            Err(WatchlistError::OpenPosition("bitcoin".into()))
        );
        // the other symbol removes fine
        ctx.remove_symbol("ethereum").await.unwrap();
        assert_eq!(ctx.watch_symbols().await, vec!["bitcoin".to_string()]);
    }

    #[tokio::test]
    async fn trades_listed_newest_first() {
        let ctx = context();
        {
            let mut state = ctx.write().await;
            state
                .portfolio
                .apply(Action::Open {
                    symbol: "bitcoin".into(),
                    price: dec!(100),
                    quantity: dec!(1),
                    stop_loss: dec!(98),
                    take_profit: dec!(103),
                    strategy: "momentum",
                })
                .unwrap();
            let id = state.portfolio.find_open("bitcoin").unwrap().id;
            state
                .portfolio
                .apply(Action::Close {
                    position_id: id,
                    price: dec!(110),
                    strategy: "momentum",
                })
                .unwrap();
        }
        let trades = ctx.trades().await;
        assert_eq!(trades.len(), 2);
        assert_eq!(trades[0].action, TradeAction::Close);
        assert_eq!(trades[1].action, TradeAction::Open);
    }

    #[tokio::test]
    async fn status_reports_consistent_numbers() {
        let ctx = context();
        {
            let mut state = ctx.write().await;
            state
                .portfolio
                .apply(Action::Open {
                    symbol: "bitcoin".into(),
                    price: dec!(100),
                    quantity: dec!(2),
                    stop_loss: dec!(98),
                    take_profit: dec!(103),
                    strategy: "momentum",
                })
                .unwrap();
            state.portfolio.refresh("bitcoin", dec!(110));
        }
        let status = ctx.status().await;
        assert_eq!(status.balance, dec!(9800));
        assert_eq!(status.equity, dec!(9800) + dec!(220));
        assert_eq!(status.open_positions, 1);
        assert_eq!(status.loop_state, "STOPPED");
    }
}
