// src/core/engine.rs
use crate::core::context::BotContext;
use crate::core::risk::{Action, RiskManager};
use crate::market::MarketDataSource;
use crate::storage::StateStore;
use crate::strategies::SignalEngine;
use crate::types::TradeAction;
use anyhow::Result;
use chrono::Utc;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::{timeout, MissedTickBehavior};
use tracing::{debug, error, info, warn};

/// The orchestrator: one long-lived task driving
/// fetch -> refresh/exits -> signals -> risk -> ledger on a fixed
/// interval. Control commands and queries run concurrently against the
/// same `BotContext`; the loop observes its run flag at tick boundaries
/// only, so a stop lets the in-flight tick drain.
pub struct TradingEngine {
    ctx: BotContext,
    source: Arc<dyn MarketDataSource>,
    signals: SignalEngine,
    risk: RiskManager,
    store: Option<Arc<dyn StateStore>>,
    tick_interval: Duration,
    fetch_timeout: Duration,
}

impl TradingEngine {
    pub fn new(
        ctx: BotContext,
        source: Arc<dyn MarketDataSource>,
        signals: SignalEngine,
        risk: RiskManager,
        store: Option<Arc<dyn StateStore>>,
        tick_interval: Duration,
        fetch_timeout: Duration,
    ) -> Self {
        Self {
            ctx,
            source,
            signals,
            risk,
            store,
            tick_interval,
            fetch_timeout,
        }
    }

    pub async fn run(self) {
        info!(interval_secs = self.tick_interval.as_secs(), "engine ready");
        let mut ticker = tokio::time::interval(self.tick_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            ticker.tick().await;
            if !self.ctx.is_running().await {
                continue;
            }
            if let Err(e) = self.tick().await {
                // a failed tick degrades to "skip and continue"
                error!(error = %e, "tick failed");
            }
        }
    }

    /// One full evaluation cycle. Strictly sequential; every ledger
    /// mutation happens under a single write-lock scope.
    pub async fn tick(&self) -> Result<()> {
        let symbols = self.ctx.watch_symbols().await;
        if symbols.is_empty() {
            return Ok(());
        }

        let outcome = match timeout(self.fetch_timeout, self.source.fetch(&symbols)).await {
            Ok(Ok(outcome)) => outcome,
            Ok(Err(e)) => {
                warn!(error = %e, "market fetch failed, no data this tick");
                return Ok(());
            }
            Err(_) => {
                warn!(
                    timeout_secs = self.fetch_timeout.as_secs(),
                    "market fetch timed out, no data this tick"
                );
                return Ok(());
            }
        };
        for (symbol, reason) in &outcome.failures {
            warn!(symbol = %symbol, reason = %reason, "symbol skipped this tick");
        }

        let mut dirty = false;
        let mut state = self.ctx.write().await;
        state.portfolio.roll_day(Utc::now().date_naive());

        // Mark open positions to the fresh prices before anything else.
        for snapshot in outcome.snapshots.values() {
            state.portfolio.refresh(&snapshot.symbol, snapshot.price);
        }

        // Exit conditions run ahead of new signals and bypass the gates.
        let exits: Vec<Action> = state
            .portfolio
            .open_positions()
            .filter_map(|position| self.risk.check_exit(position))
            .collect();
        for action in exits {
            dirty |= self.apply(&mut state.portfolio, action);
        }

        // New signals for every symbol with data; the risk manager
        // rejects duplicates, translates sells, and sizes entries.
        for snapshot in outcome.snapshots.values() {
            let Some(signal) = self.signals.evaluate(snapshot) else {
                continue;
            };
            match self.risk.authorize(&signal, &state.portfolio) {
                Ok(action) => dirty |= self.apply(&mut state.portfolio, action),
                Err(reason) => debug!(
                    symbol = %signal.symbol,
                    direction = signal.direction.as_str(),
                    strategy = signal.strategy,
                    %reason,
                    "signal rejected"
                ),
            }
        }

        // Publish the tick's snapshots as the last-known market view.
        for (symbol, snapshot) in outcome.snapshots {
            state.market.insert(symbol, snapshot);
        }

        let persisted = match (&self.store, dirty) {
            (Some(_), true) => Some(state.portfolio.clone()),
            _ => None,
        };
        drop(state);

        if let (Some(store), Some(portfolio)) = (&self.store, persisted) {
            if let Err(e) = store.save(&portfolio).await {
                warn!(error = %e, "failed to persist state");
            }
        }
        Ok(())
    }

    /// Applies an authorized action. Ledger refusals here mean the risk
    /// gating and the ledger disagree: log loudly, discard, keep going.
    fn apply(&self, portfolio: &mut crate::core::portfolio::Portfolio, action: Action) -> bool {
        match portfolio.apply(action) {
            Ok(trade) => {
                match trade.action {
                    TradeAction::Open => info!(
                        symbol = %trade.symbol,
                        price = %trade.price,
                        quantity = %trade.quantity,
                        strategy = %trade.strategy,
                        "🚀 position opened"
                    ),
                    TradeAction::Close => info!(
                        symbol = %trade.symbol,
                        price = %trade.price,
                        pnl = %trade.pnl.unwrap_or_default(),
                        strategy = %trade.strategy,
                        "🔴 position closed"
                    ),
                }
                true
            }
            Err(e) => {
                error!(error = %e, "ledger rejected an authorized action (invariant violation)");
                false
            }
        }
    }
}
