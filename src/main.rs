// src/main.rs
use crate::config::AppConfig;
use crate::core::context::BotContext;
use crate::core::engine::TradingEngine;
use crate::core::portfolio::Portfolio;
use crate::core::risk::{RiskManager, RiskParams};
use crate::core::watchlist::Watchlist;
use crate::market::CoinGeckoSource;
use crate::storage::{JsonStateStore, StateStore};
use crate::strategies::SignalEngine;
use dotenvy::dotenv;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

mod config;
mod core;
mod errors;
mod indicators;
mod market;
mod storage;
mod strategies;
mod tui;
mod types;
mod utils;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();

    let cfg = AppConfig::new()?;

    // Logs go to a daily file; the terminal belongs to the dashboard.
    let file_appender = tracing_appender::rolling::daily("logs", "paperhawk.log");
    let (writer, _log_guard) = tracing_appender::non_blocking(file_appender);
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with_writer(writer)
        .with_ansi(false)
        .init();

    info!(
        balance = %cfg.initial_balance,
        symbols = cfg.watchlist.len(),
        interval_secs = cfg.tick_interval_secs,
        "🚀 paperhawk starting"
    );

    let mut watchlist = Watchlist::new(cfg.watchlist_capacity);
    for symbol in &cfg.watchlist {
        if let Err(e) = watchlist.add(symbol) {
            warn!(symbol = %symbol, error = %e, "skipping configured symbol");
        }
    }

    let store: Option<Arc<dyn StateStore>> = cfg
        .state_file
        .as_ref()
        .map(|path| Arc::new(JsonStateStore::new(path)) as Arc<dyn StateStore>);

    let portfolio = match &store {
        Some(store) => match store.load().await? {
            Some(portfolio) => {
                info!(balance = %portfolio.balance(), "restored previous state");
                portfolio
            }
            None => Portfolio::new(cfg.initial_balance, cfg.trade_log_capacity),
        },
        None => Portfolio::new(cfg.initial_balance, cfg.trade_log_capacity),
    };

    let ctx = BotContext::new(portfolio, watchlist);
    let source = Arc::new(CoinGeckoSource::new(
        cfg.history_capacity,
        Duration::from_secs(cfg.fetch_timeout_secs),
    ));
    let engine = TradingEngine::new(
        ctx.clone(),
        source,
        SignalEngine::from_config(&cfg.strategy),
        RiskManager::new(RiskParams::from(&cfg)),
        store,
        Duration::from_secs(cfg.tick_interval_secs),
        Duration::from_secs(cfg.fetch_timeout_secs),
    );

    let loop_task = tokio::spawn(engine.run());

    // The dashboard owns the foreground; Ctrl-C works even if the
    // terminal is in a bad state.
    tokio::select! {
        result = tui::run(ctx.clone()) => {
            if let Err(e) = result {
                warn!(error = %e, "dashboard exited with error");
            }
        }
        _ = tokio::signal::ctrl_c() => {
            info!("interrupt received");
        }
    }

    ctx.stop().await;
    loop_task.abort();
    info!("🛑 paperhawk shut down");

    Ok(())
}
