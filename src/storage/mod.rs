// src/storage/mod.rs
use crate::core::portfolio::Portfolio;
use anyhow::{Context, Result};
use async_trait::async_trait;
use std::path::PathBuf;
use tracing::warn;

/// Optional persistence seam. Without a store the ledger lives purely in
/// memory for the process lifetime.
#[async_trait]
pub trait StateStore: Send + Sync {
    async fn load(&self) -> Result<Option<Portfolio>>;
    async fn save(&self, portfolio: &Portfolio) -> Result<()>;
}

/// Pretty-printed JSON state file, written after every tick that
/// produced trades and read back at startup.
pub struct JsonStateStore {
    path: PathBuf,
}

impl JsonStateStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl StateStore for JsonStateStore {
    async fn load(&self) -> Result<Option<Portfolio>> {
        let data = match tokio::fs::read_to_string(&self.path).await {
            Ok(data) => data,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e).context("failed to read state file"),
        };
        match serde_json::from_str::<Portfolio>(&data) {
            Ok(portfolio) => Ok(Some(portfolio)),
            Err(e) => {
                // A corrupt state file is not worth crashing over; start fresh.
                warn!(path = %self.path.display(), error = %e, "ignoring unreadable state file");
                Ok(None)
            }
        }
    }

    async fn save(&self, portfolio: &Portfolio) -> Result<()> {
        let data = serde_json::to_string_pretty(portfolio).context("failed to encode state")?;
        tokio::fs::write(&self.path, data)
            .await
            .context("failed to write state file")
    }
}
