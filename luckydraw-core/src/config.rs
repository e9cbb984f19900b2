use crate::error::{LuckyDrawError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

pub const DEFAULT_STORE_KEY: &str = "winners";
pub const DEFAULT_TICK_MS: u64 = 50;
const MAX_TICK_MS: u64 = 1_000;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DrawConfig {
    /// Delay between reselections while the draw is running
    pub tick_interval_ms: u64,
    /// Wipe stored winners when the presenter starts
    pub reset_on_start: bool,
    /// Keep winners in the local database; otherwise they live in memory only
    pub persist_across_restarts: bool,
    /// Slot name for the winner mapping
    pub store_key: String,
}

impl Default for DrawConfig {
    fn default() -> Self {
        Self {
            tick_interval_ms: DEFAULT_TICK_MS,
            reset_on_start: false,
            persist_across_restarts: true,
            store_key: DEFAULT_STORE_KEY.to_string(),
        }
    }
}

impl DrawConfig {
    /// Reads a JSON config file, falling back to defaults when it is absent.
    pub async fn load_or_default(path: &Path) -> Result<Self> {
        if !tokio::fs::try_exists(path).await? {
            tracing::debug!("No config at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = tokio::fs::read_to_string(path).await?;
        let config: Self = serde_json::from_str(&content).map_err(|e| {
            LuckyDrawError::config(format!("{}: {}", path.display(), e))
        })?;
        config.validate()?;

        tracing::info!("Loaded config from {}", path.display());
        Ok(config)
    }

    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms)
    }

    pub fn validate(&self) -> Result<()> {
        if self.tick_interval_ms == 0 {
            return Err(LuckyDrawError::config("Tick interval must be greater than 0"));
        }

        if self.tick_interval_ms > MAX_TICK_MS {
            return Err(LuckyDrawError::config(format!(
                "Tick interval must be at most {} ms",
                MAX_TICK_MS
            )));
        }

        if self.store_key.trim().is_empty() {
            return Err(LuckyDrawError::config("Store key cannot be empty"));
        }

        Ok(())
    }
}
