//! Composition of the long-lived services shared by every command.

use std::path::PathBuf;
use std::sync::Arc;

use gantry_action::{ActionRegistry, Dispatcher, ProcessProvider};
use gantry_core::GantryConfig;
use gantry_stats::{StatsError, StatsStore};

/// Built once per process and handed to the CLI command or the HTTP server.
pub struct AppContext {
    pub config: GantryConfig,
    pub config_path: PathBuf,
    pub dispatcher: Arc<Dispatcher>,
}

impl AppContext {
    /// Open the statistics store and wire the on-disk action provider.
    pub fn open(config: GantryConfig, config_path: PathBuf) -> Result<Self, StatsError> {
        let stats = Arc::new(StatsStore::open(config.stats_file())?);
        tracing::debug!(path = %stats.path().display(), "Statistics store opened");

        let provider = Arc::new(ProcessProvider::new(config.actions_dir()));
        let registry = Arc::new(ActionRegistry::new(provider));
        let dispatcher =
            Arc::new(Dispatcher::new(registry, stats).with_timeout(config.action_timeout()));

        Ok(Self {
            config,
            config_path,
            dispatcher,
        })
    }

    pub fn stats(&self) -> &StatsStore {
        self.dispatcher.stats()
    }

    pub fn registry(&self) -> &ActionRegistry {
        self.dispatcher.registry()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_open_creates_stats_file() {
        let tmp = tempfile::tempdir().unwrap();
        let mut config = GantryConfig::default();
        config.general.stats_file = tmp.path().join("data/stats.json").display().to_string();
        config.general.actions_dir = tmp.path().join("actions").display().to_string();
        config.actions.timeout_secs = 5;

        let ctx = AppContext::open(config, tmp.path().join("config.toml")).unwrap();
        assert!(tmp.path().join("data/stats.json").exists());
        assert!(ctx.registry().list_available().unwrap().is_empty());
        assert_eq!(
            ctx.dispatcher.timeout(),
            Some(std::time::Duration::from_secs(5))
        );
    }
}
