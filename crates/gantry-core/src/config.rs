use std::path::{Path, PathBuf};

use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::{GantryError, Result};

/// Top-level configuration for the Gantry host.
///
/// Loaded from `~/.gantry/config.toml` by default. Paths may start with `~/`
/// and are expanded with [`expand_home`] when used.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GantryConfig {
    #[serde(default)]
    pub general: GeneralConfig,
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub actions: ActionsConfig,
}

impl GantryConfig {
    /// Load configuration from a TOML file.
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: GantryConfig = toml::from_str(&content)?;
        info!("Configuration loaded from {}", path.display());
        Ok(config)
    }

    /// Load configuration, creating a default file with a fresh API token if
    /// none exists yet.
    ///
    /// A file that exists but fails to parse is an error: silently replacing
    /// it would rotate the API token.
    pub fn load_or_create(path: &Path) -> Result<Self> {
        if path.exists() {
            return Self::load(path);
        }
        let config = Self::with_generated_token();
        config.save(path)?;
        info!(path = %path.display(), "Default configuration created");
        Ok(config)
    }

    /// Load configuration, falling back to defaults if the file does not
    /// exist or cannot be parsed.
    pub fn load_or_default(path: &Path) -> Self {
        match Self::load(path) {
            Ok(config) => config,
            Err(e) => {
                warn!(
                    "Failed to load config from {}: {}. Using defaults.",
                    path.display(),
                    e
                );
                Self::default()
            }
        }
    }

    /// Save the current configuration to a TOML file.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let content =
            toml::to_string_pretty(self).map_err(|e| GantryError::Config(e.to_string()))?;
        std::fs::write(path, content)?;

        // The file carries the API token.
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o600))?;
        }

        info!("Configuration saved to {}", path.display());
        Ok(())
    }

    /// Replace the file at `path` with defaults and a newly generated token.
    pub fn reset(path: &Path) -> Result<Self> {
        match std::fs::remove_file(path) {
            Ok(()) => {}
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => return Err(e.into()),
        }
        Self::load_or_create(path)
    }

    /// Defaults plus a random API token.
    pub fn with_generated_token() -> Self {
        let mut config = Self::default();
        config.server.api_token = generate_token();
        config
    }

    /// Expanded actions directory.
    pub fn actions_dir(&self) -> PathBuf {
        expand_home(&self.general.actions_dir)
    }

    /// Expanded statistics file path.
    pub fn stats_file(&self) -> PathBuf {
        expand_home(&self.general.stats_file)
    }

    /// Expanded log file path.
    pub fn log_file(&self) -> PathBuf {
        expand_home(&self.general.log_file)
    }

    /// Per-dispatch timeout, `None` when disabled.
    pub fn action_timeout(&self) -> Option<std::time::Duration> {
        match self.actions.timeout_secs {
            0 => None,
            secs => Some(std::time::Duration::from_secs(secs)),
        }
    }
}

/// Filesystem locations and logging.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Directory holding one sub-directory per action.
    pub actions_dir: String,
    /// JSON file holding execution statistics and history.
    pub stats_file: String,
    /// Log file appended to by every gantry process.
    pub log_file: String,
    /// Log level: trace, debug, info, warn, error.
    pub log_level: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            actions_dir: "~/.gantry/actions".to_string(),
            stats_file: "~/.gantry/stats.json".to_string(),
            log_file: "~/.gantry/gantry.log".to_string(),
            log_level: "info".to_string(),
        }
    }
}

/// HTTP server settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Address to bind.
    pub bind: String,
    /// Port to listen on.
    pub port: u16,
    /// Token required on every protected endpoint.
    pub api_token: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: "127.0.0.1".to_string(),
            port: 8080,
            api_token: String::new(),
        }
    }
}

/// Action execution settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ActionsConfig {
    /// Seconds before a running action is abandoned. 0 disables the timeout.
    pub timeout_secs: u64,
}

/// Generate a random 32-character hex token.
pub fn generate_token() -> String {
    let mut rng = rand::rng();
    let bytes: [u8; 16] = rng.random();
    hex::encode(bytes)
}

/// Expand a leading `~` to the user's home directory.
pub fn expand_home(path: &str) -> PathBuf {
    if path == "~" || path.starts_with("~/") || path.starts_with("~\\") {
        #[cfg(target_os = "windows")]
        let home = std::env::var("USERPROFILE").unwrap_or_else(|_| ".".to_string());
        #[cfg(not(target_os = "windows"))]
        let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
        let rest = path.get(2..).unwrap_or("");
        PathBuf::from(home).join(rest)
    } else {
        PathBuf::from(path)
    }
}

/// Default config file path (`~/.gantry/config.toml`).
pub fn default_config_path() -> PathBuf {
    expand_home("~/.gantry/config.toml")
}
