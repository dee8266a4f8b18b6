//! Layered settings: built-in defaults, then `aquachain.toml` (or the file
//! given with `--config`), then `AQUACHAIN__*` environment variables.

use std::path::{Path, PathBuf};
use std::time::Duration;

use aquachain_telemetry::{FeedConfig, DEFAULT_ANALYSIS_DELAY, DEFAULT_PAYMENT_DELAY};
use aquachain_wallet::WalletConfig;
use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};

pub const DEFAULT_CONFIG_FILE: &str = "aquachain";
pub const ENV_PREFIX: &str = "AQUACHAIN";
pub const DEFAULT_STORAGE_PATH: &str = ".aquachain/session.json";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// JSON file backing the session keys.
    pub storage_path: PathBuf,
    pub payment_delay_ms: u64,
    pub analysis_delay_ms: u64,
    pub wallet: WalletConfig,
    pub feed: FeedConfig,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            storage_path: PathBuf::from(DEFAULT_STORAGE_PATH),
            payment_delay_ms: DEFAULT_PAYMENT_DELAY.as_millis() as u64,
            analysis_delay_ms: DEFAULT_ANALYSIS_DELAY.as_millis() as u64,
            wallet: WalletConfig::default(),
            feed: FeedConfig::default(),
        }
    }
}

impl Settings {
    /// Loads settings from the process environment. An explicit `file` must
    /// exist; the default `aquachain.toml` is optional.
    pub fn load(file: Option<&Path>) -> Result<Self, ConfigError> {
        Self::load_with_env(file, Environment::with_prefix(ENV_PREFIX))
    }

    pub(crate) fn load_with_env(file: Option<&Path>, env: Environment) -> Result<Self, ConfigError> {
        let file_source = match file {
            Some(path) => File::from(path).required(true),
            None => File::with_name(DEFAULT_CONFIG_FILE).required(false),
        };
        Config::builder()
            .add_source(Config::try_from(&Settings::default())?)
            .add_source(file_source)
            .add_source(env.separator("__").try_parsing(true))
            .build()?
            .try_deserialize()
    }

    pub fn payment_delay(&self) -> Duration {
        Duration::from_millis(self.payment_delay_ms)
    }

    pub fn analysis_delay(&self) -> Duration {
        Duration::from_millis(self.analysis_delay_ms)
    }
}
