use std::path::PathBuf;

use tracing::{info, warn};

use crate::model::{AccountId, InvalidAccountId};

pub const STORE_ENV: &str = "CLICKER_STORE";
pub const DATA_DIR_ENV: &str = "CLICKER_DATA_DIR";
pub const ACCOUNT_ENV: &str = "CLICKER_ACCOUNT";

const DEFAULT_ACCOUNT: &str = "local-player";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreKind {
    Memory,
    File,
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("CLICKER_STORE must be \"memory\" or \"file\", got {0:?}")]
    UnknownStore(String),

    #[error("CLICKER_ACCOUNT: {0}")]
    Account(#[from] InvalidAccountId),
}

#[derive(Debug, Clone)]
pub struct Config {
    pub store: StoreKind,
    pub data_dir: PathBuf,
    pub account: AccountId,
}

impl Config {
    /// Reads configuration from the process environment. Call
    /// `dotenvy::dotenv()` first if a `.env` file should be honoured.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok().filter(|v| !v.trim().is_empty()))
    }

    /// Same as [`from_env`](Self::from_env) with an injectable lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let store = match lookup(STORE_ENV).as_deref().map(str::trim) {
            None | Some("file") => StoreKind::File,
            Some("memory") => StoreKind::Memory,
            Some(other) => return Err(ConfigError::UnknownStore(other.to_string())),
        };

        let data_dir = match lookup(DATA_DIR_ENV) {
            Some(dir) => PathBuf::from(dir),
            None => default_data_dir(),
        };

        let account = match lookup(ACCOUNT_ENV) {
            Some(id) => id.trim().parse()?,
            None => {
                info!("{} not set, playing as {}", ACCOUNT_ENV, DEFAULT_ACCOUNT);
                DEFAULT_ACCOUNT.parse()?
            }
        };

        Ok(Self {
            store,
            data_dir,
            account,
        })
    }
}

fn default_data_dir() -> PathBuf {
    match dirs::data_dir() {
        Some(dir) => dir.join("coin-clicker"),
        None => {
            warn!("No platform data directory, using ./data");
            PathBuf::from("data")
        }
    }
}
