//! Configuration file handling.
//!
//! The configuration file is stored at `$POCKET_LEDGER_HOME/config.json` and holds the display
//! settings and the location of the data directory the ledger is persisted in.

use crate::error::{ErrorType, IntoResult, Res, Result};
use crate::store::FileStore;
use crate::utils;
use crate::view::{DisplayFormat, DEFAULT_CURRENCY_SYMBOL, DEFAULT_DATE_FORMAT};
use anyhow::{bail, Context};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, error};

/// The environment variable that overrides the default home directory.
pub const HOME_ENV: &str = "POCKET_LEDGER_HOME";

const APP_NAME: &str = "pocket-ledger";
const CONFIG_VERSION: u8 = 1;
const CONFIG_JSON: &str = "config.json";
const DATA_DIR: &str = "data";
const NOTIFICATION_MILLIS: u64 = 3000;

/// The `Config` object represents the configuration of the app. You instantiate it by providing
/// the path to the home directory and from there it loads `config.json`. It resolves the data
/// directory and turns the display settings into the types the rest of the crate uses.
#[derive(Debug, Clone)]
pub struct Config {
    root: PathBuf,
    config_path: PathBuf,
    config_file: ConfigFile,
}

impl Config {
    /// Creates the home directory and writes an initial `config.json` with default settings.
    ///
    /// # Errors
    /// - Returns a `Config` error if any file operations fail.
    pub async fn create(dir: impl Into<PathBuf>) -> Result<Self> {
        Self::create_inner(dir.into())
            .await
            .context("Unable to create the home directory and config")
            .pub_result(ErrorType::Config)
    }

    /// This will
    /// - validate that the home directory and its config file exist
    /// - load the config file and check its `app_name`
    /// - return the loaded configuration object
    ///
    /// The data directory is not required to exist yet; `open_store` creates it.
    pub async fn load(home: impl Into<PathBuf>) -> Result<Self> {
        Self::load_inner(home.into())
            .await
            .pub_result(ErrorType::Config)
    }

    /// Loads the config in `home`, creating the directory and a default config first if there is
    /// no `config.json` there.
    pub async fn load_or_create(home: impl Into<PathBuf>) -> Result<Self> {
        let home = home.into();
        if home.join(CONFIG_JSON).is_file() {
            Self::load(home).await
        } else {
            debug!("No config found in '{}', creating one", home.display());
            Self::create(home).await
        }
    }

    async fn create_inner(maybe_relative: PathBuf) -> Res<Self> {
        utils::make_dir(&maybe_relative)
            .await
            .context("Unable to create the home directory")?;
        let root = utils::canonicalize(&maybe_relative).await?;
        let config_path = root.join(CONFIG_JSON);
        let config_file = ConfigFile::default();
        config_file.save(&config_path).await?;
        Ok(Self {
            root,
            config_path,
            config_file,
        })
    }

    async fn load_inner(maybe_relative: PathBuf) -> Res<Self> {
        if !maybe_relative.is_dir() {
            bail!(
                "The home directory is missing '{}'",
                maybe_relative.display()
            )
        }
        let root = utils::canonicalize(&maybe_relative).await?;
        let config_path = root.join(CONFIG_JSON);
        if !config_path.is_file() {
            bail!("The config file is missing '{}'", config_path.display())
        }
        let config_file = ConfigFile::load(&config_path).await?;
        Ok(Self {
            root,
            config_path,
            config_file,
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    /// The directory the ledger is stored in. A relative `data_dir` is resolved against the home
    /// directory.
    pub fn data_dir(&self) -> PathBuf {
        let p = self.config_file.data_dir();
        if p.is_absolute() {
            return p;
        }
        self.root.join(p)
    }

    pub fn currency_symbol(&self) -> &str {
        &self.config_file.currency_symbol
    }

    pub fn date_format(&self) -> &str {
        &self.config_file.date_format
    }

    pub fn display_format(&self) -> DisplayFormat {
        DisplayFormat::new(self.currency_symbol(), self.date_format())
    }

    /// How long a notification stays up before it is dismissed.
    pub fn notification_duration(&self) -> Duration {
        Duration::from_millis(self.config_file.notification_millis)
    }

    /// Opens the file-backed store in `data_dir`, creating the directory if needed.
    pub async fn open_store(&self) -> Result<FileStore> {
        FileStore::open(self.data_dir()).await
    }
}

/// The home directory from `$POCKET_LEDGER_HOME`, or `~/pocket-ledger` when it is unset.
pub fn home_from_env() -> PathBuf {
    match std::env::var(HOME_ENV).ok().filter(|s| !s.is_empty()) {
        Some(home) => PathBuf::from(home),
        None => default_home(),
    }
}

fn default_home() -> PathBuf {
    match dirs::home_dir() {
        Some(home) => home.join(APP_NAME),
        None => {
            error!(
                "There was an error when trying to get your home directory. You can get around \
                this by setting {HOME_ENV} instead of relying on the default home directory. If \
                you continue using the program right now, you may have problems!",
            );
            PathBuf::from(APP_NAME)
        }
    }
}

/// Represents the serialization and deserialization format of the configuration file.
///
/// Example configuration:
/// ```json
/// {
///   "app_name": "pocket-ledger",
///   "config_version": 1,
///   "currency_symbol": "$",
///   "date_format": "%-m/%-d/%Y",
///   "notification_millis": 3000,
///   "data_dir": "data"
/// }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, Eq, PartialEq)]
struct ConfigFile {
    /// Application name, should always be "pocket-ledger"
    app_name: String,

    /// Configuration file version
    config_version: u8,

    /// Prefix for every displayed amount
    #[serde(default = "default_currency_symbol")]
    currency_symbol: String,

    /// A `chrono` format string for displayed dates
    #[serde(default = "default_date_format")]
    date_format: String,

    /// Auto-dismiss interval for notifications
    #[serde(default = "default_notification_millis")]
    notification_millis: u64,

    /// Where the ledger is stored (optional, relative to the home directory or absolute)
    /// Defaults to $POCKET_LEDGER_HOME/data if not specified
    #[serde(default, skip_serializing_if = "Option::is_none")]
    data_dir: Option<PathBuf>,
}

fn default_currency_symbol() -> String {
    DEFAULT_CURRENCY_SYMBOL.to_string()
}

fn default_date_format() -> String {
    DEFAULT_DATE_FORMAT.to_string()
}

fn default_notification_millis() -> u64 {
    NOTIFICATION_MILLIS
}

impl Default for ConfigFile {
    fn default() -> Self {
        Self {
            app_name: APP_NAME.to_string(),
            config_version: CONFIG_VERSION,
            currency_symbol: default_currency_symbol(),
            date_format: default_date_format(),
            notification_millis: NOTIFICATION_MILLIS,
            data_dir: None,
        }
    }
}

impl ConfigFile {
    /// Loads a ConfigFile from `path` and validates its `app_name`.
    async fn load(path: &Path) -> Res<Self> {
        let config: ConfigFile = utils::deserialize(path)
            .await
            .with_context(|| format!("Failed to load config file at {}", path.display()))?;

        anyhow::ensure!(
            config.app_name == APP_NAME,
            "Invalid app_name in config file: expected '{}', got '{}'",
            APP_NAME,
            config.app_name
        );

        Ok(config)
    }

    async fn save(&self, path: &Path) -> Res<()> {
        let data = serde_json::to_string_pretty(self).context("Unable to serialize config")?;
        utils::write(path, data)
            .await
            .context("Unable to write config file")
    }

    fn data_dir(&self) -> PathBuf {
        self.data_dir
            .clone()
            .unwrap_or_else(|| PathBuf::from(DATA_DIR))
    }
}
