//! Configuration file handling for tx-annotate.
//!
//! The configuration file is stored at `$TX_ANNOTATE_HOME/config.json` and contains the
//! submission endpoint, the category legend, the goals offered by the editor and display
//! settings.

use crate::model::{AmountStyle, CategoryConfig, Legend};
use crate::{utils, Result};
use anyhow::{bail, ensure, Context};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use url::Url;

const APP_NAME: &str = "tx-annotate";
const CONFIG_VERSION: u8 = 1;
const CONFIG_JSON: &str = "config.json";
const TRANSACTIONS_JSON: &str = "transactions.json";
const REQUEST_TIMEOUT_SECS: u64 = 30;
const PAGE_SIZE: usize = 20;

/// The `Config` object represents the configuration of the app. You instantiate it by providing
/// the path to `$TX_ANNOTATE_HOME` and from there it loads `$TX_ANNOTATE_HOME/config.json`.
#[derive(Debug, Clone)]
pub struct Config {
    root: PathBuf,
    config_path: PathBuf,
    config_file: ConfigFile,
    legend: Legend,
    snapshot_path: PathBuf,
}

impl Config {
    /// Creates the home directory and an initial `config.json` with default settings.
    ///
    /// # Arguments
    /// - `dir` - The directory that will be the home directory, e.g. `$HOME/tx-annotate`
    /// - `action_base` - The URL that edits are submitted under, e.g.
    ///   `https://budget.example.com/update`
    ///
    /// # Errors
    /// - Returns an error if `action_base` is not a URL or if any file operation fails.
    pub async fn create(dir: impl Into<PathBuf>, action_base: &str) -> Result<Self> {
        let maybe_relative = dir.into();
        utils::make_dir(&maybe_relative)
            .await
            .context("Unable to create the tx-annotate home directory")?;
        let root = utils::canonicalize(&maybe_relative).await?;
        let config_path = root.join(CONFIG_JSON);
        if config_path.is_file() {
            bail!("A config file already exists at '{}'", config_path.display())
        }

        let config_file = ConfigFile {
            action_base: action_base.to_string(),
            ..ConfigFile::default()
        };
        let config = Self::from_file(root, config_file)?;
        config.config_file.save(&config.config_path).await?;
        Ok(config)
    }

    /// This will
    /// - validate that the home directory and the config file exist
    /// - load and validate the config file
    /// - return the loaded configuration object
    pub async fn load(home: impl Into<PathBuf>) -> Result<Self> {
        let maybe_relative = home.into();
        let root = utils::canonicalize(&maybe_relative)
            .await
            .context("The tx-annotate home is missing")?;

        let config_path = root.join(CONFIG_JSON);
        if !config_path.is_file() {
            bail!("The config file is missing '{}'", config_path.display())
        }
        let config_file = ConfigFile::load(&config_path).await?;
        Self::from_file(root, config_file)
    }

    /// Validates `config_file` for the home directory `root`. Does not touch the file system.
    pub(crate) fn from_file(root: PathBuf, config_file: ConfigFile) -> Result<Self> {
        let _ = Url::parse(&config_file.action_base)
            .with_context(|| format!("Invalid action_base '{}'", config_file.action_base))?;
        ensure!(
            config_file.request_timeout_secs > 0,
            "request_timeout_secs must be greater than zero"
        );
        ensure!(config_file.page_size > 0, "page_size must be greater than zero");
        let legend = Legend::new(config_file.categories.clone())
            .context("Invalid categories in the config file")?;
        let snapshot_path = match &config_file.snapshot_path {
            Some(p) if p.is_absolute() => p.clone(),
            Some(p) => root.join(p),
            None => root.join(TRANSACTIONS_JSON),
        };
        Ok(Self {
            config_path: root.join(CONFIG_JSON),
            root,
            config_file,
            legend,
            snapshot_path,
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    pub fn action_base(&self) -> &str {
        &self.config_file.action_base
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.config_file.request_timeout_secs)
    }

    pub fn page_size(&self) -> usize {
        self.config_file.page_size
    }

    pub fn amount_style(&self) -> &AmountStyle {
        &self.config_file.amount
    }

    pub fn legend(&self) -> &Legend {
        &self.legend
    }

    pub fn goals(&self) -> &[String] {
        &self.config_file.goals
    }

    /// Where the transactions to render are read from.
    pub fn snapshot_path(&self) -> &Path {
        &self.snapshot_path
    }
}

/// Represents the serialization and deserialization format of the configuration file.
///
/// Example configuration:
/// ```json
/// {
///   "app_name": "tx-annotate",
///   "config_version": 1,
///   "action_base": "https://budget.example.com/update",
///   "request_timeout_secs": 30,
///   "page_size": 20,
///   "amount": { "symbol": "€", "position": "suffix", "commas": true },
///   "categories": [
///     { "name": "Food", "color": "#f4a261", "keywords": ["bakery"], "warning_threshold": "300" }
///   ],
///   "goals": ["Vacation"]
/// }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, Eq, PartialEq)]
pub(crate) struct ConfigFile {
    /// Application name, should always be "tx-annotate"
    pub(crate) app_name: String,

    /// Configuration file version
    pub(crate) config_version: u8,

    /// Base URL of the edit endpoint. Edits go to `<action_base>/<month>/<id>`.
    pub(crate) action_base: String,

    #[serde(default = "default_request_timeout_secs")]
    pub(crate) request_timeout_secs: u64,

    /// Number of transactions shown before the "show more" control
    #[serde(default = "default_page_size")]
    pub(crate) page_size: usize,

    #[serde(default)]
    pub(crate) amount: AmountStyle,

    /// The category legend, in display order
    #[serde(default)]
    pub(crate) categories: Vec<CategoryConfig>,

    /// Goals offered by the editor, in display order
    #[serde(default)]
    pub(crate) goals: Vec<String>,

    /// Path to the transactions snapshot (optional, relative to the home directory or absolute)
    /// Defaults to $TX_ANNOTATE_HOME/transactions.json if not specified
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub(crate) snapshot_path: Option<PathBuf>,
}

fn default_request_timeout_secs() -> u64 {
    REQUEST_TIMEOUT_SECS
}

fn default_page_size() -> usize {
    PAGE_SIZE
}

impl Default for ConfigFile {
    fn default() -> Self {
        Self {
            app_name: APP_NAME.to_string(),
            config_version: CONFIG_VERSION,
            action_base: String::new(),
            request_timeout_secs: REQUEST_TIMEOUT_SECS,
            page_size: PAGE_SIZE,
            amount: AmountStyle::default(),
            categories: Vec::new(),
            goals: Vec::new(),
            snapshot_path: None,
        }
    }
}

impl ConfigFile {
    /// Loads a ConfigFile asynchronously from the specified path.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read or parsed, or if it belongs to another app
    pub async fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let config: ConfigFile = utils::deserialize(path)
            .await
            .context("Unable to load the config file")?;

        ensure!(
            config.app_name == APP_NAME,
            "Invalid app_name in config file: expected '{}', got '{}'",
            APP_NAME,
            config.app_name
        );

        Ok(config)
    }

    /// Saves the ConfigFile to the specified path.
    pub async fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let p = path.as_ref();
        let data = serde_json::to_string_pretty(self).context("Unable to serialize config")?;
        utils::write(p, data)
            .await
            .context("Unable to write config file")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const ACTION_BASE: &str = "http://localhost:5000/update";

    #[tokio::test]
    async fn test_config_create() {
        let dir = TempDir::new().unwrap();
        let home_dir = dir.path().join("tx_home");

        let config = Config::create(&home_dir, ACTION_BASE).await.unwrap();

        assert_eq!(ACTION_BASE, config.action_base());
        assert_eq!(Duration::from_secs(30), config.request_timeout());
        assert_eq!(20, config.page_size());
        assert!(config.config_path().is_file());
        assert_eq!(config.snapshot_path(), config.root().join(TRANSACTIONS_JSON));

        let loaded = Config::load(&home_dir).await.unwrap();
        assert_eq!(loaded.config_file, config.config_file);
    }

    #[tokio::test]
    async fn test_config_create_twice() {
        let dir = TempDir::new().unwrap();
        Config::create(dir.path(), ACTION_BASE).await.unwrap();
        let result = Config::create(dir.path(), ACTION_BASE).await;
        assert!(result.unwrap_err().to_string().contains("already exists"));
    }

    #[tokio::test]
    async fn test_config_create_invalid_action_base() {
        let dir = TempDir::new().unwrap();
        let result = Config::create(dir.path(), "not a url").await;
        assert!(result.unwrap_err().to_string().contains("Invalid action_base"));
        assert!(!dir.path().join(CONFIG_JSON).exists());
    }

    #[tokio::test]
    async fn test_config_load_missing() {
        let dir = TempDir::new().unwrap();
        let result = Config::load(dir.path()).await;
        assert!(result.unwrap_err().to_string().contains("config file is missing"));
    }

    #[tokio::test]
    async fn test_config_file_load_with_minimal_config() {
        let temp_dir = TempDir::new().unwrap();
        let json = r##"{
            "app_name": "tx-annotate",
            "config_version": 1,
            "action_base": "https://budget.example.com/update/",
            "categories": [
                { "name": "Food", "color": "#f4a261", "keywords": ["bakery"] },
                { "name": "Rent", "warning_threshold": "700" }
            ],
            "goals": ["Vacation"],
            "snapshot_path": "data/tx.json"
        }"##;
        utils::write(temp_dir.path().join(CONFIG_JSON), json)
            .await
            .unwrap();

        let config = Config::load(temp_dir.path()).await.unwrap();
        assert_eq!(config.page_size(), PAGE_SIZE);
        assert_eq!(config.amount_style(), &AmountStyle::default());
        assert_eq!(config.goals(), &["Vacation".to_string()]);
        assert_eq!(config.legend().categories().len(), 2);
        assert_eq!(config.legend().suggest("BAKERY PAUL"), vec!["Food"]);
        assert!(config.snapshot_path().ends_with("data/tx.json"));
    }

    #[tokio::test]
    async fn test_config_file_load_invalid_app_name() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join(CONFIG_JSON);
        let json = r#"{
            "app_name": "wrong_app",
            "config_version": 1,
            "action_base": "https://budget.example.com/update"
        }"#;
        utils::write(&config_path, json).await.unwrap();

        let result = ConfigFile::load(&config_path).await;
        assert!(result.unwrap_err().to_string().contains("Invalid app_name"));
    }

    #[test]
    fn test_invalid_keyword_is_rejected() {
        let config_file = ConfigFile {
            action_base: ACTION_BASE.to_string(),
            categories: vec![CategoryConfig::new("Food").with_keywords(["(unclosed"])],
            ..ConfigFile::default()
        };
        let result = Config::from_file(PathBuf::from("/tmp"), config_file);
        assert!(format!("{:#}", result.unwrap_err()).contains("Invalid categories"));
    }

    #[test]
    fn test_zero_page_size_is_rejected() {
        let config_file = ConfigFile {
            action_base: ACTION_BASE.to_string(),
            page_size: 0,
            ..ConfigFile::default()
        };
        assert!(Config::from_file(PathBuf::from("/tmp"), config_file).is_err());
    }

    #[test]
    fn test_config_file_serialization_omits_none_fields() {
        let json = serde_json::to_string(&ConfigFile::default()).unwrap();
        assert!(!json.contains("snapshot_path"));
        assert!(json.contains(r#""app_name":"tx-annotate""#));
    }
}
