use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

use log::warn;
use serde::Deserialize;
use url::Url;

pub const DEFAULT_URL: &str = "https://en.wikipedia.org/wiki/List_of_Super_Bowl_commercials";
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
    (KHTML, like Gecko) Chrome/58.0.3029.110 Safari/537.3";

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
#[serde(rename_all = "kebab-case")]
#[serde(default)]
pub struct Config {
    #[serde(skip)]
    pub file: Option<PathBuf>,

    /// article the commercials are extracted from
    pub url: Url,
    pub user_agent: String,
    pub timeout_secs: u64,
    /// response cache database
    pub cache: PathBuf,
    /// extracted commercials, written by `extract` and read by `map`
    pub commercials: PathBuf,
    /// reference table with a `BrandName` column
    pub brands: PathBuf,
    pub mapped: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            file: None,
            url: Url::parse(DEFAULT_URL).unwrap(),
            user_agent: DEFAULT_USER_AGENT.to_owned(),
            timeout_secs: 15,
            cache: "data/cache.sqlite".into(),
            commercials: "data/processed/wiki_super_bowl_commercials_extracted.csv".into(),
            brands: "data/raw/advertiser_ticker_mapping.csv".into(),
            mapped: "data/processed/commercials_mapped.csv".into(),
        }
    }
}

#[derive(Debug)]
pub enum ConfigError {
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
    ZeroTimeout,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Io { path, .. } => write!(f, "could not read config `{}`", path.display()),
            ConfigError::Parse { path, .. } => write!(f, "invalid config `{}`", path.display()),
            ConfigError::ZeroTimeout => f.write_str("`timeout-secs` must be at least 1"),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::Io { source, .. } => Some(source),
            ConfigError::Parse { source, .. } => Some(source),
            ConfigError::ZeroTimeout => None,
        }
    }
}

impl Config {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_owned(),
            source,
        })?;
        let mut cfg: Config = toml::from_str(&text).map_err(|source| ConfigError::Parse {
            path: path.to_owned(),
            source,
        })?;
        cfg.file = Some(path.to_owned());
        Ok(cfg)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.timeout_secs == 0 {
            return Err(ConfigError::ZeroTimeout);
        }
        if self.user_agent.trim().is_empty() {
            match &self.file {
                Some(file) => warn!("config file `{}` sets an empty user-agent", file.display()),
                None => warn!("user-agent is empty"),
            }
        }
        Ok(())
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}
