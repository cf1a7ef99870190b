use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::ConfigError;
use crate::lifecycle::HangupAction;
use crate::links::{DomainSource, DomainSources, LinkConfig};

/// Config file looked up in the working directory when none is given.
pub const DEFAULT_CONFIG_FILE: &str = "unax.toml";

// ── Top-level config ──────────────────────────────────────────────

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Path the config was read from; empty when running on defaults.
    #[serde(skip)]
    pub config_path: PathBuf,

    #[serde(default)]
    pub domains: DomainsConfig,

    #[serde(default)]
    pub links: LinkConfig,

    #[serde(default)]
    pub lifecycle: LifecycleConfig,
}

// ── Domain lists ─────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DomainsConfig {
    pub social: PathBuf,
    pub short_post: PathBuf,
    pub general: PathBuf,
}

impl Default for DomainsConfig {
    fn default() -> Self {
        Self {
            social: PathBuf::from("domains-bsky.txt"),
            short_post: PathBuf::from("domains-twitter.txt"),
            general: PathBuf::from("domains-links.txt"),
        }
    }
}

impl DomainsConfig {
    /// File sources, relative paths resolved against `base_dir`.
    pub fn sources(&self, base_dir: &Path) -> DomainSources {
        let resolve = |path: &PathBuf| DomainSource::File(base_dir.join(path));
        DomainSources {
            social: resolve(&self.social),
            short_post: resolve(&self.short_post),
            general: resolve(&self.general),
        }
    }
}

// ── Lifecycle ────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LifecycleConfig {
    /// What a hang-up signal does: `stop` or `reconnect`.
    pub hangup: HangupAction,
    pub initial_backoff_secs: u64,
    pub max_backoff_secs: u64,
}

impl Default for LifecycleConfig {
    fn default() -> Self {
        Self {
            hangup: HangupAction::Stop,
            initial_backoff_secs: 2,
            max_backoff_secs: 300,
        }
    }
}

impl Config {
    /// Load config from `path`, or from [`DEFAULT_CONFIG_FILE`] if present.
    ///
    /// An explicit path must exist; a missing default file means defaults.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let config = match path {
            Some(path) => Self::load_from_path(path)?,
            None => {
                let default_path = Path::new(DEFAULT_CONFIG_FILE);
                if default_path.exists() {
                    Self::load_from_path(default_path)?
                } else {
                    Self::default()
                }
            }
        };
        config.validate()?;
        Ok(config)
    }

    fn load_from_path(path: &Path) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let mut config: Config = toml::from_str(&contents).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        config.config_path = path.to_path_buf();
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.links.timeout_secs == 0 {
            return Err(ConfigError::Validation(
                "links.timeout_secs must be >= 1".into(),
            ));
        }
        match url::Url::parse(&self.links.mirror_base_url) {
            Ok(url) if matches!(url.scheme(), "http" | "https") => {}
            _ => {
                return Err(ConfigError::Validation(format!(
                    "links.mirror_base_url must be an http(s) URL, got {:?}",
                    self.links.mirror_base_url
                )));
            }
        }
        Ok(())
    }

    /// Directory domain list paths are relative to.
    pub fn base_dir(&self) -> &Path {
        self.config_path.parent().unwrap_or_else(|| Path::new("."))
    }

    pub fn domain_sources(&self) -> DomainSources {
        self.domains.sources(self.base_dir())
    }
}
