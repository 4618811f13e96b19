//! Configuration management with layered hierarchy

use miette::Diagnostic;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

use crate::protocol::SUBMISSION_PATH;
use crate::schema::{Choices, FormSchema};
use crate::wizard::stage::{
    DEFAULT_DEPARTURE_HUBS, DEFAULT_MARTIAN_LODGINGS, DEFAULT_RESET_DELAY,
};
use crate::wizard::WizardConfig;

/// Name of the per-directory config file
pub const LOCAL_CONFIG_FILE: &str = "hmv.yaml";

const DEFAULT_BIND: &str = "127.0.0.1:3000";

#[derive(Debug, Error, Diagnostic)]
pub enum ConfigError {
    #[error("Could not read config file {path}")]
    #[diagnostic(code(hmv::config::read))]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid config file {path}: {message}")]
    #[diagnostic(code(hmv::config::parse), help("Config files are YAML maps, see `hmv config show`"))]
    Parse { path: PathBuf, message: String },

    #[error("Invalid value for {key}: {value}")]
    #[diagnostic(code(hmv::config::env))]
    InvalidEnv { key: String, value: String },
}

/// HMV configuration with layered hierarchy
#[derive(Debug, Default, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    /// URL applications are posted to
    #[serde(skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<String>,

    /// Address `hmv serve` binds
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bind: Option<String>,

    /// Seconds the success screen stays before the wizard resets
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reset_delay_secs: Option<u64>,

    /// Launch pads offered on the travel stage
    #[serde(skip_serializing_if = "Option::is_none")]
    pub departure_hubs: Option<Vec<String>>,

    /// Lodgings offered on the travel stage
    #[serde(skip_serializing_if = "Option::is_none")]
    pub martian_lodgings: Option<Vec<String>>,
}

impl Config {
    /// Load configuration from all sources, merging in priority order
    pub fn load(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        Self::load_with_env(explicit, |key| std::env::var(key).ok())
    }

    /// [`Config::load`] with a custom environment lookup
    pub fn load_with_env(
        explicit: Option<&Path>,
        env: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        // 1. Built-in defaults (already in Default impl and accessors)
        let mut config = Config::default();

        // 2. Global user config (~/.config/hmv/config.yaml)
        if let Some(global_path) = Self::global_config_path() {
            if let Some(global) = Self::read_file(&global_path)? {
                config.merge(global);
            }
        }

        // 3. Local config (./hmv.yaml), or the file given on the command line
        let local_path = explicit
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from(LOCAL_CONFIG_FILE));
        match Self::read_file(&local_path)? {
            Some(local) => config.merge(local),
            None if explicit.is_some() => {
                return Err(ConfigError::Read {
                    path: local_path,
                    source: std::io::Error::new(std::io::ErrorKind::NotFound, "file not found"),
                })
            }
            None => {}
        }

        // 4. Environment variables
        config.apply_env(env)?;

        tracing::debug!(?config, "configuration loaded");
        Ok(config)
    }

    /// Get the path to the global config file
    pub fn global_config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("", "", "hmv")
            .map(|dirs| dirs.config_dir().join("config.yaml"))
    }

    fn read_file(path: &Path) -> Result<Option<Config>, ConfigError> {
        if !path.exists() {
            return Ok(None);
        }
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        if contents.trim().is_empty() {
            return Ok(Some(Config::default()));
        }
        serde_yml::from_str::<Config>(&contents)
            .map(Some)
            .map_err(|e| ConfigError::Parse {
                path: path.to_path_buf(),
                message: e.to_string(),
            })
    }

    fn apply_env(&mut self, env: impl Fn(&str) -> Option<String>) -> Result<(), ConfigError> {
        if let Some(endpoint) = env("HMV_ENDPOINT") {
            self.endpoint = Some(endpoint);
        }
        if let Some(bind) = env("HMV_BIND") {
            self.bind = Some(bind);
        }
        if let Some(delay) = env("HMV_RESET_DELAY_SECS") {
            let secs = delay.trim().parse().map_err(|_| ConfigError::InvalidEnv {
                key: "HMV_RESET_DELAY_SECS".to_string(),
                value: delay.clone(),
            })?;
            self.reset_delay_secs = Some(secs);
        }
        Ok(())
    }

    /// Merge another config into this one (other takes precedence)
    fn merge(&mut self, other: Config) {
        if other.endpoint.is_some() {
            self.endpoint = other.endpoint;
        }
        if other.bind.is_some() {
            self.bind = other.bind;
        }
        if other.reset_delay_secs.is_some() {
            self.reset_delay_secs = other.reset_delay_secs;
        }
        if other.departure_hubs.is_some() {
            self.departure_hubs = other.departure_hubs;
        }
        if other.martian_lodgings.is_some() {
            self.martian_lodgings = other.martian_lodgings;
        }
    }

    /// Get the bind address for the endpoint
    pub fn bind(&self) -> String {
        self.bind.clone().unwrap_or_else(|| DEFAULT_BIND.to_string())
    }

    /// Get the submission URL, derived from the bind address when unset
    pub fn endpoint(&self) -> String {
        self.endpoint
            .clone()
            .unwrap_or_else(|| format!("http://{}{}", self.bind(), SUBMISSION_PATH))
    }

    pub fn reset_delay(&self) -> Duration {
        self.reset_delay_secs
            .map(Duration::from_secs)
            .unwrap_or(DEFAULT_RESET_DELAY)
    }

    /// Choice lists, falling back to the built-in launch pads and lodgings
    pub fn choices(&self) -> Choices {
        let or_default = |list: &Option<Vec<String>>, default: &[&str]| {
            list.clone()
                .unwrap_or_else(|| default.iter().map(|s| s.to_string()).collect())
        };
        Choices {
            departure_hubs: or_default(&self.departure_hubs, DEFAULT_DEPARTURE_HUBS),
            martian_lodgings: or_default(&self.martian_lodgings, DEFAULT_MARTIAN_LODGINGS),
        }
    }

    /// Schema used by both the wizard and the endpoint
    pub fn schema(&self) -> FormSchema {
        FormSchema::with_choices(self.choices())
    }

    pub fn wizard_config(&self) -> WizardConfig {
        WizardConfig::standard()
            .with_choices(self.choices())
            .with_reset_delay(self.reset_delay())
    }

    /// Effective configuration with every default filled in
    pub fn resolved(&self) -> Config {
        let choices = self.choices();
        Config {
            endpoint: Some(self.endpoint()),
            bind: Some(self.bind()),
            reset_delay_secs: Some(self.reset_delay().as_secs()),
            departure_hubs: Some(choices.departure_hubs),
            martian_lodgings: Some(choices.martian_lodgings),
        }
    }
}
