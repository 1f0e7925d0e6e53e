//! Configuration file support for Arbor.
//!
//! ```toml
//! [schedule]
//! reporting_duration_secs = 2332800
//! reporting_dispute_duration_secs = 259200
//! designated_reporting_duration_secs = 259200
//! designated_reporting_dispute_duration_secs = 259200
//! fork_duration_secs = 5184000
//!
//! [policy]
//! open_interest = "unrestricted" # or "contained_market"
//! ```
//!
//! Every field is optional. Missing fields fall back to the defaults of
//! [`ReportingSchedule`] and [`OpenInterestPolicy`].

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;
use toml::de::Error as TomlError;

use arbor_types::{
    DEFAULT_DESIGNATED_REPORTING_DISPUTE_DURATION_SECS, DEFAULT_DESIGNATED_REPORTING_DURATION_SECS,
    DEFAULT_FORK_DURATION_SECS, DEFAULT_REPORTING_DISPUTE_DURATION_SECS,
    DEFAULT_REPORTING_DURATION_SECS, OpenInterestPolicy, ReportingSchedule, ScheduleError,
    UniverseConfig,
};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config at {}: {source}", path.display())]
    Read { path: PathBuf, source: io::Error },
    #[error("failed to parse config at {}: {source}", path.display())]
    Parse { path: PathBuf, source: TomlError },
    #[error("invalid reporting schedule in {}: {source}", path.display())]
    Schedule {
        path: PathBuf,
        source: ScheduleError,
    },
}

impl ConfigError {
    #[must_use]
    pub fn path(&self) -> &Path {
        match self {
            Self::Read { path, .. } | Self::Parse { path, .. } | Self::Schedule { path, .. } => {
                path
            }
        }
    }
}

/// `[schedule]` exactly as written in the file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ScheduleConfig {
    pub reporting_duration_secs: Option<u64>,
    pub reporting_dispute_duration_secs: Option<u64>,
    pub designated_reporting_duration_secs: Option<u64>,
    pub designated_reporting_dispute_duration_secs: Option<u64>,
    pub fork_duration_secs: Option<u64>,
}

impl ScheduleConfig {
    pub fn resolve(&self) -> Result<ReportingSchedule, ScheduleError> {
        ReportingSchedule::new(
            self.reporting_duration_secs
                .unwrap_or(DEFAULT_REPORTING_DURATION_SECS),
            self.reporting_dispute_duration_secs
                .unwrap_or(DEFAULT_REPORTING_DISPUTE_DURATION_SECS),
            self.designated_reporting_duration_secs
                .unwrap_or(DEFAULT_DESIGNATED_REPORTING_DURATION_SECS),
            self.designated_reporting_dispute_duration_secs
                .unwrap_or(DEFAULT_DESIGNATED_REPORTING_DISPUTE_DURATION_SECS),
            self.fork_duration_secs
                .unwrap_or(DEFAULT_FORK_DURATION_SECS),
        )
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PolicyConfig {
    #[serde(default)]
    pub open_interest: OpenInterestPolicy,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ArborConfig {
    pub schedule: Option<ScheduleConfig>,
    pub policy: Option<PolicyConfig>,
    /// Where this config was read from. Not part of the file format.
    #[serde(skip)]
    source: Option<PathBuf>,
}

impl ArborConfig {
    /// Read `~/.arbor/config.toml`. `Ok(None)` when there is no such file.
    pub fn load() -> Result<Option<Self>, ConfigError> {
        let Some(path) = config_path() else {
            return Ok(None);
        };
        if !path.exists() {
            return Ok(None);
        }
        Self::load_from(&path).map(Some)
    }

    /// Read an explicit config file. A missing file is an error here.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let content = match fs::read_to_string(path) {
            Ok(content) => content,
            Err(err) => {
                tracing::warn!("Failed to read config at {:?}: {}", path, err);
                return Err(ConfigError::Read {
                    path: path.to_path_buf(),
                    source: err,
                });
            }
        };

        let mut config = match Self::parse(&content) {
            Ok(config) => config,
            Err(err) => {
                tracing::warn!("Failed to parse config at {:?}: {}", path, err);
                return Err(ConfigError::Parse {
                    path: path.to_path_buf(),
                    source: err,
                });
            }
        };
        config.source = Some(path.to_path_buf());
        tracing::debug!(path = %path.display(), "Loaded config");
        Ok(config)
    }

    pub fn parse(content: &str) -> Result<Self, TomlError> {
        toml::from_str(content)
    }

    #[must_use]
    pub fn source(&self) -> Option<&Path> {
        self.source.as_deref()
    }

    /// Validate into the settings every universe of a ledger shares.
    pub fn universe_config(&self) -> Result<UniverseConfig, ConfigError> {
        let schedule = self
            .schedule
            .clone()
            .unwrap_or_default()
            .resolve()
            .map_err(|source| ConfigError::Schedule {
                path: self.source.clone().unwrap_or_default(),
                source,
            })?;
        let open_interest_policy = self
            .policy
            .as_ref()
            .map(|policy| policy.open_interest)
            .unwrap_or_default();
        Ok(UniverseConfig {
            schedule,
            open_interest_policy,
        })
    }
}

#[must_use]
pub fn config_path() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(".arbor").join("config.toml"))
}
