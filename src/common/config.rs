//! Configuration file handling
//!
//! The harness reads `pagecheck.toml` from an explicit `--config` path, the
//! working directory, or the platform config directory, in that order.
//! Every field has a default so no file is required at all.

use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

use super::{Error, Result};
use crate::check::RetryPolicy;

/// Main configuration structure
#[derive(Debug, Clone, Deserialize)]
pub struct HarnessConfig {
    /// Base URL of the application under test
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Authentication routes on the application under test
    #[serde(default)]
    pub auth: AuthRoutes,

    /// Timeout settings
    #[serde(default)]
    pub timeouts: Timeouts,

    /// Runner settings
    #[serde(default)]
    pub runner: RunnerSettings,
}

impl Default for HarnessConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            auth: AuthRoutes::default(),
            timeouts: Timeouts::default(),
            runner: RunnerSettings::default(),
        }
    }
}

fn default_base_url() -> String {
    "http://localhost:7777".to_string()
}

/// Routes used by session setup
#[derive(Debug, Clone, Deserialize)]
pub struct AuthRoutes {
    /// Login form post target
    #[serde(default = "default_login_path")]
    pub login_path: String,

    /// Registration form post target
    #[serde(default = "default_register_path")]
    pub register_path: String,
}

impl Default for AuthRoutes {
    fn default() -> Self {
        Self {
            login_path: default_login_path(),
            register_path: default_register_path(),
        }
    }
}

fn default_login_path() -> String {
    "/auth/login".to_string()
}
fn default_register_path() -> String {
    "/auth/register".to_string()
}

/// Timeout settings
#[derive(Debug, Clone, Deserialize)]
pub struct Timeouts {
    /// Timeout for a single HTTP round trip, in seconds
    #[serde(default = "default_navigation")]
    pub navigation_secs: u64,

    /// Ceiling for assertion polling, in milliseconds
    #[serde(default = "default_assertion_ceiling")]
    pub assertion_ceiling_ms: u64,

    /// Interval between assertion polls, in milliseconds
    #[serde(default = "default_poll_interval")]
    pub poll_interval_ms: u64,

    /// Wall-clock ceiling for one scenario, in seconds
    #[serde(default = "default_scenario")]
    pub scenario_secs: u64,
}

impl Default for Timeouts {
    fn default() -> Self {
        Self {
            navigation_secs: default_navigation(),
            assertion_ceiling_ms: default_assertion_ceiling(),
            poll_interval_ms: default_poll_interval(),
            scenario_secs: default_scenario(),
        }
    }
}

fn default_navigation() -> u64 {
    30
}
fn default_assertion_ceiling() -> u64 {
    5_000
}
fn default_poll_interval() -> u64 {
    50
}
fn default_scenario() -> u64 {
    120
}

/// Runner settings
#[derive(Debug, Clone, Deserialize)]
pub struct RunnerSettings {
    /// Number of scenarios executed concurrently
    #[serde(default = "default_jobs")]
    pub jobs: usize,
}

impl Default for RunnerSettings {
    fn default() -> Self {
        Self {
            jobs: default_jobs(),
        }
    }
}

fn default_jobs() -> usize {
    4
}

impl HarnessConfig {
    /// Load configuration, trying an explicit path first, then
    /// `./pagecheck.toml`, then the platform config directory.
    ///
    /// Returns defaults if no file exists.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let candidates: Vec<PathBuf> = explicit
            .map(|p| vec![p.to_path_buf()])
            .unwrap_or_else(|| {
                let mut paths = vec![PathBuf::from("pagecheck.toml")];
                if let Some(p) = config_path() {
                    paths.push(p);
                }
                paths
            });

        for path in candidates {
            if path.exists() {
                let content = std::fs::read_to_string(&path).map_err(|e| Error::FileRead {
                    path: path.display().to_string(),
                    error: e.to_string(),
                })?;
                return toml::from_str(&content).map_err(|e| Error::ConfigParse(e.to_string()));
            } else if explicit.is_some() {
                return Err(Error::Config(format!(
                    "config file '{}' not found",
                    path.display()
                )));
            }
        }
        Ok(Self::default())
    }

    /// Parsed base URL of the application under test
    pub fn base(&self) -> Result<url::Url> {
        url::Url::parse(&self.base_url)
            .map_err(|e| Error::Config(format!("invalid base_url '{}': {e}", self.base_url)))
    }

    /// Retry policy for the assertion engine
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            ceiling: Duration::from_millis(self.timeouts.assertion_ceiling_ms),
            interval: Duration::from_millis(self.timeouts.poll_interval_ms),
        }
    }

    /// Per-request HTTP timeout
    pub fn navigation_timeout(&self) -> Duration {
        Duration::from_secs(self.timeouts.navigation_secs)
    }
}

/// Platform config file path (`~/.config/pagecheck/pagecheck.toml` on Linux)
pub fn config_path() -> Option<PathBuf> {
    directories::ProjectDirs::from("", "", "pagecheck")
        .map(|dirs| dirs.config_dir().join("pagecheck.toml"))
}
