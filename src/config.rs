use anyhow::{Context, Result};
use managed::{ReconcileOptions, RetryConfig};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::paths;

/// Provider used by records that don't name one
pub const DEFAULT_PROVIDER: &str = "default";

/// Config file name inside the config directory
pub const CONFIG_FILE: &str = "config.toml";

// ============================================================================
// Config Schema
// ============================================================================

/// The petsync configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PetsyncConfig {
    /// Named Petstore endpoints
    #[serde(default)]
    pub providers: BTreeMap<String, ProviderConfig>,

    /// Reconciliation settings
    #[serde(default)]
    pub reconcile: ReconcileConfig,
}

/// One Petstore endpoint
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderConfig {
    /// Base URL, e.g. `http://localhost:8080/api/v3`
    pub server_url: String,

    /// Per-request timeout; unset waits indefinitely
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,
}

impl ProviderConfig {
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }

    /// Validate the provider
    pub fn validate(&self) -> Result<()> {
        let url = self.server_url.trim();
        if url.is_empty() {
            anyhow::bail!("server_url cannot be empty");
        }
        if !url.starts_with("http://") && !url.starts_with("https://") {
            anyhow::bail!("server_url must start with http:// or https://: {url}");
        }
        if self.timeout_secs == Some(0) {
            anyhow::bail!("timeout_secs must be greater than zero");
        }
        Ok(())
    }
}

/// `[reconcile]` section
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReconcileConfig {
    /// Parallel jobs for apply
    #[serde(default = "default_jobs")]
    pub jobs: usize,

    #[serde(default)]
    pub retry: RetrySettings,
}

fn default_jobs() -> usize {
    4
}

impl Default for ReconcileConfig {
    fn default() -> Self {
        Self {
            jobs: default_jobs(),
            retry: RetrySettings::default(),
        }
    }
}

/// `[reconcile.retry]` section
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetrySettings {
    pub max_attempts: u32,
    pub base_delay_ms: u64,
    pub backoff_factor: f64,
    pub max_delay_ms: u64,
}

impl Default for RetrySettings {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay_ms: 500,
            backoff_factor: 2.0,
            max_delay_ms: 30_000,
        }
    }
}

impl From<&RetrySettings> for RetryConfig {
    fn from(settings: &RetrySettings) -> Self {
        Self {
            max_attempts: settings.max_attempts,
            base_delay: Duration::from_millis(settings.base_delay_ms),
            backoff_factor: settings.backoff_factor,
            max_delay: Duration::from_millis(settings.max_delay_ms),
        }
    }
}

impl Default for PetsyncConfig {
    fn default() -> Self {
        Self {
            providers: BTreeMap::from([(
                DEFAULT_PROVIDER.to_string(),
                ProviderConfig {
                    server_url: "http://localhost:8080/api/v3".to_string(),
                    timeout_secs: Some(30),
                },
            )]),
            reconcile: ReconcileConfig::default(),
        }
    }
}

// ============================================================================
// Loading and Saving
// ============================================================================

impl PetsyncConfig {
    /// Path of the config file: `path_override` or `<config dir>/config.toml`
    pub fn path(path_override: Option<&Path>) -> Result<PathBuf> {
        match path_override {
            Some(path) => Ok(path.to_path_buf()),
            None => Ok(paths::config_dir()?.join(CONFIG_FILE)),
        }
    }

    /// Load and validate the config, falling back to defaults if the file
    /// doesn't exist
    pub fn load(path_override: Option<&Path>) -> Result<Self> {
        let path = Self::path(path_override)?;
        if !path.exists() {
            log::debug!("Config file {} does not exist, using defaults", path.display());
            return Ok(Self::default());
        }
        Self::load_from(&path)
    }

    /// Load and validate a config file
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Could not read config file: {}", path.display()))?;
        let config: Self = toml::from_str(&content)
            .with_context(|| format!("Invalid TOML format in {}", path.display()))?;
        config
            .validate()
            .with_context(|| format!("Invalid config in {}", path.display()))?;
        log::debug!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Save the config, creating parent directories
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir)
                .with_context(|| format!("Failed to create config directory: {}", dir.display()))?;
        }
        let content = toml::to_string_pretty(self).context("Failed to serialize config")?;
        fs::write(path, content)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;
        Ok(())
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        for (name, provider) in &self.providers {
            provider
                .validate()
                .with_context(|| format!("Invalid provider '{name}'"))?;
        }

        if self.reconcile.jobs == 0 {
            anyhow::bail!("reconcile.jobs must be at least 1");
        }

        let retry = &self.reconcile.retry;
        if retry.max_attempts == 0 {
            anyhow::bail!("reconcile.retry.max_attempts must be at least 1");
        }
        if retry.backoff_factor < 1.0 {
            anyhow::bail!("reconcile.retry.backoff_factor must be at least 1.0");
        }
        if retry.max_delay_ms < retry.base_delay_ms {
            anyhow::bail!("reconcile.retry.max_delay_ms must not be less than base_delay_ms");
        }

        Ok(())
    }

    /// Reconcile options from this config; `jobs` overrides the configured
    /// parallelism
    pub fn reconcile_options(&self, dry_run: bool, jobs: Option<usize>) -> ReconcileOptions {
        ReconcileOptions {
            dry_run,
            jobs: jobs.unwrap_or(self.reconcile.jobs).max(1),
            retry: RetryConfig::from(&self.reconcile.retry),
        }
    }
}
