//! Where petsync keeps its files
//!
//! Two directories, resolved independently:
//!
//! - the config dir holds what the user edits: `config.toml` (providers and
//!   reconcile tuning) and `resources.toml` (declared pets)
//! - the state dir holds what petsync writes: `state.json` (external-name
//!   bindings, last observations and conditions)
//!
//! `--config` and `--manifest` on the command line bypass the config dir for
//! their file.
//!
//! # Resolution order
//!
//! Config dir: `PETSYNC_CONFIG_DIR`, then `$XDG_CONFIG_HOME/petsync`, then
//! `%APPDATA%\petsync` on Windows or `~/.config/petsync` elsewhere.
//!
//! State dir: `PETSYNC_STATE_DIR`, then `$XDG_STATE_HOME/petsync`, then
//! `%LOCALAPPDATA%\petsync` on Windows or `~/.local/state/petsync` elsewhere.
//!
//! The `PETSYNC_*` overrides accept `~` and `$VAR`.

use anyhow::{Context, Result};
use std::path::PathBuf;

/// Overrides the directory of `config.toml` and `resources.toml`
pub const ENV_CONFIG_DIR: &str = "PETSYNC_CONFIG_DIR";

/// Overrides the directory of `state.json`
pub const ENV_STATE_DIR: &str = "PETSYNC_STATE_DIR";

const APP_DIR: &str = "petsync";

/// Directory of the user-edited files
pub fn config_dir() -> Result<PathBuf> {
    if let Ok(dir) = std::env::var(ENV_CONFIG_DIR) {
        let path = expand(&dir);
        log::debug!(
            "Using config dir from {}: {}",
            ENV_CONFIG_DIR,
            path.display()
        );
        return Ok(path);
    }

    if let Ok(xdg_config) = std::env::var("XDG_CONFIG_HOME") {
        let path = PathBuf::from(xdg_config).join(APP_DIR);
        log::debug!("Using XDG_CONFIG_HOME: {}", path.display());
        return Ok(path);
    }

    #[cfg(windows)]
    {
        if let Some(app_data) = dirs::config_dir() {
            let path = app_data.join(APP_DIR);
            log::debug!("Using Windows config dir: {}", path.display());
            return Ok(path);
        }
    }

    let home = dirs::home_dir().context("Could not determine home directory")?;
    let path = home.join(".config").join(APP_DIR);
    log::debug!("Using default config dir: {}", path.display());
    Ok(path)
}

/// Directory of the bindings file petsync writes
pub fn state_dir() -> Result<PathBuf> {
    if let Ok(dir) = std::env::var(ENV_STATE_DIR) {
        let path = expand(&dir);
        log::debug!("Using state dir from {}: {}", ENV_STATE_DIR, path.display());
        return Ok(path);
    }

    if let Ok(xdg_state) = std::env::var("XDG_STATE_HOME") {
        let path = PathBuf::from(xdg_state).join(APP_DIR);
        log::debug!("Using XDG_STATE_HOME: {}", path.display());
        return Ok(path);
    }

    #[cfg(windows)]
    {
        if let Some(local_app_data) = dirs::data_local_dir() {
            let path = local_app_data.join(APP_DIR);
            log::debug!("Using Windows state dir: {}", path.display());
            return Ok(path);
        }
    }

    let home = dirs::home_dir().context("Could not determine home directory")?;
    let path = home.join(".local").join("state").join(APP_DIR);
    log::debug!("Using default state dir: {}", path.display());
    Ok(path)
}

/// Expand ~ and environment variables in a path string.
///
/// Unknown variables are left as written.
pub fn expand(path: &str) -> PathBuf {
    let expanded = shellexpand::full(path).unwrap_or(std::borrow::Cow::Borrowed(path));
    PathBuf::from(expanded.as_ref())
}

// ============================================================================
// Tests
// ============================================================================
