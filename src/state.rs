use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use managed::{Conditions, ExternalName, ManagedRecord};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use crate::paths;

/// State file name inside the state directory
pub const STATE_FILE: &str = "state.json";

// ============================================================================
// State Structures
// ============================================================================

/// What petsync remembers between runs: bindings, observations, conditions
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SyncState {
    /// Per-record state, keyed by record name
    #[serde(default)]
    pub resources: BTreeMap<String, ResourceState>,

    /// Last time the state was updated
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_updated: Option<DateTime<Utc>>,
}

/// Remembered state of one record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResourceState {
    pub kind: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provider: Option<String>,

    /// Bound external name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub external_name: Option<ExternalName>,

    /// Last observation
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub at_provider: Option<serde_json::Value>,

    #[serde(default)]
    pub conditions: Conditions,

    /// Last time this record was reconciled
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_reconciled: Option<DateTime<Utc>>,
}

// ============================================================================
// SyncState Implementation
// ============================================================================

impl SyncState {
    /// Get the state file path
    pub fn state_file() -> Result<PathBuf> {
        Ok(paths::state_dir()?.join(STATE_FILE))
    }

    /// Load state from the default location
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::state_file()?)
    }

    /// Load state from disk, or return default if file doesn't exist
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            log::debug!("State file does not exist, using default state");
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read state file: {}", path.display()))?;

        let state: Self = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse state file: {}", path.display()))?;

        log::debug!("Loaded state from {}", path.display());
        Ok(state)
    }

    /// Save state to the default location
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::state_file()?)
    }

    /// Save state to disk
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir)
                .with_context(|| format!("Failed to create state directory: {}", dir.display()))?;
        }

        let content =
            serde_json::to_string_pretty(self).context("Failed to serialize state to JSON")?;

        fs::write(path, &content)
            .with_context(|| format!("Failed to write state file: {}", path.display()))?;

        log::debug!("Saved state to {}", path.display());
        Ok(())
    }

    // ========================================================================
    // Record Helpers
    // ========================================================================

    /// Restore a record's binding, observation and conditions
    ///
    /// State remembered for another kind under the same name is ignored.
    pub fn restore(&self, record: &mut ManagedRecord) {
        let Some(saved) = self.resources.get(&record.name) else {
            return;
        };
        if saved.kind != record.kind {
            log::warn!(
                "Ignoring saved state of '{}': it was a {}, now declared as {}",
                record.name,
                saved.kind,
                record.kind
            );
            return;
        }

        if let Some(name) = &saved.external_name {
            record.set_external_name(name.clone());
        }
        record.at_provider = saved.at_provider.clone();
        record.conditions = saved.conditions.clone();
    }

    /// Remember a reconciled record
    pub fn capture(&mut self, record: &ManagedRecord) {
        let now = Utc::now();
        self.resources.insert(
            record.name.clone(),
            ResourceState {
                kind: record.kind.clone(),
                provider: record.provider.clone(),
                external_name: record.external_name(),
                at_provider: record.at_provider.clone(),
                conditions: record.conditions.clone(),
                last_reconciled: Some(now),
            },
        );
        self.last_updated = Some(now);
    }

    /// Forget a record entirely
    pub fn forget(&mut self, name: &str) -> Option<ResourceState> {
        let removed = self.resources.remove(name);
        if removed.is_some() {
            self.last_updated = Some(Utc::now());
        }
        removed
    }

    /// Rebuild a record from state alone, for resources no longer declared
    pub fn orphan_record(&self, name: &str) -> Option<ManagedRecord> {
        let saved = self.resources.get(name)?;
        let mut record =
            ManagedRecord::new(saved.kind.as_str(), name, serde_json::Value::Null);
        record.provider = saved.provider.clone();
        self.restore(&mut record);
        Some(record)
    }

    /// Names with saved state that are not in `declared`
    pub fn orphans<'a>(&'a self, declared: &[&str]) -> Vec<&'a str> {
        self.resources
            .iter()
            .filter(|(name, saved)| {
                saved.external_name.is_some() && !declared.contains(&name.as_str())
            })
            .map(|(name, _)| name.as_str())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use managed::{ReadyReason, SyncStatus};
    use serde_json::json;
    use tempfile::TempDir;

    fn reconciled_record() -> ManagedRecord {
        let mut record = ManagedRecord::new("Pet", "rex", json!({"name": "rex"}));
        record.set_external_name(ExternalName::from_id(565656));
        record.at_provider = Some(json!({"id": 565656, "status": "AVAILABLE"}));
        record.conditions = Conditions {
            ready: Some(ReadyReason::Available),
            synced: Some(SyncStatus::Success),
        };
        record
    }

    #[test]
    fn test_capture_and_restore() {
        let mut state = SyncState::default();
        state.capture(&reconciled_record());
        assert!(state.last_updated.is_some());

        let mut fresh = ManagedRecord::new("Pet", "rex", json!({"name": "rex"}));
        state.restore(&mut fresh);

        let expected = reconciled_record();
        assert_eq!(fresh.external_name(), expected.external_name());
        assert_eq!(fresh.at_provider, expected.at_provider);
        assert_eq!(fresh.conditions, expected.conditions);
    }

    #[test]
    fn test_restore_skips_other_kind() {
        let mut state = SyncState::default();
        state.capture(&reconciled_record());

        let mut other = ManagedRecord::new("Order", "rex", json!({}));
        state.restore(&mut other);
        assert!(!other.is_bound());
    }

    #[test]
    fn test_save_and_load_round_trip() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join(STATE_FILE);

        let mut state = SyncState::default();
        state.capture(&reconciled_record());
        state.save_to(&path).unwrap();

        let loaded = SyncState::load_from(&path).unwrap();
        assert_eq!(loaded, state);

        let raw: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(raw["resources"]["rex"]["external_name"], json!("565656"));
    }

    #[test]
    fn test_missing_file_is_empty_state() {
        let dir = TempDir::new().unwrap();
        let state = SyncState::load_from(&dir.path().join(STATE_FILE)).unwrap();
        assert!(state.resources.is_empty());
    }

    #[test]
    fn test_corrupt_file_is_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(STATE_FILE);
        fs::write(&path, "{not json").unwrap();
        assert!(SyncState::load_from(&path).is_err());
    }

    #[test]
    fn test_orphans_and_forget() {
        let mut state = SyncState::default();
        state.capture(&reconciled_record());

        assert_eq!(state.orphans(&["rex"]), Vec::<&str>::new());
        assert_eq!(state.orphans(&[]), vec!["rex"]);

        let orphan = state.orphan_record("rex").unwrap();
        assert_eq!(orphan.external_name(), Some(ExternalName::from_id(565656)));

        assert!(state.forget("rex").is_some());
        assert!(state.forget("rex").is_none());
        assert!(state.orphan_record("rex").is_none());
    }
}
