//! Resource definitions: the declared desired state, read from `resources.toml`
//!
//! ```toml
//! [[resources]]
//! kind = "Pet"
//! name = "rex"
//! provider = "staging"          # optional, defaults to "default"
//!
//! [resources.for_provider]
//! name = "rex"
//! category = { id = 1, name = "dogs" }
//! tags = [{ id = 1, name = "good" }]
//! photo_urls = ["https://example.com/rex.png"]
//! ```

use anyhow::{Context, Result};
use managed::ManagedRecord;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use crate::controller::pet;
use crate::paths;

/// Manifest file name inside the config directory
pub const MANIFEST_FILE: &str = "resources.toml";

/// All declared resources
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Manifest {
    #[serde(default)]
    pub resources: Vec<ResourceDefinition>,
}

/// One declared resource
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResourceDefinition {
    #[serde(default = "default_kind")]
    pub kind: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provider: Option<String>,
    /// Desired parameters, interpreted by the kind's controller
    #[serde(default)]
    pub for_provider: serde_json::Value,
}

fn default_kind() -> String {
    pet::KIND.to_string()
}

impl ResourceDefinition {
    /// A fresh record with no binding or status
    pub fn to_record(&self) -> ManagedRecord {
        let mut record =
            ManagedRecord::new(self.kind.as_str(), self.name.as_str(), self.for_provider.clone());
        record.provider = self.provider.clone();
        record
    }
}

impl Manifest {
    /// Path of the manifest: `path_override` or `<config dir>/resources.toml`
    pub fn path(path_override: Option<&Path>) -> Result<PathBuf> {
        match path_override {
            Some(path) => Ok(path.to_path_buf()),
            None => Ok(paths::config_dir()?.join(MANIFEST_FILE)),
        }
    }

    /// Load the manifest; a missing file declares nothing
    pub fn load(path_override: Option<&Path>) -> Result<Self> {
        let path = Self::path(path_override)?;
        if !path.exists() {
            log::debug!("Manifest {} does not exist, nothing declared", path.display());
            return Ok(Self::default());
        }
        Self::load_from(&path)
    }

    /// Load and validate a manifest file
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Could not read manifest: {}", path.display()))?;
        let manifest = Self::parse(&content)
            .with_context(|| format!("Invalid manifest: {}", path.display()))?;
        log::debug!(
            "Loaded {} resources from {}",
            manifest.resources.len(),
            path.display()
        );
        Ok(manifest)
    }

    /// Parse and validate manifest text
    pub fn parse(content: &str) -> Result<Self> {
        let manifest: Self = toml::from_str(content).context("Invalid TOML format")?;
        manifest.validate()?;
        Ok(manifest)
    }

    /// Validate the manifest
    pub fn validate(&self) -> Result<()> {
        let mut seen = HashSet::new();
        for resource in &self.resources {
            if resource.name.trim().is_empty() {
                anyhow::bail!("Resource name cannot be empty");
            }
            if !seen.insert(resource.name.as_str()) {
                anyhow::bail!("Duplicate resource name '{}'", resource.name);
            }
        }
        Ok(())
    }

    /// Find a resource by name
    pub fn find(&self, name: &str) -> Option<&ResourceDefinition> {
        self.resources.iter().find(|r| r.name == name)
    }

    /// The named resource, or all of them
    pub fn select(&self, target: Option<&str>) -> Result<Vec<&ResourceDefinition>> {
        match target {
            Some(name) => {
                let resource = self
                    .find(name)
                    .with_context(|| format!("No resource named '{name}' in manifest"))?;
                Ok(vec![resource])
            }
            None => Ok(self.resources.iter().collect()),
        }
    }
}
