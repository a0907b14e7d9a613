//! Command implementations
//!
//! - `status` - Observe declared resources and show how they compare
//! - `diff` - Show field-level differences for bound resources
//! - `apply` - Create or update remote pets to match the manifest
//! - `delete` - Delete a resource's remote pet and forget its binding
//! - `config` - Show or initialize the configuration

pub mod apply;
pub mod config;
pub mod delete;
pub mod diff;
pub mod status;

use anyhow::Result;
use managed::ManagedRecord;

use crate::Context;
use crate::config::PetsyncConfig;
use crate::controller::pet::PetConnector;
use crate::manifest::Manifest;
use crate::state::SyncState;

/// Everything a command needs: config, declared resources, remembered state
pub struct Session {
    pub config: PetsyncConfig,
    pub manifest: Manifest,
    pub state: SyncState,
}

impl Session {
    /// Load config, manifest and state for a command
    pub fn load(ctx: &Context) -> Result<Self> {
        let config = PetsyncConfig::load(ctx.config_path.as_deref())?;
        let manifest = Manifest::load(ctx.manifest_path.as_deref())?;
        let state = SyncState::load()?;
        Ok(Self {
            config,
            manifest,
            state,
        })
    }

    /// Records for the selected resources, with remembered state restored
    pub fn records(&self, target: Option<&str>) -> Result<Vec<ManagedRecord>> {
        Ok(self
            .manifest
            .select(target)?
            .into_iter()
            .map(|definition| {
                let mut record = definition.to_record();
                self.state.restore(&mut record);
                record
            })
            .collect())
    }

    /// Names with a remembered binding that the manifest no longer declares
    pub fn orphans(&self) -> Vec<&str> {
        let declared: Vec<&str> = self
            .manifest
            .resources
            .iter()
            .map(|r| r.name.as_str())
            .collect();
        self.state.orphans(&declared)
    }

    pub fn connector(&self) -> PetConnector {
        PetConnector::from_config(&self.config)
    }
}
