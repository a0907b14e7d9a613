//! Provider traits
//!
//! These traits let the runtime drive any external system without knowing
//! how it is reached.

use crate::error::{Error, Result};
use crate::record::ManagedRecord;

/// What an observe found
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ExternalObservation {
    /// The external resource exists
    pub resource_exists: bool,
    /// It matches the desired state; meaningless when it does not exist
    pub resource_up_to_date: bool,
}

impl ExternalObservation {
    /// Nothing exists
    pub fn missing() -> Self {
        Self::default()
    }

    /// The resource exists
    pub fn exists(up_to_date: bool) -> Self {
        Self {
            resource_exists: true,
            resource_up_to_date: up_to_date,
        }
    }
}

/// Operations against the external system for one kind of record
///
/// Each call is made at most once per attempt; retry is the runtime's job.
pub trait ExternalClient: Send + Sync {
    /// Fetch the bound resource and compare it to the desired state.
    ///
    /// May write the observation back to the record. An absent resource is
    /// reported as [`ExternalObservation::missing`], not as an error.
    fn observe(&self, mg: &mut ManagedRecord) -> Result<ExternalObservation>;

    /// Create the resource and bind its external name to the record.
    fn create(&self, mg: &mut ManagedRecord) -> Result<()>;

    /// Replace the bound resource with the desired state.
    fn update(&self, mg: &ManagedRecord) -> Result<()>;

    /// Delete the bound resource. Already gone counts as success.
    fn delete(&self, mg: &ManagedRecord) -> Result<()>;
}

/// Builds clients for records of one kind
pub trait Connector: Send + Sync {
    /// The record kind this connector handles
    fn kind(&self) -> &str;

    /// Resolve the record's provider configuration and build a client.
    fn connect(&self, mg: &ManagedRecord) -> Result<Box<dyn ExternalClient>>;
}

/// Fail with [`Error::WrongResourceType`] unless the record is of `expected` kind.
pub fn check_kind(mg: &ManagedRecord, expected: &str) -> Result<()> {
    if mg.kind == expected {
        Ok(())
    } else {
        Err(Error::WrongResourceType {
            name: mg.name.clone(),
            expected: expected.to_string(),
            found: mg.kind.clone(),
        })
    }
}
