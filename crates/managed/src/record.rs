//! The managed record and its external name binding

use crate::types::Conditions;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Annotation holding the bound external name.
pub const EXTERNAL_NAME_ANNOTATION: &str = "petsync.io/external-name";

/// The external system's identity for a resource.
///
/// Opaque to the runtime; controllers decide what it encodes.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ExternalName(String);

impl ExternalName {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Decimal representation of a numeric id.
    pub fn from_id(id: i64) -> Self {
        Self(id.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ExternalName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A declared resource owning one external resource.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ManagedRecord {
    /// Resource kind, e.g. `Pet`
    pub kind: String,
    /// Unique record name
    pub name: String,
    /// Provider configuration to connect with; `None` uses the default
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provider: Option<String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub annotations: BTreeMap<String, String>,
    /// Set to drive deletion of the external resource
    #[serde(default)]
    pub deletion_requested: bool,
    /// Desired parameters, decoded by the controller
    #[serde(default)]
    pub for_provider: serde_json::Value,
    /// Last observation, written by the controller
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub at_provider: Option<serde_json::Value>,
    #[serde(default)]
    pub conditions: Conditions,
}

impl ManagedRecord {
    /// Create a record with no binding or status.
    pub fn new(kind: impl Into<String>, name: impl Into<String>, for_provider: serde_json::Value) -> Self {
        Self {
            kind: kind.into(),
            name: name.into(),
            provider: None,
            annotations: BTreeMap::new(),
            deletion_requested: false,
            for_provider,
            at_provider: None,
            conditions: Conditions::default(),
        }
    }

    /// The bound external name; empty annotations count as unbound.
    pub fn external_name(&self) -> Option<ExternalName> {
        self.annotations
            .get(EXTERNAL_NAME_ANNOTATION)
            .filter(|name| !name.is_empty())
            .map(|name| ExternalName::new(name.as_str()))
    }

    pub fn set_external_name(&mut self, name: ExternalName) {
        self.annotations
            .insert(EXTERNAL_NAME_ANNOTATION.to_string(), name.0);
    }

    /// Drop the binding, returning the old name.
    pub fn clear_external_name(&mut self) -> Option<ExternalName> {
        self.annotations
            .remove(EXTERNAL_NAME_ANNOTATION)
            .filter(|name| !name.is_empty())
            .map(ExternalName)
    }

    /// Check if an external name is bound
    pub fn is_bound(&self) -> bool {
        self.external_name().is_some()
    }
}
