//! Desired and observed shapes for the Pet kind

use managed::ExternalObservation;
use petstore::PetStatus;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// A category as declared in a resource definition.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CategoryRef {
    pub id: i64,
    pub name: String,
}

/// A tag as declared in a resource definition.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TagRef {
    pub id: i64,
    pub name: String,
}

impl TagRef {
    pub fn new(id: i64, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
        }
    }
}

/// Desired state of one pet.
///
/// Tags and photo URLs are sets; an omitted collection is the same as an
/// empty one.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PetParameters {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<CategoryRef>,
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    pub tags: BTreeSet<TagRef>,
    #[serde(default, alias = "photoUrls", skip_serializing_if = "BTreeSet::is_empty")]
    pub photo_urls: BTreeSet<String>,
}

impl PetParameters {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    #[must_use]
    pub fn with_category(mut self, id: i64, name: impl Into<String>) -> Self {
        self.category = Some(CategoryRef {
            id,
            name: name.into(),
        });
        self
    }

    #[must_use]
    pub fn with_tag(mut self, id: i64, name: impl Into<String>) -> Self {
        self.tags.insert(TagRef::new(id, name));
        self
    }

    #[must_use]
    pub fn with_photo(mut self, url: impl Into<String>) -> Self {
        self.photo_urls.insert(url.into());
        self
    }
}

/// What the last successful fetch saw, written to the record's `at_provider`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PetObservation {
    pub id: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<PetStatus>,
}

/// Outcome of observing one pet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReconciliationResult {
    /// An external name was bound when observing
    pub bound: bool,
    pub exists: bool,
    pub up_to_date: bool,
    /// Set whenever the fetch succeeded
    pub observation: Option<PetObservation>,
}

impl ReconciliationResult {
    /// Nothing bound, nothing fetched.
    pub fn unbound() -> Self {
        Self {
            bound: false,
            exists: false,
            up_to_date: false,
            observation: None,
        }
    }

    /// Bound, but the remote has no such pet.
    pub fn absent() -> Self {
        Self {
            bound: true,
            ..Self::unbound()
        }
    }

    pub fn state(&self) -> managed::ReconcileState {
        managed::ReconcileState::from_observation(self.bound, &self.external_observation())
    }

    pub fn external_observation(&self) -> ExternalObservation {
        if self.exists {
            ExternalObservation::exists(self.up_to_date)
        } else {
            ExternalObservation::missing()
        }
    }
}
