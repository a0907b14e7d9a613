//! Wire types for the Petstore pet API.
//!
//! These mirror the JSON the remote sends and accepts. Nested references
//! keep their fields optional because the remote omits them freely.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Lifecycle status reported by the remote for a pet.
///
/// Serialized in uppercase; parsed case-insensitively since some Petstore
/// deployments answer in lowercase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE", try_from = "String")]
pub enum PetStatus {
    /// Newly created, not yet processed by the remote.
    Pending,
    /// Ready for use.
    Available,
    /// Being processed by the remote.
    InProgress,
    /// Retired.
    Inactive,
    /// Processing failed on the remote side.
    Failed,
}

impl PetStatus {
    /// Wire representation of this status.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "PENDING",
            Self::Available => "AVAILABLE",
            Self::InProgress => "INPROGRESS",
            Self::Inactive => "INACTIVE",
            Self::Failed => "FAILED",
        }
    }
}

impl fmt::Display for PetStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for PetStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "PENDING" => Ok(Self::Pending),
            "AVAILABLE" => Ok(Self::Available),
            "INPROGRESS" => Ok(Self::InProgress),
            "INACTIVE" => Ok(Self::Inactive),
            "FAILED" => Ok(Self::Failed),
            _ => Err(format!("unknown pet status '{s}'")),
        }
    }
}

impl TryFrom<String> for PetStatus {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// A category reference as sent on the wire.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    /// Category id.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    /// Category name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

/// A tag reference as sent on the wire.
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Tag {
    /// Tag id.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    /// Tag name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl Tag {
    /// Create a fully populated tag.
    pub fn new(id: i64, name: impl Into<String>) -> Self {
        Self {
            id: Some(id),
            name: Some(name.into()),
        }
    }
}

/// A pet record.
///
/// `id` is assigned once at creation and is the handle for every later
/// fetch, update and delete.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pet {
    /// Remote identity.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    /// Pet name.
    #[serde(default)]
    pub name: String,
    /// Optional category.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<Category>,
    /// Tags; the remote may omit the field entirely.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<Tag>>,
    /// Photo URLs.
    #[serde(default)]
    pub photo_urls: Vec<String>,
    /// Lifecycle status.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<PetStatus>,
}

impl Pet {
    /// Create a pet with only a name set.
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Set the id.
    #[must_use]
    pub fn with_id(mut self, id: i64) -> Self {
        self.id = Some(id);
        self
    }

    /// Set the status.
    #[must_use]
    pub fn with_status(mut self, status: PetStatus) -> Self {
        self.status = Some(status);
        self
    }

    /// Set the tags.
    #[must_use]
    pub fn with_tags(mut self, tags: Vec<Tag>) -> Self {
        self.tags = Some(tags);
        self
    }

    /// Set the photo URLs.
    #[must_use]
    pub fn with_photo_urls<I, S>(mut self, urls: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.photo_urls = urls.into_iter().map(Into::into).collect();
        self
    }

    /// Set the category.
    #[must_use]
    pub fn with_category(mut self, id: i64, name: impl Into<String>) -> Self {
        self.category = Some(Category {
            id: Some(id),
            name: Some(name.into()),
        });
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pet_serializes_camel_case_and_skips_unset() {
        let pet = Pet::named("rex")
            .with_photo_urls(["https://img/rex.png"])
            .with_status(PetStatus::Pending);
        let json = serde_json::to_value(&pet).unwrap();

        assert_eq!(json["name"], "rex");
        assert_eq!(json["photoUrls"][0], "https://img/rex.png");
        assert_eq!(json["status"], "PENDING");
        assert!(json.get("id").is_none());
        assert!(json.get("tags").is_none());
        assert!(json.get("category").is_none());
    }

    #[test]
    fn test_pet_deserializes_sparse_remote_payload() {
        let pet: Pet = serde_json::from_str(r#"{"id": 565656, "name": "rex"}"#).unwrap();
        assert_eq!(pet.id, Some(565656));
        assert!(pet.photo_urls.is_empty());
        assert!(pet.tags.is_none());
        assert!(pet.status.is_none());
    }

    #[test]
    fn test_status_parses_case_insensitively() {
        let pet: Pet = serde_json::from_str(r#"{"name": "rex", "status": "available"}"#).unwrap();
        assert_eq!(pet.status, Some(PetStatus::Available));

        assert_eq!("INPROGRESS".parse::<PetStatus>(), Ok(PetStatus::InProgress));
        assert!("sold".parse::<PetStatus>().is_err());
    }

    #[test]
    fn test_status_serializes_uppercase() {
        for status in [
            PetStatus::Pending,
            PetStatus::Available,
            PetStatus::InProgress,
            PetStatus::Inactive,
            PetStatus::Failed,
        ] {
            let json = serde_json::to_string(&status).unwrap();
            assert_eq!(json, format!("\"{}\"", status.as_str()));
        }
    }

    #[test]
    fn test_tag_fields_optional_on_wire() {
        let tag: Tag = serde_json::from_str(r#"{"name": "fluffy"}"#).unwrap();
        assert_eq!(tag.id, None);
        assert_eq!(tag.name.as_deref(), Some("fluffy"));
    }
}
