//! Structural comparison of desired and observed pets
//!
//! Scalars compare exactly, collections compare as sets. A desired category
//! of `None` means "don't care"; tags and photo URLs have no such escape, an
//! empty desired set requires an empty remote set.

use super::translate::to_payload;
use super::types::{PetParameters, TagRef};
use petstore::{Pet, Tag};
use std::collections::BTreeSet;

/// Differences between a desired pet and an observed one.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PetDiff {
    /// `(desired, observed)` when the names differ
    pub name: Option<(String, String)>,
    pub category_changed: bool,
    /// Desired `(id, name)` pairs the remote lacks
    pub added_tags: BTreeSet<TagRef>,
    /// Remote tags not desired, or missing an id or name
    pub removed_tags: BTreeSet<Tag>,
    pub added_photos: BTreeSet<String>,
    pub removed_photos: BTreeSet<String>,
}

impl PetDiff {
    /// Check if desired and observed are equivalent
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && !self.category_changed
            && self.added_tags.is_empty()
            && self.removed_tags.is_empty()
            && self.added_photos.is_empty()
            && self.removed_photos.is_empty()
    }

    /// One line per difference, for display.
    pub fn describe(&self) -> Vec<String> {
        let mut lines = Vec::new();
        if let Some((want, have)) = &self.name {
            lines.push(format!("name: '{have}' -> '{want}'"));
        }
        if self.category_changed {
            lines.push("category changed".to_string());
        }
        for tag in &self.added_tags {
            lines.push(format!("+ tag {} ({})", tag.name, tag.id));
        }
        for tag in &self.removed_tags {
            lines.push(format!(
                "- tag {} ({})",
                tag.name.as_deref().unwrap_or("?"),
                tag.id.map_or_else(|| "?".to_string(), |id| id.to_string())
            ));
        }
        for url in &self.added_photos {
            lines.push(format!("+ photo {url}"));
        }
        for url in &self.removed_photos {
            lines.push(format!("- photo {url}"));
        }
        lines
    }
}

/// Compare `desired` against `observed`.
pub fn diff(desired: &PetParameters, observed: &Pet) -> PetDiff {
    let name = (desired.name != observed.name)
        .then(|| (desired.name.clone(), observed.name.clone()));

    let category_changed = match (&desired.category, &observed.category) {
        (None, _) => false,
        (Some(_), None) => true,
        (Some(want), Some(have)) => {
            have.id != Some(want.id) || have.name.as_deref() != Some(want.name.as_str())
        }
    };

    let (added_tags, removed_tags) = diff_tags(&desired.tags, observed.tags.as_deref().unwrap_or_default());

    let observed_photos: BTreeSet<&str> = observed.photo_urls.iter().map(String::as_str).collect();
    let added_photos = desired
        .photo_urls
        .iter()
        .filter(|url| !observed_photos.contains(url.as_str()))
        .cloned()
        .collect();
    let removed_photos = observed_photos
        .iter()
        .filter(|url| !desired.photo_urls.contains(**url))
        .map(|url| (*url).to_string())
        .collect();

    PetDiff {
        name,
        category_changed,
        added_tags,
        removed_tags,
        added_photos,
        removed_photos,
    }
}

/// Check if `observed` already matches `desired`.
pub fn is_up_to_date(desired: &PetParameters, observed: &Pet) -> bool {
    diff(desired, observed).is_empty()
}

/// Pretty JSON of `(desired, observed)` in one canonical shape, for a text
/// diff. Identity and status are dropped and collections sorted. The observed
/// category is hidden when no category is desired.
pub fn render_pair(desired: &PetParameters, observed: &Pet) -> serde_json::Result<(String, String)> {
    let want = to_payload(desired);

    let mut have = observed.clone();
    have.id = None;
    have.status = None;
    if desired.category.is_none() {
        have.category = None;
    }
    let mut tags = have.tags.take().unwrap_or_default();
    tags.sort();
    tags.dedup();
    have.tags = Some(tags);
    have.photo_urls.sort();
    have.photo_urls.dedup();

    Ok((
        serde_json::to_string_pretty(&want)?,
        serde_json::to_string_pretty(&have)?,
    ))
}

/// Tags compare as `(id, name)` pairs; a remote tag missing either is removed.
fn diff_tags(desired: &BTreeSet<TagRef>, observed: &[Tag]) -> (BTreeSet<TagRef>, BTreeSet<Tag>) {
    let wanted: BTreeSet<(i64, &str)> = desired.iter().map(|t| (t.id, t.name.as_str())).collect();
    let mut have: BTreeSet<(i64, &str)> = BTreeSet::new();
    let mut removed = BTreeSet::new();

    for tag in observed {
        match (tag.id, tag.name.as_deref()) {
            (Some(id), Some(name)) => {
                have.insert((id, name));
                if !wanted.contains(&(id, name)) {
                    removed.insert(tag.clone());
                }
            }
            _ => {
                removed.insert(tag.clone());
            }
        }
    }

    let added = desired
        .iter()
        .filter(|t| !have.contains(&(t.id, t.name.as_str())))
        .cloned()
        .collect();

    (added, removed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use petstore::Category;

    fn rex() -> PetParameters {
        PetParameters::named("rex")
            .with_category(1, "dogs")
            .with_tag(1, "good")
            .with_tag(2, "loud")
            .with_photo("https://img/1.png")
            .with_photo("https://img/2.png")
    }

    fn rex_remote() -> Pet {
        Pet::named("rex")
            .with_id(565656)
            .with_category(1, "dogs")
            .with_tags(vec![Tag::new(1, "good"), Tag::new(2, "loud")])
            .with_photo_urls(vec!["https://img/1.png", "https://img/2.png"])
    }

    #[test]
    fn test_identical_is_up_to_date() {
        assert!(is_up_to_date(&rex(), &rex_remote()));
        assert!(diff(&rex(), &rex_remote()).describe().is_empty());
    }

    #[test]
    fn test_remote_status_is_not_compared() {
        let remote = rex_remote().with_status(petstore::PetStatus::Available);
        assert!(is_up_to_date(&rex(), &remote));
    }

    #[test]
    fn test_name_mismatch() {
        let remote = Pet { name: "max".into(), ..rex_remote() };
        let d = diff(&rex(), &remote);
        assert_eq!(d.name, Some(("rex".to_string(), "max".to_string())));
        assert!(!d.is_empty());
    }

    #[test]
    fn test_desired_category_missing_remotely() {
        let remote = Pet { category: None, ..rex_remote() };
        assert!(diff(&rex(), &remote).category_changed);
    }

    #[test]
    fn test_category_id_or_name_differs() {
        let renamed = rex_remote().with_category(1, "cats");
        assert!(!is_up_to_date(&rex(), &renamed));

        let renumbered = rex_remote().with_category(2, "dogs");
        assert!(!is_up_to_date(&rex(), &renumbered));

        let partial = Pet {
            category: Some(Category { id: Some(1), name: None }),
            ..rex_remote()
        };
        assert!(!is_up_to_date(&rex(), &partial));
    }

    #[test]
    fn test_undesired_category_is_ignored() {
        let desired = PetParameters { category: None, ..rex() };
        assert!(is_up_to_date(&desired, &rex_remote()));
    }

    #[test]
    fn test_one_missing_tag_is_added_only() {
        let remote = rex_remote().with_tags(vec![Tag::new(1, "good")]);
        let d = diff(&rex(), &remote);

        assert_eq!(d.added_tags, BTreeSet::from([TagRef::new(2, "loud")]));
        assert!(d.removed_tags.is_empty());
        assert!(!d.is_empty());
    }

    #[test]
    fn test_one_extra_tag_is_removed_only() {
        let remote = rex_remote().with_tags(vec![
            Tag::new(1, "good"),
            Tag::new(2, "loud"),
            Tag::new(3, "fluffy"),
        ]);
        let d = diff(&rex(), &remote);

        assert!(d.added_tags.is_empty());
        assert_eq!(d.removed_tags, BTreeSet::from([Tag::new(3, "fluffy")]));
    }

    #[test]
    fn test_renamed_tag_is_added_and_removed() {
        let remote = rex_remote().with_tags(vec![Tag::new(1, "good"), Tag::new(2, "quiet")]);
        let d = diff(&rex(), &remote);

        assert_eq!(d.added_tags, BTreeSet::from([TagRef::new(2, "loud")]));
        assert_eq!(d.removed_tags, BTreeSet::from([Tag::new(2, "quiet")]));
    }

    #[test]
    fn test_tags_sharing_an_id_are_compared_by_pair() {
        let desired = PetParameters::named("rex").with_tag(1, "a").with_tag(1, "b");
        let remote = Pet::named("rex").with_tags(vec![Tag::new(1, "a"), Tag::new(1, "b")]);
        assert!(is_up_to_date(&desired, &remote));

        let reordered = Pet::named("rex").with_tags(vec![Tag::new(1, "b"), Tag::new(1, "a")]);
        assert!(is_up_to_date(&desired, &reordered));
    }

    #[test]
    fn test_extra_tag_sharing_an_id_is_removed_only() {
        let desired = PetParameters::named("rex").with_tag(1, "good");
        let remote = Pet::named("rex").with_tags(vec![Tag::new(1, "good"), Tag::new(1, "bad")]);
        let d = diff(&desired, &remote);

        assert!(d.added_tags.is_empty());
        assert_eq!(d.removed_tags, BTreeSet::from([Tag::new(1, "bad")]));
        assert_eq!(d.describe(), vec!["- tag bad (1)".to_string()]);
    }

    #[test]
    fn test_missing_tag_sharing_an_id_is_added_only() {
        let desired = PetParameters::named("rex").with_tag(1, "good").with_tag(1, "bad");
        let remote = Pet::named("rex").with_tags(vec![Tag::new(1, "bad")]);
        let d = diff(&desired, &remote);

        assert_eq!(d.added_tags, BTreeSet::from([TagRef::new(1, "good")]));
        assert!(d.removed_tags.is_empty());
    }

    #[test]
    fn test_incomplete_remote_tag_is_always_removed() {
        let nameless = Tag { id: Some(1), name: None };
        let remote = rex_remote().with_tags(vec![nameless.clone(), Tag::new(1, "good"), Tag::new(2, "loud")]);
        let d = diff(&rex(), &remote);

        assert!(d.added_tags.is_empty());
        assert_eq!(d.removed_tags, BTreeSet::from([nameless]));
    }

    #[test]
    fn test_photo_set_difference() {
        let remote = rex_remote().with_photo_urls(vec!["https://img/1.png", "https://img/3.png"]);
        let d = diff(&rex(), &remote);

        assert_eq!(d.added_photos, BTreeSet::from(["https://img/2.png".to_string()]));
        assert_eq!(d.removed_photos, BTreeSet::from(["https://img/3.png".to_string()]));
    }

    #[test]
    fn test_order_independent() {
        let mut remote = rex_remote();
        remote.tags.as_mut().unwrap().reverse();
        remote.photo_urls.reverse();
        assert!(is_up_to_date(&rex(), &remote));

        let with_duplicates = rex_remote().with_photo_urls(vec![
            "https://img/2.png",
            "https://img/1.png",
            "https://img/2.png",
        ]);
        assert!(is_up_to_date(&rex(), &with_duplicates));
    }

    #[test]
    fn test_absent_and_empty_collections_are_equivalent() {
        let desired = PetParameters::named("rex");
        let absent = Pet::named("rex");
        let empty = Pet::named("rex").with_tags(vec![]);

        assert!(is_up_to_date(&desired, &absent));
        assert!(is_up_to_date(&desired, &empty));
    }

    #[test]
    fn test_empty_desired_tags_require_empty_remote() {
        let desired = PetParameters::named("rex");
        let remote = Pet::named("rex").with_tags(vec![Tag::new(1, "good")]);
        let d = diff(&desired, &remote);

        assert_eq!(d.removed_tags.len(), 1);
        assert_eq!(d.describe(), vec!["- tag good (1)".to_string()]);
    }

    #[test]
    fn test_render_pair_matches_when_in_sync() {
        let remote = rex_remote()
            .with_status(petstore::PetStatus::Inactive)
            .with_tags(vec![Tag::new(2, "loud"), Tag::new(1, "good")]);
        let (want, have) = render_pair(&rex(), &remote).unwrap();
        assert_eq!(want, have);
    }

    #[test]
    fn test_render_pair_shows_drift() {
        let remote = rex_remote().with_tags(vec![Tag::new(1, "good")]);
        let (want, have) = render_pair(&rex(), &remote).unwrap();
        assert_ne!(want, have);
        assert!(want.contains("loud"));
        assert!(!have.contains("loud"));
    }

    #[test]
    fn test_render_pair_hides_undesired_category() {
        let desired = PetParameters::named("rex");
        let remote = Pet::named("rex").with_id(1).with_category(9, "cats");
        let (want, have) = render_pair(&desired, &remote).unwrap();
        assert_eq!(want, have);
    }
}
