//! Conversions between records, parameters and the wire shape

use super::types::{PetObservation, PetParameters};
use managed::{Error, ExternalName, ManagedRecord, Result};
use petstore::{Category, Pet, Tag};

/// Project desired parameters into a request payload.
///
/// Tags are always sent so a full replace clears remote tags. Id and status
/// are left for the client to assign.
pub fn to_payload(spec: &PetParameters) -> Pet {
    Pet {
        id: None,
        name: spec.name.clone(),
        category: spec.category.as_ref().map(|c| Category {
            id: Some(c.id),
            name: Some(c.name.clone()),
        }),
        tags: Some(
            spec.tags
                .iter()
                .map(|t| Tag::new(t.id, t.name.clone()))
                .collect(),
        ),
        photo_urls: spec.photo_urls.iter().cloned().collect(),
        status: None,
    }
}

/// Summarize a fetched pet. The id must be present.
pub fn to_observation(pet: &Pet) -> Result<PetObservation> {
    let id = pet
        .id
        .ok_or_else(|| Error::MalformedResource(format!("pet '{}' has no id", pet.name)))?;

    Ok(PetObservation {
        id,
        status: pet.status,
    })
}

/// Decode a record's desired parameters.
pub fn parse_parameters(mg: &ManagedRecord) -> Result<PetParameters> {
    let invalid = |message: String| Error::InvalidSpec {
        name: mg.name.clone(),
        message,
    };

    let params: PetParameters =
        serde_json::from_value(mg.for_provider.clone()).map_err(|e| invalid(e.to_string()))?;
    if params.name.trim().is_empty() {
        return Err(invalid("name must not be empty".to_string()));
    }
    Ok(params)
}

/// The numeric pet id behind an external name.
pub fn external_id(name: &ExternalName) -> Result<i64> {
    name.as_str()
        .parse()
        .map_err(|_| Error::InvalidExternalName(name.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use petstore::PetStatus;
    use serde_json::json;

    #[test]
    fn test_payload_shape() {
        let spec = PetParameters::named("rex")
            .with_category(1, "dogs")
            .with_tag(2, "loud")
            .with_tag(1, "good")
            .with_photo("https://img/1.png");

        let payload = to_payload(&spec);

        assert_eq!(payload.id, None);
        assert_eq!(payload.status, None);
        assert_eq!(payload.name, "rex");
        assert_eq!(
            payload.category,
            Some(Category {
                id: Some(1),
                name: Some("dogs".to_string())
            })
        );
        assert_eq!(
            payload.tags,
            Some(vec![Tag::new(1, "good"), Tag::new(2, "loud")])
        );
        assert_eq!(payload.photo_urls, vec!["https://img/1.png".to_string()]);
    }

    #[test]
    fn test_payload_always_sends_tags() {
        let payload = to_payload(&PetParameters::named("rex"));
        assert_eq!(payload.tags, Some(vec![]));
        assert_eq!(payload.category, None);
    }

    #[test]
    fn test_observation_requires_id() {
        let err = to_observation(&Pet::named("rex")).unwrap_err();
        assert!(matches!(err, Error::MalformedResource(_)));

        let obs = to_observation(&Pet::named("rex").with_id(7).with_status(PetStatus::Available))
            .unwrap();
        assert_eq!(
            obs,
            PetObservation {
                id: 7,
                status: Some(PetStatus::Available)
            }
        );
    }

    #[test]
    fn test_parse_parameters() {
        let record = ManagedRecord::new(
            "Pet",
            "rex",
            json!({"name": "rex", "tags": [{"id": 1, "name": "good"}]}),
        );
        let params = parse_parameters(&record).unwrap();
        assert_eq!(params, PetParameters::named("rex").with_tag(1, "good"));
    }

    #[test]
    fn test_parse_parameters_rejects_bad_specs() {
        for value in [json!({}), json!({"name": "  "}), json!({"name": 5}), json!(null)] {
            let record = ManagedRecord::new("Pet", "rex", value);
            assert!(matches!(
                parse_parameters(&record),
                Err(Error::InvalidSpec { ref name, .. }) if name == "rex"
            ));
        }
    }

    #[test]
    fn test_external_id() {
        assert_eq!(external_id(&ExternalName::from_id(565656)).unwrap(), 565656);
        assert!(matches!(
            external_id(&ExternalName::new("rex")),
            Err(Error::InvalidExternalName(_))
        ));
    }
}
