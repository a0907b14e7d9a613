//! Controller for the Pet kind
//!
//! Observes a pet through its bound external name, compares it with the
//! declared parameters and creates, replaces or deletes it on request.

pub mod connector;
pub mod diff;
pub mod translate;
pub mod types;

use managed::{Error, ExternalClient, ExternalName, ExternalObservation, ManagedRecord, Result};
use petstore::{Pet, PetClient};
use std::sync::Arc;

pub use connector::PetConnector;
pub use diff::PetDiff;
pub use types::{PetObservation, PetParameters, ReconciliationResult};

use translate::{external_id, parse_parameters, to_observation, to_payload};

/// Record kind handled by this controller.
pub const KIND: &str = "Pet";

/// Pet operations against one endpoint.
pub struct PetExternal {
    client: Arc<dyn PetClient>,
}

impl PetExternal {
    pub fn new(client: Arc<dyn PetClient>) -> Self {
        Self { client }
    }

    /// Fetch the bound pet and compare it with `desired`.
    ///
    /// Makes no remote call when nothing is bound. A pet the remote reports
    /// missing is not an error.
    pub fn observe_pet(
        &self,
        desired: &PetParameters,
        bound: Option<&ExternalName>,
    ) -> Result<ReconciliationResult> {
        let Some(name) = bound else {
            return Ok(ReconciliationResult::unbound());
        };
        let Some(pet) = self.fetch_pet(name)? else {
            return Ok(ReconciliationResult::absent());
        };

        let observation = to_observation(&pet)?;
        Ok(ReconciliationResult {
            bound: true,
            exists: true,
            up_to_date: diff::is_up_to_date(desired, &pet),
            observation: Some(observation),
        })
    }

    /// Fetch the bound pet and report every difference. `None` when the pet
    /// is unbound or gone.
    pub fn diff_pet(&self, desired: &PetParameters, name: &ExternalName) -> Result<Option<PetDiff>> {
        Ok(self
            .fetch_pet(name)?
            .map(|pet| diff::diff(desired, &pet)))
    }

    /// Fetch the pet bound to `name` as the remote reports it. `None` when
    /// the remote has no such pet.
    pub fn fetch_pet(&self, name: &ExternalName) -> Result<Option<Pet>> {
        external_id(name)?;
        match self.client.get_pet_by_id(name.as_str()) {
            Ok(pet) => Ok(Some(pet)),
            Err(e) if e.is_not_found() => {
                log::debug!("Pet {name} not found");
                Ok(None)
            }
            Err(e) => {
                let retryable = e.is_retryable();
                Err(Error::observe(e, retryable))
            }
        }
    }

    /// Create a pet and return the name to bind.
    pub fn create_pet(&self, desired: &PetParameters) -> Result<ExternalName> {
        self.create_observed(desired)
            .map(|observation| ExternalName::from_id(observation.id))
    }

    fn create_observed(&self, desired: &PetParameters) -> Result<PetObservation> {
        let created = self.client.add_pet(to_payload(desired)).map_err(|e| {
            let retryable = e.is_retryable();
            Error::create_failed(e, retryable)
        })?;
        to_observation(&created)
    }

    /// Replace the bound pet with `desired`.
    pub fn update_pet(&self, name: &ExternalName, desired: &PetParameters) -> Result<()> {
        external_id(name)?;
        self.client
            .update_pet_by_id(name.as_str(), &to_payload(desired))
            .map_err(|e| {
                let retryable = e.is_retryable();
                Error::update_failed(e, retryable)
            })
    }

    /// Delete the bound pet. Already gone is success.
    pub fn delete_pet(&self, name: &ExternalName) -> Result<()> {
        external_id(name)?;
        match self.client.delete_pet_by_id(name.as_str()) {
            Ok(()) => Ok(()),
            Err(e) if e.is_not_found() => {
                log::debug!("Pet {name} already deleted");
                Ok(())
            }
            Err(e) => {
                let retryable = e.is_retryable();
                Err(Error::delete_failed(e, retryable))
            }
        }
    }
}

fn store_observation(mg: &mut ManagedRecord, observation: Option<&PetObservation>) -> Result<()> {
    mg.at_provider = observation
        .map(serde_json::to_value)
        .transpose()
        .map_err(|e| Error::MalformedResource(e.to_string()))?;
    Ok(())
}

impl ExternalClient for PetExternal {
    fn observe(&self, mg: &mut ManagedRecord) -> Result<ExternalObservation> {
        let desired = parse_parameters(mg)?;
        let bound = mg.external_name();
        let result = self.observe_pet(&desired, bound.as_ref())?;

        store_observation(mg, result.observation.as_ref())?;
        Ok(result.external_observation())
    }

    fn create(&self, mg: &mut ManagedRecord) -> Result<()> {
        let desired = parse_parameters(mg)?;
        let observation = self.create_observed(&desired)?;

        mg.set_external_name(ExternalName::from_id(observation.id));
        store_observation(mg, Some(&observation))
    }

    fn update(&self, mg: &ManagedRecord) -> Result<()> {
        let desired = parse_parameters(mg)?;
        let name = mg
            .external_name()
            .ok_or_else(|| Error::InvalidExternalName(String::new()))?;
        self.update_pet(&name, &desired)
    }

    fn delete(&self, mg: &ManagedRecord) -> Result<()> {
        match mg.external_name() {
            Some(name) => self.delete_pet(&name),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use managed::{
        ReadyReason, ReconcileAction, ReconcileOptions, ReconcileState, Reconciler, RetryConfig,
    };
    use petstore::{MockPetClient, Operation, Pet, PetStatus, Tag};
    use serde_json::json;

    fn external(mock: &MockPetClient) -> PetExternal {
        PetExternal::new(Arc::new(mock.clone()))
    }

    fn transport_error() -> petstore::Error {
        petstore::Error::transport("internal error", Some(500))
    }

    #[test]
    fn test_unbound_observe_makes_no_call() {
        let mock = MockPetClient::new();
        let result = external(&mock)
            .observe_pet(&PetParameters::named("rex"), None)
            .unwrap();

        assert!(!result.exists);
        assert_eq!(result.state(), ReconcileState::NoIdentity);
        assert!(mock.calls().is_empty());
    }

    #[test]
    fn test_not_found_is_absent_not_error() {
        let mock = MockPetClient::new();
        let result = external(&mock)
            .observe_pet(&PetParameters::named("rex"), Some(&ExternalName::from_id(42)))
            .unwrap();

        assert!(!result.exists);
        assert!(result.observation.is_none());
        assert_eq!(result.state(), ReconcileState::Absent);
        assert_eq!(mock.call_count(Operation::Get), 1);
    }

    #[test]
    fn test_fetch_error_propagates_unchanged() {
        let mock = MockPetClient::new();
        mock.insert(Pet::named("rex").with_id(42));
        mock.fail_next(Operation::Get, transport_error());

        let err = external(&mock)
            .observe_pet(&PetParameters::named("rex"), Some(&ExternalName::from_id(42)))
            .unwrap_err();

        assert!(matches!(err, Error::Observe { retryable: true, .. }));
        let source = err
            .external_source()
            .and_then(|s| s.downcast_ref::<petstore::Error>());
        assert_eq!(source, Some(&transport_error()));
    }

    #[test]
    fn test_fetch_error_leaves_observation_unset() {
        let mock = MockPetClient::new();
        mock.fail_always(Operation::Get, transport_error());
        let mut record = pet_record("rex", json!({"name": "rex"}));
        record.set_external_name(ExternalName::from_id(42));
        record.at_provider = None;

        assert!(external(&mock).observe(&mut record).is_err());
        assert!(record.at_provider.is_none());
    }

    #[test]
    fn test_invalid_external_name_is_rejected_before_fetch() {
        let mock = MockPetClient::new();
        let err = external(&mock)
            .observe_pet(&PetParameters::named("rex"), Some(&ExternalName::new("rex")))
            .unwrap_err();

        assert!(matches!(err, Error::InvalidExternalName(_)));
        assert!(mock.calls().is_empty());
    }

    #[test]
    fn test_observed_pet_without_id_is_malformed() {
        #[derive(Default)]
        struct Anonymous;
        impl PetClient for Anonymous {
            fn add_pet(&self, pet: Pet) -> petstore::Result<Pet> {
                Ok(pet)
            }
            fn get_pet_by_id(&self, _id: &str) -> petstore::Result<Pet> {
                Ok(Pet::named("rex"))
            }
            fn update_pet_by_id(&self, _id: &str, _pet: &Pet) -> petstore::Result<()> {
                Ok(())
            }
            fn delete_pet_by_id(&self, _id: &str) -> petstore::Result<()> {
                Ok(())
            }
        }

        let external = PetExternal::new(Arc::new(Anonymous));
        let err = external
            .observe_pet(&PetParameters::named("rex"), Some(&ExternalName::from_id(1)))
            .unwrap_err();
        assert!(matches!(err, Error::MalformedResource(_)));

        let err = external.create_pet(&PetParameters::named("rex")).unwrap_err();
        assert!(matches!(err, Error::MalformedResource(_)));
    }

    #[test]
    fn test_create_failure_binds_nothing() {
        let mock = MockPetClient::new();
        mock.fail_next(Operation::Add, transport_error());
        let mut record = pet_record("rex", json!({"name": "rex"}));

        let err = external(&mock).create(&mut record).unwrap_err();

        assert!(matches!(err, Error::CreateFailed { retryable: true, .. }));
        assert!(!record.is_bound());
    }

    #[test]
    fn test_update_failure_keeps_binding() {
        let mock = MockPetClient::new();
        mock.insert(Pet::named("max").with_id(7));
        mock.fail_next(Operation::Update, petstore::Error::transport("bad request", Some(400)));
        let mut record = pet_record("rex", json!({"name": "rex"}));
        record.set_external_name(ExternalName::from_id(7));

        let err = external(&mock).update(&record).unwrap_err();

        assert!(matches!(err, Error::UpdateFailed { .. }));
        assert_eq!(record.external_name(), Some(ExternalName::from_id(7)));
        assert_eq!(mock.pet("7").unwrap().name, "max");
    }

    #[test]
    fn test_delete_error_other_than_not_found_fails() {
        let mock = MockPetClient::new();
        mock.fail_next(Operation::Delete, transport_error());

        let err = external(&mock)
            .delete_pet(&ExternalName::from_id(7))
            .unwrap_err();
        assert!(matches!(err, Error::DeleteFailed { .. }));
    }

    #[test]
    fn test_diff_pet_reports_fields() {
        let mock = MockPetClient::new();
        mock.insert(Pet::named("max").with_id(7).with_tags(vec![Tag::new(1, "good")]));

        let d = external(&mock)
            .diff_pet(&PetParameters::named("rex"), &ExternalName::from_id(7))
            .unwrap()
            .unwrap();
        assert_eq!(d.name, Some(("rex".to_string(), "max".to_string())));
        assert_eq!(d.removed_tags.len(), 1);

        let gone = external(&mock)
            .diff_pet(&PetParameters::named("rex"), &ExternalName::from_id(8))
            .unwrap();
        assert!(gone.is_none());
    }

    // Create, bind, then observe the remote after it became available.
    #[test]
    fn test_scenario_create_then_in_sync() {
        let mock = MockPetClient::with_first_id(565656);
        let pets = external(&mock);
        let desired = PetParameters::named("rex");

        let before = pets.observe_pet(&desired, None).unwrap();
        assert!(!before.exists);

        let name = pets.create_pet(&desired).unwrap();
        assert_eq!(name, ExternalName::from_id(565656));
        assert_eq!(mock.call_count(Operation::Add), 1);

        let mut stored = mock.pet("565656").unwrap();
        stored.status = Some(PetStatus::Available);
        stored.tags = None;
        mock.insert(stored);

        let after = pets.observe_pet(&desired, Some(&name)).unwrap();
        assert!(after.exists);
        assert!(after.up_to_date);
        assert_eq!(
            after.observation,
            Some(PetObservation {
                id: 565656,
                status: Some(PetStatus::Available)
            })
        );
    }

    // A renamed remote is stale and gets the full desired payload.
    #[test]
    fn test_scenario_stale_then_update() {
        let mock = MockPetClient::new();
        mock.insert(Pet::named("max").with_id(7));
        let pets = external(&mock);
        let desired = PetParameters::named("rex");
        let name = ExternalName::from_id(7);

        let result = pets.observe_pet(&desired, Some(&name)).unwrap();
        assert!(result.exists);
        assert!(!result.up_to_date);

        pets.update_pet(&name, &desired).unwrap();

        let calls = mock.calls();
        let update = calls.last().unwrap();
        assert_eq!(update.operation, Operation::Update);
        assert_eq!(update.id.as_deref(), Some("7"));
        assert_eq!(
            update.payload.as_ref().unwrap(),
            &Pet::named("rex").with_tags(vec![])
        );
        assert!(pets.observe_pet(&desired, Some(&name)).unwrap().up_to_date);
    }

    // Deleting a pet that is already gone succeeds.
    #[test]
    fn test_scenario_delete_already_removed() {
        let mock = MockPetClient::new();
        let pets = external(&mock);

        pets.delete_pet(&ExternalName::from_id(7)).unwrap();
        assert_eq!(mock.call_count(Operation::Delete), 1);
    }

    fn pet_record(name: &str, for_provider: serde_json::Value) -> ManagedRecord {
        ManagedRecord::new(KIND, name, for_provider)
    }

    fn reconciler(mock: &MockPetClient) -> Reconciler<PetConnector> {
        let connector = PetConnector::default();
        connector.insert_client(crate::config::DEFAULT_PROVIDER, Arc::new(mock.clone()));
        Reconciler::new(
            connector,
            ReconcileOptions {
                dry_run: false,
                jobs: 2,
                retry: RetryConfig {
                    max_attempts: 2,
                    base_delay: std::time::Duration::from_millis(1),
                    backoff_factor: 1.0,
                    max_delay: std::time::Duration::from_millis(1),
                },
            },
        )
    }

    #[test]
    fn test_reconciler_full_cycle() {
        let mock = MockPetClient::with_first_id(100);
        let reconciler = reconciler(&mock);
        let mut record = pet_record("rex", json!({"name": "rex", "tags": [{"id": 1, "name": "good"}]}));

        let created = reconciler.reconcile(&mut record).unwrap();
        assert_eq!(
            created.action,
            ReconcileAction::Created {
                external_name: ExternalName::from_id(100)
            }
        );
        assert_eq!(record.at_provider, Some(json!({"id": 100, "status": "PENDING"})));
        assert_eq!(record.conditions.ready, Some(ReadyReason::Creating));

        let steady = reconciler.reconcile(&mut record).unwrap();
        assert_eq!(steady.action, ReconcileAction::NoChange);

        record.for_provider = json!({"name": "rex"});
        let updated = reconciler.reconcile(&mut record).unwrap();
        assert_eq!(updated.action, ReconcileAction::Updated);
        assert_eq!(mock.pet("100").unwrap().tags, Some(vec![]));

        record.deletion_requested = true;
        let deleted = reconciler.reconcile(&mut record).unwrap();
        assert_eq!(deleted.action, ReconcileAction::Deleted);
        assert!(mock.is_empty());
    }

    #[test]
    fn test_reconciler_recreates_vanished_pet() {
        let mock = MockPetClient::with_first_id(100);
        let reconciler = reconciler(&mock);
        let mut record = pet_record("rex", json!({"name": "rex"}));
        reconciler.reconcile(&mut record).unwrap();
        mock.remove("100");

        let outcome = reconciler.reconcile(&mut record).unwrap();

        assert_eq!(outcome.state, Some(ReconcileState::Absent));
        assert_eq!(record.external_name(), Some(ExternalName::from_id(101)));
    }

    #[test]
    fn test_reconciler_retries_transient_fetch() {
        let mock = MockPetClient::new();
        mock.insert(Pet::named("rex").with_id(7).with_tags(vec![]));
        mock.fail_next(Operation::Get, transport_error());
        let reconciler = reconciler(&mock);
        let mut record = pet_record("rex", json!({"name": "rex"}));
        record.set_external_name(ExternalName::from_id(7));

        let outcome = reconciler.reconcile(&mut record).unwrap();

        assert_eq!(outcome.action, ReconcileAction::NoChange);
        assert_eq!(mock.call_count(Operation::Get), 2);
    }

    #[test]
    fn test_reconciler_attempts_create_once_per_cycle() {
        let mock = MockPetClient::new();
        mock.fail_next(Operation::Add, petstore::Error::transport("gateway timeout", Some(504)));
        let reconciler = reconciler(&mock);
        let mut record = pet_record("rex", json!({"name": "rex"}));

        let err = reconciler.reconcile(&mut record).unwrap_err();

        assert!(matches!(err, Error::CreateFailed { retryable: true, .. }));
        assert_eq!(mock.call_count(Operation::Add), 1);
        assert!(!record.is_bound());
        assert!(record.conditions.is_failing());
        assert!(mock.is_empty());

        let outcome = reconciler.reconcile(&mut record).unwrap();
        assert!(matches!(outcome.action, ReconcileAction::Created { .. }));
        assert_eq!(mock.call_count(Operation::Add), 2);
    }

    #[test]
    fn test_reconciler_does_not_retry_undecodable_responses() {
        let mock = MockPetClient::new();
        mock.insert(Pet::named("rex").with_id(7));
        mock.fail_always(Operation::Get, petstore::Error::InvalidResponse("garbage".into()));
        let reconciler = reconciler(&mock);
        let mut record = pet_record("rex", json!({"name": "rex"}));
        record.set_external_name(ExternalName::from_id(7));

        let err = reconciler.reconcile(&mut record).unwrap_err();

        assert!(matches!(err, Error::Observe { retryable: false, .. }));
        assert_eq!(mock.call_count(Operation::Get), 1);
        assert!(record.conditions.is_failing());
    }

    #[test]
    fn test_reconciler_rejects_other_kinds() {
        let mock = MockPetClient::new();
        let reconciler = reconciler(&mock);
        let mut record = ManagedRecord::new("Store", "main", json!({}));

        let err = reconciler.reconcile(&mut record).unwrap_err();
        assert!(matches!(err, Error::WrongResourceType { .. }));
        assert!(mock.calls().is_empty());
    }
}
