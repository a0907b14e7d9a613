//! Client trait and implementations for the pet API.
//!
//! [`PetClient`] is the seam between the reconciler and the network. The
//! primary implementation is [`http::HttpPetClient`].
//!
//! # Testing
//!
//! Use [`MockPetClient`] for testing without network access:
//!
//! ```
//! use petstore::{MockPetClient, Operation, Pet, PetClient};
//!
//! let mock = MockPetClient::new();
//! let created = mock.add_pet(Pet::named("rex")).unwrap();
//! let id = created.id.unwrap().to_string();
//!
//! assert_eq!(mock.get_pet_by_id(&id).unwrap().name, "rex");
//! assert_eq!(mock.call_count(Operation::Add), 1);
//! ```

pub mod http;

use crate::error::{Error, Result};
use crate::ids::{IdGenerator, SequentialIds};
use crate::types::{Pet, PetStatus};
use std::collections::{HashMap, VecDeque};
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard};

/// The four remote operations on a pet.
///
/// Every call is blocking and attempted once. Implementations must be safe
/// to share across threads; concurrent calls for distinct ids are
/// independent.
pub trait PetClient: Send + Sync {
    /// Create a pet.
    ///
    /// Assigns a fresh id and sets the status to [`PetStatus::Pending`]
    /// before sending. Returns the pet as echoed by the remote, or the
    /// request payload when the remote does not echo it.
    fn add_pet(&self, pet: Pet) -> Result<Pet>;

    /// Fetch a pet by id.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] when the remote reports the pet absent
    /// and [`Error::Transport`] for any other failure.
    fn get_pet_by_id(&self, id: &str) -> Result<Pet>;

    /// Replace a pet by id. `pet` is the complete desired state.
    fn update_pet_by_id(&self, id: &str, pet: &Pet) -> Result<()>;

    /// Delete a pet by id.
    fn delete_pet_by_id(&self, id: &str) -> Result<()>;
}

impl<T: PetClient + ?Sized> PetClient for Arc<T> {
    fn add_pet(&self, pet: Pet) -> Result<Pet> {
        (**self).add_pet(pet)
    }

    fn get_pet_by_id(&self, id: &str) -> Result<Pet> {
        (**self).get_pet_by_id(id)
    }

    fn update_pet_by_id(&self, id: &str, pet: &Pet) -> Result<()> {
        (**self).update_pet_by_id(id, pet)
    }

    fn delete_pet_by_id(&self, id: &str) -> Result<()> {
        (**self).delete_pet_by_id(id)
    }
}

/// Identifies one of the [`PetClient`] operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    /// [`PetClient::add_pet`]
    Add,
    /// [`PetClient::get_pet_by_id`]
    Get,
    /// [`PetClient::update_pet_by_id`]
    Update,
    /// [`PetClient::delete_pet_by_id`]
    Delete,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Add => "add",
            Self::Get => "get",
            Self::Update => "update",
            Self::Delete => "delete",
        };
        write!(f, "{name}")
    }
}

/// A recorded call against [`MockPetClient`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Call {
    /// Which operation was invoked.
    pub operation: Operation,
    /// The id argument, if the operation takes one.
    pub id: Option<String>,
    /// The payload argument, if the operation takes one.
    pub payload: Option<Pet>,
}

#[derive(Debug, Default)]
struct Failures {
    once: HashMap<Operation, VecDeque<Error>>,
    always: HashMap<Operation, Error>,
}

/// In-memory pet store for testing without network access.
///
/// Records every call and can be told to fail specific operations.
/// Clones share the same store.
#[derive(Debug, Clone)]
pub struct MockPetClient {
    pets: Arc<Mutex<HashMap<String, Pet>>>,
    calls: Arc<Mutex<Vec<Call>>>,
    failures: Arc<Mutex<Failures>>,
    ids: Arc<SequentialIds>,
}

impl MockPetClient {
    /// Create an empty mock whose generated ids start at 100000.
    #[must_use]
    pub fn new() -> Self {
        Self::with_first_id(100_000)
    }

    /// Create an empty mock whose generated ids start at `first_id`.
    #[must_use]
    pub fn with_first_id(first_id: i64) -> Self {
        Self {
            pets: Arc::default(),
            calls: Arc::default(),
            failures: Arc::default(),
            ids: Arc::new(SequentialIds::starting_at(first_id)),
        }
    }

    /// Seed a pet. Pets without an id are ignored.
    pub fn insert(&self, pet: Pet) {
        let Some(id) = pet.id else {
            log::warn!("Ignoring seeded pet '{}' without an id", pet.name);
            return;
        };
        lock(&self.pets).insert(id.to_string(), pet);
    }

    /// Remove a pet behind the client's back.
    pub fn remove(&self, id: &str) -> Option<Pet> {
        lock(&self.pets).remove(id)
    }

    /// Current stored state of a pet.
    #[must_use]
    pub fn pet(&self, id: &str) -> Option<Pet> {
        lock(&self.pets).get(id).cloned()
    }

    /// Number of stored pets.
    #[must_use]
    pub fn len(&self) -> usize {
        lock(&self.pets).len()
    }

    /// Whether the store is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Fail the next call of `operation` with `error`. Queued failures are
    /// consumed in order.
    pub fn fail_next(&self, operation: Operation, error: Error) {
        let mut failures = lock(&self.failures);
        failures.once.entry(operation).or_default().push_back(error);
    }

    /// Fail every call of `operation` with `error`.
    pub fn fail_always(&self, operation: Operation, error: Error) {
        let mut failures = lock(&self.failures);
        failures.always.insert(operation, error);
    }

    /// Drop all configured failures.
    pub fn clear_failures(&self) {
        let mut failures = lock(&self.failures);
        failures.once.clear();
        failures.always.clear();
    }

    /// All calls made so far, oldest first.
    #[must_use]
    pub fn calls(&self) -> Vec<Call> {
        lock(&self.calls).clone()
    }

    /// Number of calls made to `operation`.
    #[must_use]
    pub fn call_count(&self, operation: Operation) -> usize {
        lock(&self.calls)
            .iter()
            .filter(|c| c.operation == operation)
            .count()
    }

    fn record(&self, operation: Operation, id: Option<&str>, payload: Option<&Pet>) -> Result<()> {
        lock(&self.calls).push(Call {
            operation,
            id: id.map(str::to_string),
            payload: payload.cloned(),
        });

        let mut failures = lock(&self.failures);
        if let Some(err) = failures.once.get_mut(&operation).and_then(VecDeque::pop_front) {
            return Err(err);
        }
        match failures.always.get(&operation) {
            Some(err) => Err(err.clone()),
            None => Ok(()),
        }
    }

    fn not_found(id: &str) -> Error {
        Error::NotFound {
            message: format!("Pet {id} not found"),
        }
    }
}

/// Lock a mock's shared state; a panicked test thread doesn't poison the rest.
fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    match mutex.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}

impl Default for MockPetClient {
    fn default() -> Self {
        Self::new()
    }
}

impl PetClient for MockPetClient {
    fn add_pet(&self, mut pet: Pet) -> Result<Pet> {
        self.record(Operation::Add, None, Some(&pet))?;

        pet.id = Some(self.ids.next_id());
        pet.status = Some(PetStatus::Pending);
        self.insert(pet.clone());
        Ok(pet)
    }

    fn get_pet_by_id(&self, id: &str) -> Result<Pet> {
        self.record(Operation::Get, Some(id), None)?;
        self.pet(id).ok_or_else(|| Self::not_found(id))
    }

    fn update_pet_by_id(&self, id: &str, pet: &Pet) -> Result<()> {
        self.record(Operation::Update, Some(id), Some(pet))?;

        let mut pets = lock(&self.pets);
        let existing = pets.get_mut(id).ok_or_else(|| Self::not_found(id))?;
        let remote_id = existing.id;
        *existing = pet.clone();
        existing.id = remote_id;
        Ok(())
    }

    fn delete_pet_by_id(&self, id: &str) -> Result<()> {
        self.record(Operation::Delete, Some(id), None)?;
        lock(&self.pets)
            .remove(id)
            .map(|_| ())
            .ok_or_else(|| Self::not_found(id))
    }
}
