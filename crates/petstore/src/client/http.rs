//! HTTP implementation of [`PetClient`].
//!
//! Talks JSON to `{server_url}/pet`. Non-2xx responses are read in full so
//! the body can travel with the error as diagnostic text.

use crate::client::PetClient;
use crate::error::{Error, Result, classify_status};
use crate::ids::IdGenerator;
use crate::types::{Pet, PetStatus};
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

/// Endpoint configuration for [`HttpPetClient`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Base URL, e.g. `https://petstore.example.com/api/v3`.
    pub server_url: String,
    /// Overall per-request timeout. `None` waits indefinitely.
    pub timeout: Option<Duration>,
}

impl ClientConfig {
    /// Create a config for `server_url` with no timeout.
    pub fn new(server_url: impl Into<String>) -> Self {
        Self {
            server_url: server_url.into(),
            timeout: None,
        }
    }

    /// Set the per-request timeout.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}

/// Blocking Petstore client.
///
/// Stateless apart from its endpoint and id generator, so one instance can
/// serve many reconcilers at once.
///
/// # Example
///
/// ```no_run
/// use petstore::{ClientConfig, HttpPetClient, PetClient, SequentialIds};
/// use std::sync::Arc;
///
/// let client = HttpPetClient::new(
///     ClientConfig::new("http://localhost:8080/api/v3"),
///     Arc::new(SequentialIds::default()),
/// );
/// let pet = client.get_pet_by_id("565656").unwrap();
/// println!("{}", pet.name);
/// ```
pub struct HttpPetClient {
    /// HTTP agent for requests.
    agent: ureq::Agent,
    /// Base URL without trailing slash.
    server_url: String,
    /// Source of ids for new pets.
    ids: Arc<dyn IdGenerator>,
}

impl HttpPetClient {
    /// Create a client for the given endpoint.
    #[must_use]
    pub fn new(config: ClientConfig, ids: Arc<dyn IdGenerator>) -> Self {
        let agent_config = ureq::Agent::config_builder()
            .http_status_as_error(false)
            .timeout_global(config.timeout)
            .build();

        Self {
            agent: ureq::Agent::new_with_config(agent_config),
            server_url: config.server_url.trim_end_matches('/').to_string(),
            ids,
        }
    }

    /// Get the configured base URL.
    #[must_use]
    pub fn server_url(&self) -> &str {
        &self.server_url
    }

    /// URL of the pet collection.
    fn collection_url(&self) -> String {
        format!("{}/pet", self.server_url)
    }

    /// URL of a single pet.
    fn pet_url(&self, id: &str) -> String {
        format!("{}/pet/{}", self.server_url, id)
    }

    /// Turn a response into its body text, classifying failures.
    fn read_body(mut response: ureq::http::Response<ureq::Body>) -> Result<String> {
        let status = response.status();
        let body = response
            .body_mut()
            .read_to_string()
            .map_err(|e| Error::transport(e.to_string(), Some(status.as_u16())))?;

        if status.is_success() {
            Ok(body)
        } else {
            Err(classify_status(status.as_u16(), body))
        }
    }
}

impl fmt::Debug for HttpPetClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HttpPetClient")
            .field("server_url", &self.server_url)
            .finish_non_exhaustive()
    }
}

/// Prepare a pet for creation: fresh id, pending status.
fn prepare_new_pet(mut pet: Pet, ids: &dyn IdGenerator) -> Pet {
    pet.id = Some(ids.next_id());
    pet.status = Some(PetStatus::Pending);
    pet
}

/// Pick the pet to return from a create: the echoed one when it decodes and
/// carries an id, the request payload otherwise.
fn created_pet(sent: Pet, body: &str) -> Pet {
    if body.trim().is_empty() {
        return sent;
    }
    match serde_json::from_str::<Pet>(body) {
        Ok(echoed) if echoed.id.is_some() => echoed,
        Ok(_) => sent,
        Err(e) => {
            log::debug!("Create response is not a pet ({e}), using request payload");
            sent
        }
    }
}

fn encode(pet: &Pet) -> Result<Vec<u8>> {
    serde_json::to_vec(pet).map_err(|e| Error::Encode(e.to_string()))
}

impl PetClient for HttpPetClient {
    fn add_pet(&self, pet: Pet) -> Result<Pet> {
        let pet = prepare_new_pet(pet, self.ids.as_ref());
        let url = self.collection_url();
        log::debug!("POST {url}");

        let response = self
            .agent
            .post(&url)
            .header("Content-Type", "application/json")
            .send(&encode(&pet)?[..])?;
        let body = Self::read_body(response)?;

        Ok(created_pet(pet, &body))
    }

    fn get_pet_by_id(&self, id: &str) -> Result<Pet> {
        let url = self.pet_url(id);
        log::debug!("GET {url}");

        let response = self
            .agent
            .get(&url)
            .header("Accept", "application/json")
            .call()?;
        let body = Self::read_body(response)?;

        Ok(serde_json::from_str(&body)?)
    }

    fn update_pet_by_id(&self, id: &str, pet: &Pet) -> Result<()> {
        let url = self.pet_url(id);
        log::debug!("PUT {url}");

        let response = self
            .agent
            .put(&url)
            .header("Content-Type", "application/json")
            .send(&encode(pet)?[..])?;
        Self::read_body(response)?;
        Ok(())
    }

    fn delete_pet_by_id(&self, id: &str) -> Result<()> {
        let url = self.pet_url(id);
        log::debug!("DELETE {url}");

        let response = self.agent.delete(&url).call()?;
        Self::read_body(response)?;
        Ok(())
    }
}
