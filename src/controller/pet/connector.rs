//! Provider resolution and client construction for pets

use super::{KIND, PetExternal};
use crate::config::{DEFAULT_PROVIDER, PetsyncConfig, ProviderConfig};
use managed::{Connector, Error, ExternalClient, ManagedRecord, Result, check_kind};
use petstore::{ClientConfig, HttpPetClient, IdGenerator, PetClient, RandomIds};
use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex, MutexGuard};

/// Builds [`PetExternal`]s from named provider configurations.
///
/// One client per provider is built on first use and shared by every record
/// that names it.
pub struct PetConnector {
    providers: BTreeMap<String, ProviderConfig>,
    ids: Arc<dyn IdGenerator>,
    clients: Mutex<HashMap<String, Arc<dyn PetClient>>>,
}

impl PetConnector {
    pub fn new(providers: BTreeMap<String, ProviderConfig>, ids: Arc<dyn IdGenerator>) -> Self {
        Self {
            providers,
            ids,
            clients: Mutex::new(HashMap::new()),
        }
    }

    pub fn from_config(config: &PetsyncConfig) -> Self {
        Self::new(config.providers.clone(), Arc::new(RandomIds))
    }

    /// Serve `provider` with an existing client instead of building one.
    pub fn insert_client(&self, provider: &str, client: Arc<dyn PetClient>) {
        self.lock_clients().insert(provider.to_string(), client);
    }

    /// Resolve the client for a provider name, building it if needed.
    pub fn client_for(&self, provider: &str) -> Result<Arc<dyn PetClient>> {
        let mut clients = self.lock_clients();
        if let Some(client) = clients.get(provider) {
            return Ok(Arc::clone(client));
        }

        let config = self.providers.get(provider).ok_or_else(|| {
            Error::Connect(format!("provider '{provider}' is not configured"))
        })?;

        let mut client_config = ClientConfig::new(&config.server_url);
        if let Some(timeout) = config.timeout() {
            client_config = client_config.with_timeout(timeout);
        }
        log::debug!("Connecting provider '{}' at {}", provider, config.server_url);

        let client: Arc<dyn PetClient> =
            Arc::new(HttpPetClient::new(client_config, Arc::clone(&self.ids)));
        clients.insert(provider.to_string(), Arc::clone(&client));
        Ok(client)
    }

    /// Typed pet operations for a record.
    pub fn external_for(&self, mg: &ManagedRecord) -> Result<PetExternal> {
        check_kind(mg, KIND)?;
        let provider = mg.provider.as_deref().unwrap_or(DEFAULT_PROVIDER);
        Ok(PetExternal::new(self.client_for(provider)?))
    }

    fn lock_clients(&self) -> MutexGuard<'_, HashMap<String, Arc<dyn PetClient>>> {
        match self.clients.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

impl Default for PetConnector {
    fn default() -> Self {
        Self::new(BTreeMap::new(), Arc::new(RandomIds))
    }
}

impl Connector for PetConnector {
    fn kind(&self) -> &str {
        KIND
    }

    fn connect(&self, mg: &ManagedRecord) -> Result<Box<dyn ExternalClient>> {
        Ok(Box::new(self.external_for(mg)?))
    }
}
