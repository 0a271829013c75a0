//! Application state store
//!
//! A cloneable handle over the shared [`State`]. Views read through the
//! getters, change state only by committing [`Mutation`]s, and talk to the
//! backend through the async actions.
//!
//! Every remote action follows the same shape: mark a request in flight,
//! call the API, commit the data (or hand back the raw result), record a
//! [`GlobalError`] on failure, and settle the in-flight mark no matter how
//! the call ended. Read actions swallow their errors into state; mutating
//! actions record them and also return them to the caller.

use super::app_state::{GlobalError, State, User};
use super::mutations::Mutation;
use crate::api::client::header_value;
use crate::api::{
    Agent, AgentRegistration, AgentSearch, ApiClient, Execution, ExecutionRequest,
};
use crate::config::Config;
use crate::error::{ApiError, StoreError};
use crate::storage::{FileStorage, KeyValueStore, API_KEY_STORAGE_KEY};
use serde_json::Value;
use std::fmt::Display;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError, RwLock};

/// Message recorded by the global unhandled-error hook
pub const UNEXPECTED_ERROR_MESSAGE: &str = "An unexpected error occurred";

/// Callback invoked after every commit
pub type Subscriber = Arc<dyn Fn(&Mutation) + Send + Sync>;

/// Handle returned by [`Store::subscribe`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

struct Inner {
    state: RwLock<State>,
    api: ApiClient,
    storage: Arc<dyn KeyValueStore>,
    subscribers: Mutex<Vec<(SubscriptionId, Subscriber)>>,
    next_subscription: AtomicU64,
}

/// Shared application store
#[derive(Clone)]
pub struct Store {
    inner: Arc<Inner>,
}

// Settles one in-flight request when dropped, including on cancellation
struct InFlight<'a> {
    store: &'a Store,
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.store.commit(Mutation::RequestSettled);
    }
}

impl Store {
    /// Create the store, restoring the API key from storage if present
    ///
    /// The user stays unset: a restored key is not revalidated.
    pub fn new(api: ApiClient, storage: Arc<dyn KeyValueStore>) -> Self {
        let api_key = match storage.get(API_KEY_STORAGE_KEY) {
            Ok(key) => key.unwrap_or_default(),
            Err(e) => {
                tracing::warn!(error = %e, "Failed to read persisted API key");
                String::new()
            }
        };
        if let Err(e) = api.set_api_key(&api_key) {
            tracing::warn!(error = %e, "Ignoring persisted API key");
        }
        let state = if api.has_api_key() {
            State::with_api_key(api_key)
        } else {
            State::default()
        };

        Self {
            inner: Arc::new(Inner {
                state: RwLock::new(state),
                api,
                storage,
                subscribers: Mutex::new(Vec::new()),
                next_subscription: AtomicU64::new(1),
            }),
        }
    }

    /// Build the store from configuration, with file-backed storage
    pub fn from_config(config: &Config) -> Result<Self, ApiError> {
        let api = ApiClient::new(&config.api.base_url)?;
        let storage = FileStorage::new(config.storage.storage_file());
        Ok(Self::new(api, Arc::new(storage)))
    }

    /// The underlying API client
    pub fn api(&self) -> &ApiClient {
        &self.inner.api
    }

    // ---- getters ----

    /// Run `f` against the current state
    ///
    /// `f` must not commit; the state lock is held while it runs.
    pub fn read<R>(&self, f: impl FnOnce(&State) -> R) -> R {
        let state = self.inner.state.read().unwrap_or_else(PoisonError::into_inner);
        f(&state)
    }

    /// Owned copy of the current state
    pub fn snapshot(&self) -> State {
        self.read(State::clone)
    }

    pub fn is_authenticated(&self) -> bool {
        self.read(State::is_authenticated)
    }

    pub fn is_admin(&self) -> bool {
        self.read(State::is_admin)
    }

    /// Agent from the current `agents` collection, `None` if absent
    pub fn agent_by_id(&self, id: &str) -> Option<Agent> {
        self.read(|state| state.agent_by_id(id).cloned())
    }

    pub fn loading(&self) -> bool {
        self.read(State::loading)
    }

    pub fn user(&self) -> Option<User> {
        self.read(|state| state.user.clone())
    }

    pub fn api_key(&self) -> String {
        self.read(|state| state.api_key.clone())
    }

    pub fn global_error(&self) -> Option<GlobalError> {
        self.read(|state| state.global_error.clone())
    }

    // ---- mutations ----

    /// Apply a mutation and notify every subscriber before returning
    ///
    /// A `SetApiKey` whose key cannot be sent as a header is committed as
    /// an empty key, so state, storage and header never disagree.
    pub fn commit(&self, mutation: Mutation) {
        let mutation = match mutation {
            Mutation::SetApiKey(key) => Mutation::SetApiKey(self.sync_api_key(key)),
            other => other,
        };
        {
            let mut state = self.inner.state.write().unwrap_or_else(PoisonError::into_inner);
            state.apply(&mutation);
        }
        tracing::trace!(mutation = mutation.name(), "commit");

        let subscribers: Vec<Subscriber> = self
            .inner
            .subscribers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .map(|(_, subscriber)| Arc::clone(subscriber))
            .collect();
        for subscriber in subscribers {
            subscriber(&mutation);
        }
    }

    /// Register a callback run synchronously after every commit
    pub fn subscribe(
        &self,
        subscriber: impl Fn(&Mutation) + Send + Sync + 'static,
    ) -> SubscriptionId {
        let id = SubscriptionId(self.inner.next_subscription.fetch_add(1, Ordering::Relaxed));
        let subscriber: Subscriber = Arc::new(subscriber);
        self.inner
            .subscribers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push((id, subscriber));
        id
    }

    /// Remove a subscriber; returns false if it was already gone
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut subscribers = self
            .inner
            .subscribers
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        let before = subscribers.len();
        subscribers.retain(|(existing, _)| *existing != id);
        subscribers.len() != before
    }

    // Install the header, then persist the key that actually took effect
    fn sync_api_key(&self, key: String) -> String {
        let key = match self.inner.api.set_api_key(&key) {
            Ok(()) => key,
            Err(e) => {
                tracing::warn!(error = %e, "API key not usable as a header; clearing it");
                self.inner.api.clear_api_key();
                String::new()
            }
        };
        let persisted = if key.is_empty() {
            self.inner.storage.remove(API_KEY_STORAGE_KEY)
        } else {
            self.inner.storage.set(API_KEY_STORAGE_KEY, &key)
        };
        if let Err(e) = persisted {
            tracing::warn!(error = %e, "Failed to persist API key");
        }
        key
    }

    // ---- actions: session ----

    /// Validate `api_key` against the backend and derive the user from it
    ///
    /// On failure the key and user are rolled back and the caller gets
    /// [`StoreError::InvalidApiKey`]. Login does not touch the loading
    /// indicator or the global error.
    pub async fn login(&self, api_key: &str) -> Result<User, StoreError> {
        if api_key.trim().is_empty() || header_value(api_key).is_err() {
            self.clear_session();
            return Err(StoreError::InvalidApiKey);
        }

        self.commit(Mutation::SetApiKey(api_key.to_string()));
        match self.inner.api.health().await {
            Ok(health) => {
                let user = User::from_health(api_key, &health);
                tracing::info!(user_id = %user.id, role = user.role.as_str(), "Logged in");
                self.commit(Mutation::SetUser(Some(user.clone())));
                Ok(user)
            }
            Err(e) => {
                tracing::warn!(error = %e, "Login failed");
                self.clear_session();
                Err(StoreError::InvalidApiKey)
            }
        }
    }

    /// Forget the key and user; collections are left as they are
    pub fn logout(&self) {
        tracing::info!("Logged out");
        self.clear_session();
    }

    fn clear_session(&self) {
        self.commit(Mutation::SetApiKey(String::new()));
        self.commit(Mutation::SetUser(None));
    }

    // ---- actions: agents ----

    /// Replace `agents` with the backend's list; errors go to the banner only
    pub async fn fetch_agents(&self, search: &AgentSearch) {
        let _in_flight = self.begin_request();
        match self.inner.api.list_agents(search).await {
            Ok(page) => self.commit(Mutation::SetAgents(page.agents)),
            Err(e) => self.record_failure("Failed to fetch agents", &e),
        }
    }

    pub async fn fetch_agent_detail(&self, agent_id: &str) {
        let _in_flight = self.begin_request();
        match self.inner.api.get_agent(agent_id).await {
            Ok(agent) => self.commit(Mutation::SetAgentDetail(Some(agent))),
            Err(e) => self.record_failure("Failed to fetch agent details", &e),
        }
    }

    /// Register a new agent and return the backend's raw response
    pub async fn create_agent(&self, agent: &AgentRegistration) -> Result<Value, ApiError> {
        let _in_flight = self.begin_request();
        self.inner
            .api
            .create_agent(agent)
            .await
            .map_err(|e| self.recorded("Failed to create agent", e))
    }

    pub async fn update_agent(
        &self,
        agent_id: &str,
        agent: &AgentRegistration,
    ) -> Result<Value, ApiError> {
        let _in_flight = self.begin_request();
        self.inner
            .api
            .update_agent(agent_id, agent)
            .await
            .map_err(|e| self.recorded("Failed to update agent", e))
    }

    pub async fn delete_agent(&self, agent_id: &str) -> Result<Value, ApiError> {
        let _in_flight = self.begin_request();
        self.inner
            .api
            .delete_agent(agent_id)
            .await
            .map_err(|e| self.recorded("Failed to delete agent", e))
    }

    // ---- actions: executions ----

    /// Run an agent and return the execution record
    pub async fn execute_agent(
        &self,
        agent_id: &str,
        request: &ExecutionRequest,
    ) -> Result<Execution, ApiError> {
        let _in_flight = self.begin_request();
        self.inner
            .api
            .execute_agent(agent_id, request)
            .await
            .map_err(|e| self.recorded("Failed to execute agent", e))
    }

    /// Replace `executions` with the given agent's runs
    pub async fn fetch_executions(&self, agent_id: &str) {
        let _in_flight = self.begin_request();
        match self.inner.api.list_executions(agent_id).await {
            Ok(page) => self.commit(Mutation::SetExecutions(page.executions)),
            Err(e) => self.record_failure("Failed to fetch executions", &e),
        }
    }

    pub async fn fetch_execution_detail(&self, agent_id: &str, execution_id: &str) {
        let _in_flight = self.begin_request();
        match self.inner.api.get_execution(agent_id, execution_id).await {
            Ok(execution) => self.commit(Mutation::SetExecutionDetail(Some(execution))),
            Err(e) => self.record_failure("Failed to fetch execution details", &e),
        }
    }

    // ---- actions: errors ----

    pub fn set_error(&self, error: GlobalError) {
        self.commit(Mutation::SetError(Some(error)));
    }

    pub fn clear_error(&self) {
        self.commit(Mutation::ClearError);
    }

    /// Global hook for errors nothing else handled
    pub fn report_unhandled(&self, error: impl Display) {
        tracing::error!(error = %error, "Global error");
        self.set_error(GlobalError::new(UNEXPECTED_ERROR_MESSAGE, error.to_string()));
    }

    fn begin_request(&self) -> InFlight<'_> {
        self.commit(Mutation::RequestStarted);
        InFlight { store: self }
    }

    fn record_failure(&self, message: &str, error: &ApiError) {
        tracing::warn!(error = %error, "{}", message);
        self.set_error(GlobalError::new(message, error.to_string()));
    }

    fn recorded(&self, message: &str, error: ApiError) -> ApiError {
        self.record_failure(message, &error);
        error
    }
}
