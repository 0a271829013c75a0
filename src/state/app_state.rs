// Application state
// Session, agent and execution data, plus the pure getters derived from them

use crate::api::{Agent, Execution, HealthStatus};
use serde::{Deserialize, Serialize};

/// Key that the placeholder login scheme maps to the admin role
pub const ADMIN_SENTINEL_KEY: &str = "test_key";

/// User id assigned when the backend does not report one
pub const DEFAULT_USER_ID: &str = "user_id";

/// Privilege level of the logged-in user
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Elevated privilege
    Admin,
    /// Standard privilege
    User,
    /// Anonymous access reported by the backend
    Guest,
}

impl Role {
    /// Map a backend role claim; unknown claims get standard privilege
    pub fn from_claim(claim: &str) -> Self {
        match claim {
            "admin" => Role::Admin,
            "guest" => Role::Guest,
            _ => Role::User,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::User => "user",
            Role::Guest => "guest",
        }
    }
}

/// Identity derived from a successful key validation; never persisted
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub role: Role,
}

impl User {
    /// Derive the user for `api_key` from a successful health probe
    ///
    /// A role claim in the health body wins. Without one, only the sentinel
    /// key is granted admin; any other key is a standard user.
    pub fn from_health(api_key: &str, health: &HealthStatus) -> Self {
        let role = match health.role.as_deref() {
            Some(claim) => Role::from_claim(claim),
            None if api_key == ADMIN_SENTINEL_KEY => Role::Admin,
            None => Role::User,
        };
        Self {
            id: health
                .user_id
                .clone()
                .unwrap_or_else(|| DEFAULT_USER_ID.to_string()),
            role,
        }
    }
}

/// Application-wide error banner; a newer error replaces the older one
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GlobalError {
    /// Fixed, human-readable summary of what failed
    pub message: String,
    /// Text of the underlying error
    pub details: String,
}

impl GlobalError {
    pub fn new(message: impl Into<String>, details: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            details: details.into(),
        }
    }
}

/// Main application state
///
/// Readable by anyone holding the store; changed only through
/// [`Mutation`](super::Mutation)s committed on the store.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct State {
    /// Present only after a successful login
    pub user: Option<User>,
    /// Current API key, empty when logged out
    pub api_key: String,
    /// Agents as last returned by the backend, in backend order
    pub agents: Vec<Agent>,
    pub agent_detail: Option<Agent>,
    /// Executions of whichever agent was fetched last
    pub executions: Vec<Execution>,
    pub execution_detail: Option<Execution>,
    pub global_error: Option<GlobalError>,
    /// Number of requests currently in flight
    pub in_flight: usize,
}

impl State {
    /// State at application start, with the key restored from storage
    pub fn with_api_key(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            ..Default::default()
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.user.is_some()
    }

    pub fn is_admin(&self) -> bool {
        self.user.as_ref().map(|u| u.role) == Some(Role::Admin)
    }

    /// Find an agent in the current collection by ID
    pub fn agent_by_id(&self, id: &str) -> Option<&Agent> {
        self.agents.iter().find(|agent| agent.id == id)
    }

    /// True while at least one request is in flight
    pub fn loading(&self) -> bool {
        self.in_flight > 0
    }
}
