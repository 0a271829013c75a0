//! Wire types for the marketplace REST API
//!
//! Agent and execution records are opaque to the client beyond their `id`:
//! every other field is kept as raw JSON and read through accessors.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Unique identifier for an agent
pub type AgentId = String;

/// Unique identifier for an execution
pub type ExecutionId = String;

/// Agent record as returned by the backend
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Agent {
    /// Unique identifier for the agent
    pub id: AgentId,
    /// Every other field, untouched
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

impl Agent {
    pub fn new(id: impl Into<AgentId>) -> Self {
        Self {
            id: id.into(),
            fields: Map::new(),
        }
    }

    /// Builder-style helper for attaching a field
    pub fn with_field(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.fields.insert(key.to_string(), value.into());
        self
    }

    pub fn name(&self) -> Option<&str> {
        self.str_field("name")
    }

    pub fn description(&self) -> Option<&str> {
        self.str_field("description")
    }

    pub fn version(&self) -> Option<&str> {
        self.str_field("version")
    }

    pub fn author(&self) -> Option<&str> {
        self.str_field("author")
    }

    pub fn status(&self) -> Option<&str> {
        self.str_field("status")
    }

    /// Tags, skipping any non-string entries
    pub fn tags(&self) -> Vec<&str> {
        self.fields
            .get("tags")
            .and_then(Value::as_array)
            .map(|tags| tags.iter().filter_map(Value::as_str).collect())
            .unwrap_or_default()
    }

    /// Capability names, skipping malformed entries
    pub fn capability_names(&self) -> Vec<&str> {
        self.fields
            .get("capabilities")
            .and_then(Value::as_array)
            .map(|caps| {
                caps.iter()
                    .filter_map(|cap| cap.get("name").and_then(Value::as_str))
                    .collect()
            })
            .unwrap_or_default()
    }

    fn str_field(&self, key: &str) -> Option<&str> {
        self.fields.get(key).and_then(Value::as_str)
    }
}

/// Execution record (one run of an agent)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Execution {
    /// Unique identifier for the execution
    pub id: ExecutionId,
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

impl Execution {
    pub fn new(id: impl Into<ExecutionId>) -> Self {
        Self {
            id: id.into(),
            fields: Map::new(),
        }
    }

    pub fn with_field(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.fields.insert(key.to_string(), value.into());
        self
    }

    pub fn agent_id(&self) -> Option<&str> {
        self.fields.get("agent_id").and_then(Value::as_str)
    }

    pub fn status(&self) -> Option<&str> {
        self.fields.get("status").and_then(Value::as_str)
    }

    pub fn created_at(&self) -> Option<&str> {
        self.fields.get("created_at").and_then(Value::as_str)
    }

    pub fn result(&self) -> Option<&Value> {
        self.fields.get("result")
    }
}

/// `GET /agents` response body
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AgentsPage {
    /// Missing field decodes as an empty list
    #[serde(default)]
    pub agents: Vec<Agent>,
}

/// `GET /agents/{id}/executions` response body
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ExecutionsPage {
    #[serde(default)]
    pub executions: Vec<Execution>,
}

/// How callers authenticate against a registered agent
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuthType {
    #[default]
    None,
    ApiKey,
    Oauth,
}

impl AuthType {
    /// All variants, for form dropdowns
    pub fn all() -> [AuthType; 3] {
        [AuthType::None, AuthType::ApiKey, AuthType::Oauth]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            AuthType::None => "none",
            AuthType::ApiKey => "api_key",
            AuthType::Oauth => "oauth",
        }
    }
}

/// One capability an agent advertises
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Capability {
    pub name: String,
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parameters: Option<Map<String, Value>>,
}

/// Body of `POST /agents` and `PUT /agents/{id}`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AgentRegistration {
    pub name: String,
    pub description: String,
    pub version: String,
    pub author: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contact_email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub homepage_url: Option<String>,
    pub api_endpoint: String,
    #[serde(default)]
    pub capabilities: Vec<Capability>,
    #[serde(default)]
    pub auth_type: AuthType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auth_details: Option<Map<String, Value>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pricing_model: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pricing_details: Option<Map<String, Value>>,
    #[serde(default)]
    pub tags: Vec<String>,
}

impl AgentRegistration {
    /// Validate required fields before sending
    /// Returns Ok(()) if valid, Err with message if invalid
    pub fn validate(&self) -> Result<(), String> {
        let required = [
            ("name", &self.name),
            ("description", &self.description),
            ("version", &self.version),
            ("author", &self.author),
            ("api_endpoint", &self.api_endpoint),
        ];
        for (field, value) in required {
            if value.trim().is_empty() {
                return Err(format!("Agent {} cannot be empty", field));
            }
        }
        for capability in &self.capabilities {
            if capability.name.trim().is_empty() {
                return Err("Capability name cannot be empty".to_string());
            }
        }
        Ok(())
    }
}

/// Body of `POST /agents/{id}/execute`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExecutionRequest {
    pub agent_id: AgentId,
    pub input_data: Map<String, Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub execution_parameters: Option<Map<String, Value>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auth_credentials: Option<Map<String, Value>>,
}

impl ExecutionRequest {
    pub fn new(agent_id: impl Into<AgentId>, input_data: Map<String, Value>) -> Self {
        Self {
            agent_id: agent_id.into(),
            input_data,
            execution_parameters: None,
            auth_credentials: None,
        }
    }
}

/// Query parameters of `GET /agents`
///
/// Empty fields are left out of the query string; list fields repeat
/// their key once per value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AgentSearch {
    pub capabilities: Vec<String>,
    pub tags: Vec<String>,
    pub author: Option<String>,
    pub pricing_model: Option<String>,
    pub query: Option<String>,
}

impl AgentSearch {
    /// Free-text search
    pub fn text(query: impl Into<String>) -> Self {
        Self {
            query: Some(query.into()),
            ..Default::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.query_pairs().is_empty()
    }

    /// Flatten into `(key, value)` pairs in a stable order
    pub fn query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        for capability in self.capabilities.iter().filter(|c| !c.is_empty()) {
            pairs.push(("capabilities", capability.clone()));
        }
        for tag in self.tags.iter().filter(|t| !t.is_empty()) {
            pairs.push(("tags", tag.clone()));
        }
        let scalars = [
            ("author", &self.author),
            ("pricing_model", &self.pricing_model),
            ("query", &self.query),
        ];
        for (key, value) in scalars {
            if let Some(value) = value.as_ref().filter(|v| !v.is_empty()) {
                pairs.push((key, value.clone()));
            }
        }
        pairs
    }
}
