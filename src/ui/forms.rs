// Form state
// Editable buffers behind the views and their conversion into API payloads

use crate::api::{Agent, AgentRegistration, AgentSearch, AuthType, Capability, ExecutionRequest};
use serde_json::{Map, Value};

/// Login view buffer
#[derive(Debug, Clone, Default)]
pub struct LoginForm {
    pub api_key: String,
    pub error: Option<String>,
    pub submitting: bool,
}

/// Agent list filters
#[derive(Debug, Clone, Default)]
pub struct SearchForm {
    pub query: String,
    /// Comma-separated
    pub tags: String,
    /// Comma-separated
    pub capabilities: String,
    pub author: String,
}

impl SearchForm {
    pub fn to_search(&self) -> AgentSearch {
        AgentSearch {
            capabilities: split_list(&self.capabilities),
            tags: split_list(&self.tags),
            author: non_empty(&self.author),
            pricing_model: None,
            query: non_empty(&self.query),
        }
    }
}

/// Registration / edit form
#[derive(Debug, Clone, Default)]
pub struct RegisterForm {
    /// Set when editing an existing agent
    pub editing: Option<String>,
    pub name: String,
    pub description: String,
    pub version: String,
    pub author: String,
    pub contact_email: String,
    pub homepage_url: String,
    pub api_endpoint: String,
    /// One capability per line: `name: description`
    pub capabilities: String,
    pub auth_type: AuthType,
    pub pricing_model: String,
    /// Comma-separated
    pub tags: String,
    pub error: Option<String>,
}

impl RegisterForm {
    /// Prefill the form from an existing agent record
    pub fn from_agent(agent: &Agent) -> Self {
        let text = |key: &str| {
            agent
                .fields
                .get(key)
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string()
        };
        let capabilities = agent
            .fields
            .get("capabilities")
            .and_then(Value::as_array)
            .map(|caps| {
                caps.iter()
                    .filter_map(|cap| {
                        let name = cap.get("name")?.as_str()?;
                        let description = cap
                            .get("description")
                            .and_then(Value::as_str)
                            .unwrap_or_default();
                        Some(format!("{}: {}", name, description))
                    })
                    .collect::<Vec<_>>()
                    .join("\n")
            })
            .unwrap_or_default();
        let auth_type = agent
            .fields
            .get("auth_type")
            .cloned()
            .and_then(|v| serde_json::from_value(v).ok())
            .unwrap_or_default();

        Self {
            editing: Some(agent.id.clone()),
            name: text("name"),
            description: text("description"),
            version: text("version"),
            author: text("author"),
            contact_email: text("contact_email"),
            homepage_url: text("homepage_url"),
            api_endpoint: text("api_endpoint"),
            capabilities,
            auth_type,
            pricing_model: text("pricing_model"),
            tags: agent.tags().join(", "),
            error: None,
        }
    }

    /// Build and validate the payload
    pub fn to_registration(&self) -> Result<AgentRegistration, String> {
        let capabilities = self
            .capabilities
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(|line| {
                let (name, description) = line.split_once(':').unwrap_or((line, ""));
                Capability {
                    name: name.trim().to_string(),
                    description: description.trim().to_string(),
                    parameters: None,
                }
            })
            .collect();

        let registration = AgentRegistration {
            name: self.name.trim().to_string(),
            description: self.description.trim().to_string(),
            version: self.version.trim().to_string(),
            author: self.author.trim().to_string(),
            contact_email: non_empty(&self.contact_email),
            homepage_url: non_empty(&self.homepage_url),
            api_endpoint: self.api_endpoint.trim().to_string(),
            capabilities,
            auth_type: self.auth_type,
            auth_details: None,
            pricing_model: non_empty(&self.pricing_model),
            pricing_details: None,
            tags: split_list(&self.tags),
        };
        registration.validate()?;
        Ok(registration)
    }
}

/// Execute-agent form: raw JSON objects typed by the user
#[derive(Debug, Clone)]
pub struct ExecuteForm {
    pub input_data: String,
    pub execution_parameters: String,
    pub error: Option<String>,
}

impl Default for ExecuteForm {
    fn default() -> Self {
        Self {
            input_data: "{\n  \"text\": \"\"\n}".to_string(),
            execution_parameters: String::new(),
            error: None,
        }
    }
}

impl ExecuteForm {
    pub fn to_request(&self, agent_id: &str) -> Result<ExecutionRequest, String> {
        let input_data = parse_object("input data", &self.input_data)?.unwrap_or_default();
        let mut request = ExecutionRequest::new(agent_id, input_data);
        request.execution_parameters =
            parse_object("execution parameters", &self.execution_parameters)?;
        Ok(request)
    }
}

// Empty text is "not provided"; anything else must be a JSON object
fn parse_object(label: &str, text: &str) -> Result<Option<Map<String, Value>>, String> {
    if text.trim().is_empty() {
        return Ok(None);
    }
    match serde_json::from_str::<Value>(text) {
        Ok(Value::Object(map)) => Ok(Some(map)),
        Ok(_) => Err(format!("The {} must be a JSON object", label)),
        Err(e) => Err(format!("Invalid JSON in {}: {}", label, e)),
    }
}

fn split_list(text: &str) -> Vec<String> {
    text.split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(str::to_string)
        .collect()
}

fn non_empty(text: &str) -> Option<String> {
    let text = text.trim();
    (!text.is_empty()).then(|| text.to_string())
}
