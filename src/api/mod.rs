// API module
// HTTP client and wire types for the marketplace backend

pub mod client;
pub mod types;

pub use client::{ApiClient, HealthStatus, API_KEY_HEADER};
pub use types::{
    Agent, AgentId, AgentRegistration, AgentSearch, AgentsPage, AuthType, Capability, Execution,
    ExecutionId, ExecutionRequest, ExecutionsPage,
};
