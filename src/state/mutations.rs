// State mutations
// The only way state changes: one total, synchronous update per field

use super::app_state::{GlobalError, State, User};
use crate::api::{Agent, Execution};

/// A synchronous state transition
///
/// Every variant replaces its field wholesale; nothing merges or appends.
#[derive(Debug, Clone, PartialEq)]
pub enum Mutation {
    /// Also persists (or removes) the key and installs (or clears) the header
    SetApiKey(String),
    SetUser(Option<User>),
    SetAgents(Vec<Agent>),
    SetAgentDetail(Option<Agent>),
    SetExecutions(Vec<Execution>),
    SetExecutionDetail(Option<Execution>),
    SetError(Option<GlobalError>),
    ClearError,
    /// A request went in flight
    RequestStarted,
    /// A request settled, successfully or not
    RequestSettled,
}

impl Mutation {
    /// Stable name for logs and the activity panel
    pub fn name(&self) -> &'static str {
        match self {
            Mutation::SetApiKey(_) => "SET_API_KEY",
            Mutation::SetUser(_) => "SET_USER",
            Mutation::SetAgents(_) => "SET_AGENTS",
            Mutation::SetAgentDetail(_) => "SET_AGENT_DETAIL",
            Mutation::SetExecutions(_) => "SET_EXECUTIONS",
            Mutation::SetExecutionDetail(_) => "SET_EXECUTION_DETAIL",
            Mutation::SetError(_) => "SET_ERROR",
            Mutation::ClearError => "CLEAR_ERROR",
            Mutation::RequestStarted => "REQUEST_STARTED",
            Mutation::RequestSettled => "REQUEST_SETTLED",
        }
    }

    /// One-line description of the payload, never including the key itself
    pub fn summary(&self) -> String {
        match self {
            Mutation::SetApiKey(key) if key.is_empty() => "cleared".to_string(),
            Mutation::SetApiKey(_) => "set".to_string(),
            Mutation::SetUser(Some(user)) => format!("{} ({})", user.id, user.role.as_str()),
            Mutation::SetAgents(agents) => format!("{} agents", agents.len()),
            Mutation::SetAgentDetail(Some(agent)) => agent.id.clone(),
            Mutation::SetExecutions(executions) => format!("{} executions", executions.len()),
            Mutation::SetExecutionDetail(Some(execution)) => execution.id.clone(),
            Mutation::SetError(Some(error)) => error.message.clone(),
            Mutation::SetUser(None)
            | Mutation::SetAgentDetail(None)
            | Mutation::SetExecutionDetail(None)
            | Mutation::SetError(None) => "none".to_string(),
            Mutation::ClearError | Mutation::RequestStarted | Mutation::RequestSettled => {
                String::new()
            }
        }
    }
}

impl State {
    /// Apply a mutation to the in-memory state
    ///
    /// Side effects of [`Mutation::SetApiKey`] (storage, header) are the
    /// store's job; this only touches fields.
    pub fn apply(&mut self, mutation: &Mutation) {
        match mutation {
            Mutation::SetApiKey(key) => self.api_key = key.clone(),
            Mutation::SetUser(user) => self.user = user.clone(),
            Mutation::SetAgents(agents) => self.agents = agents.clone(),
            Mutation::SetAgentDetail(agent) => self.agent_detail = agent.clone(),
            Mutation::SetExecutions(executions) => self.executions = executions.clone(),
            Mutation::SetExecutionDetail(execution) => {
                self.execution_detail = execution.clone()
            }
            Mutation::SetError(error) => self.global_error = error.clone(),
            Mutation::ClearError => self.global_error = None,
            Mutation::RequestStarted => self.in_flight += 1,
            Mutation::RequestSettled => self.in_flight = self.in_flight.saturating_sub(1),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::Role;

    #[test]
    fn test_set_agents_replaces() {
        let mut state = State::default();
        state.apply(&Mutation::SetAgents(vec![Agent::new("a-1"), Agent::new("a-2")]));
        state.apply(&Mutation::SetAgents(vec![Agent::new("a-3")]));
        let ids: Vec<_> = state.agents.iter().map(|a| a.id.as_str()).collect();
        assert_eq!(ids, vec!["a-3"]);
    }

    #[test]
    fn test_detail_replaced_wholesale() {
        let mut state = State::default();
        state.apply(&Mutation::SetAgentDetail(Some(
            Agent::new("a-1").with_field("name", "Old").with_field("tags", vec!["x"]),
        )));
        state.apply(&Mutation::SetAgentDetail(Some(
            Agent::new("a-1").with_field("name", "New"),
        )));
        let detail = state.agent_detail.as_ref().unwrap();
        assert_eq!(detail.name(), Some("New"));
        assert!(detail.tags().is_empty());

        state.apply(&Mutation::SetAgentDetail(None));
        assert!(state.agent_detail.is_none());
    }

    #[test]
    fn test_error_overwrites_and_clears() {
        let mut state = State::default();
        state.apply(&Mutation::SetError(Some(GlobalError::new("first", "a"))));
        state.apply(&Mutation::SetError(Some(GlobalError::new("second", "b"))));
        assert_eq!(state.global_error.as_ref().unwrap().message, "second");
        state.apply(&Mutation::ClearError);
        assert!(state.global_error.is_none());
    }

    #[test]
    fn test_loading_is_counted() {
        let mut state = State::default();
        state.apply(&Mutation::RequestStarted);
        state.apply(&Mutation::RequestStarted);
        state.apply(&Mutation::RequestSettled);
        assert!(state.loading());
        state.apply(&Mutation::RequestSettled);
        assert!(!state.loading());
        // An unmatched settle never underflows
        state.apply(&Mutation::RequestSettled);
        assert_eq!(state.in_flight, 0);
    }

    #[test]
    fn test_summary_hides_api_key() {
        let summary = Mutation::SetApiKey("secret".to_string()).summary();
        assert!(!summary.contains("secret"));
        assert_eq!(Mutation::SetApiKey(String::new()).summary(), "cleared");

        let user = User {
            id: "u".to_string(),
            role: Role::Admin,
        };
        assert_eq!(Mutation::SetUser(Some(user)).summary(), "u (admin)");
        assert_eq!(Mutation::SetAgents(vec![]).name(), "SET_AGENTS");
    }
}
