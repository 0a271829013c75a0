// Route table
// Static mapping of path patterns to views, with per-route auth markers

use std::collections::BTreeMap;

/// Path of the login view; the guard redirects here
pub const LOGIN_PATH: &str = "/login";

/// Query parameter carrying the originally requested path
pub const REDIRECT_PARAM: &str = "redirect";

/// Named path parameters (`agentId`, `executionId`)
pub type Params = BTreeMap<String, String>;

/// Views the router can show
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum View {
    Dashboard,
    AgentList,
    AgentDetail,
    ExecutionList,
    ExecutionDetail,
    AgentRegister,
    Login,
}

impl View {
    /// Window heading for the view
    pub fn title(&self) -> &'static str {
        match self {
            View::Dashboard => "Dashboard",
            View::AgentList => "Agents",
            View::AgentDetail => "Agent Details",
            View::ExecutionList => "Executions",
            View::ExecutionDetail => "Execution Details",
            View::AgentRegister => "Register Agent",
            View::Login => "Login",
        }
    }
}

/// One entry of the route table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RouteDef {
    /// Pattern; `:name` segments are dynamic
    pub path: &'static str,
    pub name: &'static str,
    pub view: View,
    /// Navigation requires an authenticated session
    pub requires_auth: bool,
}

pub static ROUTES: [RouteDef; 7] = [
    RouteDef {
        path: "/",
        name: "Dashboard",
        view: View::Dashboard,
        requires_auth: false,
    },
    RouteDef {
        path: "/agents",
        name: "AgentList",
        view: View::AgentList,
        requires_auth: false,
    },
    RouteDef {
        path: "/agents/:agentId",
        name: "AgentDetail",
        view: View::AgentDetail,
        requires_auth: false,
    },
    RouteDef {
        path: "/agents/:agentId/executions",
        name: "ExecutionList",
        view: View::ExecutionList,
        requires_auth: true,
    },
    RouteDef {
        path: "/agents/:agentId/executions/:executionId",
        name: "ExecutionDetail",
        view: View::ExecutionDetail,
        requires_auth: true,
    },
    RouteDef {
        path: "/register-agent",
        name: "AgentRegister",
        view: View::AgentRegister,
        requires_auth: true,
    },
    RouteDef {
        path: LOGIN_PATH,
        name: "Login",
        view: View::Login,
        requires_auth: false,
    },
];

impl RouteDef {
    /// Match a path (without query) against this pattern
    ///
    /// A trailing slash is ignored. Dynamic segments must be non-empty and
    /// are percent-decoded into the params.
    pub fn matches(&self, path: &str) -> Option<Params> {
        let pattern = segments(self.path);
        let actual = segments(path);
        if pattern.len() != actual.len() {
            return None;
        }

        let mut params = Params::new();
        for (expected, segment) in pattern.iter().zip(actual) {
            match expected.strip_prefix(':') {
                Some(name) => {
                    let value = urlencoding::decode(segment)
                        .map(|decoded| decoded.into_owned())
                        .unwrap_or_else(|_| segment.to_string());
                    params.insert(name.to_string(), value);
                }
                None if *expected == segment => {}
                None => return None,
            }
        }
        Some(params)
    }
}

/// First route matching `path`, with its params
pub fn match_path(path: &str) -> Option<(&'static RouteDef, Params)> {
    ROUTES
        .iter()
        .find_map(|route| route.matches(path).map(|params| (route, params)))
}

fn segments(path: &str) -> Vec<&str> {
    path.split('/').filter(|s| !s.is_empty()).collect()
}

// Ids are percent-encoded so `/`, `?` and `#` stay inside their segment
pub fn agent_path(agent_id: &str) -> String {
    format!("/agents/{}", urlencoding::encode(agent_id))
}

pub fn executions_path(agent_id: &str) -> String {
    format!("/agents/{}/executions", urlencoding::encode(agent_id))
}

pub fn execution_path(agent_id: &str, execution_id: &str) -> String {
    format!(
        "/agents/{}/executions/{}",
        urlencoding::encode(agent_id),
        urlencoding::encode(execution_id)
    )
}
