//! View router
//!
//! Resolves paths against the static route table and runs the
//! authentication guard before every navigation. Protected routes reached
//! without a session redirect to `/login?redirect=<requested full path>`;
//! after a successful login the view forwards to [`Router::post_login_target`].

pub mod location;
pub mod routes;

pub use location::Location;
pub use routes::{
    agent_path, execution_path, executions_path, match_path, Params, RouteDef, View, LOGIN_PATH,
    REDIRECT_PARAM, ROUTES,
};

use crate::state::Store;
use thiserror::Error;

/// Navigation failures
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum NavigationError {
    /// No route matches the requested path
    #[error("No route matches {0}")]
    NotFound(String),
}

/// A resolved navigation target
#[derive(Debug, Clone, PartialEq)]
pub struct RouteMatch {
    pub route: &'static RouteDef,
    pub params: Params,
    pub location: Location,
}

impl RouteMatch {
    pub fn view(&self) -> View {
        self.route.view
    }

    /// Value of a dynamic segment, e.g. `agentId`
    pub fn param(&self, name: &str) -> Option<&str> {
        self.params.get(name).map(String::as_str)
    }

    pub fn full_path(&self) -> String {
        self.location.full_path()
    }

    /// Whether any matched record needs an authenticated session
    pub fn requires_auth(&self) -> bool {
        self.route.requires_auth
    }
}

/// Resolve a target like `/agents/1?x=y` to its route
pub fn resolve(target: &str) -> Result<RouteMatch, NavigationError> {
    let location = Location::parse(target);
    let (route, params) = match_path(&location.path)
        .ok_or_else(|| NavigationError::NotFound(location.path.clone()))?;
    Ok(RouteMatch {
        route,
        params,
        location,
    })
}

/// Outcome of the pre-navigation guard
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardDecision {
    Proceed,
    /// Go here instead
    Redirect(Location),
}

/// Decide whether navigating to `target` may proceed
pub fn guard(target: &RouteMatch, is_authenticated: bool) -> GuardDecision {
    if target.requires_auth() && !is_authenticated {
        GuardDecision::Redirect(Location::with_query(
            LOGIN_PATH,
            REDIRECT_PARAM,
            &target.full_path(),
        ))
    } else {
        GuardDecision::Proceed
    }
}

/// Result of a successful navigation
#[derive(Debug, Clone, PartialEq)]
pub enum Navigation {
    /// Arrived at the requested route
    Proceeded(RouteMatch),
    /// The guard sent us elsewhere
    Redirected {
        requested: Location,
        to: RouteMatch,
    },
}

impl Navigation {
    /// Route that is now current
    pub fn route(&self) -> &RouteMatch {
        match self {
            Navigation::Proceeded(route) => route,
            Navigation::Redirected { to, .. } => to,
        }
    }
}

/// Current route plus back-history
#[derive(Debug, Clone)]
pub struct Router {
    current: RouteMatch,
    history: Vec<RouteMatch>,
}

impl Default for Router {
    fn default() -> Self {
        Self::new()
    }
}

impl Router {
    /// Router positioned at the dashboard
    pub fn new() -> Self {
        Self {
            current: RouteMatch {
                route: &ROUTES[0],
                params: Params::new(),
                location: Location::parse("/"),
            },
            history: Vec::new(),
        }
    }

    pub fn current(&self) -> &RouteMatch {
        &self.current
    }

    /// Navigate, consulting the store's authentication getter
    pub fn push(&mut self, target: &str, store: &Store) -> Result<Navigation, NavigationError> {
        self.navigate(target, store.is_authenticated())
    }

    /// Navigate with an explicit authentication status
    ///
    /// Unknown paths fail and leave the current route untouched.
    pub fn navigate(
        &mut self,
        target: &str,
        is_authenticated: bool,
    ) -> Result<Navigation, NavigationError> {
        let requested = resolve(target)?;
        let navigation = self.run_guard(requested, is_authenticated)?;
        let previous = std::mem::replace(&mut self.current, navigation.route().clone());
        self.history.push(previous);
        Ok(navigation)
    }

    /// Return to the previous route; the guard runs again
    pub fn back(&mut self, store: &Store) -> Option<Navigation> {
        let previous = self.history.pop()?;
        match self.run_guard(previous, store.is_authenticated()) {
            Ok(navigation) => {
                self.current = navigation.route().clone();
                Some(navigation)
            }
            Err(e) => {
                tracing::warn!(error = %e, "Back navigation failed");
                None
            }
        }
    }

    pub fn can_go_back(&self) -> bool {
        !self.history.is_empty()
    }

    /// Where to go after logging in from the current location
    ///
    /// The `redirect` parameter is honoured only for internal paths that
    /// resolve to a route other than login; otherwise the dashboard.
    pub fn post_login_target(&self) -> String {
        self.current
            .location
            .query_param(REDIRECT_PARAM)
            .filter(|target| target.starts_with('/') && !target.starts_with("//"))
            .filter(|target| {
                resolve(target)
                    .map(|route| route.view() != View::Login)
                    .unwrap_or(false)
            })
            .unwrap_or("/")
            .to_string()
    }

    fn run_guard(
        &self,
        requested: RouteMatch,
        is_authenticated: bool,
    ) -> Result<Navigation, NavigationError> {
        match guard(&requested, is_authenticated) {
            GuardDecision::Proceed => {
                tracing::debug!(path = %requested.full_path(), "Navigation");
                Ok(Navigation::Proceeded(requested))
            }
            GuardDecision::Redirect(location) => {
                tracing::info!(
                    requested = %requested.full_path(),
                    redirect = %location,
                    "Navigation requires authentication"
                );
                let to = resolve(&location.full_path())?;
                Ok(Navigation::Redirected {
                    requested: requested.location,
                    to,
                })
            }
        }
    }
}
