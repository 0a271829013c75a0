//! Console controller
//!
//! Glue between the egui frame loop and the async store. Views call the
//! methods here; async work runs on the tokio runtime and reports back
//! through an outcome channel drained once per frame by [`Console::process`].

use super::components::ActivityLog;
use super::forms::{ExecuteForm, LoginForm, RegisterForm, SearchForm};
use crate::api::Agent;
use crate::router::{agent_path, execution_path, Navigation, RouteMatch, Router, View};
use crate::state::{Store, SubscriptionId, User};
use eframe::egui;
use serde_json::Value;
use std::future::Future;
use std::sync::{Arc, Mutex, PoisonError};
use tokio::runtime::Handle;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};

/// Result of a background action, handled on the UI thread
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    LoggedIn(User),
    LoginFailed(String),
    /// Registration or edit succeeded; `agent_id` when the backend returned one
    AgentSaved { agent_id: Option<String> },
    AgentDeleted,
    Executed {
        agent_id: String,
        execution_id: String,
    },
    /// The action failed; the store already recorded the global error
    Failed(String),
}

// Sends outcomes and wakes the frame loop
#[derive(Clone)]
struct Notifier {
    tx: UnboundedSender<Outcome>,
    repaint: Option<egui::Context>,
}

impl Notifier {
    fn send(&self, outcome: Outcome) {
        if self.tx.send(outcome).is_err() {
            tracing::debug!("Console closed; dropping outcome");
        }
        self.wake();
    }

    fn wake(&self) {
        if let Some(ctx) = &self.repaint {
            ctx.request_repaint();
        }
    }
}

pub struct Console {
    store: Store,
    router: Router,
    runtime: Handle,
    notifier: Notifier,
    outcomes: UnboundedReceiver<Outcome>,
    activity: Arc<Mutex<ActivityLog>>,
    subscription: SubscriptionId,
    pending_navigation: Option<String>,
    pub login: LoginForm,
    pub search: SearchForm,
    pub register: RegisterForm,
    pub execute: ExecuteForm,
    /// Transient message shown under the header
    pub notice: Option<String>,
    pub sidebar_visible: bool,
    pub activity_visible: bool,
}

impl Console {
    /// Wire the console to `store`; `repaint` wakes the GUI after each commit
    pub fn new(store: Store, runtime: Handle, repaint: Option<egui::Context>) -> Self {
        let (tx, outcomes) = mpsc::unbounded_channel();
        let notifier = Notifier { tx, repaint };
        let activity = Arc::new(Mutex::new(ActivityLog::default()));

        let log = Arc::clone(&activity);
        let waker = notifier.clone();
        let subscription = store.subscribe(move |mutation| {
            log.lock()
                .unwrap_or_else(PoisonError::into_inner)
                .record(mutation);
            waker.wake();
        });

        Self {
            store,
            router: Router::new(),
            runtime,
            notifier,
            outcomes,
            activity,
            subscription,
            pending_navigation: None,
            login: LoginForm::default(),
            search: SearchForm::default(),
            register: RegisterForm::default(),
            execute: ExecuteForm::default(),
            notice: None,
            sidebar_visible: true,
            activity_visible: true,
        }
    }

    pub fn store(&self) -> &Store {
        &self.store
    }

    pub fn route(&self) -> &RouteMatch {
        self.router.current()
    }

    pub fn can_go_back(&self) -> bool {
        self.router.can_go_back()
    }

    pub fn activity(&self) -> Arc<Mutex<ActivityLog>> {
        Arc::clone(&self.activity)
    }

    /// Run the enter hook of the initial route
    pub fn start(&mut self) {
        let route = self.router.current().clone();
        self.enter(&route);
    }

    /// Handle finished actions and deferred navigation; call once per frame
    pub fn process(&mut self) {
        while let Ok(outcome) = self.outcomes.try_recv() {
            self.handle(outcome);
        }
        if let Some(target) = self.pending_navigation.take() {
            self.navigate(&target);
        }
    }

    /// Navigate at the start of the next frame
    pub fn request_navigation(&mut self, target: impl Into<String>) {
        self.pending_navigation = Some(target.into());
    }

    /// Navigate now, running the guard and the view's enter hook
    pub fn navigate(&mut self, target: &str) {
        match self.router.push(target, &self.store) {
            Ok(navigation) => {
                if let Navigation::Redirected { requested, .. } = &navigation {
                    self.notice = Some(format!("Log in to open {}", requested));
                }
                let route = navigation.route().clone();
                self.enter(&route);
            }
            Err(e) => {
                tracing::warn!(path = target, error = %e, "Navigation failed");
                self.notice = Some(e.to_string());
            }
        }
    }

    pub fn back(&mut self) {
        if let Some(navigation) = self.router.back(&self.store) {
            let route = navigation.route().clone();
            self.enter(&route);
        }
    }

    // Load whatever the view shows
    fn enter(&mut self, route: &RouteMatch) {
        match route.view() {
            View::Dashboard => self.refresh_agents(),
            View::AgentList => self.refresh_agents(),
            View::AgentDetail => {
                if let Some(agent_id) = route.param("agentId") {
                    self.execute = ExecuteForm::default();
                    let agent_id = agent_id.to_string();
                    self.run(|store| async move {
                        store.fetch_agent_detail(&agent_id).await;
                        None
                    });
                }
            }
            View::ExecutionList => {
                if let Some(agent_id) = route.param("agentId") {
                    let agent_id = agent_id.to_string();
                    self.run(|store| async move {
                        store.fetch_executions(&agent_id).await;
                        None
                    });
                }
            }
            View::ExecutionDetail => {
                if let (Some(agent_id), Some(execution_id)) =
                    (route.param("agentId"), route.param("executionId"))
                {
                    let (agent_id, execution_id) = (agent_id.to_string(), execution_id.to_string());
                    self.run(|store| async move {
                        store.fetch_execution_detail(&agent_id, &execution_id).await;
                        None
                    });
                }
            }
            View::AgentRegister => {}
            View::Login => {
                if self.login.api_key.is_empty() {
                    self.login.api_key = self.store.api_key();
                }
                self.login.error = None;
            }
        }
    }

    // ---- view actions ----

    pub fn submit_login(&mut self) {
        if self.login.submitting {
            return;
        }
        self.login.submitting = true;
        self.login.error = None;
        let api_key = self.login.api_key.clone();
        self.run(|store| async move {
            Some(match store.login(&api_key).await {
                Ok(user) => Outcome::LoggedIn(user),
                Err(e) => Outcome::LoginFailed(e.to_string()),
            })
        });
    }

    /// Drop the session; a protected view re-runs the guard
    pub fn logout(&mut self) {
        self.store.logout();
        self.login = LoginForm::default();
        if self.route().requires_auth() {
            let path = self.route().full_path();
            self.navigate(&path);
        }
    }

    pub fn refresh_agents(&mut self) {
        let search = self.search.to_search();
        self.run(|store| async move {
            store.fetch_agents(&search).await;
            None
        });
    }

    /// Open an empty registration form
    pub fn start_registration(&mut self) {
        self.register = RegisterForm::default();
        self.request_navigation("/register-agent");
    }

    /// Open the registration form prefilled from `agent`
    pub fn start_edit(&mut self, agent: &Agent) {
        self.register = RegisterForm::from_agent(agent);
        self.request_navigation("/register-agent");
    }

    pub fn submit_registration(&mut self) {
        let registration = match self.register.to_registration() {
            Ok(registration) => registration,
            Err(message) => {
                self.register.error = Some(message);
                return;
            }
        };
        self.register.error = None;
        let editing = self.register.editing.clone();
        self.run(|store| async move {
            let saved = match &editing {
                Some(agent_id) => store.update_agent(agent_id, &registration).await,
                None => store.create_agent(&registration).await,
            };
            Some(match saved {
                Ok(response) => Outcome::AgentSaved {
                    agent_id: saved_agent_id(&response).or(editing),
                },
                Err(e) => Outcome::Failed(e.to_string()),
            })
        });
    }

    pub fn delete_agent(&mut self, agent_id: &str) {
        let agent_id = agent_id.to_string();
        self.run(|store| async move {
            Some(match store.delete_agent(&agent_id).await {
                Ok(_) => Outcome::AgentDeleted,
                Err(e) => Outcome::Failed(e.to_string()),
            })
        });
    }

    pub fn execute_agent(&mut self, agent_id: &str) {
        let request = match self.execute.to_request(agent_id) {
            Ok(request) => request,
            Err(message) => {
                self.execute.error = Some(message);
                return;
            }
        };
        self.execute.error = None;
        let agent_id = agent_id.to_string();
        self.run(|store| async move {
            Some(match store.execute_agent(&agent_id, &request).await {
                Ok(execution) => Outcome::Executed {
                    agent_id,
                    execution_id: execution.id,
                },
                Err(e) => Outcome::Failed(e.to_string()),
            })
        });
    }

    pub fn dismiss_error(&self) {
        self.store.clear_error();
    }

    fn handle(&mut self, outcome: Outcome) {
        tracing::debug!(outcome = ?outcome, "Action finished");
        match outcome {
            Outcome::LoggedIn(user) => {
                self.login = LoginForm::default();
                self.notice = Some(format!("Logged in as {} ({})", user.id, user.role.as_str()));
                let target = self.router.post_login_target();
                self.navigate(&target);
            }
            Outcome::LoginFailed(message) => {
                self.login.submitting = false;
                self.login.error = Some(message);
            }
            Outcome::AgentSaved { agent_id } => {
                self.register = RegisterForm::default();
                self.notice = Some("Agent saved".to_string());
                match agent_id {
                    Some(agent_id) => self.navigate(&agent_path(&agent_id)),
                    None => self.navigate("/agents"),
                }
            }
            Outcome::AgentDeleted => {
                self.notice = Some("Agent deleted".to_string());
                self.navigate("/agents");
            }
            Outcome::Executed {
                agent_id,
                execution_id,
            } => self.navigate(&execution_path(&agent_id, &execution_id)),
            Outcome::Failed(message) => self.notice = Some(message),
        }
    }

    // Spawn an action; a panic or cancellation goes to the global error hook
    fn run<F, Fut>(&self, action: F)
    where
        F: FnOnce(Store) -> Fut,
        Fut: Future<Output = Option<Outcome>> + Send + 'static,
    {
        let task = self.runtime.spawn(action(self.store.clone()));
        let store = self.store.clone();
        let notifier = self.notifier.clone();
        self.runtime.spawn(async move {
            match task.await {
                Ok(Some(outcome)) => notifier.send(outcome),
                Ok(None) => {}
                Err(e) => store.report_unhandled(e),
            }
        });
    }
}

// Create answers `{"agent_id", "agent": {..}}`; update only echoes the agent
fn saved_agent_id(response: &Value) -> Option<String> {
    response
        .get("agent_id")
        .or_else(|| response.pointer("/agent/id"))
        .and_then(Value::as_str)
        .map(str::to_string)
}

impl Drop for Console {
    fn drop(&mut self) {
        self.store.unsubscribe(self.subscription);
    }
}
