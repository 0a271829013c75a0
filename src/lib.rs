//! Agent Console
//!
//! Client for the agent marketplace REST service: an HTTP client wrapper,
//! a centralized state store with getters, mutations and actions, and a
//! view router with an authentication guard.
//! The GUI binary lives in `src/main.rs`.

pub mod api;
pub mod config;
pub mod error;
pub mod router;
/// Application state store
///
/// Holds the session, agent and execution data, and the asynchronous
/// actions that keep it in sync with the backend.
pub mod state;
pub mod storage;
pub mod ui;
