// State management module
// Shared store: state, getters, mutations and the actions that sync with the API

pub mod app_state;
pub mod mutations;
pub mod store;

pub use app_state::{GlobalError, Role, State, User, ADMIN_SENTINEL_KEY};
pub use mutations::Mutation;
pub use store::{Store, SubscriptionId, UNEXPECTED_ERROR_MESSAGE};
