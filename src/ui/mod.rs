// UI module
// Native console views over the store and router

pub mod components;
pub mod console;
pub mod forms;
pub mod layout;
pub mod views;

pub use components::ActivityLog;
pub use console::{Console, Outcome};
pub use layout::render_app_layout;
