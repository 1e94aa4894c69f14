//! Session handling and terminal interface for docchat

mod app;
mod session;
pub mod ui;

#[cfg(test)]
mod tests;

pub use app::{Action, App, Outcome, parse_action};
pub use session::{GeminiHandleFactory, HandleFactory, HandleKey, HandleRegistry, SessionState};

// Re-export core types
pub use docchat_core::{Error, Result};
