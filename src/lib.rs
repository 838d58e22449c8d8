//! Agent Hub Library
//!
//! A local directory and chat hub for user-defined agents. The agent store
//! keeps agents, conversations and the user profile in key/value storage;
//! the API module exposes it to a front end.
//! The server binary is in `src/main.rs`.

pub mod api;
pub mod catalog;
pub mod chat;
pub mod config;
pub mod error;
/// Application state management
///
/// Handles the agent store, its persistence, and derived views.
pub mod state;
pub mod storage;
pub mod validation;
pub mod websocket;

pub use api::AppContext;
pub use config::Config;
pub use error::AppError;
pub use state::{AgentStore, SharedStore};
