// State management module
// Handles the agent store, its persistence, and derived views

pub mod events;
pub mod models;
pub mod persistence;
pub mod store;
pub mod views;

pub use events::StoreEvent;
pub use models::{Agent, AgentId, ApiKey, NewAgent, User};
pub use persistence::PersistenceError;
pub use store::{AgentStore, SharedStore, StoreSnapshot};
