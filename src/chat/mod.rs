//! Chat module
//!
//! Messages, simulated replies, and the deferred delivery of those replies.

pub mod models;
pub mod responder;
pub mod scheduler;
pub mod service;

pub use models::{Conversations, Message, MessageRole};
pub use responder::{simulated_reply, ReplyRule};
pub use scheduler::ReplyScheduler;
