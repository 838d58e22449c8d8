//! Simulated assistant replies
//!
//! No model is called. A reply is picked by keyword rules evaluated in order
//! on the lowercased input; the first rule that matches wins.

use crate::state::Agent;

/// Keyword rule that produced a reply
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplyRule {
    /// Input contains "hello" or "hi"
    Greeting,
    /// Input contains "help"
    Help,
    /// Input contains "who" together with "you" or "your"
    Identity,
    /// Nothing matched
    Fallback,
}

const FALLBACK_REPLY: &str =
    "I'm an AI assistant and I'm here to help you. This is a simulated response since this is a frontend-only demo.";

/// Pick the rule for `input`
pub fn classify(input: &str) -> ReplyRule {
    let input = input.to_lowercase();
    if input.contains("hello") || input.contains("hi") {
        ReplyRule::Greeting
    } else if input.contains("help") {
        ReplyRule::Help
    } else if input.contains("who") && (input.contains("you") || input.contains("your")) {
        ReplyRule::Identity
    } else {
        ReplyRule::Fallback
    }
}

/// Build the canned reply `agent` gives to `input`
pub fn simulated_reply(input: &str, agent: &Agent) -> String {
    match classify(input) {
        ReplyRule::Greeting => format!(
            "Hello! I'm {}, your AI assistant. How can I help you today?",
            agent.name
        ),
        ReplyRule::Help => format!(
            "I'd be happy to help! I'm {}, designed to {}",
            agent.name, agent.description
        ),
        ReplyRule::Identity => format!(
            "I'm {}, an AI assistant designed to {}. I'm powered by {}.",
            agent.name, agent.description, agent.model
        ),
        ReplyRule::Fallback => FALLBACK_REPLY.to_string(),
    }
}
