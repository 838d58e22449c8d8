//! Input validation
//!
//! Checks run before calling the store. Failures are meant to be shown to
//! the user; the store never sees invalid input from these paths.

use crate::catalog;
use crate::state::NewAgent;
use serde::Serialize;
use std::collections::BTreeMap;
use thiserror::Error;

/// Per-field validation messages
#[derive(Error, Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[error("{}", join_messages(.fields))]
pub struct ValidationErrors {
    /// Field name -> message
    pub fields: BTreeMap<String, String>,
}

impl ValidationErrors {
    /// Record a message for `field`
    pub fn add(&mut self, field: &str, message: &str) {
        self.fields.insert(field.to_string(), message.to_string());
    }

    /// Whether no field failed
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Message recorded for `field`
    pub fn get(&self, field: &str) -> Option<&str> {
        self.fields.get(field).map(String::as_str)
    }

    fn into_result(self) -> Result<(), ValidationErrors> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(self)
        }
    }
}

fn join_messages(fields: &BTreeMap<String, String>) -> String {
    fields
        .values()
        .map(String::as_str)
        .collect::<Vec<_>>()
        .join("; ")
}

/// Problems with an API key entered by the user
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ApiKeyError {
    /// Nothing was entered
    #[error("API key cannot be empty")]
    Empty,
    /// The key does not have the provider's prefix
    #[error("Invalid {provider} API key format")]
    InvalidFormat {
        /// Display name of the provider
        provider: String,
    },
}

/// Check the required agent fields
pub fn validate_new_agent(agent: &NewAgent) -> Result<(), ValidationErrors> {
    let mut errors = ValidationErrors::default();
    if agent.name.trim().is_empty() {
        errors.add("name", "Name is required");
    }
    if agent.description.trim().is_empty() {
        errors.add("description", "Description is required");
    }
    if agent.instructions.trim().is_empty() {
        errors.add("instructions", "Instructions are required");
    }
    errors.into_result()
}

/// Check a key against the provider's format rules
///
/// Providers without a known prefix only need a non-empty key.
pub fn validate_api_key(provider: &str, key: &str) -> Result<(), ApiKeyError> {
    if key.is_empty() {
        return Err(ApiKeyError::Empty);
    }
    if let Some(known) = catalog::provider(provider) {
        if let Some(prefix) = known.key_prefix {
            if !key.starts_with(prefix) {
                return Err(ApiKeyError::InvalidFormat {
                    provider: known.name.to_string(),
                });
            }
        }
    }
    Ok(())
}

/// Reject blank chat input
pub fn validate_chat_message(content: &str) -> Result<(), ValidationErrors> {
    let mut errors = ValidationErrors::default();
    if content.trim().is_empty() {
        errors.add("content", "Message cannot be empty");
    }
    errors.into_result()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn draft() -> NewAgent {
        NewAgent {
            name: "Bot".to_string(),
            description: "helps".to_string(),
            model: "gpt-4".to_string(),
            category: "Other".to_string(),
            instructions: "Be kind".to_string(),
            created_by: "Demo User".to_string(),
        }
    }

    #[test]
    fn test_valid_agent() {
        assert!(validate_new_agent(&draft()).is_ok());
    }

    #[test]
    fn test_blank_fields_reported_per_field() {
        let mut agent = draft();
        agent.name = "   ".to_string();
        agent.instructions = String::new();

        let errors = validate_new_agent(&agent).unwrap_err();
        assert_eq!(errors.get("name"), Some("Name is required"));
        assert_eq!(errors.get("instructions"), Some("Instructions are required"));
        assert_eq!(errors.get("description"), None);
        assert_eq!(
            errors.to_string(),
            "Instructions are required; Name is required"
        );
    }

    #[test]
    fn test_api_key_rules() {
        assert_eq!(validate_api_key("openai", ""), Err(ApiKeyError::Empty));
        assert!(validate_api_key("openai", "sk-abc").is_ok());
        assert_eq!(
            validate_api_key("openai", "abc").unwrap_err().to_string(),
            "Invalid OpenAI API key format"
        );
        assert!(validate_api_key("anthropic", "sk-ant-abc").is_ok());
        assert_eq!(
            validate_api_key("anthropic", "sk-abc").unwrap_err().to_string(),
            "Invalid Anthropic API key format"
        );
        assert!(validate_api_key("cohere", "anything").is_ok());
        assert!(validate_api_key("custom", "anything").is_ok());
    }

    #[test]
    fn test_chat_message_rules() {
        assert!(validate_chat_message("hi").is_ok());
        assert!(validate_chat_message(" \n\t").is_err());
    }
}
