//! Static choices offered when creating agents and storing API keys

use serde::Serialize;

/// Model selected by default for new agents
pub const DEFAULT_MODEL: &str = "gpt-4";

/// Category selected by default for new agents
pub const DEFAULT_CATEGORY: &str = "Other";

/// A selectable target model
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ModelOption {
    /// Model identifier stored on the agent
    pub value: &'static str,
    /// Display label
    pub label: &'static str,
}

/// Models offered by the agent creator
pub const MODEL_OPTIONS: &[ModelOption] = &[
    ModelOption {
        value: "gpt-4",
        label: "GPT-4 (OpenAI)",
    },
    ModelOption {
        value: "gpt-3.5-turbo",
        label: "GPT-3.5 Turbo (OpenAI)",
    },
    ModelOption {
        value: "claude-3-opus",
        label: "Claude 3 Opus (Anthropic)",
    },
    ModelOption {
        value: "claude-3-sonnet",
        label: "Claude 3 Sonnet (Anthropic)",
    },
    ModelOption {
        value: "claude-3-haiku",
        label: "Claude 3 Haiku (Anthropic)",
    },
];

/// Categories offered by the agent creator
pub const CATEGORY_OPTIONS: &[&str] = &[
    "Productivity",
    "Education",
    "Entertainment",
    "Research",
    "Customer Support",
    "Coding",
    "Creative",
    "Other",
];

/// A model vendor whose API key the user can store
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Provider {
    /// Identifier used as the `provider` of an API key
    pub id: &'static str,
    /// Display name
    pub name: &'static str,
    /// Short description of the models it provides
    pub description: &'static str,
    /// Example key shape shown in the input
    pub placeholder: &'static str,
    /// Where to create a key
    pub website: &'static str,
    /// Required key prefix, if the provider has one
    #[serde(skip)]
    pub key_prefix: Option<&'static str>,
}

/// Providers known to the profile page
pub const PROVIDERS: &[Provider] = &[
    Provider {
        id: "openai",
        name: "OpenAI",
        description: "Provides GPT-3.5 Turbo and GPT-4 models",
        placeholder: "sk-...",
        website: "https://platform.openai.com/api-keys",
        key_prefix: Some("sk-"),
    },
    Provider {
        id: "anthropic",
        name: "Anthropic",
        description: "Provides Claude models including Claude 3",
        placeholder: "sk-ant-...",
        website: "https://console.anthropic.com/settings/keys",
        key_prefix: Some("sk-ant-"),
    },
    Provider {
        id: "cohere",
        name: "Cohere",
        description: "Provides Command models",
        placeholder: "Your Cohere API key",
        website: "https://dashboard.cohere.com/api-keys",
        key_prefix: None,
    },
];

/// Look up a provider by id
pub fn provider(id: &str) -> Option<&'static Provider> {
    PROVIDERS.iter().find(|p| p.id == id)
}
