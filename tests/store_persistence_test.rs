//! Integration tests for store persistence on disk
//!
//! These tests verify:
//! 1. Whole-collection round trips through the file backend
//! 2. Independent fallback of each slot when a blob is corrupt
//! 3. Compatibility with camelCase blobs written by earlier clients

use agent_hub::chat::MessageRole;
use agent_hub::state::{AgentStore, NewAgent, User};
use agent_hub::storage::{FileStorage, KeyValueStorage};
use std::sync::Arc;
use tempfile::TempDir;

fn open_store(dir: &TempDir) -> AgentStore {
    let storage = FileStorage::new(dir.path()).unwrap();
    AgentStore::load(Arc::new(storage))
}

fn new_agent(name: &str, category: &str) -> NewAgent {
    NewAgent {
        name: name.to_string(),
        description: format!("{} agent", name),
        model: "claude-3-sonnet".to_string(),
        category: category.to_string(),
        instructions: "Answer in one paragraph".to_string(),
        created_by: "Demo User".to_string(),
    }
}

#[test]
fn test_agents_round_trip_field_for_field() {
    let dir = TempDir::new().unwrap();
    let (before, published_id) = {
        let mut store = open_store(&dir);
        let draft = store.create_agent(new_agent("Draft", "Other")).unwrap();
        let published = store.create_agent(new_agent("Public", "Coding")).unwrap();
        store.publish_agent(&published).unwrap();
        store.add_message(&draft, "hello", MessageRole::User).unwrap();
        store
            .add_message(&draft, "Hello! I'm Draft", MessageRole::Assistant)
            .unwrap();
        (store.snapshot(), published)
    };

    let reloaded = open_store(&dir).snapshot();
    assert_eq!(reloaded.agents, before.agents);
    assert_eq!(reloaded.conversations, before.conversations);
    assert_eq!(reloaded.user, before.user);

    let public = reloaded
        .agents
        .iter()
        .find(|a| a.id == published_id)
        .unwrap();
    assert!(public.published);
}

#[test]
fn test_corrupt_slot_does_not_affect_others() {
    let dir = TempDir::new().unwrap();
    let agent_id = {
        let mut store = open_store(&dir);
        let id = store.create_agent(new_agent("Bot", "Other")).unwrap();
        store.add_message(&id, "hi", MessageRole::User).unwrap();
        store.update_api_key("cohere", "co-key").unwrap();
        id
    };

    let storage = FileStorage::new(dir.path()).unwrap();
    storage.set("agents", "[{\"id\": 42").unwrap();

    let store = open_store(&dir);
    assert!(store.agents().is_empty());
    assert_eq!(store.messages(&agent_id).len(), 1);
    assert!(store.user().has_api_key("cohere"));
}

#[test]
fn test_missing_slots_use_defaults() {
    let dir = TempDir::new().unwrap();
    let store = open_store(&dir);
    assert!(store.agents().is_empty());
    assert!(store.conversations().is_empty());
    assert_eq!(store.user(), &User::default());
}

#[test]
fn test_loads_camel_case_blobs() {
    let dir = TempDir::new().unwrap();
    let storage = FileStorage::new(dir.path()).unwrap();
    storage
        .set(
            "agents",
            r#"[{"id":"k3j9x2a","name":"Bot","description":"helps code","model":"gpt-4",
                "createdBy":"Demo User","createdAt":"2024-05-01T12:00:00.000Z",
                "published":true,"category":"Coding","instructions":"Be terse"}]"#,
        )
        .unwrap();
    storage
        .set(
            "conversations",
            r#"{"k3j9x2a":[{"id":"m1","agentId":"k3j9x2a","content":"hi","role":"user",
                "timestamp":"2024-05-01T12:01:00.000Z","attachments":[]}]}"#,
        )
        .unwrap();
    storage
        .set(
            "user",
            r#"{"name":"Demo User","email":"user@example.com",
                "apiKeys":[{"provider":"openai","key":"sk-1"}]}"#,
        )
        .unwrap();

    let store = open_store(&dir);
    let agent = store.agent("k3j9x2a").unwrap();
    assert_eq!(agent.category, "Coding");
    assert!(agent.published);
    assert_eq!(store.messages("k3j9x2a")[0].role, MessageRole::User);
    assert!(store.user().has_api_key("openai"));
}

#[test]
fn test_delete_rewrites_both_slots() {
    let dir = TempDir::new().unwrap();
    let id = {
        let mut store = open_store(&dir);
        let id = store.create_agent(new_agent("Bot", "Other")).unwrap();
        store.add_message(&id, "hi", MessageRole::User).unwrap();
        store.delete_agent(&id).unwrap();
        id
    };

    let store = open_store(&dir);
    assert!(store.agent(&id).is_none());
    assert!(!store.conversations().contains_key(&id));
}
