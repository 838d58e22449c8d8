//! Agent store
//!
//! The single source of truth for agents, conversations and the user profile.
//! Every mutation writes the whole affected collection to its storage slot
//! before it is committed in memory, so a failed write leaves the snapshot as
//! it was.

use super::events::StoreEvent;
use super::models::{Agent, AgentId, ApiKey, NewAgent, User};
use super::persistence::{
    load_slot, save_slot, PersistenceError, AGENTS_SLOT, CONVERSATIONS_SLOT, USER_SLOT,
};
use crate::chat::{Conversations, Message, MessageRole};
use crate::storage::KeyValueStorage;
use chrono::Utc;
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::{broadcast, RwLock};
use tracing::{debug, error, info};

/// Store shared between request handlers and reply tasks
pub type SharedStore = Arc<RwLock<AgentStore>>;

const EVENT_CAPACITY: usize = 256;

/// Immutable copy of the store contents
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct StoreSnapshot {
    /// All agents in creation order
    pub agents: Vec<Agent>,
    /// Agent id -> messages
    pub conversations: Conversations,
    /// The local user
    pub user: User,
}

/// Canonical in-memory state backed by a key/value storage
pub struct AgentStore {
    storage: Arc<dyn KeyValueStorage>,
    agents: Vec<Agent>,
    conversations: Conversations,
    user: User,
    events: broadcast::Sender<StoreEvent>,
}

impl std::fmt::Debug for AgentStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AgentStore")
            .field("agents", &self.agents.len())
            .field("conversations", &self.conversations.len())
            .field("user", &self.user.name)
            .finish()
    }
}

impl AgentStore {
    /// Load the store from `storage`
    ///
    /// Each slot is loaded independently; a missing or corrupt slot falls back
    /// to its default without affecting the others.
    pub fn load(storage: Arc<dyn KeyValueStorage>) -> Self {
        let agents: Vec<Agent> = load_slot(storage.as_ref(), AGENTS_SLOT);
        let conversations: Conversations = load_slot(storage.as_ref(), CONVERSATIONS_SLOT);
        let user: User = load_slot(storage.as_ref(), USER_SLOT);
        let (events, _) = broadcast::channel(EVENT_CAPACITY);

        info!(
            agents = agents.len(),
            conversations = conversations.len(),
            user = %user.name,
            "Agent store loaded"
        );

        Self {
            storage,
            agents,
            conversations,
            user,
            events,
        }
    }

    /// Wrap the store for sharing across tasks
    pub fn into_shared(self) -> SharedStore {
        Arc::new(RwLock::new(self))
    }

    /// All agents in creation order
    pub fn agents(&self) -> &[Agent] {
        &self.agents
    }

    /// Agent id -> messages
    pub fn conversations(&self) -> &Conversations {
        &self.conversations
    }

    /// The local user
    pub fn user(&self) -> &User {
        &self.user
    }

    /// Get an agent by ID
    pub fn agent(&self, id: &str) -> Option<&Agent> {
        self.agents.iter().find(|a| a.id == id)
    }

    /// Messages of one agent's conversation; empty when there is none
    pub fn messages(&self, agent_id: &str) -> &[Message] {
        self.conversations
            .get(agent_id)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Copy of the current contents
    pub fn snapshot(&self) -> StoreSnapshot {
        StoreSnapshot {
            agents: self.agents.clone(),
            conversations: self.conversations.clone(),
            user: self.user.clone(),
        }
    }

    /// Receive an event for every committed mutation
    pub fn subscribe(&self) -> broadcast::Receiver<StoreEvent> {
        self.events.subscribe()
    }

    /// Append a new, unpublished agent and return its id
    pub fn create_agent(&mut self, new_agent: NewAgent) -> Result<AgentId, PersistenceError> {
        let mut id = Agent::generate_id();
        while self.agent(&id).is_some() {
            id = Agent::generate_id();
        }

        let agent = new_agent.into_agent(id.clone(), Utc::now());
        let mut next = self.agents.clone();
        next.push(agent);
        self.commit_agents(next)?;

        info!(agent_id = %id, "Created agent");
        self.emit(StoreEvent::AgentCreated {
            agent_id: id.clone(),
        });
        Ok(id)
    }

    /// Replace the agent with the same id
    ///
    /// `createdAt` is kept from the stored record and a published agent stays
    /// published. Returns `false` when no agent has that id or nothing changed.
    pub fn update_agent(&mut self, agent: Agent) -> Result<bool, PersistenceError> {
        let Some(pos) = self.position(&agent.id) else {
            debug!(agent_id = %agent.id, "Update ignored, agent not found");
            return Ok(false);
        };

        let existing = &self.agents[pos];
        let merged = Agent {
            created_at: existing.created_at,
            published: existing.published || agent.published,
            ..agent
        };
        if merged == *existing {
            return Ok(false);
        }

        let agent_id = merged.id.clone();
        let mut next = self.agents.clone();
        next[pos] = merged;
        self.commit_agents(next)?;

        debug!(agent_id = %agent_id, "Updated agent");
        self.emit(StoreEvent::AgentUpdated { agent_id });
        Ok(true)
    }

    /// Remove an agent together with its whole conversation
    ///
    /// Returns `false` when neither existed.
    pub fn delete_agent(&mut self, id: &str) -> Result<bool, PersistenceError> {
        let has_agent = self.position(id).is_some();
        let has_conversation = self.conversations.contains_key(id);
        if !has_agent && !has_conversation {
            return Ok(false);
        }

        let next_agents: Option<Vec<Agent>> = has_agent
            .then(|| self.agents.iter().filter(|a| a.id != id).cloned().collect());
        let next_conversations = has_conversation.then(|| {
            let mut next = self.conversations.clone();
            next.remove(id);
            next
        });

        // Both slots are written before either is committed in memory
        let previous_agents = match &next_agents {
            Some(next) => {
                let previous = self.storage.get(AGENTS_SLOT)?;
                save_slot(self.storage.as_ref(), AGENTS_SLOT, next)?;
                Some(previous)
            }
            None => None,
        };
        if let Some(next) = &next_conversations {
            if let Err(e) = save_slot(self.storage.as_ref(), CONVERSATIONS_SLOT, next) {
                if let Some(previous) = previous_agents {
                    self.restore_slot(AGENTS_SLOT, previous);
                }
                return Err(e);
            }
        }

        if let Some(next) = next_agents {
            self.agents = next;
        }
        if let Some(next) = next_conversations {
            self.conversations = next;
        }

        info!(agent_id = %id, "Deleted agent");
        self.emit(StoreEvent::AgentDeleted {
            agent_id: id.to_string(),
        });
        Ok(true)
    }

    /// Make an agent visible in the explorer
    ///
    /// Returns `false` when the agent is missing or already published.
    pub fn publish_agent(&mut self, id: &str) -> Result<bool, PersistenceError> {
        let Some(pos) = self.position(id) else {
            return Ok(false);
        };
        if self.agents[pos].published {
            return Ok(false);
        }

        let mut next = self.agents.clone();
        next[pos].published = true;
        self.commit_agents(next)?;

        info!(agent_id = %id, "Published agent");
        self.emit(StoreEvent::AgentPublished {
            agent_id: id.to_string(),
        });
        Ok(true)
    }

    /// Append a message to an agent's conversation, creating it if needed
    ///
    /// The agent id is not checked against the agent list. Timestamps never
    /// decrease within one conversation.
    pub fn add_message(
        &mut self,
        agent_id: &str,
        content: impl Into<String>,
        role: MessageRole,
    ) -> Result<Message, PersistenceError> {
        let now = Utc::now();
        let timestamp = self
            .conversations
            .get(agent_id)
            .and_then(|messages| messages.last())
            .map_or(now, |last| last.timestamp.max(now));

        let message = Message::new(agent_id.to_string(), content.into(), role, timestamp);
        let mut next = self.conversations.clone();
        next.entry(agent_id.to_string())
            .or_default()
            .push(message.clone());
        self.commit_conversations(next)?;

        debug!(agent_id = %agent_id, message_id = %message.id, role = %role, "Added message");
        self.emit(StoreEvent::MessageAdded {
            message: message.clone(),
        });
        Ok(message)
    }

    /// Append an assistant message only if the agent still exists
    ///
    /// Deferred replies go through here so a deleted conversation is never
    /// recreated.
    pub fn append_reply(
        &mut self,
        agent_id: &str,
        content: impl Into<String>,
    ) -> Result<Option<Message>, PersistenceError> {
        if self.agent(agent_id).is_none() {
            debug!(agent_id = %agent_id, "Dropping reply for missing agent");
            return Ok(None);
        }
        self.add_message(agent_id, content, MessageRole::Assistant)
            .map(Some)
    }

    /// Store `key` for `provider`, replacing any existing key for it
    pub fn update_api_key(&mut self, provider: &str, key: &str) -> Result<(), PersistenceError> {
        let mut next = self.user.clone();
        next.api_keys.retain(|k| k.provider != provider);
        next.api_keys.push(ApiKey {
            provider: provider.to_string(),
            key: key.to_string(),
        });
        self.commit_user(next)?;

        info!(provider = %provider, "Saved API key");
        self.emit(StoreEvent::ProfileUpdated);
        Ok(())
    }

    /// Remove the key for `provider`; returns `false` if there was none
    pub fn remove_api_key(&mut self, provider: &str) -> Result<bool, PersistenceError> {
        if !self.user.has_api_key(provider) {
            return Ok(false);
        }

        let mut next = self.user.clone();
        next.api_keys.retain(|k| k.provider != provider);
        self.commit_user(next)?;

        info!(provider = %provider, "Removed API key");
        self.emit(StoreEvent::ProfileUpdated);
        Ok(true)
    }

    /// Replace the user's name and email, keeping stored keys
    pub fn update_profile(&mut self, name: &str, email: &str) -> Result<(), PersistenceError> {
        let next = User {
            name: name.to_string(),
            email: email.to_string(),
            api_keys: self.user.api_keys.clone(),
        };
        self.commit_user(next)?;

        self.emit(StoreEvent::ProfileUpdated);
        Ok(())
    }

    fn position(&self, id: &str) -> Option<usize> {
        self.agents.iter().position(|a| a.id == id)
    }

    fn commit_agents(&mut self, next: Vec<Agent>) -> Result<(), PersistenceError> {
        save_slot(self.storage.as_ref(), AGENTS_SLOT, &next)?;
        self.agents = next;
        Ok(())
    }

    fn commit_conversations(&mut self, next: Conversations) -> Result<(), PersistenceError> {
        save_slot(self.storage.as_ref(), CONVERSATIONS_SLOT, &next)?;
        self.conversations = next;
        Ok(())
    }

    fn commit_user(&mut self, next: User) -> Result<(), PersistenceError> {
        save_slot(self.storage.as_ref(), USER_SLOT, &next)?;
        self.user = next;
        Ok(())
    }

    /// Put a slot back to a previously read raw value
    fn restore_slot(&self, slot: &str, previous: Option<String>) {
        let restored = match previous {
            Some(value) => self.storage.set(slot, &value),
            None => self.storage.remove(slot),
        };
        if let Err(e) = restored {
            error!(slot, error = %e, "Failed to roll back storage slot");
        }
    }

    fn emit(&self, event: StoreEvent) {
        // No subscribers is the normal case outside the API server
        let _ = self.events.send(event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStorage;
    use std::collections::HashSet;
    use std::sync::atomic::{AtomicBool, Ordering};

    fn new_agent(name: &str) -> NewAgent {
        NewAgent {
            name: name.to_string(),
            description: format!("{} description", name),
            model: "gpt-4".to_string(),
            category: "Other".to_string(),
            instructions: "Be helpful".to_string(),
            created_by: "Demo User".to_string(),
        }
    }

    fn create_test_store() -> (Arc<MemoryStorage>, AgentStore) {
        let storage = Arc::new(MemoryStorage::new());
        let store = AgentStore::load(storage.clone());
        (storage, store)
    }

    /// Storage whose writes can be switched off, for every slot or just one
    #[derive(Default)]
    struct FlakyStorage {
        inner: MemoryStorage,
        fail_writes: AtomicBool,
        only_slot: Option<&'static str>,
    }

    impl KeyValueStorage for FlakyStorage {
        fn get(&self, key: &str) -> Result<Option<String>, PersistenceError> {
            self.inner.get(key)
        }

        fn set(&self, key: &str, value: &str) -> Result<(), PersistenceError> {
            let targeted = self.only_slot.map_or(true, |slot| slot == key);
            if targeted && self.fail_writes.load(Ordering::SeqCst) {
                return Err(PersistenceError::Unavailable("disk full".to_string()));
            }
            self.inner.set(key, value)
        }

        fn remove(&self, key: &str) -> Result<(), PersistenceError> {
            self.inner.remove(key)
        }
    }

    #[test]
    fn test_create_agent_ids_unique_and_unpublished() {
        let (_, mut store) = create_test_store();
        let mut ids = HashSet::new();
        for i in 0..50 {
            let id = store.create_agent(new_agent(&format!("Agent {}", i))).unwrap();
            assert!(ids.insert(id));
        }
        assert_eq!(store.agents().len(), 50);
        assert!(store.agents().iter().all(|a| !a.published));
    }

    #[test]
    fn test_create_agent_persists_agents_slot() {
        let (storage, mut store) = create_test_store();
        let id = store.create_agent(new_agent("Bot")).unwrap();

        let raw = storage.get(AGENTS_SLOT).unwrap().unwrap();
        let persisted: Vec<Agent> = serde_json::from_str(&raw).unwrap();
        assert_eq!(persisted.len(), 1);
        assert_eq!(persisted[0].id, id);
    }

    #[test]
    fn test_publish_agent_idempotent() {
        let (_, mut store) = create_test_store();
        let id = store.create_agent(new_agent("Bot")).unwrap();

        assert!(store.publish_agent(&id).unwrap());
        assert!(store.agent(&id).unwrap().published);
        let before = store.snapshot();

        assert!(!store.publish_agent(&id).unwrap());
        assert_eq!(store.snapshot(), before);
    }

    #[test]
    fn test_publish_missing_agent_is_noop() {
        let (storage, mut store) = create_test_store();
        assert!(!store.publish_agent("missing").unwrap());
        assert!(storage.get(AGENTS_SLOT).unwrap().is_none());
    }

    #[test]
    fn test_update_agent_replaces_in_place() {
        let (_, mut store) = create_test_store();
        let first = store.create_agent(new_agent("First")).unwrap();
        let second = store.create_agent(new_agent("Second")).unwrap();

        let mut updated = store.agent(&first).unwrap().clone();
        updated.name = "Renamed".to_string();
        assert!(store.update_agent(updated).unwrap());

        assert_eq!(store.agents()[0].id, first);
        assert_eq!(store.agents()[0].name, "Renamed");
        assert_eq!(store.agents()[1].id, second);
    }

    #[test]
    fn test_update_agent_keeps_created_at_and_published() {
        let (_, mut store) = create_test_store();
        let id = store.create_agent(new_agent("Bot")).unwrap();
        store.publish_agent(&id).unwrap();
        let original = store.agent(&id).unwrap().clone();

        let mut tampered = original.clone();
        tampered.created_at = original.created_at - chrono::Duration::days(30);
        tampered.published = false;
        tampered.description = "new description".to_string();
        assert!(store.update_agent(tampered).unwrap());

        let stored = store.agent(&id).unwrap();
        assert_eq!(stored.created_at, original.created_at);
        assert!(stored.published);
        assert_eq!(stored.description, "new description");
    }

    #[test]
    fn test_update_missing_agent_is_noop() {
        let (_, mut store) = create_test_store();
        let id = store.create_agent(new_agent("Bot")).unwrap();
        let mut ghost = store.agent(&id).unwrap().clone();
        ghost.id = "ghost".to_string();

        assert!(!store.update_agent(ghost).unwrap());
        assert_eq!(store.agents().len(), 1);
        assert_eq!(store.agents()[0].id, id);
    }

    #[test]
    fn test_delete_agent_removes_conversation() {
        let (storage, mut store) = create_test_store();
        let id = store.create_agent(new_agent("Bot")).unwrap();
        let other = store.create_agent(new_agent("Other")).unwrap();
        store.add_message(&id, "hello", MessageRole::User).unwrap();
        store.add_message(&other, "hey", MessageRole::User).unwrap();

        assert!(store.delete_agent(&id).unwrap());
        assert!(store.agent(&id).is_none());
        assert!(!store.conversations().contains_key(&id));
        assert!(store.conversations().contains_key(&other));

        let raw = storage.get(CONVERSATIONS_SLOT).unwrap().unwrap();
        let persisted: Conversations = serde_json::from_str(&raw).unwrap();
        assert!(!persisted.contains_key(&id));
    }

    #[test]
    fn test_add_message_after_delete_recreates_conversation() {
        let (_, mut store) = create_test_store();
        let id = store.create_agent(new_agent("Bot")).unwrap();
        store.add_message(&id, "one", MessageRole::User).unwrap();
        store.add_message(&id, "two", MessageRole::Assistant).unwrap();
        store.delete_agent(&id).unwrap();

        store.add_message(&id, "three", MessageRole::User).unwrap();
        let messages = store.messages(&id);
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].content, "three");
    }

    #[test]
    fn test_delete_missing_agent_is_noop() {
        let (_, mut store) = create_test_store();
        assert!(!store.delete_agent("missing").unwrap());
    }

    #[test]
    fn test_add_message_preserves_order() {
        let (_, mut store) = create_test_store();
        let id = store.create_agent(new_agent("Bot")).unwrap();
        for i in 0..20 {
            let role = if i % 2 == 0 {
                MessageRole::User
            } else {
                MessageRole::Assistant
            };
            store.add_message(&id, format!("m{}", i), role).unwrap();
        }

        let messages = store.messages(&id);
        assert_eq!(messages.len(), 20);
        for (i, message) in messages.iter().enumerate() {
            assert_eq!(message.content, format!("m{}", i));
            assert_eq!(message.agent_id, id);
        }
        assert!(messages
            .windows(2)
            .all(|pair| pair[0].timestamp <= pair[1].timestamp));
    }

    #[test]
    fn test_add_message_accepts_unknown_agent() {
        let (_, mut store) = create_test_store();
        let message = store.add_message("nobody", "hi", MessageRole::User).unwrap();
        assert_eq!(store.messages("nobody"), &[message]);
    }

    #[test]
    fn test_append_reply_skips_missing_agent() {
        let (_, mut store) = create_test_store();
        assert!(store.append_reply("gone", "late reply").unwrap().is_none());
        assert!(!store.conversations().contains_key("gone"));

        let id = store.create_agent(new_agent("Bot")).unwrap();
        let reply = store.append_reply(&id, "on time").unwrap().unwrap();
        assert_eq!(reply.role, MessageRole::Assistant);
    }

    #[test]
    fn test_update_api_key_replaces_provider_entry() {
        let (_, mut store) = create_test_store();
        store.update_api_key("openai", "sk-first").unwrap();
        store.update_api_key("anthropic", "sk-ant-x").unwrap();
        store.update_api_key("openai", "sk-second").unwrap();

        let keys: Vec<_> = store
            .user()
            .api_keys
            .iter()
            .filter(|k| k.provider == "openai")
            .collect();
        assert_eq!(keys.len(), 1);
        assert_eq!(keys[0].key, "sk-second");
        assert_eq!(store.user().api_keys.len(), 2);
    }

    #[test]
    fn test_remove_api_key() {
        let (_, mut store) = create_test_store();
        store.update_api_key("cohere", "abc").unwrap();
        assert!(store.remove_api_key("cohere").unwrap());
        assert!(!store.remove_api_key("cohere").unwrap());
        assert!(store.user().api_keys.is_empty());
    }

    #[test]
    fn test_update_profile_keeps_keys() {
        let (_, mut store) = create_test_store();
        store.update_api_key("openai", "sk-1").unwrap();
        store.update_profile("Ada", "ada@example.com").unwrap();

        assert_eq!(store.user().name, "Ada");
        assert_eq!(store.user().email, "ada@example.com");
        assert!(store.user().has_api_key("openai"));
    }

    #[test]
    fn test_failed_write_leaves_snapshot_unchanged() {
        let storage = Arc::new(FlakyStorage::default());
        let mut store = AgentStore::load(storage.clone());
        let id = store.create_agent(new_agent("Bot")).unwrap();
        let before = store.snapshot();

        storage.fail_writes.store(true, Ordering::SeqCst);
        assert!(store.create_agent(new_agent("Lost")).is_err());
        assert!(store.publish_agent(&id).is_err());
        assert!(store.add_message(&id, "hi", MessageRole::User).is_err());
        assert!(store.update_api_key("openai", "sk-x").is_err());

        assert_eq!(store.snapshot(), before);
    }

    #[test]
    fn test_failed_conversation_write_keeps_agent_on_delete() {
        let storage = Arc::new(FlakyStorage {
            only_slot: Some(CONVERSATIONS_SLOT),
            ..Default::default()
        });
        let mut store = AgentStore::load(storage.clone());
        let id = store.create_agent(new_agent("Bot")).unwrap();
        store.add_message(&id, "hi", MessageRole::User).unwrap();
        let before = store.snapshot();
        let mut events = store.subscribe();

        storage.fail_writes.store(true, Ordering::SeqCst);
        assert!(store.delete_agent(&id).is_err());
        assert_eq!(store.snapshot(), before);
        assert!(events.try_recv().is_err());

        // The agents slot was rolled back as well
        let reloaded = AgentStore::load(storage.clone());
        assert_eq!(reloaded.snapshot(), before);

        storage.fail_writes.store(false, Ordering::SeqCst);
        assert!(store.delete_agent(&id).unwrap());
        let reloaded = AgentStore::load(storage);
        assert!(reloaded.agent(&id).is_none());
        assert!(!reloaded.conversations().contains_key(&id));
    }

    #[test]
    fn test_failed_delete_restores_absent_agents_slot() {
        let storage = Arc::new(FlakyStorage {
            only_slot: Some(CONVERSATIONS_SLOT),
            ..Default::default()
        });
        let mut store = AgentStore::load(storage.clone());
        let id = store.create_agent(new_agent("Bot")).unwrap();
        store.add_message(&id, "hi", MessageRole::User).unwrap();
        storage.inner.remove(AGENTS_SLOT).unwrap();

        storage.fail_writes.store(true, Ordering::SeqCst);
        assert!(store.delete_agent(&id).is_err());
        assert_eq!(storage.inner.get(AGENTS_SLOT).unwrap(), None);
        assert!(store.agent(&id).is_some());
    }

    #[test]
    fn test_reload_restores_everything() {
        let (storage, mut store) = create_test_store();
        let id = store.create_agent(new_agent("Bot")).unwrap();
        store.publish_agent(&id).unwrap();
        store.add_message(&id, "hello", MessageRole::User).unwrap();
        store.update_api_key("openai", "sk-1").unwrap();

        let reloaded = AgentStore::load(storage);
        assert_eq!(reloaded.snapshot(), store.snapshot());
    }

    #[tokio::test]
    async fn test_mutations_emit_events() {
        let (_, mut store) = create_test_store();
        let mut events = store.subscribe();

        let id = store.create_agent(new_agent("Bot")).unwrap();
        store.publish_agent(&id).unwrap();
        let message = store.add_message(&id, "hi", MessageRole::User).unwrap();
        store.delete_agent(&id).unwrap();

        assert_eq!(
            events.recv().await.unwrap(),
            StoreEvent::AgentCreated {
                agent_id: id.clone()
            }
        );
        assert_eq!(
            events.recv().await.unwrap(),
            StoreEvent::AgentPublished {
                agent_id: id.clone()
            }
        );
        assert_eq!(
            events.recv().await.unwrap(),
            StoreEvent::MessageAdded { message }
        );
        assert_eq!(
            events.recv().await.unwrap(),
            StoreEvent::AgentDeleted { agent_id: id }
        );
    }
}
