//! Deferred assistant replies
//!
//! Each reply is a tokio task that sleeps for the configured delay and then
//! appends the reply through [`AgentStore::append_reply`]. Tasks are tracked
//! per agent so deleting an agent can cancel everything still pending for it.
//!
//! [`AgentStore::append_reply`]: crate::state::AgentStore::append_reply

use super::responder::simulated_reply;
use crate::state::{Agent, AgentId, SharedStore};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use tokio::task::AbortHandle;
use tracing::{debug, error, info};

type PendingReplies = HashMap<AgentId, HashMap<u64, AbortHandle>>;

/// Schedules and cancels simulated replies
#[derive(Debug)]
pub struct ReplyScheduler {
    delay: Duration,
    pending: Arc<Mutex<PendingReplies>>,
    next_task: AtomicU64,
}

impl ReplyScheduler {
    /// Create a scheduler that delivers replies after `delay`
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            pending: Arc::new(Mutex::new(HashMap::new())),
            next_task: AtomicU64::new(0),
        }
    }

    /// Schedule the reply `agent` gives to `input`
    ///
    /// The reply text is computed now from the profile passed in. Must be
    /// called from within a tokio runtime.
    pub fn schedule(&self, store: SharedStore, agent: &Agent, input: &str) -> u64 {
        let reply = simulated_reply(input, agent);
        let agent_id = agent.id.clone();
        let task_id = self.next_task.fetch_add(1, Ordering::Relaxed);
        let delay = self.delay;
        let pending = Arc::clone(&self.pending);

        // Hold the lock across spawn so the task cannot forget itself before
        // it has been registered
        let mut guard = lock(&self.pending);
        let handle = tokio::spawn({
            let agent_id = agent_id.clone();
            async move {
                tokio::time::sleep(delay).await;
                deliver(&store, &agent_id, reply).await;
                forget(&pending, &agent_id, task_id);
            }
        });
        guard
            .entry(agent_id.clone())
            .or_default()
            .insert(task_id, handle.abort_handle());

        debug!(
            agent_id = %agent_id,
            task_id,
            delay_ms = delay.as_millis(),
            "Scheduled reply"
        );
        task_id
    }

    /// Abort every pending reply for `agent_id`; returns how many were aborted
    pub fn cancel(&self, agent_id: &str) -> usize {
        let Some(tasks) = lock(&self.pending).remove(agent_id) else {
            return 0;
        };
        for handle in tasks.values() {
            handle.abort();
        }
        if !tasks.is_empty() {
            info!(agent_id = %agent_id, cancelled = tasks.len(), "Cancelled pending replies");
        }
        tasks.len()
    }

    /// Number of replies still pending for `agent_id`
    pub fn pending(&self, agent_id: &str) -> usize {
        lock(&self.pending).get(agent_id).map_or(0, HashMap::len)
    }
}

impl Drop for ReplyScheduler {
    fn drop(&mut self) {
        for handle in lock(&self.pending).values().flat_map(HashMap::values) {
            handle.abort();
        }
    }
}

async fn deliver(store: &SharedStore, agent_id: &str, reply: String) {
    let mut store = store.write().await;
    match store.append_reply(agent_id, reply) {
        Ok(Some(message)) => {
            debug!(agent_id = %agent_id, message_id = %message.id, "Delivered reply")
        }
        Ok(None) => info!(agent_id = %agent_id, "Agent deleted before reply, dropping it"),
        Err(e) => error!(agent_id = %agent_id, error = %e, "Failed to persist reply"),
    }
}

fn forget(pending: &Mutex<PendingReplies>, agent_id: &str, task_id: u64) {
    let mut pending = lock(pending);
    if let Some(tasks) = pending.get_mut(agent_id) {
        tasks.remove(&task_id);
        if tasks.is_empty() {
            pending.remove(agent_id);
        }
    }
}

fn lock(pending: &Mutex<PendingReplies>) -> MutexGuard<'_, PendingReplies> {
    // The map stays consistent even if a holder panicked
    pending.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}
