use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::RwLock;

/// One successful generation: what the user asked and what came back.
#[derive(Debug, Clone, Serialize)]
pub struct HistoryEntry {
    pub text: String,
    pub query: String,
    pub created_at: DateTime<Utc>,
}

/// In-memory, per-browser-session history. Sessions are keyed by the opaque
/// id carried in the session cookie; each holds an append-only list of
/// (input, generated query) pairs. Nothing is ever removed or edited, and
/// everything dies with the process.
pub struct SessionStore {
    sessions: RwLock<HashMap<String, Vec<HistoryEntry>>>,
    next_id: AtomicU64,
}

impl SessionStore {
    pub fn new() -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
            next_id: AtomicU64::new(0),
        }
    }

    /// Mints a fresh session id and registers it with an empty history.
    pub async fn new_session_id(&self) -> String {
        let n = self.next_id.fetch_add(1, Ordering::Relaxed);
        let id = format!("s{}-{}", Utc::now().timestamp_millis(), n);
        self.sessions.write().await.insert(id.clone(), Vec::new());
        id
    }

    /// Records a successful generation for the given session. An unknown id
    /// starts a new history, so a cookie surviving a server restart still
    /// works (with an empty past).
    pub async fn append(&self, session_id: &str, text: String, query: String) {
        let entry = HistoryEntry {
            text,
            query,
            created_at: Utc::now(),
        };
        self.sessions
            .write()
            .await
            .entry(session_id.to_string())
            .or_default()
            .push(entry);
    }

    /// Snapshot of a session's history, oldest first. Unknown ids yield an
    /// empty list.
    pub async fn entries(&self, session_id: &str) -> Vec<HistoryEntry> {
        self.sessions
            .read()
            .await
            .get(session_id)
            .cloned()
            .unwrap_or_default()
    }

    pub async fn session_count(&self) -> usize {
        self.sessions.read().await.len()
    }

    pub async fn entry_count(&self) -> usize {
        self.sessions.read().await.values().map(Vec::len).sum()
    }
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new()
    }
}
