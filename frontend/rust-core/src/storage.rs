use std::collections::HashMap;
use std::sync::{Arc, Mutex};

/// Minimal key-value store seam. Browser hosts back this with
/// sessionStorage/localStorage; tests and native hosts use [`MemoryStore`].
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&self, key: &str, value: &str);
    fn remove(&self, key: &str);
}

/// In-memory store, last-writer-wins.
#[derive(Default)]
pub struct MemoryStore {
    inner: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.inner.lock().unwrap().get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) {
        self.inner.lock().unwrap().insert(key.to_string(), value.to_string());
    }

    fn remove(&self, key: &str) {
        self.inner.lock().unwrap().remove(key);
    }
}

const TOKEN_KEY: &str = "token";

/// Pairs the per-tab (session) store with the shared (cross-tab) store and
/// namespaces user-owned keys, so two accounts on one device never read each
/// other's state. Reads prefer the session store; writes go to both.
#[derive(Clone)]
pub struct UserStorage {
    session: Arc<dyn KeyValueStore>,
    shared: Arc<dyn KeyValueStore>,
    user_id: String,
}

impl UserStorage {
    pub fn new(
        session: Arc<dyn KeyValueStore>,
        shared: Arc<dyn KeyValueStore>,
        user_id: impl Into<String>,
    ) -> Self {
        Self {
            session,
            shared,
            user_id: user_id.into(),
        }
    }

    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    fn scoped(&self, key: &str) -> String {
        format!("{}_{}", key, self.user_id)
    }

    /// User-scoped read: session store first, shared store as fallback.
    pub fn get(&self, key: &str) -> Option<String> {
        let scoped = self.scoped(key);
        self.session
            .get(&scoped)
            .or_else(|| self.shared.get(&scoped))
    }

    /// User-scoped write to both stores (last-writer-wins across tabs).
    pub fn set(&self, key: &str, value: &str) {
        let scoped = self.scoped(key);
        self.session.set(&scoped, value);
        self.shared.set(&scoped, value);
    }

    pub fn remove(&self, key: &str) {
        let scoped = self.scoped(key);
        self.session.remove(&scoped);
        self.shared.remove(&scoped);
    }

    /// Per-tab read that does not fall back to the shared store.
    pub fn get_session_only(&self, key: &str) -> Option<String> {
        self.session.get(&self.scoped(key))
    }

    pub fn set_session_only(&self, key: &str, value: &str) {
        self.session.set(&self.scoped(key), value);
    }

    pub fn remove_session_only(&self, key: &str) {
        self.session.remove(&self.scoped(key));
    }

    /// Bearer token is stored unscoped (it identifies the user itself).
    pub fn token(&self) -> Option<String> {
        self.session
            .get(TOKEN_KEY)
            .or_else(|| self.shared.get(TOKEN_KEY))
    }

    pub fn set_token(&self, token: &str) {
        self.session.set(TOKEN_KEY, token);
        self.shared.set(TOKEN_KEY, token);
    }

    pub fn clear_token(&self) {
        self.session.remove(TOKEN_KEY);
        self.shared.remove(TOKEN_KEY);
    }
}
