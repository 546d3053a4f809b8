//! Client session: the bearer token and the cached user snapshot.
//!
//! Both live as string slots in a [`KeyValueStore`]. Reads are forgiving:
//! a missing or malformed user slot is treated as an empty object, so
//! `username()` and `favorite_ids()` never fail.

mod store;

use std::sync::Arc;

use serde_json::{Map, Value};
use tracing::debug;

use crate::models::UserRecord;

pub use store::{FileStore, KeyValueStore, MemoryStore, StoreError};

const TOKEN_KEY: &str = "token";
const USER_KEY: &str = "user";

/// Point-in-time copy of the session.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Session {
    pub token: Option<String>,
    pub user: Option<UserRecord>,
}

/// Typed accessor over the session slots.
#[derive(Clone)]
pub struct SessionStore {
    store: Arc<dyn KeyValueStore>,
}

impl std::fmt::Debug for SessionStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionStore").finish_non_exhaustive()
    }
}

impl SessionStore {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    /// Session kept only in memory.
    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryStore::new()))
    }

    /// Bearer token, if one is stored and non-empty.
    pub fn token(&self) -> Option<String> {
        self.store.get(TOKEN_KEY).filter(|token| !token.is_empty())
    }

    pub fn set_token(&self, token: &str) -> Result<(), StoreError> {
        self.store.set(TOKEN_KEY, token)
    }

    /// Cached user, or `None` if absent or not decodable as a user.
    pub fn user(&self) -> Option<UserRecord> {
        let raw = self.store.get(USER_KEY)?;
        serde_json::from_str(&raw).ok()
    }

    /// Replace the cached user snapshot.
    pub fn set_user(&self, user: &UserRecord) -> Result<(), StoreError> {
        let raw = serde_json::to_string(user)?;
        self.store.set(USER_KEY, &raw)?;
        debug!(username = %user.username, "Cached user snapshot");
        Ok(())
    }

    /// Drop the cached user, keeping the token.
    pub fn clear_user(&self) -> Result<(), StoreError> {
        self.store.remove(USER_KEY)
    }

    /// Username of the cached user, or an empty string.
    pub fn username(&self) -> String {
        self.user_object()
            .get("Username")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string()
    }

    /// Favorite movie ids of the cached user, or an empty list.
    pub fn favorite_ids(&self) -> Vec<String> {
        match self.user_object().remove("FavMovies") {
            Some(Value::Array(ids)) => ids
                .into_iter()
                .filter_map(|id| match id {
                    Value::String(s) => Some(s),
                    _ => None,
                })
                .collect(),
            _ => Vec::new(),
        }
    }

    pub fn snapshot(&self) -> Session {
        Session {
            token: self.token(),
            user: self.user(),
        }
    }

    /// Remove both token and user.
    pub fn clear(&self) -> Result<(), StoreError> {
        self.store.remove(USER_KEY)?;
        self.store.remove(TOKEN_KEY)
    }

    fn user_object(&self) -> Map<String, Value> {
        self.store
            .get(USER_KEY)
            .and_then(|raw| match serde_json::from_str(&raw) {
                Ok(Value::Object(map)) => Some(map),
                _ => None,
            })
            .unwrap_or_default()
    }
}
