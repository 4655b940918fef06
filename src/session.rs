//! Session access - Read-only lookup of the connected user.
//!
//! The user is persisted in key-value storage as JSON. Some writers encode the
//! record twice (a JSON string whose content is the JSON object), so decoding
//! unwraps one extra string layer when it finds one.

use crate::{
    entities::User,
    errors::{Error, Result},
};
use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};

/// Storage key under which the connected user is kept.
pub const USER_KEY: &str = "user";

/// Minimal key-value storage interface.
pub trait KeyValueStorage: Send + Sync {
    /// Value stored under `key`, if any.
    fn get_item(&self, key: &str) -> Option<String>;
}

/// Capability injected into containers to learn who is connected.
pub trait SessionProvider: Send + Sync {
    /// Current user, or a session error when nobody is connected.
    fn current_user(&self) -> Result<User>;
}

/// Key-value storage kept in memory.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    items: Mutex<HashMap<String, String>>,
}

impl MemoryStorage {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_item(&self, key: impl Into<String>, value: impl Into<String>) {
        self.items
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key.into(), value.into());
    }

    pub fn remove_item(&self, key: &str) {
        self.items
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(key);
    }
}

impl KeyValueStorage for MemoryStorage {
    fn get_item(&self, key: &str) -> Option<String> {
        self.items
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .cloned()
    }
}

/// Session provider reading the user record out of key-value storage.
#[derive(Debug)]
pub struct StorageSession<S> {
    storage: S,
    key: String,
}

impl<S: KeyValueStorage> StorageSession<S> {
    /// Reads the user under the default [`USER_KEY`].
    pub fn new(storage: S) -> Self {
        Self::with_key(storage, USER_KEY)
    }

    pub fn with_key(storage: S, key: impl Into<String>) -> Self {
        Self {
            storage,
            key: key.into(),
        }
    }
}

impl<S: KeyValueStorage> SessionProvider for StorageSession<S> {
    fn current_user(&self) -> Result<User> {
        let raw = self.storage.get_item(&self.key).ok_or_else(|| Error::Session {
            message: format!("no {:?} entry in storage", self.key),
        })?;
        decode_user(&raw)
    }
}

/// Decodes a stored user record, accepting single or double JSON encoding.
pub fn decode_user(raw: &str) -> Result<User> {
    let session_error = |e: serde_json::Error| Error::Session {
        message: format!("invalid user record: {e}"),
    };
    let value: serde_json::Value = serde_json::from_str(raw).map_err(session_error)?;
    let value = match value {
        serde_json::Value::String(inner) => {
            serde_json::from_str(&inner).map_err(session_error)?
        }
        other => other,
    };
    serde_json::from_value(value).map_err(session_error)
}
