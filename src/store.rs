//! Best-effort local key-value cache.
//!
//! Backs the persisted client state: auth session, saved-recipe snapshots,
//! push registration and prompt-dismissal flags. Never the source of truth;
//! writes are last-writer-wins and failures are logged and swallowed.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, warn};

pub const KEY_SESSION: &str = "auth.session";
pub const KEY_PUSH_REGISTERED: &str = "push.registered";
pub const KEY_PUSH_PROMPT_DISMISSED: &str = "push.prompt_dismissed";

#[must_use]
pub fn saved_recipes_key(user_id: &str) -> String {
    format!("saved.{user_id}")
}

#[derive(Debug)]
pub struct LocalStore {
    path: PathBuf,
    entries: Mutex<BTreeMap<String, Value>>,
}

impl LocalStore {
    /// Opens the store, loading any existing file. A corrupt or missing
    /// file yields an empty store rather than an error.
    #[must_use]
    pub fn open(path: &Path) -> Self {
        let entries = match std::fs::read_to_string(path) {
            Ok(contents) => serde_json::from_str(&contents).unwrap_or_else(|e| {
                warn!("Discarding corrupt cache at {}: {}", path.display(), e);
                BTreeMap::new()
            }),
            Err(_) => BTreeMap::new(),
        };

        Self {
            path: path.to_path_buf(),
            entries: Mutex::new(entries),
        }
    }

    pub fn get<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let entries = self.entries.lock().ok()?;
        let value = entries.get(key)?.clone();
        serde_json::from_value(value).ok()
    }

    pub fn set<T: Serialize>(&self, key: &str, value: &T) {
        let Ok(value) = serde_json::to_value(value) else {
            warn!("Failed to serialize cache entry '{key}'");
            return;
        };

        if let Ok(mut entries) = self.entries.lock() {
            entries.insert(key.to_string(), value);
            self.flush(&entries);
        }
    }

    pub fn remove(&self, key: &str) {
        if let Ok(mut entries) = self.entries.lock()
            && entries.remove(key).is_some()
        {
            self.flush(&entries);
        }
    }

    /// Writes via a temp file then renames so readers never observe a
    /// partial file.
    fn flush(&self, entries: &BTreeMap<String, Value>) {
        let Ok(contents) = serde_json::to_string_pretty(entries) else {
            warn!("Failed to serialize cache");
            return;
        };

        if let Some(parent) = self.path.parent()
            && let Err(e) = std::fs::create_dir_all(parent)
        {
            warn!("Failed to create cache directory: {e}");
            return;
        }

        let tmp = self.path.with_extension("json.tmp");
        if let Err(e) = std::fs::write(&tmp, contents) {
            warn!("Failed to write cache: {e}");
            return;
        }
        if let Err(e) = std::fs::rename(&tmp, &self.path) {
            warn!("Failed to replace cache: {e}");
            return;
        }

        debug!("Flushed cache to {}", self.path.display());
    }
}
