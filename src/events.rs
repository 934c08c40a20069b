//! Change notification for setting values
//!
//! Listeners receive the `plugin/setting` key together with the old and new
//! value whenever a setter on the [`Context`](crate::Context) changes a value.

use crate::sync::RwLockExt;
use crate::value::SettingValue;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

/// Type alias for a change callback
pub type ChangeCallback = Arc<dyn Fn(&str, &SettingValue, &SettingValue) + Send + Sync>;

/// Build the listener key for a setting
#[must_use]
pub fn setting_key(plugin: &str, setting: &str) -> String {
    format!("{plugin}/{setting}")
}

/// Manages event listeners for settings changes
pub struct EventManager {
    /// Global listeners (called for all changes)
    global_listeners: RwLock<Vec<ChangeCallback>>,

    /// Per-key listeners (called only for specific setting changes)
    key_listeners: RwLock<HashMap<String, Vec<ChangeCallback>>>,
}

impl EventManager {
    #[must_use]
    pub fn new() -> Self {
        Self {
            global_listeners: RwLock::new(Vec::new()),
            key_listeners: RwLock::new(HashMap::new()),
        }
    }

    /// Register a global change listener (called for all settings changes)
    ///
    /// The callback receives (`key`, `old_value`, `new_value`).
    pub fn on_change<F>(&self, callback: F)
    where
        F: Fn(&str, &SettingValue, &SettingValue) + Send + Sync + 'static,
    {
        self.global_listeners
            .write_recovered()
            .push(Arc::new(callback));
    }

    /// Register a listener for one `plugin/setting` key
    pub fn watch<F>(&self, key: &str, callback: F)
    where
        F: Fn(&str, &SettingValue, &SettingValue) + Send + Sync + 'static,
    {
        self.key_listeners
            .write_recovered()
            .entry(key.to_string())
            .or_default()
            .push(Arc::new(callback));
    }

    /// Notify all listeners about a change
    pub fn notify(&self, key: &str, old_value: &SettingValue, new_value: &SettingValue) {
        // Snapshot so callbacks may register further listeners
        let global: Vec<ChangeCallback> = self.global_listeners.read_recovered().clone();
        for callback in &global {
            callback(key, old_value, new_value);
        }

        let keyed: Vec<ChangeCallback> = self
            .key_listeners
            .read_recovered()
            .get(key)
            .cloned()
            .unwrap_or_default();
        for callback in &keyed {
            callback(key, old_value, new_value);
        }
    }

    /// Remove all listeners for a specific key
    pub fn unwatch(&self, key: &str) {
        self.key_listeners.write_recovered().remove(key);
    }

    /// Clear all listeners
    pub fn clear(&self) {
        self.global_listeners.write_recovered().clear();
        self.key_listeners.write_recovered().clear();
    }
}

impl Default for EventManager {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for EventManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventManager")
            .field("global_listeners", &self.global_listeners.read_recovered().len())
            .field("key_listeners", &self.key_listeners.read_recovered().len())
            .finish()
    }
}

// =============================================================================
// Tests
// =============================================================================
