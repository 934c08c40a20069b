//! In-memory backend for testing

use super::{Backend, BackendContext, BackendInfo};
use crate::error::Result;
use crate::setting::Setting;
use crate::sync::RwLockExt;
use crate::value::SettingValue;
use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, RwLock};

/// Registry name of the in-memory backend
pub const MEMORY_BACKEND: &str = "memory";

type ProfileStore = HashMap<String, SettingValue>;

/// In-memory setting storage (not persisted)
///
/// Clones share the same store, so a test can keep one handle while the
/// context owns another.
#[derive(Debug, Clone, Default)]
pub struct MemoryBackend {
    store: Arc<RwLock<BTreeMap<String, ProfileStore>>>,
}

fn store_key(screen: u32, plugin: &str, setting: &str) -> String {
    format!("{plugin}/s{screen}_{setting}")
}

impl MemoryBackend {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Stored value of `plugin/setting` on screen 0 of `profile`
    #[must_use]
    pub fn stored(&self, profile: &str, plugin: &str, setting: &str) -> Option<SettingValue> {
        self.store
            .read_recovered()
            .get(profile)
            .and_then(|p| p.get(&store_key(0, plugin, setting)))
            .cloned()
    }

    /// Store a value as if another process had written it
    pub fn insert(&self, profile: &str, plugin: &str, setting: &str, value: SettingValue) {
        self.store
            .write_recovered()
            .entry(profile.to_string())
            .or_default()
            .insert(store_key(0, plugin, setting), value);
    }
}

impl Backend for MemoryBackend {
    fn info(&self) -> BackendInfo {
        BackendInfo {
            name: MEMORY_BACKEND.to_string(),
            short_desc: "Memory Backend".to_string(),
            long_desc: "Keeps settings in memory only".to_string(),
            integration_support: false,
            profile_support: true,
            execute_events: false,
            read_support: true,
            write_support: true,
        }
    }

    fn read_setting(
        &mut self,
        ctx: &mut BackendContext<'_>,
        plugin: &str,
        setting: &Setting,
    ) -> Result<Option<SettingValue>> {
        let stored = self
            .store
            .read_recovered()
            .get(ctx.profile)
            .and_then(|p| p.get(&store_key(ctx.screen, plugin, setting.name())))
            .cloned();
        Ok(Some(stored.unwrap_or_else(|| setting.default_value().clone())))
    }

    fn write_setting(
        &mut self,
        ctx: &mut BackendContext<'_>,
        plugin: &str,
        setting: &Setting,
    ) -> Result<()> {
        let key = store_key(ctx.screen, plugin, setting.name());
        let mut store = self.store.write_recovered();
        let profile = store.entry(ctx.profile.to_string()).or_default();
        if setting.is_default() {
            profile.remove(&key);
        } else {
            profile.insert(key, setting.value().clone());
        }
        Ok(())
    }

    fn existing_profiles(&self, _ctx: &BackendContext<'_>) -> Result<Vec<String>> {
        Ok(self
            .store
            .read_recovered()
            .keys()
            .filter(|name| !name.is_empty())
            .cloned()
            .collect())
    }

    fn delete_profile(&mut self, _ctx: &mut BackendContext<'_>, profile: &str) -> Result<()> {
        self.store.write_recovered().remove(profile);
        Ok(())
    }
}

// =============================================================================
// Tests
// =============================================================================
