//! Setting mutation, the changed list and plugin activation

use super::Context;
use crate::error::{Error, Result};
use crate::events;
use crate::plugin::{ACTIVE_PLUGINS_SETTING, CORE_PLUGIN, PluginConflict, PluginId, SettingId};
use crate::setting::{SetOutcome, Setting};
use crate::value::{ButtonValue, ColorValue, KeyValue, SettingValue, ValueList};
use log::debug;

impl Context {
    // =========================================================================
    // Typed setters
    // =========================================================================
    //
    // Each setter returns whether the stored value equals the requested one.
    // With `process_changed`, a change queues the setting on the changed list
    // (at most once) and setting core's `active_plugins` updates the active
    // flags of all plugins. Listeners are notified of every change.

    fn update_setting<F>(&mut self, id: SettingId, process_changed: bool, update: F) -> Result<bool>
    where
        F: FnOnce(&mut Setting) -> Result<SetOutcome>,
    {
        let plugin = self.plugin_mut(id.plugin)?;
        let plugin_name = plugin.name().to_string();
        let setting = plugin
            .setting_at_mut(id.index)
            .ok_or_else(|| Error::SettingNotFound(format!("{plugin_name}/#{}", id.index)))?;

        let old_value = setting.value().clone();
        let outcome = update(setting)?;
        if !outcome.changed {
            return Ok(outcome.matched);
        }

        let new_value = setting.value().clone();
        let key = events::setting_key(&plugin_name, setting.name());
        let is_plugin_list = plugin_name == CORE_PLUGIN && setting.name() == ACTIVE_PLUGINS_SETTING;

        if process_changed {
            self.add_changed_setting(id);
            if is_plugin_list {
                self.apply_active_plugin_setting();
            }
        }
        self.events.notify(&key, &old_value, &new_value);
        Ok(outcome.matched)
    }

    pub fn set_bool(&mut self, id: SettingId, value: bool, process_changed: bool) -> Result<bool> {
        self.update_setting(id, process_changed, |s| s.set_bool(value))
    }

    pub fn set_int(&mut self, id: SettingId, value: i32, process_changed: bool) -> Result<bool> {
        self.update_setting(id, process_changed, |s| s.set_int(value))
    }

    pub fn set_float(&mut self, id: SettingId, value: f32, process_changed: bool) -> Result<bool> {
        self.update_setting(id, process_changed, |s| s.set_float(value))
    }

    pub fn set_string(
        &mut self,
        id: SettingId,
        value: impl Into<String>,
        process_changed: bool,
    ) -> Result<bool> {
        self.update_setting(id, process_changed, |s| s.set_string(value))
    }

    pub fn set_color(
        &mut self,
        id: SettingId,
        value: ColorValue,
        process_changed: bool,
    ) -> Result<bool> {
        self.update_setting(id, process_changed, |s| s.set_color(value))
    }

    pub fn set_key(&mut self, id: SettingId, value: KeyValue, process_changed: bool) -> Result<bool> {
        self.update_setting(id, process_changed, |s| s.set_key(value))
    }

    pub fn set_button(
        &mut self,
        id: SettingId,
        value: ButtonValue,
        process_changed: bool,
    ) -> Result<bool> {
        self.update_setting(id, process_changed, |s| s.set_button(value))
    }

    pub fn set_edge(&mut self, id: SettingId, value: u32, process_changed: bool) -> Result<bool> {
        self.update_setting(id, process_changed, |s| s.set_edge(value))
    }

    pub fn set_bell(&mut self, id: SettingId, value: bool, process_changed: bool) -> Result<bool> {
        self.update_setting(id, process_changed, |s| s.set_bell(value))
    }

    pub fn set_match(
        &mut self,
        id: SettingId,
        value: impl Into<String>,
        process_changed: bool,
    ) -> Result<bool> {
        self.update_setting(id, process_changed, |s| s.set_match(value))
    }

    pub fn set_list(&mut self, id: SettingId, value: ValueList, process_changed: bool) -> Result<bool> {
        self.update_setting(id, process_changed, |s| s.set_list(value))
    }

    /// Set any value whose tag matches the setting type
    pub fn set_value(
        &mut self,
        id: SettingId,
        value: SettingValue,
        process_changed: bool,
    ) -> Result<bool> {
        self.update_setting(id, process_changed, |s| s.set_value(value))
    }

    /// Copy the default over the current value; returns whether it changed
    pub fn reset_to_default(&mut self, id: SettingId, process_changed: bool) -> Result<bool> {
        let mut changed = false;
        self.update_setting(id, process_changed, |s| {
            changed = s.reset_to_default();
            Ok(SetOutcome {
                changed,
                matched: true,
            })
        })?;
        Ok(changed)
    }

    // =========================================================================
    // Changed list
    // =========================================================================

    /// Queue a setting for writing; returns false if it was already queued
    pub fn add_changed_setting(&mut self, id: SettingId) -> bool {
        if self.changed.contains(&id) {
            return false;
        }
        self.changed.push(id);
        true
    }

    /// Settings changed since the last write or drain, in change order
    #[must_use]
    pub fn changed_settings(&self) -> &[SettingId] {
        &self.changed
    }

    /// Take the changed list, leaving it empty
    pub fn steal_changed_settings(&mut self) -> Vec<SettingId> {
        std::mem::take(&mut self.changed)
    }

    pub fn clear_changed_settings(&mut self) {
        self.changed.clear();
    }

    // =========================================================================
    // Plugin activation
    // =========================================================================

    fn plugin_list_setting(&self) -> Option<SettingId> {
        self.setting_id(CORE_PLUGIN, ACTIVE_PLUGINS_SETTING)
    }

    /// Mark exactly the named plugins active; core is always active
    pub fn set_active_plugin_list<S: AsRef<str>>(&mut self, names: &[S]) {
        for plugin in self.plugins.iter_mut().flatten() {
            let active = plugin.name() == CORE_PLUGIN
                || names.iter().any(|n| n.as_ref() == plugin.name());
            plugin.set_active_flag(active);
        }
    }

    /// Apply core's `active_plugins` value to the active flags
    pub(crate) fn apply_active_plugin_setting(&mut self) {
        let names = match self
            .plugin_list_setting()
            .and_then(|id| self.setting(id))
            .map(|s| s.get_list().and_then(ValueList::to_strings))
        {
            Some(Ok(names)) => names,
            Some(Err(e)) => {
                debug!("Ignoring malformed plugin list: {e}");
                return;
            }
            None => return,
        };
        self.set_active_plugin_list(&names);
    }

    /// Toggle a plugin. With autosort enabled the sorted active list is
    /// written into core's `active_plugins` and stored.
    pub fn set_plugin_active(&mut self, id: PluginId, active: bool) -> Result<()> {
        self.plugin_mut(id)?.set_active_flag(active);
        if self.autosort {
            self.write_auto_sorted_plugin_list()?;
        }
        Ok(())
    }

    pub(crate) fn write_auto_sorted_plugin_list(&mut self) -> Result<()> {
        let sorted = self.sorted_plugin_string_list();
        let Some(list_id) = self.plugin_list_setting() else {
            return Ok(());
        };
        self.set_list(list_id, ValueList::from_strings(&sorted), true)?;
        match self.write_changed_settings() {
            Err(Error::NoBackend) => Ok(()),
            other => other,
        }
    }

    /// Active plugin names in load order, core first
    #[must_use]
    pub fn sorted_plugin_string_list(&self) -> Vec<String> {
        self.interfaces
            .resolver
            .sorted_plugin_names(&self.plugin_refs())
    }

    /// Reasons enabling the plugin is unsafe; empty means safe
    pub fn can_enable_plugin(&self, id: PluginId) -> Result<Vec<PluginConflict>> {
        let candidate = self
            .plugin(id)
            .ok_or_else(|| Error::PluginNotFound(format!("#{}", id.0)))?;
        Ok(self
            .interfaces
            .resolver
            .can_enable(&self.plugin_refs(), candidate))
    }

    /// Reasons disabling the plugin is unsafe; empty means safe
    pub fn can_disable_plugin(&self, id: PluginId) -> Result<Vec<PluginConflict>> {
        let candidate = self
            .plugin(id)
            .ok_or_else(|| Error::PluginNotFound(format!("#{}", id.0)))?;
        Ok(self
            .interfaces
            .resolver
            .can_disable(&self.plugin_refs(), candidate))
    }
}
