//! Reading, writing, export and import of setting values

use super::{BackendParts, Context};
use crate::backend::{Backend, BackendContext};
use crate::error::{Error, Result};
use crate::ini::IniFile;
use crate::ini::codec;
use crate::plugin::{Plugin, PluginId, SettingId};
use crate::value::SettingType;
use crate::watch::{ProcessEventsFlags, WatchId};
use log::{debug, info, warn};
use std::path::{Path, PathBuf};
use std::sync::atomic::Ordering;

/// Key used for a setting in export files
fn export_key(screen: u32, setting: &str) -> String {
    format!("s{screen}_{setting}")
}

/// Pull stored values of one plugin into memory
fn read_plugin(backend: &mut dyn Backend, ctx: &mut BackendContext<'_>, plugin: &mut Plugin) {
    let plugin_name = plugin.name().to_string();
    for index in 0..plugin.settings().len() {
        let Some(setting) = plugin.setting_at_mut(index) else {
            continue;
        };
        match backend.read_setting(ctx, &plugin_name, setting) {
            Ok(Some(value)) => {
                if let Err(e) = setting.set_value(value) {
                    warn!("Ignoring stored {plugin_name}/{}: {e}", setting.name());
                }
            }
            Ok(None) => {}
            Err(e) => warn!("Unable to read {plugin_name}/{}: {e}", setting.name()),
        }
        let integrated = backend.setting_is_integrated(&plugin_name, setting);
        let read_only = backend.setting_is_read_only(&plugin_name, setting);
        setting.set_integrated(integrated);
        setting.set_read_only(read_only);
    }
}

impl Context {
    fn require_read_support(parts: &BackendParts<'_>) -> Result<()> {
        let info = parts.backend.info();
        if info.read_support {
            Ok(())
        } else {
            Err(Error::Unsupported {
                backend: info.name,
                operation: "read".into(),
            })
        }
    }

    fn require_write_support(parts: &BackendParts<'_>) -> Result<()> {
        let info = parts.backend.info();
        if info.write_support {
            Ok(())
        } else {
            Err(Error::Unsupported {
                backend: info.name,
                operation: "write".into(),
            })
        }
    }

    /// Read every plugin's values from the backend
    ///
    /// Values missing from storage keep their in-memory value; undecodable
    /// values are logged and skipped.
    pub fn read_settings(&mut self) -> Result<()> {
        let mut parts = self.backend_parts()?;
        Self::require_read_support(&parts)?;

        parts.backend.read_init(&mut parts.ctx)?;
        for plugin in parts.plugins.iter_mut().flatten() {
            read_plugin(parts.backend, &mut parts.ctx, plugin);
        }
        parts.backend.read_done(&mut parts.ctx)?;

        self.apply_active_plugin_setting();
        debug!("Read settings of {} plugins", self.plugins().count());
        Ok(())
    }

    /// Read one plugin's values from the backend
    pub fn read_plugin_settings(&mut self, id: PluginId) -> Result<()> {
        let mut parts = self.backend_parts()?;
        Self::require_read_support(&parts)?;
        let plugin = parts
            .plugins
            .get_mut(id.0)
            .and_then(Option::as_mut)
            .ok_or_else(|| Error::PluginNotFound(format!("#{}", id.0)))?;

        parts.backend.read_init(&mut parts.ctx)?;
        read_plugin(parts.backend, &mut parts.ctx, plugin);
        parts.backend.read_done(&mut parts.ctx)?;

        if plugin.name() == crate::plugin::CORE_PLUGIN {
            self.apply_active_plugin_setting();
        }
        Ok(())
    }

    fn write_ids(&mut self, ids: &[SettingId]) -> Result<()> {
        let mut parts = self.backend_parts()?;
        Self::require_write_support(&parts)?;

        parts.backend.write_init(&mut parts.ctx)?;
        let mut result = Ok(());
        for id in ids {
            let Some(plugin) = parts.plugins.get(id.plugin.0).and_then(Option::as_ref) else {
                continue;
            };
            let Some(setting) = plugin.setting_at(id.index) else {
                continue;
            };
            if let Err(e) = parts.backend.write_setting(&mut parts.ctx, plugin.name(), setting) {
                result = Err(e);
                break;
            }
        }
        let done = parts.backend.write_done(&mut parts.ctx);
        result.and(done)
    }

    /// Write every setting to the backend and clear the changed list
    pub fn write_settings(&mut self) -> Result<()> {
        let ids: Vec<SettingId> = self
            .plugins()
            .flat_map(|(plugin, p)| (0..p.settings().len()).map(move |index| SettingId { plugin, index }))
            .collect();
        self.write_ids(&ids)?;
        self.changed.clear();
        Ok(())
    }

    /// Write the changed list to the backend and clear it
    ///
    /// On failure the changed list is left as it was.
    pub fn write_changed_settings(&mut self) -> Result<()> {
        if self.backend.is_none() {
            return Err(Error::NoBackend);
        }
        if self.changed.is_empty() {
            return Ok(());
        }
        let ids = self.steal_changed_settings();
        if let Err(e) = self.write_ids(&ids) {
            let newer = std::mem::replace(&mut self.changed, ids);
            for id in newer {
                self.add_changed_setting(id);
            }
            return Err(e);
        }
        debug!("Wrote {} changed settings", ids.len());
        Ok(())
    }

    // =========================================================================
    // Export / Import
    // =========================================================================

    /// Write every setting to an INI file, independent of the backend
    ///
    /// With `skip_defaults`, settings at their default value are left out.
    pub fn export_to_file(&self, path: &Path, skip_defaults: bool) -> Result<()> {
        let mut file = IniFile::new();
        for (_, plugin) in self.plugins() {
            for setting in plugin.settings() {
                if setting.setting_type() == SettingType::Action {
                    continue;
                }
                if skip_defaults && setting.is_default() {
                    continue;
                }
                file.set(
                    plugin.name(),
                    &export_key(self.config.screen, setting.name()),
                    &codec::encode_value(setting.value()),
                );
            }
        }
        file.save(path)?;
        info!("Exported settings to {}", path.display());
        Ok(())
    }

    /// Apply the values of an exported INI file
    ///
    /// Keys missing from the file leave settings untouched. Unless
    /// `overwrite_non_default` is set, settings that currently differ from
    /// their default keep their value. The file is decoded completely
    /// before anything is applied, so a failed import changes nothing.
    pub fn import_from_file(&mut self, path: &Path, overwrite_non_default: bool) -> Result<()> {
        let file = IniFile::load_existing(path)?;
        let screen = self.config.screen;

        let mut updates = Vec::new();
        for (plugin_id, plugin) in self.plugins() {
            for (index, setting) in plugin.settings().iter().enumerate() {
                if !overwrite_non_default && !setting.is_default() {
                    continue;
                }
                if setting.setting_type() == SettingType::Action {
                    continue;
                }
                let value = file.get_value(
                    plugin.name(),
                    &export_key(screen, setting.name()),
                    setting.setting_type(),
                    setting.element_type().unwrap_or(SettingType::Bool),
                );
                match value {
                    Ok(Some(value)) => updates.push((
                        SettingId {
                            plugin: plugin_id,
                            index,
                        },
                        value,
                    )),
                    Ok(None) => {}
                    Err(e) => {
                        return Err(Error::parse(
                            format!("{} [{}] {}", path.display(), plugin.name(), setting.name()),
                            e.to_string(),
                        ));
                    }
                }
            }
        }

        let count = updates.len();
        for (id, value) in updates {
            self.set_value(id, value, true)?;
        }
        info!("Imported {count} settings from {}", path.display());
        Ok(())
    }

    // =========================================================================
    // Events
    // =========================================================================

    /// Deliver pending file-watch and backend events once
    ///
    /// An external edit of the options file is applied first (backend and
    /// profile switch, flags); then the backend handles its own events and
    /// values are re-read when it reports changes. Must not be called from
    /// inside a watch or change callback.
    pub fn process_events(&mut self, flags: ProcessEventsFlags) -> Result<()> {
        self.watches.poll();

        if self.options_dirty.swap(false, Ordering::SeqCst) {
            self.reload_options()?;
        }

        let reread = match self.backend_parts() {
            Ok(mut parts) => parts.backend.execute_events(&mut parts.ctx, flags)?,
            Err(Error::NoBackend) => false,
            Err(e) => return Err(e),
        };
        if reread {
            debug!("Backend reported changes, re-reading settings");
            self.read_settings()?;
        }
        Ok(())
    }

    /// Watch a file of the host's own; `callback` runs from
    /// [`process_events`](Self::process_events) after the file changed
    pub fn add_file_watch<F>(
        &mut self,
        path: impl Into<PathBuf>,
        enabled: bool,
        callback: F,
    ) -> WatchId
    where
        F: Fn(WatchId) + Send + Sync + 'static,
    {
        self.watches.add(path, enabled, callback)
    }

    /// Returns `false` for an unknown id
    pub fn remove_file_watch(&mut self, id: WatchId) -> bool {
        self.watches.remove(id)
    }

    /// Resume a watch; edits made while it was disabled are not reported
    pub fn enable_file_watch(&mut self, id: WatchId) -> bool {
        self.watches.enable(id)
    }

    pub fn disable_file_watch(&mut self, id: WatchId) -> bool {
        self.watches.disable(id)
    }
}
