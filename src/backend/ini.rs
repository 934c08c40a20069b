//! Flat-file backend
//!
//! Each profile is one INI file in the config directory, `Default.ini` for
//! the default profile. Sections are plugin names and keys are
//! `s<screen>_<setting>`. Settings at their default value are not stored.
//! The file is watched so that edits by other processes are picked up by
//! [`Context::process_events`](crate::Context::process_events).

use super::{Backend, BackendContext, BackendInfo};
use crate::error::{self, Result};
use crate::ini::IniFile;
use crate::setting::Setting;
use crate::value::{SettingType, SettingValue};
use crate::watch::{ProcessEventsFlags, WatchId};
use log::{debug, info};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Registry name of the flat-file backend
pub const INI_BACKEND: &str = "ini";

/// File stem used for the empty profile name
pub const DEFAULT_PROFILE_FILE: &str = "Default";

const PROFILE_EXTENSION: &str = "ini";

/// Storage key of a setting on `screen`
#[must_use]
pub fn setting_key(screen: u32, setting: &str) -> String {
    format!("s{screen}_{setting}")
}

/// Path of the file holding `profile`
#[must_use]
pub fn profile_path(config_dir: &Path, profile: &str) -> PathBuf {
    let stem = if profile.is_empty() {
        DEFAULT_PROFILE_FILE
    } else {
        profile
    };
    config_dir.join(format!("{stem}.{PROFILE_EXTENSION}"))
}

/// INI file storage
#[derive(Debug, Default)]
pub struct IniBackend {
    file: Option<IniFile>,
    loaded_from: Option<PathBuf>,
    watch: Option<WatchId>,
    dirty: Arc<AtomicBool>,
}

impl IniBackend {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Load the profile file unless it is already the loaded one
    fn ensure_loaded(&mut self, ctx: &mut BackendContext<'_>) -> Result<()> {
        let path = profile_path(ctx.config_dir, ctx.profile);
        if self.file.is_some() && self.loaded_from.as_deref() == Some(path.as_path()) {
            return Ok(());
        }
        self.load(ctx, path)
    }

    fn load(&mut self, ctx: &mut BackendContext<'_>, path: PathBuf) -> Result<()> {
        debug!("Loading profile file {}", path.display());
        let file = IniFile::load(&path)?;

        if let Some(old) = self.watch.take() {
            ctx.watches.remove(old);
        }
        let dirty = Arc::clone(&self.dirty);
        self.watch = Some(ctx.watches.add(&path, true, move |_| {
            dirty.store(true, Ordering::SeqCst);
        }));
        self.dirty.store(false, Ordering::SeqCst);

        self.file = Some(file);
        self.loaded_from = Some(path);
        Ok(())
    }

    fn file_mut(&mut self) -> &mut IniFile {
        self.file.get_or_insert_with(IniFile::new)
    }
}

impl Backend for IniBackend {
    fn info(&self) -> BackendInfo {
        BackendInfo {
            name: INI_BACKEND.to_string(),
            short_desc: "Flat-file Configuration Backend".to_string(),
            long_desc: "Flat file configuration backend for ccsettings".to_string(),
            integration_support: false,
            profile_support: true,
            execute_events: true,
            read_support: true,
            write_support: true,
        }
    }

    fn init(&mut self, ctx: &mut BackendContext<'_>) -> Result<()> {
        error::create_dir(ctx.config_dir)?;
        self.ensure_loaded(ctx)
    }

    fn fini(&mut self, ctx: &mut BackendContext<'_>) -> Result<()> {
        if let Some(watch) = self.watch.take() {
            ctx.watches.remove(watch);
        }
        self.file = None;
        self.loaded_from = None;
        Ok(())
    }

    fn read_init(&mut self, ctx: &mut BackendContext<'_>) -> Result<()> {
        self.ensure_loaded(ctx)
    }

    fn read_setting(
        &mut self,
        ctx: &mut BackendContext<'_>,
        plugin: &str,
        setting: &Setting,
    ) -> Result<Option<SettingValue>> {
        let Some(file) = &self.file else {
            return Ok(None);
        };
        // Defaults are never written, so a missing key means the default
        let value = file.get_value(
            plugin,
            &setting_key(ctx.screen, setting.name()),
            setting.setting_type(),
            setting.element_type().unwrap_or(SettingType::Bool),
        )?;
        Ok(Some(value.unwrap_or_else(|| setting.default_value().clone())))
    }

    fn write_init(&mut self, ctx: &mut BackendContext<'_>) -> Result<()> {
        self.ensure_loaded(ctx)?;
        // Our own save must not look like an external edit
        if let Some(watch) = self.watch {
            ctx.watches.disable(watch);
        }
        Ok(())
    }

    fn write_setting(
        &mut self,
        ctx: &mut BackendContext<'_>,
        plugin: &str,
        setting: &Setting,
    ) -> Result<()> {
        if setting.setting_type() == SettingType::Action {
            return Ok(());
        }
        let key = setting_key(ctx.screen, setting.name());
        let file = self.file_mut();
        if setting.is_default() {
            file.remove(plugin, &key);
        } else {
            file.set_value(plugin, &key, setting.value());
        }
        Ok(())
    }

    fn write_done(&mut self, ctx: &mut BackendContext<'_>) -> Result<()> {
        let path = profile_path(ctx.config_dir, ctx.profile);
        let result = match &self.file {
            Some(file) => file.save(&path),
            None => Ok(()),
        };
        if let Some(watch) = self.watch {
            ctx.watches.enable(watch);
        }
        result
    }

    fn existing_profiles(&self, ctx: &BackendContext<'_>) -> Result<Vec<String>> {
        if !ctx.config_dir.exists() {
            return Ok(Vec::new());
        }
        let mut profiles = Vec::new();
        for entry in error::read_dir(ctx.config_dir)?.flatten() {
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some(PROFILE_EXTENSION) {
                continue;
            }
            if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                if stem != DEFAULT_PROFILE_FILE {
                    profiles.push(stem.to_string());
                }
            }
        }
        profiles.sort();
        Ok(profiles)
    }

    fn delete_profile(&mut self, ctx: &mut BackendContext<'_>, profile: &str) -> Result<()> {
        let path = profile_path(ctx.config_dir, profile);
        if self.loaded_from.as_deref() == Some(path.as_path()) {
            if let Some(watch) = self.watch.take() {
                ctx.watches.remove(watch);
            }
            self.file = None;
            self.loaded_from = None;
        }
        if error::remove_file_if_exists(&path)? {
            info!("Deleted profile '{profile}'");
        }
        Ok(())
    }

    fn execute_events(
        &mut self,
        ctx: &mut BackendContext<'_>,
        _flags: ProcessEventsFlags,
    ) -> Result<bool> {
        if !self.dirty.swap(false, Ordering::SeqCst) {
            return Ok(false);
        }
        debug!("Profile file changed on disk, reloading");
        let path = profile_path(ctx.config_dir, ctx.profile);
        self.load(ctx, path)?;
        Ok(true)
    }
}
