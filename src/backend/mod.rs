//! Storage backends
//!
//! A [`Backend`] persists setting values somewhere (a flat file, a desktop
//! settings daemon, memory). The context drives it in read and write
//! transactions:
//!
//! ```text
//! read_init  -> read_setting*  -> read_done
//! write_init -> write_setting* -> write_done
//! ```
//!
//! Backends are created by name through a [`BackendRegistry`]; the default
//! registry knows the flat-file [`IniBackend`] and the [`MemoryBackend`].

pub mod ini;
mod memory;

pub use ini::IniBackend;
pub use memory::MemoryBackend;

use crate::error::{Error, Result};
use crate::setting::Setting;
use crate::value::SettingValue;
use crate::watch::{FileWatches, ProcessEventsFlags};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;

/// Static description of a backend
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BackendInfo {
    pub name: String,
    pub short_desc: String,
    pub long_desc: String,
    pub integration_support: bool,
    pub profile_support: bool,
    pub execute_events: bool,
    pub read_support: bool,
    pub write_support: bool,
}

/// Context state a backend may use during a call
#[derive(Debug)]
pub struct BackendContext<'a> {
    pub screen: u32,
    /// Current profile; empty means the default profile
    pub profile: &'a str,
    pub config_dir: &'a Path,
    /// Watch table of the owning context
    pub watches: &'a mut FileWatches,
}

/// Trait for setting storage backends
///
/// Everything except [`Backend::info`] has a default so that read-only or
/// profile-less backends only implement what they support.
pub trait Backend {
    /// Backend description
    fn info(&self) -> BackendInfo;

    /// Called once after the backend has been attached to a context
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot be used; the context then keeps
    /// its previous backend.
    fn init(&mut self, _ctx: &mut BackendContext<'_>) -> Result<()> {
        Ok(())
    }

    /// Called once before the backend is detached
    ///
    /// # Errors
    ///
    /// Returns an error if cleanup failed; the backend is detached anyway.
    fn fini(&mut self, _ctx: &mut BackendContext<'_>) -> Result<()> {
        Ok(())
    }

    /// Start a read transaction
    ///
    /// # Errors
    ///
    /// Returns an error if the storage cannot be opened; nothing is read.
    fn read_init(&mut self, _ctx: &mut BackendContext<'_>) -> Result<()> {
        Ok(())
    }

    /// Stored value of one setting, `None` when nothing is stored
    ///
    /// # Errors
    ///
    /// Returns an error if a stored value cannot be decoded.
    fn read_setting(
        &mut self,
        _ctx: &mut BackendContext<'_>,
        _plugin: &str,
        _setting: &Setting,
    ) -> Result<Option<SettingValue>> {
        Ok(None)
    }

    /// Finish a read transaction
    ///
    /// # Errors
    ///
    /// Returns an error if the backend fails to release its storage.
    fn read_done(&mut self, _ctx: &mut BackendContext<'_>) -> Result<()> {
        Ok(())
    }

    /// Start a write transaction
    ///
    /// # Errors
    ///
    /// Returns an error if the storage cannot be opened; nothing is written.
    fn write_init(&mut self, _ctx: &mut BackendContext<'_>) -> Result<()> {
        Ok(())
    }

    /// Store the current value of one setting
    ///
    /// # Errors
    ///
    /// The default implementation reports the operation as unsupported.
    fn write_setting(
        &mut self,
        _ctx: &mut BackendContext<'_>,
        _plugin: &str,
        _setting: &Setting,
    ) -> Result<()> {
        Err(Error::Unsupported {
            backend: self.info().name,
            operation: "write".into(),
        })
    }

    /// Finish a write transaction, flushing pending data
    ///
    /// # Errors
    ///
    /// Returns an error if the data cannot be persisted.
    fn write_done(&mut self, _ctx: &mut BackendContext<'_>) -> Result<()> {
        Ok(())
    }

    /// Whether the setting is managed by the desktop environment
    fn setting_is_integrated(&self, _plugin: &str, _setting: &Setting) -> bool {
        false
    }

    /// Whether the backend refuses to store the setting
    fn setting_is_read_only(&self, _plugin: &str, _setting: &Setting) -> bool {
        false
    }

    /// Names of the stored profiles, excluding the default profile
    ///
    /// # Errors
    ///
    /// Returns an error if the profile storage cannot be listed.
    fn existing_profiles(&self, _ctx: &BackendContext<'_>) -> Result<Vec<String>> {
        Ok(Vec::new())
    }

    /// Remove a stored profile
    ///
    /// # Errors
    ///
    /// Returns an error if the profile exists but cannot be removed.
    fn delete_profile(&mut self, _ctx: &mut BackendContext<'_>, _profile: &str) -> Result<()> {
        Ok(())
    }

    /// Handle pending external events
    ///
    /// Returns `true` when stored values changed and the context should
    /// re-read its settings.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend failed while handling its events.
    fn execute_events(
        &mut self,
        _ctx: &mut BackendContext<'_>,
        _flags: ProcessEventsFlags,
    ) -> Result<bool> {
        Ok(false)
    }
}

/// Creates a fresh backend instance
pub type BackendFactory = Arc<dyn Fn() -> Box<dyn Backend> + Send + Sync>;

/// Named backend factories, in registration order
#[derive(Clone)]
pub struct BackendRegistry {
    factories: Vec<(String, BackendFactory)>,
}

impl BackendRegistry {
    /// Registry without any backend
    #[must_use]
    pub fn empty() -> Self {
        Self {
            factories: Vec::new(),
        }
    }

    /// Register a factory, replacing one of the same name
    pub fn register<F>(&mut self, name: impl Into<String>, factory: F)
    where
        F: Fn() -> Box<dyn Backend> + Send + Sync + 'static,
    {
        let name = name.into();
        let factory: BackendFactory = Arc::new(factory);
        match self.factories.iter_mut().find(|(n, _)| *n == name) {
            Some(entry) => entry.1 = factory,
            None => self.factories.push((name, factory)),
        }
    }

    /// Builder form of [`BackendRegistry::register`]
    #[must_use]
    pub fn with<F>(mut self, name: impl Into<String>, factory: F) -> Self
    where
        F: Fn() -> Box<dyn Backend> + Send + Sync + 'static,
    {
        self.register(name, factory);
        self
    }

    /// Instantiate the named backend
    pub fn create(&self, name: &str) -> Result<Box<dyn Backend>> {
        self.factories
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, factory)| factory())
            .ok_or_else(|| Error::BackendNotFound(name.to_string()))
    }

    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.factories.iter().any(|(n, _)| n == name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.factories.iter().map(|(n, _)| n.as_str())
    }

    /// Descriptions of every registered backend
    #[must_use]
    pub fn infos(&self) -> Vec<BackendInfo> {
        self.factories
            .iter()
            .map(|(_, factory)| factory().info())
            .collect()
    }
}

impl Default for BackendRegistry {
    fn default() -> Self {
        Self::empty()
            .with(ini::INI_BACKEND, || Box::new(IniBackend::new()))
            .with(memory::MEMORY_BACKEND, || Box::new(MemoryBackend::new()))
    }
}

impl std::fmt::Debug for BackendRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.names()).finish()
    }
}
