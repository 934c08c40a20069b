//! The settings context
//!
//! A [`Context`] owns every loaded plugin with its settings, the changed
//! list, the active backend and the file watches. All access goes through
//! handles: [`PluginId`] and [`SettingId`] stay valid until the plugin is
//! unloaded.
//!
//! The context is single-threaded; a host that wants concurrency must
//! serialize its calls.
//!
//! # Example
//!
//! ```rust,no_run
//! use ccsettings::{Context, Plugin, Setting, SettingValue};
//!
//! let mut context = Context::builder()
//!     .config_dir("/tmp/ccsettings-example")
//!     .plugin(Plugin::new("cube").with_setting(Setting::new("speed", SettingValue::Float(1.0))))
//!     .build()?;
//!
//! let speed = context.setting_id("cube", "speed").expect("declared above");
//! context.set_float(speed, 2.0, true)?;
//! context.write_changed_settings()?;
//! # Ok::<(), ccsettings::Error>(())
//! ```

mod builder;
mod io;
mod mutation;
mod profiles;

pub use builder::ContextBuilder;

use crate::backend::{Backend, BackendContext};
use crate::config::{ContextConfig, GlobalOptions};
use crate::error::{Error, Result};
use crate::events::EventManager;
use crate::interface::InterfaceTable;
use crate::plugin::{Category, Plugin, PluginId, SettingId};
use crate::profiles::validate_profile_name;
use crate::setting::Setting;
use crate::watch::{FileWatches, WatchId};
use log::{debug, warn};
use std::any::Any;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Plugins, settings, backend and bookkeeping for one screen
pub struct Context {
    config: ContextConfig,
    interfaces: InterfaceTable,

    /// Slots are never reused so that handles of unloaded plugins stay dead
    plugins: Vec<Option<Plugin>>,
    changed: Vec<SettingId>,

    backend: Option<Box<dyn Backend>>,
    profile: String,
    integration: bool,
    autosort: bool,

    watches: FileWatches,
    options_watch: Option<WatchId>,
    options_dirty: Arc<AtomicBool>,

    events: Arc<EventManager>,
    private_data: Option<Box<dyn Any>>,
}

/// Disjoint borrows handed to backend calls
pub(crate) struct BackendParts<'a> {
    pub backend: &'a mut dyn Backend,
    pub ctx: BackendContext<'a>,
    pub plugins: &'a mut [Option<Plugin>],
}

impl Context {
    /// Create a builder for a context
    pub fn builder() -> ContextBuilder {
        ContextBuilder::new()
    }

    /// Create a context, load every plugin found in the configured metadata
    /// directory and read their values from the backend
    ///
    /// # Errors
    ///
    /// Returns an error if the options file exists but cannot be read, or if
    /// the metadata directory cannot be enumerated.
    pub fn new(config: ContextConfig) -> Result<Self> {
        ContextBuilder::from_config(config).build()
    }

    /// Create a context without loading any plugin
    ///
    /// # Errors
    ///
    /// Returns an error if the options file exists but cannot be read.
    pub fn empty(config: ContextConfig) -> Result<Self> {
        Self::assemble(config, InterfaceTable::default())
    }

    pub(crate) fn assemble(config: ContextConfig, interfaces: InterfaceTable) -> Result<Self> {
        let options_path = config.options_path();
        let options = GlobalOptions::load(&options_path)?;

        let profile = match validate_profile_name(&options.profile) {
            Ok(()) => options.profile.clone(),
            Err(e) => {
                warn!("Ignoring stored profile: {e}");
                String::new()
            }
        };

        let mut context = Self {
            config,
            interfaces,
            plugins: Vec::new(),
            changed: Vec::new(),
            backend: None,
            profile,
            integration: options.integration,
            autosort: options.plugin_list_autosort,
            watches: FileWatches::new(),
            options_watch: None,
            options_dirty: Arc::new(AtomicBool::new(false)),
            events: Arc::new(EventManager::new()),
            private_data: None,
        };

        let dirty = Arc::clone(&context.options_dirty);
        context.options_watch = Some(context.watches.add(options_path, true, move |_| {
            dirty.store(true, Ordering::SeqCst);
        }));

        if context.config.load_backend {
            let name = context
                .config
                .backend
                .clone()
                .unwrap_or_else(|| options.backend.clone());
            if let Err(e) = context.attach_backend(&name) {
                warn!("Unable to load backend '{name}': {e}");
            }
        }

        debug!(
            "Context ready (screen {}, profile '{}')",
            context.config.screen, context.profile
        );
        Ok(context)
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    #[must_use]
    pub fn config(&self) -> &ContextConfig {
        &self.config
    }

    #[must_use]
    pub fn screen(&self) -> u32 {
        self.config.screen
    }

    #[must_use]
    pub fn interfaces(&self) -> &InterfaceTable {
        &self.interfaces
    }

    /// Change listeners, notified with `plugin/setting` keys
    #[must_use]
    pub fn events(&self) -> &Arc<EventManager> {
        &self.events
    }

    /// Store host data on the context, replacing any previous value
    pub fn set_private_data<T: Any>(&mut self, data: T) {
        self.private_data = Some(Box::new(data));
    }

    /// Host data, if some of type `T` was stored
    #[must_use]
    pub fn private_data<T: Any>(&self) -> Option<&T> {
        self.private_data.as_ref()?.downcast_ref()
    }

    pub fn private_data_mut<T: Any>(&mut self) -> Option<&mut T> {
        self.private_data.as_mut()?.downcast_mut()
    }

    pub fn take_private_data(&mut self) -> Option<Box<dyn Any>> {
        self.private_data.take()
    }

    // =========================================================================
    // Plugins
    // =========================================================================

    /// Add a plugin, or merge its settings into a loaded plugin of the
    /// same name. Loading the same plugin twice never duplicates settings.
    pub fn load_plugin(&mut self, plugin: Plugin) -> PluginId {
        if let Some(id) = self.find_plugin(plugin.name()) {
            if let Some(Some(existing)) = self.plugins.get_mut(id.0) {
                for setting in plugin.settings() {
                    if existing.find_setting(setting.name()).is_none() {
                        existing.add_setting(setting.clone());
                    }
                }
            }
            return id;
        }

        debug!("Loaded plugin '{}'", plugin.name());
        self.plugins.push(Some(plugin));
        PluginId(self.plugins.len() - 1)
    }

    /// Remove a plugin; its handles and pending changes become invalid
    pub fn unload_plugin(&mut self, id: PluginId) -> Option<Plugin> {
        let plugin = self.plugins.get_mut(id.0)?.take()?;
        self.changed.retain(|s| s.plugin != id);
        debug!("Unloaded plugin '{}'", plugin.name());
        Some(plugin)
    }

    #[must_use]
    pub fn find_plugin(&self, name: &str) -> Option<PluginId> {
        self.plugins
            .iter()
            .position(|p| p.as_ref().is_some_and(|p| p.name() == name))
            .map(PluginId)
    }

    #[must_use]
    pub fn plugin(&self, id: PluginId) -> Option<&Plugin> {
        self.plugins.get(id.0)?.as_ref()
    }

    #[must_use]
    pub fn plugin_by_name(&self, name: &str) -> Option<&Plugin> {
        self.plugin(self.find_plugin(name)?)
    }

    /// Loaded plugins in load order
    pub fn plugins(&self) -> impl Iterator<Item = (PluginId, &Plugin)> {
        self.plugins
            .iter()
            .enumerate()
            .filter_map(|(i, p)| p.as_ref().map(|p| (PluginId(i), p)))
    }

    pub(crate) fn plugin_refs(&self) -> Vec<&Plugin> {
        self.plugins.iter().flatten().collect()
    }

    pub(crate) fn plugin_mut(&mut self, id: PluginId) -> Result<&mut Plugin> {
        self.plugins
            .get_mut(id.0)
            .and_then(Option::as_mut)
            .ok_or_else(|| Error::PluginNotFound(format!("#{}", id.0)))
    }

    #[must_use]
    pub fn plugin_is_active(&self, name: &str) -> bool {
        self.plugin_by_name(name).is_some_and(Plugin::is_active)
    }

    /// Plugins collated by category, categories in first-seen order
    #[must_use]
    pub fn categories(&self) -> Vec<Category> {
        let mut categories: Vec<Category> = Vec::new();
        for (_, plugin) in self.plugins() {
            match categories.iter_mut().find(|c| c.name == plugin.category()) {
                Some(category) => category.plugins.push(plugin.name().to_string()),
                None => categories.push(Category {
                    name: plugin.category().to_string(),
                    plugins: vec![plugin.name().to_string()],
                }),
            }
        }
        categories
    }

    // =========================================================================
    // Settings
    // =========================================================================

    #[must_use]
    pub fn find_setting(&self, plugin: PluginId, name: &str) -> Option<SettingId> {
        let index = self.plugin(plugin)?.setting_index(name)?;
        Some(SettingId { plugin, index })
    }

    /// Handle of `plugin/setting` by names
    #[must_use]
    pub fn setting_id(&self, plugin: &str, setting: &str) -> Option<SettingId> {
        self.find_setting(self.find_plugin(plugin)?, setting)
    }

    #[must_use]
    pub fn setting(&self, id: SettingId) -> Option<&Setting> {
        self.plugin(id.plugin)?.setting_at(id.index)
    }

    /// Look up a setting, failing with `SettingNotFound`
    pub fn require_setting(&self, id: SettingId) -> Result<&Setting> {
        self.setting(id)
            .ok_or_else(|| Error::SettingNotFound(format!("#{}/#{}", id.plugin.0, id.index)))
    }

    // =========================================================================
    // Backend plumbing
    // =========================================================================

    pub(crate) fn backend_parts(&mut self) -> Result<BackendParts<'_>> {
        let backend = self.backend.as_deref_mut().ok_or(Error::NoBackend)?;
        Ok(BackendParts {
            backend,
            ctx: BackendContext {
                screen: self.config.screen,
                profile: &self.profile,
                config_dir: &self.config.config_dir,
                watches: &mut self.watches,
            },
            plugins: &mut self.plugins,
        })
    }
}

impl Drop for Context {
    fn drop(&mut self) {
        if let Some(mut backend) = self.backend.take() {
            let mut ctx = BackendContext {
                screen: self.config.screen,
                profile: &self.profile,
                config_dir: &self.config.config_dir,
                watches: &mut self.watches,
            };
            if let Err(e) = backend.fini(&mut ctx) {
                warn!("Backend cleanup failed: {e}");
            }
        }
    }
}

impl std::fmt::Debug for Context {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Context")
            .field("config", &self.config)
            .field("plugins", &self.plugins().map(|(_, p)| p.name()).collect::<Vec<_>>())
            .field("changed", &self.changed.len())
            .field("backend", &self.backend.as_ref().map(|b| b.info().name))
            .field("profile", &self.profile)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::SettingValue;

    fn context() -> Context {
        let dir = std::env::temp_dir().join("ccsettings-unit-context");
        Context::empty(
            ContextConfig::builder()
                .config_dir(dir)
                .persist_options(false)
                .no_backend()
                .build(),
        )
        .unwrap()
    }

    #[test]
    fn test_load_plugin_is_idempotent() {
        let mut context = context();
        let plugin = Plugin::new("cube").with_setting(Setting::new("speed", SettingValue::Float(1.0)));

        let first = context.load_plugin(plugin.clone());
        let second = context.load_plugin(
            plugin.with_setting(Setting::new("blend", SettingValue::Bool(true))),
        );

        assert_eq!(first, second);
        assert_eq!(context.plugins().count(), 1);
        let names: Vec<&str> = context
            .plugin(first)
            .unwrap()
            .settings()
            .iter()
            .map(Setting::name)
            .collect();
        assert_eq!(names, ["speed", "blend"]);
    }

    #[test]
    fn test_unload_invalidates_handles() {
        let mut context = context();
        let id = context.load_plugin(Plugin::new("wobbly"));
        let other = context.load_plugin(Plugin::new("move"));

        assert!(context.unload_plugin(id).is_some());
        assert!(context.plugin(id).is_none());
        assert!(context.unload_plugin(id).is_none());
        assert_eq!(context.find_plugin("move"), Some(other));
        assert_eq!(context.find_plugin("wobbly"), None);
    }

    #[test]
    fn test_categories_keep_first_seen_order() {
        let mut context = context();
        context.load_plugin(Plugin::new("cube").with_category("Desktop"));
        context.load_plugin(Plugin::new("blur").with_category("Effects"));
        context.load_plugin(Plugin::new("rotate").with_category("Desktop"));

        let categories = context.categories();
        assert_eq!(categories.len(), 2);
        assert_eq!(categories[0].name, "Desktop");
        assert_eq!(categories[0].plugins, ["cube", "rotate"]);
        assert_eq!(categories[1].plugins, ["blur"]);
    }

    #[test]
    fn test_private_data() {
        let mut context = context();
        assert!(context.private_data::<u32>().is_none());

        context.set_private_data(7_u32);
        assert_eq!(context.private_data::<u32>(), Some(&7));
        assert!(context.private_data::<String>().is_none());

        *context.private_data_mut::<u32>().unwrap() += 1;
        assert_eq!(context.private_data::<u32>(), Some(&8));
        assert!(context.take_private_data().is_some());
    }
}
