//! Builder for Context
//!
//! This module contains [`ContextBuilder`] which provides a fluent API for
//! creating a [`Context`](super::Context).

use crate::backend::Backend;
use crate::config::{ContextConfig, ContextConfigBuilder};
use crate::error::{Error, Result};
use crate::interface::{InterfaceTable, PluginResolver};
use crate::metadata::{JsonMetadataSource, MetadataSource};
use crate::plugin::Plugin;
use log::{debug, warn};
use std::path::PathBuf;

use super::Context;

enum ConfigSource {
    Builder(ContextConfigBuilder),
    Ready(ContextConfig),
}

/// Builder for creating a [`Context`] with a fluent API.
///
/// Plugins come from the metadata directory (JSON descriptors), from an
/// explicit [`MetadataSource`], and from plugins added directly; they are
/// loaded in that order. Values are then read from the backend.
///
/// # Example
///
/// ```rust,no_run
/// use ccsettings::Context;
///
/// let context = Context::builder()
///     .config_dir("~/.config/compiz-1/compizconfig")
///     .metadata_dir("/usr/share/ccsettings/metadata")
///     .screen(0)
///     .build()
///     .unwrap();
/// ```
pub struct ContextBuilder {
    config: ConfigSource,
    interfaces: InterfaceTable,
    sources: Vec<Box<dyn MetadataSource>>,
    plugins: Vec<Plugin>,
}

impl Default for ContextBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ContextBuilder {
    pub fn new() -> Self {
        Self {
            config: ConfigSource::Builder(ContextConfigBuilder::new()),
            interfaces: InterfaceTable::default(),
            sources: Vec::new(),
            plugins: Vec::new(),
        }
    }

    /// Start from a finished configuration
    pub fn from_config(config: ContextConfig) -> Self {
        Self {
            config: ConfigSource::Ready(config),
            ..Self::new()
        }
    }

    fn map_config(mut self, f: impl FnOnce(ContextConfigBuilder) -> ContextConfigBuilder) -> Self {
        if let ConfigSource::Builder(builder) = self.config {
            self.config = ConfigSource::Builder(f(builder));
        } else {
            warn!("Context configuration is fixed, ignoring builder option");
        }
        self
    }

    /// Set the configuration directory.
    ///
    /// Supports `~` expansion for home directory.
    pub fn config_dir(self, path: impl Into<PathBuf>) -> Self {
        self.map_config(|c| c.config_dir(path))
    }

    /// Directory of JSON plugin descriptors to enumerate
    pub fn metadata_dir(self, path: impl Into<PathBuf>) -> Self {
        self.map_config(|c| c.metadata_dir(path))
    }

    pub fn screen(self, screen: u32) -> Self {
        self.map_config(|c| c.screen(screen))
    }

    /// Whether option changes are written to the options file (default: true)
    pub fn persist_options(self, persist: bool) -> Self {
        self.map_config(|c| c.persist_options(persist))
    }

    /// Use this backend regardless of the options file
    pub fn backend(self, name: impl Into<String>) -> Self {
        self.map_config(|c| c.backend(name))
    }

    /// Start without a backend
    pub fn no_backend(self) -> Self {
        self.map_config(ContextConfigBuilder::no_backend)
    }

    /// Replace the whole interface table
    pub fn interfaces(mut self, interfaces: InterfaceTable) -> Self {
        self.interfaces = interfaces;
        self
    }

    /// Replace the plugin resolver
    pub fn resolver(mut self, resolver: impl PluginResolver + 'static) -> Self {
        self.interfaces = self.interfaces.with_resolver(resolver);
        self
    }

    /// Make an extra backend selectable by name
    pub fn register_backend<F>(mut self, name: impl Into<String>, factory: F) -> Self
    where
        F: Fn() -> Box<dyn Backend> + Send + Sync + 'static,
    {
        self.interfaces = self.interfaces.with_backend(name, factory);
        self
    }

    /// Load every plugin of this source
    pub fn metadata_source(mut self, source: impl MetadataSource + 'static) -> Self {
        self.sources.push(Box::new(source));
        self
    }

    /// Load this plugin
    pub fn plugin(mut self, plugin: Plugin) -> Self {
        self.plugins.push(plugin);
        self
    }

    fn into_parts(self) -> (ContextConfig, InterfaceTable, Vec<Box<dyn MetadataSource>>, Vec<Plugin>) {
        let config = match self.config {
            ConfigSource::Builder(builder) => builder.build(),
            ConfigSource::Ready(config) => config,
        };
        (config, self.interfaces, self.sources, self.plugins)
    }

    /// Build the context without loading plugins or reading values
    ///
    /// # Errors
    ///
    /// Returns an error if the options file exists but cannot be read.
    pub fn build_empty(self) -> Result<Context> {
        let (config, interfaces, _, _) = self.into_parts();
        Context::assemble(config, interfaces)
    }

    /// Build the context, load its plugins and read their values
    ///
    /// Plugins whose descriptors fail to load are logged and skipped. A
    /// missing backend is not an error; reading is skipped then and the
    /// default active plugin list applies.
    ///
    /// # Errors
    ///
    /// Returns an error if the options file or a metadata source cannot be
    /// read, or if the backend fails while reading.
    pub fn build(self) -> Result<Context> {
        let (config, interfaces, mut sources, plugins) = self.into_parts();
        if let Some(dir) = &config.metadata_dir {
            sources.insert(0, Box::new(JsonMetadataSource::new(dir)));
        }

        let mut context = Context::assemble(config, interfaces)?;
        for source in &sources {
            context.load_plugins_from(source.as_ref())?;
        }
        for plugin in plugins {
            context.load_plugin(plugin);
        }

        match context.read_settings() {
            Ok(()) => {}
            Err(Error::NoBackend) => context.apply_active_plugin_setting(),
            Err(e) => return Err(e),
        }
        Ok(context)
    }
}

impl Context {
    /// Load one plugin from a metadata source
    ///
    /// # Errors
    ///
    /// Returns `PluginNotFound` or the descriptor's parse/validation error.
    pub fn load_plugin_from(
        &mut self,
        source: &dyn MetadataSource,
        name: &str,
    ) -> Result<crate::plugin::PluginId> {
        let plugin = source.load(name)?.to_plugin()?;
        Ok(self.load_plugin(plugin))
    }

    /// Load every plugin a metadata source knows; returns how many loaded
    ///
    /// # Errors
    ///
    /// Returns an error only if the source cannot be enumerated.
    pub fn load_plugins_from(&mut self, source: &dyn MetadataSource) -> Result<usize> {
        let mut loaded = 0;
        for name in source.plugin_names()? {
            match self.load_plugin_from(source, &name) {
                Ok(_) => loaded += 1,
                Err(e) => warn!("Skipping plugin '{name}': {e}"),
            }
        }
        debug!("Loaded {loaded} plugins from metadata");
        Ok(loaded)
    }
}
