//! Host bridging table
//!
//! An embedding host can replace how plugins are ordered and how
//! enable/disable feasibility is judged, and which backends can be
//! selected by name. [`InterfaceTable::default`] uses this crate's own
//! implementations throughout.

use crate::backend::{Backend, BackendRegistry};
use crate::plugin::{Plugin, PluginConflict, conflicts, sort};
use std::sync::Arc;

/// Plugin-level policy used by the context
///
/// Every method has a default body; a host overrides only what it needs.
/// `plugins` always holds every plugin known to the context.
pub trait PluginResolver: Send + Sync {
    /// Active plugin names in load order
    fn sorted_plugin_names(&self, plugins: &[&Plugin]) -> Vec<String> {
        sort::sorted_plugin_names(plugins)
    }

    /// Reasons enabling `candidate` is unsafe; empty means safe
    fn can_enable(&self, plugins: &[&Plugin], candidate: &Plugin) -> Vec<PluginConflict> {
        conflicts::can_enable(plugins, candidate)
    }

    /// Reasons disabling `candidate` is unsafe; empty means safe
    fn can_disable(&self, plugins: &[&Plugin], candidate: &Plugin) -> Vec<PluginConflict> {
        conflicts::can_disable(plugins, candidate)
    }
}

/// The crate's own resolver
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultResolver;

impl PluginResolver for DefaultResolver {}

/// Replaceable implementations used by a [`Context`](crate::Context)
#[derive(Clone)]
pub struct InterfaceTable {
    pub resolver: Arc<dyn PluginResolver>,
    pub backends: BackendRegistry,
}

impl Default for InterfaceTable {
    fn default() -> Self {
        Self {
            resolver: Arc::new(DefaultResolver),
            backends: BackendRegistry::default(),
        }
    }
}

impl InterfaceTable {
    #[must_use]
    pub fn with_resolver(mut self, resolver: impl PluginResolver + 'static) -> Self {
        self.resolver = Arc::new(resolver);
        self
    }

    #[must_use]
    pub fn with_backends(mut self, backends: BackendRegistry) -> Self {
        self.backends = backends;
        self
    }

    /// Register an extra backend next to the existing ones
    #[must_use]
    pub fn with_backend<F>(mut self, name: impl Into<String>, factory: F) -> Self
    where
        F: Fn() -> Box<dyn Backend> + Send + Sync + 'static,
    {
        self.backends.register(name, factory);
        self
    }
}

impl std::fmt::Debug for InterfaceTable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InterfaceTable")
            .field("backends", &self.backends)
            .finish_non_exhaustive()
    }
}
