//! Context configuration and its builder

use std::path::{Path, PathBuf};

use super::options::OPTIONS_FILE;

/// Directory below the user config dir holding profiles and options
pub const DEFAULT_SUBDIR: [&str; 2] = ["compiz-1", "compizconfig"];

/// Configuration for creating a [`Context`](crate::Context)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContextConfig {
    /// Directory holding the options file and backend data (profiles)
    pub config_dir: PathBuf,

    /// Directory with plugin descriptor files, enumerated by `Context::new`
    pub metadata_dir: Option<PathBuf>,

    /// Screen number; part of every stored key
    pub screen: u32,

    /// Write backend/profile/flag changes back to the options file
    pub persist_options: bool,

    /// Backend to load instead of the one named in the options file
    pub backend: Option<String>,

    /// Load a backend at all
    pub load_backend: bool,
}

impl Default for ContextConfig {
    fn default() -> Self {
        ContextConfigBuilder::new().build()
    }
}

impl ContextConfig {
    /// Create a new builder for ContextConfig
    ///
    /// # Example
    /// ```rust
    /// use ccsettings::ContextConfig;
    ///
    /// let config = ContextConfig::builder()
    ///     .config_dir("~/.config/compiz-1/compizconfig")
    ///     .screen(0)
    ///     .build();
    /// ```
    pub fn builder() -> ContextConfigBuilder {
        ContextConfigBuilder::new()
    }

    /// Full path of the persisted options file
    #[must_use]
    pub fn options_path(&self) -> PathBuf {
        self.config_dir.join(OPTIONS_FILE)
    }
}

/// Expand a leading `~` to the home directory
pub fn expand_home(path: impl Into<PathBuf>) -> PathBuf {
    let path: PathBuf = path.into();
    if !path.starts_with("~") {
        return path;
    }
    match dirs::home_dir() {
        Some(home) => home.join(path.strip_prefix("~").unwrap_or(Path::new(""))),
        None => path,
    }
}

/// Builder for creating ContextConfig with a fluent API
#[derive(Debug, Clone, Default)]
pub struct ContextConfigBuilder {
    config_dir: Option<PathBuf>,
    metadata_dir: Option<PathBuf>,
    screen: u32,
    persist_options: Option<bool>,
    backend: Option<String>,
    load_backend: Option<bool>,
}

impl ContextConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the configuration directory
    ///
    /// Supports `~` expansion for home directory.
    pub fn config_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.config_dir = Some(expand_home(path));
        self
    }

    /// Set the plugin descriptor directory (`~` is expanded)
    pub fn metadata_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.metadata_dir = Some(expand_home(path));
        self
    }

    pub fn screen(mut self, screen: u32) -> Self {
        self.screen = screen;
        self
    }

    /// Whether option changes are written to the options file (default: true)
    pub fn persist_options(mut self, persist: bool) -> Self {
        self.persist_options = Some(persist);
        self
    }

    /// Load this backend regardless of the options file
    pub fn backend(mut self, name: impl Into<String>) -> Self {
        self.backend = Some(name.into());
        self.load_backend = Some(true);
        self
    }

    /// Start without any backend; reads and writes fail until one is set
    pub fn no_backend(mut self) -> Self {
        self.load_backend = Some(false);
        self
    }

    /// Build the ContextConfig
    ///
    /// Without an explicit `config_dir`, `compiz-1/compizconfig` below the
    /// user configuration directory is used (honouring `XDG_CONFIG_HOME`).
    pub fn build(self) -> ContextConfig {
        let config_dir = self.config_dir.unwrap_or_else(|| {
            dirs::config_dir()
                .map(|d| DEFAULT_SUBDIR.iter().fold(d, |acc, part| acc.join(part)))
                .unwrap_or_else(|| PathBuf::from("."))
        });

        ContextConfig {
            config_dir,
            metadata_dir: self.metadata_dir,
            screen: self.screen,
            persist_options: self.persist_options.unwrap_or(true),
            backend: self.backend,
            load_backend: self.load_backend.unwrap_or(true),
        }
    }
}
