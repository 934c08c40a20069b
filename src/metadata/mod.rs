//! Plugin metadata
//!
//! Plugins and their settings are described by [`PluginDescriptor`]s. A
//! [`MetadataSource`] enumerates and loads them; the context turns each
//! descriptor into a [`Plugin`](crate::Plugin).
//!
//! Descriptor files live one per plugin in a directory, named
//! `<plugin>.json` (or `<plugin>.toml` with the `toml` feature):
//!
//! ```json
//! {
//!   "name": "cube",
//!   "requires_plugins": ["rotate"],
//!   "settings": [
//!     {"name": "speed", "type": "float", "default": "1.0",
//!      "info": {"kind": "float", "min": 0.1, "max": 10.0, "precision": 0.1}}
//!   ]
//! }
//! ```

mod descriptor;
mod format;

pub use descriptor::{PluginDescriptor, SettingDescriptor};
#[cfg(feature = "toml")]
pub use format::TomlFormat;
pub use format::{DescriptorFormat, JsonFormat};

use crate::error::{self, Error, Result};
use std::path::{Path, PathBuf};

/// Where plugin descriptors come from
pub trait MetadataSource {
    /// Names of the plugins this source can load
    ///
    /// # Errors
    ///
    /// Returns an error if the source cannot be enumerated.
    fn plugin_names(&self) -> Result<Vec<String>>;

    /// Load one descriptor
    ///
    /// # Errors
    ///
    /// Returns `PluginNotFound` for unknown names, or a parse error.
    fn load(&self, name: &str) -> Result<PluginDescriptor>;
}

/// A directory holding one descriptor file per plugin
#[derive(Debug, Clone)]
pub struct DirectorySource<F: DescriptorFormat> {
    dir: PathBuf,
    format: F,
}

/// JSON descriptor directory
pub type JsonMetadataSource = DirectorySource<JsonFormat>;

/// TOML descriptor directory
#[cfg(feature = "toml")]
pub type TomlMetadataSource = DirectorySource<TomlFormat>;

impl JsonMetadataSource {
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        DirectorySource::with_format(dir, JsonFormat::new())
    }
}

#[cfg(feature = "toml")]
impl TomlMetadataSource {
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        DirectorySource::with_format(dir, TomlFormat)
    }
}

impl<F: DescriptorFormat> DirectorySource<F> {
    pub fn with_format(dir: impl Into<PathBuf>, format: F) -> Self {
        Self {
            dir: dir.into(),
            format,
        }
    }

    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, name: &str) -> PathBuf {
        self.dir.join(format!("{name}.{}", self.format.extension()))
    }

    /// Write a descriptor file for `descriptor`
    pub fn store(&self, descriptor: &PluginDescriptor) -> Result<()> {
        self.format.write(&self.path_for(&descriptor.name), descriptor)
    }
}

impl<F: DescriptorFormat> MetadataSource for DirectorySource<F> {
    fn plugin_names(&self) -> Result<Vec<String>> {
        if !self.dir.exists() {
            return Ok(Vec::new());
        }
        let mut names = Vec::new();
        for entry in error::read_dir(&self.dir)?.flatten() {
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some(self.format.extension()) {
                continue;
            }
            if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                names.push(stem.to_string());
            }
        }
        names.sort();
        Ok(names)
    }

    fn load(&self, name: &str) -> Result<PluginDescriptor> {
        let mut descriptor: PluginDescriptor =
            self.format.read(&self.path_for(name)).map_err(|e| match e {
                Error::PathNotFound(_) => Error::PluginNotFound(name.to_string()),
                other => other,
            })?;
        if descriptor.name.is_empty() {
            descriptor.name = name.to_string();
        }
        Ok(descriptor)
    }
}

/// Descriptors held in memory, in insertion order
#[derive(Debug, Clone, Default)]
pub struct MemoryMetadataSource {
    descriptors: Vec<PluginDescriptor>,
}

impl MemoryMetadataSource {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a descriptor, replacing one of the same name
    pub fn insert(&mut self, descriptor: PluginDescriptor) {
        match self
            .descriptors
            .iter_mut()
            .find(|d| d.name == descriptor.name)
        {
            Some(existing) => *existing = descriptor,
            None => self.descriptors.push(descriptor),
        }
    }

    #[must_use]
    pub fn with(mut self, descriptor: PluginDescriptor) -> Self {
        self.insert(descriptor);
        self
    }
}

impl MetadataSource for MemoryMetadataSource {
    fn plugin_names(&self) -> Result<Vec<String>> {
        Ok(self.descriptors.iter().map(|d| d.name.clone()).collect())
    }

    fn load(&self, name: &str) -> Result<PluginDescriptor> {
        self.descriptors
            .iter()
            .find(|d| d.name == name)
            .cloned()
            .ok_or_else(|| Error::PluginNotFound(name.to_string()))
    }
}
