//! Descriptor file formats

use crate::error::{self, Error, Result};
use serde::{Serialize, de::DeserializeOwned};
use std::path::Path;

/// A serialization format for descriptor files
///
/// This allows keeping descriptors as JSON, TOML or another serde format.
pub trait DescriptorFormat: Clone + Send + Sync {
    /// File extension for this format (e.g., "json", "toml")
    fn extension(&self) -> &str;

    /// Serialize data to string
    fn serialize<T: Serialize>(&self, data: &T) -> Result<String>;

    /// Deserialize data from string
    fn deserialize<T: DeserializeOwned>(&self, content: &str) -> Result<T>;

    /// Read and deserialize from file
    fn read<T: DeserializeOwned>(&self, path: &Path) -> Result<T> {
        let content = error::read_file(path)?;
        self.deserialize(&content)
    }

    /// Serialize and write to file atomically
    fn write<T: Serialize>(&self, path: &Path, data: &T) -> Result<()> {
        let content = self.serialize(data)?;
        error::write_file_atomic(path, content)
    }
}

// =============================================================================
// JSON Format
// =============================================================================

/// JSON descriptors (default)
#[derive(Debug, Clone, Default)]
pub struct JsonFormat {
    /// Pretty print JSON output
    pretty: bool,
}

impl JsonFormat {
    /// Create a JSON format with pretty printing enabled
    #[must_use]
    pub fn new() -> Self {
        Self { pretty: true }
    }

    /// Create a compact JSON format (no pretty printing)
    #[must_use]
    pub fn compact() -> Self {
        Self { pretty: false }
    }
}

impl DescriptorFormat for JsonFormat {
    fn extension(&self) -> &str {
        "json"
    }

    fn serialize<T: Serialize>(&self, data: &T) -> Result<String> {
        if self.pretty {
            serde_json::to_string_pretty(data).map_err(Error::from)
        } else {
            serde_json::to_string(data).map_err(Error::from)
        }
    }

    fn deserialize<T: DeserializeOwned>(&self, content: &str) -> Result<T> {
        serde_json::from_str(content).map_err(Error::from)
    }
}

// =============================================================================
// TOML Format
// =============================================================================

/// TOML descriptors
#[cfg(feature = "toml")]
#[derive(Debug, Clone, Default)]
pub struct TomlFormat;

#[cfg(feature = "toml")]
impl DescriptorFormat for TomlFormat {
    fn extension(&self) -> &str {
        "toml"
    }

    fn serialize<T: Serialize>(&self, data: &T) -> Result<String> {
        toml::to_string_pretty(data).map_err(|e| Error::parse("TOML output", e.to_string()))
    }

    fn deserialize<T: DeserializeOwned>(&self, content: &str) -> Result<T> {
        toml::from_str(content).map_err(|e| Error::parse("TOML input", e.to_string()))
    }
}

// =============================================================================
// Tests
// =============================================================================
