//! Error types for ccsettings

use crate::value::SettingType;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Result type alias for ccsettings operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for ccsettings
#[derive(Error, Debug)]
pub enum Error {
    // -------------------------------------------------------------------------
    // I/O Errors
    // -------------------------------------------------------------------------
    #[error("Failed to read file '{path}': {source}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write file '{path}': {source}")]
    FileWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to create directory '{path}': {source}")]
    DirectoryCreate {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to read directory '{path}': {source}")]
    DirectoryRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to delete file '{path}': {source}")]
    FileDelete {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Path not found: {0}")]
    PathNotFound(PathBuf),

    // -------------------------------------------------------------------------
    // Serialization Errors
    // -------------------------------------------------------------------------
    #[error("Failed to serialize data: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("Parse error in {context}: {message}")]
    Parse { context: String, message: String },

    #[error("Invalid {ty:?} value '{value}'")]
    InvalidValue { ty: SettingType, value: String },

    #[error("Invalid plugin metadata for '{plugin}': {message}")]
    Metadata { plugin: String, message: String },

    // -------------------------------------------------------------------------
    // Lookup Errors
    // -------------------------------------------------------------------------
    #[error("Plugin not found: {0}")]
    PluginNotFound(String),

    #[error("Setting not found: {0}")]
    SettingNotFound(String),

    // -------------------------------------------------------------------------
    // Type Errors
    // -------------------------------------------------------------------------
    #[error("Type mismatch: expected {expected:?}, found {found:?}")]
    TypeMismatch {
        expected: SettingType,
        found: SettingType,
    },

    // -------------------------------------------------------------------------
    // Backend Errors
    // -------------------------------------------------------------------------
    #[error("Backend not found: {0}")]
    BackendNotFound(String),

    #[error("No backend is loaded")]
    NoBackend,

    #[error("Operation not supported by backend '{backend}': {operation}")]
    Unsupported { backend: String, operation: String },

    // -------------------------------------------------------------------------
    // Profile Errors
    // -------------------------------------------------------------------------
    #[error("Invalid profile name: {0}")]
    InvalidProfileName(String),
}

impl Error {
    /// Check if this is a "not found" type error
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            Error::PathNotFound(_)
                | Error::PluginNotFound(_)
                | Error::SettingNotFound(_)
                | Error::BackendNotFound(_)
        )
    }

    /// Check if this error came from a typed accessor used on the wrong type
    #[must_use]
    pub fn is_type_mismatch(&self) -> bool {
        matches!(self, Error::TypeMismatch { .. })
    }

    pub(crate) fn parse(context: impl Into<String>, message: impl Into<String>) -> Self {
        Error::Parse {
            context: context.into(),
            message: message.into(),
        }
    }
}

// =============================================================================
// Filesystem Helper Functions
// =============================================================================
// These reduce repetitive map_err patterns in the storage code.

/// Create the directory that will hold `path`, including missing parents
pub fn create_dir_for(path: &Path) -> Result<()> {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => create_dir(parent),
        _ => Ok(()),
    }
}

/// Create a directory (and parents) with proper error handling
pub fn create_dir(path: &Path) -> Result<()> {
    std::fs::create_dir_all(path).map_err(|e| Error::DirectoryCreate {
        path: path.to_path_buf(),
        source: e,
    })
}

/// Read a whole text file with proper error handling
pub fn read_file(path: &Path) -> Result<String> {
    std::fs::read_to_string(path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            Error::PathNotFound(path.to_path_buf())
        } else {
            Error::FileRead {
                path: path.to_path_buf(),
                source: e,
            }
        }
    })
}

/// Write content to a file atomically
///
/// The parent directory is created on demand, the content goes to a `.tmp`
/// sibling first and is then renamed over the target.
pub fn write_file_atomic(path: &Path, contents: impl AsRef<[u8]>) -> Result<()> {
    create_dir_for(path)?;

    let file_name = path
        .file_name()
        .ok_or_else(|| Error::PathNotFound(path.to_path_buf()))?;
    let mut temp_filename = file_name.to_os_string();
    temp_filename.push(".tmp");
    let temp_path = path.with_file_name(temp_filename);

    std::fs::write(&temp_path, contents).map_err(|e| Error::FileWrite {
        path: temp_path.clone(),
        source: e,
    })?;

    std::fs::rename(&temp_path, path).map_err(|e| Error::FileWrite {
        path: path.to_path_buf(),
        source: e,
    })
}

/// Remove a file, treating an already missing file as success
pub fn remove_file_if_exists(path: &Path) -> Result<bool> {
    match std::fs::remove_file(path) {
        Ok(()) => Ok(true),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
        Err(e) => Err(Error::FileDelete {
            path: path.to_path_buf(),
            source: e,
        }),
    }
}

/// Read directory entries with proper error handling
pub fn read_dir(path: &Path) -> Result<std::fs::ReadDir> {
    std::fs::read_dir(path).map_err(|e| Error::DirectoryRead {
        path: path.to_path_buf(),
        source: e,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_backend_errors_name_the_backend() {
        let err = Error::Unsupported {
            backend: "desktop".into(),
            operation: "write".into(),
        };
        assert_eq!(err.to_string(), "Operation not supported by backend 'desktop': write");
        assert_eq!(
            Error::BackendNotFound("gconf".into()).to_string(),
            "Backend not found: gconf"
        );
    }

    #[test]
    fn test_create_dir_for_nested_file() {
        let dir = tempdir().unwrap();
        let file = dir.path().join("a/b/c/profile.ini");

        create_dir_for(&file).unwrap();

        assert!(dir.path().join("a/b/c").is_dir());
        assert!(!file.exists());
    }

    #[test]
    fn test_atomic_write_leaves_no_temp_file() {
        let dir = tempdir().unwrap();
        let file = dir.path().join("sub/data.ini");

        write_file_atomic(&file, "[core]\n").unwrap();

        assert_eq!(read_file(&file).unwrap(), "[core]\n");
        assert!(!dir.path().join("sub/data.ini.tmp").exists());
    }

    #[test]
    fn test_read_missing_file_is_not_found() {
        let dir = tempdir().unwrap();
        let err = read_file(&dir.path().join("missing.ini")).unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn test_remove_missing_file_is_ok() {
        let dir = tempdir().unwrap();
        assert!(!remove_file_if_exists(&dir.path().join("gone")).unwrap());
    }
}
