//! Profile names
//!
//! A profile is a complete set of stored values that a backend keeps under
//! a name. The empty name selects the default profile, which always exists
//! and cannot be deleted.

use crate::error::{Error, Result};

/// Name of the default profile as seen by the context
pub const DEFAULT_PROFILE: &str = "";

/// Validate a profile name
///
/// The empty name is the default profile. Other names contain only
/// alphanumeric characters, underscores, hyphens and spaces; they cannot
/// start with a dot or contain path separators.
///
/// # Errors
///
/// Returns `InvalidProfileName` describing the first rule the name breaks.
pub fn validate_profile_name(name: &str) -> Result<()> {
    if name.is_empty() {
        return Ok(());
    }

    if name.starts_with('.') {
        return Err(Error::InvalidProfileName(format!(
            "{name}: Profile name cannot start with a dot",
        )));
    }

    if name.contains('/') || name.contains('\\') || name.contains("..") {
        return Err(Error::InvalidProfileName(format!(
            "{name}: Profile name cannot contain path separators",
        )));
    }

    if name.trim() != name {
        return Err(Error::InvalidProfileName(format!(
            "{name}: Profile name cannot start or end with whitespace",
        )));
    }

    // Allow only alphanumeric, underscore, hyphen, space
    if !name
        .chars()
        .all(|c| c.is_alphanumeric() || c == '_' || c == '-' || c == ' ')
    {
        return Err(Error::InvalidProfileName(format!(
            "{name}: Profile name can only contain alphanumeric characters, underscores, hyphens and spaces"
        )));
    }

    Ok(())
}
