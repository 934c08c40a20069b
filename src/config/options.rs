//! Persisted global options

use crate::error::Result;
use crate::ini::IniFile;
use std::path::Path;

/// File name of the options file inside the config directory
pub const OPTIONS_FILE: &str = "config";

/// Section holding the options
pub const OPTIONS_SECTION: &str = "general";

const KEY_BACKEND: &str = "backend";
const KEY_PROFILE: &str = "profile";
const KEY_INTEGRATION: &str = "integration";
const KEY_AUTOSORT: &str = "plugin_list_autosort";

/// Backend, profile and behaviour flags shared across contexts
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GlobalOptions {
    pub backend: String,
    /// Empty means the default profile
    pub profile: String,
    pub integration: bool,
    pub plugin_list_autosort: bool,
}

impl Default for GlobalOptions {
    fn default() -> Self {
        Self {
            backend: crate::backend::ini::INI_BACKEND.to_string(),
            profile: String::new(),
            integration: true,
            plugin_list_autosort: true,
        }
    }
}

impl GlobalOptions {
    /// Load options; missing file or keys fall back to the defaults
    pub fn load(path: &Path) -> Result<Self> {
        let file = IniFile::load(path)?;
        let mut options = Self::default();
        if let Some(backend) = file.get_string(OPTIONS_SECTION, KEY_BACKEND) {
            if !backend.is_empty() {
                options.backend = backend;
            }
        }
        if let Some(profile) = file.get_string(OPTIONS_SECTION, KEY_PROFILE) {
            options.profile = profile;
        }
        if let Some(integration) = file.get_bool(OPTIONS_SECTION, KEY_INTEGRATION) {
            options.integration = integration;
        }
        if let Some(autosort) = file.get_bool(OPTIONS_SECTION, KEY_AUTOSORT) {
            options.plugin_list_autosort = autosort;
        }
        Ok(options)
    }

    /// Write the options, keeping unrelated sections of an existing file
    pub fn save(&self, path: &Path) -> Result<()> {
        let mut file = IniFile::load(path)?;
        file.set_string(OPTIONS_SECTION, KEY_BACKEND, &self.backend);
        file.set_string(OPTIONS_SECTION, KEY_PROFILE, &self.profile);
        file.set_bool(OPTIONS_SECTION, KEY_INTEGRATION, self.integration);
        file.set_bool(OPTIONS_SECTION, KEY_AUTOSORT, self.plugin_list_autosort);
        file.save(path)
    }
}
