//! Backend selection, profiles and persisted options

use super::Context;
use crate::backend::{Backend, BackendContext, BackendInfo};
use crate::config::GlobalOptions;
use crate::error::{Error, Result};
use crate::profiles::validate_profile_name;
use log::{info, warn};

impl Context {
    // =========================================================================
    // Backend
    // =========================================================================

    /// Create and initialize the named backend
    fn open_backend(&mut self, name: &str) -> Result<Box<dyn Backend>> {
        let mut backend = self.interfaces.backends.create(name)?;
        let mut ctx = self.backend_context();
        backend.init(&mut ctx)?;
        Ok(backend)
    }

    /// Tear down a backend that is no longer used
    fn close_backend(&mut self, mut backend: Box<dyn Backend>) {
        let mut ctx = self.backend_context();
        if let Err(e) = backend.fini(&mut ctx) {
            warn!("Backend cleanup failed: {e}");
        }
    }

    fn backend_context(&mut self) -> BackendContext<'_> {
        BackendContext {
            screen: self.config.screen,
            profile: &self.profile,
            config_dir: &self.config.config_dir,
            watches: &mut self.watches,
        }
    }

    /// Create and initialize the named backend, then replace the current one
    ///
    /// The current backend stays in place if the new one cannot be created
    /// or initialized.
    pub(crate) fn attach_backend(&mut self, name: &str) -> Result<()> {
        let backend = self.open_backend(name)?;
        self.install_backend(backend);
        info!("Using backend '{name}'");
        Ok(())
    }

    fn install_backend(&mut self, backend: Box<dyn Backend>) {
        if let Some(old) = self.backend.replace(backend) {
            self.close_backend(old);
        }
    }

    /// Switch to the named backend
    ///
    /// The options file is updated before the switch takes effect.
    ///
    /// # Errors
    ///
    /// Returns `BackendNotFound` for unknown names, the error of the new
    /// backend's initialization, or the error of saving the options file.
    /// In every case the context keeps its backend.
    pub fn set_backend(&mut self, name: &str) -> Result<()> {
        if self.backend_name().as_deref() == Some(name) {
            return Ok(());
        }
        let backend = self.open_backend(name)?;
        let options = GlobalOptions {
            backend: name.to_string(),
            ..self.current_options()
        };
        if let Err(e) = self.write_options(&options) {
            self.close_backend(backend);
            return Err(e);
        }
        self.install_backend(backend);
        info!("Using backend '{name}'");
        Ok(())
    }

    #[must_use]
    pub fn backend_name(&self) -> Option<String> {
        self.backend.as_ref().map(|b| b.info().name)
    }

    /// Description of the active backend
    #[must_use]
    pub fn backend_info(&self) -> Option<BackendInfo> {
        self.backend.as_ref().map(|b| b.info())
    }

    /// Descriptions of every backend that can be selected
    #[must_use]
    pub fn existing_backends(&self) -> Vec<BackendInfo> {
        self.interfaces.backends.infos()
    }

    fn supports_profiles(&self) -> bool {
        self.backend
            .as_ref()
            .is_some_and(|b| b.info().profile_support)
    }

    // =========================================================================
    // Profiles
    // =========================================================================

    /// Current profile; empty is the default profile
    #[must_use]
    pub fn profile(&self) -> &str {
        &self.profile
    }

    /// Select a profile; values are read from it on the next read
    pub fn set_profile(&mut self, name: &str) -> Result<()> {
        validate_profile_name(name)?;
        if self.profile == name {
            return Ok(());
        }
        self.profile = name.to_string();
        info!("Switched to profile '{name}'");
        self.save_options()
    }

    /// Stored profiles, excluding the default profile
    ///
    /// Empty when there is no backend or it has no profile support.
    pub fn existing_profiles(&mut self) -> Result<Vec<String>> {
        if !self.supports_profiles() {
            return Ok(Vec::new());
        }
        let parts = self.backend_parts()?;
        parts.backend.existing_profiles(&parts.ctx)
    }

    /// Delete a stored profile
    ///
    /// The default profile is never deleted. Deleting the current profile
    /// switches to the default profile first.
    pub fn delete_profile(&mut self, name: &str) -> Result<()> {
        validate_profile_name(name)?;
        if name.is_empty() {
            return Err(Error::InvalidProfileName(
                "the default profile cannot be deleted".into(),
            ));
        }
        if !self.supports_profiles() {
            return Ok(());
        }
        if self.profile == name {
            self.set_profile("")?;
        }
        let mut parts = self.backend_parts()?;
        parts.backend.delete_profile(&mut parts.ctx, name)
    }

    // =========================================================================
    // Options
    // =========================================================================

    #[must_use]
    pub fn integration_enabled(&self) -> bool {
        self.integration
    }

    pub fn set_integration_enabled(&mut self, enabled: bool) -> Result<()> {
        if self.integration == enabled {
            return Ok(());
        }
        self.integration = enabled;
        self.save_options()
    }

    #[must_use]
    pub fn plugin_list_autosort(&self) -> bool {
        self.autosort
    }

    /// Turning autosort on sorts and stores the active plugin list at once
    pub fn set_plugin_list_autosort(&mut self, enabled: bool) -> Result<()> {
        if self.autosort == enabled {
            return Ok(());
        }
        self.autosort = enabled;
        self.save_options()?;
        if enabled {
            self.write_auto_sorted_plugin_list()?;
        }
        Ok(())
    }

    fn current_options(&self) -> GlobalOptions {
        GlobalOptions {
            backend: self
                .backend_name()
                .unwrap_or_else(|| GlobalOptions::default().backend),
            profile: self.profile.clone(),
            integration: self.integration,
            plugin_list_autosort: self.autosort,
        }
    }

    fn save_options(&mut self) -> Result<()> {
        let options = self.current_options();
        self.write_options(&options)
    }

    /// Write the options file without triggering our own watch
    fn write_options(&mut self, options: &GlobalOptions) -> Result<()> {
        if !self.config.persist_options {
            return Ok(());
        }
        if let Some(watch) = self.options_watch {
            self.watches.disable(watch);
        }
        let result = options.save(&self.config.options_path());
        if let Some(watch) = self.options_watch {
            self.watches.enable(watch);
        }
        result
    }

    /// Apply an externally edited options file
    pub(crate) fn reload_options(&mut self) -> Result<()> {
        let options = GlobalOptions::load(&self.config.options_path())?;
        info!("Options file changed, applying");

        let mut reread = false;
        if self.config.load_backend
            && self.backend_name().as_deref() != Some(options.backend.as_str())
        {
            match self.attach_backend(&options.backend) {
                Ok(()) => reread = true,
                Err(e) => warn!("Unable to switch to backend '{}': {e}", options.backend),
            }
        }
        if options.profile != self.profile {
            match validate_profile_name(&options.profile) {
                Ok(()) => {
                    self.profile = options.profile;
                    reread = true;
                }
                Err(e) => warn!("Ignoring stored profile: {e}"),
            }
        }
        self.integration = options.integration;
        self.autosort = options.plugin_list_autosort;

        if reread && self.backend.is_some() {
            self.read_settings()?;
        }
        Ok(())
    }
}
