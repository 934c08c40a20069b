//! # ccsettings - compositor settings engine
//!
//! A library holding the settings of a plugin-based compositor: typed
//! setting descriptors grouped by plugin, plugin dependency resolution,
//! pluggable storage backends with profiles, and change notification.
//!
//! ## Features
//!
//! - **Typed values**: bool, int, float, string, color, key, button, edge,
//!   bell, match and homogeneous lists, with range clamping
//! - **Dependency resolution**: load-order sorting of active plugins and
//!   enable/disable conflict checks
//! - **Backends**: flat INI files out of the box, one file per profile,
//!   watched for external edits; more backends can be registered by name
//! - **Change tracking**: a changed list for incremental writes plus change
//!   listeners
//! - **Plugin metadata**: plugin descriptors from JSON (or TOML) files
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use ccsettings::{Context, ProcessEventsFlags};
//!
//! # fn example() -> ccsettings::Result<()> {
//! ccsettings::logging::init();
//!
//! let mut context = Context::builder()
//!     .config_dir("~/.config/compiz-1/compizconfig")
//!     .metadata_dir("/usr/share/ccsettings/metadata")
//!     .build()?;
//!
//! if let Some(speed) = context.setting_id("cube", "speed") {
//!     context.set_float(speed, 2.0, true)?;
//!     context.write_changed_settings()?;
//! }
//!
//! // from the host's main loop
//! context.process_events(ProcessEventsFlags::NO_MAIN_LOOP)?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Enabling plugins
//!
//! ```rust,no_run
//! use ccsettings::Context;
//!
//! # fn example(context: &mut Context) -> ccsettings::Result<()> {
//! let cube = context.find_plugin("cube").expect("cube is installed");
//! let conflicts = context.can_enable_plugin(cube)?;
//! if conflicts.is_empty() {
//!     // with autosort on, core's active_plugins is updated and stored
//!     context.set_plugin_active(cube, true)?;
//! } else {
//!     for conflict in conflicts {
//!         println!("{:?}: {}", conflict.conflict_type, conflict.value);
//!     }
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Default Value Behavior
//!
//! Backends store only settings that differ from their default. Resetting
//! a setting and writing it removes its key from storage, so changed
//! defaults apply to everyone who never customized them.

pub mod backend;
pub mod binding;
pub mod config;
mod context;
pub mod error;
pub mod events;
pub mod ini;
pub mod interface;
pub mod logging;
pub mod metadata;
pub mod plugin;
pub mod profiles;
pub mod setting;
pub mod sync;
pub mod value;
pub mod watch;

pub use backend::{Backend, BackendContext, BackendInfo, BackendRegistry, IniBackend, MemoryBackend};
pub use config::{ContextConfig, ContextConfigBuilder, GlobalOptions};
pub use context::{Context, ContextBuilder};
pub use error::{Error, Result};
pub use events::EventManager;
pub use interface::{DefaultResolver, InterfaceTable, PluginResolver};
pub use metadata::{
    JsonMetadataSource, MemoryMetadataSource, MetadataSource, PluginDescriptor, SettingDescriptor,
};
#[cfg(feature = "toml")]
pub use metadata::TomlMetadataSource;
pub use plugin::{
    Category, ConflictType, Group, Plugin, PluginConflict, PluginId, SettingId, SubGroup,
};
pub use setting::{SetOutcome, Setting, SettingInfo};
pub use value::{ButtonValue, ColorValue, KeyValue, SettingType, SettingValue, ValueList};
pub use watch::{FileWatches, ProcessEventsFlags, WatchId};
