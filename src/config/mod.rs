//! Configuration for ccsettings
//!
//! [`ContextConfig`] says where a context keeps its files; [`GlobalOptions`]
//! is the small persisted file holding the backend, profile and flag choices
//! shared by every context using the same directory.

mod options;
mod types;

pub use options::{GlobalOptions, OPTIONS_FILE, OPTIONS_SECTION};
pub use types::{ContextConfig, ContextConfigBuilder, expand_home};
