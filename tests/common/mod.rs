//! Common test utilities for ccsettings integration tests
//!
//! Provides a sample plugin set, a fixture with a temporary config
//! directory, and helpers for inspecting stored files.

#![allow(dead_code)]

use ccsettings::{
    ButtonValue, ColorValue, Context, KeyValue, Plugin, Setting, SettingId, SettingInfo,
    SettingValue, ValueList,
};
use ccsettings::setting::{IntDesc, IntInfo};
use std::path::{Path, PathBuf};
use tempfile::TempDir;

// =============================================================================
// Sample Plugins
// =============================================================================

pub fn core_plugin() -> Plugin {
    Plugin::new("core")
        .with_short_desc("General Options")
        .with_category("General")
        .with_setting(
            Setting::new(
                "active_plugins",
                SettingValue::List(ValueList::from_strings(&["core"])),
            )
            .with_group("", ""),
        )
        .with_setting(
            Setting::int("hsize", 4, 1, 32)
                .unwrap()
                .with_short_desc("Horizontal Virtual Size"),
        )
}

pub fn cube_plugin() -> Plugin {
    Plugin::new("cube")
        .with_short_desc("Desktop Cube")
        .with_category("Desktop")
        .provides_features(["largedesktop"])
        .with_setting(
            Setting::float("speed", 1.0, 0.1, 10.0, 0.1)
                .unwrap()
                .with_group("Behaviour", "Motion"),
        )
        .with_setting(Setting::new("blend", SettingValue::Bool(true)).with_group("Appearance", ""))
        .with_setting(
            Setting::new(
                "top_color",
                SettingValue::Color(ColorValue::from_rgba8(0xff, 0xff, 0xff, 0xff)),
            )
            .with_group("Appearance", ""),
        )
        .with_setting(
            Setting::new(
                "images",
                SettingValue::List(ValueList::from_strings(&["freedesktop"])),
            )
            .with_group("Appearance", ""),
        )
        .with_setting(
            Setting::new("mode", SettingValue::Int(0))
                .with_info(SettingInfo::Int(IntInfo {
                    min: 0,
                    max: 2,
                    descriptions: vec![
                        IntDesc {
                            value: 0,
                            name: "Transparent".into(),
                        },
                        IntDesc {
                            value: 1,
                            name: "Opaque".into(),
                        },
                    ],
                }))
                .unwrap(),
        )
}

pub fn rotate_plugin() -> Plugin {
    Plugin::new("rotate")
        .with_category("Desktop")
        .requires_plugins(["cube"])
        .load_after(["cube"])
        .with_setting(Setting::new("snap_top", SettingValue::Bool(false)))
}

pub fn decor_plugin() -> Plugin {
    Plugin::new("decor")
        .with_category("Effects")
        .provides_features(["decorations"])
}

pub fn kdecor_plugin() -> Plugin {
    Plugin::new("kdecor")
        .with_category("Effects")
        .provides_features(["decorations"])
}

pub fn shadow_plugin() -> Plugin {
    Plugin::new("shadow")
        .with_category("Effects")
        .requires_features(["decorations"])
        .load_after(["decor"])
}

pub fn wobbly_plugin() -> Plugin {
    Plugin::new("wobbly")
        .with_category("Effects")
        .conflict_plugins(["snap"])
        .with_setting(Setting::new("friction", SettingValue::Float(3.0)))
}

pub fn snap_plugin() -> Plugin {
    Plugin::new("snap").with_category("Window Management")
}

/// Every stored value type, kept out of [`sample_plugins`]
pub fn bindings_plugin() -> Plugin {
    Plugin::new("bindings")
        .with_category("Accessibility")
        .with_setting(Setting::new("title", SettingValue::String("plain".into())))
        .with_setting(Setting::new("windows", SettingValue::Match("any".into())))
        .with_setting(Setting::new("initiate", SettingValue::Action))
        .with_setting(Setting::new("initiate_key", SettingValue::Key(KeyValue::default())))
        .with_setting(Setting::new(
            "initiate_button",
            SettingValue::Button(ButtonValue::default()),
        ))
        .with_setting(Setting::new("initiate_edge", SettingValue::Edge(0)))
        .with_setting(Setting::new("initiate_bell", SettingValue::Bell(false)))
        .with_setting(Setting::new(
            "patterns",
            SettingValue::List(ValueList::from_strings(&["default"])),
        ))
        .with_setting(Setting::new(
            "blank",
            SettingValue::List(ValueList::from_strings(&["default"])),
        ))
}

pub fn sample_plugins() -> Vec<Plugin> {
    vec![
        core_plugin(),
        cube_plugin(),
        rotate_plugin(),
        decor_plugin(),
        kdecor_plugin(),
        shadow_plugin(),
        wobbly_plugin(),
        snap_plugin(),
    ]
}

// =============================================================================
// Test Fixtures
// =============================================================================

/// Test fixture with a temporary config directory and a context using the
/// INI backend on it
pub struct TestFixture {
    pub temp_dir: TempDir,
    pub context: Context,
}

impl TestFixture {
    /// Create a new test fixture with the sample plugins loaded
    pub fn new() -> Self {
        init_logging();
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let context = context_in(temp_dir.path());
        Self { temp_dir, context }
    }

    /// Get the config directory path
    pub fn config_dir(&self) -> PathBuf {
        self.temp_dir.path().to_path_buf()
    }

    /// Path of the INI file of `profile` (empty = default profile)
    pub fn profile_path(&self, profile: &str) -> PathBuf {
        let stem = if profile.is_empty() { "Default" } else { profile };
        self.temp_dir.path().join(format!("{stem}.ini"))
    }

    /// Another context on the same config directory
    pub fn second_context(&self) -> Context {
        context_in(self.temp_dir.path())
    }

    pub fn id(&self, plugin: &str, setting: &str) -> SettingId {
        self.context
            .setting_id(plugin, setting)
            .unwrap_or_else(|| panic!("{plugin}/{setting} is a sample setting"))
    }
}

impl Default for TestFixture {
    fn default() -> Self {
        Self::new()
    }
}

/// Context with the sample plugins and the INI backend in `dir`
pub fn context_in(dir: &Path) -> Context {
    let mut builder = Context::builder().config_dir(dir).backend("ini");
    for plugin in sample_plugins() {
        builder = builder.plugin(plugin);
    }
    builder.build().expect("Failed to create context")
}

/// Context with the sample plugins and no backend at all
pub fn detached_context(dir: &Path) -> Context {
    let mut builder = Context::builder()
        .config_dir(dir)
        .persist_options(false)
        .no_backend();
    for plugin in sample_plugins() {
        builder = builder.plugin(plugin);
    }
    builder.build().expect("Failed to create context")
}

// =============================================================================
// Helper Functions
// =============================================================================

pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Raw content of a stored file, if present
pub fn read_file(path: &Path) -> Option<String> {
    std::fs::read_to_string(path).ok()
}

/// Check if `[section] key=` exists in an INI file
pub fn key_exists_in_file(path: &Path, section: &str, key: &str) -> bool {
    let Some(text) = read_file(path) else {
        return false;
    };
    let mut in_section = false;
    for line in text.lines() {
        if let Some(name) = line.strip_prefix('[').and_then(|l| l.strip_suffix(']')) {
            in_section = name == section;
        } else if in_section && line.split_once('=').is_some_and(|(k, _)| k == key) {
            return true;
        }
    }
    false
}

/// Names of the active plugins, in declaration order
pub fn active_names(context: &Context) -> Vec<String> {
    context
        .plugins()
        .filter(|(_, p)| p.is_active())
        .map(|(_, p)| p.name().to_string())
        .collect()
}
