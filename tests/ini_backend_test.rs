//! INI storage and backend selection

mod common;

use ccsettings::backend::{Backend, BackendContext, BackendInfo};
use ccsettings::{Context, Error, MemoryBackend, Setting, SettingValue};
use common::*;

// =============================================================================
// On-disk Format
// =============================================================================

#[test]
fn test_profile_file_layout() {
    let mut fixture = TestFixture::new();
    let speed = fixture.id("cube", "speed");
    let blend = fixture.id("cube", "blend");
    let hsize = fixture.id("core", "hsize");

    fixture.context.set_float(speed, 2.5, true).unwrap();
    fixture.context.set_bool(blend, false, true).unwrap();
    fixture.context.set_int(hsize, 8, true).unwrap();
    fixture.context.write_changed_settings().unwrap();

    let text = read_file(&fixture.profile_path("")).unwrap();
    assert!(text.contains("[cube]\n"));
    assert!(text.contains("s0_speed=2.5\n"));
    assert!(text.contains("s0_blend=false\n"));
    assert!(text.contains("[core]\n"));
    assert!(text.contains("s0_hsize=8\n"));
    // untouched settings stay out of the file
    assert!(!text.contains("s0_top_color"));
}

#[test]
fn test_list_and_color_survive_storage() {
    let mut fixture = TestFixture::new();
    let images = fixture.id("cube", "images");
    let color = fixture.id("cube", "top_color");
    let red = ccsettings::ColorValue::from_rgba8(0xff, 0, 0, 0x80);

    fixture
        .context
        .set_list(
            images,
            ccsettings::ValueList::from_strings(&["one", "two;three", ""]),
            true,
        )
        .unwrap();
    fixture.context.set_color(color, red, true).unwrap();
    fixture.context.write_changed_settings().unwrap();

    let second = fixture.second_context();
    let images = second.setting(second.setting_id("cube", "images").unwrap()).unwrap();
    let stored = images.get_list().unwrap().to_strings().unwrap();
    assert_eq!(stored, ["one", "two;three", ""]);
    let color = second.setting(second.setting_id("cube", "top_color").unwrap()).unwrap();
    assert_eq!(color.get_color().unwrap(), red);
}

#[test]
fn test_undecodable_value_is_skipped() {
    let fixture = TestFixture::new();
    std::fs::write(
        fixture.profile_path(""),
        "[cube]\ns0_speed=fast\ns0_blend=false\n",
    )
    .unwrap();

    let second = fixture.second_context();
    let speed = second.setting(second.setting_id("cube", "speed").unwrap()).unwrap();
    let blend = second.setting(second.setting_id("cube", "blend").unwrap()).unwrap();
    assert_eq!(speed.get_float().unwrap(), 1.0);
    assert!(speed.is_default());
    assert!(!blend.get_bool().unwrap());
}

#[test]
fn test_other_screen_uses_own_keys() {
    let fixture = TestFixture::new();
    std::fs::write(fixture.profile_path(""), "[cube]\ns0_speed=2\ns1_speed=3\n").unwrap();

    let mut builder = Context::builder()
        .config_dir(fixture.config_dir())
        .backend("ini")
        .screen(1);
    for plugin in sample_plugins() {
        builder = builder.plugin(plugin);
    }
    let context = builder.build().unwrap();
    let speed = context.setting(context.setting_id("cube", "speed").unwrap()).unwrap();
    assert_eq!(speed.get_float().unwrap(), 3.0);
}

// =============================================================================
// Backend Selection
// =============================================================================

#[test]
fn test_existing_backends() {
    let fixture = TestFixture::new();
    let names: Vec<String> = fixture
        .context
        .existing_backends()
        .into_iter()
        .map(|info| info.name)
        .collect();
    assert_eq!(names, ["ini", "memory"]);

    let info = fixture.context.backend_info().unwrap();
    assert_eq!(info.name, "ini");
    assert!(info.profile_support);
}

#[test]
fn test_unknown_backend_keeps_current() {
    let mut fixture = TestFixture::new();
    let result = fixture.context.set_backend("gconf");
    assert!(matches!(result, Err(Error::BackendNotFound(_))));
    assert_eq!(fixture.context.backend_name().as_deref(), Some("ini"));
}

/// INI context that can switch to a memory backend sharing `store`
fn switchable_context(dir: &std::path::Path, store: &MemoryBackend) -> Context {
    let handle = store.clone();
    let mut builder = Context::builder()
        .config_dir(dir)
        .backend("ini")
        .register_backend("memory", move || Box::new(handle.clone()));
    for plugin in sample_plugins() {
        builder = builder.plugin(plugin);
    }
    builder.build().unwrap()
}

#[test]
fn test_switch_to_memory_backend() {
    let fixture = TestFixture::new();
    let store = MemoryBackend::new();
    let mut context = switchable_context(&fixture.config_dir(), &store);

    context.set_backend("memory").unwrap();
    assert_eq!(context.backend_name().as_deref(), Some("memory"));
    let options = read_file(&fixture.config_dir().join("config")).unwrap();
    assert!(options.contains("backend=memory"));

    let speed = context.setting_id("cube", "speed").unwrap();
    context.set_float(speed, 6.0, true).unwrap();
    context.write_changed_settings().unwrap();
    assert_eq!(store.stored("", "cube", "speed"), Some(SettingValue::Float(6.0)));
    assert!(!fixture.profile_path("").exists());

    store.insert("", "cube", "blend", SettingValue::Bool(false));
    context.read_settings().unwrap();
    let blend = context.setting(context.setting_id("cube", "blend").unwrap()).unwrap();
    assert!(!blend.get_bool().unwrap());
}

#[test]
fn test_failed_options_save_keeps_backend() {
    let fixture = TestFixture::new();
    let store = MemoryBackend::new();
    let mut context = switchable_context(&fixture.config_dir(), &store);

    // A directory in place of the options file makes saving fail
    let options = fixture.config_dir().join("config");
    let _ = std::fs::remove_file(&options);
    std::fs::create_dir_all(options.join("blocked")).unwrap();

    assert!(context.set_backend("memory").is_err());
    assert_eq!(context.backend_name().as_deref(), Some("ini"));

    let speed = context.setting_id("cube", "speed").unwrap();
    context.set_float(speed, 6.0, true).unwrap();
    context.write_changed_settings().unwrap();
    assert!(key_exists_in_file(&fixture.profile_path(""), "cube", "s0_speed"));
    assert_eq!(store.stored("", "cube", "speed"), None);
}

// =============================================================================
// Backend Capabilities
// =============================================================================

/// Read-only backend that marks every setting as integrated
#[derive(Debug, Default)]
struct DesktopBackend;

impl Backend for DesktopBackend {
    fn info(&self) -> BackendInfo {
        BackendInfo {
            name: "desktop".into(),
            short_desc: "Desktop".into(),
            long_desc: String::new(),
            integration_support: true,
            profile_support: false,
            execute_events: false,
            read_support: true,
            write_support: false,
        }
    }

    fn read_setting(
        &mut self,
        _ctx: &mut BackendContext<'_>,
        plugin: &str,
        setting: &Setting,
    ) -> ccsettings::Result<Option<SettingValue>> {
        if plugin == "core" && setting.name() == "hsize" {
            Ok(Some(SettingValue::Int(2)))
        } else {
            Ok(None)
        }
    }

    fn setting_is_integrated(&self, plugin: &str, _setting: &Setting) -> bool {
        plugin == "core"
    }

    fn setting_is_read_only(&self, plugin: &str, setting: &Setting) -> bool {
        plugin == "core" && setting.name() == "hsize"
    }
}

fn desktop_context(dir: &std::path::Path) -> Context {
    let mut builder = Context::builder()
        .config_dir(dir)
        .persist_options(false)
        .register_backend("desktop", || Box::new(DesktopBackend))
        .backend("desktop");
    for plugin in sample_plugins() {
        builder = builder.plugin(plugin);
    }
    builder.build().unwrap()
}

#[test]
fn test_backend_flags_are_applied_on_read() {
    let dir = tempfile::tempdir().unwrap();
    let context = desktop_context(dir.path());

    let hsize = context.setting(context.setting_id("core", "hsize").unwrap()).unwrap();
    assert_eq!(hsize.get_int().unwrap(), 2);
    assert!(hsize.is_integrated());
    assert!(hsize.is_read_only());

    let speed = context.setting(context.setting_id("cube", "speed").unwrap()).unwrap();
    assert!(!speed.is_integrated());
    assert!(!speed.is_read_only());
}

#[test]
fn test_write_without_support_fails_and_keeps_changes() {
    let dir = tempfile::tempdir().unwrap();
    let mut context = desktop_context(dir.path());
    let speed = context.setting_id("cube", "speed").unwrap();

    context.set_float(speed, 2.0, true).unwrap();
    assert!(matches!(
        context.write_changed_settings(),
        Err(Error::Unsupported { .. })
    ));
    assert_eq!(context.changed_settings(), &[speed]);
}

#[test]
fn test_backend_without_profiles_lists_none() {
    let dir = tempfile::tempdir().unwrap();
    let mut context = desktop_context(dir.path());
    assert!(context.existing_profiles().unwrap().is_empty());
    // deleting is a no-op
    context.delete_profile("work").unwrap();
}
