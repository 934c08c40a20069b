//! Plugin ordering and enable/disable feasibility through a context

mod common;

use ccsettings::{ConflictType, Context, Plugin, PluginConflict, PluginResolver};
use common::*;

fn detached_with(dir: &std::path::Path, plugins: Vec<Plugin>) -> Context {
    let mut builder = Context::builder()
        .config_dir(dir)
        .persist_options(false)
        .no_backend();
    for plugin in plugins {
        builder = builder.plugin(plugin);
    }
    builder.build().unwrap()
}

// =============================================================================
// Load Order
// =============================================================================

#[test]
fn test_sorted_list_respects_load_after() {
    let fixture = TestFixture::new();
    let mut context = fixture.context;

    context.set_active_plugin_list(&["shadow", "rotate", "decor", "cube"]);
    assert_eq!(
        context.sorted_plugin_string_list(),
        ["core", "cube", "rotate", "decor", "shadow"]
    );
}

#[test]
fn test_sorted_list_respects_load_before() {
    let dir = tempfile::tempdir().unwrap();
    let mut context = detached_with(
        dir.path(),
        vec![
            core_plugin(),
            Plugin::new("a"),
            Plugin::new("b"),
            Plugin::new("c").load_before(["a"]),
        ],
    );

    context.set_active_plugin_list(&["a", "b", "c"]);
    assert_eq!(context.sorted_plugin_string_list(), ["core", "c", "a", "b"]);
}

#[test]
fn test_inactive_plugins_are_not_sorted() {
    let fixture = TestFixture::new();
    let mut context = fixture.context;

    context.set_active_plugin_list(&["rotate"]);
    // rotate orders after cube, but cube is not active
    assert_eq!(context.sorted_plugin_string_list(), ["core", "rotate"]);
}

#[test]
fn test_cycle_still_lists_every_plugin() {
    let dir = tempfile::tempdir().unwrap();
    let mut context = detached_with(
        dir.path(),
        vec![
            core_plugin(),
            Plugin::new("z").load_after(["x"]),
            Plugin::new("x").load_after(["y"]),
            Plugin::new("y").load_after(["x"]),
        ],
    );

    context.set_active_plugin_list(&["z", "x", "y"]);
    let sorted = context.sorted_plugin_string_list();
    assert_eq!(sorted.len(), 4);
    assert_eq!(sorted[0], "core");
    assert!(sorted.contains(&"y".to_string()));

    // z only waits on the cycle, so it still follows x
    let position = |name: &str| sorted.iter().position(|p| p == name).unwrap();
    assert!(position("x") < position("z"));
}

// =============================================================================
// Enabling
// =============================================================================

#[test]
fn test_enable_requires_inactive_plugin() {
    let fixture = TestFixture::new();
    let rotate = fixture.context.find_plugin("rotate").unwrap();

    let conflicts = fixture.context.can_enable_plugin(rotate).unwrap();
    assert_eq!(conflicts.len(), 1);
    assert_eq!(conflicts[0].conflict_type, ConflictType::RequiresPlugin);
    assert_eq!(conflicts[0].value, "cube");
    assert_eq!(conflicts[0].plugins, ["cube"]);
}

#[test]
fn test_enable_is_safe_once_requirements_are_active() {
    let fixture = TestFixture::new();
    let mut context = fixture.context;
    let rotate = context.find_plugin("rotate").unwrap();

    context.set_active_plugin_list(&["cube"]);
    assert!(context.can_enable_plugin(rotate).unwrap().is_empty());
}

#[test]
fn test_feature_is_exclusive() {
    let fixture = TestFixture::new();
    let mut context = fixture.context;
    let kdecor = context.find_plugin("kdecor").unwrap();

    context.set_active_plugin_list(&["decor"]);
    let conflicts = context.can_enable_plugin(kdecor).unwrap();
    assert_eq!(
        conflicts,
        vec![PluginConflict::new(
            "decorations",
            ConflictType::Feature,
            vec!["decor".to_string()]
        )]
    );
}

#[test]
fn test_required_feature_lists_providers() {
    let fixture = TestFixture::new();
    let shadow = fixture.context.find_plugin("shadow").unwrap();

    let conflicts = fixture.context.can_enable_plugin(shadow).unwrap();
    assert_eq!(conflicts.len(), 1);
    assert_eq!(conflicts[0].conflict_type, ConflictType::RequiresFeature);
    assert_eq!(conflicts[0].plugins, ["decor", "kdecor"]);
}

#[test]
fn test_conflicting_plugin_only_checked_one_way() {
    let fixture = TestFixture::new();
    let mut context = fixture.context;
    let wobbly = context.find_plugin("wobbly").unwrap();
    let snap = context.find_plugin("snap").unwrap();

    context.set_active_plugin_list(&["snap"]);
    let conflicts = context.can_enable_plugin(wobbly).unwrap();
    assert_eq!(conflicts.len(), 1);
    assert_eq!(conflicts[0].conflict_type, ConflictType::Plugin);
    assert_eq!(conflicts[0].value, "snap");

    // snap does not declare the conflict itself
    context.set_active_plugin_list(&["wobbly"]);
    assert!(context.can_enable_plugin(snap).unwrap().is_empty());
}

// =============================================================================
// Disabling
// =============================================================================

#[test]
fn test_disable_needed_plugin() {
    let fixture = TestFixture::new();
    let mut context = fixture.context;
    let cube = context.find_plugin("cube").unwrap();

    context.set_active_plugin_list(&["cube", "rotate"]);
    let conflicts = context.can_disable_plugin(cube).unwrap();
    assert_eq!(conflicts.len(), 1);
    assert_eq!(conflicts[0].conflict_type, ConflictType::PluginNeeded);
    assert_eq!(conflicts[0].plugins, ["rotate"]);
}

#[test]
fn test_disable_sole_feature_provider() {
    let fixture = TestFixture::new();
    let mut context = fixture.context;
    let decor = context.find_plugin("decor").unwrap();

    context.set_active_plugin_list(&["decor", "shadow"]);
    let conflicts = context.can_disable_plugin(decor).unwrap();
    assert_eq!(conflicts.len(), 1);
    assert_eq!(conflicts[0].conflict_type, ConflictType::FeatureNeeded);
    assert_eq!(conflicts[0].value, "decorations");
    assert_eq!(conflicts[0].plugins, ["shadow"]);

    // a second provider makes it safe
    context.set_active_plugin_list(&["decor", "kdecor", "shadow"]);
    assert!(context.can_disable_plugin(decor).unwrap().is_empty());
}

#[test]
fn test_disable_unused_plugin_is_safe() {
    let fixture = TestFixture::new();
    let mut context = fixture.context;
    let wobbly = context.find_plugin("wobbly").unwrap();

    context.set_active_plugin_list(&["wobbly", "cube"]);
    assert!(context.can_disable_plugin(wobbly).unwrap().is_empty());
}

// =============================================================================
// Host Resolver
// =============================================================================

struct LockedResolver;

impl PluginResolver for LockedResolver {
    fn can_disable(&self, _plugins: &[&Plugin], candidate: &Plugin) -> Vec<PluginConflict> {
        if candidate.name() == "core" {
            vec![PluginConflict::new(
                "core",
                ConflictType::PluginError,
                Vec::new(),
            )]
        } else {
            Vec::new()
        }
    }
}

#[test]
fn test_host_resolver_replaces_checks() {
    let dir = tempfile::tempdir().unwrap();
    let mut builder = Context::builder()
        .config_dir(dir.path())
        .persist_options(false)
        .no_backend()
        .resolver(LockedResolver);
    for plugin in sample_plugins() {
        builder = builder.plugin(plugin);
    }
    let mut context = builder.build().unwrap();

    let core = context.find_plugin("core").unwrap();
    let cube = context.find_plugin("cube").unwrap();
    context.set_active_plugin_list(&["cube", "rotate"]);

    let conflicts = context.can_disable_plugin(core).unwrap();
    assert_eq!(conflicts[0].conflict_type, ConflictType::PluginError);
    assert!(context.can_disable_plugin(cube).unwrap().is_empty());

    // untouched methods keep the default behavior
    assert_eq!(context.sorted_plugin_string_list(), ["core", "cube", "rotate"]);
}
