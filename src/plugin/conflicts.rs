//! Enable/disable feasibility checks
//!
//! Both checks are pure queries over the current set of plugins. An empty
//! result means the transition is safe.

use super::Plugin;
use serde::{Deserialize, Serialize};

/// Why enabling or disabling a plugin is currently unsafe
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ConflictType {
    // Produced when enabling
    /// A required plugin is missing or inactive
    RequiresPlugin,
    /// No active plugin provides a required feature
    RequiresFeature,
    /// Another active plugin already provides the same feature
    Feature,
    /// A plugin listed as conflicting is active
    Plugin,

    // Produced when disabling
    /// Active plugins require a feature only the candidate provides
    FeatureNeeded,
    /// Active plugins require the candidate
    PluginNeeded,
    /// Opaque failure reported by a backend or host
    PluginError,
}

/// One reason a transition is unsafe
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PluginConflict {
    /// Name of the conflicting item (plugin or feature)
    pub value: String,
    pub conflict_type: ConflictType,
    /// Plugins implicated in the conflict
    pub plugins: Vec<String>,
}

impl PluginConflict {
    pub fn new(
        value: impl Into<String>,
        conflict_type: ConflictType,
        plugins: Vec<String>,
    ) -> Self {
        Self {
            value: value.into(),
            conflict_type,
            plugins,
        }
    }
}

fn names<'a>(plugins: impl Iterator<Item = &'a Plugin>) -> Vec<String> {
    plugins.map(|p| p.name().to_string()).collect()
}

/// Conflicts raised by enabling `candidate` given `plugins` (all known plugins)
pub fn can_enable(plugins: &[&Plugin], candidate: &Plugin) -> Vec<PluginConflict> {
    let mut conflicts = Vec::new();
    let find = |name: &str| plugins.iter().copied().find(|p| p.name() == name);
    let others_active = || {
        plugins
            .iter()
            .copied()
            .filter(move |p| p.is_active() && p.name() != candidate.name())
    };

    for required in candidate.get_requires_plugins() {
        match find(required.as_str()) {
            Some(plugin) if plugin.is_active() => {}
            Some(plugin) => conflicts.push(PluginConflict::new(
                required.as_str(),
                ConflictType::RequiresPlugin,
                vec![plugin.name().to_string()],
            )),
            None => conflicts.push(PluginConflict::new(
                required.as_str(),
                ConflictType::RequiresPlugin,
                Vec::new(),
            )),
        }
    }

    for feature in candidate.get_requires_features() {
        let providers: Vec<&Plugin> = plugins
            .iter()
            .copied()
            .filter(|p| p.provides_feature(feature))
            .collect();
        if !providers.iter().any(|p| p.is_active()) {
            // list the plugins that could satisfy it
            conflicts.push(PluginConflict::new(
                feature.as_str(),
                ConflictType::RequiresFeature,
                names(providers.into_iter()),
            ));
        }
    }

    for feature in candidate.get_provides_features() {
        let holders = names(others_active().filter(|p| p.provides_feature(feature)));
        if !holders.is_empty() {
            conflicts.push(PluginConflict::new(
                feature.as_str(),
                ConflictType::Feature,
                holders,
            ));
        }
    }

    for name in candidate.get_conflict_plugins() {
        if let Some(plugin) = find(name.as_str()).filter(|p| p.is_active()) {
            conflicts.push(PluginConflict::new(
                name.as_str(),
                ConflictType::Plugin,
                vec![plugin.name().to_string()],
            ));
        }
    }

    conflicts
}

/// Conflicts raised by disabling `candidate` given `plugins` (all known plugins)
pub fn can_disable(plugins: &[&Plugin], candidate: &Plugin) -> Vec<PluginConflict> {
    let mut conflicts = Vec::new();
    let others_active = || {
        plugins
            .iter()
            .copied()
            .filter(move |p| p.is_active() && p.name() != candidate.name())
    };

    let needed_by = names(others_active().filter(|p| {
        p.get_requires_plugins()
            .iter()
            .any(|r| r == candidate.name())
    }));
    if !needed_by.is_empty() {
        conflicts.push(PluginConflict::new(
            candidate.name(),
            ConflictType::PluginNeeded,
            needed_by,
        ));
    }

    for feature in candidate.get_provides_features() {
        if others_active().any(|p| p.provides_feature(feature)) {
            continue;
        }
        let needed_by = names(
            others_active().filter(|p| p.get_requires_features().iter().any(|f| f == feature)),
        );
        if !needed_by.is_empty() {
            conflicts.push(PluginConflict::new(
                feature.as_str(),
                ConflictType::FeatureNeeded,
                needed_by,
            ));
        }
    }

    conflicts
}

#[cfg(test)]
mod tests {
    use super::*;

    fn active(plugin: Plugin) -> Plugin {
        let mut plugin = plugin;
        plugin.set_active_flag(true);
        plugin
    }

    #[test]
    fn test_requires_missing_and_inactive_plugin() {
        let mover = Plugin::new("move");
        let candidate = Plugin::new("wobbly").requires_plugins(["move", "composite"]);
        let conflicts = can_enable(&[&mover, &candidate], &candidate);

        assert_eq!(conflicts.len(), 2);
        assert!(conflicts.iter().all(|c| c.conflict_type == ConflictType::RequiresPlugin));
        assert_eq!(conflicts[0].value, "move");
        assert_eq!(conflicts[0].plugins, ["move"]);
        assert_eq!(conflicts[1].value, "composite");
        assert!(conflicts[1].plugins.is_empty());
    }

    #[test]
    fn test_requires_feature_lists_inactive_providers() {
        let provider = Plugin::new("decor").provides_features(["decorations"]);
        let candidate = Plugin::new("shadow").requires_features(["decorations"]);
        let conflicts = can_enable(&[&provider, &candidate], &candidate);

        assert_eq!(conflicts.len(), 1);
        assert_eq!(conflicts[0].conflict_type, ConflictType::RequiresFeature);
        assert_eq!(conflicts[0].plugins, ["decor"]);
    }

    #[test]
    fn test_feature_exclusivity() {
        let first = active(Plugin::new("gtk-decor").provides_features(["decor"]));
        let second = Plugin::new("kde-decor").provides_features(["decor"]);
        let conflicts = can_enable(&[&first, &second], &second);

        assert_eq!(conflicts.len(), 1);
        assert_eq!(conflicts[0].conflict_type, ConflictType::Feature);
        assert_eq!(conflicts[0].value, "decor");
        assert_eq!(conflicts[0].plugins, ["gtk-decor"]);
    }

    #[test]
    fn test_active_candidate_does_not_conflict_with_itself() {
        let only = active(Plugin::new("decor").provides_features(["decor"]));
        assert!(can_enable(&[&only], &only).is_empty());
    }

    #[test]
    fn test_plugin_conflict_is_not_symmetrized() {
        let a = Plugin::new("a").conflict_plugins(["b"]);
        let b = active(Plugin::new("b"));
        let conflicts = can_enable(&[&a, &b], &a);
        assert_eq!(conflicts.len(), 1);
        assert_eq!(conflicts[0].conflict_type, ConflictType::Plugin);
        assert_eq!(conflicts[0].value, "b");

        let a = active(Plugin::new("a").conflict_plugins(["b"]));
        let b = Plugin::new("b");
        assert!(can_enable(&[&a, &b], &b).is_empty());
    }

    #[test]
    fn test_disable_needed_plugin() {
        let core = active(Plugin::new("core"));
        let r = active(Plugin::new("r").requires_plugins(["core"]));
        let conflicts = can_disable(&[&core, &r], &core);

        assert_eq!(conflicts.len(), 1);
        assert_eq!(conflicts[0].conflict_type, ConflictType::PluginNeeded);
        assert_eq!(conflicts[0].value, "core");
        assert_eq!(conflicts[0].plugins, ["r"]);
    }

    #[test]
    fn test_inactive_dependents_do_not_block_disable() {
        let core = active(Plugin::new("core"));
        let r = Plugin::new("r").requires_plugins(["core"]);
        assert!(can_disable(&[&core, &r], &core).is_empty());
    }

    #[test]
    fn test_feature_needed_only_when_sole_provider() {
        let first = active(Plugin::new("first").provides_features(["decor"]));
        let second = active(Plugin::new("second").provides_features(["decor"]));
        let user = active(Plugin::new("user").requires_features(["decor"]));

        assert!(can_disable(&[&first, &second, &user], &first).is_empty());

        let conflicts = can_disable(&[&first, &user], &first);
        assert_eq!(conflicts.len(), 1);
        assert_eq!(conflicts[0].conflict_type, ConflictType::FeatureNeeded);
        assert_eq!(conflicts[0].value, "decor");
        assert_eq!(conflicts[0].plugins, ["user"]);
    }

    #[test]
    fn test_checks_do_not_mutate() {
        let a = Plugin::new("a").conflict_plugins(["b"]);
        let b = active(Plugin::new("b"));
        let before = (a.clone(), b.clone());
        let _ = can_enable(&[&a, &b], &a);
        let _ = can_disable(&[&a, &b], &b);
        assert_eq!((a, b), before);
    }
}
