//! Plugin descriptors
//!
//! A [`Plugin`] owns its settings in declaration order and carries the
//! dependency metadata used by [`conflicts`] and [`sort`].

pub mod conflicts;
pub mod sort;

pub use conflicts::{ConflictType, PluginConflict};

use crate::error::{Error, Result};
use crate::setting::Setting;
use std::collections::HashMap;

/// Name of the plugin that is always loaded first and owns `active_plugins`
pub const CORE_PLUGIN: &str = "core";

/// Core setting listing the enabled plugins in load order
pub const ACTIVE_PLUGINS_SETTING: &str = "active_plugins";

/// Stable handle of a plugin inside a [`Context`](crate::Context)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PluginId(pub(crate) usize);

/// Stable handle of a setting inside a [`Context`](crate::Context)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SettingId {
    pub plugin: PluginId,
    pub(crate) index: usize,
}

/// Display grouping: settings of one subgroup, by name
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SubGroup {
    pub name: String,
    pub settings: Vec<String>,
}

/// Display grouping: a named group of subgroups
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Group {
    pub name: String,
    pub sub_groups: Vec<SubGroup>,
}

/// A plugin and its settings
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Plugin {
    name: String,
    short_desc: String,
    long_desc: String,
    hints: String,
    category: String,

    load_after: Vec<String>,
    load_before: Vec<String>,
    requires_plugins: Vec<String>,
    conflict_plugins: Vec<String>,
    provides_features: Vec<String>,
    requires_features: Vec<String>,

    settings: Vec<Setting>,
    index: HashMap<String, usize>,
    groups: Vec<Group>,

    active: bool,
}

impl Plugin {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_short_desc(mut self, text: impl Into<String>) -> Self {
        self.short_desc = text.into();
        self
    }

    #[must_use]
    pub fn with_long_desc(mut self, text: impl Into<String>) -> Self {
        self.long_desc = text.into();
        self
    }

    #[must_use]
    pub fn with_hints(mut self, hints: impl Into<String>) -> Self {
        self.hints = hints.into();
        self
    }

    #[must_use]
    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = category.into();
        self
    }

    #[must_use]
    pub fn load_after<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.load_after = names.into_iter().map(Into::into).collect();
        self
    }

    #[must_use]
    pub fn load_before<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.load_before = names.into_iter().map(Into::into).collect();
        self
    }

    #[must_use]
    pub fn requires_plugins<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.requires_plugins = names.into_iter().map(Into::into).collect();
        self
    }

    #[must_use]
    pub fn conflict_plugins<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.conflict_plugins = names.into_iter().map(Into::into).collect();
        self
    }

    #[must_use]
    pub fn provides_features<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.provides_features = names.into_iter().map(Into::into).collect();
        self
    }

    #[must_use]
    pub fn requires_features<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.requires_features = names.into_iter().map(Into::into).collect();
        self
    }

    /// Builder form of [`Plugin::add_setting`]
    pub fn with_setting(mut self, setting: Setting) -> Self {
        self.add_setting(setting);
        self
    }

    /// Add a setting, replacing any previous setting of the same name in place
    pub fn add_setting(&mut self, setting: Setting) {
        match self.index.get(setting.name()) {
            Some(&i) => self.settings[i] = setting,
            None => {
                self.index.insert(setting.name().to_string(), self.settings.len());
                self.settings.push(setting);
            }
        }
        self.rebuild_groups();
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn short_desc(&self) -> &str {
        &self.short_desc
    }

    #[must_use]
    pub fn long_desc(&self) -> &str {
        &self.long_desc
    }

    #[must_use]
    pub fn hints(&self) -> &str {
        &self.hints
    }

    #[must_use]
    pub fn category(&self) -> &str {
        &self.category
    }

    #[must_use]
    pub fn get_load_after(&self) -> &[String] {
        &self.load_after
    }

    #[must_use]
    pub fn get_load_before(&self) -> &[String] {
        &self.load_before
    }

    #[must_use]
    pub fn get_requires_plugins(&self) -> &[String] {
        &self.requires_plugins
    }

    #[must_use]
    pub fn get_conflict_plugins(&self) -> &[String] {
        &self.conflict_plugins
    }

    #[must_use]
    pub fn get_provides_features(&self) -> &[String] {
        &self.provides_features
    }

    #[must_use]
    pub fn get_requires_features(&self) -> &[String] {
        &self.requires_features
    }

    #[must_use]
    pub fn provides_feature(&self, feature: &str) -> bool {
        self.provides_features.iter().any(|f| f == feature)
    }

    /// Settings in declaration order
    #[must_use]
    pub fn settings(&self) -> &[Setting] {
        &self.settings
    }

    #[must_use]
    pub fn find_setting(&self, name: &str) -> Option<&Setting> {
        self.index.get(name).map(|&i| &self.settings[i])
    }

    #[must_use]
    pub fn setting_index(&self, name: &str) -> Option<usize> {
        self.index.get(name).copied()
    }

    pub(crate) fn setting_at(&self, index: usize) -> Option<&Setting> {
        self.settings.get(index)
    }

    pub(crate) fn setting_at_mut(&mut self, index: usize) -> Option<&mut Setting> {
        self.settings.get_mut(index)
    }

    /// Look up a setting, failing with `SettingNotFound`
    pub fn require_setting(&self, name: &str) -> Result<&Setting> {
        self.find_setting(name)
            .ok_or_else(|| Error::SettingNotFound(format!("{}/{name}", self.name)))
    }

    /// Group/SubGroup collation for display
    #[must_use]
    pub fn groups(&self) -> &[Group] {
        &self.groups
    }

    #[must_use]
    pub fn is_active(&self) -> bool {
        self.active
    }

    pub(crate) fn set_active_flag(&mut self, active: bool) {
        self.active = active;
    }

    fn rebuild_groups(&mut self) {
        let mut groups: Vec<Group> = Vec::new();
        for setting in &self.settings {
            let group = match groups.iter_mut().position(|g| g.name == setting.group()) {
                Some(i) => &mut groups[i],
                None => {
                    groups.push(Group {
                        name: setting.group().to_string(),
                        sub_groups: Vec::new(),
                    });
                    let last = groups.len() - 1;
                    &mut groups[last]
                }
            };
            let sub_group = match group
                .sub_groups
                .iter_mut()
                .position(|s| s.name == setting.sub_group())
            {
                Some(i) => &mut group.sub_groups[i],
                None => {
                    group.sub_groups.push(SubGroup {
                        name: setting.sub_group().to_string(),
                        settings: Vec::new(),
                    });
                    let last = group.sub_groups.len() - 1;
                    &mut group.sub_groups[last]
                }
            };
            sub_group.settings.push(setting.name().to_string());
        }
        self.groups = groups;
    }
}

/// Plugins sharing one category name, for display
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Category {
    pub name: String,
    pub plugins: Vec<String>,
}
