//! Serializable plugin and setting descriptors

use crate::error::{Error, Result};
use crate::ini::codec;
use crate::plugin::Plugin;
use crate::setting::{Setting, SettingInfo};
use crate::value::{SettingType, SettingValue};
use serde::{Deserialize, Serialize};

/// Description of one plugin as stored in a metadata file
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PluginDescriptor {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub short_desc: String,
    #[serde(default)]
    pub long_desc: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub hints: String,

    #[serde(default)]
    pub load_after: Vec<String>,
    #[serde(default)]
    pub load_before: Vec<String>,
    #[serde(default)]
    pub requires_plugins: Vec<String>,
    #[serde(default)]
    pub conflict_plugins: Vec<String>,
    #[serde(default)]
    pub provides_features: Vec<String>,
    #[serde(default)]
    pub requires_features: Vec<String>,

    #[serde(default)]
    pub settings: Vec<SettingDescriptor>,
}

/// Description of one setting
///
/// `default` uses the same text form as the flat-file backend, e.g.
/// `"<Control><Alt>Left"` for a key or `"core;move"` for a string list.
/// Without it the setting defaults to the zero value of its type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SettingDescriptor {
    pub name: String,
    #[serde(rename = "type")]
    pub setting_type: SettingType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub element_type: Option<SettingType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub info: Option<SettingInfo>,

    #[serde(default)]
    pub short_desc: String,
    #[serde(default)]
    pub long_desc: String,
    #[serde(default)]
    pub group: String,
    #[serde(default)]
    pub sub_group: String,
    #[serde(default)]
    pub hints: String,
}

impl SettingDescriptor {
    fn element_type(&self) -> Option<SettingType> {
        self.element_type.or(match &self.info {
            Some(SettingInfo::List(info)) => Some(info.element_type),
            _ => None,
        })
    }

    /// Build the setting; `plugin` is only used for error messages
    pub fn to_setting(&self, plugin: &str) -> Result<Setting> {
        let invalid = |message: String| Error::Metadata {
            plugin: plugin.to_string(),
            message,
        };

        let element_type = match (self.setting_type, self.element_type()) {
            (SettingType::List, None) => {
                return Err(invalid(format!("list setting '{}' has no element type", self.name)));
            }
            (SettingType::List, Some(SettingType::List)) => {
                return Err(invalid(format!("list setting '{}' nests lists", self.name)));
            }
            (_, element) => element.unwrap_or(SettingType::Bool),
        };

        let default = match &self.default {
            Some(text) => codec::decode_value(text, self.setting_type, element_type)
                .map_err(|e| invalid(format!("default of '{}': {e}", self.name)))?,
            None => SettingValue::zero(self.setting_type, element_type),
        };

        let mut setting = Setting::new(self.name.clone(), default);
        if let Some(info) = &self.info {
            setting = setting
                .with_info(info.clone())
                .map_err(|e| invalid(format!("constraints of '{}': {e}", self.name)))?;
        }
        Ok(setting
            .with_short_desc(self.short_desc.clone())
            .with_long_desc(self.long_desc.clone())
            .with_group(self.group.clone(), self.sub_group.clone())
            .with_hints(self.hints.clone()))
    }
}

impl PluginDescriptor {
    /// Build the plugin with all of its settings
    pub fn to_plugin(&self) -> Result<Plugin> {
        if self.name.is_empty() {
            return Err(Error::Metadata {
                plugin: String::new(),
                message: "plugin has no name".into(),
            });
        }

        let mut plugin = Plugin::new(self.name.clone())
            .with_short_desc(self.short_desc.clone())
            .with_long_desc(self.long_desc.clone())
            .with_category(self.category.clone())
            .with_hints(self.hints.clone())
            .load_after(self.load_after.iter().cloned())
            .load_before(self.load_before.iter().cloned())
            .requires_plugins(self.requires_plugins.iter().cloned())
            .conflict_plugins(self.conflict_plugins.iter().cloned())
            .provides_features(self.provides_features.iter().cloned())
            .requires_features(self.requires_features.iter().cloned());

        for setting in &self.settings {
            plugin.add_setting(setting.to_setting(&self.name)?);
        }
        Ok(plugin)
    }
}
