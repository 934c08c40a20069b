//! Type-specific constraints attached to a setting

use crate::value::SettingType;
use serde::{Deserialize, Serialize};

/// Named value of an enumerated int setting
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IntDesc {
    pub value: i32,
    pub name: String,
}

/// Suggested value of a string setting
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StrRestriction {
    pub value: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IntInfo {
    pub min: i32,
    pub max: i32,
    #[serde(default)]
    pub descriptions: Vec<IntDesc>,
}

impl Default for IntInfo {
    fn default() -> Self {
        Self {
            min: i32::MIN,
            max: i32::MAX,
            descriptions: Vec::new(),
        }
    }
}

impl IntInfo {
    #[must_use]
    pub fn clamp(&self, value: i32) -> i32 {
        value.clamp(self.min.min(self.max), self.max.max(self.min))
    }

    /// Display name for `value`, if it is one of the enumerated values
    #[must_use]
    pub fn description_for(&self, value: i32) -> Option<&str> {
        self.descriptions
            .iter()
            .find(|d| d.value == value)
            .map(|d| d.name.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FloatInfo {
    pub min: f32,
    pub max: f32,
    pub precision: f32,
}

impl Default for FloatInfo {
    fn default() -> Self {
        Self {
            min: f32::MIN,
            max: f32::MAX,
            precision: 0.1,
        }
    }
}

impl FloatInfo {
    #[must_use]
    pub fn clamp(&self, value: f32) -> f32 {
        value.clamp(self.min.min(self.max), self.max.max(self.min))
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct StringInfo {
    #[serde(default)]
    pub restrictions: Vec<StrRestriction>,
    /// Restrictions from this index on are shown sorted
    #[serde(default)]
    pub sort_start_at: Option<usize>,
    /// Whether values outside `restrictions` are accepted by front ends
    #[serde(default = "default_true")]
    pub extensible: bool,
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListInfo {
    pub element_type: SettingType,
    #[serde(default)]
    pub element_info: Box<SettingInfo>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ActionInfo {
    pub internal: bool,
}

/// Constraints keyed by setting type
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum SettingInfo {
    #[default]
    None,
    Int(IntInfo),
    Float(FloatInfo),
    String(StringInfo),
    List(ListInfo),
    Action(ActionInfo),
}

impl SettingInfo {
    /// Whether this info may be attached to a setting of `ty`
    #[must_use]
    pub fn fits(&self, ty: SettingType) -> bool {
        match self {
            SettingInfo::None => ty != SettingType::List,
            SettingInfo::Int(_) => ty == SettingType::Int,
            SettingInfo::Float(_) => ty == SettingType::Float,
            SettingInfo::String(_) => ty == SettingType::String,
            SettingInfo::List(info) => {
                ty == SettingType::List
                    && info.element_type != SettingType::List
                    && info.element_info.fits(info.element_type)
            }
            SettingInfo::Action(_) => ty == SettingType::Action,
        }
    }

    /// Info for list children, `None` for anything else
    #[must_use]
    pub fn element_info(&self) -> Option<&SettingInfo> {
        match self {
            SettingInfo::List(info) => Some(&info.element_info),
            _ => None,
        }
    }
}
