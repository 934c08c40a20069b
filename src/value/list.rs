//! Homogeneous value lists and flat-array conversion

use super::{ColorValue, SettingType, SettingValue};
use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};

/// A list of values that all share `element_type`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValueList {
    element_type: SettingType,
    items: Vec<SettingValue>,
}

impl ValueList {
    /// Empty list of `element_type`
    #[must_use]
    pub fn new(element_type: SettingType) -> Self {
        Self {
            element_type,
            items: Vec::new(),
        }
    }

    /// Build a list, checking every value against `element_type`
    pub fn from_values(element_type: SettingType, items: Vec<SettingValue>) -> Result<Self> {
        if element_type == SettingType::List {
            return Err(Error::InvalidValue {
                ty: SettingType::List,
                value: "nested list".into(),
            });
        }
        for item in &items {
            item.expect_type(element_type)?;
        }
        Ok(Self {
            element_type,
            items,
        })
    }

    #[must_use]
    pub fn element_type(&self) -> SettingType {
        self.element_type
    }

    /// Append a value of the element type
    pub fn push(&mut self, value: SettingValue) -> Result<()> {
        value.expect_type(self.element_type)?;
        self.items.push(value);
        Ok(())
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    #[must_use]
    pub fn get(&self, index: usize) -> Option<&SettingValue> {
        self.items.get(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, SettingValue> {
        self.items.iter()
    }

    #[must_use]
    pub fn as_slice(&self) -> &[SettingValue] {
        &self.items
    }

    #[must_use]
    pub fn into_values(self) -> Vec<SettingValue> {
        self.items
    }

    // =========================================================================
    // Flat array conversion
    // =========================================================================

    #[must_use]
    pub fn from_bools(values: &[bool]) -> Self {
        Self::from_iter_unchecked(SettingType::Bool, values.iter().map(|v| SettingValue::Bool(*v)))
    }

    #[must_use]
    pub fn from_ints(values: &[i32]) -> Self {
        Self::from_iter_unchecked(SettingType::Int, values.iter().map(|v| SettingValue::Int(*v)))
    }

    #[must_use]
    pub fn from_floats(values: &[f32]) -> Self {
        Self::from_iter_unchecked(
            SettingType::Float,
            values.iter().map(|v| SettingValue::Float(*v)),
        )
    }

    #[must_use]
    pub fn from_strings<S: AsRef<str>>(values: &[S]) -> Self {
        Self::from_iter_unchecked(
            SettingType::String,
            values
                .iter()
                .map(|v| SettingValue::String(v.as_ref().to_string())),
        )
    }

    #[must_use]
    pub fn from_matches<S: AsRef<str>>(values: &[S]) -> Self {
        Self::from_iter_unchecked(
            SettingType::Match,
            values
                .iter()
                .map(|v| SettingValue::Match(v.as_ref().to_string())),
        )
    }

    #[must_use]
    pub fn from_colors(values: &[ColorValue]) -> Self {
        Self::from_iter_unchecked(
            SettingType::Color,
            values.iter().map(|v| SettingValue::Color(*v)),
        )
    }

    pub fn to_bools(&self) -> Result<Vec<bool>> {
        self.collect(SettingType::Bool, |v| match v {
            SettingValue::Bool(b) => Some(*b),
            _ => None,
        })
    }

    pub fn to_ints(&self) -> Result<Vec<i32>> {
        self.collect(SettingType::Int, |v| match v {
            SettingValue::Int(i) => Some(*i),
            _ => None,
        })
    }

    pub fn to_floats(&self) -> Result<Vec<f32>> {
        self.collect(SettingType::Float, |v| match v {
            SettingValue::Float(f) => Some(*f),
            _ => None,
        })
    }

    pub fn to_strings(&self) -> Result<Vec<String>> {
        self.collect(SettingType::String, |v| match v {
            SettingValue::String(s) => Some(s.clone()),
            _ => None,
        })
    }

    pub fn to_matches(&self) -> Result<Vec<String>> {
        self.collect(SettingType::Match, |v| match v {
            SettingValue::Match(s) => Some(s.clone()),
            _ => None,
        })
    }

    pub fn to_colors(&self) -> Result<Vec<ColorValue>> {
        self.collect(SettingType::Color, |v| match v {
            SettingValue::Color(c) => Some(*c),
            _ => None,
        })
    }

    fn from_iter_unchecked(
        element_type: SettingType,
        items: impl Iterator<Item = SettingValue>,
    ) -> Self {
        Self {
            element_type,
            items: items.collect(),
        }
    }

    fn collect<T>(
        &self,
        expected: SettingType,
        extract: impl Fn(&SettingValue) -> Option<T>,
    ) -> Result<Vec<T>> {
        if self.element_type != expected {
            return Err(Error::TypeMismatch {
                expected,
                found: self.element_type,
            });
        }
        self.items
            .iter()
            .map(|v| {
                extract(v).ok_or(Error::TypeMismatch {
                    expected,
                    found: v.setting_type(),
                })
            })
            .collect()
    }
}

impl<'a> IntoIterator for &'a ValueList {
    type Item = &'a SettingValue;
    type IntoIter = std::slice::Iter<'a, SettingValue>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}
