//! Setting descriptors
//!
//! A [`Setting`] couples an immutable schema (name, type, constraints, display
//! grouping) with a mutable current value. Values only change through the
//! typed setters or [`Setting::reset_to_default`], which keep `is_default` in
//! sync with the value.
//!
//! Setters on a bare `Setting` report what happened through [`SetOutcome`];
//! the owning [`Context`](crate::Context) turns that into changed-list
//! bookkeeping and change notifications.

mod info;

pub use info::{
    ActionInfo, FloatInfo, IntDesc, IntInfo, ListInfo, SettingInfo, StrRestriction, StringInfo,
};

use crate::error::{Error, Result};
use crate::value::{
    ButtonValue, ColorValue, KeyValue, SettingType, SettingValue, ValueList, values_equal,
};

/// Two floats closer than this are treated as the same setting value
pub const FLOAT_TOLERANCE: f32 = 1e-5;

/// Result of a typed setter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SetOutcome {
    /// The stored value differs from the previous one
    pub changed: bool,
    /// The stored value equals the requested one (false after clamping)
    pub matched: bool,
}

/// One typed, named configuration value of a plugin
#[derive(Debug, Clone, PartialEq)]
pub struct Setting {
    name: String,
    short_desc: String,
    long_desc: String,
    setting_type: SettingType,
    info: SettingInfo,
    group: String,
    sub_group: String,
    hints: String,
    default_value: SettingValue,
    value: SettingValue,
    is_default: bool,
    read_only: bool,
    integrated: bool,
}

impl Setting {
    /// Create a setting whose type is taken from `default`
    ///
    /// Int and float settings start unbounded; lists get element info with no
    /// constraints. Use [`Setting::with_info`] to narrow them.
    pub fn new(name: impl Into<String>, default: SettingValue) -> Self {
        let setting_type = default.setting_type();
        let info = match &default {
            SettingValue::Int(_) => SettingInfo::Int(IntInfo::default()),
            SettingValue::Float(_) => SettingInfo::Float(FloatInfo::default()),
            SettingValue::String(_) => SettingInfo::String(StringInfo::default()),
            SettingValue::Action => SettingInfo::Action(ActionInfo::default()),
            SettingValue::List(list) => SettingInfo::List(ListInfo {
                element_type: list.element_type(),
                element_info: Box::new(default_info_for(list.element_type())),
            }),
            _ => SettingInfo::None,
        };
        Self {
            name: name.into(),
            short_desc: String::new(),
            long_desc: String::new(),
            setting_type,
            info,
            group: String::new(),
            sub_group: String::new(),
            hints: String::new(),
            value: default.clone(),
            default_value: default,
            is_default: true,
            read_only: false,
            integrated: false,
        }
    }

    /// Bounded int setting
    pub fn int(name: impl Into<String>, default: i32, min: i32, max: i32) -> Result<Self> {
        Self::new(name, SettingValue::Int(default)).with_info(SettingInfo::Int(IntInfo {
            min,
            max,
            descriptions: Vec::new(),
        }))
    }

    /// Bounded float setting
    pub fn float(
        name: impl Into<String>,
        default: f32,
        min: f32,
        max: f32,
        precision: f32,
    ) -> Result<Self> {
        Self::new(name, SettingValue::Float(default)).with_info(SettingInfo::Float(FloatInfo {
            min,
            max,
            precision,
        }))
    }

    /// Replace the type constraints.
    ///
    /// The info must fit the setting's type, and for lists the element type
    /// must agree with the default value. The default is clamped into range.
    pub fn with_info(mut self, info: SettingInfo) -> Result<Self> {
        if !info.fits(self.setting_type) {
            return Err(Error::InvalidValue {
                ty: self.setting_type,
                value: format!("constraints {info:?} for setting '{}'", self.name),
            });
        }
        if let (SettingInfo::List(list_info), SettingValue::List(list)) =
            (&info, &self.default_value)
        {
            if list_info.element_type != list.element_type() {
                return Err(Error::TypeMismatch {
                    expected: list_info.element_type,
                    found: list.element_type(),
                });
            }
        }
        self.info = info;
        self.default_value = self.constrain(&self.default_value);
        self.value = self.default_value.clone();
        self.is_default = true;
        Ok(self)
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
    pub fn with_group(mut self, group: impl Into<String>, sub_group: impl Into<String>) -> Self {
        self.group = group.into();
        self.sub_group = sub_group.into();
        self
    }

    #[must_use]
    pub fn with_hints(mut self, hints: impl Into<String>) -> Self {
        self.hints = hints.into();
        self
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
    pub fn setting_type(&self) -> SettingType {
        self.setting_type
    }

    #[must_use]
    pub fn info(&self) -> &SettingInfo {
        &self.info
    }

    /// Element type of a list setting, `None` for every other type
    #[must_use]
    pub fn element_type(&self) -> Option<SettingType> {
        match &self.info {
            SettingInfo::List(info) => Some(info.element_type),
            _ => None,
        }
    }

    #[must_use]
    pub fn group(&self) -> &str {
        &self.group
    }

    #[must_use]
    pub fn sub_group(&self) -> &str {
        &self.sub_group
    }

    #[must_use]
    pub fn hints(&self) -> &str {
        &self.hints
    }

    #[must_use]
    pub fn default_value(&self) -> &SettingValue {
        &self.default_value
    }

    #[must_use]
    pub fn value(&self) -> &SettingValue {
        &self.value
    }

    #[must_use]
    pub fn is_default(&self) -> bool {
        self.is_default
    }

    #[must_use]
    pub fn is_read_only(&self) -> bool {
        self.read_only
    }

    #[must_use]
    pub fn is_integrated(&self) -> bool {
        self.integrated
    }

    pub fn set_read_only(&mut self, read_only: bool) {
        self.read_only = read_only;
    }

    pub fn set_integrated(&mut self, integrated: bool) {
        self.integrated = integrated;
    }

    // =========================================================================
    // Typed getters
    // =========================================================================

    fn mismatch(&self, expected: SettingType) -> Error {
        Error::TypeMismatch {
            expected,
            found: self.setting_type,
        }
    }

    pub fn get_bool(&self) -> Result<bool> {
        match self.value {
            SettingValue::Bool(v) => Ok(v),
            _ => Err(self.mismatch(SettingType::Bool)),
        }
    }

    pub fn get_int(&self) -> Result<i32> {
        match self.value {
            SettingValue::Int(v) => Ok(v),
            _ => Err(self.mismatch(SettingType::Int)),
        }
    }

    pub fn get_float(&self) -> Result<f32> {
        match self.value {
            SettingValue::Float(v) => Ok(v),
            _ => Err(self.mismatch(SettingType::Float)),
        }
    }

    pub fn get_string(&self) -> Result<&str> {
        match &self.value {
            SettingValue::String(v) => Ok(v),
            _ => Err(self.mismatch(SettingType::String)),
        }
    }

    pub fn get_color(&self) -> Result<ColorValue> {
        match self.value {
            SettingValue::Color(v) => Ok(v),
            _ => Err(self.mismatch(SettingType::Color)),
        }
    }

    pub fn get_key(&self) -> Result<KeyValue> {
        match self.value {
            SettingValue::Key(v) => Ok(v),
            _ => Err(self.mismatch(SettingType::Key)),
        }
    }

    pub fn get_button(&self) -> Result<ButtonValue> {
        match self.value {
            SettingValue::Button(v) => Ok(v),
            _ => Err(self.mismatch(SettingType::Button)),
        }
    }

    pub fn get_edge(&self) -> Result<u32> {
        match self.value {
            SettingValue::Edge(v) => Ok(v),
            _ => Err(self.mismatch(SettingType::Edge)),
        }
    }

    pub fn get_bell(&self) -> Result<bool> {
        match self.value {
            SettingValue::Bell(v) => Ok(v),
            _ => Err(self.mismatch(SettingType::Bell)),
        }
    }

    pub fn get_match(&self) -> Result<&str> {
        match &self.value {
            SettingValue::Match(v) => Ok(v),
            _ => Err(self.mismatch(SettingType::Match)),
        }
    }

    pub fn get_list(&self) -> Result<&ValueList> {
        match &self.value {
            SettingValue::List(v) => Ok(v),
            _ => Err(self.mismatch(SettingType::List)),
        }
    }

    // =========================================================================
    // Typed setters
    // =========================================================================

    pub fn set_bool(&mut self, value: bool) -> Result<SetOutcome> {
        self.set_value(SettingValue::Bool(value))
    }

    /// Set an int, clamping it into the declared range first
    pub fn set_int(&mut self, value: i32) -> Result<SetOutcome> {
        self.set_value(SettingValue::Int(value))
    }

    /// Set a float, clamping it into the declared range first
    pub fn set_float(&mut self, value: f32) -> Result<SetOutcome> {
        self.set_value(SettingValue::Float(value))
    }

    pub fn set_string(&mut self, value: impl Into<String>) -> Result<SetOutcome> {
        self.set_value(SettingValue::String(value.into()))
    }

    pub fn set_color(&mut self, value: ColorValue) -> Result<SetOutcome> {
        self.set_value(SettingValue::Color(value))
    }

    pub fn set_key(&mut self, value: KeyValue) -> Result<SetOutcome> {
        self.set_value(SettingValue::Key(value))
    }

    pub fn set_button(&mut self, value: ButtonValue) -> Result<SetOutcome> {
        self.set_value(SettingValue::Button(value))
    }

    pub fn set_edge(&mut self, value: u32) -> Result<SetOutcome> {
        self.set_value(SettingValue::Edge(value))
    }

    pub fn set_bell(&mut self, value: bool) -> Result<SetOutcome> {
        self.set_value(SettingValue::Bell(value))
    }

    pub fn set_match(&mut self, value: impl Into<String>) -> Result<SetOutcome> {
        self.set_value(SettingValue::Match(value.into()))
    }

    pub fn set_list(&mut self, value: ValueList) -> Result<SetOutcome> {
        self.set_value(SettingValue::List(value))
    }

    /// Store `value` if its tag matches the setting type.
    ///
    /// Out-of-range ints and floats are clamped and stored; the outcome then
    /// reports `matched == false`. `is_default` is recomputed on every call.
    pub fn set_value(&mut self, value: SettingValue) -> Result<SetOutcome> {
        value.expect_type(self.setting_type)?;
        if let (SettingValue::List(list), SettingInfo::List(info)) = (&value, &self.info) {
            if list.element_type() != info.element_type {
                return Err(Error::TypeMismatch {
                    expected: info.element_type,
                    found: list.element_type(),
                });
            }
        }

        let stored = self.constrain(&value);
        let matched = values_equal(&stored, &value, self.setting_type)?;
        let changed = !self.same_as_current(&stored)?;
        if changed {
            self.value = stored;
        }
        self.is_default = values_equal(&self.value, &self.default_value, self.setting_type)?;

        Ok(SetOutcome { changed, matched })
    }

    /// Copy the default over the current value; returns whether it changed
    pub fn reset_to_default(&mut self) -> bool {
        let changed = !matches!(
            values_equal(&self.value, &self.default_value, self.setting_type),
            Ok(true)
        );
        self.value = self.default_value.clone();
        self.is_default = true;
        changed
    }

    fn same_as_current(&self, candidate: &SettingValue) -> Result<bool> {
        match (&self.value, candidate) {
            (SettingValue::Float(current), SettingValue::Float(new)) => {
                Ok((current - new).abs() < FLOAT_TOLERANCE)
            }
            _ => values_equal(&self.value, candidate, self.setting_type),
        }
    }

    fn constrain(&self, value: &SettingValue) -> SettingValue {
        match (value, &self.info) {
            (SettingValue::Int(v), SettingInfo::Int(info)) => SettingValue::Int(info.clamp(*v)),
            (SettingValue::Float(v), SettingInfo::Float(info)) => {
                SettingValue::Float(info.clamp(*v))
            }
            _ => value.clone(),
        }
    }
}

fn default_info_for(ty: SettingType) -> SettingInfo {
    match ty {
        SettingType::Int => SettingInfo::Int(IntInfo::default()),
        SettingType::Float => SettingInfo::Float(FloatInfo::default()),
        SettingType::String => SettingInfo::String(StringInfo::default()),
        SettingType::Action => SettingInfo::Action(ActionInfo::default()),
        _ => SettingInfo::None,
    }
}
