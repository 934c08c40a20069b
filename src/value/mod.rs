//! Typed setting values
//!
//! [`SettingValue`] is a tagged union over every [`SettingType`]. List values
//! carry their element type once, in [`ValueList`], and every child must be
//! of that type.

mod list;

pub use list::ValueList;

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};

/// Closed set of setting types.
///
/// The discriminants follow the compositor's own option-type numbering and
/// must not be reordered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[repr(u8)]
pub enum SettingType {
    Bool = 0,
    Int = 1,
    Float = 2,
    String = 3,
    Color = 4,
    Action = 5,
    Key = 6,
    Button = 7,
    Edge = 8,
    Bell = 9,
    Match = 10,
    List = 11,
}

impl SettingType {
    /// All types, in discriminant order
    pub const ALL: [SettingType; 12] = [
        SettingType::Bool,
        SettingType::Int,
        SettingType::Float,
        SettingType::String,
        SettingType::Color,
        SettingType::Action,
        SettingType::Key,
        SettingType::Button,
        SettingType::Edge,
        SettingType::Bell,
        SettingType::Match,
        SettingType::List,
    ];

    /// Look up a type by its host discriminant
    #[must_use]
    pub fn from_u8(raw: u8) -> Option<Self> {
        Self::ALL.get(usize::from(raw)).copied()
    }

    /// Lower-case name as used in descriptors
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            SettingType::Bool => "bool",
            SettingType::Int => "int",
            SettingType::Float => "float",
            SettingType::String => "string",
            SettingType::Color => "color",
            SettingType::Action => "action",
            SettingType::Key => "key",
            SettingType::Button => "button",
            SettingType::Edge => "edge",
            SettingType::Bell => "bell",
            SettingType::Match => "match",
            SettingType::List => "list",
        }
    }
}

impl std::fmt::Display for SettingType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// RGBA color with 16 bits per channel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct ColorValue {
    pub red: u16,
    pub green: u16,
    pub blue: u16,
    pub alpha: u16,
}

impl ColorValue {
    #[must_use]
    pub const fn new(red: u16, green: u16, blue: u16, alpha: u16) -> Self {
        Self {
            red,
            green,
            blue,
            alpha,
        }
    }

    /// Build from 8-bit channels, scaling each to the full 16-bit range
    #[must_use]
    pub const fn from_rgba8(red: u8, green: u8, blue: u8, alpha: u8) -> Self {
        Self::new(
            red as u16 * 257,
            green as u16 * 257,
            blue as u16 * 257,
            alpha as u16 * 257,
        )
    }

    /// Channels as an array in red, green, blue, alpha order
    #[must_use]
    pub const fn channels(self) -> [u16; 4] {
        [self.red, self.green, self.blue, self.alpha]
    }
}

/// Keyboard binding: key symbol plus modifier mask
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct KeyValue {
    pub keysym: i32,
    pub key_mod_mask: u32,
}

/// Pointer binding: button number, modifier mask and screen-edge mask
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct ButtonValue {
    pub button: i32,
    pub button_mod_mask: u32,
    pub edge_mask: u32,
}

/// A typed setting value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "lowercase")]
pub enum SettingValue {
    Bool(bool),
    Int(i32),
    Float(f32),
    String(String),
    Color(ColorValue),
    Action,
    Key(KeyValue),
    Button(ButtonValue),
    Edge(u32),
    Bell(bool),
    Match(String),
    List(ValueList),
}

impl SettingValue {
    /// The type tag of this value
    #[must_use]
    pub fn setting_type(&self) -> SettingType {
        match self {
            SettingValue::Bool(_) => SettingType::Bool,
            SettingValue::Int(_) => SettingType::Int,
            SettingValue::Float(_) => SettingType::Float,
            SettingValue::String(_) => SettingType::String,
            SettingValue::Color(_) => SettingType::Color,
            SettingValue::Action => SettingType::Action,
            SettingValue::Key(_) => SettingType::Key,
            SettingValue::Button(_) => SettingType::Button,
            SettingValue::Edge(_) => SettingType::Edge,
            SettingValue::Bell(_) => SettingType::Bell,
            SettingValue::Match(_) => SettingType::Match,
            SettingValue::List(_) => SettingType::List,
        }
    }

    /// Zero value for a type; lists start empty with `element_type`
    #[must_use]
    pub fn zero(ty: SettingType, element_type: SettingType) -> Self {
        match ty {
            SettingType::Bool => SettingValue::Bool(false),
            SettingType::Int => SettingValue::Int(0),
            SettingType::Float => SettingValue::Float(0.0),
            SettingType::String => SettingValue::String(String::new()),
            SettingType::Color => SettingValue::Color(ColorValue::default()),
            SettingType::Action => SettingValue::Action,
            SettingType::Key => SettingValue::Key(KeyValue::default()),
            SettingType::Button => SettingValue::Button(ButtonValue::default()),
            SettingType::Edge => SettingValue::Edge(0),
            SettingType::Bell => SettingValue::Bell(false),
            SettingType::Match => SettingValue::Match(String::new()),
            SettingType::List => SettingValue::List(ValueList::new(element_type)),
        }
    }

    /// Fail with `TypeMismatch` unless this value is tagged `expected`
    pub fn expect_type(&self, expected: SettingType) -> Result<()> {
        let found = self.setting_type();
        if found == expected {
            Ok(())
        } else {
            Err(Error::TypeMismatch { expected, found })
        }
    }
}

/// Type-directed equality.
///
/// Both values must carry the tag `ty`; anything else is a contract violation
/// reported as `TypeMismatch`. Lists compare length first, then element by
/// element under their element type.
pub fn values_equal(a: &SettingValue, b: &SettingValue, ty: SettingType) -> Result<bool> {
    a.expect_type(ty)?;
    b.expect_type(ty)?;

    let equal = match (a, b) {
        (SettingValue::List(la), SettingValue::List(lb)) => {
            if la.element_type() != lb.element_type() {
                return Err(Error::TypeMismatch {
                    expected: la.element_type(),
                    found: lb.element_type(),
                });
            }
            if la.len() != lb.len() {
                return Ok(false);
            }
            for (ea, eb) in la.iter().zip(lb.iter()) {
                if !values_equal(ea, eb, la.element_type())? {
                    return Ok(false);
                }
            }
            true
        }
        // Actions carry no payload
        (SettingValue::Action, SettingValue::Action) => true,
        _ => a == b,
    };
    Ok(equal)
}

/// Deep copy of a value that must be tagged `ty`
pub fn copy_value(value: &SettingValue, ty: SettingType) -> Result<SettingValue> {
    value.expect_type(ty)?;
    Ok(value.clone())
}
