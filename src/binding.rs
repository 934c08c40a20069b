//! String grammar for bindings, edges and colors
//!
//! ```text
//! key     := "Disabled" | modifier* keysym?
//! button  := "Disabled" | (modifier | edge-token)* ("Button" N)?
//! edges   := edge ("|" edge)*
//! color   := "#" rrggbbaa | "#" rrrrggggbbbbaaaa | r g b a
//! modifier := "<Shift>" | "<Control>" | "<Alt>" | ...
//! ```

use crate::error::{Error, Result};
use crate::value::{ButtonValue, ColorValue, KeyValue, SettingType};
use regex::Regex;
use std::sync::OnceLock;

/// Text used for a binding with neither key nor modifiers
pub const DISABLED: &str = "Disabled";

pub const SHIFT_MASK: u32 = 1 << 0;
pub const LOCK_MASK: u32 = 1 << 1;
pub const CONTROL_MASK: u32 = 1 << 2;
pub const MOD1_MASK: u32 = 1 << 3;
pub const MOD2_MASK: u32 = 1 << 4;
pub const MOD3_MASK: u32 = 1 << 5;
pub const MOD4_MASK: u32 = 1 << 6;
pub const MOD5_MASK: u32 = 1 << 7;
pub const ALT_MASK: u32 = 1 << 16;
pub const META_MASK: u32 = 1 << 17;
pub const SUPER_MASK: u32 = 1 << 18;
pub const HYPER_MASK: u32 = 1 << 19;
pub const MODE_SWITCH_MASK: u32 = 1 << 20;

const MODIFIERS: &[(&str, u32)] = &[
    ("Shift", SHIFT_MASK),
    ("Lock", LOCK_MASK),
    ("Control", CONTROL_MASK),
    ("Mod1", MOD1_MASK),
    ("Mod2", MOD2_MASK),
    ("Mod3", MOD3_MASK),
    ("Mod4", MOD4_MASK),
    ("Mod5", MOD5_MASK),
    ("Alt", ALT_MASK),
    ("Meta", META_MASK),
    ("Super", SUPER_MASK),
    ("Hyper", HYPER_MASK),
    ("ModeSwitch", MODE_SWITCH_MASK),
];

pub const EDGE_LEFT: u32 = 1 << 0;
pub const EDGE_RIGHT: u32 = 1 << 1;
pub const EDGE_TOP: u32 = 1 << 2;
pub const EDGE_BOTTOM: u32 = 1 << 3;
pub const EDGE_TOP_LEFT: u32 = 1 << 4;
pub const EDGE_TOP_RIGHT: u32 = 1 << 5;
pub const EDGE_BOTTOM_LEFT: u32 = 1 << 6;
pub const EDGE_BOTTOM_RIGHT: u32 = 1 << 7;

const EDGES: &[(&str, u32)] = &[
    ("Left", EDGE_LEFT),
    ("Right", EDGE_RIGHT),
    ("Top", EDGE_TOP),
    ("Bottom", EDGE_BOTTOM),
    ("TopLeft", EDGE_TOP_LEFT),
    ("TopRight", EDGE_TOP_RIGHT),
    ("BottomLeft", EDGE_BOTTOM_LEFT),
    ("BottomRight", EDGE_BOTTOM_RIGHT),
];

const NAMED_KEYSYMS: &[(&str, i32)] = &[
    ("space", 0x20),
    ("apostrophe", 0x27),
    ("comma", 0x2c),
    ("minus", 0x2d),
    ("period", 0x2e),
    ("slash", 0x2f),
    ("semicolon", 0x3b),
    ("equal", 0x3d),
    ("bracketleft", 0x5b),
    ("backslash", 0x5c),
    ("bracketright", 0x5d),
    ("grave", 0x60),
    ("BackSpace", 0xff08),
    ("Tab", 0xff09),
    ("Return", 0xff0d),
    ("Pause", 0xff13),
    ("Escape", 0xff1b),
    ("Home", 0xff50),
    ("Left", 0xff51),
    ("Up", 0xff52),
    ("Right", 0xff53),
    ("Down", 0xff54),
    ("Page_Up", 0xff55),
    ("Page_Down", 0xff56),
    ("End", 0xff57),
    ("Print", 0xff61),
    ("Insert", 0xff63),
    ("Menu", 0xff67),
    ("KP_Enter", 0xff8d),
    ("Delete", 0xffff),
];

const KEYSYM_F1: i32 = 0xffbe;
const FUNCTION_KEYS: i32 = 35;

fn invalid(ty: SettingType, value: &str) -> Error {
    Error::InvalidValue {
        ty,
        value: value.to_string(),
    }
}

fn token_regex() -> Result<&'static Regex> {
    static TOKEN: OnceLock<Regex> = OnceLock::new();
    if let Some(re) = TOKEN.get() {
        return Ok(re);
    }
    let re = Regex::new(r"^\s*<([A-Za-z0-9_]+)>")
        .map_err(|e| Error::parse("binding token pattern", e.to_string()))?;
    Ok(TOKEN.get_or_init(|| re))
}

/// Split leading `<Token>` groups off `text`, returning them and the rest
fn split_tokens(text: &str) -> Result<(Vec<&str>, &str)> {
    let re = token_regex()?;
    let mut tokens = Vec::new();
    let mut rest = text;
    while let Some(caps) = re.captures(rest) {
        let (Some(whole), Some(name)) = (caps.get(0), caps.get(1)) else {
            break;
        };
        tokens.push(name.as_str());
        rest = &rest[whole.end()..];
    }
    Ok((tokens, rest.trim()))
}

fn modifier_mask(name: &str) -> Option<u32> {
    if name == "Primary" {
        return Some(CONTROL_MASK);
    }
    MODIFIERS
        .iter()
        .find(|(n, _)| n.eq_ignore_ascii_case(name))
        .map(|(_, m)| *m)
}

// =============================================================================
// Modifiers
// =============================================================================

/// `<Shift><Control>` style prefix for a modifier mask
#[must_use]
pub fn modifiers_to_string(mask: u32) -> String {
    MODIFIERS
        .iter()
        .filter(|(_, m)| mask & m != 0)
        .map(|(n, _)| format!("<{n}>"))
        .collect()
}

/// Modifier mask from any `<Modifier>` tokens in `binding`; unknown tokens are ignored
pub fn string_to_modifiers(binding: &str) -> Result<u32> {
    let (tokens, _) = split_tokens(binding)?;
    Ok(tokens.iter().filter_map(|t| modifier_mask(t)).fold(0, |acc, m| acc | m))
}

// =============================================================================
// Edges
// =============================================================================

/// `Left|Top` style list of edge names
#[must_use]
pub fn edges_to_string(mask: u32) -> String {
    EDGES
        .iter()
        .filter(|(_, m)| mask & m != 0)
        .map(|(n, _)| *n)
        .collect::<Vec<_>>()
        .join("|")
}

/// `<LeftEdge><TopEdge>` style list used inside button bindings
#[must_use]
pub fn edges_to_mod_string(mask: u32) -> String {
    EDGES
        .iter()
        .filter(|(_, m)| mask & m != 0)
        .map(|(n, _)| format!("<{n}Edge>"))
        .collect()
}

pub fn string_to_edges(text: &str) -> Result<u32> {
    let mut mask = 0;
    for part in text.split('|').map(str::trim).filter(|p| !p.is_empty()) {
        let (_, bit) = EDGES
            .iter()
            .find(|(n, _)| *n == part)
            .ok_or_else(|| invalid(SettingType::Edge, text))?;
        mask |= bit;
    }
    Ok(mask)
}

fn edge_token_mask(token: &str) -> Option<u32> {
    let name = token.strip_suffix("Edge")?;
    EDGES.iter().find(|(n, _)| *n == name).map(|(_, m)| *m)
}

// =============================================================================
// Keys
// =============================================================================

/// Name for a key symbol; unnamed symbols are written in hex
#[must_use]
pub fn keysym_to_string(keysym: i32) -> String {
    match keysym {
        0x30..=0x39 | 0x41..=0x5a | 0x61..=0x7a => {
            char::from_u32(keysym as u32).map_or_else(|| format!("0x{keysym:x}"), String::from)
        }
        k if (KEYSYM_F1..KEYSYM_F1 + FUNCTION_KEYS).contains(&k) => {
            format!("F{}", k - KEYSYM_F1 + 1)
        }
        k => NAMED_KEYSYMS
            .iter()
            .find(|(_, sym)| *sym == k)
            .map_or_else(|| format!("0x{k:x}"), |(n, _)| (*n).to_string()),
    }
}

pub fn string_to_keysym(name: &str) -> Option<i32> {
    if name.is_empty() {
        return Some(0);
    }
    if let Some(hex) = name.strip_prefix("0x") {
        return i32::from_str_radix(hex, 16).ok();
    }
    let mut chars = name.chars();
    if let (Some(c), None) = (chars.next(), chars.next()) {
        if c.is_ascii_alphanumeric() {
            return Some(c as i32);
        }
    }
    if let Some(n) = name.strip_prefix('F').and_then(|n| n.parse::<i32>().ok()) {
        if (1..=FUNCTION_KEYS).contains(&n) {
            return Some(KEYSYM_F1 + n - 1);
        }
    }
    NAMED_KEYSYMS
        .iter()
        .find(|(n, _)| *n == name)
        .map(|(_, sym)| *sym)
}

#[must_use]
pub fn key_binding_to_string(key: &KeyValue) -> String {
    if key.keysym == 0 && key.key_mod_mask == 0 {
        return DISABLED.to_string();
    }
    let mut text = modifiers_to_string(key.key_mod_mask);
    if key.keysym != 0 {
        text.push_str(&keysym_to_string(key.keysym));
    }
    text
}

pub fn string_to_key_binding(binding: &str) -> Result<KeyValue> {
    let trimmed = binding.trim();
    if trimmed.is_empty() || trimmed.eq_ignore_ascii_case(DISABLED) {
        return Ok(KeyValue::default());
    }
    let (tokens, rest) = split_tokens(trimmed)?;
    let mut key_mod_mask = 0;
    for token in tokens {
        key_mod_mask |= modifier_mask(token).ok_or_else(|| invalid(SettingType::Key, binding))?;
    }
    let keysym = string_to_keysym(rest).ok_or_else(|| invalid(SettingType::Key, binding))?;
    Ok(KeyValue {
        keysym,
        key_mod_mask,
    })
}

// =============================================================================
// Buttons
// =============================================================================

#[must_use]
pub fn button_binding_to_string(button: &ButtonValue) -> String {
    if button.button == 0 && button.button_mod_mask == 0 && button.edge_mask == 0 {
        return DISABLED.to_string();
    }
    let mut text = modifiers_to_string(button.button_mod_mask);
    text.push_str(&edges_to_mod_string(button.edge_mask));
    if button.button != 0 {
        text.push_str(&format!("Button{}", button.button));
    }
    text
}

pub fn string_to_button_binding(binding: &str) -> Result<ButtonValue> {
    let trimmed = binding.trim();
    if trimmed.is_empty() || trimmed.eq_ignore_ascii_case(DISABLED) {
        return Ok(ButtonValue::default());
    }
    let (tokens, rest) = split_tokens(trimmed)?;
    let mut value = ButtonValue::default();
    for token in tokens {
        if let Some(edge) = edge_token_mask(token) {
            value.edge_mask |= edge;
        } else {
            value.button_mod_mask |=
                modifier_mask(token).ok_or_else(|| invalid(SettingType::Button, binding))?;
        }
    }
    if !rest.is_empty() {
        value.button = rest
            .strip_prefix("Button")
            .and_then(|n| n.parse::<i32>().ok())
            .ok_or_else(|| invalid(SettingType::Button, binding))?;
    }
    Ok(value)
}

// =============================================================================
// Colors
// =============================================================================

/// `#rrggbbaa` when every channel is exact in 8 bits, else `#rrrrggggbbbbaaaa`
#[must_use]
pub fn color_to_string(color: &ColorValue) -> String {
    let channels = color.channels();
    if channels.iter().all(|c| c % 257 == 0) {
        let [r, g, b, a] = channels.map(|c| c / 257);
        format!("#{r:02x}{g:02x}{b:02x}{a:02x}")
    } else {
        let [r, g, b, a] = channels;
        format!("#{r:04x}{g:04x}{b:04x}{a:04x}")
    }
}

pub fn string_to_color(text: &str) -> Result<ColorValue> {
    let trimmed = text.trim();
    let fail = || invalid(SettingType::Color, text);

    if let Some(hex) = trimmed.strip_prefix('#') {
        if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(fail());
        }
        let (width, scale, alpha_default) = match hex.len() {
            6 | 8 => (2, 257u16, "ff"),
            12 | 16 => (4, 1u16, "ffff"),
            _ => return Err(fail()),
        };
        let padded = if hex.len() % (width * 4) == 0 {
            hex.to_string()
        } else {
            format!("{hex}{alpha_default}")
        };
        let mut channels = [0u16; 4];
        for (i, channel) in channels.iter_mut().enumerate() {
            let part = &padded[i * width..(i + 1) * width];
            *channel = u16::from_str_radix(part, 16).map_err(|_| fail())? * scale;
        }
        let [red, green, blue, alpha] = channels;
        return Ok(ColorValue::new(red, green, blue, alpha));
    }

    let parts: Vec<u16> = trimmed
        .split_whitespace()
        .map(|p| p.parse::<u16>().map_err(|_| fail()))
        .collect::<Result<_>>()?;
    match parts.as_slice() {
        [red, green, blue, alpha] => Ok(ColorValue::new(*red, *green, *blue, *alpha)),
        _ => Err(fail()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_binding_with_modifiers() {
        let key = string_to_key_binding("<Control><Alt>F1").unwrap();
        assert_eq!(key.keysym, KEYSYM_F1);
        assert_eq!(key.key_mod_mask, CONTROL_MASK | ALT_MASK);
        assert_eq!(key_binding_to_string(&key), "<Control><Alt>F1");
    }

    #[test]
    fn test_key_binding_named_and_letters() {
        let key = string_to_key_binding("<Shift><Control>space").unwrap();
        assert_eq!(key.keysym, 0x20);
        assert_eq!(key_binding_to_string(&key), "<Shift><Control>space");

        let key = string_to_key_binding("<Super>a").unwrap();
        assert_eq!(key.keysym, 'a' as i32);
        assert_eq!(key.key_mod_mask, SUPER_MASK);
    }

    #[test]
    fn test_key_binding_disabled_and_modifier_only() {
        assert_eq!(string_to_key_binding("Disabled").unwrap(), KeyValue::default());
        assert_eq!(key_binding_to_string(&KeyValue::default()), "Disabled");

        let key = string_to_key_binding("<Super>").unwrap();
        assert_eq!(key.keysym, 0);
        assert_eq!(key_binding_to_string(&key), "<Super>");
    }

    #[test]
    fn test_primary_is_control() {
        let key = string_to_key_binding("<Primary>q").unwrap();
        assert_eq!(key.key_mod_mask, CONTROL_MASK);
    }

    #[test]
    fn test_unknown_keysym_round_trips_as_hex() {
        let key = KeyValue {
            keysym: 0x1008ff13,
            key_mod_mask: 0,
        };
        let text = key_binding_to_string(&key);
        assert_eq!(text, "0x1008ff13");
        assert_eq!(string_to_key_binding(&text).unwrap(), key);
    }

    #[test]
    fn test_bad_key_binding() {
        assert!(string_to_key_binding("<Bogus>a").is_err());
        assert!(string_to_key_binding("<Control>NoSuchKey").is_err());
    }

    #[test]
    fn test_button_binding() {
        let button = string_to_button_binding("<Alt><TopLeftEdge>Button1").unwrap();
        assert_eq!(button.button, 1);
        assert_eq!(button.button_mod_mask, ALT_MASK);
        assert_eq!(button.edge_mask, EDGE_TOP_LEFT);
        assert_eq!(button_binding_to_string(&button), "<Alt><TopLeftEdge>Button1");
        assert_eq!(
            string_to_button_binding("Disabled").unwrap(),
            ButtonValue::default()
        );
    }

    #[test]
    fn test_edges() {
        let mask = string_to_edges("Left|Top").unwrap();
        assert_eq!(mask, EDGE_LEFT | EDGE_TOP);
        assert_eq!(edges_to_string(mask), "Left|Top");
        assert_eq!(string_to_edges("").unwrap(), 0);
        assert_eq!(edges_to_string(0), "");
        assert!(string_to_edges("Middle").is_err());
    }

    #[test]
    fn test_modifier_helpers() {
        assert_eq!(modifiers_to_string(SHIFT_MASK | SUPER_MASK), "<Shift><Super>");
        assert_eq!(
            string_to_modifiers("<Shift><Super>x").unwrap(),
            SHIFT_MASK | SUPER_MASK
        );
    }

    #[test]
    fn test_color_formats() {
        let exact = ColorValue::from_rgba8(0xff, 0x80, 0x00, 0xff);
        assert_eq!(color_to_string(&exact), "#ff8000ff");
        assert_eq!(string_to_color("#ff8000ff").unwrap(), exact);
        assert_eq!(string_to_color("#ff8000").unwrap(), exact);

        let fine = ColorValue::new(1, 2, 3, 0xffff);
        let text = color_to_string(&fine);
        assert_eq!(text, "#000100020003ffff");
        assert_eq!(string_to_color(&text).unwrap(), fine);

        assert_eq!(
            string_to_color("10 20 30 40").unwrap(),
            ColorValue::new(10, 20, 30, 40)
        );
        assert!(string_to_color("#12").is_err());
        assert!(string_to_color("red").is_err());
    }
}
