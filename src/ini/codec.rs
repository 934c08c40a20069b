//! Text encoding of setting values
//!
//! | type          | example                      |
//! |---------------|------------------------------|
//! | bool, bell    | `true`                       |
//! | int           | `-3`                         |
//! | float         | `0.25`                       |
//! | string, match | `any & !type=Desktop`        |
//! | color         | `#ff8000ff`                  |
//! | key           | `<Control><Alt>Delete`       |
//! | button        | `<Super><LeftEdge>Button1`   |
//! | edge          | `Left\|Top`                  |
//! | list          | `core;move;resize`           |
//!
//! Strings escape backslashes and newlines; list items additionally escape `;`.

use crate::binding;
use crate::error::{Error, Result};
use crate::value::{SettingType, SettingValue, ValueList};

const LIST_SEPARATOR: char = ';';

fn invalid(ty: SettingType, text: &str) -> Error {
    Error::InvalidValue {
        ty,
        value: text.to_string(),
    }
}

fn escape_text(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            _ => out.push(c),
        }
    }
    out
}

fn unescape_text(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some(other) => out.push(other),
            None => out.push('\\'),
        }
    }
    out
}

/// Encode a value for storage
#[must_use]
pub fn encode_value(value: &SettingValue) -> String {
    match value {
        SettingValue::Bool(b) | SettingValue::Bell(b) => b.to_string(),
        SettingValue::Int(i) => i.to_string(),
        SettingValue::Float(f) => f.to_string(),
        SettingValue::String(s) | SettingValue::Match(s) => escape_text(s),
        SettingValue::Color(c) => binding::color_to_string(c),
        SettingValue::Action => String::new(),
        SettingValue::Key(k) => binding::key_binding_to_string(k),
        SettingValue::Button(b) => binding::button_binding_to_string(b),
        SettingValue::Edge(e) => binding::edges_to_string(*e),
        SettingValue::List(list) => encode_list(list),
    }
}

/// Encode a list as `;`-separated items
#[must_use]
pub fn encode_list(list: &ValueList) -> String {
    let items: Vec<String> = list
        .iter()
        .map(|item| {
            encode_value(item)
                .replace('\\', "\\\\")
                .replace(LIST_SEPARATOR, "\\;")
        })
        .collect();
    let mut text = items.join(";");
    // A trailing empty item needs an explicit terminator
    if items.last().is_some_and(String::is_empty) {
        text.push(LIST_SEPARATOR);
    }
    text
}

/// Split on unescaped separators and remove one level of escaping.
///
/// Empty text is the empty list; one trailing separator terminates the
/// last item instead of starting a new one.
fn split_list(text: &str) -> Vec<String> {
    let mut items = Vec::new();
    if text.is_empty() {
        return items;
    }
    let mut current = String::new();
    let mut terminated = false;
    let mut chars = text.chars();
    while let Some(c) = chars.next() {
        terminated = c == LIST_SEPARATOR;
        match c {
            '\\' => match chars.next() {
                Some(next) => current.push(next),
                None => current.push('\\'),
            },
            LIST_SEPARATOR => items.push(std::mem::take(&mut current)),
            _ => current.push(c),
        }
    }
    if !terminated {
        items.push(current);
    }
    items
}

/// Decode stored text as `ty`; `element_type` is used for lists
pub fn decode_value(text: &str, ty: SettingType, element_type: SettingType) -> Result<SettingValue> {
    let trimmed = text.trim();
    let value = match ty {
        SettingType::Bool | SettingType::Bell => {
            let b = match trimmed.to_ascii_lowercase().as_str() {
                "true" | "1" => true,
                "false" | "0" => false,
                _ => return Err(invalid(ty, text)),
            };
            if ty == SettingType::Bool {
                SettingValue::Bool(b)
            } else {
                SettingValue::Bell(b)
            }
        }
        SettingType::Int => SettingValue::Int(trimmed.parse().map_err(|_| invalid(ty, text))?),
        SettingType::Float => {
            SettingValue::Float(trimmed.parse().map_err(|_| invalid(ty, text))?)
        }
        SettingType::String => SettingValue::String(unescape_text(text)),
        SettingType::Match => SettingValue::Match(unescape_text(text)),
        SettingType::Color => SettingValue::Color(binding::string_to_color(trimmed)?),
        SettingType::Action => SettingValue::Action,
        SettingType::Key => SettingValue::Key(binding::string_to_key_binding(trimmed)?),
        SettingType::Button => SettingValue::Button(binding::string_to_button_binding(trimmed)?),
        SettingType::Edge => SettingValue::Edge(binding::string_to_edges(trimmed)?),
        SettingType::List => {
            if element_type == SettingType::List {
                return Err(invalid(ty, text));
            }
            let items = split_list(text)
                .iter()
                .map(|item| decode_value(item, element_type, SettingType::Bool))
                .collect::<Result<Vec<_>>>()?;
            SettingValue::List(ValueList::from_values(element_type, items)?)
        }
    };
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::{ButtonValue, ColorValue, KeyValue};

    fn round_trip(value: SettingValue) {
        let element = match &value {
            SettingValue::List(list) => list.element_type(),
            _ => SettingType::Bool,
        };
        let text = encode_value(&value);
        let decoded = decode_value(&text, value.setting_type(), element).unwrap();
        assert_eq!(decoded, value, "text was {text:?}");
    }

    #[test]
    fn test_scalar_round_trips() {
        round_trip(SettingValue::Bool(true));
        round_trip(SettingValue::Int(-17));
        round_trip(SettingValue::Float(0.1));
        round_trip(SettingValue::Float(1.0e-7));
        round_trip(SettingValue::String("multi\nline \\ text".into()));
        round_trip(SettingValue::Match("class=Foo & !title=Bar".into()));
        round_trip(SettingValue::Color(ColorValue::new(1, 0xffff, 3, 0x8080)));
        round_trip(SettingValue::Key(KeyValue {
            keysym: 0xff09,
            key_mod_mask: binding::ALT_MASK,
        }));
        round_trip(SettingValue::Button(ButtonValue {
            button: 3,
            button_mod_mask: binding::SUPER_MASK,
            edge_mask: binding::EDGE_BOTTOM_RIGHT,
        }));
        round_trip(SettingValue::Edge(binding::EDGE_LEFT | binding::EDGE_BOTTOM));
        round_trip(SettingValue::Bell(false));
    }

    #[test]
    fn test_list_escaping() {
        let list = ValueList::from_strings(&["a;b", "c\\d", "plain"]);
        let text = encode_list(&list);
        assert_eq!(text, "a\\;b;c\\\\\\\\d;plain");
        round_trip(SettingValue::List(list));
    }

    #[test]
    fn test_list_of_ints_and_empty_list() {
        round_trip(SettingValue::List(ValueList::from_ints(&[3, -1, 7])));
        round_trip(SettingValue::List(ValueList::new(SettingType::Int)));
        round_trip(SettingValue::List(ValueList::from_colors(&[
            ColorValue::from_rgba8(1, 2, 3, 4),
        ])));
    }

    #[test]
    fn test_trailing_separator_is_tolerated() {
        let value = decode_value("core;move;", SettingType::List, SettingType::String).unwrap();
        let SettingValue::List(list) = value else {
            panic!("expected list");
        };
        assert_eq!(list.to_strings().unwrap(), ["core", "move"]);
    }

    #[test]
    fn test_empty_items_survive() {
        let cases: [&[&str]; 4] = [&[""], &["a", ""], &["", "b"], &["", ""]];
        for items in cases {
            round_trip(SettingValue::List(ValueList::from_strings(items)));
        }
        assert_eq!(encode_list(&ValueList::from_strings(&[""])), ";");
        assert_eq!(encode_list(&ValueList::from_strings(&["a", ""])), "a;;");
        assert_eq!(encode_list(&ValueList::new(SettingType::String)), "");
    }

    #[test]
    fn test_invalid_values() {
        assert!(decode_value("maybe", SettingType::Bool, SettingType::Bool).is_err());
        assert!(decode_value("1.5", SettingType::Int, SettingType::Bool).is_err());
        assert!(decode_value("1;x", SettingType::List, SettingType::Int).is_err());
    }
}
