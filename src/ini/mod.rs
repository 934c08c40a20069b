//! Minimal INI document model
//!
//! Sections and keys keep their file order so that rewriting a file only
//! touches the lines that changed. Typed access goes through [`codec`].

pub mod codec;

use crate::error::{self, Error, Result};
use crate::value::{ButtonValue, ColorValue, KeyValue, SettingType, SettingValue, ValueList};
use log::warn;
use std::fmt;
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Eq, Default)]
struct Section {
    name: String,
    entries: Vec<(String, String)>,
}

/// An INI document: `[section]` headers followed by `key=value` lines
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct IniFile {
    sections: Vec<Section>,
}

impl IniFile {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse INI text. Comment lines (`#`, `;`) and malformed lines are skipped.
    #[must_use]
    pub fn parse(text: &str) -> Self {
        let mut file = Self::new();
        let mut current = String::new();

        for (number, raw) in text.lines().enumerate() {
            let line = raw.trim_end_matches('\r');
            let trimmed = line.trim_start();
            if trimmed.is_empty() || trimmed.starts_with('#') || trimmed.starts_with(';') {
                continue;
            }
            if let Some(name) = trimmed
                .trim_end()
                .strip_prefix('[')
                .and_then(|s| s.strip_suffix(']'))
            {
                current = name.trim().to_string();
                file.section_mut(&current);
                continue;
            }
            match trimmed.split_once('=') {
                Some((key, value)) => file.set(&current, key.trim(), value),
                None => warn!("Ignoring malformed line {}: '{line}'", number + 1),
            }
        }
        file
    }

    /// Load a file; a missing file yields an empty document
    pub fn load(path: &Path) -> Result<Self> {
        match error::read_file(path) {
            Ok(text) => Ok(Self::parse(&text)),
            Err(Error::PathNotFound(_)) => Ok(Self::new()),
            Err(e) => Err(e),
        }
    }

    /// Load a file that must exist
    pub fn load_existing(path: &Path) -> Result<Self> {
        error::read_file(path).map(|text| Self::parse(&text))
    }

    /// Write the document atomically, creating the directory on demand
    pub fn save(&self, path: &Path) -> Result<()> {
        error::write_file_atomic(path, self.to_string())
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sections.iter().all(|s| s.entries.is_empty())
    }

    pub fn sections(&self) -> impl Iterator<Item = &str> {
        self.sections.iter().map(|s| s.name.as_str())
    }

    pub fn keys<'a>(&'a self, section: &str) -> impl Iterator<Item = &'a str> + 'a {
        self.section(section)
            .into_iter()
            .flat_map(|s| s.entries.iter().map(|(k, _)| k.as_str()))
    }

    #[must_use]
    pub fn get(&self, section: &str, key: &str) -> Option<&str> {
        self.section(section)?
            .entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn set(&mut self, section: &str, key: &str, value: &str) {
        let section = self.section_mut(section);
        match section.entries.iter_mut().find(|(k, _)| k == key) {
            Some(entry) => entry.1 = value.to_string(),
            None => section.entries.push((key.to_string(), value.to_string())),
        }
    }

    /// Remove a key; returns whether it existed
    pub fn remove(&mut self, section: &str, key: &str) -> bool {
        let Some(section) = self.sections.iter_mut().find(|s| s.name == section) else {
            return false;
        };
        let before = section.entries.len();
        section.entries.retain(|(k, _)| k != key);
        section.entries.len() != before
    }

    pub fn remove_section(&mut self, section: &str) -> bool {
        let before = self.sections.len();
        self.sections.retain(|s| s.name != section);
        self.sections.len() != before
    }

    fn section(&self, name: &str) -> Option<&Section> {
        self.sections.iter().find(|s| s.name == name)
    }

    fn section_mut(&mut self, name: &str) -> &mut Section {
        let index = match self.sections.iter().position(|s| s.name == name) {
            Some(i) => i,
            None => {
                self.sections.push(Section {
                    name: name.to_string(),
                    entries: Vec::new(),
                });
                self.sections.len() - 1
            }
        };
        &mut self.sections[index]
    }

    // =========================================================================
    // Typed access
    // =========================================================================

    /// Decode `section.key` as `ty`; absent keys give `Ok(None)`
    pub fn get_value(
        &self,
        section: &str,
        key: &str,
        ty: SettingType,
        element_type: SettingType,
    ) -> Result<Option<SettingValue>> {
        self.get(section, key)
            .map(|text| codec::decode_value(text, ty, element_type))
            .transpose()
    }

    pub fn set_value(&mut self, section: &str, key: &str, value: &SettingValue) {
        self.set(section, key, &codec::encode_value(value));
    }

    fn get_typed<T>(
        &self,
        section: &str,
        key: &str,
        ty: SettingType,
        extract: impl FnOnce(SettingValue) -> Option<T>,
    ) -> Option<T> {
        match self.get_value(section, key, ty, SettingType::Bool) {
            Ok(value) => value.and_then(extract),
            Err(e) => {
                warn!("Unable to read [{section}] {key}: {e}");
                None
            }
        }
    }

    pub fn get_bool(&self, section: &str, key: &str) -> Option<bool> {
        self.get_typed(section, key, SettingType::Bool, |v| match v {
            SettingValue::Bool(b) => Some(b),
            _ => None,
        })
    }

    pub fn get_int(&self, section: &str, key: &str) -> Option<i32> {
        self.get_typed(section, key, SettingType::Int, |v| match v {
            SettingValue::Int(i) => Some(i),
            _ => None,
        })
    }

    pub fn get_float(&self, section: &str, key: &str) -> Option<f32> {
        self.get_typed(section, key, SettingType::Float, |v| match v {
            SettingValue::Float(f) => Some(f),
            _ => None,
        })
    }

    pub fn get_string(&self, section: &str, key: &str) -> Option<String> {
        self.get_typed(section, key, SettingType::String, |v| match v {
            SettingValue::String(s) => Some(s),
            _ => None,
        })
    }

    pub fn get_color(&self, section: &str, key: &str) -> Option<ColorValue> {
        self.get_typed(section, key, SettingType::Color, |v| match v {
            SettingValue::Color(c) => Some(c),
            _ => None,
        })
    }

    pub fn get_key(&self, section: &str, key: &str) -> Option<KeyValue> {
        self.get_typed(section, key, SettingType::Key, |v| match v {
            SettingValue::Key(k) => Some(k),
            _ => None,
        })
    }

    pub fn get_button(&self, section: &str, key: &str) -> Option<ButtonValue> {
        self.get_typed(section, key, SettingType::Button, |v| match v {
            SettingValue::Button(b) => Some(b),
            _ => None,
        })
    }

    pub fn get_edge(&self, section: &str, key: &str) -> Option<u32> {
        self.get_typed(section, key, SettingType::Edge, |v| match v {
            SettingValue::Edge(e) => Some(e),
            _ => None,
        })
    }

    pub fn get_bell(&self, section: &str, key: &str) -> Option<bool> {
        self.get_typed(section, key, SettingType::Bell, |v| match v {
            SettingValue::Bell(b) => Some(b),
            _ => None,
        })
    }

    pub fn get_list(&self, section: &str, key: &str, element_type: SettingType) -> Option<ValueList> {
        match self.get_value(section, key, SettingType::List, element_type) {
            Ok(Some(SettingValue::List(list))) => Some(list),
            Ok(_) => None,
            Err(e) => {
                warn!("Unable to read [{section}] {key}: {e}");
                None
            }
        }
    }

    pub fn set_bool(&mut self, section: &str, key: &str, value: bool) {
        self.set_value(section, key, &SettingValue::Bool(value));
    }

    pub fn set_int(&mut self, section: &str, key: &str, value: i32) {
        self.set_value(section, key, &SettingValue::Int(value));
    }

    pub fn set_float(&mut self, section: &str, key: &str, value: f32) {
        self.set_value(section, key, &SettingValue::Float(value));
    }

    pub fn set_string(&mut self, section: &str, key: &str, value: &str) {
        self.set_value(section, key, &SettingValue::String(value.to_string()));
    }

    pub fn set_color(&mut self, section: &str, key: &str, value: ColorValue) {
        self.set_value(section, key, &SettingValue::Color(value));
    }

    pub fn set_key(&mut self, section: &str, key: &str, value: KeyValue) {
        self.set_value(section, key, &SettingValue::Key(value));
    }

    pub fn set_button(&mut self, section: &str, key: &str, value: ButtonValue) {
        self.set_value(section, key, &SettingValue::Button(value));
    }

    pub fn set_edge(&mut self, section: &str, key: &str, value: u32) {
        self.set_value(section, key, &SettingValue::Edge(value));
    }

    pub fn set_bell(&mut self, section: &str, key: &str, value: bool) {
        self.set_value(section, key, &SettingValue::Bell(value));
    }

    pub fn set_list(&mut self, section: &str, key: &str, value: &ValueList) {
        self.set(section, key, &codec::encode_list(value));
    }
}

impl fmt::Display for IniFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for section in &self.sections {
            if section.entries.is_empty() {
                continue;
            }
            if !first {
                writeln!(f)?;
            }
            first = false;
            writeln!(f, "[{}]", section.name)?;
            for (key, value) in &section.entries {
                writeln!(f, "{key}={value}")?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_parse_sections_and_keys() {
        let file = IniFile::parse("# comment\n[core]\ns0_active_plugins=core;move\n\n[cube]\ns0_speed=2\n");
        assert_eq!(file.sections().collect::<Vec<_>>(), ["core", "cube"]);
        assert_eq!(file.get("cube", "s0_speed"), Some("2"));
        assert_eq!(file.get("cube", "missing"), None);
        assert_eq!(file.keys("core").collect::<Vec<_>>(), ["s0_active_plugins"]);
    }

    #[test]
    fn test_value_keeps_equals_and_spaces() {
        let file = IniFile::parse("[m]\ns0_match=class=XTerm | title= a \n");
        assert_eq!(file.get("m", "s0_match"), Some("class=XTerm | title= a "));
    }

    #[test]
    fn test_display_skips_empty_sections() {
        let mut file = IniFile::new();
        file.set_int("a", "x", 1);
        file.set_int("b", "y", 2);
        file.remove("a", "x");
        assert_eq!(file.to_string(), "[b]\ny=2\n");
    }

    #[test]
    fn test_typed_access() {
        let mut file = IniFile::new();
        file.set_float("cube", "s0_speed", 2.5);
        file.set_bool("cube", "s0_blend", true);
        file.set_list("core", "s0_active_plugins", &ValueList::from_strings(&["core", "cube"]));

        assert_eq!(file.get_float("cube", "s0_speed"), Some(2.5));
        assert_eq!(file.get_bool("cube", "s0_blend"), Some(true));
        assert_eq!(file.get_int("cube", "s0_blend"), None);
        assert_eq!(
            file.get_list("core", "s0_active_plugins", SettingType::String)
                .unwrap()
                .to_strings()
                .unwrap(),
            ["core", "cube"]
        );
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("compizconfig/Default.ini");

        let mut file = IniFile::new();
        file.set_string("core", "s0_title", "hello");
        file.save(&path).unwrap();

        let loaded = IniFile::load_existing(&path).unwrap();
        assert_eq!(loaded, file);
        assert!(IniFile::load(&dir.path().join("nope.ini")).unwrap().is_empty());
        assert!(IniFile::load_existing(&dir.path().join("nope.ini")).is_err());
    }
}
