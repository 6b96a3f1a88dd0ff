//! Field lookup over raw feed records.
//!
//! A record can answer a field request in two ways: through typed parser
//! output ("attribute" access) or through loose key/value pairs recovered
//! from a malformed document ("key" access). Callers don't care which; they
//! ask for an ordered list of candidate names and take the first value found.

use std::collections::BTreeMap;

pub trait FieldSource {
    fn attribute(&self, _name: &str) -> Option<String> {
        None
    }

    fn key(&self, _name: &str) -> Option<String> {
        None
    }
}

/// First present, non-blank value for any of `names`.
///
/// Every name is tried attribute-style before any name is tried key-style.
pub fn first_field<S: FieldSource + ?Sized>(source: &S, names: &[&str]) -> Option<String> {
    let attributes = names.iter().filter_map(|name| source.attribute(name));
    let keys = names.iter().filter_map(|name| source.key(name));

    attributes
        .chain(keys)
        .map(|value| value.trim().to_string())
        .find(|value| !value.is_empty())
}

/// Case-insensitive key/value fields of one record. The first value stored
/// under a key wins.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldMap(BTreeMap<String, String>);

impl FieldMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: &str, value: &str) {
        let value = value.trim();
        if value.is_empty() {
            return;
        }
        self.0
            .entry(name.to_ascii_lowercase())
            .or_insert_with(|| value.to_string());
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.0.get(&name.to_ascii_lowercase()).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<'a> FromIterator<(&'a str, &'a str)> for FieldMap {
    fn from_iter<I: IntoIterator<Item = (&'a str, &'a str)>>(iter: I) -> Self {
        let mut map = Self::new();
        for (name, value) in iter {
            map.insert(name, value);
        }
        map
    }
}

impl FieldSource for FieldMap {
    fn key(&self, name: &str) -> Option<String> {
        self.get(name).map(String::from)
    }
}
