// Copyright 2025 Lablup Inc. and Jeongkyu Shin
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Attribute sets supplied by the host on create/update calls.

use serde::{Serialize, Serializer};

use crate::security::GuardedString;

/// Well-known attribute names shared with the host framework.
///
/// Comment, shell and home directory names are configurable and live in
/// [`crate::config::AttributeNames`].
pub mod names {
    pub const NAME: &str = "__NAME__";
    pub const UID: &str = "__UID__";
    pub const PASSWORD: &str = "__PASSWORD__";
    pub const ENABLE: &str = "__ENABLE__";
    pub const LOCK_OUT: &str = "__LOCK_OUT__";
    pub const DISABLE_DATE: &str = "__DISABLE_DATE__";
    pub const GROUPS: &str = "groups";
    pub const PUBLIC_KEY: &str = "sshPublicKey";
    pub const PERMISSIONS: &str = "permissions";
}

#[derive(Debug, Clone)]
pub enum AttributeValue {
    String(String),
    Bool(bool),
    Secret(GuardedString),
}

impl AttributeValue {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(value) => Some(value),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(value) => Some(*value),
            Self::String(value) => value.trim().parse().ok(),
            Self::Secret(_) => None,
        }
    }

    pub fn as_secret(&self) -> Option<&GuardedString> {
        match self {
            Self::Secret(value) => Some(value),
            _ => None,
        }
    }
}

impl From<&str> for AttributeValue {
    fn from(value: &str) -> Self {
        Self::String(value.to_string())
    }
}

impl From<String> for AttributeValue {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

impl From<bool> for AttributeValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<GuardedString> for AttributeValue {
    fn from(value: GuardedString) -> Self {
        Self::Secret(value)
    }
}

impl Serialize for AttributeValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::String(value) => serializer.serialize_str(value),
            Self::Bool(value) => serializer.serialize_bool(*value),
            Self::Secret(_) => serializer.serialize_str("********"),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Attribute {
    pub name: String,
    pub values: Vec<AttributeValue>,
}

impl Attribute {
    pub fn new(name: impl Into<String>, values: Vec<AttributeValue>) -> Self {
        Self {
            name: name.into(),
            values,
        }
    }

    pub fn single(name: impl Into<String>, value: impl Into<AttributeValue>) -> Self {
        Self::new(name, vec![value.into()])
    }

    pub fn is(&self, name: &str) -> bool {
        self.name.eq_ignore_ascii_case(name)
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn first(&self) -> Option<&AttributeValue> {
        self.values.first()
    }
}

/// Attribute name to values mapping, immutable for the duration of a call.
///
/// Insertion order is preserved so that command composition stays
/// deterministic. An attribute with no values is treated exactly like an
/// absent one.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(transparent)]
pub struct AttributeSet {
    attributes: Vec<Attribute>,
}

impl AttributeSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace an attribute.
    pub fn insert(&mut self, attribute: Attribute) {
        match self.attributes.iter_mut().find(|a| a.is(&attribute.name)) {
            Some(existing) => *existing = attribute,
            None => self.attributes.push(attribute),
        }
    }

    pub fn with(mut self, name: &str, value: impl Into<AttributeValue>) -> Self {
        self.insert(Attribute::single(name, value));
        self
    }

    pub fn with_values<I, V>(mut self, name: &str, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<AttributeValue>,
    {
        self.insert(Attribute::new(
            name,
            values.into_iter().map(Into::into).collect(),
        ));
        self
    }

    /// Attribute by name, `None` when absent or empty.
    pub fn find(&self, name: &str) -> Option<&Attribute> {
        self.attributes
            .iter()
            .find(|a| a.is(name))
            .filter(|a| !a.is_empty())
    }

    /// Whether the attribute was supplied at all, even without values.
    pub fn contains(&self, name: &str) -> bool {
        self.attributes.iter().any(|a| a.is(name))
    }

    pub fn is_present(&self, name: &str) -> bool {
        self.find(name).is_some()
    }

    /// First value as a non-blank string.
    pub fn string(&self, name: &str) -> Option<&str> {
        self.find(name)?
            .values
            .iter()
            .find_map(AttributeValue::as_str)
            .filter(|v| !v.trim().is_empty())
    }

    pub fn strings(&self, name: &str) -> Vec<&str> {
        self.find(name)
            .map(|a| {
                a.values
                    .iter()
                    .filter_map(AttributeValue::as_str)
                    .filter(|v| !v.trim().is_empty())
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn bool(&self, name: &str) -> Option<bool> {
        self.find(name)?.first()?.as_bool()
    }

    pub fn secret(&self, name: &str) -> Option<&GuardedString> {
        self.find(name)?.values.iter().find_map(AttributeValue::as_secret)
    }

    /// Value of `__NAME__`, the name to create or rename to.
    pub fn name(&self) -> Option<&str> {
        self.string(names::NAME)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Attribute> {
        self.attributes.iter()
    }

    pub fn len(&self) -> usize {
        self.attributes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.attributes.is_empty()
    }
}

impl FromIterator<Attribute> for AttributeSet {
    fn from_iter<T: IntoIterator<Item = Attribute>>(iter: T) -> Self {
        let mut set = Self::new();
        for attribute in iter {
            set.insert(attribute);
        }
        set
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_attribute_is_absent() {
        let attrs = AttributeSet::new().with_values::<_, &str>(names::GROUPS, []);
        assert!(attrs.contains(names::GROUPS));
        assert!(!attrs.is_present(names::GROUPS));
        assert!(attrs.strings(names::GROUPS).is_empty());
    }

    #[test]
    fn test_blank_name_is_none() {
        let attrs = AttributeSet::new().with(names::NAME, "   ");
        assert_eq!(attrs.name(), None);
    }

    #[test]
    fn test_insert_replaces_case_insensitively() {
        let mut attrs = AttributeSet::new().with("shell", "/bin/sh");
        attrs.insert(Attribute::single("Shell", "/bin/bash"));
        assert_eq!(attrs.len(), 1);
        assert_eq!(attrs.string("shell"), Some("/bin/bash"));
    }

    #[test]
    fn test_bool_from_string() {
        let attrs = AttributeSet::new().with(names::ENABLE, "false");
        assert_eq!(attrs.bool(names::ENABLE), Some(false));
    }

    #[test]
    fn test_secret_serializes_redacted() {
        let attrs = AttributeSet::new().with(names::PASSWORD, GuardedString::new("hunter2"));
        let yaml = serde_yaml::to_string(&attrs).unwrap();
        assert!(!yaml.contains("hunter2"));
        assert!(yaml.contains("********"));
    }
}
