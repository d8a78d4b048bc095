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

//! Host-facing data model: object kinds, identifiers and attribute sets.

mod attribute;

pub use attribute::{names, Attribute, AttributeSet, AttributeValue};

use serde::Serialize;
use std::fmt;

/// Object kind tag carried by every host call.
///
/// Only accounts and groups are provisioned; anything else is kept as
/// [`ObjectClass::Other`] so it can be rejected before touching the host.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub enum ObjectClass {
    Account,
    Group,
    Other(String),
}

impl ObjectClass {
    pub const ACCOUNT_NAME: &'static str = "__ACCOUNT__";
    pub const GROUP_NAME: &'static str = "__GROUP__";

    /// Parse an object class from either its framework name (`__ACCOUNT__`)
    /// or a plain word (`account`, `user`, `group`).
    pub fn parse(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "__account__" | "account" | "user" => Self::Account,
            "__group__" | "group" => Self::Group,
            _ => Self::Other(value.to_string()),
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Self::Account => Self::ACCOUNT_NAME,
            Self::Group => Self::GROUP_NAME,
            Self::Other(name) => name,
        }
    }
}

impl fmt::Display for ObjectClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Primary identifier of an account or group (its name).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct Uid(String);

impl Uid {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn value(&self) -> &str {
        &self.0
    }

    pub fn is_blank(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl fmt::Display for Uid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Uid {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

/// One search result handed to the host.
#[derive(Debug, Clone, Serialize)]
pub struct ConnectorObject {
    pub object_class: ObjectClass,
    pub uid: Uid,
    pub name: String,
    pub attributes: AttributeSet,
}

impl ConnectorObject {
    pub fn new(object_class: ObjectClass, name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            object_class,
            uid: Uid::new(name.clone()),
            name,
            attributes: AttributeSet::new(),
        }
    }

    pub fn with_attribute(mut self, attribute: Attribute) -> Self {
        self.attributes.insert(attribute);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_object_class_parse() {
        assert_eq!(ObjectClass::parse("__ACCOUNT__"), ObjectClass::Account);
        assert_eq!(ObjectClass::parse("user"), ObjectClass::Account);
        assert_eq!(ObjectClass::parse("Group"), ObjectClass::Group);
        assert_eq!(
            ObjectClass::parse("printer"),
            ObjectClass::Other("printer".to_string())
        );
    }

    #[test]
    fn test_uid_blank() {
        assert!(Uid::new("  ").is_blank());
        assert!(!Uid::new("alice").is_blank());
    }
}
