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

//! Filters and their translation into a single match operand.

use crate::error::{ConnectorError, Result};
use crate::model::names;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchKind {
    Equal,
    StartsWith,
    EndsWith,
    Contains,
}

impl MatchKind {
    pub fn matches(&self, candidate: &str, value: &str) -> bool {
        match self {
            MatchKind::Equal => candidate == value,
            MatchKind::StartsWith => candidate.starts_with(value),
            MatchKind::EndsWith => candidate.ends_with(value),
            MatchKind::Contains => candidate.contains(value),
        }
    }
}

/// Search filter as supplied by the host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Filter {
    Match {
        attribute: String,
        value: String,
        kind: MatchKind,
    },
    Not(Box<Filter>),
    And(Box<Filter>, Box<Filter>),
    Or(Box<Filter>, Box<Filter>),
}

impl Filter {
    fn with_kind(attribute: &str, value: &str, kind: MatchKind) -> Self {
        Filter::Match {
            attribute: attribute.to_string(),
            value: value.to_string(),
            kind,
        }
    }

    pub fn equal(attribute: &str, value: &str) -> Self {
        Self::with_kind(attribute, value, MatchKind::Equal)
    }

    pub fn starts_with(attribute: &str, value: &str) -> Self {
        Self::with_kind(attribute, value, MatchKind::StartsWith)
    }

    pub fn ends_with(attribute: &str, value: &str) -> Self {
        Self::with_kind(attribute, value, MatchKind::EndsWith)
    }

    pub fn contains(attribute: &str, value: &str) -> Self {
        Self::with_kind(attribute, value, MatchKind::Contains)
    }

    pub fn negate(self) -> Self {
        Filter::Not(Box::new(self))
    }

    pub fn and(self, other: Filter) -> Self {
        Filter::And(Box::new(self), Box::new(other))
    }

    pub fn or(self, other: Filter) -> Self {
        Filter::Or(Box::new(self), Box::new(other))
    }
}

/// A single predicate over one attribute.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Operand {
    pub attribute_name: String,
    pub attribute_value: String,
    pub kind: MatchKind,
    pub negate: bool,
    /// The attribute is the primary identifier (`__NAME__` or `__UID__`).
    pub is_primary_key: bool,
}

impl Operand {
    pub fn new(attribute_name: &str, attribute_value: &str, kind: MatchKind, negate: bool) -> Self {
        Self {
            attribute_name: attribute_name.to_string(),
            attribute_value: attribute_value.to_string(),
            kind,
            negate,
            is_primary_key: attribute_name.eq_ignore_ascii_case(names::NAME)
                || attribute_name.eq_ignore_ascii_case(names::UID),
        }
    }

    pub fn matches(&self, candidate: &str) -> bool {
        self.kind.matches(candidate, &self.attribute_value) != self.negate
    }

    /// Positive equality on the primary identifier: an existence check
    /// answered by a targeted lookup.
    pub fn is_keyed(&self) -> bool {
        self.is_primary_key && self.kind == MatchKind::Equal && !self.negate
    }
}

/// Reduces a filter tree to at most one operand.
pub struct FilterTranslator;

impl FilterTranslator {
    /// `None` means no filter: enumerate everything.
    pub fn translate(filter: Option<&Filter>) -> Result<Option<Operand>> {
        filter.map(|f| Self::operand(f, false)).transpose()
    }

    fn operand(filter: &Filter, negate: bool) -> Result<Operand> {
        match filter {
            Filter::Match {
                attribute,
                value,
                kind,
            } => Ok(Operand::new(attribute, value, *kind, negate)),
            Filter::Not(inner) => Self::operand(inner, !negate),
            Filter::And(..) => Err(ConnectorError::UnsupportedOperation(
                "AND filters are not supported".to_string(),
            )),
            Filter::Or(..) => Err(ConnectorError::UnsupportedOperation(
                "OR filters are not supported".to_string(),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn matching<'a>(operand: &Operand, names: &[&'a str]) -> Vec<&'a str> {
        names.iter().copied().filter(|n| operand.matches(n)).collect()
    }

    const NAMES: [&str; 3] = ["alice", "bob", "alicia"];

    fn operand(filter: Filter) -> Operand {
        FilterTranslator::translate(Some(&filter)).unwrap().unwrap()
    }

    #[test]
    fn test_starts_with() {
        let op = operand(Filter::starts_with(names::NAME, "ali"));
        assert_eq!(matching(&op, &NAMES), ["alice", "alicia"]);
    }

    #[test]
    fn test_contains() {
        let op = operand(Filter::contains(names::NAME, "ob"));
        assert_eq!(matching(&op, &NAMES), ["bob"]);
    }

    #[test]
    fn test_negated_equal() {
        let op = operand(Filter::equal(names::NAME, "alice").negate());
        assert!(op.negate);
        assert!(!op.is_keyed());
        assert_eq!(matching(&op, &NAMES), ["bob", "alicia"]);
    }

    #[test]
    fn test_ends_with_and_double_negation() {
        let op = operand(Filter::ends_with(names::NAME, "ce").negate().negate());
        assert!(!op.negate);
        assert_eq!(matching(&op, &NAMES), ["alice"]);
    }

    #[test]
    fn test_primary_key() {
        assert!(operand(Filter::equal("__uid__", "alice")).is_keyed());
        assert!(!operand(Filter::starts_with(names::UID, "a")).is_keyed());
        assert!(!operand(Filter::equal("shell", "/bin/sh")).is_primary_key);
    }

    #[test]
    fn test_and_or_unsupported() {
        let and = Filter::equal(names::NAME, "a").and(Filter::equal(names::NAME, "b"));
        let or = Filter::equal(names::NAME, "a").or(Filter::equal(names::NAME, "b"));
        for filter in [and, or.negate()] {
            assert!(matches!(
                FilterTranslator::translate(Some(&filter)),
                Err(ConnectorError::UnsupportedOperation(_))
            ));
        }
    }

    #[test]
    fn test_no_filter() {
        assert_eq!(FilterTranslator::translate(None).unwrap(), None);
    }
}
