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

//! Output classification by known failure signatures.
//!
//! No exit status survives the pipe/elevation/echo composition reliably, so
//! success is decided per operation kind by scanning the captured text.
//! Phrasing is distribution and locale specific; every entry of the table
//! can be replaced from configuration.

use serde::Deserialize;
use std::collections::HashMap;
use std::fmt;

use crate::security::SUDO_FAILURE_PATTERNS;

/// Operation kind a command string is classified as.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Operation {
    UserAdd,
    UserMod,
    UserDel,
    GroupAdd,
    GroupMod,
    GroupDel,
    Passwd,
    /// Lookups and database dumps.
    Read,
    /// Connection test.
    Test,
}

impl Operation {
    pub const ALL: [Operation; 9] = [
        Operation::UserAdd,
        Operation::UserMod,
        Operation::UserDel,
        Operation::GroupAdd,
        Operation::GroupMod,
        Operation::GroupDel,
        Operation::Passwd,
        Operation::Read,
        Operation::Test,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Operation::UserAdd => "useradd",
            Operation::UserMod => "usermod",
            Operation::UserDel => "userdel",
            Operation::GroupAdd => "groupadd",
            Operation::GroupMod => "groupmod",
            Operation::GroupDel => "groupdel",
            Operation::Passwd => "passwd",
            Operation::Read => "read",
            Operation::Test => "test",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Signatures for one operation kind. Matching is case-insensitive and
/// line based; `*` in a signature matches any text, so
/// `usermod: user '*' does not exist` needs its pieces in that order on one
/// line.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Diagnostic {
    /// Any match marks the command as failed.
    #[serde(default)]
    pub failure: Vec<String>,

    /// Any match marks the target as absent. Checked before `failure`.
    #[serde(default)]
    pub not_found: Vec<String>,

    /// Lines containing one of these are skipped (tool warnings).
    #[serde(default)]
    pub ignore: Vec<String>,

    /// Text that must appear for the command to count as successful.
    #[serde(default)]
    pub confirmation: Option<String>,
}

/// Outcome of scanning output against a [`Diagnostic`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    Success,
    NotFound(String),
    Failed(String),
    MissingConfirmation(String),
}

impl Verdict {
    pub fn is_success(&self) -> bool {
        matches!(self, Verdict::Success)
    }
}

impl Diagnostic {
    fn new(failure: &[&str], not_found: &[&str]) -> Self {
        let common = SUDO_FAILURE_PATTERNS
            .iter()
            .chain(COMMON_FAILURE_PATTERNS.iter());
        Self {
            failure: failure.iter().chain(common).map(|s| s.to_string()).collect(),
            not_found: not_found.iter().map(|s| s.to_string()).collect(),
            ignore: DEFAULT_IGNORE_PATTERNS.iter().map(|s| s.to_string()).collect(),
            confirmation: None,
        }
    }

    fn confirmed_by(mut self, marker: &str) -> Self {
        self.confirmation = Some(marker.to_string());
        self
    }

    pub fn classify(&self, output: &str) -> Verdict {
        let lowered: Vec<String> = output
            .lines()
            .map(str::to_lowercase)
            .filter(|line| !contains_any(line, &self.ignore))
            .collect();

        for line in &lowered {
            if let Some(pattern) = find_any(line, &self.not_found) {
                return Verdict::NotFound(pattern.to_string());
            }
        }
        for line in &lowered {
            if let Some(pattern) = find_any(line, &self.failure) {
                return Verdict::Failed(pattern.to_string());
            }
        }

        match &self.confirmation {
            Some(marker) if !output.contains(marker.as_str()) => {
                Verdict::MissingConfirmation(marker.clone())
            }
            _ => Verdict::Success,
        }
    }
}

/// Marker echoed by the connection test.
pub const TEST_CONFIRMATION: &str = "unixprov-ready";

/// Failure text any command may print.
const COMMON_FAILURE_PATTERNS: &[&str] = &["command not found", "permission denied"];

/// File primitives used inside account and group scripts.
const FILE_FAILURE_PATTERNS: &[&str] = &["mkdir:", "tee:", "chown:", "chmod:", "mv:", "rm:"];

/// Non-fatal notices printed by the shadow tools.
const DEFAULT_IGNORE_PATTERNS: &[&str] = &["warning:", "mail spool", "not copying any file"];

fn with_files(own: &[&'static str]) -> Vec<&'static str> {
    own.iter().chain(FILE_FAILURE_PATTERNS).copied().collect()
}

fn contains_any(line: &str, patterns: &[String]) -> bool {
    find_any(line, patterns).is_some()
}

fn find_any<'a>(line: &str, patterns: &'a [String]) -> Option<&'a str> {
    patterns
        .iter()
        .map(String::as_str)
        .find(|pattern| matches_signature(line, &pattern.to_lowercase()))
}

fn matches_signature(line: &str, pattern: &str) -> bool {
    if pattern.trim_matches('*').is_empty() {
        return false;
    }
    let mut rest = line;
    for piece in pattern.split('*').filter(|piece| !piece.is_empty()) {
        match rest.find(piece) {
            Some(at) => rest = &rest[at + piece.len()..],
            None => return false,
        }
    }
    true
}

/// Operation kind to diagnostic mapping.
#[derive(Debug, Clone)]
pub struct DiagnosticTable {
    entries: HashMap<Operation, Diagnostic>,
}

impl Default for DiagnosticTable {
    fn default() -> Self {
        let mut entries = HashMap::new();
        entries.insert(
            Operation::UserAdd,
            Diagnostic::new(&with_files(&["useradd:", "already exists"]), &[]),
        );
        entries.insert(
            Operation::UserMod,
            Diagnostic::new(
                &with_files(&["usermod:", "gpasswd:", "groupmod:"]),
                &["usermod: user '*' does not exist"],
            ),
        );
        entries.insert(
            Operation::UserDel,
            Diagnostic::new(
                &with_files(&["userdel:"]),
                &["userdel: user '*' does not exist"],
            ),
        );
        entries.insert(
            Operation::GroupAdd,
            Diagnostic::new(&with_files(&["groupadd:", "already exists"]), &[]),
        );
        entries.insert(
            Operation::GroupMod,
            Diagnostic::new(&with_files(&["groupmod:"]), &["does not exist"]),
        );
        entries.insert(
            Operation::GroupDel,
            Diagnostic::new(&with_files(&["groupdel:"]), &["does not exist"]),
        );
        entries.insert(
            Operation::Passwd,
            Diagnostic::new(
                &[
                    "chpasswd:",
                    "authentication token manipulation error",
                    "only root",
                ],
                &["unknown user", "does not exist"],
            ),
        );
        entries.insert(Operation::Read, Diagnostic::new(&[], &[]));
        entries.insert(
            Operation::Test,
            Diagnostic::new(&[], &[]).confirmed_by(TEST_CONFIRMATION),
        );

        Self { entries }
    }
}

impl DiagnosticTable {
    /// Replace built-in entries with configured ones, per operation.
    pub fn with_overrides(mut self, overrides: HashMap<Operation, Diagnostic>) -> Self {
        for (operation, diagnostic) in overrides {
            tracing::debug!("Overriding diagnostics for {}", operation);
            self.entries.insert(operation, diagnostic);
        }
        self
    }

    pub fn get(&self, operation: Operation) -> Option<&Diagnostic> {
        self.entries.get(&operation)
    }

    pub fn classify(&self, operation: Operation, output: &str) -> Verdict {
        match self.entries.get(&operation) {
            Some(diagnostic) => diagnostic.classify(output),
            None => Verdict::Success,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_operation_has_an_entry() {
        let table = DiagnosticTable::default();
        for operation in Operation::ALL {
            assert!(table.get(operation).is_some(), "{operation}");
        }
    }

    #[test]
    fn test_empty_output_is_success() {
        let table = DiagnosticTable::default();
        assert_eq!(table.classify(Operation::UserAdd, ""), Verdict::Success);
    }

    #[test]
    fn test_already_exists() {
        let table = DiagnosticTable::default();
        let verdict = table.classify(Operation::UserAdd, "useradd: user 'svc1' already exists\n");
        assert!(matches!(verdict, Verdict::Failed(_)));
    }

    #[test]
    fn test_not_found_wins_over_failure() {
        let table = DiagnosticTable::default();
        let verdict = table.classify(Operation::UserDel, "userdel: user 'ghost' does not exist\n");
        assert_eq!(
            verdict,
            Verdict::NotFound("userdel: user '*' does not exist".to_string())
        );
    }

    #[test]
    fn test_missing_supplementary_group_is_a_failure() {
        let table = DiagnosticTable::default();
        assert!(matches!(
            table.classify(Operation::UserMod, "usermod: group 'nosuch' does not exist\n"),
            Verdict::Failed(_)
        ));
        assert!(matches!(
            table.classify(Operation::UserMod, "usermod: user 'ghost' does not exist\n"),
            Verdict::NotFound(_)
        ));
        assert!(matches!(
            table.classify(Operation::UserMod, "groupmod: group 'svc1' does not exist\n"),
            Verdict::Failed(_)
        ));
    }

    #[test]
    fn test_wildcard_signature_needs_pieces_in_order() {
        let signature = "usermod: user '*' does not exist";
        assert!(matches_signature("usermod: user 'a' does not exist", signature));
        assert!(!matches_signature("does not exist usermod: user 'a'", signature));
        assert!(!matches_signature("anything", "*"));
        assert!(matches_signature("tee: /x: no such file", "tee:"));
    }

    #[test]
    fn test_warnings_are_ignored() {
        let table = DiagnosticTable::default();
        let output = "useradd: warning: the home directory already exists.\n\
                      Not copying any file from skel directory into it.\n";
        assert_eq!(table.classify(Operation::UserAdd, output), Verdict::Success);

        let output = "userdel: svc1 mail spool (/var/mail/svc1) not found\n";
        assert_eq!(table.classify(Operation::UserDel, output), Verdict::Success);
    }

    #[test]
    fn test_sudo_failure_applies_everywhere() {
        let table = DiagnosticTable::default();
        for operation in Operation::ALL {
            let verdict = table.classify(operation, "Sorry, try again.\n");
            assert!(matches!(verdict, Verdict::Failed(_)), "{operation}");
        }
    }

    #[test]
    fn test_passwd_success_notice_is_not_failure() {
        let table = DiagnosticTable::default();
        let output = "passwd: password expiry information changed.\n";
        assert_eq!(table.classify(Operation::Passwd, output), Verdict::Success);
    }

    #[test]
    fn test_confirmation_required() {
        let table = DiagnosticTable::default();
        assert_eq!(
            table.classify(Operation::Test, "something else\n"),
            Verdict::MissingConfirmation(TEST_CONFIRMATION.to_string())
        );
        assert_eq!(
            table.classify(Operation::Test, "unixprov-ready\n"),
            Verdict::Success
        );
    }

    #[test]
    fn test_override_replaces_entry() {
        let mut overrides = HashMap::new();
        overrides.insert(
            Operation::UserAdd,
            Diagnostic {
                failure: vec!["existiert bereits".to_string()],
                ..Diagnostic::default()
            },
        );
        let table = DiagnosticTable::default().with_overrides(overrides);

        assert!(matches!(
            table.classify(Operation::UserAdd, "useradd: Benutzer »svc1« existiert bereits.\n"),
            Verdict::Failed(_)
        ));
        // The built-in English phrasing is gone for this operation.
        assert_eq!(
            table.classify(Operation::UserAdd, "useradd: user 'svc1' already exists\n"),
            Verdict::Success
        );
    }
}
