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

//! Captured output of one round trip.

use super::diagnostics::{DiagnosticTable, Operation, Verdict};
use crate::error::{ConnectorError, Result};

/// Raw output of a command string and the kind it was run as.
///
/// Success is never read from an exit status; it is derived from
/// `raw_output` through the [`DiagnosticTable`].
#[derive(Debug, Clone)]
pub struct ExecutionOutcome {
    pub raw_output: String,
    pub operation: Operation,
}

impl ExecutionOutcome {
    pub fn new(raw_output: impl Into<String>, operation: Operation) -> Self {
        Self {
            raw_output: raw_output.into(),
            operation,
        }
    }

    pub fn verdict(&self, table: &DiagnosticTable) -> Verdict {
        table.classify(self.operation, &self.raw_output)
    }

    /// Turn a failing verdict into a typed error.
    ///
    /// `target` names the account or group for the unknown-identifier case.
    pub fn check_result(&self, table: &DiagnosticTable, message: &str, target: &str) -> Result<()> {
        match self.verdict(table) {
            Verdict::Success => Ok(()),
            Verdict::NotFound(pattern) => {
                tracing::warn!(
                    "{} {}: target '{}' not found (matched '{}')",
                    message,
                    self.operation,
                    target,
                    pattern
                );
                Err(ConnectorError::UnknownUid(target.to_string()))
            }
            Verdict::Failed(pattern) => {
                tracing::error!("{} (matched '{}'): {}", message, pattern, self.raw_output.trim());
                Err(ConnectorError::command_failed(message, self.raw_output.trim()))
            }
            Verdict::MissingConfirmation(marker) => {
                tracing::error!("{} (confirmation '{}' missing)", message, marker);
                Err(ConnectorError::command_failed(message, self.raw_output.trim()))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_result_success() {
        let outcome = ExecutionOutcome::new("", Operation::UserAdd);
        assert!(outcome
            .check_result(&DiagnosticTable::default(), "Could not create user", "svc1")
            .is_ok());
    }

    #[test]
    fn test_check_result_failure_carries_output() {
        let outcome = ExecutionOutcome::new("useradd: user 'svc1' already exists\n", Operation::UserAdd);
        let err = outcome
            .check_result(&DiagnosticTable::default(), "Could not create user", "svc1")
            .unwrap_err();
        match err {
            ConnectorError::CommandFailed { message, output } => {
                assert_eq!(message, "Could not create user");
                assert_eq!(output, "useradd: user 'svc1' already exists");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_check_result_not_found() {
        let outcome = ExecutionOutcome::new("usermod: user 'ghost' does not exist\n", Operation::UserMod);
        let err = outcome
            .check_result(&DiagnosticTable::default(), "Could not modify user", "ghost")
            .unwrap_err();
        assert!(matches!(err, ConnectorError::UnknownUid(uid) if uid == "ghost"));
    }
}
