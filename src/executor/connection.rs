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

//! The single shared session every operation runs on.

use super::diagnostics::{DiagnosticTable, Operation};
use super::result_types::ExecutionOutcome;
use crate::error::Result;
use crate::generator::{ChannelMode, CommandString};
use crate::ssh::RemoteShell;

/// Owns the remote session and runs composed command strings on it.
///
/// Every method takes `&mut self`: the remote interpreter handles one string
/// at a time and interleaved output could not be attributed, so callers must
/// hold the connection exclusively for the duration of an operation. There
/// is no timeout here; a hung remote command blocks the caller.
pub struct Connection {
    shell: Box<dyn RemoteShell>,
    diagnostics: DiagnosticTable,
}

impl Connection {
    pub fn new(shell: Box<dyn RemoteShell>, diagnostics: DiagnosticTable) -> Self {
        Self { shell, diagnostics }
    }

    pub fn diagnostics(&self) -> &DiagnosticTable {
        &self.diagnostics
    }

    /// Send a command string verbatim and capture its output.
    ///
    /// Strings that feed stdin through a pipe go over the interactive
    /// channel mode. A failure part-way through leaves the host in whatever
    /// state the remote interpreter produced; nothing is rolled back.
    pub async fn execute(
        &mut self,
        command: &CommandString,
        operation: Operation,
    ) -> Result<ExecutionOutcome> {
        tracing::debug!("Executing {} command: {}", operation, command);

        let raw_output = match command.mode() {
            ChannelMode::Exec => self.shell.execute(command.as_str()).await,
            ChannelMode::Interactive => self.shell.execute_interactive(command.as_str()).await,
        }
        .map_err(|e| {
            tracing::error!("Transport failure during {}: {}", operation, e);
            e
        })?;

        tracing::trace!("Output of {}: {}", operation, raw_output.trim_end());
        Ok(ExecutionOutcome::new(raw_output, operation))
    }

    /// Execute and classify, failing with a typed error carrying the output.
    pub async fn run(
        &mut self,
        command: &CommandString,
        operation: Operation,
        message: &str,
        target: &str,
    ) -> Result<ExecutionOutcome> {
        let outcome = self.execute(command, operation).await?;
        outcome.check_result(&self.diagnostics, message, target)?;
        Ok(outcome)
    }

    /// Run a lookup or dump and return its raw text.
    pub async fn execute_read(&mut self, command: &CommandString) -> Result<String> {
        let outcome = self
            .run(command, Operation::Read, "Could not read host database", "")
            .await?;
        Ok(outcome.raw_output)
    }

    pub async fn close(&mut self) -> Result<()> {
        self.shell.close().await?;
        Ok(())
    }
}
