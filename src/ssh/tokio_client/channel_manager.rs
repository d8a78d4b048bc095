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

//! Command execution over SSH session channels.
//!
//! Two channel modes are offered:
//! - `exec`: the command string is the channel request itself
//! - interactive: a shell is requested and the string is written to its stdin

use russh::client::Msg;
use russh::{Channel, ChannelMsg};

use super::connection::Client;

/// Buffer size for stdout capture.
///
/// Matches typical SSH channel window sizes; database dumps from large hosts
/// grow past it and reallocate.
const SSH_CMD_BUFFER_SIZE: usize = 8192;

/// Buffer size for stderr capture, usually a handful of diagnostic lines.
const SSH_RESPONSE_BUFFER_SIZE: usize = 1024;

/// Result of a command execution.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CommandExecutedResult {
    /// The stdout output of the command.
    pub stdout: String,
    /// The stderr output of the command.
    pub stderr: String,
    /// The unix exit status (`$?` in bash).
    pub exit_status: u32,
}

impl CommandExecutedResult {
    /// Stdout followed by stderr, the text the classifier scans.
    pub fn combined_output(&self) -> String {
        let mut output = String::with_capacity(self.stdout.len() + self.stderr.len());
        output.push_str(&self.stdout);
        output.push_str(&self.stderr);
        output
    }
}

impl Client {
    /// Execute a remote command via an `exec` channel request.
    ///
    /// Returns stdout, stderr and the exit code of the command. The string is
    /// handed to the remote login shell unchanged; pipes and `;` sequences
    /// are interpreted there.
    ///
    /// Every invocation is a new shell context, so `cd` and variables do not
    /// carry over to later invocations.
    pub async fn execute(&self, command: &str) -> Result<CommandExecutedResult, super::Error> {
        let mut channel = self.handle.channel_open_session().await?;
        channel.exec(true, command).await?;
        collect(channel).await
    }

    /// Execute a command string by writing it to a remote shell's stdin.
    ///
    /// Used for strings that pipe a payload into a privileged command; the
    /// shell reads the script, runs it and exits, and stdin is closed after
    /// the script so nothing waits for more input.
    pub async fn execute_interactive(
        &self,
        command: &str,
    ) -> Result<CommandExecutedResult, super::Error> {
        let mut channel = self.handle.channel_open_session().await?;
        channel.request_shell(true).await?;

        let script = format!("{command}\nexit\n");
        channel.data(script.as_bytes()).await?;
        channel.eof().await?;

        collect(channel).await
    }
}

async fn collect(mut channel: Channel<Msg>) -> Result<CommandExecutedResult, super::Error> {
    let mut stdout_buffer = Vec::with_capacity(SSH_CMD_BUFFER_SIZE);
    let mut stderr_buffer = Vec::with_capacity(SSH_RESPONSE_BUFFER_SIZE);
    let mut result: Option<u32> = None;

    while let Some(msg) = channel.wait().await {
        match msg {
            ChannelMsg::Data { ref data } => stdout_buffer.extend_from_slice(data),
            ChannelMsg::ExtendedData { ref data, ext } => {
                if ext == 1 {
                    stderr_buffer.extend_from_slice(data)
                }
            }

            // The exit status may arrive before the last data message, so keep
            // reading until the channel closes.
            ChannelMsg::ExitStatus { exit_status } => result = Some(exit_status),
            _ => {}
        }
    }

    match result {
        Some(exit_status) => Ok(CommandExecutedResult {
            stdout: String::from_utf8_lossy(&stdout_buffer).to_string(),
            stderr: String::from_utf8_lossy(&stderr_buffer).to_string(),
            exit_status,
        }),
        None => Err(super::Error::CommandDidntExit),
    }
}
