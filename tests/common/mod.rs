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

//! Recording fakes standing in for the SSH transport.

#![allow(dead_code)]

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use unixprov::config::ConnectorConfig;
use unixprov::security::GuardedString;
use unixprov::ssh::{Credential, RemoteShell, SessionProvider, ShellError};
use unixprov::UnixConnector;

pub const SUDO_PASSWORD: &str = "hunter2";
pub const PRIMING: &str = "echo 'hunter2' | sudo -S -p '' -v";

/// One string sent to the fake host.
#[derive(Debug, Clone)]
pub struct Sent {
    pub command: String,
    pub interactive: bool,
}

/// A scripted host: records every command and answers from a reply table.
///
/// Replies are looked up by exact command first, then by the first
/// registered needle the command contains. Unmatched commands print nothing,
/// which every diagnostic treats as success.
#[derive(Clone, Default)]
pub struct FakeHost {
    sent: Arc<Mutex<Vec<Sent>>>,
    replies: Arc<Mutex<Vec<(String, String)>>>,
    broken: Arc<Mutex<bool>>,
}

impl FakeHost {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reply(self, needle: &str, output: &str) -> Self {
        self.replies
            .lock()
            .unwrap()
            .push((needle.to_string(), output.to_string()));
        self
    }

    /// Make every later command fail at the transport level.
    pub fn break_connection(&self) {
        *self.broken.lock().unwrap() = true;
    }

    pub fn sent(&self) -> Vec<Sent> {
        self.sent.lock().unwrap().clone()
    }

    pub fn commands(&self) -> Vec<String> {
        self.sent().into_iter().map(|s| s.command).collect()
    }

    pub fn shell(&self) -> Box<dyn RemoteShell> {
        Box::new(FakeShell { host: self.clone() })
    }

    fn answer(&self, command: &str, interactive: bool) -> Result<String, ShellError> {
        if *self.broken.lock().unwrap() {
            return Err(ShellError::Transport("connection reset by peer".to_string()));
        }
        self.sent.lock().unwrap().push(Sent {
            command: command.to_string(),
            interactive,
        });

        let replies = self.replies.lock().unwrap();
        let reply = replies
            .iter()
            .find(|(needle, _)| needle == command)
            .or_else(|| replies.iter().find(|(needle, _)| command.contains(needle.as_str())))
            .map(|(_, output)| output.clone())
            .unwrap_or_default();
        Ok(reply)
    }
}

struct FakeShell {
    host: FakeHost,
}

#[async_trait]
impl RemoteShell for FakeShell {
    async fn execute(&mut self, command: &str) -> Result<String, ShellError> {
        self.host.answer(command, false)
    }

    async fn execute_interactive(&mut self, command: &str) -> Result<String, ShellError> {
        self.host.answer(command, true)
    }

    async fn close(&mut self) -> Result<(), ShellError> {
        Ok(())
    }
}

/// Accepts logins whose password matches the table.
#[derive(Default)]
pub struct FakeSessions {
    passwords: HashMap<String, String>,
    opened: Mutex<Vec<String>>,
}

impl FakeSessions {
    pub fn with_account(mut self, username: &str, password: &str) -> Self {
        self.passwords
            .insert(username.to_string(), password.to_string());
        self
    }

    pub fn opened(&self) -> Vec<String> {
        self.opened.lock().unwrap().clone()
    }
}

#[async_trait]
impl SessionProvider for FakeSessions {
    async fn open(
        &self,
        username: &str,
        credential: &Credential,
    ) -> Result<Box<dyn RemoteShell>, ShellError> {
        self.opened.lock().unwrap().push(username.to_string());
        let accepted = match credential {
            Credential::Password(password) => self
                .passwords
                .get(username)
                .is_some_and(|expected| expected.as_str() == password.reveal().as_str()),
            _ => false,
        };
        if accepted {
            Ok(FakeHost::new().shell())
        } else {
            Err(ShellError::AuthenticationRejected(format!(
                "permission denied for {username}"
            )))
        }
    }
}

pub fn sudo_config() -> ConnectorConfig {
    let mut config = ConnectorConfig::default();
    config.elevation.sudo_password = Some(GuardedString::new(SUDO_PASSWORD));
    config
}

pub fn root_config() -> ConnectorConfig {
    let mut config = ConnectorConfig::default();
    config.elevation.root = true;
    config
}

pub fn connector(config: ConnectorConfig, host: &FakeHost) -> UnixConnector {
    UnixConnector::new(config, host.shell(), Arc::new(FakeSessions::default())).unwrap()
}

pub fn connector_with_sessions(
    config: ConnectorConfig,
    host: &FakeHost,
    sessions: Arc<FakeSessions>,
) -> UnixConnector {
    UnixConnector::new(config, host.shell(), sessions).unwrap()
}
