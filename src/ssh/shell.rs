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

//! The remote shell abstraction.

use async_trait::async_trait;
use std::path::PathBuf;
use thiserror::Error;

use super::tokio_client;
use crate::security::GuardedString;

/// Transport failures. Remote command failures are not errors at this layer;
/// they show up as text in the captured output.
#[derive(Debug, Error)]
pub enum ShellError {
    #[error("SSH transport failure: {0}")]
    Transport(String),

    #[error("Authentication rejected: {0}")]
    AuthenticationRejected(String),

    #[error("Session is closed")]
    Closed,
}

impl From<tokio_client::Error> for ShellError {
    fn from(err: tokio_client::Error) -> Self {
        if err.is_auth_rejection() {
            ShellError::AuthenticationRejected(err.to_string())
        } else {
            ShellError::Transport(err.to_string())
        }
    }
}

/// A command interpreter on the managed host.
///
/// Both methods send the string verbatim and return everything it printed,
/// stdout followed by stderr. The exit status is not reported.
#[async_trait]
pub trait RemoteShell: Send {
    /// Run the string as a single exec request.
    async fn execute(&mut self, command: &str) -> Result<String, ShellError>;

    /// Feed the string to an interactive shell's stdin and collect output
    /// until the shell exits.
    async fn execute_interactive(&mut self, command: &str) -> Result<String, ShellError>;

    async fn close(&mut self) -> Result<(), ShellError>;
}

/// Secret material for logging in as some account.
#[derive(Debug, Clone)]
pub enum Credential {
    Password(GuardedString),
    KeyFile {
        path: PathBuf,
        passphrase: Option<GuardedString>,
    },
    #[cfg(not(target_os = "windows"))]
    Agent,
}

/// Opens new sessions on the managed host.
///
/// Used for the shared administrative session and for one-off credential
/// checks, which must not reuse the administrative session.
#[async_trait]
pub trait SessionProvider: Send + Sync {
    async fn open(
        &self,
        username: &str,
        credential: &Credential,
    ) -> Result<Box<dyn RemoteShell>, ShellError>;
}
