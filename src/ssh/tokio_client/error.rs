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

//! Transport-level errors.

use std::io;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Unable to resolve address: {0}")]
    AddressInvalid(#[source] io::Error),

    #[error("The key is invalid: {0}")]
    KeyInvalid(#[source] russh::keys::Error),

    #[error("The key was rejected by the server")]
    KeyAuthFailed,

    #[error("The password was rejected by the server")]
    PasswordWrong,

    #[error("Server host key check failed")]
    ServerCheckFailed,

    #[error("Failed to connect to SSH agent")]
    AgentConnectionFailed,

    #[error("Failed to request identities from SSH agent")]
    AgentRequestIdentitiesFailed,

    #[error("SSH agent has no identities")]
    AgentNoIdentities,

    #[error("SSH agent authentication failed")]
    AgentAuthenticationFailed,

    #[error("Connection timed out after {0} seconds")]
    Timeout(u64),

    #[error("The channel closed before the command reported an exit status")]
    CommandDidntExit,

    #[error("SSH error: {0}")]
    SshError(#[from] russh::Error),
}

impl Error {
    /// Whether the server rejected the presented credentials.
    pub fn is_auth_rejection(&self) -> bool {
        matches!(
            self,
            Error::KeyAuthFailed
                | Error::PasswordWrong
                | Error::AgentAuthenticationFailed
                | Error::AgentNoIdentities
        )
    }
}
