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

//! Failure taxonomy surfaced to the host.
//!
//! The variants are grouped by where the failure originates:
//!
//! - caller contract violations ([`ConnectorError::InvalidArgument`],
//!   [`ConnectorError::UnsupportedObjectClass`],
//!   [`ConnectorError::UnsupportedOperation`]) are raised before any remote
//!   round trip
//! - remote command failures ([`ConnectorError::CommandFailed`]) carry the
//!   captured output
//! - transport failures ([`ConnectorError::ConnectionBroken`]) tell the host
//!   to retry with a fresh session
//! - absent targets ([`ConnectorError::UnknownUid`],
//!   [`ConnectorError::NoResultsFound`])

use thiserror::Error;

use crate::ssh::ShellError;

pub type Result<T> = std::result::Result<T, ConnectorError>;

#[derive(Debug, Error)]
pub enum ConnectorError {
    /// Missing or malformed input supplied by the caller.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// Object kind other than account or group.
    #[error("unsupported object class '{0}'")]
    UnsupportedObjectClass(String),

    /// Capability the connector does not provide (e.g. AND/OR filters).
    #[error("operation not supported: {0}")]
    UnsupportedOperation(String),

    /// The configuration cannot drive a connector.
    #[error("invalid configuration: {0}")]
    Configuration(String),

    /// Target account or group does not exist on the host.
    #[error("unknown identifier '{0}'")]
    UnknownUid(String),

    /// A keyed lookup during search returned nothing.
    #[error("No results found for '{0}'")]
    NoResultsFound(String),

    /// The session can no longer be used; open a new one.
    #[error("connection broken: {0}")]
    ConnectionBroken(#[from] ShellError),

    /// The remote command printed a known failure signature.
    #[error("{message}: {output}")]
    CommandFailed { message: String, output: String },

    /// Authentication as the account was rejected.
    #[error("invalid credentials for '{0}'")]
    InvalidCredential(String),

    /// A single row was required but the output could not be parsed.
    #[error(transparent)]
    Parse(#[from] crate::parser::ParseError),
}

impl ConnectorError {
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::InvalidArgument(message.into())
    }

    pub fn command_failed(message: impl Into<String>, output: impl Into<String>) -> Self {
        Self::CommandFailed {
            message: message.into(),
            output: output.into(),
        }
    }

    /// Whether the host should discard the session and retry.
    pub fn is_connection_broken(&self) -> bool {
        matches!(self, Self::ConnectionBroken(_))
    }
}
