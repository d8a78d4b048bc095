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

//! Privilege elevation wrapper and sudo diagnostics.
//!
//! Privileged fragments are prefixed in one of three modes:
//!
//! - **full**: `sudo -k; echo '<secret>' | sudo -S -p '' -v; sudo <cmd>`.
//!   The cached timestamp on the host is invalidated, the secret is fed to a
//!   validation run through stdin and the real command then runs under a bare
//!   `sudo`. The secret only ever appears in the input stream of one pipeline
//!   segment, never in the arguments of a process.
//! - **bare**: `sudo <cmd>`, for later privileged fragments of the same
//!   composed string, relying on the timestamp the full prefix just set.
//! - **none**: the session user is already root.
//!
//! # Security Considerations
//! - The secret is decoded from its holder once per [`Sudo`] instance
//! - Never log or print the composed string verbatim, use
//!   [`crate::generator::CommandString`]'s redacting `Display`

use anyhow::Result;
use zeroize::Zeroizing;

use super::GuardedString;
use crate::utils::shell::single_quote;

/// Environment variable consulted for the sudo password.
pub const SUDO_PASSWORD_ENV: &str = "UNIXPROV_SUDO_PASSWORD";

const SUDO_COMMAND: &str = "sudo ";

/// Ignore and reset the cached credential timestamp.
const INVALIDATE_TIMESTAMP_OPTION: &str = "-k";

/// Refresh the timestamp without running a command.
const VALIDATE_OPTION: &str = "-v";

/// Read the password from stdin with an empty prompt so nothing leaks into
/// the captured output.
const READ_PASSWORD_FROM_STDIN_OPTION: &str = "-S -p ''";

/// Patterns indicating sudo authentication failure
pub const SUDO_FAILURE_PATTERNS: &[&str] = &[
    "sorry, try again",
    "incorrect password",
    "authentication failure",
    "sudo: 3 incorrect password attempts",
    "sudo: no password was provided",
    "sudo: a password is required",
    "is not in the sudoers file",
    "may not run sudo",
];

/// Whether the session identity needs elevation and with which secret.
#[derive(Debug, Clone)]
pub struct ElevationPolicy {
    pub already_privileged: bool,
    pub secret: Option<GuardedString>,
}

impl ElevationPolicy {
    pub fn privileged() -> Self {
        Self {
            already_privileged: true,
            secret: None,
        }
    }

    pub fn with_secret(secret: GuardedString) -> Self {
        Self {
            already_privileged: false,
            secret: Some(secret),
        }
    }
}

/// How a single privileged fragment is prefixed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ElevationMode {
    Full,
    Bare,
    None,
}

/// Elevation wrapper for one composed command string.
pub struct Sudo {
    secret: Option<Zeroizing<String>>,
}

impl Sudo {
    /// Build a wrapper, decoding the secret from its holder exactly once.
    pub fn new(policy: &ElevationPolicy) -> Self {
        let secret = if policy.already_privileged {
            None
        } else {
            Some(
                policy
                    .secret
                    .as_ref()
                    .map(GuardedString::reveal)
                    .unwrap_or_default(),
            )
        };
        Self { secret }
    }

    /// `false` when the session is already privileged.
    pub fn is_required(&self) -> bool {
        self.secret.is_some()
    }

    /// Prefix for a privileged fragment in the given mode.
    pub fn wrap(&self, mode: ElevationMode) -> String {
        match (mode, self.is_required()) {
            (_, false) | (ElevationMode::None, _) => String::new(),
            (ElevationMode::Bare, true) => SUDO_COMMAND.to_string(),
            (ElevationMode::Full, true) => format!("{}{SUDO_COMMAND}", self.priming()),
        }
    }

    /// Timestamp reset and stdin validation, terminated by `"; "`.
    ///
    /// Empty when no elevation is required.
    pub fn priming(&self) -> String {
        match &self.secret {
            Some(secret) => format!(
                "{SUDO_COMMAND}{INVALIDATE_TIMESTAMP_OPTION}; echo {} | {SUDO_COMMAND}{READ_PASSWORD_FROM_STDIN_OPTION} {VALIDATE_OPTION}; ",
                single_quote(secret)
            ),
            None => String::new(),
        }
    }

    /// The quoted secret as it appears in the priming segment, for redaction.
    pub(crate) fn quoted_secret(&self) -> Option<String> {
        self.secret.as_deref().map(|s| single_quote(s))
    }
}

impl std::fmt::Debug for Sudo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Sudo")
            .field("required", &self.is_required())
            .field("secret", &"[REDACTED]")
            .finish()
    }
}

/// Prompt the operator for the sudo password without echoing it.
pub fn prompt_sudo_password() -> Result<GuardedString> {
    eprintln!("Enter sudo password: ");
    let password = Zeroizing::new(
        rpassword::read_password()
            .map_err(|e| anyhow::anyhow!("Failed to read sudo password: {}", e))?,
    );

    if password.is_empty() {
        anyhow::bail!("Empty password not allowed. Please enter a valid sudo password.");
    }

    Ok(GuardedString::new(password.as_str()))
}

/// Get sudo password from environment variable (if set).
///
/// # Security Warning
/// Environment variables may be visible in process listings. This exists for
/// automation where that trade-off is acceptable.
pub fn get_sudo_password_from_env() -> Result<Option<GuardedString>> {
    match std::env::var(SUDO_PASSWORD_ENV) {
        Ok(password) if !password.is_empty() => Ok(Some(GuardedString::new(password))),
        Ok(_) => {
            anyhow::bail!("{SUDO_PASSWORD_ENV} is set but empty. Empty passwords are not allowed.");
        }
        Err(_) => Ok(None),
    }
}
