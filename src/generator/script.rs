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

//! Composition of fragments into one command string.

use std::fmt;
use zeroize::Zeroizing;

use crate::security::{ElevationMode, Sudo};

/// Separator between sequential, independent fragments.
const SEPARATOR: &str = "; ";

const REDACTED: &str = "'********'";

/// How a composed string is delivered to the remote shell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelMode {
    /// A single exec request.
    Exec,
    /// Written to an interactive shell; used when a fragment reads stdin.
    Interactive,
}

/// A fully composed command string, built once and sent verbatim.
///
/// `Display` and `Debug` print the redacted form; only [`as_str`] exposes
/// the text that goes over the wire.
///
/// [`as_str`]: CommandString::as_str
#[derive(Clone)]
pub struct CommandString {
    text: Zeroizing<String>,
    redacted: String,
    mode: ChannelMode,
}

impl CommandString {
    /// A command with no embedded secrets.
    pub fn new(text: impl Into<String>, mode: ChannelMode) -> Self {
        let text = text.into();
        Self {
            redacted: text.clone(),
            text: Zeroizing::new(text),
            mode,
        }
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }

    pub fn mode(&self) -> ChannelMode {
        self.mode
    }

    pub fn redacted(&self) -> &str {
        &self.redacted
    }
}

impl fmt::Display for CommandString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.redacted)
    }
}

impl fmt::Debug for CommandString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CommandString")
            .field("text", &self.redacted)
            .field("mode", &self.mode)
            .finish()
    }
}

/// Builder joining fragments of one logical operation.
///
/// The first privileged fragment gets the full elevation prefix and every
/// later one the bare prefix, so a composed string primes the elevation
/// secret at most once.
pub struct Script<'s> {
    sudo: &'s Sudo,
    segments: Vec<Zeroizing<String>>,
    secrets: Vec<Zeroizing<String>>,
    primed: bool,
    mode: ChannelMode,
}

impl<'s> Script<'s> {
    pub fn new(sudo: &'s Sudo) -> Self {
        let secrets = sudo
            .quoted_secret()
            .map(Zeroizing::new)
            .into_iter()
            .collect();
        Self {
            sudo,
            segments: Vec::new(),
            secrets,
            primed: false,
            mode: ChannelMode::Exec,
        }
    }

    fn next_mode(&mut self) -> ElevationMode {
        if !self.sudo.is_required() {
            ElevationMode::None
        } else if self.primed {
            ElevationMode::Bare
        } else {
            self.primed = true;
            // The priming segment feeds the secret through stdin.
            self.mode = ChannelMode::Interactive;
            ElevationMode::Full
        }
    }

    /// Append a fragment that runs elevated.
    pub fn privileged(&mut self, fragment: impl AsRef<str>) -> &mut Self {
        let mode = self.next_mode();
        let prefix = Zeroizing::new(self.sudo.wrap(mode));
        self.segments
            .push(Zeroizing::new(format!("{}{}", *prefix, fragment.as_ref())));
        self
    }

    /// Append a fragment that runs as the session user.
    pub fn unprivileged(&mut self, fragment: impl AsRef<str>) -> &mut Self {
        self.segments
            .push(Zeroizing::new(fragment.as_ref().to_string()));
        self
    }

    /// `echo <payload> | <elevation><fragment>`.
    ///
    /// `payload` must already be quoted. Priming, when still needed, goes in
    /// front of the `echo` so the pipe only carries the payload.
    pub fn pipe_into(&mut self, payload: &str, fragment: impl AsRef<str>) -> &mut Self {
        let mut segment = Zeroizing::new(String::new());
        let elevation = match self.next_mode() {
            ElevationMode::Full => {
                segment.push_str(&Zeroizing::new(self.sudo.priming()));
                self.sudo.wrap(ElevationMode::Bare)
            }
            mode => self.sudo.wrap(mode),
        };
        segment.push_str("echo ");
        segment.push_str(payload);
        segment.push_str(" | ");
        segment.push_str(&elevation);
        segment.push_str(fragment.as_ref());

        self.segments.push(segment);
        self.mode = ChannelMode::Interactive;
        self
    }

    /// Same as [`pipe_into`](Self::pipe_into) with a payload that must not
    /// show up in logs.
    pub fn pipe_secret_into(
        &mut self,
        payload: Zeroizing<String>,
        fragment: impl AsRef<str>,
    ) -> &mut Self {
        self.pipe_into(&payload, fragment);
        self.secrets.push(payload);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// The composed string for a script that always has at least one
    /// fragment; an empty script yields an empty command.
    pub fn finish(self) -> CommandString {
        let mode = self.mode;
        self.build()
            .unwrap_or_else(|| CommandString::new(String::new(), mode))
    }

    /// The composed string, `None` when no fragment was added.
    pub fn build(self) -> Option<CommandString> {
        if self.segments.is_empty() {
            return None;
        }
        let text = Zeroizing::new(
            self.segments
                .iter()
                .map(|s| s.as_str())
                .collect::<Vec<_>>()
                .join(SEPARATOR),
        );
        let redacted = self
            .secrets
            .iter()
            .filter(|secret| secret.as_str() != "''")
            .fold(text.to_string(), |acc, secret| {
                acc.replace(secret.as_str(), REDACTED)
            });

        Some(CommandString {
            text,
            redacted,
            mode: self.mode,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::security::{ElevationPolicy, GuardedString};

    fn sudo() -> Sudo {
        Sudo::new(&ElevationPolicy::with_secret(GuardedString::new("hunter2")))
    }

    #[test]
    fn test_empty_script_builds_nothing() {
        let sudo = sudo();
        assert!(Script::new(&sudo).build().is_none());
    }

    #[test]
    fn test_first_privileged_fragment_primes_once() {
        let sudo = sudo();
        let mut script = Script::new(&sudo);
        script.privileged("useradd svc1").privileged("mkdir -p /home/svc1/.ssh");
        let command = script.build().unwrap();

        assert_eq!(
            command.as_str(),
            "sudo -k; echo 'hunter2' | sudo -S -p '' -v; sudo useradd svc1; sudo mkdir -p /home/svc1/.ssh"
        );
        assert_eq!(command.as_str().matches("echo 'hunter2' |").count(), 1);
        assert_eq!(command.mode(), ChannelMode::Interactive);
    }

    #[test]
    fn test_pipe_primes_before_echo() {
        let sudo = sudo();
        let mut script = Script::new(&sudo);
        script.pipe_into("'key'", "tee /home/svc1/.ssh/authorized_keys > /dev/null");
        assert_eq!(
            script.build().unwrap().as_str(),
            "sudo -k; echo 'hunter2' | sudo -S -p '' -v; echo 'key' | sudo tee /home/svc1/.ssh/authorized_keys > /dev/null"
        );
    }

    #[test]
    fn test_privileged_session_has_no_prefix() {
        let sudo = Sudo::new(&ElevationPolicy::privileged());
        let mut script = Script::new(&sudo);
        script.privileged("userdel svc1").unprivileged("getent passwd svc1");
        let command = script.build().unwrap();

        assert_eq!(command.as_str(), "userdel svc1; getent passwd svc1");
        assert_eq!(command.mode(), ChannelMode::Exec);
    }

    #[test]
    fn test_display_redacts_secrets() {
        let sudo = sudo();
        let mut script = Script::new(&sudo);
        script.pipe_secret_into(Zeroizing::new("'svc1:pw123'".to_string()), "chpasswd");
        let command = script.build().unwrap();

        let shown = command.to_string();
        assert!(!shown.contains("hunter2"));
        assert!(!shown.contains("pw123"));
        assert!(!format!("{command:?}").contains("pw123"));
        assert!(command.as_str().contains("pw123"));
    }
}
