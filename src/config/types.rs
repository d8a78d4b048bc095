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

//! Configuration type definitions.

use serde::Deserialize;
use std::collections::HashMap;
use std::path::PathBuf;

use crate::executor::{Diagnostic, Operation};
use crate::security::GuardedString;

/// Main configuration structure.
#[derive(Debug, Deserialize, Default, Clone)]
pub struct ConnectorConfig {
    #[serde(default)]
    pub connection: ConnectionConfig,

    #[serde(default)]
    pub elevation: ElevationConfig,

    #[serde(default)]
    pub accounts: AccountDefaults,

    #[serde(default)]
    pub attributes: AttributeNames,

    /// Per-operation overrides of the built-in diagnostic table.
    ///
    /// Failure phrasing differs between distributions and locales; an entry
    /// here replaces the built-in entry for the same operation.
    #[serde(default)]
    pub diagnostics: HashMap<Operation, Diagnostic>,
}

/// SSH connection to the managed host.
#[derive(Debug, Deserialize, Clone)]
pub struct ConnectionConfig {
    #[serde(default)]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    /// Login used for the shared administrative session.
    #[serde(default)]
    pub admin: String,

    #[serde(default)]
    pub password: Option<GuardedString>,

    #[serde(default)]
    pub key_path: Option<PathBuf>,

    #[serde(default)]
    pub key_passphrase: Option<GuardedString>,

    #[serde(default)]
    pub use_agent: bool,

    /// Verify the host key against `~/.ssh/known_hosts`.
    #[serde(default = "default_true")]
    pub strict_host_key_checking: bool,

    /// Seconds allowed for TCP connect and handshake. Commands themselves
    /// have no timeout.
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout: u64,
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self {
            host: String::new(),
            port: default_port(),
            admin: String::new(),
            password: None,
            key_path: None,
            key_passphrase: None,
            use_agent: false,
            strict_host_key_checking: true,
            connect_timeout: default_connect_timeout(),
        }
    }
}

/// How privileged commands are run.
#[derive(Debug, Deserialize, Default, Clone)]
pub struct ElevationConfig {
    /// The admin login is root; no sudo wrapping.
    #[serde(default)]
    pub root: bool,

    #[serde(default)]
    pub sudo_password: Option<GuardedString>,
}

/// Defaults applied to account provisioning.
#[derive(Debug, Deserialize, Clone)]
pub struct AccountDefaults {
    #[serde(default = "default_base_home_directory")]
    pub base_home_directory: String,

    /// Pass `-m` to the creation primitive.
    #[serde(default = "default_true")]
    pub create_home_directory: bool,

    /// Pass `-r` to the deletion primitive.
    #[serde(default)]
    pub delete_home_directory: bool,

    /// Shell used on creation when none is supplied.
    #[serde(default)]
    pub default_shell: Option<String>,

    /// Expiry date written when an account is disabled without an explicit
    /// `__DISABLE_DATE__`.
    #[serde(default = "default_disable_date")]
    pub disable_date: String,

    #[serde(default = "default_ssh_dir_permissions")]
    pub ssh_dir_permissions: String,

    #[serde(default = "default_ssh_key_permissions")]
    pub ssh_key_permissions: String,

    #[serde(default = "default_sudoers_directory")]
    pub sudoers_directory: String,
}

impl Default for AccountDefaults {
    fn default() -> Self {
        Self {
            base_home_directory: default_base_home_directory(),
            create_home_directory: true,
            delete_home_directory: false,
            default_shell: None,
            disable_date: default_disable_date(),
            ssh_dir_permissions: default_ssh_dir_permissions(),
            ssh_key_permissions: default_ssh_key_permissions(),
            sudoers_directory: default_sudoers_directory(),
        }
    }
}

/// Names under which the host passes the passwd text fields.
#[derive(Debug, Deserialize, Clone)]
pub struct AttributeNames {
    #[serde(default = "default_comment_attribute")]
    pub comment: String,

    #[serde(default = "default_shell_attribute")]
    pub shell: String,

    #[serde(default = "default_home_directory_attribute")]
    pub home_directory: String,
}

impl Default for AttributeNames {
    fn default() -> Self {
        Self {
            comment: default_comment_attribute(),
            shell: default_shell_attribute(),
            home_directory: default_home_directory_attribute(),
        }
    }
}

fn default_port() -> u16 {
    22
}

fn default_true() -> bool {
    true
}

fn default_connect_timeout() -> u64 {
    30
}

fn default_base_home_directory() -> String {
    "/home".to_string()
}

fn default_disable_date() -> String {
    "1970-01-02".to_string()
}

fn default_ssh_dir_permissions() -> String {
    "700".to_string()
}

fn default_ssh_key_permissions() -> String {
    "600".to_string()
}

fn default_sudoers_directory() -> String {
    "/etc/sudoers.d".to_string()
}

fn default_comment_attribute() -> String {
    "comment".to_string()
}

fn default_shell_attribute() -> String {
    "shell".to_string()
}

fn default_home_directory_attribute() -> String {
    "homeDirectory".to_string()
}
