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

//! Configuration loading, environment overrides and validation.

use anyhow::{Context, Result};
use directories::ProjectDirs;
use std::path::{Path, PathBuf};
use tokio::fs;

use super::types::ConnectorConfig;
use super::utils::expand_tilde;
use crate::error::ConnectorError;
use crate::executor::DiagnosticTable;
use crate::security::{get_sudo_password_from_env, validate_remote_path, ElevationPolicy, GuardedString};

/// Environment variable consulted for the admin login password.
pub const ADMIN_PASSWORD_ENV: &str = "UNIXPROV_PASSWORD";

impl ConnectorConfig {
    /// Load configuration from a YAML file.
    pub async fn load(path: &Path) -> Result<Self> {
        let expanded_path = expand_tilde(path);

        let content = fs::read_to_string(&expanded_path)
            .await
            .with_context(|| format!("Failed to read configuration file at {}. Please check file permissions and ensure the file is accessible.", expanded_path.display()))?;

        Self::from_yaml_str(&content).with_context(|| {
            format!(
                "Failed to parse YAML configuration file at {}",
                expanded_path.display()
            )
        })
    }

    pub fn from_yaml_str(content: &str) -> Result<Self> {
        serde_yaml::from_str(content).context("Invalid connector configuration")
    }

    /// Load configuration with priority order:
    /// 1. Explicit `--config` path
    /// 2. `unixprov.yaml` in the current directory
    /// 3. XDG config directory (`~/.config/unixprov/config.yaml`)
    pub async fn load_with_priority(cli_config_path: Option<&Path>) -> Result<Self> {
        if let Some(path) = cli_config_path {
            tracing::debug!("Using explicitly specified config file: {:?}", path);
            return Self::load(path).await;
        }

        let current_dir_config = PathBuf::from("unixprov.yaml");
        if current_dir_config.exists() {
            tracing::debug!("Found unixprov.yaml in current directory");
            return Self::load(&current_dir_config).await;
        }

        if let Some(proj_dirs) = ProjectDirs::from("", "", "unixprov") {
            let xdg_config = proj_dirs.config_dir().join("config.yaml");
            tracing::debug!("Checking XDG config path: {:?}", xdg_config);
            if xdg_config.exists() {
                return Self::load(&xdg_config).await;
            }
        }

        anyhow::bail!("No configuration file found. Pass --config or create unixprov.yaml")
    }

    /// Fill secrets from the environment; environment values take precedence.
    pub fn apply_env_overrides(&mut self) -> Result<()> {
        if let Some(password) = get_sudo_password_from_env()? {
            tracing::debug!("Using sudo password from environment");
            self.elevation.sudo_password = Some(password);
        }

        if let Ok(password) = std::env::var(ADMIN_PASSWORD_ENV) {
            if !password.is_empty() {
                tracing::debug!("Using admin password from environment");
                self.connection.password = Some(GuardedString::new(password));
            }
        }

        Ok(())
    }

    /// Reject configurations that cannot drive a connector.
    pub fn validate(&self) -> crate::Result<()> {
        if !self.elevation.root
            && self
                .elevation
                .sudo_password
                .as_ref()
                .map_or(true, GuardedString::is_empty)
        {
            return Err(ConnectorError::Configuration(
                "a sudo password is required unless the admin login is root".to_string(),
            ));
        }

        validate_remote_path("base_home_directory", &self.accounts.base_home_directory)
            .map_err(|e| ConnectorError::Configuration(e.to_string()))?;
        validate_remote_path("sudoers_directory", &self.accounts.sudoers_directory)
            .map_err(|e| ConnectorError::Configuration(e.to_string()))?;

        for (field, mode) in [
            ("ssh_dir_permissions", &self.accounts.ssh_dir_permissions),
            ("ssh_key_permissions", &self.accounts.ssh_key_permissions),
        ] {
            if mode.is_empty() || mode.len() > 4 || !mode.chars().all(|c| ('0'..='7').contains(&c)) {
                return Err(ConnectorError::Configuration(format!(
                    "{field} must be an octal mode, got '{mode}'"
                )));
            }
        }

        Ok(())
    }

    pub fn elevation_policy(&self) -> ElevationPolicy {
        if self.elevation.root {
            ElevationPolicy::privileged()
        } else {
            ElevationPolicy {
                already_privileged: false,
                secret: self.elevation.sudo_password.clone(),
            }
        }
    }

    /// Built-in diagnostic table with configured overrides applied.
    pub fn diagnostic_table(&self) -> DiagnosticTable {
        DiagnosticTable::default().with_overrides(self.diagnostics.clone())
    }

    /// Home directory used when none is supplied.
    pub fn default_home_directory(&self, username: &str) -> String {
        format!(
            "{}/{}",
            self.accounts.base_home_directory.trim_end_matches('/'),
            username
        )
    }
}
