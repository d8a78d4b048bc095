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

//! russh backed sessions.

use async_trait::async_trait;
use std::time::Duration;

use super::known_hosts::get_check_method;
use super::shell::{Credential, RemoteShell, SessionProvider, ShellError};
use super::tokio_client::{AuthMethod, Client};
use crate::config::ConnectionConfig;

/// A live SSH connection used as a [`RemoteShell`].
#[derive(Debug)]
pub struct SshSession {
    client: Option<Client>,
}

impl SshSession {
    pub fn new(client: Client) -> Self {
        Self {
            client: Some(client),
        }
    }

    fn client(&self) -> Result<&Client, ShellError> {
        match &self.client {
            Some(client) if !client.is_closed() => Ok(client),
            _ => Err(ShellError::Closed),
        }
    }
}

#[async_trait]
impl RemoteShell for SshSession {
    async fn execute(&mut self, command: &str) -> Result<String, ShellError> {
        let result = self.client()?.execute(command).await?;
        tracing::trace!("exec finished with status {}", result.exit_status);
        Ok(result.combined_output())
    }

    async fn execute_interactive(&mut self, command: &str) -> Result<String, ShellError> {
        let result = self.client()?.execute_interactive(command).await?;
        tracing::trace!("shell finished with status {}", result.exit_status);
        Ok(result.combined_output())
    }

    async fn close(&mut self) -> Result<(), ShellError> {
        if let Some(client) = self.client.take() {
            if !client.is_closed() {
                client.disconnect().await?;
            }
        }
        Ok(())
    }
}

/// Opens [`SshSession`]s against one host.
#[derive(Debug, Clone)]
pub struct SshSessionProvider {
    host: String,
    port: u16,
    strict_host_key_checking: bool,
    connect_timeout: Duration,
}

impl SshSessionProvider {
    pub fn from_config(config: &ConnectionConfig) -> Self {
        Self {
            host: config.host.clone(),
            port: config.port,
            strict_host_key_checking: config.strict_host_key_checking,
            connect_timeout: Duration::from_secs(config.connect_timeout),
        }
    }
}

fn auth_method(credential: &Credential) -> AuthMethod {
    match credential {
        Credential::Password(password) => AuthMethod::Password(password.reveal()),
        Credential::KeyFile { path, passphrase } => AuthMethod::PrivateKeyFile {
            key_file_path: path.clone(),
            key_pass: passphrase.as_ref().map(|p| p.reveal()),
        },
        #[cfg(not(target_os = "windows"))]
        Credential::Agent => AuthMethod::Agent,
    }
}

#[async_trait]
impl SessionProvider for SshSessionProvider {
    async fn open(
        &self,
        username: &str,
        credential: &Credential,
    ) -> Result<Box<dyn RemoteShell>, ShellError> {
        tracing::debug!(
            "Opening SSH session to {}:{} as {}",
            self.host,
            self.port,
            username
        );
        let client = Client::connect(
            &self.host,
            self.port,
            username,
            auth_method(credential),
            get_check_method(self.strict_host_key_checking),
            self.connect_timeout,
        )
        .await?;
        Ok(Box::new(SshSession::new(client)))
    }
}

/// Pick the admin credential from configuration: key file, then agent, then
/// password.
pub fn admin_credential(config: &ConnectionConfig) -> Option<Credential> {
    if let Some(path) = &config.key_path {
        return Some(Credential::KeyFile {
            path: crate::config::expand_tilde(path),
            passphrase: config.key_passphrase.clone(),
        });
    }

    #[cfg(not(target_os = "windows"))]
    if config.use_agent {
        return Some(Credential::Agent);
    }

    config.password.clone().map(Credential::Password)
}
