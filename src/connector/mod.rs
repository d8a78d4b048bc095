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

//! Host-facing operations against one managed host.
//!
//! A [`UnixConnector`] owns the single administrative session. Every
//! operation takes `&mut self`, so operations on one connector never
//! overlap; the host runs one connector per session it wants in parallel.

mod common;
mod create;
mod delete;
mod update;

pub use crate::generator::UpdateMode;

use std::sync::Arc;

use crate::config::ConnectorConfig;
use crate::error::{ConnectorError, Result};
use crate::executor::{Connection, Operation};
use crate::generator::CommandGenerator;
use crate::model::{AttributeSet, ObjectClass, Uid};
use crate::search::{Filter, FilterTranslator, ResultsHandler, Search};
use crate::security::{validate_principal_name, GuardedString};
use crate::ssh::{admin_credential, Credential, RemoteShell, SessionProvider, ShellError, SshSessionProvider};

use common::supported;

pub struct UnixConnector {
    config: ConnectorConfig,
    connection: Connection,
    sessions: Arc<dyn SessionProvider>,
}

impl UnixConnector {
    /// Validate the configuration and open the administrative SSH session.
    pub async fn connect(config: ConnectorConfig) -> Result<Self> {
        config.validate()?;
        if config.connection.host.trim().is_empty() {
            return Err(ConnectorError::Configuration(
                "connection.host is required".to_string(),
            ));
        }
        if config.connection.admin.trim().is_empty() {
            return Err(ConnectorError::Configuration(
                "connection.admin is required".to_string(),
            ));
        }
        let credential = admin_credential(&config.connection).ok_or_else(|| {
            ConnectorError::Configuration(
                "no key file, agent or password configured for the admin login".to_string(),
            )
        })?;

        let sessions: Arc<dyn SessionProvider> =
            Arc::new(SshSessionProvider::from_config(&config.connection));
        let shell = sessions
            .open(&config.connection.admin, &credential)
            .await?;
        tracing::info!(
            "Connected to {}:{} as {}",
            config.connection.host,
            config.connection.port,
            config.connection.admin
        );

        Self::new(config, shell, sessions)
    }

    /// Build a connector on an already authenticated shell.
    pub fn new(
        config: ConnectorConfig,
        shell: Box<dyn RemoteShell>,
        sessions: Arc<dyn SessionProvider>,
    ) -> Result<Self> {
        config.validate()?;
        let connection = Connection::new(shell, config.diagnostic_table());
        Ok(Self {
            config,
            connection,
            sessions,
        })
    }

    pub fn config(&self) -> &ConnectorConfig {
        &self.config
    }

    /// Check the session is usable and, when elevation is configured, that
    /// the sudo password is accepted.
    pub async fn test(&mut self) -> Result<()> {
        let command = CommandGenerator::new(&self.config).test_connection();
        self.connection
            .run(&command, Operation::Test, "Connection test failed", "")
            .await?;
        tracing::info!("Connection test succeeded");
        Ok(())
    }

    pub async fn create(
        &mut self,
        object_class: &ObjectClass,
        attributes: &AttributeSet,
    ) -> Result<Uid> {
        match object_class {
            ObjectClass::Account => {
                create::create_account(&mut self.connection, &self.config, attributes).await
            }
            ObjectClass::Group => {
                create::create_group(&mut self.connection, &self.config, attributes).await
            }
            ObjectClass::Other(other) => Err(ConnectorError::UnsupportedObjectClass(other.clone())),
        }
    }

    /// Replace the supplied attributes on `uid`. Returns the identifier
    /// after a possible rename.
    pub async fn update(
        &mut self,
        object_class: &ObjectClass,
        uid: &Uid,
        attributes: &AttributeSet,
    ) -> Result<Uid> {
        self.modify(object_class, uid, attributes, UpdateMode::Replace)
            .await
    }

    /// Remove the supplied values from `uid`: drop group memberships not
    /// listed, revoke a supplied public key or permission, clear the
    /// password.
    pub async fn remove_attribute_values(
        &mut self,
        object_class: &ObjectClass,
        uid: &Uid,
        attributes: &AttributeSet,
    ) -> Result<Uid> {
        self.modify(object_class, uid, attributes, UpdateMode::RemoveValues)
            .await
    }

    async fn modify(
        &mut self,
        object_class: &ObjectClass,
        uid: &Uid,
        attributes: &AttributeSet,
        mode: UpdateMode,
    ) -> Result<Uid> {
        match object_class {
            ObjectClass::Account => {
                update::update_account(&mut self.connection, &self.config, uid, attributes, mode)
                    .await
            }
            ObjectClass::Group => {
                update::update_group(&mut self.connection, &self.config, uid, attributes, mode)
                    .await
            }
            ObjectClass::Other(other) => Err(ConnectorError::UnsupportedObjectClass(other.clone())),
        }
    }

    pub async fn delete(&mut self, object_class: &ObjectClass, uid: &Uid) -> Result<()> {
        delete::delete(&mut self.connection, &self.config, object_class, uid).await
    }

    /// Stream matching objects into `handler`.
    ///
    /// A primary-key equality filter fails with
    /// [`ConnectorError::NoResultsFound`] when the target does not exist;
    /// any other search that matches nothing simply emits nothing.
    pub async fn search(
        &mut self,
        object_class: &ObjectClass,
        filter: Option<&Filter>,
        handler: &mut dyn ResultsHandler,
    ) -> Result<()> {
        supported(object_class)?;
        let operand = FilterTranslator::translate(filter)?;

        let generator = CommandGenerator::new(&self.config);
        let mut search = Search::new(&mut self.connection, &generator, &self.config.attributes);
        search.execute(object_class, operand.as_ref(), handler).await
    }

    /// Verify `password` by logging in as `username` on a separate session.
    pub async fn authenticate(
        &self,
        object_class: &ObjectClass,
        username: &str,
        password: &GuardedString,
    ) -> Result<Uid> {
        if *object_class != ObjectClass::Account {
            return Err(ConnectorError::UnsupportedObjectClass(
                object_class.name().to_string(),
            ));
        }
        validate_principal_name("username", username)?;
        if password.is_empty() {
            return Err(ConnectorError::invalid_argument("password cannot be empty"));
        }

        let credential = Credential::Password(password.clone());
        let mut shell = match self.sessions.open(username, &credential).await {
            Ok(shell) => shell,
            Err(ShellError::AuthenticationRejected(reason)) => {
                tracing::warn!("Authentication as {} rejected: {}", username, reason);
                return Err(ConnectorError::InvalidCredential(username.to_string()));
            }
            Err(e) => return Err(e.into()),
        };
        if let Err(e) = shell.close().await {
            tracing::debug!("Closing the session of {} failed: {}", username, e);
        }

        tracing::info!("Authenticated {}", username);
        Ok(Uid::new(username))
    }

    /// Close the administrative session.
    pub async fn close(&mut self) -> Result<()> {
        self.connection.close().await
    }
}
