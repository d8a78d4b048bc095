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

//! Connecting and logging in to the managed host.

use russh::client::{Config, Handle, Handler};
use std::fmt;
use std::io;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use super::authentication::{authenticate, AuthMethod, ServerCheckMethod};
use super::Error;

/// An authenticated SSH connection.
///
/// Commands go out with [`Client::execute`] or [`Client::execute_interactive`],
/// each on a fresh channel.
pub struct Client {
    pub(super) handle: Handle<ClientHandler>,
    username: String,
    address: SocketAddr,
}

impl Client {
    /// Resolve `host`, connect to the first address that accepts and log in
    /// as `username`. `connect_timeout` bounds the whole sequence.
    pub async fn connect(
        host: &str,
        port: u16,
        username: &str,
        auth: AuthMethod,
        server_check: ServerCheckMethod,
        connect_timeout: Duration,
    ) -> Result<Self, Error> {
        let attempt = async {
            let (address, mut handle) = open_transport(host, port, server_check).await?;
            authenticate(&mut handle, username, auth).await?;
            tracing::debug!("Logged in as {} on {}", username, address);
            Ok::<_, Error>(Self {
                handle,
                username: username.to_string(),
                address,
            })
        };

        tokio::time::timeout(connect_timeout, attempt)
            .await
            .map_err(|_| Error::Timeout(connect_timeout.as_secs()))?
    }

    pub async fn disconnect(&self) -> Result<(), Error> {
        self.handle
            .disconnect(russh::Disconnect::ByApplication, "", "")
            .await
            .map_err(Error::SshError)
    }

    pub fn is_closed(&self) -> bool {
        self.handle.is_closed()
    }
}

impl fmt::Debug for Client {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Client")
            .field("username", &self.username)
            .field("address", &self.address)
            .finish_non_exhaustive()
    }
}

async fn open_transport(
    host: &str,
    port: u16,
    server_check: ServerCheckMethod,
) -> Result<(SocketAddr, Handle<ClientHandler>), Error> {
    let config = Arc::new(Config::default());
    let addresses = tokio::net::lookup_host((host, port))
        .await
        .map_err(Error::AddressInvalid)?;

    let mut last_error = Error::AddressInvalid(io::Error::new(
        io::ErrorKind::InvalidInput,
        format!("{host} did not resolve to any address"),
    ));
    for address in addresses {
        let handler = ClientHandler {
            hostname: host.to_string(),
            port,
            server_check: server_check.clone(),
        };
        match russh::client::connect(config.clone(), address, handler).await {
            Ok(handle) => return Ok((address, handle)),
            Err(e) => {
                tracing::debug!("Connection attempt to {} failed: {}", address, e);
                last_error = e;
            }
        }
    }
    Err(last_error)
}

/// Verifies the server's host key against the configured policy.
#[derive(Debug, Clone)]
pub struct ClientHandler {
    hostname: String,
    port: u16,
    server_check: ServerCheckMethod,
}

impl Handler for ClientHandler {
    type Error = Error;

    async fn check_server_key(
        &mut self,
        server_public_key: &russh::keys::PublicKey,
    ) -> Result<bool, Self::Error> {
        let known = match &self.server_check {
            ServerCheckMethod::NoCheck => return Ok(true),
            ServerCheckMethod::KnownHostsFile(path) => russh::keys::check_known_hosts_path(
                &self.hostname,
                self.port,
                server_public_key,
                path,
            ),
            ServerCheckMethod::DefaultKnownHostsFile => {
                russh::keys::check_known_hosts(&self.hostname, self.port, server_public_key)
            }
        };

        match known {
            Ok(true) => Ok(true),
            Ok(false) => {
                tracing::warn!("Host key for {} is not in known_hosts", self.hostname);
                Ok(false)
            }
            Err(e) => {
                tracing::warn!("Host key check for {} failed: {}", self.hostname, e);
                Err(Error::ServerCheckFailed)
            }
        }
    }
}
