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

//! Login credentials as presented to russh, and host key policy.

use russh::client::{Handle, Handler};
use russh::keys::PrivateKeyWithHashAlg;
use std::path::PathBuf;
use std::sync::Arc;
use zeroize::Zeroizing;

use super::Error;

/// How to log in. Secrets are cleared from memory when dropped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthMethod {
    Password(Zeroizing<String>),
    PrivateKeyFile {
        key_file_path: PathBuf,
        key_pass: Option<Zeroizing<String>>,
    },
    #[cfg(not(target_os = "windows"))]
    Agent,
}

/// Server host key verification.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ServerCheckMethod {
    /// Accept any host key.
    NoCheck,
    /// `~/.ssh/known_hosts`, as located by russh.
    DefaultKnownHostsFile,
    KnownHostsFile(PathBuf),
}

pub(super) async fn authenticate<H: Handler>(
    handle: &mut Handle<H>,
    username: &str,
    auth: AuthMethod,
) -> Result<(), Error> {
    match auth {
        AuthMethod::Password(password) => {
            let outcome = handle.authenticate_password(username, &**password).await?;
            if !outcome.success() {
                return Err(Error::PasswordWrong);
            }
        }
        AuthMethod::PrivateKeyFile {
            key_file_path,
            key_pass,
        } => authenticate_key_file(handle, username, key_file_path, key_pass).await?,
        #[cfg(not(target_os = "windows"))]
        AuthMethod::Agent => authenticate_agent(handle, username).await?,
    }
    Ok(())
}

async fn authenticate_key_file<H: Handler>(
    handle: &mut Handle<H>,
    username: &str,
    key_file_path: PathBuf,
    key_pass: Option<Zeroizing<String>>,
) -> Result<(), Error> {
    let key = russh::keys::load_secret_key(&key_file_path, key_pass.as_ref().map(|p| p.as_str()))
        .map_err(Error::KeyInvalid)?;
    let hash = handle.best_supported_rsa_hash().await?.flatten();

    let outcome = handle
        .authenticate_publickey(username, PrivateKeyWithHashAlg::new(Arc::new(key), hash))
        .await?;
    if !outcome.success() {
        tracing::debug!("Key {:?} rejected for {}", key_file_path, username);
        return Err(Error::KeyAuthFailed);
    }
    Ok(())
}

/// Offer each agent identity in turn until one is accepted.
#[cfg(not(target_os = "windows"))]
async fn authenticate_agent<H: Handler>(
    handle: &mut Handle<H>,
    username: &str,
) -> Result<(), Error> {
    let mut agent = russh::keys::agent::client::AgentClient::connect_env()
        .await
        .map_err(|_| Error::AgentConnectionFailed)?;
    let identities = agent
        .request_identities()
        .await
        .map_err(|_| Error::AgentRequestIdentitiesFailed)?;
    if identities.is_empty() {
        return Err(Error::AgentNoIdentities);
    }

    let hash = handle.best_supported_rsa_hash().await?.flatten();
    for identity in identities {
        match handle
            .authenticate_publickey_with(username, identity, hash, &mut agent)
            .await
        {
            Ok(outcome) if outcome.success() => return Ok(()),
            Ok(_) => continue,
            Err(e) => tracing::debug!("Agent identity failed for {}: {:?}", username, e),
        }
    }
    Err(Error::AgentAuthenticationFailed)
}
