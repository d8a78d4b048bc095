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

//! Account and group creation.

use super::common::{required_name, validate_attributes};
use crate::config::ConnectorConfig;
use crate::error::{ConnectorError, Result};
use crate::executor::{Connection, Operation};
use crate::generator::CommandGenerator;
use crate::model::{names, AttributeSet, ObjectClass, Uid};

/// Create an account in up to three round trips: the creation script, the
/// password, then activation and lockout.
///
/// Every command is composed before the first one is sent, so a malformed
/// attribute never leaves a half-created account behind.
pub(super) async fn create_account(
    connection: &mut Connection,
    config: &ConnectorConfig,
    attributes: &AttributeSet,
) -> Result<Uid> {
    let username = required_name(attributes)?;
    validate_attributes(&ObjectClass::Account, attributes, &config.attributes)?;

    let generator = CommandGenerator::new(config);
    let create = generator.create_account(username, attributes)?;
    let password = match attributes.secret(names::PASSWORD) {
        Some(secret) if !secret.is_empty() => Some(generator.set_password(username, secret)),
        _ => None,
    };
    let activation = generator.activation(username, attributes)?;

    tracing::info!("Creating account {}", username);
    connection
        .run(&create, Operation::UserAdd, "Could not create user", username)
        .await?;

    if let Some(command) = password {
        connection
            .run(&command, Operation::Passwd, "Could not set password", username)
            .await?;
    }

    if let Some(command) = activation {
        connection
            .run(
                &command,
                Operation::UserMod,
                "Could not change user activation status",
                username,
            )
            .await?;
    }

    Ok(Uid::new(username))
}

pub(super) async fn create_group(
    connection: &mut Connection,
    config: &ConnectorConfig,
    attributes: &AttributeSet,
) -> Result<Uid> {
    let groupname = required_name(attributes)?;
    validate_attributes(&ObjectClass::Group, attributes, &config.attributes)?;
    if attributes.contains(names::PASSWORD) {
        return Err(ConnectorError::invalid_argument(
            "groups do not carry a password",
        ));
    }

    let command = CommandGenerator::new(config).create_group(groupname, attributes)?;

    tracing::info!("Creating group {}", groupname);
    connection
        .run(&command, Operation::GroupAdd, "Could not create group", groupname)
        .await?;

    Ok(Uid::new(groupname))
}
