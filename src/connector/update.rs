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

//! Account and group updates, in both replace and remove-values mode.

use super::common::{required_uid, validate_attributes};
use crate::config::ConnectorConfig;
use crate::error::{ConnectorError, Result};
use crate::executor::{Connection, Operation};
use crate::generator::{AccountUpdate, CommandGenerator, GroupUpdate, UpdateMode};
use crate::model::{names, AttributeSet, ObjectClass, Uid};
use crate::parser::{AccountRow, GroupFile, PasswdFile};

pub(super) async fn update_account(
    connection: &mut Connection,
    config: &ConnectorConfig,
    uid: &Uid,
    attributes: &AttributeSet,
    mode: UpdateMode,
) -> Result<Uid> {
    let username = required_uid(uid)?;
    validate_attributes(&ObjectClass::Account, attributes, &config.attributes)?;

    let generator = CommandGenerator::new(config);
    let new_name = attributes.name().unwrap_or(username);
    let home_supplied = mode == UpdateMode::Replace
        && attributes.is_present(&config.attributes.home_directory);

    // Remote state the update script depends on, read before anything is
    // modified. The key file lives under the current home directory.
    let current_row = if new_name != username || home_supplied || attributes.contains(names::PUBLIC_KEY) {
        Some(fetch_account(connection, &generator, username).await?)
    } else {
        None
    };
    let current_groups = if mode == UpdateMode::RemoveValues && attributes.is_present(names::GROUPS) {
        let output = connection
            .execute_read(&generator.user_groups(username))
            .await?;
        GroupFile::parse(&output).groups_of(username)
    } else {
        Vec::new()
    };

    let plan = AccountUpdate {
        username,
        attributes,
        mode,
        current_groups: &current_groups,
        current_row: current_row.as_ref(),
    };
    let script = generator.update_account(&plan)?;
    let password = match mode {
        UpdateMode::Replace => attributes
            .secret(names::PASSWORD)
            .filter(|secret| !secret.is_empty())
            .map(|secret| generator.set_password(new_name, secret)),
        UpdateMode::RemoveValues => attributes
            .contains(names::PASSWORD)
            .then(|| generator.reset_password(new_name)),
    };

    match &script {
        Some(command) => {
            tracing::info!("Updating account {}", username);
            connection
                .run(command, Operation::UserMod, "Could not modify user", username)
                .await?;
        }
        None => tracing::debug!("Nothing to modify on account {}", username),
    }

    if let Some(command) = password {
        connection
            .run(&command, Operation::Passwd, "Could not set password", new_name)
            .await?;
    }

    Ok(Uid::new(new_name))
}

pub(super) async fn update_group(
    connection: &mut Connection,
    config: &ConnectorConfig,
    uid: &Uid,
    attributes: &AttributeSet,
    mode: UpdateMode,
) -> Result<Uid> {
    let groupname = required_uid(uid)?;
    validate_attributes(&ObjectClass::Group, attributes, &config.attributes)?;

    let plan = GroupUpdate {
        groupname,
        attributes,
        mode,
    };
    match CommandGenerator::new(config).update_group(&plan)? {
        Some(command) => {
            tracing::info!("Updating group {}", groupname);
            connection
                .run(&command, Operation::GroupMod, "Could not modify group", groupname)
                .await?;
        }
        None => tracing::debug!("Nothing to modify on group {}", groupname),
    }

    Ok(Uid::new(plan.new_name()))
}

/// Current passwd row of an account, [`ConnectorError::UnknownUid`] when the
/// lookup comes back empty.
async fn fetch_account(
    connection: &mut Connection,
    generator: &CommandGenerator<'_>,
    username: &str,
) -> Result<AccountRow> {
    let output = connection
        .execute_read(&generator.user_exists(username))
        .await?;
    PasswdFile::parse(&output)
        .into_rows()
        .into_iter()
        .find(|row| row.username == username)
        .ok_or_else(|| ConnectorError::UnknownUid(username.to_string()))
}
