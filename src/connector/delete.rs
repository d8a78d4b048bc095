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

//! Account and group deletion.

use super::common::required_uid;
use crate::config::ConnectorConfig;
use crate::error::{ConnectorError, Result};
use crate::executor::{Connection, Operation};
use crate::generator::CommandGenerator;
use crate::model::{ObjectClass, Uid};

/// Delete the target after confirming it exists.
///
/// The deletion primitives report a missing target in distribution specific
/// wording, so absence is established with a targeted lookup first.
pub(super) async fn delete(
    connection: &mut Connection,
    config: &ConnectorConfig,
    object_class: &ObjectClass,
    uid: &Uid,
) -> Result<()> {
    let name = required_uid(uid)?;
    let generator = CommandGenerator::new(config);

    let (command, operation, message) = match object_class {
        ObjectClass::Account => (
            generator.delete_account(name)?,
            Operation::UserDel,
            "Could not delete user",
        ),
        ObjectClass::Group => (
            generator.delete_group(name)?,
            Operation::GroupDel,
            "Could not delete group",
        ),
        ObjectClass::Other(other) => {
            return Err(ConnectorError::UnsupportedObjectClass(other.clone()))
        }
    };

    let existing = connection
        .execute_read(&generator.lookup(object_class, name)?)
        .await?;
    if existing.trim().is_empty() {
        tracing::warn!("Cannot delete {} {}: not found", object_class, name);
        return Err(ConnectorError::UnknownUid(name.to_string()));
    }

    tracing::info!("Deleting {} {}", object_class, name);
    connection.run(&command, operation, message, name).await?;
    Ok(())
}
