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

//! Caller-contract checks shared by the connector operations.

use crate::config::AttributeNames;
use crate::error::{ConnectorError, Result};
use crate::model::{names, AttributeSet, ObjectClass, Uid};
use crate::security::{validate_principal_name, validate_remote_path};

/// Reject anything other than accounts and groups.
pub(super) fn supported(object_class: &ObjectClass) -> Result<()> {
    match object_class {
        ObjectClass::Account | ObjectClass::Group => Ok(()),
        ObjectClass::Other(other) => Err(ConnectorError::UnsupportedObjectClass(other.clone())),
    }
}

/// The `__NAME__` a create request must carry.
pub(super) fn required_name(attributes: &AttributeSet) -> Result<&str> {
    let name = attributes.name().ok_or_else(|| {
        ConnectorError::invalid_argument(format!("{} attribute is required", names::NAME))
    })?;
    validate_principal_name(names::NAME, name)?;
    Ok(name)
}

/// The identifier an update or delete request targets.
pub(super) fn required_uid(uid: &Uid) -> Result<&str> {
    if uid.is_blank() {
        return Err(ConnectorError::invalid_argument(format!(
            "{} cannot be empty",
            names::UID
        )));
    }
    validate_principal_name(names::UID, uid.value())?;
    Ok(uid.value())
}

/// Names and paths that end up inside composed shell text.
pub(super) fn validate_attributes(
    object_class: &ObjectClass,
    attributes: &AttributeSet,
    attribute_names: &AttributeNames,
) -> Result<()> {
    if let Some(name) = attributes.name() {
        validate_principal_name(names::NAME, name)?;
    }

    if *object_class == ObjectClass::Account {
        if let Some(home) = attributes.string(&attribute_names.home_directory) {
            validate_remote_path(&attribute_names.home_directory, home)?;
        }
        if let Some(shell) = attributes.string(&attribute_names.shell) {
            validate_remote_path(&attribute_names.shell, shell)?;
        }
        for group in attributes.strings(names::GROUPS) {
            validate_principal_name(names::GROUPS, group)?;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_required_name() {
        let attributes = AttributeSet::new().with(names::NAME, "svc1");
        assert_eq!(required_name(&attributes).unwrap(), "svc1");

        let blank = AttributeSet::new().with(names::NAME, "  ");
        assert!(matches!(
            required_name(&blank),
            Err(ConnectorError::InvalidArgument(_))
        ));
        assert!(required_name(&AttributeSet::new()).is_err());
    }

    #[test]
    fn test_required_uid_rejects_shell_text() {
        assert!(required_uid(&Uid::new("svc1")).is_ok());
        assert!(required_uid(&Uid::new("")).is_err());
        assert!(required_uid(&Uid::new("svc1; reboot")).is_err());
    }

    #[test]
    fn test_validate_attributes() {
        let names = AttributeNames::default();
        let ok = AttributeSet::new()
            .with("homeDirectory", "/home/svc1")
            .with("shell", "/bin/bash")
            .with_values(names::GROUPS, ["ops", "wheel"]);
        assert!(validate_attributes(&ObjectClass::Account, &ok, &names).is_ok());

        let relative = AttributeSet::new().with("homeDirectory", "home/svc1");
        assert!(validate_attributes(&ObjectClass::Account, &relative, &names).is_err());

        let bad_group = AttributeSet::new().with_values(names::GROUPS, ["ops`id`"]);
        assert!(validate_attributes(&ObjectClass::Account, &bad_group, &names).is_err());
    }
}
