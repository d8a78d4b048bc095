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

//! Command generation: elevation, fragment ordering and composition.
//!
//! One method per logical operation. Each decides which fragments need
//! elevation, delegates the text to [`crate::commands`] and joins the
//! fragments into a [`CommandString`]. Methods that may have nothing to do
//! return `None`; callers skip the round trip instead of sending an empty
//! string.

pub mod plan;
mod script;

pub use plan::{AccountUpdate, GroupUpdate, UpdateMode};
pub use script::{ChannelMode, CommandString, Script};

use chrono::NaiveDate;

use crate::commands::{file, group, passwd, query, user, UserOptions};
use crate::config::ConnectorConfig;
use crate::error::{ConnectorError, Result};
use crate::executor::TEST_CONFIRMATION;
use crate::model::{names, AttributeSet, ObjectClass};
use crate::parser::{format_date, parse_disable_date};
use crate::security::{GuardedString, Sudo};
use crate::utils::shell::single_quote;

const SSH_DIRECTORY: &str = ".ssh";
const AUTHORIZED_KEYS_FILE: &str = "authorized_keys";
const SUDOERS_FILE_MODE: &str = "0440";
const USER_PERMISSION_SUFFIX: &str = "_user";
const GROUP_PERMISSION_SUFFIX: &str = "_group";

fn ssh_directory(home: &str) -> String {
    format!("{}/{SSH_DIRECTORY}", home.trim_end_matches('/'))
}

fn authorized_keys(home: &str) -> String {
    format!("{}/{AUTHORIZED_KEYS_FILE}", ssh_directory(home))
}

/// Builds command strings from configuration and attribute sets.
///
/// The elevation secret is decoded once, when the generator is created.
/// Create one generator per operation.
#[derive(Debug)]
pub struct CommandGenerator<'a> {
    config: &'a ConnectorConfig,
    sudo: Sudo,
}

impl<'a> CommandGenerator<'a> {
    pub fn new(config: &'a ConnectorConfig) -> Self {
        Self {
            config,
            sudo: Sudo::new(&config.elevation_policy()),
        }
    }

    pub fn script(&self) -> Script<'_> {
        Script::new(&self.sudo)
    }

    fn privileged(&self, fragment: impl AsRef<str>) -> CommandString {
        let mut script = self.script();
        script.privileged(fragment);
        script.finish()
    }

    fn unprivileged(fragment: impl Into<String>) -> CommandString {
        CommandString::new(fragment, ChannelMode::Exec)
    }

    // Lookups. The passwd and group databases are world readable; shadow
    // entries and sudoers drop-ins are not.

    pub fn user_exists(&self, username: &str) -> CommandString {
        Self::unprivileged(query::passwd_entry(username))
    }

    pub fn group_exists(&self, groupname: &str) -> CommandString {
        Self::unprivileged(query::group_entry(groupname))
    }

    pub fn search_all_users(&self) -> CommandString {
        Self::unprivileged(query::passwd_dump())
    }

    pub fn search_all_groups(&self) -> CommandString {
        Self::unprivileged(query::group_dump())
    }

    /// Targeted single-record lookup for an object kind.
    pub fn lookup(&self, object_class: &ObjectClass, name: &str) -> Result<CommandString> {
        match object_class {
            ObjectClass::Account => Ok(self.user_exists(name)),
            ObjectClass::Group => Ok(self.group_exists(name)),
            ObjectClass::Other(other) => Err(ConnectorError::UnsupportedObjectClass(other.clone())),
        }
    }

    /// Full database dump for an object kind.
    pub fn dump(&self, object_class: &ObjectClass) -> Result<CommandString> {
        match object_class {
            ObjectClass::Account => Ok(self.search_all_users()),
            ObjectClass::Group => Ok(self.search_all_groups()),
            ObjectClass::Other(other) => Err(ConnectorError::UnsupportedObjectClass(other.clone())),
        }
    }

    pub fn user_status(&self, username: &str) -> CommandString {
        self.privileged(query::shadow_entry(username))
    }

    /// Membership query; the output still needs exact matching on members.
    pub fn user_groups(&self, username: &str) -> CommandString {
        Self::unprivileged(query::groups_for_user(username))
    }

    pub fn permissions(&self, object_class: &ObjectClass, name: &str) -> Result<CommandString> {
        let path = self.permission_file(object_class, name)?;
        Ok(self.privileged(file::cat(&path)))
    }

    /// Confirmation echo, preceded by an elevated no-op when elevation is
    /// needed so that a wrong sudo password fails the test.
    pub fn test_connection(&self) -> CommandString {
        let mut script = self.script();
        if self.sudo.is_required() {
            script.privileged("true");
        }
        script.unprivileged(query::echo(TEST_CONFIRMATION));
        script.finish()
    }

    // Accounts

    /// Creation primitive plus key file and permission file, one round trip.
    pub fn create_account(&self, username: &str, attributes: &AttributeSet) -> Result<CommandString> {
        let mut options = UserOptions::from_attributes(attributes, &self.config.attributes);
        if options.shell.is_none() {
            options.shell = self.config.accounts.default_shell.clone();
        }

        let mut script = self.script();
        script.privileged(user::useradd(
            username,
            &options,
            self.config.accounts.create_home_directory,
        ));

        let home = options
            .home_directory
            .clone()
            .unwrap_or_else(|| self.config.default_home_directory(username));
        self.push_public_key(&mut script, username, &home, attributes);
        self.push_grant_permissions(&mut script, &ObjectClass::Account, username, attributes)?;

        Ok(script.finish())
    }

    /// Ordered update of an existing account.
    ///
    /// Fragment order matters:
    /// 1. membership removal, naming the account as it is before the rename
    /// 2. the modify primitive, which may rename
    /// 3. activation and lockout, on the new name
    /// 4. home move and primary group rename, from the pre-rename row
    /// 5. public key and permission file
    pub fn update_account(&self, plan: &AccountUpdate<'_>) -> Result<Option<CommandString>> {
        let attributes = plan.attributes;
        let new_name = plan.new_name();
        let mut script = self.script();

        if plan.mode == UpdateMode::RemoveValues && attributes.is_present(names::GROUPS) {
            let keep = attributes.strings(names::GROUPS);
            for group in plan
                .current_groups
                .iter()
                .filter(|group| !keep.contains(&group.as_str()))
            {
                script.privileged(user::remove_from_group(plan.username, group));
            }
        }

        let options = match plan.mode {
            UpdateMode::Replace => UserOptions::from_attributes(attributes, &self.config.attributes),
            UpdateMode::RemoveValues => UserOptions::default(),
        };
        if let Some(usermod) = user::usermod(
            plan.username,
            &options,
            Some(new_name),
            plan.mode == UpdateMode::Replace,
        ) {
            script.privileged(usermod);
        }

        self.push_activation(&mut script, new_name, attributes)?;

        if plan.is_rename() || options.home_directory.is_some() {
            let row = plan
                .current_row
                .ok_or_else(|| ConnectorError::UnknownUid(plan.username.to_string()))?;
            if let Some(home) = options
                .home_directory
                .as_deref()
                .filter(|home| *home != row.home_directory)
            {
                script.privileged(file::mv(&row.home_directory, home));
            }
            if plan.is_rename() {
                script.privileged(group::rename(&row.username, new_name));
            }
        }

        let home = options
            .home_directory
            .clone()
            .or_else(|| plan.current_row.map(|row| row.home_directory.clone()))
            .unwrap_or_else(|| self.config.default_home_directory(new_name));
        match plan.mode {
            UpdateMode::Replace => {
                self.push_public_key(&mut script, new_name, &home, attributes);
                self.push_grant_permissions(&mut script, &ObjectClass::Account, new_name, attributes)?;
            }
            UpdateMode::RemoveValues => {
                if attributes.contains(names::PUBLIC_KEY) {
                    script.privileged(file::remove_file(&authorized_keys(&home)));
                }
                if attributes.contains(names::PERMISSIONS) {
                    let path = self.permission_file(&ObjectClass::Account, new_name)?;
                    script.privileged(file::remove_file(&path));
                }
            }
        }

        Ok(script.build())
    }

    /// Deletion primitive plus removal of the account's permission file.
    pub fn delete_account(&self, username: &str) -> Result<CommandString> {
        let mut script = self.script();
        script.privileged(user::userdel(
            username,
            self.config.accounts.delete_home_directory,
        ));
        script.privileged(file::remove_file(
            &self.permission_file(&ObjectClass::Account, username)?,
        ));
        Ok(script.finish())
    }

    // Passwords

    pub fn set_password(&self, username: &str, password: &GuardedString) -> CommandString {
        let plain = password.reveal();
        let mut script = self.script();
        script.pipe_secret_into(
            passwd::chpasswd_payload(username, &plain),
            passwd::CHPASSWD_COMMAND,
        );
        script.finish()
    }

    pub fn reset_password(&self, username: &str) -> CommandString {
        self.privileged(passwd::reset(username))
    }

    // Activation and lockout

    /// Expiry and lock fragments for `__ENABLE__`, `__DISABLE_DATE__` and
    /// `__LOCK_OUT__`, `None` when none of them is present.
    pub fn activation(&self, username: &str, attributes: &AttributeSet) -> Result<Option<CommandString>> {
        let mut script = self.script();
        self.push_activation(&mut script, username, attributes)?;
        Ok(script.build())
    }

    pub fn lock_account(&self, username: &str) -> CommandString {
        self.privileged(user::lock(username))
    }

    pub fn unlock_account(&self, username: &str) -> CommandString {
        self.privileged(user::unlock(username))
    }

    pub fn enable_account(&self, username: &str) -> CommandString {
        self.privileged(user::clear_expiry(username))
    }

    pub fn disable_account(&self, username: &str, date: NaiveDate) -> CommandString {
        self.privileged(user::expire(username, &format_date(date)))
    }

    fn push_activation(
        &self,
        script: &mut Script<'_>,
        username: &str,
        attributes: &AttributeSet,
    ) -> Result<()> {
        match attributes.bool(names::ENABLE) {
            Some(true) => {
                script.privileged(user::clear_expiry(username));
            }
            Some(false) => {
                script.privileged(user::expire(username, &self.disable_date(attributes)?));
            }
            None if attributes.is_present(names::DISABLE_DATE) => {
                script.privileged(user::expire(username, &self.disable_date(attributes)?));
            }
            None => {}
        }

        match attributes.bool(names::LOCK_OUT) {
            Some(true) => {
                script.privileged(user::lock(username));
            }
            Some(false) => {
                script.privileged(user::unlock(username));
            }
            None => {}
        }
        Ok(())
    }

    fn disable_date(&self, attributes: &AttributeSet) -> Result<String> {
        match attributes.string(names::DISABLE_DATE) {
            Some(value) => parse_disable_date(value).map(format_date).map_err(|e| {
                ConnectorError::invalid_argument(format!("{}: {}", names::DISABLE_DATE, e.reason))
            }),
            None => Ok(self.config.accounts.disable_date.clone()),
        }
    }

    // SSH keys

    pub fn create_key_directory(&self, username: &str, home: &str) -> CommandString {
        let mut script = self.script();
        self.push_key_directory(&mut script, username, &ssh_directory(home));
        script.finish()
    }

    pub fn remove_key_directory(&self, home: &str) -> CommandString {
        self.privileged(file::remove_dir(&ssh_directory(home)))
    }

    /// Write `authorized_keys` through the pipe-into-elevated-tee idiom and
    /// hand the key directory to the account.
    pub fn set_public_key(&self, username: &str, home: &str, key: &str) -> CommandString {
        let mut script = self.script();
        self.push_key_file(&mut script, username, home, key);
        script.finish()
    }

    pub fn remove_public_key(&self, home: &str) -> CommandString {
        self.privileged(file::remove_file(&authorized_keys(home)))
    }

    fn push_key_directory(&self, script: &mut Script<'_>, username: &str, directory: &str) {
        script
            .privileged(file::mkdir(directory))
            .privileged(file::chown(username, directory))
            .privileged(file::chmod(&self.config.accounts.ssh_dir_permissions, directory));
    }

    fn push_key_file(&self, script: &mut Script<'_>, username: &str, home: &str, key: &str) {
        let directory = ssh_directory(home);
        let keys = authorized_keys(home);
        script
            .privileged(file::mkdir(&directory))
            .pipe_into(&single_quote(key), file::tee(&keys))
            .privileged(file::chown(username, &directory))
            .privileged(file::chmod(&self.config.accounts.ssh_dir_permissions, &directory))
            .privileged(file::chmod(&self.config.accounts.ssh_key_permissions, &keys));
    }

    fn push_public_key(
        &self,
        script: &mut Script<'_>,
        username: &str,
        home: &str,
        attributes: &AttributeSet,
    ) {
        let keys = attributes.strings(names::PUBLIC_KEY);
        if !keys.is_empty() {
            self.push_key_file(script, username, home, &keys.join("\n"));
        }
    }

    // Elevated-command permissions

    fn permission_file(&self, object_class: &ObjectClass, name: &str) -> Result<String> {
        let suffix = match object_class {
            ObjectClass::Account => USER_PERMISSION_SUFFIX,
            ObjectClass::Group => GROUP_PERMISSION_SUFFIX,
            ObjectClass::Other(other) => {
                return Err(ConnectorError::UnsupportedObjectClass(other.clone()))
            }
        };
        Ok(format!(
            "{}/{name}{suffix}",
            self.config.accounts.sudoers_directory.trim_end_matches('/')
        ))
    }

    /// Write a sudoers drop-in granting `rule` to the account or group.
    pub fn grant_permissions(
        &self,
        object_class: &ObjectClass,
        name: &str,
        rule: &str,
    ) -> Result<CommandString> {
        let mut script = self.script();
        self.push_permission_file(&mut script, object_class, name, rule)?;
        Ok(script.finish())
    }

    pub fn revoke_permissions(&self, object_class: &ObjectClass, name: &str) -> Result<CommandString> {
        let path = self.permission_file(object_class, name)?;
        Ok(self.privileged(file::remove_file(&path)))
    }

    fn push_permission_file(
        &self,
        script: &mut Script<'_>,
        object_class: &ObjectClass,
        name: &str,
        rule: &str,
    ) -> Result<()> {
        let path = self.permission_file(object_class, name)?;
        let principal = match object_class {
            ObjectClass::Group => format!("%{name}"),
            _ => name.to_string(),
        };
        script
            .pipe_into(&single_quote(&format!("{principal} {rule}")), file::tee(&path))
            .privileged(file::chmod(SUDOERS_FILE_MODE, &path));
        Ok(())
    }

    fn push_grant_permissions(
        &self,
        script: &mut Script<'_>,
        object_class: &ObjectClass,
        name: &str,
        attributes: &AttributeSet,
    ) -> Result<()> {
        match attributes.string(names::PERMISSIONS) {
            Some(rule) => self.push_permission_file(script, object_class, name, rule),
            None => Ok(()),
        }
    }

    // Renames

    pub fn rename_primary_group(&self, old_name: &str, new_name: &str) -> CommandString {
        self.privileged(group::rename(old_name, new_name))
    }

    pub fn move_home_directory(&self, old_home: &str, new_home: &str) -> CommandString {
        self.privileged(file::mv(old_home, new_home))
    }

    // Groups

    pub fn create_group(&self, groupname: &str, attributes: &AttributeSet) -> Result<CommandString> {
        let mut script = self.script();
        script.privileged(group::groupadd(groupname));
        self.push_grant_permissions(&mut script, &ObjectClass::Group, groupname, attributes)?;
        Ok(script.finish())
    }

    pub fn update_group(&self, plan: &GroupUpdate<'_>) -> Result<Option<CommandString>> {
        let new_name = plan.new_name();
        let mut script = self.script();

        match plan.mode {
            UpdateMode::Replace => {
                if let Some(groupmod) = group::groupmod(plan.groupname, Some(new_name)) {
                    script.privileged(groupmod);
                }
                self.push_grant_permissions(&mut script, &ObjectClass::Group, new_name, plan.attributes)?;
            }
            UpdateMode::RemoveValues => {
                if plan.attributes.contains(names::PERMISSIONS) {
                    let path = self.permission_file(&ObjectClass::Group, new_name)?;
                    script.privileged(file::remove_file(&path));
                }
            }
        }

        Ok(script.build())
    }

    pub fn delete_group(&self, groupname: &str) -> Result<CommandString> {
        let mut script = self.script();
        script.privileged(group::groupdel(groupname));
        script.privileged(file::remove_file(
            &self.permission_file(&ObjectClass::Group, groupname)?,
        ));
        Ok(script.finish())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ConnectorConfig;
    use crate::parser::AccountRow;

    const PRIMING: &str = "echo 'hunter2' | sudo -S -p '' -v";

    fn sudo_config() -> ConnectorConfig {
        let mut config = ConnectorConfig::default();
        config.elevation.sudo_password = Some(GuardedString::new("hunter2"));
        config
    }

    fn root_config() -> ConnectorConfig {
        let mut config = ConnectorConfig::default();
        config.elevation.root = true;
        config
    }

    fn svc1_row() -> AccountRow {
        AccountRow {
            username: "svc1".to_string(),
            uid: 1001,
            gid: 1001,
            comment: String::new(),
            home_directory: "/home/svc1".to_string(),
            shell: "/bin/bash".to_string(),
        }
    }

    fn priming_count(command: &CommandString) -> usize {
        command.as_str().matches(PRIMING).count()
    }

    #[test]
    fn test_create_account_root() {
        let config = root_config();
        let generator = CommandGenerator::new(&config);
        let attributes = AttributeSet::new()
            .with("homeDirectory", "/home/svc1")
            .with("shell", "/bin/bash")
            .with_values(names::GROUPS, ["ops"]);

        let command = generator.create_account("svc1", &attributes).unwrap();
        assert_eq!(
            command.as_str(),
            "useradd -d /home/svc1 -s /bin/bash -G ops -m svc1"
        );
        assert_eq!(command.mode(), ChannelMode::Exec);
    }

    #[test]
    fn test_create_account_uses_default_shell() {
        let mut config = root_config();
        config.accounts.default_shell = Some("/bin/sh".to_string());
        let generator = CommandGenerator::new(&config);

        let command = generator.create_account("svc1", &AttributeSet::new()).unwrap();
        assert_eq!(command.as_str(), "useradd -s /bin/sh -m svc1");
    }

    #[test]
    fn test_create_account_with_key_and_permissions() {
        let config = sudo_config();
        let generator = CommandGenerator::new(&config);
        let attributes = AttributeSet::new()
            .with(names::PUBLIC_KEY, "ssh-ed25519 AAAA svc1@laptop")
            .with(names::PERMISSIONS, "ALL=(ALL) NOPASSWD: ALL");

        let command = generator.create_account("svc1", &attributes).unwrap();
        let text = command.as_str();

        assert_eq!(priming_count(&command), 1);
        assert!(text.starts_with("sudo -k; echo 'hunter2' | sudo -S -p '' -v; sudo useradd -m svc1; "));
        assert!(text.contains(
            "echo 'ssh-ed25519 AAAA svc1@laptop' | sudo tee /home/svc1/.ssh/authorized_keys > /dev/null"
        ));
        assert!(text.contains("sudo chown -R svc1: /home/svc1/.ssh"));
        assert!(text.contains("sudo chmod 700 /home/svc1/.ssh"));
        assert!(text.contains("sudo chmod 600 /home/svc1/.ssh/authorized_keys"));
        assert!(text.contains(
            "echo 'svc1 ALL=(ALL) NOPASSWD: ALL' | sudo tee /etc/sudoers.d/svc1_user > /dev/null; sudo chmod 0440 /etc/sudoers.d/svc1_user"
        ));
        assert_eq!(command.mode(), ChannelMode::Interactive);
        assert!(!command.to_string().contains("hunter2"));
    }

    #[test]
    fn test_every_privileged_operation_primes_exactly_once() {
        let config = sudo_config();
        let generator = CommandGenerator::new(&config);
        let attributes = AttributeSet::new().with(names::LOCK_OUT, true);
        let date = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();

        let commands = vec![
            generator.create_account("svc1", &attributes).unwrap(),
            generator.delete_account("svc1").unwrap(),
            generator.create_group("ops", &AttributeSet::new()).unwrap(),
            generator.delete_group("ops").unwrap(),
            generator.set_password("svc1", &GuardedString::new("pw")),
            generator.reset_password("svc1"),
            generator.lock_account("svc1"),
            generator.unlock_account("svc1"),
            generator.enable_account("svc1"),
            generator.disable_account("svc1", date),
            generator.create_key_directory("svc1", "/home/svc1"),
            generator.remove_key_directory("/home/svc1"),
            generator.set_public_key("svc1", "/home/svc1", "ssh-ed25519 AAAA"),
            generator.remove_public_key("/home/svc1"),
            generator.grant_permissions(&ObjectClass::Group, "ops", "ALL=(ALL) ALL").unwrap(),
            generator.revoke_permissions(&ObjectClass::Account, "svc1").unwrap(),
            generator.rename_primary_group("svc1", "svc2"),
            generator.move_home_directory("/home/svc1", "/home/svc2"),
            generator.user_status("svc1"),
            generator.activation("svc1", &attributes).unwrap().unwrap(),
        ];
        for command in &commands {
            assert_eq!(priming_count(command), 1, "{command}");
        }

        let config = root_config();
        let generator = CommandGenerator::new(&config);
        for command in [
            generator.create_account("svc1", &attributes).unwrap(),
            generator.set_password("svc1", &GuardedString::new("pw")),
            generator.delete_group("ops").unwrap(),
        ] {
            assert_eq!(priming_count(&command), 0);
            assert!(!command.as_str().contains("sudo "), "{command}");
            assert!(!command.as_str().contains("sudo -k"), "{command}");
        }
    }

    #[test]
    fn test_set_password_pipes_into_chpasswd() {
        let config = root_config();
        let generator = CommandGenerator::new(&config);
        let command = generator.set_password("svc1", &GuardedString::new("s3cret"));

        assert_eq!(command.as_str(), "echo 'svc1:s3cret' | chpasswd");
        assert_eq!(command.mode(), ChannelMode::Interactive);
        assert_eq!(command.to_string(), "echo '********' | chpasswd");
    }

    #[test]
    fn test_composition_is_deterministic() {
        let config = sudo_config();
        let attributes = AttributeSet::new()
            .with("homeDirectory", "/srv/svc1")
            .with("comment", "Build Bot")
            .with_values(names::GROUPS, ["ops", "wheel"])
            .with(names::ENABLE, false);

        let first = CommandGenerator::new(&config)
            .create_account("svc1", &attributes)
            .unwrap();
        let second = CommandGenerator::new(&config)
            .create_account("svc1", &attributes)
            .unwrap();
        assert_eq!(first.as_str(), second.as_str());
    }

    #[test]
    fn test_activation() {
        let config = root_config();
        let generator = CommandGenerator::new(&config);

        let disable = AttributeSet::new()
            .with(names::ENABLE, false)
            .with(names::LOCK_OUT, false);
        assert_eq!(
            generator.activation("svc1", &disable).unwrap().unwrap().as_str(),
            "usermod -e 1970-01-02 svc1; usermod -U svc1"
        );

        let scheduled = AttributeSet::new().with(names::DISABLE_DATE, "19723");
        assert_eq!(
            generator.activation("svc1", &scheduled).unwrap().unwrap().as_str(),
            "usermod -e 2024-01-01 svc1"
        );

        let enable = AttributeSet::new().with(names::ENABLE, "true");
        assert_eq!(
            generator.activation("svc1", &enable).unwrap().unwrap().as_str(),
            "usermod -e '' svc1"
        );

        assert!(generator.activation("svc1", &AttributeSet::new()).unwrap().is_none());

        let invalid = AttributeSet::new().with(names::DISABLE_DATE, "soon");
        assert!(matches!(
            generator.activation("svc1", &invalid),
            Err(ConnectorError::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_update_rename_orders_fragments() {
        let config = root_config();
        let generator = CommandGenerator::new(&config);
        let attributes = AttributeSet::new()
            .with(names::NAME, "svc2")
            .with("homeDirectory", "/home/svc2")
            .with(names::LOCK_OUT, true);
        let row = svc1_row();
        let plan = AccountUpdate {
            username: "svc1",
            attributes: &attributes,
            mode: UpdateMode::Replace,
            current_groups: &[],
            current_row: Some(&row),
        };

        let command = generator.update_account(&plan).unwrap().unwrap();
        assert_eq!(
            command.as_str(),
            "usermod -d /home/svc2 -l svc2 svc1; \
             usermod -L svc2; \
             mv /home/svc1 /home/svc2; \
             groupmod -n svc2 svc1"
        );
    }

    #[test]
    fn test_update_rename_requires_current_row() {
        let config = root_config();
        let generator = CommandGenerator::new(&config);
        let attributes = AttributeSet::new().with(names::NAME, "svc2");
        let plan = AccountUpdate {
            username: "svc1",
            attributes: &attributes,
            mode: UpdateMode::Replace,
            current_groups: &[],
            current_row: None,
        };

        assert!(matches!(
            generator.update_account(&plan),
            Err(ConnectorError::UnknownUid(uid)) if uid == "svc1"
        ));
    }

    #[test]
    fn test_remove_values_drops_unlisted_memberships_first() {
        let config = root_config();
        let generator = CommandGenerator::new(&config);
        let attributes = AttributeSet::new()
            .with(names::NAME, "svc2")
            .with_values(names::GROUPS, ["ops"]);
        let current = vec!["ops".to_string(), "wheel".to_string(), "docker".to_string()];
        let row = svc1_row();
        let plan = AccountUpdate {
            username: "svc1",
            attributes: &attributes,
            mode: UpdateMode::RemoveValues,
            current_groups: &current,
            current_row: Some(&row),
        };

        let command = generator.update_account(&plan).unwrap().unwrap();
        assert_eq!(
            command.as_str(),
            "gpasswd -d svc1 wheel; gpasswd -d svc1 docker; \
             usermod -l svc2 svc1; \
             groupmod -n svc2 svc1"
        );
    }

    #[test]
    fn test_remove_values_revokes_key_and_permissions() {
        let config = root_config();
        let generator = CommandGenerator::new(&config);
        let attributes = AttributeSet::new()
            .with_values(names::PUBLIC_KEY, Vec::<String>::new())
            .with(names::PERMISSIONS, "ALL=(ALL) ALL");
        let plan = AccountUpdate {
            username: "svc1",
            attributes: &attributes,
            mode: UpdateMode::RemoveValues,
            current_groups: &[],
            current_row: None,
        };

        let command = generator.update_account(&plan).unwrap().unwrap();
        assert_eq!(
            command.as_str(),
            "rm -f /home/svc1/.ssh/authorized_keys; rm -f /etc/sudoers.d/svc1_user"
        );
    }

    #[test]
    fn test_update_with_nothing_to_do() {
        let config = sudo_config();
        let generator = CommandGenerator::new(&config);
        let attributes = AttributeSet::new().with(names::NAME, "svc1");
        let plan = AccountUpdate {
            username: "svc1",
            attributes: &attributes,
            mode: UpdateMode::Replace,
            current_groups: &[],
            current_row: None,
        };
        assert!(generator.update_account(&plan).unwrap().is_none());
    }

    #[test]
    fn test_groups() {
        let config = root_config();
        let generator = CommandGenerator::new(&config);
        let attributes = AttributeSet::new().with(names::PERMISSIONS, "ALL=(ALL) ALL");

        assert_eq!(
            generator.create_group("ops", &attributes).unwrap().as_str(),
            "groupadd ops; \
             echo '%ops ALL=(ALL) ALL' | tee /etc/sudoers.d/ops_group > /dev/null; \
             chmod 0440 /etc/sudoers.d/ops_group"
        );

        let renamed = AttributeSet::new().with(names::NAME, "sre");
        let plan = GroupUpdate {
            groupname: "ops",
            attributes: &renamed,
            mode: UpdateMode::Replace,
        };
        assert_eq!(
            generator.update_group(&plan).unwrap().unwrap().as_str(),
            "groupmod -n sre ops"
        );

        assert_eq!(
            generator.delete_group("ops").unwrap().as_str(),
            "groupdel ops; rm -f /etc/sudoers.d/ops_group"
        );
    }

    #[test]
    fn test_unsupported_object_class() {
        let config = root_config();
        let generator = CommandGenerator::new(&config);
        let other = ObjectClass::Other("__PRINTER__".to_string());

        assert!(matches!(
            generator.lookup(&other, "x"),
            Err(ConnectorError::UnsupportedObjectClass(_))
        ));
        assert!(matches!(
            generator.dump(&other),
            Err(ConnectorError::UnsupportedObjectClass(_))
        ));
        assert!(matches!(
            generator.grant_permissions(&other, "x", "ALL"),
            Err(ConnectorError::UnsupportedObjectClass(_))
        ));
    }

    #[test]
    fn test_lookups_need_no_elevation() {
        let config = sudo_config();
        let generator = CommandGenerator::new(&config);

        assert_eq!(generator.user_exists("svc1").as_str(), "getent passwd svc1");
        assert_eq!(generator.search_all_groups().as_str(), "getent group");
        assert_eq!(
            generator.user_groups("svc1").as_str(),
            "getent group | grep -w -- svc1"
        );
        assert_eq!(
            generator.test_connection().as_str(),
            "sudo -k; echo 'hunter2' | sudo -S -p '' -v; sudo true; echo unixprov-ready"
        );
    }
}
