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

//! Account primitives: `useradd`, `usermod`, `userdel`, `gpasswd`.

use super::join_words;
use crate::config::AttributeNames;
use crate::model::{names, AttributeSet};
use crate::utils::shell::quote;

const USERADD_COMMAND: &str = "useradd";
const USERMOD_COMMAND: &str = "usermod";
const USERDEL_COMMAND: &str = "userdel";
const GPASSWD_COMMAND: &str = "gpasswd";

const HOME_DIRECTORY_OPTION: &str = "-d";
const SHELL_OPTION: &str = "-s";
const GROUPS_OPTION: &str = "-G";
const COMMENT_OPTION: &str = "-c";
const CREATE_HOME_OPTION: &str = "-m";
const NEW_LOGIN_OPTION: &str = "-l";
const REMOVE_HOME_OPTION: &str = "-r";
const LOCK_OPTION: &str = "-L";
const UNLOCK_OPTION: &str = "-U";
const EXPIRE_OPTION: &str = "-e";
const DELETE_MEMBER_OPTION: &str = "-d";

/// The passwd fields an account request may carry.
///
/// Absent and empty are the same: neither emits a flag.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserOptions {
    pub home_directory: Option<String>,
    pub shell: Option<String>,
    pub comment: Option<String>,
    pub groups: Vec<String>,
}

impl UserOptions {
    pub fn from_attributes(attributes: &AttributeSet, attribute_names: &AttributeNames) -> Self {
        Self {
            home_directory: attributes
                .string(&attribute_names.home_directory)
                .map(str::to_string),
            shell: attributes.string(&attribute_names.shell).map(str::to_string),
            comment: attributes
                .string(&attribute_names.comment)
                .map(str::to_string),
            groups: attributes
                .strings(names::GROUPS)
                .into_iter()
                .map(str::to_string)
                .collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.home_directory.is_none()
            && self.shell.is_none()
            && self.comment.is_none()
            && self.groups.is_empty()
    }

    fn push_flags(&self, words: &mut Vec<String>, with_groups: bool) {
        if let Some(home) = &self.home_directory {
            words.push(HOME_DIRECTORY_OPTION.to_string());
            words.push(quote(home).into_owned());
        }
        if let Some(shell) = &self.shell {
            words.push(SHELL_OPTION.to_string());
            words.push(quote(shell).into_owned());
        }
        if with_groups && !self.groups.is_empty() {
            words.push(GROUPS_OPTION.to_string());
            words.push(quote(&self.groups.join(",")).into_owned());
        }
        if let Some(comment) = &self.comment {
            words.push(COMMENT_OPTION.to_string());
            words.push(quote(comment).into_owned());
        }
    }
}

/// `useradd -d <home> -s <shell> -G <g1,g2> -c <comment> [-m] <name>`
pub fn useradd(username: &str, options: &UserOptions, create_home: bool) -> String {
    let mut words = vec![USERADD_COMMAND.to_string()];
    options.push_flags(&mut words, true);
    if create_home {
        words.push(CREATE_HOME_OPTION.to_string());
    }
    words.push(quote(username).into_owned());
    join_words(words)
}

/// `usermod` with only the flags that change something.
///
/// `set_groups` controls whether `-G` is emitted; it replaces the whole
/// supplementary list, which is wrong when values are being removed.
/// Returns `None` when no flag would be emitted.
pub fn usermod(
    username: &str,
    options: &UserOptions,
    new_name: Option<&str>,
    set_groups: bool,
) -> Option<String> {
    let mut words = vec![USERMOD_COMMAND.to_string()];
    options.push_flags(&mut words, set_groups);
    if let Some(new_name) = new_name.filter(|n| *n != username) {
        words.push(NEW_LOGIN_OPTION.to_string());
        words.push(quote(new_name).into_owned());
    }
    if words.len() == 1 {
        return None;
    }
    words.push(quote(username).into_owned());
    Some(join_words(words))
}

pub fn userdel(username: &str, remove_home: bool) -> String {
    let mut words = vec![USERDEL_COMMAND];
    if remove_home {
        words.push(REMOVE_HOME_OPTION);
    }
    let username = quote(username);
    words.push(&username);
    join_words(words)
}

pub fn lock(username: &str) -> String {
    join_words([USERMOD_COMMAND, LOCK_OPTION, &*quote(username)])
}

pub fn unlock(username: &str) -> String {
    join_words([USERMOD_COMMAND, UNLOCK_OPTION, &*quote(username)])
}

/// Set the account expiry date (`YYYY-MM-DD`).
pub fn expire(username: &str, date: &str) -> String {
    join_words([USERMOD_COMMAND, EXPIRE_OPTION, &*quote(date), &*quote(username)])
}

/// Clear the account expiry date.
pub fn clear_expiry(username: &str) -> String {
    expire(username, "")
}

/// `gpasswd -d <user> <group>`
pub fn remove_from_group(username: &str, group: &str) -> String {
    join_words([
        GPASSWD_COMMAND,
        DELETE_MEMBER_OPTION,
        &*quote(username),
        &*quote(group),
    ])
}

#[cfg(test)]
mod tests {
    use super::*;

    fn options() -> UserOptions {
        UserOptions {
            home_directory: Some("/home/svc1".to_string()),
            shell: Some("/bin/bash".to_string()),
            comment: None,
            groups: vec!["ops".to_string(), "wheel".to_string()],
        }
    }

    #[test]
    fn test_useradd_flag_order() {
        assert_eq!(
            useradd("svc1", &options(), true),
            "useradd -d /home/svc1 -s /bin/bash -G ops,wheel -m svc1"
        );
    }

    #[test]
    fn test_useradd_without_attributes() {
        assert_eq!(useradd("svc1", &UserOptions::default(), false), "useradd svc1");
    }

    #[test]
    fn test_comment_is_quoted() {
        let options = UserOptions {
            comment: Some("Build Bot".to_string()),
            ..UserOptions::default()
        };
        assert_eq!(
            useradd("bot", &options, false),
            "useradd -c 'Build Bot' bot"
        );
    }

    #[test]
    fn test_from_attributes_uses_configured_names() {
        let names = AttributeNames::default();
        let attributes = AttributeSet::new()
            .with("homeDirectory", "/srv/svc1")
            .with("shell", "")
            .with_values(names::GROUPS, Vec::<String>::new());
        let options = UserOptions::from_attributes(&attributes, &names);

        assert_eq!(options.home_directory.as_deref(), Some("/srv/svc1"));
        assert_eq!(options.shell, None);
        assert!(options.groups.is_empty());
    }

    #[test]
    fn test_usermod() {
        assert_eq!(
            usermod("svc1", &options(), Some("svc2"), true).as_deref(),
            Some("usermod -d /home/svc1 -s /bin/bash -G ops,wheel -l svc2 svc1")
        );
        assert_eq!(
            usermod("svc1", &options(), None, false).as_deref(),
            Some("usermod -d /home/svc1 -s /bin/bash svc1")
        );
    }

    #[test]
    fn test_usermod_nothing_to_change() {
        assert_eq!(usermod("svc1", &UserOptions::default(), None, true), None);
        assert_eq!(
            usermod("svc1", &UserOptions::default(), Some("svc1"), true),
            None
        );
        let groups_only = UserOptions {
            groups: vec!["ops".to_string()],
            ..UserOptions::default()
        };
        assert_eq!(usermod("svc1", &groups_only, None, false), None);
    }

    #[test]
    fn test_status_primitives() {
        assert_eq!(userdel("svc1", true), "userdel -r svc1");
        assert_eq!(userdel("svc1", false), "userdel svc1");
        assert_eq!(lock("svc1"), "usermod -L svc1");
        assert_eq!(unlock("svc1"), "usermod -U svc1");
        assert_eq!(expire("svc1", "1970-01-02"), "usermod -e 1970-01-02 svc1");
        assert_eq!(clear_expiry("svc1"), "usermod -e '' svc1");
        assert_eq!(remove_from_group("svc1", "ops"), "gpasswd -d svc1 ops");
    }
}
