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

//! Read-only lookups against the host databases.

use super::join_words;
use crate::utils::shell::quote;

const GETENT_COMMAND: &str = "getent";
const PASSWD_DATABASE: &str = "passwd";
const GROUP_DATABASE: &str = "group";
const SHADOW_DATABASE: &str = "shadow";

/// One passwd entry; prints nothing when the account does not exist.
pub fn passwd_entry(username: &str) -> String {
    join_words([GETENT_COMMAND, PASSWD_DATABASE, &*quote(username)])
}

pub fn passwd_dump() -> String {
    join_words([GETENT_COMMAND, PASSWD_DATABASE])
}

pub fn group_entry(groupname: &str) -> String {
    join_words([GETENT_COMMAND, GROUP_DATABASE, &*quote(groupname)])
}

pub fn group_dump() -> String {
    join_words([GETENT_COMMAND, GROUP_DATABASE])
}

/// The shadow entry carrying lock and expiry state.
pub fn shadow_entry(username: &str) -> String {
    join_words([GETENT_COMMAND, SHADOW_DATABASE, &*quote(username)])
}

/// Group lines mentioning the account as a word.
///
/// `grep -w` also matches group names and partial hits across `-`, so the
/// output must still be filtered on the parsed member list.
pub fn groups_for_user(username: &str) -> String {
    format!(
        "{} | grep -w -- {}",
        group_dump(),
        quote(username)
    )
}

/// Confirmation echo for the connection test.
pub fn echo(marker: &str) -> String {
    join_words(["echo", &*quote(marker)])
}
