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

//! Group primitives: `groupadd`, `groupmod`, `groupdel`.

use super::join_words;
use crate::utils::shell::quote;

const GROUPADD_COMMAND: &str = "groupadd";
const GROUPMOD_COMMAND: &str = "groupmod";
const GROUPDEL_COMMAND: &str = "groupdel";
const NEW_NAME_OPTION: &str = "-n";

pub fn groupadd(groupname: &str) -> String {
    join_words([GROUPADD_COMMAND, &*quote(groupname)])
}

/// `groupmod -n <new> <old>`, `None` when the name does not change.
pub fn groupmod(groupname: &str, new_name: Option<&str>) -> Option<String> {
    let new_name = new_name.filter(|n| *n != groupname)?;
    Some(rename(groupname, new_name))
}

/// Rename a group. Also used for the primary group of a renamed account.
pub fn rename(old_name: &str, new_name: &str) -> String {
    join_words([
        GROUPMOD_COMMAND,
        NEW_NAME_OPTION,
        &*quote(new_name),
        &*quote(old_name),
    ])
}

pub fn groupdel(groupname: &str) -> String {
    join_words([GROUPDEL_COMMAND, &*quote(groupname)])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_group_primitives() {
        assert_eq!(groupadd("ops"), "groupadd ops");
        assert_eq!(groupdel("ops"), "groupdel ops");
        assert_eq!(rename("svc1", "svc2"), "groupmod -n svc2 svc1");
    }

    #[test]
    fn test_groupmod_same_name_is_noop() {
        assert_eq!(groupmod("ops", None), None);
        assert_eq!(groupmod("ops", Some("ops")), None);
        assert_eq!(
            groupmod("ops", Some("sre")).as_deref(),
            Some("groupmod -n sre ops")
        );
    }
}
