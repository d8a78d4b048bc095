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

//! Password primitives.
//!
//! Setting a password pipes `name:password` into `chpasswd`, so the
//! password never appears in any process argument list.

use zeroize::Zeroizing;

use super::join_words;
use crate::utils::shell::{quote, single_quote};

pub const CHPASSWD_COMMAND: &str = "chpasswd";

const PASSWD_COMMAND: &str = "passwd";
const DELETE_OPTION: &str = "-d";

/// The quoted `echo` payload for [`CHPASSWD_COMMAND`].
pub fn chpasswd_payload(username: &str, password: &str) -> Zeroizing<String> {
    let line = Zeroizing::new(format!("{username}:{password}"));
    Zeroizing::new(single_quote(&line))
}

/// Remove the password, leaving the account passwordless.
pub fn reset(username: &str) -> String {
    join_words([PASSWD_COMMAND, DELETE_OPTION, &*quote(username)])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chpasswd_payload() {
        assert_eq!(*chpasswd_payload("svc1", "s3cret"), "'svc1:s3cret'");
        assert_eq!(*chpasswd_payload("svc1", "it's"), r"'svc1:it'\''s'");
    }

    #[test]
    fn test_reset() {
        assert_eq!(reset("svc1"), "passwd -d svc1");
    }
}
