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

//! File primitives used for key directories and sudoers drop-ins.

use super::join_words;
use crate::utils::shell::quote;

/// `tee <path> > /dev/null`, the target of an `echo ... |` pipe.
pub fn tee(path: &str) -> String {
    join_words(["tee", &*quote(path), ">", "/dev/null"])
}

pub fn mkdir(path: &str) -> String {
    join_words(["mkdir", "-p", &*quote(path)])
}

/// Recursively hand a path to an account and its login group.
pub fn chown(owner: &str, path: &str) -> String {
    join_words(["chown", "-R", &*format!("{}:", quote(owner)), &*quote(path)])
}

pub fn chmod(mode: &str, path: &str) -> String {
    join_words(["chmod", &*quote(mode), &*quote(path)])
}

pub fn remove_file(path: &str) -> String {
    join_words(["rm", "-f", &*quote(path)])
}

pub fn remove_dir(path: &str) -> String {
    join_words(["rm", "-rf", &*quote(path)])
}

pub fn mv(from: &str, to: &str) -> String {
    join_words(["mv", &*quote(from), &*quote(to)])
}

/// Print a file, silent when it does not exist.
pub fn cat(path: &str) -> String {
    join_words(["cat", &*quote(path), "2>/dev/null"])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_primitives() {
        assert_eq!(
            tee("/home/svc1/.ssh/authorized_keys"),
            "tee /home/svc1/.ssh/authorized_keys > /dev/null"
        );
        assert_eq!(mkdir("/home/svc1/.ssh"), "mkdir -p /home/svc1/.ssh");
        assert_eq!(chown("svc1", "/home/svc1/.ssh"), "chown -R svc1: /home/svc1/.ssh");
        assert_eq!(chmod("700", "/home/svc1/.ssh"), "chmod 700 /home/svc1/.ssh");
        assert_eq!(remove_file("/etc/sudoers.d/svc1_user"), "rm -f /etc/sudoers.d/svc1_user");
        assert_eq!(remove_dir("/home/svc1/.ssh"), "rm -rf /home/svc1/.ssh");
        assert_eq!(mv("/home/svc1", "/home/svc2"), "mv /home/svc1 /home/svc2");
        assert_eq!(cat("/etc/sudoers.d/svc1_user"), "cat /etc/sudoers.d/svc1_user 2>/dev/null");
    }
}
