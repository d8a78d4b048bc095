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

use super::tokio_client::ServerCheckMethod;
use directories::BaseDirs;
use std::path::PathBuf;

/// Get the default known_hosts file path
pub fn get_default_known_hosts_path() -> Option<PathBuf> {
    BaseDirs::new().map(|dirs| dirs.home_dir().join(".ssh").join("known_hosts"))
}

/// Create a ServerCheckMethod from the strict host key checking flag.
///
/// Strict mode requires a readable known_hosts file; connecting to a host
/// without one fails instead of silently trusting the server.
pub fn get_check_method(strict: bool) -> ServerCheckMethod {
    if !strict {
        tracing::debug!("Host key checking disabled");
        return ServerCheckMethod::NoCheck;
    }

    match get_default_known_hosts_path() {
        Some(path) if path.exists() => {
            tracing::debug!("Using known_hosts file: {:?} (strict mode)", path);
            ServerCheckMethod::KnownHostsFile(path)
        }
        Some(path) => {
            tracing::warn!(
                "Known hosts file not found at {:?}; unknown host keys will be rejected",
                path
            );
            ServerCheckMethod::DefaultKnownHostsFile
        }
        None => {
            tracing::warn!("Could not determine known_hosts path");
            ServerCheckMethod::DefaultKnownHostsFile
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_non_strict_is_no_check() {
        assert_eq!(get_check_method(false), ServerCheckMethod::NoCheck);
    }

    #[test]
    fn test_strict_never_disables_checking() {
        assert_ne!(get_check_method(true), ServerCheckMethod::NoCheck);
    }
}
