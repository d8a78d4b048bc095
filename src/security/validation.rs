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

//! Caller-contract checks applied before any command is composed.
//!
//! Names and paths end up inside shell text, so anything outside the POSIX
//! portable character set is rejected up front instead of being quoted and
//! hoped for the best.

use crate::error::{ConnectorError, Result};

/// Maximum length accepted by `useradd`/`groupadd` on common distributions.
const MAX_NAME_LENGTH: usize = 32;

const MAX_PATH_LENGTH: usize = 4096;

/// Validate an account or group name.
///
/// Allows alphanumerics, underscore, hyphen and dot, a trailing `$` (Samba
/// machine accounts), and rejects a leading hyphen.
pub fn validate_principal_name(field: &str, name: &str) -> Result<()> {
    if name.trim().is_empty() {
        return Err(ConnectorError::invalid_argument(format!(
            "{field} cannot be empty"
        )));
    }

    if name.len() > MAX_NAME_LENGTH {
        return Err(ConnectorError::invalid_argument(format!(
            "{field} too long (max {MAX_NAME_LENGTH} characters)"
        )));
    }

    let body = name.strip_suffix('$').unwrap_or(name);
    let valid_chars = body
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-' || c == '.');
    if !valid_chars || body.is_empty() {
        return Err(ConnectorError::invalid_argument(format!(
            "{field} '{name}' contains invalid characters"
        )));
    }

    if name.starts_with('-') {
        return Err(ConnectorError::invalid_argument(format!(
            "{field} cannot start with a hyphen"
        )));
    }

    Ok(())
}

/// Validate an absolute remote path such as a home directory.
pub fn validate_remote_path(field: &str, path: &str) -> Result<()> {
    if !path.starts_with('/') {
        return Err(ConnectorError::invalid_argument(format!(
            "{field} must be an absolute path"
        )));
    }

    if path.len() > MAX_PATH_LENGTH {
        return Err(ConnectorError::invalid_argument(format!(
            "{field} too long (max {MAX_PATH_LENGTH} characters)"
        )));
    }

    if path
        .split('/')
        .any(|segment| segment == "..")
    {
        return Err(ConnectorError::invalid_argument(format!(
            "{field} contains path traversal sequence"
        )));
    }

    let valid_chars = path
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '/' | '.' | '-' | '_' | '@' | '+'));
    if !valid_chars {
        return Err(ConnectorError::invalid_argument(format!(
            "{field} contains invalid characters"
        )));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_principal_name() {
        assert!(validate_principal_name("name", "svc1").is_ok());
        assert!(validate_principal_name("name", "first.last").is_ok());
        assert!(validate_principal_name("name", "host$").is_ok());

        assert!(validate_principal_name("name", "").is_err());
        assert!(validate_principal_name("name", "-rf").is_err());
        assert!(validate_principal_name("name", "a;b").is_err());
        assert!(validate_principal_name("name", "$").is_err());
        assert!(validate_principal_name("name", &"x".repeat(33)).is_err());
    }

    #[test]
    fn test_validate_remote_path() {
        assert!(validate_remote_path("home", "/home/svc1").is_ok());
        assert!(validate_remote_path("home", "/srv/users/a.b-c").is_ok());

        assert!(validate_remote_path("home", "home/svc1").is_err());
        assert!(validate_remote_path("home", "/home/../etc").is_err());
        assert!(validate_remote_path("home", "/home/$(id)").is_err());
        assert!(validate_remote_path("home", "/home/a b").is_err());
    }
}
