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

//! Sudoers drop-in files written for elevated-command permissions.

/// The rule granted to `principal`, stripped of the leading principal word
/// (`svc1` or `%ops`). `None` when the file was empty or absent.
pub fn parse_rule(output: &str, principal: &str) -> Option<String> {
    let line = output
        .lines()
        .map(str::trim)
        .find(|line| !line.is_empty() && !line.starts_with('#'))?;

    let mut words = line.splitn(2, char::is_whitespace);
    let rule = match words.next() {
        Some(head) if head.trim_start_matches('%') == principal => {
            words.next().unwrap_or_default().trim()
        }
        _ => line,
    };
    (!rule.is_empty()).then(|| rule.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_rule() {
        assert_eq!(
            parse_rule("svc1 ALL=(ALL) NOPASSWD: ALL\n", "svc1").as_deref(),
            Some("ALL=(ALL) NOPASSWD: ALL")
        );
        assert_eq!(
            parse_rule("%ops ALL=(ALL) ALL\n", "ops").as_deref(),
            Some("ALL=(ALL) ALL")
        );
        assert_eq!(parse_rule("", "svc1"), None);
        assert_eq!(parse_rule("svc1\n", "svc1"), None);
        assert_eq!(parse_rule("%ops   \n", "ops"), None);
    }
}
