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

use std::fmt;
use std::str::FromStr;

use super::{parse_id, parse_lines, split_fields, ParseError};

const GROUP_FIELDS: usize = 4;

/// One line of the group database.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupRow {
    pub groupname: String,
    pub gid: u32,
    pub members: Vec<String>,
}

impl FromStr for GroupRow {
    type Err = ParseError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let fields = split_fields(line, GROUP_FIELDS)?;
        if fields[0].is_empty() {
            return Err(ParseError::new("empty group name"));
        }
        Ok(Self {
            groupname: fields[0].to_string(),
            gid: parse_id("gid", fields[2])?,
            members: fields[3]
                .split(',')
                .filter(|m| !m.is_empty())
                .map(str::to_string)
                .collect(),
        })
    }
}

impl GroupRow {
    pub fn to_line(&self) -> String {
        self.to_string()
    }

    pub fn has_member(&self, username: &str) -> bool {
        self.members.iter().any(|m| m == username)
    }
}

impl fmt::Display for GroupRow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:x:{}:{}",
            self.groupname,
            self.gid,
            self.members.join(",")
        )
    }
}

/// Parsed group database dump, in source order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GroupFile {
    rows: Vec<GroupRow>,
}

impl GroupFile {
    pub fn parse(output: &str) -> Self {
        Self {
            rows: parse_lines(output, |line| line.parse()),
        }
    }

    pub fn rows(&self) -> &[GroupRow] {
        &self.rows
    }

    pub fn into_rows(self) -> Vec<GroupRow> {
        self.rows
    }

    pub fn find(&self, groupname: &str) -> Option<&GroupRow> {
        self.rows.iter().find(|row| row.groupname == groupname)
    }

    /// Supplementary groups listing the account as a member.
    pub fn groups_of(&self, username: &str) -> Vec<String> {
        self.rows
            .iter()
            .filter(|row| row.has_member(username))
            .map(|row| row.groupname.clone())
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_members() {
        let row: GroupRow = "ops:x:2000:alice,bob".parse().unwrap();
        assert_eq!(row.groupname, "ops");
        assert_eq!(row.gid, 2000);
        assert_eq!(row.members, ["alice", "bob"]);

        let row: GroupRow = "svc1:x:1001:".parse().unwrap();
        assert!(row.members.is_empty());
    }

    #[test]
    fn test_line_round_trip() {
        for line in ["ops:x:2000:alice,bob", "empty:x:3000:"] {
            let row: GroupRow = line.parse().unwrap();
            assert_eq!(row.to_line(), line);
            assert_eq!(row.to_line().parse::<GroupRow>().unwrap(), row);
        }
    }

    #[test]
    fn test_groups_of_matches_exact_members() {
        // What `grep -w svc1` lets through: the account's own group and a
        // hyphenated neighbour.
        let output = "svc1:x:1001:\nops:x:2000:alice,svc1\nsvc1-admins:x:2001:svc1-bot\n";
        let file = GroupFile::parse(output);
        assert_eq!(file.groups_of("svc1"), ["ops"]);
    }

    #[test]
    fn test_wrong_field_count() {
        let err = "ops:x:2000".parse::<GroupRow>().unwrap_err();
        assert_eq!(err.reason, "expected 4 fields, found 3");
    }
}
