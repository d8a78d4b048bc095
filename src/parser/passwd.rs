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

const PASSWD_FIELDS: usize = 7;

/// One line of the account database.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccountRow {
    pub username: String,
    pub uid: u32,
    pub gid: u32,
    pub comment: String,
    pub home_directory: String,
    pub shell: String,
}

impl FromStr for AccountRow {
    type Err = ParseError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let fields = split_fields(line, PASSWD_FIELDS)?;
        if fields[0].is_empty() {
            return Err(ParseError::new("empty username"));
        }
        Ok(Self {
            username: fields[0].to_string(),
            uid: parse_id("uid", fields[2])?,
            gid: parse_id("gid", fields[3])?,
            comment: fields[4].to_string(),
            home_directory: fields[5].to_string(),
            shell: fields[6].to_string(),
        })
    }
}

impl AccountRow {
    /// The row as a database line, password field shadowed.
    pub fn to_line(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for AccountRow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:x:{}:{}:{}:{}:{}",
            self.username, self.uid, self.gid, self.comment, self.home_directory, self.shell
        )
    }
}

/// Parsed account database dump, in source order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PasswdFile {
    rows: Vec<AccountRow>,
}

impl PasswdFile {
    pub fn parse(output: &str) -> Self {
        Self {
            rows: parse_lines(output, |line| line.parse()),
        }
    }

    pub fn rows(&self) -> &[AccountRow] {
        &self.rows
    }

    pub fn into_rows(self) -> Vec<AccountRow> {
        self.rows
    }

    pub fn find(&self, username: &str) -> Option<&AccountRow> {
        self.rows.iter().find(|row| row.username == username)
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}
