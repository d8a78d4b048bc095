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

//! Parsers for colon-delimited host database output.
//!
//! Rows are rebuilt from freshly fetched text on every call and never
//! cached. A malformed line is skipped with a warning; it does not abort the
//! rest of the dump.

mod group;
mod passwd;
mod shadow;
mod sudoers;

pub use group::{GroupFile, GroupRow};
pub use passwd::{AccountRow, PasswdFile};
pub use shadow::{format_date, parse_disable_date, AccountStatus, Expiry, ShadowRow};
pub use sudoers::parse_rule;

use thiserror::Error;

/// A line that does not have the expected shape.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("line {line}: {reason}")]
pub struct ParseError {
    /// 1-based line number within the parsed output, 0 for a standalone line.
    pub line: usize,
    pub reason: String,
}

impl ParseError {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            line: 0,
            reason: reason.into(),
        }
    }

    fn at(mut self, line: usize) -> Self {
        self.line = line;
        self
    }
}

/// Split a record into exactly `expected` fields.
fn split_fields(line: &str, expected: usize) -> Result<Vec<&str>, ParseError> {
    let fields: Vec<&str> = line.split(':').collect();
    if fields.len() != expected {
        return Err(ParseError::new(format!(
            "expected {expected} fields, found {}",
            fields.len()
        )));
    }
    Ok(fields)
}

fn parse_id(field: &str, value: &str) -> Result<u32, ParseError> {
    value
        .parse()
        .map_err(|_| ParseError::new(format!("{field} '{value}' is not a number")))
}

/// Parse every non-blank line, skipping the ones that fail.
fn parse_lines<T, F>(output: &str, parse: F) -> Vec<T>
where
    F: Fn(&str) -> Result<T, ParseError>,
{
    output
        .lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .filter_map(|(index, line)| match parse(line.trim_end_matches('\r')) {
            Ok(row) => Some(row),
            Err(e) => {
                tracing::warn!("Skipping unparseable row: {}", e.at(index + 1));
                None
            }
        })
        .collect()
}
