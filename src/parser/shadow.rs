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

//! Shadow-style status records: lock marker and expiry.

use chrono::{Days, NaiveDate};
use std::str::FromStr;

use super::{split_fields, ParseError};

const SHADOW_FIELDS: usize = 9;
const LOCK_MARKER: char = '!';
const DATE_FORMAT: &str = "%Y-%m-%d";

fn epoch() -> NaiveDate {
    NaiveDate::default()
}

/// Account expiry decoded from days since the epoch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Expiry {
    /// Field empty or zero. Not a date, never compared against the clock.
    Never,
    On(NaiveDate),
}

impl Expiry {
    pub fn from_days(days: i64) -> Result<Self, ParseError> {
        match days {
            d if d <= 0 => Ok(Expiry::Never),
            d => epoch()
                .checked_add_days(Days::new(d as u64))
                .map(Expiry::On)
                .ok_or_else(|| ParseError::new(format!("expiry {d} is out of range"))),
        }
    }

    fn from_field(value: &str) -> Result<Self, ParseError> {
        if value.is_empty() {
            return Ok(Expiry::Never);
        }
        let days = value
            .parse::<i64>()
            .map_err(|_| ParseError::new(format!("expiry '{value}' is not a number")))?;
        Self::from_days(days)
    }

    /// Days since the epoch, `0` for [`Expiry::Never`].
    pub fn to_days(&self) -> i64 {
        match self {
            Expiry::Never => 0,
            Expiry::On(date) => date.signed_duration_since(epoch()).num_days(),
        }
    }

    pub fn date(&self) -> Option<NaiveDate> {
        match self {
            Expiry::Never => None,
            Expiry::On(date) => Some(*date),
        }
    }

    pub fn has_passed(&self, today: NaiveDate) -> bool {
        match self {
            Expiry::Never => false,
            Expiry::On(date) => *date <= today,
        }
    }
}

/// One shadow entry. Aging fields the host left empty are `None`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShadowRow {
    pub username: String,
    pub locked: bool,
    pub last_change: Option<i64>,
    pub min_days: Option<i64>,
    pub max_days: Option<i64>,
    pub warn_days: Option<i64>,
    pub inactive_days: Option<i64>,
    pub expire: Expiry,
}

fn optional_number(field: &str, value: &str) -> Result<Option<i64>, ParseError> {
    if value.is_empty() {
        return Ok(None);
    }
    value
        .parse()
        .map(Some)
        .map_err(|_| ParseError::new(format!("{field} '{value}' is not a number")))
}

impl FromStr for ShadowRow {
    type Err = ParseError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let fields = split_fields(line.trim(), SHADOW_FIELDS)?;
        Ok(Self {
            username: fields[0].to_string(),
            locked: fields[1].starts_with(LOCK_MARKER),
            last_change: optional_number("last change", fields[2])?,
            min_days: optional_number("minimum age", fields[3])?,
            max_days: optional_number("maximum age", fields[4])?,
            warn_days: optional_number("warning period", fields[5])?,
            inactive_days: optional_number("inactivity period", fields[6])?,
            expire: Expiry::from_field(fields[7])?,
        })
    }
}

/// Lock and activation state reported on account objects.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AccountStatus {
    pub locked: bool,
    pub enabled: bool,
    pub disable_date: Option<NaiveDate>,
}

impl ShadowRow {
    /// Status as of `today`; an account is disabled once its expiry date
    /// has been reached.
    pub fn status(&self, today: NaiveDate) -> AccountStatus {
        AccountStatus {
            locked: self.locked,
            enabled: !self.expire.has_passed(today),
            disable_date: self.expire.date(),
        }
    }
}

/// Parse a requested disable date: `YYYY-MM-DD` or a day count since the
/// epoch as stored in the shadow file.
pub fn parse_disable_date(value: &str) -> Result<NaiveDate, ParseError> {
    let value = value.trim();
    if let Ok(date) = NaiveDate::parse_from_str(value, DATE_FORMAT) {
        return Ok(date);
    }
    let days = value
        .parse::<i64>()
        .map_err(|_| ParseError::new(format!("'{value}' is neither YYYY-MM-DD nor a day count")))?;
    Expiry::from_days(days)?
        .date()
        .ok_or_else(|| ParseError::new(format!("'{value}' does not denote a date")))
}

/// Render a date the way `usermod -e` expects it.
pub fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}
