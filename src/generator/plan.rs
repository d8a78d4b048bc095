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

//! Inputs for composing update command strings.
//!
//! An update needs remote state the caller fetched beforehand: the current
//! supplementary groups for membership diffing and the pre-rename passwd row
//! for the home move. Both are read before any modification is sent.

use crate::model::AttributeSet;
use crate::parser::AccountRow;

/// What an update does with the supplied attribute values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UpdateMode {
    /// Supplied values replace the current ones.
    #[default]
    Replace,
    /// Supplied values describe what to drop: group memberships not listed
    /// are removed, a supplied public key or permission is revoked and the
    /// password is cleared.
    RemoveValues,
}

/// A planned account update.
#[derive(Debug, Clone)]
pub struct AccountUpdate<'p> {
    /// Name before the update.
    pub username: &'p str,
    pub attributes: &'p AttributeSet,
    pub mode: UpdateMode,
    /// Supplementary groups the account currently belongs to.
    pub current_groups: &'p [String],
    /// Passwd row fetched before the update, required when renaming.
    pub current_row: Option<&'p AccountRow>,
}

impl<'p> AccountUpdate<'p> {
    /// Name after the update.
    pub fn new_name(&self) -> &'p str {
        self.attributes.name().unwrap_or(self.username)
    }

    pub fn is_rename(&self) -> bool {
        self.new_name() != self.username
    }
}

/// A planned group update.
#[derive(Debug, Clone)]
pub struct GroupUpdate<'p> {
    pub groupname: &'p str,
    pub attributes: &'p AttributeSet,
    pub mode: UpdateMode,
}

impl<'p> GroupUpdate<'p> {
    pub fn new_name(&self) -> &'p str {
        self.attributes.name().unwrap_or(self.groupname)
    }
}
