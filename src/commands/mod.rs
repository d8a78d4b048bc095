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

//! Shell fragment builders.
//!
//! Each function renders one administrative primitive as command text. They
//! are pure: no elevation prefix, no execution, arguments quoted for the
//! remote shell. Composition and elevation happen in [`crate::generator`].

pub mod file;
pub mod group;
pub mod passwd;
pub mod query;
pub mod user;

pub use user::UserOptions;

/// Join words into a single command line.
pub(crate) fn join_words<I, S>(words: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    words
        .into_iter()
        .map(|w| w.as_ref().to_string())
        .collect::<Vec<_>>()
        .join(" ")
}
