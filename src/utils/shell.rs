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

//! Shell quoting for values embedded in composed command text.

use std::borrow::Cow;

/// Quote a word only when the shell would otherwise split or expand it.
///
/// `svc1` stays `svc1`, `Build Bot` becomes `'Build Bot'`.
pub fn quote(value: &str) -> Cow<'_, str> {
    shell_words::quote(value)
}

/// Always wrap in single quotes, escaping embedded quotes as `'\''`.
///
/// Used for `echo` payloads so the pipe idiom keeps a stable shape no
/// matter what the payload contains.
pub fn single_quote(value: &str) -> String {
    format!("'{}'", value.replace('\'', r"'\''"))
}
