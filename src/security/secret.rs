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

//! Opaque secret holder with automatic memory clearing.
//!
//! `GuardedString` stands in for the host's secure-secret holder: the only
//! way to get at the plaintext is [`GuardedString::reveal`], which hands out
//! a zeroizing copy. Passwords are never logged and `Debug` is redacted.

use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Deserializer};
use std::fmt;
use zeroize::Zeroizing;

#[derive(Clone)]
pub struct GuardedString {
    inner: SecretString,
}

impl GuardedString {
    pub fn new(secret: impl Into<String>) -> Self {
        let secret: String = secret.into();
        Self {
            inner: SecretString::new(secret.into_boxed_str()),
        }
    }

    /// Decode the plaintext.
    ///
    /// The returned copy is cleared from memory when dropped and should be
    /// used immediately.
    pub fn reveal(&self) -> Zeroizing<String> {
        Zeroizing::new(self.inner.expose_secret().to_string())
    }

    pub fn is_empty(&self) -> bool {
        self.inner.expose_secret().is_empty()
    }
}

impl fmt::Debug for GuardedString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GuardedString")
            .field("secret", &"[REDACTED]")
            .finish()
    }
}

impl<'de> Deserialize<'de> for GuardedString {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Zeroizing::new(String::deserialize(deserializer)?);
        Ok(Self::new(value.as_str()))
    }
}
