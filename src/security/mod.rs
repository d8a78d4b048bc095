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

//! Secret handling, privilege elevation and input validation.

mod secret;
mod sudo;
pub mod validation;

pub use secret::GuardedString;
pub use sudo::{
    get_sudo_password_from_env, prompt_sudo_password, ElevationMode, ElevationPolicy, Sudo,
    SUDO_FAILURE_PATTERNS, SUDO_PASSWORD_ENV,
};
pub use validation::{validate_principal_name, validate_remote_path};
