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

//! Remote provisioning of POSIX accounts, groups and SSH public keys.
//!
//! Account operations are compiled into shell command strings, sent over a
//! single authenticated SSH session and their free-text output is classified
//! into success or a typed failure. Database dumps (`getent passwd`,
//! `getent group`, `getent shadow`) are parsed back into typed rows for
//! searching.

pub mod cli;
pub mod commands;
pub mod config;
pub mod connector;
pub mod error;
pub mod executor;
pub mod generator;
pub mod model;
pub mod parser;
pub mod search;
pub mod security;
pub mod ssh;
pub mod utils;

pub use config::ConnectorConfig;
pub use connector::{UnixConnector, UpdateMode};
pub use error::{ConnectorError, Result};
pub use model::{Attribute, AttributeSet, AttributeValue, ConnectorObject, ObjectClass, Uid};
pub use search::{Filter, ResultsHandler};
