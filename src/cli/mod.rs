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

use anyhow::{bail, Result};
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use crate::config::ConnectorConfig;
use crate::model::{AttributeSet, AttributeValue, ObjectClass};
use crate::search::{Filter, MatchKind};

#[derive(Parser, Debug)]
#[command(
    name = "unixprov",
    version,
    about = "Provision POSIX accounts, groups and SSH keys on a remote Unix host",
    long_about = "unixprov compiles account operations into shell command strings and runs them over a\nsingle SSH session on the managed host. Success is decided from the command output, and the\npasswd, group and shadow databases are parsed back into objects for searching.\nPrivileged commands are wrapped with sudo unless the admin login is root.",
    after_help = "EXAMPLES:\n  Check the connection:     unixprov test\n  Create an account:        unixprov create account -a __NAME__=svc1 -a shell=/bin/bash -a groups=ops\n  Rename an account:        unixprov update account svc1 -a __NAME__=svc2\n  Drop group memberships:   unixprov remove-values account svc1 -a groups=ops\n  Look up one account:      unixprov search account -f '__NAME__=svc1'\n  List matching groups:     unixprov search group -f '__NAME__^=dev'"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[arg(
        long,
        help = "Configuration file path\nConfig loading priority:\n  1. This flag's value\n  2. Current directory (./unixprov.yaml)\n  3. User config (~/.config/unixprov/config.yaml)"
    )]
    pub config: Option<PathBuf>,

    #[arg(short = 'H', long, help = "Managed host (overrides config)")]
    pub host: Option<String>,

    #[arg(short = 'p', long, help = "SSH port (overrides config)")]
    pub port: Option<u16>,

    #[arg(short = 'l', long, help = "Admin login name (overrides config)")]
    pub admin: Option<String>,

    #[arg(short = 'i', long, help = "SSH private key file for the admin login")]
    pub identity: Option<PathBuf>,

    #[arg(
        short = 'A',
        long,
        help = "Use SSH agent for authentication (Unix/Linux/macOS only)"
    )]
    pub use_agent: bool,

    #[arg(
        short = 'P',
        long,
        help = "Prompt for the admin login password"
    )]
    pub password: bool,

    #[arg(long, help = "The admin login is root; run commands without sudo")]
    pub root: bool,

    #[arg(
        short = 'v',
        long,
        action = clap::ArgAction::Count,
        help = "Increase verbosity (-v, -vv, -vvv)"
    )]
    pub verbose: u8,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    #[command(
        about = "Test the admin session",
        long_about = "Runs a confirmation echo over the admin session. When sudo is needed, an elevated\nno-op runs first so a rejected sudo password fails the test."
    )]
    Test,

    #[command(about = "Create an account or group")]
    Create {
        #[arg(help = "Object class: account or group")]
        object_class: String,

        #[command(flatten)]
        attributes: AttributeArgs,

        #[arg(long, help = "Prompt for the account password")]
        password: bool,
    },

    #[command(
        about = "Replace attributes of an account or group",
        after_help = "Supplying __NAME__ renames the target."
    )]
    Update {
        object_class: String,

        #[arg(help = "Current name of the target")]
        uid: String,

        #[command(flatten)]
        attributes: AttributeArgs,

        #[arg(long, help = "Prompt for a new account password")]
        password: bool,
    },

    #[command(
        about = "Remove attribute values from an account or group",
        long_about = "groups lists the memberships to keep, every other supplementary group is left.\nSupplying sshPublicKey or permissions removes the key file or the sudoers drop-in.\nSupplying __PASSWORD__ clears the password."
    )]
    RemoveValues {
        object_class: String,

        uid: String,

        #[command(flatten)]
        attributes: AttributeArgs,
    },

    #[command(about = "Delete an account or group")]
    Delete { object_class: String, uid: String },

    #[command(
        about = "Search accounts or groups",
        long_about = "Filters take the form ATTR=VALUE (equal), ATTR^=VALUE (starts with), ATTR$=VALUE\n(ends with) or ATTR*=VALUE (contains), optionally prefixed with '!' to negate.\nAn equality filter on __NAME__ or __UID__ looks up a single object and fails when it\ndoes not exist; every other search lists what matches. Results are printed as YAML."
    )]
    Search {
        object_class: String,

        #[arg(short = 'f', long, help = "Filter expression")]
        filter: Option<String>,
    },

    #[command(about = "Check an account password by logging in as the account")]
    Authenticate { username: String },
}

#[derive(Args, Debug, Clone, Default)]
pub struct AttributeArgs {
    #[arg(
        short = 'a',
        long = "attribute",
        value_name = "NAME=VALUE",
        help = "Attribute to set; repeat a name to supply several values"
    )]
    pub attributes: Vec<String>,
}

impl AttributeArgs {
    pub fn to_attribute_set(&self) -> Result<AttributeSet> {
        parse_attributes(&self.attributes)
    }
}

impl Cli {
    /// Apply command line connection settings on top of the loaded
    /// configuration.
    pub fn apply_overrides(&self, config: &mut ConnectorConfig) {
        if let Some(host) = &self.host {
            config.connection.host = host.clone();
        }
        if let Some(port) = self.port {
            config.connection.port = port;
        }
        if let Some(admin) = &self.admin {
            config.connection.admin = admin.clone();
        }
        if let Some(identity) = &self.identity {
            config.connection.key_path = Some(identity.clone());
        }
        if self.use_agent {
            config.connection.use_agent = true;
        }
        if self.root {
            config.elevation.root = true;
        }
    }
}

pub fn parse_object_class(value: &str) -> Result<ObjectClass> {
    match ObjectClass::parse(value) {
        ObjectClass::Other(other) => bail!("Unknown object class '{other}', expected account or group"),
        object_class => Ok(object_class),
    }
}

/// Collect `NAME=VALUE` pairs into an attribute set, keeping first-seen
/// order. `NAME=` supplies the attribute without a value.
pub fn parse_attributes(pairs: &[String]) -> Result<AttributeSet> {
    let mut grouped: Vec<(String, Vec<AttributeValue>)> = Vec::new();
    for pair in pairs {
        let Some((name, value)) = pair.split_once('=') else {
            bail!("Invalid attribute '{pair}', expected NAME=VALUE");
        };
        let name = name.trim();
        if name.is_empty() {
            bail!("Invalid attribute '{pair}', the name is empty");
        }

        let index = match grouped.iter().position(|(n, _)| n.eq_ignore_ascii_case(name)) {
            Some(index) => index,
            None => {
                grouped.push((name.to_string(), Vec::new()));
                grouped.len() - 1
            }
        };
        if !value.is_empty() {
            grouped[index].1.push(AttributeValue::from(value));
        }
    }

    Ok(grouped
        .into_iter()
        .fold(AttributeSet::new(), |set, (name, values)| {
            set.with_values(&name, values)
        }))
}

/// Parse a single-predicate filter expression.
pub fn parse_filter(expression: &str) -> Result<Filter> {
    let expression = expression.trim();
    let (negate, expression) = match expression.strip_prefix('!') {
        Some(rest) => (true, rest.trim_start()),
        None => (false, expression),
    };

    let Some((left, value)) = expression.split_once('=') else {
        bail!("Invalid filter '{expression}', expected ATTR=VALUE");
    };
    let (attribute, kind) = if let Some(attribute) = left.strip_suffix('^') {
        (attribute, MatchKind::StartsWith)
    } else if let Some(attribute) = left.strip_suffix('$') {
        (attribute, MatchKind::EndsWith)
    } else if let Some(attribute) = left.strip_suffix('*') {
        (attribute, MatchKind::Contains)
    } else {
        (left, MatchKind::Equal)
    };

    let attribute = attribute.trim();
    if attribute.is_empty() {
        bail!("Invalid filter '{expression}', the attribute name is empty");
    }

    let filter = match kind {
        MatchKind::Equal => Filter::equal(attribute, value),
        MatchKind::StartsWith => Filter::starts_with(attribute, value),
        MatchKind::EndsWith => Filter::ends_with(attribute, value),
        MatchKind::Contains => Filter::contains(attribute, value),
    };
    Ok(if negate { filter.negate() } else { filter })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::names;

    #[test]
    fn test_parse_attributes_groups_repeated_names() {
        let pairs: Vec<String> = ["__NAME__=svc1", "groups=ops", "groups=wheel", "shell=/bin/bash"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        let attributes = parse_attributes(&pairs).unwrap();

        assert_eq!(attributes.name(), Some("svc1"));
        assert_eq!(attributes.strings(names::GROUPS), vec!["ops", "wheel"]);
        assert_eq!(attributes.string("shell"), Some("/bin/bash"));
        assert_eq!(attributes.len(), 3);
    }

    #[test]
    fn test_parse_attributes_empty_value_is_supplied_without_values() {
        let attributes = parse_attributes(&["sshPublicKey=".to_string()]).unwrap();
        assert!(attributes.contains(names::PUBLIC_KEY));
        assert!(!attributes.is_present(names::PUBLIC_KEY));
    }

    #[test]
    fn test_parse_attributes_rejects_malformed_pairs() {
        assert!(parse_attributes(&["shell".to_string()]).is_err());
        assert!(parse_attributes(&["=x".to_string()]).is_err());
    }

    #[test]
    fn test_parse_filter_kinds() {
        let cases = [
            ("__NAME__=svc1", MatchKind::Equal),
            ("__NAME__^=svc", MatchKind::StartsWith),
            ("shell$=bash", MatchKind::EndsWith),
            ("comment*=Bot", MatchKind::Contains),
        ];
        for (expression, expected) in cases {
            match parse_filter(expression).unwrap() {
                Filter::Match { kind, .. } => assert_eq!(kind, expected, "{expression}"),
                other => panic!("unexpected filter {other:?}"),
            }
        }
    }

    #[test]
    fn test_parse_filter_negation() {
        assert_eq!(
            parse_filter("!__NAME__=alice").unwrap(),
            Filter::equal("__NAME__", "alice").negate()
        );
        assert!(parse_filter("no operator").is_err());
        assert!(parse_filter("^=x").is_err());
    }

    #[test]
    fn test_parse_object_class() {
        assert_eq!(parse_object_class("account").unwrap(), ObjectClass::Account);
        assert_eq!(parse_object_class("__GROUP__").unwrap(), ObjectClass::Group);
        assert!(parse_object_class("printer").is_err());
    }

    #[test]
    fn test_overrides() {
        let cli = Cli::parse_from(["unixprov", "-H", "node1", "-l", "admin", "--root", "test"]);
        let mut config = ConnectorConfig::default();
        cli.apply_overrides(&mut config);
        assert_eq!(config.connection.host, "node1");
        assert_eq!(config.connection.admin, "admin");
        assert!(config.elevation.root);
        assert!(matches!(cli.command, Commands::Test));
    }
}
