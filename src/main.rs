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

use anyhow::{Context, Result};
use clap::Parser;

use unixprov::{
    cli::{parse_filter, parse_object_class, Cli, Commands},
    config::ConnectorConfig,
    model::{names, Attribute, AttributeSet, ConnectorObject, Uid},
    security::{prompt_sudo_password, GuardedString},
    utils::init_logging,
    UnixConnector,
};

fn prompt_secret(prompt: &str) -> Result<GuardedString> {
    let secret = zeroize::Zeroizing::new(
        rpassword::prompt_password(prompt).context("Failed to read password")?,
    );
    if secret.is_empty() {
        anyhow::bail!("Empty password not allowed");
    }
    Ok(GuardedString::new(secret.as_str()))
}

/// Attributes from `-a` pairs, plus a prompted `__PASSWORD__` when asked.
fn attributes_with_password(attributes: AttributeSet, prompt: bool) -> Result<AttributeSet> {
    if !prompt {
        return Ok(attributes);
    }
    let password = prompt_secret("Account password: ")?;
    let mut attributes = attributes;
    attributes.insert(Attribute::single(names::PASSWORD, password));
    Ok(attributes)
}

fn print_object(object: &ConnectorObject) -> Result<()> {
    let yaml = serde_yaml::to_string(object).context("Failed to render search result")?;
    println!("---\n{}", yaml.trim_end());
    Ok(())
}

async fn load_config(cli: &Cli) -> Result<ConnectorConfig> {
    let mut config = ConnectorConfig::load_with_priority(cli.config.as_deref()).await?;
    config.apply_env_overrides()?;
    cli.apply_overrides(&mut config);

    if cli.password {
        config.connection.password = Some(prompt_secret(&format!(
            "Password for {}@{}: ",
            config.connection.admin, config.connection.host
        ))?);
    }
    if !config.elevation.root && config.elevation.sudo_password.is_none() {
        config.elevation.sudo_password = Some(prompt_sudo_password()?);
    }

    Ok(config)
}

async fn run(connector: &mut UnixConnector, command: &Commands) -> Result<()> {
    match command {
        Commands::Test => {
            connector.test().await?;
            println!("Connection test succeeded");
        }
        Commands::Create {
            object_class,
            attributes,
            password,
        } => {
            let object_class = parse_object_class(object_class)?;
            let attributes = attributes_with_password(attributes.to_attribute_set()?, *password)?;
            let uid = connector.create(&object_class, &attributes).await?;
            println!("{uid}");
        }
        Commands::Update {
            object_class,
            uid,
            attributes,
            password,
        } => {
            let object_class = parse_object_class(object_class)?;
            let attributes = attributes_with_password(attributes.to_attribute_set()?, *password)?;
            let uid = connector
                .update(&object_class, &Uid::new(uid.as_str()), &attributes)
                .await?;
            println!("{uid}");
        }
        Commands::RemoveValues {
            object_class,
            uid,
            attributes,
        } => {
            let object_class = parse_object_class(object_class)?;
            let attributes = attributes.to_attribute_set()?;
            let uid = connector
                .remove_attribute_values(&object_class, &Uid::new(uid.as_str()), &attributes)
                .await?;
            println!("{uid}");
        }
        Commands::Delete { object_class, uid } => {
            let object_class = parse_object_class(object_class)?;
            connector
                .delete(&object_class, &Uid::new(uid.as_str()))
                .await?;
            println!("Deleted {uid}");
        }
        Commands::Search {
            object_class,
            filter,
        } => {
            let object_class = parse_object_class(object_class)?;
            let filter = filter.as_deref().map(parse_filter).transpose()?;

            let mut render_error = None;
            let mut handler = |object: ConnectorObject| match print_object(&object) {
                Ok(()) => true,
                Err(e) => {
                    render_error = Some(e);
                    false
                }
            };
            connector
                .search(&object_class, filter.as_ref(), &mut handler)
                .await?;
            if let Some(e) = render_error {
                return Err(e);
            }
        }
        Commands::Authenticate { username } => {
            let password = prompt_secret(&format!("Password for {username}: "))?;
            let uid = connector
                .authenticate(&unixprov::ObjectClass::Account, username, &password)
                .await?;
            println!("Authenticated {uid}");
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config = load_config(&cli).await?;
    let mut connector = UnixConnector::connect(config)
        .await
        .context("Failed to open the admin session")?;

    let result = run(&mut connector, &cli.command).await;

    if let Err(e) = connector.close().await {
        tracing::debug!("Failed to close the admin session: {}", e);
    }
    result
}
