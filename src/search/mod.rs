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

//! Search: fetch, parse, filter, enrich and stream.
//!
//! A primary-key equality filter is an existence check answered by a
//! targeted lookup; an empty answer is a failure. Every other filter
//! enumerates the full database and an empty result is just an empty
//! stream. The two paths are kept apart on purpose.

mod filter;

pub use filter::{Filter, FilterTranslator, MatchKind, Operand};

use chrono::Local;

use crate::config::AttributeNames;
use crate::error::{ConnectorError, Result};
use crate::executor::Connection;
use crate::generator::CommandGenerator;
use crate::model::{names, Attribute, AttributeValue, ConnectorObject, ObjectClass};
use crate::parser::{format_date, parse_rule, AccountRow, GroupFile, GroupRow, PasswdFile, ShadowRow};

/// Receives search results one object at a time.
///
/// Returning `false` stops the search; remaining rows are neither enriched
/// nor emitted.
pub trait ResultsHandler {
    fn handle(&mut self, object: ConnectorObject) -> bool;
}

impl<F> ResultsHandler for F
where
    F: FnMut(ConnectorObject) -> bool,
{
    fn handle(&mut self, object: ConnectorObject) -> bool {
        self(object)
    }
}

/// Row field an account operand applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum AccountField {
    Name,
    Comment,
    Shell,
    HomeDirectory,
}

impl AccountField {
    fn resolve(attribute: &str, attribute_names: &AttributeNames) -> Option<Self> {
        if attribute.eq_ignore_ascii_case(names::NAME) || attribute.eq_ignore_ascii_case(names::UID) {
            Some(Self::Name)
        } else if attribute.eq_ignore_ascii_case(&attribute_names.comment) {
            Some(Self::Comment)
        } else if attribute.eq_ignore_ascii_case(&attribute_names.shell) {
            Some(Self::Shell)
        } else if attribute.eq_ignore_ascii_case(&attribute_names.home_directory) {
            Some(Self::HomeDirectory)
        } else {
            None
        }
    }

    fn value<'r>(&self, row: &'r AccountRow) -> &'r str {
        match self {
            Self::Name => &row.username,
            Self::Comment => &row.comment,
            Self::Shell => &row.shell,
            Self::HomeDirectory => &row.home_directory,
        }
    }
}

/// One search over the shared connection.
pub struct Search<'s, 'c> {
    connection: &'s mut Connection,
    generator: &'s CommandGenerator<'c>,
    attribute_names: &'s AttributeNames,
}

impl<'s, 'c> Search<'s, 'c> {
    pub fn new(
        connection: &'s mut Connection,
        generator: &'s CommandGenerator<'c>,
        attribute_names: &'s AttributeNames,
    ) -> Self {
        Self {
            connection,
            generator,
            attribute_names,
        }
    }

    pub async fn execute(
        &mut self,
        object_class: &ObjectClass,
        operand: Option<&Operand>,
        handler: &mut dyn ResultsHandler,
    ) -> Result<()> {
        match object_class {
            ObjectClass::Account => self.search_accounts(operand, handler).await,
            ObjectClass::Group => self.search_groups(operand, handler).await,
            ObjectClass::Other(other) => Err(ConnectorError::UnsupportedObjectClass(other.clone())),
        }
    }

    async fn search_accounts(
        &mut self,
        operand: Option<&Operand>,
        handler: &mut dyn ResultsHandler,
    ) -> Result<()> {
        let field = match operand {
            Some(op) => Some(
                AccountField::resolve(&op.attribute_name, self.attribute_names).ok_or_else(|| {
                    ConnectorError::invalid_argument(format!(
                        "cannot search accounts by '{}'",
                        op.attribute_name
                    ))
                })?,
            ),
            None => None,
        };
        let keyed = operand.filter(|op| op.is_keyed());

        let command = match keyed {
            Some(op) => self.generator.user_exists(&op.attribute_value),
            None => self.generator.search_all_users(),
        };
        let output = self.connection.execute_read(&command).await?;

        let rows: Vec<AccountRow> = PasswdFile::parse(&output)
            .into_rows()
            .into_iter()
            .filter(|row| match (operand, field) {
                (Some(op), Some(field)) => op.matches(field.value(row)),
                _ => true,
            })
            .collect();

        if let Some(op) = keyed {
            if rows.is_empty() {
                return Err(ConnectorError::NoResultsFound(op.attribute_value.clone()));
            }
        }
        tracing::debug!("Account search matched {} rows", rows.len());

        for row in rows {
            let mut object = self.account_object(&row);
            if keyed.is_some() {
                self.enrich_account(&mut object, &row.username).await?;
            }
            if !handler.handle(object) {
                break;
            }
        }
        Ok(())
    }

    async fn search_groups(
        &mut self,
        operand: Option<&Operand>,
        handler: &mut dyn ResultsHandler,
    ) -> Result<()> {
        if let Some(op) = operand.filter(|op| !op.is_primary_key) {
            return Err(ConnectorError::invalid_argument(format!(
                "cannot search groups by '{}'",
                op.attribute_name
            )));
        }
        let keyed = operand.filter(|op| op.is_keyed());

        let command = match keyed {
            Some(op) => self.generator.group_exists(&op.attribute_value),
            None => self.generator.search_all_groups(),
        };
        let output = self.connection.execute_read(&command).await?;

        let rows: Vec<GroupRow> = GroupFile::parse(&output)
            .into_rows()
            .into_iter()
            .filter(|row| operand.map_or(true, |op| op.matches(&row.groupname)))
            .collect();

        if let Some(op) = keyed {
            if rows.is_empty() {
                return Err(ConnectorError::NoResultsFound(op.attribute_value.clone()));
            }
        }
        tracing::debug!("Group search matched {} rows", rows.len());

        for row in rows {
            let mut object = ConnectorObject::new(ObjectClass::Group, &row.groupname);
            if keyed.is_some() {
                self.enrich_permissions(&mut object, &ObjectClass::Group, &row.groupname)
                    .await?;
            }
            if !handler.handle(object) {
                break;
            }
        }
        Ok(())
    }

    fn account_object(&self, row: &AccountRow) -> ConnectorObject {
        ConnectorObject::new(ObjectClass::Account, &row.username)
            .with_attribute(Attribute::single(&self.attribute_names.comment, row.comment.as_str()))
            .with_attribute(Attribute::single(&self.attribute_names.shell, row.shell.as_str()))
            .with_attribute(Attribute::single(
                &self.attribute_names.home_directory,
                row.home_directory.as_str(),
            ))
    }

    /// Memberships, activation state and permissions; three more round trips.
    async fn enrich_account(&mut self, object: &mut ConnectorObject, username: &str) -> Result<()> {
        let output = self
            .connection
            .execute_read(&self.generator.user_groups(username))
            .await?;
        let groups = GroupFile::parse(&output).groups_of(username);
        object.attributes.insert(Attribute::new(
            names::GROUPS,
            groups.into_iter().map(AttributeValue::from).collect(),
        ));

        let output = self
            .connection
            .execute_read(&self.generator.user_status(username))
            .await?;
        if let Some(line) = output.lines().find(|line| !line.trim().is_empty()) {
            let status = line.parse::<ShadowRow>()?.status(Local::now().date_naive());
            object
                .attributes
                .insert(Attribute::single(names::ENABLE, status.enabled));
            object
                .attributes
                .insert(Attribute::single(names::LOCK_OUT, status.locked));
            if let Some(date) = status.disable_date {
                object
                    .attributes
                    .insert(Attribute::single(names::DISABLE_DATE, format_date(date)));
            }
        }

        self.enrich_permissions(object, &ObjectClass::Account, username)
            .await
    }

    async fn enrich_permissions(
        &mut self,
        object: &mut ConnectorObject,
        object_class: &ObjectClass,
        name: &str,
    ) -> Result<()> {
        let command = self.generator.permissions(object_class, name)?;
        let output = self.connection.execute_read(&command).await?;
        if let Some(rule) = parse_rule(&output, name) {
            object
                .attributes
                .insert(Attribute::single(names::PERMISSIONS, rule));
        }
        Ok(())
    }
}
