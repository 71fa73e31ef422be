use super::predicate::{PredicateSet, parse_direction, parse_predicate};
use super::TranslateError;
use crate::query::{Order, Selector, Selectors, Update, Updates};
use crate::value::Value;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Database location of an API field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DbField {
    pub table: String,
    pub column: String,
}

impl DbField {
    pub fn new(table: impl Into<String>, column: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            column: column.into(),
        }
    }
}

/// Allow-list of API field names and where they live in the database.
///
/// A field absent from this map cannot be filtered, sorted or updated.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ApiToDbFields(BTreeMap<String, DbField>);

impl ApiToDbFields {
    pub fn new() -> Self {
        Self::default()
    }

    /// Allow `api_name`, mapped to `table.column`.
    pub fn field(
        mut self,
        api_name: impl Into<String>,
        table: impl Into<String>,
        column: impl Into<String>,
    ) -> Self {
        self.0.insert(api_name.into(), DbField::new(table, column));
        self
    }

    pub fn get(&self, api_name: &str) -> Option<&DbField> {
        self.0.get(api_name)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<(String, DbField)> for ApiToDbFields {
    fn from_iter<I: IntoIterator<Item = (String, DbField)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Filter on one API field: a predicate token and a value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiSelector {
    pub predicate: String,
    pub value: Value,
}

impl ApiSelector {
    pub fn new(predicate: impl Into<String>, value: impl Into<Value>) -> Self {
        Self {
            predicate: predicate.into(),
            value: value.into(),
        }
    }
}

/// API filters keyed by field name; at most one per field.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ApiSelectors(BTreeMap<String, ApiSelector>);

impl ApiSelectors {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the filter for `field`, replacing any earlier one.
    pub fn add(
        mut self,
        field: impl Into<String>,
        predicate: impl Into<String>,
        value: impl Into<Value>,
    ) -> Self {
        self.0
            .insert(field.into(), ApiSelector::new(predicate, value));
        self
    }

    pub fn get(&self, field: &str) -> Option<&ApiSelector> {
        self.0.get(field)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Reject selectors whose predicate is outside the set configured for their field.
    ///
    /// Fields without a rule are unrestricted.
    pub fn check_predicates<'a>(
        &self,
        rules: impl IntoIterator<Item = (&'a str, PredicateSet)>,
    ) -> Result<(), TranslateError> {
        for (field, allowed) in rules {
            let Some(selector) = self.0.get(field) else {
                continue;
            };
            let predicate = parse_predicate(&selector.predicate)?;
            if !allowed.allows(predicate) {
                return Err(TranslateError::PredicateNotAllowed {
                    field: field.to_string(),
                    predicate: selector.predicate.clone(),
                });
            }
        }
        Ok(())
    }

    /// Translate into database selectors, in field-name order.
    pub fn to_db_selectors(&self, fields: &ApiToDbFields) -> Result<Selectors, TranslateError> {
        self.0
            .iter()
            .map(|(field, selector)| {
                let predicate = parse_predicate(&selector.predicate)?;
                let db = fields
                    .get(field)
                    .ok_or_else(|| TranslateError::InvalidSelectorField {
                        field: field.clone(),
                    })?;
                Ok(Selector {
                    table: db.table.clone(),
                    column: db.column.clone(),
                    predicate,
                    value: selector.value.clone(),
                })
            })
            .collect()
    }
}

impl FromIterator<(String, ApiSelector)> for ApiSelectors {
    fn from_iter<I: IntoIterator<Item = (String, ApiSelector)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// API sort request: field name to direction token.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ApiOrders(BTreeMap<String, String>);

impl ApiOrders {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(mut self, field: impl Into<String>, direction: impl Into<String>) -> Self {
        self.0.insert(field.into(), direction.into());
        self
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Translate into database orders, in field-name order.
    pub fn to_db_orders(&self, fields: &ApiToDbFields) -> Result<Vec<Order>, TranslateError> {
        self.0
            .iter()
            .map(|(field, direction)| {
                let db = fields
                    .get(field)
                    .ok_or_else(|| TranslateError::InvalidOrderField {
                        field: field.clone(),
                    })?;
                let direction = parse_direction(field, direction)?;
                Ok(Order::new(db.table.clone(), db.column.clone(), direction))
            })
            .collect()
    }
}

impl FromIterator<(String, String)> for ApiOrders {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// API update request: field name to new value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ApiUpdates(BTreeMap<String, Value>);

impl ApiUpdates {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.0.insert(field.into(), value.into());
        self
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Translate into column assignments, in field-name order.
    pub fn to_db_updates(&self, fields: &ApiToDbFields) -> Result<Updates, TranslateError> {
        self.0
            .iter()
            .map(|(field, value)| {
                let db = fields
                    .get(field)
                    .ok_or_else(|| TranslateError::InvalidUpdateField {
                        field: field.clone(),
                    })?;
                Ok(Update::new(db.column.clone(), value.clone()))
            })
            .collect()
    }
}

impl FromIterator<(String, Value)> for ApiUpdates {
    fn from_iter<I: IntoIterator<Item = (String, Value)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}
