//! Bound parameters of a generated statement.

use serde::Serialize;

use super::token::Token;
use super::tsql;
use super::types::SqlType;
use crate::query::QueryValue;
use crate::schema::Column;

/// One parameter: the placeholder name and the value sent alongside the text.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BoundParameter {
    /// Placeholder as it appears in the statement, e.g. `@p0`.
    pub name: String,
    /// Column the value is compared against.
    pub column: &'static str,
    /// Declared type, taken from the column.
    pub sql_type: SqlType,
    pub value: QueryValue,
}

/// Ordered set of the parameters bound while generating one statement.
///
/// Names are allocated sequentially, so binding the same column or value
/// twice still yields two distinct placeholders.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParameterSet {
    params: Vec<BoundParameter>,
}

impl ParameterSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `value` for a comparison against `column` and return the
    /// placeholder token to write into the statement.
    pub fn bind(&mut self, column: &'static Column, value: QueryValue) -> Token {
        let name = tsql::parameter_name(self.params.len());
        self.params.push(BoundParameter {
            name: name.clone(),
            column: column.name,
            sql_type: column.sql_type,
            value,
        });
        Token::Param(name)
    }

    pub fn len(&self) -> usize {
        self.params.len()
    }

    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &BoundParameter> {
        self.params.iter()
    }

    pub fn into_vec(self) -> Vec<BoundParameter> {
        self.params
    }
}

/// Render the `sp_executesql` parameter definition list,
/// e.g. `@p0 NVARCHAR(16), @p1 DATE`.
pub fn declarations(params: &[BoundParameter]) -> String {
    params
        .iter()
        .map(|p| format!("{} {}", p.name, p.sql_type))
        .collect::<Vec<_>>()
        .join(", ")
}
