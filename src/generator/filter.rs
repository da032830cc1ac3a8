//! Compiles filter conditions into WHERE predicates.

use crate::catalog::{self, TableKind};
use crate::query::FilterCondition;
use crate::sql::token::{DelimitedWhere, Token};
use crate::sql::ParameterSet;

use super::{QueryError, QueryResult};

/// Tables visible to the outer WHERE clause of a statement.
///
/// The mapping table (`m`) is always in scope; the study (`st`) and series
/// (`se`) tables only when the statement's FROM clause brings them in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AliasScope {
    study: bool,
    series: bool,
}

impl AliasScope {
    /// FROM the mapping table only.
    pub fn mapping_only() -> Self {
        Self {
            study: false,
            series: false,
        }
    }

    /// FROM the study table, optionally joined to the series table, with the
    /// mapping row applied.
    pub fn metadata(series_joined: bool) -> Self {
        Self {
            study: true,
            series: series_joined,
        }
    }

    pub fn contains(&self, table: TableKind) -> bool {
        match table {
            TableKind::Mapping => true,
            TableKind::Study => self.study,
            TableKind::Series => self.series,
        }
    }

    /// Alias of `table` if it is in scope.
    pub fn alias(&self, table: TableKind) -> Option<&'static str> {
        self.contains(table).then(|| table.alias())
    }
}

/// Append one predicate for `condition` to `clause`, binding its values.
pub fn compile(
    condition: &FilterCondition,
    scope: AliasScope,
    clause: &mut DelimitedWhere<'_>,
    params: &mut ParameterSet,
) -> QueryResult<()> {
    let attribute = condition.attribute();
    let entry = catalog::resolve(attribute);
    let alias = scope
        .alias(entry.table)
        .ok_or(QueryError::AliasNotInScope {
            attribute,
            table: entry.table,
        })?;

    tracing::trace!(%attribute, alias, column = entry.column.name, "compiling filter condition");

    match condition {
        FilterCondition::SingleValueMatch { value, .. } => {
            let placeholder = params.bind(entry.column, value.clone());
            clause
                .predicate()
                .column(Some(alias), entry.column.name)
                .space()
                .push(Token::Eq)
                .space()
                .push(placeholder);
        }
        FilterCondition::RangeMatch {
            minimum, maximum, ..
        } => {
            let low = params.bind(entry.column, minimum.clone());
            let high = params.bind(entry.column, maximum.clone());
            clause
                .predicate()
                .column(Some(alias), entry.column.name)
                .space()
                .push(Token::Between)
                .space()
                .push(low)
                .space()
                .push(Token::And)
                .space()
                .push(high);
        }
    }

    Ok(())
}
