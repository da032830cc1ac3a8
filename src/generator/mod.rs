//! Query generation - [`QueryOptions`] to a parameterized T-SQL statement.
//!
//! Two statement shapes exist:
//!
//! ```text
//! identifier-only                      attribute-join
//! ───────────────                      ──────────────
//! SELECT m.<uids>                      SELECT m.<uids>
//! FROM UIDMapping AS m                 FROM StudyMetadataCore AS st
//! [WHERE <uid and mapping filters>]    [INNER JOIN SeriesMetadataCore AS se ON ...]
//!                                      CROSS APPLY (SELECT TOP 1 * FROM UIDMapping ...) AS m
//!                                      WHERE <attribute filters>
//! ORDER BY m.Watermark DESC            ORDER BY m.Watermark DESC
//! OFFSET n ROWS FETCH NEXT m ROWS ONLY OFFSET n ROWS FETCH NEXT m ROWS ONLY
//! ```
//!
//! The mapping table alone answers queries that filter on nothing but
//! identifiers. Anything else starts from the study table and applies one
//! mapping row per study (or per series, when the series table is joined).
//!
//! # Example
//!
//! ```ignore
//! use qido::catalog::Attribute;
//! use qido::config::LimitPolicy;
//! use qido::generator::generate;
//! use qido::query::{FilterCondition, QueryExpression, QueryOptions};
//!
//! let expression = QueryExpression::new()
//!     .with_condition(FilterCondition::single(Attribute::Modality, "CT"))
//!     .with_offset(20);
//! let options = QueryOptions::new(expression, &LimitPolicy::default());
//!
//! let compiled = generate(&options)?;
//! println!("{}", compiled.sql);
//! ```

mod filter;

pub use filter::AliasScope;

use serde::Serialize;

use crate::catalog::{Attribute, TableKind};
use crate::query::{QueryOptions, QueryValue};
use crate::schema::{series_metadata_core, study_metadata_core, uid_mapping, Column, DEFAULT_SCHEMA};
use crate::sql::params::{self, BoundParameter};
use crate::sql::token::{DelimitedWhere, Token, TokenStream};
use crate::sql::{tsql, ParameterSet};

// ============================================================================
// Error Types
// ============================================================================

/// Errors that can occur during generation.
///
/// These indicate a defect in whoever built the [`QueryOptions`], never a
/// bad user request.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum QueryError {
    #[error("attribute {attribute} lives in {table}, which is not part of this query")]
    AliasNotInScope {
        attribute: Attribute,
        table: TableKind,
    },
}

pub type QueryResult<T> = Result<T, QueryError>;

// ============================================================================
// Shape selection
// ============================================================================

/// Structure of a generated statement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum QueryShape {
    /// Mapping table only.
    InstanceUidOnly,
    /// Study table, optional series join, CROSS APPLY of the mapping table.
    AttributeJoin,
}

impl QueryShape {
    /// Pick the shape for `options`.
    pub fn select(options: &QueryOptions) -> Self {
        // An empty expression has no filter conditions either.
        if !options.expression.has_filter_conditions() || options.is_only_instance_uid_query {
            QueryShape::InstanceUidOnly
        } else {
            QueryShape::AttributeJoin
        }
    }
}

// ============================================================================
// Output
// ============================================================================

/// A generated statement and the values bound to its placeholders.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompiledQuery {
    pub sql: String,
    pub parameters: Vec<BoundParameter>,
    pub shape: QueryShape,
}

impl CompiledQuery {
    /// Parameter definition list for `sp_executesql`.
    pub fn parameter_declarations(&self) -> String {
        params::declarations(&self.parameters)
    }
}

// ============================================================================
// Generator
// ============================================================================

/// Output of one generation: statement text and its parameters.
#[derive(Debug, Default)]
struct QueryContext {
    tokens: TokenStream,
    params: ParameterSet,
}

/// Columns every statement returns.
static SELECTED_COLUMNS: [&Column; 3] = [
    &uid_mapping::STUDY_INSTANCE_UID,
    &uid_mapping::SERIES_INSTANCE_UID,
    &uid_mapping::SOP_INSTANCE_UID,
];

/// Generate the statement for `options` against the default schema.
pub fn generate(options: &QueryOptions) -> QueryResult<CompiledQuery> {
    SqlQueryGenerator::new(options, DEFAULT_SCHEMA).generate()
}

/// Generate the statement for `options` with tables qualified by `schema`.
pub fn generate_in_schema(options: &QueryOptions, schema: &str) -> QueryResult<CompiledQuery> {
    SqlQueryGenerator::new(options, schema).generate()
}

/// Builds one statement. Consumed by [`generate`](Self::generate), so its
/// token stream and parameter set are never shared between statements.
#[derive(Debug)]
pub struct SqlQueryGenerator<'a> {
    options: &'a QueryOptions,
    schema: &'a str,
    ctx: QueryContext,
}

impl<'a> SqlQueryGenerator<'a> {
    pub fn new(options: &'a QueryOptions, schema: &'a str) -> Self {
        Self {
            options,
            schema,
            ctx: QueryContext::default(),
        }
    }

    pub fn generate(mut self) -> QueryResult<CompiledQuery> {
        debug_assert!(
            self.options.evaluated_limit > 0,
            "evaluated limit must be positive"
        );

        let shape = QueryShape::select(self.options);
        tracing::debug!(
            ?shape,
            conditions = self.options.expression.filter_conditions.len(),
            study_uid = self.options.study_instance_uid.is_some(),
            series_uid = self.options.series_instance_uid.is_some(),
            "selected query shape"
        );

        match shape {
            QueryShape::InstanceUidOnly => self.append_uid_mapping_query()?,
            QueryShape::AttributeJoin => self.append_metadata_table_query()?,
        }

        self.append_order_by();
        self.append_offset_fetch();

        let QueryContext { tokens, params } = self.ctx;
        let compiled = CompiledQuery {
            sql: tokens.serialize(),
            parameters: params.into_vec(),
            shape,
        };

        tracing::debug!(
            ?shape,
            parameters = compiled.parameters.len(),
            length = compiled.sql.len(),
            "generated query"
        );
        Ok(compiled)
    }

    /// `SELECT m.StudyInstanceUid, m.SeriesInstanceUid, m.SopInstanceUid FROM UIDMapping AS m [WHERE ...]`
    fn append_uid_mapping_query(&mut self) -> QueryResult<()> {
        self.append_select();
        self.ctx.tokens.newline().push(Token::From).space();
        self.append_table(TableKind::Mapping);

        let options = self.options;
        if options.any_filter_condition() {
            let QueryContext { tokens, params } = &mut self.ctx;
            let mut clause = tokens.begin_delimited_where(0);
            append_uid_predicates(&mut clause, params, options, Some(TableKind::Mapping.alias()));
            append_filter_predicates(&mut clause, params, options, AliasScope::mapping_only())?;
        }

        Ok(())
    }

    /// Study table, series join when needed, mapping row via CROSS APPLY.
    fn append_metadata_table_query(&mut self) -> QueryResult<()> {
        let join_series = self
            .options
            .expression
            .filter_conditions
            .iter()
            .any(|condition| condition.table() == TableKind::Series);

        self.append_select();
        self.ctx.tokens.newline().push(Token::From).space();
        self.append_table(TableKind::Study);

        if join_series {
            self.append_series_table_join();
        }

        self.append_cross_apply_mapping_table(join_series);

        let options = self.options;
        let QueryContext { tokens, params } = &mut self.ctx;
        let mut clause = tokens.begin_delimited_where(0);
        append_filter_predicates(&mut clause, params, options, AliasScope::metadata(join_series))
    }

    fn append_select(&mut self) {
        let ts = &mut self.ctx.tokens;
        ts.push(Token::Select);
        for (i, column) in SELECTED_COLUMNS.iter().enumerate() {
            if i > 0 {
                ts.comma();
            }
            ts.newline()
                .indent(1)
                .column(Some(TableKind::Mapping.alias()), column.name);
        }
    }

    /// `[schema].[table] AS alias`
    fn append_table(&mut self, table: TableKind) {
        let ident = self.table_ident(table);
        self.ctx
            .tokens
            .push(ident)
            .space()
            .push(Token::As)
            .space()
            .push(Token::Alias(table.alias()));
    }

    fn table_ident(&self, table: TableKind) -> Token {
        Token::QualifiedIdent {
            schema: Some(self.schema.to_string()),
            name: table.table().name.to_string(),
        }
    }

    /// `INNER JOIN SeriesMetadataCore AS se ON se.ID = st.ID`
    fn append_series_table_join(&mut self) {
        self.ctx
            .tokens
            .newline()
            .push(Token::Inner)
            .space()
            .push(Token::Join)
            .space();
        self.append_table(TableKind::Series);
        self.ctx
            .tokens
            .space()
            .push(Token::On)
            .space()
            .column(Some(TableKind::Series.alias()), series_metadata_core::ID.name)
            .space()
            .push(Token::Eq)
            .space()
            .column(Some(TableKind::Study.alias()), study_metadata_core::ID.name);
    }

    /// One mapping row per outer study (or series) row, restricted to the
    /// direct UID filters.
    ///
    /// `TOP 1` has no ORDER BY: when several instances match, which one is
    /// returned is up to the server. Callers must not rely on a particular
    /// instance being picked.
    ///
    /// Mapping-table filters such as `SOPInstanceUID` are not part of the
    /// subquery. Combined with a study or series filter they land in the
    /// outer WHERE and are tested against the row already picked, so
    /// `m.[SopInstanceUid] = @pN` only matches when the server happened to
    /// pick that instance. Use `is_only_instance_uid_query` for instance
    /// lookups.
    fn append_cross_apply_mapping_table(&mut self, join_series: bool) {
        let mapping = self.table_ident(TableKind::Mapping);
        let options = self.options;
        let QueryContext { tokens, params } = &mut self.ctx;

        tokens
            .newline()
            .push(Token::Cross)
            .space()
            .push(Token::Apply)
            .space()
            .lparen();
        tokens
            .newline()
            .indent(1)
            .push(Token::Select)
            .space()
            .push(Token::Top)
            .space()
            .push(Token::LitInt(1))
            .space()
            .push(Token::Star);
        tokens
            .newline()
            .indent(1)
            .push(Token::From)
            .space()
            .push(mapping);

        {
            let mut clause = tokens.begin_delimited_where(1);
            clause
                .predicate()
                .column(None, uid_mapping::STUDY_INSTANCE_UID.name)
                .space()
                .push(Token::Eq)
                .space()
                .column(
                    Some(TableKind::Study.alias()),
                    study_metadata_core::STUDY_INSTANCE_UID.name,
                );
            if join_series {
                clause
                    .predicate()
                    .column(None, uid_mapping::SERIES_INSTANCE_UID.name)
                    .space()
                    .push(Token::Eq)
                    .space()
                    .column(
                        Some(TableKind::Series.alias()),
                        series_metadata_core::SERIES_INSTANCE_UID.name,
                    );
            }
            append_uid_predicates(&mut clause, params, options, None);
        }

        tokens
            .newline()
            .rparen()
            .space()
            .push(Token::As)
            .space()
            .push(Token::Alias(TableKind::Mapping.alias()));
    }

    fn append_order_by(&mut self) {
        self.ctx
            .tokens
            .newline()
            .push(Token::OrderBy)
            .space()
            .column(Some(TableKind::Mapping.alias()), uid_mapping::WATERMARK.name)
            .space()
            .push(Token::Desc);
    }

    fn append_offset_fetch(&mut self) {
        let pagination =
            tsql::emit_offset_fetch(self.options.expression.offset, self.options.evaluated_limit);
        self.ctx.tokens.newline().append(&pagination);
    }
}

/// Equality predicates for the direct study/series UID filters.
fn append_uid_predicates(
    clause: &mut DelimitedWhere<'_>,
    params: &mut ParameterSet,
    options: &QueryOptions,
    alias: Option<&'static str>,
) {
    let uid_filters = [
        (&uid_mapping::STUDY_INSTANCE_UID, &options.study_instance_uid),
        (&uid_mapping::SERIES_INSTANCE_UID, &options.series_instance_uid),
    ];

    for (column, uid) in uid_filters {
        if let Some(uid) = uid {
            let placeholder = params.bind(column, QueryValue::Text(uid.clone()));
            clause
                .predicate()
                .column(alias, column.name)
                .space()
                .push(Token::Eq)
                .space()
                .push(placeholder);
        }
    }
}

fn append_filter_predicates(
    clause: &mut DelimitedWhere<'_>,
    params: &mut ParameterSet,
    options: &QueryOptions,
    scope: AliasScope,
) -> QueryResult<()> {
    for condition in &options.expression.filter_conditions {
        filter::compile(condition, scope, clause, params)?;
    }
    Ok(())
}
