//! # Qido
//!
//! Compiles DICOMweb (QIDO-RS) metadata searches into parameterized T-SQL
//! against the study/series/instance index tables.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │            Search parameters (key=value pairs)           │
//! └─────────────────────────────────────────────────────────┘
//!                          │
//!                          ▼ [qido + config::LimitPolicy]
//! ┌─────────────────────────────────────────────────────────┐
//! │                     QueryOptions                         │
//! │  (filter conditions, direct UID filters, page)           │
//! └─────────────────────────────────────────────────────────┘
//!                          │
//!                          ▼ [generator, via catalog]
//! ┌─────────────────────────────────────────────────────────┐
//! │        TokenStream + ParameterSet (one per statement)    │
//! └─────────────────────────────────────────────────────────┘
//!                          │
//!                          ▼
//! ┌─────────────────────────────────────────────────────────┐
//! │        CompiledQuery (T-SQL text + bound parameters)     │
//! └─────────────────────────────────────────────────────────┘
//! ```
//!
//! Values never appear in the statement text. Every value is bound as an
//! `@pN` parameter and returned alongside the text in
//! [`CompiledQuery::parameters`](generator::CompiledQuery).

pub mod catalog;
pub mod config;
pub mod generator;
pub mod qido;
pub mod query;
pub mod schema;
pub mod sql;

/// Re-exports for convenient usage.
pub mod prelude {
    pub use crate::catalog::{Attribute, TableKind, Tag};
    pub use crate::config::{LimitPolicy, Settings};
    pub use crate::generator::{
        generate, generate_in_schema, CompiledQuery, QueryError, QueryResult, QueryShape,
    };
    pub use crate::qido::{parse_query, QidoParseError};
    pub use crate::query::{FilterCondition, QueryExpression, QueryOptions, QueryValue};
    pub use crate::sql::{BoundParameter, SqlType};
}

// Also export at crate root for convenience
pub use generator::{generate, generate_in_schema, CompiledQuery, QueryShape};
pub use query::{FilterCondition, QueryExpression, QueryOptions, QueryValue};
