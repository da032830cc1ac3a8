//! SQL generation primitives.
//!
//! - [`token`] - Token types and the append-only token stream statements are built in
//! - [`params`] - Bound parameter allocation
//! - [`tsql`] - SQL Server rendering rules
//! - [`types`] - Column types used to declare parameters

pub mod params;
pub mod token;
pub mod tsql;
pub mod types;

#[cfg(test)]
pub mod test_utils;

pub use params::{BoundParameter, ParameterSet};
pub use token::{DelimitedWhere, Token, TokenStream};
pub use types::SqlType;
