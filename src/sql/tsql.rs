//! T-SQL (SQL Server / Azure SQL) rendering rules.
//!
//! The generated statements only target SQL Server, so the handful of
//! dialect decisions live here as free functions:
//! - Square bracket identifier quoting (`[name]`)
//! - OFFSET FETCH for pagination (requires ORDER BY)
//! - `@name` parameter placeholders
//! - CROSS APPLY instead of LATERAL

use super::token::{Token, TokenStream};

/// Prefix of every generated parameter name.
pub const PARAMETER_PREFIX: &str = "@p";

/// Quote identifier with square brackets.
pub fn quote_bracket(ident: &str) -> String {
    format!("[{}]", ident.replace(']', "]]"))
}

/// Name of the `index`-th bound parameter of a statement.
pub fn parameter_name(index: usize) -> String {
    format!("{}{}", PARAMETER_PREFIX, index)
}

/// Emit `OFFSET m ROWS FETCH NEXT n ROWS ONLY`.
///
/// Only valid after an ORDER BY clause.
pub fn emit_offset_fetch(offset: u32, limit: u32) -> TokenStream {
    let mut ts = TokenStream::new();

    ts.push(Token::Offset)
        .space()
        .push(Token::LitInt(i64::from(offset)))
        .space()
        .push(Token::Rows)
        .space()
        .push(Token::Fetch)
        .space()
        .push(Token::Next)
        .space()
        .push(Token::LitInt(i64::from(limit)))
        .space()
        .push(Token::Rows)
        .space()
        .push(Token::Only);

    ts
}
