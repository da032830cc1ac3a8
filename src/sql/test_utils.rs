//! Test utilities for SQL emission validation.
//!
//! Uses sqlparser-rs to check that generated statements are syntactically
//! valid T-SQL.

use sqlparser::dialect::MsSqlDialect;
use sqlparser::parser::Parser;

/// Validates that a SQL string parses as a single T-SQL statement.
pub fn validate_tsql(sql: &str) -> Result<(), String> {
    let statements = Parser::parse_sql(&MsSqlDialect {}, sql)
        .map_err(|e| format!("Invalid T-SQL: {}\nSQL: {}", e, sql))?;

    if statements.len() != 1 {
        return Err(format!(
            "Expected one statement, got {}\nSQL: {}",
            statements.len(),
            sql
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_valid_sql() {
        validate_tsql("SELECT [a] FROM [dbo].[t] AS x WHERE x.[a] = @p0").unwrap();
    }

    #[test]
    fn test_validate_invalid_sql() {
        assert!(validate_tsql("SELEC * FORM users").is_err());
    }
}
