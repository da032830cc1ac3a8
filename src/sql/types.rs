//! SQL Server column types.
//!
//! Every schema column carries one of these so a bound parameter can be
//! declared with the same type as the column it is compared against
//! (`sp_executesql N'...', N'@p0 VARCHAR(64)', @p0 = ...`).

use std::fmt;

use serde::Serialize;

/// SQL Server data type of an indexed column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SqlType {
    /// 64-bit signed integer (BIGINT).
    BigInt,

    /// Variable-length ASCII string with maximum length.
    VarChar(u16),

    /// Variable-length Unicode string with maximum length.
    NVarChar(u16),

    /// Date without time.
    Date,
}

impl SqlType {
    /// Whether values of this type are dates.
    pub fn is_temporal(&self) -> bool {
        matches!(self, SqlType::Date)
    }
}

impl fmt::Display for SqlType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SqlType::BigInt => write!(f, "BIGINT"),
            SqlType::VarChar(n) => write!(f, "VARCHAR({})", n),
            SqlType::NVarChar(n) => write!(f, "NVARCHAR({})", n),
            SqlType::Date => write!(f, "DATE"),
        }
    }
}
