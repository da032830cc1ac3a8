//! QIDO-RS search parameters to [`QueryOptions`].
//!
//! Accepts the `key=value` pairs of a DICOMweb search request:
//!
//! ```text
//! StudyDate=20200101-20201231&00080060=CT&offset=20&limit=50
//! ```
//!
//! - Keys are DICOM keywords or 8 hex digit tags.
//! - `offset` and `limit` select the page; the limit goes through the
//!   [`LimitPolicy`].
//! - Date attributes take `YYYYMMDD` or an inclusive `YYYYMMDD-YYYYMMDD`
//!   range where either side may be left open.
//! - `StudyInstanceUID` and `SeriesInstanceUID` become the direct identifier
//!   filters; every other attribute becomes a filter condition.

use chrono::NaiveDate;

use crate::catalog::{self, Attribute, TableKind, UnknownAttribute};
use crate::config::LimitPolicy;
use crate::query::{FilterCondition, QueryExpression, QueryOptions};

/// Errors that can occur while parsing search parameters.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum QidoParseError {
    #[error(transparent)]
    UnknownAttribute(#[from] UnknownAttribute),

    #[error("expected KEY=VALUE, got '{0}'")]
    MalformedPair(String),

    #[error("empty value for {0}")]
    EmptyValue(Attribute),

    #[error("invalid date '{value}' for {attribute}, expected YYYYMMDD")]
    InvalidDate { attribute: Attribute, value: String },

    #[error("invalid date range '{value}' for {attribute}")]
    InvalidRange { attribute: Attribute, value: String },

    #[error("invalid value '{value}' for {key}, expected a non-negative integer")]
    InvalidInteger { key: String, value: String },
}

pub type QidoResult<T> = Result<T, QidoParseError>;

/// Split `KEY=VALUE` at the first `=`.
pub fn parse_pair(s: &str) -> QidoResult<(String, String)> {
    match s.split_once('=') {
        Some((key, value)) if !key.trim().is_empty() => {
            Ok((key.trim().to_string(), value.trim().to_string()))
        }
        _ => Err(QidoParseError::MalformedPair(s.to_string())),
    }
}

/// Build query options from search parameters.
pub fn parse_query<I, K, V>(pairs: I, policy: &LimitPolicy) -> QidoResult<QueryOptions>
where
    I: IntoIterator<Item = (K, V)>,
    K: AsRef<str>,
    V: AsRef<str>,
{
    let mut expression = QueryExpression::new();
    let mut study_instance_uid = None;
    let mut series_instance_uid = None;

    for (key, value) in pairs {
        let key = key.as_ref().trim();
        let value = value.as_ref().trim();

        if key.eq_ignore_ascii_case("offset") {
            expression.offset = parse_integer(key, value)?;
            continue;
        }
        if key.eq_ignore_ascii_case("limit") {
            expression.limit = Some(parse_integer(key, value)?);
            continue;
        }
        if key.eq_ignore_ascii_case("fuzzymatching") || key.eq_ignore_ascii_case("includefield") {
            tracing::debug!(key, value, "ignoring search parameter");
            continue;
        }

        let attribute: Attribute = key.parse()?;
        if value.is_empty() {
            return Err(QidoParseError::EmptyValue(attribute));
        }

        match attribute {
            Attribute::StudyInstanceUid => study_instance_uid = Some(value.to_string()),
            Attribute::SeriesInstanceUid => series_instance_uid = Some(value.to_string()),
            _ => expression
                .filter_conditions
                .push(parse_condition(attribute, value)?),
        }
    }

    let only_instance_uids = !expression.filter_conditions.is_empty()
        && expression
            .filter_conditions
            .iter()
            .all(|condition| condition.table() == TableKind::Mapping);

    tracing::debug!(
        conditions = expression.filter_conditions.len(),
        offset = expression.offset,
        limit = ?expression.limit,
        only_instance_uids,
        "parsed search parameters"
    );

    let mut options = QueryOptions::new(expression, policy).only_instance_uids(only_instance_uids);
    options.study_instance_uid = study_instance_uid;
    options.series_instance_uid = series_instance_uid;
    Ok(options)
}

/// Parse a DICOM DA value (`YYYYMMDD`).
pub fn parse_dicom_date(s: &str) -> Option<NaiveDate> {
    if s.len() != 8 || !s.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    NaiveDate::parse_from_str(s, "%Y%m%d").ok()
}

fn parse_condition(attribute: Attribute, value: &str) -> QidoResult<FilterCondition> {
    if !catalog::resolve(attribute).column.sql_type.is_temporal() {
        return Ok(FilterCondition::single(attribute, value));
    }

    let Some((low, high)) = value.split_once('-') else {
        let date = parse_dicom_date(value).ok_or_else(|| QidoParseError::InvalidDate {
            attribute,
            value: value.to_string(),
        })?;
        return Ok(FilterCondition::single(attribute, date));
    };

    let invalid_range = || QidoParseError::InvalidRange {
        attribute,
        value: value.to_string(),
    };
    if low.is_empty() && high.is_empty() {
        return Err(invalid_range());
    }

    let minimum = match low {
        "" => earliest_date(),
        s => parse_dicom_date(s).ok_or_else(invalid_range)?,
    };
    let maximum = match high {
        "" => latest_date(),
        s => parse_dicom_date(s).ok_or_else(invalid_range)?,
    };
    if minimum > maximum {
        return Err(invalid_range());
    }

    Ok(FilterCondition::range(attribute, minimum, maximum))
}

// Open range bounds are the limits of a SQL Server DATE column.
fn earliest_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(1, 1, 1).unwrap_or(NaiveDate::MIN)
}

fn latest_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(9999, 12, 31).unwrap_or(NaiveDate::MAX)
}

fn parse_integer(key: &str, value: &str) -> QidoResult<u32> {
    value.parse().map_err(|_| QidoParseError::InvalidInteger {
        key: key.to_string(),
        value: value.to_string(),
    })
}
