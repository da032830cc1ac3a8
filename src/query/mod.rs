//! Structured description of a metadata search.
//!
//! A [`QueryOptions`] is what the generator consumes: the filter conditions
//! and offset of a [`QueryExpression`], the direct study/series UID filters
//! taken from the request path, and the page size after the limit policy
//! has been applied.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::catalog::{self, Attribute, TableKind};
use crate::config::LimitPolicy;

// =============================================================================
// Values
// =============================================================================

/// A scalar value compared against an indexed column.
///
/// Values never appear in the statement text; they travel alongside it as
/// bound parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QueryValue {
    Text(String),
    Date(NaiveDate),
}

impl From<&str> for QueryValue {
    fn from(s: &str) -> Self {
        QueryValue::Text(s.into())
    }
}

impl From<String> for QueryValue {
    fn from(s: String) -> Self {
        QueryValue::Text(s)
    }
}

impl From<NaiveDate> for QueryValue {
    fn from(d: NaiveDate) -> Self {
        QueryValue::Date(d)
    }
}

// =============================================================================
// Filter Conditions
// =============================================================================

/// One attribute filter.
///
/// Every variant must be handled by the filter compiler - the compiler
/// enforces this.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum FilterCondition {
    /// `attribute = value`
    SingleValueMatch {
        attribute: Attribute,
        value: QueryValue,
    },

    /// `attribute BETWEEN minimum AND maximum`, both bounds inclusive.
    RangeMatch {
        attribute: Attribute,
        minimum: QueryValue,
        maximum: QueryValue,
    },
}

impl FilterCondition {
    pub fn single(attribute: Attribute, value: impl Into<QueryValue>) -> Self {
        FilterCondition::SingleValueMatch {
            attribute,
            value: value.into(),
        }
    }

    pub fn range(
        attribute: Attribute,
        minimum: impl Into<QueryValue>,
        maximum: impl Into<QueryValue>,
    ) -> Self {
        FilterCondition::RangeMatch {
            attribute,
            minimum: minimum.into(),
            maximum: maximum.into(),
        }
    }

    /// The attribute this condition filters on.
    pub fn attribute(&self) -> Attribute {
        match self {
            FilterCondition::SingleValueMatch { attribute, .. }
            | FilterCondition::RangeMatch { attribute, .. } => *attribute,
        }
    }

    /// The table owning the filtered attribute.
    pub fn table(&self) -> TableKind {
        catalog::resolve(self.attribute()).table
    }
}

// =============================================================================
// Query Expression
// =============================================================================

/// Filter conditions plus the requested page.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct QueryExpression {
    pub filter_conditions: Vec<FilterCondition>,
    pub offset: u32,
    /// Requested page size, before the limit policy is applied.
    pub limit: Option<u32>,
}

impl QueryExpression {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_condition(mut self, condition: FilterCondition) -> Self {
        self.filter_conditions.push(condition);
        self
    }

    pub fn with_offset(mut self, offset: u32) -> Self {
        self.offset = offset;
        self
    }

    pub fn with_limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit);
        self
    }

    /// No filter conditions.
    pub fn is_empty(&self) -> bool {
        self.filter_conditions.is_empty()
    }

    pub fn has_filter_conditions(&self) -> bool {
        !self.filter_conditions.is_empty()
    }
}

// =============================================================================
// Query Options
// =============================================================================

/// Everything the generator needs for one statement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryOptions {
    pub expression: QueryExpression,

    /// Direct filter from `/studies/{study}/...`.
    #[serde(default)]
    pub study_instance_uid: Option<String>,

    /// Direct filter from `/studies/{study}/series/{series}/...`.
    #[serde(default)]
    pub series_instance_uid: Option<String>,

    /// Only identifiers are filtered on, so the mapping table alone answers
    /// the query.
    #[serde(default)]
    pub is_only_instance_uid_query: bool,

    /// Page size actually applied.
    pub evaluated_limit: u32,
}

impl QueryOptions {
    /// Build options for `expression`, applying `policy` to its requested limit.
    pub fn new(expression: QueryExpression, policy: &LimitPolicy) -> Self {
        let evaluated_limit = policy.evaluate(expression.limit);
        Self {
            expression,
            study_instance_uid: None,
            series_instance_uid: None,
            is_only_instance_uid_query: false,
            evaluated_limit,
        }
    }

    pub fn with_study_instance_uid(mut self, uid: impl Into<String>) -> Self {
        self.study_instance_uid = Some(uid.into());
        self
    }

    pub fn with_series_instance_uid(mut self, uid: impl Into<String>) -> Self {
        self.series_instance_uid = Some(uid.into());
        self
    }

    pub fn only_instance_uids(mut self, only: bool) -> Self {
        self.is_only_instance_uid_query = only;
        self
    }

    /// Override the evaluated page size.
    pub fn with_evaluated_limit(mut self, limit: u32) -> Self {
        self.evaluated_limit = limit;
        self
    }

    /// Re-apply `policy` to the evaluated page size: zero becomes the
    /// default, anything above the maximum is clamped.
    pub fn with_limit_policy(mut self, policy: &LimitPolicy) -> Self {
        self.evaluated_limit = policy.evaluate(Some(self.evaluated_limit));
        self
    }

    /// Either direct UID filter is present.
    pub fn has_uid_filter(&self) -> bool {
        self.study_instance_uid.is_some() || self.series_instance_uid.is_some()
    }

    /// A direct UID filter or a structured filter condition is present.
    pub fn any_filter_condition(&self) -> bool {
        self.has_uid_filter() || self.expression.has_filter_conditions()
    }

    /// No filter of any kind.
    pub fn is_empty(&self) -> bool {
        !self.any_filter_condition()
    }
}
