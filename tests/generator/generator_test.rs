//! End-to-end generation tests: options in, full T-SQL statement out.

#[path = "../common/mod.rs"]
mod common;

use common::{assert_valid_tsql, date};
use insta::assert_snapshot;
use qido::catalog::{Attribute, TableKind};
use qido::config::LimitPolicy;
use qido::generator::{generate, generate_in_schema, QueryError, QueryShape};
use qido::query::{FilterCondition, QueryExpression, QueryOptions, QueryValue};
use qido::sql::SqlType;

fn options(expression: QueryExpression) -> QueryOptions {
    QueryOptions::new(expression, &LimitPolicy::default())
}

#[test]
fn test_series_uid_only_lookup() {
    let compiled = generate(
        &options(QueryExpression::new().with_limit(25))
            .with_study_instance_uid("1.2.840.113619.2.1")
            .with_series_instance_uid("1.2.840.113619.2.1.3"),
    )
    .unwrap();

    assert_eq!(compiled.shape, QueryShape::InstanceUidOnly);
    assert_snapshot!(compiled.sql, @r"
SELECT
  m.[StudyInstanceUid],
  m.[SeriesInstanceUid],
  m.[SopInstanceUid]
FROM [dbo].[UIDMapping] AS m
WHERE m.[StudyInstanceUid] = @p0
  AND m.[SeriesInstanceUid] = @p1
ORDER BY m.[Watermark] DESC
OFFSET 0 ROWS FETCH NEXT 25 ROWS ONLY
");
    assert_valid_tsql(&compiled.sql);
}

#[test]
fn test_instance_lookup_within_study() {
    let expression = QueryExpression::new()
        .with_condition(FilterCondition::single(Attribute::SopInstanceUid, "1.2.3.4.5.6"));
    let compiled = generate(
        &options(expression)
            .with_study_instance_uid("1.2.3")
            .only_instance_uids(true),
    )
    .unwrap();

    assert_snapshot!(compiled.sql, @r"
SELECT
  m.[StudyInstanceUid],
  m.[SeriesInstanceUid],
  m.[SopInstanceUid]
FROM [dbo].[UIDMapping] AS m
WHERE m.[StudyInstanceUid] = @p0
  AND m.[SopInstanceUid] = @p1
ORDER BY m.[Watermark] DESC
OFFSET 0 ROWS FETCH NEXT 100 ROWS ONLY
");
    assert_eq!(compiled.parameter_declarations(), "@p0 VARCHAR(64), @p1 VARCHAR(64)");
    assert_valid_tsql(&compiled.sql);
}

#[test]
fn test_study_level_search() {
    let expression = QueryExpression::new()
        .with_condition(FilterCondition::single(Attribute::PatientName, "DOE^JANE"))
        .with_condition(FilterCondition::range(
            Attribute::StudyDate,
            date(2023, 1, 1),
            date(2023, 3, 31),
        ))
        .with_offset(100)
        .with_limit(100);
    let compiled = generate(&options(expression)).unwrap();

    assert_eq!(compiled.shape, QueryShape::AttributeJoin);
    assert_snapshot!(compiled.sql, @r"
SELECT
  m.[StudyInstanceUid],
  m.[SeriesInstanceUid],
  m.[SopInstanceUid]
FROM [dbo].[StudyMetadataCore] AS st
CROSS APPLY (
  SELECT TOP 1 *
  FROM [dbo].[UIDMapping]
  WHERE [StudyInstanceUid] = st.[StudyInstanceUid]
) AS m
WHERE st.[PatientName] = @p0
  AND st.[StudyDate] BETWEEN @p1 AND @p2
ORDER BY m.[Watermark] DESC
OFFSET 100 ROWS FETCH NEXT 100 ROWS ONLY
");
    assert_valid_tsql(&compiled.sql);
}

#[test]
fn test_series_level_search_within_study() {
    let expression = QueryExpression::new()
        .with_condition(FilterCondition::single(Attribute::Modality, "MR"))
        .with_condition(FilterCondition::single(
            Attribute::PerformedProcedureStepStartDate,
            date(2022, 7, 14),
        ));
    let compiled = generate(&options(expression).with_study_instance_uid("1.2.840.9")).unwrap();

    assert_snapshot!(compiled.sql, @r"
SELECT
  m.[StudyInstanceUid],
  m.[SeriesInstanceUid],
  m.[SopInstanceUid]
FROM [dbo].[StudyMetadataCore] AS st
INNER JOIN [dbo].[SeriesMetadataCore] AS se ON se.[ID] = st.[ID]
CROSS APPLY (
  SELECT TOP 1 *
  FROM [dbo].[UIDMapping]
  WHERE [StudyInstanceUid] = st.[StudyInstanceUid]
    AND [SeriesInstanceUid] = se.[SeriesInstanceUid]
    AND [StudyInstanceUid] = @p0
) AS m
WHERE se.[Modality] = @p1
  AND se.[PerformedProcedureStepStartDate] = @p2
ORDER BY m.[Watermark] DESC
OFFSET 0 ROWS FETCH NEXT 100 ROWS ONLY
");
    assert_valid_tsql(&compiled.sql);
}

#[test]
fn test_parameters_carry_values_and_types() {
    let expression = QueryExpression::new()
        .with_condition(FilterCondition::single(Attribute::AccessionNumber, "ACC-42"))
        .with_condition(FilterCondition::range(
            Attribute::StudyDate,
            date(2020, 1, 1),
            date(2020, 1, 31),
        ));
    let compiled = generate(&options(expression).with_series_instance_uid("1.2.3.4")).unwrap();

    let summary: Vec<_> = compiled
        .parameters
        .iter()
        .map(|p| (p.name.as_str(), p.column, p.sql_type, p.value.clone()))
        .collect();
    assert_eq!(
        summary,
        vec![
            ("@p0", "SeriesInstanceUid", SqlType::VarChar(64), QueryValue::Text("1.2.3.4".into())),
            ("@p1", "AccessionNumber", SqlType::NVarChar(16), QueryValue::Text("ACC-42".into())),
            ("@p2", "StudyDate", SqlType::Date, QueryValue::Date(date(2020, 1, 1))),
            ("@p3", "StudyDate", SqlType::Date, QueryValue::Date(date(2020, 1, 31))),
        ]
    );
}

#[test]
fn test_custom_schema() {
    let expression =
        QueryExpression::new().with_condition(FilterCondition::single(Attribute::Modality, "US"));
    let compiled = generate_in_schema(&options(expression), "pacs").unwrap();

    assert!(compiled.sql.contains("FROM [pacs].[StudyMetadataCore] AS st"));
    assert!(compiled.sql.contains("INNER JOIN [pacs].[SeriesMetadataCore] AS se"));
    assert!(compiled.sql.contains("FROM [pacs].[UIDMapping]"));
    assert!(!compiled.sql.contains("[dbo]"));
    assert_valid_tsql(&compiled.sql);
}

#[test]
fn test_series_attribute_in_identifier_only_query_is_an_error() {
    let expression =
        QueryExpression::new().with_condition(FilterCondition::single(Attribute::Modality, "CT"));
    let result = generate(&options(expression).only_instance_uids(true));

    assert_eq!(
        result.unwrap_err(),
        QueryError::AliasNotInScope {
            attribute: Attribute::Modality,
            table: TableKind::Series,
        }
    );
}

#[test]
fn test_compiled_query_json() {
    let expression =
        QueryExpression::new().with_condition(FilterCondition::single(Attribute::PatientId, "P-1"));
    let compiled = generate(&options(expression)).unwrap();

    let json = serde_json::to_value(&compiled).unwrap();
    assert_eq!(json["shape"], "attribute_join");
    assert_eq!(json["parameters"][0]["name"], "@p0");
    assert_eq!(json["parameters"][0]["column"], "PatientId");
    assert_eq!(json["parameters"][0]["sql_type"]["n_var_char"], 64);
    assert_eq!(json["parameters"][0]["value"]["text"], "P-1");
}

#[test]
fn test_generation_is_repeatable() {
    let expression = QueryExpression::new()
        .with_condition(FilterCondition::single(Attribute::StudyDescription, "CHEST"));
    let options = options(expression);

    assert_eq!(generate(&options).unwrap(), generate(&options).unwrap());
}

#[test]
fn test_options_file_with_zero_limit_gets_policy_limit() {
    let json = r#"{"expression":{"filter_conditions":[]},"evaluated_limit":0}"#;
    let policy = LimitPolicy::default();

    let options: QueryOptions = serde_json::from_str(json).unwrap();
    let compiled = generate(&options.with_limit_policy(&policy)).unwrap();

    assert!(compiled.sql.ends_with("OFFSET 0 ROWS FETCH NEXT 100 ROWS ONLY"));
    assert_valid_tsql(&compiled.sql);
}

#[test]
fn test_options_file_with_oversized_limit_is_clamped() {
    let json = r#"{
        "expression": {
            "filter_conditions": [
                { "type": "single_value_match", "attribute": "Modality", "value": { "text": "CT" } }
            ],
            "offset": 10
        },
        "evaluated_limit": 100000
    }"#;
    let policy = LimitPolicy::default();

    let options: QueryOptions = serde_json::from_str(json).unwrap();
    let compiled = generate(&options.with_limit_policy(&policy)).unwrap();

    assert!(compiled.sql.ends_with("OFFSET 10 ROWS FETCH NEXT 200 ROWS ONLY"));
    assert_valid_tsql(&compiled.sql);
}
