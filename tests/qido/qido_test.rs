//! QIDO-RS search parameters through to compiled statements.

use chrono::NaiveDate;
use insta::assert_snapshot;
use qido::catalog::Attribute;
use qido::config::LimitPolicy;
use qido::generator::{generate, QueryShape};
use qido::qido::{parse_pair, parse_query, QidoParseError};
use qido::query::QueryValue;

fn parse_request(query: &str) -> Result<qido::query::QueryOptions, QidoParseError> {
    let pairs = query
        .split('&')
        .map(parse_pair)
        .collect::<Result<Vec<_>, _>>()?;
    parse_query(pairs, &LimitPolicy::default())
}

#[test]
fn test_study_search_request() {
    let options =
        parse_request("PatientID=MRN-1001&StudyDate=20240101-&fuzzymatching=false&limit=20")
            .unwrap();
    let compiled = generate(&options).unwrap();

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
WHERE st.[PatientId] = @p0
  AND st.[StudyDate] BETWEEN @p1 AND @p2
ORDER BY m.[Watermark] DESC
OFFSET 0 ROWS FETCH NEXT 20 ROWS ONLY
");
    assert_eq!(
        compiled.parameters[2].value,
        QueryValue::Date(NaiveDate::from_ymd_opt(9999, 12, 31).unwrap())
    );
}

#[test]
fn test_instance_search_request() {
    let options =
        parse_request("0020000D=1.2.840.5&0020000E=1.2.840.5.1&00080018=1.2.840.5.1.9").unwrap();
    assert!(options.is_only_instance_uid_query);

    let compiled = generate(&options).unwrap();
    assert_eq!(compiled.shape, QueryShape::InstanceUidOnly);
    assert_snapshot!(compiled.sql, @r"
SELECT
  m.[StudyInstanceUid],
  m.[SeriesInstanceUid],
  m.[SopInstanceUid]
FROM [dbo].[UIDMapping] AS m
WHERE m.[StudyInstanceUid] = @p0
  AND m.[SeriesInstanceUid] = @p1
  AND m.[SopInstanceUid] = @p2
ORDER BY m.[Watermark] DESC
OFFSET 0 ROWS FETCH NEXT 100 ROWS ONLY
");
}

#[test]
fn test_series_search_with_offset() {
    let options = parse_request("Modality=SR&offset=60&limit=30&includefield=00081030").unwrap();
    let compiled = generate(&options).unwrap();

    assert!(compiled.sql.contains("INNER JOIN [dbo].[SeriesMetadataCore] AS se"));
    assert!(compiled.sql.ends_with("OFFSET 60 ROWS FETCH NEXT 30 ROWS ONLY"));
}

#[test]
fn test_rejected_requests() {
    assert!(matches!(
        parse_request("Modality"),
        Err(QidoParseError::MalformedPair(_))
    ));
    assert!(matches!(
        parse_request("StudyDate=2024"),
        Err(QidoParseError::InvalidDate {
            attribute: Attribute::StudyDate,
            ..
        })
    ));
    assert!(matches!(
        parse_request("offset=ten"),
        Err(QidoParseError::InvalidInteger { .. })
    ));
    assert!(matches!(
        parse_request("00191234=x"),
        Err(QidoParseError::UnknownAttribute(_))
    ));
}

#[test]
fn test_error_messages() {
    let err = parse_request("StudyDate=20240230").unwrap_err();
    assert_eq!(
        err.to_string(),
        "invalid date '20240230' for StudyDate, expected YYYYMMDD"
    );

    let err = parse_request("PatientAge=040Y").unwrap_err();
    assert_eq!(err.to_string(), "unsupported attribute: PatientAge");
}
