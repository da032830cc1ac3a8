//! Settings file loading and its effect on generated statements.

use qido::config::{Settings, SettingsError};
use qido::generator::generate_in_schema;
use qido::qido::parse_query;
use std::fs;

#[test]
fn test_load_settings_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("qido.toml");
    fs::write(
        &path,
        r#"
[limits]
default_limit = 25
max_limit = 50

[schema]
name = "imaging"

[logging]
level = "qido=debug"
"#,
    )
    .unwrap();

    let settings = Settings::discover(Some(path.as_path())).unwrap();
    assert_eq!(settings.limits.default_limit, 25);
    assert_eq!(settings.limits.max_limit, 50);
    assert_eq!(settings.schema.name, "imaging");
    assert_eq!(settings.logging.level, "qido=debug");
}

#[test]
fn test_settings_drive_limit_and_schema() {
    let settings = Settings::from_toml_str(
        "[limits]\ndefault_limit = 25\nmax_limit = 50\n\n[schema]\nname = \"imaging\"\n",
    )
    .unwrap();

    let options = parse_query([("Modality", "CT"), ("limit", "80")], &settings.limits).unwrap();
    let compiled = generate_in_schema(&options, &settings.schema.name).unwrap();

    assert!(compiled.sql.contains("FROM [imaging].[StudyMetadataCore] AS st"));
    assert!(compiled.sql.ends_with("OFFSET 0 ROWS FETCH NEXT 50 ROWS ONLY"));

    let options = parse_query([("Modality", "CT")], &settings.limits).unwrap();
    let compiled = generate_in_schema(&options, &settings.schema.name).unwrap();
    assert!(compiled.sql.ends_with("FETCH NEXT 25 ROWS ONLY"));
}

#[test]
fn test_invalid_settings_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("qido.toml");
    fs::write(&path, "[limits]\nmax_limit = 0\n").unwrap();

    let err = Settings::load(&path).unwrap_err();
    assert!(matches!(err, SettingsError::InvalidConfig(_)));
    assert!(err.to_string().contains("max_limit"));
}

#[test]
fn test_unknown_type_is_parse_error() {
    let err = Settings::from_toml_str("[limits]\ndefault_limit = \"many\"\n").unwrap_err();
    assert!(matches!(err, SettingsError::ParseError(_)));
}
