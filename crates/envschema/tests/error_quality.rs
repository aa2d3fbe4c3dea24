//! Error message quality tests.
//!
//! Ensures errors carry stable diagnostic codes, precise field paths and
//! reach the caller exactly as the schema engine produced them.

#![allow(clippy::pedantic)]

use envschema::miette::Diagnostic;
use envschema::schema::{self, SchemaExt};
use envschema::{Env, EnvSource, Error, IssueCode, shape};

fn source(pairs: &[(&str, &str)]) -> EnvSource {
    EnvSource::from_pairs(pairs.iter().copied())
}

fn code(err: &dyn Diagnostic) -> String {
    err.code().map(|c| c.to_string()).unwrap_or_default()
}

// ============================================================================
// Validation Errors
// ============================================================================

#[test]
fn test_all_issues_reported_at_once() {
    let err = Env::new(
        shape! {
            "PORT" => schema::number(),
            "DEBUG" => schema::boolean(),
            "DATABASE_URL" => schema::string(),
        },
        source(&[("PORT", "eighty"), ("DEBUG", "maybe")]),
    )
    .unwrap_err();

    let validation = err.validation().unwrap();
    let paths: Vec<_> = validation.issues().iter().map(|i| i.path_string()).collect();
    assert_eq!(paths, vec!["PORT", "DEBUG", "DATABASE_URL"]);

    let codes: Vec<_> = validation.issues().iter().map(|i| i.code).collect();
    assert_eq!(
        codes,
        vec![IssueCode::InvalidType, IssueCode::InvalidType, IssueCode::Required]
    );
}

#[test]
fn test_type_errors_name_received_kind() {
    let err = Env::new(
        shape! { "PORT" => schema::number() },
        source(&[("PORT", "80a")]),
    )
    .unwrap_err();

    let display = err.to_string();
    assert!(display.contains("PORT"), "should name the field: {display}");
    assert!(
        display.contains("expected number, received string"),
        "should explain the mismatch: {display}"
    );
}

#[test]
fn test_broken_json_is_a_validation_failure() {
    let err = Env::new(
        shape! { "CONFIG" => schema::object(shape! { "nested" => schema::string() }) },
        source(&[("CONFIG", "{broken json")]),
    )
    .unwrap_err();

    let issue = &err.validation().unwrap().issues()[0];
    assert_eq!(issue.path_string(), "CONFIG");
    assert_eq!(issue.message, "expected object, received string");
}

#[test]
fn test_nested_paths() {
    let err = Env::new(
        shape! {
            "DATABASE" => schema::object(shape! { "port" => schema::number().port() }),
            "HOSTS" => schema::array(schema::string()),
        },
        source(&[("DATABASE", r#"{"port": 0}"#), ("HOSTS", r#"["a", 2]"#)]),
    )
    .unwrap_err();

    let paths: Vec<_> = err
        .validation()
        .unwrap()
        .issues()
        .iter()
        .map(|i| i.path_string())
        .collect();
    assert_eq!(paths, vec!["DATABASE.port", "HOSTS.1"]);
}

#[test]
fn test_validation_diagnostic_is_transparent() {
    let err = Env::new(
        shape! { "PORT" => schema::number().port() },
        source(&[("PORT", "70000")]),
    )
    .unwrap_err();

    assert_eq!(code(&err), "envschema::validation");

    let related: Vec<_> = err.related().unwrap().collect();
    assert_eq!(related.len(), 1);
    assert_eq!(code(related[0]), "envschema::issue");
}

#[test]
fn test_catch_swallows_field_issues() {
    let env = Env::new(
        shape! { "RETRIES" => schema::number().int().catch(3) },
        source(&[("RETRIES", "lots")]),
    )
    .unwrap();

    assert_eq!(env.data().get_i64("RETRIES"), Some(3));
}

#[cfg(feature = "validator")]
#[test]
fn test_format_checks() {
    let err = Env::new(
        shape! {
            "ADMIN_EMAIL" => schema::string().email(),
            "API_URL" => schema::string().url(),
        },
        source(&[("ADMIN_EMAIL", "not-an-email"), ("API_URL", "nope")]),
    )
    .unwrap_err();

    let validation = err.validation().unwrap();
    assert_eq!(validation.issues_for("ADMIN_EMAIL").count(), 1);
    assert_eq!(validation.issues_for("API_URL").count(), 1);
    assert!(
        validation
            .issues()
            .iter()
            .all(|i| i.code == IssueCode::InvalidString)
    );
}

// ============================================================================
// Schema and Narrowing Errors
// ============================================================================

#[test]
fn test_schema_resolution_error() {
    let err = Env::new(schema::string().transform(|v| v), source(&[])).unwrap_err();

    assert_eq!(code(&err), "envschema::schema_resolution");
    assert!(err.to_string().contains("object-of-fields"));
    assert!(err.help().is_some());
}

#[test]
fn test_undeclared_key_has_help() {
    let env = Env::new(
        shape! { "PORT" => schema::number().optional() },
        source(&[]),
    )
    .unwrap();

    let err = env.omit(["MISSING"]).unwrap_err();
    assert_eq!(code(&err), "envschema::undeclared_key");
    assert!(err.to_string().contains("MISSING"));

    let help = err.help().unwrap().to_string();
    assert!(help.contains("PORT"), "help should list declared keys: {help}");
}

#[test]
fn test_deserialize_error_names_field() {
    #[derive(Debug, serde::Deserialize)]
    struct Typed {
        #[serde(rename = "PORT")]
        _port: u8,
    }

    let env = Env::new(
        shape! { "PORT" => schema::number() },
        source(&[("PORT", "8080")]),
    )
    .unwrap();

    let err = env.deserialize::<Typed>().unwrap_err();
    assert_eq!(code(&err), "envschema::deserialize");

    match err {
        Error::Deserialize { path, .. } => assert_eq!(path, "PORT"),
        other => panic!("Expected Deserialize, got {other:?}"),
    }
}

#[test]
fn test_miette_report_renders() {
    let err = Env::new(
        shape! { "DEBUG" => schema::boolean() },
        source(&[("DEBUG", "maybe")]),
    )
    .unwrap_err();

    let report = envschema::miette::Report::new(err);
    let rendered = format!("{report:?}");
    assert!(rendered.contains("DEBUG"), "report should name the field: {rendered}");
}
