//! Tests for the derived views: data, camel, meta and keys.

#![allow(clippy::pedantic)]

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use envschema::schema::{self, SchemaExt};
use envschema::serde_json::{Value, json};
use envschema::{Env, EnvSource, shape};

fn source(pairs: &[(&str, &str)]) -> EnvSource {
    EnvSource::from_pairs(pairs.iter().copied())
}

// ============================================================================
// Metadata
// ============================================================================

#[test]
fn test_meta_name_and_raw_are_identity() {
    let raw = [("PORT", " 8080 "), ("HOST", "  example.com "), ("DEBUG", "Yes")];
    let env = Env::new(
        shape! {
            "PORT" => schema::number(),
            "HOST" => schema::string(),
            "DEBUG" => schema::boolean(),
        },
        source(&raw),
    )
    .unwrap();

    for (name, value) in raw {
        let var = env.meta().get(name).unwrap();
        assert_eq!(var.name(), name);
        assert_eq!(var.raw(), Some(value));
    }

    assert_eq!(env.meta().get("PORT").unwrap().val(), Some(&json!(8080)));
    assert_eq!(env.meta().get("DEBUG").unwrap().val(), Some(&json!(true)));
}

#[test]
fn test_meta_follows_declaration_order() {
    let env = Env::new(
        shape! {
            "ZETA" => schema::string().optional(),
            "ALPHA" => schema::string().optional(),
        },
        source(&[]),
    )
    .unwrap();

    assert_eq!(env.meta().keys().collect::<Vec<_>>(), vec!["ZETA", "ALPHA"]);
    let pairs: Vec<_> = env.keys().iter().collect();
    assert_eq!(pairs, vec![("ZETA", "ZETA"), ("ALPHA", "ALPHA")]);
}

// ============================================================================
// Value View
// ============================================================================

#[test]
fn test_string_values_are_never_trimmed() {
    let env = Env::new(
        shape! { "GREETING" => schema::string() },
        source(&[("GREETING", "  hello  ")]),
    )
    .unwrap();

    assert_eq!(env.data().get_str("GREETING"), Some("  hello  "));
}

#[test]
fn test_blank_optional_is_distinct_from_missing() {
    let schema = shape! { "OPTIONAL" => schema::string().optional() };

    let blank = Env::new(schema.clone(), source(&[("OPTIONAL", "   ")])).unwrap();
    assert_eq!(blank.data().get_str("OPTIONAL"), Some("   "));
    assert_eq!(blank.meta().get("OPTIONAL").unwrap().raw(), Some("   "));

    let missing = Env::new(schema, source(&[])).unwrap();
    assert!(!missing.data().contains_key("OPTIONAL"));
    assert_eq!(missing.meta().get("OPTIONAL").unwrap().raw(), None);
    assert_eq!(missing.meta().get("OPTIONAL").unwrap().val(), None);
}

#[test]
fn test_defaults_fill_missing_values() {
    let env = Env::new(
        shape! {
            "PORT" => schema::number().port().with_default(8080),
            "LOG_LEVEL" => schema::enumeration(["debug", "info"]).with_default("info"),
        },
        source(&[]),
    )
    .unwrap();

    assert_eq!(env.data().get_u16("PORT"), Some(8080));
    assert_eq!(env.data().get_str("LOG_LEVEL"), Some("info"));
    assert_eq!(env.meta().get("PORT").unwrap().raw(), None);
}

#[test]
fn test_structured_values() {
    let env = Env::new(
        shape! {
            "CONFIG" => schema::object(shape! { "nested" => schema::string() }),
            "HOSTS" => schema::array(schema::string()),
        },
        source(&[("CONFIG", r#"{"nested":"value"}"#), ("HOSTS", r#"["a","b"]"#)]),
    )
    .unwrap();

    assert_eq!(env.data().get("CONFIG"), Some(&json!({"nested": "value"})));
    let hosts: Vec<String> = env.data().get_as("HOSTS").unwrap();
    assert_eq!(hosts, vec!["a", "b"]);
}

#[test]
fn test_transform_added_keys_appear_in_data_and_camel() {
    let node = schema::object(shape! { "HOST" => schema::string(), "PORT" => schema::number() })
        .transform(|mut value| {
            if let Value::Object(map) = &mut value {
                let host = map.get("HOST").and_then(Value::as_str).unwrap_or_default();
                let port = map.get("PORT").and_then(Value::as_u64).unwrap_or_default();
                let address = format!("{host}:{port}");
                map.insert("BIND_ADDRESS".to_string(), json!(address));
            }
            value
        });

    let env = Env::new(node, source(&[("HOST", "0.0.0.0"), ("PORT", "80")])).unwrap();

    assert_eq!(env.data().get_str("BIND_ADDRESS"), Some("0.0.0.0:80"));
    assert_eq!(env.camel().get_str("bindAddress"), Some("0.0.0.0:80"));
    assert!(!env.meta().contains_key("BIND_ADDRESS"));
    assert!(!env.keys().contains("BIND_ADDRESS"));
}

#[test]
fn test_transform_removed_keys_leave_meta_val_empty() {
    let node = schema::object(shape! { "SECRET" => schema::string(), "NAME" => schema::string() })
        .transform(|mut value| {
            if let Value::Object(map) = &mut value {
                map.remove("SECRET");
            }
            value
        });

    let env = Env::new(node, source(&[("SECRET", "s3cr3t"), ("NAME", "app")])).unwrap();

    assert!(!env.data().contains_key("SECRET"));
    let secret = env.meta().get("SECRET").unwrap();
    assert_eq!(secret.val(), None);
    assert_eq!(secret.raw(), Some("s3cr3t"));
}

// ============================================================================
// Camel View
// ============================================================================

#[test]
fn test_camel_names() {
    let env = Env::new(
        shape! {
            "DATABASE_URL" => schema::string(),
            "maxRetries" => schema::number(),
        },
        source(&[("DATABASE_URL", "postgres://db"), ("maxRetries", "3")]),
    )
    .unwrap();

    assert_eq!(env.camel().get_str("databaseUrl"), Some("postgres://db"));
    assert_eq!(env.camel().get_i64("maxRetries"), Some(3));
    assert_eq!(env.camel().len(), 2);
}

#[test]
fn test_camel_collision_first_declared_wins() {
    let env = Env::new(
        shape! {
            "FOO_BAR" => schema::string(),
            "fooBar" => schema::string(),
        },
        source(&[("FOO_BAR", "screaming"), ("fooBar", "camel")]),
    )
    .unwrap();

    assert_eq!(env.camel().get_str("fooBar"), Some("screaming"));
    assert_eq!(env.camel().len(), 1);
    assert_eq!(env.data().get_str("FOO_BAR"), Some("screaming"));
    assert_eq!(env.data().get_str("fooBar"), Some("camel"));
}

// ============================================================================
// Construction
// ============================================================================

#[test]
fn test_construction_is_repeatable() {
    let schema = shape! {
        "PORT" => schema::number(),
        "NAME" => schema::string().optional(),
    };
    let src = source(&[("PORT", "1")]);

    let first = Env::new(schema.clone(), src.clone()).unwrap();
    let second = Env::new(schema, src).unwrap();

    assert_eq!(first.data(), second.data());
    assert_eq!(first.camel(), second.camel());
    assert_eq!(first.meta(), second.meta());
}

#[test]
fn test_generated_default_runs_once_per_construction() {
    let counter = Arc::new(AtomicUsize::new(0));
    let c = Arc::clone(&counter);

    let schema = shape! {
        "ID" => schema::string().with_default_fn(move || {
            json!((c.fetch_add(1, Ordering::SeqCst) + 1).to_string())
        }),
    };

    let ids: Vec<String> = (0..3)
        .map(|_| {
            let env = Env::new(schema.clone(), source(&[])).unwrap();
            env.data().get_str("ID").unwrap().to_string()
        })
        .collect();

    assert_eq!(ids, vec!["1", "2", "3"]);
}

#[test]
fn test_from_names_declares_optional_strings() {
    let env = Env::from_names(["PORT", "HOST"], source(&[("PORT", " 80 ")])).unwrap();

    assert_eq!(env.data().get_str("PORT"), Some(" 80 "));
    assert!(!env.data().contains_key("HOST"));
    assert!(env.meta().contains_key("HOST"));
}

#[test]
fn test_from_values_infers_fields_from_source() {
    let env = Env::from_values(source(&[("B", "2"), ("A", "true")])).unwrap();

    assert_eq!(env.keys().len(), 2);
    assert_eq!(env.data().get_str("A"), Some("true"));
    assert_eq!(env.data().get_str("B"), Some("2"));
}

#[test]
fn test_deserialize_views() {
    #[derive(serde::Deserialize)]
    struct Server {
        #[serde(rename = "PORT")]
        port: u16,
        #[serde(rename = "DEBUG")]
        debug: Option<bool>,
    }

    #[derive(serde::Deserialize)]
    #[serde(rename_all = "camelCase")]
    struct Database {
        database_url: String,
    }

    let env = Env::new(
        shape! {
            "PORT" => schema::number().port(),
            "DEBUG" => schema::boolean().optional(),
            "DATABASE_URL" => schema::string(),
        },
        source(&[("PORT", "5432"), ("DATABASE_URL", "postgres://db")]),
    )
    .unwrap();

    let server: Server = env.deserialize().unwrap();
    assert_eq!(server.port, 5432);
    assert_eq!(server.debug, None);

    let db: Database = env.deserialize_camel().unwrap();
    assert_eq!(db.database_url, "postgres://db");
}
