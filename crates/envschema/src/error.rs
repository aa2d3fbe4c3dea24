//! Error types for environment loading.
//!
//! This module contains the [`Error`] enum. It integrates with [`miette`] so
//! every failure renders with a diagnostic code and help text.
//!
//! # Error Variants
//!
//! | Variant | When It Occurs |
//! |---------|----------------|
//! | [`Error::SchemaResolution`] | Schema never resolves to an object of fields |
//! | [`Error::Validation`] | Coerced record rejected by the schema engine |
//! | [`Error::UndeclaredKey`] | `pick`/`omit` named a key the schema does not declare |
//! | [`Error::InvalidUtf8`] | A declared variable is not valid UTF-8 |
//! | [`Error::Dotenv`] | A `.env` file could not be read (with `dotenv` feature) |
//! | [`Error::Deserialize`] | A view could not be mapped onto a typed struct |
//!
//! # Propagation
//!
//! Construction is all-or-nothing: any of these aborts it and no partially
//! built [`Env`](crate::Env) is ever observable. Validation failures are
//! carried verbatim; use [`Error::validation`] to get the original
//! [`ValidationError`] back.

use miette::Diagnostic;
use thiserror::Error as ThisError;

use crate::validation::ValidationError;

/// Errors that can occur while building or narrowing an [`Env`](crate::Env).
///
/// # Diagnostic Codes
///
/// | Code | Meaning |
/// |------|---------|
/// | `envschema::schema_resolution` | Schema is not an object of fields |
/// | `envschema::validation` | One or more values failed validation |
/// | `envschema::undeclared_key` | Narrowing named an unknown key |
/// | `envschema::invalid_utf8` | Declared variable contains non-UTF-8 data |
/// | `envschema::dotenv` | `.env` file could not be loaded |
/// | `envschema::deserialize` | Typed extraction failed |
#[derive(Debug, ThisError, Diagnostic)]
pub enum Error {
    /// The schema does not ultimately resolve to an object of fields.
    #[error("schema must ultimately resolve to an object-of-fields, found {found}")]
    #[diagnostic(
        code(envschema::schema_resolution),
        help("wrap your fields in an object schema; transforms and pipelines must start from one")
    )]
    SchemaResolution {
        /// The kind of node the resolver stopped at.
        found: String,
    },

    /// The candidate record failed validation.
    ///
    /// The inner error is exactly what the schema engine reported.
    #[error(transparent)]
    #[diagnostic(transparent)]
    Validation(#[from] ValidationError),

    /// A narrowing operation referenced a key the schema does not declare.
    #[error("key '{key}' is not declared on the schema")]
    #[diagnostic(code(envschema::undeclared_key))]
    UndeclaredKey {
        /// The offending key.
        key: String,

        /// Help text listing declared keys.
        #[help]
        help: String,
    },

    /// A declared variable contains invalid UTF-8.
    #[error("environment variable {var} contains invalid UTF-8")]
    #[diagnostic(
        code(envschema::invalid_utf8),
        help("ensure the variable contains valid UTF-8 text")
    )]
    InvalidUtf8 {
        /// The name of the variable.
        var: String,
    },

    /// A `.env` file could not be read or parsed.
    #[cfg(feature = "dotenv")]
    #[error("failed to load dotenv file {path}")]
    #[diagnostic(
        code(envschema::dotenv),
        help("check that the file exists and uses KEY=VALUE lines")
    )]
    Dotenv {
        /// Path to the file.
        path: String,

        /// The underlying dotenvy error.
        #[source]
        source: dotenvy::Error,
    },

    /// A validated view could not be deserialized into the requested type.
    #[error("failed to deserialize environment at `{path}`: {message}")]
    #[diagnostic(
        code(envschema::deserialize),
        help("make sure the target type's fields match the declared schema")
    )]
    Deserialize {
        /// Field path where deserialization stopped.
        path: String,

        /// The serde error message.
        message: String,
    },
}

impl Error {
    /// Creates an `UndeclaredKey` error listing the keys that are declared.
    pub fn undeclared_key<'a>(
        key: impl Into<String>,
        declared: impl IntoIterator<Item = &'a str>,
    ) -> Self {
        let declared: Vec<&str> = declared.into_iter().collect();
        let help = if declared.is_empty() {
            "the schema declares no keys".to_string()
        } else {
            format!("declared keys are: {}", declared.join(", "))
        };

        Self::UndeclaredKey {
            key: key.into(),
            help,
        }
    }

    /// Creates a `SchemaResolution` error naming what was found instead.
    pub fn schema_resolution(found: impl Into<String>) -> Self {
        Self::SchemaResolution {
            found: found.into(),
        }
    }

    /// Returns the schema engine's error if this is a validation failure.
    #[must_use]
    pub const fn validation(&self) -> Option<&ValidationError> {
        match self {
            Self::Validation(err) => Some(err),
            _ => None,
        }
    }

    pub(crate) fn from_path_error(err: &serde_path_to_error::Error<serde_json::Error>) -> Self {
        let path = err.path().to_string();
        let message = err.inner().to_string();

        Self::Deserialize { path, message }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validation::Issue;

    #[test]
    fn test_error_undeclared_key() {
        let err = Error::undeclared_key("MISSING", ["PORT", "TOKEN"]);
        let display = err.to_string();
        assert!(display.contains("MISSING"));

        if let Error::UndeclaredKey { key, help } = err {
            assert_eq!(key, "MISSING");
            assert!(help.contains("PORT, TOKEN"));
        } else {
            panic!("Expected UndeclaredKey variant");
        }
    }

    #[test]
    fn test_error_schema_resolution() {
        let err = Error::schema_resolution("string");
        let display = err.to_string();
        assert!(display.contains("object-of-fields"));
        assert!(display.contains("string"));
    }

    #[test]
    fn test_validation_passes_through_unchanged() {
        let inner = ValidationError::new(vec![Issue::custom(["PORT"], "bad port")]);
        let err = Error::from(inner.clone());

        assert_eq!(err.validation(), Some(&inner));
        assert_eq!(err.to_string(), inner.to_string());
    }

    #[test]
    fn test_validation_accessor_none_for_other_variants() {
        let err = Error::InvalidUtf8 {
            var: "PATH".to_string(),
        };
        assert!(err.validation().is_none());
        assert!(err.to_string().contains("PATH"));
    }
}
