//! # envschema
//!
//! Schema-driven environment variable loading.
//!
//! `envschema` takes a declarative schema of the variables an application
//! expects and a flat key/value source, and produces a validated, immutable
//! [`Env`]: typed values, per-variable metadata and a camelCase view, all
//! computed once at construction.
//!
//! ## How It Works
//!
//! Environment variables are strings. Before validation each declared field
//! is classified by peeling its modifiers (`optional`, `default`,
//! `transform`, ...) down to a terminal kind, and its raw string is coerced
//! into a plausible candidate for that kind. Coercion never fails: anything
//! it cannot convert is passed through, so the schema engine reports the
//! exact type error against the original text.
//!
//! | Kind | Coercion |
//! |------|----------|
//! | number | trimmed, then parsed (`" 8080 "` → `8080`) |
//! | boolean | `true`/`1`/`on`/`yes`, `false`/`0`/`off`/`no` |
//! | object, array, set, tuple, record | parsed as JSON |
//! | string, enum | untouched, never trimmed |
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use envschema::schema::{self, SchemaExt};
//! use envschema::{Env, EnvSource, shape};
//!
//! fn main() -> miette::Result<()> {
//!     let env = Env::from_process_env(shape! {
//!         "DATABASE_URL" => schema::string().url(),
//!         "PORT" => schema::number().port().with_default(8080),
//!         "DEBUG" => schema::boolean().optional(),
//!     })?;
//!
//!     println!("listening on {}", env.data().get_u16("PORT").unwrap_or(8080));
//!     println!("database: {:?}", env.camel().get_str("databaseUrl"));
//!     Ok(())
//! }
//! ```
//!
//! ## Views
//!
//! | Accessor | Contents |
//! |----------|----------|
//! | [`Env::data`] | validated values by original name, including keys a transform added |
//! | [`Env::camel`] | the same values by camelCase name; on collision the first key wins |
//! | [`Env::meta`] | one [`EnvVar`] per declared key: name, validated value, raw string |
//! | [`Env::keys`] | every declared name mapped to itself |
//!
//! ## Narrowing
//!
//! [`Env::pick`] and [`Env::omit`] build a new [`Env`] over a subset of the
//! declared keys. Whole-object checks survive: they still see the fields
//! that were left out, using the values the parent already validated.
//!
//! ```rust,ignore
//! let db = env.pick(["DATABASE_URL"])?;
//! let public = env.omit(["API_TOKEN"])?;
//! ```
//!
//! ## Error Output Example
//!
//! ```text
//! envschema::validation
//!
//!   × 2 validation issue(s)
//!   │   - PORT: expected number, received string
//!   │   - MIRROR: must match USERNAME
//!
//! Error: envschema::issue
//!   help: expected number, received string
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Description | Default |
//! |---------|-------------|---------|
//! | `dotenv` | [`EnvSource::from_dotenv`] via [`dotenvy`] | **Yes** |
//! | `validator` | `email` / `url` string checks via [`validator`] | **Yes** |

#![deny(missing_docs)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]

// ============================================================================
// Re-exports
// ============================================================================

/// Re-export miette for rendering diagnostics.
pub use miette;

/// Re-export `serde_json`; every value in a view is a [`serde_json::Value`].
pub use serde_json;

/// Re-export dotenvy when the dotenv feature is enabled.
#[cfg(feature = "dotenv")]
pub use dotenvy;

/// Re-export validator when the validator feature is enabled.
#[cfg(feature = "validator")]
pub use validator;

// ============================================================================
// Core Modules
// ============================================================================

// Error types
mod error;
pub use error::Error;

/// Result alias used throughout the crate.
///
/// Errors convert into [`miette::Report`], so `main` can return
/// `miette::Result<()>` and use `?` for rendered diagnostics.
pub type Result<T, E = Error> = std::result::Result<T, E>;

pub mod schema;
pub mod validation;
pub mod value;

pub use validation::{CheckContext, Issue, IssueCode, PathSegment, ValidationError};
pub use value::{Record, View};

// ============================================================================
// Loading Pipeline
// ============================================================================

mod case;
mod classify;
mod coerce;
mod env;
mod resolve;
mod source;

pub use case::to_camel_case;
pub use classify::{Classifier, FieldKind, ModifierClassifier, classify};
pub use coerce::coerce;
pub use env::{Env, EnvVar, Keys, Meta};
pub use resolve::{Resolved, SchemaInput};
pub use source::{EnvSource, Origin};
