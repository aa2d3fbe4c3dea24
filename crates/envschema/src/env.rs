//! The validated environment and its views.
//!
//! Construction is a single pass:
//!
//! ```text
//! source ──► classify + coerce per field ──► validate record ──► meta / data / camel / keys
//! ```
//!
//! Every view is computed once and never changes afterwards. Narrowing
//! with [`Env::pick`] or [`Env::omit`] repeats the pass against a smaller
//! schema and the same shared source.

use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::case::to_camel_case;
use crate::classify::classify;
use crate::coerce::coerce;
use crate::resolve::{Resolved, SchemaInput};
use crate::schema::{ObjectCheck, ObjectSchema, SchemaNode};
use crate::source::EnvSource;
use crate::value::{Record, View};
use crate::{Error, Result};

// ============================================================================
// Metadata
// ============================================================================

/// Metadata for one declared variable.
#[derive(Clone, Debug, PartialEq)]
pub struct EnvVar {
    name: String,
    val: Option<Value>,
    raw: Option<String>,
}

impl EnvVar {
    /// The declared name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The validated value, `None` if absent or removed by a transform.
    #[must_use]
    pub const fn val(&self) -> Option<&Value> {
        self.val.as_ref()
    }

    /// The raw string exactly as it appeared in the source.
    #[must_use]
    pub fn raw(&self) -> Option<&str> {
        self.raw.as_deref()
    }
}

/// Per-variable metadata, one entry per declared key in declaration order.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Meta {
    vars: Vec<EnvVar>,
}

impl Meta {
    /// Returns the metadata of `name`.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&EnvVar> {
        self.vars.iter().find(|var| var.name == name)
    }

    /// Whether `name` is declared.
    #[must_use]
    pub fn contains_key(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Declared names in order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.vars.iter().map(EnvVar::name)
    }

    /// Entries in declaration order.
    pub fn iter(&self) -> std::slice::Iter<'_, EnvVar> {
        self.vars.iter()
    }

    /// Number of declared variables.
    #[must_use]
    pub fn len(&self) -> usize {
        self.vars.len()
    }

    /// Whether nothing is declared.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.vars.is_empty()
    }
}

impl<'a> IntoIterator for &'a Meta {
    type Item = &'a EnvVar;
    type IntoIter = std::slice::Iter<'a, EnvVar>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Maps every declared name to itself.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Keys {
    names: Vec<String>,
}

impl Keys {
    /// Returns `name` if it is declared.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.names
            .iter()
            .find(|n| *n == name)
            .map(String::as_str)
    }

    /// Whether `name` is declared.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// `(name, name)` pairs in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.names.iter().map(|n| (n.as_str(), n.as_str()))
    }

    /// Number of declared names.
    #[must_use]
    pub fn len(&self) -> usize {
        self.names.len()
    }

    /// Whether nothing is declared.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

// ============================================================================
// Env
// ============================================================================

/// A validated, immutable view of the environment.
///
/// # Example
///
/// ```rust,ignore
/// use envschema::{Env, EnvSource, schema::{self, SchemaExt}, shape};
///
/// let env = Env::new(
///     shape! {
///         "PORT" => schema::number().port().with_default(8080),
///         "DEBUG" => schema::boolean().optional(),
///     },
///     EnvSource::from_pairs([("PORT", " 3000 ")]),
/// )?;
///
/// assert_eq!(env.data().get_u16("PORT"), Some(3000));
/// assert_eq!(env.meta().get("PORT").and_then(|v| v.raw()), Some(" 3000 "));
/// assert_eq!(env.camel().get_u16("port"), Some(3000));
/// ```
#[derive(Clone, Debug)]
pub struct Env {
    schema: ObjectSchema,
    parser: SchemaNode,
    checks: Vec<ObjectCheck>,
    source: EnvSource,
    meta: Meta,
    data: View,
    camel: View,
    keys: Keys,
}

impl Env {
    /// Builds an environment from `schema` and `source`.
    ///
    /// # Errors
    ///
    /// - [`Error::SchemaResolution`] if the schema is not an object of fields
    /// - [`Error::InvalidUtf8`] if a declared variable is not UTF-8
    /// - [`Error::Validation`] if the coerced record fails validation
    pub fn new(schema: impl Into<SchemaInput>, source: EnvSource) -> Result<Self> {
        let resolved = schema.into().resolve()?;
        Self::build(resolved, source)
    }

    /// Builds an environment from `schema` and the process environment.
    ///
    /// # Errors
    ///
    /// Same as [`Env::new`].
    pub fn from_process_env(schema: impl Into<SchemaInput>) -> Result<Self> {
        Self::new(schema, EnvSource::from_process_env())
    }

    /// Builds an environment where every name is an optional string.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidUtf8`] if a named variable is not UTF-8.
    pub fn from_names<I, S>(names: I, source: EnvSource) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let names: Vec<String> = names.into_iter().map(Into::into).collect();
        Self::new(SchemaInput::Names(names), source)
    }

    /// Builds an environment declaring every key of `source` as an optional
    /// string.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidUtf8`] if a key's value is not UTF-8.
    pub fn from_values(source: EnvSource) -> Result<Self> {
        let names: Vec<String> = source.keys().into_iter().map(ToString::to_string).collect();
        Self::new(SchemaInput::Names(names), source)
    }

    fn build(resolved: Resolved, source: EnvSource) -> Result<Self> {
        let Resolved {
            object: schema,
            parser,
            checks,
        } = resolved;

        let shape = schema.shape();
        let mut candidate = Record::new();
        let mut raws = Vec::with_capacity(shape.len());

        for (name, node) in shape.iter() {
            let raw = source.read_declared(name)?;
            let kind = classify(node);

            tracing::trace!(field = name, %kind, present = raw.is_some(), "coercing field");

            if let Some(value) = coerce(raw, kind) {
                candidate.insert(name.to_string(), value);
            }
            raws.push((name.to_string(), raw.map(ToString::to_string)));
        }

        let record = match parser.validate(Some(Value::Object(candidate)))? {
            Some(Value::Object(record)) => record,
            other => {
                tracing::warn!(
                    produced = other.as_ref().map_or("nothing", crate::value::kind_name),
                    "schema did not produce an object; value views are empty"
                );
                Record::new()
            }
        };

        let meta = Meta {
            vars: raws
                .into_iter()
                .map(|(name, raw)| EnvVar {
                    val: record.get(&name).cloned(),
                    name,
                    raw,
                })
                .collect(),
        };

        let keys = Keys {
            names: shape.keys().map(ToString::to_string).collect(),
        };

        let camel = camel_projection(&record);

        tracing::debug!(
            fields = keys.len(),
            values = record.len(),
            source = %source.origin(),
            "environment validated"
        );

        Ok(Self {
            schema,
            parser,
            checks,
            source,
            meta,
            data: View::new(record),
            camel: View::new(camel),
            keys,
        })
    }

    // ------------------------------------------------------------------------
    // Views
    // ------------------------------------------------------------------------

    /// The resolved object of fields.
    #[must_use]
    pub const fn schema(&self) -> &ObjectSchema {
        &self.schema
    }

    /// The node the candidate record was validated against.
    #[must_use]
    pub const fn parser(&self) -> &SchemaNode {
        &self.parser
    }

    /// The source, exactly as supplied.
    #[must_use]
    pub const fn source(&self) -> &EnvSource {
        &self.source
    }

    /// Per-variable metadata.
    #[must_use]
    pub const fn meta(&self) -> &Meta {
        &self.meta
    }

    /// Validated values under their original names, including keys a
    /// transform added.
    #[must_use]
    pub const fn data(&self) -> &View {
        &self.data
    }

    /// The same values under camelCase names.
    #[must_use]
    pub const fn camel(&self) -> &View {
        &self.camel
    }

    /// Declared names, each mapped to itself.
    #[must_use]
    pub const fn keys(&self) -> &Keys {
        &self.keys
    }

    /// Deserializes the value view into `T`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Deserialize`] with the failing field path.
    pub fn deserialize<T: DeserializeOwned>(&self) -> Result<T> {
        self.data.deserialize()
    }

    /// Deserializes the camelCase view into `T`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Deserialize`] with the failing field path.
    pub fn deserialize_camel<T: DeserializeOwned>(&self) -> Result<T> {
        self.camel.deserialize()
    }

    // ------------------------------------------------------------------------
    // Narrowing
    // ------------------------------------------------------------------------

    /// A new environment limited to `keys`, validated against the same source.
    ///
    /// Whole-object checks still run and still see the fields that were
    /// left out, using the values this environment validated for them.
    ///
    /// # Errors
    ///
    /// - [`Error::UndeclaredKey`] if a key is not declared
    /// - [`Error::Validation`] if the narrowed record fails validation
    pub fn pick<I, S>(&self, keys: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let schema = self.pick_schema(keys)?;
        Self::new(schema, self.source.clone())
    }

    /// A new environment without `keys`. See [`Env::pick`].
    ///
    /// # Errors
    ///
    /// - [`Error::UndeclaredKey`] if a key is not declared
    /// - [`Error::Validation`] if the narrowed record fails validation
    pub fn omit<I, S>(&self, keys: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let omitted = self.declared(keys)?;
        let kept: Vec<&str> = self
            .schema
            .shape()
            .keys()
            .filter(|name| !omitted.iter().any(|o| o == name))
            .collect();

        self.pick(kept)
    }

    /// The schema [`Env::pick`] validates against.
    ///
    /// Fields are restricted to `keys`; every whole-object check is
    /// re-attached so that it receives the narrowed record back-filled with
    /// this environment's values for the omitted fields.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UndeclaredKey`] if a key is not declared.
    pub fn pick_schema<I, S>(&self, keys: I) -> Result<ObjectSchema>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let kept = self.declared(keys)?;
        let shape = self
            .schema
            .shape()
            .retain(|name| kept.iter().any(|k| k == name));

        let omitted: Arc<[String]> = self
            .schema
            .shape()
            .keys()
            .filter(|name| !shape.contains(name))
            .map(ToString::to_string)
            .collect();

        tracing::debug!(kept = ?kept, omitted = ?omitted, "narrowing schema");

        let parent = Arc::new(self.data.as_record().clone());

        Ok(self.checks.iter().fold(ObjectSchema::new(shape), |schema, check| {
            schema.with_check(backfilled(
                check.clone(),
                Arc::clone(&omitted),
                Arc::clone(&parent),
            ))
        }))
    }

    fn declared<I, S>(&self, keys: I) -> Result<Vec<String>>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let shape = self.schema.shape();

        keys.into_iter()
            .map(|key| {
                let key = key.as_ref();
                if shape.contains(key) {
                    Ok(key.to_string())
                } else {
                    Err(Error::undeclared_key(key, shape.keys()))
                }
            })
            .collect()
    }
}

/// Builds the camelCase projection; the first key to claim a name keeps it.
fn camel_projection(record: &Record) -> Record {
    let mut camel = Record::new();

    for (key, value) in record {
        let name = to_camel_case(key);
        if camel.contains_key(&name) {
            tracing::trace!(field = %key, camel = %name, "camel name already taken");
            continue;
        }
        camel.insert(name, value.clone());
    }

    camel
}

/// Wraps `check` so it runs against a snapshot of the narrowed record with
/// the omitted fields filled in from `parent`.
fn backfilled(check: ObjectCheck, omitted: Arc<[String]>, parent: Arc<Record>) -> ObjectCheck {
    ObjectCheck::new(move |record, ctx| {
        let mut snapshot = record.clone();

        for key in omitted.iter() {
            if !snapshot.contains_key(key)
                && let Some(value) = parent.get(key)
            {
                snapshot.insert(key.clone(), value.clone());
            }
        }

        check.run(&snapshot, ctx);
    })
}
