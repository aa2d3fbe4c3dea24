//! Object schemas: an ordered field shape plus whole-object checks.

use std::fmt::{self, Debug, Formatter};
use std::sync::Arc;

use super::SchemaNode;
use crate::validation::CheckContext;
use crate::value::Record;

/// An ordered mapping from field name to field schema.
///
/// Declaration order is preserved and is the order in which fields are
/// coerced, validated and projected.
#[derive(Clone, Debug, Default)]
pub struct Shape {
    fields: Vec<(String, SchemaNode)>,
}

impl Shape {
    /// Creates an empty shape.
    #[must_use]
    pub const fn new() -> Self {
        Self { fields: Vec::new() }
    }

    /// Adds a field. Re-declaring a name replaces its schema in place.
    #[must_use]
    pub fn field(mut self, name: impl Into<String>, node: impl Into<SchemaNode>) -> Self {
        self.insert(name, node);
        self
    }

    /// Adds a field in place. Re-declaring a name replaces its schema.
    pub fn insert(&mut self, name: impl Into<String>, node: impl Into<SchemaNode>) {
        let name = name.into();
        let node = node.into();

        if let Some(slot) = self.fields.iter_mut().find(|(n, _)| *n == name) {
            slot.1 = node;
        } else {
            self.fields.push((name, node));
        }
    }

    /// Returns the schema of `name`.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&SchemaNode> {
        self.fields
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, node)| node)
    }

    /// Whether `name` is declared.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Declared names in order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(n, _)| n.as_str())
    }

    /// Declared fields in order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &SchemaNode)> {
        self.fields.iter().map(|(n, node)| (n.as_str(), node))
    }

    /// Number of declared fields.
    #[must_use]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Whether no field is declared.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// A copy restricted to the fields `keep` accepts, in declaration order.
    #[must_use]
    pub fn retain(&self, mut keep: impl FnMut(&str) -> bool) -> Self {
        Self {
            fields: self
                .fields
                .iter()
                .filter(|(n, _)| keep(n.as_str()))
                .cloned()
                .collect(),
        }
    }
}

impl<S, N> FromIterator<(S, N)> for Shape
where
    S: Into<String>,
    N: Into<SchemaNode>,
{
    fn from_iter<I: IntoIterator<Item = (S, N)>>(iter: I) -> Self {
        let mut shape = Self::new();
        for (name, node) in iter {
            shape.insert(name, node);
        }
        shape
    }
}

/// A whole-object check: inspects a full record and reports issues
/// through the [`CheckContext`].
#[derive(Clone)]
pub struct ObjectCheck(Arc<dyn Fn(&Record, &mut CheckContext) + Send + Sync>);

impl ObjectCheck {
    /// Wraps a check function.
    pub fn new<F>(check: F) -> Self
    where
        F: Fn(&Record, &mut CheckContext) + Send + Sync + 'static,
    {
        Self(Arc::new(check))
    }

    /// Runs the check against `record`.
    pub fn run(&self, record: &Record, ctx: &mut CheckContext) {
        (self.0)(record, ctx);
    }
}

impl Debug for ObjectCheck {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str("ObjectCheck(<fn>)")
    }
}

/// An object of fields with optional whole-object checks.
///
/// Checks run after every field validated cleanly, against the validated
/// record.
#[derive(Clone, Debug, Default)]
pub struct ObjectSchema {
    shape: Shape,
    checks: Vec<ObjectCheck>,
}

impl ObjectSchema {
    /// Creates an object schema with no checks.
    #[must_use]
    pub const fn new(shape: Shape) -> Self {
        Self {
            shape,
            checks: Vec::new(),
        }
    }

    /// Adds a whole-object check.
    #[must_use]
    pub fn check<F>(mut self, check: F) -> Self
    where
        F: Fn(&Record, &mut CheckContext) + Send + Sync + 'static,
    {
        self.checks.push(ObjectCheck::new(check));
        self
    }

    /// Adds an already wrapped whole-object check.
    #[must_use]
    pub fn with_check(mut self, check: ObjectCheck) -> Self {
        self.checks.push(check);
        self
    }

    /// The field shape.
    #[must_use]
    pub const fn shape(&self) -> &Shape {
        &self.shape
    }

    /// The whole-object checks.
    #[must_use]
    pub fn checks(&self) -> &[ObjectCheck] {
        &self.checks
    }
}

impl From<ObjectSchema> for SchemaNode {
    fn from(schema: ObjectSchema) -> Self {
        Self::Object(schema)
    }
}

impl From<Shape> for ObjectSchema {
    fn from(shape: Shape) -> Self {
        Self::new(shape)
    }
}

impl From<Shape> for SchemaNode {
    fn from(shape: Shape) -> Self {
        Self::Object(ObjectSchema::new(shape))
    }
}
