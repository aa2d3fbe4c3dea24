//! Schema shape resolution.
//!
//! Callers hand [`Env`](crate::Env) a schema in one of several forms. This
//! module turns all of them into a [`Resolved`] triple:
//!
//! - the object schema whose fields are iterated for coercion,
//! - the node that validates the candidate record (the whole chain, so
//!   transforms and pipelines are applied),
//! - the whole-object checks that must survive narrowing.
//!
//! Walking a wrapped chain follows effects, pipeline inputs, readonly and
//! branded layers down to the first object node. Anything else is a
//! [`Error::SchemaResolution`].

use std::sync::Arc;

use serde_json::Value;

use crate::Error;
use crate::schema::{self, Effect, ObjectCheck, ObjectSchema, SchemaExt, SchemaNode, Shape};

/// The forms a schema may be supplied in.
#[derive(Clone, Debug)]
pub enum SchemaInput {
    /// A plain field shape.
    Shape(Shape),

    /// An object schema, possibly with whole-object checks.
    Object(ObjectSchema),

    /// Any node; must resolve to an object through its modifier chain.
    Node(SchemaNode),

    /// Bare names, each treated as an optional string.
    Names(Vec<String>),
}

impl From<Shape> for SchemaInput {
    fn from(shape: Shape) -> Self {
        Self::Shape(shape)
    }
}

impl From<ObjectSchema> for SchemaInput {
    fn from(schema: ObjectSchema) -> Self {
        Self::Object(schema)
    }
}

impl From<SchemaNode> for SchemaInput {
    fn from(node: SchemaNode) -> Self {
        Self::Node(node)
    }
}

impl From<Vec<String>> for SchemaInput {
    fn from(names: Vec<String>) -> Self {
        Self::Names(names)
    }
}

impl From<&[&str]> for SchemaInput {
    fn from(names: &[&str]) -> Self {
        Self::Names(names.iter().map(ToString::to_string).collect())
    }
}

impl<const N: usize> From<[&str; N]> for SchemaInput {
    fn from(names: [&str; N]) -> Self {
        Self::Names(names.iter().map(ToString::to_string).collect())
    }
}

/// A schema split into the parts the loader needs.
#[derive(Clone, Debug)]
pub struct Resolved {
    /// The object of fields that is iterated for coercion.
    pub object: ObjectSchema,

    /// Validates the candidate record, including any transforms.
    pub parser: SchemaNode,

    /// Whole-object checks re-attached when the schema is narrowed.
    pub checks: Vec<ObjectCheck>,
}

impl SchemaInput {
    /// Resolves the input.
    ///
    /// # Errors
    ///
    /// Returns [`Error::SchemaResolution`] if a wrapped node never reaches
    /// an object of fields.
    pub fn resolve(self) -> Result<Resolved, Error> {
        match self {
            Self::Shape(shape) => Ok(from_object(ObjectSchema::new(shape))),

            Self::Object(object) => Ok(from_object(object)),

            Self::Names(names) => {
                let shape = names
                    .into_iter()
                    .map(|name| (name, schema::string().optional()))
                    .collect();
                Ok(from_object(ObjectSchema::new(shape)))
            }

            Self::Node(SchemaNode::Object(object)) => Ok(from_object(object)),

            Self::Node(node) => resolve_chain(node),
        }
    }
}

fn from_object(object: ObjectSchema) -> Resolved {
    Resolved {
        checks: object.checks().to_vec(),
        parser: SchemaNode::Object(object.clone()),
        object,
    }
}

fn resolve_chain(node: SchemaNode) -> Result<Resolved, Error> {
    // Refinements seen since the last transform, outermost first. Those
    // above a transform see its output rather than the record.
    let mut refinements: Vec<(Arc<dyn Fn(&Value) -> bool + Send + Sync>, String)> = Vec::new();
    let mut current = &node;

    let object = loop {
        match current {
            SchemaNode::Object(object) => break object.clone(),

            SchemaNode::Effect { inner, effect } => {
                match effect {
                    Effect::Refine { check, message } => {
                        refinements.push((Arc::clone(check), message.clone()));
                    }
                    Effect::Transform(_) => refinements.clear(),
                }
                current = inner;
            }

            SchemaNode::Pipeline { input, .. } => {
                refinements.clear();
                current = input;
            }

            SchemaNode::Readonly(inner) | SchemaNode::Branded { inner, .. } => current = inner,

            other => return Err(Error::schema_resolution(other.describe())),
        }
    };

    let mut checks = object.checks().to_vec();
    checks.extend(
        refinements
            .into_iter()
            .rev()
            .map(|(check, message)| refinement_check(check, message)),
    );

    Ok(Resolved {
        object,
        parser: node,
        checks,
    })
}

/// Turns an object-level refinement into a whole-object check raising a
/// root issue.
fn refinement_check(
    check: Arc<dyn Fn(&Value) -> bool + Send + Sync>,
    message: String,
) -> ObjectCheck {
    ObjectCheck::new(move |record, ctx| {
        if !check(&Value::Object(record.clone())) {
            ctx.add_issue(Vec::<String>::new(), message.clone());
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{number, object, string};
    use crate::validation::CheckContext;
    use crate::value::Record;

    fn shape() -> Shape {
        Shape::new().field("PORT", number()).field("HOST", string())
    }

    #[test]
    fn test_resolve_shape() {
        let resolved = SchemaInput::from(shape()).resolve().unwrap();
        assert_eq!(resolved.object.shape().len(), 2);
        assert!(matches!(resolved.parser, SchemaNode::Object(_)));
        assert!(resolved.checks.is_empty());
    }

    #[test]
    fn test_resolve_names_as_optional_strings() {
        let resolved = SchemaInput::from(["A", "B"]).resolve().unwrap();
        let keys: Vec<_> = resolved.object.shape().keys().collect();
        assert_eq!(keys, vec!["A", "B"]);
        assert_eq!(
            resolved.object.shape().get("A").map(SchemaNode::describe),
            Some("optional")
        );
    }

    #[test]
    fn test_resolve_through_transform_keeps_whole_chain_as_parser() {
        let node = object(shape()).transform(|v| v).readonly();
        let resolved = SchemaInput::from(node).resolve().unwrap();

        assert_eq!(resolved.object.shape().len(), 2);
        assert_eq!(resolved.parser.describe(), "readonly");
    }

    #[test]
    fn test_resolve_through_pipeline_input() {
        let node = object(shape()).pipe(schema::unknown());
        let resolved = SchemaInput::from(node).resolve().unwrap();
        assert_eq!(resolved.object.shape().len(), 2);
    }

    #[test]
    fn test_resolve_failure_names_found_node() {
        let err = SchemaInput::from(string().transform(|v| v))
            .resolve()
            .unwrap_err();

        match err {
            Error::SchemaResolution { found } => assert_eq!(found, "string"),
            other => panic!("Expected SchemaResolution, got {other:?}"),
        }
    }

    #[test]
    fn test_optional_object_does_not_resolve() {
        let err = SchemaInput::from(object(shape()).optional())
            .resolve()
            .unwrap_err();
        assert!(matches!(err, Error::SchemaResolution { .. }));
    }

    #[test]
    fn test_object_refinements_become_checks() {
        let node = object(shape())
            .check(|_, _| {})
            .refine(|v| v.get("PORT").is_some(), "port required");
        let resolved = SchemaInput::from(node).resolve().unwrap();

        assert_eq!(resolved.checks.len(), 2);

        let mut ctx = CheckContext::default();
        resolved.checks[1].run(&Record::new(), &mut ctx);
        let issues = ctx.into_issues();
        assert_eq!(issues[0].message, "port required");
        assert!(issues[0].path.is_empty());
    }

    #[test]
    fn test_refinements_above_transform_are_not_checks() {
        let node = object(shape())
            .transform(|v| v)
            .refine(|_| false, "sees transformed output");
        let resolved = SchemaInput::from(node).resolve().unwrap();
        assert!(resolved.checks.is_empty());
    }
}
