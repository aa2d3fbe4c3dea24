//! Field classification: which coercion strategy a field gets.
//!
//! A field's schema is usually a terminal wrapped in modifiers
//! (`number().port().with_default(8080).optional()`). Classification peels
//! those layers one at a time until it reaches a terminal node and maps it
//! to a coarse [`FieldKind`].

use std::fmt::{self, Display, Formatter};

use crate::schema::{NodeTag, SchemaNode};

/// Coarse kind of a field, used to pick a coercion strategy.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum FieldKind {
    /// Strings and string enums.
    String,

    /// Numbers.
    Number,

    /// Booleans.
    Boolean,

    /// Objects, arrays, sets, tuples and records, encoded as JSON.
    Structured,

    /// Anything the classifier could not resolve.
    Unknown,
}

impl Display for FieldKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::String => "string",
            Self::Number => "number",
            Self::Boolean => "boolean",
            Self::Structured => "structured",
            Self::Unknown => "unknown",
        };

        f.write_str(name)
    }
}

/// Strategy for peeling one modifier layer off a schema node.
pub trait Classifier {
    /// Returns the node wrapped by `node`, or `None` if `node` is terminal.
    fn unwrap_layer<'a>(&self, node: &'a SchemaNode) -> Option<&'a SchemaNode>;

    /// Peels every layer and classifies the terminal that is left.
    fn classify(&self, node: &SchemaNode) -> FieldKind {
        let mut current = node;

        while let Some(inner) = self.unwrap_layer(current) {
            current = inner;
        }

        terminal_kind(current)
    }
}

/// The default classifier, dispatching on [`NodeTag`].
///
/// Every modifier is unwrapped through its inner node; pipelines are
/// unwrapped through their input stage, since that is what receives the raw
/// environment string.
#[derive(Clone, Copy, Debug, Default)]
pub struct ModifierClassifier;

impl Classifier for ModifierClassifier {
    fn unwrap_layer<'a>(&self, node: &'a SchemaNode) -> Option<&'a SchemaNode> {
        match node.tag() {
            NodeTag::Optional
            | NodeTag::Nullable
            | NodeTag::Default
            | NodeTag::Catch
            | NodeTag::Readonly
            | NodeTag::Effect
            | NodeTag::Branded
            | NodeTag::Pipeline => node.inner(),

            NodeTag::Terminal => None,
        }
    }
}

/// Classifies `node` with the [`ModifierClassifier`].
#[must_use]
pub fn classify(node: &SchemaNode) -> FieldKind {
    ModifierClassifier.classify(node)
}

const fn terminal_kind(node: &SchemaNode) -> FieldKind {
    match node {
        SchemaNode::String(_) | SchemaNode::Enum(_) => FieldKind::String,

        SchemaNode::Number(_) => FieldKind::Number,

        SchemaNode::Boolean => FieldKind::Boolean,

        SchemaNode::Object(_)
        | SchemaNode::Array(_)
        | SchemaNode::Set(_)
        | SchemaNode::Tuple(_)
        | SchemaNode::Record(_) => FieldKind::Structured,

        _ => FieldKind::Unknown,
    }
}
