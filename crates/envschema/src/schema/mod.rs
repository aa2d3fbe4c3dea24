//! A small declarative schema engine.
//!
//! A schema is a tree of [`SchemaNode`]s. Terminal nodes describe what a
//! value must look like (`string`, `number`, `object`, ...), modifier nodes
//! wrap another node and change how absent values, nulls, defaults, failures
//! and post-processing are handled.
//!
//! # Building Schemas
//!
//! ```rust,ignore
//! use envschema::schema::{self, SchemaExt};
//! use envschema::shape;
//!
//! let schema = schema::object(shape! {
//!     "DATABASE_URL" => schema::string().url(),
//!     "PORT" => schema::number().port().with_default(8080),
//!     "DEBUG" => schema::boolean().optional(),
//!     "HOSTS" => schema::array(schema::string()),
//! })
//! .check(|record, ctx| {
//!     if record.get("USERNAME") != record.get("MIRROR") {
//!         ctx.add_issue(["MIRROR"], "must match USERNAME");
//!     }
//! });
//! ```
//!
//! # Node Kinds
//!
//! | Node | Accepts |
//! |------|---------|
//! | `String` | strings, with optional length/format checks |
//! | `Number` | numbers, with optional integer/range checks |
//! | `Boolean` | booleans |
//! | `Enum` | one of a fixed set of strings |
//! | `Object` | objects; unknown keys are stripped |
//! | `Array` / `Set` / `Tuple` | arrays |
//! | `Record` | objects with arbitrary keys and uniform values |
//! | `Unknown` | anything, including absence |
//!
//! | Modifier | Effect |
//! |----------|--------|
//! | `Optional` | absence is accepted and stays absent |
//! | `Nullable` | `null` is accepted |
//! | `Default` | absence is replaced by a (possibly generated) value |
//! | `Catch` | any failure is replaced by a fallback value |
//! | `Readonly` / `Branded` | no runtime effect |
//! | `Effect` | refinement or transform after the inner node succeeds |
//! | `Pipeline` | output of one node is validated by another |

mod object;
mod parse;

pub use object::{ObjectCheck, ObjectSchema, Shape};

use std::fmt::{self, Debug, Formatter};
use std::sync::Arc;

use serde_json::Value;

// ============================================================================
// Schema Nodes
// ============================================================================

/// One node of a schema tree.
#[derive(Clone, Debug)]
pub enum SchemaNode {
    /// A string.
    String(StringSchema),

    /// A number.
    Number(NumberSchema),

    /// A boolean.
    Boolean,

    /// One of a fixed set of strings.
    Enum(Vec<String>),

    /// An object with declared fields.
    Object(ObjectSchema),

    /// An array whose items all match the inner node.
    Array(Box<SchemaNode>),

    /// An array of unique items matching the inner node.
    Set(Box<SchemaNode>),

    /// A fixed-length array with one node per position.
    Tuple(Vec<SchemaNode>),

    /// An object with arbitrary keys whose values match the inner node.
    Record(Box<SchemaNode>),

    /// Anything, including an absent value.
    Unknown,

    /// Accepts an absent value.
    Optional(Box<SchemaNode>),

    /// Accepts `null`.
    Nullable(Box<SchemaNode>),

    /// Substitutes a value when the input is absent.
    Default {
        /// The wrapped node, which validates the substituted value too.
        inner: Box<SchemaNode>,
        /// Where the substitute comes from.
        value: DefaultValue,
    },

    /// Substitutes a fallback when the inner node fails.
    Catch {
        /// The wrapped node.
        inner: Box<SchemaNode>,
        /// The value used instead of reporting the failure.
        fallback: Value,
    },

    /// Marks the value read-only. No runtime effect.
    Readonly(Box<SchemaNode>),

    /// Refines or transforms the inner node's output.
    Effect {
        /// The wrapped node.
        inner: Box<SchemaNode>,
        /// What to do with the inner node's output.
        effect: Effect,
    },

    /// Tags the value with a nominal brand. No runtime effect.
    Branded {
        /// The wrapped node.
        inner: Box<SchemaNode>,
        /// The brand name.
        brand: String,
    },

    /// Feeds the output of `input` into `output`.
    Pipeline {
        /// First stage; its input is the raw candidate.
        input: Box<SchemaNode>,
        /// Second stage; validates the first stage's output.
        output: Box<SchemaNode>,
    },
}

/// Explicit tag of a node's role, used to peel modifier layers.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum NodeTag {
    /// [`SchemaNode::Optional`]
    Optional,
    /// [`SchemaNode::Nullable`]
    Nullable,
    /// [`SchemaNode::Default`]
    Default,
    /// [`SchemaNode::Catch`]
    Catch,
    /// [`SchemaNode::Readonly`]
    Readonly,
    /// [`SchemaNode::Effect`]
    Effect,
    /// [`SchemaNode::Branded`]
    Branded,
    /// [`SchemaNode::Pipeline`]
    Pipeline,
    /// Any node that does not wrap another one.
    Terminal,
}

impl SchemaNode {
    /// Returns the node's tag.
    #[must_use]
    pub const fn tag(&self) -> NodeTag {
        match self {
            Self::Optional(_) => NodeTag::Optional,
            Self::Nullable(_) => NodeTag::Nullable,
            Self::Default { .. } => NodeTag::Default,
            Self::Catch { .. } => NodeTag::Catch,
            Self::Readonly(_) => NodeTag::Readonly,
            Self::Effect { .. } => NodeTag::Effect,
            Self::Branded { .. } => NodeTag::Branded,
            Self::Pipeline { .. } => NodeTag::Pipeline,
            _ => NodeTag::Terminal,
        }
    }

    /// Returns the wrapped node of a modifier, or `None` for terminals.
    ///
    /// For a pipeline this is the input stage.
    #[must_use]
    pub fn inner(&self) -> Option<&Self> {
        match self {
            Self::Optional(inner)
            | Self::Nullable(inner)
            | Self::Readonly(inner)
            | Self::Default { inner, .. }
            | Self::Catch { inner, .. }
            | Self::Effect { inner, .. }
            | Self::Branded { inner, .. }
            | Self::Pipeline { input: inner, .. } => Some(inner.as_ref()),
            _ => None,
        }
    }

    /// Short name of the node kind, used in diagnostics.
    #[must_use]
    pub const fn describe(&self) -> &'static str {
        match self {
            Self::String(_) => "string",
            Self::Number(_) => "number",
            Self::Boolean => "boolean",
            Self::Enum(_) => "enum",
            Self::Object(_) => "object",
            Self::Array(_) => "array",
            Self::Set(_) => "set",
            Self::Tuple(_) => "tuple",
            Self::Record(_) => "record",
            Self::Unknown => "unknown",
            Self::Optional(_) => "optional",
            Self::Nullable(_) => "nullable",
            Self::Default { .. } => "default",
            Self::Catch { .. } => "catch",
            Self::Readonly(_) => "readonly",
            Self::Effect { .. } => "effect",
            Self::Branded { .. } => "branded",
            Self::Pipeline { .. } => "pipeline",
        }
    }
}

// ============================================================================
// Strings
// ============================================================================

#[derive(Clone, Debug, PartialEq)]
pub(crate) enum StringCheck {
    MinLen(usize),
    MaxLen(usize),
    #[cfg(feature = "validator")]
    Email,
    #[cfg(feature = "validator")]
    Url,
}

/// A string node with its checks.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct StringSchema {
    pub(crate) checks: Vec<StringCheck>,
}

impl StringSchema {
    /// Requires at least `len` characters.
    #[must_use]
    pub fn min_len(mut self, len: usize) -> Self {
        self.checks.push(StringCheck::MinLen(len));
        self
    }

    /// Allows at most `len` characters.
    #[must_use]
    pub fn max_len(mut self, len: usize) -> Self {
        self.checks.push(StringCheck::MaxLen(len));
        self
    }

    /// Rejects the empty string.
    #[must_use]
    pub fn non_empty(self) -> Self {
        self.min_len(1)
    }

    /// Requires a syntactically valid email address.
    #[cfg(feature = "validator")]
    #[must_use]
    pub fn email(mut self) -> Self {
        self.checks.push(StringCheck::Email);
        self
    }

    /// Requires a syntactically valid URL.
    #[cfg(feature = "validator")]
    #[must_use]
    pub fn url(mut self) -> Self {
        self.checks.push(StringCheck::Url);
        self
    }
}

impl From<StringSchema> for SchemaNode {
    fn from(schema: StringSchema) -> Self {
        Self::String(schema)
    }
}

// ============================================================================
// Numbers
// ============================================================================

#[derive(Clone, Debug, PartialEq)]
pub(crate) enum NumberCheck {
    Int,
    Min(f64),
    Max(f64),
}

/// A number node with its checks.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct NumberSchema {
    pub(crate) checks: Vec<NumberCheck>,
}

impl NumberSchema {
    /// Requires an integral value.
    #[must_use]
    pub fn int(mut self) -> Self {
        self.checks.push(NumberCheck::Int);
        self
    }

    /// Requires `value >= min`.
    #[must_use]
    pub fn min(mut self, min: f64) -> Self {
        self.checks.push(NumberCheck::Min(min));
        self
    }

    /// Requires `value <= max`.
    #[must_use]
    pub fn max(mut self, max: f64) -> Self {
        self.checks.push(NumberCheck::Max(max));
        self
    }

    /// Requires an integer TCP/UDP port (`1..=65535`).
    #[must_use]
    pub fn port(self) -> Self {
        self.int().min(1.0).max(65535.0)
    }
}

impl From<NumberSchema> for SchemaNode {
    fn from(schema: NumberSchema) -> Self {
        Self::Number(schema)
    }
}

// ============================================================================
// Defaults and Effects
// ============================================================================

/// Source of a default value.
#[derive(Clone)]
pub enum DefaultValue {
    /// A fixed value.
    Static(Value),

    /// A generator, called once each time the default is needed.
    Generated(Arc<dyn Fn() -> Value + Send + Sync>),
}

impl DefaultValue {
    /// Produces the default value.
    #[must_use]
    pub fn produce(&self) -> Value {
        match self {
            Self::Static(value) => value.clone(),
            Self::Generated(generate) => generate(),
        }
    }
}

impl Debug for DefaultValue {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::Static(value) => f.debug_tuple("Static").field(value).finish(),
            Self::Generated(_) => f.write_str("Generated(<fn>)"),
        }
    }
}

/// Post-processing applied after the inner node succeeds.
#[derive(Clone)]
pub enum Effect {
    /// Rejects values for which `check` returns `false`.
    Refine {
        /// The predicate.
        check: Arc<dyn Fn(&Value) -> bool + Send + Sync>,
        /// Message of the issue raised on rejection.
        message: String,
    },

    /// Maps the value to a new one.
    Transform(Arc<dyn Fn(Value) -> Value + Send + Sync>),
}

impl Debug for Effect {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::Refine { message, .. } => f
                .debug_struct("Refine")
                .field("message", message)
                .finish_non_exhaustive(),
            Self::Transform(_) => f.write_str("Transform(<fn>)"),
        }
    }
}

// ============================================================================
// Modifiers
// ============================================================================

/// Modifier methods available on anything that converts into a [`SchemaNode`].
pub trait SchemaExt: Into<SchemaNode> + Sized {
    /// Accepts an absent value.
    fn optional(self) -> SchemaNode {
        SchemaNode::Optional(Box::new(self.into()))
    }

    /// Accepts `null`.
    fn nullable(self) -> SchemaNode {
        SchemaNode::Nullable(Box::new(self.into()))
    }

    /// Uses `value` when the input is absent.
    fn with_default(self, value: impl Into<Value>) -> SchemaNode {
        SchemaNode::Default {
            inner: Box::new(self.into()),
            value: DefaultValue::Static(value.into()),
        }
    }

    /// Calls `generate` for a fresh value each time the input is absent.
    fn with_default_fn<F>(self, generate: F) -> SchemaNode
    where
        F: Fn() -> Value + Send + Sync + 'static,
    {
        SchemaNode::Default {
            inner: Box::new(self.into()),
            value: DefaultValue::Generated(Arc::new(generate)),
        }
    }

    /// Uses `fallback` instead of failing.
    fn catch(self, fallback: impl Into<Value>) -> SchemaNode {
        SchemaNode::Catch {
            inner: Box::new(self.into()),
            fallback: fallback.into(),
        }
    }

    /// Marks the value read-only.
    fn readonly(self) -> SchemaNode {
        SchemaNode::Readonly(Box::new(self.into()))
    }

    /// Brands the value with a nominal tag.
    fn brand(self, brand: impl Into<String>) -> SchemaNode {
        SchemaNode::Branded {
            inner: Box::new(self.into()),
            brand: brand.into(),
        }
    }

    /// Rejects values for which `check` returns `false`.
    fn refine<F>(self, check: F, message: impl Into<String>) -> SchemaNode
    where
        F: Fn(&Value) -> bool + Send + Sync + 'static,
    {
        SchemaNode::Effect {
            inner: Box::new(self.into()),
            effect: Effect::Refine {
                check: Arc::new(check),
                message: message.into(),
            },
        }
    }

    /// Maps the validated value through `transform`.
    fn transform<F>(self, transform: F) -> SchemaNode
    where
        F: Fn(Value) -> Value + Send + Sync + 'static,
    {
        SchemaNode::Effect {
            inner: Box::new(self.into()),
            effect: Effect::Transform(Arc::new(transform)),
        }
    }

    /// Validates this node's output with `output`.
    fn pipe(self, output: impl Into<SchemaNode>) -> SchemaNode {
        SchemaNode::Pipeline {
            input: Box::new(self.into()),
            output: Box::new(output.into()),
        }
    }
}

impl<T: Into<SchemaNode>> SchemaExt for T {}

// ============================================================================
// Constructors
// ============================================================================

/// A string node.
#[must_use]
pub fn string() -> StringSchema {
    StringSchema::default()
}

/// A number node.
#[must_use]
pub fn number() -> NumberSchema {
    NumberSchema::default()
}

/// A boolean node.
#[must_use]
pub const fn boolean() -> SchemaNode {
    SchemaNode::Boolean
}

/// A node accepting one of `values`.
pub fn enumeration<I, S>(values: I) -> SchemaNode
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    SchemaNode::Enum(values.into_iter().map(Into::into).collect())
}

/// An object node over `shape`.
#[must_use]
pub fn object(shape: Shape) -> ObjectSchema {
    ObjectSchema::new(shape)
}

/// An array of `item`.
pub fn array(item: impl Into<SchemaNode>) -> SchemaNode {
    SchemaNode::Array(Box::new(item.into()))
}

/// An array of unique `item`s.
pub fn set(item: impl Into<SchemaNode>) -> SchemaNode {
    SchemaNode::Set(Box::new(item.into()))
}

/// A fixed-length array, one node per position.
pub fn tuple<I, N>(items: I) -> SchemaNode
where
    I: IntoIterator<Item = N>,
    N: Into<SchemaNode>,
{
    SchemaNode::Tuple(items.into_iter().map(Into::into).collect())
}

/// An object with arbitrary keys whose values match `value`.
pub fn record(value: impl Into<SchemaNode>) -> SchemaNode {
    SchemaNode::Record(Box::new(value.into()))
}

/// A node accepting anything.
#[must_use]
pub const fn unknown() -> SchemaNode {
    SchemaNode::Unknown
}

/// Builds a [`Shape`] from `"NAME" => node` pairs, keeping their order.
///
/// ```rust,ignore
/// let shape = envschema::shape! {
///     "PORT" => schema::number(),
///     "HOST" => schema::string().optional(),
/// };
/// ```
#[macro_export]
macro_rules! shape {
    ($($name:expr => $node:expr),* $(,)?) => {
        $crate::schema::Shape::new()$(.field($name, $node))*
    };
}
