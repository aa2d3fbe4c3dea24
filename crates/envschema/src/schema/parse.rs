//! Validation of candidate values against a schema tree.
//!
//! Parsing walks the tree once, collecting every issue it meets instead of
//! stopping at the first. A node that fails always records at least one
//! issue, so "did this subtree fail" is answered by the returned
//! [`Outcome`] and "why" by the context's issue list.

use serde_json::Value;

#[cfg(feature = "validator")]
use validator::{ValidateEmail, ValidateUrl};

use super::{Effect, NumberCheck, ObjectSchema, SchemaNode, StringCheck, StringSchema};
use crate::validation::{CheckContext, Issue, IssueCode, PathSegment, ValidationError};
use crate::value::{Record, kind_name};

/// Marker for a subtree that failed; the reasons live in the context.
#[derive(Debug)]
pub(crate) struct Invalid;

/// `Ok(None)` means the value is (still) absent.
pub(crate) type Outcome = Result<Option<Value>, Invalid>;

#[derive(Debug, Default)]
pub(crate) struct ParseContext {
    path: Vec<PathSegment>,
    issues: Vec<Issue>,
}

impl ParseContext {
    fn issue(&mut self, code: IssueCode, message: impl Into<String>) {
        self.issues
            .push(Issue::new(self.path.clone(), code, message));
    }

    fn invalid_type(&mut self, expected: &str, received: &Value) -> Invalid {
        self.issue(
            IssueCode::InvalidType,
            format!("expected {expected}, received {}", kind_name(received)),
        );
        Invalid
    }

    fn nested<T>(&mut self, segment: PathSegment, f: impl FnOnce(&mut Self) -> T) -> T {
        self.path.push(segment);
        let result = f(self);
        self.path.pop();
        result
    }
}

impl SchemaNode {
    /// Validates `input` against this node.
    ///
    /// `None` stands for an absent value. On success the (possibly
    /// defaulted or transformed) value is returned, still `None` if it was
    /// absent and allowed to be.
    ///
    /// # Errors
    ///
    /// Returns a [`ValidationError`] listing every issue found.
    pub fn validate(&self, input: Option<Value>) -> Result<Option<Value>, ValidationError> {
        let mut ctx = ParseContext::default();

        match self.parse_in(input, &mut ctx) {
            Ok(value) if ctx.issues.is_empty() => Ok(value),
            _ => Err(ValidationError::new(ctx.issues)),
        }
    }

    pub(crate) fn parse_in(&self, input: Option<Value>, ctx: &mut ParseContext) -> Outcome {
        match self {
            Self::Optional(inner) => match input {
                None => Ok(None),
                some => inner.parse_in(some, ctx),
            },

            Self::Nullable(inner) => match input {
                Some(Value::Null) => Ok(Some(Value::Null)),
                other => inner.parse_in(other, ctx),
            },

            Self::Default { inner, value } => {
                let input = input.or_else(|| Some(value.produce()));
                inner.parse_in(input, ctx)
            }

            Self::Catch { inner, fallback } => {
                let mark = ctx.issues.len();
                inner.parse_in(input, ctx).or_else(|Invalid| {
                    ctx.issues.truncate(mark);
                    Ok(Some(fallback.clone()))
                })
            }

            Self::Readonly(inner) | Self::Branded { inner, .. } => inner.parse_in(input, ctx),

            Self::Effect { inner, effect } => {
                let Some(value) = inner.parse_in(input, ctx)? else {
                    return Ok(None);
                };

                match effect {
                    Effect::Refine { check, message } => {
                        if check(&value) {
                            Ok(Some(value))
                        } else {
                            ctx.issue(IssueCode::Custom, message.clone());
                            Err(Invalid)
                        }
                    }

                    Effect::Transform(transform) => Ok(Some(transform(value))),
                }
            }

            Self::Pipeline { input: first, output } => {
                let intermediate = first.parse_in(input, ctx)?;
                output.parse_in(intermediate, ctx)
            }

            Self::Unknown => Ok(input),

            terminal => {
                let Some(value) = input else {
                    ctx.issue(IssueCode::Required, "required");
                    return Err(Invalid);
                };

                terminal.parse_present(value, ctx).map(Some)
            }
        }
    }

    fn parse_present(&self, value: Value, ctx: &mut ParseContext) -> Result<Value, Invalid> {
        match (self, value) {
            (Self::String(schema), Value::String(text)) => {
                check_string(schema, &text, ctx)?;
                Ok(Value::String(text))
            }

            (Self::Number(schema), Value::Number(n)) => {
                let Some(f) = n.as_f64() else {
                    return Err(ctx.invalid_type("number", &Value::Number(n)));
                };
                check_number(&schema.checks, f, ctx)?;
                Ok(Value::Number(n))
            }

            (Self::Boolean, Value::Bool(b)) => Ok(Value::Bool(b)),

            (Self::Enum(members), Value::String(text)) => {
                if members.iter().any(|m| *m == text) {
                    Ok(Value::String(text))
                } else {
                    let allowed = members
                        .iter()
                        .map(|m| format!("'{m}'"))
                        .collect::<Vec<_>>()
                        .join(" | ");
                    ctx.issue(
                        IssueCode::InvalidEnumValue,
                        format!("expected one of {allowed}, received '{text}'"),
                    );
                    Err(Invalid)
                }
            }

            (Self::Object(schema), Value::Object(map)) => {
                parse_object(schema, &map, ctx).map(Value::Object)
            }

            (Self::Array(item), Value::Array(items)) => parse_items(item, items, ctx),

            (Self::Set(item), Value::Array(items)) => {
                let parsed = parse_items(item, items, ctx)?;
                let Value::Array(members) = &parsed else {
                    return Ok(parsed);
                };

                let duplicate = members
                    .iter()
                    .enumerate()
                    .any(|(i, m)| members[..i].contains(m));

                if duplicate {
                    ctx.issue(IssueCode::NotUnique, "set members must be unique");
                    return Err(Invalid);
                }

                Ok(parsed)
            }

            (Self::Tuple(nodes), Value::Array(items)) => {
                if items.len() != nodes.len() {
                    let code = if items.len() < nodes.len() {
                        IssueCode::TooSmall
                    } else {
                        IssueCode::TooBig
                    };
                    ctx.issue(
                        code,
                        format!(
                            "expected tuple of {} item(s), received {}",
                            nodes.len(),
                            items.len()
                        ),
                    );
                    return Err(Invalid);
                }

                let mark = ctx.issues.len();
                let mut out = Vec::with_capacity(items.len());

                for (i, (node, item)) in nodes.iter().zip(items).enumerate() {
                    let result = ctx.nested(PathSegment::Index(i), |ctx| {
                        node.parse_in(Some(item), ctx)
                    });
                    if let Ok(value) = result {
                        out.push(value.unwrap_or(Value::Null));
                    }
                }

                if ctx.issues.len() > mark {
                    return Err(Invalid);
                }

                Ok(Value::Array(out))
            }

            (Self::Record(node), Value::Object(map)) => {
                let mark = ctx.issues.len();
                let mut out = Record::new();

                for (key, item) in map {
                    let result =
                        ctx.nested(PathSegment::Key(key.clone()), |ctx| node.parse_in(Some(item), ctx));
                    if let Ok(Some(value)) = result {
                        out.insert(key, value);
                    }
                }

                if ctx.issues.len() > mark {
                    return Err(Invalid);
                }

                Ok(Value::Object(out))
            }

            (node, value) => Err(ctx.invalid_type(node.describe(), &value)),
        }
    }
}

/// Parses the declared fields of `map`, stripping undeclared keys, then runs
/// the whole-object checks if every field passed.
pub(crate) fn parse_object(
    schema: &ObjectSchema,
    map: &Record,
    ctx: &mut ParseContext,
) -> Result<Record, Invalid> {
    let mark = ctx.issues.len();
    let mut out = Record::new();

    for (name, node) in schema.shape().iter() {
        let input = map.get(name).cloned();
        let result = ctx.nested(PathSegment::from(name), |ctx| node.parse_in(input, ctx));

        if let Ok(Some(value)) = result {
            out.insert(name.to_string(), value);
        }
    }

    if ctx.issues.len() > mark {
        return Err(Invalid);
    }

    for check in schema.checks() {
        let mut check_ctx = CheckContext::new(ctx.path.clone());
        check.run(&out, &mut check_ctx);
        ctx.issues.extend(check_ctx.into_issues());
    }

    if ctx.issues.len() > mark {
        return Err(Invalid);
    }

    Ok(out)
}

fn parse_items(item: &SchemaNode, items: Vec<Value>, ctx: &mut ParseContext) -> Result<Value, Invalid> {
    let mark = ctx.issues.len();
    let mut out = Vec::with_capacity(items.len());

    for (i, value) in items.into_iter().enumerate() {
        let result = ctx.nested(PathSegment::Index(i), |ctx| item.parse_in(Some(value), ctx));
        if let Ok(value) = result {
            out.push(value.unwrap_or(Value::Null));
        }
    }

    if ctx.issues.len() > mark {
        return Err(Invalid);
    }

    Ok(Value::Array(out))
}

// `validator`'s format traits are implemented for `String`.
#[allow(clippy::ptr_arg)]
fn check_string(schema: &StringSchema, text: &String, ctx: &mut ParseContext) -> Result<(), Invalid> {
    let mark = ctx.issues.len();
    let len = text.chars().count();

    for check in &schema.checks {
        match check {
            StringCheck::MinLen(min) if len < *min => ctx.issue(
                IssueCode::TooSmall,
                format!("string must contain at least {min} character(s)"),
            ),

            StringCheck::MaxLen(max) if len > *max => ctx.issue(
                IssueCode::TooBig,
                format!("string must contain at most {max} character(s)"),
            ),

            #[cfg(feature = "validator")]
            StringCheck::Email if !text.validate_email() => {
                ctx.issue(IssueCode::InvalidString, "invalid email");
            }

            #[cfg(feature = "validator")]
            StringCheck::Url if !text.validate_url() => {
                ctx.issue(IssueCode::InvalidString, "invalid url");
            }

            _ => {}
        }
    }

    if ctx.issues.len() > mark {
        Err(Invalid)
    } else {
        Ok(())
    }
}

fn check_number(checks: &[NumberCheck], n: f64, ctx: &mut ParseContext) -> Result<(), Invalid> {
    let mark = ctx.issues.len();

    for check in checks {
        match check {
            NumberCheck::Int if n.fract() != 0.0 => {
                ctx.issue(IssueCode::NotInteger, "expected integer, received float");
            }

            NumberCheck::Min(min) if n < *min => ctx.issue(
                IssueCode::TooSmall,
                format!("number must be greater than or equal to {min}"),
            ),

            NumberCheck::Max(max) if n > *max => ctx.issue(
                IssueCode::TooBig,
                format!("number must be less than or equal to {max}"),
            ),

            _ => {}
        }
    }

    if ctx.issues.len() > mark {
        Err(Invalid)
    } else {
        Ok(())
    }
}
