//! Structured validation errors produced by the schema engine.
//!
//! Validation never stops at the first problem. Every failing field (and
//! every failing whole-object check) contributes an [`Issue`], and the
//! issues are returned together as a [`ValidationError`].
//!
//! # Error Structure
//!
//! Each [`Issue`] carries:
//! - `path` - where the problem is (`PORT`, `DATABASE.host`, `HOSTS.2`)
//! - `code` - a machine-readable [`IssueCode`]
//! - `message` - a human-readable explanation
//!
//! # Example
//!
//! ```rust,ignore
//! match Env::new(schema, source) {
//!     Err(envschema::Error::Validation(err)) => {
//!         for issue in err.issues() {
//!             eprintln!("{}: {}", issue.path_string(), issue.message);
//!         }
//!     }
//!     _ => {}
//! }
//! ```

use std::error::Error as StdError;
use std::fmt::{self, Display, Formatter};

use miette::Diagnostic;

/// One step in the location of an [`Issue`].
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub enum PathSegment {
    /// An object key (a declared variable name or a nested field).
    Key(String),

    /// A position inside an array, set or tuple.
    Index(usize),
}

impl Display for PathSegment {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::Key(key) => write!(f, "{key}"),

            Self::Index(index) => write!(f, "{index}"),
        }
    }
}

impl From<&str> for PathSegment {
    fn from(key: &str) -> Self {
        Self::Key(key.to_string())
    }
}

impl From<String> for PathSegment {
    fn from(key: String) -> Self {
        Self::Key(key)
    }
}

impl From<usize> for PathSegment {
    fn from(index: usize) -> Self {
        Self::Index(index)
    }
}

/// Machine-readable category of an [`Issue`].
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
#[non_exhaustive]
pub enum IssueCode {
    /// A required value was absent.
    Required,

    /// The value had the wrong type (e.g. a string where a number was expected).
    InvalidType,

    /// The value is not one of the allowed enum members.
    InvalidEnumValue,

    /// A length or numeric lower bound was violated.
    TooSmall,

    /// A length or numeric upper bound was violated.
    TooBig,

    /// A number was expected to be an integer.
    NotInteger,

    /// A string failed a format check (email, url).
    InvalidString,

    /// A set contained duplicate members.
    NotUnique,

    /// Raised by a refinement or a whole-object check.
    Custom,
}

impl Display for IssueCode {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let code = match self {
            Self::Required => "required",
            Self::InvalidType => "invalid_type",
            Self::InvalidEnumValue => "invalid_enum_value",
            Self::TooSmall => "too_small",
            Self::TooBig => "too_big",
            Self::NotInteger => "not_integer",
            Self::InvalidString => "invalid_string",
            Self::NotUnique => "not_unique",
            Self::Custom => "custom",
        };

        f.write_str(code)
    }
}

/// A single validation failure located at a field path.
#[derive(Clone, Debug, Diagnostic, PartialEq, Eq)]
#[diagnostic(code(envschema::issue))]
pub struct Issue {
    /// Location of the failing value, outermost segment first.
    pub path: Vec<PathSegment>,

    /// Category of the failure.
    pub code: IssueCode,

    /// Human-readable error message.
    #[help]
    pub message: String,
}

impl Issue {
    /// Creates an issue at `path`.
    pub fn new(path: Vec<PathSegment>, code: IssueCode, message: impl Into<String>) -> Self {
        Self {
            path,
            code,
            message: message.into(),
        }
    }

    /// Creates a [`IssueCode::Custom`] issue, the kind raised by checks.
    pub fn custom<I, S>(path: I, message: impl Into<String>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<PathSegment>,
    {
        Self::new(
            path.into_iter().map(Into::into).collect(),
            IssueCode::Custom,
            message,
        )
    }

    /// Returns the dotted path (`DATABASE.host`), or `<root>` for whole-record issues.
    #[must_use]
    pub fn path_string(&self) -> String {
        if self.path.is_empty() {
            return "<root>".to_string();
        }

        self.path
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(".")
    }

    /// Returns the top-level key this issue belongs to, if any.
    #[must_use]
    pub fn field(&self) -> Option<&str> {
        match self.path.first() {
            Some(PathSegment::Key(key)) => Some(key),
            _ => None,
        }
    }
}

impl Display for Issue {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.path_string(), self.message)
    }
}

impl StdError for Issue {}

/// The structured, multi-issue error returned when a candidate record fails
/// validation.
///
/// It is surfaced to callers exactly as the schema engine produced it.
#[derive(Clone, Debug, Diagnostic, PartialEq, Eq)]
#[diagnostic(
    code(envschema::validation),
    help("fix the environment variables listed above")
)]
pub struct ValidationError {
    #[related]
    issues: Vec<Issue>,
}

impl ValidationError {
    /// Wraps a non-empty issue list.
    #[must_use]
    pub const fn new(issues: Vec<Issue>) -> Self {
        Self { issues }
    }

    /// All issues, in the order they were raised.
    #[must_use]
    pub fn issues(&self) -> &[Issue] {
        &self.issues
    }

    /// Consumes the error, returning its issues.
    #[must_use]
    pub fn into_issues(self) -> Vec<Issue> {
        self.issues
    }

    /// Issues whose path starts at the given top-level key.
    pub fn issues_for<'a>(&'a self, key: &'a str) -> impl Iterator<Item = &'a Issue> + 'a {
        self.issues
            .iter()
            .filter(move |issue| issue.field() == Some(key))
    }

    /// Issues that are not attached to any field (raised against the whole record).
    pub fn root_issues(&self) -> impl Iterator<Item = &Issue> {
        self.issues.iter().filter(|issue| issue.path.is_empty())
    }
}

impl Display for ValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{} validation issue(s)", self.issues.len())?;

        for issue in &self.issues {
            write!(f, "\n  - {issue}")?;
        }

        Ok(())
    }
}

impl StdError for ValidationError {}

/// Handed to whole-object checks so they can report problems.
///
/// Paths given to [`add_issue`](Self::add_issue) are relative to the object
/// being checked.
#[derive(Debug, Default)]
pub struct CheckContext {
    base: Vec<PathSegment>,
    issues: Vec<Issue>,
}

impl CheckContext {
    /// Creates a context rooted at `base`.
    #[must_use]
    pub const fn new(base: Vec<PathSegment>) -> Self {
        Self {
            base,
            issues: Vec::new(),
        }
    }

    /// Records a custom issue at `path` (relative to the checked object).
    pub fn add_issue<I, S>(&mut self, path: I, message: impl Into<String>)
    where
        I: IntoIterator<Item = S>,
        S: Into<PathSegment>,
    {
        let mut full = self.base.clone();
        full.extend(path.into_iter().map(Into::into));
        self.issues.push(Issue::new(full, IssueCode::Custom, message));
    }

    /// Whether any issue has been raised through this context.
    #[must_use]
    pub fn has_issues(&self) -> bool {
        !self.issues.is_empty()
    }

    /// Consumes the context, returning the raised issues.
    #[must_use]
    pub fn into_issues(self) -> Vec<Issue> {
        self.issues
    }
}
