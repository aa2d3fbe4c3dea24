//! The raw key/value source an [`Env`](crate::Env) reads from.
//!
//! An [`EnvSource`] is a flat, immutable mapping from variable name to an
//! optional string. `None` means "declared but absent", which is distinct
//! from the empty string. Sources are reference counted: cloning one, or
//! narrowing an `Env` built from one, shares the same storage.
//!
//! # Example
//!
//! ```rust,ignore
//! use envschema::EnvSource;
//!
//! // The process environment, with a .env file underneath it
//! let source = EnvSource::from_process_env()
//!     .with_fallback(EnvSource::from_dotenv(".env")?);
//!
//! // An in-memory source for tests
//! let source = EnvSource::from_pairs([("PORT", "8080"), ("HOST", "localhost")]);
//! ```

use std::collections::{HashMap, HashSet};
use std::fmt::{self, Display, Formatter};
#[cfg(feature = "dotenv")]
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::Error;

/// Where an [`EnvSource`]'s values came from.
#[derive(Clone, Debug, Eq, PartialEq)]
#[non_exhaustive]
pub enum Origin {
    /// Read from the process environment.
    Environment,

    /// Loaded from a `.env` file.
    #[cfg(feature = "dotenv")]
    DotenvFile(PathBuf),

    /// Built in memory.
    Memory,

    /// Several sources layered on top of each other, highest priority first.
    Layered(Vec<Origin>),
}

impl Display for Origin {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::Environment => write!(f, "Environment variables"),

            #[cfg(feature = "dotenv")]
            Self::DotenvFile(path) => write!(f, ".env file ({})", path.display()),

            Self::Memory => write!(f, "In-memory values"),

            Self::Layered(layers) => {
                let names: Vec<String> = layers.iter().map(ToString::to_string).collect();
                write!(f, "{}", names.join(" > "))
            }
        }
    }
}

#[derive(Debug, Default)]
struct Inner {
    vars: HashMap<String, Option<String>>,
    /// Names whose name or value was not valid UTF-8.
    invalid_utf8: HashSet<String>,
}

/// A shared, read-only mapping from variable name to optional string.
#[derive(Clone, Debug)]
pub struct EnvSource {
    inner: Arc<Inner>,
    origin: Origin,
}

impl EnvSource {
    /// Snapshots the process environment.
    ///
    /// This is the default source; nothing else in the crate reads the
    /// process environment. Variables that are not valid UTF-8 are
    /// remembered and only reported if a schema declares them.
    #[must_use]
    pub fn from_process_env() -> Self {
        let mut inner = Inner::default();

        for (key, value) in std::env::vars_os() {
            match (key.into_string(), value.into_string()) {
                (Ok(key), Ok(value)) => {
                    inner.vars.insert(key, Some(value));
                }

                (Ok(key), Err(_)) => {
                    inner.invalid_utf8.insert(key);
                }

                (Err(key), _) => {
                    inner
                        .invalid_utf8
                        .insert(key.to_string_lossy().into_owned());
                }
            }
        }

        tracing::debug!(
            vars = inner.vars.len(),
            invalid_utf8 = inner.invalid_utf8.len(),
            "snapshotted process environment"
        );

        Self {
            inner: Arc::new(inner),
            origin: Origin::Environment,
        }
    }

    /// Builds a source from `(name, value)` pairs.
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        pairs
            .into_iter()
            .map(|(k, v)| (k.into(), Some(v.into())))
            .collect()
    }

    /// Loads a `.env` file without modifying the process environment.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Dotenv`] if the file cannot be read or parsed.
    #[cfg(feature = "dotenv")]
    pub fn from_dotenv(path: impl AsRef<Path>) -> Result<Self, Error> {
        let path = path.as_ref();
        let dotenv_error = |source| Error::Dotenv {
            path: path.display().to_string(),
            source,
        };

        let mut vars = HashMap::new();
        for item in dotenvy::from_path_iter(path).map_err(dotenv_error)? {
            let (key, value) = item.map_err(dotenv_error)?;
            vars.insert(key, Some(value));
        }

        tracing::debug!(path = %path.display(), vars = vars.len(), "loaded dotenv file");

        Ok(Self {
            inner: Arc::new(Inner {
                vars,
                invalid_utf8: HashSet::new(),
            }),
            origin: Origin::DotenvFile(path.to_path_buf()),
        })
    }

    /// Layers `self` over `lower`: keys present in `self` win.
    #[must_use]
    pub fn with_fallback(self, lower: Self) -> Self {
        let mut inner = Inner {
            vars: lower.inner.vars.clone(),
            invalid_utf8: lower.inner.invalid_utf8.clone(),
        };

        for (key, value) in &self.inner.vars {
            inner.invalid_utf8.remove(key);
            inner.vars.insert(key.clone(), value.clone());
        }
        for key in &self.inner.invalid_utf8 {
            inner.vars.remove(key);
            inner.invalid_utf8.insert(key.clone());
        }

        let origin = match (self.origin, lower.origin) {
            (Origin::Layered(mut upper), Origin::Layered(lower)) => {
                upper.extend(lower);
                Origin::Layered(upper)
            }
            (Origin::Layered(mut upper), lower) => {
                upper.push(lower);
                Origin::Layered(upper)
            }
            (upper, Origin::Layered(mut lower)) => {
                lower.insert(0, upper);
                Origin::Layered(lower)
            }
            (upper, lower) => Origin::Layered(vec![upper, lower]),
        };

        Self {
            inner: Arc::new(inner),
            origin,
        }
    }

    /// Returns the raw value of `key`, `None` if missing or declared absent.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.inner.vars.get(key).and_then(Option::as_deref)
    }

    /// Whether `key` has an entry, even an absent one.
    #[must_use]
    pub fn contains_key(&self, key: &str) -> bool {
        self.inner.vars.contains_key(key)
    }

    /// Whether `key` was present but not valid UTF-8.
    #[must_use]
    pub fn is_invalid_utf8(&self, key: &str) -> bool {
        self.inner.invalid_utf8.contains(key)
    }

    /// All names with an entry, sorted for deterministic iteration.
    #[must_use]
    pub fn keys(&self) -> Vec<&str> {
        let mut keys: Vec<&str> = self.inner.vars.keys().map(String::as_str).collect();
        keys.sort_unstable();
        keys
    }

    /// Number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.vars.len()
    }

    /// Whether the source has no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner.vars.is_empty()
    }

    /// Where the values came from.
    #[must_use]
    pub const fn origin(&self) -> &Origin {
        &self.origin
    }

    /// Whether `self` and `other` share the same underlying storage.
    #[must_use]
    pub fn shares_storage(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    /// Reads `key` for a declared field.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidUtf8`] if the variable exists but is not UTF-8.
    pub(crate) fn read_declared(&self, key: &str) -> Result<Option<&str>, Error> {
        if self.is_invalid_utf8(key) {
            return Err(Error::InvalidUtf8 {
                var: key.to_string(),
            });
        }

        Ok(self.get(key))
    }
}

impl<K: Into<String>> FromIterator<(K, Option<String>)> for EnvSource {
    fn from_iter<I: IntoIterator<Item = (K, Option<String>)>>(iter: I) -> Self {
        let vars = iter.into_iter().map(|(k, v)| (k.into(), v)).collect();

        Self {
            inner: Arc::new(Inner {
                vars,
                invalid_utf8: HashSet::new(),
            }),
            origin: Origin::Memory,
        }
    }
}

impl From<HashMap<String, String>> for EnvSource {
    fn from(map: HashMap<String, String>) -> Self {
        Self::from_pairs(map)
    }
}

impl From<HashMap<String, Option<String>>> for EnvSource {
    fn from(map: HashMap<String, Option<String>>) -> Self {
        map.into_iter().collect()
    }
}

impl Default for EnvSource {
    fn default() -> Self {
        Self::from_process_env()
    }
}
