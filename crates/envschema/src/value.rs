//! Dynamic values and the read-only [`View`] over a validated record.
//!
//! Values flowing through the engine are [`serde_json::Value`]s. A record is
//! an insertion-ordered map of them, so declaration order survives all the
//! way into the derived views.
//!
//! # Example
//!
//! ```rust,ignore
//! let env = Env::new(schema, source)?;
//!
//! let port: Option<u16> = env.data().get_u16("PORT");
//! let debug: Option<bool> = env.data().get_bool("DEBUG");
//! let hosts: Vec<String> = env.data().get_as("HOSTS")?;
//! ```

use serde::de::DeserializeOwned;
use serde_json::{Number, Value};

use crate::Error;

/// An insertion-ordered map from field name to value.
pub type Record = serde_json::Map<String, Value>;

// ============================================================================
// Macros for reducing boilerplate
// ============================================================================

/// Generates `get_*` accessors that convert numbers via `ToPrimitive`
macro_rules! impl_get_primitive {
    ($($method:ident => $conv:ident -> $t:ty),+ $(,)?) => {
        $(
            #[doc = concat!("Returns `key` as `", stringify!($t), "` if it is a number that fits.")]
            #[must_use]
            pub fn $method(&self, key: &str) -> Option<$t> {
                use num_traits::ToPrimitive;

                let Value::Number(n) = self.get(key)? else {
                    return None;
                };

                if let Some(i) = n.as_i64() {
                    i.$conv()
                } else if let Some(u) = n.as_u64() {
                    u.$conv()
                } else {
                    n.as_f64().and_then(|f| f.$conv())
                }
            }
        )+
    };
}

// ============================================================================
// View
// ============================================================================

/// A frozen, read-only projection of a validated record.
///
/// Views are computed once when an [`Env`](crate::Env) is built and only
/// handed out by shared reference afterwards.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct View {
    entries: Record,
}

impl View {
    pub(crate) const fn new(entries: Record) -> Self {
        Self { entries }
    }

    /// Returns the value stored under `key`.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.entries.get(key)
    }

    /// Whether `key` is present in this view.
    #[must_use]
    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// Number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the view has no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Keys in insertion order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// Entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// The underlying record.
    #[must_use]
    pub const fn as_record(&self) -> &Record {
        &self.entries
    }

    /// Returns `key` as a string slice if it holds a string.
    #[must_use]
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(Value::as_str)
    }

    /// Returns `key` as a bool if it holds a boolean.
    #[must_use]
    pub fn get_bool(&self, key: &str) -> Option<bool> {
        self.get(key).and_then(Value::as_bool)
    }

    impl_get_primitive! {
        get_i32 => to_i32 -> i32,
        get_i64 => to_i64 -> i64,
        get_u16 => to_u16 -> u16,
        get_u32 => to_u32 -> u32,
        get_u64 => to_u64 -> u64,
        get_usize => to_usize -> usize,
        get_f64 => to_f64 -> f64,
    }

    /// Deserializes the value under `key` into `T`.
    ///
    /// A missing key is deserialized from `null`, so `Option<T>` targets
    /// yield `None`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Deserialize`] if the value does not fit `T`.
    pub fn get_as<T: DeserializeOwned>(&self, key: &str) -> Result<T, Error> {
        let value = self.get(key).cloned().unwrap_or(Value::Null);

        serde_path_to_error::deserialize(value).map_err(|e| {
            let mut err = Error::from_path_error(&e);
            if let Error::Deserialize { path, .. } = &mut err {
                *path = if path == "." {
                    key.to_string()
                } else {
                    format!("{key}.{path}")
                };
            }
            err
        })
    }

    /// Deserializes the whole view into `T`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Deserialize`] naming the first field that did not fit.
    pub fn deserialize<T: DeserializeOwned>(&self) -> Result<T, Error> {
        let value = Value::Object(self.entries.clone());

        serde_path_to_error::deserialize(value).map_err(|e| Error::from_path_error(&e))
    }
}

impl<'a> IntoIterator for &'a View {
    type Item = (&'a String, &'a Value);
    type IntoIter = serde_json::map::Iter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

// ============================================================================
// Helpers
// ============================================================================

/// Human-readable kind of a value, used in `expected X, received Y` messages.
#[must_use]
pub fn kind_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Parses a trimmed numeric literal.
///
/// Integral values become integer numbers so `"8080"` and `"8.08e3"` both
/// read back as `8080`. Non-finite results are rejected.
#[allow(clippy::cast_possible_truncation, clippy::cast_precision_loss)]
pub(crate) fn parse_number(s: &str) -> Option<Number> {
    if let Ok(i) = s.parse::<i64>() {
        return Some(Number::from(i));
    }

    if let Ok(u) = s.parse::<u64>() {
        return Some(Number::from(u));
    }

    // Rust also reads "inf" and "NaN"; neither is a usable number here
    let f = s.parse::<f64>().ok().filter(|f| f.is_finite())?;

    // i64::MAX as f64 rounds up to 2^63, which no longer fits
    if f.fract() == 0.0 && f >= i64::MIN as f64 && f < i64::MAX as f64 {
        return Some(Number::from(f as i64));
    }

    Number::from_f64(f)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn view(value: Value) -> View {
        match value {
            Value::Object(map) => View::new(map),
            _ => panic!("expected object"),
        }
    }

    #[test]
    fn test_parse_number_integers() {
        assert_eq!(parse_number("8080"), Some(Number::from(8080)));
        assert_eq!(parse_number("-1"), Some(Number::from(-1)));
        assert_eq!(parse_number("8.08e3"), Some(Number::from(8080)));
        assert_eq!(parse_number(&u64::MAX.to_string()), Some(Number::from(u64::MAX)));
    }

    #[test]
    fn test_parse_number_i64_boundary() {
        assert_eq!(parse_number("-9223372036854775808.0"), Some(Number::from(i64::MIN)));

        let two_pow_63 = parse_number("9223372036854775808.0").unwrap();
        assert_eq!(two_pow_63.as_i64(), None);
        assert_eq!(two_pow_63.as_f64(), Some(9_223_372_036_854_775_808.0));
    }

    #[test]
    fn test_parse_number_floats() {
        assert_eq!(parse_number("3.5").and_then(|n| n.as_f64()), Some(3.5));
        assert_eq!(parse_number(".5").and_then(|n| n.as_f64()), Some(0.5));
    }

    #[test]
    fn test_parse_number_rejects() {
        assert!(parse_number("abc").is_none());
        assert!(parse_number("inf").is_none());
        assert!(parse_number("NaN").is_none());
        assert!(parse_number("infinity").is_none());
        assert!(parse_number("12px").is_none());
    }

    #[test]
    fn test_view_accessors() {
        let v = view(json!({
            "PORT": 8080,
            "RATIO": 0.25,
            "DEBUG": true,
            "NAME": "api",
            "BIG": 70000
        }));

        assert_eq!(v.get_u16("PORT"), Some(8080));
        assert_eq!(v.get_i64("PORT"), Some(8080));
        assert_eq!(v.get_f64("RATIO"), Some(0.25));
        assert_eq!(v.get_bool("DEBUG"), Some(true));
        assert_eq!(v.get_str("NAME"), Some("api"));
        assert_eq!(v.get_u16("BIG"), None); // Overflow
        assert_eq!(v.get_u16("NAME"), None);
        assert_eq!(v.get_u16("MISSING"), None);
    }

    #[test]
    fn test_view_order_and_len() {
        let v = view(json!({"B": 1, "A": 2}));
        assert_eq!(v.keys().collect::<Vec<_>>(), vec!["B", "A"]);
        assert_eq!(v.len(), 2);
        assert!(!v.is_empty());
        assert!(v.contains_key("A"));
    }

    #[test]
    fn test_view_get_as() {
        let v = view(json!({"HOSTS": ["a", "b"]}));

        let hosts: Vec<String> = v.get_as("HOSTS").unwrap();
        assert_eq!(hosts, vec!["a", "b"]);

        let missing: Option<String> = v.get_as("NOPE").unwrap();
        assert!(missing.is_none());

        let err = v.get_as::<Vec<u16>>("HOSTS").unwrap_err();
        assert!(matches!(err, Error::Deserialize { ref path, .. } if path.starts_with("HOSTS")));
    }

    #[test]
    fn test_kind_name() {
        assert_eq!(kind_name(&json!("x")), "string");
        assert_eq!(kind_name(&json!(1)), "number");
        assert_eq!(kind_name(&json!(null)), "null");
        assert_eq!(kind_name(&json!({})), "object");
    }
}
