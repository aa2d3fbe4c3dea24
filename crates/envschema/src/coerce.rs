//! Best-effort conversion of raw environment strings into typed candidates.
//!
//! Coercion never fails and never invents values. When a string cannot be
//! converted it is passed through unchanged, so the schema engine reports
//! the precise type error against the original text.
//!
//! | Kind | Behavior |
//! |------|----------|
//! | `structured` | parse as JSON, otherwise pass through |
//! | `number` | trim, then parse; blank or unparsable passes through |
//! | `boolean` | `true`/`1`/`on`/`yes` and `false`/`0`/`off`/`no`, case-insensitive, untrimmed |
//! | `string` | pass through untouched (never trimmed) |
//! | `unknown` | JSON if it looks like `{...}` or `[...]`, otherwise pass through |

use serde_json::Value;

use crate::classify::FieldKind;
use crate::value::parse_number;

const TRUE_TOKENS: [&str; 4] = ["true", "1", "on", "yes"];
const FALSE_TOKENS: [&str; 4] = ["false", "0", "off", "no"];

/// Converts `raw` into a candidate value for a field of `kind`.
///
/// An absent raw value stays absent.
#[must_use]
pub fn coerce(raw: Option<&str>, kind: FieldKind) -> Option<Value> {
    let raw = raw?;

    let value = match kind {
        FieldKind::Structured => {
            serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()))
        }

        FieldKind::Number => coerce_number(raw),

        FieldKind::Boolean => coerce_bool(raw),

        FieldKind::String => Value::String(raw.to_string()),

        FieldKind::Unknown => coerce_unknown(raw),
    };

    Some(value)
}

fn coerce_number(raw: &str) -> Value {
    let trimmed = raw.trim();

    if trimmed.is_empty() {
        return Value::String(raw.to_string());
    }

    parse_number(trimmed).map_or_else(|| Value::String(raw.to_string()), Value::Number)
}

fn coerce_bool(raw: &str) -> Value {
    let token = raw.to_ascii_lowercase();

    if TRUE_TOKENS.contains(&token.as_str()) {
        Value::Bool(true)
    } else if FALSE_TOKENS.contains(&token.as_str()) {
        Value::Bool(false)
    } else {
        Value::String(raw.to_string())
    }
}

fn coerce_unknown(raw: &str) -> Value {
    let trimmed = raw.trim();

    if (trimmed.starts_with('{') || trimmed.starts_with('['))
        && let Ok(value) = serde_json::from_str(trimmed)
    {
        return value;
    }

    Value::String(raw.to_string())
}
