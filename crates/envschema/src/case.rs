//! camelCase names for the camel view.

/// Converts a variable name to camelCase.
///
/// The name is split on `_`; empty segments are dropped. The upper-case
/// rule applies per segment, not to the whole name: a segment written fully
/// in upper case is lowered, any other segment keeps its casing. Every
/// segment after the first then gets an upper-case first letter, so a
/// mixed-case name containing `_` is still joined.
///
/// | Input | Output |
/// |-------|--------|
/// | `DATABASE_URL` | `databaseUrl` |
/// | `PORT` | `port` |
/// | `fooBar` | `fooBar` |
/// | `API_V2_key` | `apiV2Key` |
/// | `fooBar_baz` | `fooBarBaz` |
#[must_use]
pub fn to_camel_case(name: &str) -> String {
    let mut out = String::with_capacity(name.len());

    for segment in name.split('_').filter(|s| !s.is_empty()) {
        let segment = normalize(segment);

        if out.is_empty() {
            out.push_str(&segment);
        } else {
            let mut chars = segment.chars();
            if let Some(first) = chars.next() {
                out.extend(first.to_uppercase());
                out.push_str(chars.as_str());
            }
        }
    }

    out
}

fn normalize(segment: &str) -> String {
    if segment.chars().any(char::is_lowercase) {
        segment.to_string()
    } else {
        segment.to_lowercase()
    }
}
