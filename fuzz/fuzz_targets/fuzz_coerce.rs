#![no_main]

use envschema::{FieldKind, coerce, to_camel_case};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &str| {
    // === Every kind must accept any input without panicking ===
    for kind in [
        FieldKind::String,
        FieldKind::Number,
        FieldKind::Boolean,
        FieldKind::Structured,
        FieldKind::Unknown,
    ] {
        let value = coerce(Some(data), kind);
        assert!(value.is_some(), "present input must stay present");
    }

    // === String fields are never altered ===
    assert_eq!(
        coerce(Some(data), FieldKind::String).and_then(|v| v.as_str().map(str::to_owned)),
        Some(data.to_owned())
    );

    // === Camel conversion never panics and drops every underscore ===
    let camel = to_camel_case(data);
    assert!(!camel.contains('_'));
});
