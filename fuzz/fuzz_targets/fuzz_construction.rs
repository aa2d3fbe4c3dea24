#![no_main]

use arbitrary::Arbitrary;
use envschema::schema::{self, SchemaExt};
use envschema::{Env, EnvSource, shape};
use libfuzzer_sys::fuzz_target;

#[derive(Arbitrary, Debug)]
struct Input {
    port: Option<String>,
    debug: Option<String>,
    name: Option<String>,
    config: Option<String>,
}

fuzz_target!(|input: Input| {
    let source: EnvSource = [
        ("PORT", input.port),
        ("DEBUG", input.debug),
        ("NAME", input.name.clone()),
        ("CONFIG", input.config),
    ]
    .into_iter()
    .collect();

    let result = Env::new(
        shape! {
            "PORT" => schema::number().port().with_default(8080),
            "DEBUG" => schema::boolean().optional(),
            "NAME" => schema::string().optional(),
            "CONFIG" => schema::record(schema::unknown()).optional(),
        },
        source,
    );

    // === Construction either fails cleanly or yields consistent views ===
    if let Ok(env) = result {
        assert_eq!(env.meta().len(), 4);
        assert_eq!(
            env.meta().get("NAME").and_then(|v| v.raw()),
            input.name.as_deref()
        );

        let _ = env.omit(["CONFIG"]);
        let _ = env.pick(["PORT", "NAME"]);
    }
});
