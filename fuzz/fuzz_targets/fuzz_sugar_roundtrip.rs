#![no_main]
use libfuzzer_sys::fuzz_target;

// Testable Property 11: parse(write(A)) == A for every AST the sugar
// parser itself can produce.
fuzz_target!(|data: &[u8]| {
    let Ok(text) = std::str::from_utf8(data) else { return };
    let Ok(ast) = computo::sugar::parse_sugar(text, "array") else { return };
    let rendered = computo::sugar::write_sugar(&ast, "array");
    let reparsed = computo::sugar::parse_sugar(&rendered, "array")
        .unwrap_or_else(|e| panic!("write_sugar produced unparseable output {rendered:?}: {e}"));
    assert_eq!(ast, reparsed, "round-trip mismatch for input {text:?}, rendered {rendered:?}");
});
