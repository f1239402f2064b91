#![no_main]
use libfuzzer_sys::fuzz_target;

// The sugar lexer/parser must never panic on arbitrary bytes, only return
// a structured ParseError (§4.6/§4.8).
fuzz_target!(|data: &[u8]| {
    let Ok(text) = std::str::from_utf8(data) else { return };
    let _ = computo::sugar::parse_sugar(text, "array");
});
