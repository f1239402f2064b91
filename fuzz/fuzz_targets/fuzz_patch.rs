#![no_main]
use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;

// Testable Property 10: patch(a, diff(a, b)) == b, for arbitrary small
// JSON values -- diff/patch must never panic and must always round-trip.
#[derive(Debug, Arbitrary)]
enum Leaf {
    Null,
    Bool(bool),
    Int(i8),
    Str(u8),
}

const STRINGS: &[&str] = &["a", "b", "foo", ""];
const KEYS: &[&str] = &["id", "status", "name", "count"];

fn to_json(leaf: &Leaf) -> serde_json::Value {
    match leaf {
        Leaf::Null => serde_json::Value::Null,
        Leaf::Bool(b) => serde_json::Value::Bool(*b),
        Leaf::Int(n) => serde_json::json!(n),
        Leaf::Str(idx) => serde_json::Value::String(STRINGS[*idx as usize % STRINGS.len()].to_string()),
    }
}

#[derive(Debug, Arbitrary)]
struct FuzzObject {
    entries: Vec<(u8, Leaf)>,
}

impl FuzzObject {
    fn to_json(&self) -> serde_json::Value {
        let map: serde_json::Map<String, serde_json::Value> = self
            .entries
            .iter()
            .take(6)
            .map(|(k, v)| (KEYS[*k as usize % KEYS.len()].to_string(), to_json(v)))
            .collect();
        serde_json::Value::Object(map)
    }
}

fuzz_target!(|pair: (FuzzObject, FuzzObject)| {
    let (a, b) = pair;
    let a = computo::Value::from_json(a.to_json());
    let b = computo::Value::from_json(b.to_json());

    let diff_script = computo::Value::Array(vec![
        computo::Value::String("diff".to_string()),
        a.clone(),
        b.clone(),
    ]);
    let patch_doc = match computo::execute(&diff_script, vec![]) {
        Ok(v) => v,
        Err(_) => return,
    };
    let patch_script = computo::Value::Array(vec![computo::Value::String("patch".to_string()), a, patch_doc]);
    match computo::execute(&patch_script, vec![]) {
        Ok(result) => assert!(result.equals(&b), "patch(a, diff(a, b)) != b"),
        Err(e) => panic!("patch application failed on a diff/patch produced by this crate: {e}"),
    }
});
