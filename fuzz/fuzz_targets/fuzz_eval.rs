#![no_main]
use arbitrary::{Arbitrary, Unstructured};
use libfuzzer_sys::fuzz_target;

// Arbitrary call-form-shaped ASTs. The evaluator must only ever return
// `Ok`/`Err`, never panic, regardless of how malformed the script is
// (unknown operators, wrong arity, non-string heads, etc).
#[derive(Debug)]
enum FuzzValue {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(u8),
    Call(u8, Vec<FuzzValue>),
    ArrayLiteral(Vec<FuzzValue>),
}

const STRINGS: &[&str] = &["x", "y", "u", "/a", "/0"];
const OPS: &[&str] = &[
    "+", "-", "*", "/", "%", "<", "==", "and", "or", "not", "if", "let", "lambda", "map", "filter",
    "reduce", "get", "obj", "sort", "unique", "merge", "$", "$input", "$inputs", "call", "nope",
];

impl FuzzValue {
    fn arbitrary_depth(u: &mut Unstructured<'_>, depth: usize) -> arbitrary::Result<Self> {
        if depth == 0 {
            let choice = u.int_in_range(0u8..=4)?;
            return match choice {
                0 => Ok(FuzzValue::Null),
                1 => Ok(FuzzValue::Bool(u.arbitrary()?)),
                2 => Ok(FuzzValue::Int(u.arbitrary()?)),
                3 => Ok(FuzzValue::Float(u.arbitrary()?)),
                _ => Ok(FuzzValue::Str(u.arbitrary()?)),
            };
        }
        let choice = u.int_in_range(0u8..=6)?;
        match choice {
            0 => Ok(FuzzValue::Null),
            1 => Ok(FuzzValue::Bool(u.arbitrary()?)),
            2 => Ok(FuzzValue::Int(u.arbitrary()?)),
            3 => Ok(FuzzValue::Float(u.arbitrary()?)),
            4 => Ok(FuzzValue::Str(u.arbitrary()?)),
            5 => {
                let op: u8 = u.arbitrary()?;
                let n = u.int_in_range(0u8..=3)? as usize;
                let mut args = Vec::with_capacity(n);
                for _ in 0..n {
                    args.push(FuzzValue::arbitrary_depth(u, depth - 1)?);
                }
                Ok(FuzzValue::Call(op, args))
            }
            _ => {
                let n = u.int_in_range(0u8..=3)? as usize;
                let mut items = Vec::with_capacity(n);
                for _ in 0..n {
                    items.push(FuzzValue::arbitrary_depth(u, depth - 1)?);
                }
                Ok(FuzzValue::ArrayLiteral(items))
            }
        }
    }

    fn to_json(&self) -> serde_json::Value {
        match self {
            FuzzValue::Null => serde_json::Value::Null,
            FuzzValue::Bool(b) => serde_json::Value::Bool(*b),
            FuzzValue::Int(n) => serde_json::json!(n),
            FuzzValue::Float(f) => {
                serde_json::Number::from_f64(*f).map(serde_json::Value::Number).unwrap_or(serde_json::Value::Null)
            }
            FuzzValue::Str(idx) => serde_json::Value::String(STRINGS[*idx as usize % STRINGS.len()].to_string()),
            FuzzValue::Call(op, args) => {
                let mut items = vec![serde_json::Value::String(OPS[*op as usize % OPS.len()].to_string())];
                items.extend(args.iter().map(FuzzValue::to_json));
                serde_json::Value::Array(items)
            }
            FuzzValue::ArrayLiteral(items) => {
                serde_json::json!({"array": items.iter().map(FuzzValue::to_json).collect::<Vec<_>>()})
            }
        }
    }
}

impl<'a> Arbitrary<'a> for FuzzValue {
    fn arbitrary(u: &mut Unstructured<'a>) -> arbitrary::Result<Self> {
        FuzzValue::arbitrary_depth(u, 4)
    }
}

fuzz_target!(|script: FuzzValue| {
    let ast = computo::Value::from_json(script.to_json());
    let _ = computo::execute(&ast, vec![]);
});
