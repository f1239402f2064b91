//! Computo: a homoiconic JSON transformation language. A script is
//! itself JSON — a `["op", args...]` call form, a `{array_key: [...]}`
//! literal-array wrapper, or any other JSON value evaluating to itself.
//!
//! The library surface is small on purpose: [`execute`] runs a parsed
//! script against an ordered list of inputs. Everything else (the
//! sugar concrete syntax, the operator registry, the environment
//! model) is exposed as submodules for callers that need more control,
//! e.g. a REPL that wants to reuse one `Environment` across statements.

pub mod env;
pub mod error;
pub mod eval;
pub mod ops;
pub mod options;
pub mod registry;
pub mod sugar;
pub mod value;

pub use env::Environment;
pub use error::Error;
pub use options::Options;
pub use value::Value;

/// Evaluates `script` against `inputs` with default options.
pub fn execute(script: &Value, inputs: Vec<Value>) -> Result<Value, Error> {
    execute_with_options(script, inputs, &Options::default())
}

/// Evaluates `script` against `inputs`, honoring the given [`Options`]
/// (literal-array key, recursion-depth ceiling).
pub fn execute_with_options(script: &Value, inputs: Vec<Value>, opts: &Options) -> Result<Value, Error> {
    let env = Environment::new(inputs);
    eval::evaluate(script, &env, opts)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn execute_literal_preservation() {
        assert_eq!(execute(&Value::Int(5), vec![]).unwrap(), Value::Int(5));
        assert_eq!(execute(&Value::String("hi".to_string()), vec![]).unwrap(), Value::String("hi".to_string()));
    }

    #[test]
    fn execute_scenario_a_arithmetic_and_let() {
        let script = Value::from_json(serde_json::json!(["let", [["x", 10], ["y", 20]], ["+", ["$", "/x"], ["$", "/y"]]]));
        assert_eq!(execute(&script, vec![]).unwrap(), Value::Int(30));
    }

    #[test]
    fn execute_scenario_b_filter_map_on_users() {
        let script = Value::from_json(serde_json::json!([
            "map",
            ["filter", ["$input", "/users"], ["lambda", ["u"], ["get", ["$", "/u"], "/active"]]],
            ["lambda", ["u"], ["get", ["$", "/u"], "/name"]]
        ]));
        let input = Value::from_json(serde_json::json!({
            "users": [
                {"name": "Alice", "active": true},
                {"name": "Bob", "active": false},
                {"name": "Charlie", "active": true}
            ]
        }));
        let result = execute(&script, vec![input]).unwrap();
        assert_eq!(result, Value::wrap_array(vec![Value::String("Alice".into()), Value::String("Charlie".into())], "array"));
    }

    #[test]
    fn execute_scenario_c_chained_comparison() {
        let script = Value::from_json(serde_json::json!(["<", 1, 2, 3, 4, 5]));
        assert_eq!(execute(&script, vec![]).unwrap(), Value::Bool(true));
        let script = Value::from_json(serde_json::json!(["<", 1, 3, 2]));
        assert_eq!(execute(&script, vec![]).unwrap(), Value::Bool(false));
    }

    #[test]
    fn execute_scenario_e_patch_round_trip() {
        // Objects aren't call forms, so `a`/`b` can be spliced directly into
        // an AST as literals (Testable Property 1).
        let a = Value::from_json(serde_json::json!({"id": 1, "status": "active"}));
        let b = Value::from_json(serde_json::json!({"id": 1, "status": "archived"}));
        let diff_script = Value::Array(vec![Value::String("diff".to_string()), a.clone(), b.clone()]);
        let patch_doc = execute(&diff_script, vec![]).unwrap();
        let patch_script = Value::Array(vec![Value::String("patch".to_string()), a, patch_doc]);
        assert_eq!(execute(&patch_script, vec![]).unwrap(), b);
    }
}
