//! `$`, `$input`, `$inputs` (§4.3).
//!
//! Grounded on `original_source/src/operators/data_access.cpp`'s
//! `variable_operator`/`input_operator`/`inputs_operator`: split the
//! pointer into the leading variable-name segment and a remaining JSON
//! Pointer, with lazy evaluation of an optional default-expression second
//! argument on any lookup/traversal failure.

use crate::env::Environment;
use crate::error::Error;
use crate::eval::evaluate;
use crate::options::Options;
use crate::registry::Outcome;
use crate::value::Value;

use super::require_string;

/// Splits `"/name/seg/seg"` into `("name", "/seg/seg")`, or `("name", "")`
/// when there's nothing beyond the variable name.
fn split_pointer(pointer: &str) -> Result<(&str, &str), Error> {
    if !pointer.starts_with('/') {
        return Err(Error::invalid_script("JSON pointer must start with '/'"));
    }
    let rest = &pointer[1..];
    match rest.find('/') {
        Some(i) => Ok((&rest[..i], &rest[i..])),
        None => Ok((rest, "")),
    }
}

/// Applies the remaining JSON-Pointer segments to an already-resolved
/// root value, matching RFC 6901 (array index by decimal, object by key).
pub fn traverse_pointer(root: &Value, pointer: &str) -> Result<Value, Error> {
    if pointer.is_empty() {
        return Ok(root.clone());
    }
    let mut current = root.clone();
    for raw_segment in pointer[1..].split('/') {
        let segment = unescape_pointer_token(raw_segment);
        current = match &current {
            Value::Object(obj) => obj
                .get(&segment)
                .cloned()
                .ok_or_else(|| Error::path_error(pointer, format!("no key '{segment}'")))?,
            Value::Array(arr) => {
                let idx: usize = segment
                    .parse()
                    .map_err(|_| Error::path_error(pointer, format!("'{segment}' is not an array index")))?;
                arr.get(idx)
                    .cloned()
                    .ok_or_else(|| Error::path_error(pointer, format!("index {idx} out of bounds")))?
            }
            _ => return Err(Error::path_error(pointer, "cannot traverse into a scalar value")),
        };
    }
    Ok(current)
}

fn unescape_pointer_token(token: &str) -> String {
    token.replace("~1", "/").replace("~0", "~")
}

fn resolve_with_default(
    lookup: impl FnOnce() -> Result<Value, Error>,
    default_expr: Option<&Value>,
    env: &Environment,
    opts: &Options,
) -> Result<Value, Error> {
    match lookup() {
        Ok(v) => Ok(v),
        Err(e) => match default_expr {
            Some(expr) => evaluate(expr, env, opts),
            None => Err(e),
        },
    }
}

pub fn dollar(args: &[Value], env: &Environment, opts: &Options) -> Result<Outcome, Error> {
    if args.is_empty() {
        return Ok(env.all_bindings_as_object().into());
    }
    if args.len() > 2 {
        return Err(env.error_with_path(Error::arity("$", "0, 1, or 2 arguments", args.len())));
    }
    let pointer_val = evaluate(&args[0], env, opts).map_err(|e| env.error_with_path(e))?;
    let pointer = require_string(&pointer_val, "$").map_err(|e| env.error_with_path(e))?;
    let (var_name, sub_path) = split_pointer(pointer).map_err(|e| env.error_with_path(e))?;

    let result = resolve_with_default(
        || {
            let bound = env.lookup(var_name).cloned().ok_or_else(|| {
                Error::unknown_variable(var_name, &env.all_names())
            })?;
            traverse_pointer(&bound, sub_path)
        },
        args.get(1),
        env,
        opts,
    )
    .map_err(|e| env.error_with_path(e))?;
    Ok(result.into())
}

pub fn dollar_input(args: &[Value], env: &Environment, opts: &Options) -> Result<Outcome, Error> {
    if args.len() > 2 {
        return Err(env.error_with_path(Error::arity("$input", "0, 1, or 2 arguments", args.len())));
    }
    let root = env.inputs().first().cloned().unwrap_or(Value::Null);
    if args.is_empty() {
        return Ok(root.into());
    }
    let pointer_val = evaluate(&args[0], env, opts).map_err(|e| env.error_with_path(e))?;
    let pointer = require_string(&pointer_val, "$input").map_err(|e| env.error_with_path(e))?;
    let result = resolve_with_default(|| traverse_pointer(&root, pointer), args.get(1), env, opts)
        .map_err(|e| env.error_with_path(e))?;
    Ok(result.into())
}

pub fn dollar_inputs(args: &[Value], env: &Environment, opts: &Options) -> Result<Outcome, Error> {
    if args.len() > 2 {
        return Err(env.error_with_path(Error::arity("$inputs", "0, 1, or 2 arguments", args.len())));
    }
    let root = Value::Array(env.inputs().to_vec());
    if args.is_empty() {
        return Ok(root.into());
    }
    let pointer_val = evaluate(&args[0], env, opts).map_err(|e| env.error_with_path(e))?;
    let pointer = require_string(&pointer_val, "$inputs").map_err(|e| env.error_with_path(e))?;
    let result = resolve_with_default(|| traverse_pointer(&root, pointer), args.get(1), env, opts)
        .map_err(|e| env.error_with_path(e))?;
    Ok(result.into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::eval::evaluate as eval_full;
    use std::collections::HashMap;

    fn run_with_inputs(expr: serde_json::Value, inputs: Vec<serde_json::Value>) -> Result<Value, Error> {
        let env = Environment::new(inputs.into_iter().map(Value::from_json).collect());
        let opts = Options::default();
        eval_full(&Value::from_json(expr), &env, &opts)
    }

    #[test]
    fn input_defaults_to_null_when_absent() {
        assert_eq!(run_with_inputs(serde_json::json!(["$input"]), vec![]).unwrap(), Value::Null);
    }

    #[test]
    fn input_pointer_traversal() {
        let result = run_with_inputs(
            serde_json::json!(["$input", "/users/0/name"]),
            vec![serde_json::json!({"users": [{"name": "Alice"}]})],
        )
        .unwrap();
        assert_eq!(result, Value::String("Alice".to_string()));
    }

    #[test]
    fn inputs_returns_full_sequence() {
        let result = run_with_inputs(serde_json::json!(["$inputs"]), vec![serde_json::json!(1), serde_json::json!(2)]).unwrap();
        assert_eq!(result, Value::Array(vec![Value::Int(1), Value::Int(2)]));
    }

    #[test]
    fn dollar_variable_lookup_and_traversal() {
        let env = Environment::new(vec![]);
        let opts = Options::default();
        let mut vars = HashMap::new();
        vars.insert("x".to_string(), Value::from_json(serde_json::json!({"a": 1})));
        let env = env.with_bindings(vars);
        let expr = Value::from_json(serde_json::json!(["$", "/x/a"]));
        assert_eq!(eval_full(&expr, &env, &opts).unwrap(), Value::Int(1));
    }

    #[test]
    fn unknown_variable_without_default_errors() {
        let env = Environment::new(vec![]);
        let opts = Options::default();
        let expr = Value::from_json(serde_json::json!(["$", "/missing"]));
        assert!(matches!(eval_full(&expr, &env, &opts), Err(Error::UnknownVariable { .. })));
    }

    #[test]
    fn default_expression_used_lazily_on_failure() {
        let env = Environment::new(vec![]);
        let opts = Options::default();
        let expr = Value::from_json(serde_json::json!(["$", "/missing", "fallback"]));
        assert_eq!(eval_full(&expr, &env, &opts).unwrap(), Value::String("fallback".to_string()));
    }
}
