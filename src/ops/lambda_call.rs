//! `call` — applies a lambda value to explicit arguments (§4.5 "Lambda
//! application"). Grounded on `ops/array.rs`'s HOFs, which all resolve
//! their lambda operand through `evaluate` before handing it to
//! `eval::apply_lambda`; `call` is the same mechanism exposed directly
//! as an operator rather than driven by an array traversal.

use crate::env::Environment;
use crate::error::Error;
use crate::eval::{apply_lambda, evaluate};
use crate::options::Options;
use crate::registry::Outcome;
use crate::value::Value;

pub fn call(args: &[Value], env: &Environment, opts: &Options) -> Result<Outcome, Error> {
    if args.is_empty() {
        return Err(env.error_with_path(Error::arity("call", "at least 1 argument (lambda, ...args)", 0)));
    }
    let lambda = evaluate(&args[0], env, opts).map_err(|e| env.error_with_path(e))?;
    let mut call_args = Vec::with_capacity(args.len() - 1);
    for a in &args[1..] {
        call_args.push(evaluate(a, env, opts).map_err(|e| env.error_with_path(e))?);
    }
    let result = apply_lambda(&lambda, &call_args, &env.with_path("call"), opts).map_err(|e| env.error_with_path(e))?;
    Ok(result.into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::eval::evaluate as eval_full;

    fn run(expr: serde_json::Value) -> Result<Value, Error> {
        let env = Environment::new(vec![]);
        let opts = Options::default();
        eval_full(&Value::from_json(expr), &env, &opts)
    }

    #[test]
    fn call_applies_inline_lambda() {
        let expr = serde_json::json!(["call", ["lambda", ["x", "y"], ["+", ["$", "/x"], ["$", "/y"]]], 2, 3]);
        assert_eq!(run(expr).unwrap(), Value::Int(5));
    }

    #[test]
    fn call_applies_variable_bound_lambda() {
        let expr = serde_json::json!([
            "let",
            [["double", ["lambda", ["x"], ["*", ["$", "/x"], 2]]]],
            ["call", ["$", "/double"], 21],
        ]);
        assert_eq!(run(expr).unwrap(), Value::Int(42));
    }

    #[test]
    fn call_requires_at_least_one_argument() {
        assert!(matches!(run(serde_json::json!(["call"])), Err(Error::Arity { .. })));
    }
}
