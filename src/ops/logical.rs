//! `and`/`or`/`not` (variadic, short-circuit) and `approx` (§4.5
//! "Logical", "Approximate equality"). Grounded on §4.2's truthiness
//! policy, applied uniformly here.

use crate::env::Environment;
use crate::error::Error;
use crate::eval::evaluate;
use crate::options::Options;
use crate::registry::Outcome;
use crate::value::Value;

use super::require_number;

pub fn and(args: &[Value], env: &Environment, opts: &Options) -> Result<Outcome, Error> {
    for (i, a) in args.iter().enumerate() {
        let v = evaluate(a, &env.with_path(format!("and[{i}]")), opts).map_err(|e| env.error_with_path(e))?;
        if !v.is_truthy() {
            return Ok(Value::Bool(false).into());
        }
    }
    Ok(Value::Bool(true).into())
}

pub fn or(args: &[Value], env: &Environment, opts: &Options) -> Result<Outcome, Error> {
    for (i, a) in args.iter().enumerate() {
        let v = evaluate(a, &env.with_path(format!("or[{i}]")), opts).map_err(|e| env.error_with_path(e))?;
        if v.is_truthy() {
            return Ok(Value::Bool(true).into());
        }
    }
    Ok(Value::Bool(false).into())
}

pub fn not(args: &[Value], env: &Environment, opts: &Options) -> Result<Outcome, Error> {
    if args.len() != 1 {
        return Err(env.error_with_path(Error::arity("not", "1 argument", args.len())));
    }
    let v = evaluate(&args[0], env, opts).map_err(|e| env.error_with_path(e))?;
    Ok(Value::Bool(!v.is_truthy()).into())
}

pub fn approx(args: &[Value], env: &Environment, opts: &Options) -> Result<Outcome, Error> {
    if args.len() != 3 {
        return Err(env.error_with_path(Error::arity("approx", "3 arguments (a, b, tolerance)", args.len())));
    }
    let a = evaluate(&args[0], env, opts).map_err(|e| env.error_with_path(e))?;
    let b = evaluate(&args[1], env, opts).map_err(|e| env.error_with_path(e))?;
    let tol = evaluate(&args[2], env, opts).map_err(|e| env.error_with_path(e))?;
    let a = require_number(&a, "approx").map_err(|e| env.error_with_path(e))?;
    let b = require_number(&b, "approx").map_err(|e| env.error_with_path(e))?;
    let tol = require_number(&tol, "approx").map_err(|e| env.error_with_path(e))?;
    if tol < 0.0 {
        return Err(env.error_with_path(Error::domain_error("approx tolerance must be >= 0")));
    }
    Ok(Value::Bool((a - b).abs() <= tol).into())
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
    fn and_short_circuits_on_first_falsy() {
        // A raising sub-expression after a falsy leading operand must
        // never be evaluated (Testable Property 6).
        let expr = serde_json::json!(["and", false, ["/", 1, 0]]);
        assert_eq!(run(expr).unwrap(), Value::Bool(false));
    }

    #[test]
    fn or_short_circuits_on_first_truthy() {
        let expr = serde_json::json!(["or", true, ["/", 1, 0]]);
        assert_eq!(run(expr).unwrap(), Value::Bool(true));
    }

    #[test]
    fn and_all_truthy_is_true() {
        assert_eq!(run(serde_json::json!(["and", 1, "x", true])).unwrap(), Value::Bool(true));
    }

    #[test]
    fn not_negates_truthiness() {
        assert_eq!(run(serde_json::json!(["not", 0])).unwrap(), Value::Bool(true));
        assert_eq!(run(serde_json::json!(["not", 1])).unwrap(), Value::Bool(false));
    }

    #[test]
    fn approx_within_tolerance() {
        assert_eq!(run(serde_json::json!(["approx", 1.0, 1.05, 0.1])).unwrap(), Value::Bool(true));
        assert_eq!(run(serde_json::json!(["approx", 1.0, 1.5, 0.1])).unwrap(), Value::Bool(false));
    }

    #[test]
    fn approx_rejects_negative_tolerance() {
        assert!(matches!(run(serde_json::json!(["approx", 1.0, 1.0, -1.0])), Err(Error::DomainError { .. })));
    }
}
