//! Array higher-order operators and lisp-style list ops (§4.5 "Array
//! higher-order operators"). Grounded on
//! `original_source/src/operators/array_ops.cpp`'s `map`/`filter`/`reduce`
//! family and the teacher's `filter/builtins/arrays.rs` for the general
//! shape of an array-consuming builtin (evaluate operands, unwrap the
//! array, iterate in index order).

use crate::env::Environment;
use crate::error::Error;
use crate::eval::{apply_lambda, evaluate};
use crate::options::Options;
use crate::registry::Outcome;
use crate::value::Value;

use super::{eval_all, require_array};

fn wrap(items: Vec<Value>, opts: &Options) -> Value {
    Value::wrap_array(items, &opts.array_key)
}

pub fn map(args: &[Value], env: &Environment, opts: &Options) -> Result<Outcome, Error> {
    if args.len() != 2 {
        return Err(env.error_with_path(Error::arity("map", "2 arguments (array, lambda)", args.len())));
    }
    let arr = evaluate(&args[0], env, opts).map_err(|e| env.error_with_path(e))?;
    let lambda = evaluate(&args[1], env, opts).map_err(|e| env.error_with_path(e))?;
    let items = require_array(&arr, "map", &opts.array_key).map_err(|e| env.error_with_path(e))?;
    let mut out = Vec::with_capacity(items.len());
    for (i, item) in items.iter().enumerate() {
        let result = apply_lambda(&lambda, &[item.clone()], &env.with_path(format!("map[{i}]")), opts)
            .map_err(|e| env.error_with_path(e))?;
        out.push(result);
    }
    Ok(wrap(out, opts).into())
}

pub fn filter(args: &[Value], env: &Environment, opts: &Options) -> Result<Outcome, Error> {
    if args.len() != 2 {
        return Err(env.error_with_path(Error::arity("filter", "2 arguments (array, lambda)", args.len())));
    }
    let arr = evaluate(&args[0], env, opts).map_err(|e| env.error_with_path(e))?;
    let lambda = evaluate(&args[1], env, opts).map_err(|e| env.error_with_path(e))?;
    let items = require_array(&arr, "filter", &opts.array_key).map_err(|e| env.error_with_path(e))?;
    let mut out = Vec::new();
    for (i, item) in items.iter().enumerate() {
        let keep = apply_lambda(&lambda, &[item.clone()], &env.with_path(format!("filter[{i}]")), opts)
            .map_err(|e| env.error_with_path(e))?;
        if keep.is_truthy() {
            out.push(item.clone());
        }
    }
    Ok(wrap(out, opts).into())
}

pub fn reduce(args: &[Value], env: &Environment, opts: &Options) -> Result<Outcome, Error> {
    if args.len() != 3 {
        return Err(env.error_with_path(Error::arity("reduce", "3 arguments (array, lambda, initial)", args.len())));
    }
    let arr = evaluate(&args[0], env, opts).map_err(|e| env.error_with_path(e))?;
    let lambda = evaluate(&args[1], env, opts).map_err(|e| env.error_with_path(e))?;
    let mut acc = evaluate(&args[2], env, opts).map_err(|e| env.error_with_path(e))?;
    let items = require_array(&arr, "reduce", &opts.array_key).map_err(|e| env.error_with_path(e))?;
    for (i, item) in items.iter().enumerate() {
        acc = apply_lambda(&lambda, &[acc, item.clone()], &env.with_path(format!("reduce[{i}]")), opts)
            .map_err(|e| env.error_with_path(e))?;
    }
    Ok(acc.into())
}

pub fn count(args: &[Value], env: &Environment, opts: &Options) -> Result<Outcome, Error> {
    if args.len() != 1 {
        return Err(env.error_with_path(Error::arity("count", "1 argument", args.len())));
    }
    let arr = evaluate(&args[0], env, opts).map_err(|e| env.error_with_path(e))?;
    let items = require_array(&arr, "count", &opts.array_key).map_err(|e| env.error_with_path(e))?;
    Ok(Value::Int(items.len() as i64).into())
}

pub fn find(args: &[Value], env: &Environment, opts: &Options) -> Result<Outcome, Error> {
    if args.len() != 2 {
        return Err(env.error_with_path(Error::arity("find", "2 arguments (array, lambda)", args.len())));
    }
    let arr = evaluate(&args[0], env, opts).map_err(|e| env.error_with_path(e))?;
    let lambda = evaluate(&args[1], env, opts).map_err(|e| env.error_with_path(e))?;
    let items = require_array(&arr, "find", &opts.array_key).map_err(|e| env.error_with_path(e))?;
    for (i, item) in items.iter().enumerate() {
        let matched = apply_lambda(&lambda, &[item.clone()], &env.with_path(format!("find[{i}]")), opts)
            .map_err(|e| env.error_with_path(e))?;
        if matched.is_truthy() {
            return Ok(item.clone().into());
        }
    }
    Ok(Value::Null.into())
}

pub fn some(args: &[Value], env: &Environment, opts: &Options) -> Result<Outcome, Error> {
    if args.len() != 2 {
        return Err(env.error_with_path(Error::arity("some", "2 arguments (array, lambda)", args.len())));
    }
    let arr = evaluate(&args[0], env, opts).map_err(|e| env.error_with_path(e))?;
    let lambda = evaluate(&args[1], env, opts).map_err(|e| env.error_with_path(e))?;
    let items = require_array(&arr, "some", &opts.array_key).map_err(|e| env.error_with_path(e))?;
    for (i, item) in items.iter().enumerate() {
        let matched = apply_lambda(&lambda, &[item.clone()], &env.with_path(format!("some[{i}]")), opts)
            .map_err(|e| env.error_with_path(e))?;
        if matched.is_truthy() {
            return Ok(Value::Bool(true).into());
        }
    }
    Ok(Value::Bool(false).into())
}

pub fn every(args: &[Value], env: &Environment, opts: &Options) -> Result<Outcome, Error> {
    if args.len() != 2 {
        return Err(env.error_with_path(Error::arity("every", "2 arguments (array, lambda)", args.len())));
    }
    let arr = evaluate(&args[0], env, opts).map_err(|e| env.error_with_path(e))?;
    let lambda = evaluate(&args[1], env, opts).map_err(|e| env.error_with_path(e))?;
    let items = require_array(&arr, "every", &opts.array_key).map_err(|e| env.error_with_path(e))?;
    for (i, item) in items.iter().enumerate() {
        let matched = apply_lambda(&lambda, &[item.clone()], &env.with_path(format!("every[{i}]")), opts)
            .map_err(|e| env.error_with_path(e))?;
        if !matched.is_truthy() {
            return Ok(Value::Bool(false).into());
        }
    }
    Ok(Value::Bool(true).into())
}

pub fn flat_map(args: &[Value], env: &Environment, opts: &Options) -> Result<Outcome, Error> {
    if args.len() != 2 {
        return Err(env.error_with_path(Error::arity("flatMap", "2 arguments (array, lambda)", args.len())));
    }
    let arr = evaluate(&args[0], env, opts).map_err(|e| env.error_with_path(e))?;
    let lambda = evaluate(&args[1], env, opts).map_err(|e| env.error_with_path(e))?;
    let items = require_array(&arr, "flatMap", &opts.array_key).map_err(|e| env.error_with_path(e))?;
    let mut out = Vec::new();
    for (i, item) in items.iter().enumerate() {
        let result = apply_lambda(&lambda, &[item.clone()], &env.with_path(format!("flatMap[{i}]")), opts)
            .map_err(|e| env.error_with_path(e))?;
        match result.as_array_data(&opts.array_key) {
            Some(nested) => out.extend(nested.iter().cloned()),
            None => out.push(result),
        }
    }
    Ok(wrap(out, opts).into())
}

pub fn zip(args: &[Value], env: &Environment, opts: &Options) -> Result<Outcome, Error> {
    if args.len() != 2 {
        return Err(env.error_with_path(Error::arity("zip", "2 arguments (array, array)", args.len())));
    }
    let values = eval_all(args, env, opts).map_err(|e| env.error_with_path(e))?;
    let a = require_array(&values[0], "zip", &opts.array_key).map_err(|e| env.error_with_path(e))?;
    let b = require_array(&values[1], "zip", &opts.array_key).map_err(|e| env.error_with_path(e))?;
    let out: Vec<Value> = a
        .iter()
        .zip(b.iter())
        .map(|(x, y)| Value::Array(vec![x.clone(), y.clone()]))
        .collect();
    Ok(wrap(out, opts).into())
}

pub fn zip_with(args: &[Value], env: &Environment, opts: &Options) -> Result<Outcome, Error> {
    if args.len() != 3 {
        return Err(env.error_with_path(Error::arity("zipWith", "3 arguments (array, array, lambda)", args.len())));
    }
    let a = evaluate(&args[0], env, opts).map_err(|e| env.error_with_path(e))?;
    let b = evaluate(&args[1], env, opts).map_err(|e| env.error_with_path(e))?;
    let lambda = evaluate(&args[2], env, opts).map_err(|e| env.error_with_path(e))?;
    let a = require_array(&a, "zipWith", &opts.array_key).map_err(|e| env.error_with_path(e))?;
    let b = require_array(&b, "zipWith", &opts.array_key).map_err(|e| env.error_with_path(e))?;
    let n = a.len().min(b.len());
    let mut out = Vec::with_capacity(n);
    for i in 0..n {
        let result = apply_lambda(
            &lambda,
            &[a[i].clone(), b[i].clone()],
            &env.with_path(format!("zipWith[{i}]")),
            opts,
        )
        .map_err(|e| env.error_with_path(e))?;
        out.push(result);
    }
    Ok(wrap(out, opts).into())
}

pub fn enumerate(args: &[Value], env: &Environment, opts: &Options) -> Result<Outcome, Error> {
    if args.len() != 1 {
        return Err(env.error_with_path(Error::arity("enumerate", "1 argument", args.len())));
    }
    let arr = evaluate(&args[0], env, opts).map_err(|e| env.error_with_path(e))?;
    let items = require_array(&arr, "enumerate", &opts.array_key).map_err(|e| env.error_with_path(e))?;
    let out: Vec<Value> = items
        .iter()
        .enumerate()
        .map(|(i, v)| Value::Array(vec![Value::Int(i as i64), v.clone()]))
        .collect();
    Ok(wrap(out, opts).into())
}

pub fn map_with_index(args: &[Value], env: &Environment, opts: &Options) -> Result<Outcome, Error> {
    if args.len() != 2 {
        return Err(env.error_with_path(Error::arity("mapWithIndex", "2 arguments (array, lambda)", args.len())));
    }
    let arr = evaluate(&args[0], env, opts).map_err(|e| env.error_with_path(e))?;
    let lambda = evaluate(&args[1], env, opts).map_err(|e| env.error_with_path(e))?;
    let items = require_array(&arr, "mapWithIndex", &opts.array_key).map_err(|e| env.error_with_path(e))?;
    let mut out = Vec::with_capacity(items.len());
    for (i, item) in items.iter().enumerate() {
        let result = apply_lambda(
            &lambda,
            &[item.clone(), Value::Int(i as i64)],
            &env.with_path(format!("mapWithIndex[{i}]")),
            opts,
        )
        .map_err(|e| env.error_with_path(e))?;
        out.push(result);
    }
    Ok(wrap(out, opts).into())
}

pub fn car(args: &[Value], env: &Environment, opts: &Options) -> Result<Outcome, Error> {
    if args.len() != 1 {
        return Err(env.error_with_path(Error::arity("car", "1 argument", args.len())));
    }
    let arr = evaluate(&args[0], env, opts).map_err(|e| env.error_with_path(e))?;
    let items = require_array(&arr, "car", &opts.array_key).map_err(|e| env.error_with_path(e))?;
    items
        .first()
        .cloned()
        .map(Into::into)
        .ok_or_else(|| env.error_with_path(Error::domain_error("'car' of an empty array")))
}

pub fn cdr(args: &[Value], env: &Environment, opts: &Options) -> Result<Outcome, Error> {
    if args.len() != 1 {
        return Err(env.error_with_path(Error::arity("cdr", "1 argument", args.len())));
    }
    let arr = evaluate(&args[0], env, opts).map_err(|e| env.error_with_path(e))?;
    let items = require_array(&arr, "cdr", &opts.array_key).map_err(|e| env.error_with_path(e))?;
    let rest = if items.is_empty() { Vec::new() } else { items[1..].to_vec() };
    Ok(wrap(rest, opts).into())
}

pub fn cons(args: &[Value], env: &Environment, opts: &Options) -> Result<Outcome, Error> {
    if args.len() != 2 {
        return Err(env.error_with_path(Error::arity("cons", "2 arguments (element, array)", args.len())));
    }
    let values = eval_all(args, env, opts).map_err(|e| env.error_with_path(e))?;
    let items = require_array(&values[1], "cons", &opts.array_key).map_err(|e| env.error_with_path(e))?;
    let mut out = Vec::with_capacity(items.len() + 1);
    out.push(values[0].clone());
    out.extend(items.iter().cloned());
    Ok(wrap(out, opts).into())
}

pub fn append(args: &[Value], env: &Environment, opts: &Options) -> Result<Outcome, Error> {
    if args.is_empty() {
        return Err(env.error_with_path(Error::arity("append", "at least 1 argument", 0)));
    }
    let values = eval_all(args, env, opts).map_err(|e| env.error_with_path(e))?;
    let mut out = Vec::new();
    for v in &values {
        let items = require_array(v, "append", &opts.array_key).map_err(|e| env.error_with_path(e))?;
        out.extend(items.iter().cloned());
    }
    Ok(wrap(out, opts).into())
}

pub fn chunk(args: &[Value], env: &Environment, opts: &Options) -> Result<Outcome, Error> {
    if args.len() != 2 {
        return Err(env.error_with_path(Error::arity("chunk", "2 arguments (array, n)", args.len())));
    }
    let values = eval_all(args, env, opts).map_err(|e| env.error_with_path(e))?;
    let items = require_array(&values[0], "chunk", &opts.array_key).map_err(|e| env.error_with_path(e))?;
    let Value::Int(n) = &values[1] else {
        return Err(env.error_with_path(Error::type_error("chunk", "an integer chunk size", values[1].type_name())));
    };
    if *n <= 0 {
        return Err(env.error_with_path(Error::domain_error("'chunk' size must be positive")));
    }
    let n = *n as usize;
    let out: Vec<Value> = items
        .chunks(n)
        .map(|c| wrap(c.to_vec(), opts))
        .collect();
    Ok(wrap(out, opts).into())
}

pub fn partition(args: &[Value], env: &Environment, opts: &Options) -> Result<Outcome, Error> {
    if args.len() != 2 {
        return Err(env.error_with_path(Error::arity("partition", "2 arguments (array, lambda)", args.len())));
    }
    let arr = evaluate(&args[0], env, opts).map_err(|e| env.error_with_path(e))?;
    let lambda = evaluate(&args[1], env, opts).map_err(|e| env.error_with_path(e))?;
    let items = require_array(&arr, "partition", &opts.array_key).map_err(|e| env.error_with_path(e))?;
    let mut truthy = Vec::new();
    let mut falsy = Vec::new();
    for (i, item) in items.iter().enumerate() {
        let matched = apply_lambda(&lambda, &[item.clone()], &env.with_path(format!("partition[{i}]")), opts)
            .map_err(|e| env.error_with_path(e))?;
        if matched.is_truthy() {
            truthy.push(item.clone());
        } else {
            falsy.push(item.clone());
        }
    }
    Ok(Value::Array(vec![wrap(truthy, opts), wrap(falsy, opts)]).into())
}

pub fn reverse(args: &[Value], env: &Environment, opts: &Options) -> Result<Outcome, Error> {
    if args.len() != 1 {
        return Err(env.error_with_path(Error::arity("reverse", "1 argument", args.len())));
    }
    let arr = evaluate(&args[0], env, opts).map_err(|e| env.error_with_path(e))?;
    let items = require_array(&arr, "reverse", &opts.array_key).map_err(|e| env.error_with_path(e))?;
    let mut out = items.to_vec();
    out.reverse();
    Ok(wrap(out, opts).into())
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
    fn map_doubles_elements() {
        let expr = serde_json::json!(["map", {"array": [1, 2, 3]}, ["lambda", ["x"], ["*", ["$", "/x"], 2]]]);
        assert_eq!(
            run(expr).unwrap(),
            Value::wrap_array(vec![Value::Int(2), Value::Int(4), Value::Int(6)], "array")
        );
    }

    #[test]
    fn filter_keeps_truthy() {
        let expr = serde_json::json!(["filter", {"array": [1, 2, 3, 4]}, ["lambda", ["x"], ["==", ["%", ["$", "/x"], 2], 0]]]);
        assert_eq!(run(expr).unwrap(), Value::wrap_array(vec![Value::Int(2), Value::Int(4)], "array"));
    }

    #[test]
    fn reduce_left_fold() {
        let expr = serde_json::json!(["reduce", {"array": [1, 2, 3, 4]}, ["lambda", ["acc", "x"], ["+", ["$", "/acc"], ["$", "/x"]]], 0]);
        assert_eq!(run(expr).unwrap(), Value::Int(10));
    }

    #[test]
    fn find_returns_null_on_no_match() {
        let expr = serde_json::json!(["find", {"array": [1, 2]}, ["lambda", ["x"], ["==", ["$", "/x"], 99]]]);
        assert_eq!(run(expr).unwrap(), Value::Null);
    }

    #[test]
    fn some_and_every() {
        assert_eq!(
            run(serde_json::json!(["some", {"array": [1, 2]}, ["lambda", ["x"], ["==", ["$", "/x"], 2]]])).unwrap(),
            Value::Bool(true)
        );
        assert_eq!(
            run(serde_json::json!(["every", {"array": []}, ["lambda", ["x"], false]])).unwrap(),
            Value::Bool(true)
        );
    }

    #[test]
    fn flat_map_splices_array_results() {
        let expr = serde_json::json!(["flatMap", {"array": [1, 2]}, ["lambda", ["x"], {"array": [["$", "/x"], ["$", "/x"]]}]]);
        assert_eq!(
            run(expr).unwrap(),
            Value::wrap_array(vec![Value::Int(1), Value::Int(1), Value::Int(2), Value::Int(2)], "array")
        );
    }

    #[test]
    fn zip_truncates_to_shorter() {
        let expr = serde_json::json!(["zip", {"array": [1, 2, 3]}, {"array": ["a", "b"]}]);
        assert_eq!(
            run(expr).unwrap(),
            Value::wrap_array(
                vec![
                    Value::Array(vec![Value::Int(1), Value::String("a".into())]),
                    Value::Array(vec![Value::Int(2), Value::String("b".into())]),
                ],
                "array"
            )
        );
    }

    #[test]
    fn enumerate_pairs_index_and_element() {
        let expr = serde_json::json!(["enumerate", {"array": ["x", "y"]}]);
        assert_eq!(
            run(expr).unwrap(),
            Value::wrap_array(
                vec![
                    Value::Array(vec![Value::Int(0), Value::String("x".into())]),
                    Value::Array(vec![Value::Int(1), Value::String("y".into())]),
                ],
                "array"
            )
        );
    }

    #[test]
    fn car_of_empty_is_domain_error() {
        assert!(matches!(run(serde_json::json!(["car", {"array": []}])), Err(Error::DomainError { .. })));
    }

    #[test]
    fn cons_prepends() {
        let expr = serde_json::json!(["cons", 0, {"array": [1, 2]}]);
        assert_eq!(run(expr).unwrap(), Value::wrap_array(vec![Value::Int(0), Value::Int(1), Value::Int(2)], "array"));
    }

    #[test]
    fn chunk_last_group_may_be_short() {
        let expr = serde_json::json!(["chunk", {"array": [1, 2, 3, 4, 5]}, 2]);
        assert_eq!(
            run(expr).unwrap(),
            Value::wrap_array(
                vec![
                    Value::wrap_array(vec![Value::Int(1), Value::Int(2)], "array"),
                    Value::wrap_array(vec![Value::Int(3), Value::Int(4)], "array"),
                    Value::wrap_array(vec![Value::Int(5)], "array"),
                ],
                "array"
            )
        );
    }

    #[test]
    fn chunk_rejects_non_positive_size() {
        assert!(matches!(run(serde_json::json!(["chunk", {"array": [1]}, 0])), Err(Error::DomainError { .. })));
    }

    #[test]
    fn partition_splits_truthy_falsy() {
        let expr = serde_json::json!(["partition", {"array": [1, 2, 3, 4]}, ["lambda", ["x"], ["==", ["%", ["$", "/x"], 2], 0]]]);
        assert_eq!(
            run(expr).unwrap(),
            Value::Array(vec![
                Value::wrap_array(vec![Value::Int(2), Value::Int(4)], "array"),
                Value::wrap_array(vec![Value::Int(1), Value::Int(3)], "array"),
            ])
        );
    }

    #[test]
    fn reverse_new_sequence() {
        let expr = serde_json::json!(["reverse", {"array": [1, 2, 3]}]);
        assert_eq!(run(expr).unwrap(), Value::wrap_array(vec![Value::Int(3), Value::Int(2), Value::Int(1)], "array"));
    }
}
