//! `sort` (§4.5 "Sort"). Grounded on
//! `original_source/src/operators/sort_utils.cpp`'s `sort_operator`,
//! which performs exactly this decorate-sort-undecorate: extract each
//! element's comparison key tuple once, sort on the prepared keys, then
//! restore the original elements (§9 "Sort DSU").
//!
//! Field-spec arguments (`"/path"` or `["/path", "asc"|"desc"]`) are
//! literal data, not sub-expressions — they are read directly off the
//! unevaluated AST rather than passed through `evaluate`, because a pair
//! like `["/s", "desc"]` would otherwise be misread as a call to an
//! operator named `/s` (§4.1 call-form dispatch).

use std::cmp::Ordering;

use crate::env::Environment;
use crate::error::Error;
use crate::eval::evaluate;
use crate::options::Options;
use crate::registry::Outcome;
use crate::value::Value;

use super::require_array;
use crate::ops::variable::traverse_pointer;

#[derive(Clone, Copy, PartialEq)]
enum Direction {
    Asc,
    Desc,
}

struct FieldSpec {
    pointer: String,
    direction: Direction,
}

fn parse_field_spec(node: &Value, env: &Environment) -> Result<FieldSpec, Error> {
    match node {
        Value::String(s) => Ok(FieldSpec { pointer: s.clone(), direction: Direction::Asc }),
        Value::Array(pair) if pair.len() == 2 => {
            let Value::String(pointer) = &pair[0] else {
                return Err(env.error_with_path(Error::invalid_script(
                    "sort field-spec pointer must be a string",
                )));
            };
            let Value::String(dir) = &pair[1] else {
                return Err(env.error_with_path(Error::invalid_script(
                    "sort field-spec direction must be \"asc\" or \"desc\"",
                )));
            };
            let direction = match dir.as_str() {
                "asc" => Direction::Asc,
                "desc" => Direction::Desc,
                other => {
                    return Err(env.error_with_path(Error::invalid_script(format!(
                        "sort field-spec direction must be \"asc\" or \"desc\", got \"{other}\""
                    ))));
                }
            };
            Ok(FieldSpec { pointer: pointer.clone(), direction })
        }
        _ => Err(env.error_with_path(Error::invalid_script(
            "sort field-spec must be a JSON pointer string or [pointer, direction] pair",
        ))),
    }
}

pub fn sort(args: &[Value], env: &Environment, opts: &Options) -> Result<Outcome, Error> {
    if args.is_empty() {
        return Err(env.error_with_path(Error::arity("sort", "at least 1 argument", 0)));
    }
    let arr = evaluate(&args[0], env, opts).map_err(|e| env.error_with_path(e))?;
    let items = require_array(&arr, "sort", &opts.array_key).map_err(|e| env.error_with_path(e))?.to_vec();

    // Shape 2: (arr, "asc" | "desc")
    if args.len() == 2 {
        if let Value::String(dir) = &args[1] {
            let mut decorated: Vec<(usize, Value)> = items.into_iter().enumerate().collect();
            match dir.as_str() {
                "asc" => decorated.sort_by(|a, b| a.1.type_aware_cmp(&b.1)),
                "desc" => decorated.sort_by(|a, b| b.1.type_aware_cmp(&a.1)),
                other => {
                    return Err(env.error_with_path(Error::invalid_script(format!(
                        "sort direction must be \"asc\" or \"desc\", got \"{other}\""
                    ))));
                }
            }
            let out: Vec<Value> = decorated.into_iter().map(|(_, v)| v).collect();
            return Ok(Value::wrap_array(out, &opts.array_key).into());
        }
    }

    // Shape 1: (arr) — ascending, type-aware.
    if args.len() == 1 {
        let mut out = items;
        out.sort_by(|a, b| a.type_aware_cmp(b));
        return Ok(Value::wrap_array(out, &opts.array_key).into());
    }

    // Shape 3: (arr, field-spec, ...) — decorate-sort-undecorate, O(n) key
    // extraction, lexicographic compare over the prepared key tuples.
    let specs: Vec<FieldSpec> = args[1..].iter().map(|n| parse_field_spec(n, env)).collect::<Result<_, _>>()?;
    let mut decorated: Vec<(Vec<Value>, Value)> = Vec::with_capacity(items.len());
    for item in items {
        let mut keys = Vec::with_capacity(specs.len());
        for spec in &specs {
            let key = traverse_pointer(&item, &spec.pointer).unwrap_or(Value::Null);
            keys.push(key);
        }
        decorated.push((keys, item));
    }
    decorated.sort_by(|a, b| {
        for (i, spec) in specs.iter().enumerate() {
            let ord = a.0[i].type_aware_cmp(&b.0[i]);
            let ord = if spec.direction == Direction::Desc { ord.reverse() } else { ord };
            if ord != Ordering::Equal {
                return ord;
            }
        }
        Ordering::Equal
    });
    let out: Vec<Value> = decorated.into_iter().map(|(_, v)| v).collect();
    Ok(Value::wrap_array(out, &opts.array_key).into())
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
    fn sort_ascending_type_aware() {
        let expr = serde_json::json!(["sort", {"array": [3, 1, 2]}]);
        assert_eq!(run(expr).unwrap(), Value::wrap_array(vec![Value::Int(1), Value::Int(2), Value::Int(3)], "array"));
    }

    #[test]
    fn sort_descending_direction() {
        let expr = serde_json::json!(["sort", {"array": [1, 3, 2]}, "desc"]);
        assert_eq!(run(expr).unwrap(), Value::wrap_array(vec![Value::Int(3), Value::Int(2), Value::Int(1)], "array"));
    }

    #[test]
    fn sort_by_multiple_fields() {
        let expr = serde_json::json!([
            "sort",
            {"array": [
                {"d": "e", "s": 90000},
                {"d": "m", "s": 75000},
                {"d": "e", "s": 85000},
                {"d": "m", "s": 80000},
            ]},
            "/d",
            ["/s", "desc"],
        ]);
        let result = run(expr).unwrap();
        let expected = Value::wrap_array(
            vec![
                Value::from_json(serde_json::json!({"d": "e", "s": 90000})),
                Value::from_json(serde_json::json!({"d": "e", "s": 85000})),
                Value::from_json(serde_json::json!({"d": "m", "s": 80000})),
                Value::from_json(serde_json::json!({"d": "m", "s": 75000})),
            ],
            "array",
        );
        assert_eq!(result, expected);
    }

    #[test]
    fn sort_is_stable_on_equal_keys() {
        let expr = serde_json::json!([
            "sort",
            {"array": [
                {"k": 1, "tag": "a"},
                {"k": 1, "tag": "b"},
                {"k": 0, "tag": "c"},
            ]},
            "/k",
        ]);
        let result = run(expr).unwrap();
        let Value::Object(obj) = &result else { panic!() };
        let items = obj.get("array").unwrap().as_array().unwrap();
        let tags: Vec<&str> = items.iter().map(|v| v.as_object().unwrap().get("tag").unwrap().as_str().unwrap()).collect();
        assert_eq!(tags, vec!["c", "a", "b"]);
    }

    #[test]
    fn sort_missing_field_compares_as_null() {
        let expr = serde_json::json!([
            "sort",
            {"array": [{"a": 1}, {}]},
            "/a",
        ]);
        let result = run(expr).unwrap();
        let Value::Object(obj) = &result else { panic!() };
        let items = obj.get("array").unwrap().as_array().unwrap();
        assert_eq!(items[0], Value::from_json(serde_json::json!({})));
    }
}
