//! `unique`/`uniqueSorted` (§4.5 "Unique"). Grounded on
//! `original_source/src/operators/string_utility_ops.cpp`'s two distinct
//! dedup strategies: a general first-occurrence pass for arbitrary input,
//! and an adjacency sweep for pre-sorted input that never needs to build
//! a hash set.
//!
//! Shape: `(arr)`, `(arr, mode)`, or `(arr, mode, selector-pointer)`. Mode
//! and selector are literal data, consistent with `sort`'s field-specs
//! (§ops::sort) — they are not themselves sub-expressions to evaluate.

use crate::env::Environment;
use crate::error::Error;
use crate::eval::evaluate;
use crate::options::Options;
use crate::registry::Outcome;
use crate::value::Value;

use super::require_array;
use crate::ops::variable::traverse_pointer;

#[derive(Clone, Copy, PartialEq)]
enum Mode {
    Firsts,
    Lasts,
    Singles,
    Multiples,
}

fn parse_mode(node: Option<&Value>, op: &str, env: &Environment) -> Result<Mode, Error> {
    match node {
        None => Ok(Mode::Firsts),
        Some(Value::String(s)) => match s.as_str() {
            "firsts" => Ok(Mode::Firsts),
            "lasts" => Ok(Mode::Lasts),
            "singles" => Ok(Mode::Singles),
            "multiples" => Ok(Mode::Multiples),
            other => Err(env.error_with_path(Error::invalid_script(format!(
                "'{op}' mode must be one of firsts/lasts/singles/multiples, got \"{other}\""
            )))),
        },
        Some(other) => Err(env.error_with_path(Error::type_error(op, "a mode string", other.type_name()))),
    }
}

fn parse_selector(node: Option<&Value>, op: &str, env: &Environment) -> Result<Option<String>, Error> {
    match node {
        None => Ok(None),
        Some(Value::String(s)) => Ok(Some(s.clone())),
        Some(other) => Err(env.error_with_path(Error::type_error(op, "a JSON pointer selector string", other.type_name()))),
    }
}

fn key_of(item: &Value, selector: Option<&str>) -> Value {
    match selector {
        Some(pointer) => traverse_pointer(item, pointer).unwrap_or(Value::Null),
        None => item.clone(),
    }
}

pub fn unique(args: &[Value], env: &Environment, opts: &Options) -> Result<Outcome, Error> {
    if args.is_empty() || args.len() > 3 {
        return Err(env.error_with_path(Error::arity("unique", "1 to 3 arguments (array, mode?, selector?)", args.len())));
    }
    let arr = evaluate(&args[0], env, opts).map_err(|e| env.error_with_path(e))?;
    let items = require_array(&arr, "unique", &opts.array_key).map_err(|e| env.error_with_path(e))?.to_vec();
    let mode = parse_mode(args.get(1), "unique", env)?;
    let selector = parse_selector(args.get(2), "unique", env)?;

    // Grouping uses `Value::equals` (§3's numeric/object equality), not a
    // serialized-string key, so `5`/`5.0` and differently-ordered objects
    // land in the same group the way `uniqueSorted`'s sweep already does.
    let mut groups: Vec<(Value, Vec<Value>)> = Vec::new();
    for item in &items {
        let k = key_of(item, selector.as_deref());
        match groups.iter_mut().find(|(gk, _)| gk.equals(&k)) {
            Some((_, members)) => members.push(item.clone()),
            None => groups.push((k, vec![item.clone()])),
        }
    }

    let mut out = Vec::new();
    for (_, group) in &groups {
        match mode {
            Mode::Firsts => out.push(group[0].clone()),
            Mode::Lasts => out.push(group[group.len() - 1].clone()),
            Mode::Singles => {
                if group.len() == 1 {
                    out.push(group[0].clone());
                }
            }
            Mode::Multiples => {
                if group.len() > 1 {
                    out.push(group[0].clone());
                }
            }
        }
    }
    Ok(Value::wrap_array(out, &opts.array_key).into())
}

/// Single left-to-right sweep over pre-sorted input: for each index `i`,
/// `left = key(i)==key(i-1)`, `right = key(i)==key(i+1)` (§4.5 "The
/// sweep"). No hash set is built — adjacency alone decides each mode.
pub fn unique_sorted(args: &[Value], env: &Environment, opts: &Options) -> Result<Outcome, Error> {
    if args.is_empty() || args.len() > 3 {
        return Err(env.error_with_path(Error::arity(
            "uniqueSorted",
            "1 to 3 arguments (array, mode?, selector?)",
            args.len(),
        )));
    }
    let arr = evaluate(&args[0], env, opts).map_err(|e| env.error_with_path(e))?;
    let items = require_array(&arr, "uniqueSorted", &opts.array_key).map_err(|e| env.error_with_path(e))?.to_vec();
    let mode = parse_mode(args.get(1), "uniqueSorted", env)?;
    let selector = parse_selector(args.get(2), "uniqueSorted", env)?;

    let keys: Vec<Value> = items.iter().map(|i| key_of(i, selector.as_deref())).collect();
    let n = items.len();
    let mut out = Vec::new();
    for i in 0..n {
        let left = i > 0 && keys[i].equals(&keys[i - 1]);
        let right = i < n - 1 && keys[i].equals(&keys[i + 1]);
        let keep = match mode {
            Mode::Firsts => !left,
            Mode::Lasts => !right,
            Mode::Singles => !left && !right,
            Mode::Multiples => left || right,
        };
        if keep {
            out.push(items[i].clone());
        }
    }
    Ok(Value::wrap_array(out, &opts.array_key).into())
}
