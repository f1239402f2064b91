//! Object construction/access: `obj`, `get`, `keys`, `values`,
//! `objFromPairs`, `pick`, `omit`, `merge` (§4.5).
//!
//! Grounded on `original_source/src/operators/object_ops.cpp` (keys,
//! values, objFromPairs, pick, omit, merge) and `operators/data.cpp`
//! (the alternate `obj_construct` pair-shape). The "flat" shape (odd
//! positions are literal string keys, not evaluated) has no direct
//! original-source counterpart in the retrieval pack and follows
//! spec.md's prose directly.

use serde_json::Map;

use crate::env::Environment;
use crate::error::Error;
use crate::eval::evaluate;
use crate::options::Options;
use crate::registry::Outcome;
use crate::value::Value;

use super::{eval_all, require_array, require_object, require_string};
use crate::ops::variable::traverse_pointer;

/// `obj` has two shapes (§4.5): if every argument is itself a two-element
/// array, it's the "pair" shape (`[[key-expr, value-expr], ...]`, both
/// sides evaluated). Otherwise it's the "flat" shape: an even count of
/// arguments alternating literal string key, value-expr.
pub fn obj(args: &[Value], env: &Environment, opts: &Options) -> Result<Outcome, Error> {
    if args.is_empty() {
        return Err(env.error_with_path(Error::arity("obj", "at least 1 argument", 0)));
    }
    let is_pair_shape = args.iter().all(|a| matches!(a, Value::Array(kv) if kv.len() == 2));
    let mut result = Map::new();
    if is_pair_shape {
        for pair in args {
            let Value::Array(kv) = pair else { unreachable!() };
            let key = evaluate(&kv[0], env, opts).map_err(|e| env.error_with_path(e))?;
            let key = require_string(&key, "obj").map_err(|e| env.error_with_path(e))?.to_string();
            let value = evaluate(&kv[1], env, opts).map_err(|e| env.error_with_path(e))?;
            result.insert(key, value);
        }
    } else {
        if args.len() % 2 != 0 {
            return Err(env.error_with_path(Error::invalid_script(
                "'obj' flat form requires an even number of arguments (key, value, ...)",
            )));
        }
        for pair in args.chunks(2) {
            let key = require_string(&pair[0], "obj").map_err(|e| env.error_with_path(e))?.to_string();
            let value = evaluate(&pair[1], env, opts).map_err(|e| env.error_with_path(e))?;
            result.insert(key, value);
        }
    }
    Ok(Value::Object(result).into())
}

pub fn get(args: &[Value], env: &Environment, opts: &Options) -> Result<Outcome, Error> {
    if args.len() != 2 {
        return Err(env.error_with_path(Error::arity("get", "2 arguments (value, pointer)", args.len())));
    }
    let value = evaluate(&args[0], env, opts).map_err(|e| env.error_with_path(e))?;
    let pointer_val = evaluate(&args[1], env, opts).map_err(|e| env.error_with_path(e))?;
    let pointer = require_string(&pointer_val, "get").map_err(|e| env.error_with_path(e))?;
    let result = traverse_pointer(&value, pointer).map_err(|e| env.error_with_path(e))?;
    Ok(result.into())
}

pub fn keys(args: &[Value], env: &Environment, opts: &Options) -> Result<Outcome, Error> {
    if args.len() != 1 {
        return Err(env.error_with_path(Error::arity("keys", "1 argument", args.len())));
    }
    let value = evaluate(&args[0], env, opts).map_err(|e| env.error_with_path(e))?;
    let obj = require_object(&value, "keys").map_err(|e| env.error_with_path(e))?;
    let keys: Vec<Value> = obj.keys().map(|k| Value::String(k.clone())).collect();
    Ok(Value::wrap_array(keys, &opts.array_key).into())
}

pub fn values(args: &[Value], env: &Environment, opts: &Options) -> Result<Outcome, Error> {
    if args.len() != 1 {
        return Err(env.error_with_path(Error::arity("values", "1 argument", args.len())));
    }
    let value = evaluate(&args[0], env, opts).map_err(|e| env.error_with_path(e))?;
    let obj = require_object(&value, "values").map_err(|e| env.error_with_path(e))?;
    let values: Vec<Value> = obj.values().cloned().collect();
    Ok(Value::wrap_array(values, &opts.array_key).into())
}

pub fn obj_from_pairs(args: &[Value], env: &Environment, opts: &Options) -> Result<Outcome, Error> {
    if args.len() != 1 {
        return Err(env.error_with_path(Error::arity("objFromPairs", "1 argument", args.len())));
    }
    let value = evaluate(&args[0], env, opts).map_err(|e| env.error_with_path(e))?;
    let pairs = require_array(&value, "objFromPairs", &opts.array_key).map_err(|e| env.error_with_path(e))?;
    let mut result = Map::new();
    for pair in pairs {
        let Value::Array(kv) = pair else {
            return Err(env.error_with_path(Error::type_error(
                "objFromPairs",
                "an array of [key, value] pairs",
                pair.type_name(),
            )));
        };
        if kv.len() != 2 {
            return Err(env.error_with_path(Error::invalid_script(
                "'objFromPairs' requires each element to be a [key, value] pair",
            )));
        }
        let key = require_string(&kv[0], "objFromPairs").map_err(|e| env.error_with_path(e))?;
        result.insert(key.to_string(), kv[1].clone());
    }
    Ok(Value::Object(result).into())
}

pub fn pick(args: &[Value], env: &Environment, opts: &Options) -> Result<Outcome, Error> {
    if args.len() != 2 {
        return Err(env.error_with_path(Error::arity("pick", "2 arguments (object, keys)", args.len())));
    }
    let values = eval_all(args, env, opts).map_err(|e| env.error_with_path(e))?;
    let obj = require_object(&values[0], "pick").map_err(|e| env.error_with_path(e))?;
    let keys = require_array(&values[1], "pick", &opts.array_key).map_err(|e| env.error_with_path(e))?;
    let mut result = Map::new();
    for key in keys {
        let key = require_string(key, "pick").map_err(|e| env.error_with_path(e))?;
        if let Some(v) = obj.get(key) {
            result.insert(key.to_string(), v.clone());
        }
    }
    Ok(Value::Object(result).into())
}

pub fn omit(args: &[Value], env: &Environment, opts: &Options) -> Result<Outcome, Error> {
    if args.len() != 2 {
        return Err(env.error_with_path(Error::arity("omit", "2 arguments (object, keys)", args.len())));
    }
    let values = eval_all(args, env, opts).map_err(|e| env.error_with_path(e))?;
    let obj = require_object(&values[0], "omit").map_err(|e| env.error_with_path(e))?;
    let keys = require_array(&values[1], "omit", &opts.array_key).map_err(|e| env.error_with_path(e))?;
    let mut omit_keys = std::collections::HashSet::new();
    for key in keys {
        omit_keys.insert(require_string(key, "omit").map_err(|e| env.error_with_path(e))?.to_string());
    }
    let mut result = Map::new();
    for (k, v) in obj {
        if !omit_keys.contains(k) {
            result.insert(k.clone(), v.clone());
        }
    }
    Ok(Value::Object(result).into())
}

pub fn merge(args: &[Value], env: &Environment, opts: &Options) -> Result<Outcome, Error> {
    if args.is_empty() {
        return Err(env.error_with_path(Error::arity("merge", "at least 1 argument", 0)));
    }
    let values = eval_all(args, env, opts).map_err(|e| env.error_with_path(e))?;
    let mut result = Map::new();
    for v in &values {
        let obj = require_object(v, "merge").map_err(|e| env.error_with_path(e))?;
        for (k, val) in obj {
            result.insert(k.clone(), val.clone());
        }
    }
    Ok(Value::Object(result).into())
}
