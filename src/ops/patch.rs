//! `diff`/`patch` — RFC 6902 JSON Patch generation and application (§4.5
//! "JSON Patch"). Grounded on `original_source/src/computo.cpp`'s inline
//! `operators["diff"]`/`operators["patch"]` lambdas (around line 700),
//! which delegate to `nlohmann::json::diff()`/`.patch()`: structural
//! recursive diff producing add/remove/replace, and a patch applier that
//! walks each operation in order, failing the whole apply on the first
//! bad path or `test` mismatch (no partial-apply recovery).

use serde_json::Map;

use crate::env::Environment;
use crate::error::Error;
use crate::eval::evaluate;
use crate::options::Options;
use crate::registry::Outcome;
use crate::value::Value;

use super::{eval_all, require_array};

fn escape_token(token: &str) -> String {
    token.replace('~', "~0").replace('/', "~1")
}

fn unescape_token(token: &str) -> String {
    token.replace("~1", "/").replace("~0", "~")
}

fn split_pointer(pointer: &str) -> Result<Vec<String>, Error> {
    if pointer.is_empty() {
        return Ok(Vec::new());
    }
    if !pointer.starts_with('/') {
        return Err(Error::invalid_script("JSON pointer must start with '/'"));
    }
    Ok(pointer[1..].split('/').map(unescape_token).collect())
}

fn patch_op(op: &str, path: &str, value: Option<Value>) -> Value {
    let mut m = Map::new();
    m.insert("op".to_string(), Value::String(op.to_string()));
    m.insert("path".to_string(), Value::String(path.to_string()));
    if let Some(v) = value {
        m.insert("value".to_string(), v);
    }
    Value::Object(m)
}

fn diff_values(path: &str, a: &Value, b: &Value, ops: &mut Vec<Value>) {
    if a.equals(b) {
        return;
    }
    match (a, b) {
        (Value::Object(oa), Value::Object(ob)) => {
            for k in oa.keys() {
                if !ob.contains_key(k) {
                    ops.push(patch_op("remove", &format!("{path}/{}", escape_token(k)), None));
                }
            }
            for (k, bv) in ob {
                let child_path = format!("{path}/{}", escape_token(k));
                match oa.get(k) {
                    Some(av) => diff_values(&child_path, av, bv, ops),
                    None => ops.push(patch_op("add", &child_path, Some(bv.clone()))),
                }
            }
        }
        (Value::Array(aa), Value::Array(ab)) => {
            let min = aa.len().min(ab.len());
            for i in 0..min {
                diff_values(&format!("{path}/{i}"), &aa[i], &ab[i], ops);
            }
            if ab.len() > aa.len() {
                for (i, item) in ab.iter().enumerate().skip(aa.len()) {
                    ops.push(patch_op("add", &format!("{path}/{i}"), Some(item.clone())));
                }
            } else if aa.len() > ab.len() {
                for i in (ab.len()..aa.len()).rev() {
                    ops.push(patch_op("remove", &format!("{path}/{i}"), None));
                }
            }
        }
        _ => ops.push(patch_op("replace", path, Some(b.clone()))),
    }
}

pub fn diff(args: &[Value], env: &Environment, opts: &Options) -> Result<Outcome, Error> {
    if args.len() != 2 {
        return Err(env.error_with_path(Error::arity("diff", "2 arguments (a, b)", args.len())));
    }
    let values = eval_all(args, env, opts).map_err(|e| env.error_with_path(e))?;
    let mut ops = Vec::new();
    diff_values("", &values[0], &values[1], &mut ops);
    Ok(Value::wrap_array(ops, &opts.array_key).into())
}

fn get_at<'a>(value: &'a Value, segments: &[String], index: usize) -> Result<&'a Value, Error> {
    if index == segments.len() {
        return Ok(value);
    }
    let token = &segments[index];
    match value {
        Value::Object(map) => {
            let child = map.get(token).ok_or_else(|| Error::path_error(token.clone(), format!("no key '{token}'")))?;
            get_at(child, segments, index + 1)
        }
        Value::Array(arr) => {
            let idx: usize = token.parse().map_err(|_| Error::path_error(token.clone(), format!("'{token}' is not an array index")))?;
            let child = arr.get(idx).ok_or_else(|| Error::path_error(token.clone(), format!("index {idx} out of bounds")))?;
            get_at(child, segments, index + 1)
        }
        _ => Err(Error::path_error(token.clone(), "cannot traverse into a scalar value")),
    }
}

fn add_at(value: &mut Value, segments: &[String], index: usize, new_value: Value) -> Result<(), Error> {
    if index == segments.len() {
        *value = new_value;
        return Ok(());
    }
    let token = &segments[index];
    let last = index + 1 == segments.len();
    match value {
        Value::Object(map) => {
            if last {
                map.insert(token.clone(), new_value);
                Ok(())
            } else {
                let child = map.get_mut(token).ok_or_else(|| Error::path_error(token.clone(), format!("no key '{token}'")))?;
                add_at(child, segments, index + 1, new_value)
            }
        }
        Value::Array(arr) => {
            if last {
                if token == "-" {
                    arr.push(new_value);
                    return Ok(());
                }
                let idx: usize = token.parse().map_err(|_| Error::path_error(token.clone(), format!("'{token}' is not an array index")))?;
                if idx > arr.len() {
                    return Err(Error::path_error(token.clone(), format!("index {idx} out of bounds")));
                }
                arr.insert(idx, new_value);
                Ok(())
            } else {
                let idx: usize = token.parse().map_err(|_| Error::path_error(token.clone(), format!("'{token}' is not an array index")))?;
                let child = arr.get_mut(idx).ok_or_else(|| Error::path_error(token.clone(), format!("index {idx} out of bounds")))?;
                add_at(child, segments, index + 1, new_value)
            }
        }
        _ => Err(Error::path_error(token.clone(), "cannot traverse into a scalar value")),
    }
}

fn remove_at(value: &mut Value, segments: &[String], index: usize) -> Result<Value, Error> {
    if segments.is_empty() {
        return Err(Error::path_error("", "cannot 'remove' the document root"));
    }
    let token = &segments[index];
    let last = index + 1 == segments.len();
    match value {
        Value::Object(map) => {
            if last {
                map.remove(token).ok_or_else(|| Error::path_error(token.clone(), format!("no key '{token}'")))
            } else {
                let child = map.get_mut(token).ok_or_else(|| Error::path_error(token.clone(), format!("no key '{token}'")))?;
                remove_at(child, segments, index + 1)
            }
        }
        Value::Array(arr) => {
            let idx: usize = token.parse().map_err(|_| Error::path_error(token.clone(), format!("'{token}' is not an array index")))?;
            if last {
                if idx >= arr.len() {
                    return Err(Error::path_error(token.clone(), format!("index {idx} out of bounds")));
                }
                Ok(arr.remove(idx))
            } else {
                let child = arr.get_mut(idx).ok_or_else(|| Error::path_error(token.clone(), format!("index {idx} out of bounds")))?;
                remove_at(child, segments, index + 1)
            }
        }
        _ => Err(Error::path_error(token.clone(), "cannot traverse into a scalar value")),
    }
}

/// Unlike `add_at`, a `replace` at an array index overwrites the existing
/// element in place rather than inserting and shifting the rest (RFC 6902
/// §4.3 vs. §4.1).
fn replace_at(value: &mut Value, segments: &[String], index: usize, new_value: Value) -> Result<(), Error> {
    if segments.is_empty() {
        *value = new_value;
        return Ok(());
    }
    let token = &segments[index];
    let last = index + 1 == segments.len();
    match value {
        Value::Object(map) => {
            if last {
                if !map.contains_key(token) {
                    return Err(Error::path_error(token.clone(), format!("no key '{token}'")));
                }
                map.insert(token.clone(), new_value);
                Ok(())
            } else {
                let child = map.get_mut(token).ok_or_else(|| Error::path_error(token.clone(), format!("no key '{token}'")))?;
                replace_at(child, segments, index + 1, new_value)
            }
        }
        Value::Array(arr) => {
            let idx: usize = token.parse().map_err(|_| Error::path_error(token.clone(), format!("'{token}' is not an array index")))?;
            if last {
                let slot = arr.get_mut(idx).ok_or_else(|| Error::path_error(token.clone(), format!("index {idx} out of bounds")))?;
                *slot = new_value;
                Ok(())
            } else {
                let child = arr.get_mut(idx).ok_or_else(|| Error::path_error(token.clone(), format!("index {idx} out of bounds")))?;
                replace_at(child, segments, index + 1, new_value)
            }
        }
        _ => Err(Error::path_error(token.clone(), "cannot traverse into a scalar value")),
    }
}

fn op_field<'a>(op: &'a Value, field: &str, patch_index: usize) -> Result<&'a str, Error> {
    op.as_object()
        .and_then(|m| m.get(field))
        .and_then(Value::as_str)
        .ok_or_else(|| Error::patch_error(patch_index, format!("operation missing string field '{field}'")))
}

pub fn patch(args: &[Value], env: &Environment, opts: &Options) -> Result<Outcome, Error> {
    if args.len() != 2 {
        return Err(env.error_with_path(Error::arity("patch", "2 arguments (doc, patch-array)", args.len())));
    }
    let doc_val = evaluate(&args[0], env, opts).map_err(|e| env.error_with_path(e))?;
    let patch_val = evaluate(&args[1], env, opts).map_err(|e| env.error_with_path(e))?;
    let ops = require_array(&patch_val, "patch", &opts.array_key).map_err(|e| env.error_with_path(e))?;

    let mut doc = doc_val;
    for (i, op) in ops.iter().enumerate() {
        let kind = op_field(op, "op", i).map_err(|e| env.error_with_path(e))?;
        let path = op_field(op, "path", i).map_err(|e| env.error_with_path(e))?;
        let segments = split_pointer(path).map_err(|_| env.error_with_path(Error::patch_error(i, "malformed path")))?;
        let value = op.as_object().and_then(|m| m.get("value")).cloned();
        let from = op.as_object().and_then(|m| m.get("from")).and_then(Value::as_str).map(str::to_string);

        let result = match kind {
            "add" => {
                let v = value.ok_or_else(|| Error::patch_error(i, "'add' requires a 'value' field"))?;
                add_at(&mut doc, &segments, 0, v)
            }
            "remove" => remove_at(&mut doc, &segments, 0).map(|_| ()),
            "replace" => {
                let v = value.ok_or_else(|| Error::patch_error(i, "'replace' requires a 'value' field"))?;
                replace_at(&mut doc, &segments, 0, v)
            }
            "move" => {
                let from = from.ok_or_else(|| Error::patch_error(i, "'move' requires a 'from' field"))?;
                let from_segments = split_pointer(&from).map_err(|_| Error::patch_error(i, "malformed 'from'"))?;
                remove_at(&mut doc, &from_segments, 0).and_then(|v| add_at(&mut doc, &segments, 0, v))
            }
            "copy" => {
                let from = from.ok_or_else(|| Error::patch_error(i, "'copy' requires a 'from' field"))?;
                let from_segments = split_pointer(&from).map_err(|_| Error::patch_error(i, "malformed 'from'"))?;
                get_at(&doc, &from_segments, 0).cloned().and_then(|v| add_at(&mut doc, &segments, 0, v))
            }
            "test" => {
                let expected = value.ok_or_else(|| Error::patch_error(i, "'test' requires a 'value' field"))?;
                match get_at(&doc, &segments, 0) {
                    Ok(actual) if actual.equals(&expected) => Ok(()),
                    Ok(_) => Err(Error::patch_error(i, "test value mismatch")),
                    Err(_) => Err(Error::patch_error(i, "test path not found")),
                }
            }
            other => Err(Error::patch_error(i, format!("unsupported patch operation '{other}'"))),
        };
        result.map_err(|e| {
            let e = if matches!(e, Error::PatchError { .. }) { e } else { Error::patch_error(i, e.to_string()) };
            env.error_with_path(e)
        })?;
    }
    Ok(doc.into())
}
