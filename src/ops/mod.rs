//! Built-in operator implementations (§4.5), grouped by area.

pub mod arithmetic;
pub mod array;
pub mod comparison;
pub mod lambda_call;
pub mod logical;
pub mod object;
pub mod patch;
pub mod sort;
pub mod string;
pub mod unique;
pub mod variable;

use crate::env::Environment;
use crate::error::Error;
use crate::eval::evaluate;
use crate::options::Options;
use crate::value::Value;

/// Evaluates every argument left-to-right, the default contract for
/// operators that are strict in their operands (§4.5 preamble).
pub(crate) fn eval_all(args: &[Value], env: &Environment, opts: &Options) -> Result<Vec<Value>, Error> {
    args.iter().map(|a| evaluate(a, env, opts)).collect()
}

/// Unwraps bare-array or `{array_key: [...]}` input, the dual-accepting
/// contract shared by every array HOF and array-consuming operator.
/// Grounded on `operators/shared.cpp`'s `extract_array_data`.
pub(crate) fn require_array<'a>(value: &'a Value, op: &str, array_key: &str) -> Result<&'a [Value], Error> {
    value
        .as_array_data(array_key)
        .ok_or_else(|| Error::type_error(op, "an array", value.type_name()))
}

pub(crate) fn require_object<'a>(value: &'a Value, op: &str) -> Result<&'a serde_json::Map<String, Value>, Error> {
    value
        .as_object()
        .ok_or_else(|| Error::type_error(op, "an object", value.type_name()))
}

pub(crate) fn require_string<'a>(value: &'a Value, op: &str) -> Result<&'a str, Error> {
    value
        .as_str()
        .ok_or_else(|| Error::type_error(op, "a string", value.type_name()))
}

pub(crate) fn require_number(value: &Value, op: &str) -> Result<f64, Error> {
    value
        .as_f64()
        .ok_or_else(|| Error::type_error(op, "a number", value.type_name()))
}
