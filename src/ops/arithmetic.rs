//! `+ - * / %` (§4.5 "Arithmetic").
//!
//! Grounded on `original_source/src/operators/arithmetic.cpp`: variadic
//! `+`/`*` with integer-preservation, binary `-` also usable as unary
//! negation, `/` always float, `%` integer-only. Integer overflow
//! promotes to float rather than panicking or wrapping (Open Question 2,
//! resolved — see DESIGN.md).

use crate::env::Environment;
use crate::error::Error;
use crate::options::Options;
use crate::registry::Outcome;
use crate::value::Value;

use super::{eval_all, require_number};

fn all_numeric(args: &[Value], op: &str) -> Result<(), Error> {
    for a in args {
        if !a.is_number() {
            return Err(Error::type_error(op, "numeric arguments", a.type_name()));
        }
    }
    Ok(())
}

/// Sums integers as integers unless a float operand or an overflow forces
/// promotion to `f64`.
fn sum_preserving_int(values: &[Value]) -> Value {
    let mut int_acc: i64 = 0;
    let mut float_acc: f64 = 0.0;
    let mut is_float = false;
    for v in values {
        match v {
            Value::Int(i) => {
                if is_float {
                    float_acc += *i as f64;
                } else if let Some(sum) = int_acc.checked_add(*i) {
                    int_acc = sum;
                } else {
                    is_float = true;
                    float_acc = int_acc as f64 + *i as f64;
                }
            }
            Value::Float(f) => {
                if !is_float {
                    is_float = true;
                    float_acc = int_acc as f64;
                }
                float_acc += f;
            }
            _ => unreachable!("all_numeric already validated operands"),
        }
    }
    if is_float { Value::Float(float_acc) } else { Value::Int(int_acc) }
}

fn product_preserving_int(values: &[Value]) -> Value {
    let mut int_acc: i64 = 1;
    let mut float_acc: f64 = 1.0;
    let mut is_float = false;
    for v in values {
        match v {
            Value::Int(i) => {
                if is_float {
                    float_acc *= *i as f64;
                } else if let Some(prod) = int_acc.checked_mul(*i) {
                    int_acc = prod;
                } else {
                    is_float = true;
                    float_acc = int_acc as f64 * *i as f64;
                }
            }
            Value::Float(f) => {
                if !is_float {
                    is_float = true;
                    float_acc = int_acc as f64;
                }
                float_acc *= f;
            }
            _ => unreachable!("all_numeric already validated operands"),
        }
    }
    if is_float { Value::Float(float_acc) } else { Value::Int(int_acc) }
}

pub fn add(args: &[Value], env: &Environment, opts: &Options) -> Result<Outcome, Error> {
    if args.is_empty() {
        return Err(env.error_with_path(Error::arity("+", "at least 1 argument", 0)));
    }
    let values = eval_all(args, env, opts).map_err(|e| env.error_with_path(e))?;
    all_numeric(&values, "+").map_err(|e| env.error_with_path(e))?;
    Ok(sum_preserving_int(&values).into())
}

pub fn mul(args: &[Value], env: &Environment, opts: &Options) -> Result<Outcome, Error> {
    if args.is_empty() {
        return Err(env.error_with_path(Error::arity("*", "at least 1 argument", 0)));
    }
    let values = eval_all(args, env, opts).map_err(|e| env.error_with_path(e))?;
    all_numeric(&values, "*").map_err(|e| env.error_with_path(e))?;
    Ok(product_preserving_int(&values).into())
}

/// Binary subtraction, or unary negation when given exactly one operand.
pub fn sub(args: &[Value], env: &Environment, opts: &Options) -> Result<Outcome, Error> {
    let values = eval_all(args, env, opts).map_err(|e| env.error_with_path(e))?;
    match values.as_slice() {
        [a] => {
            let n = require_number(a, "-").map_err(|e| env.error_with_path(e))?;
            Ok(match a {
                Value::Int(i) => Value::Int(-i),
                _ => Value::Float(-n),
            }
            .into())
        }
        [a, b] => {
            all_numeric(&values, "-").map_err(|e| env.error_with_path(e))?;
            Ok(match (a, b) {
                (Value::Int(x), Value::Int(y)) => match x.checked_sub(*y) {
                    Some(d) => Value::Int(d),
                    None => Value::Float(*x as f64 - *y as f64),
                },
                _ => Value::Float(a.as_f64().unwrap() - b.as_f64().unwrap()),
            }
            .into())
        }
        _ => Err(env.error_with_path(Error::arity("-", "1 or 2 arguments", values.len()))),
    }
}

pub fn div(args: &[Value], env: &Environment, opts: &Options) -> Result<Outcome, Error> {
    if args.len() != 2 {
        return Err(env.error_with_path(Error::arity("/", "2 arguments", args.len())));
    }
    let values = eval_all(args, env, opts).map_err(|e| env.error_with_path(e))?;
    all_numeric(&values, "/").map_err(|e| env.error_with_path(e))?;
    let a = values[0].as_f64().unwrap();
    let b = values[1].as_f64().unwrap();
    if b == 0.0 {
        return Err(env.error_with_path(Error::domain_error("division by zero")));
    }
    Ok(Value::Float(a / b).into())
}

pub fn rem(args: &[Value], env: &Environment, opts: &Options) -> Result<Outcome, Error> {
    if args.len() != 2 {
        return Err(env.error_with_path(Error::arity("%", "2 arguments", args.len())));
    }
    let values = eval_all(args, env, opts).map_err(|e| env.error_with_path(e))?;
    let (Value::Int(a), Value::Int(b)) = (&values[0], &values[1]) else {
        return Err(env.error_with_path(Error::type_error("%", "integer operands", "non-integer operand")));
    };
    if *b == 0 {
        return Err(env.error_with_path(Error::domain_error("modulo by zero")));
    }
    Ok(Value::Int(a % b).into())
}
