//! `< <= > >= == !=`, chained pairwise over 2+ operands (§4.5
//! "Comparison"). `==`/`!=` accept any JSON value; ordering comparisons
//! require numeric operands. There is no dedicated original-source file
//! for the chained form still present in the retrieval pack, so this
//! follows spec.md's own prose contract directly: `[op, a, b, c]` ≡
//! `(a op b) ∧ (b op c)`.

use crate::env::Environment;
use crate::error::Error;
use crate::options::Options;
use crate::registry::Outcome;
use crate::value::Value;

use super::eval_all;

fn numeric_cmp(op: &str, a: &Value, b: &Value) -> Result<bool, Error> {
    let (Some(x), Some(y)) = (a.as_f64(), b.as_f64()) else {
        return Err(Error::type_error(op, "numeric operands", "non-numeric operand"));
    };
    Ok(match op {
        "<" => x < y,
        "<=" => x <= y,
        ">" => x > y,
        ">=" => x >= y,
        _ => unreachable!(),
    })
}

pub fn chained(op: &str, args: &[Value], env: &Environment, opts: &Options) -> Result<Outcome, Error> {
    if args.len() < 2 {
        return Err(env.error_with_path(Error::arity(op, "at least 2 arguments", args.len())));
    }
    let values = eval_all(args, env, opts).map_err(|e| env.error_with_path(e))?;
    let result = values
        .windows(2)
        .map(|pair| match op {
            "==" => Ok(pair[0].equals(&pair[1])),
            "!=" => Ok(!pair[0].equals(&pair[1])),
            _ => numeric_cmp(op, &pair[0], &pair[1]),
        })
        .collect::<Result<Vec<bool>, Error>>()
        .map_err(|e| env.error_with_path(e))?
        .into_iter()
        .all(|b| b);
    Ok(Value::Bool(result).into())
}
