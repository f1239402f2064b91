//! Sugar writer — renders an AST back to concrete syntax (§4.7).
//! Grounded on `sugar/parser.rs`'s precedence table: each call form is
//! written at the tier its operator occupies in the grammar, and a
//! child is parenthesized only when its own tier is looser than what
//! that position of the grammar would parse without parentheses. This
//! keeps `parse(write(a)) == a` for any AST the parser itself can
//! produce, while still handling arbitrary Computo values written by
//! hand or produced by `diff`/other operators.

use crate::value::Value;

const KEYWORDS: &[&str] =
    &["let", "in", "if", "then", "else", "and", "or", "not", "true", "false", "null"];

pub fn write(value: &Value, array_key: &str) -> String {
    write_expr(value, array_key, 1)
}

fn write_expr(v: &Value, array_key: &str, min_tier: u8) -> String {
    let (text, tier) = write_inner(v, array_key);
    if tier < min_tier { format!("({text})") } else { text }
}

/// Returns the rendered text together with the tier of the grammar
/// production that yields it (1 lowest/`let`-`if`-lambda, 9 highest/atom).
fn write_inner(v: &Value, array_key: &str) -> (String, u8) {
    match v {
        Value::Null => ("null".to_string(), 9),
        Value::Bool(b) => (b.to_string(), 9),
        Value::Int(i) => (i.to_string(), 9),
        Value::Float(f) => (write_float(*f), 9),
        Value::String(s) => (write_string_literal(s), 9),
        Value::Object(_) if v.is_array_literal_form(array_key) => {
            let items = v.as_array_data(array_key).unwrap_or(&[]);
            let rendered: Vec<String> = items.iter().map(|i| write_expr(i, array_key, 1)).collect();
            (format!("[{}]", rendered.join(", ")), 9)
        }
        Value::Object(map) => {
            let mut entries = Vec::with_capacity(map.len());
            for (k, val) in map {
                entries.push(format!("{}: {}", write_key(k), write_expr(val, array_key, 1)));
            }
            (format!("{{{}}}", entries.join(", ")), 9)
        }
        Value::Array(items) => write_call(items, array_key),
    }
}

fn write_call(items: &[Value], array_key: &str) -> (String, u8) {
    let Some(Value::String(op)) = items.first() else {
        return (write_array_fallback(items, array_key), 9);
    };
    let args = &items[1..];

    match op.as_str() {
        "let" => write_let(args, array_key),
        "if" => write_if(args, array_key),
        "lambda" => write_lambda(args, array_key),
        "or" => write_variadic_chain(" or ", args, array_key, 3, 2),
        "and" => write_variadic_chain(" and ", args, array_key, 4, 3),
        "not" => write_prefix("not ", args, array_key, 4, 4),
        "==" | "!=" | "<" | "<=" | ">" | ">=" => write_comparison(op, args, array_key),
        "+" => write_additive_variadic("+", args, array_key),
        "*" => write_multiplicative_variadic("*", args, array_key),
        "-" => write_minus(args, array_key),
        "/" => write_binary(" / ", args, array_key, 7, 8, 7),
        "%" => write_binary(" % ", args, array_key, 7, 8, 7),
        "$" => write_dollar_like("$", args, array_key),
        "$input" => write_dollar_like("$input", args, array_key),
        "$inputs" => write_dollar_like("$inputs", args, array_key),
        _ => write_funcall(op, args, array_key),
    }
}

fn write_let(args: &[Value], array_key: &str) -> (String, u8) {
    let (Some(bindings), Some(body)) = (args.first().and_then(Value::as_array), args.get(1)) else {
        return (write_funcall("let", args, array_key), 9);
    };
    let mut parts = Vec::with_capacity(bindings.len());
    for b in bindings {
        let Some(pair) = b.as_array() else { return (write_funcall("let", args, array_key), 9) };
        let (Some(name), Some(val)) = (pair.first().and_then(Value::as_str), pair.get(1)) else {
            return (write_funcall("let", args, array_key), 9);
        };
        parts.push(format!("{name} = {}", write_expr(val, array_key, 1)));
    }
    (format!("let {} in {}", parts.join(", "), write_expr(body, array_key, 1)), 1)
}

fn write_if(args: &[Value], array_key: &str) -> (String, u8) {
    let [cond, then_branch, else_branch] = args else { return (write_funcall("if", args, array_key), 9) };
    (
        format!(
            "if {} then {} else {}",
            write_expr(cond, array_key, 1),
            write_expr(then_branch, array_key, 1),
            write_expr(else_branch, array_key, 1),
        ),
        1,
    )
}

fn write_lambda(args: &[Value], array_key: &str) -> (String, u8) {
    let (Some(params), Some(body)) = (args.first().and_then(Value::as_array), args.get(1)) else {
        return (write_funcall("lambda", args, array_key), 9);
    };
    let names: Option<Vec<&str>> = params.iter().map(Value::as_str).collect();
    let Some(names) = names else { return (write_funcall("lambda", args, array_key), 9) };
    (format!("({}) => {}", names.join(", "), write_expr(body, array_key, 1)), 1)
}

/// Shared shape for `or`/`and`: every operand sits at `operand_tier` in
/// the grammar (the chain never nests the same operator, it flattens),
/// so every operand needs exactly that minimum tier.
fn write_variadic_chain(joiner: &str, args: &[Value], array_key: &str, operand_tier: u8, own_tier: u8) -> (String, u8) {
    if args.is_empty() {
        return (write_funcall(joiner.trim(), args, array_key), 9);
    }
    let rendered: Vec<String> = args.iter().map(|a| write_expr(a, array_key, operand_tier)).collect();
    (rendered.join(joiner), own_tier)
}

fn write_prefix(prefix: &str, args: &[Value], array_key: &str, operand_tier: u8, own_tier: u8) -> (String, u8) {
    let [operand] = args else { return (write_funcall(prefix.trim(), args, array_key), 9) };
    (format!("{prefix}{}", write_expr(operand, array_key, operand_tier)), own_tier)
}

/// Comparisons chain only when the *same* operator repeats; every
/// operand (first and later) is always an additive-tier (6) parse.
fn write_comparison(op: &str, args: &[Value], array_key: &str) -> (String, u8) {
    if args.len() < 2 {
        return (write_funcall(op, args, array_key), 9);
    }
    let rendered: Vec<String> = args.iter().map(|a| write_expr(a, array_key, 6)).collect();
    (rendered.join(&format!(" {op} ")), 5)
}

/// `+` flattens: the first operand may itself be another additive-tier
/// (6) expression (e.g. nested `-`), later operands are always
/// multiplicative-tier (7) parses.
fn write_additive_variadic(op: &str, args: &[Value], array_key: &str) -> (String, u8) {
    if args.is_empty() {
        return (write_funcall(op, args, array_key), 9);
    }
    if args.len() == 1 {
        return write_inner(&args[0], array_key);
    }
    write_chain_variadic(op, args, array_key, 6, 7)
}

fn write_multiplicative_variadic(op: &str, args: &[Value], array_key: &str) -> (String, u8) {
    if args.is_empty() {
        return (write_funcall(op, args, array_key), 9);
    }
    if args.len() == 1 {
        return write_inner(&args[0], array_key);
    }
    write_chain_variadic(op, args, array_key, 7, 8)
}

fn write_chain_variadic(op: &str, args: &[Value], array_key: &str, own_tier: u8, rest_tier: u8) -> (String, u8) {
    let mut rendered = Vec::with_capacity(args.len());
    rendered.push(write_expr(&args[0], array_key, own_tier));
    for a in &args[1..] {
        rendered.push(write_expr(a, array_key, rest_tier));
    }
    (rendered.join(&format!(" {op} ")), own_tier)
}

/// `-` is unary negation with one operand, binary subtraction with two.
fn write_minus(args: &[Value], array_key: &str) -> (String, u8) {
    match args {
        [operand] => (format!("-{}", write_expr(operand, array_key, 8)), 8),
        [left, right] => (
            format!("{} - {}", write_expr(left, array_key, 6), write_expr(right, array_key, 7)),
            6,
        ),
        _ => (write_funcall("-", args, array_key), 9),
    }
}

fn write_binary(joiner: &str, args: &[Value], array_key: &str, left_tier: u8, right_tier: u8, own_tier: u8) -> (String, u8) {
    let [left, right] = args else {
        return (write_funcall(joiner.trim(), args, array_key), 9);
    };
    (format!("{}{joiner}{}", write_expr(left, array_key, left_tier), write_expr(right, array_key, right_tier)), own_tier)
}

/// `$`/`$input`/`$inputs`: bare, as a path (no surrounding whitespace
/// allowed around `/`), or — when the pointer isn't writable as a bare
/// path, or a default expression is present — as an explicit call.
fn write_dollar_like(head: &str, args: &[Value], array_key: &str) -> (String, u8) {
    match args {
        [] => (head.to_string(), 9),
        [Value::String(pointer)] => match pointer_to_path(pointer) {
            Some(path) if path.is_empty() => (head.to_string(), 9),
            Some(path) => (format!("{head}/{path}"), 9),
            None => (write_funcall(head, args, array_key), 9),
        },
        _ => (write_funcall(head, args, array_key), 9),
    }
}

/// Converts a JSON Pointer like `/a/b/0` into the bare-path spelling
/// `a/b/0`, or `None` when a segment needs pointer escaping (`~0`/`~1`)
/// or isn't a plain identifier/non-negative integer — such pointers
/// have no bare-path spelling and must be written as a quoted argument.
fn pointer_to_path(pointer: &str) -> Option<String> {
    if pointer.is_empty() {
        return Some(String::new());
    }
    let rest = pointer.strip_prefix('/')?;
    if rest.is_empty() {
        return Some(String::new());
    }
    for segment in rest.split('/') {
        if segment.contains('~') {
            return None;
        }
        let is_ident = {
            let mut chars = segment.chars();
            matches!(chars.next(), Some(c) if c.is_alphabetic() || c == '_') && chars.all(|c| c.is_alphanumeric() || c == '_')
        };
        let is_index = !segment.is_empty() && segment.chars().all(|c| c.is_ascii_digit());
        if !is_ident && !is_index {
            return None;
        }
    }
    Some(rest.to_string())
}

fn write_funcall(op: &str, args: &[Value], array_key: &str) -> String {
    let rendered: Vec<String> = args.iter().map(|a| write_expr(a, array_key, 1)).collect();
    format!("{op}({})", rendered.join(", "))
}

/// A bare array with no leading string operator isn't a valid call
/// form; render it as a literal array anyway rather than panic, since
/// this can only arise from hand-built or `diff`-produced ASTs.
fn write_array_fallback(items: &[Value], array_key: &str) -> String {
    let rendered: Vec<String> = items.iter().map(|i| write_expr(i, array_key, 1)).collect();
    format!("[{}]", rendered.join(", "))
}

fn write_key(key: &str) -> String {
    let is_ident = {
        let mut chars = key.chars();
        matches!(chars.next(), Some(c) if c.is_alphabetic() || c == '_') && chars.all(|c| c.is_alphanumeric() || c == '_')
    };
    if is_ident && !KEYWORDS.contains(&key) {
        key.to_string()
    } else {
        write_string_literal(key)
    }
}

/// `3.0` must keep its decimal point — Rust's default `f64` formatting
/// drops it, which would round-trip back as an integer literal.
fn write_float(f: f64) -> String {
    if f.is_finite() && f.fract() == 0.0 && f.abs() < 1e15 {
        format!("{f:.1}")
    } else {
        format!("{f}")
    }
}

fn write_string_literal(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('"');
    for c in s.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if (c as u32) < 0x20 => out.push_str(&format!("\\u{:04x}", c as u32)),
            c => out.push(c),
        }
    }
    out.push('"');
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sugar::{parse_sugar, write_sugar};

    fn roundtrip(source: &str) {
        let ast = parse_sugar(source, "array").expect("parse");
        let rendered = write_sugar(&ast, "array");
        let reparsed = parse_sugar(&rendered, "array").expect("reparse");
        assert_eq!(ast, reparsed, "{source:?} -> {rendered:?}");
    }

    #[test]
    fn roundtrips_arithmetic_precedence() {
        roundtrip("1 + 2 * 3");
        roundtrip("(1 + 2) * 3");
        roundtrip("a - b - c");
        roundtrip("a - (b - c)");
        roundtrip("a + b - c + d");
    }

    #[test]
    fn roundtrips_division_and_paths() {
        roundtrip("a / b");
        roundtrip("x/y/0");
        roundtrip("$/x/y");
        roundtrip("$input/a");
        roundtrip("$inputs/0/a");
    }

    #[test]
    fn roundtrips_let_if_lambda() {
        roundtrip("let x = 1, y = 2 in x + y");
        roundtrip("if a < b then a else b");
        roundtrip("(x, y) => x + y");
        roundtrip("map([1, 2, 3], (x) => x * 2)");
    }

    #[test]
    fn roundtrips_logical_chains() {
        roundtrip("a and b and c");
        roundtrip("a or b or c");
        roundtrip("not a and b");
        roundtrip("a == b == c");
    }

    #[test]
    fn writes_float_with_decimal_point() {
        assert_eq!(write_float(3.0), "3.0");
        assert_eq!(write_float(3.5), "3.5");
    }

    #[test]
    fn object_literal_quotes_reserved_keys() {
        let ast = Value::from_json(serde_json::json!({"if": 1, "plain": 2}));
        let rendered = write(&ast, "array");
        assert!(rendered.contains("\"if\": 1"));
        assert!(rendered.contains("plain: 2"));
    }

    #[test]
    fn array_literal_roundtrips() {
        roundtrip("[1, 2, 3]");
        roundtrip("[1, [2, 3], {a: 1}]");
    }
}
