//! Concrete "sugar" syntax for Computo scripts (§4.6-§4.8): a small
//! infix/keyword notation that desugars to the same JSON AST the
//! evaluator runs directly. `lexer` tokenizes, `parser` builds the AST,
//! `writer` goes the other way so `--tocomputo` and `--format` can
//! render JSON AST back as sugar.

pub mod lexer;
mod parser;
mod writer;

use crate::error::Error;
use crate::value::Value;

/// Parses sugar source text into a Computo AST (a plain `serde_json`-shaped
/// `Value`, ready to hand to `eval::evaluate`).
pub fn parse_sugar(source: &str, array_key: &str) -> Result<Value, Error> {
    let tokens = lexer::lex(source)?;
    parser::parse(&tokens, array_key)
}

/// Renders a Computo AST back into sugar source text.
pub fn write_sugar(value: &Value, array_key: &str) -> String {
    writer::write(value, array_key)
}
