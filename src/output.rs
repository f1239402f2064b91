//! JSON output formatting for the CLI driver: plain pretty/compact
//! printing plus the `--highlight` token-colored mode. Grounded on the
//! teacher's `output.rs` — same `ColorScheme`/conditional-ANSI shape,
//! reworked around `computo::Value` and the sugar lexer's token stream
//! instead of the teacher's own value/output types.

use computo::sugar::lexer::{TokKind, Token};
use computo::Value;

/// ANSI color scheme for `--highlight` output.
#[derive(Debug, Clone)]
pub struct ColorScheme {
    pub keyword: &'static str,
    pub ident: &'static str,
    pub string: &'static str,
    pub number: &'static str,
    pub punct: &'static str,
    pub reset: &'static str,
}

impl ColorScheme {
    pub fn default_scheme() -> Self {
        Self {
            keyword: "\x1b[1;35m",
            ident: "\x1b[0;39m",
            string: "\x1b[0;32m",
            number: "\x1b[0;36m",
            punct: "\x1b[1;39m",
            reset: "\x1b[0m",
        }
    }

    pub fn none() -> Self {
        Self { keyword: "", ident: "", string: "", number: "", punct: "", reset: "" }
    }
}

/// Pretty-prints `value` as JSON with two-space indentation.
pub fn format_pretty(value: &Value) -> String {
    serde_json::to_string_pretty(&value.to_json()).unwrap_or_default()
}

/// Renders sugar source with ANSI color spans per token class, preserving
/// the original whitespace between tokens (re-sliced from `source` by
/// line/column rather than re-synthesized, so comments and spacing survive).
pub fn highlight(source: &str, tokens: &[Token], scheme: &ColorScheme) -> String {
    let lines: Vec<&str> = source.lines().collect();
    let mut out = String::with_capacity(source.len() * 2);
    let mut last_line = 1usize;
    let mut last_col = 1usize;

    for tok in tokens {
        while last_line < tok.line {
            out.push('\n');
            last_line += 1;
            last_col = 1;
        }
        if let Some(line_text) = lines.get(tok.line - 1) {
            let chars: Vec<char> = line_text.chars().collect();
            while last_col < tok.col && last_col - 1 < chars.len() {
                out.push(chars[last_col - 1]);
                last_col += 1;
            }
        }
        let (color, text) = token_color_and_text(tok, scheme);
        if color.is_empty() {
            out.push_str(&text);
        } else {
            out.push_str(color);
            out.push_str(&text);
            out.push_str(scheme.reset);
        }
        last_col += text.chars().count();
    }
    out
}

fn token_color_and_text(tok: &Token, scheme: &ColorScheme) -> (&'static str, String) {
    match &tok.kind {
        TokKind::Let | TokKind::In | TokKind::If | TokKind::Then | TokKind::Else | TokKind::And | TokKind::Or | TokKind::Not => {
            (scheme.keyword, keyword_text(&tok.kind))
        }
        TokKind::True => (scheme.keyword, "true".to_string()),
        TokKind::False => (scheme.keyword, "false".to_string()),
        TokKind::Null => (scheme.keyword, "null".to_string()),
        TokKind::Ident(name) => (scheme.ident, name.clone()),
        TokKind::Dollar => (scheme.ident, "$".to_string()),
        TokKind::DollarInput => (scheme.ident, "$input".to_string()),
        TokKind::DollarInputs => (scheme.ident, "$inputs".to_string()),
        TokKind::Str(s) => (scheme.string, format!("{s:?}")),
        TokKind::Int(n) => (scheme.number, n.to_string()),
        TokKind::Float(f) => (scheme.number, f.to_string()),
        _ => (scheme.punct, punct_text(&tok.kind)),
    }
}

fn keyword_text(kind: &TokKind) -> String {
    match kind {
        TokKind::Let => "let",
        TokKind::In => "in",
        TokKind::If => "if",
        TokKind::Then => "then",
        TokKind::Else => "else",
        TokKind::And => "and",
        TokKind::Or => "or",
        TokKind::Not => "not",
        _ => "",
    }
    .to_string()
}

fn punct_text(kind: &TokKind) -> String {
    match kind {
        TokKind::LParen => "(",
        TokKind::RParen => ")",
        TokKind::LBrack => "[",
        TokKind::RBrack => "]",
        TokKind::LBrace => "{",
        TokKind::RBrace => "}",
        TokKind::Comma => ",",
        TokKind::Colon => ":",
        TokKind::Assign => "=",
        TokKind::Arrow => "=>",
        TokKind::Eq => "==",
        TokKind::Ne => "!=",
        TokKind::Lt => "<",
        TokKind::Le => "<=",
        TokKind::Gt => ">",
        TokKind::Ge => ">=",
        TokKind::Plus => "+",
        TokKind::Minus => "-",
        TokKind::Star => "*",
        TokKind::Percent => "%",
        TokKind::Slash { .. } => "/",
        _ => "",
    }
    .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_pretty_indents() {
        let v = Value::from_json(serde_json::json!({"a": 1}));
        assert_eq!(format_pretty(&v), "{\n  \"a\": 1\n}");
    }

    #[test]
    fn highlight_preserves_plain_text_when_scheme_is_none() {
        let source = "1 + 2";
        let tokens = computo::sugar::lexer::lex(source).unwrap();
        assert_eq!(highlight(source, &tokens, &ColorScheme::none()), "1 + 2");
    }
}
