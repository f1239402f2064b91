//! Precedence-climbing recursive-descent parser for the sugar syntax
//! (§4.6). Grounded on `filter/parser.rs`'s recursive-descent structure
//! (one function per precedence tier, lowest to highest), adapted to
//! Computo's own precedence table and to the AST shapes the evaluator
//! expects (call forms are plain arrays, literal arrays are
//! `{array_key: [...]}`).

use serde_json::Map;

use crate::error::Error;
use crate::value::Value;

use super::lexer::{Token, TokKind};

struct Parser<'a> {
    tokens: &'a [Token],
    pos: usize,
    array_key: &'a str,
}

pub fn parse(tokens: &[Token], array_key: &str) -> Result<Value, Error> {
    let mut p = Parser { tokens, pos: 0, array_key };
    let expr = p.parse_low()?;
    if let Some(tok) = p.peek() {
        return Err(Error::parse_error(format!("unexpected trailing token {:?}", tok.kind), tok.line, tok.col));
    }
    Ok(expr)
}

fn call(op: &str, args: Vec<Value>) -> Value {
    let mut items = vec![Value::String(op.to_string())];
    items.extend(args);
    Value::Array(items)
}

impl<'a> Parser<'a> {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn peek_kind(&self) -> Option<&TokKind> {
        self.peek().map(|t| &t.kind)
    }

    fn advance(&mut self) -> Option<&Token> {
        let tok = self.tokens.get(self.pos);
        if tok.is_some() {
            self.pos += 1;
        }
        tok
    }

    fn error_here(&self, message: impl Into<String>) -> Error {
        match self.peek() {
            Some(tok) => Error::parse_error(message, tok.line, tok.col),
            None => {
                let (line, col) = self.tokens.last().map(|t| (t.line, t.col + 1)).unwrap_or((1, 1));
                Error::parse_error(message, line, col)
            }
        }
    }

    fn expect(&mut self, kind: &TokKind, what: &str) -> Result<(), Error> {
        match self.peek_kind() {
            Some(k) if k == kind => {
                self.advance();
                Ok(())
            }
            _ => Err(self.error_here(format!("expected {what}"))),
        }
    }

    fn expect_ident(&mut self, what: &str) -> Result<String, Error> {
        match self.peek_kind() {
            Some(TokKind::Ident(name)) => {
                let name = name.clone();
                self.advance();
                Ok(name)
            }
            _ => Err(self.error_here(format!("expected {what}"))),
        }
    }

    // Tier 1 (lowest): let-in, if-then-else, lambda.
    fn parse_low(&mut self) -> Result<Value, Error> {
        match self.peek_kind() {
            Some(TokKind::Let) => self.parse_let(),
            Some(TokKind::If) => self.parse_if(),
            Some(TokKind::LParen) => {
                if let Some(params) = self.try_lambda_header()? {
                    let body = self.parse_low()?;
                    Ok(call("lambda", vec![Value::Array(params.into_iter().map(Value::String).collect()), body]))
                } else {
                    self.parse_or()
                }
            }
            _ => self.parse_or(),
        }
    }

    fn parse_let(&mut self) -> Result<Value, Error> {
        self.advance(); // `let`
        let mut bindings = Vec::new();
        loop {
            let name = self.expect_ident("a binding name")?;
            self.expect(&TokKind::Assign, "'='")?;
            let value = self.parse_low()?;
            bindings.push(Value::Array(vec![Value::String(name), value]));
            match self.peek_kind() {
                Some(TokKind::Comma) => {
                    self.advance();
                }
                _ => break,
            }
        }
        self.expect(&TokKind::In, "'in'")?;
        let body = self.parse_low()?;
        Ok(call("let", vec![Value::Array(bindings), body]))
    }

    fn parse_if(&mut self) -> Result<Value, Error> {
        self.advance(); // `if`
        let cond = self.parse_low()?;
        self.expect(&TokKind::Then, "'then'")?;
        let then_branch = self.parse_low()?;
        self.expect(&TokKind::Else, "'else'")?;
        let else_branch = self.parse_low()?;
        Ok(call("if", vec![cond, then_branch, else_branch]))
    }

    /// Attempts `(name, name, ...) =>`; on any mismatch, rewinds and
    /// returns `None` so the caller falls back to a grouped expression.
    fn try_lambda_header(&mut self) -> Result<Option<Vec<String>>, Error> {
        let start = self.pos;
        self.advance(); // `(`
        let mut params = Vec::new();
        if self.peek_kind() != Some(&TokKind::RParen) {
            loop {
                match self.peek_kind() {
                    Some(TokKind::Ident(name)) => {
                        params.push(name.clone());
                        self.advance();
                    }
                    _ => {
                        self.pos = start;
                        return Ok(None);
                    }
                }
                match self.peek_kind() {
                    Some(TokKind::Comma) => {
                        self.advance();
                    }
                    Some(TokKind::RParen) => break,
                    _ => {
                        self.pos = start;
                        return Ok(None);
                    }
                }
            }
        }
        if self.peek_kind() != Some(&TokKind::RParen) {
            self.pos = start;
            return Ok(None);
        }
        self.advance(); // `)`
        if self.peek_kind() != Some(&TokKind::Arrow) {
            self.pos = start;
            return Ok(None);
        }
        self.advance(); // `=>`
        Ok(Some(params))
    }

    // Tier 2: or (variadic flatten).
    fn parse_or(&mut self) -> Result<Value, Error> {
        let first = self.parse_and()?;
        if self.peek_kind() != Some(&TokKind::Or) {
            return Ok(first);
        }
        let mut items = vec![first];
        while self.peek_kind() == Some(&TokKind::Or) {
            self.advance();
            items.push(self.parse_and()?);
        }
        Ok(call("or", items))
    }

    // Tier 3: and (variadic flatten).
    fn parse_and(&mut self) -> Result<Value, Error> {
        let first = self.parse_not()?;
        if self.peek_kind() != Some(&TokKind::And) {
            return Ok(first);
        }
        let mut items = vec![first];
        while self.peek_kind() == Some(&TokKind::And) {
            self.advance();
            items.push(self.parse_not()?);
        }
        Ok(call("and", items))
    }

    // Tier 4: prefix not.
    fn parse_not(&mut self) -> Result<Value, Error> {
        if self.peek_kind() == Some(&TokKind::Not) {
            self.advance();
            let operand = self.parse_not()?;
            return Ok(call("not", vec![operand]));
        }
        self.parse_comparison()
    }

    // Tier 5: comparison, chained only when the operator repeats.
    fn parse_comparison(&mut self) -> Result<Value, Error> {
        let first = self.parse_additive()?;
        let op = match self.peek_kind() {
            Some(TokKind::Eq) => "==",
            Some(TokKind::Ne) => "!=",
            Some(TokKind::Lt) => "<",
            Some(TokKind::Le) => "<=",
            Some(TokKind::Gt) => ">",
            Some(TokKind::Ge) => ">=",
            _ => return Ok(first),
        };
        let op_kind = self.peek_kind().unwrap().clone();
        let mut items = vec![first];
        while self.peek_kind() == Some(&op_kind) {
            self.advance();
            items.push(self.parse_additive()?);
        }
        Ok(call(op, items))
    }

    // Tier 6: additive. `+` flattens variadically; `-` stays binary and
    // left-nests, so `a - b - c` round-trips as `["-", ["-", a, b], c]`.
    fn parse_additive(&mut self) -> Result<Value, Error> {
        let mut left = self.parse_multiplicative()?;
        loop {
            match self.peek_kind() {
                Some(TokKind::Plus) => {
                    self.advance();
                    let right = self.parse_multiplicative()?;
                    left = append_variadic("+", left, right);
                }
                Some(TokKind::Minus) => {
                    self.advance();
                    let right = self.parse_multiplicative()?;
                    left = call("-", vec![left, right]);
                }
                _ => break,
            }
        }
        Ok(left)
    }

    // Tier 7: multiplicative. `*` flattens variadically; `/` and `%` stay
    // binary. A `/` here is always division — path segments were already
    // consumed inside `parse_path_like` at the higher call/path tier.
    fn parse_multiplicative(&mut self) -> Result<Value, Error> {
        let mut left = self.parse_unary()?;
        loop {
            match self.peek_kind() {
                Some(TokKind::Star) => {
                    self.advance();
                    let right = self.parse_unary()?;
                    left = append_variadic("*", left, right);
                }
                Some(TokKind::Slash { space_before, space_after }) => {
                    if space_before != space_after {
                        return Err(self.error_here(
                            "ambiguous use of '/': a variable path needs no surrounding whitespace, division needs matching whitespace on both sides",
                        ));
                    }
                    self.advance();
                    let right = self.parse_unary()?;
                    left = call("/", vec![left, right]);
                }
                Some(TokKind::Percent) => {
                    self.advance();
                    let right = self.parse_unary()?;
                    left = call("%", vec![left, right]);
                }
                _ => break,
            }
        }
        Ok(left)
    }

    // Tier 8: unary minus.
    fn parse_unary(&mut self) -> Result<Value, Error> {
        if self.peek_kind() == Some(&TokKind::Minus) {
            self.advance();
            let operand = self.parse_unary()?;
            return Ok(call("-", vec![operand]));
        }
        self.parse_callpath()
    }

    // Tier 9 (highest): call forms and variable paths.
    fn parse_callpath(&mut self) -> Result<Value, Error> {
        let Some(tok) = self.peek().cloned() else {
            return Err(self.error_here("unexpected end of input"));
        };
        match tok.kind {
            TokKind::Int(n) => {
                self.advance();
                Ok(Value::Int(n))
            }
            TokKind::Float(f) => {
                self.advance();
                Ok(Value::Float(f))
            }
            TokKind::Str(s) => {
                self.advance();
                Ok(Value::String(s))
            }
            TokKind::True => {
                self.advance();
                Ok(Value::Bool(true))
            }
            TokKind::False => {
                self.advance();
                Ok(Value::Bool(false))
            }
            TokKind::Null => {
                self.advance();
                Ok(Value::Null)
            }
            TokKind::LBrack => self.parse_array_literal(),
            TokKind::LBrace => self.parse_object_literal(),
            TokKind::LParen => {
                self.advance();
                let inner = self.parse_low()?;
                self.expect(&TokKind::RParen, "')'")?;
                Ok(inner)
            }
            TokKind::Dollar => {
                self.advance();
                self.parse_name_like("$")
            }
            TokKind::DollarInput => {
                self.advance();
                self.parse_name_like("$input")
            }
            TokKind::DollarInputs => {
                self.advance();
                self.parse_name_like("$inputs")
            }
            TokKind::Ident(name) => {
                self.advance();
                if self.peek_kind() == Some(&TokKind::LParen) {
                    return self.parse_call_args(&name);
                }
                let pointer = self.parse_path_suffix(name)?;
                Ok(call("$", vec![Value::String(format!("/{pointer}"))]))
            }
            other => Err(self.error_here(format!("unexpected token {other:?}"))),
        }
    }

    /// `$`/`$input`/`$inputs`, each usable bare, as a path (`$input/a/b`),
    /// or as an explicit call (`$("/complex")`) for pointers too irregular
    /// to write as a path.
    fn parse_name_like(&mut self, head: &str) -> Result<Value, Error> {
        if self.peek_kind() == Some(&TokKind::LParen) {
            return self.parse_call_args(head);
        }
        if let Some(&TokKind::Slash { space_before: false, space_after }) = self.peek_kind() {
            if let Some(first_seg) = self.peek_path_segment(1) {
                if space_after {
                    return Err(self.error_here(
                        "ambiguous use of '/': variable path segments must have no surrounding whitespace",
                    ));
                }
                self.advance(); // `/`
                self.advance(); // first segment
                let pointer = self.parse_path_suffix(first_seg)?;
                return Ok(call(head, vec![Value::String(format!("/{pointer}"))]));
            }
        }
        Ok(call(head, vec![]))
    }

    fn parse_call_args(&mut self, head: &str) -> Result<Value, Error> {
        self.advance(); // `(`
        let mut args = Vec::new();
        if self.peek_kind() != Some(&TokKind::RParen) {
            loop {
                args.push(self.parse_low()?);
                match self.peek_kind() {
                    Some(TokKind::Comma) => {
                        self.advance();
                    }
                    _ => break,
                }
            }
        }
        self.expect(&TokKind::RParen, "')'")?;
        Ok(call(head, args))
    }

    /// Looks two tokens ahead for `/segment`, without consuming, to decide
    /// whether a leading name should itself be treated as the first path
    /// segment (used by `$input`/`$inputs`, which have no name of their
    /// own to seed the pointer with).
    fn peek_path_segment(&self, slash_offset: usize) -> Option<String> {
        match self.tokens.get(self.pos + slash_offset) {
            Some(Token { kind: TokKind::Ident(name), .. }) => Some(name.clone()),
            Some(Token { kind: TokKind::Int(n), .. }) if *n >= 0 => Some(n.to_string()),
            _ => None,
        }
    }

    /// Consumes zero or more `/segment` continuations adjacent (no
    /// whitespace) to the path built so far, starting from `base`.
    fn parse_path_suffix(&mut self, base: String) -> Result<String, Error> {
        let mut pointer = base;
        loop {
            let Some(TokKind::Slash { space_before: false, space_after }) = self.peek_kind().cloned() else { break };
            let Some(seg) = self.peek_path_segment(1) else { break };
            if space_after {
                return Err(self.error_here("ambiguous use of '/': variable path segments must have no surrounding whitespace"));
            }
            self.advance(); // `/`
            self.advance(); // segment
            pointer.push('/');
            pointer.push_str(&seg);
        }
        Ok(pointer)
    }

    fn parse_array_literal(&mut self) -> Result<Value, Error> {
        self.advance(); // `[`
        let mut items = Vec::new();
        if self.peek_kind() != Some(&TokKind::RBrack) {
            loop {
                items.push(self.parse_low()?);
                match self.peek_kind() {
                    Some(TokKind::Comma) => {
                        self.advance();
                    }
                    _ => break,
                }
            }
        }
        self.expect(&TokKind::RBrack, "']'")?;
        Ok(Value::wrap_array(items, self.array_key))
    }

    fn parse_object_literal(&mut self) -> Result<Value, Error> {
        self.advance(); // `{`
        let mut map = Map::new();
        if self.peek_kind() != Some(&TokKind::RBrace) {
            loop {
                let key = match self.peek_kind() {
                    Some(TokKind::Ident(name)) => {
                        let name = name.clone();
                        self.advance();
                        name
                    }
                    Some(TokKind::Str(s)) => {
                        let s = s.clone();
                        self.advance();
                        s
                    }
                    _ => return Err(self.error_here("expected an object key")),
                };
                self.expect(&TokKind::Colon, "':'")?;
                let value = self.parse_low()?;
                map.insert(key, value);
                match self.peek_kind() {
                    Some(TokKind::Comma) => {
                        self.advance();
                    }
                    _ => break,
                }
            }
        }
        self.expect(&TokKind::RBrace, "'}'")?;
        Ok(Value::Object(map))
    }
}

/// Appends `right` to `left` if `left` is already a call to `op` (so
/// `a + b + c` parses to a single flat `["+", a, b, c]` rather than a
/// right-nested tree), otherwise starts a fresh binary call.
fn append_variadic(op: &str, left: Value, right: Value) -> Value {
    if let Value::Array(mut items) = left {
        if matches!(items.first(), Some(Value::String(s)) if s == op) {
            items.push(right);
            return Value::Array(items);
        }
        return call(op, vec![Value::Array(items), right]);
    }
    call(op, vec![left, right])
}
