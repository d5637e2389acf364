//! Safe boolean expression sub-language for Code triggers.
//!
//! Board authors write small predicates such as
//! `turn_number > 3 && stat("score") >= 10` or
//! `player_state == "PLAYING" && moves_left == 0`. The engine owns the whole
//! pipeline: lexing, recursive-descent parsing at load time, and evaluation
//! against a narrow variable scope. There is no host-language evaluation.
//!
//! Parse failures are configuration errors (load-time fatal). Evaluation
//! failures (unknown identifier, division by zero, type mismatch) coerce to
//! `false` and never propagate.

use serde::{Deserialize, Serialize};

use crate::error::Validation;

/// Value produced while evaluating an expression.
#[derive(Clone, Debug, PartialEq)]
pub enum Value {
    Int(i64),
    Bool(bool),
    Str(String),
}

impl Value {
    /// Truthiness for the final coercion: zero, `false`, and the empty
    /// string are false.
    fn is_truthy(&self) -> bool {
        match self {
            Value::Int(v) => *v != 0,
            Value::Bool(b) => *b,
            Value::Str(s) => !s.is_empty(),
        }
    }
}

/// Variable scope an expression evaluates against.
pub trait EvalScope {
    /// Resolves a bare identifier (`turn_number`, `moves_left`, ...).
    fn var(&self, name: &str) -> Option<Value>;

    /// Resolves a `stat("id")` call on the active player.
    fn stat(&self, id: &str) -> Option<Value>;
}

#[derive(Clone, Debug, thiserror::Error, PartialEq, Eq)]
pub enum ExprError {
    #[error("unexpected character '{0}' at offset {1}")]
    UnexpectedChar(char, usize),
    #[error("unterminated string literal")]
    UnterminatedString,
    #[error("unexpected token '{0}'")]
    UnexpectedToken(String),
    #[error("unexpected end of expression")]
    UnexpectedEnd,
    #[error("expected {expected}, found '{found}'")]
    Expected { expected: &'static str, found: String },
    #[error("forbidden token '{0}'")]
    ForbiddenToken(String),
}

/// Evaluation failures; callers coerce these to `false`.
#[derive(Clone, Debug, PartialEq, Eq)]
enum EvalError {
    UnknownIdent(String),
    UnknownStat(String),
    TypeMismatch,
    DivisionByZero,
}

// ============================================================================
// Tokens
// ============================================================================

#[derive(Clone, Debug, PartialEq)]
enum Token {
    Int(i64),
    Str(String),
    Ident(String),
    True,
    False,
    LParen,
    RParen,
    Not,
    And,
    Or,
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
    Plus,
    Minus,
    Star,
    Slash,
    Percent,
}

impl std::fmt::Display for Token {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Token::Int(v) => write!(f, "{v}"),
            Token::Str(s) => write!(f, "\"{s}\""),
            Token::Ident(s) => write!(f, "{s}"),
            Token::True => write!(f, "true"),
            Token::False => write!(f, "false"),
            Token::LParen => write!(f, "("),
            Token::RParen => write!(f, ")"),
            Token::Not => write!(f, "!"),
            Token::And => write!(f, "&&"),
            Token::Or => write!(f, "||"),
            Token::Eq => write!(f, "=="),
            Token::Ne => write!(f, "!="),
            Token::Lt => write!(f, "<"),
            Token::Le => write!(f, "<="),
            Token::Gt => write!(f, ">"),
            Token::Ge => write!(f, ">="),
            Token::Plus => write!(f, "+"),
            Token::Minus => write!(f, "-"),
            Token::Star => write!(f, "*"),
            Token::Slash => write!(f, "/"),
            Token::Percent => write!(f, "%"),
        }
    }
}

fn lex(source: &str) -> Result<Vec<Token>, ExprError> {
    let mut tokens = Vec::new();
    let chars: Vec<char> = source.chars().collect();
    let mut i = 0;
    while i < chars.len() {
        let c = chars[i];
        match c {
            ' ' | '\t' | '\n' | '\r' => i += 1,
            '(' => {
                tokens.push(Token::LParen);
                i += 1;
            }
            ')' => {
                tokens.push(Token::RParen);
                i += 1;
            }
            '+' => {
                tokens.push(Token::Plus);
                i += 1;
            }
            '-' => {
                tokens.push(Token::Minus);
                i += 1;
            }
            '*' => {
                tokens.push(Token::Star);
                i += 1;
            }
            '/' => {
                tokens.push(Token::Slash);
                i += 1;
            }
            '%' => {
                tokens.push(Token::Percent);
                i += 1;
            }
            '&' => {
                if chars.get(i + 1) == Some(&'&') {
                    tokens.push(Token::And);
                    i += 2;
                } else {
                    return Err(ExprError::UnexpectedChar('&', i));
                }
            }
            '|' => {
                if chars.get(i + 1) == Some(&'|') {
                    tokens.push(Token::Or);
                    i += 2;
                } else {
                    return Err(ExprError::UnexpectedChar('|', i));
                }
            }
            '=' => {
                if chars.get(i + 1) == Some(&'=') {
                    tokens.push(Token::Eq);
                    i += 2;
                } else {
                    return Err(ExprError::UnexpectedChar('=', i));
                }
            }
            '!' => {
                if chars.get(i + 1) == Some(&'=') {
                    tokens.push(Token::Ne);
                    i += 2;
                } else {
                    tokens.push(Token::Not);
                    i += 1;
                }
            }
            '<' => {
                if chars.get(i + 1) == Some(&'=') {
                    tokens.push(Token::Le);
                    i += 2;
                } else {
                    tokens.push(Token::Lt);
                    i += 1;
                }
            }
            '>' => {
                if chars.get(i + 1) == Some(&'=') {
                    tokens.push(Token::Ge);
                    i += 2;
                } else {
                    tokens.push(Token::Gt);
                    i += 1;
                }
            }
            '"' | '\'' => {
                let quote = c;
                let mut s = String::new();
                i += 1;
                loop {
                    match chars.get(i) {
                        Some(&ch) if ch == quote => {
                            i += 1;
                            break;
                        }
                        Some(&ch) => {
                            s.push(ch);
                            i += 1;
                        }
                        None => return Err(ExprError::UnterminatedString),
                    }
                }
                tokens.push(Token::Str(s));
            }
            '0'..='9' => {
                let start = i;
                while i < chars.len() && chars[i].is_ascii_digit() {
                    i += 1;
                }
                let text: String = chars[start..i].iter().collect();
                let value = text
                    .parse()
                    .map_err(|_| ExprError::UnexpectedToken(text.clone()))?;
                tokens.push(Token::Int(value));
            }
            c if c.is_ascii_alphabetic() || c == '_' => {
                let start = i;
                while i < chars.len() && (chars[i].is_ascii_alphanumeric() || chars[i] == '_') {
                    i += 1;
                }
                let word: String = chars[start..i].iter().collect();
                tokens.push(match word.as_str() {
                    "true" => Token::True,
                    "false" => Token::False,
                    _ => Token::Ident(word),
                });
            }
            other => return Err(ExprError::UnexpectedChar(other, i)),
        }
    }
    Ok(tokens)
}

// ============================================================================
// AST & parser
// ============================================================================

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum BinOp {
    And,
    Or,
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
    Add,
    Sub,
    Mul,
    Div,
    Rem,
}

#[derive(Clone, Debug, PartialEq)]
enum Expr {
    Int(i64),
    Bool(bool),
    Str(String),
    Ident(String),
    Stat(String),
    Not(Box<Expr>),
    Neg(Box<Expr>),
    Binary(BinOp, Box<Expr>, Box<Expr>),
}

struct Parser {
    tokens: Vec<Token>,
    pos: usize,
}

impl Parser {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn next(&mut self) -> Result<Token, ExprError> {
        let token = self.tokens.get(self.pos).cloned().ok_or(ExprError::UnexpectedEnd)?;
        self.pos += 1;
        Ok(token)
    }

    fn expect(&mut self, expected: Token, what: &'static str) -> Result<(), ExprError> {
        let token = self.next()?;
        if token == expected {
            Ok(())
        } else {
            Err(ExprError::Expected {
                expected: what,
                found: token.to_string(),
            })
        }
    }

    fn parse_or(&mut self) -> Result<Expr, ExprError> {
        let mut left = self.parse_and()?;
        while self.peek() == Some(&Token::Or) {
            self.pos += 1;
            let right = self.parse_and()?;
            left = Expr::Binary(BinOp::Or, Box::new(left), Box::new(right));
        }
        Ok(left)
    }

    fn parse_and(&mut self) -> Result<Expr, ExprError> {
        let mut left = self.parse_cmp()?;
        while self.peek() == Some(&Token::And) {
            self.pos += 1;
            let right = self.parse_cmp()?;
            left = Expr::Binary(BinOp::And, Box::new(left), Box::new(right));
        }
        Ok(left)
    }

    fn parse_cmp(&mut self) -> Result<Expr, ExprError> {
        let left = self.parse_add()?;
        let op = match self.peek() {
            Some(Token::Eq) => BinOp::Eq,
            Some(Token::Ne) => BinOp::Ne,
            Some(Token::Lt) => BinOp::Lt,
            Some(Token::Le) => BinOp::Le,
            Some(Token::Gt) => BinOp::Gt,
            Some(Token::Ge) => BinOp::Ge,
            _ => return Ok(left),
        };
        self.pos += 1;
        let right = self.parse_add()?;
        Ok(Expr::Binary(op, Box::new(left), Box::new(right)))
    }

    fn parse_add(&mut self) -> Result<Expr, ExprError> {
        let mut left = self.parse_mul()?;
        loop {
            let op = match self.peek() {
                Some(Token::Plus) => BinOp::Add,
                Some(Token::Minus) => BinOp::Sub,
                _ => return Ok(left),
            };
            self.pos += 1;
            let right = self.parse_mul()?;
            left = Expr::Binary(op, Box::new(left), Box::new(right));
        }
    }

    fn parse_mul(&mut self) -> Result<Expr, ExprError> {
        let mut left = self.parse_unary()?;
        loop {
            let op = match self.peek() {
                Some(Token::Star) => BinOp::Mul,
                Some(Token::Slash) => BinOp::Div,
                Some(Token::Percent) => BinOp::Rem,
                _ => return Ok(left),
            };
            self.pos += 1;
            let right = self.parse_unary()?;
            left = Expr::Binary(op, Box::new(left), Box::new(right));
        }
    }

    fn parse_unary(&mut self) -> Result<Expr, ExprError> {
        match self.peek() {
            Some(Token::Not) => {
                self.pos += 1;
                Ok(Expr::Not(Box::new(self.parse_unary()?)))
            }
            Some(Token::Minus) => {
                self.pos += 1;
                Ok(Expr::Neg(Box::new(self.parse_unary()?)))
            }
            _ => self.parse_primary(),
        }
    }

    fn parse_primary(&mut self) -> Result<Expr, ExprError> {
        match self.next()? {
            Token::Int(v) => Ok(Expr::Int(v)),
            Token::True => Ok(Expr::Bool(true)),
            Token::False => Ok(Expr::Bool(false)),
            Token::Str(s) => Ok(Expr::Str(s)),
            Token::Ident(name) => {
                // `stat("id")` is the only call form in the grammar.
                if name == "stat" && self.peek() == Some(&Token::LParen) {
                    self.pos += 1;
                    let id = match self.next()? {
                        Token::Str(s) => s,
                        other => {
                            return Err(ExprError::Expected {
                                expected: "stat id string",
                                found: other.to_string(),
                            });
                        }
                    };
                    self.expect(Token::RParen, "closing ')'")?;
                    Ok(Expr::Stat(id))
                } else {
                    Ok(Expr::Ident(name))
                }
            }
            Token::LParen => {
                let inner = self.parse_or()?;
                self.expect(Token::RParen, "closing ')'")?;
                Ok(inner)
            }
            other => Err(ExprError::UnexpectedToken(other.to_string())),
        }
    }
}

// ============================================================================
// Evaluation
// ============================================================================

fn eval(expr: &Expr, scope: &dyn EvalScope) -> Result<Value, EvalError> {
    match expr {
        Expr::Int(v) => Ok(Value::Int(*v)),
        Expr::Bool(b) => Ok(Value::Bool(*b)),
        Expr::Str(s) => Ok(Value::Str(s.clone())),
        Expr::Ident(name) => scope
            .var(name)
            .ok_or_else(|| EvalError::UnknownIdent(name.clone())),
        Expr::Stat(id) => scope
            .stat(id)
            .ok_or_else(|| EvalError::UnknownStat(id.clone())),
        Expr::Not(inner) => Ok(Value::Bool(!eval(inner, scope)?.is_truthy())),
        Expr::Neg(inner) => match eval(inner, scope)? {
            Value::Int(v) => Ok(Value::Int(-v)),
            _ => Err(EvalError::TypeMismatch),
        },
        Expr::Binary(op, left, right) => eval_binary(*op, left, right, scope),
    }
}

fn eval_binary(
    op: BinOp,
    left: &Expr,
    right: &Expr,
    scope: &dyn EvalScope,
) -> Result<Value, EvalError> {
    // Short-circuit the boolean connectives.
    match op {
        BinOp::And => {
            if !eval(left, scope)?.is_truthy() {
                return Ok(Value::Bool(false));
            }
            return Ok(Value::Bool(eval(right, scope)?.is_truthy()));
        }
        BinOp::Or => {
            if eval(left, scope)?.is_truthy() {
                return Ok(Value::Bool(true));
            }
            return Ok(Value::Bool(eval(right, scope)?.is_truthy()));
        }
        _ => {}
    }

    let lhs = eval(left, scope)?;
    let rhs = eval(right, scope)?;
    match op {
        BinOp::Eq => Ok(Value::Bool(values_equal(&lhs, &rhs))),
        BinOp::Ne => Ok(Value::Bool(!values_equal(&lhs, &rhs))),
        BinOp::Lt | BinOp::Le | BinOp::Gt | BinOp::Ge => {
            let (a, b) = int_pair(lhs, rhs)?;
            Ok(Value::Bool(match op {
                BinOp::Lt => a < b,
                BinOp::Le => a <= b,
                BinOp::Gt => a > b,
                _ => a >= b,
            }))
        }
        BinOp::Add | BinOp::Sub | BinOp::Mul => {
            let (a, b) = int_pair(lhs, rhs)?;
            Ok(Value::Int(match op {
                BinOp::Add => a.wrapping_add(b),
                BinOp::Sub => a.wrapping_sub(b),
                _ => a.wrapping_mul(b),
            }))
        }
        BinOp::Div | BinOp::Rem => {
            let (a, b) = int_pair(lhs, rhs)?;
            if b == 0 {
                return Err(EvalError::DivisionByZero);
            }
            Ok(Value::Int(if op == BinOp::Div { a / b } else { a % b }))
        }
        BinOp::And | BinOp::Or => unreachable!("handled above"),
    }
}

fn values_equal(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Int(x), Value::Int(y)) => x == y,
        (Value::Bool(x), Value::Bool(y)) => x == y,
        (Value::Str(x), Value::Str(y)) => x == y,
        _ => false,
    }
}

fn int_pair(a: Value, b: Value) -> Result<(i64, i64), EvalError> {
    match (a, b) {
        (Value::Int(x), Value::Int(y)) => Ok((x, y)),
        _ => Err(EvalError::TypeMismatch),
    }
}

// ============================================================================
// CodeExpr
// ============================================================================

/// Syntactic denylist applied at validation time.
///
/// Boards imported from the legacy evaluator may still carry host-environment
/// references; none of these can parse in this grammar anyway, so the list is
/// belt-and-suspenders that yields a clearer authoring error.
const FORBIDDEN_TOKENS: &[&str] = &[
    "import",
    "require",
    "window",
    "document",
    "globalThis",
    "fetch",
    "XMLHttpRequest",
    "localStorage",
    "sessionStorage",
    "indexedDB",
    "eval",
    "Function",
    "process",
];

/// A parsed boolean expression, kept alongside its source for round trips.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CodeExpr {
    source: String,
    ast: Expr,
}

impl CodeExpr {
    /// Parses an expression; failure is a load-time configuration error.
    pub fn parse(source: &str) -> Result<Self, ExprError> {
        if let Some(token) = FORBIDDEN_TOKENS.iter().find(|t| source.contains(**t)) {
            return Err(ExprError::ForbiddenToken((*token).to_owned()));
        }
        let tokens = lex(source)?;
        let mut parser = Parser { tokens, pos: 0 };
        let ast = parser.parse_or()?;
        if let Some(extra) = parser.peek() {
            return Err(ExprError::UnexpectedToken(extra.to_string()));
        }
        Ok(Self {
            source: source.to_owned(),
            ast,
        })
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    /// Evaluates against `scope`. Any evaluation error is logged at debug
    /// level and coerced to `false`.
    pub fn eval_bool(&self, scope: &dyn EvalScope) -> bool {
        match eval(&self.ast, scope) {
            Ok(value) => value.is_truthy(),
            Err(err) => {
                tracing::debug!(source = %self.source, ?err, "expression evaluation failed");
                false
            }
        }
    }

    /// Advisory validation of raw source.
    pub fn validate_source(source: &str) -> Validation {
        match Self::parse(source) {
            Ok(_) => Validation::ok(),
            Err(err) => Validation::fail(err.to_string()),
        }
    }
}

impl TryFrom<String> for CodeExpr {
    type Error = ExprError;

    fn try_from(source: String) -> Result<Self, Self::Error> {
        Self::parse(&source)
    }
}

impl From<CodeExpr> for String {
    fn from(expr: CodeExpr) -> Self {
        expr.source
    }
}
