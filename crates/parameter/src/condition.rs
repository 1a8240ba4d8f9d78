//! Visibility conditions.
//!
//! A condition is a small boolean expression over literals and parameter
//! references:
//!
//! ```text
//! or      := and ( '||' and )*
//! and     := compare ( '&&' compare )*
//! compare := unary ( ( '==' | '!=' ) unary )*
//! unary   := '!' unary | atom
//! atom    := 'true' | 'false' | '$' NAME | QUOTED_STRING | INTEGER | '(' or ')'
//! ```
//!
//! References resolve through a lookup supplied by the caller; names the
//! lookup does not know evaluate as `null`. Boolean positions use
//! [`is_truthy`], comparisons compare display strings.
//!
//! ```rust
//! use anvil_parameter::condition::Condition;
//! use serde_json::json;
//!
//! let condition = Condition::parse("$db_type == 'mysql' && !$embedded").unwrap();
//! let visible = condition.evaluate(|name| match name {
//!     "db_type" => Some(json!("mysql")),
//!     "embedded" => Some(json!(false)),
//!     _ => None,
//! });
//! assert!(visible);
//! ```

use std::fmt;
use std::str::FromStr;

use anvil_validator::value::{is_truthy, to_display};
use serde_json::Value;

/// Why a condition failed to parse.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConditionError {
    #[error("unexpected character `{found}` at offset {offset}")]
    UnexpectedCharacter { found: char, offset: usize },

    #[error("unterminated string at offset {offset}")]
    UnterminatedString { offset: usize },

    #[error("invalid integer `{literal}` at offset {offset}")]
    InvalidInteger { literal: String, offset: usize },

    #[error("unexpected `{found}` at offset {offset}")]
    UnexpectedToken { found: String, offset: usize },

    #[error("unexpected end of condition")]
    UnexpectedEnd,
}

#[derive(Debug, Clone, PartialEq)]
enum TokenKind<'a> {
    True,
    False,
    /// `$name` without the sigil.
    Reference(&'a str),
    /// Bare word that is not a keyword.
    Word(&'a str),
    Text(&'a str),
    Integer(i64),
    Not,
    And,
    Or,
    Equal,
    NotEqual,
    LeftParen,
    RightParen,
    Eof,
}

impl fmt::Display for TokenKind<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::True => f.write_str("true"),
            Self::False => f.write_str("false"),
            Self::Reference(name) => write!(f, "${name}"),
            Self::Word(word) => f.write_str(word),
            Self::Text(text) => write!(f, "'{text}'"),
            Self::Integer(n) => write!(f, "{n}"),
            Self::Not => f.write_str("!"),
            Self::And => f.write_str("&&"),
            Self::Or => f.write_str("||"),
            Self::Equal => f.write_str("=="),
            Self::NotEqual => f.write_str("!="),
            Self::LeftParen => f.write_str("("),
            Self::RightParen => f.write_str(")"),
            Self::Eof => f.write_str("end of condition"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
struct Token<'a> {
    kind: TokenKind<'a>,
    offset: usize,
}

fn is_name_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_' || c == ':'
}

fn tokenize(input: &str) -> Result<Vec<Token<'_>>, ConditionError> {
    let mut tokens = Vec::new();
    let mut position = 0;

    loop {
        let rest = &input[position..];
        let trimmed = rest.trim_start();
        position += rest.len() - trimmed.len();
        let offset = position;

        let Some(ch) = trimmed.chars().next() else {
            tokens.push(Token {
                kind: TokenKind::Eof,
                offset,
            });
            return Ok(tokens);
        };

        let (kind, len) = match ch {
            '(' => (TokenKind::LeftParen, 1),
            ')' => (TokenKind::RightParen, 1),
            '&' if trimmed.starts_with("&&") => (TokenKind::And, 2),
            '|' if trimmed.starts_with("||") => (TokenKind::Or, 2),
            '=' if trimmed.starts_with("==") => (TokenKind::Equal, 2),
            '!' if trimmed.starts_with("!=") => (TokenKind::NotEqual, 2),
            '!' => (TokenKind::Not, 1),
            '\'' | '"' => {
                let body = &trimmed[1..];
                let end = body
                    .find(ch)
                    .ok_or(ConditionError::UnterminatedString { offset })?;
                (TokenKind::Text(&body[..end]), end + 2)
            }
            '$' => {
                let name_len = trimmed[1..]
                    .find(|c: char| !is_name_char(c))
                    .unwrap_or(trimmed.len() - 1);
                if name_len == 0 {
                    return Err(ConditionError::UnexpectedCharacter { found: '$', offset });
                }
                (TokenKind::Reference(&trimmed[1..=name_len]), name_len + 1)
            }
            '-' | '0'..='9' => {
                let len = trimmed
                    .char_indices()
                    .skip(1)
                    .find(|(_, c)| !c.is_ascii_digit())
                    .map_or(trimmed.len(), |(i, _)| i);
                let literal = &trimmed[..len];
                let number = literal.parse().map_err(|_| ConditionError::InvalidInteger {
                    literal: literal.to_owned(),
                    offset,
                })?;
                (TokenKind::Integer(number), len)
            }
            c if c.is_ascii_alphabetic() || c == '_' => {
                let len = trimmed
                    .find(|c: char| !is_name_char(c))
                    .unwrap_or(trimmed.len());
                let kind = match &trimmed[..len] {
                    "true" => TokenKind::True,
                    "false" => TokenKind::False,
                    word => TokenKind::Word(word),
                };
                (kind, len)
            }
            other => {
                return Err(ConditionError::UnexpectedCharacter {
                    found: other,
                    offset,
                });
            }
        };

        tokens.push(Token { kind, offset });
        position += len;
    }
}

#[derive(Debug, Clone, PartialEq)]
enum Expr {
    Literal(Value),
    Reference(String),
    Not(Box<Expr>),
    And(Box<Expr>, Box<Expr>),
    Or(Box<Expr>, Box<Expr>),
    Equal(Box<Expr>, Box<Expr>),
    NotEqual(Box<Expr>, Box<Expr>),
}

impl Expr {
    fn evaluate(&self, lookup: &dyn Fn(&str) -> Option<Value>) -> Value {
        match self {
            Self::Literal(value) => value.clone(),
            Self::Reference(name) => lookup(name).unwrap_or(Value::Null),
            Self::Not(inner) => Value::Bool(!is_truthy(&inner.evaluate(lookup))),
            Self::And(left, right) => Value::Bool(
                is_truthy(&left.evaluate(lookup)) && is_truthy(&right.evaluate(lookup)),
            ),
            Self::Or(left, right) => Value::Bool(
                is_truthy(&left.evaluate(lookup)) || is_truthy(&right.evaluate(lookup)),
            ),
            Self::Equal(left, right) => Value::Bool(
                to_display(&left.evaluate(lookup)) == to_display(&right.evaluate(lookup)),
            ),
            Self::NotEqual(left, right) => Value::Bool(
                to_display(&left.evaluate(lookup)) != to_display(&right.evaluate(lookup)),
            ),
        }
    }

    fn collect_references<'a>(&'a self, out: &mut Vec<&'a str>) {
        match self {
            Self::Literal(_) => {}
            Self::Reference(name) => {
                if !out.contains(&name.as_str()) {
                    out.push(name);
                }
            }
            Self::Not(inner) => inner.collect_references(out),
            Self::And(left, right)
            | Self::Or(left, right)
            | Self::Equal(left, right)
            | Self::NotEqual(left, right) => {
                left.collect_references(out);
                right.collect_references(out);
            }
        }
    }
}

struct Parser<'a> {
    tokens: Vec<Token<'a>>,
    position: usize,
}

impl<'a> Parser<'a> {
    fn current(&self) -> &Token<'a> {
        &self.tokens[self.position.min(self.tokens.len() - 1)]
    }

    fn advance(&mut self) {
        if self.position < self.tokens.len() - 1 {
            self.position += 1;
        }
    }

    fn unexpected(&self) -> ConditionError {
        let token = self.current();
        match token.kind {
            TokenKind::Eof => ConditionError::UnexpectedEnd,
            ref kind => ConditionError::UnexpectedToken {
                found: kind.to_string(),
                offset: token.offset,
            },
        }
    }

    fn parse_or(&mut self) -> Result<Expr, ConditionError> {
        let mut left = self.parse_and()?;
        while self.current().kind == TokenKind::Or {
            self.advance();
            let right = self.parse_and()?;
            left = Expr::Or(Box::new(left), Box::new(right));
        }
        Ok(left)
    }

    fn parse_and(&mut self) -> Result<Expr, ConditionError> {
        let mut left = self.parse_compare()?;
        while self.current().kind == TokenKind::And {
            self.advance();
            let right = self.parse_compare()?;
            left = Expr::And(Box::new(left), Box::new(right));
        }
        Ok(left)
    }

    fn parse_compare(&mut self) -> Result<Expr, ConditionError> {
        let mut left = self.parse_unary()?;
        loop {
            let equal = match self.current().kind {
                TokenKind::Equal => true,
                TokenKind::NotEqual => false,
                _ => return Ok(left),
            };
            self.advance();
            let right = Box::new(self.parse_unary()?);
            left = if equal {
                Expr::Equal(Box::new(left), right)
            } else {
                Expr::NotEqual(Box::new(left), right)
            };
        }
    }

    fn parse_unary(&mut self) -> Result<Expr, ConditionError> {
        if self.current().kind == TokenKind::Not {
            self.advance();
            return Ok(Expr::Not(Box::new(self.parse_unary()?)));
        }
        self.parse_atom()
    }

    fn parse_atom(&mut self) -> Result<Expr, ConditionError> {
        let expr = match self.current().kind {
            TokenKind::True => Expr::Literal(Value::Bool(true)),
            TokenKind::False => Expr::Literal(Value::Bool(false)),
            TokenKind::Reference(name) => Expr::Reference(name.to_owned()),
            TokenKind::Text(text) => Expr::Literal(Value::String(text.to_owned())),
            TokenKind::Integer(n) => Expr::Literal(Value::from(n)),
            TokenKind::LeftParen => {
                self.advance();
                let inner = self.parse_or()?;
                if self.current().kind != TokenKind::RightParen {
                    return Err(self.unexpected());
                }
                inner
            }
            _ => return Err(self.unexpected()),
        };
        self.advance();
        Ok(expr)
    }
}

/// A parsed visibility condition.
#[derive(Debug, Clone, PartialEq)]
pub struct Condition {
    source: String,
    expr: Expr,
}

impl Condition {
    pub fn parse(source: &str) -> Result<Self, ConditionError> {
        let mut parser = Parser {
            tokens: tokenize(source)?,
            position: 0,
        };
        let expr = parser.parse_or()?;
        if parser.current().kind != TokenKind::Eof {
            return Err(parser.unexpected());
        }
        Ok(Self {
            source: source.to_owned(),
            expr,
        })
    }

    /// The condition text as declared.
    #[must_use]
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Parameter names the condition reads, in order of first appearance.
    #[must_use]
    pub fn references(&self) -> Vec<&str> {
        let mut out = Vec::new();
        self.expr.collect_references(&mut out);
        out
    }

    /// Evaluate with `lookup` resolving `$name` references.
    pub fn evaluate(&self, lookup: impl Fn(&str) -> Option<Value>) -> bool {
        is_truthy(&self.expr.evaluate(&lookup))
    }
}

impl FromStr for Condition {
    type Err = ConditionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}
