//! Recursive descent parser for declared type names.
//!
//! ```text
//! type := NAME ( '[' arg ( ',' arg )* ']' )?
//! arg  := type | INTEGER | 'default' | QUOTED_STRING
//! ```

use regex::Regex;

use super::DataType;
use crate::error::ValidatorError;

#[derive(Debug, Clone, PartialEq)]
enum TokenKind<'a> {
    /// Type or keyword name, `::` separated segments allowed.
    Name(&'a str),
    Integer(i64),
    /// Quoted string without its delimiters.
    Text(&'a str),
    LeftBracket,
    RightBracket,
    Comma,
    Eof,
}

#[derive(Debug, Clone, PartialEq)]
struct Token<'a> {
    kind: TokenKind<'a>,
    offset: usize,
}

struct Lexer<'a> {
    input: &'a str,
    position: usize,
}

impl<'a> Lexer<'a> {
    fn new(input: &'a str) -> Self {
        Self { input, position: 0 }
    }

    fn tokenize(mut self) -> Result<Vec<Token<'a>>, String> {
        let mut tokens = Vec::new();
        loop {
            let token = self.next_token()?;
            let done = token.kind == TokenKind::Eof;
            tokens.push(token);
            if done {
                return Ok(tokens);
            }
        }
    }

    fn rest(&self) -> &'a str {
        &self.input[self.position..]
    }

    fn next_token(&mut self) -> Result<Token<'a>, String> {
        let trimmed = self.rest().trim_start();
        self.position = self.input.len() - trimmed.len();
        let start = self.position;

        let Some(ch) = trimmed.chars().next() else {
            return Ok(Token {
                kind: TokenKind::Eof,
                offset: start,
            });
        };

        let kind = match ch {
            '[' => {
                self.position += 1;
                TokenKind::LeftBracket
            }
            ']' => {
                self.position += 1;
                TokenKind::RightBracket
            }
            ',' => {
                self.position += 1;
                TokenKind::Comma
            }
            '\'' | '"' => {
                let body = &trimmed[1..];
                let end = body
                    .find(ch)
                    .ok_or_else(|| format!("unterminated string at offset {start}"))?;
                self.position += end + 2;
                TokenKind::Text(&body[..end])
            }
            '-' | '0'..='9' => {
                let len = trimmed
                    .char_indices()
                    .skip(1)
                    .find(|(_, c)| !c.is_ascii_digit())
                    .map_or(trimmed.len(), |(i, _)| i);
                let literal = &trimmed[..len];
                let number = literal
                    .parse()
                    .map_err(|_| format!("invalid integer `{literal}` at offset {start}"))?;
                self.position += len;
                TokenKind::Integer(number)
            }
            c if c.is_ascii_alphabetic() || c == '_' || c == ':' => {
                let len = trimmed
                    .char_indices()
                    .find(|(_, c)| !(c.is_ascii_alphanumeric() || *c == '_' || *c == ':'))
                    .map_or(trimmed.len(), |(i, _)| i);
                self.position += len;
                TokenKind::Name(&trimmed[..len])
            }
            other => return Err(format!("unexpected character `{other}` at offset {start}")),
        };

        Ok(Token {
            kind,
            offset: start,
        })
    }
}

/// Argument inside a parameterised type.
#[derive(Debug, Clone, PartialEq)]
enum Arg {
    Type(DataType),
    Integer(i64),
    Text(String),
    Default,
}

struct Parser<'a> {
    tokens: Vec<Token<'a>>,
    position: usize,
}

impl<'a> Parser<'a> {
    fn current(&self) -> &Token<'a> {
        // The lexer always terminates the stream with Eof.
        &self.tokens[self.position.min(self.tokens.len() - 1)]
    }

    fn advance(&mut self) {
        if self.position < self.tokens.len() - 1 {
            self.position += 1;
        }
    }

    fn expect(&mut self, kind: &TokenKind<'a>, what: &str) -> Result<(), String> {
        if &self.current().kind == kind {
            self.advance();
            Ok(())
        } else {
            Err(format!(
                "expected {what} at offset {}",
                self.current().offset
            ))
        }
    }

    fn parse_type(&mut self) -> Result<DataType, String> {
        let (name, offset) = match self.current().kind {
            TokenKind::Name(name) => (name, self.current().offset),
            TokenKind::Eof => return Err("unexpected end of input".to_owned()),
            _ => {
                return Err(format!(
                    "expected a type name at offset {}",
                    self.current().offset
                ));
            }
        };
        self.advance();

        let args = if self.current().kind == TokenKind::LeftBracket {
            self.advance();
            let mut args = vec![self.parse_arg()?];
            while self.current().kind == TokenKind::Comma {
                self.advance();
                args.push(self.parse_arg()?);
            }
            self.expect(&TokenKind::RightBracket, "`]` or `,`")?;
            args
        } else {
            Vec::new()
        };

        build(name, args).map_err(|reason| format!("{reason} (at offset {offset})"))
    }

    fn parse_arg(&mut self) -> Result<Arg, String> {
        match self.current().kind.clone() {
            TokenKind::Integer(n) => {
                self.advance();
                Ok(Arg::Integer(n))
            }
            TokenKind::Text(text) => {
                self.advance();
                Ok(Arg::Text(text.to_owned()))
            }
            TokenKind::Name("default") => {
                self.advance();
                Ok(Arg::Default)
            }
            _ => self.parse_type().map(Arg::Type),
        }
    }
}

fn type_args(name: &str, args: Vec<Arg>) -> Result<Vec<DataType>, String> {
    args.into_iter()
        .map(|arg| match arg {
            Arg::Type(ty) => Ok(ty),
            _ => Err(format!("`{name}` only accepts types as arguments")),
        })
        .collect()
}

fn text_args(name: &str, args: Vec<Arg>) -> Result<Vec<String>, String> {
    if args.is_empty() {
        return Err(format!("`{name}` requires at least one value"));
    }
    args.into_iter()
        .map(|arg| match arg {
            Arg::Text(text) => Ok(text),
            _ => Err(format!("`{name}` only accepts quoted strings as arguments")),
        })
        .collect()
}

fn bound(arg: Option<&Arg>) -> Result<Option<i64>, String> {
    match arg {
        None | Some(Arg::Default) => Ok(None),
        Some(Arg::Integer(n)) => Ok(Some(*n)),
        Some(_) => Err("`Integer` bounds must be integers or `default`".to_owned()),
    }
}

fn build(name: &str, args: Vec<Arg>) -> Result<DataType, String> {
    let ty = match name {
        "String" => DataType::String,
        "Boolean" => DataType::Boolean,
        "Undef" => DataType::Undef,
        "Integer" => {
            if args.len() > 2 {
                return Err("`Integer` takes at most two bounds".to_owned());
            }
            DataType::Integer {
                min: bound(args.first())?,
                max: bound(args.get(1))?,
            }
        }
        "Array" => match args.into_iter().next() {
            Some(Arg::Type(inner)) => DataType::Array(Box::new(inner)),
            // Size bounds like `Array[1, 5]` are accepted and not enforced.
            _ => DataType::Array(Box::new(DataType::Unspecified)),
        },
        "Hash" => {
            let mut types = args.into_iter().filter_map(|arg| match arg {
                Arg::Type(ty) => Some(ty),
                _ => None,
            });
            let key = types.next().unwrap_or(DataType::Unspecified);
            let value = types.next().unwrap_or(DataType::Unspecified);
            DataType::Hash(Box::new(key), Box::new(value))
        }
        "Optional" => {
            let mut inner = type_args(name, args)?;
            if inner.len() != 1 {
                return Err("`Optional` requires exactly one type".to_owned());
            }
            DataType::Optional(Box::new(inner.remove(0)))
        }
        "Variant" => {
            let members = type_args(name, args)?;
            if members.is_empty() {
                return Err("`Variant` requires at least one type".to_owned());
            }
            DataType::Variant(members)
        }
        "Enum" => DataType::Enum(text_args(name, args)?),
        "Pattern" => {
            let patterns = text_args(name, args)?;
            if let Some(err) = patterns.iter().find_map(|p| Regex::new(p).err()) {
                return Err(format!("`Pattern` has an invalid expression: {err}"));
            }
            DataType::Pattern(patterns)
        }
        _ => DataType::Unspecified,
    };
    Ok(ty)
}

/// Parse a full type name, rejecting trailing input.
pub(super) fn parse(type_name: &str) -> Result<DataType, ValidatorError> {
    let invalid = |reason: String| ValidatorError::InvalidTypeName {
        type_name: type_name.to_owned(),
        reason,
    };

    let tokens = Lexer::new(type_name).tokenize().map_err(invalid)?;
    let mut parser = Parser {
        tokens,
        position: 0,
    };
    let ty = parser.parse_type().map_err(invalid)?;
    if parser.current().kind != TokenKind::Eof {
        return Err(invalid(format!(
            "unexpected trailing input at offset {}",
            parser.current().offset
        )));
    }
    Ok(ty)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lexes_names_numbers_and_strings() {
        let tokens = Lexer::new("Integer[-1, default] 'a b'").tokenize().unwrap();
        let kinds: Vec<_> = tokens.into_iter().map(|t| t.kind).collect();
        assert_eq!(
            kinds,
            vec![
                TokenKind::Name("Integer"),
                TokenKind::LeftBracket,
                TokenKind::Integer(-1),
                TokenKind::Comma,
                TokenKind::Name("default"),
                TokenKind::RightBracket,
                TokenKind::Text("a b"),
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn namespaced_names_are_one_token() {
        let tokens = Lexer::new("Stdlib::Absolutepath").tokenize().unwrap();
        assert_eq!(tokens[0].kind, TokenKind::Name("Stdlib::Absolutepath"));
    }

    #[test]
    fn unterminated_string_is_rejected() {
        assert!(Lexer::new("Enum['a").tokenize().is_err());
    }

    #[test]
    fn integer_bounds() {
        assert_eq!(
            parse("Integer[1, 10]").unwrap(),
            DataType::Integer {
                min: Some(1),
                max: Some(10)
            }
        );
        assert_eq!(
            parse("Integer[default, 10]").unwrap(),
            DataType::Integer {
                min: None,
                max: Some(10)
            }
        );
        assert!(parse("Integer['a']").is_err());
        assert!(parse("Integer[1, 2, 3]").is_err());
    }

    #[test]
    fn malformed_names_are_rejected() {
        for bad in ["", "Array[", "Array[Integer", "Integer]", "Optional", "Variant[1]", "Enum"] {
            assert!(parse(bad).is_err(), "`{bad}` should not parse");
        }
    }

    #[test]
    fn pattern_expressions_must_compile() {
        assert_eq!(
            parse("Pattern['^/', '^~']").unwrap(),
            DataType::Pattern(vec!["^/".into(), "^~".into()])
        );
        let err = parse("Pattern['^/', '(unclosed']").unwrap_err();
        assert_eq!(err.code(), "VALIDATOR_INVALID_TYPE_NAME");
    }
}
