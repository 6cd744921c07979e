//! Parser Types and Constants
//!
//! The parse error type and the precedence table shared by the Pratt loop.

use std::fmt;

use thiserror::Error;

use crate::parser::lexer::{Token, TokenType};

/// Max nesting of grouped or bracketed expressions before the parser gives up
pub const MAX_PARSER_DEPTH: usize = 200;

/// A parse error, recorded with the position of the offending token.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub struct ParseError {
    pub message: String,
    pub line: usize,
    pub column: usize,
}

impl ParseError {
    pub fn new(message: impl Into<String>, line: usize, column: usize) -> Self {
        Self { message: message.into(), line, column }
    }

    pub fn at(token: &Token, message: impl Into<String>) -> Self {
        Self::new(message, token.line, token.column)
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (line {}, column {})", self.message, self.line, self.column)
    }
}

/// Binding power, lowest to highest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Precedence {
    Lowest,
    Redirect,    // > >> < <<
    Pipe,        // |
    LogicalOr,   // ||
    LogicalAnd,  // &&
    Equals,      // == != =~
    LessGreater, // < > <= >=
    Sum,         // + -
    Product,     // * / %
    Prefix,      // ! $
    Index,       // a[i]
    Command,
}

/// Precedence of a token appearing in infix position.
///
/// `>` and `<` report `Redirect` here; the parser upgrades them to
/// comparisons when the left operand is not command-like.
pub fn infix_precedence(token_type: TokenType) -> Precedence {
    match token_type {
        TokenType::Greater | TokenType::Into | TokenType::Less | TokenType::Out => Precedence::Redirect,
        TokenType::Pipe => Precedence::Pipe,
        TokenType::Or => Precedence::LogicalOr,
        TokenType::And => Precedence::LogicalAnd,
        TokenType::Eq | TokenType::NotEq | TokenType::RegexMatch => Precedence::Equals,
        TokenType::GreaterEq | TokenType::LessEq => Precedence::LessGreater,
        TokenType::Plus | TokenType::Minus => Precedence::Sum,
        TokenType::Asterisk | TokenType::FSlash | TokenType::Percent => Precedence::Product,
        TokenType::LBracket => Precedence::Index,
        _ => Precedence::Lowest,
    }
}

/// Token kinds that may start a command argument.
pub fn is_argument_token(token_type: TokenType) -> bool {
    matches!(
        token_type,
        TokenType::Ident
            | TokenType::String
            | TokenType::Integer
            | TokenType::Dollar
            | TokenType::FullStop
            | TokenType::FSlash
            | TokenType::Tilde
    )
}

/// Token kinds that continue a path once one has started.
/// Command keywords count, so `./ls/rm.txt` is one path.
pub fn is_path_token(token_type: TokenType) -> bool {
    matches!(token_type, TokenType::Ident | TokenType::FullStop | TokenType::FSlash) || token_type.is_command()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_precedence_ordering() {
        assert!(Precedence::Lowest < Precedence::Redirect);
        assert!(Precedence::Redirect < Precedence::Pipe);
        assert!(Precedence::Pipe < Precedence::Prefix);
        assert!(Precedence::Prefix < Precedence::Command);
    }

    #[test]
    fn test_infix_precedence() {
        assert_eq!(infix_precedence(TokenType::Pipe), Precedence::Pipe);
        assert_eq!(infix_precedence(TokenType::Into), Precedence::Redirect);
        assert_eq!(infix_precedence(TokenType::Asterisk), Precedence::Product);
        assert_eq!(infix_precedence(TokenType::LBrace), Precedence::Lowest);
    }

    #[test]
    fn test_parse_error_display() {
        let err = ParseError::new("expected identifier after $", 2, 7);
        assert_eq!(err.to_string(), "expected identifier after $ (line 2, column 7)");
    }
}
