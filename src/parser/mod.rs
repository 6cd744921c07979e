//! Parser module for raven scripts
//!
//! This module contains the lexer and the Pratt parser.

pub mod lexer;
pub mod parser;
pub mod types;

// Re-exports
pub use lexer::{Lexer, Token, TokenType};
pub use parser::{parse, Parser};
pub use types::{ParseError, Precedence};
