//! Abstract Syntax Tree (AST) for Raven scripts
//!
//! Architecture:
//!   Input → Lexer → Parser → AST → Interpreter → Output

pub mod types;

pub use types::*;
