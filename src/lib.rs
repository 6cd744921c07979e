//! raven-shell - a small scripting shell
//!
//! This library provides the Raven lexer, a Pratt parser producing an AST,
//! and a tree-walking interpreter with builtin shell commands, pipes and
//! redirection over a pluggable filesystem.

pub mod ast;
pub mod commands;
pub mod fs;
pub mod interpreter;
pub mod parser;
pub mod shell;

pub use ast::types::*;
pub use interpreter::{Interpreter, RuntimeError, Value};
pub use parser::{parse, ParseError, Parser};
pub use shell::{ExecResult, Shell, ShellError, ShellOptions};
