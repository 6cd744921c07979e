//! Runtime Errors and Control Flow
//!
//! `RuntimeError` is what a script reports to the user. `Interrupt` is the
//! channel that carries break/continue/return (and errors) up the evaluation
//! stack until a loop, a function call or the top level intercepts it.

use thiserror::Error;

use super::types::Value;
use crate::commands::CommandError;
use crate::fs::FsError;

/// Errors that abort evaluation.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RuntimeError {
    #[error("{command}: {source}")]
    Command {
        command: &'static str,
        #[source]
        source: CommandError,
    },

    #[error("unknown command: {0}")]
    UnknownCommand(String),

    #[error("division by zero")]
    DivisionByZero,

    #[error("modulo by zero")]
    ModuloByZero,

    #[error("unknown operator: {0}")]
    UnknownOperator(String),

    #[error("unsupported operand types for {operator}: {left} and {right}")]
    UnsupportedOperands {
        operator: String,
        left: &'static str,
        right: &'static str,
    },

    #[error("invalid regex: {0}")]
    InvalidRegex(String),

    #[error("unknown function: {0}")]
    UnknownFunction(String),

    #[error("wrong number of arguments: expected {expected}, got {got}")]
    WrongArgumentCount { expected: usize, got: usize },

    /// Argument-count or argument-type problem in a builtin function
    #[error("{0}")]
    Builtin(String),

    #[error("cannot iterate over {0}")]
    NotIterable(&'static str),

    #[error("key not found: {0}")]
    KeyNotFound(String),

    #[error("array index out of bounds: {0}")]
    IndexOutOfBounds(i64),

    #[error("array index must be an integer")]
    IndexNotInteger,

    #[error("index operator not supported on {0}")]
    IndexNotSupported(&'static str),

    #[error("cannot create file {target}: {source}")]
    CannotCreateFile {
        target: String,
        #[source]
        source: FsError,
    },

    #[error("cannot open file {target}: {source}")]
    CannotOpenFile {
        target: String,
        #[source]
        source: FsError,
    },

    #[error("heredoc not yet implemented")]
    HeredocNotImplemented,

    #[error("maximum call depth exceeded ({0})")]
    MaxCallDepthExceeded(u32),

    #[error("output error: {0}")]
    Output(String),

    #[error("break outside of loop")]
    BreakOutsideLoop,

    #[error("continue outside of loop")]
    ContinueOutsideLoop,

    #[error("return outside of function")]
    ReturnOutsideFunction,
}

impl RuntimeError {
    pub fn builtin(message: impl Into<String>) -> Self {
        RuntimeError::Builtin(message.into())
    }
}

/// Non-local exit from a block.
#[derive(Debug, Clone, PartialEq)]
pub enum Interrupt {
    Break,
    Continue,
    Return(Value),
    Error(RuntimeError),
}

impl Interrupt {
    /// Convert a signal that escaped every loop and function into an error.
    pub fn into_error(self) -> RuntimeError {
        match self {
            Interrupt::Break => RuntimeError::BreakOutsideLoop,
            Interrupt::Continue => RuntimeError::ContinueOutsideLoop,
            Interrupt::Return(_) => RuntimeError::ReturnOutsideFunction,
            Interrupt::Error(err) => err,
        }
    }
}

impl From<RuntimeError> for Interrupt {
    fn from(err: RuntimeError) -> Self {
        Interrupt::Error(err)
    }
}

/// Result of evaluating a statement or expression.
pub type EvalResult<T> = Result<T, Interrupt>;
