//! Interpreter module
//!
//! Tree-walking evaluation of parsed Raven programs.

pub mod builtins;
pub mod control_flow;
pub mod errors;
pub mod functions;
pub mod interpreter;
pub mod pipeline_execution;
pub mod redirections;
pub mod streams;
pub mod types;

pub use errors::{EvalResult, Interrupt, RuntimeError};
pub use interpreter::{Interpreter, InterpreterOptions};
pub use streams::{InputSource, OutputSink};
pub use types::{ExecutionLimits, Function, Value};
