// src/commands/types.rs
use std::io::{self, Write};

use thiserror::Error;

use crate::fs::{resolve_path, FileSystem, FsError};
use crate::interpreter::streams::{InputSource, OutputSink};

/// Why a builtin command failed. The interpreter prefixes the command name.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CommandError {
    #[error("missing operand")]
    MissingOperand,

    #[error("missing file argument")]
    MissingFileArgument,

    #[error("{0}: not a directory")]
    NotADirectory(String),

    #[error(transparent)]
    Fs(#[from] FsError),

    #[error("{0}")]
    Io(String),
}

impl From<io::Error> for CommandError {
    fn from(err: io::Error) -> Self {
        CommandError::Io(err.to_string())
    }
}

/// Text the command printed, or why it failed
pub type CommandResult = Result<String, CommandError>;

/// Execution context handed to a command
pub struct CommandContext<'a> {
    /// Arguments, already evaluated to text
    pub args: Vec<String>,
    /// Working directory; `cd` updates it in place
    pub cwd: &'a mut String,
    pub fs: &'a dyn FileSystem,
    pub stdin: &'a mut InputSource,
    pub stdout: &'a mut OutputSink,
}

impl<'a> CommandContext<'a> {
    /// Resolve an argument against the working directory and home.
    pub fn resolve(&self, path: &str) -> String {
        let home = self.fs.home_directory().ok();
        resolve_path(self.cwd, home.as_deref(), path)
    }

    /// Write `text` to the active output and hand it back as the result.
    pub fn emit(&mut self, text: String) -> CommandResult {
        self.stdout.write_all(text.as_bytes())?;
        Ok(text)
    }

    /// Like `emit`, but prints a trailing newline that is not part of the result.
    pub fn emit_line(&mut self, text: String) -> CommandResult {
        writeln!(self.stdout, "{}", text)?;
        Ok(text)
    }
}

/// A builtin shell command
pub trait Command: Send + Sync {
    /// Name used to prefix error messages
    fn name(&self) -> &'static str;

    fn execute(&self, ctx: &mut CommandContext<'_>) -> CommandResult;
}
