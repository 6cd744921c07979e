//! Raven Shell Environment
//!
//! Embedding facade that ties together the parser, interpreter and filesystem,
//! plus the startup file and the interactive read-eval loop.

use std::collections::HashMap;
use std::io::{self, BufRead, Write};
use std::sync::Arc;

use serde::Serialize;
use thiserror::Error;
use tracing::debug;

use crate::ast::Program;
use crate::fs::{resolve_path, FileSystem, FsError, InMemoryFs};
use crate::interpreter::{
    ExecutionLimits, InputSource, Interpreter, InterpreterOptions, OutputSink, RuntimeError, Value,
};
use crate::parser::{parse, ParseError};

/// Name of the startup file read from the home directory.
pub const RC_FILE: &str = ".ravenrc";

const PROMPT: &str = "# ";
const WELCOME: &str = "Welcome to Raven Shell.";
const GOODBYE: &str = "Goodbye!";

/// Options for creating a shell.
#[derive(Default)]
pub struct ShellOptions {
    /// Working directory (defaults to the filesystem's working directory)
    pub cwd: Option<String>,
    /// Environment overlay for `$NAME` lookups
    pub env: HashMap<String, String>,
    /// File system instance (defaults to InMemoryFs)
    pub fs: Option<Arc<dyn FileSystem>>,
    /// Execution limits
    pub limits: ExecutionLimits,
}

/// Why a script did not run to completion.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ShellError {
    #[error("{}", render_parse_errors(.0))]
    Parse(Vec<ParseError>),

    #[error("error: {0}")]
    Runtime(#[from] RuntimeError),
}

fn render_parse_errors(errors: &[ParseError]) -> String {
    errors
        .iter()
        .map(|e| format!("parse error: {}", e))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Resolve a starting directory against the filesystem's working directory.
///
/// Fails unless the result is an existing directory.
pub fn resolve_start_dir(fs: &dyn FileSystem, dir: &str) -> Result<String, FsError> {
    let base = fs.current_working_directory()?;
    let home = fs.home_directory().ok();
    let path = resolve_path(&base, home.as_deref(), dir);
    if !fs.stat(&path)?.is_directory {
        return Err(FsError::NotDirectory { path, operation: "chdir".to_string() });
    }
    Ok(path)
}

/// Captured outcome of one script run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ExecResult {
    pub stdout: String,
    pub stderr: String,
    #[serde(rename = "exitCode")]
    pub exit_code: i32,
}

/// A Raven shell session. Variables and functions persist across `exec` calls.
pub struct Shell {
    fs: Arc<dyn FileSystem>,
    interpreter: Interpreter,
}

impl Shell {
    pub fn new(options: ShellOptions) -> Self {
        let fs: Arc<dyn FileSystem> = options.fs.unwrap_or_else(|| Arc::new(InMemoryFs::new()));
        let interpreter = Interpreter::new(
            fs.clone(),
            InterpreterOptions {
                cwd: options.cwd,
                env: options.env,
                limits: options.limits,
            },
        );
        Self { fs, interpreter }
    }

    pub fn fs(&self) -> &Arc<dyn FileSystem> {
        &self.fs
    }

    pub fn interpreter(&self) -> &Interpreter {
        &self.interpreter
    }

    pub fn interpreter_mut(&mut self) -> &mut Interpreter {
        &mut self.interpreter
    }

    pub fn cwd(&self) -> &str {
        self.interpreter.cwd()
    }

    pub fn variable(&self, name: &str) -> Option<&Value> {
        self.interpreter.variable(name)
    }

    /// Parse and evaluate `source`, writing to the current output sink.
    pub fn exec(&mut self, source: &str) -> Result<(), ShellError> {
        let program = parse(source).map_err(ShellError::Parse)?;
        self.run(&program)
    }

    /// Evaluate an already parsed program.
    pub fn run(&mut self, program: &Program) -> Result<(), ShellError> {
        let result = self.interpreter.eval(program);
        if let Err(err) = self.interpreter.flush_output() {
            debug!(error = %err, "flush after run failed");
        }
        result.map_err(ShellError::from)
    }

    /// Run `source` with output captured into an `ExecResult`.
    pub fn run_captured(&mut self, source: &str) -> ExecResult {
        let previous = self.interpreter.set_output(OutputSink::buffer());
        let outcome = self.exec(source);
        let captured = self.interpreter.set_output(previous).into_bytes();

        let mut result = ExecResult {
            stdout: String::from_utf8_lossy(&captured).into_owned(),
            ..Default::default()
        };
        if let Err(err) = outcome {
            result.stderr = format!("{}\n", err);
            result.exit_code = 1;
        }
        result
    }

    /// Feed `input` to the next evaluations as redirected stdin.
    pub fn set_input(&mut self, input: InputSource) -> InputSource {
        self.interpreter.set_input(input)
    }

    pub fn set_output(&mut self, sink: OutputSink) -> OutputSink {
        self.interpreter.set_output(sink)
    }

    /// Evaluate `~/.ravenrc` line by line if it exists.
    ///
    /// Failing lines are reported to `err` and skipped. Returns the number of
    /// lines that evaluated cleanly.
    pub fn load_rc_file<W: Write>(&mut self, err: &mut W) -> io::Result<usize> {
        let home = match self.fs.home_directory() {
            Ok(home) => home,
            Err(_) => return Ok(0),
        };
        let path = format!("{}/{}", home.trim_end_matches('/'), RC_FILE);
        let content = match self.fs.read_file(&path) {
            Ok(content) => content,
            Err(e) if e.is_not_found() => return Ok(0),
            Err(e) => {
                writeln!(err, "{}: {}", RC_FILE, e)?;
                return Ok(0);
            }
        };
        debug!(path = %path, "loading startup file");

        let mut loaded = 0;
        for line in String::from_utf8_lossy(&content).lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            match self.exec(line) {
                Ok(()) => loaded += 1,
                Err(e) => writeln!(err, "{}: {}", RC_FILE, e)?,
            }
        }
        Ok(loaded)
    }

    /// Interactive loop: one statement line per prompt until EOF or `exit`.
    pub fn repl<R: BufRead, W: Write>(&mut self, input: R, mut out: W) -> io::Result<()> {
        writeln!(out, "{}", WELCOME)?;
        write!(out, "{}", PROMPT)?;
        out.flush()?;

        for line in input.lines() {
            let line = line?;
            let trimmed = line.trim();
            if trimmed == "exit" || trimmed == "quit" {
                writeln!(out, "{}", GOODBYE)?;
                return Ok(());
            }
            if !trimmed.is_empty() {
                if let Err(err) = self.exec(trimmed) {
                    writeln!(out, "{}", err)?;
                }
            }
            write!(out, "{}", PROMPT)?;
            out.flush()?;
        }
        writeln!(out)?;
        Ok(())
    }
}

impl Default for Shell {
    fn default() -> Self {
        Self::new(ShellOptions::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn memory_shell() -> (Arc<InMemoryFs>, Shell) {
        let fs = Arc::new(InMemoryFs::new());
        let shell = Shell::new(ShellOptions {
            fs: Some(fs.clone()),
            ..Default::default()
        });
        (fs, shell)
    }

    #[test]
    fn test_run_captured_success() {
        let (_, mut shell) = memory_shell();
        let result = shell.run_captured("print \"hi\"");
        assert_eq!(result.stdout, "hi\n");
        assert_eq!(result.stderr, "");
        assert_eq!(result.exit_code, 0);
    }

    #[test]
    fn test_run_captured_runtime_error() {
        let (_, mut shell) = memory_shell();
        let result = shell.run_captured("print \"a\"\nx = 1 / 0");
        assert_eq!(result.stdout, "a\n");
        assert_eq!(result.stderr, "error: division by zero\n");
        assert_eq!(result.exit_code, 1);
    }

    #[test]
    fn test_parse_error_runs_nothing() {
        let (_, mut shell) = memory_shell();
        let result = shell.run_captured("print \"a\"\nx = )");
        assert_eq!(result.stdout, "");
        assert!(result.stderr.starts_with("parse error: "));
        assert_eq!(result.exit_code, 1);
    }

    #[test]
    fn test_state_persists_between_runs() {
        let (_, mut shell) = memory_shell();
        shell.exec("fn double(n) { return n * 2 }").unwrap();
        shell.exec("x = double(21)").unwrap();
        assert_eq!(shell.variable("x"), Some(&Value::Integer(42)));
    }

    #[test]
    fn test_exec_result_json() {
        let result = ExecResult {
            stdout: "ok\n".to_string(),
            stderr: String::new(),
            exit_code: 0,
        };
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json, serde_json::json!({"stdout": "ok\n", "stderr": "", "exitCode": 0}));
    }

    #[test]
    fn test_resolve_start_dir() {
        let fs = InMemoryFs::new();
        fs.mkdir_sync("/home/user/sub");
        fs.write_file_sync("/home/user/file.txt", b"");

        assert_eq!(resolve_start_dir(&fs, "sub").unwrap(), "/home/user/sub");
        assert_eq!(resolve_start_dir(&fs, "sub/..").unwrap(), "/home/user");
        assert_eq!(resolve_start_dir(&fs, "/").unwrap(), "/");
        assert!(resolve_start_dir(&fs, "missing").unwrap_err().is_not_found());
        assert_eq!(
            resolve_start_dir(&fs, "file.txt"),
            Err(FsError::NotDirectory { path: "/home/user/file.txt".to_string(), operation: "chdir".to_string() })
        );
    }

    #[test]
    fn test_load_rc_file() {
        let (fs, mut shell) = memory_shell();
        fs.write_file_sync(
            "/home/user/.ravenrc",
            b"# greeting\ngreeting = \"hello\"\n\nbad = 1 / 0\ncount = 3\n",
        );
        let mut err = Vec::new();
        let loaded = shell.load_rc_file(&mut err).unwrap();
        assert_eq!(loaded, 2);
        assert_eq!(shell.variable("greeting"), Some(&Value::from("hello")));
        assert_eq!(shell.variable("count"), Some(&Value::Integer(3)));
        assert_eq!(String::from_utf8(err).unwrap(), ".ravenrc: error: division by zero\n");
    }

    #[test]
    fn test_missing_rc_file_is_ignored() {
        let (_, mut shell) = memory_shell();
        let mut err = Vec::new();
        assert_eq!(shell.load_rc_file(&mut err).unwrap(), 0);
        assert!(err.is_empty());
    }

    #[test]
    fn test_repl_session() {
        let (_, mut shell) = memory_shell();
        shell.set_output(OutputSink::buffer());
        let input = Cursor::new("x = 2\n\ny = x +\nexit\nx = 5\n");
        let mut out = Vec::new();
        shell.repl(input, &mut out).unwrap();

        let transcript = String::from_utf8(out).unwrap();
        assert!(transcript.starts_with("Welcome to Raven Shell.\n# "));
        assert!(transcript.contains("parse error: "));
        assert!(transcript.ends_with("Goodbye!\n"));
        assert_eq!(shell.variable("x"), Some(&Value::Integer(2)));
    }

    #[test]
    fn test_repl_output_goes_to_sink() {
        let (_, mut shell) = memory_shell();
        shell.set_output(OutputSink::buffer());
        let mut out = Vec::new();
        shell.repl(Cursor::new("print \"hey\"\n"), &mut out).unwrap();
        let printed = shell.set_output(OutputSink::Stdout).into_bytes();
        assert_eq!(printed, b"hey\n");
        assert!(String::from_utf8(out).unwrap().ends_with("# \n"));
    }
}
