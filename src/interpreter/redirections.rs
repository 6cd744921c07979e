//! Redirection Handling
//!
//! `cmd > file` (truncate), `cmd >> file` (append) and `cmd < file`. The
//! file is opened before `cmd` runs, swapped in as the active stream, and
//! closed after the previous stream is restored, whatever `cmd` returned.
//! Heredocs (`<<`) parse but do not evaluate.

use std::io::Write;
use std::mem;

use tracing::debug;

use super::errors::{EvalResult, RuntimeError};
use super::interpreter::Interpreter;
use super::streams::{InputSource, OutputSink};
use super::types::Value;
use crate::ast::{RedirectionExpression, RedirectionKind};
use crate::fs::WriteMode;

impl Interpreter {
    pub(super) fn eval_redirection(&mut self, node: &RedirectionExpression) -> EvalResult<Value> {
        let target = self.eval_expression(&node.target)?.to_string();
        if node.kind == RedirectionKind::Heredoc {
            return Err(RuntimeError::HeredocNotImplemented.into());
        }

        let path = self.resolve_path(&target);
        debug!(kind = node.kind.as_str(), path = path.as_str(), "redirecting");

        match node.kind {
            RedirectionKind::Output | RedirectionKind::Append => {
                let (mode, truncate) = match node.kind {
                    RedirectionKind::Output => (WriteMode::Truncate, true),
                    _ => (WriteMode::Append, false),
                };
                let writer = self.fs.open_for_write(&path, mode).map_err(|source| {
                    if truncate {
                        RuntimeError::CannotCreateFile { target: target.clone(), source }
                    } else {
                        RuntimeError::CannotOpenFile { target: target.clone(), source }
                    }
                })?;

                let previous = mem::replace(&mut self.stdout, OutputSink::Stream(writer));
                let result = self.eval_expression(&node.command);
                let mut file = mem::replace(&mut self.stdout, previous);
                let flushed = file.flush();
                drop(file);

                let value = result?;
                flushed.map_err(|e| RuntimeError::Output(e.to_string()))?;
                Ok(value)
            }
            RedirectionKind::Input => {
                let reader = self
                    .fs
                    .open_for_read(&path)
                    .map_err(|source| RuntimeError::CannotOpenFile { target: target.clone(), source })?;

                let previous = mem::replace(&mut self.stdin, InputSource::Stream(reader));
                let result = self.eval_expression(&node.command);
                self.stdin = previous;
                result
            }
            RedirectionKind::Heredoc => Err(RuntimeError::HeredocNotImplemented.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use crate::fs::{FileSystem, InMemoryFs};
    use crate::interpreter::errors::RuntimeError;
    use crate::interpreter::interpreter::{Interpreter, InterpreterOptions};
    use crate::interpreter::streams::OutputSink;
    use crate::parser::parse;

    fn setup() -> (Arc<InMemoryFs>, Interpreter) {
        let fs = Arc::new(InMemoryFs::new());
        let mut interp = Interpreter::new(fs.clone(), InterpreterOptions::default());
        interp.set_output(OutputSink::buffer());
        (fs, interp)
    }

    fn run(interp: &mut Interpreter, source: &str) -> Result<(), RuntimeError> {
        interp.eval(&parse(source).expect("source should parse"))
    }

    fn read(fs: &InMemoryFs, path: &str) -> String {
        String::from_utf8(fs.read_file(path).unwrap()).unwrap()
    }

    fn output(interp: &mut Interpreter) -> String {
        String::from_utf8(interp.set_output(OutputSink::buffer()).into_bytes()).unwrap()
    }

    #[test]
    fn test_output_truncates() {
        let (fs, mut interp) = setup();
        fs.write_file_sync("/home/user/out.txt", b"old content\n");
        run(&mut interp, "print hello > out.txt").unwrap();
        assert_eq!(read(&fs, "/home/user/out.txt"), "hello\n");
        assert_eq!(output(&mut interp), "");
    }

    #[test]
    fn test_append() {
        let (fs, mut interp) = setup();
        run(&mut interp, "print one > log.txt\nprint two >> log.txt").unwrap();
        assert_eq!(read(&fs, "/home/user/log.txt"), "one\ntwo\n");
    }

    #[test]
    fn test_pipe_then_redirect() {
        let (fs, mut interp) = setup();
        fs.mkdir_sync("/home/user/docs");
        run(&mut interp, "ls | print > listing.txt").unwrap();
        assert_eq!(read(&fs, "/home/user/listing.txt"), "docs/\n");
    }

    #[test]
    fn test_input_redirection() {
        let (fs, mut interp) = setup();
        fs.write_file_sync("/home/user/in.txt", b"from file\n");
        run(&mut interp, "print < in.txt").unwrap();
        assert_eq!(output(&mut interp), "from file\n");
    }

    #[test]
    fn test_missing_input_file() {
        let (_, mut interp) = setup();
        let err = run(&mut interp, "print < nope.txt").unwrap_err();
        assert!(err.to_string().starts_with("cannot open file /home/user/nope.txt: "));
    }

    #[test]
    fn test_unwritable_target() {
        let (_, mut interp) = setup();
        let err = run(&mut interp, "print x > /no/such/dir/file.txt").unwrap_err();
        assert!(err.to_string().starts_with("cannot create file /no/such/dir/file.txt: "));
    }

    #[test]
    fn test_target_from_variable() {
        let (fs, mut interp) = setup();
        run(&mut interp, "name = \"saved.txt\"\nprint data > name").unwrap();
        assert_eq!(read(&fs, "/home/user/saved.txt"), "data\n");
    }

    #[test]
    fn test_stdout_restored_after_failure() {
        let (fs, mut interp) = setup();
        assert!(run(&mut interp, "mkdir > err.txt").is_err());
        assert!(fs.exists("/home/user/err.txt"));
        run(&mut interp, "print visible").unwrap();
        assert_eq!(output(&mut interp), "visible\n");
    }

    #[test]
    fn test_heredoc_not_implemented() {
        let (_, mut interp) = setup();
        assert_eq!(run(&mut interp, "print << EOF"), Err(RuntimeError::HeredocNotImplemented));
    }
}
