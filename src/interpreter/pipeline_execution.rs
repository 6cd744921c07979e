//! Pipeline Execution
//!
//! Handles `left | right`: the left side runs to completion with its output
//! captured, then the right side runs with that capture as its input.

use std::mem;

use tracing::trace;

use super::errors::EvalResult;
use super::interpreter::Interpreter;
use super::streams::{InputSource, OutputSink};
use super::types::Value;
use crate::ast::PipeExpression;

impl Interpreter {
    pub(super) fn eval_pipe(&mut self, pipe: &PipeExpression) -> EvalResult<Value> {
        let previous_out = mem::replace(&mut self.stdout, OutputSink::buffer());
        let left = self.eval_expression(&pipe.left);
        let captured = mem::replace(&mut self.stdout, previous_out);
        left?;

        let bytes = captured.into_bytes();
        trace!(bytes = bytes.len(), "pipe handoff");

        let previous_in = mem::replace(&mut self.stdin, InputSource::from_bytes(bytes));
        let result = self.eval_expression(&pipe.right);
        self.stdin = previous_in;
        result
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use crate::fs::InMemoryFs;
    use crate::interpreter::errors::RuntimeError;
    use crate::interpreter::interpreter::{Interpreter, InterpreterOptions};
    use crate::interpreter::streams::{InputSource, OutputSink};
    use crate::interpreter::types::Value;
    use crate::parser::parse;

    fn setup() -> (Arc<InMemoryFs>, Interpreter) {
        let fs = Arc::new(InMemoryFs::new());
        fs.write_file_sync("/home/user/b.txt", b"");
        fs.mkdir_sync("/home/user/a");
        let mut interp = Interpreter::new(fs.clone(), InterpreterOptions::default());
        interp.set_output(OutputSink::buffer());
        (fs, interp)
    }

    fn run(interp: &mut Interpreter, source: &str) -> Result<(), RuntimeError> {
        interp.eval(&parse(source).expect("source should parse"))
    }

    fn output(interp: &mut Interpreter) -> String {
        String::from_utf8(interp.set_output(OutputSink::buffer()).into_bytes()).unwrap()
    }

    #[test]
    fn test_pipe_feeds_right_side() {
        let (_, mut interp) = setup();
        run(&mut interp, "ls | print").unwrap();
        assert_eq!(output(&mut interp), "a/\nb.txt\n");
    }

    #[test]
    fn test_chained_pipes() {
        let (_, mut interp) = setup();
        run(&mut interp, "x = ls | print | output").unwrap();
        assert_eq!(output(&mut interp), "a/\nb.txt\n");
        assert_eq!(interp.variable("x"), Some(&Value::from("a/\nb.txt\n")));
    }

    #[test]
    fn test_streams_restored_after_pipe() {
        let (_, mut interp) = setup();
        run(&mut interp, "ls | print\nprint after").unwrap();
        assert_eq!(output(&mut interp), "a/\nb.txt\nafter\n");
        assert!(matches!(interp.set_input(InputSource::Stdin), InputSource::Stdin));
    }

    #[test]
    fn test_left_failure_skips_right_side() {
        let (fs, mut interp) = setup();
        let err = run(&mut interp, "ls missing | mkdir made").unwrap_err();
        assert!(err.to_string().starts_with("ls: "));
        assert!(fs.get_all_paths().iter().all(|p| p != "/home/user/made"));
        run(&mut interp, "print ok").unwrap();
        assert_eq!(output(&mut interp), "ok\n");
    }
}
