//! Interpreter - AST Execution Engine
//!
//! Tree-walking evaluator for Raven programs. Holds the working directory,
//! the environment overlay, script variables, user functions and the active
//! input/output streams.
//!
//! Delegates to specialized modules for:
//! - Blocks, conditionals, loops and switch (control_flow.rs)
//! - Function definition and calls (functions.rs, builtins.rs)
//! - Pipes (pipeline_execution.rs)
//! - Redirections (redirections.rs)

use std::collections::HashMap;
use std::env;
use std::io::{self, Write};
use std::rc::Rc;
use std::sync::Arc;

use indexmap::IndexMap;
use regex_lite::Regex;
use tracing::debug;

use super::errors::{EvalResult, Interrupt, RuntimeError};
use super::streams::{InputSource, OutputSink};
use super::types::{ExecutionLimits, Function, Value};
use crate::ast::{
    ArrayLiteral, Command, DictLiteral, Expression, IndexExpression, InfixExpression, PrefixExpression, Program,
    Statement,
};
use crate::commands::{CommandContext, CommandRegistry};
use crate::fs::{self, FileSystem};

/// Options for creating an interpreter instance.
#[derive(Debug, Clone, Default)]
pub struct InterpreterOptions {
    /// Starting directory; defaults to the filesystem's working directory
    pub cwd: Option<String>,
    /// Environment overlay consulted before the process environment
    pub env: HashMap<String, String>,
    pub limits: ExecutionLimits,
}

pub struct Interpreter {
    pub(super) cwd: String,
    pub(super) env: HashMap<String, String>,
    pub(super) vars: HashMap<String, Value>,
    pub(super) functions: HashMap<String, Rc<Function>>,
    pub(super) fs: Arc<dyn FileSystem>,
    pub(super) commands: CommandRegistry,
    pub(super) limits: ExecutionLimits,
    pub(super) call_depth: u32,
    pub(super) stdout: OutputSink,
    pub(super) stdin: InputSource,
}

impl Interpreter {
    pub fn new(fs: Arc<dyn FileSystem>, options: InterpreterOptions) -> Self {
        let cwd = match options.cwd {
            Some(cwd) => cwd,
            None => fs.current_working_directory().unwrap_or_else(|_| "/".to_string()),
        };
        Self {
            cwd,
            env: options.env,
            vars: HashMap::new(),
            functions: HashMap::new(),
            fs,
            commands: CommandRegistry::with_builtins(),
            limits: options.limits,
            call_depth: 0,
            stdout: OutputSink::Stdout,
            stdin: InputSource::Stdin,
        }
    }

    /// Evaluate every statement in order, stopping at the first error.
    pub fn eval(&mut self, program: &Program) -> Result<(), RuntimeError> {
        for statement in &program.statements {
            self.eval_statement(statement).map_err(Interrupt::into_error)?;
        }
        Ok(())
    }

    // =========================================================================
    // State accessors
    // =========================================================================

    pub fn cwd(&self) -> &str {
        &self.cwd
    }

    pub fn set_env(&mut self, name: &str, value: &str) {
        self.env.insert(name.to_string(), value.to_string());
    }

    pub fn variable(&self, name: &str) -> Option<&Value> {
        self.vars.get(name)
    }

    pub fn set_variable(&mut self, name: &str, value: Value) {
        self.vars.insert(name.to_string(), value);
    }

    pub fn has_function(&self, name: &str) -> bool {
        self.functions.contains_key(name)
    }

    /// Install a new output sink, returning the previous one.
    pub fn set_output(&mut self, sink: OutputSink) -> OutputSink {
        std::mem::replace(&mut self.stdout, sink)
    }

    /// Install a new input source, returning the previous one.
    pub fn set_input(&mut self, source: InputSource) -> InputSource {
        std::mem::replace(&mut self.stdin, source)
    }

    pub fn flush_output(&mut self) -> io::Result<()> {
        self.stdout.flush()
    }

    /// Resolve a path against the working directory and home.
    pub fn resolve_path(&self, path: &str) -> String {
        let home = self.fs.home_directory().ok();
        fs::resolve_path(&self.cwd, home.as_deref(), path)
    }

    /// `$NAME`: the overlay first, then the process environment, else empty.
    pub fn expand_variable(&self, name: &str) -> String {
        if let Some(value) = self.env.get(name) {
            return value.clone();
        }
        env::var(name).unwrap_or_default()
    }

    // =========================================================================
    // Statements
    // =========================================================================

    pub(super) fn eval_statement(&mut self, statement: &Statement) -> EvalResult<()> {
        match statement {
            Statement::Expression(s) => {
                self.eval_expression(&s.expression)?;
                Ok(())
            }
            Statement::Assignment(s) => {
                let value = self.eval_expression(&s.value)?;
                self.vars.insert(s.name.value.clone(), value);
                Ok(())
            }
            Statement::Block(s) => self.eval_block(s),
            Statement::For(s) => self.eval_for(s),
            Statement::If(s) => self.eval_if(s),
            Statement::Switch(s) => self.eval_switch(s),
            Statement::Function(s) => {
                self.define_function(s);
                Ok(())
            }
            Statement::Return(s) => {
                let value = match &s.value {
                    Some(expr) => self.eval_expression(expr)?,
                    None => Value::Nil,
                };
                Err(Interrupt::Return(value))
            }
            Statement::Break(_) => Err(Interrupt::Break),
            Statement::Continue(_) => Err(Interrupt::Continue),
        }
    }

    // =========================================================================
    // Expressions
    // =========================================================================

    pub(super) fn eval_expression(&mut self, expr: &Expression) -> EvalResult<Value> {
        match expr {
            Expression::Identifier(ident) => Ok(self
                .vars
                .get(&ident.value)
                .cloned()
                .unwrap_or_else(|| Value::String(ident.value.clone()))),
            Expression::Path(path) => Ok(Value::String(self.resolve_path(&path.value))),
            Expression::Integer(lit) => Ok(Value::Integer(lit.value)),
            Expression::String(lit) => Ok(Value::String(lit.value.clone())),
            Expression::Boolean(lit) => Ok(Value::Boolean(lit.value)),
            Expression::Variable(var) => Ok(Value::String(self.expand_variable(&var.name.value))),
            Expression::Command(cmd) => self.eval_command(cmd),
            Expression::Pipe(pipe) => self.eval_pipe(pipe),
            Expression::Redirection(redir) => self.eval_redirection(redir),
            Expression::Infix(infix) => self.eval_infix(infix),
            Expression::Prefix(prefix) => self.eval_prefix(prefix),
            Expression::Call(call) => self.eval_call(call),
            Expression::Array(array) => self.eval_array(array),
            Expression::Dict(dict) => self.eval_dict(dict),
            Expression::Index(index) => self.eval_index(index),
        }
    }

    fn eval_command(&mut self, cmd: &Command) -> EvalResult<Value> {
        let mut args = Vec::with_capacity(cmd.arguments.len());
        for argument in &cmd.arguments {
            args.push(self.eval_expression(argument)?.to_string());
        }
        debug!(command = cmd.kind.as_str(), ?args, "dispatching command");

        let command = self
            .commands
            .get(cmd.kind)
            .ok_or_else(|| RuntimeError::UnknownCommand(cmd.name.clone()))?;
        let mut ctx = CommandContext {
            args,
            cwd: &mut self.cwd,
            fs: self.fs.as_ref(),
            stdin: &mut self.stdin,
            stdout: &mut self.stdout,
        };
        let output = command
            .execute(&mut ctx)
            .map_err(|source| RuntimeError::Command { command: command.name(), source })?;
        Ok(Value::String(output))
    }

    fn eval_infix(&mut self, node: &InfixExpression) -> EvalResult<Value> {
        // `&&` and `||` do not evaluate the right side once the left decides.
        match node.operator.as_str() {
            "&&" => {
                if !self.eval_expression(&node.left)?.is_truthy() {
                    return Ok(Value::Boolean(false));
                }
                return Ok(Value::Boolean(self.eval_expression(&node.right)?.is_truthy()));
            }
            "||" => {
                if self.eval_expression(&node.left)?.is_truthy() {
                    return Ok(Value::Boolean(true));
                }
                return Ok(Value::Boolean(self.eval_expression(&node.right)?.is_truthy()));
            }
            _ => {}
        }

        let left = self.eval_expression(&node.left)?;
        let right = self.eval_expression(&node.right)?;
        Ok(apply_infix(&node.operator, &left, &right)?)
    }

    fn eval_prefix(&mut self, node: &PrefixExpression) -> EvalResult<Value> {
        let right = self.eval_expression(&node.right)?;
        match node.operator.as_str() {
            "!" => Ok(Value::Boolean(!right.is_truthy())),
            op => Err(RuntimeError::UnknownOperator(op.to_string()).into()),
        }
    }

    fn eval_array(&mut self, node: &ArrayLiteral) -> EvalResult<Value> {
        if node.type_hint.is_some() {
            return Ok(Value::Array(Vec::new()));
        }
        let mut items = Vec::with_capacity(node.elements.len());
        for element in &node.elements {
            items.push(self.eval_expression(element)?);
        }
        Ok(Value::Array(items))
    }

    fn eval_dict(&mut self, node: &DictLiteral) -> EvalResult<Value> {
        let mut pairs = IndexMap::with_capacity(node.pairs.len());
        for (key, value) in &node.pairs {
            let key = self.eval_expression(key)?.to_string();
            let value = self.eval_expression(value)?;
            pairs.insert(key, value);
        }
        Ok(Value::Dict(pairs))
    }

    fn eval_index(&mut self, node: &IndexExpression) -> EvalResult<Value> {
        let left = self.eval_expression(&node.left)?;
        let index = self.eval_expression(&node.index)?;
        Ok(index_value(left, &index)?)
    }
}

/// Apply a binary operator to two evaluated operands.
///
/// `+` concatenates when either side is a string. Otherwise, operands that
/// both read as integers use integer arithmetic and comparison. Anything left
/// falls back to comparing or concatenating the rendered text.
pub fn apply_infix(operator: &str, left: &Value, right: &Value) -> Result<Value, RuntimeError> {
    if operator == "+" && (left.is_string() || right.is_string()) {
        return Ok(Value::String(format!("{}{}", left, right)));
    }

    if let (Some(a), Some(b)) = (left.as_integer(), right.as_integer()) {
        if let Some(value) = integer_infix(operator, a, b)? {
            return Ok(value);
        }
    }

    let (l, r) = (left.to_string(), right.to_string());
    match operator {
        "==" => Ok(Value::Boolean(l == r)),
        "!=" => Ok(Value::Boolean(l != r)),
        "+" => Ok(Value::String(l + &r)),
        "=~" => {
            let re = Regex::new(&r).map_err(|e| RuntimeError::InvalidRegex(e.to_string()))?;
            Ok(Value::Boolean(re.is_match(&l)))
        }
        "-" | "*" | "/" | "%" | "<" | ">" | "<=" | ">=" => Err(RuntimeError::UnsupportedOperands {
            operator: operator.to_string(),
            left: left.type_name(),
            right: right.type_name(),
        }),
        _ => Err(RuntimeError::UnknownOperator(operator.to_string())),
    }
}

/// Integer arithmetic wraps on overflow.
fn integer_infix(operator: &str, a: i64, b: i64) -> Result<Option<Value>, RuntimeError> {
    let value = match operator {
        "+" => Value::Integer(a.wrapping_add(b)),
        "-" => Value::Integer(a.wrapping_sub(b)),
        "*" => Value::Integer(a.wrapping_mul(b)),
        "/" => {
            if b == 0 {
                return Err(RuntimeError::DivisionByZero);
            }
            Value::Integer(a.wrapping_div(b))
        }
        "%" => {
            if b == 0 {
                return Err(RuntimeError::ModuloByZero);
            }
            Value::Integer(a.wrapping_rem(b))
        }
        "==" => Value::Boolean(a == b),
        "!=" => Value::Boolean(a != b),
        "<" => Value::Boolean(a < b),
        ">" => Value::Boolean(a > b),
        "<=" => Value::Boolean(a <= b),
        ">=" => Value::Boolean(a >= b),
        _ => return Ok(None),
    };
    Ok(Some(value))
}

/// `left[index]` for dicts (key is the rendered index) and arrays.
pub fn index_value(left: Value, index: &Value) -> Result<Value, RuntimeError> {
    match left {
        Value::Dict(mut pairs) => {
            let key = index.to_string();
            pairs.swap_remove(&key).ok_or(RuntimeError::KeyNotFound(key))
        }
        Value::Array(mut items) => {
            let i = index.as_integer().ok_or(RuntimeError::IndexNotInteger)?;
            if i < 0 || i >= items.len() as i64 {
                return Err(RuntimeError::IndexOutOfBounds(i));
            }
            Ok(items.swap_remove(i as usize))
        }
        other => Err(RuntimeError::IndexNotSupported(other.type_name())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fs::InMemoryFs;
    use crate::parser::parse;

    fn interpreter() -> Interpreter {
        let mut interp = Interpreter::new(Arc::new(InMemoryFs::new()), InterpreterOptions::default());
        interp.set_output(OutputSink::buffer());
        interp
    }

    fn run(interp: &mut Interpreter, source: &str) -> Result<(), RuntimeError> {
        let program = parse(source).expect("source should parse");
        interp.eval(&program)
    }

    fn output(interp: &mut Interpreter) -> String {
        let sink = interp.set_output(OutputSink::buffer());
        String::from_utf8(sink.into_bytes()).unwrap()
    }

    fn var(interp: &Interpreter, name: &str) -> Value {
        interp.variable(name).cloned().unwrap_or(Value::Nil)
    }

    #[test]
    fn test_default_cwd_comes_from_fs() {
        assert_eq!(interpreter().cwd(), "/home/user");
    }

    #[test]
    fn test_assignment_and_arithmetic() {
        let mut interp = interpreter();
        run(&mut interp, "x = 7\ny = (x + 3) * 2\nz = 17 % 5\nw = 20 / 4 - 1").unwrap();
        assert_eq!(var(&interp, "y"), Value::Integer(20));
        assert_eq!(var(&interp, "z"), Value::Integer(2));
        assert_eq!(var(&interp, "w"), Value::Integer(4));
    }

    #[test]
    fn test_division_of_variables() {
        let mut interp = interpreter();
        run(&mut interp, "n = 10\nhalf = n / 2\nd = 2\nq = n / d").unwrap();
        assert_eq!(var(&interp, "half"), Value::Integer(5));
        assert_eq!(var(&interp, "q"), Value::Integer(5));
    }

    #[test]
    fn test_identifier_without_binding_is_its_name() {
        let mut interp = interpreter();
        run(&mut interp, "x = hello").unwrap();
        assert_eq!(var(&interp, "x"), Value::from("hello"));
    }

    #[test]
    fn test_string_concatenation() {
        let mut interp = interpreter();
        run(&mut interp, "name = \"raven\"\ngreeting = \"hi \" + name + 1").unwrap();
        assert_eq!(var(&interp, "greeting"), Value::from("hi raven1"));
    }

    #[test]
    fn test_numeric_strings_compare_as_integers() {
        let mut interp = interpreter();
        run(&mut interp, "a = \"10\" == 10\nb = \"abc\" != \"abd\"\nc = \"9\" < 10").unwrap();
        assert_eq!(var(&interp, "a"), Value::Boolean(true));
        assert_eq!(var(&interp, "b"), Value::Boolean(true));
        assert_eq!(var(&interp, "c"), Value::Boolean(true));
    }

    #[test]
    fn test_regex_operator() {
        let mut interp = interpreter();
        run(&mut interp, r#"m = "file.txt" =~ "\.txt$""#).unwrap();
        assert_eq!(var(&interp, "m"), Value::Boolean(true));
    }

    #[test]
    fn test_division_by_zero() {
        let mut interp = interpreter();
        assert_eq!(run(&mut interp, "x = 1 / 0"), Err(RuntimeError::DivisionByZero));
        assert_eq!(run(&mut interp, "x = 1 % 0"), Err(RuntimeError::ModuloByZero));
    }

    #[test]
    fn test_apply_infix_fallbacks() {
        assert_eq!(
            apply_infix("+", &Value::Boolean(true), &Value::Integer(1)).unwrap(),
            Value::from("true1")
        );
        assert_eq!(
            apply_infix("==", &Value::Boolean(true), &Value::from("true")).unwrap(),
            Value::Boolean(true)
        );
        assert_eq!(
            apply_infix("<", &Value::from("a"), &Value::from("b")).unwrap_err().to_string(),
            "unsupported operand types for <: string and string"
        );
        assert_eq!(
            apply_infix("*", &Value::Integer(i64::MAX), &Value::Integer(2)).unwrap(),
            Value::Integer(-2)
        );
    }

    #[test]
    fn test_prefix_not() {
        let mut interp = interpreter();
        run(&mut interp, "a = !true\nb = !0\nc = ![]").unwrap();
        assert_eq!(var(&interp, "a"), Value::Boolean(false));
        assert_eq!(var(&interp, "b"), Value::Boolean(true));
        assert_eq!(var(&interp, "c"), Value::Boolean(true));
    }

    #[test]
    fn test_short_circuit_skips_right_side() {
        let mut interp = interpreter();
        run(&mut interp, "a = false && mkdir skipped\nb = true || mkdir skipped").unwrap();
        assert_eq!(var(&interp, "a"), Value::Boolean(false));
        assert_eq!(var(&interp, "b"), Value::Boolean(true));
        assert!(!interp.fs.exists("/home/user/skipped"));

        run(&mut interp, "c = true && mkdir made").unwrap();
        assert!(interp.fs.exists("/home/user/made"));
    }

    #[test]
    fn test_arrays_dicts_and_indexing() {
        let mut interp = interpreter();
        run(&mut interp, "arr = [1, \"two\", 3]\nd = {\"k\": arr, n: 5}\nx = arr[1]\ny = d[\"n\"]").unwrap();
        assert_eq!(var(&interp, "x"), Value::from("two"));
        assert_eq!(var(&interp, "y"), Value::Integer(5));
        assert_eq!(var(&interp, "d").to_string(), r#"{"k": [1, two, 3], "n": 5}"#);
    }

    #[test]
    fn test_index_errors() {
        let mut interp = interpreter();
        run(&mut interp, "arr = [1, 2, 3]\nd = {\"a\": 1}").unwrap();
        assert_eq!(run(&mut interp, "x = arr[10]"), Err(RuntimeError::IndexOutOfBounds(10)));
        assert_eq!(run(&mut interp, "x = d[\"b\"]"), Err(RuntimeError::KeyNotFound("b".to_string())));
        assert_eq!(run(&mut interp, "x = 5[0]"), Err(RuntimeError::IndexNotSupported("integer")));
    }

    #[test]
    fn test_typed_empty_array() {
        let mut interp = interpreter();
        run(&mut interp, "names = []string").unwrap();
        assert_eq!(var(&interp, "names"), Value::Array(vec![]));
    }

    #[test]
    fn test_environment_overlay() {
        let mut interp = interpreter();
        interp.set_env("RAVEN_TEST_NAME", "overlay");
        run(&mut interp, "print $RAVEN_TEST_NAME $RAVEN_SURELY_UNSET_VARIABLE").unwrap();
        assert_eq!(output(&mut interp), "overlay \n");
    }

    #[test]
    fn test_command_prints_and_returns_text() {
        let mut interp = interpreter();
        run(&mut interp, "x = print hello world").unwrap();
        assert_eq!(var(&interp, "x"), Value::from("hello world\n"));
        assert_eq!(output(&mut interp), "hello world\n");
    }

    #[test]
    fn test_command_error_is_prefixed() {
        let mut interp = interpreter();
        let err = run(&mut interp, "mkdir").unwrap_err();
        assert_eq!(err.to_string(), "mkdir: missing operand");
    }

    #[test]
    fn test_path_arguments_resolve_against_cwd() {
        let mut interp = interpreter();
        run(&mut interp, "mkdir projects/raven\ncd projects\np = ./raven").unwrap();
        assert_eq!(interp.cwd(), "/home/user/projects");
        assert_eq!(var(&interp, "p"), Value::from("/home/user/projects/raven"));
    }

    #[test]
    fn test_first_error_stops_program() {
        let mut interp = interpreter();
        let result = run(&mut interp, "a = 1\nb = 1 / 0\nc = 3");
        assert_eq!(result, Err(RuntimeError::DivisionByZero));
        assert_eq!(var(&interp, "a"), Value::Integer(1));
        assert_eq!(interp.variable("c"), None);
    }

    #[test]
    fn test_stray_control_flow_at_top_level() {
        let mut interp = interpreter();
        assert_eq!(run(&mut interp, "break"), Err(RuntimeError::BreakOutsideLoop));
        assert_eq!(run(&mut interp, "continue"), Err(RuntimeError::ContinueOutsideLoop));
        assert_eq!(run(&mut interp, "return 1"), Err(RuntimeError::ReturnOutsideFunction));
    }
}
