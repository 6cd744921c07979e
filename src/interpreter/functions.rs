//! Function Handling
//!
//! Handles function definition and invocation:
//! - Definition stores a snapshot of the current variables
//! - User functions are looked up before builtins
//! - A call runs in a fresh variable table seeded from the snapshot

use std::rc::Rc;

use tracing::debug;

use super::builtins;
use super::errors::{EvalResult, Interrupt, RuntimeError};
use super::interpreter::Interpreter;
use super::types::{Function, Value};
use crate::ast::{CallExpression, Expression, FunctionStatement};

impl Interpreter {
    /// Add a function to the function table, capturing the variables
    /// visible right now.
    pub(super) fn define_function(&mut self, stmt: &FunctionStatement) {
        let function = Function {
            name: stmt.name.value.clone(),
            parameters: stmt.parameters.iter().map(|p| p.value.clone()).collect(),
            body: stmt.body.clone(),
            env: self.vars.clone(),
        };
        debug!(name = function.name.as_str(), params = function.parameters.len(), "defined function");
        self.functions.insert(function.name.clone(), Rc::new(function));
    }

    pub(super) fn eval_call(&mut self, call: &CallExpression) -> EvalResult<Value> {
        if let Some(function) = self.functions.get(&call.function).cloned() {
            return self.call_user_function(&function, &call.arguments);
        }

        let builtin = builtins::lookup(&call.function)
            .ok_or_else(|| RuntimeError::UnknownFunction(call.function.clone()))?;
        if !builtin.arity.accepts(call.arguments.len()) {
            return Err(builtin.arity_error().into());
        }

        let mut args = Vec::with_capacity(call.arguments.len());
        for argument in &call.arguments {
            args.push(self.eval_expression(argument)?);
        }
        Ok((builtin.func)(&args)?)
    }

    fn call_user_function(&mut self, function: &Function, arguments: &[Expression]) -> EvalResult<Value> {
        if arguments.len() != function.parameters.len() {
            return Err(RuntimeError::WrongArgumentCount {
                expected: function.parameters.len(),
                got: arguments.len(),
            }
            .into());
        }
        if self.call_depth >= self.limits.max_call_depth {
            return Err(RuntimeError::MaxCallDepthExceeded(self.limits.max_call_depth).into());
        }

        // Arguments see the caller's variables, not each other.
        let mut args = Vec::with_capacity(arguments.len());
        for argument in arguments {
            args.push(self.eval_expression(argument)?);
        }

        let mut frame = function.env.clone();
        for (name, value) in function.parameters.iter().zip(args) {
            frame.insert(name.clone(), value);
        }

        debug!(name = function.name.as_str(), depth = self.call_depth + 1, "calling function");
        let saved = std::mem::replace(&mut self.vars, frame);
        self.call_depth += 1;
        let result = self.eval_block(&function.body);
        self.call_depth -= 1;
        self.vars = saved;

        match result {
            Ok(()) => Ok(Value::Nil),
            Err(Interrupt::Return(value)) => Ok(value),
            Err(other) => Err(other),
        }
    }
}
