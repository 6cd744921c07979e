//! Control Flow Execution
//!
//! Handles control flow constructs:
//! - blocks
//! - if/else
//! - for loops (catching break and continue)
//! - switch statements
//!
//! Blocks do not open a new scope: assignments inside them update the
//! variables of the enclosing function activation.

use super::errors::{EvalResult, Interrupt, RuntimeError};
use super::interpreter::Interpreter;
use super::types::Value;
use crate::ast::{BlockStatement, ForStatement, IfStatement, SwitchStatement};

impl Interpreter {
    pub(super) fn eval_block(&mut self, block: &BlockStatement) -> EvalResult<()> {
        for statement in &block.statements {
            self.eval_statement(statement)?;
        }
        Ok(())
    }

    pub(super) fn eval_if(&mut self, stmt: &IfStatement) -> EvalResult<()> {
        if self.eval_expression(&stmt.condition)?.is_truthy() {
            self.eval_block(&stmt.consequence)
        } else if let Some(alternative) = &stmt.alternative {
            self.eval_block(alternative)
        } else {
            Ok(())
        }
    }

    /// Iterate an array, binding each element to the loop variable.
    ///
    /// Side effects of completed iterations stay in place when a later
    /// iteration fails.
    pub(super) fn eval_for(&mut self, stmt: &ForStatement) -> EvalResult<()> {
        let items = match self.eval_expression(&stmt.iterable)? {
            Value::Array(items) => items,
            other => return Err(RuntimeError::NotIterable(other.type_name()).into()),
        };

        for item in items {
            self.vars.insert(stmt.variable.value.clone(), item);
            match self.eval_block(&stmt.body) {
                Ok(()) | Err(Interrupt::Continue) => {}
                Err(Interrupt::Break) => break,
                Err(other) => return Err(other),
            }
        }
        Ok(())
    }

    /// Run the first case holding a value equal to the subject; the default
    /// block runs only when nothing matched.
    pub(super) fn eval_switch(&mut self, stmt: &SwitchStatement) -> EvalResult<()> {
        let subject = self.eval_expression(&stmt.subject)?;

        for case in &stmt.cases {
            for value in &case.values {
                let candidate = self.eval_expression(value)?;
                if subject.loosely_equals(&candidate) {
                    return self.eval_block(&case.body);
                }
            }
        }

        match &stmt.default {
            Some(default) => self.eval_block(default),
            None => Ok(()),
        }
    }
}
