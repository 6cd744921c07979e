//! Interpreter Types
//!
//! Runtime values, user functions and execution limits.

use std::collections::HashMap;
use std::fmt;

use indexmap::IndexMap;

use crate::ast::BlockStatement;

/// A runtime value.
///
/// Values are copied on assignment; collection builtins return new values
/// instead of mutating their arguments.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Integer(i64),
    String(String),
    Boolean(bool),
    Array(Vec<Value>),
    Dict(IndexMap<String, Value>),
    Nil,
}

impl Value {
    /// Name used in error messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Integer(_) => "integer",
            Value::String(_) => "string",
            Value::Boolean(_) => "boolean",
            Value::Array(_) => "array",
            Value::Dict(_) => "dict",
            Value::Nil => "nil",
        }
    }

    /// Truthiness used by `if`, `!`, `&&` and `||`.
    pub fn is_truthy(&self) -> bool {
        match self {
            Value::Boolean(b) => *b,
            Value::Integer(n) => *n != 0,
            Value::String(s) => !s.is_empty(),
            Value::Array(items) => !items.is_empty(),
            Value::Dict(_) => true,
            Value::Nil => false,
        }
    }

    /// Integer view: integers as-is, strings that parse as decimal integers.
    pub fn as_integer(&self) -> Option<i64> {
        match self {
            Value::Integer(n) => Some(*n),
            Value::String(s) => s.parse::<i64>().ok(),
            _ => None,
        }
    }

    /// Equality used by `switch`: numeric when both sides are numeric,
    /// otherwise by rendered text.
    pub fn loosely_equals(&self, other: &Value) -> bool {
        match (self.as_integer(), other.as_integer()) {
            (Some(a), Some(b)) => a == b,
            _ => self.to_string() == other.to_string(),
        }
    }

    pub fn is_string(&self) -> bool {
        matches!(self, Value::String(_))
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Integer(n) => write!(f, "{}", n),
            Value::String(s) => f.write_str(s),
            Value::Boolean(b) => write!(f, "{}", b),
            Value::Array(items) => {
                f.write_str("[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}", item)?;
                }
                f.write_str("]")
            }
            Value::Dict(pairs) => {
                f.write_str("{")?;
                for (i, (key, value)) in pairs.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{:?}: {}", key, value)?;
                }
                f.write_str("}")
            }
            Value::Nil => Ok(()),
        }
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Integer(n)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Boolean(b)
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Value::Array(items)
    }
}

/// A user-defined function.
///
/// `env` is a copy of the variables visible when the function was defined;
/// later assignments in the defining scope do not reach it.
#[derive(Debug, Clone)]
pub struct Function {
    pub name: String,
    pub parameters: Vec<String>,
    pub body: BlockStatement,
    pub env: HashMap<String, Value>,
}

/// Execution limits to prevent runaway scripts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExecutionLimits {
    /// Maximum nesting of user function calls
    pub max_call_depth: u32,
}

impl Default for ExecutionLimits {
    fn default() -> Self {
        Self { max_call_depth: 200 }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truthiness() {
        assert!(!Value::Integer(0).is_truthy());
        assert!(Value::Integer(-3).is_truthy());
        assert!(!Value::from("").is_truthy());
        assert!(Value::from("0").is_truthy());
        assert!(!Value::Array(vec![]).is_truthy());
        assert!(!Value::Nil.is_truthy());
        assert!(Value::Dict(IndexMap::new()).is_truthy());
        assert!(!Value::Boolean(false).is_truthy());
    }

    #[test]
    fn test_display() {
        let arr = Value::Array(vec![Value::Integer(1), Value::from("a"), Value::Boolean(true)]);
        assert_eq!(arr.to_string(), "[1, a, true]");
        assert_eq!(Value::Nil.to_string(), "");

        let mut pairs = IndexMap::new();
        pairs.insert("name".to_string(), Value::from("raven"));
        pairs.insert("n".to_string(), Value::Integer(2));
        assert_eq!(Value::Dict(pairs).to_string(), r#"{"name": raven, "n": 2}"#);
    }

    #[test]
    fn test_as_integer() {
        assert_eq!(Value::from("42").as_integer(), Some(42));
        assert_eq!(Value::from("-7").as_integer(), Some(-7));
        assert_eq!(Value::from("4x").as_integer(), None);
        assert_eq!(Value::Boolean(true).as_integer(), None);
    }

    #[test]
    fn test_loosely_equals() {
        assert!(Value::from("5").loosely_equals(&Value::Integer(5)));
        assert!(Value::from("abc").loosely_equals(&Value::from("abc")));
        assert!(!Value::Integer(1).loosely_equals(&Value::Boolean(true)));
        assert!(Value::Boolean(true).loosely_equals(&Value::from("true")));
    }

    #[test]
    fn test_default_limits() {
        assert_eq!(ExecutionLimits::default().max_call_depth, 200);
    }
}
