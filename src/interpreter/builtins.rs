//! Builtin Functions
//!
//! Functions callable from scripts without a definition: `range`, the
//! string helpers, the array helpers and the regex helpers. Each entry has a
//! fixed arity that is checked before any argument is evaluated.

use std::collections::HashMap;

use lazy_static::lazy_static;
use regex_lite::Regex;

use super::errors::RuntimeError;
use super::types::Value;

type BuiltinFn = fn(&[Value]) -> Result<Value, RuntimeError>;

/// Accepted argument counts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Arity {
    Exactly(usize),
    Between(usize, usize),
}

impl Arity {
    pub fn accepts(&self, count: usize) -> bool {
        match *self {
            Arity::Exactly(n) => count == n,
            Arity::Between(min, max) => count >= min && count <= max,
        }
    }
}

pub struct Builtin {
    pub name: &'static str,
    pub arity: Arity,
    pub func: BuiltinFn,
}

impl Builtin {
    /// Error for a call with the wrong number of arguments.
    pub fn arity_error(&self) -> RuntimeError {
        let expected = match self.arity {
            Arity::Exactly(1) => "exactly 1 argument".to_string(),
            Arity::Exactly(n) => format!("exactly {} arguments", n),
            Arity::Between(min, max) => format!("{} or {} arguments", min, max),
        };
        RuntimeError::builtin(format!("{}() takes {}", self.name, expected))
    }
}

macro_rules! builtins {
    ($($name:literal => ($arity:expr, $func:path)),* $(,)?) => {{
        let mut table: HashMap<&'static str, Builtin> = HashMap::new();
        $(
            table.insert($name, Builtin { name: $name, arity: $arity, func: $func });
        )*
        table
    }};
}

lazy_static! {
    static ref BUILTINS: HashMap<&'static str, Builtin> = builtins! {
        "range" => (Arity::Exactly(1), builtin_range),
        "append" => (Arity::Exactly(2), builtin_append),
        "push" => (Arity::Exactly(2), builtin_push),
        "len" => (Arity::Exactly(1), builtin_len),
        "split" => (Arity::Exactly(2), builtin_split),
        "trim" => (Arity::Exactly(1), builtin_trim),
        "upper" => (Arity::Exactly(1), builtin_upper),
        "lower" => (Arity::Exactly(1), builtin_lower),
        "contains" => (Arity::Exactly(2), builtin_contains),
        "replace" => (Arity::Exactly(3), builtin_replace),
        "slice" => (Arity::Between(2, 3), builtin_slice),
        "pop" => (Arity::Exactly(1), builtin_pop),
        "first" => (Arity::Exactly(1), builtin_first),
        "last" => (Arity::Exactly(1), builtin_last),
        "join" => (Arity::Exactly(2), builtin_join),
        "regex_match" => (Arity::Exactly(2), builtin_regex_match),
        "regex_find" => (Arity::Exactly(2), builtin_regex_find),
        "regex_replace" => (Arity::Exactly(3), builtin_regex_replace),
    };
}

/// Look up a builtin by name.
pub fn lookup(name: &str) -> Option<&'static Builtin> {
    BUILTINS.get(name)
}

// ============================================================================
// Argument helpers
// ============================================================================

const ORDINALS: [&str; 3] = ["first", "second", "third"];

fn position(func: &str, index: usize, total: usize) -> String {
    if total == 1 {
        format!("{}() argument", func)
    } else {
        format!("{}() {} argument", func, ORDINALS[index])
    }
}

fn string_arg<'a>(func: &str, args: &'a [Value], index: usize) -> Result<&'a str, RuntimeError> {
    match &args[index] {
        Value::String(s) => Ok(s),
        _ => Err(RuntimeError::builtin(format!("{} must be a string", position(func, index, args.len())))),
    }
}

fn array_arg<'a>(func: &str, args: &'a [Value], index: usize) -> Result<&'a [Value], RuntimeError> {
    match &args[index] {
        Value::Array(items) => Ok(items),
        _ => Err(RuntimeError::builtin(format!("{} must be an array", position(func, index, args.len())))),
    }
}

fn integer_arg(func: &str, args: &[Value], index: usize) -> Result<i64, RuntimeError> {
    args[index]
        .as_integer()
        .ok_or_else(|| RuntimeError::builtin(format!("{} must be an integer", position(func, index, args.len()))))
}

fn compile_regex(pattern: &str) -> Result<Regex, RuntimeError> {
    Regex::new(pattern).map_err(|e| RuntimeError::InvalidRegex(e.to_string()))
}

// ============================================================================
// Builtin implementations
// ============================================================================

fn builtin_range(args: &[Value]) -> Result<Value, RuntimeError> {
    let n = integer_arg("range", args, 0)?;
    if n < 0 {
        return Err(RuntimeError::builtin("range() argument must not be negative"));
    }
    Ok(Value::Array((0..n).map(Value::Integer).collect()))
}

fn append_to(func: &str, args: &[Value]) -> Result<Value, RuntimeError> {
    let mut items = array_arg(func, args, 0)?.to_vec();
    items.push(args[1].clone());
    Ok(Value::Array(items))
}

fn builtin_append(args: &[Value]) -> Result<Value, RuntimeError> {
    append_to("append", args)
}

fn builtin_push(args: &[Value]) -> Result<Value, RuntimeError> {
    append_to("push", args)
}

fn builtin_len(args: &[Value]) -> Result<Value, RuntimeError> {
    let len = match &args[0] {
        Value::String(s) => s.len(),
        Value::Array(items) => items.len(),
        Value::Dict(pairs) => pairs.len(),
        _ => return Err(RuntimeError::builtin("len() argument must be string, array or dict")),
    };
    Ok(Value::Integer(len as i64))
}

fn builtin_split(args: &[Value]) -> Result<Value, RuntimeError> {
    let s = string_arg("split", args, 0)?;
    let sep = string_arg("split", args, 1)?;
    let parts: Vec<Value> = if sep.is_empty() {
        s.chars().map(|c| Value::String(c.to_string())).collect()
    } else {
        s.split(sep).map(Value::from).collect()
    };
    Ok(Value::Array(parts))
}

fn builtin_trim(args: &[Value]) -> Result<Value, RuntimeError> {
    Ok(Value::from(string_arg("trim", args, 0)?.trim()))
}

fn builtin_upper(args: &[Value]) -> Result<Value, RuntimeError> {
    Ok(Value::String(string_arg("upper", args, 0)?.to_uppercase()))
}

fn builtin_lower(args: &[Value]) -> Result<Value, RuntimeError> {
    Ok(Value::String(string_arg("lower", args, 0)?.to_lowercase()))
}

fn builtin_contains(args: &[Value]) -> Result<Value, RuntimeError> {
    let s = string_arg("contains", args, 0)?;
    let needle = string_arg("contains", args, 1)?;
    Ok(Value::Boolean(s.contains(needle)))
}

fn builtin_replace(args: &[Value]) -> Result<Value, RuntimeError> {
    let s = string_arg("replace", args, 0)?;
    let from = string_arg("replace", args, 1)?;
    let to = string_arg("replace", args, 2)?;
    Ok(Value::String(s.replace(from, to)))
}

/// `slice(arr, start[, end])`; bounds are clamped, an inverted range is empty.
fn builtin_slice(args: &[Value]) -> Result<Value, RuntimeError> {
    let items = array_arg("slice", args, 0)?;
    let len = items.len() as i64;
    let start = integer_arg("slice", args, 1)?.max(0);
    let end = match args.get(2) {
        Some(_) => integer_arg("slice", args, 2)?.min(len),
        None => len,
    };
    if start >= end {
        return Ok(Value::Array(Vec::new()));
    }
    Ok(Value::Array(items[start as usize..end as usize].to_vec()))
}

fn non_empty<'a>(func: &str, args: &'a [Value]) -> Result<&'a [Value], RuntimeError> {
    let items = array_arg(func, args, 0)?;
    if items.is_empty() {
        return Err(RuntimeError::builtin(format!("{}() on empty array", func)));
    }
    Ok(items)
}

fn builtin_pop(args: &[Value]) -> Result<Value, RuntimeError> {
    let items = non_empty("pop", args)?;
    Ok(items[items.len() - 1].clone())
}

fn builtin_first(args: &[Value]) -> Result<Value, RuntimeError> {
    Ok(non_empty("first", args)?[0].clone())
}

fn builtin_last(args: &[Value]) -> Result<Value, RuntimeError> {
    let items = non_empty("last", args)?;
    Ok(items[items.len() - 1].clone())
}

fn builtin_join(args: &[Value]) -> Result<Value, RuntimeError> {
    let items = array_arg("join", args, 0)?;
    let sep = string_arg("join", args, 1)?;
    let parts: Vec<String> = items.iter().map(|v| v.to_string()).collect();
    Ok(Value::String(parts.join(sep)))
}

fn builtin_regex_match(args: &[Value]) -> Result<Value, RuntimeError> {
    let re = compile_regex(&args[1].to_string())?;
    Ok(Value::Boolean(re.is_match(&args[0].to_string())))
}

fn builtin_regex_find(args: &[Value]) -> Result<Value, RuntimeError> {
    let re = compile_regex(&args[1].to_string())?;
    let text = args[0].to_string();
    let matches = re.find_iter(&text).map(|m| Value::from(m.as_str())).collect();
    Ok(Value::Array(matches))
}

fn builtin_regex_replace(args: &[Value]) -> Result<Value, RuntimeError> {
    let re = compile_regex(&args[1].to_string())?;
    let text = args[0].to_string();
    let replacement = args[2].to_string();
    Ok(Value::String(re.replace_all(&text, replacement.as_str()).into_owned()))
}
