//! Abstract Syntax Tree (AST) Types for Raven
//!
//! Statements and expressions are closed sum types. Every node keeps the
//! token that started it (for diagnostics) and renders to a canonical text
//! form through `Display`, which the parser tests compare against.

use std::fmt;

use crate::parser::lexer::{Token, TokenType};

/// Capabilities shared by every AST node.
pub trait Node: fmt::Display {
    /// Literal text of the node's first token.
    fn token_literal(&self) -> &str;

    /// Canonical string form.
    fn render(&self) -> String {
        self.to_string()
    }
}

macro_rules! impl_node {
    ($($ty:ty),* $(,)?) => {
        $(
            impl Node for $ty {
                fn token_literal(&self) -> &str {
                    &self.token.literal
                }
            }
        )*
    };
}

fn write_joined<T: fmt::Display>(f: &mut fmt::Formatter<'_>, items: &[T], sep: &str) -> fmt::Result {
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            f.write_str(sep)?;
        }
        write!(f, "{}", item)?;
    }
    Ok(())
}

// =============================================================================
// PROGRAM
// =============================================================================

/// Root node: one parsed input chunk
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Program {
    pub statements: Vec<Statement>,
}

impl Program {
    pub fn is_empty(&self) -> bool {
        self.statements.is_empty()
    }
}

impl Node for Program {
    fn token_literal(&self) -> &str {
        self.statements.first().map_or("", |s| s.token_literal())
    }
}

/// One statement per line.
impl fmt::Display for Program {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_joined(f, &self.statements, "\n")
    }
}

// =============================================================================
// STATEMENTS
// =============================================================================

#[derive(Debug, Clone, PartialEq)]
pub enum Statement {
    Expression(ExpressionStatement),
    Assignment(AssignmentStatement),
    Block(BlockStatement),
    For(ForStatement),
    If(IfStatement),
    Break(BreakStatement),
    Continue(ContinueStatement),
    Function(FunctionStatement),
    Return(ReturnStatement),
    Switch(SwitchStatement),
}

impl Node for Statement {
    fn token_literal(&self) -> &str {
        match self {
            Statement::Expression(s) => s.token_literal(),
            Statement::Assignment(s) => s.token_literal(),
            Statement::Block(s) => s.token_literal(),
            Statement::For(s) => s.token_literal(),
            Statement::If(s) => s.token_literal(),
            Statement::Break(s) => s.token_literal(),
            Statement::Continue(s) => s.token_literal(),
            Statement::Function(s) => s.token_literal(),
            Statement::Return(s) => s.token_literal(),
            Statement::Switch(s) => s.token_literal(),
        }
    }
}

impl fmt::Display for Statement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Statement::Expression(s) => fmt::Display::fmt(s, f),
            Statement::Assignment(s) => fmt::Display::fmt(s, f),
            Statement::Block(s) => fmt::Display::fmt(s, f),
            Statement::For(s) => fmt::Display::fmt(s, f),
            Statement::If(s) => fmt::Display::fmt(s, f),
            Statement::Break(s) => fmt::Display::fmt(s, f),
            Statement::Continue(s) => fmt::Display::fmt(s, f),
            Statement::Function(s) => fmt::Display::fmt(s, f),
            Statement::Return(s) => fmt::Display::fmt(s, f),
            Statement::Switch(s) => fmt::Display::fmt(s, f),
        }
    }
}

/// A bare expression used as a statement
#[derive(Debug, Clone, PartialEq)]
pub struct ExpressionStatement {
    pub token: Token,
    pub expression: Expression,
}

impl fmt::Display for ExpressionStatement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.expression)
    }
}

/// `name = value`
#[derive(Debug, Clone, PartialEq)]
pub struct AssignmentStatement {
    pub token: Token,
    pub name: Identifier,
    pub value: Expression,
}

impl fmt::Display for AssignmentStatement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} = {}", self.name, self.value)
    }
}

/// `{ ... }`. Blocks group statements but do not open a new scope.
#[derive(Debug, Clone, PartialEq)]
pub struct BlockStatement {
    pub token: Token,
    pub statements: Vec<Statement>,
}

impl fmt::Display for BlockStatement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("{ ")?;
        for statement in &self.statements {
            write!(f, "{} ", statement)?;
        }
        f.write_str("}")
    }
}

/// `for variable in iterable { body }`
#[derive(Debug, Clone, PartialEq)]
pub struct ForStatement {
    pub token: Token,
    pub variable: Identifier,
    pub iterable: Expression,
    pub body: BlockStatement,
}

impl fmt::Display for ForStatement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "for {} in {} {}", self.variable, self.iterable, self.body)
    }
}

/// `if condition { ... } else { ... }`
#[derive(Debug, Clone, PartialEq)]
pub struct IfStatement {
    pub token: Token,
    pub condition: Expression,
    pub consequence: BlockStatement,
    pub alternative: Option<BlockStatement>,
}

impl fmt::Display for IfStatement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "if {} {}", self.condition, self.consequence)?;
        if let Some(alternative) = &self.alternative {
            write!(f, " else {}", alternative)?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct BreakStatement {
    pub token: Token,
}

impl fmt::Display for BreakStatement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("break")
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ContinueStatement {
    pub token: Token,
}

impl fmt::Display for ContinueStatement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("continue")
    }
}

/// `fn name(a, b) { body }`
#[derive(Debug, Clone, PartialEq)]
pub struct FunctionStatement {
    pub token: Token,
    pub name: Identifier,
    pub parameters: Vec<Identifier>,
    pub body: BlockStatement,
}

impl fmt::Display for FunctionStatement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "fn {}(", self.name)?;
        write_joined(f, &self.parameters, ", ")?;
        write!(f, ") {}", self.body)
    }
}

/// `return [value]`
#[derive(Debug, Clone, PartialEq)]
pub struct ReturnStatement {
    pub token: Token,
    pub value: Option<Expression>,
}

impl fmt::Display for ReturnStatement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("return")?;
        if let Some(value) = &self.value {
            write!(f, " {}", value)?;
        }
        Ok(())
    }
}

/// One `case a, b: { ... }` arm of a switch
#[derive(Debug, Clone, PartialEq)]
pub struct CaseClause {
    pub token: Token,
    pub values: Vec<Expression>,
    pub body: BlockStatement,
}

impl fmt::Display for CaseClause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("case ")?;
        write_joined(f, &self.values, ", ")?;
        write!(f, ": {}", self.body)
    }
}

/// `switch subject { case ...: { } default { } }`
#[derive(Debug, Clone, PartialEq)]
pub struct SwitchStatement {
    pub token: Token,
    pub subject: Expression,
    pub cases: Vec<CaseClause>,
    pub default: Option<BlockStatement>,
}

impl fmt::Display for SwitchStatement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "switch {} {{ ", self.subject)?;
        for case in &self.cases {
            write!(f, "{} ", case)?;
        }
        if let Some(default) = &self.default {
            write!(f, "default {}", default)?;
        }
        f.write_str("}")
    }
}

// =============================================================================
// EXPRESSIONS
// =============================================================================

#[derive(Debug, Clone, PartialEq)]
pub enum Expression {
    Identifier(Identifier),
    Path(PathExpression),
    Integer(IntegerLiteral),
    String(StringLiteral),
    Boolean(BooleanLiteral),
    Variable(VariableReference),
    Command(Command),
    Pipe(PipeExpression),
    Redirection(RedirectionExpression),
    Infix(InfixExpression),
    Prefix(PrefixExpression),
    Call(CallExpression),
    Array(ArrayLiteral),
    Dict(DictLiteral),
    Index(IndexExpression),
}

impl Expression {
    /// Commands and anything built from them by `|` or a redirection.
    pub fn is_command_like(&self) -> bool {
        matches!(
            self,
            Expression::Command(_) | Expression::Pipe(_) | Expression::Redirection(_)
        )
    }
}

impl Node for Expression {
    fn token_literal(&self) -> &str {
        match self {
            Expression::Identifier(e) => e.token_literal(),
            Expression::Path(e) => e.token_literal(),
            Expression::Integer(e) => e.token_literal(),
            Expression::String(e) => e.token_literal(),
            Expression::Boolean(e) => e.token_literal(),
            Expression::Variable(e) => e.token_literal(),
            Expression::Command(e) => e.token_literal(),
            Expression::Pipe(e) => e.token_literal(),
            Expression::Redirection(e) => e.token_literal(),
            Expression::Infix(e) => e.token_literal(),
            Expression::Prefix(e) => e.token_literal(),
            Expression::Call(e) => e.token_literal(),
            Expression::Array(e) => e.token_literal(),
            Expression::Dict(e) => e.token_literal(),
            Expression::Index(e) => e.token_literal(),
        }
    }
}

impl fmt::Display for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expression::Identifier(e) => fmt::Display::fmt(e, f),
            Expression::Path(e) => fmt::Display::fmt(e, f),
            Expression::Integer(e) => fmt::Display::fmt(e, f),
            Expression::String(e) => fmt::Display::fmt(e, f),
            Expression::Boolean(e) => fmt::Display::fmt(e, f),
            Expression::Variable(e) => fmt::Display::fmt(e, f),
            Expression::Command(e) => fmt::Display::fmt(e, f),
            Expression::Pipe(e) => fmt::Display::fmt(e, f),
            Expression::Redirection(e) => fmt::Display::fmt(e, f),
            Expression::Infix(e) => fmt::Display::fmt(e, f),
            Expression::Prefix(e) => fmt::Display::fmt(e, f),
            Expression::Call(e) => fmt::Display::fmt(e, f),
            Expression::Array(e) => fmt::Display::fmt(e, f),
            Expression::Dict(e) => fmt::Display::fmt(e, f),
            Expression::Index(e) => fmt::Display::fmt(e, f),
        }
    }
}

/// A bare name: a variable, or a file name when unbound
#[derive(Debug, Clone, PartialEq)]
pub struct Identifier {
    pub token: Token,
    pub value: String,
}

impl Identifier {
    pub fn from_token(token: Token) -> Self {
        let value = token.literal.clone();
        Self { token, value }
    }
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.value)
    }
}

/// Path tokens fused into one literal, e.g. `./src/main.go`
#[derive(Debug, Clone, PartialEq)]
pub struct PathExpression {
    pub token: Token,
    pub value: String,
}

impl fmt::Display for PathExpression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.value)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct IntegerLiteral {
    pub token: Token,
    pub value: i64,
}

impl fmt::Display for IntegerLiteral {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.token.literal)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct StringLiteral {
    pub token: Token,
    pub value: String,
}

/// Strings have no escapes, so a value holding `"` is rendered in single quotes.
impl fmt::Display for StringLiteral {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let quote = if self.value.contains('"') { '\'' } else { '"' };
        write!(f, "{}{}{}", quote, self.value, quote)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct BooleanLiteral {
    pub token: Token,
    pub value: bool,
}

impl fmt::Display for BooleanLiteral {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.token.literal)
    }
}

/// `$NAME`: environment variable lookup
#[derive(Debug, Clone, PartialEq)]
pub struct VariableReference {
    pub token: Token,
    pub name: Identifier,
}

impl fmt::Display for VariableReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "${}", self.name)
    }
}

/// Builtin shell commands
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CommandKind {
    List,
    Remove,
    ChangeDir,
    RemoveDir,
    MakeDir,
    WhoAmI,
    CurrentDir,
    MakeFile,
    Output,
    Print,
    Show,
    Clear,
    Home,
}

impl CommandKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            CommandKind::List => "ls",
            CommandKind::Remove => "rm",
            CommandKind::ChangeDir => "cd",
            CommandKind::RemoveDir => "rmdir",
            CommandKind::MakeDir => "mkdir",
            CommandKind::WhoAmI => "whoami",
            CommandKind::CurrentDir => "cwd",
            CommandKind::MakeFile => "mkfile",
            CommandKind::Output => "output",
            CommandKind::Print => "print",
            CommandKind::Show => "show",
            CommandKind::Clear => "clear",
            CommandKind::Home => "~",
        }
    }

    pub fn from_token_type(token_type: TokenType) -> Option<Self> {
        let kind = match token_type {
            TokenType::List => CommandKind::List,
            TokenType::Remove => CommandKind::Remove,
            TokenType::ChangeDir => CommandKind::ChangeDir,
            TokenType::RemoveDir => CommandKind::RemoveDir,
            TokenType::MakeDir => CommandKind::MakeDir,
            TokenType::WhoAmI => CommandKind::WhoAmI,
            TokenType::CurrentDir => CommandKind::CurrentDir,
            TokenType::MakeFile => CommandKind::MakeFile,
            TokenType::Output => CommandKind::Output,
            TokenType::Print => CommandKind::Print,
            TokenType::Show => CommandKind::Show,
            TokenType::Clear => CommandKind::Clear,
            TokenType::Tilde => CommandKind::Home,
            _ => return None,
        };
        Some(kind)
    }
}

impl fmt::Display for CommandKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A builtin command with its arguments, e.g. `rm a.txt b.txt`
#[derive(Debug, Clone, PartialEq)]
pub struct Command {
    pub token: Token,
    pub kind: CommandKind,
    pub name: String,
    pub arguments: Vec<Expression>,
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)?;
        for argument in &self.arguments {
            write!(f, " {}", argument)?;
        }
        Ok(())
    }
}

/// `left | right`
#[derive(Debug, Clone, PartialEq)]
pub struct PipeExpression {
    pub token: Token,
    pub left: Box<Expression>,
    pub right: Box<Expression>,
}

impl fmt::Display for PipeExpression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({} | {})", self.left, self.right)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RedirectionKind {
    Output,  // >
    Append,  // >>
    Input,   // <
    Heredoc, // <<
}

impl RedirectionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            RedirectionKind::Output => ">",
            RedirectionKind::Append => ">>",
            RedirectionKind::Input => "<",
            RedirectionKind::Heredoc => "<<",
        }
    }

    pub fn from_token_type(token_type: TokenType) -> Option<Self> {
        match token_type {
            TokenType::Greater => Some(RedirectionKind::Output),
            TokenType::Into => Some(RedirectionKind::Append),
            TokenType::Less => Some(RedirectionKind::Input),
            TokenType::Out => Some(RedirectionKind::Heredoc),
            _ => None,
        }
    }
}

/// `command OP target`
#[derive(Debug, Clone, PartialEq)]
pub struct RedirectionExpression {
    pub token: Token,
    pub kind: RedirectionKind,
    pub command: Box<Expression>,
    pub target: Box<Expression>,
}

impl fmt::Display for RedirectionExpression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({} {} {})", self.command, self.kind.as_str(), self.target)
    }
}

/// `left op right`
#[derive(Debug, Clone, PartialEq)]
pub struct InfixExpression {
    pub token: Token,
    pub left: Box<Expression>,
    pub operator: String,
    pub right: Box<Expression>,
}

impl fmt::Display for InfixExpression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({} {} {})", self.left, self.operator, self.right)
    }
}

/// `!right`
#[derive(Debug, Clone, PartialEq)]
pub struct PrefixExpression {
    pub token: Token,
    pub operator: String,
    pub right: Box<Expression>,
}

impl fmt::Display for PrefixExpression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}{})", self.operator, self.right)
    }
}

/// `name(args)`: a user function or a builtin
#[derive(Debug, Clone, PartialEq)]
pub struct CallExpression {
    pub token: Token,
    pub function: String,
    pub arguments: Vec<Expression>,
}

impl fmt::Display for CallExpression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}(", self.function)?;
        write_joined(f, &self.arguments, ", ")?;
        f.write_str(")")
    }
}

/// `[a, b]`, or `[]hint` for a typed empty array
#[derive(Debug, Clone, PartialEq)]
pub struct ArrayLiteral {
    pub token: Token,
    pub elements: Vec<Expression>,
    pub type_hint: Option<String>,
}

impl fmt::Display for ArrayLiteral {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(hint) = &self.type_hint {
            return write!(f, "[]{}", hint);
        }
        f.write_str("[")?;
        write_joined(f, &self.elements, ", ")?;
        f.write_str("]")
    }
}

/// `{key: value, ...}`; keys are evaluated and stringified at run time
#[derive(Debug, Clone, PartialEq)]
pub struct DictLiteral {
    pub token: Token,
    pub pairs: Vec<(Expression, Expression)>,
}

impl fmt::Display for DictLiteral {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("{")?;
        for (i, (key, value)) in self.pairs.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{}: {}", key, value)?;
        }
        f.write_str("}")
    }
}

/// `left[index]`
#[derive(Debug, Clone, PartialEq)]
pub struct IndexExpression {
    pub token: Token,
    pub left: Box<Expression>,
    pub index: Box<Expression>,
}

impl fmt::Display for IndexExpression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}[{}])", self.left, self.index)
    }
}

impl_node!(
    ExpressionStatement,
    AssignmentStatement,
    BlockStatement,
    ForStatement,
    IfStatement,
    BreakStatement,
    ContinueStatement,
    FunctionStatement,
    ReturnStatement,
    CaseClause,
    SwitchStatement,
    Identifier,
    PathExpression,
    IntegerLiteral,
    StringLiteral,
    BooleanLiteral,
    VariableReference,
    Command,
    PipeExpression,
    RedirectionExpression,
    InfixExpression,
    PrefixExpression,
    CallExpression,
    ArrayLiteral,
    DictLiteral,
    IndexExpression,
);
