//! Pratt Parser for Raven Scripts
//!
//! Prefix and infix handlers live in static tables keyed by token type.
//! `parse_expression` runs the classic Pratt loop: one prefix-led
//! expression, then infix handlers while the next token binds tighter than
//! the caller's precedence. Errors are collected rather than returned so a
//! REPL line with one bad statement still yields the rest.

use std::collections::HashMap;

use lazy_static::lazy_static;

use crate::ast::types::*;
use crate::parser::lexer::{Lexer, Token, TokenType};
use crate::parser::types::*;

type PrefixParseFn = fn(&mut Parser) -> Option<Expression>;
type InfixParseFn = fn(&mut Parser, Expression) -> Option<Expression>;

lazy_static! {
    static ref PREFIX_PARSE_FNS: HashMap<TokenType, PrefixParseFn> = {
        let mut m: HashMap<TokenType, PrefixParseFn> = HashMap::new();
        m.insert(TokenType::Ident, Parser::parse_identifier);
        m.insert(TokenType::Integer, Parser::parse_integer_literal);
        m.insert(TokenType::String, Parser::parse_string_literal);
        m.insert(TokenType::True, Parser::parse_boolean);
        m.insert(TokenType::False, Parser::parse_boolean);
        m.insert(TokenType::Dollar, Parser::parse_variable_reference);
        m.insert(TokenType::FullStop, Parser::parse_path_prefix);
        m.insert(TokenType::FSlash, Parser::parse_path_prefix);
        m.insert(TokenType::Tilde, Parser::parse_tilde);
        m.insert(TokenType::Not, Parser::parse_prefix_expression);
        m.insert(TokenType::LParen, Parser::parse_grouped_expression);
        m.insert(TokenType::LBracket, Parser::parse_array_literal);
        m.insert(TokenType::LBrace, Parser::parse_dict_literal);
        for command in [
            TokenType::List,
            TokenType::Remove,
            TokenType::ChangeDir,
            TokenType::RemoveDir,
            TokenType::MakeDir,
            TokenType::WhoAmI,
            TokenType::CurrentDir,
            TokenType::MakeFile,
            TokenType::Output,
            TokenType::Print,
            TokenType::Show,
            TokenType::Clear,
        ] {
            m.insert(command, Parser::parse_command);
        }
        m
    };

    static ref INFIX_PARSE_FNS: HashMap<TokenType, InfixParseFn> = {
        let mut m: HashMap<TokenType, InfixParseFn> = HashMap::new();
        m.insert(TokenType::Pipe, Parser::parse_pipe_expression);
        m.insert(TokenType::Into, Parser::parse_redirection_expression);
        m.insert(TokenType::Out, Parser::parse_redirection_expression);
        m.insert(TokenType::Greater, Parser::parse_redirection_or_comparison);
        m.insert(TokenType::Less, Parser::parse_redirection_or_comparison);
        for op in [
            TokenType::Or,
            TokenType::And,
            TokenType::Eq,
            TokenType::NotEq,
            TokenType::RegexMatch,
            TokenType::GreaterEq,
            TokenType::LessEq,
            TokenType::Plus,
            TokenType::Minus,
            TokenType::Asterisk,
            TokenType::FSlash,
            TokenType::Percent,
        ] {
            m.insert(op, Parser::parse_infix_expression);
        }
        m.insert(TokenType::LBracket, Parser::parse_index_expression);
        m
    };
}

/// Parse a complete source chunk.
pub fn parse(input: &str) -> Result<Program, Vec<ParseError>> {
    let mut parser = Parser::new(input);
    let program = parser.parse_program();
    if parser.errors.is_empty() {
        Ok(program)
    } else {
        tracing::debug!(errors = parser.errors.len(), "parse failed");
        Err(parser.errors)
    }
}

pub struct Parser {
    lexer: Lexer,
    cur: Token,
    peek: Token,
    errors: Vec<ParseError>,
    depth: usize,
}

impl Parser {
    pub fn new(input: &str) -> Self {
        let mut parser = Self {
            lexer: Lexer::new(input),
            cur: Token::eof(),
            peek: Token::eof(),
            errors: Vec::new(),
            depth: 0,
        };
        parser.next_token();
        parser.next_token();
        parser
    }

    pub fn errors(&self) -> &[ParseError] {
        &self.errors
    }

    // =========================================================================
    // Token cursor
    // =========================================================================

    fn next_token(&mut self) {
        self.cur = std::mem::replace(&mut self.peek, self.lexer.next_token());
    }

    fn cur_is(&self, t: TokenType) -> bool {
        self.cur.is(t)
    }

    fn peek_is(&self, t: TokenType) -> bool {
        self.peek.is(t)
    }

    fn peek_on_same_line(&self) -> bool {
        !self.peek.newline_before
    }

    /// True when no whitespace separates the next token from the current one.
    fn peek_adjacent(&self) -> bool {
        !self.peek.space_before
    }

    fn expect_peek(&mut self, t: TokenType) -> Option<()> {
        if self.peek_is(t) {
            self.next_token();
            Some(())
        } else {
            self.peek_error(t);
            None
        }
    }

    fn error(&mut self, token: &Token, message: impl Into<String>) {
        self.errors.push(ParseError::at(token, message));
    }

    fn peek_error(&mut self, t: TokenType) {
        let peek = self.peek.clone();
        self.error(&peek, format!("expected next token to be {}, got {} instead", t, peek.token_type));
    }

    fn no_prefix_parse_fn_error(&mut self) {
        let cur = self.cur.clone();
        if cur.is(TokenType::Illegal) {
            self.error(&cur, format!("illegal token \"{}\"", cur.literal));
        } else {
            self.error(&cur, format!("no prefix parse function for {} found", cur.token_type));
        }
    }

    /// Skip the rest of a failed statement: up to the end of the line,
    /// stopping before a closing brace.
    fn synchronize(&mut self) {
        while !self.peek_is(TokenType::Eof) && self.peek_on_same_line() && !self.peek_is(TokenType::RBrace) {
            self.next_token();
        }
    }

    // =========================================================================
    // Statements
    // =========================================================================

    pub fn parse_program(&mut self) -> Program {
        let mut program = Program::default();
        while !self.cur_is(TokenType::Eof) {
            let before = self.errors.len();
            if let Some(statement) = self.parse_statement() {
                program.statements.push(statement);
            }
            if self.errors.len() > before {
                self.synchronize();
            }
            self.next_token();
        }
        program
    }

    fn parse_statement(&mut self) -> Option<Statement> {
        match self.cur.token_type {
            TokenType::For => self.parse_for_statement(),
            TokenType::If => self.parse_if_statement().map(Statement::If),
            TokenType::Fn => self.parse_function_statement(),
            TokenType::Return => self.parse_return_statement(),
            TokenType::Switch => self.parse_switch_statement(),
            TokenType::Break => Some(Statement::Break(BreakStatement { token: self.cur.clone() })),
            TokenType::Continue => Some(Statement::Continue(ContinueStatement { token: self.cur.clone() })),
            TokenType::LBrace => self.parse_block_statement().map(Statement::Block),
            TokenType::Ident if self.peek_is(TokenType::Assign) => self.parse_assignment_statement(),
            _ => self.parse_expression_statement(),
        }
    }

    fn parse_expression_statement(&mut self) -> Option<Statement> {
        let token = self.cur.clone();
        let expression = self.parse_expression(Precedence::Lowest)?;
        Some(Statement::Expression(ExpressionStatement { token, expression }))
    }

    fn parse_assignment_statement(&mut self) -> Option<Statement> {
        let name = Identifier::from_token(self.cur.clone());
        self.next_token();
        let token = self.cur.clone();
        self.next_token();
        let value = self.parse_expression(Precedence::Lowest)?;
        Some(Statement::Assignment(AssignmentStatement { token, name, value }))
    }

    /// Parse `{ ... }` with the current token on `{`.
    fn parse_block_statement(&mut self) -> Option<BlockStatement> {
        let token = self.cur.clone();
        let mut statements = Vec::new();
        self.next_token();

        while !self.cur_is(TokenType::RBrace) {
            if self.cur_is(TokenType::Eof) {
                let cur = self.cur.clone();
                self.error(&cur, "expected }, got EOF instead");
                return None;
            }
            let before = self.errors.len();
            if let Some(statement) = self.parse_statement() {
                statements.push(statement);
            }
            if self.errors.len() > before {
                self.synchronize();
            }
            self.next_token();
        }

        Some(BlockStatement { token, statements })
    }

    fn parse_for_statement(&mut self) -> Option<Statement> {
        let token = self.cur.clone();
        self.expect_peek(TokenType::Ident)?;
        let variable = Identifier::from_token(self.cur.clone());
        self.expect_peek(TokenType::In)?;
        self.next_token();
        let iterable = self.parse_expression(Precedence::Lowest)?;
        self.expect_peek(TokenType::LBrace)?;
        let body = self.parse_block_statement()?;
        Some(Statement::For(ForStatement { token, variable, iterable, body }))
    }

    fn parse_if_statement(&mut self) -> Option<IfStatement> {
        let token = self.cur.clone();
        self.next_token();
        let condition = self.parse_expression(Precedence::Lowest)?;
        self.expect_peek(TokenType::LBrace)?;
        let consequence = self.parse_block_statement()?;

        let alternative = if self.peek_is(TokenType::Else) {
            self.next_token();
            let else_token = self.cur.clone();
            if self.peek_is(TokenType::If) {
                // `else if` nests as a block holding a single if statement
                self.next_token();
                let nested = self.parse_if_statement()?;
                Some(BlockStatement { token: else_token, statements: vec![Statement::If(nested)] })
            } else {
                self.expect_peek(TokenType::LBrace)?;
                Some(self.parse_block_statement()?)
            }
        } else {
            None
        };

        Some(IfStatement { token, condition, consequence, alternative })
    }

    fn parse_function_statement(&mut self) -> Option<Statement> {
        let token = self.cur.clone();
        self.expect_peek(TokenType::Ident)?;
        let name = Identifier::from_token(self.cur.clone());
        self.expect_peek(TokenType::LParen)?;

        let mut parameters = Vec::new();
        if self.peek_is(TokenType::RParen) {
            self.next_token();
        } else {
            self.expect_peek(TokenType::Ident)?;
            parameters.push(Identifier::from_token(self.cur.clone()));
            while self.peek_is(TokenType::Comma) {
                self.next_token();
                self.expect_peek(TokenType::Ident)?;
                parameters.push(Identifier::from_token(self.cur.clone()));
            }
            self.expect_peek(TokenType::RParen)?;
        }

        self.expect_peek(TokenType::LBrace)?;
        let body = self.parse_block_statement()?;
        Some(Statement::Function(FunctionStatement { token, name, parameters, body }))
    }

    fn parse_return_statement(&mut self) -> Option<Statement> {
        let token = self.cur.clone();
        if self.peek_is(TokenType::RBrace) || self.peek_is(TokenType::Eof) || !self.peek_on_same_line() {
            return Some(Statement::Return(ReturnStatement { token, value: None }));
        }
        self.next_token();
        let value = self.parse_expression(Precedence::Lowest)?;
        Some(Statement::Return(ReturnStatement { token, value: Some(value) }))
    }

    fn parse_switch_statement(&mut self) -> Option<Statement> {
        let token = self.cur.clone();
        self.next_token();
        let subject = self.parse_expression(Precedence::Lowest)?;
        self.expect_peek(TokenType::LBrace)?;

        let mut cases = Vec::new();
        let mut default = None;
        loop {
            self.next_token();
            match self.cur.token_type {
                TokenType::Case => cases.push(self.parse_case_clause()?),
                TokenType::Default => {
                    if self.peek_is(TokenType::Colon) {
                        self.next_token();
                    }
                    self.expect_peek(TokenType::LBrace)?;
                    default = Some(self.parse_block_statement()?);
                }
                TokenType::RBrace => break,
                _ => {
                    let cur = self.cur.clone();
                    self.error(&cur, format!("unexpected token {} in switch statement", cur.token_type));
                    return None;
                }
            }
        }

        Some(Statement::Switch(SwitchStatement { token, subject, cases, default }))
    }

    fn parse_case_clause(&mut self) -> Option<CaseClause> {
        let token = self.cur.clone();
        self.next_token();
        let mut values = vec![self.parse_expression(Precedence::Lowest)?];
        while self.peek_is(TokenType::Comma) {
            self.next_token();
            self.next_token();
            values.push(self.parse_expression(Precedence::Lowest)?);
        }
        self.expect_peek(TokenType::Colon)?;
        self.expect_peek(TokenType::LBrace)?;
        let body = self.parse_block_statement()?;
        Some(CaseClause { token, values, body })
    }

    // =========================================================================
    // Expressions
    // =========================================================================

    pub fn parse_expression(&mut self, precedence: Precedence) -> Option<Expression> {
        if self.depth >= MAX_PARSER_DEPTH {
            let cur = self.cur.clone();
            self.error(&cur, "expression nested too deeply");
            return None;
        }
        self.depth += 1;
        let result = self.parse_expression_within(precedence);
        self.depth -= 1;
        result
    }

    fn parse_expression_within(&mut self, precedence: Precedence) -> Option<Expression> {
        let prefix = match PREFIX_PARSE_FNS.get(&self.cur.token_type) {
            Some(prefix) => *prefix,
            None => {
                self.no_prefix_parse_fn_error();
                return None;
            }
        };
        let mut left = prefix(self)?;

        while !self.peek_is(TokenType::Eof) && precedence < self.peek_precedence(&left) {
            let infix = match INFIX_PARSE_FNS.get(&self.peek.token_type) {
                Some(infix) => *infix,
                None => return Some(left),
            };
            self.next_token();
            left = infix(self, left)?;
        }

        Some(left)
    }

    /// A token on a new line never continues the previous expression.
    fn peek_precedence(&self, left: &Expression) -> Precedence {
        if !self.peek_on_same_line() {
            return Precedence::Lowest;
        }
        match self.peek.token_type {
            TokenType::Greater | TokenType::Less if !left.is_command_like() => Precedence::LessGreater,
            t => infix_precedence(t),
        }
    }

    fn cur_precedence(&self) -> Precedence {
        match self.cur.token_type {
            TokenType::Greater | TokenType::Less => Precedence::LessGreater,
            t => infix_precedence(t),
        }
    }

    fn peek_continues_path(&self) -> bool {
        self.peek_adjacent() && (self.peek_is(TokenType::FSlash) || self.peek_is(TokenType::FullStop))
    }

    fn parse_identifier(&mut self) -> Option<Expression> {
        if self.peek_is(TokenType::LParen) && self.peek_on_same_line() {
            return self.parse_call_expression();
        }
        if self.peek_continues_path() {
            return Some(self.parse_path());
        }
        Some(Expression::Identifier(Identifier::from_token(self.cur.clone())))
    }

    fn parse_integer_literal(&mut self) -> Option<Expression> {
        let token = self.cur.clone();
        match token.literal.parse::<i64>() {
            Ok(value) => Some(Expression::Integer(IntegerLiteral { token, value })),
            Err(_) => {
                self.error(&token, format!("could not parse \"{}\" as integer", token.literal));
                None
            }
        }
    }

    fn parse_string_literal(&mut self) -> Option<Expression> {
        let token = self.cur.clone();
        let value = token.literal.clone();
        Some(Expression::String(StringLiteral { token, value }))
    }

    fn parse_boolean(&mut self) -> Option<Expression> {
        let token = self.cur.clone();
        let value = token.is(TokenType::True);
        Some(Expression::Boolean(BooleanLiteral { token, value }))
    }

    fn parse_variable_reference(&mut self) -> Option<Expression> {
        let token = self.cur.clone();
        if !self.peek_is(TokenType::Ident) {
            self.error(&token, "expected identifier after $");
            return None;
        }
        self.next_token();
        let name = Identifier::from_token(self.cur.clone());
        Some(Expression::Variable(VariableReference { token, name }))
    }

    fn parse_path_prefix(&mut self) -> Option<Expression> {
        Some(self.parse_path())
    }

    /// Fuse path tokens starting at the current one into a single literal.
    ///
    /// Once an extension (`.` followed by a name) has been consumed, only a
    /// `/` may extend the path further.
    fn parse_path(&mut self) -> Expression {
        let token = self.cur.clone();
        let mut value = token.literal.clone();
        let mut last_was_extension = false;

        while is_path_token(self.peek.token_type) && self.peek_adjacent() {
            if last_was_extension && !self.peek_is(TokenType::FSlash) {
                break;
            }
            self.next_token();
            let after_dot = value.ends_with('.');
            value.push_str(&self.cur.literal);
            let is_name = self.cur.is(TokenType::Ident) || self.cur.token_type.is_command();
            last_was_extension = is_name && after_dot;
        }

        Expression::Path(PathExpression { token, value })
    }

    /// `~/...` is a path; a bare `~` is the home command.
    fn parse_tilde(&mut self) -> Option<Expression> {
        if self.peek_is(TokenType::FSlash) && self.peek_adjacent() {
            return Some(self.parse_path());
        }
        let token = self.cur.clone();
        Some(Expression::Command(Command {
            name: token.literal.clone(),
            token,
            kind: CommandKind::Home,
            arguments: Vec::new(),
        }))
    }

    fn parse_command(&mut self) -> Option<Expression> {
        let token = self.cur.clone();
        let kind = CommandKind::from_token_type(token.token_type)?;
        let arguments = self.parse_command_arguments()?;
        Some(Expression::Command(Command { name: token.literal.clone(), token, kind, arguments }))
    }

    /// Consume arguments while the next token can start one.
    fn parse_command_arguments(&mut self) -> Option<Vec<Expression>> {
        let mut arguments = Vec::new();
        while is_argument_token(self.peek.token_type) && self.peek_on_same_line() {
            self.next_token();
            let argument = match self.cur.token_type {
                TokenType::Dollar => self.parse_variable_reference()?,
                TokenType::String => self.parse_string_literal()?,
                TokenType::Integer => self.parse_integer_literal()?,
                TokenType::FullStop | TokenType::FSlash | TokenType::Tilde => self.parse_path(),
                _ => self.parse_argument_identifier()?,
            };
            arguments.push(argument);
        }
        Some(arguments)
    }

    /// An identifier argument directly followed by `(` or `[` is a call or
    /// an index; otherwise it is a name or the start of a path.
    fn parse_argument_identifier(&mut self) -> Option<Expression> {
        if self.peek_is(TokenType::LParen) && !self.peek.space_before {
            return self.parse_call_expression();
        }
        if self.peek_is(TokenType::LBracket) && !self.peek.space_before {
            let left = Expression::Identifier(Identifier::from_token(self.cur.clone()));
            self.next_token();
            return self.parse_index_expression(left);
        }
        if self.peek_continues_path() {
            return Some(self.parse_path());
        }
        Some(Expression::Identifier(Identifier::from_token(self.cur.clone())))
    }

    fn parse_prefix_expression(&mut self) -> Option<Expression> {
        let token = self.cur.clone();
        let operator = token.literal.clone();
        self.next_token();
        let right = self.parse_expression(Precedence::Prefix)?;
        Some(Expression::Prefix(PrefixExpression { token, operator, right: Box::new(right) }))
    }

    fn parse_grouped_expression(&mut self) -> Option<Expression> {
        self.next_token();
        let expression = self.parse_expression(Precedence::Lowest)?;
        self.expect_peek(TokenType::RParen)?;
        Some(expression)
    }

    /// `[a, b]`, `[]`, or `[]hint`.
    fn parse_array_literal(&mut self) -> Option<Expression> {
        let token = self.cur.clone();
        if self.peek_is(TokenType::RBracket) {
            self.next_token();
            let type_hint = if self.peek_is(TokenType::Ident) && !self.peek.space_before {
                self.next_token();
                Some(self.cur.literal.clone())
            } else {
                None
            };
            return Some(Expression::Array(ArrayLiteral { token, elements: Vec::new(), type_hint }));
        }
        let elements = self.parse_expression_list(TokenType::RBracket)?;
        Some(Expression::Array(ArrayLiteral { token, elements, type_hint: None }))
    }

    fn parse_dict_literal(&mut self) -> Option<Expression> {
        let token = self.cur.clone();
        let mut pairs = Vec::new();
        while !self.peek_is(TokenType::RBrace) {
            self.next_token();
            let key = self.parse_expression(Precedence::Lowest)?;
            self.expect_peek(TokenType::Colon)?;
            self.next_token();
            let value = self.parse_expression(Precedence::Lowest)?;
            pairs.push((key, value));
            if !self.peek_is(TokenType::RBrace) {
                self.expect_peek(TokenType::Comma)?;
            }
        }
        self.expect_peek(TokenType::RBrace)?;
        Some(Expression::Dict(DictLiteral { token, pairs }))
    }

    fn parse_call_expression(&mut self) -> Option<Expression> {
        let token = self.cur.clone();
        let function = token.literal.clone();
        self.next_token();
        let arguments = self.parse_expression_list(TokenType::RParen)?;
        Some(Expression::Call(CallExpression { token, function, arguments }))
    }

    /// Comma separated expressions up to `end`, starting just before the
    /// first element.
    fn parse_expression_list(&mut self, end: TokenType) -> Option<Vec<Expression>> {
        let mut list = Vec::new();
        if self.peek_is(end) {
            self.next_token();
            return Some(list);
        }

        self.next_token();
        list.push(self.parse_expression(Precedence::Lowest)?);
        while self.peek_is(TokenType::Comma) {
            self.next_token();
            self.next_token();
            list.push(self.parse_expression(Precedence::Lowest)?);
        }
        self.expect_peek(end)?;
        Some(list)
    }

    fn parse_index_expression(&mut self, left: Expression) -> Option<Expression> {
        let token = self.cur.clone();
        self.next_token();
        let index = self.parse_expression(Precedence::Lowest)?;
        self.expect_peek(TokenType::RBracket)?;
        Some(Expression::Index(IndexExpression { token, left: Box::new(left), index: Box::new(index) }))
    }

    fn parse_infix_expression(&mut self, left: Expression) -> Option<Expression> {
        let token = self.cur.clone();
        let operator = token.literal.clone();
        let precedence = self.cur_precedence();
        self.next_token();
        let right = self.parse_expression(precedence)?;
        Some(Expression::Infix(InfixExpression {
            token,
            left: Box::new(left),
            operator,
            right: Box::new(right),
        }))
    }

    fn parse_pipe_expression(&mut self, left: Expression) -> Option<Expression> {
        let token = self.cur.clone();
        self.next_token();
        let right = self.parse_expression(Precedence::Pipe)?;
        Some(Expression::Pipe(PipeExpression { token, left: Box::new(left), right: Box::new(right) }))
    }

    fn parse_redirection_or_comparison(&mut self, left: Expression) -> Option<Expression> {
        if left.is_command_like() {
            self.parse_redirection_expression(left)
        } else {
            self.parse_infix_expression(left)
        }
    }

    fn parse_redirection_expression(&mut self, left: Expression) -> Option<Expression> {
        let token = self.cur.clone();
        let kind = RedirectionKind::from_token_type(token.token_type)?;
        self.next_token();
        let target = self.parse_redirection_target()?;
        Some(Expression::Redirection(RedirectionExpression {
            token,
            kind,
            command: Box::new(left),
            target: Box::new(target),
        }))
    }

    /// Redirection targets are names, paths, strings or `$VAR`; never a command.
    fn parse_redirection_target(&mut self) -> Option<Expression> {
        match self.cur.token_type {
            t if t == TokenType::Ident || t.is_command() => {
                if self.peek_continues_path() {
                    Some(self.parse_path())
                } else {
                    Some(Expression::Identifier(Identifier::from_token(self.cur.clone())))
                }
            }
            TokenType::FullStop | TokenType::FSlash | TokenType::Tilde => Some(self.parse_path()),
            TokenType::String => self.parse_string_literal(),
            TokenType::Dollar => self.parse_variable_reference(),
            t => {
                let cur = self.cur.clone();
                self.error(&cur, format!("unexpected token {} in redirection target", t));
                None
            }
        }
    }
}
