//! Lexer for Raven Scripts
//!
//! The lexer turns source text into a lazy stream of tokens that the parser
//! consumes one at a time. It handles:
//! - Single and two-character operators
//! - Quoted strings (`"..."` and `'...'`)
//! - Integers, identifiers and keywords
//! - `#` comments
//!
//! Lexical problems never abort: they surface as `Illegal` tokens for the
//! parser to reject.

use std::collections::HashMap;
use std::fmt;

use lazy_static::lazy_static;

/// Token types for the raven lexer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenType {
    // End of input / lexical error
    Eof,
    Illegal,

    // Literals
    Ident,
    Integer,
    String,

    // Shell commands
    List,       // ls
    Remove,     // rm
    ChangeDir,  // cd
    RemoveDir,  // rmdir
    MakeDir,    // mkdir
    WhoAmI,     // whoami
    CurrentDir, // cwd
    MakeFile,   // mkfile
    Output,     // output
    Print,      // print
    Show,       // show
    Clear,      // clear

    // Script keywords
    For,
    In,
    If,
    Else,
    Fn,
    Return,
    Break,
    Continue,
    Switch,
    Case,
    Default,
    True,
    False,

    // Shell operators
    Pipe,     // |
    Dollar,   // $
    FullStop, // .
    FSlash,   // /
    Tilde,    // ~
    Greater,  // >
    Into,     // >>
    Less,     // <
    Out,      // <<

    // Expression operators
    Or,         // ||
    And,        // &&
    Eq,         // ==
    NotEq,      // !=
    RegexMatch, // =~
    GreaterEq,  // >=
    LessEq,     // <=
    Assign,     // =
    Not,        // !
    Plus,       // +
    Minus,      // -
    Asterisk,   // *
    Percent,    // %

    // Delimiters
    LBrace,   // {
    RBrace,   // }
    LParen,   // (
    RParen,   // )
    LBracket, // [
    RBracket, // ]
    Comma,    // ,
    Colon,    // :
}

impl TokenType {
    pub fn as_str(&self) -> &'static str {
        match self {
            TokenType::Eof => "EOF",
            TokenType::Illegal => "ILLEGAL",
            TokenType::Ident => "IDENT",
            TokenType::Integer => "INTEGER",
            TokenType::String => "STRING",
            TokenType::List => "ls",
            TokenType::Remove => "rm",
            TokenType::ChangeDir => "cd",
            TokenType::RemoveDir => "rmdir",
            TokenType::MakeDir => "mkdir",
            TokenType::WhoAmI => "whoami",
            TokenType::CurrentDir => "cwd",
            TokenType::MakeFile => "mkfile",
            TokenType::Output => "output",
            TokenType::Print => "print",
            TokenType::Show => "show",
            TokenType::Clear => "clear",
            TokenType::For => "for",
            TokenType::In => "in",
            TokenType::If => "if",
            TokenType::Else => "else",
            TokenType::Fn => "fn",
            TokenType::Return => "return",
            TokenType::Break => "break",
            TokenType::Continue => "continue",
            TokenType::Switch => "switch",
            TokenType::Case => "case",
            TokenType::Default => "default",
            TokenType::True => "true",
            TokenType::False => "false",
            TokenType::Pipe => "|",
            TokenType::Dollar => "$",
            TokenType::FullStop => ".",
            TokenType::FSlash => "/",
            TokenType::Tilde => "~",
            TokenType::Greater => ">",
            TokenType::Into => ">>",
            TokenType::Less => "<",
            TokenType::Out => "<<",
            TokenType::Or => "||",
            TokenType::And => "&&",
            TokenType::Eq => "==",
            TokenType::NotEq => "!=",
            TokenType::RegexMatch => "=~",
            TokenType::GreaterEq => ">=",
            TokenType::LessEq => "<=",
            TokenType::Assign => "=",
            TokenType::Not => "!",
            TokenType::Plus => "+",
            TokenType::Minus => "-",
            TokenType::Asterisk => "*",
            TokenType::Percent => "%",
            TokenType::LBrace => "{",
            TokenType::RBrace => "}",
            TokenType::LParen => "(",
            TokenType::RParen => ")",
            TokenType::LBracket => "[",
            TokenType::RBracket => "]",
            TokenType::Comma => ",",
            TokenType::Colon => ":",
        }
    }

    /// True for the keywords that name a builtin shell command.
    pub fn is_command(&self) -> bool {
        matches!(
            self,
            TokenType::List
                | TokenType::Remove
                | TokenType::ChangeDir
                | TokenType::RemoveDir
                | TokenType::MakeDir
                | TokenType::WhoAmI
                | TokenType::CurrentDir
                | TokenType::MakeFile
                | TokenType::Output
                | TokenType::Print
                | TokenType::Show
                | TokenType::Clear
        )
    }
}

impl fmt::Display for TokenType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A token produced by the lexer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub token_type: TokenType,
    pub literal: String,
    pub line: usize,
    pub column: usize,
    /// Whitespace separated this token from the previous one
    pub space_before: bool,
    /// A line break separated this token from the previous one
    pub newline_before: bool,
}

impl Token {
    pub fn new(token_type: TokenType, literal: impl Into<String>, line: usize, column: usize) -> Self {
        Self {
            token_type,
            literal: literal.into(),
            line,
            column,
            space_before: false,
            newline_before: false,
        }
    }

    /// Placeholder used before the parser has read any input.
    pub fn eof() -> Self {
        Self::new(TokenType::Eof, "", 1, 1)
    }

    pub fn is(&self, token_type: TokenType) -> bool {
        self.token_type == token_type
    }
}

lazy_static! {
    /// Identifiers that are re-tagged as keywords after extraction.
    pub static ref KEYWORDS: HashMap<&'static str, TokenType> = {
        let mut m = HashMap::new();
        m.insert("ls", TokenType::List);
        m.insert("rm", TokenType::Remove);
        m.insert("cd", TokenType::ChangeDir);
        m.insert("rmdir", TokenType::RemoveDir);
        m.insert("mkdir", TokenType::MakeDir);
        m.insert("whoami", TokenType::WhoAmI);
        m.insert("cwd", TokenType::CurrentDir);
        m.insert("mkfile", TokenType::MakeFile);
        m.insert("output", TokenType::Output);
        m.insert("print", TokenType::Print);
        m.insert("show", TokenType::Show);
        m.insert("clear", TokenType::Clear);
        m.insert("for", TokenType::For);
        m.insert("in", TokenType::In);
        m.insert("if", TokenType::If);
        m.insert("else", TokenType::Else);
        m.insert("fn", TokenType::Fn);
        m.insert("return", TokenType::Return);
        m.insert("break", TokenType::Break);
        m.insert("continue", TokenType::Continue);
        m.insert("switch", TokenType::Switch);
        m.insert("case", TokenType::Case);
        m.insert("default", TokenType::Default);
        m.insert("true", TokenType::True);
        m.insert("false", TokenType::False);
        m
    };
}

/// Two-character operators, probed before the single-character fallback.
const TWO_CHAR_OPS: &[(char, char, TokenType)] = &[
    ('|', '|', TokenType::Or),
    ('&', '&', TokenType::And),
    ('=', '=', TokenType::Eq),
    ('=', '~', TokenType::RegexMatch),
    ('!', '=', TokenType::NotEq),
    ('>', '>', TokenType::Into),
    ('>', '=', TokenType::GreaterEq),
    ('<', '<', TokenType::Out),
    ('<', '=', TokenType::LessEq),
];

fn single_char_op(c: char) -> Option<TokenType> {
    let t = match c {
        '|' => TokenType::Pipe,
        '$' => TokenType::Dollar,
        '.' => TokenType::FullStop,
        '/' => TokenType::FSlash,
        '~' => TokenType::Tilde,
        '>' => TokenType::Greater,
        '<' => TokenType::Less,
        '=' => TokenType::Assign,
        '!' => TokenType::Not,
        '+' => TokenType::Plus,
        '-' => TokenType::Minus,
        '*' => TokenType::Asterisk,
        '%' => TokenType::Percent,
        '{' => TokenType::LBrace,
        '}' => TokenType::RBrace,
        '(' => TokenType::LParen,
        ')' => TokenType::RParen,
        '[' => TokenType::LBracket,
        ']' => TokenType::RBracket,
        ',' => TokenType::Comma,
        ':' => TokenType::Colon,
        _ => return None,
    };
    Some(t)
}

fn is_ident_start(c: char) -> bool {
    c.is_alphabetic() || c == '_'
}

fn is_ident_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

/// Lexer for raven scripts
pub struct Lexer {
    input: Vec<char>,
    pos: usize,
    line: usize,
    column: usize,
    finished: bool,
}

impl Lexer {
    pub fn new(input: &str) -> Self {
        Self {
            input: input.chars().collect(),
            pos: 0,
            line: 1,
            column: 1,
            finished: false,
        }
    }

    fn peek(&self) -> Option<char> {
        self.input.get(self.pos).copied()
    }

    fn peek_next(&self) -> Option<char> {
        self.input.get(self.pos + 1).copied()
    }

    fn advance(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += 1;
        if c == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
        Some(c)
    }

    /// Skip whitespace and comments. Returns (saw whitespace, saw newline).
    fn skip_trivia(&mut self) -> (bool, bool) {
        let mut space = false;
        let mut newline = false;
        while let Some(c) = self.peek() {
            if c.is_whitespace() {
                space = true;
                if c == '\n' {
                    newline = true;
                }
                self.advance();
            } else if c == '#' {
                space = true;
                while self.peek().map_or(false, |c| c != '\n') {
                    self.advance();
                }
            } else {
                break;
            }
        }
        (space, newline)
    }

    /// Return the next token. Once input is exhausted every call yields `Eof`.
    pub fn next_token(&mut self) -> Token {
        let (space_before, newline_before) = self.skip_trivia();
        let line = self.line;
        let column = self.column;

        let mut token = self.read_token(line, column);
        token.space_before = space_before;
        token.newline_before = newline_before;
        token
    }

    fn read_token(&mut self, line: usize, column: usize) -> Token {
        let c = match self.peek() {
            Some(c) => c,
            None => return Token::new(TokenType::Eof, "", line, column),
        };

        if let Some(next) = self.peek_next() {
            for &(first, second, token_type) in TWO_CHAR_OPS {
                if c == first && next == second {
                    self.advance();
                    self.advance();
                    return Token::new(token_type, format!("{}{}", first, second), line, column);
                }
            }
        }

        if c == '"' || c == '\'' {
            return self.read_string(c, line, column);
        }

        if let Some(token_type) = single_char_op(c) {
            self.advance();
            return Token::new(token_type, c.to_string(), line, column);
        }

        if c.is_ascii_digit() {
            let start = self.pos;
            while self.peek().map_or(false, |c| c.is_ascii_digit()) {
                self.advance();
            }
            let literal: String = self.input[start..self.pos].iter().collect();
            return Token::new(TokenType::Integer, literal, line, column);
        }

        if is_ident_start(c) {
            let start = self.pos;
            while self.peek().map_or(false, is_ident_char) {
                self.advance();
            }
            let literal: String = self.input[start..self.pos].iter().collect();
            let token_type = KEYWORDS.get(literal.as_str()).copied().unwrap_or(TokenType::Ident);
            return Token::new(token_type, literal, line, column);
        }

        // Includes a lone `&`
        self.advance();
        Token::new(TokenType::Illegal, c.to_string(), line, column)
    }

    /// Read a quoted string. The quotes are not part of the literal; an
    /// unterminated string becomes `Illegal` carrying what was read.
    fn read_string(&mut self, quote: char, line: usize, column: usize) -> Token {
        self.advance();
        let start = self.pos;
        while self.peek().map_or(false, |c| c != quote) {
            self.advance();
        }
        let literal: String = self.input[start..self.pos].iter().collect();
        if self.peek() == Some(quote) {
            self.advance();
            Token::new(TokenType::String, literal, line, column)
        } else {
            Token::new(TokenType::Illegal, literal, line, column)
        }
    }

    /// Tokenize the entire input, including the trailing `Eof`.
    pub fn tokenize(mut self) -> Vec<Token> {
        let mut tokens = Vec::new();
        loop {
            let token = self.next_token();
            let done = token.is(TokenType::Eof);
            tokens.push(token);
            if done {
                return tokens;
            }
        }
    }
}

impl Iterator for Lexer {
    type Item = Token;

    /// Yields every token up to and including the first `Eof`.
    fn next(&mut self) -> Option<Token> {
        if self.finished {
            return None;
        }
        let token = self.next_token();
        if token.is(TokenType::Eof) {
            self.finished = true;
        }
        Some(token)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn types(input: &str) -> Vec<TokenType> {
        Lexer::new(input).tokenize().into_iter().map(|t| t.token_type).collect()
    }

    #[test]
    fn test_command_keywords() {
        assert_eq!(
            types("ls rm cd rmdir mkdir whoami cwd mkfile output print show clear"),
            vec![
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
                TokenType::Eof,
            ]
        );
    }

    #[test]
    fn test_two_char_operators() {
        assert_eq!(
            types("|| && == != >= <= >> << =~"),
            vec![
                TokenType::Or,
                TokenType::And,
                TokenType::Eq,
                TokenType::NotEq,
                TokenType::GreaterEq,
                TokenType::LessEq,
                TokenType::Into,
                TokenType::Out,
                TokenType::RegexMatch,
                TokenType::Eof,
            ]
        );
    }

    #[test]
    fn test_single_char_fallback() {
        assert_eq!(
            types("| = ! > < . / ~ $"),
            vec![
                TokenType::Pipe,
                TokenType::Assign,
                TokenType::Not,
                TokenType::Greater,
                TokenType::Less,
                TokenType::FullStop,
                TokenType::FSlash,
                TokenType::Tilde,
                TokenType::Dollar,
                TokenType::Eof,
            ]
        );
    }

    #[test]
    fn test_lone_ampersand_is_illegal() {
        let tokens = Lexer::new("&").tokenize();
        assert_eq!(tokens[0].token_type, TokenType::Illegal);
        assert_eq!(tokens[0].literal, "&");
    }

    #[test]
    fn test_strings() {
        let tokens = Lexer::new(r#""hello world" 'single'"#).tokenize();
        assert_eq!(tokens[0].token_type, TokenType::String);
        assert_eq!(tokens[0].literal, "hello world");
        assert_eq!(tokens[1].token_type, TokenType::String);
        assert_eq!(tokens[1].literal, "single");
    }

    #[test]
    fn test_unterminated_string_is_illegal() {
        let tokens = Lexer::new("\"abc").tokenize();
        assert_eq!(tokens[0].token_type, TokenType::Illegal);
        assert_eq!(tokens[0].literal, "abc");
        assert_eq!(tokens[1].token_type, TokenType::Eof);
    }

    #[test]
    fn test_comments_and_whitespace_skipped() {
        assert_eq!(
            types("ls # list things\n  print"),
            vec![TokenType::List, TokenType::Print, TokenType::Eof]
        );
    }

    #[test]
    fn test_negative_number_is_two_tokens() {
        let tokens = Lexer::new("-42").tokenize();
        assert_eq!(tokens[0].token_type, TokenType::Minus);
        assert_eq!(tokens[1].token_type, TokenType::Integer);
        assert_eq!(tokens[1].literal, "42");
    }

    #[test]
    fn test_identifiers_and_paths() {
        let tokens = Lexer::new("./src/main_1.go").tokenize();
        let literals: Vec<&str> = tokens.iter().map(|t| t.literal.as_str()).collect();
        assert_eq!(literals, vec![".", "/", "src", "/", "main_1", ".", "go", ""]);
        assert_eq!(tokens[2].token_type, TokenType::Ident);
    }

    #[test]
    fn test_positions_and_separators() {
        let tokens = Lexer::new("x = 1\n  print x(").tokenize();
        assert_eq!((tokens[0].line, tokens[0].column), (1, 1));
        assert!(tokens[1].space_before);
        assert!(!tokens[1].newline_before);
        assert_eq!((tokens[3].line, tokens[3].column), (2, 3));
        assert!(tokens[3].newline_before);
        assert!(!tokens[5].space_before);
    }

    #[test]
    fn test_iterator_stops_after_eof() {
        let tokens: Vec<Token> = Lexer::new("ls").collect();
        assert_eq!(tokens.len(), 2);
        assert!(tokens[1].is(TokenType::Eof));
    }

    #[test]
    fn test_unknown_character_is_illegal() {
        let tokens = Lexer::new("@").tokenize();
        assert_eq!(tokens[0].token_type, TokenType::Illegal);
        assert_eq!(tokens[0].literal, "@");
    }
}
