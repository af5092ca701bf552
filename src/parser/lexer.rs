//! Small hand-written lexer for the language.
//
//  Lexical items:
//
//      Ident    ::= [A-Za-z_][A-Za-z0-9_]*     (minus the keywords)
//      Keyword  ::= print | if | else | while | round
//      Int      ::= [0-9]+                     (fits in i32)
//      Float    ::= [0-9]+ '.' [0-9]+
//      Str      ::= '"' .*? '"'                (no escapes)
//      Symbols  ::= ( ) { } ; = !
//      Ops      ::= + - * / == != < > <= >= && ||
//
//  Whitespace and comments (# until end-of-line) are discarded.

use std::fmt;
use std::iter::Peekable;
use std::str::Chars;

use super::error::ParseError;
use crate::processor::ast::BinaryOp;

#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    Ident(String),
    Int(i32),
    Float(f64),
    Str(String),
    Print,
    If,
    Else,
    While,
    Round,
    LParen,
    RParen,
    LBrace,
    RBrace,
    Semicolon,
    Assign,
    Bang,
    Op(BinaryOp),
    Eof,
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::Ident(name) => write!(f, "identifier `{name}`"),
            Token::Int(n) => write!(f, "number `{n}`"),
            Token::Float(x) => write!(f, "number `{x}`"),
            Token::Str(s) => write!(f, "string {s:?}"),
            Token::Print => f.write_str("`print`"),
            Token::If => f.write_str("`if`"),
            Token::Else => f.write_str("`else`"),
            Token::While => f.write_str("`while`"),
            Token::Round => f.write_str("`round`"),
            Token::LParen => f.write_str("`(`"),
            Token::RParen => f.write_str("`)`"),
            Token::LBrace => f.write_str("`{`"),
            Token::RBrace => f.write_str("`}`"),
            Token::Semicolon => f.write_str("`;`"),
            Token::Assign => f.write_str("`=`"),
            Token::Bang => f.write_str("`!`"),
            Token::Op(op) => write!(f, "`{op}`"),
            Token::Eof => f.write_str("end of input"),
        }
    }
}

#[derive(Clone)]
pub struct Lexer<'a> {
    chars: Peekable<Chars<'a>>,
    line: usize,
    finished: bool,
}

impl<'a> Lexer<'a> {
    pub fn new(src: &'a str) -> Self {
        Self {
            chars: src.chars().peekable(),
            line: 1,
            finished: false,
        }
    }

    fn next_char(&mut self) -> Option<char> {
        let c = self.chars.next();
        if c == Some('\n') {
            self.line += 1;
        }
        c
    }

    fn peek_char(&mut self) -> Option<char> {
        self.chars.peek().copied()
    }

    fn eat(&mut self, expected: char) -> bool {
        if self.peek_char() == Some(expected) {
            self.next_char();
            true
        } else {
            false
        }
    }

    fn consume_while<F: Fn(char) -> bool>(&mut self, pred: F, buf: &mut String) {
        while let Some(c) = self.peek_char() {
            if pred(c) {
                buf.push(c);
                self.next_char();
            } else {
                break;
            }
        }
    }

    fn skip_trivia(&mut self) {
        while let Some(c) = self.peek_char() {
            if c.is_whitespace() {
                self.next_char();
            } else if c == '#' {
                while let Some(c) = self.next_char() {
                    if c == '\n' {
                        break;
                    }
                }
            } else {
                break;
            }
        }
    }

    fn read_word(&mut self, first: char) -> Token {
        let mut word = String::new();
        word.push(first);
        self.consume_while(|c| c.is_ascii_alphanumeric() || c == '_', &mut word);
        match word.as_str() {
            "print" => Token::Print,
            "if" => Token::If,
            "else" => Token::Else,
            "while" => Token::While,
            "round" => Token::Round,
            _ => Token::Ident(word),
        }
    }

    fn read_number(&mut self, first: char) -> Result<Token, ParseError> {
        let mut num = String::new();
        num.push(first);
        self.consume_while(|c| c.is_ascii_digit(), &mut num);

        if !self.eat('.') {
            return num.parse().map(Token::Int).map_err(|_| ParseError::NumberOutOfRange {
                text: num,
                line: self.line,
            });
        }

        num.push('.');
        let digits_at = num.len();
        self.consume_while(|c| c.is_ascii_digit(), &mut num);
        if num.len() == digits_at {
            return Err(ParseError::UnexpectedChar {
                ch: '.',
                line: self.line,
            });
        }
        num.parse().map(Token::Float).map_err(|_| ParseError::NumberOutOfRange {
            text: num,
            line: self.line,
        })
    }

    fn read_text(&mut self) -> Result<Token, ParseError> {
        let start = self.line;
        let mut txt = String::new();
        while let Some(c) = self.next_char() {
            if c == '"' {
                return Ok(Token::Str(txt));
            }
            txt.push(c);
        }
        Err(ParseError::UnterminatedString { line: start })
    }

    /// Second half of a two-character operator such as `&&`.
    fn pair(&mut self, first: char, op: BinaryOp) -> Result<Token, ParseError> {
        if self.eat(first) {
            Ok(Token::Op(op))
        } else {
            Err(ParseError::UnexpectedChar {
                ch: first,
                line: self.line,
            })
        }
    }
}

impl Iterator for Lexer<'_> {
    /// A token and the line it ends on.
    type Item = Result<(Token, usize), ParseError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }

        self.skip_trivia();

        let ch = match self.next_char() {
            Some(c) => c,
            None => {
                self.finished = true;
                return Some(Ok((Token::Eof, self.line)));
            }
        };

        let tok_res = match ch {
            '(' => Ok(Token::LParen),
            ')' => Ok(Token::RParen),
            '{' => Ok(Token::LBrace),
            '}' => Ok(Token::RBrace),
            ';' => Ok(Token::Semicolon),
            '+' => Ok(Token::Op(BinaryOp::Add)),
            '-' => Ok(Token::Op(BinaryOp::Sub)),
            '*' => Ok(Token::Op(BinaryOp::Mul)),
            '/' => Ok(Token::Op(BinaryOp::Div)),
            '=' if self.eat('=') => Ok(Token::Op(BinaryOp::Eq)),
            '=' => Ok(Token::Assign),
            '!' if self.eat('=') => Ok(Token::Op(BinaryOp::Ne)),
            '!' => Ok(Token::Bang),
            '<' if self.eat('=') => Ok(Token::Op(BinaryOp::Le)),
            '<' => Ok(Token::Op(BinaryOp::Lt)),
            '>' if self.eat('=') => Ok(Token::Op(BinaryOp::Ge)),
            '>' => Ok(Token::Op(BinaryOp::Gt)),
            '&' => self.pair('&', BinaryOp::And),
            '|' => self.pair('|', BinaryOp::Or),
            '"' => self.read_text(),
            c if c.is_ascii_digit() => self.read_number(c),
            c if c.is_ascii_alphabetic() || c == '_' => Ok(self.read_word(c)),
            c => Err(ParseError::UnexpectedChar {
                ch: c,
                line: self.line,
            }),
        };

        if tok_res.is_err() {
            self.finished = true;
        }
        Some(tok_res.map(|tok| (tok, self.line)))
    }
}
