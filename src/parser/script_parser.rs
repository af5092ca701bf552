//! Parser that consumes the lexer and builds a `Program`.
//
//  program    ::= stmt* EOF
//  stmt       ::= IDENT '=' expr ';'
//               | 'print' '(' expr ')' ';'
//               | 'if' '(' expr ')' block ('else' block)?
//               | 'while' '(' expr ')' block
//               | block
//  block      ::= '{' stmt* '}'
//
//  expr, loosest first:  ||  &&  == !=  < > <= >=  + -  * /  !  primary
//  primary    ::= INT | FLOAT | STR | IDENT | '(' expr ')' | 'round' '(' expr ')'

use super::error::ParseError;
use super::lexer::{Lexer, Token};
use crate::processor::ast::{BinaryOp, Block, Expr, Program, Stmt};

pub fn parse_program(src: &str) -> Result<Program, ParseError> {
    let mut p = Parser::new(src)?;
    let mut statements = Vec::new();
    while *p.peek() != Token::Eof {
        statements.push(p.parse_stmt()?);
    }
    Ok(Program { statements })
}

/// One precedence level: the operators it accepts and the level below it.
type Level = (&'static [BinaryOp], fn(&mut Parser) -> Result<Expr, ParseError>);

const OR: Level = (&[BinaryOp::Or], Parser::parse_and);
const AND: Level = (&[BinaryOp::And], Parser::parse_equality);
const EQUALITY: Level = (&[BinaryOp::Eq, BinaryOp::Ne], Parser::parse_relational);
const RELATIONAL: Level = (
    &[BinaryOp::Lt, BinaryOp::Gt, BinaryOp::Le, BinaryOp::Ge],
    Parser::parse_additive,
);
const ADDITIVE: Level = (&[BinaryOp::Add, BinaryOp::Sub], Parser::parse_multiplicative);
const MULTIPLICATIVE: Level = (&[BinaryOp::Mul, BinaryOp::Div], Parser::parse_unary);

struct Parser {
    /// Never empty: the lexer always ends with `Eof`.
    tokens: Vec<(Token, usize)>,
    pos: usize,
}

impl Parser {
    fn new(src: &str) -> Result<Self, ParseError> {
        let tokens = Lexer::new(src).collect::<Result<Vec<_>, _>>()?;
        Ok(Self { tokens, pos: 0 })
    }

    fn current(&self) -> &(Token, usize) {
        let last = self.tokens.len().saturating_sub(1);
        &self.tokens[self.pos.min(last)]
    }

    fn peek(&self) -> &Token {
        &self.current().0
    }

    fn advance(&mut self) -> Token {
        let tok = self.current().0.clone();
        if self.pos < self.tokens.len() {
            self.pos += 1;
        }
        tok
    }

    fn unexpected(&self, expected: &str) -> ParseError {
        let (found, line) = self.current();
        ParseError::UnexpectedToken {
            expected: expected.to_string(),
            found: found.to_string(),
            line: *line,
        }
    }

    fn expect(&mut self, expected: Token) -> Result<(), ParseError> {
        if *self.peek() == expected {
            self.advance();
            Ok(())
        } else {
            Err(self.unexpected(&expected.to_string()))
        }
    }

    fn parse_stmt(&mut self) -> Result<Stmt, ParseError> {
        let stmt = match self.peek() {
            Token::Ident(_) => self.parse_assign()?,
            Token::Print => {
                self.advance();
                let value = self.parse_paren_expr()?;
                self.expect(Token::Semicolon)?;
                Stmt::Print { value }
            }
            Token::If => self.parse_if()?,
            Token::While => {
                self.advance();
                let condition = self.parse_paren_expr()?;
                let body = self.parse_block()?;
                Stmt::While { condition, body }
            }
            Token::LBrace => Stmt::Block(self.parse_block()?),
            _ => return Err(self.unexpected("a statement")),
        };

        Ok(stmt)
    }

    fn parse_assign(&mut self) -> Result<Stmt, ParseError> {
        let name = match self.advance() {
            Token::Ident(name) => name,
            _ => return Err(self.unexpected("a variable name")),
        };
        self.expect(Token::Assign)?;
        let value = self.parse_expr()?;
        self.expect(Token::Semicolon)?;
        Ok(Stmt::Assign { name, value })
    }

    fn parse_if(&mut self) -> Result<Stmt, ParseError> {
        self.expect(Token::If)?;
        let condition = self.parse_paren_expr()?;
        let then_block = self.parse_block()?;

        let else_block = if *self.peek() == Token::Else {
            self.advance();
            Some(self.parse_block()?)
        } else {
            None
        };

        Ok(Stmt::If {
            condition,
            then_block,
            else_block,
        })
    }

    fn parse_block(&mut self) -> Result<Block, ParseError> {
        self.expect(Token::LBrace)?;
        let mut statements = Vec::new();
        loop {
            match self.peek() {
                Token::RBrace => break,
                Token::Eof => return Err(self.unexpected("`}`")),
                _ => statements.push(self.parse_stmt()?),
            }
        }
        self.expect(Token::RBrace)?;
        Ok(Block { statements })
    }

    fn parse_paren_expr(&mut self) -> Result<Expr, ParseError> {
        self.expect(Token::LParen)?;
        let expr = self.parse_expr()?;
        self.expect(Token::RParen)?;
        Ok(expr)
    }

    fn parse_expr(&mut self) -> Result<Expr, ParseError> {
        self.parse_level(OR)
    }

    /// Left-associative chain of the operators in `level`.
    fn parse_level(&mut self, (ops, next): Level) -> Result<Expr, ParseError> {
        let mut left = next(self)?;
        while let Token::Op(op) = *self.peek() {
            if !ops.contains(&op) {
                break;
            }
            self.advance();
            let right = next(self)?;
            left = Expr::binary(op, left, right);
        }
        Ok(left)
    }

    fn parse_and(&mut self) -> Result<Expr, ParseError> {
        self.parse_level(AND)
    }

    fn parse_equality(&mut self) -> Result<Expr, ParseError> {
        self.parse_level(EQUALITY)
    }

    fn parse_relational(&mut self) -> Result<Expr, ParseError> {
        self.parse_level(RELATIONAL)
    }

    fn parse_additive(&mut self) -> Result<Expr, ParseError> {
        self.parse_level(ADDITIVE)
    }

    fn parse_multiplicative(&mut self) -> Result<Expr, ParseError> {
        self.parse_level(MULTIPLICATIVE)
    }

    fn parse_unary(&mut self) -> Result<Expr, ParseError> {
        if *self.peek() == Token::Bang {
            self.advance();
            let operand = self.parse_unary()?;
            return Ok(Expr::Not(Box::new(operand)));
        }
        self.parse_primary()
    }

    fn parse_primary(&mut self) -> Result<Expr, ParseError> {
        let expr = match self.peek().clone() {
            Token::Int(n) => Expr::Int(n),
            Token::Float(x) => Expr::Float(x),
            Token::Str(s) => Expr::Str(s),
            Token::Ident(name) => Expr::Var(name),
            Token::LParen => {
                let inner = self.parse_paren_expr()?;
                return Ok(Expr::Group(Box::new(inner)));
            }
            Token::Round => {
                self.advance();
                let inner = self.parse_paren_expr()?;
                return Ok(Expr::Round(Box::new(inner)));
            }
            _ => return Err(self.unexpected("an expression")),
        };
        self.advance();
        Ok(expr)
    }
}
