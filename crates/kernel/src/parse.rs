//! Text to [`Expr`].
//!
//! `^` is right-associative and binds tighter than unary minus, so `-x^2`
//! is `-(x^2)` while `x^-2` raises to the literal `-2`. A minus in front of
//! a bare number folds into the literal; in front of anything else it
//! becomes `(-1) * e`. That keeps `x^(-1/3)`, `x^(1/-3)` and `x^-(1/3)` in
//! the fraction shapes the power evaluator recognizes.

use std::f64::consts::{E, PI};

use logos::Logos;

use crate::error::ParseError;
use crate::expr::{BinaryOp, Comparison, Expr, UnaryOp};

/// Deepest nesting of parentheses, calls and unary operators accepted.
const MAX_DEPTH: usize = 256;

#[derive(Logos, Clone, Debug, PartialEq)]
#[logos(skip r"[ \t\r\n]+")]
enum Token {
    #[regex(r"[0-9]+(\.[0-9]*)?([eE][+-]?[0-9]+)?", |lex| lex.slice().parse::<f64>().ok())]
    #[regex(r"\.[0-9]+([eE][+-]?[0-9]+)?", |lex| lex.slice().parse::<f64>().ok())]
    Number(f64),
    #[regex(r"[a-zA-Z][a-zA-Z0-9_]*", |lex| lex.slice().to_string())]
    Ident(String),
    #[token("+")]
    Plus,
    #[token("-")]
    Minus,
    #[token("*")]
    Star,
    #[token("/")]
    Slash,
    #[token("^")]
    Caret,
    #[token("(")]
    LParen,
    #[token(")")]
    RParen,
    #[token(",")]
    Comma,
    #[token("<", |_| Comparison::Less)]
    #[token("<=", |_| Comparison::LessEq)]
    #[token(">", |_| Comparison::Greater)]
    #[token(">=", |_| Comparison::GreaterEq)]
    Cmp(Comparison),
}

fn lex(src: &str) -> Result<Vec<(Token, usize)>, ParseError> {
    let mut lexer = Token::lexer(src);
    let mut tokens = Vec::new();
    while let Some(token) = lexer.next() {
        let offset = lexer.span().start;
        match token {
            Ok(token) => tokens.push((token, offset)),
            Err(()) => {
                let text = lexer.slice();
                return Err(ParseError::new(offset, format!("unexpected `{text}`")));
            }
        }
    }
    Ok(tokens)
}

struct Parser {
    tokens: Vec<(Token, usize)>,
    pos: usize,
    end: usize,
    depth: usize,
}

pub fn parse(src: &str) -> Result<Expr, ParseError> {
    let mut parser = Parser {
        tokens: lex(src)?,
        pos: 0,
        end: src.len(),
        depth: 0,
    };
    let expr = parser.sum()?;
    if parser.peek().is_some() {
        return Err(ParseError::new(parser.offset(), "expected end of input"));
    }
    Ok(expr)
}

impl Parser {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos).map(|(t, _)| t)
    }

    fn offset(&self) -> usize {
        self.tokens.get(self.pos).map_or(self.end, |(_, o)| *o)
    }

    fn bump(&mut self) -> Option<Token> {
        let token = self.peek().cloned();
        if token.is_some() {
            self.pos += 1;
        }
        token
    }

    fn eat(&mut self, token: &Token) -> bool {
        if self.peek() == Some(token) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn expect(&mut self, token: &Token, what: &str) -> Result<(), ParseError> {
        if self.eat(token) {
            Ok(())
        } else {
            Err(ParseError::new(self.offset(), format!("expected {what}")))
        }
    }

    fn sum(&mut self) -> Result<Expr, ParseError> {
        let mut lhs = self.product()?;
        loop {
            let op = match self.peek() {
                Some(Token::Plus) => BinaryOp::Plus,
                Some(Token::Minus) => BinaryOp::Minus,
                _ => return Ok(lhs),
            };
            self.pos += 1;
            lhs = Expr::binary(op, lhs, self.product()?);
        }
    }

    fn product(&mut self) -> Result<Expr, ParseError> {
        let mut lhs = self.unary()?;
        loop {
            let op = match self.peek() {
                Some(Token::Star) => BinaryOp::Multiply,
                Some(Token::Slash) => BinaryOp::Divide,
                _ => return Ok(lhs),
            };
            self.pos += 1;
            lhs = Expr::binary(op, lhs, self.unary()?);
        }
    }

    /// Every recursive path passes through here, so this is where nesting
    /// is bounded.
    fn unary(&mut self) -> Result<Expr, ParseError> {
        if self.depth == MAX_DEPTH {
            return Err(ParseError::new(self.offset(), "expression is nested too deeply"));
        }
        self.depth += 1;
        let expr = self.signed();
        self.depth -= 1;
        expr
    }

    fn signed(&mut self) -> Result<Expr, ParseError> {
        if self.eat(&Token::Minus) {
            return Ok(self.unary()?.neg());
        }
        if self.eat(&Token::Plus) {
            return self.unary();
        }
        self.power()
    }

    fn power(&mut self) -> Result<Expr, ParseError> {
        let base = self.primary()?;
        if self.eat(&Token::Caret) {
            return Ok(base.pow(self.unary()?));
        }
        Ok(base)
    }

    fn primary(&mut self) -> Result<Expr, ParseError> {
        let offset = self.offset();
        match self.bump() {
            Some(Token::Number(v)) => Ok(Expr::c(v)),
            Some(Token::LParen) => {
                let first = self.sum()?;
                if !self.eat(&Token::Comma) {
                    self.expect(&Token::RParen, "`)`")?;
                    return Ok(first);
                }
                let mut items = vec![first];
                loop {
                    items.push(self.sum()?);
                    if !self.eat(&Token::Comma) {
                        break;
                    }
                }
                self.expect(&Token::RParen, "`)`")?;
                Ok(Expr::Vector(items))
            }
            Some(Token::Ident(name)) => self.identifier(&name, offset),
            _ => Err(ParseError::new(offset, "expected an operand")),
        }
    }

    fn identifier(&mut self, name: &str, offset: usize) -> Result<Expr, ParseError> {
        match name {
            "x" => return Ok(Expr::X),
            "e" => return Ok(Expr::c(E)),
            "pi" => return Ok(Expr::c(PI)),
            _ => {}
        }
        self.expect(&Token::LParen, "`(` after a function name")?;
        let expr = match name {
            "diff" => self.sum()?.diff(),
            "nroot" | "min" | "max" => {
                let op = match name {
                    "nroot" => BinaryOp::NRoot,
                    "min" => BinaryOp::Min,
                    _ => BinaryOp::Max,
                };
                let a = self.sum()?;
                self.expect(&Token::Comma, "`,`")?;
                Expr::binary(op, a, self.sum()?)
            }
            "if" => {
                let lhs = self.sum()?;
                let cmp = match self.bump() {
                    Some(Token::Cmp(cmp)) => cmp,
                    _ => return Err(ParseError::new(self.offset(), "expected a comparison")),
                };
                let rhs = self.sum()?;
                self.expect(&Token::Comma, "`,`")?;
                let then = self.sum()?;
                let otherwise = if self.eat(&Token::Comma) {
                    Some(self.sum()?)
                } else {
                    None
                };
                Expr::when(lhs, cmp, rhs, then, otherwise)
            }
            _ => {
                let op = UnaryOp::from_name(name)
                    .ok_or_else(|| ParseError::new(offset, format!("unknown function `{name}`")))?;
                Expr::unary(op, self.sum()?)
            }
        };
        self.expect(&Token::RParen, "`)`")?;
        Ok(expr)
    }
}
