//! Arithmetic for chat lines such as `120+35` or `++2000*10%`.
//!
//! Only numeric literals, `+ - * / %`, parentheses and whitespace are
//! accepted; anything else is rejected before evaluation starts.

use std::str::FromStr;

use rust_decimal::Decimal;
use thiserror::Error;

const MAX_EXPR_LEN: usize = 200;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ExprError {
    #[error("empty expression")]
    Empty,
    #[error("expression too long")]
    TooLong,
    #[error("character '{0}' is not allowed")]
    DisallowedChar(char),
    #[error("invalid number '{0}'")]
    InvalidNumber(String),
    #[error("unexpected '{0}'")]
    UnexpectedToken(char),
    #[error("unexpected number {0}")]
    UnexpectedNumber(String),
    #[error("expression ends unexpectedly")]
    UnexpectedEnd,
    #[error("unbalanced parentheses")]
    UnbalancedParens,
    #[error("division by zero")]
    DivisionByZero,
    #[error("number too large")]
    Overflow,
}

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Num(Decimal),
    Op(char),
    Open,
    Close,
}

fn tokenize(input: &str) -> Result<Vec<Token>, ExprError> {
    let mut tokens = Vec::new();
    let mut chars = input.chars().peekable();
    while let Some(&c) = chars.peek() {
        match c {
            c if c.is_whitespace() => {
                chars.next();
            }
            '0'..='9' | '.' => {
                let mut literal = String::new();
                while let Some(&d) = chars.peek() {
                    if d.is_ascii_digit() || d == '.' {
                        literal.push(d);
                        chars.next();
                    } else {
                        break;
                    }
                }
                let value = Decimal::from_str(&literal)
                    .map_err(|_| ExprError::InvalidNumber(literal.clone()))?;
                tokens.push(Token::Num(value));
            }
            '+' | '-' | '*' | '/' | '%' => {
                tokens.push(Token::Op(c));
                chars.next();
            }
            '(' => {
                tokens.push(Token::Open);
                chars.next();
            }
            ')' => {
                tokens.push(Token::Close);
                chars.next();
            }
            other => return Err(ExprError::DisallowedChar(other)),
        }
    }
    Ok(tokens)
}

struct Parser {
    tokens: Vec<Token>,
    pos: usize,
}

impl Parser {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn next(&mut self) -> Option<Token> {
        let tok = self.tokens.get(self.pos).cloned();
        self.pos += 1;
        tok
    }

    // expr := term (('+' | '-') term)*
    fn expr(&mut self) -> Result<Decimal, ExprError> {
        let mut value = self.term()?;
        while let Some(Token::Op(op @ ('+' | '-'))) = self.peek().cloned() {
            self.pos += 1;
            let rhs = self.term()?;
            value = if op == '+' {
                value.checked_add(rhs)
            } else {
                value.checked_sub(rhs)
            }
            .ok_or(ExprError::Overflow)?;
        }
        Ok(value)
    }

    // term := unary (('*' | '/') unary)*
    fn term(&mut self) -> Result<Decimal, ExprError> {
        let mut value = self.unary()?;
        while let Some(Token::Op(op @ ('*' | '/'))) = self.peek().cloned() {
            self.pos += 1;
            let rhs = self.unary()?;
            value = if op == '*' {
                value.checked_mul(rhs).ok_or(ExprError::Overflow)?
            } else {
                if rhs.is_zero() {
                    return Err(ExprError::DivisionByZero);
                }
                value.checked_div(rhs).ok_or(ExprError::Overflow)?
            };
        }
        Ok(value)
    }

    // unary := ('+' | '-') unary | postfix
    fn unary(&mut self) -> Result<Decimal, ExprError> {
        match self.peek() {
            Some(Token::Op('+')) => {
                self.pos += 1;
                self.unary()
            }
            Some(Token::Op('-')) => {
                self.pos += 1;
                Ok(-self.unary()?)
            }
            _ => self.postfix(),
        }
    }

    // postfix := primary '%'*
    fn postfix(&mut self) -> Result<Decimal, ExprError> {
        let mut value = self.primary()?;
        while let Some(Token::Op('%')) = self.peek() {
            self.pos += 1;
            value = value
                .checked_div(Decimal::ONE_HUNDRED)
                .ok_or(ExprError::Overflow)?;
        }
        Ok(value)
    }

    fn primary(&mut self) -> Result<Decimal, ExprError> {
        match self.next() {
            Some(Token::Num(n)) => Ok(n),
            Some(Token::Open) => {
                let value = self.expr()?;
                match self.next() {
                    Some(Token::Close) => Ok(value),
                    Some(Token::Op(c)) => Err(ExprError::UnexpectedToken(c)),
                    Some(Token::Num(n)) => Err(ExprError::UnexpectedNumber(n.to_string())),
                    Some(Token::Open) | None => Err(ExprError::UnbalancedParens),
                }
            }
            Some(Token::Close) => Err(ExprError::UnbalancedParens),
            Some(Token::Op(c)) => Err(ExprError::UnexpectedToken(c)),
            None => Err(ExprError::UnexpectedEnd),
        }
    }
}

/// Evaluate an arithmetic expression. `x%` means `x/100`.
pub fn evaluate(input: &str) -> Result<Decimal, ExprError> {
    if input.chars().count() > MAX_EXPR_LEN {
        return Err(ExprError::TooLong);
    }
    let tokens = tokenize(input)?;
    if tokens.is_empty() {
        return Err(ExprError::Empty);
    }
    let mut parser = Parser { tokens, pos: 0 };
    let value = parser.expr()?;
    match parser.next() {
        None => Ok(value.normalize()),
        Some(Token::Close) => Err(ExprError::UnbalancedParens),
        Some(Token::Op(c)) => Err(ExprError::UnexpectedToken(c)),
        Some(Token::Num(n)) => Err(ExprError::UnexpectedNumber(n.to_string())),
        Some(Token::Open) => Err(ExprError::UnexpectedToken('(')),
    }
}
