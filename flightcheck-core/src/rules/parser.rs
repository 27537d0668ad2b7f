//! parser.rs - Recursive-descent parser producing [`Expr`] trees.
//!
//! Precedence, lowest first:
//!
//! ```text
//! comparison := arith (cmp_op arith)*
//! arith      := term (('+' | '-') term)*
//! term       := factor (('*' | '/' | '%') factor)*
//! factor     := ('+' | '-') factor | power
//! power      := atom ('**' factor)?
//! atom       := NUMBER | STRING | 'True' | 'False' | 'None' | 'value' | '(' comparison ')'
//! ```
//!
//! License: MIT OR APACHE 2.0

use std::collections::HashSet;

use once_cell::sync::Lazy;

use crate::rules::ast::{BinaryOp, CompareOp, Expr, UnaryOp, Value};
use crate::rules::lexer::{tokenize, Spanned, Token};
use crate::rules::ExprError;

/// Nesting limit for parentheses and unary chains.
pub const MAX_DEPTH: usize = 64;

/// The only free identifier a rule may reference.
pub const SUBJECT_NAME: &str = "value";

static UNSUPPORTED_KEYWORDS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        "and", "or", "not", "in", "is", "if", "else", "lambda", "for", "import",
    ]
    .into_iter()
    .collect()
});

/// Parses a complete expression; trailing tokens are an error.
pub fn parse_expression(source: &str) -> Result<Expr, ExprError> {
    let tokens = tokenize(source)?;
    if tokens.is_empty() {
        return Err(ExprError::Empty);
    }
    let mut parser = Parser {
        tokens,
        pos: 0,
        depth: 0,
    };
    let expr = parser.comparison()?;
    match parser.peek() {
        None => Ok(expr),
        Some(spanned) => Err(parser.reject(spanned.clone())),
    }
}

struct Parser {
    tokens: Vec<Spanned>,
    pos: usize,
    depth: usize,
}

impl Parser {
    fn peek(&self) -> Option<&Spanned> {
        self.tokens.get(self.pos)
    }

    fn peek_token(&self) -> Option<&Token> {
        self.peek().map(|s| &s.token)
    }

    fn advance(&mut self) -> Option<Spanned> {
        let spanned = self.tokens.get(self.pos).cloned();
        if spanned.is_some() {
            self.pos += 1;
        }
        spanned
    }

    fn enter(&mut self) -> Result<(), ExprError> {
        self.depth += 1;
        if self.depth > MAX_DEPTH {
            return Err(ExprError::TooDeep(MAX_DEPTH));
        }
        Ok(())
    }

    fn leave(&mut self) {
        self.depth -= 1;
    }

    fn comparison(&mut self) -> Result<Expr, ExprError> {
        let first = self.arith()?;
        let mut rest = Vec::new();
        while let Some(op) = self.peek_token().and_then(compare_op) {
            self.pos += 1;
            rest.push((op, self.arith()?));
        }
        if rest.is_empty() {
            Ok(first)
        } else {
            Ok(Expr::Compare {
                first: Box::new(first),
                rest,
            })
        }
    }

    fn arith(&mut self) -> Result<Expr, ExprError> {
        let mut left = self.term()?;
        loop {
            let op = match self.peek_token() {
                Some(Token::Plus) => BinaryOp::Add,
                Some(Token::Minus) => BinaryOp::Sub,
                _ => return Ok(left),
            };
            self.pos += 1;
            let right = self.term()?;
            left = binary(op, left, right);
        }
    }

    fn term(&mut self) -> Result<Expr, ExprError> {
        let mut left = self.factor()?;
        loop {
            let op = match self.peek_token() {
                Some(Token::Star) => BinaryOp::Mul,
                Some(Token::Slash) => BinaryOp::Div,
                Some(Token::Percent) => BinaryOp::Mod,
                _ => return Ok(left),
            };
            self.pos += 1;
            let right = self.factor()?;
            left = binary(op, left, right);
        }
    }

    fn factor(&mut self) -> Result<Expr, ExprError> {
        let op = match self.peek_token() {
            Some(Token::Plus) => UnaryOp::Plus,
            Some(Token::Minus) => UnaryOp::Neg,
            _ => return self.power(),
        };
        self.pos += 1;
        self.enter()?;
        let operand = self.factor();
        self.leave();
        Ok(Expr::Unary {
            op,
            operand: Box::new(operand?),
        })
    }

    fn power(&mut self) -> Result<Expr, ExprError> {
        let base = self.atom()?;
        if let Some(Token::Pow) = self.peek_token() {
            self.pos += 1;
            // Right-associative, and binds tighter than a unary minus on its left.
            self.enter()?;
            let exponent = self.factor();
            self.leave();
            return Ok(binary(BinaryOp::Pow, base, exponent?));
        }
        Ok(base)
    }

    fn atom(&mut self) -> Result<Expr, ExprError> {
        let Some(spanned) = self.advance() else {
            return Err(ExprError::UnexpectedEnd);
        };

        let expr = match spanned.token {
            Token::Number(n) => Expr::Literal(Value::Number(n)),
            Token::Str(s) => Expr::Literal(Value::Str(s)),
            Token::Ident(ref name) => self.identifier(name, spanned.pos)?,
            Token::LParen => {
                self.enter()?;
                let inner = self.comparison();
                self.leave();
                let inner = inner?;
                match self.advance() {
                    Some(Spanned {
                        token: Token::RParen,
                        ..
                    }) => inner,
                    Some(other) => return Err(self.reject(other)),
                    None => return Err(ExprError::UnexpectedEnd),
                }
            }
            _ => return Err(self.reject(spanned)),
        };

        self.reject_postfix()?;
        Ok(expr)
    }

    fn identifier(&self, name: &str, pos: usize) -> Result<Expr, ExprError> {
        match name {
            SUBJECT_NAME => Ok(Expr::Subject),
            "True" => Ok(Expr::Literal(Value::Bool(true))),
            "False" => Ok(Expr::Literal(Value::Bool(false))),
            "None" => Ok(Expr::Literal(Value::None)),
            kw if UNSUPPORTED_KEYWORDS.contains(kw) => Err(ExprError::UnsupportedSyntax(
                format!("operator '{}' is not supported (at {})", kw, pos),
            )),
            other => Err(ExprError::UnknownName(other.to_string())),
        }
    }

    /// Calls, attribute access and indexing are recognised only to be refused.
    fn reject_postfix(&self) -> Result<(), ExprError> {
        let Some(next) = self.peek() else {
            return Ok(());
        };
        let what = match &next.token {
            Token::LParen => "function calls are not allowed",
            Token::Other(p) if p == "." => "attribute access is not allowed",
            Token::Other(p) if p == "[" => "indexing is not allowed",
            _ => return Ok(()),
        };
        Err(ExprError::UnsupportedSyntax(format!("{} (at {})", what, next.pos)))
    }

    fn reject(&self, spanned: Spanned) -> ExprError {
        match spanned.token {
            Token::Other(ref p) if p == "=" => ExprError::UnsupportedSyntax(format!(
                "assignment is not allowed, use '==' (at {})",
                spanned.pos
            )),
            Token::Other(ref p) if p == "//" => ExprError::UnsupportedSyntax(format!(
                "operator '//' is not supported (at {})",
                spanned.pos
            )),
            Token::Other(ref p) if p == "," => ExprError::UnsupportedSyntax(format!(
                "tuples are not allowed (at {})",
                spanned.pos
            )),
            Token::Ident(ref kw) if UNSUPPORTED_KEYWORDS.contains(kw.as_str()) => {
                ExprError::UnsupportedSyntax(format!(
                    "operator '{}' is not supported (at {})",
                    kw, spanned.pos
                ))
            }
            ref token => ExprError::UnexpectedToken {
                found: token.describe(),
                pos: spanned.pos,
            },
        }
    }
}

fn compare_op(token: &Token) -> Option<CompareOp> {
    match token {
        Token::Lt => Some(CompareOp::Lt),
        Token::Gt => Some(CompareOp::Gt),
        Token::Le => Some(CompareOp::Le),
        Token::Ge => Some(CompareOp::Ge),
        Token::EqEq => Some(CompareOp::Eq),
        Token::NotEq => Some(CompareOp::Ne),
        _ => None,
    }
}

fn binary(op: BinaryOp, left: Expr, right: Expr) -> Expr {
    Expr::Binary {
        op,
        left: Box::new(left),
        right: Box::new(right),
    }
}
