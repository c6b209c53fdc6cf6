//! Recursive-descent parser for numeric value expressions
//!
//! ```text
//! expr  := term (("&&" | "||") term)*
//! term  := [statistic] [sign] number ["+-" number]
//! number:= ["-" | "+"] NUMBER
//! ```
//!
//! Connectives share one precedence level and are applied left to right.

use super::lexer::{tokenize, Comparison, Statistic, Token};
use crate::error::{OdimError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Connective {
    And,
    Or,
}

/// One comparison against a literal
#[derive(Debug, Clone, PartialEq)]
pub struct Term {
    pub statistic: Option<Statistic>,
    /// `None` when the sign was omitted; evaluated as equality
    pub comparison: Option<Comparison>,
    pub value: f64,
    /// Half-width of the accepted interval for `center+-tolerance`
    pub tolerance: Option<f64>,
}

impl Term {
    pub fn sign(&self) -> Comparison {
        self.comparison.unwrap_or(Comparison::Equal)
    }
}

/// Parsed numeric expression
#[derive(Debug, Clone, PartialEq)]
pub struct Expression {
    pub text: String,
    pub first: Term,
    pub rest: Vec<(Connective, Term)>,
}

impl Expression {
    pub fn parse(text: &str) -> Result<Self> {
        let tokens = tokenize(text)?;
        let mut parser = Parser {
            text,
            tokens: &tokens,
            pos: 0,
        };
        let first = parser.term()?;
        let mut rest = Vec::new();
        while let Some(token) = parser.next() {
            let connective = match token {
                Token::And => Connective::And,
                Token::Or => Connective::Or,
                other => return Err(parser.error(format!("unexpected {:?} after term", other))),
            };
            rest.push((connective, parser.term()?));
        }
        Ok(Expression {
            text: text.to_string(),
            first,
            rest,
        })
    }

    pub fn terms(&self) -> impl Iterator<Item = &Term> {
        std::iter::once(&self.first).chain(self.rest.iter().map(|(_, t)| t))
    }
}

struct Parser<'a> {
    text: &'a str,
    tokens: &'a [Token],
    pos: usize,
}

impl<'a> Parser<'a> {
    fn peek(&self) -> Option<&'a Token> {
        self.tokens.get(self.pos)
    }

    fn next(&mut self) -> Option<&'a Token> {
        let token = self.tokens.get(self.pos);
        if token.is_some() {
            self.pos += 1;
        }
        token
    }

    fn error(&self, reason: impl Into<String>) -> OdimError {
        OdimError::expression(self.text, reason)
    }

    fn term(&mut self) -> Result<Term> {
        let statistic = match self.peek() {
            Some(Token::Statistic(s)) => {
                self.pos += 1;
                Some(*s)
            }
            _ => None,
        };
        let comparison = match self.peek() {
            Some(Token::Comparison(c)) => {
                self.pos += 1;
                Some(*c)
            }
            _ => None,
        };
        let value = self.number()?;

        let tolerance = match self.peek() {
            Some(Token::PlusMinus) => {
                self.pos += 1;
                if !matches!(comparison, None | Some(Comparison::Equal)) {
                    return Err(self.error("tolerance is only allowed with equality"));
                }
                let tolerance = self.number()?;
                if tolerance < 0.0 {
                    return Err(self.error("negative tolerance"));
                }
                Some(tolerance)
            }
            _ => None,
        };

        Ok(Term {
            statistic,
            comparison,
            value,
            tolerance,
        })
    }

    fn number(&mut self) -> Result<f64> {
        let negative = match self.peek() {
            Some(Token::Minus) => {
                self.pos += 1;
                true
            }
            Some(Token::Plus) => {
                self.pos += 1;
                false
            }
            _ => false,
        };
        match self.next() {
            Some(Token::Number(v)) => Ok(if negative { -*v } else { *v }),
            Some(other) => Err(self.error(format!("expected a number, found {:?}", other))),
            None => Err(self.error("expected a number, found end of expression")),
        }
    }
}
