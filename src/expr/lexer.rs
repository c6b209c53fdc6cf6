//! Tokenizer for numeric value expressions

use crate::error::{OdimError, Result};

/// Array reduction keyword
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Statistic {
    First,
    Last,
    Min,
    Max,
    Mean,
}

impl Statistic {
    fn parse(word: &str) -> Option<Self> {
        match word {
            "first" => Some(Statistic::First),
            "last" => Some(Statistic::Last),
            "min" => Some(Statistic::Min),
            "max" => Some(Statistic::Max),
            "mean" => Some(Statistic::Mean),
            _ => None,
        }
    }
}

/// Comparison sign
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Comparison {
    Equal,
    Less,
    LessEqual,
    Greater,
    GreaterEqual,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    Number(f64),
    Statistic(Statistic),
    Comparison(Comparison),
    PlusMinus,
    Minus,
    Plus,
    And,
    Or,
}

/// Split `text` into tokens
pub fn tokenize(text: &str) -> Result<Vec<Token>> {
    let chars: Vec<char> = text.chars().collect();
    let mut tokens = Vec::new();
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        let next = chars.get(i + 1).copied();
        match c {
            c if c.is_whitespace() => i += 1,
            '&' => {
                if next != Some('&') {
                    return Err(OdimError::expression(text, "single '&', expected '&&'"));
                }
                tokens.push(Token::And);
                i += 2;
            }
            '|' => {
                if next != Some('|') {
                    return Err(OdimError::expression(text, "single '|', expected '||'"));
                }
                tokens.push(Token::Or);
                i += 2;
            }
            '=' => {
                tokens.push(Token::Comparison(Comparison::Equal));
                i += if next == Some('=') { 2 } else { 1 };
            }
            '<' => {
                if next == Some('=') {
                    tokens.push(Token::Comparison(Comparison::LessEqual));
                    i += 2;
                } else {
                    tokens.push(Token::Comparison(Comparison::Less));
                    i += 1;
                }
            }
            '>' => {
                if next == Some('=') {
                    tokens.push(Token::Comparison(Comparison::GreaterEqual));
                    i += 2;
                } else {
                    tokens.push(Token::Comparison(Comparison::Greater));
                    i += 1;
                }
            }
            '+' => {
                if next == Some('-') {
                    tokens.push(Token::PlusMinus);
                    i += 2;
                } else {
                    tokens.push(Token::Plus);
                    i += 1;
                }
            }
            '-' => {
                tokens.push(Token::Minus);
                i += 1;
            }
            c if c.is_ascii_digit() || c == '.' => {
                let start = i;
                while i < chars.len() && (chars[i].is_ascii_digit() || chars[i] == '.') {
                    i += 1;
                }
                // exponent: e/E, optional sign, digits
                if i < chars.len() && (chars[i] == 'e' || chars[i] == 'E') {
                    let mut j = i + 1;
                    if j < chars.len() && (chars[j] == '+' || chars[j] == '-') {
                        j += 1;
                    }
                    if j < chars.len() && chars[j].is_ascii_digit() {
                        while j < chars.len() && chars[j].is_ascii_digit() {
                            j += 1;
                        }
                        i = j;
                    }
                }
                let literal: String = chars[start..i].iter().collect();
                let value = literal.parse::<f64>().map_err(|_| {
                    OdimError::expression(text, format!("'{}' is not a number", literal))
                })?;
                tokens.push(Token::Number(value));
            }
            c if c.is_ascii_alphabetic() => {
                let start = i;
                while i < chars.len() && chars[i].is_ascii_alphanumeric() {
                    i += 1;
                }
                let word: String = chars[start..i].iter().collect();
                let statistic = Statistic::parse(&word).ok_or_else(|| {
                    OdimError::expression(text, format!("unknown keyword '{}'", word))
                })?;
                tokens.push(Token::Statistic(statistic));
            }
            other => {
                return Err(OdimError::expression(
                    text,
                    format!("unexpected character '{}'", other),
                ))
            }
        }
    }

    Ok(tokens)
}
