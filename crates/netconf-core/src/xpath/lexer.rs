//! XPath 1.0 tokenizer
//!
//! Applies the lexical disambiguation rules of XPath 1.0 section 3.7: after
//! a token that can end an operand, `*` is multiplication and `and`, `or`,
//! `div`, `mod` are operators.

use crate::errors::{NetconfError, Result};

#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    Slash,
    DoubleSlash,
    LBracket,
    RBracket,
    LParen,
    RParen,
    At,
    Comma,
    Pipe,
    Dot,
    DotDot,
    ColonColon,
    Dollar,
    Plus,
    Minus,
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
    Multiply,
    And,
    Or,
    Div,
    Mod,
    /// Name test wildcard: `*` or `prefix:*`
    Wildcard(Option<String>),
    /// Possibly prefixed name
    Name(Option<String>, String),
    Literal(String),
    Number(f64),
}

impl Token {
    /// Whether an operator must follow this token (it ends an operand)
    fn ends_operand(&self) -> bool {
        matches!(
            self,
            Token::RBracket
                | Token::RParen
                | Token::Dot
                | Token::DotDot
                | Token::Wildcard(_)
                | Token::Name(..)
                | Token::Literal(_)
                | Token::Number(_)
        )
    }
}

fn is_name_start(c: char) -> bool {
    c.is_alphabetic() || c == '_'
}

fn is_name_char(c: char) -> bool {
    c.is_alphanumeric() || matches!(c, '_' | '-' | '.')
}

pub fn tokenize(expr: &str) -> Result<Vec<Token>> {
    let chars: Vec<char> = expr.chars().collect();
    let err = |reason: String| NetconfError::XPathSyntax {
        expr: expr.to_string(),
        reason,
    };
    let mut out: Vec<Token> = Vec::new();
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        if c.is_whitespace() {
            i += 1;
            continue;
        }
        let next = chars.get(i + 1).copied();
        let operator_expected = out.last().is_some_and(Token::ends_operand);

        let token = match c {
            '/' if next == Some('/') => {
                i += 2;
                Token::DoubleSlash
            }
            '/' => {
                i += 1;
                Token::Slash
            }
            '[' => {
                i += 1;
                Token::LBracket
            }
            ']' => {
                i += 1;
                Token::RBracket
            }
            '(' => {
                i += 1;
                Token::LParen
            }
            ')' => {
                i += 1;
                Token::RParen
            }
            '@' => {
                i += 1;
                Token::At
            }
            ',' => {
                i += 1;
                Token::Comma
            }
            '|' => {
                i += 1;
                Token::Pipe
            }
            '$' => {
                i += 1;
                Token::Dollar
            }
            '+' => {
                i += 1;
                Token::Plus
            }
            '-' => {
                i += 1;
                Token::Minus
            }
            '=' => {
                i += 1;
                Token::Eq
            }
            '!' if next == Some('=') => {
                i += 2;
                Token::Ne
            }
            '<' if next == Some('=') => {
                i += 2;
                Token::Le
            }
            '<' => {
                i += 1;
                Token::Lt
            }
            '>' if next == Some('=') => {
                i += 2;
                Token::Ge
            }
            '>' => {
                i += 1;
                Token::Gt
            }
            ':' if next == Some(':') => {
                i += 2;
                Token::ColonColon
            }
            '*' => {
                i += 1;
                if operator_expected {
                    Token::Multiply
                } else {
                    Token::Wildcard(None)
                }
            }
            '.' if next == Some('.') => {
                i += 2;
                Token::DotDot
            }
            '.' if next.is_some_and(|n| n.is_ascii_digit()) => {
                let start = i;
                i += 1;
                while i < chars.len() && chars[i].is_ascii_digit() {
                    i += 1;
                }
                let text: String = chars[start..i].iter().collect();
                Token::Number(text.parse().map_err(|_| err(format!("bad number '{}'", text)))?)
            }
            '.' => {
                i += 1;
                Token::Dot
            }
            '"' | '\'' => {
                let start = i + 1;
                let end = chars[start..]
                    .iter()
                    .position(|&q| q == c)
                    .ok_or_else(|| err("unterminated string literal".to_string()))?;
                i = start + end + 1;
                Token::Literal(chars[start..start + end].iter().collect())
            }
            d if d.is_ascii_digit() => {
                let start = i;
                while i < chars.len() && chars[i].is_ascii_digit() {
                    i += 1;
                }
                if i < chars.len() && chars[i] == '.' {
                    i += 1;
                    while i < chars.len() && chars[i].is_ascii_digit() {
                        i += 1;
                    }
                }
                let text: String = chars[start..i].iter().collect();
                Token::Number(text.parse().map_err(|_| err(format!("bad number '{}'", text)))?)
            }
            n if is_name_start(n) => {
                let start = i;
                while i < chars.len() && is_name_char(chars[i]) {
                    i += 1;
                }
                let first: String = chars[start..i].iter().collect();
                if operator_expected {
                    match first.as_str() {
                        "and" => Token::And,
                        "or" => Token::Or,
                        "div" => Token::Div,
                        "mod" => Token::Mod,
                        _ => return Err(err(format!("unexpected name '{}'", first))),
                    }
                } else if chars.get(i) == Some(&':') && chars.get(i + 1) != Some(&':') {
                    // QName or prefix:*
                    match chars.get(i + 1) {
                        Some('*') => {
                            i += 2;
                            Token::Wildcard(Some(first))
                        }
                        Some(&c2) if is_name_start(c2) => {
                            let lstart = i + 1;
                            i = lstart;
                            while i < chars.len() && is_name_char(chars[i]) {
                                i += 1;
                            }
                            Token::Name(Some(first), chars[lstart..i].iter().collect())
                        }
                        _ => return Err(err(format!("bad qualified name after '{}:'", first))),
                    }
                } else {
                    Token::Name(None, first)
                }
            }
            other => return Err(err(format!("unexpected character '{}'", other))),
        };
        out.push(token);
    }
    Ok(out)
}
