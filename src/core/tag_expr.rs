// src/core/tag_expr.rs

//! Boolean filter over a project's tags, e.g. `(backend || infra) && !legacy`.
//!
//! Operators may be written symbolically (`&&`, `||`, `!`) or as words (`and`, `or`,
//! `not`, any case). `!` binds tighter than `&&`, which binds tighter than `||`.

use crate::core::errors::ResolveError;
use std::fmt;
use std::iter::Peekable;
use std::vec::IntoIter;

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum TagExpr {
    Tag(String),
    Not(Box<TagExpr>),
    And(Box<TagExpr>, Box<TagExpr>),
    Or(Box<TagExpr>, Box<TagExpr>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Token {
    LParen,
    RParen,
    And,
    Or,
    Not,
    Tag(String),
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::LParen => f.write_str("("),
            Self::RParen => f.write_str(")"),
            Self::And => f.write_str("&&"),
            Self::Or => f.write_str("||"),
            Self::Not => f.write_str("!"),
            Self::Tag(tag) => f.write_str(tag),
        }
    }
}

fn is_delimiter(c: char) -> bool {
    c.is_whitespace() || matches!(c, '(' | ')' | '!' | '&' | '|')
}

fn tokenize(expr: &str) -> Result<Vec<Token>, String> {
    let mut tokens = Vec::new();
    let mut chars = expr.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            c if c.is_whitespace() => {}
            '(' => tokens.push(Token::LParen),
            ')' => tokens.push(Token::RParen),
            '!' => tokens.push(Token::Not),
            '&' => {
                if chars.next_if_eq(&'&').is_none() {
                    return Err("expected '&&'".to_string());
                }
                tokens.push(Token::And);
            }
            '|' => {
                if chars.next_if_eq(&'|').is_none() {
                    return Err("expected '||'".to_string());
                }
                tokens.push(Token::Or);
            }
            first => {
                let mut word = String::from(first);
                while let Some(next) = chars.next_if(|&n| !is_delimiter(n)) {
                    word.push(next);
                }
                let token = match word.to_ascii_lowercase().as_str() {
                    "and" => Token::And,
                    "or" => Token::Or,
                    "not" => Token::Not,
                    _ => Token::Tag(word),
                };
                tokens.push(token);
            }
        }
    }
    Ok(tokens)
}

struct Parser {
    tokens: Peekable<IntoIter<Token>>,
}

impl Parser {
    fn parse_or(&mut self) -> Result<TagExpr, String> {
        let mut left = self.parse_and()?;
        while self.tokens.next_if_eq(&Token::Or).is_some() {
            let right = self.parse_and()?;
            left = TagExpr::Or(Box::new(left), Box::new(right));
        }
        Ok(left)
    }

    fn parse_and(&mut self) -> Result<TagExpr, String> {
        let mut left = self.parse_unary()?;
        while self.tokens.next_if_eq(&Token::And).is_some() {
            let right = self.parse_unary()?;
            left = TagExpr::And(Box::new(left), Box::new(right));
        }
        Ok(left)
    }

    fn parse_unary(&mut self) -> Result<TagExpr, String> {
        if self.tokens.next_if_eq(&Token::Not).is_some() {
            let operand = self.parse_unary()?;
            return Ok(TagExpr::Not(Box::new(operand)));
        }
        self.parse_primary()
    }

    fn parse_primary(&mut self) -> Result<TagExpr, String> {
        match self.tokens.next() {
            Some(Token::Tag(tag)) => Ok(TagExpr::Tag(tag)),
            Some(Token::LParen) => {
                let inner = self.parse_or()?;
                match self.tokens.next() {
                    Some(Token::RParen) => Ok(inner),
                    Some(other) => Err(format!("expected ')' but found '{}'", other)),
                    None => Err("unclosed '('".to_string()),
                }
            }
            Some(other) => Err(format!("unexpected '{}'", other)),
            None => Err("unexpected end of expression".to_string()),
        }
    }
}

impl TagExpr {
    /// Parses a tag expression.
    pub(crate) fn parse(expr: &str) -> Result<Self, ResolveError> {
        let fail = |reason: String| ResolveError::TagExpr {
            expr: expr.to_string(),
            reason,
        };

        let tokens = tokenize(expr).map_err(fail)?;
        if tokens.is_empty() {
            return Err(fail("empty expression".to_string()));
        }

        let mut parser = Parser {
            tokens: tokens.into_iter().peekable(),
        };
        let parsed = parser.parse_or().map_err(fail)?;
        if let Some(extra) = parser.tokens.next() {
            return Err(fail(format!("unexpected '{}'", extra)));
        }
        Ok(parsed)
    }

    /// Evaluates the expression against a tag set. A tag absent from the set is false.
    pub(crate) fn matches(&self, tags: &[String]) -> bool {
        match self {
            Self::Tag(tag) => tags.iter().any(|t| t == tag),
            Self::Not(inner) => !inner.matches(tags),
            Self::And(left, right) => left.matches(tags) && right.matches(tags),
            Self::Or(left, right) => left.matches(tags) || right.matches(tags),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tags(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_precedence() {
        // `a || b && c` groups as `a || (b && c)`.
        let expr = TagExpr::parse("a || b && c").unwrap();
        assert!(expr.matches(&tags(&["a"])));
        assert!(!expr.matches(&tags(&["b"])));
        assert!(expr.matches(&tags(&["b", "c"])));
    }

    #[test]
    fn test_grouping_and_negation() {
        let expr = TagExpr::parse("(frontend || backend) && !legacy").unwrap();
        assert!(expr.matches(&tags(&["frontend"])));
        assert!(expr.matches(&tags(&["backend", "rust"])));
        assert!(!expr.matches(&tags(&["backend", "legacy"])));
        assert!(!expr.matches(&tags(&["docs"])));
    }

    #[test]
    fn test_word_operators() {
        let symbolic = TagExpr::parse("!a && (b || c)").unwrap();
        let words = TagExpr::parse("NOT a AND (b or c)").unwrap();
        assert_eq!(symbolic, words);
    }

    #[test]
    fn test_unknown_tag_is_false() {
        let expr = TagExpr::parse("nonexistent").unwrap();
        assert!(!expr.matches(&tags(&["a", "b"])));
        assert!(TagExpr::parse("!nonexistent").unwrap().matches(&tags(&[])));
    }

    #[test]
    fn test_tags_with_punctuation() {
        let expr = TagExpr::parse("team-a && v1.2").unwrap();
        assert!(expr.matches(&tags(&["team-a", "v1.2"])));
    }

    #[test]
    fn test_malformed_expressions() {
        for bad in ["", "   ", "a &&", "(a || b", "a b", "a & b", "a |", ")", "!"] {
            assert!(
                matches!(TagExpr::parse(bad), Err(ResolveError::TagExpr { .. })),
                "expected error for '{}'",
                bad
            );
        }
    }
}
