//! Recursive-descent parser for query expressions.
//!
//! Grammar, loosest binding first:
//!
//! ```text
//! expr       = or_expr
//! or_expr    = and_expr { ("or" | "||") and_expr }
//! and_expr   = not_expr { ("and" | "&&") not_expr }
//! not_expr   = ("not" | "!") not_expr | comparison
//! comparison = additive [ ("==" | "!=" | "<" | "<=" | ">" | ">=") additive ]
//! additive   = term { ("+" | "-") term }
//! term       = factor { ("*" | "/") factor }
//! factor     = number | string | "true" | "false" | ident
//!            | ident "(" expr ")" | "-" factor | "(" expr ")"
//! ```
//!
//! A bare identifier is a column reference unless it is immediately followed
//! by `(`, in which case it must name one of the built-in functions.

use super::lexer::Token;
use crate::error::{EdaError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    Not,
    Neg,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinOp {
    Add,
    Sub,
    Mul,
    Div,
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
    And,
    Or,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Func {
    Mean,
    Median,
    Min,
    Max,
    Sum,
    Count,
    Filter,
}

impl Func {
    fn from_name(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "mean" => Some(Self::Mean),
            "median" => Some(Self::Median),
            "min" => Some(Self::Min),
            "max" => Some(Self::Max),
            "sum" => Some(Self::Sum),
            "count" => Some(Self::Count),
            "filter" => Some(Self::Filter),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Number(f64),
    Str(String),
    Bool(bool),
    Column(String),
    Unary(UnaryOp, Box<Expr>),
    Binary(BinOp, Box<Expr>, Box<Expr>),
    Call(Func, Box<Expr>),
}

pub fn parse(tokens: Vec<Token>) -> Result<Expr> {
    let mut parser = Parser { tokens, pos: 0 };
    let expr = parser.or_expr()?;
    if let Some(token) = parser.peek() {
        return Err(EdaError::Query(format!(
            "unexpected trailing token {:?}",
            token
        )));
    }
    Ok(expr)
}

struct Parser {
    tokens: Vec<Token>,
    pos: usize,
}

impl Parser {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn advance(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.pos).cloned();
        if token.is_some() {
            self.pos += 1;
        }
        token
    }

    fn eat(&mut self, expected: &Token) -> bool {
        if self.peek() == Some(expected) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn expect(&mut self, expected: Token) -> Result<()> {
        if self.eat(&expected) {
            Ok(())
        } else {
            Err(EdaError::Query(format!(
                "expected {:?}, found {:?}",
                expected,
                self.peek()
            )))
        }
    }

    fn or_expr(&mut self) -> Result<Expr> {
        let mut left = self.and_expr()?;
        while self.eat(&Token::Or) {
            let right = self.and_expr()?;
            left = Expr::Binary(BinOp::Or, Box::new(left), Box::new(right));
        }
        Ok(left)
    }

    fn and_expr(&mut self) -> Result<Expr> {
        let mut left = self.not_expr()?;
        while self.eat(&Token::And) {
            let right = self.not_expr()?;
            left = Expr::Binary(BinOp::And, Box::new(left), Box::new(right));
        }
        Ok(left)
    }

    fn not_expr(&mut self) -> Result<Expr> {
        if self.eat(&Token::Not) {
            let inner = self.not_expr()?;
            return Ok(Expr::Unary(UnaryOp::Not, Box::new(inner)));
        }
        self.comparison()
    }

    fn comparison(&mut self) -> Result<Expr> {
        let left = self.additive()?;
        let op = match self.peek() {
            Some(Token::Eq) => BinOp::Eq,
            Some(Token::Ne) => BinOp::Ne,
            Some(Token::Lt) => BinOp::Lt,
            Some(Token::Le) => BinOp::Le,
            Some(Token::Gt) => BinOp::Gt,
            Some(Token::Ge) => BinOp::Ge,
            _ => return Ok(left),
        };
        self.pos += 1;
        let right = self.additive()?;
        Ok(Expr::Binary(op, Box::new(left), Box::new(right)))
    }

    fn additive(&mut self) -> Result<Expr> {
        let mut left = self.term()?;
        loop {
            let op = match self.peek() {
                Some(Token::Plus) => BinOp::Add,
                Some(Token::Minus) => BinOp::Sub,
                _ => break,
            };
            self.pos += 1;
            let right = self.term()?;
            left = Expr::Binary(op, Box::new(left), Box::new(right));
        }
        Ok(left)
    }

    fn term(&mut self) -> Result<Expr> {
        let mut left = self.factor()?;
        loop {
            let op = match self.peek() {
                Some(Token::Star) => BinOp::Mul,
                Some(Token::Slash) => BinOp::Div,
                _ => break,
            };
            self.pos += 1;
            let right = self.factor()?;
            left = Expr::Binary(op, Box::new(left), Box::new(right));
        }
        Ok(left)
    }

    fn factor(&mut self) -> Result<Expr> {
        match self.advance() {
            Some(Token::Number(value)) => Ok(Expr::Number(value)),
            Some(Token::Str(value)) => Ok(Expr::Str(value)),
            Some(Token::True) => Ok(Expr::Bool(true)),
            Some(Token::False) => Ok(Expr::Bool(false)),
            Some(Token::Minus) => {
                let inner = self.factor()?;
                Ok(Expr::Unary(UnaryOp::Neg, Box::new(inner)))
            }
            Some(Token::LParen) => {
                let inner = self.or_expr()?;
                self.expect(Token::RParen)?;
                Ok(inner)
            }
            Some(Token::Ident(name)) => {
                if self.peek() == Some(&Token::LParen) {
                    let Some(func) = Func::from_name(&name) else {
                        return Err(EdaError::Query(format!("unknown function '{}'", name)));
                    };
                    self.pos += 1;
                    let arg = self.or_expr()?;
                    self.expect(Token::RParen)?;
                    return Ok(Expr::Call(func, Box::new(arg)));
                }
                Ok(Expr::Column(name))
            }
            other => Err(EdaError::Query(format!(
                "expected a value, found {:?}",
                other
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::lexer::tokenize;
    use pretty_assertions::assert_eq;

    fn parse_str(input: &str) -> Result<Expr> {
        parse(tokenize(input)?)
    }

    #[test]
    fn test_parse_comparison() {
        let expr = parse_str("age > 28").unwrap();
        assert_eq!(
            expr,
            Expr::Binary(
                BinOp::Gt,
                Box::new(Expr::Column("age".to_string())),
                Box::new(Expr::Number(28.0)),
            )
        );
    }

    #[test]
    fn test_parse_precedence_and_binds_tighter_than_or() {
        let expr = parse_str("a > 1 or b > 2 and c > 3").unwrap();
        // Must parse as: (a > 1) or ((b > 2) and (c > 3)).
        let Expr::Binary(BinOp::Or, _, right) = expr else {
            panic!("expected top-level or");
        };
        assert!(matches!(*right, Expr::Binary(BinOp::And, _, _)));
    }

    #[test]
    fn test_parse_arithmetic_precedence() {
        let expr = parse_str("1 + 2 * 3").unwrap();
        let Expr::Binary(BinOp::Add, _, right) = expr else {
            panic!("expected top-level add");
        };
        assert!(matches!(*right, Expr::Binary(BinOp::Mul, _, _)));
    }

    #[test]
    fn test_parse_function_call() {
        let expr = parse_str("mean(age)").unwrap();
        assert_eq!(
            expr,
            Expr::Call(Func::Mean, Box::new(Expr::Column("age".to_string())))
        );
    }

    #[test]
    fn test_parse_nested_filter() {
        let expr = parse_str("filter(age > 28 and city == 'ber')").unwrap();
        assert!(matches!(expr, Expr::Call(Func::Filter, _)));
    }

    #[test]
    fn test_parse_unary_minus() {
        let expr = parse_str("-3 + x").unwrap();
        let Expr::Binary(BinOp::Add, left, _) = expr else {
            panic!("expected add");
        };
        assert!(matches!(*left, Expr::Unary(UnaryOp::Neg, _)));
    }

    #[test]
    fn test_parse_unknown_function_rejected() {
        let err = parse_str("exec(age)").unwrap_err();
        assert!(err.to_string().contains("unknown function"));
    }

    #[test]
    fn test_parse_trailing_tokens_rejected() {
        assert!(parse_str("age > 28 29").is_err());
    }

    #[test]
    fn test_parse_unbalanced_parens_rejected() {
        assert!(parse_str("(age > 28").is_err());
    }
}
