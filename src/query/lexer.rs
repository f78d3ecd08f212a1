//! Tokenizer for the query expression language.

use crate::error::{EdaError, Result};

#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    Ident(String),
    Number(f64),
    Str(String),
    True,
    False,
    And,
    Or,
    Not,
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
    Plus,
    Minus,
    Star,
    Slash,
    LParen,
    RParen,
}

/// Split an expression into tokens.
///
/// Keywords (`and`, `or`, `not`, `true`, `false`) are case-insensitive;
/// everything else alphabetic is a column reference or function name.
pub fn tokenize(input: &str) -> Result<Vec<Token>> {
    let chars: Vec<char> = input.chars().collect();
    let mut tokens = Vec::new();
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        match c {
            ' ' | '\t' | '\n' | '\r' => i += 1,
            '(' => {
                tokens.push(Token::LParen);
                i += 1;
            }
            ')' => {
                tokens.push(Token::RParen);
                i += 1;
            }
            '+' => {
                tokens.push(Token::Plus);
                i += 1;
            }
            '-' => {
                tokens.push(Token::Minus);
                i += 1;
            }
            '*' => {
                tokens.push(Token::Star);
                i += 1;
            }
            '/' => {
                tokens.push(Token::Slash);
                i += 1;
            }
            '=' => {
                if chars.get(i + 1) == Some(&'=') {
                    tokens.push(Token::Eq);
                    i += 2;
                } else {
                    return Err(EdaError::Query(
                        "single '=' is not valid, use '==' for comparison".to_string(),
                    ));
                }
            }
            '!' => {
                if chars.get(i + 1) == Some(&'=') {
                    tokens.push(Token::Ne);
                    i += 2;
                } else {
                    tokens.push(Token::Not);
                    i += 1;
                }
            }
            '<' => {
                if chars.get(i + 1) == Some(&'=') {
                    tokens.push(Token::Le);
                    i += 2;
                } else {
                    tokens.push(Token::Lt);
                    i += 1;
                }
            }
            '>' => {
                if chars.get(i + 1) == Some(&'=') {
                    tokens.push(Token::Ge);
                    i += 2;
                } else {
                    tokens.push(Token::Gt);
                    i += 1;
                }
            }
            '&' => {
                if chars.get(i + 1) == Some(&'&') {
                    tokens.push(Token::And);
                    i += 2;
                } else {
                    return Err(EdaError::Query("expected '&&'".to_string()));
                }
            }
            '|' => {
                if chars.get(i + 1) == Some(&'|') {
                    tokens.push(Token::Or);
                    i += 2;
                } else {
                    return Err(EdaError::Query("expected '||'".to_string()));
                }
            }
            '"' | '\'' => {
                let quote = c;
                let start = i + 1;
                let mut end = start;
                while end < chars.len() && chars[end] != quote {
                    end += 1;
                }
                if end >= chars.len() {
                    return Err(EdaError::Query("unterminated string literal".to_string()));
                }
                tokens.push(Token::Str(chars[start..end].iter().collect()));
                i = end + 1;
            }
            '0'..='9' | '.' => {
                let start = i;
                let mut end = i;
                while end < chars.len() && (chars[end].is_ascii_digit() || chars[end] == '.') {
                    end += 1;
                }
                let text: String = chars[start..end].iter().collect();
                let value = text.parse::<f64>().map_err(|_| {
                    EdaError::Query(format!("invalid number literal '{}'", text))
                })?;
                tokens.push(Token::Number(value));
                i = end;
            }
            c if c.is_alphabetic() || c == '_' => {
                let start = i;
                let mut end = i;
                while end < chars.len() && (chars[end].is_alphanumeric() || chars[end] == '_') {
                    end += 1;
                }
                let word: String = chars[start..end].iter().collect();
                tokens.push(match word.to_ascii_lowercase().as_str() {
                    "and" => Token::And,
                    "or" => Token::Or,
                    "not" => Token::Not,
                    "true" => Token::True,
                    "false" => Token::False,
                    _ => Token::Ident(word),
                });
                i = end;
            }
            other => {
                return Err(EdaError::Query(format!(
                    "unexpected character '{}' at position {}",
                    other, i
                )));
            }
        }
    }

    if tokens.is_empty() {
        return Err(EdaError::Query("empty expression".to_string()));
    }
    Ok(tokens)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_tokenize_comparison() {
        let tokens = tokenize("age >= 30").unwrap();
        assert_eq!(
            tokens,
            vec![
                Token::Ident("age".to_string()),
                Token::Ge,
                Token::Number(30.0)
            ]
        );
    }

    #[test]
    fn test_tokenize_keywords_case_insensitive() {
        let tokens = tokenize("a AND b Or not c").unwrap();
        assert_eq!(
            tokens,
            vec![
                Token::Ident("a".to_string()),
                Token::And,
                Token::Ident("b".to_string()),
                Token::Or,
                Token::Not,
                Token::Ident("c".to_string()),
            ]
        );
    }

    #[test]
    fn test_tokenize_strings_both_quotes() {
        let tokens = tokenize("city == 'ber' or city == \"ham\"").unwrap();
        assert!(tokens.contains(&Token::Str("ber".to_string())));
        assert!(tokens.contains(&Token::Str("ham".to_string())));
    }

    #[test]
    fn test_tokenize_symbol_operators() {
        let tokens = tokenize("a && b || !c").unwrap();
        assert_eq!(
            tokens,
            vec![
                Token::Ident("a".to_string()),
                Token::And,
                Token::Ident("b".to_string()),
                Token::Or,
                Token::Not,
                Token::Ident("c".to_string()),
            ]
        );
    }

    #[test]
    fn test_tokenize_rejects_bare_equals() {
        assert!(tokenize("a = 1").is_err());
    }

    #[test]
    fn test_tokenize_rejects_unterminated_string() {
        assert!(tokenize("city == 'ber").is_err());
    }

    #[test]
    fn test_tokenize_rejects_unknown_character() {
        let err = tokenize("a ; b").unwrap_err();
        assert!(err.to_string().contains("unexpected character"));
    }

    #[test]
    fn test_tokenize_empty_input() {
        assert!(tokenize("   ").is_err());
    }
}
