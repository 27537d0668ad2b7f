//! lexer.rs - Tokenizer for validation rule expressions.
//!
//! License: MIT OR APACHE 2.0

use crate::rules::ExprError;

#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    Number(f64),
    Str(String),
    Ident(String),
    Plus,
    Minus,
    Star,
    Slash,
    Percent,
    Pow,
    Lt,
    Gt,
    Le,
    Ge,
    EqEq,
    NotEq,
    LParen,
    RParen,
    /// Punctuation the grammar knows about only to reject it with a clear message.
    Other(String),
}

impl Token {
    pub fn describe(&self) -> String {
        match self {
            Token::Number(n) => format!("number {}", n),
            Token::Str(s) => format!("string '{}'", s),
            Token::Ident(name) => format!("name '{}'", name),
            Token::Plus => "'+'".to_string(),
            Token::Minus => "'-'".to_string(),
            Token::Star => "'*'".to_string(),
            Token::Slash => "'/'".to_string(),
            Token::Percent => "'%'".to_string(),
            Token::Pow => "'**'".to_string(),
            Token::Lt => "'<'".to_string(),
            Token::Gt => "'>'".to_string(),
            Token::Le => "'<='".to_string(),
            Token::Ge => "'>='".to_string(),
            Token::EqEq => "'=='".to_string(),
            Token::NotEq => "'!='".to_string(),
            Token::LParen => "'('".to_string(),
            Token::RParen => "')'".to_string(),
            Token::Other(text) => format!("'{}'", text),
        }
    }
}

/// A token plus its character offset in the source.
#[derive(Debug, Clone, PartialEq)]
pub struct Spanned {
    pub token: Token,
    pub pos: usize,
}

const OTHER_PUNCTUATION: &[char] = &[
    '.', ',', '[', ']', '{', '}', ':', ';', '=', '!', '@', '&', '|', '^', '~', '$', '?', '`',
];

pub fn tokenize(source: &str) -> Result<Vec<Spanned>, ExprError> {
    let chars: Vec<char> = source.chars().collect();
    let mut tokens = Vec::new();
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        let start = i;

        if c.is_whitespace() {
            i += 1;
            continue;
        }

        let token = if c.is_ascii_digit() || (c == '.' && peek_is_digit(&chars, i + 1)) {
            let (number, next) = lex_number(&chars, i)?;
            i = next;
            Token::Number(number)
        } else if c == '"' || c == '\'' {
            let (text, next) = lex_string(&chars, i)?;
            i = next;
            Token::Str(text)
        } else if c.is_alphabetic() || c == '_' {
            let mut j = i;
            while j < chars.len() && (chars[j].is_alphanumeric() || chars[j] == '_') {
                j += 1;
            }
            let name: String = chars[i..j].iter().collect();
            i = j;
            Token::Ident(name)
        } else {
            let next = chars.get(i + 1).copied();
            let (token, width) = match (c, next) {
                ('*', Some('*')) => (Token::Pow, 2),
                ('<', Some('=')) => (Token::Le, 2),
                ('>', Some('=')) => (Token::Ge, 2),
                ('=', Some('=')) => (Token::EqEq, 2),
                ('!', Some('=')) => (Token::NotEq, 2),
                ('/', Some('/')) => (Token::Other("//".to_string()), 2),
                ('+', _) => (Token::Plus, 1),
                ('-', _) => (Token::Minus, 1),
                ('*', _) => (Token::Star, 1),
                ('/', _) => (Token::Slash, 1),
                ('%', _) => (Token::Percent, 1),
                ('<', _) => (Token::Lt, 1),
                ('>', _) => (Token::Gt, 1),
                ('(', _) => (Token::LParen, 1),
                (')', _) => (Token::RParen, 1),
                (p, _) if OTHER_PUNCTUATION.contains(&p) => (Token::Other(p.to_string()), 1),
                (other, _) => return Err(ExprError::UnexpectedChar(other, start)),
            };
            i += width;
            token
        };

        tokens.push(Spanned { token, pos: start });
    }

    Ok(tokens)
}

fn peek_is_digit(chars: &[char], idx: usize) -> bool {
    chars.get(idx).is_some_and(|c| c.is_ascii_digit())
}

/// Lexes `123`, `1.5`, `.5`, `1.` and exponent forms like `2e-3`.
fn lex_number(chars: &[char], start: usize) -> Result<(f64, usize), ExprError> {
    let mut j = start;
    while j < chars.len() && chars[j].is_ascii_digit() {
        j += 1;
    }
    if j < chars.len() && chars[j] == '.' {
        j += 1;
        while j < chars.len() && chars[j].is_ascii_digit() {
            j += 1;
        }
    }
    if j < chars.len() && (chars[j] == 'e' || chars[j] == 'E') {
        let mut k = j + 1;
        if k < chars.len() && (chars[k] == '+' || chars[k] == '-') {
            k += 1;
        }
        if peek_is_digit(chars, k) {
            while k < chars.len() && chars[k].is_ascii_digit() {
                k += 1;
            }
            j = k;
        }
    }

    let text: String = chars[start..j].iter().collect();
    // `10abc` is neither a number nor a name.
    if j < chars.len() && (chars[j].is_alphanumeric() || chars[j] == '_') {
        let mut k = j;
        while k < chars.len() && (chars[k].is_alphanumeric() || chars[k] == '_') {
            k += 1;
        }
        let bad: String = chars[start..k].iter().collect();
        return Err(ExprError::InvalidNumber(bad));
    }

    text.parse::<f64>()
        .map(|n| (n, j))
        .map_err(|_| ExprError::InvalidNumber(text))
}

fn lex_string(chars: &[char], start: usize) -> Result<(String, usize), ExprError> {
    let quote = chars[start];
    let mut out = String::new();
    let mut j = start + 1;

    while j < chars.len() {
        match chars[j] {
            c if c == quote => return Ok((out, j + 1)),
            '\\' if j + 1 < chars.len() => {
                let escaped = chars[j + 1];
                out.push(match escaped {
                    'n' => '\n',
                    't' => '\t',
                    'r' => '\r',
                    '0' => '\0',
                    other => other,
                });
                j += 2;
            }
            c => {
                out.push(c);
                j += 1;
            }
        }
    }
    Err(ExprError::UnterminatedString(start))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(src: &str) -> Vec<Token> {
        tokenize(src).unwrap().into_iter().map(|s| s.token).collect()
    }

    #[test]
    fn test_operators_longest_match() {
        assert_eq!(
            kinds("** * <= < >= > == != //"),
            vec![
                Token::Pow,
                Token::Star,
                Token::Le,
                Token::Lt,
                Token::Ge,
                Token::Gt,
                Token::EqEq,
                Token::NotEq,
                Token::Other("//".to_string()),
            ]
        );
    }

    #[test]
    fn test_number_forms() {
        assert_eq!(
            kinds("10 1.5 .5 1. 2e3 2E-1"),
            vec![
                Token::Number(10.0),
                Token::Number(1.5),
                Token::Number(0.5),
                Token::Number(1.0),
                Token::Number(2000.0),
                Token::Number(0.2),
            ]
        );
    }

    #[test]
    fn test_number_glued_to_name_is_rejected() {
        assert!(matches!(tokenize("10abc"), Err(ExprError::InvalidNumber(_))));
    }

    #[test]
    fn test_strings_and_escapes() {
        assert_eq!(
            kinds(r#"'a b' "it\"s""#),
            vec![Token::Str("a b".to_string()), Token::Str("it\"s".to_string())]
        );
        assert!(matches!(
            tokenize("'open"),
            Err(ExprError::UnterminatedString(0))
        ));
    }

    #[test]
    fn test_unknown_character() {
        assert!(matches!(tokenize("value # 3"), Err(ExprError::UnexpectedChar('#', 6))));
    }
}
