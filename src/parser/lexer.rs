//! Hand-written lexer for filter and orderby expression text.

use uuid::Uuid;

use crate::error::{Result, UriqError};
use crate::types::PrimitiveValue;

/// One lexed token with its byte position in the source text.
#[derive(Debug, Clone, PartialEq)]
pub struct Lexeme {
    /// Token kind and payload.
    pub kind: LexKind,
    /// Byte offset of the first character.
    pub position: usize,
}

/// Lexical token kinds.
#[derive(Debug, Clone, PartialEq)]
pub enum LexKind {
    /// Identifier, keyword or dotted name. `$`-prefixed names are allowed
    /// for the implicit range variable.
    Identifier(String),
    /// A literal with its raw text and lexed value. Covers strings, numbers,
    /// and GUIDs; `true`/`false`/`null` are recognized at the parser level.
    Literal { text: String, value: PrimitiveValue },
    /// `(`.
    OpenParen,
    /// `)`.
    CloseParen,
    /// `,`.
    Comma,
    /// `/`.
    Slash,
    /// `:`.
    Colon,
    /// `*`.
    Star,
    /// `-` not followed by a digit.
    Minus,
}

/// Lexes expression text into a token sequence.
pub fn tokenize(input: &str) -> Result<Vec<Lexeme>> {
    let chars: Vec<char> = input.chars().collect();
    let mut lexemes = Vec::new();
    let mut pos = 0;

    while pos < chars.len() {
        let c = chars[pos];
        match c {
            c if c.is_whitespace() => pos += 1,
            '(' => {
                lexemes.push(Lexeme { kind: LexKind::OpenParen, position: pos });
                pos += 1;
            }
            ')' => {
                lexemes.push(Lexeme { kind: LexKind::CloseParen, position: pos });
                pos += 1;
            }
            ',' => {
                lexemes.push(Lexeme { kind: LexKind::Comma, position: pos });
                pos += 1;
            }
            '/' => {
                lexemes.push(Lexeme { kind: LexKind::Slash, position: pos });
                pos += 1;
            }
            ':' => {
                lexemes.push(Lexeme { kind: LexKind::Colon, position: pos });
                pos += 1;
            }
            '*' => {
                lexemes.push(Lexeme { kind: LexKind::Star, position: pos });
                pos += 1;
            }
            '\'' => {
                let lexeme = lex_string(&chars, pos)?;
                pos += lexeme_char_len(&lexeme);
                lexemes.push(lexeme);
            }
            '-' => {
                if chars.get(pos + 1).is_some_and(char::is_ascii_digit) {
                    let lexeme = lex_number(&chars, pos)?;
                    pos += lexeme_char_len(&lexeme);
                    lexemes.push(lexeme);
                } else {
                    lexemes.push(Lexeme { kind: LexKind::Minus, position: pos });
                    pos += 1;
                }
            }
            c if c.is_ascii_digit() => {
                let lexeme = lex_number(&chars, pos)?;
                pos += lexeme_char_len(&lexeme);
                lexemes.push(lexeme);
            }
            c if c.is_alphabetic() || c == '_' || c == '$' => {
                let lexeme = lex_identifier(&chars, pos)?;
                pos += lexeme_char_len(&lexeme);
                lexemes.push(lexeme);
            }
            other => {
                return Err(UriqError::SyntaxError {
                    position: pos,
                    message: format!("unexpected character '{other}'"),
                });
            }
        }
    }

    Ok(lexemes)
}

/// Returns how many source characters a lexeme consumed.
fn lexeme_char_len(lexeme: &Lexeme) -> usize {
    match &lexeme.kind {
        LexKind::Identifier(s) => s.chars().count(),
        LexKind::Literal { text, .. } => text.chars().count(),
        _ => 1,
    }
}

/// Lexes a quoted string literal; `''` inside quotes is an escaped quote.
fn lex_string(chars: &[char], start: usize) -> Result<Lexeme> {
    let mut value = String::new();
    let mut pos = start + 1;
    loop {
        match chars.get(pos) {
            None => {
                return Err(UriqError::SyntaxError {
                    position: start,
                    message: "unterminated string literal".to_string(),
                });
            }
            Some('\'') => {
                if chars.get(pos + 1) == Some(&'\'') {
                    value.push('\'');
                    pos += 2;
                } else {
                    pos += 1;
                    break;
                }
            }
            Some(c) => {
                value.push(*c);
                pos += 1;
            }
        }
    }
    let text: String = chars[start..pos].iter().collect();
    Ok(Lexeme {
        kind: LexKind::Literal {
            text,
            value: PrimitiveValue::String(value),
        },
        position: start,
    })
}

/// Lexes a numeric literal with optional sign, fraction, exponent and type
/// suffix (`L` long, `f` single, `d` double, `m`/`M` decimal).
fn lex_number(chars: &[char], start: usize) -> Result<Lexeme> {
    let mut pos = start;
    if chars.get(pos) == Some(&'-') {
        pos += 1;
    }
    while chars.get(pos).is_some_and(char::is_ascii_digit) {
        pos += 1;
    }
    let mut fractional = false;
    if chars.get(pos) == Some(&'.') && chars.get(pos + 1).is_some_and(char::is_ascii_digit) {
        fractional = true;
        pos += 1;
        while chars.get(pos).is_some_and(char::is_ascii_digit) {
            pos += 1;
        }
    }
    if matches!(chars.get(pos), Some('e' | 'E'))
        && chars
            .get(pos + 1)
            .is_some_and(|c| c.is_ascii_digit() || *c == '-' || *c == '+')
    {
        fractional = true;
        pos += 2;
        while chars.get(pos).is_some_and(char::is_ascii_digit) {
            pos += 1;
        }
    }

    let digits: String = chars[start..pos].iter().collect();
    let suffix = chars.get(pos).copied();
    let (value, consumed_suffix) = match suffix {
        Some('L' | 'l') if !fractional => {
            let v = parse_int::<i64>(&digits, start)?;
            (PrimitiveValue::Int64(v), true)
        }
        Some('f' | 'F') => {
            let v = parse_float::<f32>(&digits, start)?;
            (PrimitiveValue::Single(v), true)
        }
        Some('d' | 'D') => {
            let v = parse_float::<f64>(&digits, start)?;
            (PrimitiveValue::Double(v), true)
        }
        Some('m' | 'M') => (PrimitiveValue::Decimal(digits.clone()), true),
        _ if fractional => {
            let v = parse_float::<f64>(&digits, start)?;
            (PrimitiveValue::Double(v), false)
        }
        _ => {
            // Plain integer: Int32 when it fits, Int64 otherwise.
            let v = parse_int::<i64>(&digits, start)?;
            match i32::try_from(v) {
                Ok(small) => (PrimitiveValue::Int32(small), false),
                Err(_) => (PrimitiveValue::Int64(v), false),
            }
        }
    };
    if consumed_suffix {
        pos += 1;
    }
    let text: String = chars[start..pos].iter().collect();
    Ok(Lexeme {
        kind: LexKind::Literal { text, value },
        position: start,
    })
}

fn parse_int<T: std::str::FromStr>(digits: &str, position: usize) -> Result<T> {
    digits.parse().map_err(|_| UriqError::SyntaxError {
        position,
        message: format!("invalid integer literal '{digits}'"),
    })
}

fn parse_float<T: std::str::FromStr>(digits: &str, position: usize) -> Result<T> {
    digits.parse().map_err(|_| UriqError::SyntaxError {
        position,
        message: format!("invalid numeric literal '{digits}'"),
    })
}

/// Lexes an identifier, keyword or dotted name. A `guid` prefix followed by
/// a quote lexes the quoted text as a GUID literal.
fn lex_identifier(chars: &[char], start: usize) -> Result<Lexeme> {
    let mut pos = start;
    if chars.get(pos) == Some(&'$') {
        pos += 1;
    }
    while pos < chars.len() {
        let c = chars[pos];
        if c.is_alphanumeric() || c == '_' {
            pos += 1;
        } else if c == '.' && chars.get(pos + 1).is_some_and(|n| n.is_alphabetic() || *n == '_')
        {
            pos += 1;
        } else {
            break;
        }
    }
    let name: String = chars[start..pos].iter().collect();

    if name == "guid" && chars.get(pos) == Some(&'\'') {
        let inner = lex_string(chars, pos)?;
        let LexKind::Literal { value: PrimitiveValue::String(raw), .. } = inner.kind else {
            unreachable!("lex_string yields a string literal");
        };
        let parsed = Uuid::parse_str(&raw).map_err(|_| UriqError::SyntaxError {
            position: start,
            message: format!("invalid GUID literal '{raw}'"),
        })?;
        let text: String = chars[start..pos + raw.chars().count() + 2].iter().collect();
        return Ok(Lexeme {
            kind: LexKind::Literal {
                text,
                value: PrimitiveValue::Guid(parsed),
            },
            position: start,
        });
    }

    Ok(Lexeme {
        kind: LexKind::Identifier(name),
        position: start,
    })
}
