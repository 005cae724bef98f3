//! Pattern Lexer (spec.md §4.1): turns pattern source text into a token
//! stream. Grounded on the reference implementation's `core::lex::Lexer`
//! trait/`Error` split, simplified from a user-specifiable CDFA down to a
//! single fixed hand-written scanner, since the pattern grammar (unlike a
//! `padd` specification) is not itself user-definable.

use std::{error, fmt};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenKind {
    Ident(String),
    Amp,      // &
    Pipe,     // |
    Tilde,    // ~
    Caret,    // ^
    Dollar,   // $
    Arrow,    // ->
    FatArrow, // =>
    LParen,
    RParen,
    LBracket,
    RBracket,
    LBrace,
    RBrace,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    /// True if this token was separated from the previous one by at least
    /// one space or tab. The parser uses this to recognize whitespace as an
    /// implicit `And` only between two atom-starting tokens (spec.md §4.2).
    pub preceded_by_space: bool,
    pub position: usize,
}

/// Lex Error: an unknown character in pattern text (spec.md §7 `LexError`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    UnknownChar { position: usize, ch: char },
    InvalidIdentifier { position: usize, text: String },
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::UnknownChar { position, ch } => {
                write!(f, "unknown character '{}' at position {}", ch, position)
            }
            Error::InvalidIdentifier { position, text } => write!(
                f,
                "invalid identifier '{}' at position {} (identifiers cannot start with a digit)",
                text, position
            ),
        }
    }
}

impl error::Error for Error {}

fn is_ident_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

/// Scans `input` into a flat token stream.
pub fn lex(input: &str) -> Result<Vec<Token>, Error> {
    let chars: Vec<char> = input.chars().collect();
    let mut tokens = Vec::new();
    let mut i = 0;
    let mut preceded_by_space = false;

    while i < chars.len() {
        let c = chars[i];

        if c == ' ' || c == '\t' {
            preceded_by_space = true;
            i += 1;
            continue;
        }

        let start = i;
        let kind = match c {
            '&' => {
                i += 1;
                TokenKind::Amp
            }
            '|' => {
                i += 1;
                TokenKind::Pipe
            }
            '~' => {
                i += 1;
                TokenKind::Tilde
            }
            '^' => {
                i += 1;
                TokenKind::Caret
            }
            '$' => {
                i += 1;
                TokenKind::Dollar
            }
            '(' => {
                i += 1;
                TokenKind::LParen
            }
            ')' => {
                i += 1;
                TokenKind::RParen
            }
            '[' => {
                i += 1;
                TokenKind::LBracket
            }
            ']' => {
                i += 1;
                TokenKind::RBracket
            }
            '{' => {
                i += 1;
                TokenKind::LBrace
            }
            '}' => {
                i += 1;
                TokenKind::RBrace
            }
            '-' if chars.get(i + 1) == Some(&'>') => {
                i += 2;
                TokenKind::Arrow
            }
            '=' if chars.get(i + 1) == Some(&'>') => {
                i += 2;
                TokenKind::FatArrow
            }
            c if is_ident_char(c) => {
                let ident_start = i;
                while i < chars.len() && is_ident_char(chars[i]) {
                    i += 1;
                }
                let text: String = chars[ident_start..i].iter().collect();
                if text.chars().next().unwrap().is_ascii_digit() {
                    return Err(Error::InvalidIdentifier {
                        position: ident_start,
                        text,
                    });
                }
                TokenKind::Ident(text)
            }
            other => {
                return Err(Error::UnknownChar {
                    position: start,
                    ch: other,
                })
            }
        };

        tokens.push(Token {
            kind,
            preceded_by_space,
            position: start,
        });
        preceded_by_space = false;
    }

    Ok(tokens)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(input: &str) -> Vec<TokenKind> {
        lex(input).unwrap().into_iter().map(|t| t.kind).collect()
    }

    #[test]
    fn lexes_identifiers_and_operators() {
        assert_eq!(
            kinds("A -> B"),
            vec![
                TokenKind::Ident("A".to_string()),
                TokenKind::Arrow,
                TokenKind::Ident("B".to_string()),
            ]
        );
    }

    #[test]
    fn whitespace_is_recorded_not_emitted() {
        let tokens = lex("A B").unwrap();
        assert_eq!(tokens.len(), 2);
        assert!(!tokens[0].preceded_by_space);
        assert!(tokens[1].preceded_by_space);
    }

    #[test]
    fn fat_arrow_and_arrow_are_distinct() {
        assert_eq!(kinds("=>"), vec![TokenKind::FatArrow]);
        assert_eq!(kinds("->"), vec![TokenKind::Arrow]);
    }

    #[test]
    fn unknown_char_is_an_error() {
        let err = lex("A @ B").unwrap_err();
        assert_eq!(err, Error::UnknownChar { position: 2, ch: '@' });
    }

    #[test]
    fn identifier_cannot_start_with_digit() {
        let err = lex("3abc").unwrap_err();
        assert_eq!(
            err,
            Error::InvalidIdentifier {
                position: 0,
                text: "3abc".to_string()
            }
        );
    }
}
