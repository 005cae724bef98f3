//! Pattern Parser (spec.md §4.2): recursive descent over the token stream
//! from `core::lex`, building the expression tree described in spec.md §3.
//!
//! Grounded on the reference implementation's `core::parse::Tree` (a plain
//! tagged tree rather than a visitor/subclass hierarchy, per spec.md §9's
//! design note) and its `Grammar`/`Error` split; the parsing algorithm
//! itself is hand-written recursive descent rather than the reference's
//! Earley chart parser, since the pattern grammar's precedence levels are
//! fixed and small enough not to need general context-free parsing.

use std::{error, fmt};

use crate::core::lex::{self, Token, TokenKind};

/// The expression tree (spec.md §3 "Expression tree"). A tagged
/// sum-of-variants value, exhaustively matched by the evaluator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Expr {
    Elem(String),
    InElem(String),
    OutElem(String),
    First(Box<Expr>),
    Last(Box<Expr>),
    Not(Box<Expr>),
    And(Vec<Expr>),
    Or(Vec<Expr>),
    Intersect(Vec<Expr>),
    Seq(Box<Expr>, Box<Expr>),
    LooseSeq(Box<Expr>, Box<Expr>),
    Slice(Box<Expr>, bool, bool),
}

/// Parse Error: a structural error in pattern text (spec.md §7 `ParseError`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    Lex(lex::Error),
    UnexpectedEnd { expected: &'static str },
    UnexpectedToken { position: usize, expected: &'static str },
    EmptyGroup { position: usize },
    UnmatchedDelimiter { position: usize, delimiter: &'static str },
    TrailingInput { position: usize },
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::Lex(err) => write!(f, "{}", err),
            Error::UnexpectedEnd { expected } => {
                write!(f, "unexpected end of pattern, expected {}", expected)
            }
            Error::UnexpectedToken { position, expected } => write!(
                f,
                "unexpected token at position {}, expected {}",
                position, expected
            ),
            Error::EmptyGroup { position } => {
                write!(f, "empty group at position {}", position)
            }
            Error::UnmatchedDelimiter { position, delimiter } => write!(
                f,
                "unmatched delimiter '{}' at position {}",
                delimiter, position
            ),
            Error::TrailingInput { position } => {
                write!(f, "unexpected trailing input at position {}", position)
            }
        }
    }
}

impl error::Error for Error {
    fn source(&self) -> Option<&(dyn error::Error + 'static)> {
        match self {
            Error::Lex(err) => Some(err),
            _ => None,
        }
    }
}

impl From<lex::Error> for Error {
    fn from(err: lex::Error) -> Self {
        Error::Lex(err)
    }
}

/// Parses `input` into an expression tree.
pub fn parse(input: &str) -> Result<Expr, Error> {
    let tokens = lex::lex(input)?;
    let mut parser = Parser { tokens, pos: 0 };
    let expr = parser.parse_or()?;
    if parser.pos != parser.tokens.len() {
        let position = parser.tokens[parser.pos].position;
        return Err(Error::TrailingInput { position });
    }
    Ok(expr)
}

struct Parser {
    tokens: Vec<Token>,
    pos: usize,
}

/// True for tokens that can start an atom: identifiers, the three unary
/// prefixes, and the three opening delimiters. Used to decide whether a
/// whitespace gap is a meaningful `And` separator (spec.md §4.1).
fn starts_atom(kind: &TokenKind) -> bool {
    matches!(
        kind,
        TokenKind::Ident(_)
            | TokenKind::Tilde
            | TokenKind::Caret
            | TokenKind::Dollar
            | TokenKind::LParen
            | TokenKind::LBracket
            | TokenKind::LBrace
    )
}

impl Parser {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn next_starts_implicit_and(&self) -> bool {
        match self.peek() {
            Some(tok) => tok.preceded_by_space && starts_atom(&tok.kind),
            None => false,
        }
    }

    fn advance(&mut self) -> Option<&Token> {
        let tok = self.tokens.get(self.pos);
        if tok.is_some() {
            self.pos += 1;
        }
        tok
    }

    fn expect_position(&self) -> usize {
        self.peek()
            .map(|t| t.position)
            .unwrap_or_else(|| self.tokens.last().map(|t| t.position + 1).unwrap_or(0))
    }

    // Precedence, lowest to highest: Or, And, Seq/LooseSeq, Intersect, unary
    // prefix, atom (spec.md §4.2).

    fn parse_or(&mut self) -> Result<Expr, Error> {
        let mut children = vec![self.parse_and()?];

        while matches!(self.peek().map(|t| &t.kind), Some(TokenKind::Pipe)) {
            self.advance();
            children.push(self.parse_and()?);
        }

        Ok(if children.len() == 1 {
            children.pop().unwrap()
        } else {
            Expr::Or(children)
        })
    }

    fn parse_and(&mut self) -> Result<Expr, Error> {
        let mut children = vec![self.parse_seq()?];

        while self.next_starts_implicit_and() {
            children.push(self.parse_seq()?);
        }

        Ok(if children.len() == 1 {
            children.pop().unwrap()
        } else {
            Expr::And(children)
        })
    }

    fn parse_seq(&mut self) -> Result<Expr, Error> {
        let mut left = self.parse_intersect()?;

        loop {
            let loose = match self.peek().map(|t| &t.kind) {
                Some(TokenKind::Arrow) => Some(false),
                Some(TokenKind::FatArrow) => Some(true),
                _ => None,
            };
            match loose {
                Some(is_loose) => {
                    self.advance();
                    let right = self.parse_intersect()?;
                    left = if is_loose {
                        Expr::LooseSeq(Box::new(left), Box::new(right))
                    } else {
                        Expr::Seq(Box::new(left), Box::new(right))
                    };
                }
                None => break,
            }
        }

        Ok(left)
    }

    fn parse_intersect(&mut self) -> Result<Expr, Error> {
        let mut children = vec![self.parse_unary()?];

        while matches!(self.peek().map(|t| &t.kind), Some(TokenKind::Amp)) {
            self.advance();
            children.push(self.parse_unary()?);
        }

        Ok(if children.len() == 1 {
            children.pop().unwrap()
        } else {
            Expr::Intersect(children)
        })
    }

    fn parse_unary(&mut self) -> Result<Expr, Error> {
        match self.peek().map(|t| &t.kind) {
            Some(TokenKind::Tilde) => {
                self.advance();
                Ok(Expr::Not(Box::new(self.parse_unary()?)))
            }
            Some(TokenKind::Caret) => {
                self.advance();
                Ok(Expr::First(Box::new(self.parse_unary()?)))
            }
            Some(TokenKind::Dollar) => {
                self.advance();
                Ok(Expr::Last(Box::new(self.parse_unary()?)))
            }
            _ => self.parse_atom(),
        }
    }

    fn parse_atom(&mut self) -> Result<Expr, Error> {
        let position = self.expect_position();
        match self.advance().map(|t| t.kind.clone()) {
            None => Err(Error::UnexpectedEnd {
                expected: "identifier, '(', '[', or '{'",
            }),
            Some(TokenKind::Ident(name)) => Ok(ident_to_expr(name)),
            Some(TokenKind::LParen) => {
                let inner_start = self.expect_position();
                if matches!(self.peek().map(|t| &t.kind), Some(TokenKind::RParen)) {
                    return Err(Error::EmptyGroup { position: inner_start });
                }
                let expr = self.parse_or()?;
                match self.advance().map(|t| t.kind.clone()) {
                    Some(TokenKind::RParen) => Ok(expr),
                    _ => Err(Error::UnmatchedDelimiter { position, delimiter: "(" }),
                }
            }
            Some(open @ TokenKind::LBracket) | Some(open @ TokenKind::LBrace) => {
                let open_left = open == TokenKind::LBrace;
                let inner_start = self.expect_position();
                let is_close = |kind: &TokenKind| {
                    matches!(kind, TokenKind::RBracket | TokenKind::RBrace)
                };
                if self.peek().map(|t| is_close(&t.kind)).unwrap_or(false) {
                    return Err(Error::EmptyGroup { position: inner_start });
                }
                let expr = self.parse_or()?;
                match self.advance().map(|t| t.kind.clone()) {
                    Some(TokenKind::RBracket) => {
                        Ok(Expr::Slice(Box::new(expr), open_left, false))
                    }
                    Some(TokenKind::RBrace) => Ok(Expr::Slice(Box::new(expr), open_left, true)),
                    _ => Err(Error::UnmatchedDelimiter {
                        position,
                        delimiter: if open_left { "{" } else { "[" },
                    }),
                }
            }
            Some(_) => Err(Error::UnexpectedToken {
                position,
                expected: "identifier, '(', '[', or '{'",
            }),
        }
    }
}

/// Recognizes the `In`/`Out` insertion/removal prefixes at the parser level,
/// per spec.md §4.1-4.2: the lexer returns a raw identifier, and the parser
/// reinterprets `In<rest>`/`Out<rest>` as `InElem(rest)`/`OutElem(rest)` when
/// `rest` is non-empty.
fn ident_to_expr(name: String) -> Expr {
    if let Some(rest) = name.strip_prefix("In") {
        if !rest.is_empty() {
            return Expr::InElem(rest.to_string());
        }
    }
    if let Some(rest) = name.strip_prefix("Out") {
        if !rest.is_empty() {
            return Expr::OutElem(rest.to_string());
        }
    }
    Expr::Elem(name)
}
