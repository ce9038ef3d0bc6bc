use std::{
    fmt::{self, Display, Formatter},
    iter::Peekable,
    sync::Arc,
    vec::IntoIter,
};

use thiserror::Error;

use crate::tokenize::{Sep, Token};

/// An error while parsing to the AST.
#[derive(Debug, Error)]
pub enum AstError {
    #[error("expected {0}, got '{1}'")]
    UnexpectedToken(String, Token),

    #[error("expected more tokens, got end")]
    UnexpectedEof,
}

/// A node of a program. A program is a flat sequence of these, where closures
/// and arrays hold nested sequences.
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    /// A name to look up, either in the environment or among the builtins.
    Identifier(String),

    /// Pops the top of the stack and binds it to a name.
    Binder(String),

    Integer(i64),
    Real(f64),
    Boolean(bool),
    String(String),

    /// A `{ ... }` group. Its body is shared with every closure value made from it.
    Closure(Arc<[Node]>),

    /// A `[ ... ]` group.
    Array(Vec<Node>),
}

fn write_group(f: &mut Formatter<'_>, open: &str, body: &[Node], close: &str) -> fmt::Result {
    write!(f, "{}", open)?;
    for node in body {
        write!(f, " {}", node)?;
    }
    write!(f, " {}", close)
}

impl Display for Node {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::Identifier(name) => write!(f, "{}", name),
            Self::Binder(name) => write!(f, "/{}", name),
            Self::Integer(i) => write!(f, "{}", i),
            Self::Real(r) => write!(f, "{:?}", r),
            Self::Boolean(b) => write!(f, "{}", b),
            Self::String(s) => write!(f, "{:?}", s),
            Self::Closure(body) => write_group(f, "{", body, "}"),
            Self::Array(body) => write_group(f, "[", body, "]"),
        }
    }
}

/// An AST parser, which takes in a list of tokens from the tokenizer and parses out
/// the top-level sequence of nodes.
#[derive(Debug)]
pub struct AstParser {
    tokens: Peekable<IntoIter<Token>>,
}

impl AstParser {
    /// Construct a new AST parser from a list of tokens from the tokenizer.
    pub fn new(tokens: Vec<Token>) -> Self {
        Self {
            tokens: tokens.into_iter().peekable(),
        }
    }

    /// Parse the whole token stream. A closing separator with no matching opener is an error.
    pub fn parse_root(mut self) -> Result<Vec<Node>, AstError> {
        let nodes = self.parse_sequence(None)?;

        match self.tokens.next() {
            None => Ok(nodes),
            Some(t) => Err(AstError::UnexpectedToken("end of input".into(), t)),
        }
    }

    /// Parse nodes until `close` is consumed, or until a stray closing separator
    /// (left in place) or the end of input when `close` is `None`.
    fn parse_sequence(&mut self, close: Option<Sep>) -> Result<Vec<Node>, AstError> {
        let mut nodes = vec![];

        loop {
            if close.is_none() {
                if let Some(Token::Sep(Sep::BraceClose | Sep::BracketClose)) = self.tokens.peek() {
                    return Ok(nodes);
                }
            }

            let token = match self.tokens.next() {
                Some(token) => token,
                None if close.is_none() => return Ok(nodes),
                None => return Err(AstError::UnexpectedEof),
            };

            let node = match token {
                Token::Sep(sep) if Some(sep) == close => return Ok(nodes),

                Token::Sep(Sep::BraceOpen) => {
                    Node::Closure(self.parse_sequence(Some(Sep::BraceClose))?.into())
                }
                Token::Sep(Sep::BracketOpen) => {
                    Node::Array(self.parse_sequence(Some(Sep::BracketClose))?)
                }
                t @ Token::Sep(_) => {
                    let expected = match close {
                        Some(Sep::BraceClose) => "'}'",
                        _ => "']'",
                    };
                    return Err(AstError::UnexpectedToken(expected.into(), t));
                }

                Token::Identifier(name) => Node::Identifier(name),
                Token::Binder(name) => Node::Binder(name),
                Token::Boolean(b) => Node::Boolean(b),
                Token::Integer(i) => Node::Integer(i),
                Token::Float(r) => Node::Real(r),
                Token::String(s) => Node::String(s),
            };
            nodes.push(node);
        }
    }
}
