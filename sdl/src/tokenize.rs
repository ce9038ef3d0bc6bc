use std::{
    fmt::{self, Display, Formatter},
    io::{self, Read, Seek, SeekFrom},
};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum TokenizeError {
    #[error("a generic IO error: {0}")]
    Io(#[from] io::Error),

    #[error("unexpected character '{0}'")]
    UnexpectedCharacter(char),

    #[error("error parsing number '{0}'")]
    NumberParseError(String),

    #[error("illegal escape sequence '\\{0}'")]
    IllegalEscape(char),

    #[error("string is missing its closing quote")]
    UnterminatedString,
}

/// A separator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sep {
    BraceOpen,
    BraceClose,
    BracketOpen,
    BracketClose,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    /// A separator.
    Sep(Sep),

    /// An identifier. Not escaped, quoted, etc.
    Identifier(String),

    /// A name to bind the top of the stack to, written `/name`. Holds the name without the slash.
    Binder(String),

    /// `true` or `false`.
    Boolean(bool),

    /// A number with no decimal point or exponent.
    Integer(i64),

    /// A number with a decimal point and/or an exponent.
    Float(f64),

    /// A string. Any text that is surrounded by quotes. Supports escaping.
    String(String),
}

impl Display for Token {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::Sep(Sep::BraceOpen) => write!(f, "{{"),
            Self::Sep(Sep::BraceClose) => write!(f, "}}"),
            Self::Sep(Sep::BracketOpen) => write!(f, "["),
            Self::Sep(Sep::BracketClose) => write!(f, "]"),

            Self::Identifier(ident) => write!(f, "{}", ident),
            Self::Binder(ident) => write!(f, "/{}", ident),
            Self::Boolean(b) => write!(f, "{}", b),
            Self::Integer(num) => write!(f, "{}", num),
            Self::Float(num) => write!(f, "{:?}", num),
            Self::String(str) => write!(f, "{:?}", str),
        }
    }
}

impl From<Sep> for Token {
    fn from(sep: Sep) -> Self {
        Self::Sep(sep)
    }
}

fn is_ident_start(c: char) -> bool {
    c.is_ascii_alphabetic()
}

fn is_ident_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '-' || c == '_'
}

pub struct Tokenizer<R: Read + Seek> {
    reader: R,
}

impl<R: Read + Seek> Tokenizer<R> {
    pub fn new(reader: R) -> Self {
        Tokenizer { reader }
    }

    /// Tokenize from the reader, converting to a `Result<Vec<Token>, TokenizeError>`.
    pub fn tokenize(mut self) -> Result<Vec<Token>, TokenizeError> {
        let mut tokens = vec![];

        while let Some(c) = self.peek_next()? {
            match c {
                // whitespace: ignore
                _ if c.is_whitespace() => self.skip()?,

                // a comment runs to the end of the line
                '%' => {
                    self.read_while(|c| c != '\n')?;
                }

                // alphabetical characters: identifier or boolean
                _ if is_ident_start(c) => {
                    let ident = self.read_identifier()?;
                    tokens.push(match ident.as_str() {
                        "true" => Token::Boolean(true),
                        "false" => Token::Boolean(false),
                        _ => Token::Identifier(ident),
                    });
                }

                // a slash followed by an identifier: binder
                '/' => {
                    self.skip()?;
                    match self.peek_next()? {
                        Some(c) if is_ident_start(c) => {
                            tokens.push(Token::Binder(self.read_identifier()?))
                        }
                        _ => return Err(TokenizeError::UnexpectedCharacter('/')),
                    }
                }

                // a quote: string
                '"' => tokens.push(Token::String(self.read_string()?)),

                // a number: integer or float
                '0'..='9' | '-' => tokens.push(self.read_number()?),

                '{' => {
                    tokens.push(Sep::BraceOpen.into());
                    self.skip()?;
                }
                '}' => {
                    tokens.push(Sep::BraceClose.into());
                    self.skip()?;
                }
                '[' => {
                    tokens.push(Sep::BracketOpen.into());
                    self.skip()?;
                }
                ']' => {
                    tokens.push(Sep::BracketClose.into());
                    self.skip()?;
                }

                x => return Err(TokenizeError::UnexpectedCharacter(x)),
            }
        }

        Ok(tokens)
    }

    /// Read an identifier: a letter, then letters, digits, `-` and `_`.
    fn read_identifier(&mut self) -> Result<String, TokenizeError> {
        Ok(self.read_while(is_ident_char)?.into_iter().collect())
    }

    /// Read a string, which is two quotations surrounding any amount of text.
    fn read_string(&mut self) -> Result<String, TokenizeError> {
        // skip the initial quotation
        self.skip()?;

        let mut bytes = vec![];

        loop {
            let b = self.next_byte()?.ok_or(TokenizeError::UnterminatedString)?;
            match b {
                b'"' => break,
                b'\\' => {
                    let escaped = self.next_byte()?.ok_or(TokenizeError::UnterminatedString)?;
                    bytes.push(match escaped {
                        b'n' => b'\n',
                        b't' => b'\t',
                        b'"' => b'"',
                        b'\\' => b'\\',
                        other => return Err(TokenizeError::IllegalEscape(other as char)),
                    });
                }
                b => bytes.push(b),
            }
        }

        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }

    /// Read a number. It is a float if it has a fraction or an exponent.
    fn read_number(&mut self) -> Result<Token, TokenizeError> {
        let mut literal = String::new();
        let mut float = false;

        if let Some('-') = self.peek_next()? {
            self.skip()?;
            literal.push('-');
        }
        literal.extend(self.read_while(|c| c.is_ascii_digit())?);

        if let Some('.') = self.peek_next()? {
            self.skip()?;
            float = true;
            literal.push('.');
            literal.extend(self.read_while(|c| c.is_ascii_digit())?);
        }

        if let Some(e @ ('e' | 'E')) = self.peek_next()? {
            self.skip()?;
            float = true;
            literal.push(e);
            if let Some(sign @ ('+' | '-')) = self.peek_next()? {
                self.skip()?;
                literal.push(sign);
            }
            literal.extend(self.read_while(|c| c.is_ascii_digit())?);
        }

        if float {
            literal
                .parse()
                .map(Token::Float)
                .map_err(|_| TokenizeError::NumberParseError(literal))
        } else {
            literal
                .parse()
                .map(Token::Integer)
                .map_err(|_| TokenizeError::NumberParseError(literal))
        }
    }

    /// Read the next byte in the reader, or `None` at the end of input.
    fn next_byte(&mut self) -> Result<Option<u8>, io::Error> {
        let mut byte = [0u8];
        match self.reader.read(&mut byte)? {
            0 => Ok(None),
            _ => Ok(Some(byte[0])),
        }
    }

    /// Read the next character in the reader.
    fn next(&mut self) -> Result<Option<char>, io::Error> {
        Ok(self.next_byte()?.map(|b| b as char))
    }

    /// Skips the next character in the reader.
    fn skip(&mut self) -> Result<(), io::Error> {
        self.reader.seek(SeekFrom::Current(1)).map(|_| ())
    }

    /// Peeks ahead at the next character in the reader. This works by reading and then seeking back one on success.
    fn peek_next(&mut self) -> Result<Option<char>, io::Error> {
        let c = self.next()?;
        if c.is_some() {
            self.reader.seek(SeekFrom::Current(-1))?;
        }
        Ok(c)
    }

    /// Reads characters until the predicate returns false.
    fn read_while<F>(&mut self, f: F) -> Result<Vec<char>, io::Error>
    where
        F: Fn(char) -> bool,
    {
        let mut v = vec![];

        while let Some(c) = self.next()? {
            if f(c) {
                v.push(c);
            } else {
                // seek back one so the next read sees it
                self.reader.seek(SeekFrom::Current(-1))?;
                break;
            }
        }

        Ok(v)
    }
}

/// Tokenize a string of source text.
pub fn tokenize_str(source: &str) -> Result<Vec<Token>, TokenizeError> {
    Tokenizer::new(io::Cursor::new(source.as_bytes())).tokenize()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_source() {
        assert!(tokenize_str("").unwrap().is_empty());
        assert!(tokenize_str("  \n\t % just a comment").unwrap().is_empty());
    }

    #[test]
    fn scientific_notation() {
        for (input, want) in [("1e-3", 1e-3), ("1e+3", 1e3), ("1.0e-4", 1e-4), ("1.0E53", 1e53)] {
            assert_eq!(vec![Token::Float(want)], tokenize_str(input).unwrap(), "{}", input);
        }
    }

    #[test]
    fn numbers() {
        assert_eq!(
            vec![
                Token::Integer(123),
                Token::Integer(-10),
                Token::Float(1.23),
                Token::Float(-1.2),
                Token::Float(3.),
            ],
            tokenize_str("123 -10 1.23 -1.2 3.").unwrap()
        );
    }

    #[test]
    fn lone_minus_is_an_error() {
        assert!(matches!(
            tokenize_str("- 1"),
            Err(TokenizeError::NumberParseError(s)) if s == "-"
        ));
    }

    #[test]
    fn string_escapes() {
        assert_eq!(
            vec![Token::String("a\"b\\c\nd\te".into())],
            tokenize_str(r#""a\"b\\c\nd\te""#).unwrap()
        );
    }

    #[test]
    fn illegal_string_escape() {
        assert!(matches!(
            tokenize_str(r#""\a""#),
            Err(TokenizeError::IllegalEscape('a'))
        ));
    }

    #[test]
    fn unterminated_string() {
        assert!(matches!(
            tokenize_str(r#""abc"#),
            Err(TokenizeError::UnterminatedString)
        ));
    }

    #[test]
    fn binders_idents_and_groups() {
        let source = "{ /v /u /face v point } [ ] /my-name_2 true false sphere % trailing\n x";
        assert_eq!(
            vec![
                Sep::BraceOpen.into(),
                Token::Binder("v".into()),
                Token::Binder("u".into()),
                Token::Binder("face".into()),
                Token::Identifier("v".into()),
                Token::Identifier("point".into()),
                Sep::BraceClose.into(),
                Sep::BracketOpen.into(),
                Sep::BracketClose.into(),
                Token::Binder("my-name_2".into()),
                Token::Boolean(true),
                Token::Boolean(false),
                Token::Identifier("sphere".into()),
                Token::Identifier("x".into()),
            ],
            tokenize_str(source).unwrap()
        );
    }

    #[test]
    fn slash_needs_a_name() {
        assert!(matches!(
            tokenize_str("/ x"),
            Err(TokenizeError::UnexpectedCharacter('/'))
        ));
    }

    #[test]
    fn unexpected_character() {
        assert!(matches!(
            tokenize_str("1 # 2"),
            Err(TokenizeError::UnexpectedCharacter('#'))
        ));
    }
}
