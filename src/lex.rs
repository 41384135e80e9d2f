use std::fmt;

use combine::{
    choice, eof, from_str, many, many1, optional,
    parser::{
        byte::{alpha_num, digit, letter, spaces},
        combinator::recognize,
    },
    token, Parser, Stream,
};

use crate::error::{Error, Result};

pub trait ByteStream<'a>: Stream<Token = u8, Range = &'a [u8]> + 'a {}
impl<'a, T: Stream<Token = u8, Range = &'a [u8]> + 'a> ByteStream<'a> for T {}

#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    // operators
    Add,
    Sub,
    Mul,
    Div,
    Pow,
    ParL,
    ParR,

    // unsigned real literal
    Number(f64),

    // variables and built-in function names
    Name(String),

    // end
    Eos,
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Add => write!(f, "`+`"),
            Self::Sub => write!(f, "`-`"),
            Self::Mul => write!(f, "`*`"),
            Self::Div => write!(f, "`/`"),
            Self::Pow => write!(f, "`^`"),
            Self::ParL => write!(f, "`(`"),
            Self::ParR => write!(f, "`)`"),
            Self::Number(n) => write!(f, "number {n}"),
            Self::Name(name) => write!(f, "identifier `{name}`"),
            Self::Eos => write!(f, "end of input"),
        }
    }
}

/// Tokenizer with one token of lookahead.
pub struct Lex<'a> {
    text: &'a str,
    input: &'a [u8],
    ahead: Option<(Token, usize)>,
    position: usize,
}

impl<'a> Lex<'a> {
    pub fn new(text: &'a str) -> Self {
        Self {
            text,
            input: text.as_bytes(),
            ahead: None,
            position: 0,
        }
    }

    pub fn next(&mut self) -> Result<Token> {
        let (t, position) = match self.ahead.take() {
            Some(ahead) => ahead,
            None => self.do_next()?,
        };
        self.position = position;
        Ok(t)
    }

    pub fn peek(&mut self) -> Result<&Token> {
        let ahead = match self.ahead.take() {
            Some(ahead) => ahead,
            None => self.do_next()?,
        };
        Ok(&self.ahead.insert(ahead).0)
    }

    /// Byte offset of the token last returned by [`Lex::next`].
    pub fn position(&self) -> usize {
        self.position
    }

    fn do_next(&mut self) -> Result<(Token, usize)> {
        let input = spaces()
            .parse(self.input)
            .map_or(self.input, |(_, rest)| rest);
        let offset = self.text.len() - input.len();
        let (t, rest) = xpress_token()
            .parse(input)
            .map_err(|_| self.unexpected(offset))?;
        self.input = rest;
        Ok((t, offset))
    }

    fn unexpected(&self, offset: usize) -> Error {
        match self.text[offset..].chars().next() {
            Some(c) => Error::syntax(offset, format!("unexpected character `{c}`")),
            None => Error::syntax(offset, "unexpected end of input"),
        }
    }
}

fn xpress_token<'a, Input>() -> impl Parser<Input, Output = Token> + 'a
where
    Input: ByteStream<'a>,
{
    let name = recognize((letter(), many::<Vec<_>, _, _>(alpha_num())))
        .map(|v: Vec<u8>| Token::Name(String::from_utf8_lossy(&v).into_owned()));
    let eos = eof().map(|_| Token::Eos);
    choice((number(), name, operators(), eos))
}

fn operators<Input>() -> impl Parser<Input, Output = Token>
where
    Input: Stream<Token = u8>,
{
    choice((
        token(b'+').map(|_| Token::Add),
        token(b'-').map(|_| Token::Sub),
        token(b'*').map(|_| Token::Mul),
        token(b'/').map(|_| Token::Div),
        token(b'^').map(|_| Token::Pow),
        token(b'(').map(|_| Token::ParL),
        token(b')').map(|_| Token::ParR),
    ))
}

/// `digit+ ('.' digit*)?`, no sign and no exponent.
fn number<Input>() -> impl Parser<Input, Output = Token>
where
    Input: Stream<Token = u8>,
{
    from_str(recognize::<Vec<_>, _, _>((
        many1::<Vec<_>, _, _>(digit()),
        optional((token(b'.'), many::<Vec<_>, _, _>(digit()))),
    )))
    .map(Token::Number)
}
