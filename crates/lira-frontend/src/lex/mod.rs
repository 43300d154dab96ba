mod token;

pub use token::Token;

use std::ops::Range;

use log::trace;
use logos::Logos;

pub type Span = Range<usize>;

/// Split `src` into tokens. Invalid input becomes [`Token::Error`] and is reported by the parser.
pub fn lex(src: &str) -> Vec<(Token<'_>, Span)> {
    let tokens: Vec<_> = Token::lexer(src).spanned().collect();
    trace!("lexed {} tokens", tokens.len());
    tokens
}
