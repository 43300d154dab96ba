use thiserror::Error;

use crate::lex::Span;

#[derive(Clone, Debug, Eq, Error, PartialEq)]
#[error("{message} (at {}..{})", .span.start, .span.end)]
pub struct ParseError {
    pub span: Span,
    pub message: String,
}

impl ParseError {
    pub fn new(span: Span, message: impl Into<String>) -> Self {
        Self {
            span,
            message: message.into(),
        }
    }
}
