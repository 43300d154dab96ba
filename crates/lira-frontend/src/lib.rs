pub mod error;
pub mod lex;
pub mod parse;

pub use error::ParseError;

use lira_common::lir::Method;

/// Lex and parse a file in the textual LIR format.
pub fn parse(source: &str) -> Result<Vec<Method>, Vec<ParseError>> {
    let tokens = lex::lex(source);
    parse::parse(tokens, source.len())
}
