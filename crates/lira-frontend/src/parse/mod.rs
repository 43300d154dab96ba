#[cfg(test)]
mod tests;

use log::{debug, trace};
use lira_common::lir::{
    BinOp, Condition, Method, MethodBuilder, Opcode, Physical, Register, Role, ValueKind,
    Virtual,
};

use crate::error::ParseError;
use crate::lex::{Span, Token};

/// Parse every method in the token stream. Errors are collected per line, so one bad instruction does not hide the
/// rest.
pub fn parse(
    tokens: Vec<(Token<'_>, Span)>,
    len: usize,
) -> std::result::Result<Vec<Method>, Vec<ParseError>> {
    let mut parser = Parser::new(tokens, len);
    let methods = parser.parse_file();

    if parser.errors.is_empty() {
        debug!("parsed {} methods", methods.len());
        Ok(methods)
    } else {
        Err(parser.errors)
    }
}

type Result<T> = std::result::Result<T, ParseError>;

struct Parser<'src> {
    tokens: Vec<(Token<'src>, Span)>,
    at: usize,
    eof: Span,
    errors: Vec<ParseError>,
}

impl<'src> Parser<'src> {
    pub fn new(tokens: Vec<(Token<'src>, Span)>, len: usize) -> Self {
        Self {
            tokens,
            at: 0,
            eof: len..len,
            errors: Vec::new(),
        }
    }

    pub fn parse_file(&mut self) -> Vec<Method> {
        let mut methods = Vec::new();

        loop {
            self.skip_newlines();
            match self.peek() {
                None => break,
                Some(Token::Method) => {
                    if let Some(method) = self.parse_method() {
                        methods.push(method);
                    }
                }
                Some(token) => {
                    let span = self.span();
                    self.errors.push(ParseError::new(
                        span,
                        format!("expected `method`, found {}", token.describe()),
                    ));
                    self.skip_line();
                }
            }
        }

        methods
    }

    fn parse_method(&mut self) -> Option<Method> {
        let start = self.span();
        self.advance();

        let name = match self.expect_name("a method name") {
            Ok((name, _)) => name,
            Err(e) => {
                self.errors.push(e);
                self.skip_line();
                return None;
            }
        };

        if let Err(e) = self.expect(Token::LBrace) {
            self.errors.push(e);
        }

        trace!("parsing method `{name}`");

        let mut builder = MethodBuilder::new(name);
        let errors = self.errors.len();

        loop {
            self.skip_newlines();
            match self.peek() {
                None => {
                    self.errors
                        .push(ParseError::new(self.eof.clone(), "unclosed method body"));
                    return None;
                }
                Some(Token::RBrace) => {
                    self.advance();
                    break;
                }
                Some(_) => {
                    if let Err(e) = self.parse_item(&mut builder) {
                        self.errors.push(e);
                        self.skip_line();
                    }
                }
            }
        }

        if self.errors.len() > errors {
            return None;
        }

        let end = self.previous_span();
        match builder.build() {
            Ok(method) => Some(method),
            Err(e) => {
                self.errors
                    .push(ParseError::new(start.start..end.end, e.to_string()));
                None
            }
        }
    }

    fn parse_item(&mut self, builder: &mut MethodBuilder) -> Result<()> {
        match (self.peek(), self.peek_nth(1)) {
            (Some(Token::Fixed), _) => {
                self.advance();
                let (vreg, span) = self.parse_register()?;
                self.expect(Token::Equal)?;
                let (reg, _) = self.parse_register()?;

                match (vreg, reg) {
                    (Register::Virtual(vreg), Register::Physical(reg)) => {
                        builder.fix(vreg.id, reg);
                    }
                    _ => {
                        return Err(ParseError::new(
                            span,
                            "`fixed` pre-colors a virtual register with a physical one",
                        ))
                    }
                }
            }

            (Some(Token::Name(label)), Some(Token::Colon)) => {
                self.advance();
                self.advance();
                builder.start(label);
            }

            _ => self.parse_instruction(builder)?,
        }

        self.expect_end_of_line()
    }

    fn parse_instruction(&mut self, builder: &mut MethodBuilder) -> Result<()> {
        let write = if self.peek_nth(1) == Some(Token::Equal) {
            let (reg, _) = self.parse_register()?;
            self.advance();
            Some(reg)
        } else {
            None
        };

        let (mnemonic, span) = self.expect_name("an instruction")?;

        let (opcode, reads) = match mnemonic {
            "const" => {
                let (value, _) = self.expect_number()?;
                (Opcode::Const(value), vec![])
            }
            "move" => (Opcode::Move, vec![self.parse_register()?.0]),
            "cmp" => {
                let cond = self.parse_condition()?;
                (Opcode::Compare(cond), self.parse_pair()?)
            }
            "local" => {
                let (ordinal, span) = self.expect_number()?;
                let ordinal = usize::try_from(ordinal)
                    .map_err(|_| ParseError::new(span, "parameter ordinals are not negative"))?;
                (Opcode::Local(ordinal), vec![])
            }
            "call" => {
                let (name, _) = self.expect_name("a procedure name")?;
                (Opcode::Call(name.to_string()), vec![])
            }
            "jump" => {
                let (label, _) = self.expect_name("a block label")?;
                (Opcode::Jump(builder.label(label)), vec![])
            }
            "branch" => {
                let cond = self.parse_condition()?;
                let reads = self.parse_pair()?;
                self.expect(Token::Arrow)?;
                let (then, _) = self.expect_name("a block label")?;
                self.expect(Token::Comma)?;
                let (elze, _) = self.expect_name("a block label")?;
                let (then, elze) = (builder.label(then), builder.label(elze));
                (Opcode::Branch(cond, then, elze), reads)
            }
            "ret" => (Opcode::Return, vec![]),
            "load" | "store" => {
                return Err(ParseError::new(
                    span,
                    format!("`{mnemonic}` is reserved for spill code"),
                ))
            }
            other => match BinOp::from_mnemonic(other) {
                Some(op) => (Opcode::Binary(op), self.parse_pair()?),
                None => {
                    return Err(ParseError::new(
                        span,
                        format!("unknown instruction `{other}`"),
                    ))
                }
            },
        };

        let produces = matches!(
            opcode,
            Opcode::Const(_)
                | Opcode::Move
                | Opcode::Binary(_)
                | Opcode::Compare(_)
                | Opcode::Local(_)
        );

        match (produces, write.is_some()) {
            (true, false) => Err(ParseError::new(
                span,
                format!("`{mnemonic}` needs a destination register"),
            )),
            (false, true) => Err(ParseError::new(
                span,
                format!("`{mnemonic}` does not produce a value"),
            )),
            _ => {
                builder.push(opcode, reads, write);
                Ok(())
            }
        }
    }

    fn parse_pair(&mut self) -> Result<Vec<Register>> {
        let (left, _) = self.parse_register()?;
        self.expect(Token::Comma)?;
        let (right, _) = self.parse_register()?;
        Ok(vec![left, right])
    }

    fn parse_condition(&mut self) -> Result<Condition> {
        let (name, span) = self.expect_name("a condition")?;
        Condition::from_mnemonic(name)
            .ok_or_else(|| ParseError::new(span, format!("unknown condition `{name}`")))
    }

    /// `v<n>`, `v<n>.int`, `v<n>.ref`, or the name of a physical register.
    fn parse_register(&mut self) -> Result<(Register, Span)> {
        let (name, span) = self.expect_name("a register")?;

        if let Some(reg) = Physical::by_name(name) {
            if reg.role() != Some(Role::Argument) {
                return Err(ParseError::new(
                    span,
                    format!("`{name}` is reserved for the register allocator"),
                ));
            }

            return Ok((Register::Physical(reg), span));
        }

        let (number, kind) = match name.split_once('.') {
            Some((number, "int")) => (number, ValueKind::Int),
            Some((number, "ref")) => (number, ValueKind::Ref),
            Some((_, kind)) => {
                return Err(ParseError::new(
                    span,
                    format!("unknown value kind `{kind}`"),
                ))
            }
            None => (name, ValueKind::Int),
        };

        number
            .strip_prefix('v')
            .and_then(|id| id.parse::<usize>().ok())
            .map(|id| (Register::Virtual(Virtual::new(id).with_kind(kind)), span.clone()))
            .ok_or_else(|| ParseError::new(span, format!("unknown register `{name}`")))
    }

    fn expect_name(&mut self, what: &str) -> Result<(&'src str, Span)> {
        match self.peek() {
            Some(Token::Name(name)) => {
                let span = self.span();
                self.advance();
                Ok((name, span))
            }
            other => Err(self.unexpected(other, what)),
        }
    }

    fn expect_number(&mut self) -> Result<(i64, Span)> {
        match self.peek() {
            Some(Token::Number(number)) => {
                let span = self.span();
                self.advance();
                number
                    .parse()
                    .map(|value| (value, span.clone()))
                    .map_err(|_| ParseError::new(span, "number does not fit in 64 bits"))
            }
            other => Err(self.unexpected(other, "a number")),
        }
    }

    fn expect(&mut self, token: Token<'src>) -> Result<()> {
        match self.peek() {
            Some(found) if found == token => {
                self.advance();
                Ok(())
            }
            other => Err(self.unexpected(other, &token.describe())),
        }
    }

    fn expect_end_of_line(&mut self) -> Result<()> {
        match self.peek() {
            None | Some(Token::Newline) | Some(Token::RBrace) => Ok(()),
            other => Err(self.unexpected(other, "end of line")),
        }
    }

    fn unexpected(&self, found: Option<Token<'src>>, what: &str) -> ParseError {
        match found {
            Some(token) => ParseError::new(
                self.span(),
                format!("expected {what}, found {}", token.describe()),
            ),
            None => ParseError::new(
                self.eof.clone(),
                format!("expected {what}, found end of input"),
            ),
        }
    }

    fn skip_newlines(&mut self) {
        while self.peek() == Some(Token::Newline) {
            self.advance();
        }
    }

    fn skip_line(&mut self) {
        while !matches!(self.peek(), None | Some(Token::Newline)) {
            self.advance();
        }
    }

    fn peek(&self) -> Option<Token<'src>> {
        self.peek_nth(0)
    }

    fn peek_nth(&self, n: usize) -> Option<Token<'src>> {
        self.tokens.get(self.at + n).map(|(token, _)| *token)
    }

    fn span(&self) -> Span {
        self.tokens
            .get(self.at)
            .map(|(_, span)| span.clone())
            .unwrap_or_else(|| self.eof.clone())
    }

    fn previous_span(&self) -> Span {
        self.at
            .checked_sub(1)
            .and_then(|at| self.tokens.get(at))
            .map(|(_, span)| span.clone())
            .unwrap_or_else(|| self.eof.clone())
    }

    fn advance(&mut self) {
        if self.at < self.tokens.len() {
            self.at += 1;
        }
    }
}
