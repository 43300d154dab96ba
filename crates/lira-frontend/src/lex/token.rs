use logos::Logos;

#[derive(Logos, Clone, Copy, Debug, Eq, PartialEq)]
pub enum Token<'src> {
    #[token("method")]
    Method,

    #[token("fixed")]
    Fixed,

    #[token("{")]
    LBrace,

    #[token("}")]
    RBrace,

    #[token(":")]
    Colon,

    #[token("=")]
    Equal,

    #[token(",")]
    Comma,

    #[token("->")]
    Arrow,

    #[regex(r"[a-zA-Z_][a-zA-Z0-9_.]*")]
    Name(&'src str),

    #[regex(r"-?[0-9]+")]
    Number(&'src str),

    #[regex(r"[\n\r][ \t\n\r]*")]
    Newline,

    #[error]
    #[regex(r"[ \t\f]+", logos::skip)]
    #[regex(r"#[^\n\r]*", logos::skip)]
    Error,
}

impl Token<'_> {
    pub fn describe(&self) -> String {
        match self {
            Self::Method => "`method`".into(),
            Self::Fixed => "`fixed`".into(),
            Self::LBrace => "`{`".into(),
            Self::RBrace => "`}`".into(),
            Self::Colon => "`:`".into(),
            Self::Equal => "`=`".into(),
            Self::Comma => "`,`".into(),
            Self::Arrow => "`->`".into(),
            Self::Name(name) => format!("`{name}`"),
            Self::Number(number) => format!("`{number}`"),
            Self::Newline => "end of line".into(),
            Self::Error => "an invalid token".into(),
        }
    }
}
