use crate::lexer::{LexicalError, Span};
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum ParserErrorKind {
    #[error("Expect {0}.")]
    Expect(&'static str),
    #[error("Expect expression.")]
    ExpectExpression,
    #[error("Invalid assignment target.")]
    InvalidAssignmentTarget,
    #[error("Can't have more than {0} arguments.")]
    TooManyArguments(usize),
    #[error("Can't have more than {0} parameters.")]
    TooManyParameters(usize),
    #[error("{0}")]
    Lexical(#[from] LexicalError),
}

#[derive(Debug, Error, Clone, PartialEq)]
#[error("{kind}")]
pub struct ParserError {
    #[source]
    pub kind: ParserErrorKind,
    /// The offending token. Empty when the parser ran out of input.
    pub span: Span,
}

impl ParserError {
    pub fn code(&self) -> &'static str {
        match &self.kind {
            ParserErrorKind::Expect(_) => "PA001",
            ParserErrorKind::ExpectExpression => "PA002",
            ParserErrorKind::InvalidAssignmentTarget => "PA003",
            ParserErrorKind::TooManyArguments(_) => "PA004",
            ParserErrorKind::TooManyParameters(_) => "PA005",
            ParserErrorKind::Lexical(error) => error.code(),
        }
    }

    pub fn is_at_end(&self) -> bool {
        self.span.is_empty() && !matches!(self.kind, ParserErrorKind::Lexical(_))
    }
}

impl From<LexicalError> for ParserError {
    fn from(error: LexicalError) -> Self {
        Self {
            span: error.span,
            kind: ParserErrorKind::Lexical(error),
        }
    }
}
