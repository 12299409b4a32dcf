use super::token::Span;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum LexicalErrorKind {
    #[error("Unexpected character.")]
    Unrecognized(char),
    #[error("Unterminated string.")]
    UnclosedString,
}

#[derive(Debug, Error, Clone, PartialEq)]
#[error("{kind}")]
pub struct LexicalError {
    #[source]
    pub kind: LexicalErrorKind,
    pub span: Span,
}

impl LexicalError {
    pub fn code(&self) -> &'static str {
        match self.kind {
            LexicalErrorKind::Unrecognized(_) => "LX001",
            LexicalErrorKind::UnclosedString => "LX002",
        }
    }

    /// Offset the error is reported at. An unterminated string is only
    /// noticed once the input runs out.
    pub fn report_offset(&self) -> u32 {
        match self.kind {
            LexicalErrorKind::Unrecognized(_) => self.span.start,
            LexicalErrorKind::UnclosedString => self.span.end(),
        }
    }
}
