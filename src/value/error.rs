use super::LoxValue;
use crate::lexer::Span;
use compact_str::CompactString;
use thiserror::Error;

#[derive(Debug, Error, Clone)]
pub enum RuntimeErrorKind {
    #[error("Operand must be a number.")]
    NonNumeric(LoxValue),
    #[error("Operands must be numbers.")]
    NonNumerics(LoxValue, LoxValue),
    #[error("Operands must be two numbers or two strings.")]
    NonAddable(LoxValue, LoxValue),
    #[error("Undefined variable '{0}'.")]
    UndefinedVariable(CompactString),
    #[error("Can only call functions and classes.")]
    InvalidCallee(LoxValue),
    #[error("Expected {expected} arguments but got {actual}.")]
    InvalidArgumentCount { actual: usize, expected: usize },
    #[error("Only instances have properties.")]
    InvalidInstanceGet(LoxValue),
    #[error("Only instances have fields.")]
    InvalidInstanceSet(LoxValue),
    #[error("Undefined property '{name}'.")]
    UndefinedProperty { object: LoxValue, name: CompactString },
    #[error("Superclass must be a class.")]
    InvalidSuperClass(LoxValue),
    #[error("Stack overflow.")]
    StackOverflow,
    #[error("Native function '{name}' failed: {reason}")]
    NativeFailure {
        name: &'static str,
        reason: CompactString,
    },
}

#[derive(Debug, Error, Clone)]
#[error("{kind}")]
pub struct RuntimeError {
    pub kind: RuntimeErrorKind,
    pub span: Span,
}

impl RuntimeError {
    pub fn new(kind: RuntimeErrorKind, span: Span) -> Self {
        Self { kind, span }
    }

    pub fn code(&self) -> &'static str {
        match self.kind {
            RuntimeErrorKind::NonNumeric(_) => "RT001",
            RuntimeErrorKind::NonNumerics(_, _) => "RT002",
            RuntimeErrorKind::NonAddable(_, _) => "RT003",
            RuntimeErrorKind::UndefinedVariable(_) => "RT004",
            RuntimeErrorKind::InvalidCallee(_) => "RT005",
            RuntimeErrorKind::InvalidArgumentCount { .. } => "RT006",
            RuntimeErrorKind::InvalidInstanceGet(_) => "RT007",
            RuntimeErrorKind::InvalidInstanceSet(_) => "RT008",
            RuntimeErrorKind::UndefinedProperty { .. } => "RT009",
            RuntimeErrorKind::InvalidSuperClass(_) => "RT010",
            RuntimeErrorKind::NativeFailure { .. } => "RT011",
            RuntimeErrorKind::StackOverflow => "RT012",
        }
    }
}
