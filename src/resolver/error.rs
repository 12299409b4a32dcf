use crate::{lexer::Span, string::Ident};
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum ResolutionErrorKind {
    #[error("Can't read local variable in its own initializer.")]
    SelfReferentialInitializer {
        destination: Ident,
        reference: Ident,
    },
    #[error("Already a variable with this name in this scope.")]
    ShadowLocal { old: Ident, new: Ident },
    #[error("Can't return from top-level code.")]
    NonFunctionReturn,
    #[error("Can't return a value from an initializer.")]
    InitializerReturn,
    #[error("Can't use 'this' outside of a class.")]
    NonClassThis,
    #[error("Can't use 'super' outside of a class.")]
    NonClassSuper,
    #[error("Can't use 'super' in a class with no superclass.")]
    NoSuperClassSuper,
    #[error("A class can't inherit from itself.")]
    SelfInheritance(Ident),
}

#[derive(Debug, Error, Clone, PartialEq)]
#[error("{kind}")]
pub struct ResolutionError {
    pub kind: ResolutionErrorKind,
    /// The token the error is reported at.
    pub span: Span,
}

impl ResolutionError {
    pub fn code(&self) -> &'static str {
        match self.kind {
            ResolutionErrorKind::SelfReferentialInitializer { .. } => "RA001",
            ResolutionErrorKind::ShadowLocal { .. } => "RA002",
            ResolutionErrorKind::NonFunctionReturn => "RA003",
            ResolutionErrorKind::NonClassThis => "RA004",
            ResolutionErrorKind::InitializerReturn => "RA005",
            ResolutionErrorKind::NonClassSuper => "RA006",
            ResolutionErrorKind::NoSuperClassSuper => "RA007",
            ResolutionErrorKind::SelfInheritance(_) => "RA008",
        }
    }
}
