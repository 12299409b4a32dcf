use crate::lexer::Span;
use std::rc::Rc;

pub type IdentName = Rc<str>;

/// Name bound by the receiver of a method.
pub const THIS: &str = "this";
/// Name bound to the superclass around a subclass's methods.
pub const SUPER: &str = "super";
/// Method run when a class is called.
pub const INITIALIZER: &str = "init";

/// An identifier as written in the source, together with where it was written.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Ident {
    pub name: IdentName,
    pub span: Span,
}

impl Ident {
    pub fn new(name: &str, span: Span) -> Self {
        Self {
            name: name.into(),
            span,
        }
    }

    pub fn as_str(&self) -> &str {
        &self.name
    }
}

impl std::fmt::Display for Ident {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name)
    }
}
