use super::expression::ExprRef;
use crate::{lexer::Span, string::Ident};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct StmtRef(pub(crate) u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FunctionRef(pub(crate) u32);

#[derive(Debug, Clone)]
pub enum Statement {
    Expression(ExprRef),
    Print(ExprRef),
    VariableDecl {
        name: Ident,
        initial: Option<ExprRef>,
    },
    Block(Vec<StmtRef>),
    If {
        condition: ExprRef,
        success: StmtRef,
        failure: Option<StmtRef>,
    },
    While {
        condition: ExprRef,
        body: StmtRef,
    },
    FunctionDecl(FunctionRef),
    Return {
        keyword: Span,
        value: Option<ExprRef>,
    },
    ClassDecl {
        name: Ident,
        /// Always a variable expression, so the resolver can annotate it.
        super_class: Option<ExprRef>,
        methods: Vec<FunctionRef>,
    },
}

/// Shared by function declarations and methods.
#[derive(Debug, Clone)]
pub struct FunctionDecl {
    pub name: Ident,
    pub parameters: Vec<Ident>,
    pub body: Vec<StmtRef>,
}
