use super::{InfixOperator, InfixShortCircuitOperator, PrefixOperator};
use crate::{lexer::Span, string::Ident};
use compact_str::CompactString;

/// Handle to an expression stored in an [`Ast`](crate::parser::Ast). Handles
/// are unique per node, so they double as node identity for resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ExprRef(pub(crate) u32);

#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    Number(f64),
    String(CompactString),
    Bool(bool),
    Nil,
}

#[derive(Debug, Clone)]
pub enum ExpressionNode {
    Literal(Literal),
    Group {
        inner: ExprRef,
    },
    Prefix {
        operator: PrefixOperator,
        rhs: ExprRef,
    },
    Infix {
        operator: InfixOperator,
        lhs: ExprRef,
        rhs: ExprRef,
    },
    InfixShortCircuit {
        operator: InfixShortCircuitOperator,
        lhs: ExprRef,
        rhs: ExprRef,
    },
    Variable(Ident),
    Assign {
        name: Ident,
        value: ExprRef,
    },
    Call {
        callee: ExprRef,
        arguments: Vec<ExprRef>,
    },
    Get {
        object: ExprRef,
        name: Ident,
    },
    Set {
        object: ExprRef,
        name: Ident,
        value: ExprRef,
    },
    This,
    Super {
        method: Ident,
    },
}

#[derive(Debug, Clone)]
pub struct Expression {
    pub node: ExpressionNode,
    /// Span of the anchor token: the operator, the name, the closing
    /// parenthesis of a call or the keyword.
    pub span: Span,
}
