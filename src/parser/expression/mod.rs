mod operator;
mod tree;

pub use operator::{
    InfixAssignmentOperator, InfixOperator, InfixShortCircuitOperator, PostfixOperator,
    PrefixOperator,
};
pub use tree::{ExprRef, Expression, ExpressionNode, Literal};
