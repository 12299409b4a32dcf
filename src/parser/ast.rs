use super::{
    expression::{ExprRef, Expression, ExpressionNode},
    statement::{FunctionDecl, FunctionRef, Statement, StmtRef},
};
use crate::lexer::Span;
use std::ops::Index;

/// Arena owning every node produced by the parser.
///
/// Nodes are appended and never removed, so a handle stays valid for the
/// lifetime of the arena. The REPL keeps one arena across lines so that
/// functions declared earlier can still be called.
#[derive(Debug, Default)]
pub struct Ast {
    expressions: Vec<Expression>,
    statements: Vec<Statement>,
    functions: Vec<FunctionDecl>,
}

impl Ast {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_expression(&mut self, node: ExpressionNode, span: Span) -> ExprRef {
        self.expressions.push(Expression { node, span });
        ExprRef((self.expressions.len() - 1) as u32)
    }

    pub fn push_statement(&mut self, statement: Statement) -> StmtRef {
        self.statements.push(statement);
        StmtRef((self.statements.len() - 1) as u32)
    }

    pub fn push_function(&mut self, function: FunctionDecl) -> FunctionRef {
        self.functions.push(function);
        FunctionRef((self.functions.len() - 1) as u32)
    }

    pub fn get_expression(&self, handle: ExprRef) -> Option<&Expression> {
        self.expressions.get(handle.0 as usize)
    }

    pub fn get_statement(&self, handle: StmtRef) -> Option<&Statement> {
        self.statements.get(handle.0 as usize)
    }

    pub fn get_function(&self, handle: FunctionRef) -> Option<&FunctionDecl> {
        self.functions.get(handle.0 as usize)
    }

    pub fn expression_count(&self) -> usize {
        self.expressions.len()
    }
}

impl Index<ExprRef> for Ast {
    type Output = Expression;

    fn index(&self, handle: ExprRef) -> &Self::Output {
        &self.expressions[handle.0 as usize]
    }
}

impl Index<StmtRef> for Ast {
    type Output = Statement;

    fn index(&self, handle: StmtRef) -> &Self::Output {
        &self.statements[handle.0 as usize]
    }
}

impl Index<FunctionRef> for Ast {
    type Output = FunctionDecl;

    fn index(&self, handle: FunctionRef) -> &Self::Output {
        &self.functions[handle.0 as usize]
    }
}
