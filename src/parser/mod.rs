mod ast;
mod error;
pub mod expression;
pub mod formatter;
pub mod statement;

use crate::{
    lexer::{Lexer, Token, TokenKind},
    string::Ident,
};
pub use ast::Ast;
pub use error::{ParserError, ParserErrorKind};
use expression::{
    ExprRef, ExpressionNode, InfixAssignmentOperator, InfixOperator, InfixShortCircuitOperator,
    Literal, PostfixOperator, PrefixOperator,
};
use statement::{FunctionDecl, FunctionRef, Statement, StmtRef};

/// Upper bound on both parameters and call arguments.
pub const MAX_ARGUMENTS: usize = 255;

#[derive(Debug, Clone, Copy)]
enum FunctionKind {
    Function,
    Method,
}

impl FunctionKind {
    fn name_message(&self) -> &'static str {
        match self {
            FunctionKind::Function => "function name",
            FunctionKind::Method => "method name",
        }
    }

    fn parameters_message(&self) -> &'static str {
        match self {
            FunctionKind::Function => "'(' after function name",
            FunctionKind::Method => "'(' after method name",
        }
    }

    fn body_message(&self) -> &'static str {
        match self {
            FunctionKind::Function => "'{' before function body",
            FunctionKind::Method => "'{' before method body",
        }
    }
}

/// Recursive descent for statements, Pratt parsing for expressions.
///
/// Nodes are appended to the borrowed [`Ast`]. A syntax error is recorded and
/// the parser skips to the next statement boundary, so a single pass can
/// report several errors.
pub struct Parser<'src, 'ast> {
    source: &'src str,
    tokens: Vec<Token>,
    cursor: usize,
    ast: &'ast mut Ast,
    errors: Vec<ParserError>,
}

impl<'src, 'ast> Parser<'src, 'ast> {
    pub fn new(source: &'src str, ast: &'ast mut Ast) -> Self {
        Self::starting_at(source, 0, ast)
    }

    pub fn starting_at(source: &'src str, start: usize, ast: &'ast mut Ast) -> Self {
        let mut lexer = Lexer::starting_at(source, start);
        let mut tokens = Vec::new();
        let mut errors = Vec::new();
        loop {
            match lexer.next_token() {
                Ok(token) => {
                    let is_eof = token.kind == TokenKind::Eof;
                    tokens.push(token);
                    if is_eof {
                        break;
                    }
                }
                Err(error) => errors.push(error.into()),
            }
        }
        Self {
            source,
            tokens,
            cursor: 0,
            ast,
            errors,
        }
    }

    pub fn parse(mut self) -> Result<Vec<StmtRef>, Vec<ParserError>> {
        let mut statements = Vec::new();
        while !self.is_at_end() {
            if let Some(statement) = self.parse_declaration() {
                statements.push(statement);
            }
        }
        log::debug!(
            "Parsed {} top level statements with {} errors",
            statements.len(),
            self.errors.len()
        );
        if self.errors.is_empty() {
            Ok(statements)
        } else {
            Err(self.errors)
        }
    }
}

// Token stream
impl<'src, 'ast> Parser<'src, 'ast> {
    fn peek(&self) -> Token {
        self.tokens[self.cursor]
    }

    fn is_at_end(&self) -> bool {
        self.peek().kind == TokenKind::Eof
    }

    fn next_token(&mut self) -> Token {
        let token = self.peek();
        if !self.is_at_end() {
            self.cursor += 1;
        }
        token
    }

    fn check(&self, kind: TokenKind) -> bool {
        self.peek().kind == kind
    }

    fn eat_if(&mut self, kind: TokenKind) -> Option<Token> {
        if self.check(kind) {
            Some(self.next_token())
        } else {
            None
        }
    }

    fn expect(&mut self, kind: TokenKind, message: &'static str) -> Result<Token, ParserError> {
        match self.eat_if(kind) {
            Some(token) => Ok(token),
            None => Err(ParserError {
                kind: ParserErrorKind::Expect(message),
                span: self.peek().span,
            }),
        }
    }

    fn lexeme(&self, token: &Token) -> &'src str {
        &self.source[token.span.range()]
    }

    fn ident(&self, token: Token) -> Ident {
        Ident::new(self.lexeme(&token), token.span)
    }

    /// Discards tokens until just after a semicolon or just before a keyword
    /// that opens a statement.
    fn synchronize(&mut self) {
        let mut previous = self.next_token();
        while !self.is_at_end() {
            if previous.kind == TokenKind::Semicolon || self.peek().kind.starts_statement() {
                return;
            }
            previous = self.next_token();
        }
    }
}

// Declarations
impl<'src, 'ast> Parser<'src, 'ast> {
    fn parse_declaration(&mut self) -> Option<StmtRef> {
        let result = match self.peek().kind {
            TokenKind::KeywordClass => self.parse_class_declaration(),
            TokenKind::KeywordFun => {
                self.next_token();
                self.parse_function(FunctionKind::Function)
                    .map(|function| self.ast.push_statement(Statement::FunctionDecl(function)))
            }
            TokenKind::KeywordVar => self.parse_variable_declaration(),
            _ => self.parse_statement(),
        };
        match result {
            Ok(statement) => Some(statement),
            Err(error) => {
                self.errors.push(error);
                self.synchronize();
                None
            }
        }
    }

    fn parse_class_declaration(&mut self) -> Result<StmtRef, ParserError> {
        self.next_token();
        let name = self.expect(TokenKind::Ident, "class name")?;
        let name = self.ident(name);

        let super_class = match self.eat_if(TokenKind::LessThan) {
            Some(_) => {
                let token = self.expect(TokenKind::Ident, "superclass name")?;
                let super_name = self.ident(token);
                Some(
                    self.ast
                        .push_expression(ExpressionNode::Variable(super_name), token.span),
                )
            }
            None => None,
        };

        self.expect(TokenKind::LeftBrace, "'{' before class body")?;
        let mut methods = Vec::new();
        while !self.check(TokenKind::RightBrace) && !self.is_at_end() {
            methods.push(self.parse_function(FunctionKind::Method)?);
        }
        self.expect(TokenKind::RightBrace, "'}' after class body")?;

        Ok(self.ast.push_statement(Statement::ClassDecl {
            name,
            super_class,
            methods,
        }))
    }

    fn parse_function(&mut self, kind: FunctionKind) -> Result<FunctionRef, ParserError> {
        let name = self.expect(TokenKind::Ident, kind.name_message())?;
        let name = self.ident(name);
        self.expect(TokenKind::LeftParenthesis, kind.parameters_message())?;

        let mut parameters = Vec::new();
        if !self.check(TokenKind::RightParenthesis) {
            loop {
                if parameters.len() >= MAX_ARGUMENTS {
                    self.errors.push(ParserError {
                        kind: ParserErrorKind::TooManyParameters(MAX_ARGUMENTS),
                        span: self.peek().span,
                    });
                }
                let parameter = self.expect(TokenKind::Ident, "parameter name")?;
                parameters.push(self.ident(parameter));
                if self.eat_if(TokenKind::Comma).is_none() {
                    break;
                }
            }
        }
        self.expect(TokenKind::RightParenthesis, "')' after parameters")?;

        self.expect(TokenKind::LeftBrace, kind.body_message())?;
        let body = self.parse_block_body()?;

        Ok(self.ast.push_function(FunctionDecl {
            name,
            parameters,
            body,
        }))
    }

    fn parse_variable_declaration(&mut self) -> Result<StmtRef, ParserError> {
        self.next_token();
        let name = self.expect(TokenKind::Ident, "variable name")?;
        let name = self.ident(name);

        let initial = match self.eat_if(TokenKind::Equal) {
            Some(_) => Some(self.parse_expression()?),
            None => None,
        };
        self.expect(TokenKind::Semicolon, "';' after variable declaration")?;

        Ok(self
            .ast
            .push_statement(Statement::VariableDecl { name, initial }))
    }
}

// Non-declarations
impl<'src, 'ast> Parser<'src, 'ast> {
    fn parse_statement(&mut self) -> Result<StmtRef, ParserError> {
        match self.peek().kind {
            TokenKind::KeywordFor => self.parse_for_statement(),
            TokenKind::KeywordIf => self.parse_if_statement(),
            TokenKind::KeywordPrint => {
                self.next_token();
                let value = self.parse_expression()?;
                self.expect(TokenKind::Semicolon, "';' after value")?;
                Ok(self.ast.push_statement(Statement::Print(value)))
            }
            TokenKind::KeywordReturn => {
                let keyword = self.next_token();
                let value = if self.check(TokenKind::Semicolon) {
                    None
                } else {
                    Some(self.parse_expression()?)
                };
                self.expect(TokenKind::Semicolon, "';' after return value")?;
                Ok(self.ast.push_statement(Statement::Return {
                    keyword: keyword.span,
                    value,
                }))
            }
            TokenKind::KeywordWhile => {
                self.next_token();
                self.expect(TokenKind::LeftParenthesis, "'(' after 'while'")?;
                let condition = self.parse_expression()?;
                self.expect(TokenKind::RightParenthesis, "')' after condition")?;
                let body = self.parse_statement()?;
                Ok(self
                    .ast
                    .push_statement(Statement::While { condition, body }))
            }
            TokenKind::LeftBrace => {
                self.next_token();
                let body = self.parse_block_body()?;
                Ok(self.ast.push_statement(Statement::Block(body)))
            }
            _ => self.parse_expression_statement(),
        }
    }

    fn parse_expression_statement(&mut self) -> Result<StmtRef, ParserError> {
        let expression = self.parse_expression()?;
        self.expect(TokenKind::Semicolon, "';' after expression")?;
        Ok(self.ast.push_statement(Statement::Expression(expression)))
    }

    /// Parses the statements of a block whose `{` was already consumed.
    fn parse_block_body(&mut self) -> Result<Vec<StmtRef>, ParserError> {
        let mut statements = Vec::new();
        while !self.check(TokenKind::RightBrace) && !self.is_at_end() {
            if let Some(statement) = self.parse_declaration() {
                statements.push(statement);
            }
        }
        self.expect(TokenKind::RightBrace, "'}' after block")?;
        Ok(statements)
    }

    fn parse_if_statement(&mut self) -> Result<StmtRef, ParserError> {
        self.next_token();
        self.expect(TokenKind::LeftParenthesis, "'(' after 'if'")?;
        let condition = self.parse_expression()?;
        self.expect(TokenKind::RightParenthesis, "')' after if condition")?;

        let success = self.parse_statement()?;
        let failure = match self.eat_if(TokenKind::KeywordElse) {
            Some(_) => Some(self.parse_statement()?),
            None => None,
        };
        Ok(self.ast.push_statement(Statement::If {
            condition,
            success,
            failure,
        }))
    }

    /// A `for` loop has no node of its own. It becomes a `while` loop wrapped
    /// in blocks for the initializer and the increment.
    fn parse_for_statement(&mut self) -> Result<StmtRef, ParserError> {
        self.next_token();
        self.expect(TokenKind::LeftParenthesis, "'(' after 'for'")?;

        let initializer = if self.eat_if(TokenKind::Semicolon).is_some() {
            None
        } else if self.check(TokenKind::KeywordVar) {
            Some(self.parse_variable_declaration()?)
        } else {
            Some(self.parse_expression_statement()?)
        };

        let condition = if self.check(TokenKind::Semicolon) {
            None
        } else {
            Some(self.parse_expression()?)
        };
        let semicolon = self.expect(TokenKind::Semicolon, "';' after loop condition")?;

        let increment = if self.check(TokenKind::RightParenthesis) {
            None
        } else {
            Some(self.parse_expression()?)
        };
        self.expect(TokenKind::RightParenthesis, "')' after for clauses")?;

        let mut body = self.parse_statement()?;
        if let Some(increment) = increment {
            let increment = self.ast.push_statement(Statement::Expression(increment));
            body = self
                .ast
                .push_statement(Statement::Block(vec![body, increment]));
        }
        let condition = match condition {
            Some(condition) => condition,
            None => self.ast.push_expression(
                ExpressionNode::Literal(Literal::Bool(true)),
                semicolon.span,
            ),
        };
        body = self
            .ast
            .push_statement(Statement::While { condition, body });
        if let Some(initializer) = initializer {
            body = self
                .ast
                .push_statement(Statement::Block(vec![initializer, body]));
        }
        Ok(body)
    }
}

// Pratt parser for expressions
impl<'src, 'ast> Parser<'src, 'ast> {
    pub fn parse_expression(&mut self) -> Result<ExprRef, ParserError> {
        self.parse_expression_pratt(0)
    }

    fn parse_left_expression(&mut self) -> Result<ExprRef, ParserError> {
        let token = self.peek();

        if let Some(operator) = PrefixOperator::from_token(token.kind) {
            self.next_token();
            let rhs = self.parse_expression_pratt(operator.get_binding_power())?;
            return Ok(self
                .ast
                .push_expression(ExpressionNode::Prefix { operator, rhs }, token.span));
        }

        let node = match token.kind {
            TokenKind::NumericLiteral => {
                let value = self
                    .lexeme(&token)
                    .parse()
                    .expect("Numeric literal tokens are valid `f64`.");
                ExpressionNode::Literal(Literal::Number(value))
            }
            TokenKind::StringLiteral => {
                let lexeme = self.lexeme(&token);
                let value = &lexeme[1..lexeme.len() - 1];
                ExpressionNode::Literal(Literal::String(value.into()))
            }
            TokenKind::KeywordTrue => ExpressionNode::Literal(Literal::Bool(true)),
            TokenKind::KeywordFalse => ExpressionNode::Literal(Literal::Bool(false)),
            TokenKind::KeywordNil => ExpressionNode::Literal(Literal::Nil),
            TokenKind::KeywordThis => ExpressionNode::This,
            TokenKind::Ident => ExpressionNode::Variable(self.ident(token)),
            TokenKind::KeywordSuper => {
                self.next_token();
                self.expect(TokenKind::Dot, "'.' after 'super'")?;
                let method = self.expect(TokenKind::Ident, "superclass method name")?;
                let method = self.ident(method);
                return Ok(self
                    .ast
                    .push_expression(ExpressionNode::Super { method }, token.span));
            }
            TokenKind::LeftParenthesis => {
                self.next_token();
                let inner = self.parse_expression()?;
                self.expect(TokenKind::RightParenthesis, "')' after expression")?;
                return Ok(self
                    .ast
                    .push_expression(ExpressionNode::Group { inner }, token.span));
            }
            _ => {
                return Err(ParserError {
                    kind: ParserErrorKind::ExpectExpression,
                    span: token.span,
                })
            }
        };
        self.next_token();
        Ok(self.ast.push_expression(node, token.span))
    }

    fn parse_expression_pratt(&mut self, min_bp: u8) -> Result<ExprRef, ParserError> {
        let mut lhs = self.parse_left_expression()?;

        loop {
            let token = self.peek();

            if let Some(operator) = PostfixOperator::from_token(token.kind) {
                if operator.get_binding_power() < min_bp {
                    break;
                }
                self.next_token();
                lhs = match operator {
                    PostfixOperator::Call => self.finish_call(lhs)?,
                    PostfixOperator::Access => self.finish_access(lhs)?,
                };
                continue;
            }

            if let Some(operator) = InfixOperator::from_token(token.kind) {
                let (lbp, rbp) = operator.get_binding_power();
                if lbp < min_bp {
                    break;
                }
                self.next_token();
                let rhs = self.parse_expression_pratt(rbp)?;
                lhs = self.ast.push_expression(
                    ExpressionNode::Infix { operator, lhs, rhs },
                    token.span,
                );
                continue;
            }

            if let Some(operator) = InfixShortCircuitOperator::from_token(token.kind) {
                let (lbp, rbp) = operator.get_binding_power();
                if lbp < min_bp {
                    break;
                }
                self.next_token();
                let rhs = self.parse_expression_pratt(rbp)?;
                lhs = self.ast.push_expression(
                    ExpressionNode::InfixShortCircuit { operator, lhs, rhs },
                    token.span,
                );
                continue;
            }

            if token.kind == TokenKind::Equal {
                let (lbp, rbp) = InfixAssignmentOperator::Assign.get_binding_power();
                if lbp < min_bp {
                    break;
                }
                self.next_token();
                let value = self.parse_expression_pratt(rbp)?;
                lhs = self.finish_assignment(lhs, value, token);
                continue;
            }

            break;
        }
        Ok(lhs)
    }

    fn finish_call(&mut self, callee: ExprRef) -> Result<ExprRef, ParserError> {
        let mut arguments = Vec::new();
        if !self.check(TokenKind::RightParenthesis) {
            loop {
                if arguments.len() >= MAX_ARGUMENTS {
                    self.errors.push(ParserError {
                        kind: ParserErrorKind::TooManyArguments(MAX_ARGUMENTS),
                        span: self.peek().span,
                    });
                }
                arguments.push(self.parse_expression()?);
                if self.eat_if(TokenKind::Comma).is_none() {
                    break;
                }
            }
        }
        let paren = self.expect(TokenKind::RightParenthesis, "')' after arguments")?;
        Ok(self
            .ast
            .push_expression(ExpressionNode::Call { callee, arguments }, paren.span))
    }

    fn finish_access(&mut self, object: ExprRef) -> Result<ExprRef, ParserError> {
        let name = self.expect(TokenKind::Ident, "property name after '.'")?;
        let name = self.ident(name);
        let span = name.span;
        Ok(self
            .ast
            .push_expression(ExpressionNode::Get { object, name }, span))
    }

    /// Reinterprets an already parsed expression as the target of `=`. An
    /// invalid target is reported without unwinding since the parser is not
    /// confused about where it is.
    fn finish_assignment(&mut self, target: ExprRef, value: ExprRef, equals: Token) -> ExprRef {
        match self.ast[target].node.clone() {
            ExpressionNode::Variable(name) => {
                let span = name.span;
                self.ast
                    .push_expression(ExpressionNode::Assign { name, value }, span)
            }
            ExpressionNode::Get { object, name } => {
                let span = name.span;
                self.ast.push_expression(
                    ExpressionNode::Set {
                        object,
                        name,
                        value,
                    },
                    span,
                )
            }
            _ => {
                self.errors.push(ParserError {
                    kind: ParserErrorKind::InvalidAssignmentTarget,
                    span: equals.span,
                });
                target
            }
        }
    }
}
