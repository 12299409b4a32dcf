mod error;
pub mod formatter;

use crate::{
    lexer::Span,
    parser::{
        expression::{ExprRef, ExpressionNode},
        statement::{FunctionRef, Statement, StmtRef},
        Ast,
    },
    string::{Ident, IdentName, INITIALIZER, SUPER, THIS},
};
pub use error::{ResolutionError, ResolutionErrorKind};
use std::collections::HashMap;

/// Number of scopes between a reference and the scope that declares it.
/// Expressions without an entry refer to globals.
pub type ResolutionMap = HashMap<ExprRef, usize>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Resolution {
    Declared,
    Defined,
}

#[derive(Debug, Clone, Copy)]
struct Binding {
    resolution: Resolution,
    span: Span,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FunctionEnvironment {
    None,
    Function,
    Initializer,
    Method,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ClassEnvironment {
    None,
    Class,
    SubClass,
}

/// Static pass that computes scope distances for local variables and checks
/// scoping rules. Errors are collected rather than stopping the walk.
pub struct Resolver<'ast> {
    ast: &'ast Ast,
    resolution: ResolutionMap,
    function: FunctionEnvironment,
    class: ClassEnvironment,
    scopes: Vec<HashMap<IdentName, Binding>>,
    errors: Vec<ResolutionError>,
}

impl<'ast> Resolver<'ast> {
    pub fn new(ast: &'ast Ast) -> Self {
        Self {
            ast,
            resolution: HashMap::new(),
            function: FunctionEnvironment::None,
            class: ClassEnvironment::None,
            scopes: Vec::new(),
            errors: Vec::new(),
        }
    }

    pub fn resolve(
        mut self,
        statements: &[StmtRef],
    ) -> Result<ResolutionMap, Vec<ResolutionError>> {
        for statement in statements {
            self.resolve_statement(*statement);
        }
        if self.errors.is_empty() {
            Ok(self.resolution)
        } else {
            Err(self.errors)
        }
    }
}

// Base
impl<'ast> Resolver<'ast> {
    fn enter_scope(&mut self) {
        self.scopes.push(HashMap::new());
    }

    fn exit_scope(&mut self) {
        self.scopes.pop();
    }

    fn report(&mut self, kind: ResolutionErrorKind, span: Span) {
        self.errors.push(ResolutionError { kind, span });
    }

    fn declare(&mut self, ident: &Ident) {
        let Some(inner_scope) = self.scopes.last_mut() else {
            return;
        };
        let previous = inner_scope.insert(
            ident.name.clone(),
            Binding {
                resolution: Resolution::Declared,
                span: ident.span,
            },
        );
        if let Some(previous) = previous {
            self.report(
                ResolutionErrorKind::ShadowLocal {
                    old: Ident {
                        name: ident.name.clone(),
                        span: previous.span,
                    },
                    new: ident.clone(),
                },
                ident.span,
            );
        }
    }

    fn define(&mut self, ident: &Ident) {
        if let Some(inner_scope) = self.scopes.last_mut() {
            inner_scope.insert(
                ident.name.clone(),
                Binding {
                    resolution: Resolution::Defined,
                    span: ident.span,
                },
            );
        }
    }

    fn resolve_local(&mut self, expr: ExprRef, name: &str) {
        let total_depth = self.scopes.len();
        for (depth, scope) in self.scopes.iter().enumerate().rev() {
            if scope.contains_key(name) {
                let distance = total_depth - 1 - depth;
                log::debug!("Resolved `{name}` ({expr:?}) at distance {distance}");
                self.resolution.insert(expr, distance);
                return;
            }
        }
        log::trace!("Left `{name}` ({expr:?}) to global lookup");
    }
}

// Statements
impl<'ast> Resolver<'ast> {
    fn resolve_statement(&mut self, statement: StmtRef) {
        let ast = self.ast;
        match &ast[statement] {
            Statement::Expression(expr) | Statement::Print(expr) => self.resolve_expression(*expr),
            Statement::VariableDecl { name, initial } => {
                self.declare(name);
                if let Some(initial) = initial {
                    self.resolve_expression(*initial);
                }
                self.define(name);
            }
            Statement::Block(statements) => {
                self.enter_scope();
                for statement in statements {
                    self.resolve_statement(*statement);
                }
                self.exit_scope();
            }
            Statement::If {
                condition,
                success,
                failure,
            } => {
                self.resolve_expression(*condition);
                self.resolve_statement(*success);
                if let Some(failure) = failure {
                    self.resolve_statement(*failure);
                }
            }
            Statement::While { condition, body } => {
                self.resolve_expression(*condition);
                self.resolve_statement(*body);
            }
            Statement::FunctionDecl(function) => {
                let name = &ast[*function].name;
                self.declare(name);
                self.define(name);
                self.resolve_function(*function, FunctionEnvironment::Function);
            }
            Statement::Return { keyword, value } => {
                if self.function == FunctionEnvironment::None {
                    self.report(ResolutionErrorKind::NonFunctionReturn, *keyword);
                }
                if let Some(value) = value {
                    if self.function == FunctionEnvironment::Initializer {
                        self.report(ResolutionErrorKind::InitializerReturn, *keyword);
                    }
                    self.resolve_expression(*value);
                }
            }
            Statement::ClassDecl {
                name,
                super_class,
                methods,
            } => self.resolve_class_declaration(name, *super_class, methods),
        }
    }

    fn resolve_class_declaration(
        &mut self,
        name: &Ident,
        super_class: Option<ExprRef>,
        methods: &[FunctionRef],
    ) {
        let ast = self.ast;
        let enclosing = self.class;
        self.class = ClassEnvironment::Class;

        self.declare(name);
        self.define(name);

        if let Some(super_class) = super_class {
            if let ExpressionNode::Variable(super_name) = &ast[super_class].node {
                if super_name.name == name.name {
                    self.report(
                        ResolutionErrorKind::SelfInheritance(super_name.clone()),
                        super_name.span,
                    );
                }
            }
            self.class = ClassEnvironment::SubClass;
            self.resolve_expression(super_class);

            self.enter_scope();
            self.define(&Ident::new(SUPER, ast[super_class].span));
        }

        self.enter_scope();
        self.define(&Ident::new(THIS, name.span));
        for method in methods {
            let kind = if ast[*method].name.as_str() == INITIALIZER {
                FunctionEnvironment::Initializer
            } else {
                FunctionEnvironment::Method
            };
            self.resolve_function(*method, kind);
        }
        self.exit_scope();

        if super_class.is_some() {
            self.exit_scope();
        }
        self.class = enclosing;
    }

    fn resolve_function(&mut self, function: FunctionRef, environment: FunctionEnvironment) {
        let ast = self.ast;
        let declaration = &ast[function];
        let enclosing = self.function;
        self.function = environment;

        self.enter_scope();
        for parameter in declaration.parameters.iter() {
            self.declare(parameter);
            self.define(parameter);
        }
        for statement in declaration.body.iter() {
            self.resolve_statement(*statement);
        }
        self.exit_scope();

        self.function = enclosing;
    }
}

// Expressions
impl<'ast> Resolver<'ast> {
    fn resolve_expression(&mut self, expr: ExprRef) {
        let ast = self.ast;
        let expression = &ast[expr];
        match &expression.node {
            ExpressionNode::Literal(_) => {}
            ExpressionNode::Group { inner } => self.resolve_expression(*inner),
            ExpressionNode::Prefix { rhs, .. } => self.resolve_expression(*rhs),
            ExpressionNode::Infix { lhs, rhs, .. }
            | ExpressionNode::InfixShortCircuit { lhs, rhs, .. } => {
                self.resolve_expression(*lhs);
                self.resolve_expression(*rhs);
            }
            ExpressionNode::Variable(name) => {
                let pending = self
                    .scopes
                    .last()
                    .and_then(|scope| scope.get(&name.name))
                    .filter(|binding| binding.resolution == Resolution::Declared)
                    .copied();
                if let Some(binding) = pending {
                    self.report(
                        ResolutionErrorKind::SelfReferentialInitializer {
                            destination: Ident {
                                name: name.name.clone(),
                                span: binding.span,
                            },
                            reference: name.clone(),
                        },
                        name.span,
                    );
                }
                self.resolve_local(expr, name.as_str());
            }
            ExpressionNode::Assign { name, value } => {
                self.resolve_expression(*value);
                self.resolve_local(expr, name.as_str());
            }
            ExpressionNode::Call { callee, arguments } => {
                self.resolve_expression(*callee);
                for argument in arguments {
                    self.resolve_expression(*argument);
                }
            }
            ExpressionNode::Get { object, .. } => self.resolve_expression(*object),
            ExpressionNode::Set { object, value, .. } => {
                self.resolve_expression(*value);
                self.resolve_expression(*object);
            }
            ExpressionNode::This => {
                if self.class == ClassEnvironment::None {
                    self.report(ResolutionErrorKind::NonClassThis, expression.span);
                } else {
                    self.resolve_local(expr, THIS);
                }
            }
            ExpressionNode::Super { .. } => {
                match self.class {
                    ClassEnvironment::None => {
                        self.report(ResolutionErrorKind::NonClassSuper, expression.span)
                    }
                    ClassEnvironment::Class => {
                        self.report(ResolutionErrorKind::NoSuperClassSuper, expression.span)
                    }
                    ClassEnvironment::SubClass => {}
                }
                self.resolve_local(expr, SUPER);
            }
        }
    }
}
