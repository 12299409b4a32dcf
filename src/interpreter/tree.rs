use super::{ControlFlow, SystemContext};
use crate::{
    environment::SharedEnvironment,
    lexer::Span,
    parser::{
        expression::{
            ExprRef, ExpressionNode, InfixOperator, InfixShortCircuitOperator, Literal,
            PrefixOperator,
        },
        statement::{FunctionRef, Statement, StmtRef},
        Ast,
    },
    resolver::ResolutionMap,
    string::{Ident, INITIALIZER, SUPER, THIS},
    value::{
        error::{RuntimeError, RuntimeErrorKind},
        Class, Function, LoxValue,
    },
};
use compact_str::CompactString;
use std::{collections::HashMap, rc::Rc};

/// Tree-walking evaluator.
///
/// The current scope is passed down explicitly instead of being stored on
/// the interpreter. A block runs in a child frame that simply goes out of
/// scope on every exit path, whether that is normal completion, a `return`
/// or a runtime error.
pub struct Interpreter<C: SystemContext> {
    globals: SharedEnvironment,
    locals: ResolutionMap,
    call_depth: usize,
    context: C,
}

/// Nested calls allowed before a runtime error is raised instead of
/// exhausting the host stack.
pub const MAX_CALL_DEPTH: usize = 255;

impl<C> Interpreter<C>
where
    C: SystemContext,
{
    pub fn new(context: C) -> Self {
        Self {
            globals: SharedEnvironment::globals(),
            locals: ResolutionMap::new(),
            call_depth: 0,
            context,
        }
    }

    /// Records scope distances for a freshly resolved batch of statements.
    /// Earlier entries are kept so code from previous REPL lines keeps working.
    pub fn resolve(&mut self, locals: ResolutionMap) {
        self.locals.extend(locals);
    }

    pub fn context(&self) -> &C {
        &self.context
    }

    pub fn context_mut(&mut self) -> &mut C {
        &mut self.context
    }

    pub fn into_context(self) -> C {
        self.context
    }

    /// Runs top level statements in order, stopping at the first runtime error.
    pub fn interpret(&mut self, ast: &Ast, statements: &[StmtRef]) -> Result<(), RuntimeError> {
        let globals = self.globals.clone();
        for statement in statements {
            self.execute(ast, *statement, &globals)?;
        }
        Ok(())
    }

    /// Runs `statements` directly in `environment` without opening another scope.
    pub fn execute_block(
        &mut self,
        ast: &Ast,
        statements: &[StmtRef],
        environment: SharedEnvironment,
    ) -> Result<ControlFlow, RuntimeError> {
        for statement in statements {
            if let flow @ ControlFlow::Return(_) = self.execute(ast, *statement, &environment)? {
                return Ok(flow);
            }
        }
        Ok(ControlFlow::Normal)
    }
}

// Statements
impl<C> Interpreter<C>
where
    C: SystemContext,
{
    fn execute(
        &mut self,
        ast: &Ast,
        statement: StmtRef,
        environment: &SharedEnvironment,
    ) -> Result<ControlFlow, RuntimeError> {
        log::trace!("Executing {statement:?}");
        match &ast[statement] {
            Statement::Expression(expr) => {
                self.evaluate(ast, *expr, environment)?;
                Ok(ControlFlow::Normal)
            }
            Statement::Print(expr) => {
                let value = self.evaluate(ast, *expr, environment)?;
                self.context.writeln(&value.to_string());
                Ok(ControlFlow::Normal)
            }
            Statement::VariableDecl { name, initial } => {
                let value = match initial {
                    Some(initial) => self.evaluate(ast, *initial, environment)?,
                    None => LoxValue::Nil,
                };
                environment.define(name.as_str(), value);
                Ok(ControlFlow::Normal)
            }
            Statement::Block(statements) => {
                self.execute_block(ast, statements, environment.new_scope())
            }
            Statement::If {
                condition,
                success,
                failure,
            } => {
                if self.evaluate(ast, *condition, environment)?.is_truthy() {
                    self.execute(ast, *success, environment)
                } else if let Some(failure) = failure {
                    self.execute(ast, *failure, environment)
                } else {
                    Ok(ControlFlow::Normal)
                }
            }
            Statement::While { condition, body } => {
                while self.evaluate(ast, *condition, environment)?.is_truthy() {
                    if let flow @ ControlFlow::Return(_) = self.execute(ast, *body, environment)? {
                        return Ok(flow);
                    }
                }
                Ok(ControlFlow::Normal)
            }
            Statement::FunctionDecl(declaration) => {
                let function = Function::new(ast, *declaration, environment.clone(), false);
                environment.define(
                    ast[*declaration].name.as_str(),
                    LoxValue::Function(Rc::new(function)),
                );
                Ok(ControlFlow::Normal)
            }
            Statement::Return { value, .. } => {
                let value = match value {
                    Some(value) => self.evaluate(ast, *value, environment)?,
                    None => LoxValue::Nil,
                };
                Ok(ControlFlow::Return(value))
            }
            Statement::ClassDecl {
                name,
                super_class,
                methods,
            } => {
                self.execute_class_declaration(ast, name, *super_class, methods, environment)?;
                Ok(ControlFlow::Normal)
            }
        }
    }

    fn execute_class_declaration(
        &mut self,
        ast: &Ast,
        name: &Ident,
        super_class: Option<ExprRef>,
        methods: &[FunctionRef],
        environment: &SharedEnvironment,
    ) -> Result<(), RuntimeError> {
        // Bound first so methods can refer to the class by name.
        environment.define(name.as_str(), LoxValue::Nil);

        let super_class = match super_class {
            Some(expr) => match self.evaluate(ast, expr, environment)? {
                LoxValue::Class(class) => Some(class),
                other => {
                    return Err(RuntimeError::new(
                        RuntimeErrorKind::InvalidSuperClass(other),
                        ast[expr].span,
                    ))
                }
            },
            None => None,
        };

        // Methods of a subclass close over an extra scope holding `super`.
        let method_environment = match super_class {
            Some(ref super_class) => {
                let scope = environment.new_scope();
                scope.define(SUPER, LoxValue::Class(super_class.clone()));
                scope
            }
            None => environment.clone(),
        };

        let methods = methods
            .iter()
            .map(|method| {
                let method_name = ast[*method].name.as_str();
                let function = Function::new(
                    ast,
                    *method,
                    method_environment.clone(),
                    method_name == INITIALIZER,
                );
                (CompactString::from(method_name), Rc::new(function))
            })
            .collect::<HashMap<_, _>>();

        let class = Class::new(name.name.clone(), super_class, methods);
        environment
            .assign(name.as_str(), LoxValue::Class(Rc::new(class)))
            .map_err(|kind| RuntimeError::new(kind, name.span))
    }
}

// Expressions
impl<C> Interpreter<C>
where
    C: SystemContext,
{
    pub fn evaluate(
        &mut self,
        ast: &Ast,
        expr: ExprRef,
        environment: &SharedEnvironment,
    ) -> Result<LoxValue, RuntimeError> {
        let expression = &ast[expr];
        let span = expression.span;
        let fail = |kind| RuntimeError::new(kind, span);

        match &expression.node {
            ExpressionNode::Literal(literal) => Ok(match literal {
                Literal::Number(v) => LoxValue::Number(*v),
                Literal::String(v) => LoxValue::String(v.clone()),
                Literal::Bool(v) => LoxValue::Bool(*v),
                Literal::Nil => LoxValue::Nil,
            }),
            ExpressionNode::Group { inner } => self.evaluate(ast, *inner, environment),
            ExpressionNode::Prefix { operator, rhs } => {
                let rhs = self.evaluate(ast, *rhs, environment)?;
                match operator {
                    PrefixOperator::Bang => Ok(LoxValue::Bool(rhs.logical_not())),
                    PrefixOperator::Minus => rhs.numeric_negate().map_err(fail),
                }
            }
            ExpressionNode::Infix { operator, lhs, rhs } => {
                let lhs = self.evaluate(ast, *lhs, environment)?;
                let rhs = self.evaluate(ast, *rhs, environment)?;
                Self::evaluate_infix(*operator, &lhs, &rhs).map_err(fail)
            }
            ExpressionNode::InfixShortCircuit { operator, lhs, rhs } => {
                let lhs = self.evaluate(ast, *lhs, environment)?;
                let short_circuits = match operator {
                    InfixShortCircuitOperator::And => !lhs.is_truthy(),
                    InfixShortCircuitOperator::Or => lhs.is_truthy(),
                };
                if short_circuits {
                    Ok(lhs)
                } else {
                    self.evaluate(ast, *rhs, environment)
                }
            }
            ExpressionNode::Variable(name) => self
                .look_up_variable(expr, name.as_str(), environment)
                .map_err(fail),
            ExpressionNode::This => self.look_up_variable(expr, THIS, environment).map_err(fail),
            ExpressionNode::Assign { name, value } => {
                let value = self.evaluate(ast, *value, environment)?;
                let result = match self.locals.get(&expr) {
                    Some(distance) => environment.assign_at(*distance, name.as_str(), value.clone()),
                    None => self.globals.assign(name.as_str(), value.clone()),
                };
                result.map_err(fail)?;
                Ok(value)
            }
            ExpressionNode::Call { callee, arguments } => {
                self.evaluate_call(ast, *callee, arguments, span, environment)
            }
            ExpressionNode::Get { object, name } => {
                let object = self.evaluate(ast, *object, environment)?;
                let LoxValue::Instance(ref instance) = object else {
                    return Err(fail(RuntimeErrorKind::InvalidInstanceGet(object)));
                };
                instance.get(name.as_str()).ok_or_else(|| {
                    fail(RuntimeErrorKind::UndefinedProperty {
                        name: name.as_str().into(),
                        object: object.clone(),
                    })
                })
            }
            ExpressionNode::Set {
                object,
                name,
                value,
            } => {
                let object = self.evaluate(ast, *object, environment)?;
                let LoxValue::Instance(ref instance) = object else {
                    return Err(fail(RuntimeErrorKind::InvalidInstanceSet(object)));
                };
                let value = self.evaluate(ast, *value, environment)?;
                instance.set(name.as_str(), value.clone());
                Ok(value)
            }
            ExpressionNode::Super { method } => {
                self.evaluate_super(expr, method, environment)
            }
        }
    }

    fn evaluate_infix(
        operator: InfixOperator,
        lhs: &LoxValue,
        rhs: &LoxValue,
    ) -> Result<LoxValue, RuntimeErrorKind> {
        type Operator = InfixOperator;
        match operator {
            Operator::Add => lhs.add(rhs),
            Operator::Subtract => lhs.subtract(rhs),
            Operator::Multiply => lhs.multiply(rhs),
            Operator::Divide => lhs.divide(rhs),
            Operator::LessThan => lhs.less_than(rhs),
            Operator::LessThanEqual => lhs.less_than_or_equal(rhs),
            Operator::GreaterThan => lhs.greater_than(rhs),
            Operator::GreaterThanEqual => lhs.greater_than_or_equal(rhs),
            Operator::EqualEqual => Ok(LoxValue::Bool(lhs.is_equal(rhs))),
            Operator::BangEqual => Ok(LoxValue::Bool(lhs.is_not_equal(rhs))),
        }
    }

    fn evaluate_call(
        &mut self,
        ast: &Ast,
        callee: ExprRef,
        arguments: &[ExprRef],
        span: Span,
        environment: &SharedEnvironment,
    ) -> Result<LoxValue, RuntimeError> {
        let callee = self.evaluate(ast, callee, environment)?;
        let mut values = Vec::with_capacity(arguments.len());
        for argument in arguments {
            values.push(self.evaluate(ast, *argument, environment)?);
        }

        let Some(callable) = callee.as_callable() else {
            return Err(RuntimeError::new(
                RuntimeErrorKind::InvalidCallee(callee.clone()),
                span,
            ));
        };
        if values.len() != callable.arity() {
            return Err(RuntimeError::new(
                RuntimeErrorKind::InvalidArgumentCount {
                    actual: values.len(),
                    expected: callable.arity(),
                },
                span,
            ));
        }
        if self.call_depth >= MAX_CALL_DEPTH {
            return Err(RuntimeError::new(RuntimeErrorKind::StackOverflow, span));
        }
        self.call_depth += 1;
        let result = callable.call(self, ast, values, span);
        self.call_depth -= 1;
        result
    }

    /// `super` sits at the resolved distance and `this` one frame closer, in
    /// the scope created when the method was bound.
    fn evaluate_super(
        &mut self,
        expr: ExprRef,
        method: &Ident,
        environment: &SharedEnvironment,
    ) -> Result<LoxValue, RuntimeError> {
        let fail = |kind| RuntimeError::new(kind, method.span);
        let distance = self
            .locals
            .get(&expr)
            .copied()
            .ok_or_else(|| fail(RuntimeErrorKind::UndefinedVariable(SUPER.into())))?;

        let super_class = match environment.get_at(distance, SUPER).map_err(fail)? {
            LoxValue::Class(class) => class,
            other => return Err(fail(RuntimeErrorKind::InvalidSuperClass(other))),
        };
        let object = distance
            .checked_sub(1)
            .ok_or_else(|| fail(RuntimeErrorKind::UndefinedVariable(THIS.into())))
            .and_then(|distance| environment.get_at(distance, THIS).map_err(fail))?;
        let LoxValue::Instance(ref instance) = object else {
            return Err(fail(RuntimeErrorKind::InvalidInstanceGet(object)));
        };

        let function = super_class.find_method(method.as_str()).ok_or_else(|| {
            fail(RuntimeErrorKind::UndefinedProperty {
                name: method.as_str().into(),
                object: object.clone(),
            })
        })?;
        Ok(LoxValue::Function(Rc::new(function.bind(instance.clone()))))
    }

    fn look_up_variable(
        &self,
        expr: ExprRef,
        name: &str,
        environment: &SharedEnvironment,
    ) -> Result<LoxValue, RuntimeErrorKind> {
        match self.locals.get(&expr) {
            Some(distance) => environment.get_at(*distance, name),
            None => self.globals.get(name),
        }
    }
}
