use super::{
    error::{RuntimeError, RuntimeErrorKind},
    LoxValue,
};
use crate::{
    environment::SharedEnvironment,
    interpreter::{ControlFlow, Interpreter, SystemContext},
    parser::{statement::FunctionRef, Ast},
    string::{IdentName, INITIALIZER, THIS},
};
use compact_str::CompactString;
use std::{cell::RefCell, collections::HashMap, rc::Rc};

/// A function implemented by the host.
pub trait NativeFunction: std::fmt::Debug {
    fn name(&self) -> &'static str;
    fn arity(&self) -> usize;
    fn call(&self, arguments: &[LoxValue]) -> Result<LoxValue, RuntimeErrorKind>;
}

/// A user-defined function or method together with the scope it closes over.
#[derive(Debug, Clone)]
pub struct Function {
    pub name: IdentName,
    pub declaration: FunctionRef,
    pub closure: SharedEnvironment,
    pub is_initializer: bool,
    arity: usize,
}

impl Function {
    pub fn new(
        ast: &Ast,
        declaration: FunctionRef,
        closure: SharedEnvironment,
        is_initializer: bool,
    ) -> Self {
        let decl = &ast[declaration];
        Self {
            name: decl.name.name.clone(),
            declaration,
            closure,
            is_initializer,
            arity: decl.parameters.len(),
        }
    }

    pub fn arity(&self) -> usize {
        self.arity
    }

    /// Returns a copy whose closure has `this` bound to `instance`, one scope
    /// inside the original closure.
    pub fn bind(&self, instance: Rc<Instance>) -> Function {
        let closure = self.closure.new_scope();
        closure.define(THIS, LoxValue::Instance(instance));
        Function {
            closure,
            ..self.clone()
        }
    }

    pub fn call<C: SystemContext>(
        &self,
        interpreter: &mut Interpreter<C>,
        ast: &Ast,
        arguments: Vec<LoxValue>,
    ) -> Result<LoxValue, RuntimeError> {
        let declaration = &ast[self.declaration];
        log::trace!("Calling <fn {}> with {} arguments", self.name, arguments.len());

        let environment = self.closure.new_scope();
        for (parameter, argument) in declaration.parameters.iter().zip(arguments) {
            environment.define(parameter.as_str(), argument);
        }

        let flow = interpreter.execute_block(ast, &declaration.body, environment)?;

        if self.is_initializer {
            return self
                .closure
                .get_at(0, THIS)
                .map_err(|kind| RuntimeError::new(kind, declaration.name.span));
        }
        match flow {
            ControlFlow::Return(value) => Ok(value),
            ControlFlow::Normal => Ok(LoxValue::Nil),
        }
    }
}

#[derive(Debug)]
pub struct Class {
    pub name: IdentName,
    pub super_class: Option<Rc<Class>>,
    methods: HashMap<CompactString, Rc<Function>>,
}

impl Class {
    pub fn new(
        name: IdentName,
        super_class: Option<Rc<Class>>,
        methods: HashMap<CompactString, Rc<Function>>,
    ) -> Self {
        Self {
            name,
            super_class,
            methods,
        }
    }

    /// Looks in this class first, then up the superclass chain.
    pub fn find_method(&self, name: &str) -> Option<Rc<Function>> {
        if let Some(method) = self.methods.get(name) {
            return Some(method.clone());
        }
        self.super_class
            .as_ref()
            .and_then(|super_class| super_class.find_method(name))
    }

    pub fn arity(&self) -> usize {
        self.find_method(INITIALIZER)
            .map_or(0, |initializer| initializer.arity())
    }

    /// Constructs an instance and runs `init` on it when the class has one.
    pub fn call<C: SystemContext>(
        self: &Rc<Self>,
        interpreter: &mut Interpreter<C>,
        ast: &Ast,
        arguments: Vec<LoxValue>,
    ) -> Result<LoxValue, RuntimeError> {
        let instance = Rc::new(Instance::new(self.clone()));
        if let Some(initializer) = self.find_method(INITIALIZER) {
            initializer
                .bind(instance.clone())
                .call(interpreter, ast, arguments)?;
        }
        Ok(LoxValue::Instance(instance))
    }
}

pub struct Instance {
    pub class: Rc<Class>,
    fields: RefCell<HashMap<CompactString, LoxValue>>,
}

impl Instance {
    pub fn new(class: Rc<Class>) -> Self {
        Self {
            class,
            fields: RefCell::new(HashMap::new()),
        }
    }

    /// Fields shadow methods. A method is returned bound to this instance.
    pub fn get(self: &Rc<Self>, name: &str) -> Option<LoxValue> {
        if let Some(value) = self.fields.borrow().get(name) {
            return Some(value.clone());
        }
        self.class
            .find_method(name)
            .map(|method| LoxValue::Function(Rc::new(method.bind(self.clone()))))
    }

    pub fn set(&self, name: &str, value: LoxValue) {
        self.fields.borrow_mut().insert(name.into(), value);
    }
}

// Fields may hold the instance itself.
impl std::fmt::Debug for Instance {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Instance")
            .field("class", &self.class.name)
            .field("fields", &self.fields.borrow().keys().collect::<Vec<_>>())
            .finish()
    }
}
