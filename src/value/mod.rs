pub mod error;
pub mod formatter;
mod object;

use crate::{interpreter::Interpreter, interpreter::SystemContext, lexer::Span, parser::Ast};
use compact_str::{CompactString, CompactStringExt};
use error::{RuntimeError, RuntimeErrorKind};
pub use object::{Class, Function, Instance, NativeFunction};
use std::rc::Rc;

#[derive(Debug, Clone)]
pub enum LoxValue {
    Number(f64),
    String(CompactString),
    Nil,
    Bool(bool),
    NativeFunction(Rc<dyn NativeFunction>),
    Function(Rc<Function>),
    Class(Rc<Class>),
    Instance(Rc<Instance>),
}

impl std::fmt::Display for LoxValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Number(v) if v.is_nan() => write!(f, "NaN"),
            Self::Number(v) if v.is_infinite() => {
                write!(f, "{}Infinity", if v.is_sign_negative() { "-" } else { "" })
            }
            // Integral values print without a fractional part.
            Self::Number(v) => write!(f, "{v}"),
            Self::String(v) => write!(f, "{v}"),
            Self::Nil => write!(f, "nil"),
            Self::Bool(v) => write!(f, "{v}"),
            Self::NativeFunction(_) => write!(f, "<native fn>"),
            Self::Function(function) => write!(f, "<fn {}>", function.name),
            Self::Class(class) => write!(f, "{}", class.name),
            Self::Instance(instance) => write!(f, "{} instance", instance.class.name),
        }
    }
}

impl LoxValue {
    /// Name of the value's type, used in diagnostics.
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Number(_) => "number",
            Self::String(_) => "string",
            Self::Nil => "nil",
            Self::Bool(_) => "boolean",
            Self::NativeFunction(_) => "native function",
            Self::Function(_) => "function",
            Self::Class(_) => "class",
            Self::Instance(_) => "instance",
        }
    }

    pub fn as_callable(&self) -> Option<Callable<'_>> {
        match self {
            Self::NativeFunction(native) => Some(Callable::Native(native)),
            Self::Function(function) => Some(Callable::Function(function)),
            Self::Class(class) => Some(Callable::Class(class)),
            _ => None,
        }
    }
}

// Unary operators
impl LoxValue {
    pub fn is_truthy(&self) -> bool {
        !matches!(self, LoxValue::Bool(false) | LoxValue::Nil)
    }

    pub fn logical_not(&self) -> bool {
        !self.is_truthy()
    }

    pub fn numeric_negate(&self) -> Result<LoxValue, RuntimeErrorKind> {
        match self {
            LoxValue::Number(v) => Ok(LoxValue::Number(-v)),
            v => Err(RuntimeErrorKind::NonNumeric(v.clone())),
        }
    }
}

// Binary operators
impl LoxValue {
    // Arithmetic + string concatenation
    pub fn add(&self, other: &LoxValue) -> Result<LoxValue, RuntimeErrorKind> {
        match (self, other) {
            (LoxValue::Number(lhs), LoxValue::Number(rhs)) => Ok(LoxValue::Number(lhs + rhs)),
            (LoxValue::String(lhs), LoxValue::String(rhs)) => {
                Ok(LoxValue::String([lhs, rhs].concat_compact()))
            }
            (lhs, rhs) => Err(RuntimeErrorKind::NonAddable(lhs.clone(), rhs.clone())),
        }
    }

    fn numeric_binary(
        &self,
        other: &LoxValue,
        operation: impl FnOnce(f64, f64) -> LoxValue,
    ) -> Result<LoxValue, RuntimeErrorKind> {
        match (self, other) {
            (LoxValue::Number(lhs), LoxValue::Number(rhs)) => Ok(operation(*lhs, *rhs)),
            (lhs, rhs) => Err(RuntimeErrorKind::NonNumerics(lhs.clone(), rhs.clone())),
        }
    }

    pub fn subtract(&self, other: &LoxValue) -> Result<LoxValue, RuntimeErrorKind> {
        self.numeric_binary(other, |lhs, rhs| LoxValue::Number(lhs - rhs))
    }

    pub fn multiply(&self, other: &LoxValue) -> Result<LoxValue, RuntimeErrorKind> {
        self.numeric_binary(other, |lhs, rhs| LoxValue::Number(lhs * rhs))
    }

    /// Division by zero follows IEEE-754.
    pub fn divide(&self, other: &LoxValue) -> Result<LoxValue, RuntimeErrorKind> {
        self.numeric_binary(other, |lhs, rhs| LoxValue::Number(lhs / rhs))
    }

    // Comparison
    pub fn less_than(&self, other: &LoxValue) -> Result<LoxValue, RuntimeErrorKind> {
        self.numeric_binary(other, |lhs, rhs| LoxValue::Bool(lhs < rhs))
    }

    pub fn less_than_or_equal(&self, other: &LoxValue) -> Result<LoxValue, RuntimeErrorKind> {
        self.numeric_binary(other, |lhs, rhs| LoxValue::Bool(lhs <= rhs))
    }

    pub fn greater_than(&self, other: &LoxValue) -> Result<LoxValue, RuntimeErrorKind> {
        self.numeric_binary(other, |lhs, rhs| LoxValue::Bool(lhs > rhs))
    }

    pub fn greater_than_or_equal(&self, other: &LoxValue) -> Result<LoxValue, RuntimeErrorKind> {
        self.numeric_binary(other, |lhs, rhs| LoxValue::Bool(lhs >= rhs))
    }

    // Equality
    pub fn is_equal(&self, other: &LoxValue) -> bool {
        match (self, other) {
            (LoxValue::Number(lhs), LoxValue::Number(rhs)) => lhs == rhs,
            (LoxValue::String(lhs), LoxValue::String(rhs)) => lhs == rhs,
            (LoxValue::Nil, LoxValue::Nil) => true,
            (LoxValue::Bool(lhs), LoxValue::Bool(rhs)) => lhs == rhs,
            // Callables and instances compare by identity.
            (LoxValue::NativeFunction(lhs), LoxValue::NativeFunction(rhs)) => {
                std::ptr::addr_eq(Rc::as_ptr(lhs), Rc::as_ptr(rhs))
            }
            (LoxValue::Function(lhs), LoxValue::Function(rhs)) => Rc::ptr_eq(lhs, rhs),
            (LoxValue::Class(lhs), LoxValue::Class(rhs)) => Rc::ptr_eq(lhs, rhs),
            (LoxValue::Instance(lhs), LoxValue::Instance(rhs)) => Rc::ptr_eq(lhs, rhs),
            _ => false,
        }
    }

    pub fn is_not_equal(&self, other: &LoxValue) -> bool {
        !self.is_equal(other)
    }
}

/// A borrowed view of the values that can appear in callee position.
#[derive(Debug, Clone, Copy)]
pub enum Callable<'a> {
    Native(&'a Rc<dyn NativeFunction>),
    Function(&'a Rc<Function>),
    Class(&'a Rc<Class>),
}

impl<'a> Callable<'a> {
    pub fn arity(&self) -> usize {
        match self {
            Callable::Native(native) => native.arity(),
            Callable::Function(function) => function.arity(),
            Callable::Class(class) => class.arity(),
        }
    }

    /// Invokes the callee. Argument count is checked by the caller.
    pub fn call<C: SystemContext>(
        &self,
        interpreter: &mut Interpreter<C>,
        ast: &Ast,
        arguments: Vec<LoxValue>,
        span: Span,
    ) -> Result<LoxValue, RuntimeError> {
        match self {
            Callable::Native(native) => native
                .call(&arguments)
                .map_err(|kind| RuntimeError::new(kind, span)),
            Callable::Function(function) => function.call(interpreter, ast, arguments),
            Callable::Class(class) => Class::call(class, interpreter, ast, arguments),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_nil_and_false_are_falsey() {
        assert!(!LoxValue::Nil.is_truthy());
        assert!(!LoxValue::Bool(false).is_truthy());
        assert!(LoxValue::Bool(true).is_truthy());
        assert!(LoxValue::Number(0.0).is_truthy());
        assert!(LoxValue::String("".into()).is_truthy());
    }

    #[test]
    fn integral_numbers_print_without_fraction() {
        assert_eq!(LoxValue::Number(3.0).to_string(), "3");
        assert_eq!(LoxValue::Number(2.5).to_string(), "2.5");
        assert_eq!(LoxValue::Number(-0.0).to_string(), "-0");
    }

    #[test]
    fn non_finite_numbers_print_like_lox() {
        assert_eq!(LoxValue::Number(f64::INFINITY).to_string(), "Infinity");
        assert_eq!(LoxValue::Number(f64::NEG_INFINITY).to_string(), "-Infinity");
        assert_eq!(LoxValue::Number(f64::NAN).to_string(), "NaN");
    }

    #[test]
    fn mixed_addition_is_rejected() {
        let result = LoxValue::Number(1.0).add(&LoxValue::String("b".into()));
        assert!(matches!(result, Err(RuntimeErrorKind::NonAddable(_, _))));
    }

    #[test]
    fn different_variants_are_never_equal() {
        assert!(!LoxValue::Nil.is_equal(&LoxValue::Bool(false)));
        assert!(!LoxValue::Number(1.0).is_equal(&LoxValue::String("1".into())));
        assert!(LoxValue::Nil.is_equal(&LoxValue::Nil));
    }
}
