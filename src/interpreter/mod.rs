pub mod context;
mod tree;

use crate::value::LoxValue;
pub use tree::{Interpreter, MAX_CALL_DEPTH};

/// How a statement finished. `Return` unwinds enclosing statements up to the
/// nearest function call.
#[derive(Debug, Clone)]
pub enum ControlFlow {
    Normal,
    Return(LoxValue),
}

/// Where the interpreter sends what the program prints and what the driver reports.
pub trait SystemContext {
    fn writeln(&mut self, text: &str);
    fn ewriteln(&mut self, text: &str);
}
