mod native;

use crate::value::{error::RuntimeErrorKind, LoxValue, NativeFunction};
use compact_str::CompactString;
use native::NativeClock;
use std::{cell::RefCell, collections::HashMap, rc::Rc};

/// Handle to a scope frame. Clones share the frame, so a write through one
/// handle is seen through every other handle and every closure holding it.
#[derive(Clone)]
pub struct SharedEnvironment {
    inner: Rc<RefCell<Environment>>,
}

struct Environment {
    values: HashMap<CompactString, LoxValue>,
    parent: Option<SharedEnvironment>,
}

impl SharedEnvironment {
    /// An empty root frame.
    pub fn new() -> Self {
        Self {
            inner: Rc::new(RefCell::new(Environment {
                values: HashMap::new(),
                parent: None,
            })),
        }
    }

    /// A root frame holding the native functions.
    pub fn globals() -> Self {
        let globals = Self::new();
        let natives: [Rc<dyn NativeFunction>; 1] = [Rc::new(NativeClock)];
        for native in natives {
            globals.define(native.name(), LoxValue::NativeFunction(native));
        }
        globals
    }

    pub fn new_scope(&self) -> Self {
        Self {
            inner: Rc::new(RefCell::new(Environment {
                values: HashMap::new(),
                parent: Some(self.clone()),
            })),
        }
    }

    /// Binds `name` in this frame, replacing any earlier binding here.
    pub fn define(&self, name: &str, value: LoxValue) {
        self.inner.borrow_mut().values.insert(name.into(), value);
    }

    /// Looks `name` up in this frame, then in each enclosing frame.
    pub fn get(&self, name: &str) -> Result<LoxValue, RuntimeErrorKind> {
        let mut current = self.clone();
        loop {
            let parent = {
                let frame = current.inner.borrow();
                if let Some(value) = frame.values.get(name) {
                    return Ok(value.clone());
                }
                frame.parent.clone()
            };
            match parent {
                Some(parent) => current = parent,
                None => return Err(RuntimeErrorKind::UndefinedVariable(name.into())),
            }
        }
    }

    /// Reads `name` from exactly `distance` frames out, without searching further.
    pub fn get_at(&self, distance: usize, name: &str) -> Result<LoxValue, RuntimeErrorKind> {
        let frame = self
            .ancestor(distance)
            .ok_or_else(|| RuntimeErrorKind::UndefinedVariable(name.into()))?;
        let value = frame.inner.borrow().values.get(name).cloned();
        value.ok_or_else(|| RuntimeErrorKind::UndefinedVariable(name.into()))
    }

    /// Overwrites the nearest existing binding of `name`.
    pub fn assign(&self, name: &str, value: LoxValue) -> Result<(), RuntimeErrorKind> {
        let mut current = self.clone();
        loop {
            let parent = {
                let mut frame = current.inner.borrow_mut();
                if let Some(slot) = frame.values.get_mut(name) {
                    *slot = value;
                    return Ok(());
                }
                frame.parent.clone()
            };
            match parent {
                Some(parent) => current = parent,
                None => return Err(RuntimeErrorKind::UndefinedVariable(name.into())),
            }
        }
    }

    pub fn assign_at(
        &self,
        distance: usize,
        name: &str,
        value: LoxValue,
    ) -> Result<(), RuntimeErrorKind> {
        let frame = self
            .ancestor(distance)
            .ok_or_else(|| RuntimeErrorKind::UndefinedVariable(name.into()))?;
        let mut frame = frame.inner.borrow_mut();
        match frame.values.get_mut(name) {
            Some(slot) => {
                *slot = value;
                Ok(())
            }
            None => Err(RuntimeErrorKind::UndefinedVariable(name.into())),
        }
    }

    /// The frame `distance` parent links away. Zero is this frame.
    pub fn ancestor(&self, distance: usize) -> Option<SharedEnvironment> {
        let mut current = self.clone();
        for _ in 0..distance {
            let parent = current.inner.borrow().parent.clone()?;
            current = parent;
        }
        Some(current)
    }

    pub fn is_same_frame(&self, other: &SharedEnvironment) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }
}

impl Default for SharedEnvironment {
    fn default() -> Self {
        Self::new()
    }
}

// Closures stored in a frame point back at it, so only names are printed.
impl std::fmt::Debug for SharedEnvironment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let frame = self.inner.borrow();
        f.debug_struct("SharedEnvironment")
            .field("names", &frame.values.keys().collect::<Vec<_>>())
            .field("has_parent", &frame.parent.is_some())
            .finish()
    }
}
