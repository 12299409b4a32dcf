use crate::value::{error::RuntimeErrorKind, LoxValue, NativeFunction};
use std::time::{SystemTime, UNIX_EPOCH};

/// `clock()`: seconds since the Unix epoch.
#[derive(Debug)]
pub struct NativeClock;

impl NativeFunction for NativeClock {
    fn name(&self) -> &'static str {
        "clock"
    }

    fn arity(&self) -> usize {
        0
    }

    fn call(&self, _arguments: &[LoxValue]) -> Result<LoxValue, RuntimeErrorKind> {
        let elapsed = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map_err(|error| RuntimeErrorKind::NativeFailure {
                name: self.name(),
                reason: error.to_string().into(),
            })?;
        Ok(LoxValue::Number(elapsed.as_secs_f64()))
    }
}
