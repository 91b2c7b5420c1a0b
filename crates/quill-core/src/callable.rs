//! Type-erased callables backing every runtime member.

use std::fmt;
use std::rc::Rc;

use crate::{DelegateShape, RuntimeError, Value};

/// A callable receiving the full argument list (`this` first for instance members).
///
/// Invokers are shared: the same closure backs a member handle and every
/// materialized type that exposes it.
pub type Invoker = Rc<dyn Fn(&[Value]) -> Result<Value, RuntimeError>>;

/// Wrap a closure as an [`Invoker`].
pub fn invoker<F>(f: F) -> Invoker
where
    F: Fn(&[Value]) -> Result<Value, RuntimeError> + 'static,
{
    Rc::new(f)
}

/// A body produced by the expression-compilation collaborator.
///
/// `shape` is the shape the body actually has; the engine rejects bodies
/// whose shape differs from the one it asked for.
#[derive(Clone)]
pub struct CompiledBody {
    pub shape: DelegateShape,
    pub invoker: Invoker,
}

impl CompiledBody {
    pub fn new<F>(shape: DelegateShape, f: F) -> Self
    where
        F: Fn(&[Value]) -> Result<Value, RuntimeError> + 'static,
    {
        Self {
            shape,
            invoker: Rc::new(f),
        }
    }

    pub fn call(&self, args: &[Value]) -> Result<Value, RuntimeError> {
        (self.invoker)(args)
    }
}

impl fmt::Debug for CompiledBody {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompiledBody")
            .field("shape", &self.shape)
            .finish_non_exhaustive()
    }
}
