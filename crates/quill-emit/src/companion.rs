//! The hidden companion type holding implementation methods.
//!
//! Every member defined with a body gets a private implementation slot here.
//! Public members only ever call into a slot through a trampoline, so the real
//! body can be installed after the public type has been materialized.

use std::fmt;
use std::rc::Rc;

use once_cell::unsync::OnceCell;
use quill_core::{DelegateShape, Invoker, RuntimeError, Value};

/// One implementation method: a name, its expected shape and, once
/// compiled, its body.
pub struct ImplSlot {
    name: String,
    shape: DelegateShape,
    body: OnceCell<Invoker>,
}

impl ImplSlot {
    fn new(name: String, shape: DelegateShape) -> Rc<Self> {
        Rc::new(Self {
            name,
            shape,
            body: OnceCell::new(),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn shape(&self) -> &DelegateShape {
        &self.shape
    }

    pub fn is_compiled(&self) -> bool {
        self.body.get().is_some()
    }

    /// Install the compiled body. Returns `false` if one was already installed.
    pub(crate) fn install(&self, body: Invoker) -> bool {
        self.body.set(body).is_ok()
    }

    /// Run the body with the full argument list.
    pub fn call(&self, args: &[Value]) -> Result<Value, RuntimeError> {
        let body = self.body.get().ok_or_else(|| RuntimeError::BodyNotCompiled {
            member: self.name.clone(),
        })?;
        body(args)
    }
}

impl fmt::Debug for ImplSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ImplSlot")
            .field("name", &self.name)
            .field("shape", &self.shape)
            .field("compiled", &self.is_compiled())
            .finish()
    }
}

/// Nested implementation type of one draft. Never exposed on the runtime type.
#[derive(Debug)]
pub struct CompanionType {
    name: String,
    methods: Vec<Rc<ImplSlot>>,
    sealed: bool,
}

impl CompanionType {
    pub(crate) fn new(owner: &str) -> Self {
        Self {
            name: format!("<{owner}>Impl"),
            methods: Vec::new(),
            sealed: false,
        }
    }

    /// Add an implementation method for `member`.
    pub(crate) fn define_method(&mut self, member: &str, shape: DelegateShape) -> Rc<ImplSlot> {
        debug_assert!(!self.sealed, "companion type is sealed");
        let slot = ImplSlot::new(format!("<{member}>b__{}", self.methods.len()), shape);
        self.methods.push(Rc::clone(&slot));
        slot
    }

    pub(crate) fn seal(&mut self) {
        self.sealed = true;
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_sealed(&self) -> bool {
        self.sealed
    }

    pub fn methods(&self) -> &[Rc<ImplSlot>] {
        &self.methods
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quill_core::{DataType, invoker};

    #[test]
    fn slots_get_unique_hidden_names() {
        let mut companion = CompanionType::new("T");
        let a = companion.define_method("M", DelegateShape::new(vec![], DataType::Void));
        let b = companion.define_method("M", DelegateShape::new(vec![], DataType::Void));
        assert_eq!(companion.name(), "<T>Impl");
        assert_eq!(a.name(), "<M>b__0");
        assert_eq!(b.name(), "<M>b__1");
        assert_eq!(companion.methods().len(), 2);
    }

    #[test]
    fn uncompiled_slot_reports_missing_body() {
        let mut companion = CompanionType::new("T");
        let slot = companion.define_method("M", DelegateShape::new(vec![], DataType::Int32));
        assert!(matches!(
            slot.call(&[]).unwrap_err(),
            RuntimeError::BodyNotCompiled { .. }
        ));
    }

    #[test]
    fn body_installs_once() {
        let mut companion = CompanionType::new("T");
        let slot = companion.define_method("M", DelegateShape::new(vec![], DataType::Int32));
        assert!(slot.install(invoker(|_| Ok(Value::Int32(1)))));
        assert!(!slot.install(invoker(|_| Ok(Value::Int32(2)))));
        assert_eq!(slot.call(&[]).unwrap(), Value::Int32(1));
        assert!(slot.is_compiled());
    }
}
