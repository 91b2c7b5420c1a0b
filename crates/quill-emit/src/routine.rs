//! Field initializer routines: the instance prologue and the static initializer.
//!
//! Both are ordered lists of `(field, implementation slot)` steps. The prologue
//! runs on every construction after the base constructor and before the
//! constructor body; the static initializer runs once per type.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use quill_core::{FieldHandle, ObjectRef, RuntimeError, Value};

use crate::companion::ImplSlot;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoutineKind {
    Prologue,
    StaticInitializer,
}

#[derive(Debug)]
struct InitStep {
    field: FieldHandle,
    init: Rc<ImplSlot>,
}

/// An initializer routine under construction, closed when its type is created.
#[derive(Debug)]
pub struct InitializerRoutine {
    kind: RoutineKind,
    steps: RefCell<Vec<InitStep>>,
    closed: Cell<bool>,
}

impl InitializerRoutine {
    pub(crate) fn new(kind: RoutineKind) -> Rc<Self> {
        Rc::new(Self {
            kind,
            steps: RefCell::new(Vec::new()),
            closed: Cell::new(false),
        })
    }

    pub fn kind(&self) -> RoutineKind {
        self.kind
    }

    /// Append a call to `init` whose result is stored into `field`.
    pub(crate) fn push(&self, field: FieldHandle, init: Rc<ImplSlot>) {
        debug_assert!(!self.closed.get(), "initializer routine is closed");
        self.steps.borrow_mut().push(InitStep { field, init });
    }

    pub(crate) fn close(&self) {
        self.closed.set(true);
    }

    pub fn is_closed(&self) -> bool {
        self.closed.get()
    }

    pub fn len(&self) -> usize {
        self.steps.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Run every step in definition order. `this` is `None` for the static initializer.
    pub fn run(&self, this: Option<&ObjectRef>) -> Result<(), RuntimeError> {
        let args: Vec<Value> = this.map(|obj| Value::Object(Rc::clone(obj))).into_iter().collect();
        let steps = self.steps.borrow();
        for step in steps.iter() {
            let value = step.init.call(&args)?;
            step.field.set(this, value)?;
        }
        Ok(())
    }
}
