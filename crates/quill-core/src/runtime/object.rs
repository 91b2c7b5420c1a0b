//! Instances of runtime types.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use crate::{RuntimeError, TypeRef, Value};

/// Shared handle to an instance.
pub type ObjectRef = Rc<ScriptObject>;

/// An instance of a [`RuntimeType`](crate::RuntimeType).
///
/// Field slots cover the whole inheritance chain, base fields first, and start
/// at their types' default values.
pub struct ScriptObject {
    runtime_type: TypeRef,
    fields: RefCell<Vec<Value>>,
}

impl ScriptObject {
    /// Allocate an instance with every field at its default value.
    ///
    /// This does not run any constructor; use
    /// [`ConstructorInfo::construct`](crate::ConstructorInfo::construct) for that.
    pub fn allocate(runtime_type: TypeRef) -> ObjectRef {
        let fields = runtime_type.field_defaults().to_vec();
        Rc::new(Self {
            runtime_type,
            fields: RefCell::new(fields),
        })
    }

    pub fn runtime_type(&self) -> &TypeRef {
        &self.runtime_type
    }

    pub fn slot_count(&self) -> usize {
        self.fields.borrow().len()
    }

    pub fn read_slot(&self, slot: usize) -> Result<Value, RuntimeError> {
        self.fields
            .borrow()
            .get(slot)
            .cloned()
            .ok_or_else(|| self.bad_slot(slot))
    }

    pub fn write_slot(&self, slot: usize, value: Value) -> Result<(), RuntimeError> {
        let mut fields = self.fields.borrow_mut();
        let target = fields.get_mut(slot).ok_or_else(|| self.bad_slot(slot))?;
        *target = value;
        Ok(())
    }

    fn bad_slot(&self, slot: usize) -> RuntimeError {
        RuntimeError::Custom {
            message: format!(
                "field slot {slot} out of range for instance of '{}'",
                self.runtime_type.name()
            ),
        }
    }
}

impl fmt::Debug for ScriptObject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScriptObject")
            .field("type", &self.runtime_type.name())
            .field("slots", &self.slot_count())
            .finish()
    }
}
