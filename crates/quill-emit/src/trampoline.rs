//! Invokers installed on public members.
//!
//! A public member never holds its compiled body directly. It holds one of
//! these forwarding closures, which reach the body through an [`ImplSlot`]
//! filled in when the owning type is created.

use std::rc::Rc;

use quill_core::{
    ConstructorHandle, DataType, FieldHandle, Invoker, ObjectRef, RuntimeError, Value, invoker,
};

use crate::companion::ImplSlot;
use crate::routine::InitializerRoutine;

/// Forward the full argument list, `this` included, to an implementation slot.
pub fn forward(target: Rc<ImplSlot>) -> Invoker {
    invoker(move |args| target.call(args))
}

/// Body of a method defined without an expression: returns the default of its return type.
pub fn default_stub(return_type: DataType) -> Invoker {
    invoker(move |_| Ok(return_type.default_value()))
}

/// Getter of an auto-implemented property.
pub fn field_getter(field: FieldHandle) -> Invoker {
    invoker(move |args| {
        if field.is_static() {
            return field.get(None);
        }
        let this = receiver(&field, args)?;
        field.get(Some(this))
    })
}

/// Setter of an auto-implemented property. The value is the last argument.
pub fn field_setter(field: FieldHandle) -> Invoker {
    invoker(move |args| {
        let value = args.last().cloned().unwrap_or(Value::Void);
        if field.is_static() {
            field.set(None, value)?;
        } else {
            let this = receiver(&field, args)?;
            field.set(Some(this), value)?;
        }
        Ok(Value::Void)
    })
}

/// Constructor initialization: base constructor, then the instance prologue,
/// then the body, all on the instance in `args[0]`.
pub fn constructor(
    base: Option<ConstructorHandle>,
    prologue: Rc<InitializerRoutine>,
    body: Option<Rc<ImplSlot>>,
) -> Invoker {
    invoker(move |args| {
        let this = match args.first() {
            Some(Value::Object(obj)) => obj,
            _ => {
                return Err(RuntimeError::NullThis {
                    member: ".ctor".to_string(),
                });
            }
        };
        if let Some(base) = &base {
            base.initialize(this, &[])?;
        }
        prologue.run(Some(this))?;
        if let Some(body) = &body {
            body.call(args)?;
        }
        Ok(Value::Void)
    })
}

/// The static initializer: runs the closed routine with no instance.
pub fn static_initializer(routine: Rc<InitializerRoutine>) -> Invoker {
    invoker(move |_| {
        routine.run(None)?;
        Ok(Value::Void)
    })
}

fn receiver<'a>(field: &FieldHandle, args: &'a [Value]) -> Result<&'a ObjectRef, RuntimeError> {
    match args.first() {
        Some(value) => field.owner.expect_instance(&field.name, value),
        None => Err(RuntimeError::NullThis {
            member: field.name.clone(),
        }),
    }
}
