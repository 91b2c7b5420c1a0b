//! A minimal expression compiler for engine tests.

use std::cell::RefCell;
use std::rc::Rc;

use quill_core::{
    CompilationError, CompiledBody, DataType, DelegateShape, ExpressionCompiler, SymbolEnv, Value,
};

use crate::{AssemblyContainer, ContainerOptions};

pub type Log = Rc<RefCell<Vec<&'static str>>>;

pub enum TestExpr {
    Const(Value),
    /// Reads a field of `this`.
    ThisField(&'static str),
    /// Returns the last argument.
    LastArg,
    /// Appends a label to a log, then returns the value.
    Record(Log, &'static str, Value),
    Undefined(&'static str),
    /// Compiles to a body with the wrong return type.
    WrongReturn(DataType),
}

pub struct TestCompiler;

impl ExpressionCompiler for TestCompiler {
    type Expr = TestExpr;

    fn compile(
        &self,
        expr: &TestExpr,
        env: &SymbolEnv,
        shape: &DelegateShape,
    ) -> Result<CompiledBody, CompilationError> {
        let shape = shape.clone();
        match expr {
            TestExpr::Const(value) => {
                let value = value.clone();
                Ok(CompiledBody::new(shape, move |_| Ok(value.clone())))
            }
            TestExpr::ThisField(name) => {
                let ty = env.this_type().ok_or(CompilationError::ThisUnavailable)?;
                let field = ty.find_field(name).ok_or_else(|| CompilationError::UnknownMember {
                    type_name: ty.name().to_string(),
                    member: name.to_string(),
                })?;
                Ok(CompiledBody::new(shape, move |args| {
                    field.get(args.first().and_then(Value::as_object))
                }))
            }
            TestExpr::LastArg => Ok(CompiledBody::new(shape, |args| {
                Ok(args.last().cloned().unwrap_or(Value::Void))
            })),
            TestExpr::Record(log, label, value) => {
                let (log, label, value) = (Rc::clone(log), *label, value.clone());
                Ok(CompiledBody::new(shape, move |_| {
                    log.borrow_mut().push(label);
                    Ok(value.clone())
                }))
            }
            TestExpr::Undefined(name) => Err(CompilationError::UndefinedSymbol {
                name: name.to_string(),
            }),
            TestExpr::WrongReturn(ty) => {
                let wrong = DelegateShape::new(shape.params.clone(), *ty);
                Ok(CompiledBody::new(wrong, |_| Ok(Value::Void)))
            }
        }
    }
}

pub fn container() -> AssemblyContainer<TestCompiler> {
    AssemblyContainer::new(TestCompiler, ContainerOptions::default())
}

pub fn log() -> Log {
    Rc::new(RefCell::new(Vec::new()))
}
