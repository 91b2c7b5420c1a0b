//! Constants, parameters, `this` and environment symbols.

use quill_core::{Binding, CompilationError, DataType, RuntimeError, Value, invoker};

use super::{BodyCompiler, Operand, Result, Typed};

pub(super) fn compile_const(value: &Value) -> Typed {
    let data_type = match value {
        Value::Void => DataType::Void,
        Value::Null => DataType::OBJECT,
        Value::Bool(_) => DataType::Bool,
        Value::Char(_) => DataType::Char,
        Value::Int32(_) => DataType::Int32,
        Value::Int64(_) => DataType::Int64,
        Value::Float64(_) => DataType::Float64,
        Value::String(_) => DataType::String,
        Value::Object(obj) => obj.runtime_type().data_type(),
    };
    let is_null = value.is_null();
    let value = value.clone();
    Typed {
        data_type,
        is_null,
        eval: invoker(move |_| Ok(value.clone())),
    }
}

pub(super) fn compile_param(compiler: &BodyCompiler<'_>, index: usize) -> Result<Typed> {
    let params = &compiler.shape().params;
    let data_type = *params.get(index).ok_or(CompilationError::ParameterOutOfRange {
        index,
        arity: params.len(),
    })?;
    let arity = params.len();
    Ok(Typed::new(
        data_type,
        invoker(move |args| {
            args.get(index).cloned().ok_or_else(|| RuntimeError::ArityMismatch {
                member: format!("parameter {index}"),
                expected: arity,
                got: args.len(),
            })
        }),
    ))
}

/// `this` is the first parameter, and only when that parameter has the bound `this` type.
pub(super) fn compile_this(compiler: &BodyCompiler<'_>) -> Result<Typed> {
    let this_type = compiler
        .env()
        .this_type()
        .ok_or(CompilationError::ThisUnavailable)?;
    match compiler.shape().params.first() {
        Some(first) if *first == this_type.data_type() => compile_param(compiler, 0),
        _ => Err(CompilationError::ThisUnavailable),
    }
}

pub(super) fn compile_symbol(compiler: &BodyCompiler<'_>, name: &str) -> Result<Operand> {
    match compiler.env().lookup(name) {
        Some(Binding::Value(value)) => Ok(Operand::Value(compile_const(value))),
        Some(Binding::Type(ty)) => Ok(Operand::Type(ty.clone())),
        None => Err(CompilationError::UndefinedSymbol {
            name: name.to_string(),
        }),
    }
}
