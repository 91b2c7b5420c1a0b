//! Unary operators.

use quill_core::{CompilationError, DataType, RuntimeError, Value, invoker};

use super::{BodyCompiler, Result, Typed};
use crate::ast::{Expr, UnaryOp};

pub(super) fn compile_unary(compiler: &BodyCompiler<'_>, op: UnaryOp, operand: &Expr) -> Result<Typed> {
    match op {
        UnaryOp::Not => {
            let operand = compiler.check(operand, &DataType::Bool, "operand of '!'")?;
            Ok(Typed::new(
                DataType::Bool,
                invoker(move |frame| match operand.evaluate(frame)? {
                    Value::Bool(b) => Ok(Value::Bool(!b)),
                    other => Err(operand_error("!", &other)),
                }),
            ))
        }
        UnaryOp::Neg => {
            let operand = compiler.infer_value(operand)?;
            if operand.is_null || !operand.data_type.is_numeric() {
                return Err(CompilationError::InvalidOperation {
                    message: format!("operator '-' cannot be applied to '{}'", compiler.describe(&operand)),
                });
            }
            Ok(Typed::new(
                operand.data_type,
                invoker(move |frame| match operand.evaluate(frame)? {
                    Value::Int32(v) => Ok(Value::Int32(v.wrapping_neg())),
                    Value::Int64(v) => Ok(Value::Int64(v.wrapping_neg())),
                    Value::Float64(v) => Ok(Value::Float64(-v)),
                    other => Err(operand_error("-", &other)),
                }),
            ))
        }
    }
}

fn operand_error(symbol: &str, value: &Value) -> RuntimeError {
    RuntimeError::Custom {
        message: format!("operator '{symbol}' received {}", value.type_name()),
    }
}
