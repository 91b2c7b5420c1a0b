//! Binary operators.

use std::cmp::Ordering;

use quill_core::{CompilationError, DataType, RuntimeError, Value, invoker};

use super::conversion::{promote, unify};
use super::{BodyCompiler, Result, Typed};
use crate::ast::{BinaryOp, Expr};

pub(super) fn compile_binary(
    compiler: &BodyCompiler<'_>,
    op: BinaryOp,
    lhs: &Expr,
    rhs: &Expr,
) -> Result<Typed> {
    match op {
        BinaryOp::And | BinaryOp::Or => compile_logical(compiler, op, lhs, rhs),
        _ => {
            let lhs = compiler.infer_value(lhs)?;
            let rhs = compiler.infer_value(rhs)?;
            if lhs.data_type.is_void() || rhs.data_type.is_void() {
                return Err(mismatch(compiler, op, &lhs, &rhs));
            }
            if op == BinaryOp::Add && (is_string(&lhs) || is_string(&rhs)) {
                return Ok(compile_concat(lhs, rhs));
            }
            if op.is_arithmetic() {
                compile_arithmetic(compiler, op, lhs, rhs)
            } else if op.is_ordering() {
                compile_ordering(compiler, op, lhs, rhs)
            } else {
                compile_equality(compiler, op, lhs, rhs)
            }
        }
    }
}

fn is_string(typed: &Typed) -> bool {
    !typed.is_null && typed.data_type == DataType::String
}

fn mismatch(compiler: &BodyCompiler<'_>, op: BinaryOp, lhs: &Typed, rhs: &Typed) -> CompilationError {
    CompilationError::InvalidOperation {
        message: format!(
            "operator '{}' cannot be applied to '{}' and '{}'",
            op.symbol(),
            compiler.describe(lhs),
            compiler.describe(rhs)
        ),
    }
}

/// `&&` and `||` evaluate the right operand only when needed.
fn compile_logical(compiler: &BodyCompiler<'_>, op: BinaryOp, lhs: &Expr, rhs: &Expr) -> Result<Typed> {
    let context = format!("operand of '{}'", op.symbol());
    let lhs = compiler.check(lhs, &DataType::Bool, &context)?;
    let rhs = compiler.check(rhs, &DataType::Bool, &context)?;
    let short_circuit = op == BinaryOp::Or;
    Ok(Typed::new(
        DataType::Bool,
        invoker(move |frame| {
            if lhs.evaluate(frame)?.as_bool() == Some(short_circuit) {
                return Ok(Value::Bool(short_circuit));
            }
            rhs.evaluate(frame)
        }),
    ))
}

fn compile_concat(lhs: Typed, rhs: Typed) -> Typed {
    Typed::new(
        DataType::String,
        invoker(move |frame| {
            let left = lhs.evaluate(frame)?;
            let right = rhs.evaluate(frame)?;
            Ok(Value::string(format!("{left}{right}")))
        }),
    )
}

fn compile_arithmetic(compiler: &BodyCompiler<'_>, op: BinaryOp, lhs: Typed, rhs: Typed) -> Result<Typed> {
    let result_type = promote(lhs.data_type, rhs.data_type)
        .filter(|_| !lhs.is_null && !rhs.is_null)
        .ok_or_else(|| mismatch(compiler, op, &lhs, &rhs))?;
    let context = format!("operand of '{}'", op.symbol());
    let lhs = compiler.coerce(lhs, &result_type, &context)?;
    let rhs = compiler.coerce(rhs, &result_type, &context)?;
    Ok(Typed::new(
        result_type,
        invoker(move |frame| arithmetic(op, lhs.evaluate(frame)?, rhs.evaluate(frame)?)),
    ))
}

/// Integer arithmetic wraps on overflow.
fn arithmetic(op: BinaryOp, lhs: Value, rhs: Value) -> std::result::Result<Value, RuntimeError> {
    match (lhs, rhs) {
        (Value::Int32(a), Value::Int32(b)) => Ok(Value::Int32(match op {
            BinaryOp::Add => a.wrapping_add(b),
            BinaryOp::Sub => a.wrapping_sub(b),
            BinaryOp::Mul => a.wrapping_mul(b),
            BinaryOp::Div if b == 0 => return Err(RuntimeError::DivisionByZero),
            BinaryOp::Div => a.wrapping_div(b),
            BinaryOp::Rem if b == 0 => return Err(RuntimeError::DivisionByZero),
            BinaryOp::Rem => a.wrapping_rem(b),
            _ => return Err(unsupported(op)),
        })),
        (Value::Int64(a), Value::Int64(b)) => Ok(Value::Int64(match op {
            BinaryOp::Add => a.wrapping_add(b),
            BinaryOp::Sub => a.wrapping_sub(b),
            BinaryOp::Mul => a.wrapping_mul(b),
            BinaryOp::Div if b == 0 => return Err(RuntimeError::DivisionByZero),
            BinaryOp::Div => a.wrapping_div(b),
            BinaryOp::Rem if b == 0 => return Err(RuntimeError::DivisionByZero),
            BinaryOp::Rem => a.wrapping_rem(b),
            _ => return Err(unsupported(op)),
        })),
        (Value::Float64(a), Value::Float64(b)) => Ok(Value::Float64(match op {
            BinaryOp::Add => a + b,
            BinaryOp::Sub => a - b,
            BinaryOp::Mul => a * b,
            BinaryOp::Div => a / b,
            BinaryOp::Rem => a % b,
            _ => return Err(unsupported(op)),
        })),
        (lhs, rhs) => Err(RuntimeError::Custom {
            message: format!(
                "operator '{}' received {} and {}",
                op.symbol(),
                lhs.type_name(),
                rhs.type_name()
            ),
        }),
    }
}

fn unsupported(op: BinaryOp) -> RuntimeError {
    RuntimeError::Custom {
        message: format!("operator '{}' is not arithmetic", op.symbol()),
    }
}

fn compile_ordering(compiler: &BodyCompiler<'_>, op: BinaryOp, lhs: Typed, rhs: Typed) -> Result<Typed> {
    if lhs.is_null || rhs.is_null {
        return Err(mismatch(compiler, op, &lhs, &rhs));
    }
    let operand_type = match (lhs.data_type, rhs.data_type) {
        (DataType::String, DataType::String) => DataType::String,
        (DataType::Char, DataType::Char) => DataType::Char,
        (a, b) => promote(a, b).ok_or_else(|| mismatch(compiler, op, &lhs, &rhs))?,
    };
    let context = format!("operand of '{}'", op.symbol());
    let lhs = compiler.coerce(lhs, &operand_type, &context)?;
    let rhs = compiler.coerce(rhs, &operand_type, &context)?;
    Ok(Typed::new(
        DataType::Bool,
        invoker(move |frame| {
            let ordering = compare(&lhs.evaluate(frame)?, &rhs.evaluate(frame)?);
            let holds = ordering.is_some_and(|ordering| match op {
                BinaryOp::Less => ordering == Ordering::Less,
                BinaryOp::LessEqual => ordering != Ordering::Greater,
                BinaryOp::Greater => ordering == Ordering::Greater,
                _ => ordering != Ordering::Less,
            });
            Ok(Value::Bool(holds))
        }),
    ))
}

/// `None` for unordered values such as NaN.
fn compare(lhs: &Value, rhs: &Value) -> Option<Ordering> {
    match (lhs, rhs) {
        (Value::Int32(a), Value::Int32(b)) => Some(a.cmp(b)),
        (Value::Int64(a), Value::Int64(b)) => Some(a.cmp(b)),
        (Value::Float64(a), Value::Float64(b)) => a.partial_cmp(b),
        (Value::String(a), Value::String(b)) => Some(a.cmp(b)),
        (Value::Char(a), Value::Char(b)) => Some(a.cmp(b)),
        _ => None,
    }
}

fn compile_equality(compiler: &BodyCompiler<'_>, op: BinaryOp, lhs: Typed, rhs: Typed) -> Result<Typed> {
    let operand_type = unify(compiler, &lhs, &rhs).ok_or_else(|| mismatch(compiler, op, &lhs, &rhs))?;
    let context = format!("operand of '{}'", op.symbol());
    let lhs = compiler.coerce(lhs, &operand_type, &context)?;
    let rhs = compiler.coerce(rhs, &operand_type, &context)?;
    let expect_equal = op == BinaryOp::Equal;
    Ok(Typed::new(
        DataType::Bool,
        invoker(move |frame| {
            let equal = lhs.evaluate(frame)? == rhs.evaluate(frame)?;
            Ok(Value::Bool(equal == expect_equal))
        }),
    ))
}
