//! Implicit conversions between static types.

use quill_core::{DataType, Value, invoker};

use super::{BodyCompiler, Typed};

pub(crate) enum Conversion {
    Identity,
    /// Numeric widening: int to int64, int or int64 to double.
    Widen,
    NullToReference,
}

impl Conversion {
    pub fn apply(self, typed: Typed, to: DataType) -> Typed {
        match self {
            Conversion::Identity | Conversion::NullToReference => Typed::new(to, typed.eval),
            Conversion::Widen => {
                let eval = typed.eval;
                Typed::new(to, invoker(move |args| Ok(widen(eval(args)?, to))))
            }
        }
    }
}

/// Find the implicit conversion from `from` to `to`, if any.
pub(crate) fn find_conversion(
    compiler: &BodyCompiler<'_>,
    from: &Typed,
    to: &DataType,
) -> Option<Conversion> {
    if from.is_null {
        return to.is_reference_type().then_some(Conversion::NullToReference);
    }
    let source = from.data_type;
    if source == *to {
        return Some(Conversion::Identity);
    }
    if *to == DataType::OBJECT && !source.is_void() {
        return Some(Conversion::Identity);
    }
    match (source, *to) {
        (DataType::Int32, DataType::Int64)
        | (DataType::Int32, DataType::Float64)
        | (DataType::Int64, DataType::Float64) => Some(Conversion::Widen),
        (DataType::Object(derived), DataType::Object(base)) => compiler
            .env()
            .find_type(derived)
            .is_some_and(|ty| ty.derives_from(base))
            .then_some(Conversion::Identity),
        _ => None,
    }
}

/// Widen a numeric value to `to`. Other values pass through.
pub(crate) fn widen(value: Value, to: DataType) -> Value {
    match (value, to) {
        (Value::Int32(v), DataType::Int64) => Value::Int64(i64::from(v)),
        (Value::Int32(v), DataType::Float64) => Value::Float64(f64::from(v)),
        (Value::Int64(v), DataType::Float64) => Value::Float64(v as f64),
        (value, _) => value,
    }
}

fn numeric_rank(ty: DataType) -> Option<u8> {
    match ty {
        DataType::Int32 => Some(0),
        DataType::Int64 => Some(1),
        DataType::Float64 => Some(2),
        _ => None,
    }
}

/// The wider of two numeric types.
pub(crate) fn promote(a: DataType, b: DataType) -> Option<DataType> {
    let (ra, rb) = (numeric_rank(a)?, numeric_rank(b)?);
    Some(if ra >= rb { a } else { b })
}

/// A type both branches of a conditional convert to.
pub(crate) fn unify(compiler: &BodyCompiler<'_>, a: &Typed, b: &Typed) -> Option<DataType> {
    match (a.is_null, b.is_null) {
        (true, true) => return Some(DataType::OBJECT),
        (true, false) => return b.data_type.is_reference_type().then_some(b.data_type),
        (false, true) => return a.data_type.is_reference_type().then_some(a.data_type),
        (false, false) => {}
    }
    if a.data_type == b.data_type {
        return Some(a.data_type);
    }
    if let Some(ty) = promote(a.data_type, b.data_type) {
        return Some(ty);
    }
    if find_conversion(compiler, a, &b.data_type).is_some() {
        return Some(b.data_type);
    }
    if find_conversion(compiler, b, &a.data_type).is_some() {
        return Some(a.data_type);
    }
    (a.data_type.is_reference_type() && b.data_type.is_reference_type()).then_some(DataType::OBJECT)
}
