//! Runtime values passed to and returned from members.

use std::fmt;
use std::rc::Rc;

use crate::{DataType, ObjectRef, TypeHash};

/// A runtime value.
///
/// Objects have reference semantics: cloning a `Value::Object` clones the
/// handle, and equality is identity.
#[derive(Clone)]
pub enum Value {
    /// Result of a member returning `void`.
    Void,
    /// Null reference.
    Null,
    Bool(bool),
    Char(char),
    Int32(i32),
    Int64(i64),
    Float64(f64),
    String(Rc<str>),
    Object(ObjectRef),
}

impl Value {
    /// Build a string value.
    pub fn string(s: impl AsRef<str>) -> Self {
        Value::String(Rc::from(s.as_ref()))
    }

    /// Human-readable name of the value's dynamic type.
    pub fn type_name(&self) -> String {
        match self {
            Value::Void => "void".to_string(),
            Value::Null => "null".to_string(),
            Value::Bool(_) => "bool".to_string(),
            Value::Char(_) => "char".to_string(),
            Value::Int32(_) => "int".to_string(),
            Value::Int64(_) => "int64".to_string(),
            Value::Float64(_) => "double".to_string(),
            Value::String(_) => "string".to_string(),
            Value::Object(obj) => obj.runtime_type().name().to_string(),
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn is_void(&self) -> bool {
        matches!(self, Value::Void)
    }

    /// Whether this value can be stored in a slot of type `ty`.
    ///
    /// Null fits any reference type. The universal object type accepts every
    /// non-void value. Object values fit their own type, any base type and
    /// any implemented interface.
    pub fn is_assignable_to(&self, ty: &DataType) -> bool {
        match (self, ty) {
            (Value::Void, DataType::Void) => true,
            (Value::Void, _) | (_, DataType::Void) => false,
            (_, DataType::Object(hash)) if *hash == TypeHash::OBJECT => true,
            (Value::Null, other) => other.is_reference_type(),
            (Value::Bool(_), DataType::Bool)
            | (Value::Char(_), DataType::Char)
            | (Value::Int32(_), DataType::Int32)
            | (Value::Int64(_), DataType::Int64)
            | (Value::Float64(_), DataType::Float64)
            | (Value::String(_), DataType::String) => true,
            (Value::Object(obj), DataType::Object(hash)) => obj.runtime_type().derives_from(*hash),
            _ => false,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_i32(&self) -> Option<i32> {
        match self {
            Value::Int32(v) => Some(*v),
            _ => None,
        }
    }

    /// Integral value widened to i64.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Int32(v) => Some(*v as i64),
            Value::Int64(v) => Some(*v),
            _ => None,
        }
    }

    /// Numeric value widened to f64.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Int32(v) => Some(*v as f64),
            Value::Int64(v) => Some(*v as f64),
            Value::Float64(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_object(&self) -> Option<&ObjectRef> {
        match self {
            Value::Object(obj) => Some(obj),
            _ => None,
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Void, Value::Void) | (Value::Null, Value::Null) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Char(a), Value::Char(b)) => a == b,
            (Value::Int32(a), Value::Int32(b)) => a == b,
            (Value::Int64(a), Value::Int64(b)) => a == b,
            (Value::Float64(a), Value::Float64(b)) => a == b,
            (Value::String(a), Value::String(b)) => a == b,
            (Value::Object(a), Value::Object(b)) => Rc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Void => write!(f, "Void"),
            Value::Null => write!(f, "Null"),
            Value::Bool(b) => write!(f, "Bool({b})"),
            Value::Char(c) => write!(f, "Char({c:?})"),
            Value::Int32(v) => write!(f, "Int32({v})"),
            Value::Int64(v) => write!(f, "Int64({v})"),
            Value::Float64(v) => write!(f, "Float64({v})"),
            Value::String(s) => write!(f, "String({s:?})"),
            // Field values are not printed: objects may reference themselves.
            Value::Object(obj) => write!(f, "Object({})", obj.runtime_type().name()),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Void => Ok(()),
            Value::Null => write!(f, "null"),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Char(c) => write!(f, "{c}"),
            Value::Int32(v) => write!(f, "{v}"),
            Value::Int64(v) => write!(f, "{v}"),
            Value::Float64(v) => write!(f, "{v}"),
            Value::String(s) => write!(f, "{s}"),
            Value::Object(obj) => write!(f, "{}", obj.runtime_type().name()),
        }
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<char> for Value {
    fn from(v: char) -> Self {
        Value::Char(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Int32(v)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int64(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float64(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::string(v)
    }
}

impl From<ObjectRef> for Value {
    fn from(v: ObjectRef) -> Self {
        Value::Object(v)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn null_fits_reference_types_only() {
        assert!(Value::Null.is_assignable_to(&DataType::String));
        assert!(Value::Null.is_assignable_to(&DataType::OBJECT));
        assert!(!Value::Null.is_assignable_to(&DataType::Int32));
    }

    #[test]
    fn universal_object_accepts_any_non_void() {
        assert!(Value::Int32(1).is_assignable_to(&DataType::OBJECT));
        assert!(Value::string("x").is_assignable_to(&DataType::OBJECT));
        assert!(!Value::Void.is_assignable_to(&DataType::OBJECT));
    }

    #[test]
    fn primitives_do_not_convert_implicitly() {
        assert!(!Value::Int32(1).is_assignable_to(&DataType::Int64));
        assert!(!Value::Float64(1.0).is_assignable_to(&DataType::Int32));
        assert!(Value::Int64(1).is_assignable_to(&DataType::Int64));
    }

    #[test]
    fn numeric_widening_accessors() {
        assert_eq!(Value::Int32(7).as_i64(), Some(7));
        assert_eq!(Value::Int64(7).as_f64(), Some(7.0));
        assert_eq!(Value::Bool(true).as_i64(), None);
    }

    #[test]
    fn strings_compare_by_content() {
        assert_eq!(Value::string("hello"), Value::from("hello"));
        assert_ne!(Value::string("hello"), Value::Null);
    }
}
