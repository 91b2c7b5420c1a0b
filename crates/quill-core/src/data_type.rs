//! DataType - the static type of a field, parameter or return value.
//!
//! Object types are referenced by [`TypeHash`] rather than by handle, so a
//! member can mention the type that is still being drafted.
//!
//! # Example
//!
//! ```
//! use quill_core::{DataType, Value};
//!
//! assert_eq!(DataType::Int32.default_value(), Value::Int32(0));
//! assert_eq!(DataType::String.default_value(), Value::Null);
//! assert!(DataType::Float64.is_value_type());
//! ```

use std::fmt::{self, Display, Formatter};

use crate::{TypeHash, Value};

/// Primitive type hashes, computed from their script names.
pub mod primitives {
    use crate::TypeHash;

    pub const VOID: TypeHash = TypeHash::from_name_const("void");
    pub const BOOL: TypeHash = TypeHash::from_name_const("bool");
    pub const CHAR: TypeHash = TypeHash::from_name_const("char");
    pub const INT32: TypeHash = TypeHash::from_name_const("int");
    pub const INT64: TypeHash = TypeHash::from_name_const("int64");
    pub const FLOAT64: TypeHash = TypeHash::from_name_const("double");
    pub const STRING: TypeHash = TypeHash::from_name_const("string");
}

/// Static type of a slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DataType {
    /// No value.
    Void,
    Bool,
    Char,
    Int32,
    Int64,
    Float64,
    /// Immutable string (reference type).
    String,
    /// Instance of a runtime type. `Object(TypeHash::OBJECT)` is the universal object type.
    Object(TypeHash),
}

impl DataType {
    /// The universal object type.
    pub const OBJECT: DataType = DataType::Object(TypeHash::OBJECT);

    /// The default value of a slot of this type.
    ///
    /// Integral, boolean and char types are zero, floating point is `0.0`,
    /// reference types are null and `void` has no value.
    pub fn default_value(&self) -> Value {
        match self {
            DataType::Void => Value::Void,
            DataType::Bool => Value::Bool(false),
            DataType::Char => Value::Char('\0'),
            DataType::Int32 => Value::Int32(0),
            DataType::Int64 => Value::Int64(0),
            DataType::Float64 => Value::Float64(0.0),
            DataType::String | DataType::Object(_) => Value::Null,
        }
    }

    /// Value types are copied and can never be null.
    pub fn is_value_type(&self) -> bool {
        matches!(
            self,
            DataType::Bool | DataType::Char | DataType::Int32 | DataType::Int64 | DataType::Float64
        )
    }

    pub fn is_reference_type(&self) -> bool {
        matches!(self, DataType::String | DataType::Object(_))
    }

    pub fn is_void(&self) -> bool {
        matches!(self, DataType::Void)
    }

    pub fn is_numeric(&self) -> bool {
        matches!(self, DataType::Int32 | DataType::Int64 | DataType::Float64)
    }

    /// Hash identifying the type, used in member signature hashes.
    pub fn type_hash(&self) -> TypeHash {
        match self {
            DataType::Void => primitives::VOID,
            DataType::Bool => primitives::BOOL,
            DataType::Char => primitives::CHAR,
            DataType::Int32 => primitives::INT32,
            DataType::Int64 => primitives::INT64,
            DataType::Float64 => primitives::FLOAT64,
            DataType::String => primitives::STRING,
            DataType::Object(hash) => *hash,
        }
    }

    /// Script-facing name of primitive types; object types print their hash.
    pub fn name(&self) -> String {
        match self {
            DataType::Void => "void".to_string(),
            DataType::Bool => "bool".to_string(),
            DataType::Char => "char".to_string(),
            DataType::Int32 => "int".to_string(),
            DataType::Int64 => "int64".to_string(),
            DataType::Float64 => "double".to_string(),
            DataType::String => "string".to_string(),
            DataType::Object(hash) if *hash == TypeHash::OBJECT => "object".to_string(),
            DataType::Object(hash) => format!("object<{hash}>"),
        }
    }
}

impl Display for DataType {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name())
    }
}

/// Collect the type hashes of a parameter list.
pub fn param_hashes(params: &[DataType]) -> Vec<TypeHash> {
    params.iter().map(DataType::type_hash).collect()
}
