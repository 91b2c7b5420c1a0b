//! Core types shared by the quill type construction engine.
//!
//! ## Modules
//!
//! - [`type_hash`]: deterministic identities for types and members
//! - [`data_type`]: static types and their default values
//! - [`value`]: runtime values
//! - [`attributes`]: type and member attribute flags
//! - [`shape`]: delegate shapes expected from compiled bodies
//! - [`symbol_env`]: symbol environments passed to the expression compiler
//! - [`runtime`]: materialized types, instances and member handles
//! - [`error`]: the error taxonomy

pub mod attributes;
pub mod callable;
pub mod compiler;
pub mod data_type;
pub mod error;
pub mod runtime;
pub mod shape;
pub mod symbol_env;
pub mod type_hash;
pub mod value;

pub use attributes::{MemberAttributes, TypeAttributes};
pub use callable::{CompiledBody, Invoker, invoker};
pub use compiler::ExpressionCompiler;
pub use data_type::{DataType, primitives};
pub use error::{
    CompilationError, DelegateShapeMismatchError, EmitError, PersistenceError, RuntimeError,
    ShapeError,
};
pub use runtime::{
    ConstructorHandle, ConstructorInfo, FieldHandle, FieldInfo, FieldStorage, InitState,
    MemberOwner, MethodHandle, MethodInfo, ObjectRef, PropertyHandle, PropertyInfo, RuntimeType,
    ScriptObject, StaticStorage, TypeParts, TypeRef, TypeSlot, check_arguments,
};
pub use shape::DelegateShape;
pub use symbol_env::{Binding, SymbolEnv, THIS};
pub use type_hash::TypeHash;
pub use value::Value;
