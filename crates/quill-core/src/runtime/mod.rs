//! Runtime representation of materialized types.
//!
//! - [`RuntimeType`]: a finalized type and its member tables
//! - [`members`]: field, method, constructor and property handles
//! - [`ScriptObject`]: instances
//! - [`StaticStorage`]: static slots and the lazily-run static initializer

pub mod members;
mod object;
mod runtime_type;
mod statics;

pub use members::{
    ConstructorHandle, ConstructorInfo, FieldHandle, FieldInfo, FieldStorage, MemberOwner,
    MethodHandle, MethodInfo, PropertyHandle, PropertyInfo, check_arguments,
};
pub use object::{ObjectRef, ScriptObject};
pub use runtime_type::{RuntimeType, TypeParts, TypeRef, TypeSlot};
pub use statics::{InitState, StaticStorage};
