//! Quill: runtime construction of object types whose member bodies are
//! compiled after the type's shape is fixed.
//!
//! The engine lives in [`quill_emit`]; [`quill_expr`] supplies a reference
//! expression compiler. [`Session`] pairs the two with a growing symbol
//! environment so that each created type is visible to the bodies of the
//! types created after it.
//!
//! ```
//! use quill::prelude::*;
//!
//! let mut session = Session::new();
//! let mut draft = session.define_type("Greeter", &[]).unwrap();
//! let greet = draft
//!     .define_method(
//!         "Greet",
//!         MemberAttributes::PUBLIC,
//!         Some(DataType::String),
//!         &[DataType::String],
//!         Some(Expr::add(Expr::string("hello, "), Expr::param(1))),
//!     )
//!     .unwrap();
//! let ty = session.create(&mut draft).unwrap();
//!
//! let obj = ty.instantiate(&[]).unwrap();
//! assert_eq!(
//!     greet.invoke(Some(&obj), &[Value::string("quill")]).unwrap(),
//!     Value::string("hello, quill")
//! );
//! ```

pub mod session;

pub use quill_core as core;
pub use quill_emit as emit;
pub use quill_expr as expr;

pub use session::{Draft, Session};

pub mod prelude {
    pub use crate::session::{Draft, Session};
    pub use quill_core::{
        Binding, CompilationError, DataType, EmitError, MemberAttributes, PersistenceError,
        RuntimeError, ShapeError, SymbolEnv, TypeAttributes, TypeRef, Value,
    };
    pub use quill_emit::{AssemblyAccess, ContainerOptions};
    pub use quill_expr::{BinaryOp, Expr, UnaryOp};
}
