//! Reference expression compiler for quill.
//!
//! ## Modules
//!
//! - [`ast`]: the expression tree accepted as member bodies
//! - [`compiler`]: type checking and lowering to invokers
//!
//! Bodies are compiled against the [`SymbolEnv`](quill_core::SymbolEnv) the
//! engine builds for each pending body. `Param(i)` indexes the full delegate
//! shape, so inside instance members `Param(0)` and `This` are the same
//! value.

pub mod ast;
pub mod compiler;

pub use ast::{BinaryOp, Expr, UnaryOp};
pub use compiler::ExprCompiler;
