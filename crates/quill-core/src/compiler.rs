//! The expression-compilation collaborator interface.

use crate::{CompilationError, CompiledBody, DelegateShape, SymbolEnv};

/// Compiles raw body expressions of the embedded language into callables.
///
/// The engine treats `Expr` as opaque. It supplies the shape the body must
/// have and an environment in which `this` is bound to the type being created.
/// The returned [`CompiledBody::shape`] must equal `shape`; the engine rejects
/// the body otherwise.
pub trait ExpressionCompiler {
    /// Raw, unreduced body expression.
    type Expr;

    fn compile(
        &self,
        expr: &Self::Expr,
        env: &SymbolEnv,
        shape: &DelegateShape,
    ) -> Result<CompiledBody, CompilationError>;
}
