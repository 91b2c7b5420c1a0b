//! Error types for type construction and invocation.
//!
//! ## Error Hierarchy
//!
//! ```text
//! EmitError (top-level wrapper)
//! ├── ShapeError                  - invalid member or type definition
//! ├── Compilation                 - a pending body failed to compile
//! ├── DelegateShapeMismatchError  - a compiled body has the wrong shape
//! ├── PersistenceError            - saving the assembly failed
//! └── RuntimeError                - invoking a member failed
//! ```
//!
//! Every error is fatal to the call that raised it. A draft whose `create`
//! failed must be discarded.

use thiserror::Error;

use crate::{DataType, DelegateShape};

// ============================================================================
// Shape Errors
// ============================================================================

/// Invalid type or member definition, raised at the `define_*` call site.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ShapeError {
    /// The name is not a valid identifier.
    #[error("invalid name '{name}': {reason}")]
    InvalidName { name: String, reason: String },

    /// A member with a colliding name or signature already exists.
    #[error("type '{type_name}' already defines a member '{name}'")]
    DuplicateMember { type_name: String, name: String },

    /// A type with the same name already exists in the module.
    #[error("duplicate type: {0}")]
    DuplicateType(String),

    /// Attribute flags that cannot be combined.
    #[error("'{member}': conflicting attributes: {detail}")]
    ConflictingAttributes { member: String, detail: String },

    /// A declared type that is not allowed in this position.
    #[error("'{member}': invalid type: {detail}")]
    InvalidType { member: String, detail: String },

    /// Interfaces only declare bodiless instance methods.
    #[error("interface '{type_name}' cannot declare {member}")]
    NotAllowedOnInterface { type_name: String, member: String },

    /// Abstract member declared on a type that can be instantiated.
    #[error("abstract member '{member}' declared on non-abstract type '{type_name}'")]
    AbstractMemberOnConcreteType { type_name: String, member: String },

    /// The base type list is malformed.
    #[error("type '{type_name}': invalid base: {detail}")]
    InvalidBase { type_name: String, detail: String },

    /// An implemented interface method has no public instance implementation.
    #[error("type '{type_name}' does not implement '{interface}.{method}'")]
    MissingInterfaceMethod {
        type_name: String,
        interface: String,
        method: String,
    },

    /// `define_*` called after the type was created.
    #[error("type '{type_name}' has already been created")]
    AlreadyCreated { type_name: String },

    /// The draft's `create` failed earlier; the draft is unusable.
    #[error("type '{type_name}' failed to create and must be discarded")]
    DraftFailed { type_name: String },
}

// ============================================================================
// Compilation Errors
// ============================================================================

/// Failure of the expression-compilation collaborator.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CompilationError {
    #[error("undefined symbol '{name}'")]
    UndefinedSymbol { name: String },

    #[error("unknown member '{member}' on type '{type_name}'")]
    UnknownMember { type_name: String, member: String },

    #[error("type mismatch in {context}: expected {expected}, found {found}")]
    TypeMismatch {
        context: String,
        expected: String,
        found: String,
    },

    #[error("'{name}' expects {expected} argument(s), got {got}")]
    ArityMismatch {
        name: String,
        expected: usize,
        got: usize,
    },

    #[error("parameter index {index} is out of range for {arity} parameter(s)")]
    ParameterOutOfRange { index: usize, arity: usize },

    #[error("'this' is not available in a static context")]
    ThisUnavailable,

    #[error("{message}")]
    InvalidOperation { message: String },
}

// ============================================================================
// Delegate Shape Mismatch
// ============================================================================

/// A compiled body whose shape differs from the one computed at definition time.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("body of '{member}' compiled to {actual}, expected {expected}")]
pub struct DelegateShapeMismatchError {
    pub member: String,
    pub expected: DelegateShape,
    pub actual: DelegateShape,
}

// ============================================================================
// Persistence Errors
// ============================================================================

/// Failure to persist the assembly.
#[derive(Debug, Error)]
pub enum PersistenceError {
    /// The container runs in a context that forbids disk writes.
    #[error("assembly '{assembly}' was opened run-only; saving is forbidden")]
    Forbidden { assembly: String },

    /// No type has been materialized yet.
    #[error("nothing to save: no type has been created")]
    NothingToSave,

    #[error("failed to encode assembly manifest: {message}")]
    Encode { message: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

// ============================================================================
// Runtime Errors
// ============================================================================

/// Failure while invoking a member of a runtime type.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RuntimeError {
    #[error("'{member}' expects {expected} argument(s), got {got}")]
    ArityMismatch {
        member: String,
        expected: usize,
        got: usize,
    },

    #[error("'{member}' argument {index}: expected {expected}, got {found}")]
    ArgumentType {
        member: String,
        index: usize,
        expected: DataType,
        found: String,
    },

    #[error("'{member}' returned {found}, expected {expected}")]
    ReturnType {
        member: String,
        expected: DataType,
        found: String,
    },

    #[error("instance member '{member}' called without an instance")]
    NullThis { member: String },

    #[error("null reference accessing '{member}'")]
    NullReference { member: String },

    #[error("'{member}' belongs to '{expected_type}', not to an instance of '{found_type}'")]
    WrongInstance {
        member: String,
        expected_type: String,
        found_type: String,
    },

    #[error("body of '{member}' has not been compiled yet")]
    BodyNotCompiled { member: String },

    #[error("type '{type_name}' has not been created yet")]
    TypeNotCreated { type_name: String },

    #[error("type '{type_name}' failed to create and cannot be used")]
    TypeUnusable { type_name: String },

    #[error("type '{type_name}' cannot be instantiated")]
    NotInstantiable { type_name: String },

    #[error("static initializer of '{type_name}' failed: {message}")]
    TypeInitializer { type_name: String, message: String },

    #[error("no constructor of '{type_name}' accepts ({args})")]
    NoMatchingConstructor { type_name: String, args: String },

    #[error("unknown member '{member}' on type '{type_name}'")]
    UnknownMember { type_name: String, member: String },

    #[error("division by zero")]
    DivisionByZero,

    #[error("{message}")]
    Custom { message: String },
}

// ============================================================================
// Unified Error
// ============================================================================

/// Top-level error covering every phase of type construction.
#[derive(Debug, Error)]
pub enum EmitError {
    #[error(transparent)]
    Shape(#[from] ShapeError),

    #[error("failed to compile body of '{member}': {source}")]
    Compilation {
        member: String,
        #[source]
        source: CompilationError,
    },

    #[error(transparent)]
    ShapeMismatch(#[from] DelegateShapeMismatchError),

    #[error(transparent)]
    Persistence(#[from] PersistenceError),

    #[error(transparent)]
    Runtime(#[from] RuntimeError),
}

impl EmitError {
    pub fn is_compilation(&self) -> bool {
        matches!(self, EmitError::Compilation { .. })
    }
}
