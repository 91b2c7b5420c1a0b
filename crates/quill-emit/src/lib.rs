//! Runtime type construction for quill.
//!
//! A [`TypeDraft`] accumulates the shape of a type. Every `define_*` call
//! returns a live member handle immediately; body expressions are queued and
//! compiled by the container's [`ExpressionCompiler`](quill_core::ExpressionCompiler)
//! only when [`TypeDraft::create`] materializes the type. Because members are
//! callable before their bodies exist, bodies can refer to the type being
//! built and to each other.
//!
//! ## Modules
//!
//! - [`container`]: the assembly container and type definition entry points
//! - [`draft`]: the open draft and its `define_*` operations
//! - [`materialize`]: `create`
//! - [`companion`]: hidden implementation methods
//! - [`routine`]: instance prologue and static initializer
//! - [`trampoline`]: invokers installed on public members
//! - [`pending`]: the queue of bodies awaiting compilation
//! - [`persist`]: saving created types as a manifest

pub mod companion;
pub mod container;
pub mod draft;
pub mod materialize;
pub mod module;
pub mod options;
pub mod pending;
pub mod persist;
pub mod routine;
pub mod trampoline;
mod validate;

pub use companion::{CompanionType, ImplSlot};
pub use container::AssemblyContainer;
pub use draft::{DraftState, MemberHandle, MemberKind, TypeDraft};
pub use module::{DynamicAssembly, DynamicModule};
pub use options::{AssemblyAccess, ContainerOptions};
pub use pending::{PendingInitializer, PendingQueue};
pub use persist::AssemblyManifest;
pub use routine::{InitializerRoutine, RoutineKind};

#[cfg(test)]
mod test_support;
