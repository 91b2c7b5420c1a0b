//! Symbol environments handed to the expression compiler.
//!
//! An environment is a persistent chain of bindings. Deriving a child never
//! mutates the parent, so the same external environment can be extended with a
//! different `this` for every type being created.

use std::fmt;
use std::rc::Rc;

use crate::{TypeHash, TypeRef, Value};

/// Name bound to the type being created while its bodies compile.
pub const THIS: &str = "this";

/// What a symbol refers to.
#[derive(Clone)]
pub enum Binding {
    /// A materialized type.
    Type(TypeRef),
    /// A constant value.
    Value(Value),
}

impl fmt::Debug for Binding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Binding::Type(ty) => write!(f, "Type({})", ty.name()),
            Binding::Value(value) => write!(f, "Value({value:?})"),
        }
    }
}

struct Frame {
    name: String,
    binding: Binding,
    parent: Option<Rc<Frame>>,
}

/// A persistent, immutable chain of symbol bindings.
///
/// ```
/// use quill_core::{Binding, SymbolEnv, Value};
///
/// let root = SymbolEnv::new().child("limit", Binding::Value(Value::Int32(10)));
/// let inner = root.child("limit", Binding::Value(Value::Int32(3)));
///
/// assert!(matches!(inner.lookup("limit"), Some(Binding::Value(Value::Int32(3)))));
/// assert!(matches!(root.lookup("limit"), Some(Binding::Value(Value::Int32(10)))));
/// ```
#[derive(Clone, Default)]
pub struct SymbolEnv {
    head: Option<Rc<Frame>>,
}

impl SymbolEnv {
    /// An empty environment.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build an environment from a list of bindings; later entries shadow earlier ones.
    pub fn from_bindings<I, S>(bindings: I) -> Self
    where
        I: IntoIterator<Item = (S, Binding)>,
        S: Into<String>,
    {
        bindings
            .into_iter()
            .fold(Self::new(), |env, (name, binding)| env.child(name, binding))
    }

    /// Derive a child environment with one additional binding.
    pub fn child(&self, name: impl Into<String>, binding: Binding) -> Self {
        Self {
            head: Some(Rc::new(Frame {
                name: name.into(),
                binding,
                parent: self.head.clone(),
            })),
        }
    }

    /// Innermost binding of `name`.
    pub fn lookup(&self, name: &str) -> Option<&Binding> {
        self.frames()
            .find(|frame| frame.name == name)
            .map(|frame| &frame.binding)
    }

    /// The type bound to `this`, if any.
    pub fn this_type(&self) -> Option<&TypeRef> {
        match self.lookup(THIS) {
            Some(Binding::Type(ty)) => Some(ty),
            _ => None,
        }
    }

    /// Find a bound type by hash, looking through every frame.
    pub fn find_type(&self, hash: TypeHash) -> Option<&TypeRef> {
        self.frames().find_map(|frame| match &frame.binding {
            Binding::Type(ty) if ty.type_hash() == hash => Some(ty),
            _ => None,
        })
    }

    /// Number of bindings, shadowed ones included.
    pub fn len(&self) -> usize {
        self.frames().count()
    }

    pub fn is_empty(&self) -> bool {
        self.head.is_none()
    }

    fn frames(&self) -> impl Iterator<Item = &Frame> {
        std::iter::successors(self.head.as_deref(), |frame| frame.parent.as_deref())
    }
}

impl fmt::Debug for SymbolEnv {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(self.frames().map(|frame| (&frame.name, &frame.binding)))
            .finish()
    }
}
