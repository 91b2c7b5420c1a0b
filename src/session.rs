//! A container paired with the reference compiler and a global environment.

use std::path::PathBuf;
use std::rc::Rc;

use quill_core::{
    Binding, EmitError, PersistenceError, ShapeError, SymbolEnv, TypeRef, Value,
};
use quill_emit::{AssemblyContainer, ContainerOptions, TypeDraft};
use quill_expr::ExprCompiler;
use tracing::debug;

/// A draft whose bodies are [`Expr`](quill_expr::Expr) trees.
pub type Draft = TypeDraft<ExprCompiler>;

/// Owns an [`AssemblyContainer`] and the environment its bodies compile in.
///
/// `object` and every type created through [`Session::create`] are bound
/// by name, so later bodies can construct them, call their static members
/// and name them in member signatures.
pub struct Session {
    container: AssemblyContainer<ExprCompiler>,
    globals: SymbolEnv,
}

impl Session {
    pub fn new() -> Self {
        Self::with_options(ContainerOptions::default())
    }

    pub fn with_options(options: ContainerOptions) -> Self {
        let container = AssemblyContainer::new(ExprCompiler, options);
        let object = Rc::clone(container.object_type());
        let name = object.name().to_string();
        let globals = SymbolEnv::new().child(name, Binding::Type(object));
        Self { container, globals }
    }

    pub fn container(&self) -> &AssemblyContainer<ExprCompiler> {
        &self.container
    }

    /// The environment passed to [`Session::create`].
    pub fn environment(&self) -> &SymbolEnv {
        &self.globals
    }

    /// Bind a global constant visible to bodies compiled from now on.
    pub fn bind(&mut self, name: &str, value: Value) {
        self.globals = self.globals.child(name, Binding::Value(value));
    }

    pub fn define_type(&self, name: &str, base_and_interfaces: &[TypeRef]) -> Result<Draft, ShapeError> {
        self.container.define_type(name, base_and_interfaces)
    }

    pub fn define_interface(&self, name: &str, base_interfaces: &[TypeRef]) -> Result<Draft, ShapeError> {
        self.container.define_interface(name, base_interfaces)
    }

    /// Create `draft` against the session environment and bind the result
    /// by name.
    pub fn create(&mut self, draft: &mut Draft) -> Result<TypeRef, EmitError> {
        let ty = draft.create(Some(&self.globals))?;
        if self.globals.find_type(ty.type_hash()).is_none() {
            self.globals = self.globals.child(ty.name(), Binding::Type(Rc::clone(&ty)));
            debug!(type_name = ty.name(), bindings = self.globals.len(), "bound created type");
        }
        Ok(ty)
    }

    pub fn find_type(&self, name: &str) -> Option<TypeRef> {
        self.container.find_type(name)
    }

    pub fn types(&self) -> Vec<TypeRef> {
        self.container.types()
    }

    pub fn save(&self) -> Result<PathBuf, PersistenceError> {
        self.container.save()
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quill_core::{DataType, MemberAttributes};
    use quill_expr::Expr;

    #[test]
    fn fresh_session_binds_object() {
        let session = Session::new();
        assert_eq!(session.environment().len(), 1);
        assert!(matches!(
            session.environment().lookup("object"),
            Some(Binding::Type(ty)) if Rc::ptr_eq(ty, session.container().object_type())
        ));
    }

    #[test]
    fn created_types_are_bound_once() {
        let mut session = Session::new();
        let before = session.environment().len();
        let mut draft = session.define_type("Once", &[]).unwrap();
        let first = session.create(&mut draft).unwrap();
        let second = session.create(&mut draft).unwrap();
        assert!(Rc::ptr_eq(&first, &second));
        assert_eq!(session.environment().len(), before + 1);
    }

    #[test]
    fn later_types_see_earlier_ones() {
        let mut session = Session::new();
        let mut cell = session.define_type("Cell", &[]).unwrap();
        cell.define_field("value", DataType::Int32, MemberAttributes::PUBLIC, Some(Expr::int(5)))
            .unwrap();
        session.create(&mut cell).unwrap();

        let mut reader = session.define_type("Reader", &[]).unwrap();
        let read = reader
            .define_method(
                "Read",
                MemberAttributes::PUBLIC | MemberAttributes::STATIC,
                Some(DataType::Int32),
                &[],
                Some(Expr::new_object("Cell", vec![]).member("value")),
            )
            .unwrap();
        session.create(&mut reader).unwrap();
        assert_eq!(read.invoke(None, &[]).unwrap(), Value::Int32(5));
    }

    #[test]
    fn bound_constants_are_visible_to_bodies() {
        let mut session = Session::new();
        session.bind("limit", Value::Int32(3));
        let mut draft = session.define_type("Limits", &[]).unwrap();
        let max = draft
            .define_method(
                "Max",
                MemberAttributes::PUBLIC | MemberAttributes::STATIC,
                Some(DataType::Int64),
                &[],
                Some(Expr::symbol("limit")),
            )
            .unwrap();
        session.create(&mut draft).unwrap();
        assert_eq!(max.invoke(None, &[]).unwrap(), Value::Int64(3));
    }
}
