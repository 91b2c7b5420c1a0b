//! `create`: finalizing a draft into a runtime type.

use std::rc::Rc;

use quill_core::{
    Binding, DelegateShapeMismatchError, EmitError, ExpressionCompiler, MemberAttributes,
    RuntimeType, ShapeError, SymbolEnv, THIS, TypeAttributes, TypeHash, TypeParts, TypeRef,
};
use tracing::{debug, trace, warn};

use crate::draft::{DraftState, TypeDraft};
use crate::trampoline;

impl<C: ExpressionCompiler> TypeDraft<C> {
    /// Finalize the draft.
    ///
    /// Synthesizes a default constructor if none was defined, closes the
    /// static initializer, materializes the type, compiles every pending body
    /// in definition order with `this` bound to the new type, then closes the
    /// prologue and seals the companion type. Calling `create` again returns
    /// the same type.
    ///
    /// A compilation or shape failure leaves the materialized type inert and
    /// the draft failed.
    #[cfg_attr(feature = "profiling", profiling::function)]
    pub fn create(&mut self, env: Option<&SymbolEnv>) -> Result<TypeRef, EmitError> {
        match &self.state {
            DraftState::Created(ty) => return Ok(Rc::clone(ty)),
            DraftState::Failed(_) => {
                return Err(ShapeError::DraftFailed {
                    type_name: self.owner.name.clone(),
                }
                .into());
            }
            DraftState::Open => {}
        }
        self.check_implementations()?;

        if self.constructors.is_empty() && !self.is_interface() {
            self.define_constructor(MemberAttributes::PUBLIC, &[], None)?;
            debug!(type_name = %self.owner.name, "synthesized default constructor");
        }

        if let Some(routine) = &self.static_init {
            routine.close();
            self.statics
                .install_initializer(trampoline::static_initializer(Rc::clone(routine)));
        }

        let ty = RuntimeType::from_parts(TypeParts {
            name: self.owner.name.clone(),
            attributes: self.attributes,
            base: self.base.clone(),
            interfaces: self.interfaces.clone(),
            fields: self.fields.clone(),
            methods: self.methods.clone(),
            constructors: self.constructors.clone(),
            properties: self.properties.clone(),
            statics: Rc::clone(&self.statics),
        });
        self.target.bind(&ty);
        debug!(type_name = %self.owner.name, pending = self.pending.len(), "materialized type");

        if let Err(err) = self.drain(&ty, env) {
            ty.mark_unusable();
            self.state = DraftState::Failed(ty);
            warn!(type_name = %self.owner.name, error = %err, "create failed; type left unusable");
            return Err(err);
        }

        self.prologue.close();
        self.companion.seal();
        self.module.register(Rc::clone(&ty));
        self.state = DraftState::Created(Rc::clone(&ty));
        debug!(
            type_name = %self.owner.name,
            companion = self.companion.name(),
            impl_methods = self.companion.methods().len(),
            "created type"
        );
        Ok(ty)
    }

    #[cfg_attr(feature = "profiling", profiling::function)]
    fn drain(&mut self, ty: &TypeRef, env: Option<&SymbolEnv>) -> Result<(), EmitError> {
        let outer = env
            .cloned()
            .unwrap_or_default()
            .child(ty.name(), Binding::Type(Rc::clone(ty)));
        let compiler = Rc::clone(&self.compiler);
        for entry in self.pending.drain() {
            let scope = outer.child(THIS, Binding::Type(Rc::clone(ty)));
            let compiled = compiler
                .compile(&entry.body, &scope, &entry.shape)
                .map_err(|source| EmitError::Compilation {
                    member: entry.member.clone(),
                    source,
                })?;
            if compiled.shape != entry.shape {
                return Err(DelegateShapeMismatchError {
                    member: entry.member,
                    expected: entry.shape,
                    actual: compiled.shape,
                }
                .into());
            }
            trace!(member = %entry.member, impl_method = entry.target.name(), "emitted body");
            entry.target.install(compiled.invoker);
        }
        Ok(())
    }

    /// A concrete class must provide every interface method and every
    /// abstract method it inherits.
    fn check_implementations(&self) -> Result<(), ShapeError> {
        if self.is_interface() || self.attributes.contains(TypeAttributes::ABSTRACT) {
            return Ok(());
        }

        let mut pending: Vec<&TypeRef> = self.interfaces.iter().collect();
        while let Some(interface) = pending.pop() {
            pending.extend(interface.interfaces());
            for required in interface.methods() {
                if !self.implements(required.slot) {
                    return Err(self.missing(interface.name(), &required.name));
                }
            }
        }

        let mut base = self.base.as_ref();
        while let Some(ty) = base {
            for required in ty.methods() {
                if required.attributes.contains(MemberAttributes::ABSTRACT) && !self.implements(required.slot) {
                    return Err(self.missing(ty.name(), &required.name));
                }
            }
            base = ty.base();
        }
        Ok(())
    }

    fn implements(&self, slot: TypeHash) -> bool {
        self.methods
            .iter()
            .find(|method| method.slot == slot && !method.is_static())
            .cloned()
            .or_else(|| self.base.as_ref().and_then(|base| base.resolve_override(slot)))
            .is_some_and(|method| {
                method.attributes.is_public() && !method.attributes.contains(MemberAttributes::ABSTRACT)
            })
    }

    fn missing(&self, declaring: &str, method: &str) -> ShapeError {
        ShapeError::MissingInterfaceMethod {
            type_name: self.owner.name.clone(),
            interface: declaring.to_string(),
            method: method.to_string(),
        }
    }
}
