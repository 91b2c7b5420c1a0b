//! AssemblyContainer - the process-local home of dynamically created types.

use std::path::PathBuf;
use std::rc::Rc;

use once_cell::unsync::OnceCell;
use quill_core::{
    ExpressionCompiler, PersistenceError, RuntimeType, ShapeError, TypeAttributes, TypeRef,
};
use tracing::debug;

use crate::draft::TypeDraft;
use crate::module::{DynamicAssembly, DynamicModule};
use crate::options::ContainerOptions;
use crate::{persist, validate};

/// Owns the dynamic assembly and module, the `object` root type and the
/// expression compiler shared by every draft.
///
/// ```
/// use quill_core::{CompilationError, CompiledBody, DelegateShape, ExpressionCompiler, SymbolEnv};
/// use quill_emit::{AssemblyContainer, ContainerOptions};
///
/// struct NoBodies;
///
/// impl ExpressionCompiler for NoBodies {
///     type Expr = ();
///
///     fn compile(&self, _: &(), _: &SymbolEnv, _: &DelegateShape) -> Result<CompiledBody, CompilationError> {
///         Err(CompilationError::InvalidOperation { message: "no bodies".into() })
///     }
/// }
///
/// let container = AssemblyContainer::new(NoBodies, ContainerOptions::default());
/// let mut draft = container.define_type("Empty", &[]).unwrap();
/// let ty = draft.create(None).unwrap();
/// assert!(ty.instantiate(&[]).is_ok());
/// ```
pub struct AssemblyContainer<C: ExpressionCompiler> {
    options: ContainerOptions,
    compiler: Rc<C>,
    object_type: TypeRef,
    assembly: OnceCell<Rc<DynamicAssembly>>,
}

impl<C: ExpressionCompiler> AssemblyContainer<C> {
    pub fn new(compiler: C, options: ContainerOptions) -> Self {
        Self::with_shared_compiler(Rc::new(compiler), options)
    }

    /// Create a container around a compiler that is also used elsewhere.
    pub fn with_shared_compiler(compiler: Rc<C>, options: ContainerOptions) -> Self {
        Self {
            options,
            compiler,
            object_type: RuntimeType::object_root(),
            assembly: OnceCell::new(),
        }
    }

    pub fn options(&self) -> &ContainerOptions {
        &self.options
    }

    pub fn compiler(&self) -> &Rc<C> {
        &self.compiler
    }

    /// The universal base type.
    pub fn object_type(&self) -> &TypeRef {
        &self.object_type
    }

    /// The dynamic assembly, created on first use.
    pub fn get_or_create_assembly(&self) -> Rc<DynamicAssembly> {
        Rc::clone(self.assembly.get_or_init(|| {
            debug!(assembly = %self.options.assembly_name, access = ?self.options.access, "created dynamic assembly");
            Rc::new(DynamicAssembly::new(
                self.options.assembly_name.clone(),
                self.options.module_name.clone(),
            ))
        }))
    }

    /// The dynamic module, created (with its assembly) on first use.
    pub fn get_or_create_module(&self) -> Rc<DynamicModule> {
        self.get_or_create_assembly().get_or_create_module()
    }

    /// Open a draft for a public class.
    ///
    /// `base_and_interfaces` lists the base class first, followed by
    /// interfaces. An empty list derives from `object`.
    pub fn define_type(
        &self,
        name: &str,
        base_and_interfaces: &[TypeRef],
    ) -> Result<TypeDraft<C>, ShapeError> {
        self.define_type_with_attributes(name, TypeAttributes::PUBLIC, base_and_interfaces)
    }

    /// Open a draft for an interface extending `base_interfaces`.
    pub fn define_interface(
        &self,
        name: &str,
        base_interfaces: &[TypeRef],
    ) -> Result<TypeDraft<C>, ShapeError> {
        self.define_type_with_attributes(
            name,
            TypeAttributes::PUBLIC | TypeAttributes::INTERFACE,
            base_interfaces,
        )
    }

    pub fn define_type_with_attributes(
        &self,
        name: &str,
        attributes: TypeAttributes,
        base_and_interfaces: &[TypeRef],
    ) -> Result<TypeDraft<C>, ShapeError> {
        validate::type_name(name)?;
        if attributes.is_interface() && attributes.intersects(TypeAttributes::SEALED | TypeAttributes::ABSTRACT) {
            return Err(ShapeError::ConflictingAttributes {
                member: name.to_string(),
                detail: "interfaces cannot be SEALED or ABSTRACT".to_string(),
            });
        }
        if attributes.contains(TypeAttributes::SEALED | TypeAttributes::ABSTRACT) {
            return Err(ShapeError::ConflictingAttributes {
                member: name.to_string(),
                detail: "SEALED and ABSTRACT are mutually exclusive".to_string(),
            });
        }

        let (base, interfaces) = if attributes.is_interface() {
            (None, base_and_interfaces)
        } else {
            match base_and_interfaces.split_first() {
                Some((base, rest)) => (Some(base), rest),
                None => (None, base_and_interfaces),
            }
        };
        let base = match base {
            Some(base) => {
                check_base(name, base)?;
                Some(Rc::clone(base))
            }
            None if attributes.is_interface() => None,
            None => Some(Rc::clone(&self.object_type)),
        };
        for interface in interfaces {
            if !interface.is_interface() {
                return Err(ShapeError::InvalidBase {
                    type_name: name.to_string(),
                    detail: format!("'{}' is not an interface; only the first entry may be a class", interface.name()),
                });
            }
        }

        let module = self.get_or_create_module();
        module.reserve(name)?;
        debug!(
            type_name = name,
            ?attributes,
            base = base.as_ref().map(|b| b.name()),
            interfaces = interfaces.len(),
            "opened type draft"
        );
        Ok(TypeDraft::new(
            name,
            attributes,
            base,
            interfaces.to_vec(),
            Rc::clone(&self.compiler),
            module,
        ))
    }

    /// Materialized types in creation order.
    pub fn types(&self) -> Vec<TypeRef> {
        self.assembly
            .get()
            .and_then(|assembly| assembly.module())
            .map(|module| module.types())
            .unwrap_or_default()
    }

    pub fn find_type(&self, name: &str) -> Option<TypeRef> {
        if name == self.object_type.name() {
            return Some(Rc::clone(&self.object_type));
        }
        self.assembly
            .get()
            .and_then(|assembly| assembly.module())
            .and_then(|module| module.find_type(name))
    }

    /// Write a manifest of every created type to the output directory.
    ///
    /// Returns the path written.
    pub fn save(&self) -> Result<PathBuf, PersistenceError> {
        persist::save(&self.options, &self.types())
    }
}

fn check_base(name: &str, base: &TypeRef) -> Result<(), ShapeError> {
    let invalid = |detail: String| ShapeError::InvalidBase {
        type_name: name.to_string(),
        detail,
    };
    if base.is_interface() {
        return Err(invalid(format!("'{}' is an interface; list a base class first", base.name())));
    }
    if base.is_sealed() {
        return Err(invalid(format!("'{}' is sealed", base.name())));
    }
    if !base.is_usable() {
        return Err(invalid(format!("'{}' failed to create", base.name())));
    }
    if base.parameterless_constructor().is_none() {
        return Err(invalid(format!("'{}' has no parameterless constructor", base.name())));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::container;
    use quill_core::{DataType, MemberAttributes, Value};

    #[test]
    fn assembly_and_module_are_memoized() {
        let container = container();
        assert!(Rc::ptr_eq(
            &container.get_or_create_assembly(),
            &container.get_or_create_assembly()
        ));
        let module = container.get_or_create_module();
        assert!(Rc::ptr_eq(&module, &container.get_or_create_module()));
        assert_eq!(module.name(), container.options().module_name);
    }

    #[test]
    fn empty_base_list_derives_from_object() {
        let container = container();
        let draft = container.define_type("T", &[]).unwrap();
        assert_eq!(draft.base().map(|b| b.name()), Some("object"));
        assert!(draft.interfaces().is_empty());
    }

    #[test]
    fn duplicate_type_names_are_rejected() {
        let container = container();
        let _first = container.define_type("T", &[]).unwrap();
        assert!(matches!(
            container.define_type("T", &[]),
            Err(ShapeError::DuplicateType(name)) if name == "T"
        ));
    }

    #[test]
    fn built_in_type_names_cannot_be_defined() {
        let container = container();
        let mut other = container.define_type("Other", &[]).unwrap();
        other
            .define_field("secret", DataType::Int32, MemberAttributes::PUBLIC, None)
            .unwrap();
        other.create(None).unwrap();

        for name in ["object", "int", "string"] {
            assert!(matches!(
                container.define_type(name, &[]),
                Err(ShapeError::InvalidName { name: found, .. }) if found == name
            ));
        }
        assert!(matches!(
            container.define_interface("bool", &[]),
            Err(ShapeError::InvalidName { .. })
        ));

        assert!(Rc::ptr_eq(
            &container.find_type("object").unwrap(),
            container.object_type()
        ));
        assert_eq!(container.types().len(), 1);
    }

    #[test]
    fn invalid_bases_are_rejected() {
        let container = container();
        let sealed = container
            .define_type_with_attributes("Sealed", TypeAttributes::PUBLIC | TypeAttributes::SEALED, &[])
            .unwrap()
            .create(None)
            .unwrap();
        assert!(matches!(
            container.define_type("FromSealed", &[sealed]),
            Err(ShapeError::InvalidBase { .. })
        ));

        let iface = container.define_interface("IThing", &[]).unwrap().create(None).unwrap();
        assert!(matches!(
            container.define_type("IfaceFirst", &[Rc::clone(&iface)]),
            Err(ShapeError::InvalidBase { .. })
        ));

        let mut needs_args = container.define_type("NeedsArgs", &[]).unwrap();
        needs_args
            .define_constructor(MemberAttributes::PUBLIC, &[DataType::Int32], None)
            .unwrap();
        let needs_args = needs_args.create(None).unwrap();
        assert!(matches!(
            container.define_type("FromNeedsArgs", &[needs_args]),
            Err(ShapeError::InvalidBase { .. })
        ));

        let plain = container.define_type("Plain", &[]).unwrap().create(None).unwrap();
        assert!(matches!(
            container.define_type("TwoClasses", &[Rc::clone(container.object_type()), plain]),
            Err(ShapeError::InvalidBase { .. })
        ));
    }

    #[test]
    fn derived_instances_carry_base_fields() {
        let container = container();
        let mut base = container.define_type("Base", &[]).unwrap();
        base.define_field("a", DataType::Int32, MemberAttributes::PUBLIC, None).unwrap();
        let base = base.create(None).unwrap();

        let mut derived = container.define_type("Derived", &[Rc::clone(&base)]).unwrap();
        let b = derived
            .define_field("b", DataType::Int32, MemberAttributes::PUBLIC, None)
            .unwrap();
        let derived = derived.create(None).unwrap();

        let obj = derived.instantiate(&[]).unwrap();
        assert_eq!(obj.slot_count(), 2);
        base.find_field("a").unwrap().set(Some(&obj), Value::Int32(1)).unwrap();
        b.set(Some(&obj), Value::Int32(2)).unwrap();
        assert_eq!(derived.find_field("a").unwrap().get(Some(&obj)).unwrap(), Value::Int32(1));
        assert_eq!(b.get(Some(&obj)).unwrap(), Value::Int32(2));
        assert!(Value::Object(obj).is_assignable_to(&base.data_type()));
    }

    #[test]
    fn find_type_includes_object_and_created_types() {
        let container = container();
        assert!(container.find_type("object").is_some());
        container.define_type("T", &[]).unwrap().create(None).unwrap();
        assert_eq!(container.types().len(), 1);
        assert!(container.find_type("T").is_some());
    }

    #[test]
    fn type_names_are_validated() {
        let container = container();
        assert!(matches!(
            container.define_type("1Bad", &[]),
            Err(ShapeError::InvalidName { .. })
        ));
        assert!(container.define_type("Game.Player", &[]).is_ok());
    }
}
