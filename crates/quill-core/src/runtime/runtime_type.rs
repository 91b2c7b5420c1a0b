//! Materialized runtime types.
//!
//! A [`RuntimeType`] is immutable once built: its member tables are fixed and
//! only field values and the static-initializer state change afterwards.

use std::fmt;
use std::rc::{Rc, Weak};

use once_cell::unsync::OnceCell;
use rustc_hash::FxHashSet;

use crate::{
    ConstructorHandle, ConstructorInfo, DataType, FieldHandle, MemberAttributes, MemberOwner,
    MethodHandle, ObjectRef, PropertyHandle, RuntimeError, StaticStorage, TypeAttributes,
    TypeHash, Value, invoker,
};

pub type TypeRef = Rc<RuntimeType>;

/// Late-bound reference from a member to the type that will own it.
///
/// Constructors are handed out before their type exists; the slot is bound
/// when the type is materialized. It holds a weak reference so member tables
/// do not keep their own type alive.
#[derive(Clone, Default)]
pub struct TypeSlot(Rc<OnceCell<Weak<RuntimeType>>>);

impl TypeSlot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind the slot. Returns `false` if it was already bound.
    pub fn bind(&self, ty: &TypeRef) -> bool {
        self.0.set(Rc::downgrade(ty)).is_ok()
    }

    pub fn get(&self) -> Option<TypeRef> {
        self.0.get().and_then(Weak::upgrade)
    }

    pub fn is_bound(&self) -> bool {
        self.0.get().is_some()
    }
}

impl fmt::Debug for TypeSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("TypeSlot").field(&self.is_bound()).finish()
    }
}

/// Everything needed to materialize a type.
pub struct TypeParts {
    pub name: String,
    pub attributes: TypeAttributes,
    pub base: Option<TypeRef>,
    pub interfaces: Vec<TypeRef>,
    pub fields: Vec<FieldHandle>,
    pub methods: Vec<MethodHandle>,
    pub constructors: Vec<ConstructorHandle>,
    pub properties: Vec<PropertyHandle>,
    pub statics: Rc<StaticStorage>,
}

/// A finalized, instantiable type.
pub struct RuntimeType {
    name: String,
    hash: TypeHash,
    attributes: TypeAttributes,
    base: Option<TypeRef>,
    interfaces: Vec<TypeRef>,
    fields: Vec<FieldHandle>,
    methods: Vec<MethodHandle>,
    constructors: Vec<ConstructorHandle>,
    properties: Vec<PropertyHandle>,
    /// Default values of every instance slot, base slots first.
    field_defaults: Vec<Value>,
    /// This type, every base and every implemented interface.
    ancestry: FxHashSet<TypeHash>,
    statics: Rc<StaticStorage>,
}

impl RuntimeType {
    /// Materialize a type from its parts.
    pub fn from_parts(parts: TypeParts) -> TypeRef {
        let hash = TypeHash::from_name(&parts.name);

        let mut field_defaults = parts
            .base
            .as_ref()
            .map(|base| base.field_defaults.clone())
            .unwrap_or_default();
        field_defaults.extend(
            parts
                .fields
                .iter()
                .filter(|field| !field.is_static())
                .map(|field| field.data_type.default_value()),
        );

        let mut ancestry = FxHashSet::default();
        ancestry.insert(hash);
        ancestry.insert(TypeHash::OBJECT);
        for parent in parts.base.iter().chain(&parts.interfaces) {
            ancestry.extend(parent.ancestry.iter().copied());
        }

        Rc::new(Self {
            name: parts.name,
            hash,
            attributes: parts.attributes,
            base: parts.base,
            interfaces: parts.interfaces,
            fields: parts.fields,
            methods: parts.methods,
            constructors: parts.constructors,
            properties: parts.properties,
            field_defaults,
            ancestry,
            statics: parts.statics,
        })
    }

    /// The universal `object` root type: no fields, one parameterless constructor.
    pub fn object_root() -> TypeRef {
        let owner = MemberOwner::new("object");
        let target = TypeSlot::new();
        let ctor = Rc::new(ConstructorInfo::new(
            owner,
            MemberAttributes::PUBLIC,
            Vec::new(),
            false,
            invoker(|_| Ok(Value::Void)),
            target.clone(),
        ));
        let ty = Self::from_parts(TypeParts {
            name: "object".to_string(),
            attributes: TypeAttributes::PUBLIC,
            base: None,
            interfaces: Vec::new(),
            fields: Vec::new(),
            methods: Vec::new(),
            constructors: vec![ctor],
            properties: Vec::new(),
            statics: StaticStorage::new("object"),
        });
        target.bind(&ty);
        ty
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn type_hash(&self) -> TypeHash {
        self.hash
    }

    pub fn data_type(&self) -> DataType {
        DataType::Object(self.hash)
    }

    pub fn attributes(&self) -> TypeAttributes {
        self.attributes
    }

    pub fn is_interface(&self) -> bool {
        self.attributes.is_interface()
    }

    pub fn is_abstract(&self) -> bool {
        self.attributes.contains(TypeAttributes::ABSTRACT)
    }

    pub fn is_sealed(&self) -> bool {
        self.attributes.contains(TypeAttributes::SEALED)
    }

    pub fn base(&self) -> Option<&TypeRef> {
        self.base.as_ref()
    }

    pub fn interfaces(&self) -> &[TypeRef] {
        &self.interfaces
    }

    /// Whether values of this type can be stored in a slot typed `hash`.
    pub fn derives_from(&self, hash: TypeHash) -> bool {
        self.ancestry.contains(&hash)
    }

    // ==========================================================================
    // Declared members
    // ==========================================================================

    pub fn fields(&self) -> &[FieldHandle] {
        &self.fields
    }

    pub fn methods(&self) -> &[MethodHandle] {
        &self.methods
    }

    pub fn constructors(&self) -> &[ConstructorHandle] {
        &self.constructors
    }

    pub fn properties(&self) -> &[PropertyHandle] {
        &self.properties
    }

    /// Number of instance slots including inherited ones.
    pub fn instance_slot_count(&self) -> usize {
        self.field_defaults.len()
    }

    pub fn field_defaults(&self) -> &[Value] {
        &self.field_defaults
    }

    pub fn statics(&self) -> &Rc<StaticStorage> {
        &self.statics
    }

    // ==========================================================================
    // Lookup (walks the base chain)
    // ==========================================================================

    fn chain(&self) -> impl Iterator<Item = &RuntimeType> {
        std::iter::successors(Some(self), |ty| ty.base.as_deref())
    }

    pub fn find_field(&self, name: &str) -> Option<FieldHandle> {
        self.chain()
            .flat_map(|ty| ty.fields.iter())
            .find(|field| field.name == name)
            .cloned()
    }

    pub fn find_property(&self, name: &str) -> Option<PropertyHandle> {
        self.chain()
            .flat_map(|ty| ty.properties.iter())
            .find(|prop| prop.name == name)
            .cloned()
    }

    /// All methods named `name`, most-derived first, including interface declarations.
    pub fn methods_named(&self, name: &str) -> Vec<MethodHandle> {
        let mut found: Vec<MethodHandle> = self
            .chain()
            .flat_map(|ty| ty.methods.iter())
            .filter(|method| method.name == name)
            .cloned()
            .collect();
        for interface in self.chain().flat_map(|ty| ty.interfaces.iter()) {
            found.extend(interface.methods_named(name));
        }
        found
    }

    /// Method with exactly these declared parameter types.
    pub fn find_method(&self, name: &str, params: &[DataType]) -> Option<MethodHandle> {
        self.methods_named(name)
            .into_iter()
            .find(|method| method.params == params)
    }

    /// Most-derived instance method occupying a virtual slot.
    pub fn resolve_override(&self, slot: TypeHash) -> Option<MethodHandle> {
        self.chain()
            .flat_map(|ty| ty.methods.iter())
            .find(|method| method.slot == slot && !method.is_static())
            .cloned()
    }

    pub fn find_constructor(&self, params: &[DataType]) -> Option<ConstructorHandle> {
        self.constructors
            .iter()
            .find(|ctor| ctor.params == params)
            .cloned()
    }

    pub fn parameterless_constructor(&self) -> Option<ConstructorHandle> {
        self.find_constructor(&[])
    }

    // ==========================================================================
    // Instantiation and static access
    // ==========================================================================

    /// Whether `create` completed for this type.
    pub fn is_usable(&self) -> bool {
        self.statics.is_usable()
    }

    /// Mark the type inert after a failed `create`. Shared with every member
    /// handle through the static storage.
    pub fn mark_unusable(&self) {
        self.statics.mark_unusable();
    }

    pub fn check_instantiable(&self) -> Result<(), RuntimeError> {
        if !self.is_usable() {
            return Err(RuntimeError::TypeUnusable {
                type_name: self.name.clone(),
            });
        }
        if self.is_interface() || self.is_abstract() {
            return Err(RuntimeError::NotInstantiable {
                type_name: self.name.clone(),
            });
        }
        Ok(())
    }

    /// Construct an instance with the first constructor accepting `args`.
    pub fn instantiate(&self, args: &[Value]) -> Result<ObjectRef, RuntimeError> {
        let ctor = self
            .constructors
            .iter()
            .find(|ctor| {
                ctor.params.len() == args.len()
                    && ctor.params.iter().zip(args).all(|(p, a)| a.is_assignable_to(p))
            })
            .ok_or_else(|| RuntimeError::NoMatchingConstructor {
                type_name: self.name.clone(),
                args: args.iter().map(Value::type_name).collect::<Vec<_>>().join(", "),
            })?;
        ctor.construct(args)
    }

    /// Read a static field by name.
    pub fn get_static(&self, name: &str) -> Result<Value, RuntimeError> {
        self.static_field(name)?.get_static()
    }

    /// Write a static field by name.
    pub fn set_static(&self, name: &str, value: Value) -> Result<(), RuntimeError> {
        self.static_field(name)?.set_static(value)
    }

    fn static_field(&self, name: &str) -> Result<FieldHandle, RuntimeError> {
        if !self.is_usable() {
            return Err(RuntimeError::TypeUnusable {
                type_name: self.name.clone(),
            });
        }
        self.find_field(name)
            .filter(|field| field.is_static())
            .ok_or_else(|| RuntimeError::UnknownMember {
                type_name: self.name.clone(),
                member: name.to_string(),
            })
    }
}

impl fmt::Debug for RuntimeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RuntimeType")
            .field("name", &self.name)
            .field("hash", &self.hash)
            .field("base", &self.base.as_ref().map(|b| b.name()))
            .field("fields", &self.fields.len())
            .field("methods", &self.methods.len())
            .field("usable", &self.is_usable())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{FieldInfo, FieldStorage, MethodInfo};

    fn leaf(base: TypeRef) -> TypeRef {
        let owner = MemberOwner::new("Leaf");
        let statics = StaticStorage::new("Leaf");
        let field = Rc::new(FieldInfo::new(
            owner.clone(),
            "count",
            DataType::Int32,
            MemberAttributes::PUBLIC,
            false,
            FieldStorage::Instance {
                slot: base.instance_slot_count(),
            },
        ));
        let method = Rc::new(MethodInfo::new(
            owner,
            "describe",
            MemberAttributes::PUBLIC,
            DataType::String,
            vec![],
            false,
            invoker(|_| Ok(Value::string("leaf"))),
            Rc::clone(&statics),
        ));
        RuntimeType::from_parts(TypeParts {
            name: "Leaf".to_string(),
            attributes: TypeAttributes::PUBLIC,
            base: Some(base),
            interfaces: Vec::new(),
            fields: vec![field],
            methods: vec![method],
            constructors: Vec::new(),
            properties: Vec::new(),
            statics,
        })
    }

    #[test]
    fn object_root_is_instantiable() {
        let root = RuntimeType::object_root();
        let obj = root.instantiate(&[]).unwrap();
        assert_eq!(obj.runtime_type().name(), "object");
        assert_eq!(obj.slot_count(), 0);
    }

    #[test]
    fn ancestry_includes_base_and_object() {
        let root = RuntimeType::object_root();
        let ty = leaf(root);
        assert!(ty.derives_from(ty.type_hash()));
        assert!(ty.derives_from(TypeHash::OBJECT));
        assert!(!ty.derives_from(TypeHash::from_name("Other")));
    }

    #[test]
    fn lookups_find_declared_members() {
        let ty = leaf(RuntimeType::object_root());
        assert!(ty.find_field("count").is_some());
        assert!(ty.find_method("describe", &[]).is_some());
        assert!(ty.find_method("describe", &[DataType::Int32]).is_none());
        assert_eq!(ty.field_defaults(), &[Value::Int32(0)]);
    }

    #[test]
    fn type_without_constructor_cannot_instantiate() {
        let ty = leaf(RuntimeType::object_root());
        assert!(matches!(
            ty.instantiate(&[]).unwrap_err(),
            RuntimeError::NoMatchingConstructor { .. }
        ));
    }

    #[test]
    fn unusable_type_rejects_instantiation() {
        let root = RuntimeType::object_root();
        root.mark_unusable();
        assert!(matches!(
            root.instantiate(&[]).unwrap_err(),
            RuntimeError::TypeUnusable { .. }
        ));
    }

    #[test]
    fn unusable_type_rejects_method_calls() {
        let root = RuntimeType::object_root();
        let leaf = leaf(root);
        let obj = crate::ScriptObject::allocate(Rc::clone(&leaf));
        let describe = leaf.find_method("describe", &[]).unwrap();
        assert_eq!(describe.invoke(Some(&obj), &[]).unwrap(), Value::string("leaf"));

        leaf.mark_unusable();
        assert!(!leaf.statics().is_usable());
        assert!(matches!(
            describe.invoke(Some(&obj), &[]).unwrap_err(),
            RuntimeError::TypeUnusable { .. }
        ));
    }

    #[test]
    fn type_slot_binds_once() {
        let slot = TypeSlot::new();
        let a = RuntimeType::object_root();
        let b = RuntimeType::object_root();
        assert!(slot.bind(&a));
        assert!(!slot.bind(&b));
        assert!(Rc::ptr_eq(&slot.get().unwrap(), &a));
    }
}
