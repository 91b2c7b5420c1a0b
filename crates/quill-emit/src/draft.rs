//! TypeDraft - the open, mutable shape of a type under construction.
//!
//! Every `define_*` call validates the member, hands back a live handle and,
//! when a body expression is supplied, records it for compilation at
//! [`TypeDraft::create`] time.

use std::rc::Rc;

use quill_core::data_type::param_hashes;
use quill_core::{
    ConstructorHandle, ConstructorInfo, DataType, DelegateShape, ExpressionCompiler, FieldHandle,
    FieldInfo, FieldStorage, Invoker, MemberAttributes, MemberOwner, MethodHandle, MethodInfo,
    PropertyHandle, PropertyInfo, ShapeError, StaticStorage, TypeAttributes, TypeHash, TypeRef,
    TypeSlot,
};
use rustc_hash::{FxHashMap, FxHashSet};
use tracing::{debug, trace};

use crate::companion::{CompanionType, ImplSlot};
use crate::module::DynamicModule;
use crate::pending::{PendingInitializer, PendingQueue};
use crate::routine::{InitializerRoutine, RoutineKind};
use crate::{trampoline, validate};

/// Any member handle, in definition order.
#[derive(Debug, Clone)]
pub enum MemberHandle {
    Field(FieldHandle),
    Method(MethodHandle),
    Constructor(ConstructorHandle),
    Property(PropertyHandle),
}

impl MemberHandle {
    pub fn name(&self) -> &str {
        match self {
            MemberHandle::Field(f) => &f.name,
            MemberHandle::Method(m) => &m.name,
            MemberHandle::Constructor(_) => ".ctor",
            MemberHandle::Property(p) => &p.name,
        }
    }

    pub fn kind(&self) -> MemberKind {
        match self {
            MemberHandle::Field(_) => MemberKind::Field,
            MemberHandle::Method(_) => MemberKind::Method,
            MemberHandle::Constructor(_) => MemberKind::Constructor,
            MemberHandle::Property(_) => MemberKind::Property,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MemberKind {
    Field,
    Method,
    Constructor,
    Property,
}

/// Lifecycle of a draft.
#[derive(Debug, Clone)]
pub enum DraftState {
    /// Members may be defined.
    Open,
    /// Finalized; `create` returns this type again.
    Created(TypeRef),
    /// A body failed to compile; the draft must be discarded. Holds the
    /// inert type so handles bound to it report it as unusable.
    Failed(TypeRef),
}

/// A type under construction.
pub struct TypeDraft<C: ExpressionCompiler> {
    pub(crate) owner: MemberOwner,
    pub(crate) attributes: TypeAttributes,
    pub(crate) base: Option<TypeRef>,
    pub(crate) interfaces: Vec<TypeRef>,
    pub(crate) compiler: Rc<C>,
    pub(crate) module: Rc<DynamicModule>,

    pub(crate) members: Vec<MemberHandle>,
    pub(crate) fields: Vec<FieldHandle>,
    pub(crate) methods: Vec<MethodHandle>,
    pub(crate) constructors: Vec<ConstructorHandle>,
    pub(crate) properties: Vec<PropertyHandle>,
    /// Field, property and method names in use.
    names: FxHashMap<String, MemberKind>,
    /// Method and constructor signature hashes in use.
    signatures: FxHashSet<TypeHash>,

    pub(crate) companion: CompanionType,
    pub(crate) prologue: Rc<InitializerRoutine>,
    pub(crate) static_init: Option<Rc<InitializerRoutine>>,
    pub(crate) statics: Rc<StaticStorage>,
    pub(crate) target: TypeSlot,
    next_slot: usize,
    pub(crate) pending: PendingQueue<C::Expr>,
    pub(crate) state: DraftState,
}

impl<C: ExpressionCompiler> TypeDraft<C> {
    pub(crate) fn new(
        name: &str,
        attributes: TypeAttributes,
        base: Option<TypeRef>,
        interfaces: Vec<TypeRef>,
        compiler: Rc<C>,
        module: Rc<DynamicModule>,
    ) -> Self {
        let next_slot = base.as_ref().map_or(0, |b| b.instance_slot_count());
        Self {
            owner: MemberOwner::new(name),
            attributes,
            base,
            interfaces,
            compiler,
            module,
            members: Vec::new(),
            fields: Vec::new(),
            methods: Vec::new(),
            constructors: Vec::new(),
            properties: Vec::new(),
            names: FxHashMap::default(),
            signatures: FxHashSet::default(),
            companion: CompanionType::new(name),
            prologue: InitializerRoutine::new(RoutineKind::Prologue),
            static_init: None,
            statics: StaticStorage::new(name),
            target: TypeSlot::new(),
            next_slot,
            pending: PendingQueue::new(),
            state: DraftState::Open,
        }
    }

    // ==========================================================================
    // Introspection
    // ==========================================================================

    pub fn name(&self) -> &str {
        &self.owner.name
    }

    pub fn type_hash(&self) -> TypeHash {
        self.owner.hash
    }

    /// The static type of instances, usable in member signatures before `create`.
    pub fn data_type(&self) -> DataType {
        self.owner.this_type()
    }

    pub fn attributes(&self) -> TypeAttributes {
        self.attributes
    }

    pub fn is_interface(&self) -> bool {
        self.attributes.is_interface()
    }

    pub fn is_created(&self) -> bool {
        matches!(self.state, DraftState::Created(_))
    }

    pub fn state(&self) -> &DraftState {
        &self.state
    }

    pub fn base(&self) -> Option<&TypeRef> {
        self.base.as_ref()
    }

    pub fn interfaces(&self) -> &[TypeRef] {
        &self.interfaces
    }

    pub fn members(&self) -> &[MemberHandle] {
        &self.members
    }

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

    /// Bodies still waiting for compilation.
    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    pub fn companion(&self) -> &CompanionType {
        &self.companion
    }

    pub fn prologue(&self) -> &InitializerRoutine {
        &self.prologue
    }

    pub fn static_initializer(&self) -> Option<&InitializerRoutine> {
        self.static_init.as_deref()
    }

    // ==========================================================================
    // Fields
    // ==========================================================================

    /// Define a field. With an initializer, its value is computed by the
    /// prologue (instance fields) or the static initializer (static fields).
    pub fn define_field(
        &mut self,
        name: &str,
        data_type: DataType,
        attributes: MemberAttributes,
        initializer: Option<C::Expr>,
    ) -> Result<FieldHandle, ShapeError> {
        self.ensure_open()?;
        validate::member_name(name)?;
        validate::field_attributes(name, attributes)?;
        validate::storable(name, data_type)?;
        self.reject_on_interface("fields")?;
        self.check_name(name, MemberKind::Field)?;

        self.names.insert(name.to_string(), MemberKind::Field);
        Ok(self.push_field(name.to_string(), data_type, attributes, initializer))
    }

    fn push_field(
        &mut self,
        name: String,
        data_type: DataType,
        attributes: MemberAttributes,
        initializer: Option<C::Expr>,
    ) -> FieldHandle {
        let is_static = attributes.is_static();
        let storage = if is_static {
            FieldStorage::Static {
                slot: self.statics.allocate(data_type.default_value()),
                storage: Rc::clone(&self.statics),
            }
        } else {
            let slot = self.next_slot;
            self.next_slot += 1;
            FieldStorage::Instance { slot }
        };
        let field = Rc::new(FieldInfo::new(
            self.owner.clone(),
            name.clone(),
            data_type,
            attributes,
            initializer.is_some(),
            storage,
        ));

        if let Some(body) = initializer {
            let this = (!is_static).then(|| self.owner.this_type());
            let shape = DelegateShape::for_member(this, &[], data_type);
            let slot = self.companion.define_method(&name, shape.clone());
            let routine = if is_static {
                self.open_static_initializer()
            } else {
                Rc::clone(&self.prologue)
            };
            routine.push(Rc::clone(&field), Rc::clone(&slot));
            self.enqueue(slot, name.clone(), body, shape);
        }

        debug!(type_name = %self.owner.name, field = %name, %data_type, is_static, "defined field");
        self.fields.push(Rc::clone(&field));
        self.members.push(MemberHandle::Field(Rc::clone(&field)));
        field
    }

    fn open_static_initializer(&mut self) -> Rc<InitializerRoutine> {
        Rc::clone(
            self.static_init
                .get_or_insert_with(|| InitializerRoutine::new(RoutineKind::StaticInitializer)),
        )
    }

    // ==========================================================================
    // Methods
    // ==========================================================================

    /// Define a method. Without a body it returns the default of `return_type`;
    /// with one it forwards to an implementation compiled at `create` time.
    pub fn define_method(
        &mut self,
        name: &str,
        attributes: MemberAttributes,
        return_type: Option<DataType>,
        parameter_types: &[DataType],
        body: Option<C::Expr>,
    ) -> Result<MethodHandle, ShapeError> {
        self.ensure_open()?;
        validate::member_name(name)?;
        let mut attributes = attributes;
        if self.is_interface() {
            if body.is_some() {
                return Err(self.not_on_interface("method bodies"));
            }
            if attributes.is_static() {
                return Err(self.not_on_interface("static methods"));
            }
            attributes |= MemberAttributes::PUBLIC | MemberAttributes::VIRTUAL | MemberAttributes::ABSTRACT;
        }
        validate::method_attributes(name, attributes, body.is_some())?;
        if attributes.contains(MemberAttributes::ABSTRACT)
            && !self.is_interface()
            && !self.attributes.contains(TypeAttributes::ABSTRACT)
        {
            return Err(ShapeError::AbstractMemberOnConcreteType {
                type_name: self.owner.name.clone(),
                member: name.to_string(),
            });
        }
        validate::parameters(name, parameter_types)?;
        self.check_name(name, MemberKind::Method)?;
        self.check_signature(name, TypeHash::from_method(self.owner.hash, name, &param_hashes(parameter_types)))?;

        let return_type = return_type.unwrap_or(DataType::Void);
        Ok(self.push_method(name.to_string(), attributes, return_type, parameter_types.to_vec(), body))
    }

    fn push_method(
        &mut self,
        name: String,
        attributes: MemberAttributes,
        return_type: DataType,
        params: Vec<DataType>,
        body: Option<C::Expr>,
    ) -> MethodHandle {
        let (has_body, invoker) = match body {
            Some(body) => {
                let this = (!attributes.is_static()).then(|| self.owner.this_type());
                let shape = DelegateShape::for_member(this, &params, return_type);
                let slot = self.companion.define_method(&name, shape.clone());
                let invoker = trampoline::forward(Rc::clone(&slot));
                self.enqueue(slot, name.clone(), body, shape);
                (true, invoker)
            }
            None => (false, trampoline::default_stub(return_type)),
        };
        self.push_method_with(name, attributes, return_type, params, has_body, invoker)
    }

    fn push_method_with(
        &mut self,
        name: String,
        attributes: MemberAttributes,
        return_type: DataType,
        params: Vec<DataType>,
        has_body: bool,
        invoker: Invoker,
    ) -> MethodHandle {
        let method = Rc::new(MethodInfo::new(
            self.owner.clone(),
            name,
            attributes,
            return_type,
            params,
            has_body,
            invoker,
            Rc::clone(&self.statics),
        ));
        debug!(type_name = %self.owner.name, method = %method.name, shape = %method.shape(), has_body, "defined method");
        self.names.insert(method.name.clone(), MemberKind::Method);
        self.signatures.insert(method.hash);
        self.methods.push(Rc::clone(&method));
        self.members.push(MemberHandle::Method(Rc::clone(&method)));
        method
    }

    // ==========================================================================
    // Constructors
    // ==========================================================================

    /// Define a constructor. Construction always runs the base type's
    /// parameterless constructor, then the field initializers, then the body.
    pub fn define_constructor(
        &mut self,
        attributes: MemberAttributes,
        parameter_types: &[DataType],
        body: Option<C::Expr>,
    ) -> Result<ConstructorHandle, ShapeError> {
        self.ensure_open()?;
        let display = format!("{}.ctor", self.owner.name);
        self.reject_on_interface("constructors")?;
        validate::constructor_attributes(&display, attributes)?;
        validate::parameters(&display, parameter_types)?;
        self.check_signature(
            &display,
            TypeHash::from_constructor(self.owner.hash, &param_hashes(parameter_types)),
        )?;
        let base = match &self.base {
            Some(base) => Some(base.parameterless_constructor().ok_or_else(|| {
                ShapeError::InvalidBase {
                    type_name: self.owner.name.clone(),
                    detail: format!("'{}' has no parameterless constructor", base.name()),
                }
            })?),
            None => None,
        };

        let params = parameter_types.to_vec();
        let has_body = body.is_some();
        let body_slot = body.map(|body| {
            let shape = DelegateShape::for_member(Some(self.owner.this_type()), &params, DataType::Void);
            let slot = self.companion.define_method(".ctor", shape.clone());
            self.enqueue(Rc::clone(&slot), display.clone(), body, shape);
            slot
        });
        let init = trampoline::constructor(base, Rc::clone(&self.prologue), body_slot);

        let ctor = Rc::new(ConstructorInfo::new(
            self.owner.clone(),
            attributes,
            params,
            has_body,
            init,
            self.target.clone(),
        ));
        debug!(type_name = %self.owner.name, shape = %ctor.shape(), has_body, "defined constructor");
        self.signatures.insert(ctor.hash);
        self.constructors.push(Rc::clone(&ctor));
        self.members.push(MemberHandle::Constructor(Rc::clone(&ctor)));
        Ok(ctor)
    }

    // ==========================================================================
    // Properties
    // ==========================================================================

    /// Define a property. A missing accessor reads or writes a generated
    /// private backing field, which receives `initializer`.
    pub fn define_property(
        &mut self,
        name: &str,
        data_type: DataType,
        attributes: MemberAttributes,
        initializer: Option<C::Expr>,
        getter: Option<C::Expr>,
        setter: Option<C::Expr>,
    ) -> Result<PropertyHandle, ShapeError> {
        self.ensure_open()?;
        validate::member_name(name)?;
        validate::property_attributes(name, attributes)?;
        validate::storable(name, data_type)?;
        self.reject_on_interface("properties")?;
        if initializer.is_some() && getter.is_some() && setter.is_some() {
            return Err(ShapeError::ConflictingAttributes {
                member: name.to_string(),
                detail: "an initializer needs a backing field, but both accessors are supplied".to_string(),
            });
        }

        let get_name = format!("get_{name}");
        let set_name = format!("set_{name}");
        self.check_name(name, MemberKind::Property)?;
        self.check_name(&get_name, MemberKind::Method)?;
        self.check_name(&set_name, MemberKind::Method)?;
        self.check_signature(&get_name, TypeHash::from_method(self.owner.hash, &get_name, &[]))?;
        self.check_signature(
            &set_name,
            TypeHash::from_method(self.owner.hash, &set_name, &param_hashes(&[data_type])),
        )?;
        self.names.insert(name.to_string(), MemberKind::Property);

        let mut initializer = initializer;
        let mut backing: Option<FieldHandle> = None;
        let accessor_attributes = (attributes
            & (MemberAttributes::PUBLIC
                | MemberAttributes::PRIVATE
                | MemberAttributes::STATIC
                | MemberAttributes::VIRTUAL))
            | MemberAttributes::SPECIAL_NAME;

        let get_method = match getter {
            Some(body) => self.push_method(get_name, accessor_attributes, data_type, Vec::new(), Some(body)),
            None => {
                let field = self.backing_field(&mut backing, name, data_type, attributes, &mut initializer);
                let invoker = trampoline::field_getter(field);
                self.push_method_with(get_name, accessor_attributes, data_type, Vec::new(), false, invoker)
            }
        };
        let set_method = match setter {
            Some(body) => {
                self.push_method(set_name, accessor_attributes, DataType::Void, vec![data_type], Some(body))
            }
            None => {
                let field = self.backing_field(&mut backing, name, data_type, attributes, &mut initializer);
                let invoker = trampoline::field_setter(field);
                self.push_method_with(set_name, accessor_attributes, DataType::Void, vec![data_type], false, invoker)
            }
        };

        let property = Rc::new(PropertyInfo::new(
            self.owner.clone(),
            name,
            data_type,
            attributes,
            get_method,
            set_method,
            backing,
        ));
        debug!(type_name = %self.owner.name, property = name, %data_type, "defined property");
        self.properties.push(Rc::clone(&property));
        self.members.push(MemberHandle::Property(Rc::clone(&property)));
        Ok(property)
    }

    // ==========================================================================
    // Helpers
    // ==========================================================================

    pub(crate) fn ensure_open(&self) -> Result<(), ShapeError> {
        match self.state {
            DraftState::Open => Ok(()),
            DraftState::Created(_) => Err(ShapeError::AlreadyCreated {
                type_name: self.owner.name.clone(),
            }),
            DraftState::Failed(_) => Err(ShapeError::DraftFailed {
                type_name: self.owner.name.clone(),
            }),
        }
    }

    fn not_on_interface(&self, member: &str) -> ShapeError {
        ShapeError::NotAllowedOnInterface {
            type_name: self.owner.name.clone(),
            member: member.to_string(),
        }
    }

    fn reject_on_interface(&self, member: &str) -> Result<(), ShapeError> {
        if self.is_interface() {
            return Err(self.not_on_interface(member));
        }
        Ok(())
    }

    /// Fields and properties need a unique name; methods may share a name with other methods.
    fn check_name(&self, name: &str, kind: MemberKind) -> Result<(), ShapeError> {
        match self.names.get(name) {
            None => Ok(()),
            Some(MemberKind::Method) if kind == MemberKind::Method => Ok(()),
            Some(_) => Err(ShapeError::DuplicateMember {
                type_name: self.owner.name.clone(),
                name: name.to_string(),
            }),
        }
    }

    /// The generated backing field of a property, defined on first request.
    fn backing_field(
        &mut self,
        backing: &mut Option<FieldHandle>,
        property: &str,
        data_type: DataType,
        attributes: MemberAttributes,
        initializer: &mut Option<C::Expr>,
    ) -> FieldHandle {
        if let Some(field) = backing {
            return Rc::clone(field);
        }
        let field_name = format!("<{property}>k__BackingField");
        let field_attributes =
            (attributes & MemberAttributes::STATIC) | MemberAttributes::PRIVATE | MemberAttributes::HIDDEN;
        self.names.insert(field_name.clone(), MemberKind::Field);
        let field = self.push_field(field_name, data_type, field_attributes, initializer.take());
        *backing = Some(Rc::clone(&field));
        field
    }

    fn check_signature(&self, name: &str, hash: TypeHash) -> Result<(), ShapeError> {
        if self.signatures.contains(&hash) {
            return Err(ShapeError::DuplicateMember {
                type_name: self.owner.name.clone(),
                name: name.to_string(),
            });
        }
        Ok(())
    }

    fn enqueue(
        &mut self,
        target: Rc<ImplSlot>,
        member: String,
        body: C::Expr,
        shape: DelegateShape,
    ) {
        trace!(type_name = %self.owner.name, %member, impl_method = target.name(), %shape, "queued body");
        self.pending.push(PendingInitializer {
            target,
            member,
            body,
            shape,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{TestExpr, container};
    use quill_core::{RuntimeError, Value};

    const PUBLIC: MemberAttributes = MemberAttributes::PUBLIC;

    #[test]
    fn handles_are_live_before_create() {
        let container = container();
        let mut draft = container.define_type("T", &[]).unwrap();
        let stub = draft
            .define_method("Count", PUBLIC | MemberAttributes::STATIC, Some(DataType::Int32), &[], None)
            .unwrap();
        let forwarded = draft
            .define_method(
                "Later",
                PUBLIC | MemberAttributes::STATIC,
                Some(DataType::Int32),
                &[],
                Some(TestExpr::Const(Value::Int32(5))),
            )
            .unwrap();

        assert_eq!(stub.invoke(None, &[]).unwrap(), Value::Int32(0));
        assert!(matches!(
            forwarded.invoke(None, &[]).unwrap_err(),
            RuntimeError::BodyNotCompiled { .. }
        ));
        assert_eq!(draft.pending_count(), 1);
    }

    #[test]
    fn introspection_reflects_definition_order() {
        let container = container();
        let mut draft = container.define_type("T", &[]).unwrap();
        draft.define_field("a", DataType::Int32, PUBLIC, None).unwrap();
        draft.define_method("m", PUBLIC, None, &[], None).unwrap();
        draft.define_constructor(PUBLIC, &[DataType::Int32], None).unwrap();

        let kinds: Vec<MemberKind> = draft.members().iter().map(MemberHandle::kind).collect();
        assert_eq!(kinds, vec![MemberKind::Field, MemberKind::Method, MemberKind::Constructor]);
        assert_eq!(draft.fields().len(), 1);
        assert_eq!(draft.methods().len(), 1);
        assert_eq!(draft.constructors().len(), 1);
        assert!(!draft.is_created());
    }

    #[test]
    fn initializers_are_queued_in_definition_order() {
        let container = container();
        let mut draft = container.define_type("T", &[]).unwrap();
        draft
            .define_field("a", DataType::Int32, PUBLIC, Some(TestExpr::Const(Value::Int32(1))))
            .unwrap();
        draft
            .define_field(
                "s",
                DataType::Int32,
                PUBLIC | MemberAttributes::STATIC,
                Some(TestExpr::Const(Value::Int32(2))),
            )
            .unwrap();
        draft.define_field("plain", DataType::Int32, PUBLIC, None).unwrap();

        assert_eq!(draft.pending_count(), 2);
        assert_eq!(draft.prologue().len(), 1);
        assert_eq!(draft.static_initializer().map(InitializerRoutine::len), Some(1));
        let names: Vec<&str> = draft.companion().methods().iter().map(|m| m.name()).collect();
        assert_eq!(names, vec!["<a>b__0", "<s>b__1"]);
    }

    #[test]
    fn static_initializer_opens_only_for_static_initializers() {
        let container = container();
        let mut draft = container.define_type("T", &[]).unwrap();
        draft
            .define_field("a", DataType::Int32, PUBLIC, Some(TestExpr::Const(Value::Int32(1))))
            .unwrap();
        assert!(draft.static_initializer().is_none());
    }

    #[test]
    fn method_shapes_include_this_for_instance_members() {
        let container = container();
        let mut draft = container.define_type("T", &[]).unwrap();
        let this = draft.data_type();
        let method = draft
            .define_method("m", PUBLIC, Some(DataType::Bool), &[DataType::Int32], Some(TestExpr::LastArg))
            .unwrap();
        assert_eq!(method.shape().params, vec![this, DataType::Int32]);
        assert_eq!(draft.companion().methods()[0].shape(), &method.shape());
    }

    #[test]
    fn duplicate_names_fail_fast() {
        let container = container();
        let mut draft = container.define_type("T", &[]).unwrap();
        draft.define_field("x", DataType::Int32, PUBLIC, None).unwrap();
        assert!(matches!(
            draft.define_field("x", DataType::Int32, PUBLIC, None),
            Err(ShapeError::DuplicateMember { .. })
        ));
        assert!(matches!(
            draft.define_method("x", PUBLIC, None, &[], None),
            Err(ShapeError::DuplicateMember { .. })
        ));
        assert!(matches!(
            draft.define_property("x", DataType::Int32, PUBLIC, None, None, None),
            Err(ShapeError::DuplicateMember { .. })
        ));
    }

    #[test]
    fn overloads_need_distinct_parameters() {
        let container = container();
        let mut draft = container.define_type("T", &[]).unwrap();
        draft.define_method("m", PUBLIC, None, &[], None).unwrap();
        draft.define_method("m", PUBLIC, None, &[DataType::Int32], None).unwrap();
        assert!(matches!(
            draft.define_method("m", PUBLIC, Some(DataType::Bool), &[DataType::Int32], None),
            Err(ShapeError::DuplicateMember { .. })
        ));
        draft.define_constructor(PUBLIC, &[], None).unwrap();
        assert!(draft.define_constructor(PUBLIC, &[], None).is_err());
    }

    #[test]
    fn invalid_definitions_are_rejected() {
        let container = container();
        let mut draft = container.define_type("T", &[]).unwrap();
        assert!(matches!(
            draft.define_field("<x>", DataType::Int32, PUBLIC, None),
            Err(ShapeError::InvalidName { .. })
        ));
        assert!(matches!(
            draft.define_field("v", DataType::Void, PUBLIC, None),
            Err(ShapeError::InvalidType { .. })
        ));
        assert!(matches!(
            draft.define_method("m", PUBLIC | MemberAttributes::PRIVATE, None, &[], None),
            Err(ShapeError::ConflictingAttributes { .. })
        ));
        assert!(matches!(
            draft.define_method("a", PUBLIC | MemberAttributes::ABSTRACT, None, &[], None),
            Err(ShapeError::AbstractMemberOnConcreteType { .. })
        ));
        assert!(matches!(
            draft.define_constructor(MemberAttributes::STATIC, &[], None),
            Err(ShapeError::ConflictingAttributes { .. })
        ));
        assert!(draft.members().is_empty());
        assert_eq!(draft.pending_count(), 0);
    }

    #[test]
    fn interfaces_declare_abstract_methods_only() {
        let container = container();
        let mut draft = container.define_interface("IShape", &[]).unwrap();
        let area = draft
            .define_method("Area", MemberAttributes::empty(), Some(DataType::Float64), &[], None)
            .unwrap();
        assert!(area.attributes.contains(MemberAttributes::ABSTRACT | MemberAttributes::VIRTUAL));
        assert!(matches!(
            draft.define_field("f", DataType::Int32, PUBLIC, None),
            Err(ShapeError::NotAllowedOnInterface { .. })
        ));
        assert!(matches!(
            draft.define_constructor(PUBLIC, &[], None),
            Err(ShapeError::NotAllowedOnInterface { .. })
        ));
        assert!(matches!(
            draft.define_method("Body", PUBLIC, None, &[], Some(TestExpr::LastArg)),
            Err(ShapeError::NotAllowedOnInterface { .. })
        ));
    }

    #[test]
    fn auto_property_gets_hidden_backing_field_and_accessors() {
        let container = container();
        let mut draft = container.define_type("T", &[]).unwrap();
        let prop = draft
            .define_property("Name", DataType::String, PUBLIC, None, None, None)
            .unwrap();
        let backing = prop.backing_field().unwrap();
        assert_eq!(backing.name, "<Name>k__BackingField");
        assert!(backing.attributes.contains(MemberAttributes::PRIVATE | MemberAttributes::HIDDEN));
        assert_eq!(prop.getter().name, "get_Name");
        assert_eq!(prop.setter().name, "set_Name");
        assert!(prop.getter().attributes.contains(MemberAttributes::SPECIAL_NAME));
        assert_eq!(draft.methods().len(), 2);
        assert_eq!(draft.fields().len(), 1);
    }

    #[test]
    fn property_with_both_accessors_has_no_backing_field() {
        let container = container();
        let mut draft = container.define_type("T", &[]).unwrap();
        let prop = draft
            .define_property(
                "P",
                DataType::Int32,
                PUBLIC,
                None,
                Some(TestExpr::Const(Value::Int32(3))),
                Some(TestExpr::Const(Value::Void)),
            )
            .unwrap();
        assert!(prop.backing_field().is_none());
        assert_eq!(draft.pending_count(), 2);
        assert!(matches!(
            draft.define_property(
                "Q",
                DataType::Int32,
                PUBLIC,
                Some(TestExpr::Const(Value::Int32(1))),
                Some(TestExpr::Const(Value::Int32(1))),
                Some(TestExpr::Const(Value::Void)),
            ),
            Err(ShapeError::ConflictingAttributes { .. })
        ));
    }
}
