//! Member handles: fields, methods, constructors and properties.
//!
//! A handle is live from the moment the draft hands it out. Method and
//! constructor handles carry an [`Invoker`]; until the owning type is created
//! that invoker either returns a default value or reports
//! [`RuntimeError::BodyNotCompiled`].

use std::fmt;
use std::rc::Rc;

use crate::data_type::param_hashes;
use crate::{
    DataType, DelegateShape, Invoker, MemberAttributes, ObjectRef, RuntimeError, ScriptObject,
    StaticStorage, TypeHash, TypeSlot, Value,
};

pub type FieldHandle = Rc<FieldInfo>;
pub type MethodHandle = Rc<MethodInfo>;
pub type ConstructorHandle = Rc<ConstructorInfo>;
pub type PropertyHandle = Rc<PropertyInfo>;

/// Identity of the type declaring a member.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemberOwner {
    pub hash: TypeHash,
    pub name: String,
}

impl MemberOwner {
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            hash: TypeHash::from_name(&name),
            name,
        }
    }

    /// The `this` slot type for instance members.
    pub fn this_type(&self) -> DataType {
        DataType::Object(self.hash)
    }

    /// Resolve `value` as an instance of this owner.
    pub fn expect_instance<'a>(
        &self,
        member: &str,
        value: &'a Value,
    ) -> Result<&'a ObjectRef, RuntimeError> {
        match value {
            Value::Object(obj) if obj.runtime_type().derives_from(self.hash) => Ok(obj),
            Value::Object(obj) => Err(RuntimeError::WrongInstance {
                member: member.to_string(),
                expected_type: self.name.clone(),
                found_type: obj.runtime_type().name().to_string(),
            }),
            Value::Null | Value::Void => Err(RuntimeError::NullThis {
                member: member.to_string(),
            }),
            other => Err(RuntimeError::WrongInstance {
                member: member.to_string(),
                expected_type: self.name.clone(),
                found_type: other.type_name(),
            }),
        }
    }
}

/// Check an argument list against declared parameter types.
pub fn check_arguments(member: &str, params: &[DataType], args: &[Value]) -> Result<(), RuntimeError> {
    if params.len() != args.len() {
        return Err(RuntimeError::ArityMismatch {
            member: member.to_string(),
            expected: params.len(),
            got: args.len(),
        });
    }
    for (index, (param, arg)) in params.iter().zip(args).enumerate() {
        if !arg.is_assignable_to(param) {
            return Err(RuntimeError::ArgumentType {
                member: member.to_string(),
                index,
                expected: *param,
                found: arg.type_name(),
            });
        }
    }
    Ok(())
}

fn with_this(this: Option<&ObjectRef>, args: &[Value]) -> Vec<Value> {
    let mut full = Vec::with_capacity(args.len() + 1);
    if let Some(obj) = this {
        full.push(Value::Object(Rc::clone(obj)));
    }
    full.extend_from_slice(args);
    full
}

// ============================================================================
// Fields
// ============================================================================

/// Where a field's value lives.
#[derive(Debug, Clone)]
pub enum FieldStorage {
    /// Slot in every instance (base fields first).
    Instance { slot: usize },
    /// Slot in the declaring type's static storage.
    Static { slot: usize, storage: Rc<StaticStorage> },
}

/// A field of a runtime type.
#[derive(Debug)]
pub struct FieldInfo {
    pub name: String,
    pub hash: TypeHash,
    pub owner: MemberOwner,
    pub data_type: DataType,
    pub attributes: MemberAttributes,
    /// Whether an initializer expression was supplied.
    pub has_initializer: bool,
    storage: FieldStorage,
}

impl FieldInfo {
    pub fn new(
        owner: MemberOwner,
        name: impl Into<String>,
        data_type: DataType,
        attributes: MemberAttributes,
        has_initializer: bool,
        storage: FieldStorage,
    ) -> Self {
        let name = name.into();
        Self {
            hash: TypeHash::from_field(owner.hash, &name),
            name,
            owner,
            data_type,
            attributes,
            has_initializer,
            storage,
        }
    }

    pub fn is_static(&self) -> bool {
        matches!(self.storage, FieldStorage::Static { .. })
    }

    pub fn storage(&self) -> &FieldStorage {
        &self.storage
    }

    /// Read the field. `this` is ignored for static fields.
    pub fn get(&self, this: Option<&ObjectRef>) -> Result<Value, RuntimeError> {
        match &self.storage {
            FieldStorage::Static { slot, storage } => storage.read(*slot),
            FieldStorage::Instance { slot } => self.instance(this)?.read_slot(*slot),
        }
    }

    /// Write the field. The value must be assignable to the field type.
    pub fn set(&self, this: Option<&ObjectRef>, value: Value) -> Result<(), RuntimeError> {
        if !value.is_assignable_to(&self.data_type) {
            return Err(RuntimeError::ArgumentType {
                member: self.name.clone(),
                index: 0,
                expected: self.data_type,
                found: value.type_name(),
            });
        }
        match &self.storage {
            FieldStorage::Static { slot, storage } => storage.write(*slot, value),
            FieldStorage::Instance { slot } => self.instance(this)?.write_slot(*slot, value),
        }
    }

    pub fn get_static(&self) -> Result<Value, RuntimeError> {
        self.get(None)
    }

    pub fn set_static(&self, value: Value) -> Result<(), RuntimeError> {
        self.set(None, value)
    }

    fn instance<'a>(&self, this: Option<&'a ObjectRef>) -> Result<&'a ScriptObject, RuntimeError> {
        let obj = this.ok_or_else(|| RuntimeError::NullThis {
            member: self.name.clone(),
        })?;
        if !obj.runtime_type().derives_from(self.owner.hash) {
            return Err(RuntimeError::WrongInstance {
                member: self.name.clone(),
                expected_type: self.owner.name.clone(),
                found_type: obj.runtime_type().name().to_string(),
            });
        }
        Ok(&**obj)
    }
}

// ============================================================================
// Methods
// ============================================================================

/// A method of a runtime type.
pub struct MethodInfo {
    pub name: String,
    pub hash: TypeHash,
    /// Owner-independent signature used for override and interface matching.
    pub slot: TypeHash,
    pub owner: MemberOwner,
    pub attributes: MemberAttributes,
    pub return_type: DataType,
    pub params: Vec<DataType>,
    /// Whether a body expression was supplied.
    pub has_body: bool,
    invoker: Invoker,
    /// The declaring type's static storage, which also tracks its usability.
    statics: Rc<StaticStorage>,
}

impl MethodInfo {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        owner: MemberOwner,
        name: impl Into<String>,
        attributes: MemberAttributes,
        return_type: DataType,
        params: Vec<DataType>,
        has_body: bool,
        invoker: Invoker,
        statics: Rc<StaticStorage>,
    ) -> Self {
        let name = name.into();
        let hashes = param_hashes(&params);
        Self {
            hash: TypeHash::from_method(owner.hash, &name, &hashes),
            slot: TypeHash::from_slot(&name, &hashes),
            name,
            owner,
            attributes,
            return_type,
            params,
            has_body,
            invoker,
            statics,
        }
    }

    pub fn is_static(&self) -> bool {
        self.attributes.is_static()
    }

    /// Full shape of the method, including the `this` slot for instance methods.
    pub fn shape(&self) -> DelegateShape {
        let this = (!self.is_static()).then(|| self.owner.this_type());
        DelegateShape::for_member(this, &self.params, self.return_type)
    }

    /// Invoke with an explicit instance and the declared arguments.
    pub fn invoke(&self, this: Option<&ObjectRef>, args: &[Value]) -> Result<Value, RuntimeError> {
        let this = if self.is_static() {
            None
        } else {
            Some(this.ok_or_else(|| RuntimeError::NullThis {
                member: self.name.clone(),
            })?)
        };
        self.call(&with_this(this, args))
    }

    /// Invoke with the full argument list (`this` first for instance methods).
    ///
    /// Virtual and abstract methods dispatch to the most-derived override
    /// visible from the instance's type.
    pub fn call(&self, args: &[Value]) -> Result<Value, RuntimeError> {
        self.statics.check_usable()?;
        let declared = if self.is_static() {
            args
        } else {
            let (this, rest) = args.split_first().ok_or_else(|| RuntimeError::NullThis {
                member: self.name.clone(),
            })?;
            let obj = self.owner.expect_instance(&self.name, this)?;
            if self.attributes.is_dispatched() {
                if let Some(target) = obj.runtime_type().resolve_override(self.slot) {
                    if target.hash != self.hash {
                        return target.call(args);
                    }
                }
            }
            rest
        };
        check_arguments(&self.name, &self.params, declared)?;

        let result = (self.invoker)(args)?;
        if self.return_type.is_void() {
            return Ok(Value::Void);
        }
        if !result.is_assignable_to(&self.return_type) {
            return Err(RuntimeError::ReturnType {
                member: self.name.clone(),
                expected: self.return_type,
                found: result.type_name(),
            });
        }
        Ok(result)
    }

    /// The raw invoker, bypassing argument checks and dispatch.
    pub fn invoker(&self) -> &Invoker {
        &self.invoker
    }
}

impl fmt::Debug for MethodInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MethodInfo")
            .field("name", &self.name)
            .field("owner", &self.owner.name)
            .field("attributes", &self.attributes)
            .field("shape", &self.shape())
            .field("has_body", &self.has_body)
            .finish()
    }
}

// ============================================================================
// Constructors
// ============================================================================

/// A constructor of a runtime type.
pub struct ConstructorInfo {
    pub hash: TypeHash,
    pub owner: MemberOwner,
    pub attributes: MemberAttributes,
    pub params: Vec<DataType>,
    pub has_body: bool,
    /// Runs base construction, field initializers and the body on an allocated instance.
    init: Invoker,
    target: TypeSlot,
}

impl ConstructorInfo {
    pub fn new(
        owner: MemberOwner,
        attributes: MemberAttributes,
        params: Vec<DataType>,
        has_body: bool,
        init: Invoker,
        target: TypeSlot,
    ) -> Self {
        Self {
            hash: TypeHash::from_constructor(owner.hash, &param_hashes(&params)),
            owner,
            attributes,
            params,
            has_body,
            init,
            target,
        }
    }

    /// Shape of the constructor body: `(this, params...) -> void`.
    pub fn shape(&self) -> DelegateShape {
        DelegateShape::for_member(Some(self.owner.this_type()), &self.params, DataType::Void)
    }

    pub fn display_name(&self) -> String {
        format!("{}.ctor", self.owner.name)
    }

    /// Allocate and construct a new instance.
    pub fn construct(&self, args: &[Value]) -> Result<ObjectRef, RuntimeError> {
        let ty = self.target.get().ok_or_else(|| RuntimeError::TypeNotCreated {
            type_name: self.owner.name.clone(),
        })?;
        ty.check_instantiable()?;
        check_arguments(&self.display_name(), &self.params, args)?;
        ty.statics().ensure_initialized()?;

        let obj = ScriptObject::allocate(ty);
        (self.init)(&with_this(Some(&obj), args))?;
        Ok(obj)
    }

    /// Run this constructor on an already allocated instance (base chaining).
    pub fn initialize(&self, this: &ObjectRef, args: &[Value]) -> Result<(), RuntimeError> {
        check_arguments(&self.display_name(), &self.params, args)?;
        self.owner.expect_instance(&self.display_name(), &Value::Object(Rc::clone(this)))?;
        (self.init)(&with_this(Some(this), args))?;
        Ok(())
    }
}

impl fmt::Debug for ConstructorInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConstructorInfo")
            .field("owner", &self.owner.name)
            .field("params", &self.params)
            .field("has_body", &self.has_body)
            .finish()
    }
}

// ============================================================================
// Properties
// ============================================================================

/// A property: a getter/setter pair, optionally backed by a generated field.
#[derive(Debug)]
pub struct PropertyInfo {
    pub name: String,
    pub owner: MemberOwner,
    pub data_type: DataType,
    pub attributes: MemberAttributes,
    getter: MethodHandle,
    setter: MethodHandle,
    backing_field: Option<FieldHandle>,
}

impl PropertyInfo {
    pub fn new(
        owner: MemberOwner,
        name: impl Into<String>,
        data_type: DataType,
        attributes: MemberAttributes,
        getter: MethodHandle,
        setter: MethodHandle,
        backing_field: Option<FieldHandle>,
    ) -> Self {
        Self {
            name: name.into(),
            owner,
            data_type,
            attributes,
            getter,
            setter,
            backing_field,
        }
    }

    pub fn is_static(&self) -> bool {
        self.attributes.is_static()
    }

    pub fn getter(&self) -> &MethodHandle {
        &self.getter
    }

    pub fn setter(&self) -> &MethodHandle {
        &self.setter
    }

    pub fn backing_field(&self) -> Option<&FieldHandle> {
        self.backing_field.as_ref()
    }

    pub fn get(&self, this: Option<&ObjectRef>) -> Result<Value, RuntimeError> {
        self.getter.invoke(this, &[])
    }

    pub fn set(&self, this: Option<&ObjectRef>, value: Value) -> Result<(), RuntimeError> {
        self.setter.invoke(this, &[value]).map(|_| ())
    }
}
