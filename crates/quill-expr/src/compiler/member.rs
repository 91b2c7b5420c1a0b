//! Member access, method calls, construction and assignment.

use std::rc::Rc;

use quill_core::{
    Binding, CompilationError, DataType, FieldHandle, Invoker, MemberAttributes, MemberOwner,
    ObjectRef, PropertyHandle, RuntimeError, TypeHash, TypeRef, Value, invoker,
};

use super::conversion::find_conversion;
use super::{BodyCompiler, Operand, Result, Typed};
use crate::ast::Expr;

/// What a member expression is applied to.
enum Target {
    /// A type: static members only.
    Static(TypeRef),
    /// An object value of a bound type.
    Instance(Typed, TypeRef),
}

impl Target {
    fn runtime_type(&self) -> &TypeRef {
        match self {
            Target::Static(ty) | Target::Instance(_, ty) => ty,
        }
    }

    fn receiver(&self) -> Option<Invoker> {
        match self {
            Target::Static(_) => None,
            Target::Instance(typed, _) => Some(Rc::clone(&typed.eval)),
        }
    }
}

/// A readable and writable member: a field or a property.
#[derive(Clone)]
enum Slot {
    Field(FieldHandle),
    Property(PropertyHandle),
}

impl Slot {
    fn data_type(&self) -> DataType {
        match self {
            Slot::Field(f) => f.data_type,
            Slot::Property(p) => p.data_type,
        }
    }

    fn is_static(&self) -> bool {
        match self {
            Slot::Field(f) => f.is_static(),
            Slot::Property(p) => p.is_static(),
        }
    }

    fn attributes(&self) -> MemberAttributes {
        match self {
            Slot::Field(f) => f.attributes,
            Slot::Property(p) => p.attributes,
        }
    }

    fn owner(&self) -> &MemberOwner {
        match self {
            Slot::Field(f) => &f.owner,
            Slot::Property(p) => &p.owner,
        }
    }

    fn get(&self, this: Option<&ObjectRef>) -> std::result::Result<Value, RuntimeError> {
        match self {
            Slot::Field(f) => f.get(this),
            Slot::Property(p) => p.get(this),
        }
    }

    fn set(&self, this: Option<&ObjectRef>, value: Value) -> std::result::Result<(), RuntimeError> {
        match self {
            Slot::Field(f) => f.set(this, value),
            Slot::Property(p) => p.set(this, value),
        }
    }
}

fn resolve_target(compiler: &BodyCompiler<'_>, operand: Operand, member: &str) -> Result<Target> {
    match operand {
        Operand::Type(ty) => Ok(Target::Static(ty)),
        Operand::Value(typed) => match typed.data_type {
            DataType::Object(hash) if !typed.is_null && hash != TypeHash::OBJECT => {
                let ty = compiler.lookup_type(hash)?;
                Ok(Target::Instance(typed, ty))
            }
            _ => Err(CompilationError::UnknownMember {
                type_name: compiler.describe(&typed),
                member: member.to_string(),
            }),
        },
    }
}

/// Private members are only reachable from bodies of their own type.
fn check_access(
    compiler: &BodyCompiler<'_>,
    attributes: MemberAttributes,
    owner: &MemberOwner,
    member: &str,
) -> Result<()> {
    if !attributes.contains(MemberAttributes::PRIVATE) {
        return Ok(());
    }
    let inside = compiler
        .env()
        .this_type()
        .is_some_and(|ty| ty.type_hash() == owner.hash);
    if inside {
        Ok(())
    } else {
        Err(CompilationError::InvalidOperation {
            message: format!("'{member}' is private to '{}'", owner.name),
        })
    }
}

fn lookup_slot(compiler: &BodyCompiler<'_>, target: &Target, name: &str) -> Result<Slot> {
    let ty = target.runtime_type();
    let slot = ty
        .find_field(name)
        .map(Slot::Field)
        .or_else(|| ty.find_property(name).map(Slot::Property))
        .ok_or_else(|| CompilationError::UnknownMember {
            type_name: ty.name().to_string(),
            member: name.to_string(),
        })?;
    if matches!(target, Target::Static(_)) && !slot.is_static() {
        return Err(CompilationError::InvalidOperation {
            message: format!("instance member '{name}' accessed through type '{}'", ty.name()),
        });
    }
    check_access(compiler, slot.attributes(), slot.owner(), name)?;
    Ok(slot)
}

/// Evaluate the receiver of an instance member. Static members still
/// evaluate it for its effects.
fn evaluate_receiver(
    receiver: Option<&Invoker>,
    is_static: bool,
    member: &str,
    frame: &[Value],
) -> std::result::Result<Option<ObjectRef>, RuntimeError> {
    let Some(receiver) = receiver else {
        return Ok(None);
    };
    let value = receiver(frame)?;
    if is_static {
        return Ok(None);
    }
    match value {
        Value::Object(obj) => Ok(Some(obj)),
        _ => Err(RuntimeError::NullReference {
            member: member.to_string(),
        }),
    }
}

fn evaluate_all(args: &[Typed], frame: &[Value]) -> std::result::Result<Vec<Value>, RuntimeError> {
    args.iter().map(|arg| arg.evaluate(frame)).collect()
}

/// Pick the overload for `args`: an exact match first, then the first
/// candidate every argument converts to.
fn select_overload<'c, T>(
    compiler: &BodyCompiler<'_>,
    name: &str,
    candidates: &'c [T],
    params_of: impl Fn(&T) -> &[DataType],
    args: Vec<Typed>,
) -> Result<(&'c T, Vec<Typed>)> {
    let same_arity: Vec<&T> = candidates
        .iter()
        .filter(|&candidate| params_of(candidate).len() == args.len())
        .collect();
    let Some(&first) = same_arity.first() else {
        return Err(CompilationError::ArityMismatch {
            name: name.to_string(),
            expected: candidates.first().map_or(0, |c| params_of(c).len()),
            got: args.len(),
        });
    };

    let exact = same_arity.iter().copied().find(|&candidate| {
        params_of(candidate)
            .iter()
            .zip(&args)
            .all(|(param, arg)| !arg.is_null && arg.data_type == *param)
    });
    let convertible = || {
        same_arity.iter().copied().find(|&candidate| {
            params_of(candidate)
                .iter()
                .zip(&args)
                .all(|(param, arg)| find_conversion(compiler, arg, param).is_some())
        })
    };
    let chosen = exact.or_else(convertible).unwrap_or(first);

    let converted = params_of(chosen)
        .iter()
        .zip(args)
        .enumerate()
        .map(|(index, (param, arg))| {
            compiler.coerce(arg, param, &format!("argument {index} of '{name}'"))
        })
        .collect::<Result<Vec<_>>>()?;
    Ok((chosen, converted))
}

// ============================================================================
// Expressions
// ============================================================================

pub(super) fn compile_member(compiler: &BodyCompiler<'_>, target: &Expr, name: &str) -> Result<Typed> {
    let operand = compiler.infer(target)?;
    if let Operand::Value(typed) = &operand
        && typed.data_type == DataType::String
        && !typed.is_null
        && name == "Length"
    {
        let eval = Rc::clone(&typed.eval);
        return Ok(Typed::new(
            DataType::Int32,
            invoker(move |frame| match eval(frame)? {
                Value::String(s) => Ok(Value::Int32(i32::try_from(s.chars().count()).unwrap_or(i32::MAX))),
                _ => Err(RuntimeError::NullReference {
                    member: "Length".to_string(),
                }),
            }),
        ));
    }

    let target = resolve_target(compiler, operand, name)?;
    let slot = lookup_slot(compiler, &target, name)?;
    let receiver = target.receiver();
    let name = name.to_string();
    Ok(Typed::new(
        slot.data_type(),
        invoker(move |frame| {
            let this = evaluate_receiver(receiver.as_ref(), slot.is_static(), &name, frame)?;
            slot.get(this.as_ref())
        }),
    ))
}

pub(super) fn compile_call(
    compiler: &BodyCompiler<'_>,
    target: &Expr,
    name: &str,
    args: &[Expr],
) -> Result<Typed> {
    let target = resolve_target(compiler, compiler.infer(target)?, name)?;
    let args = args
        .iter()
        .map(|arg| compiler.infer_value(arg))
        .collect::<Result<Vec<_>>>()?;

    let ty = target.runtime_type();
    let static_only = matches!(target, Target::Static(_));
    let candidates: Vec<_> = ty
        .methods_named(name)
        .into_iter()
        .filter(|method| !static_only || method.is_static())
        .collect();
    if candidates.is_empty() {
        return Err(CompilationError::UnknownMember {
            type_name: ty.name().to_string(),
            member: name.to_string(),
        });
    }
    let (method, args) = select_overload(compiler, name, &candidates, |m| m.params.as_slice(), args)?;
    check_access(compiler, method.attributes, &method.owner, name)?;

    let method = Rc::clone(method);
    let receiver = target.receiver();
    Ok(Typed::new(
        method.return_type,
        invoker(move |frame| {
            let this = evaluate_receiver(receiver.as_ref(), method.is_static(), &method.name, frame)?;
            let values = evaluate_all(&args, frame)?;
            method.invoke(this.as_ref(), &values)
        }),
    ))
}

pub(super) fn compile_new(compiler: &BodyCompiler<'_>, type_name: &str, args: &[Expr]) -> Result<Typed> {
    let ty = match compiler.env().lookup(type_name) {
        Some(Binding::Type(ty)) => ty.clone(),
        _ => compiler
            .env()
            .find_type(TypeHash::from_name(type_name))
            .cloned()
            .ok_or_else(|| CompilationError::UndefinedSymbol {
                name: type_name.to_string(),
            })?,
    };
    if ty.is_interface() || ty.is_abstract() {
        return Err(CompilationError::InvalidOperation {
            message: format!("cannot instantiate '{}'", ty.name()),
        });
    }
    let args = args
        .iter()
        .map(|arg| compiler.infer_value(arg))
        .collect::<Result<Vec<_>>>()?;

    let display = format!("{}.ctor", ty.name());
    if ty.constructors().is_empty() {
        return Err(CompilationError::UnknownMember {
            type_name: ty.name().to_string(),
            member: ".ctor".to_string(),
        });
    }
    let (ctor, args) = select_overload(compiler, &display, ty.constructors(), |c| c.params.as_slice(), args)?;
    check_access(compiler, ctor.attributes, &ctor.owner, &display)?;

    let ctor = Rc::clone(ctor);
    Ok(Typed::new(
        ty.data_type(),
        invoker(move |frame| {
            let values = evaluate_all(&args, frame)?;
            ctor.construct(&values).map(Value::Object)
        }),
    ))
}

pub(super) fn compile_assign(
    compiler: &BodyCompiler<'_>,
    target: &Expr,
    name: &str,
    value: &Expr,
) -> Result<Typed> {
    let target = resolve_target(compiler, compiler.infer(target)?, name)?;
    let slot = lookup_slot(compiler, &target, name)?;
    let value = compiler.infer_value(value)?;
    let value = compiler.coerce(value, &slot.data_type(), &format!("assignment to '{name}'"))?;

    let receiver = target.receiver();
    let name = name.to_string();
    Ok(Typed::new(
        slot.data_type(),
        invoker(move |frame| {
            let this = evaluate_receiver(receiver.as_ref(), slot.is_static(), &name, frame)?;
            let stored = value.evaluate(frame)?;
            slot.set(this.as_ref(), stored.clone())?;
            Ok(stored)
        }),
    ))
}

#[cfg(test)]
mod tests {
    use quill_core::{Binding, DataType, EmitError, MemberAttributes, RuntimeError, SymbolEnv, Value};
    use quill_emit::{AssemblyContainer, ContainerOptions};

    use crate::{Expr, ExprCompiler};

    fn container() -> AssemblyContainer<ExprCompiler> {
        AssemblyContainer::new(ExprCompiler, ContainerOptions::default())
    }

    #[test]
    fn instance_method_updates_field_through_this() {
        let container = container();
        let mut draft = container.define_type("Counter", &[]).unwrap();
        draft
            .define_field("count", DataType::Int32, MemberAttributes::PRIVATE, None)
            .unwrap();
        let increment = draft
            .define_method(
                "Increment",
                MemberAttributes::PUBLIC,
                Some(DataType::Int32),
                &[],
                Some(Expr::this().assign(
                    "count",
                    Expr::add(Expr::this().member("count"), Expr::int(1)),
                )),
            )
            .unwrap();
        let ty = draft.create(None).unwrap();

        let obj = ty.instantiate(&[]).unwrap();
        increment.invoke(Some(&obj), &[]).unwrap();
        assert_eq!(increment.invoke(Some(&obj), &[]).unwrap(), Value::Int32(2));
    }

    #[test]
    fn static_members_are_reached_through_the_type_name() {
        let container = container();
        let mut draft = container.define_type("Registry", &[]).unwrap();
        draft
            .define_field(
                "created",
                DataType::Int32,
                MemberAttributes::PUBLIC | MemberAttributes::STATIC,
                Some(Expr::int(10)),
            )
            .unwrap();
        let next = draft
            .define_method(
                "Next",
                MemberAttributes::PUBLIC | MemberAttributes::STATIC,
                Some(DataType::Int32),
                &[],
                Some(Expr::symbol("Registry").assign(
                    "created",
                    Expr::add(Expr::symbol("Registry").member("created"), Expr::int(1)),
                )),
            )
            .unwrap();
        draft.create(None).unwrap();

        assert_eq!(next.invoke(None, &[]).unwrap(), Value::Int32(11));
        assert_eq!(next.invoke(None, &[]).unwrap(), Value::Int32(12));
    }

    #[test]
    fn bodies_construct_and_call_other_types() {
        let container = container();
        let mut point = container.define_type("Point", &[]).unwrap();
        point.define_field("x", DataType::Int32, MemberAttributes::PUBLIC, None).unwrap();
        point
            .define_constructor(
                MemberAttributes::PUBLIC,
                &[DataType::Int32],
                Some(Expr::this().assign("x", Expr::param(1))),
            )
            .unwrap();
        point
            .define_method(
                "Doubled",
                MemberAttributes::PUBLIC,
                Some(DataType::Int32),
                &[],
                Some(Expr::mul(Expr::this().member("x"), Expr::int(2))),
            )
            .unwrap();
        let point = point.create(None).unwrap();

        let env = SymbolEnv::new().child("Point", Binding::Type(point));
        let mut factory = container.define_type("Factory", &[]).unwrap();
        let make = factory
            .define_method(
                "Make",
                MemberAttributes::PUBLIC | MemberAttributes::STATIC,
                Some(DataType::Int32),
                &[DataType::Int32],
                Some(Expr::new_object("Point", vec![Expr::param(0)]).call("Doubled", vec![])),
            )
            .unwrap();
        factory.create(Some(&env)).unwrap();

        assert_eq!(make.invoke(None, &[Value::Int32(21)]).unwrap(), Value::Int32(42));
    }

    #[test]
    fn overloads_are_selected_by_argument_type() {
        let container = container();
        let mut draft = container.define_type("Printer", &[]).unwrap();
        for (param, label) in [(DataType::Int32, "int"), (DataType::String, "string")] {
            draft
                .define_method(
                    "Describe",
                    MemberAttributes::PUBLIC | MemberAttributes::STATIC,
                    Some(DataType::String),
                    &[param],
                    Some(Expr::string(label)),
                )
                .unwrap();
        }
        let pick = draft
            .define_method(
                "Pick",
                MemberAttributes::PUBLIC | MemberAttributes::STATIC,
                Some(DataType::String),
                &[],
                Some(Expr::add(
                    Expr::symbol("Printer").call("Describe", vec![Expr::string("s")]),
                    Expr::symbol("Printer").call("Describe", vec![Expr::int(1)]),
                )),
            )
            .unwrap();
        draft.create(None).unwrap();

        assert_eq!(pick.invoke(None, &[]).unwrap(), Value::string("stringint"));
    }

    #[test]
    fn private_members_are_hidden_from_other_types() {
        let container = container();
        let mut vault = container.define_type("Vault", &[]).unwrap();
        vault
            .define_field("secret", DataType::Int32, MemberAttributes::PRIVATE, None)
            .unwrap();
        let vault = vault.create(None).unwrap();

        let env = SymbolEnv::new().child("Vault", Binding::Type(vault.clone()));
        let mut thief = container.define_type("Thief", &[]).unwrap();
        thief
            .define_method(
                "Steal",
                MemberAttributes::PUBLIC | MemberAttributes::STATIC,
                Some(DataType::Int32),
                &[vault.data_type()],
                Some(Expr::param(0).member("secret")),
            )
            .unwrap();
        let err = thief.create(Some(&env)).unwrap_err();
        assert!(err.is_compilation());
    }

    #[test]
    fn null_receiver_fails_at_runtime() {
        let container = container();
        let mut node = container.define_type("Node", &[]).unwrap();
        let node_type = node.data_type();
        node.define_field("next", node_type, MemberAttributes::PUBLIC, None).unwrap();
        node.define_field("value", DataType::Int32, MemberAttributes::PUBLIC, None).unwrap();
        let peek = node
            .define_method(
                "PeekNext",
                MemberAttributes::PUBLIC,
                Some(DataType::Int32),
                &[],
                Some(Expr::this().member("next").member("value")),
            )
            .unwrap();
        let ty = node.create(None).unwrap();

        let obj = ty.instantiate(&[]).unwrap();
        assert!(matches!(
            peek.invoke(Some(&obj), &[]),
            Err(RuntimeError::NullReference { member }) if member == "value"
        ));
    }

    #[test]
    fn unknown_members_fail_compilation() {
        let container = container();
        let mut draft = container.define_type("Empty", &[]).unwrap();
        draft
            .define_method(
                "Broken",
                MemberAttributes::PUBLIC,
                Some(DataType::Int32),
                &[],
                Some(Expr::this().member("missing")),
            )
            .unwrap();
        assert!(matches!(
            draft.create(None),
            Err(EmitError::Compilation { member, .. }) if member == "Broken"
        ));
    }
}
