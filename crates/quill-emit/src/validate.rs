//! Shape validation for names, attributes and member types.

use quill_core::{DataType, MemberAttributes, ShapeError, TypeHash, primitives};

fn invalid(name: &str, reason: &str) -> ShapeError {
    ShapeError::InvalidName {
        name: name.to_string(),
        reason: reason.to_string(),
    }
}

/// Member names: a letter or underscore followed by letters, digits or underscores.
pub fn member_name(name: &str) -> Result<(), ShapeError> {
    let mut chars = name.chars();
    match chars.next() {
        None => return Err(invalid(name, "name is empty")),
        Some(c) if !(c.is_alphabetic() || c == '_') => {
            return Err(invalid(name, "must start with a letter or underscore"));
        }
        Some(_) => {}
    }
    if chars.any(|c| !(c.is_alphanumeric() || c == '_')) {
        return Err(invalid(name, "may only contain letters, digits and underscores"));
    }
    Ok(())
}

/// Hashes of the built-in types. A user type must never share one.
const BUILT_IN: [TypeHash; 8] = [
    TypeHash::OBJECT,
    primitives::VOID,
    primitives::BOOL,
    primitives::CHAR,
    primitives::INT32,
    primitives::INT64,
    primitives::FLOAT64,
    primitives::STRING,
];

/// Type names: dot-separated member names, e.g. `Game.Player`, other than
/// the names of built-in types.
pub fn type_name(name: &str) -> Result<(), ShapeError> {
    if name.is_empty() {
        return Err(invalid(name, "name is empty"));
    }
    for segment in name.split('.') {
        member_name(segment).map_err(|_| invalid(name, "each dot-separated segment must be an identifier"))?;
    }
    if BUILT_IN.contains(&TypeHash::from_name(name)) {
        return Err(invalid(name, "reserved for a built-in type"));
    }
    Ok(())
}

fn conflict(member: &str, detail: &str) -> ShapeError {
    ShapeError::ConflictingAttributes {
        member: member.to_string(),
        detail: detail.to_string(),
    }
}

fn visibility(member: &str, attributes: MemberAttributes) -> Result<(), ShapeError> {
    if attributes.contains(MemberAttributes::PUBLIC | MemberAttributes::PRIVATE) {
        return Err(conflict(member, "PUBLIC and PRIVATE are mutually exclusive"));
    }
    if attributes.intersects(MemberAttributes::SPECIAL_NAME | MemberAttributes::HIDDEN) {
        return Err(conflict(member, "SPECIAL_NAME and HIDDEN are reserved for generated members"));
    }
    Ok(())
}

/// Field attributes: no dispatch flags.
pub fn field_attributes(member: &str, attributes: MemberAttributes) -> Result<(), ShapeError> {
    visibility(member, attributes)?;
    if attributes.is_dispatched() {
        return Err(conflict(member, "fields cannot be VIRTUAL or ABSTRACT"));
    }
    Ok(())
}

/// Method attributes given whether a body was supplied.
pub fn method_attributes(
    member: &str,
    attributes: MemberAttributes,
    has_body: bool,
) -> Result<(), ShapeError> {
    visibility(member, attributes)?;
    if attributes.is_static() && attributes.is_dispatched() {
        return Err(conflict(member, "STATIC cannot be combined with VIRTUAL or ABSTRACT"));
    }
    if attributes.contains(MemberAttributes::ABSTRACT) && has_body {
        return Err(conflict(member, "ABSTRACT methods cannot have a body"));
    }
    if attributes.contains(MemberAttributes::ABSTRACT) && attributes.contains(MemberAttributes::PRIVATE) {
        return Err(conflict(member, "ABSTRACT methods cannot be PRIVATE"));
    }
    Ok(())
}

/// Constructor attributes: visibility only.
pub fn constructor_attributes(member: &str, attributes: MemberAttributes) -> Result<(), ShapeError> {
    visibility(member, attributes)?;
    if attributes.is_static() {
        return Err(conflict(member, "static constructors are not supported"));
    }
    if attributes.is_dispatched() {
        return Err(conflict(member, "constructors cannot be VIRTUAL or ABSTRACT"));
    }
    Ok(())
}

/// Property attributes: everything a method allows except ABSTRACT.
pub fn property_attributes(member: &str, attributes: MemberAttributes) -> Result<(), ShapeError> {
    visibility(member, attributes)?;
    if attributes.contains(MemberAttributes::ABSTRACT) {
        return Err(conflict(member, "properties cannot be ABSTRACT"));
    }
    if attributes.is_static() && attributes.is_dispatched() {
        return Err(conflict(member, "STATIC cannot be combined with VIRTUAL"));
    }
    Ok(())
}

/// Types that can be stored: anything but `void`.
pub fn storable(member: &str, data_type: DataType) -> Result<(), ShapeError> {
    if data_type.is_void() {
        return Err(ShapeError::InvalidType {
            member: member.to_string(),
            detail: "void cannot be stored".to_string(),
        });
    }
    Ok(())
}

pub fn parameters(member: &str, params: &[DataType]) -> Result<(), ShapeError> {
    for (index, param) in params.iter().enumerate() {
        if param.is_void() {
            return Err(ShapeError::InvalidType {
                member: member.to_string(),
                detail: format!("parameter {index} is void"),
            });
        }
    }
    Ok(())
}
