//! Delegate shapes: the parameter and return types a compiled body must have.

use std::fmt;

use crate::DataType;

/// Ordered parameter types plus return type.
///
/// For instance members the first parameter is the `this` slot.
///
/// ```
/// use quill_core::{DataType, DelegateShape};
///
/// let shape = DelegateShape::new(vec![DataType::Int32], DataType::Bool);
/// assert_eq!(shape.to_string(), "(int) -> bool");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DelegateShape {
    pub params: Vec<DataType>,
    pub return_type: DataType,
}

impl DelegateShape {
    pub fn new(params: Vec<DataType>, return_type: DataType) -> Self {
        Self {
            params,
            return_type,
        }
    }

    /// Shape of a member: the optional `this` slot followed by the declared parameters.
    pub fn for_member(this: Option<DataType>, params: &[DataType], return_type: DataType) -> Self {
        let mut all = Vec::with_capacity(params.len() + 1);
        all.extend(this);
        all.extend_from_slice(params);
        Self::new(all, return_type)
    }

    pub fn arity(&self) -> usize {
        self.params.len()
    }
}

impl fmt::Display for DelegateShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "(")?;
        for (i, param) in self.params.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{param}")?;
        }
        write!(f, ") -> {}", self.return_type)
    }
}
