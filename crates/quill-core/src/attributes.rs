//! Attribute flags for drafted types and their members.

use bitflags::bitflags;

bitflags! {
    /// Flags describing a drafted type.
    ///
    /// ```
    /// use quill_core::TypeAttributes;
    ///
    /// let attrs = TypeAttributes::PUBLIC | TypeAttributes::SEALED;
    /// assert!(attrs.contains(TypeAttributes::SEALED));
    /// ```
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct TypeAttributes: u32 {
        /// Visible outside the module.
        const PUBLIC = 1 << 0;
        /// Cannot be used as a base type.
        const SEALED = 1 << 1;
        /// Cannot be instantiated; may declare abstract members.
        const ABSTRACT = 1 << 2;
        /// Interface: methods only, no state, no constructors.
        const INTERFACE = 1 << 3;
    }
}

bitflags! {
    /// Flags describing a field, method, constructor or property.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct MemberAttributes: u32 {
        const PUBLIC = 1 << 0;
        const PRIVATE = 1 << 1;
        /// Belongs to the type rather than to an instance.
        const STATIC = 1 << 2;
        /// Calls dispatch to the most-derived override.
        const VIRTUAL = 1 << 3;
        /// No implementation; only allowed on abstract types and interfaces.
        const ABSTRACT = 1 << 4;
        /// Compiler-generated name (property accessors).
        const SPECIAL_NAME = 1 << 5;
        /// Excluded from public introspection.
        const HIDDEN = 1 << 6;
    }
}

impl MemberAttributes {
    pub fn is_static(self) -> bool {
        self.contains(MemberAttributes::STATIC)
    }

    pub fn is_public(self) -> bool {
        self.contains(MemberAttributes::PUBLIC)
    }

    /// Virtual or abstract members take part in override dispatch.
    pub fn is_dispatched(self) -> bool {
        self.intersects(MemberAttributes::VIRTUAL | MemberAttributes::ABSTRACT)
    }
}

impl TypeAttributes {
    pub fn is_interface(self) -> bool {
        self.contains(TypeAttributes::INTERFACE)
    }
}
