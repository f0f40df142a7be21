//! Handles into the type table and into a method's frame.
//!
//! All handles are plain indices. Relations between definitions (super
//! class, field owner, invoked method) are stored as handles and resolved
//! through the [`TypeTable`](crate::TypeTable).

use std::fmt;

/// Index of a [`TypeDef`](crate::TypeDef) in the type table.
///
/// The eight primitives, `void` and the null type have fixed indices, so
/// they can be named without a table lookup.
#[derive(Copy, Clone, Eq, PartialEq, Hash, PartialOrd, Ord)]
#[repr(transparent)]
pub struct TypeId(u32);

impl TypeId {
    pub const BOOL: Self = Self(0);
    pub const BYTE: Self = Self(1);
    pub const SHORT: Self = Self(2);
    pub const CHAR: Self = Self(3);
    pub const INT: Self = Self(4);
    pub const LONG: Self = Self(5);
    pub const FLOAT: Self = Self(6);
    pub const DOUBLE: Self = Self(7);
    pub const VOID: Self = Self(8);
    /// Type of the `null` literal.
    pub const NULL: Self = Self(9);

    pub const PRIMITIVE_COUNT: u32 = 8;

    /// First index handed out for arrays, pointers and declared types.
    pub const FIRST_DYNAMIC: u32 = 10;

    #[allow(clippy::cast_possible_truncation)]
    pub(crate) const fn from_index(index: usize) -> Self {
        Self(index as u32)
    }

    #[inline]
    pub const fn index(self) -> usize {
        self.0 as usize
    }

    #[inline]
    pub const fn is_primitive(self) -> bool {
        self.0 < Self::PRIMITIVE_COUNT
    }
}

impl fmt::Debug for TypeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TypeId({})", self.0)
    }
}

/// Method or constructor of a declared type.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub struct MethodRef {
    pub owner: TypeId,
    pub kind: MethodKind,
    pub index: u32,
}

#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum MethodKind {
    Method,
    Constructor,
}

/// Field of a declared type.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub struct FieldRef {
    pub owner: TypeId,
    pub index: u32,
}

/// Parameter or local variable of one method.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum Var {
    Param(u32),
    Local(u32),
}

/// Jump target inside one method body.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub struct Label(pub u32);

pub(crate) fn to_u32(index: usize) -> u32 {
    u32::try_from(index).unwrap_or(u32::MAX)
}
