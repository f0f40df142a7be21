//! The eight primitive types.

use crate::TypeId;

#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum Primitive {
    Bool,
    Byte,
    Short,
    Char,
    Int,
    Long,
    Float,
    Double,
}

impl Primitive {
    /// In [`TypeId`] order.
    pub const ALL: [Primitive; 8] = [
        Primitive::Bool,
        Primitive::Byte,
        Primitive::Short,
        Primitive::Char,
        Primitive::Int,
        Primitive::Long,
        Primitive::Float,
        Primitive::Double,
    ];

    pub const fn id(self) -> TypeId {
        match self {
            Primitive::Bool => TypeId::BOOL,
            Primitive::Byte => TypeId::BYTE,
            Primitive::Short => TypeId::SHORT,
            Primitive::Char => TypeId::CHAR,
            Primitive::Int => TypeId::INT,
            Primitive::Long => TypeId::LONG,
            Primitive::Float => TypeId::FLOAT,
            Primitive::Double => TypeId::DOUBLE,
        }
    }

    pub fn from_id(id: TypeId) -> Option<Primitive> {
        Primitive::ALL.get(id.index()).copied()
    }

    /// Primitive named by a type specification. `bool` and `boolean` are
    /// both accepted.
    pub fn from_name(name: &str) -> Option<Primitive> {
        match name {
            "bool" | "boolean" => Some(Primitive::Bool),
            "byte" => Some(Primitive::Byte),
            "short" => Some(Primitive::Short),
            "char" => Some(Primitive::Char),
            "int" => Some(Primitive::Int),
            "long" => Some(Primitive::Long),
            "float" => Some(Primitive::Float),
            "double" => Some(Primitive::Double),
            _ => None,
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            Primitive::Bool => "bool",
            Primitive::Byte => "byte",
            Primitive::Short => "short",
            Primitive::Char => "char",
            Primitive::Int => "int",
            Primitive::Long => "long",
            Primitive::Float => "float",
            Primitive::Double => "double",
        }
    }

    /// Local variable slots taken by a value of this type.
    pub const fn slots(self) -> u32 {
        match self {
            Primitive::Long | Primitive::Double => 2,
            _ => 1,
        }
    }

    /// Width of the constant encoding in bytes.
    pub const fn byte_width(self) -> usize {
        match self {
            Primitive::Bool | Primitive::Byte => 1,
            Primitive::Short | Primitive::Char => 2,
            Primitive::Int | Primitive::Float => 4,
            Primitive::Long | Primitive::Double => 8,
        }
    }

    pub const fn is_numeric(self) -> bool {
        !matches!(self, Primitive::Bool)
    }

    pub const fn is_integral(self) -> bool {
        matches!(
            self,
            Primitive::Byte | Primitive::Short | Primitive::Char | Primitive::Int | Primitive::Long
        )
    }

    /// Class used when a value of this type is boxed.
    pub const fn wrapper(self) -> &'static str {
        match self {
            Primitive::Bool => "java.lang.Boolean",
            Primitive::Byte => "java.lang.Byte",
            Primitive::Short => "java.lang.Short",
            Primitive::Char => "java.lang.Character",
            Primitive::Int => "java.lang.Integer",
            Primitive::Long => "java.lang.Long",
            Primitive::Float => "java.lang.Float",
            Primitive::Double => "java.lang.Double",
        }
    }

    /// Whether a value of `self` widens implicitly to `target`.
    ///
    /// `byte`, `short` and `char` only widen upward into `int` and beyond;
    /// they are not assignable to each other. `bool` only accepts itself.
    pub const fn widens_to(self, target: Primitive) -> bool {
        use Primitive::{Bool, Byte, Char, Double, Float, Int, Long, Short};
        match (self, target) {
            (Bool, Bool)
            | (Byte, Byte)
            | (Short, Short)
            | (Char, Char)
            | (Byte | Short | Char, Int | Long | Float | Double)
            | (Int, Int | Long | Float | Double)
            | (Long, Long | Float | Double)
            | (Float, Float | Double)
            | (Double, Double) => true,
            _ => false,
        }
    }

    /// Result type of a binary arithmetic operation on two numeric
    /// operands: `int` at least, otherwise the wider operand.
    pub fn promote(self, other: Primitive) -> Option<Primitive> {
        if !self.is_numeric() || !other.is_numeric() {
            return None;
        }
        let rank = |p: Primitive| match p {
            Primitive::Long => 1,
            Primitive::Float => 2,
            Primitive::Double => 3,
            _ => 0,
        };
        Some(match rank(self).max(rank(other)) {
            0 => Primitive::Int,
            1 => Primitive::Long,
            2 => Primitive::Float,
            _ => Primitive::Double,
        })
    }
}
