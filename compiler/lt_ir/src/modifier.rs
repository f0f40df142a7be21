//! Definition modifiers (`public`, `val`, `abstract`, ...).

use bitflags::bitflags;

/// A single modifier keyword.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum Modifier {
    Public,
    Protected,
    Private,
    Internal,
    Abstract,
    Val,
    Native,
    Synchronized,
    Transient,
    Volatile,
    Strictfp,
    Data,
    Var,
    Def,
    NonNull,
    NonEmpty,
    Implicit,
}

impl Modifier {
    pub const ALL: [Modifier; 17] = [
        Modifier::Public,
        Modifier::Protected,
        Modifier::Private,
        Modifier::Internal,
        Modifier::Abstract,
        Modifier::Val,
        Modifier::Native,
        Modifier::Synchronized,
        Modifier::Transient,
        Modifier::Volatile,
        Modifier::Strictfp,
        Modifier::Data,
        Modifier::Var,
        Modifier::Def,
        Modifier::NonNull,
        Modifier::NonEmpty,
        Modifier::Implicit,
    ];

    pub fn from_keyword(text: &str) -> Option<Modifier> {
        Modifier::ALL.into_iter().find(|m| m.keyword() == text)
    }

    pub const fn keyword(self) -> &'static str {
        match self {
            Modifier::Public => "public",
            Modifier::Protected => "protected",
            Modifier::Private => "private",
            Modifier::Internal => "internal",
            Modifier::Abstract => "abstract",
            Modifier::Val => "val",
            Modifier::Native => "native",
            Modifier::Synchronized => "synchronized",
            Modifier::Transient => "transient",
            Modifier::Volatile => "volatile",
            Modifier::Strictfp => "strictfp",
            Modifier::Data => "data",
            Modifier::Var => "var",
            Modifier::Def => "def",
            Modifier::NonNull => "nonnull",
            Modifier::NonEmpty => "nonempty",
            Modifier::Implicit => "implicit",
        }
    }

    const fn flag(self) -> Modifiers {
        match self {
            Modifier::Public => Modifiers::PUBLIC,
            Modifier::Protected => Modifiers::PROTECTED,
            Modifier::Private => Modifiers::PRIVATE,
            Modifier::Internal => Modifiers::INTERNAL,
            Modifier::Abstract => Modifiers::ABSTRACT,
            Modifier::Val => Modifiers::VAL,
            Modifier::Native => Modifiers::NATIVE,
            Modifier::Synchronized => Modifiers::SYNCHRONIZED,
            Modifier::Transient => Modifiers::TRANSIENT,
            Modifier::Volatile => Modifiers::VOLATILE,
            Modifier::Strictfp => Modifiers::STRICTFP,
            Modifier::Data => Modifiers::DATA,
            Modifier::Var => Modifiers::VAR,
            Modifier::Def => Modifiers::DEF,
            Modifier::NonNull => Modifiers::NONNULL,
            Modifier::NonEmpty => Modifiers::NONEMPTY,
            Modifier::Implicit => Modifiers::IMPLICIT,
        }
    }
}

bitflags! {
    /// Set of modifiers written on one definition.
    ///
    /// `STATIC` never comes from a modifier keyword; it is set for members
    /// declared inside a `static` scope.
    #[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Default)]
    pub struct Modifiers: u32 {
        const PUBLIC = 1 << 0;
        const PROTECTED = 1 << 1;
        const PRIVATE = 1 << 2;
        const INTERNAL = 1 << 3;
        const ABSTRACT = 1 << 4;
        const VAL = 1 << 5;
        const NATIVE = 1 << 6;
        const SYNCHRONIZED = 1 << 7;
        const TRANSIENT = 1 << 8;
        const VOLATILE = 1 << 9;
        const STRICTFP = 1 << 10;
        const DATA = 1 << 11;
        const VAR = 1 << 12;
        const DEF = 1 << 13;
        const NONNULL = 1 << 14;
        const NONEMPTY = 1 << 15;
        const IMPLICIT = 1 << 16;
        const STATIC = 1 << 17;

        const ACCESS = Self::PUBLIC.bits()
            | Self::PROTECTED.bits()
            | Self::PRIVATE.bits()
            | Self::INTERNAL.bits();
    }
}

impl Modifiers {
    /// Whether `modifier` may join this set.
    ///
    /// Rejects repeats, a second access modifier, and the `val`/`var` and
    /// `val`/`abstract` combinations.
    pub fn accepts(self, modifier: Modifier) -> bool {
        let flag = modifier.flag();
        if self.contains(flag) {
            return false;
        }
        if Modifiers::ACCESS.contains(flag) && self.intersects(Modifiers::ACCESS) {
            return false;
        }
        let conflicts = match modifier {
            Modifier::Val => Modifiers::VAR | Modifiers::ABSTRACT,
            Modifier::Var | Modifier::Abstract => Modifiers::VAL,
            _ => Modifiers::empty(),
        };
        !self.intersects(conflicts)
    }

    /// Add `modifier`, returning `false` when it is incompatible.
    pub fn try_insert(&mut self, modifier: Modifier) -> bool {
        if self.accepts(modifier) {
            self.insert(modifier.flag());
            true
        } else {
            false
        }
    }

    pub fn has(self, modifier: Modifier) -> bool {
        self.contains(modifier.flag())
    }
}

#[cfg(test)]
mod tests;
