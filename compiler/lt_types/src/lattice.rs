//! Assignability.
//!
//! Primitives follow the widening lattice
//! `byte/short/char -> int -> long -> float -> double`. Reference types
//! are related through a breadth-first walk over super classes and
//! interfaces that visits each type once, so diamond-shaped interface
//! hierarchies and (erroneous) cycles terminate. `java.lang.Object`
//! accepts every reference type and `null` is assignable to every
//! reference type but to no primitive.

use std::collections::VecDeque;

use rustc_hash::FxHashSet;

use crate::{TypeDef, TypeId, TypeTable};

pub const OBJECT: &str = "java.lang.Object";

impl TypeTable {
    /// Whether a value of type `source` may be stored where `target` is
    /// expected without an explicit cast.
    pub fn is_assignable_from(&self, target: TypeId, source: TypeId) -> bool {
        if target == source {
            return true;
        }
        match (self.primitive(target), self.primitive(source)) {
            (Some(t), Some(s)) => return s.widens_to(t),
            (Some(_), None) | (None, Some(_)) => return false,
            (None, None) => {}
        }
        if !self.is_reference(target) || !self.is_reference(source) {
            return false;
        }
        if source == TypeId::NULL {
            return true;
        }
        if self.is_object_root(target) {
            return true;
        }
        match (self.get(target), self.get(source)) {
            (
                TypeDef::Array {
                    element: te,
                    dims: td,
                },
                TypeDef::Array {
                    element: se,
                    dims: sd,
                },
            ) => {
                if td == sd {
                    te == se
                        || (!te.is_primitive()
                            && !se.is_primitive()
                            && self.is_assignable_from(*te, *se))
                } else {
                    // Object[] accepts int[][]
                    sd > td && self.is_object_root(*te)
                }
            }
            (TypeDef::Array { .. }, _) | (_, TypeDef::Array { .. }) => false,
            _ => self.supertypes(source).contains(&target),
        }
    }

    /// Every super class and interface of `id`, nearest first, each once.
    pub fn supertypes(&self, id: TypeId) -> Vec<TypeId> {
        let mut visited = FxHashSet::default();
        visited.insert(id);
        let mut queue = VecDeque::from([id]);
        let mut found = Vec::new();
        while let Some(current) = queue.pop_front() {
            let Some(object) = self.object(current) else {
                continue;
            };
            for parent in object.super_class.iter().chain(&object.interfaces) {
                if visited.insert(*parent) {
                    found.push(*parent);
                    queue.push_back(*parent);
                }
            }
        }
        found
    }

    /// Whether walking the parents of `id` leads back to `id`.
    pub fn inherits_from_itself(&self, id: TypeId) -> bool {
        let parents = |t: TypeId| {
            self.object(t)
                .map(|o| o.super_class.iter().chain(&o.interfaces).copied().collect::<Vec<_>>())
                .unwrap_or_default()
        };
        parents(id).contains(&id)
            || self
                .supertypes(id)
                .into_iter()
                .any(|parent| parents(parent).contains(&id))
    }

    pub fn is_object_root(&self, id: TypeId) -> bool {
        self.object(id).is_some_and(|o| o.name == OBJECT)
    }
}

#[cfg(test)]
mod tests;
