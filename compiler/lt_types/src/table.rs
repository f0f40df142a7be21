//! Arena of typed definitions.
//!
//! Every type the resolver knows about lives in one [`TypeTable`] and is
//! addressed by [`TypeId`]. Primitives, `void` and the null type are
//! pre-interned at fixed indices; arrays and pointers are interned on
//! first use; declared types are registered under their qualified name.

use rustc_hash::FxHashMap;

use crate::{FieldInfo, FieldRef, MethodInfo, MethodKind, MethodRef, ObjectType, Primitive, TypeDef, TypeId};

#[derive(Debug)]
pub struct TypeTable {
    defs: Vec<TypeDef>,
    by_name: FxHashMap<String, TypeId>,
    arrays: FxHashMap<(TypeId, u32), TypeId>,
    pointers: FxHashMap<TypeId, TypeId>,
}

impl TypeTable {
    pub fn new() -> Self {
        let mut defs: Vec<TypeDef> = Primitive::ALL.into_iter().map(TypeDef::Primitive).collect();
        defs.push(TypeDef::Void);
        defs.push(TypeDef::Null);
        debug_assert_eq!(defs.len(), TypeId::FIRST_DYNAMIC as usize);
        TypeTable {
            defs,
            by_name: FxHashMap::default(),
            arrays: FxHashMap::default(),
            pointers: FxHashMap::default(),
        }
    }

    pub fn len(&self) -> usize {
        self.defs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.defs.is_empty()
    }

    /// Definition behind `id`. Ids are only handed out by this table, so
    /// the lookup cannot miss.
    pub fn get(&self, id: TypeId) -> &TypeDef {
        &self.defs[id.index()]
    }

    pub(crate) fn get_mut(&mut self, id: TypeId) -> &mut TypeDef {
        &mut self.defs[id.index()]
    }

    /// Declared type registered under a qualified name.
    pub fn lookup(&self, name: &str) -> Option<TypeId> {
        self.by_name.get(name).copied()
    }

    /// Register a class, interface or annotation under its name.
    pub(crate) fn declare(&mut self, def: TypeDef) -> TypeId {
        let id = TypeId::from_index(self.defs.len());
        if let Some(object) = def.object() {
            self.by_name.insert(object.name.clone(), id);
        }
        self.defs.push(def);
        id
    }

    /// Array of `element` with `dims` more dimensions. Arrays of arrays are
    /// flattened into one entry.
    pub fn array_of(&mut self, element: TypeId, dims: u32) -> TypeId {
        let (element, dims) = match self.get(element) {
            TypeDef::Array { element, dims: inner } => (*element, inner + dims),
            _ => (element, dims),
        };
        if let Some(&id) = self.arrays.get(&(element, dims)) {
            return id;
        }
        let id = TypeId::from_index(self.defs.len());
        self.defs.push(TypeDef::Array { element, dims });
        self.arrays.insert((element, dims), id);
        id
    }

    /// Type of one element of `array`.
    pub fn component_of(&mut self, array: TypeId) -> Option<TypeId> {
        match *self.get(array) {
            TypeDef::Array { element, dims: 1 } => Some(element),
            TypeDef::Array { element, dims } => Some(self.array_of(element, dims - 1)),
            _ => None,
        }
    }

    pub fn pointer_to(&mut self, pointee: TypeId) -> TypeId {
        if let Some(&id) = self.pointers.get(&pointee) {
            return id;
        }
        let id = TypeId::from_index(self.defs.len());
        self.defs.push(TypeDef::Pointer { pointee });
        self.pointers.insert(pointee, id);
        id
    }

    pub fn pointee(&self, id: TypeId) -> Option<TypeId> {
        match self.get(id) {
            TypeDef::Pointer { pointee } => Some(*pointee),
            _ => None,
        }
    }

    pub fn primitive(&self, id: TypeId) -> Option<Primitive> {
        Primitive::from_id(id)
    }

    pub fn object(&self, id: TypeId) -> Option<&ObjectType> {
        self.get(id).object()
    }

    pub(crate) fn object_mut(&mut self, id: TypeId) -> Option<&mut ObjectType> {
        self.get_mut(id).object_mut()
    }

    pub fn is_array(&self, id: TypeId) -> bool {
        matches!(self.get(id), TypeDef::Array { .. })
    }

    /// Arrays, declared types and the null type.
    pub fn is_reference(&self, id: TypeId) -> bool {
        matches!(
            self.get(id),
            TypeDef::Array { .. }
                | TypeDef::Class(_)
                | TypeDef::Interface(_)
                | TypeDef::Annotation(_)
                | TypeDef::Null
        )
    }

    /// Local slots taken by a value of `id`: 2 for `long`/`double`, 1
    /// otherwise (pointers and arrays are references).
    pub fn slots_of(&self, id: TypeId) -> u32 {
        self.primitive(id).map_or(1, Primitive::slots)
    }

    pub fn method(&self, method: MethodRef) -> Option<&MethodInfo> {
        let object = self.object(method.owner)?;
        let list = match method.kind {
            MethodKind::Method => &object.methods,
            MethodKind::Constructor => &object.constructors,
        };
        list.get(method.index as usize)
    }

    pub(crate) fn method_mut(&mut self, method: MethodRef) -> Option<&mut MethodInfo> {
        let object = self.object_mut(method.owner)?;
        let list = match method.kind {
            MethodKind::Method => &mut object.methods,
            MethodKind::Constructor => &mut object.constructors,
        };
        list.get_mut(method.index as usize)
    }

    pub fn field(&self, field: FieldRef) -> Option<&FieldInfo> {
        self.object(field.owner)?.fields.get(field.index as usize)
    }

    /// Methods of `owner` named `name`, in declaration order.
    pub fn methods_named(&self, owner: TypeId, name: &str) -> Vec<MethodRef> {
        let Some(object) = self.object(owner) else {
            return Vec::new();
        };
        object
            .methods
            .iter()
            .enumerate()
            .filter(|(_, m)| m.name == name)
            .map(|(index, _)| MethodRef {
                owner,
                kind: MethodKind::Method,
                index: crate::id::to_u32(index),
            })
            .collect()
    }

    /// Source-level name: `int`, `java.lang.String`, `int[][]`.
    pub fn name(&self, id: TypeId) -> String {
        match self.get(id) {
            TypeDef::Primitive(p) => p.name().to_owned(),
            TypeDef::Void => "void".to_owned(),
            TypeDef::Null => "null".to_owned(),
            TypeDef::Array { element, dims } => {
                let mut name = self.name(*element);
                for _ in 0..*dims {
                    name.push_str("[]");
                }
                name
            }
            TypeDef::Class(o) | TypeDef::Interface(o) | TypeDef::Annotation(o) => o.name.clone(),
            TypeDef::Pointer { pointee } => format!("lt.lang.Pointer<{}>", self.name(*pointee)),
        }
    }

    /// Every declared type, in registration order.
    pub fn declared(&self) -> impl Iterator<Item = (TypeId, &ObjectType)> {
        self.defs
            .iter()
            .enumerate()
            .filter_map(|(index, def)| def.object().map(|o| (TypeId::from_index(index), o)))
    }
}

impl Default for TypeTable {
    fn default() -> Self {
        TypeTable::new()
    }
}

#[cfg(test)]
mod tests;
