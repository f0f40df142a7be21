//! Semantic resolution of a whole compilation unit.
//!
//! The resolver walks a fixed sequence of stages over every file at once:
//!
//! 1. `NameResolving`: packages, imports and type names are registered
//! 2. `TypeResolving`: super types, members, annotations and inheritance
//!    rules are checked; member signatures are settled
//! 3. `OverloadResolving`: bodies are lowered into instructions, which
//!    resolves every name, call and operator
//! 4. `SlotAllocated`: capture analysis is final; local slots are assigned
//!
//! The first error ends the run. Resolution never recovers.

mod body;
mod context;
mod declare;
mod expr;
mod operators;
mod overload;
mod scope;
mod stmt;

use lt_diagnostic::CompileError;
use lt_ir::ast::{AnnotationDef, ClassDef, FunDef, ImportTarget, InterfaceDef, ObjectDef};
use lt_ir::{FileName, Position, Stmt};

use crate::classpath::Classpath;
use crate::{lattice, slots, ResolverConfig, TypeId, TypeTable};

pub(crate) use body::PendingBody;
pub(crate) use scope::ImportTable;

/// Resolution progress. Stages only move forward.
#[derive(Copy, Clone, Eq, PartialEq, Hash, PartialOrd, Ord, Debug)]
pub enum Stage {
    Unresolved,
    NameResolving,
    TypeResolving,
    OverloadResolving,
    SlotAllocated,
    Done,
}

/// Output of a successful resolution.
#[derive(Debug)]
pub struct ResolvedUnit {
    pub table: TypeTable,
    /// Types defined by the unit's sources, in declaration order.
    pub defined: Vec<TypeId>,
}

pub(crate) struct SourceFile {
    pub name: FileName,
    pub imports: ImportTable,
}

/// A type definition waiting for its members to be declared.
pub(crate) enum DefNode {
    Class(ClassDef),
    Object(ObjectDef),
    Fun(FunDef),
    Interface(InterfaceDef),
    Annotation(AnnotationDef),
}

pub(crate) struct Definition {
    pub id: TypeId,
    pub file: usize,
    pub node: DefNode,
}

pub(crate) struct Resolver<'a> {
    classpath: &'a dyn Classpath,
    config: &'a ResolverConfig,
    pub(crate) table: TypeTable,
    stage: Stage,
    files: Vec<SourceFile>,
    defined: Vec<TypeId>,
    pending: Vec<PendingBody>,
}

impl<'a> Resolver<'a> {
    pub(crate) fn new(classpath: &'a dyn Classpath, config: &'a ResolverConfig) -> Self {
        Resolver {
            classpath,
            config,
            table: TypeTable::new(),
            stage: Stage::Unresolved,
            files: Vec::new(),
            defined: Vec::new(),
            pending: Vec::new(),
        }
    }

    fn advance(&mut self, next: Stage) {
        debug_assert!(next > self.stage, "stage {next:?} after {:?}", self.stage);
        tracing::debug!(from = ?self.stage, to = ?next, "resolver stage");
        self.stage = next;
    }

    /// Resolve every file. Consumes the resolver: after an error there is
    /// nothing left to continue with.
    pub(crate) fn run(mut self, files: Vec<(FileName, Vec<Stmt>)>) -> Result<ResolvedUnit, CompileError> {
        self.advance(Stage::NameResolving);
        let mut definitions = Vec::new();
        for (name, stmts) in files {
            self.collect_file(name, stmts, &mut definitions)?;
        }
        self.check_single_type_imports()?;

        self.advance(Stage::TypeResolving);
        for definition in &definitions {
            self.resolve_supers(definition)?;
        }
        for definition in &definitions {
            if self.table.inherits_from_itself(definition.id) {
                return Err(CompileError::resolution(
                    self.type_position(definition.id),
                    format!("cyclic inheritance involving {}", self.table.name(definition.id)),
                ));
            }
        }
        // Meta-annotations first, so applicability checks on every other
        // definition see the @Target and @Retention of unit annotations.
        let (annotations, others): (Vec<_>, Vec<_>) = definitions
            .into_iter()
            .partition(|d| matches!(d.node, DefNode::Annotation(_)));
        for definition in &annotations {
            self.declare_annotation_meta(definition)?;
        }
        // Functions last: the interface a `fun` implements may be one of
        // the unit's own, whose methods must be declared first.
        let (funs, others): (Vec<_>, Vec<_>) = others
            .into_iter()
            .partition(|d| matches!(d.node, DefNode::Fun(_)));
        for definition in annotations.into_iter().chain(others).chain(funs) {
            self.declare_members(definition)?;
        }
        for id in self.defined.clone() {
            self.check_implemented(id)?;
        }

        self.advance(Stage::OverloadResolving);
        for body in std::mem::take(&mut self.pending) {
            self.lower_body(body)?;
        }

        self.advance(Stage::SlotAllocated);
        for id in self.defined.clone() {
            if let Some(object) = self.table.object(id) {
                let (methods, constructors) = (object.methods.len(), object.constructors.len());
                for index in 0..methods {
                    self.allocate(crate::MethodRef {
                        owner: id,
                        kind: crate::MethodKind::Method,
                        index: crate::id::to_u32(index),
                    });
                }
                for index in 0..constructors {
                    self.allocate(crate::MethodRef {
                        owner: id,
                        kind: crate::MethodKind::Constructor,
                        index: crate::id::to_u32(index),
                    });
                }
            }
        }

        self.advance(Stage::Done);
        Ok(ResolvedUnit {
            table: self.table,
            defined: self.defined,
        })
    }

    fn allocate(&mut self, method: crate::MethodRef) {
        // Slot allocation reads the table while writing one method, so the
        // method is taken out for the duration.
        let Some(slot) = self.table.method_mut(method) else {
            return;
        };
        let mut info = std::mem::replace(slot, crate::MethodInfo::new("", TypeId::VOID, Position::synthetic()));
        slots::allocate_slots(&self.table, &mut info);
        if let Some(slot) = self.table.method_mut(method) {
            *slot = info;
        }
    }

    fn collect_file(
        &mut self,
        name: FileName,
        stmts: Vec<Stmt>,
        definitions: &mut Vec<Definition>,
    ) -> Result<(), CompileError> {
        let file = self.files.len();
        let mut imports = ImportTable::default();
        let mut seen_other = false;
        let mut nodes = Vec::new();
        for stmt in stmts {
            match stmt {
                Stmt::PackageDeclare(pkg) => {
                    if seen_other || !imports.package.is_empty() {
                        return Err(CompileError::syntax(
                            pkg.loc.position().clone(),
                            "package declaration must be the first statement",
                        ));
                    }
                    imports.package = pkg.pkg;
                }
                Stmt::Import(import) => {
                    seen_other = true;
                    match import.target {
                        ImportTarget::Package(pkg) => {
                            if !imports.packages.contains(&pkg) {
                                imports.packages.push(pkg);
                            }
                        }
                        ImportTarget::Type { pkg: None, name } => {
                            return Err(CompileError::syntax(
                                import.loc.position().clone(),
                                format!("import {name} names no package"),
                            ));
                        }
                        ImportTarget::Type { pkg: Some(pkg), name } => {
                            let full = format!("{pkg}.{name}");
                            imports.types.push((name, full, import.loc.position().clone()));
                        }
                    }
                }
                Stmt::ClassDef(def) => {
                    seen_other = true;
                    nodes.push(DefNode::Class(def));
                }
                Stmt::ObjectDef(def) => {
                    seen_other = true;
                    nodes.push(DefNode::Object(def));
                }
                Stmt::FunDef(def) => {
                    seen_other = true;
                    nodes.push(DefNode::Fun(def));
                }
                Stmt::InterfaceDef(def) => {
                    seen_other = true;
                    nodes.push(DefNode::Interface(def));
                }
                Stmt::AnnotationDef(def) => {
                    seen_other = true;
                    nodes.push(DefNode::Annotation(def));
                }
                other => {
                    return Err(CompileError::resolution(
                        other.loc().position().clone(),
                        "only package, import and type definitions are allowed at top level",
                    ));
                }
            }
        }
        for auto in &self.config.auto_imports {
            if !imports.packages.contains(auto) {
                imports.packages.push(auto.clone());
            }
        }
        tracing::trace!(file = %name, package = %imports.package, "collected file");
        self.files.push(SourceFile { name, imports });
        for node in nodes {
            let id = self.register(file, &node)?;
            self.defined.push(id);
            definitions.push(Definition { id, file, node });
        }
        Ok(())
    }

    fn check_single_type_imports(&mut self) -> Result<(), CompileError> {
        for file in 0..self.files.len() {
            for (_, full, position) in self.files[file].imports.types.clone() {
                if self.load_type(&full)?.is_none() {
                    return Err(CompileError::resolution(
                        position,
                        format!("cannot find imported type {full}"),
                    ));
                }
            }
        }
        Ok(())
    }

    pub(crate) fn type_position(&self, id: TypeId) -> Position {
        self.table.object(id).map_or_else(Position::synthetic, crate::ObjectType::position)
    }

    pub(crate) fn object_type(&mut self, position: &Position) -> Result<TypeId, CompileError> {
        self.require_type(lattice::OBJECT, position)
    }
}
