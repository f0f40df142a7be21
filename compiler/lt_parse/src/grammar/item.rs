//! Definitions: classes, objects, functions, interfaces, annotations,
//! methods, imports and package declarations.

use lt_ir::ast::{
    Access, Anno, AnnoArg, AnnotationDef, ClassDef, Expr, FunDef, Import, ImportTarget,
    InterfaceDef, Invocation, MethodDef, ObjectDef, PackageDeclare, Return, VariableDef,
};
use lt_ir::Stmt;
use lt_lexer::EndingKind;

use super::assignment_to_def;
use crate::halt::{Halt, PResult};
use crate::Parser;

/// A parameter written as `name`, `name:T`, `name = default` or any of
/// those with modifiers.
fn into_parameter(stmt: Stmt) -> Result<VariableDef, Stmt> {
    match stmt {
        Stmt::Expr(Expr::VariableDef(def)) => Ok(def),
        Stmt::Expr(Expr::Access(access)) if access.exp.is_none() => Ok(VariableDef {
            loc: access.loc,
            ..VariableDef::new(&access.name)
        }),
        Stmt::Expr(Expr::Assignment(assignment)) => {
            assignment_to_def(assignment).map_err(|a| Stmt::Expr(Expr::Assignment(a)))
        }
        other => Err(other),
    }
}

/// Parents of a class or interface after `:`.
#[derive(Default)]
struct Parents {
    invocation: Option<Invocation>,
    types: Vec<Access>,
}

impl Parser<'_> {
    /// `@Type`, `@Type(value)` or `@Type(k = v, ...)`.
    pub(super) fn annotation(&mut self) -> PResult<Anno> {
        let position = self.cursor.here();
        self.cursor.bump();
        self.cursor.require(self.errors)?;
        let anno_type = self.type_spec()?;
        let mut args = Vec::new();
        if self.cursor.eat("(") {
            if let Some(layer) = self.cursor.peek_layer() {
                self.cursor.bump();
                for stmt in self.block(layer, &[])? {
                    let stmt = match stmt {
                        Stmt::Expr(Expr::Assignment(assignment)) => match assignment_to_def(assignment) {
                            Ok(def) => Stmt::Expr(Expr::VariableDef(def)),
                            Err(assignment) => Stmt::Expr(Expr::Assignment(assignment)),
                        },
                        other => other,
                    };
                    match stmt {
                        Stmt::Expr(Expr::VariableDef(VariableDef {
                            name,
                            ty: None,
                            init: Some(value),
                            ..
                        })) => args.push(AnnoArg {
                            name,
                            value: *value,
                        }),
                        Stmt::Expr(value) => args.push(AnnoArg {
                            name: "value".to_owned(),
                            value,
                        }),
                        other => self.errors.syntax(
                            "annotation arguments must be values",
                            other.loc().position().clone(),
                        )?,
                    }
                }
            }
            self.expect(")")?;
        }
        Ok(Anno {
            anno_type,
            args,
            loc: position.into(),
        })
    }

    /// Parameter list after `(`, up to and including `)`.
    pub(super) fn parameters(&mut self) -> PResult<Vec<VariableDef>> {
        let mut params: Vec<VariableDef> = Vec::new();
        if let Some(layer) = self.cursor.peek_layer() {
            self.cursor.bump();
            for stmt in self.block(layer, &[])? {
                match into_parameter(stmt) {
                    Ok(param) => params.push(param),
                    Err(stmt) => self.errors.syntax(
                        "parameter must be a variable definition",
                        stmt.loc().position().clone(),
                    )?,
                }
            }
        }
        self.expect(")")?;

        let mut seen_default = false;
        for param in &params {
            if param.init.is_some() {
                seen_default = true;
            } else if seen_default {
                self.errors.syntax(
                    format!("parameter {} needs a default value", param.name),
                    param.loc.position().clone(),
                )?;
            }
        }
        Ok(params)
    }

    /// `A(args), B, C` after `:`; a second parent with arguments is
    /// reported and dropped.
    fn parents(&mut self) -> PResult<Parents> {
        let mut parents = Parents::default();
        loop {
            self.cursor.require(self.errors)?;
            let position = self.cursor.here();
            let target = self.type_spec()?;
            if self.cursor.eat("(") {
                let args = self.arguments()?;
                if parents.invocation.is_some() {
                    self.errors
                        .syntax("only one parent may be invoked", position)?;
                } else {
                    parents.invocation = Some(Invocation {
                        target,
                        args,
                        loc: position.into(),
                    });
                }
            } else {
                parents.types.push(target);
            }

            let tree = self.cursor.tree();
            let separator = self.cursor.peek().filter(|&id| {
                tree.ending(id) == Some(EndingKind::Strong)
                    && tree.next(id).is_some_and(|n| tree.is_element(n))
            });
            if separator.is_none() {
                return Ok(parents);
            }
            self.cursor.bump();
        }
    }

    pub(super) fn class_def(&mut self) -> PResult<Stmt> {
        let (modifiers, annos) = self.take_pending();
        let position = self.cursor.here();
        self.cursor.bump();
        self.cursor.require(self.errors)?;
        let name = self.expect_name()?;
        let params = if self.cursor.eat("(") {
            self.parameters()?
        } else {
            Vec::new()
        };
        let parents = if self.cursor.eat(":") {
            self.parents()?
        } else {
            Parents::default()
        };
        let names: Vec<String> = params.iter().map(|p| p.name.clone()).collect();
        let body = self.optional_body(&names)?;
        Ok(Stmt::ClassDef(ClassDef {
            name,
            modifiers,
            annos,
            params,
            super_invocation: parents.invocation,
            super_types: parents.types,
            body,
            loc: position.into(),
        }))
    }

    /// `object Name:Parents` with an optional body. Parameters are
    /// reported and dropped.
    pub(super) fn object_def(&mut self) -> PResult<Stmt> {
        let (modifiers, annos) = self.take_pending();
        let position = self.cursor.here();
        self.cursor.bump();
        self.cursor.require(self.errors)?;
        let name = self.expect_name()?;
        if self.cursor.at("(") {
            let at = self.cursor.here();
            self.cursor.bump();
            self.parameters()?;
            self.errors.syntax("object definitions take no parameters", at)?;
        }
        let parents = if self.cursor.eat(":") {
            self.parents()?
        } else {
            Parents::default()
        };
        let body = self.optional_body(&[])?;
        Ok(Stmt::ObjectDef(ObjectDef {
            name,
            modifiers,
            annos,
            super_invocation: parents.invocation,
            super_types: parents.types,
            body,
            loc: position.into(),
        }))
    }

    /// `fun Name(params):Functional` with the body of the implemented
    /// method. The parent, when written, is one type without arguments.
    pub(super) fn fun_def(&mut self) -> PResult<Stmt> {
        let (modifiers, annos) = self.take_pending();
        let position = self.cursor.here();
        if !modifiers.is_empty() {
            self.errors
                .syntax("function definitions take no modifiers", position.clone())?;
        }
        self.cursor.bump();
        self.cursor.require(self.errors)?;
        let name = self.expect_name()?;
        let params = if self.cursor.eat("(") {
            self.parameters()?
        } else {
            Vec::new()
        };
        let mut super_type = None;
        if self.cursor.eat(":") {
            let parents = self.parents()?;
            let mut types = parents.types.into_iter();
            super_type = types.next();
            if parents.invocation.is_some() || super_type.is_none() || types.next().is_some() {
                self.errors.syntax(
                    "a function definition has one parent, written without arguments",
                    position.clone(),
                )?;
            }
        }
        let names: Vec<String> = params.iter().map(|p| p.name.clone()).collect();
        let body = self.optional_body(&names)?;
        Ok(Stmt::FunDef(FunDef {
            name,
            annos,
            params,
            super_type,
            body,
            loc: position.into(),
        }))
    }

    pub(super) fn interface_def(&mut self) -> PResult<Stmt> {
        let (modifiers, annos) = self.take_pending();
        let position = self.cursor.here();
        self.cursor.bump();
        self.cursor.require(self.errors)?;
        let name = self.expect_name()?;
        let mut super_interfaces = Vec::new();
        if self.cursor.eat(":") {
            let parents = self.parents()?;
            if let Some(invocation) = parents.invocation {
                self.errors.syntax(
                    "interfaces cannot invoke a constructor",
                    invocation.loc.position().clone(),
                )?;
            }
            super_interfaces = parents.types;
        }
        let body = self.optional_body(&[])?;
        Ok(Stmt::InterfaceDef(InterfaceDef {
            name,
            modifiers,
            annos,
            super_interfaces,
            body,
            loc: position.into(),
        }))
    }

    /// `annotation Name` with `element:Type [= default]` members.
    pub(super) fn annotation_def(&mut self) -> PResult<Stmt> {
        let (modifiers, annos) = self.take_pending();
        let position = self.cursor.here();
        self.cursor.bump();
        self.cursor.require(self.errors)?;
        let name = self.expect_name()?;
        let mut elements = Vec::new();
        for stmt in self.optional_body(&[])? {
            match stmt {
                Stmt::Expr(Expr::VariableDef(def)) if def.ty.is_some() => elements.push(def),
                other => self.errors.syntax(
                    "annotation members are written name:Type",
                    other.loc().position().clone(),
                )?,
            }
        }
        Ok(Stmt::AnnotationDef(AnnotationDef {
            name,
            modifiers,
            annos,
            elements,
            loc: position.into(),
        }))
    }

    /// `name(params)` followed by `:Type`, `= expr`, `= ...` and/or a body.
    pub(super) fn method_def(&mut self) -> PResult<Stmt> {
        let (modifiers, annos) = self.take_pending();
        let position = self.cursor.here();
        let name = self.expect_name()?;
        self.expect("(")?;
        let params = self.parameters()?;
        let names: Vec<String> = params.iter().map(|p| p.name.clone()).collect();

        let return_type = if self.cursor.eat(":") {
            self.cursor.require(self.errors)?;
            Some(self.type_spec()?)
        } else {
            None
        };

        let body = if self.cursor.eat("=") {
            let value = self.cursor.require(self.errors)?;
            if self.cursor.eat("...") {
                vec![Stmt::Pass(self.cursor.position(value).into())]
            } else {
                self.scopes.push(names.iter().cloned().collect());
                let exp = self.expression();
                self.scopes.pop();
                vec![Stmt::Return(Return {
                    exp: Some(exp?),
                    loc: self.cursor.position(value).into(),
                })]
            }
        } else {
            self.optional_body(&names)?
        };

        Ok(Stmt::MethodDef(MethodDef {
            name,
            modifiers,
            annos,
            params,
            return_type,
            body,
            loc: position.into(),
        }))
    }

    pub(super) fn package_declare(&mut self) -> PResult<Stmt> {
        let position = self.cursor.here();
        self.cursor.bump();
        self.cursor.require(self.errors)?;
        let pkg = self.path()?.join(".");
        Ok(Stmt::PackageDeclare(PackageDeclare {
            pkg,
            loc: position.into(),
        }))
    }

    /// `import a::b::C` or `import a::b::_`.
    pub(super) fn import(&mut self) -> PResult<Stmt> {
        let position = self.cursor.here();
        self.cursor.bump();
        self.cursor.require(self.errors)?;
        let mut path = self.path()?;
        let last = path.pop().unwrap_or_default();
        if last == "_" && path.is_empty() {
            self.errors
                .syntax("import of all types needs a package", position)?;
            return Err(Halt::Skip);
        }
        let target = if last == "_" {
            ImportTarget::Package(path.join("."))
        } else {
            ImportTarget::Type {
                pkg: (!path.is_empty()).then(|| path.join(".")),
                name: last,
            }
        };
        Ok(Stmt::Import(Import {
            target,
            loc: position.into(),
        }))
    }

    /// `a::b::c` as its segments.
    fn path(&mut self) -> PResult<Vec<String>> {
        let mut segments = vec![self.expect_name()?];
        while self.cursor.eat("::") {
            self.cursor.require(self.errors)?;
            segments.push(self.expect_name()?);
        }
        Ok(segments)
    }
}
