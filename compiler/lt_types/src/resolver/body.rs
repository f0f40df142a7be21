//! Lowering of one method group and its write-back into the table.

use lt_diagnostic::CompileError;
use lt_ir::ast::VariableDef;
use lt_ir::{Expr, Position, Stmt};

use super::context::{Frame, MethodContext};
use super::Resolver;
use crate::{capture, Instruction, InvokeKind, LeftValue, MethodKind, MethodRef, Value, Var};

/// A body whose signature is settled and which is lowered once every
/// signature in the unit is known.
pub(crate) enum PendingBody {
    /// Method written in source.
    Method {
        method: MethodRef,
        file: usize,
        body: Vec<Stmt>,
    },
    /// Primary constructor of a class: super call, parameter fields, then
    /// field initializers and class-body statements in order.
    Constructor {
        method: MethodRef,
        file: usize,
        super_call: Option<(Vec<Expr>, Position)>,
        body: Vec<Stmt>,
    },
    /// Overload generated for trailing default parameters; calls `target`
    /// with the defaults appended.
    Forward {
        method: MethodRef,
        file: usize,
        target: MethodRef,
        defaults: Vec<Expr>,
    },
    /// `<clinit>`: static field initializers and static statements.
    StaticInit {
        method: MethodRef,
        file: usize,
        body: Vec<Stmt>,
    },
}

impl Resolver<'_> {
    #[tracing::instrument(level = "trace", skip_all)]
    pub(super) fn lower_body(&mut self, body: PendingBody) -> Result<(), CompileError> {
        let (method, file) = match &body {
            PendingBody::Method { method, file, .. }
            | PendingBody::Constructor { method, file, .. }
            | PendingBody::Forward { method, file, .. }
            | PendingBody::StaticInit { method, file, .. } => (*method, *file),
        };
        let Some(info) = self.table.method(method).cloned() else {
            return Ok(());
        };
        tracing::trace!(file = %self.files[file].name, method = %info.name, "lowering body");
        let position = info.position.clone();
        let mut cx = MethodContext::new(file, Frame::new(info, method));
        self.open_params(&mut cx);

        match body {
            PendingBody::Method { body, .. } => {
                self.lower_block(&mut cx, &body)?;
                self.finish_body(&mut cx, &body, &position)?;
            }
            PendingBody::Constructor {
                super_call, body, ..
            } => {
                self.lower_super_call(&mut cx, super_call, &position)?;
                self.store_param_fields(&mut cx);
                self.lower_initializers(&mut cx, &body)?;
                cx.emit(Instruction::Return(None));
            }
            PendingBody::Forward {
                target, defaults, ..
            } => self.lower_forward(&mut cx, target, &defaults, &position)?,
            PendingBody::StaticInit { body, .. } => {
                self.lower_initializers(&mut cx, &body)?;
                cx.emit(Instruction::Return(None));
            }
        }
        self.close_group(cx);
        Ok(())
    }

    /// Bind the current frame's parameters. A mutable parameter is
    /// reassignable only through a boxed local wrapping it.
    pub(super) fn open_params(&mut self, cx: &mut MethodContext) {
        let params: Vec<(u32, LeftValue)> = cx
            .frame()
            .method
            .params
            .iter()
            .enumerate()
            .filter(|(_, p)| !p.captured)
            .map(|(index, p)| (crate::id::to_u32(index), p.clone()))
            .collect();
        for (index, param) in params {
            if param.can_change {
                let mut wrap = LeftValue::new(
                    param.name.clone(),
                    self.table.pointer_to(param.ty),
                    true,
                    param.position.clone(),
                );
                wrap.wrapping_param = Some(index);
                wrap.already_assigned = true;
                let local = cx.add_local(wrap);
                cx.emit(Instruction::Store {
                    var: local,
                    value: Value::Load {
                        var: Var::Param(index),
                        ty: param.ty,
                    },
                });
                cx.bind(&param.name, local);
            } else {
                cx.bind(&param.name, Var::Param(index));
            }
        }
    }

    /// Close a body: `void` bodies get an implicit return, others must end
    /// in a statement that cannot complete normally.
    fn finish_body(&mut self, cx: &mut MethodContext, body: &[Stmt], position: &Position) -> Result<(), CompileError> {
        if cx.return_type() == crate::TypeId::VOID {
            if !super::stmt::terminates(body) {
                cx.emit(Instruction::Return(None));
            }
            return Ok(());
        }
        if super::stmt::terminates(body) {
            Ok(())
        } else {
            Err(CompileError::resolution(
                position.clone(),
                format!("missing return statement in method {}", cx.frame().method.name),
            ))
        }
    }

    fn lower_super_call(
        &mut self,
        cx: &mut MethodContext,
        super_call: Option<(Vec<Expr>, Position)>,
        position: &Position,
    ) -> Result<(), CompileError> {
        let owner = cx.owner();
        let Some(super_class) = self.table.object(owner).and_then(|o| o.super_class) else {
            return Ok(());
        };
        let (args, position) = super_call.unwrap_or_else(|| (Vec::new(), position.clone()));
        let candidates = self.constructors_of(super_class);
        let args = self.lower_args(cx, &args)?;
        let constructor = self.select_overload(&candidates, &args, "super constructor", &position)?;
        let args = self.finish_args(cx, constructor, args, &position)?;
        let this = Value::This { ty: owner };
        cx.emit(Instruction::Eval(Value::Invoke(Box::new(crate::Invoke {
            kind: InvokeKind::Special,
            target: Some(this),
            method: constructor,
            args,
            ty: crate::TypeId::VOID,
        }))));
        Ok(())
    }

    fn store_param_fields(&mut self, cx: &mut MethodContext) {
        let owner = cx.owner();
        let params: Vec<String> = cx.frame().method.params.iter().map(|p| p.name.clone()).collect();
        for name in params {
            let Some(field) = self.own_field(owner, &name) else {
                continue;
            };
            let Some(var) = cx.lookup(&name) else {
                continue;
            };
            let value = self.load_var(cx, var);
            cx.emit(Instruction::PutField {
                target: Value::This { ty: owner },
                field,
                value,
            });
        }
    }

    /// Class-level statements of a constructor or static initializer:
    /// field definitions become field stores, the rest is lowered as is.
    fn lower_initializers(&mut self, cx: &mut MethodContext, body: &[Stmt]) -> Result<(), CompileError> {
        for stmt in body {
            match stmt {
                Stmt::Expr(Expr::VariableDef(def)) => self.lower_field_init(cx, def)?,
                other => self.lower_stmt(cx, other)?,
            }
        }
        Ok(())
    }

    fn lower_field_init(&mut self, cx: &mut MethodContext, def: &VariableDef) -> Result<(), CompileError> {
        let Some(init) = &def.init else {
            return Ok(());
        };
        let owner = cx.owner();
        let position = def.loc.position();
        let Some(field) = self.own_field(owner, &def.name) else {
            return Err(CompileError::resolution(
                position.clone(),
                format!("no field {} in {}", def.name, self.table.name(owner)),
            ));
        };
        let ty = self.table.field(field).map_or(crate::TypeId::VOID, |f| f.ty);
        let value = self.lower_expr(cx, init, Some(ty))?;
        let value = self.convert(value, ty, position)?;
        if cx.is_static() {
            cx.emit(Instruction::PutStatic { field, value });
        } else {
            cx.emit(Instruction::PutField {
                target: Value::This { ty: owner },
                field,
                value,
            });
        }
        Ok(())
    }

    fn lower_forward(
        &mut self,
        cx: &mut MethodContext,
        target: MethodRef,
        defaults: &[Expr],
        position: &Position,
    ) -> Result<(), CompileError> {
        let Some(full) = self.table.method(target).cloned() else {
            return Ok(());
        };
        let given = cx.frame().method.params.len();
        let mut args = Vec::with_capacity(full.params.len());
        for index in 0..given {
            let var = Var::Param(crate::id::to_u32(index));
            args.push(self.load_var(cx, var));
        }
        for (default, param) in defaults.iter().zip(&full.params[given..]) {
            let value = self.lower_expr(cx, default, Some(param.ty))?;
            args.push(self.convert(value, param.ty, position)?);
        }
        let owner = cx.owner();
        let this = (!full.is_static()).then_some(Value::This { ty: owner });
        let kind = match (target.kind, full.is_static()) {
            (MethodKind::Constructor, _) => InvokeKind::Special,
            (MethodKind::Method, true) => InvokeKind::Static,
            (MethodKind::Method, false) => self.dispatch_kind(owner),
        };
        let call = Value::Invoke(Box::new(crate::Invoke {
            kind,
            target: this,
            method: target,
            args,
            ty: full.return_type,
        }));
        if full.return_type == crate::TypeId::VOID {
            cx.emit(Instruction::Eval(call));
            cx.emit(Instruction::Return(None));
        } else {
            cx.emit(Instruction::Return(Some(call)));
        }
        Ok(())
    }

    /// Settle capture analysis for the whole group and store every frame's
    /// method in its owner.
    fn close_group(&mut self, cx: MethodContext) {
        let MethodContext {
            tracker, frames, ..
        } = cx;
        let (targets, mut methods): (Vec<MethodRef>, Vec<_>) =
            frames.into_iter().map(|f| (f.target, f.method)).unzip();
        capture::finalize(&self.table, &tracker, &mut methods);
        for (target, mut method) in targets.into_iter().zip(methods) {
            method.capture.captured_params =
                crate::id::to_u32(method.params.iter().filter(|p| p.captured).count());
            if let Some(slot) = self.table.method_mut(target) {
                *slot = method;
            }
        }
    }
}
