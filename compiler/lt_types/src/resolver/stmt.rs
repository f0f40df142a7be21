//! Statement lowering and control flow.

use lt_diagnostic::CompileError;
use lt_ir::ast::{Access, Assignment, For, If, Synchronized, Try, VariableDef, While};
use lt_ir::{Expr, Modifiers, Position, Stmt};
use lt_stack::ensure_sufficient_stack;

use super::context::{Cleanup, LoopTarget, MethodContext};
use super::Resolver;
use crate::annotation::TargetSet;
use crate::{ExceptionEntry, Instruction, LeftValue, PrimOp, TypeId, Value, Var};

const THROWABLE: &str = "java.lang.Throwable";

/// Whether control cannot fall off the end of `stmts`.
pub(super) fn terminates(stmts: &[Stmt]) -> bool {
    let Some(last) = stmts.last() else {
        return false;
    };
    match last {
        Stmt::Return(_) | Stmt::Throw(_) => true,
        Stmt::If(stmt) => {
            stmt.branches.iter().any(|b| b.condition.is_none()) && stmt.branches.iter().all(|b| terminates(&b.body))
        }
        Stmt::Try(stmt) => {
            let catch_terminates = !has_catch(stmt) || terminates(&stmt.catch_body);
            (terminates(&stmt.body) && catch_terminates) || terminates(&stmt.finally_body)
        }
        Stmt::Synchronized(stmt) => terminates(&stmt.body),
        _ => false,
    }
}

/// Whether some `return` in `stmts` carries a value. Lambda bodies are not
/// entered.
pub(super) fn has_valued_return(stmts: &[Stmt]) -> bool {
    stmts.iter().any(|stmt| match stmt {
        Stmt::Return(ret) => ret.exp.is_some(),
        Stmt::If(stmt) => stmt.branches.iter().any(|b| has_valued_return(&b.body)),
        Stmt::While(stmt) => has_valued_return(&stmt.body),
        Stmt::For(stmt) => has_valued_return(&stmt.body),
        Stmt::Try(stmt) => {
            has_valued_return(&stmt.body) || has_valued_return(&stmt.catch_body) || has_valued_return(&stmt.finally_body)
        }
        Stmt::Synchronized(stmt) => has_valued_return(&stmt.body),
        _ => false,
    })
}

fn has_catch(stmt: &Try) -> bool {
    stmt.catch_var.is_some() || !stmt.catch_body.is_empty()
}

impl Resolver<'_> {
    pub(super) fn lower_block(&mut self, cx: &mut MethodContext, stmts: &[Stmt]) -> Result<(), CompileError> {
        cx.push_scope();
        let result = stmts.iter().try_for_each(|stmt| self.lower_stmt(cx, stmt));
        cx.pop_scope();
        result
    }

    pub(super) fn lower_stmt(&mut self, cx: &mut MethodContext, stmt: &Stmt) -> Result<(), CompileError> {
        ensure_sufficient_stack(|| self.lower_stmt_inner(cx, stmt))
    }

    fn lower_stmt_inner(&mut self, cx: &mut MethodContext, stmt: &Stmt) -> Result<(), CompileError> {
        let position = stmt.loc().position();
        match stmt {
            Stmt::Expr(expr) => self.lower_expr_stmt(cx, expr),
            Stmt::If(stmt) => self.lower_if(cx, stmt),
            Stmt::While(stmt) => self.lower_while(cx, stmt),
            Stmt::For(stmt) => self.lower_for(cx, stmt),
            Stmt::Try(stmt) => self.lower_try(cx, stmt),
            Stmt::Synchronized(stmt) => self.lower_synchronized(cx, stmt),
            Stmt::Throw(stmt) => {
                let value = self.lower_expr(cx, &stmt.exp, None)?;
                let throwable = self.require_type(THROWABLE, position)?;
                if !self.table.is_assignable_from(throwable, value.ty()) {
                    return Err(CompileError::resolution(
                        position.clone(),
                        format!("cannot throw {}", self.table.name(value.ty())),
                    ));
                }
                cx.emit(Instruction::Throw(value));
                Ok(())
            }
            Stmt::Return(ret) => self.lower_return(cx, ret.exp.as_ref(), position),
            Stmt::Break(_) | Stmt::Continue(_) => {
                let Some(target) = cx.frame().loops.last().copied() else {
                    let word = if matches!(stmt, Stmt::Break(_)) { "break" } else { "continue" };
                    return Err(CompileError::resolution(
                        position.clone(),
                        format!("{word} outside of a loop"),
                    ));
                };
                self.run_cleanups(cx, target.cleanup_depth)?;
                let label = if matches!(stmt, Stmt::Break(_)) {
                    target.break_to
                } else {
                    target.continue_to
                };
                cx.emit(Instruction::Goto(label));
                Ok(())
            }
            Stmt::Pass(_) => Ok(()),
            Stmt::ClassDef(_)
            | Stmt::InterfaceDef(_)
            | Stmt::AnnotationDef(_)
            | Stmt::ObjectDef(_)
            | Stmt::FunDef(_) => Err(CompileError::resolution(
                position.clone(),
                "type definitions are only allowed at top level",
            )),
            Stmt::MethodDef(def) => Err(CompileError::resolution(
                position.clone(),
                format!("method {} cannot be defined inside a body", def.name),
            )),
            Stmt::Import(_) | Stmt::PackageDeclare(_) => Err(CompileError::resolution(
                position.clone(),
                "package and import statements are only allowed at top level",
            )),
            Stmt::StaticScope(_) => Err(CompileError::resolution(
                position.clone(),
                "static scopes are only allowed in a class body",
            )),
        }
    }

    fn lower_expr_stmt(&mut self, cx: &mut MethodContext, expr: &Expr) -> Result<(), CompileError> {
        match expr {
            Expr::Assignment(assignment) => {
                self.lower_assignment(cx, assignment, false)?;
            }
            Expr::Unary(unary) if unary.op.is_increment() => {
                self.lower_increment(cx, &unary.operand, unary.op, false)?;
            }
            Expr::VariableDef(def) if self.reassigns(cx, def) => {
                self.lower_assignment(cx, &reassignment(def), false)?;
            }
            Expr::VariableDef(def) => {
                self.define_local(cx, def)?;
            }
            other => {
                let value = self.lower_expr(cx, other, None)?;
                cx.emit(Instruction::Eval(value));
            }
        }
        Ok(())
    }

    /// `x = v` without a type or modifiers assigns an existing local or
    /// field named `x` instead of defining a new local.
    pub(super) fn reassigns(&self, cx: &MethodContext, def: &VariableDef) -> bool {
        def.ty.is_none()
            && def.modifiers.is_empty()
            && def.annos.is_empty()
            && def.init.is_some()
            && (cx.lookup(&def.name).is_some() || self.find_field(cx.owner(), &def.name).is_some())
    }

    /// Define a local in the innermost scope. A mutable local is declared
    /// boxed; capture analysis unboxes it unless a lambda needs the box.
    pub(super) fn define_local(&mut self, cx: &mut MethodContext, def: &VariableDef) -> Result<Var, CompileError> {
        let position = def.loc.position();
        if cx.lookup(&def.name).is_some() {
            return Err(CompileError::resolution(
                position.clone(),
                format!("variable {} is already defined", def.name),
            ));
        }
        self.annotations(cx.file, &def.annos, TargetSet::LOCAL_VARIABLE)?;
        let declared = match &def.ty {
            Some(spec) => Some(self.resolve_type_spec(cx.file, spec)?),
            None => None,
        };
        let init = match def.init.as_deref() {
            Some(init) => Some(self.lower_expr(cx, init, declared)?),
            None => None,
        };
        let ty = match (declared, &init) {
            (Some(ty), _) => ty,
            (None, Some(value)) if value.ty() == TypeId::VOID => {
                return Err(CompileError::resolution(
                    position.clone(),
                    format!("variable {} cannot hold a void value", def.name),
                ));
            }
            (None, Some(value)) if value.ty() != TypeId::NULL => value.ty(),
            (None, _) => self.object_type(position)?,
        };
        if ty == TypeId::VOID {
            return Err(CompileError::resolution(
                position.clone(),
                format!("variable {} cannot be void", def.name),
            ));
        }
        let can_change = !def.modifiers.contains(Modifiers::VAL);
        let stored_ty = if can_change { self.table.pointer_to(ty) } else { ty };
        let var = cx.add_local(LeftValue::new(def.name.clone(), stored_ty, can_change, position.clone()));
        if let Some(value) = init {
            let value = self.convert(value, ty, position)?;
            cx.emit(Instruction::Store { var, value });
            if let Some(local) = cx.left_value_mut(var) {
                local.already_assigned = true;
            }
        }
        cx.bind(&def.name, var);
        tracing::trace!(name = %def.name, ?var, "defined local");
        Ok(var)
    }

    fn condition(&mut self, cx: &mut MethodContext, expr: &Expr) -> Result<Value, CompileError> {
        let value = self.lower_expr(cx, expr, Some(TypeId::BOOL))?;
        if value.ty() != TypeId::BOOL {
            return Err(CompileError::resolution(
                expr.loc().position().clone(),
                format!("condition must be bool, found {}", self.table.name(value.ty())),
            ));
        }
        Ok(value)
    }

    fn lower_if(&mut self, cx: &mut MethodContext, stmt: &If) -> Result<(), CompileError> {
        let end = cx.label();
        for branch in &stmt.branches {
            match &branch.condition {
                Some(condition) => {
                    let next = cx.label();
                    let condition = self.condition(cx, condition)?;
                    cx.emit(Instruction::Branch {
                        condition,
                        when: false,
                        target: next,
                    });
                    self.lower_block(cx, &branch.body)?;
                    if !terminates(&branch.body) {
                        cx.emit(Instruction::Goto(end));
                    }
                    cx.emit(Instruction::Label(next));
                }
                None => self.lower_block(cx, &branch.body)?,
            }
        }
        cx.emit(Instruction::Label(end));
        Ok(())
    }

    fn lower_loop_body(&mut self, cx: &mut MethodContext, body: &[Stmt], target: LoopTarget) -> Result<(), CompileError> {
        cx.frame_mut().loops.push(target);
        let result = self.lower_block(cx, body);
        cx.frame_mut().loops.pop();
        result
    }

    fn loop_target(cx: &mut MethodContext) -> LoopTarget {
        LoopTarget {
            continue_to: cx.label(),
            break_to: cx.label(),
            cleanup_depth: cx.frame().cleanups.len(),
        }
    }

    fn lower_while(&mut self, cx: &mut MethodContext, stmt: &While) -> Result<(), CompileError> {
        cx.enter_loop();
        let result = self.lower_while_loop(cx, stmt);
        cx.exit_loop();
        result
    }

    fn lower_while_loop(&mut self, cx: &mut MethodContext, stmt: &While) -> Result<(), CompileError> {
        let start = cx.label();
        let target = Self::loop_target(cx);
        if stmt.do_while {
            cx.emit(Instruction::Label(start));
            self.lower_loop_body(cx, &stmt.body, target)?;
            cx.emit(Instruction::Label(target.continue_to));
            let condition = self.condition(cx, &stmt.condition)?;
            cx.emit(Instruction::Branch {
                condition,
                when: true,
                target: start,
            });
        } else {
            cx.emit(Instruction::Label(start));
            cx.emit(Instruction::Label(target.continue_to));
            let condition = self.condition(cx, &stmt.condition)?;
            cx.emit(Instruction::Branch {
                condition,
                when: false,
                target: target.break_to,
            });
            self.lower_loop_body(cx, &stmt.body, target)?;
            cx.emit(Instruction::Goto(start));
        }
        cx.emit(Instruction::Label(target.break_to));
        Ok(())
    }

    /// `for x in exp` over an array (by index) or an `Iterable` (through
    /// its iterator). The loop variable is a fresh `val` per iteration.
    fn lower_for(&mut self, cx: &mut MethodContext, stmt: &For) -> Result<(), CompileError> {
        let position = stmt.loc.position();
        let iterable = self.lower_expr(cx, &stmt.exp, None)?;
        let ty = iterable.ty();
        let start = cx.label();
        let target = Self::loop_target(cx);
        cx.push_scope();
        if cx.lookup(&stmt.name).is_some() {
            cx.pop_scope();
            return Err(CompileError::resolution(
                position.clone(),
                format!("variable {} is already defined", stmt.name),
            ));
        }
        cx.enter_loop();
        let result = if self.table.is_array(ty) {
            self.lower_for_array(cx, stmt, iterable, start, target)
        } else {
            self.lower_for_iterable(cx, stmt, iterable, start, target)
        };
        cx.exit_loop();
        cx.pop_scope();
        result?;
        cx.emit(Instruction::Label(target.break_to));
        Ok(())
    }

    fn loop_variable(cx: &mut MethodContext, name: &str, ty: TypeId, position: &Position) -> Var {
        let mut local = LeftValue::new(name, ty, false, position.clone());
        local.already_assigned = true;
        let var = cx.add_local(local);
        cx.bind(name, var);
        var
    }

    fn lower_for_array(
        &mut self,
        cx: &mut MethodContext,
        stmt: &For,
        array: Value,
        start: crate::Label,
        target: LoopTarget,
    ) -> Result<(), CompileError> {
        let position = stmt.loc.position();
        let array_ty = array.ty();
        let element = self.table.component_of(array_ty).unwrap_or(TypeId::VOID);
        let holder = cx.temp(array_ty);
        cx.emit(Instruction::Store { var: holder, value: array });
        let index = cx.temp(TypeId::INT);
        cx.emit(Instruction::Store {
            var: index,
            value: Value::Const(crate::Constant::Int(0)),
        });
        let load_array = Value::Load { var: holder, ty: array_ty };
        let load_index = Value::Load { var: index, ty: TypeId::INT };
        cx.emit(Instruction::Label(start));
        cx.emit(Instruction::Branch {
            condition: Value::Binary {
                op: PrimOp::Lt,
                left: Box::new(load_index.clone()),
                right: Box::new(Value::ArrayLength(Box::new(load_array.clone()))),
                ty: TypeId::BOOL,
            },
            when: false,
            target: target.break_to,
        });
        let var = Self::loop_variable(cx, &stmt.name, element, position);
        cx.emit(Instruction::Store {
            var,
            value: Value::ArrayLoad {
                array: Box::new(load_array),
                index: Box::new(load_index.clone()),
                ty: element,
            },
        });
        self.lower_loop_body(cx, &stmt.body, target)?;
        cx.emit(Instruction::Label(target.continue_to));
        cx.emit(Instruction::Store {
            var: index,
            value: Value::Binary {
                op: PrimOp::Add,
                left: Box::new(load_index),
                right: Box::new(Value::Const(crate::Constant::Int(1))),
                ty: TypeId::INT,
            },
        });
        cx.emit(Instruction::Goto(start));
        Ok(())
    }

    fn lower_for_iterable(
        &mut self,
        cx: &mut MethodContext,
        stmt: &For,
        iterable: Value,
        start: crate::Label,
        target: LoopTarget,
    ) -> Result<(), CompileError> {
        let position = stmt.loc.position();
        let ty = iterable.ty();
        let iterable_methods = if self.table.is_reference(ty) && ty != TypeId::NULL {
            self.methods_of(ty, "iterator")?
        } else {
            Vec::new()
        };
        if iterable_methods.is_empty() {
            return Err(CompileError::resolution(
                position.clone(),
                format!("cannot iterate over {}", self.table.name(ty)),
            ));
        }
        let iterator = self.invoke_named(cx, iterable, "iterator", Vec::new(), position)?;
        let iterator_ty = iterator.ty();
        let holder = cx.temp(iterator_ty);
        cx.emit(Instruction::Store { var: holder, value: iterator });
        let load = Value::Load { var: holder, ty: iterator_ty };
        cx.emit(Instruction::Label(start));
        cx.emit(Instruction::Label(target.continue_to));
        let has_next = self.invoke_named(cx, load.clone(), "hasNext", Vec::new(), position)?;
        cx.emit(Instruction::Branch {
            condition: has_next,
            when: false,
            target: target.break_to,
        });
        let next = self.invoke_named(cx, load, "next", Vec::new(), position)?;
        let var = Self::loop_variable(cx, &stmt.name, next.ty(), position);
        cx.emit(Instruction::Store { var, value: next });
        self.lower_loop_body(cx, &stmt.body, target)?;
        cx.emit(Instruction::Goto(start));
        Ok(())
    }

    /// Lower the cleanups above `depth` for a jump leaving their regions.
    /// Each one is lowered with only the cleanups outside it active.
    fn run_cleanups(&mut self, cx: &mut MethodContext, depth: usize) -> Result<(), CompileError> {
        for (index, cleanup) in cx.cleanups_above(depth) {
            let inner = cx.frame_mut().cleanups.split_off(index);
            let result = match cleanup {
                Cleanup::Finally(stmts) => self.lower_block(cx, &stmts),
                Cleanup::Monitor(locks) => {
                    for lock in locks.into_iter().rev() {
                        cx.emit(Instruction::MonitorExit(lock));
                    }
                    Ok(())
                }
            };
            cx.frame_mut().cleanups.extend(inner);
            result?;
        }
        Ok(())
    }

    fn lower_return(&mut self, cx: &mut MethodContext, exp: Option<&Expr>, position: &Position) -> Result<(), CompileError> {
        let return_type = cx.return_type();
        let has_cleanups = !cx.frame().cleanups.is_empty();
        match exp {
            None => {
                if return_type != TypeId::VOID {
                    return Err(CompileError::resolution(
                        position.clone(),
                        format!("missing return value of type {}", self.table.name(return_type)),
                    ));
                }
                self.run_cleanups(cx, 0)?;
                cx.emit(Instruction::Return(None));
            }
            Some(exp) => {
                if return_type == TypeId::VOID {
                    return Err(CompileError::resolution(
                        position.clone(),
                        "cannot return a value from a void method",
                    ));
                }
                let value = self.lower_expr(cx, exp, Some(return_type))?;
                let value = self.convert(value, return_type, position)?;
                if has_cleanups {
                    let temp = cx.temp(return_type);
                    cx.emit(Instruction::Store { var: temp, value });
                    self.run_cleanups(cx, 0)?;
                    cx.emit(Instruction::Return(Some(Value::Load { var: temp, ty: return_type })));
                } else {
                    cx.emit(Instruction::Return(Some(value)));
                }
            }
        }
        Ok(())
    }

    /// Lower `body` as a protected region; returns its start and end labels.
    fn protected(
        &mut self,
        cx: &mut MethodContext,
        body: &[Stmt],
        cleanup: Option<&Cleanup>,
    ) -> Result<(crate::Label, crate::Label), CompileError> {
        let (start, end) = (cx.label(), cx.label());
        if let Some(cleanup) = cleanup {
            cx.frame_mut().cleanups.push(cleanup.clone());
        }
        cx.emit(Instruction::Label(start));
        let result = self.lower_block(cx, body);
        cx.emit(Instruction::Label(end));
        if cleanup.is_some() {
            cx.frame_mut().cleanups.pop();
        }
        result.map(|()| (start, end))
    }

    fn add_handler(cx: &mut MethodContext, region: (crate::Label, crate::Label), handler: crate::Label, ty: Option<TypeId>) {
        cx.frame_mut().method.exception_table.push(ExceptionEntry {
            start: region.0,
            end: region.1,
            handler,
            ty,
        });
    }

    /// `try`/`catch`/`finally`. The finally block is inlined on every
    /// normal exit and early jump, and once more in a catch-all handler
    /// that rethrows.
    fn lower_try(&mut self, cx: &mut MethodContext, stmt: &Try) -> Result<(), CompileError> {
        let position = stmt.loc.position();
        let throwable = self.require_type(THROWABLE, position)?;
        let finally = (!stmt.finally_body.is_empty()).then(|| Cleanup::Finally(stmt.finally_body.clone()));
        let after = cx.label();
        let mut regions = Vec::new();

        let body_region = self.protected(cx, &stmt.body, finally.as_ref())?;
        regions.push(body_region);
        if !terminates(&stmt.body) {
            if finally.is_some() {
                self.lower_block(cx, &stmt.finally_body)?;
            }
            cx.emit(Instruction::Goto(after));
        }

        if has_catch(stmt) {
            let handler = cx.label();
            Self::add_handler(cx, body_region, handler, Some(throwable));
            cx.emit(Instruction::Label(handler));
            cx.push_scope();
            let caught = Value::Caught { ty: throwable };
            match &stmt.catch_var {
                Some(name) => {
                    if cx.lookup(name).is_some() {
                        cx.pop_scope();
                        return Err(CompileError::resolution(
                            position.clone(),
                            format!("variable {name} is already defined"),
                        ));
                    }
                    let var = Self::loop_variable(cx, name, throwable, position);
                    cx.emit(Instruction::Store { var, value: caught });
                }
                None => cx.emit(Instruction::Eval(caught)),
            }
            let catch_region = self.protected(cx, &stmt.catch_body, finally.as_ref());
            cx.pop_scope();
            regions.push(catch_region?);
            if !terminates(&stmt.catch_body) {
                if finally.is_some() {
                    self.lower_block(cx, &stmt.finally_body)?;
                }
                cx.emit(Instruction::Goto(after));
            }
        }

        if finally.is_some() {
            let handler = cx.label();
            for region in regions {
                Self::add_handler(cx, region, handler, None);
            }
            cx.emit(Instruction::Label(handler));
            let pending = cx.temp(throwable);
            cx.emit(Instruction::Store {
                var: pending,
                value: Value::Caught { ty: throwable },
            });
            self.lower_block(cx, &stmt.finally_body)?;
            cx.emit(Instruction::Throw(Value::Load { var: pending, ty: throwable }));
        }
        cx.emit(Instruction::Label(after));
        Ok(())
    }

    /// `synchronized(a, b)`: monitors are entered in order and exited in
    /// reverse on every exit, including a rethrowing catch-all handler.
    fn lower_synchronized(&mut self, cx: &mut MethodContext, stmt: &Synchronized) -> Result<(), CompileError> {
        let position = stmt.loc.position();
        let mut locks = Vec::with_capacity(stmt.locks.len());
        for lock in &stmt.locks {
            let value = self.lower_expr(cx, lock, None)?;
            let ty = value.ty();
            if !self.table.is_reference(ty) || ty == TypeId::NULL {
                return Err(CompileError::resolution(
                    lock.loc().position().clone(),
                    format!("cannot synchronize on {}", self.table.name(ty)),
                ));
            }
            let holder = cx.temp(ty);
            cx.emit(Instruction::Store { var: holder, value });
            cx.emit(Instruction::MonitorEnter(holder));
            locks.push(holder);
        }
        let after = cx.label();
        let region = self.protected(cx, &stmt.body, Some(&Cleanup::Monitor(locks.clone())))?;
        if !terminates(&stmt.body) {
            for lock in locks.iter().rev() {
                cx.emit(Instruction::MonitorExit(*lock));
            }
            cx.emit(Instruction::Goto(after));
        }
        let handler = cx.label();
        Self::add_handler(cx, region, handler, None);
        cx.emit(Instruction::Label(handler));
        let throwable = self.require_type(THROWABLE, position)?;
        let pending = cx.temp(throwable);
        cx.emit(Instruction::Store {
            var: pending,
            value: Value::Caught { ty: throwable },
        });
        for lock in locks.iter().rev() {
            cx.emit(Instruction::MonitorExit(*lock));
        }
        cx.emit(Instruction::Throw(Value::Load { var: pending, ty: throwable }));
        cx.emit(Instruction::Label(after));
        Ok(())
    }
}

/// The assignment an untyped re-definition stands for.
pub(super) fn reassignment(def: &VariableDef) -> Assignment {
    Assignment {
        target: Box::new(Expr::Access(Access {
            exp: None,
            name: def.name.clone(),
            loc: def.loc.clone(),
        })),
        op: None,
        value: def.init.clone().unwrap_or_else(|| Box::new(Expr::Null(def.loc.clone()))),
        loc: def.loc.clone(),
    }
}
