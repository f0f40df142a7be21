//! Per-method lowering state.
//!
//! A [`MethodContext`] covers one method group: a method written in source
//! (frame 0) and the synthetic methods of every lambda nested in it.
//! Frames are created in textual order and stay alive until the whole
//! group is lowered, because capture analysis needs all of them at once.

use lt_ir::{Position, Stmt};

use crate::capture::CaptureTracker;
use crate::{Instruction, Label, LeftValue, MethodInfo, MethodRef, TypeId, Var};

/// Work that must run when control leaves a region early.
#[derive(Clone, Debug)]
pub(crate) enum Cleanup {
    /// Statements of a `finally` block.
    Finally(Vec<Stmt>),
    /// Monitors held by a `synchronized` block, in acquisition order.
    Monitor(Vec<Var>),
}

#[derive(Copy, Clone, Debug)]
pub(crate) struct LoopTarget {
    pub continue_to: Label,
    pub break_to: Label,
    /// Cleanups already active when the loop started.
    pub cleanup_depth: usize,
}

pub(crate) struct Frame {
    pub method: MethodInfo,
    /// Where the finished method is stored.
    pub target: MethodRef,
    scopes: Vec<Vec<(String, Var)>>,
    pub loops: Vec<LoopTarget>,
    pub cleanups: Vec<Cleanup>,
    next_label: u32,
}

impl Frame {
    pub(crate) fn new(mut method: MethodInfo, target: MethodRef) -> Self {
        method.body.clear();
        method.locals.clear();
        method.exception_table.clear();
        Frame {
            method,
            target,
            scopes: vec![Vec::new()],
            loops: Vec::new(),
            cleanups: Vec::new(),
            next_label: 0,
        }
    }

    pub(crate) fn owner(&self) -> TypeId {
        self.target.owner
    }
}

pub(crate) struct MethodContext {
    pub file: usize,
    pub tracker: CaptureTracker,
    pub frames: Vec<Frame>,
    active: Vec<usize>,
    /// Name lambda methods of this group are derived from.
    pub lambda_stem: String,
}

impl MethodContext {
    pub(crate) fn new(file: usize, root: Frame) -> Self {
        let lambda_stem = match root.method.name.as_str() {
            "<init>" => "new".to_owned(),
            "<clinit>" => "static".to_owned(),
            name => name.to_owned(),
        };
        let mut tracker = CaptureTracker::new();
        tracker.push_frame(None);
        MethodContext {
            file,
            tracker,
            frames: vec![root],
            active: vec![0],
            lambda_stem,
        }
    }

    /// Index of the frame being lowered.
    pub(crate) fn current(&self) -> usize {
        self.active.last().copied().unwrap_or(0)
    }

    pub(crate) fn frame(&self) -> &Frame {
        &self.frames[self.current()]
    }

    pub(crate) fn frame_mut(&mut self) -> &mut Frame {
        let current = self.current();
        &mut self.frames[current]
    }

    /// Open the frame of a lambda created in the current frame.
    pub(crate) fn push_frame(&mut self, frame: Frame) -> usize {
        let parent = self.current();
        let index = self.tracker.push_frame(Some(parent));
        debug_assert_eq!(index, self.frames.len());
        self.frames.push(frame);
        self.active.push(index);
        index
    }

    pub(crate) fn pop_frame(&mut self) {
        if self.active.len() > 1 {
            self.active.pop();
        }
    }

    pub(crate) fn is_static(&self) -> bool {
        self.frame().method.is_static()
    }

    pub(crate) fn owner(&self) -> TypeId {
        self.frame().owner()
    }

    pub(crate) fn return_type(&self) -> TypeId {
        self.frame().method.return_type
    }

    pub(crate) fn emit(&mut self, instruction: Instruction) {
        self.frame_mut().method.body.push(instruction);
    }

    pub(crate) fn label(&mut self) -> Label {
        let frame = self.frame_mut();
        let label = Label(frame.next_label);
        frame.next_label += 1;
        label
    }

    /// Start collecting instructions for a value pack; returns what was
    /// emitted so far.
    pub(crate) fn begin_pack(&mut self) -> Vec<Instruction> {
        std::mem::take(&mut self.frame_mut().method.body)
    }

    /// Instructions emitted since [`begin_pack`](Self::begin_pack); the
    /// earlier body is put back.
    pub(crate) fn end_pack(&mut self, saved: Vec<Instruction>) -> Vec<Instruction> {
        std::mem::replace(&mut self.frame_mut().method.body, saved)
    }

    pub(crate) fn push_scope(&mut self) {
        self.frame_mut().scopes.push(Vec::new());
    }

    pub(crate) fn pop_scope(&mut self) {
        let frame = self.frame_mut();
        if frame.scopes.len() > 1 {
            frame.scopes.pop();
        }
    }

    pub(crate) fn bind(&mut self, name: &str, var: Var) {
        if let Some(scope) = self.frame_mut().scopes.last_mut() {
            scope.push((name.to_owned(), var));
        }
    }

    /// Innermost visible variable called `name`.
    pub(crate) fn lookup(&self, name: &str) -> Option<Var> {
        self.frame()
            .scopes
            .iter()
            .rev()
            .flat_map(|scope| scope.iter().rev())
            .find(|(n, _)| n == name)
            .map(|(_, var)| *var)
    }

    /// Every visible variable, outermost first.
    pub(crate) fn visible(&self) -> Vec<(String, Var)> {
        self.frame().scopes.iter().flatten().cloned().collect()
    }

    pub(crate) fn left_value(&self, var: Var) -> Option<&LeftValue> {
        self.frame().method.left_value(var)
    }

    pub(crate) fn left_value_mut(&mut self, var: Var) -> Option<&mut LeftValue> {
        Self::left_value_in(&mut self.frame_mut().method, var)
    }

    pub(crate) fn left_value_in(method: &mut MethodInfo, var: Var) -> Option<&mut LeftValue> {
        match var {
            Var::Param(i) => method.params.get_mut(i as usize),
            Var::Local(i) => method.locals.get_mut(i as usize),
        }
    }

    pub(crate) fn add_local(&mut self, local: LeftValue) -> Var {
        let locals = &mut self.frame_mut().method.locals;
        locals.push(local);
        Var::Local(crate::id::to_u32(locals.len() - 1))
    }

    /// Start a loop of the current frame for capture analysis.
    pub(crate) fn enter_loop(&mut self) {
        let frame = self.current();
        let declared = crate::id::to_u32(self.frame().method.locals.len());
        self.tracker.enter_loop(frame, declared);
    }

    pub(crate) fn exit_loop(&mut self) {
        self.tracker.exit_loop();
    }

    /// Unnamed local holding an intermediate value.
    pub(crate) fn temp(&mut self, ty: TypeId) -> Var {
        let mut local = LeftValue::new("", ty, true, Position::synthetic());
        local.used = true;
        self.add_local(local)
    }

    /// Emit the cleanups above `depth`, innermost first, for a jump out of
    /// their regions. Each cleanup is lowered outside its own region.
    pub(crate) fn cleanups_above(&self, depth: usize) -> Vec<(usize, Cleanup)> {
        self.frame()
            .cleanups
            .iter()
            .enumerate()
            .skip(depth)
            .rev()
            .map(|(index, cleanup)| (index, cleanup.clone()))
            .collect()
    }
}
