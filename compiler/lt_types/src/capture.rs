//! Closure capture analysis.
//!
//! Every mutable local starts out boxed (`Pointer(T)`) and every mutable
//! parameter is boxed through a wrapping local. A lambda becomes a synthetic
//! method whose leading parameters are seeded from the enclosing frame's
//! visible variables.
//!
//! While bodies are lowered, [`CaptureTracker`] records which variables a
//! lambda actually captured and which captured variables are reassigned
//! afterwards, either later in the enclosing body or inside a lambda
//! (through any depth of nesting). Those are the pointer locals; they keep
//! their box. An assignment inside a loop also follows every capture in the
//! same loop, through the back edge, so it is replayed when the loop ends. [`finalize`] deboxes every other pointer local and gives each
//! captured parameter the final type of the variable it was seeded from.

use rustc_hash::FxHashSet;

use crate::{MethodInfo, TypeTable, Var};

#[derive(Default, Debug)]
struct FrameCapture {
    parent: Option<usize>,
    captured: FxHashSet<Var>,
    pointer_locals: FxHashSet<u32>,
    /// `(param, origin)` for the captured parameters of a lambda frame.
    origins: Vec<(u32, Var)>,
}

/// A loop being lowered in `frame`.
#[derive(Debug)]
struct OpenLoop {
    frame: usize,
    /// Locals from this index on are declared inside the loop, fresh on
    /// every iteration.
    first_inner_local: u32,
    assigned: Vec<Var>,
}

/// Capture state of one method and the lambdas nested in it. Frames are
/// numbered in creation order, so a parent always precedes its lambdas.
#[derive(Default, Debug)]
pub struct CaptureTracker {
    frames: Vec<FrameCapture>,
    loops: Vec<OpenLoop>,
}

impl CaptureTracker {
    pub fn new() -> Self {
        CaptureTracker::default()
    }

    pub fn push_frame(&mut self, parent: Option<usize>) -> usize {
        self.frames.push(FrameCapture {
            parent,
            ..FrameCapture::default()
        });
        self.frames.len() - 1
    }

    pub fn frame_count(&self) -> usize {
        self.frames.len()
    }

    pub fn parent(&self, frame: usize) -> Option<usize> {
        self.frames.get(frame).and_then(|f| f.parent)
    }

    /// Parameter `param` of lambda frame `frame` is seeded from `origin` of
    /// the parent frame.
    pub fn record_origin(&mut self, frame: usize, param: u32, origin: Var) {
        if let Some(f) = self.frames.get_mut(frame) {
            f.origins.push((param, origin));
        }
    }

    fn origin(&self, frame: usize, param: u32) -> Option<Var> {
        self.frames
            .get(frame)?
            .origins
            .iter()
            .find(|(p, _)| *p == param)
            .map(|(_, origin)| *origin)
    }

    /// A lambda created in `frame` captured `var` and uses it.
    pub fn mark_captured(&mut self, frame: usize, var: Var) {
        if let Some(f) = self.frames.get_mut(frame) {
            f.captured.insert(var);
        }
    }

    pub fn is_captured(&self, frame: usize, var: Var) -> bool {
        self.frames.get(frame).is_some_and(|f| f.captured.contains(&var))
    }

    /// Frame and variable a captured parameter was ultimately seeded from.
    pub fn root(&self, mut frame: usize, mut var: Var) -> (usize, Var) {
        while let Var::Param(param) = var {
            match (self.origin(frame, param), self.parent(frame)) {
                (Some(origin), Some(parent)) => {
                    frame = parent;
                    var = origin;
                }
                _ => break,
            }
        }
        (frame, var)
    }

    /// `var` of `frame` is assigned. A captured variable assigned after its
    /// capture, and the root of any captured parameter assigned inside a
    /// lambda, must stay boxed.
    pub fn on_assign(&mut self, frame: usize, var: Var) {
        for open in self.loops.iter_mut().filter(|l| l.frame == frame) {
            let inner = matches!(var, Var::Local(local) if local >= open.first_inner_local);
            if !inner && !open.assigned.contains(&var) {
                open.assigned.push(var);
            }
        }
        self.box_if_captured(frame, var);
    }

    /// A loop of `frame` starts; `first_inner_local` is the number of locals
    /// the frame has declared so far.
    pub fn enter_loop(&mut self, frame: usize, first_inner_local: u32) {
        self.loops.push(OpenLoop {
            frame,
            first_inner_local,
            assigned: Vec::new(),
        });
    }

    /// The innermost loop ends. Its assignments run again after every
    /// capture made inside it, and they belong to any enclosing loop too.
    pub fn exit_loop(&mut self) {
        let Some(open) = self.loops.pop() else {
            return;
        };
        for var in open.assigned {
            self.on_assign(open.frame, var);
        }
    }

    fn box_if_captured(&mut self, frame: usize, var: Var) {
        let boxed = match var {
            Var::Local(_) => self.is_captured(frame, var),
            Var::Param(param) => self.origin(frame, param).is_some(),
        };
        if !boxed {
            return;
        }
        if let (root_frame, Var::Local(local)) = self.root(frame, var) {
            if let Some(f) = self.frames.get_mut(root_frame) {
                f.pointer_locals.insert(local);
            }
        }
    }

    pub fn pointer_locals(&self, frame: usize) -> Vec<u32> {
        let mut locals: Vec<u32> = self
            .frames
            .get(frame)
            .map(|f| f.pointer_locals.iter().copied().collect())
            .unwrap_or_default();
        locals.sort_unstable();
        locals
    }
}

/// Settle the types of one method group: `methods[i]` belongs to frame `i`
/// of `tracker`.
///
/// Pointer locals outside the pointer set are deboxed to their pointee.
/// Captured parameters then take the final type of their origin, which is
/// still a pointer only when the origin kept its box.
pub fn finalize(table: &TypeTable, tracker: &CaptureTracker, methods: &mut [MethodInfo]) {
    for frame in 0..methods.len() {
        if let Some(parent) = tracker.parent(frame).filter(|p| *p < frame) {
            let (done, rest) = methods.split_at_mut(frame);
            let method = &mut rest[0];
            let origins = tracker.frames.get(frame).map_or(&[][..], |f| f.origins.as_slice());
            for &(param, origin) in origins {
                let origin_ty = done[parent].left_value(origin).map(|v| v.ty);
                if let (Some(ty), Some(p)) = (origin_ty, method.params.get_mut(param as usize)) {
                    p.ty = ty;
                }
            }
        }
        let method = &mut methods[frame];
        let pointer_locals = tracker.pointer_locals(frame);
        debox(table, method, &pointer_locals);
        method.capture.pointer_locals = pointer_locals;
    }
}

/// Replace every pointer local not in `pointer_locals` by its pointee.
pub fn debox(table: &TypeTable, method: &mut MethodInfo, pointer_locals: &[u32]) {
    for (index, local) in method.locals.iter_mut().enumerate() {
        let index = crate::id::to_u32(index);
        if pointer_locals.contains(&index) {
            continue;
        }
        if let Some(pointee) = table.pointee(local.ty) {
            tracing::trace!(local = %local.name, "deboxed");
            local.ty = pointee;
            local.deboxed = true;
        }
    }
}

#[cfg(test)]
mod tests;
