//! Local slot allocation.
//!
//! One pass over the frame in declaration order: `this` (instance methods
//! only), then parameters, then locals. `long` and `double` take two slots,
//! everything else one. Captured parameters the lambda never uses take no
//! slot. A deboxed local that wraps a parameter shares the parameter's
//! slot; any other deboxed local is sized by its pointee, so a deboxed
//! `long` takes two slots and a deboxed array one.
//!
//! Run after [`capture::finalize`](crate::capture::finalize).

use crate::{MethodInfo, TypeTable};

pub fn allocate_slots(table: &TypeTable, method: &mut MethodInfo) {
    let mut next = u32::from(!method.is_static());
    for param in &mut method.params {
        if param.captured && !param.used {
            param.slot = None;
            continue;
        }
        param.slot = Some(next);
        next += table.slots_of(param.ty);
    }
    for local in &mut method.locals {
        if let Some(param) = local.wrapping_param.filter(|_| local.deboxed) {
            local.slot = method.params.get(param as usize).and_then(|p| p.slot);
            continue;
        }
        local.slot = Some(next);
        next += table.slots_of(local.ty);
    }
    method.capture.max_slots = next;
}

#[cfg(test)]
mod tests;
