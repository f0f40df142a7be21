//! Stack growth for recursive descent.
//!
//! The parser recurses once per nested layer or parenthesised expression and
//! the resolver recurses once per nested expression or lambda. Sources with
//! deeply nested literals (`[[[[...]]]]`) would otherwise exhaust the default
//! thread stack, which is small on rayon worker threads.
//!
//! Wrap every recursive entry point:
//!
//! ```text
//! fn parse_layer(&mut self, layer: NodeId) -> Result<Vec<Stmt>, Halt> {
//!     ensure_sufficient_stack(|| self.parse_layer_inner(layer))
//! }
//! ```

/// Remaining stack below which a new segment is allocated.
const RED_ZONE: usize = 128 * 1024;

/// Size of each newly allocated stack segment.
const SEGMENT_SIZE: usize = 2 * 1024 * 1024;

/// Run `f`, growing the stack first when less than the red zone remains.
#[inline]
#[cfg(not(target_arch = "wasm32"))]
pub fn ensure_sufficient_stack<R>(f: impl FnOnce() -> R) -> R {
    stacker::maybe_grow(RED_ZONE, SEGMENT_SIZE, f)
}

/// WASM manages its own stack.
#[inline]
#[cfg(target_arch = "wasm32")]
pub fn ensure_sufficient_stack<R>(f: impl FnOnce() -> R) -> R {
    f()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn nesting_depth(text: &str, at: usize) -> usize {
        ensure_sufficient_stack(|| match text.as_bytes().get(at) {
            Some(b'(') => 1 + nesting_depth(text, at + 1),
            _ => 0,
        })
    }

    #[test]
    fn measures_shallow_nesting() {
        assert_eq!(nesting_depth("((()))", 0), 3);
    }

    #[test]
    fn survives_deep_nesting() {
        let text = "(".repeat(200_000);
        assert_eq!(nesting_depth(&text, 0), 200_000);
    }

    #[test]
    fn forwards_results() {
        let parsed: Result<u8, String> = ensure_sufficient_stack(|| "7".parse().map_err(|_| String::new()));
        assert_eq!(parsed, Ok(7));
    }
}
