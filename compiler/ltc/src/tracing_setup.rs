//! Tracing subscriber for compiler debugging.
//!
//! Enable with `LT_LOG=debug` (or `RUST_LOG`), for example
//! `LT_LOG=lt_types=trace`.

use std::sync::Once;

static TRACING_INIT: Once = Once::new();

/// Install the subscriber. Safe to call more than once; does nothing
/// unless `LT_LOG` or `RUST_LOG` is set.
pub fn init() {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::{prelude::*, EnvFilter};

        let directives = std::env::var("LT_LOG").or_else(|_| std::env::var("RUST_LOG"));
        let Ok(directives) = directives else {
            return;
        };
        let layer = tracing_tree::HierarchicalLayer::new(2)
            .with_targets(true)
            .with_bracketed_fields(true);
        // A second subscriber installed by the host wins; ours is dropped.
        let _ = tracing_subscriber::registry()
            .with(EnvFilter::new(directives))
            .with(layer)
            .try_init();
    });
}
