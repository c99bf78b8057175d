//! Build-wide abort flag.
//!
//! Raised by the Ctrl-C handler; polled by the manifest wait loop and by
//! render workers so a cancelled build stops instead of running to the end.

use std::sync::{
    Arc,
    atomic::{AtomicBool, Ordering},
};

/// Cloneable handle to a shared abort flag.
#[derive(Debug, Clone, Default)]
pub struct AbortSignal(Arc<AtomicBool>);

impl AbortSignal {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request the build to stop. Idempotent.
    pub fn raise(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    #[inline]
    pub fn is_raised(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}
