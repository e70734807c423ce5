//! Run-wide cancellation token.
//!
//! Shared read-mostly by every group worker and checked between pages. Under
//! `GroupErrorPolicy::Abort` the first failing group trips it; the `sbx` CLI
//! also trips it on Ctrl-C.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    flag: Arc<AtomicBool>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation. Returns true if this call tripped the token.
    pub fn cancel(&self) -> bool {
        !self.flag.swap(true, Ordering::Relaxed)
    }

    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::Relaxed)
    }
}
