//! Revocable guard over link operations.
//!
//! Once engaged, guarded operations become no-ops instead of acting on stale
//! routing state. Whether a rejected call is logged loudly is configurable;
//! the rejection itself is the contract.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{debug, warn};

#[derive(Debug, Clone)]
pub struct Killswitch {
    engaged: Arc<AtomicBool>,
    silent: bool,
}

impl Killswitch {
    pub fn new(silent: bool) -> Self {
        Self {
            engaged: Arc::new(AtomicBool::new(false)),
            silent,
        }
    }

    /// Engaging is permanent; there is no way back to live.
    pub fn engage(&self) {
        self.engaged.store(true, Ordering::Release);
    }

    pub fn is_engaged(&self) -> bool {
        self.engaged.load(Ordering::Acquire)
    }

    /// Gate for a guarded operation: `true` means proceed. An engaged switch
    /// reports the rejected call and returns `false`.
    pub fn check(&self, operation: &str) -> bool {
        if !self.is_engaged() {
            return true;
        }
        if self.silent {
            debug!(operation, "call through engaged killswitch ignored");
        } else {
            warn!(operation, "call through engaged killswitch ignored");
        }
        false
    }
}
