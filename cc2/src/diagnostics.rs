//! Soft-failure bookkeeping for the diagram engine.
//!
//! Recoverable irregularities (stale caches, unexpected orbital kinds,
//! mismatched vector sizes) are logged and collected here so a run can be
//! audited after the fact. Unrecoverable conditions abort through [`fatal`].

use std::cell::RefCell;

use tracing::{error, info, warn};

/// Accumulates warning messages over the lifetime of a calculation.
#[derive(Debug, Default)]
pub struct Diagnostics {
    warnings: RefCell<Vec<String>>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Diagnostics::default()
    }

    /// Record a warning and emit it on the log.
    pub fn warn(&self, msg: impl Into<String>) {
        let msg = msg.into();
        warn!("{}", msg);
        self.warnings.borrow_mut().push(msg);
    }

    pub fn warning_count(&self) -> usize {
        self.warnings.borrow().len()
    }

    pub fn warnings(&self) -> Vec<String> {
        self.warnings.borrow().clone()
    }

    /// Print the collected warnings at the end of a run.
    pub fn report(&self) {
        let warnings = self.warnings.borrow();
        if warnings.is_empty() {
            info!("No warnings recorded");
            return;
        }
        warn!("{} warning(s) recorded during this run:", warnings.len());
        for (n, w) in warnings.iter().enumerate() {
            warn!("  {:3}: {}", n + 1, w);
        }
    }
}

/// Abort on an unrecoverable inconsistency (unknown diagram name,
/// out-of-range orbital or pair index, intermediate read before update).
pub fn fatal(msg: &str) -> ! {
    error!("{}", msg);
    panic!("{}", msg);
}
