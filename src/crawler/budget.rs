//! Consecutive-failure budgets
//!
//! A budget belongs to one unit of work (a source's listing, a source's
//! detail pages, a download pool). Success resets it; reaching the ceiling
//! tells the caller to stop that unit and move on.

use std::sync::atomic::{AtomicU32, Ordering};

/// What the caller should do after recording an attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Continue,
    Abandon,
}

/// Consecutive-failure counter owned by a single sequential unit of work
#[derive(Debug, Clone)]
pub struct ErrorBudget {
    ceiling: u32,
    failures: u32,
}

impl ErrorBudget {
    pub fn new(ceiling: u32) -> Self {
        Self {
            ceiling,
            failures: 0,
        }
    }

    /// Records one attempt
    ///
    /// Returns `Abandon` on the failure that brings the counter to the
    /// ceiling, and on every failure after that.
    pub fn record(&mut self, success: bool) -> Decision {
        if success {
            self.failures = 0;
            return Decision::Continue;
        }

        self.failures = self.failures.saturating_add(1);
        if self.failures >= self.ceiling {
            Decision::Abandon
        } else {
            Decision::Continue
        }
    }

    /// Current consecutive failure count
    pub fn failures(&self) -> u32 {
        self.failures
    }

    pub fn ceiling(&self) -> u32 {
        self.ceiling
    }

    pub fn is_exhausted(&self) -> bool {
        self.failures >= self.ceiling
    }
}

/// `ErrorBudget` shared between concurrent workers
#[derive(Debug)]
pub struct SharedErrorBudget {
    ceiling: u32,
    failures: AtomicU32,
}

impl SharedErrorBudget {
    pub fn new(ceiling: u32) -> Self {
        Self {
            ceiling,
            failures: AtomicU32::new(0),
        }
    }

    pub fn record(&self, success: bool) -> Decision {
        if success {
            self.failures.store(0, Ordering::SeqCst);
            return Decision::Continue;
        }

        let failures = self.failures.fetch_add(1, Ordering::SeqCst).saturating_add(1);
        if failures >= self.ceiling {
            Decision::Abandon
        } else {
            Decision::Continue
        }
    }

    pub fn failures(&self) -> u32 {
        self.failures.load(Ordering::SeqCst)
    }

    pub fn is_exhausted(&self) -> bool {
        self.failures() >= self.ceiling
    }
}
