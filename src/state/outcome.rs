//! Per-document download outcomes

use std::fmt;
use std::path::PathBuf;

/// Result of one download task; never mutated after creation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Document written to the given path
    Ok(PathBuf),

    /// Request failed after retries, or the pool's budget was exhausted
    Failed(String),

    /// Nothing to do: invalid URL, file already present, missing or repeated
    /// identifier
    Skipped(String),
}

impl Outcome {
    pub const INVALID_URL: &'static str = "invalid url";
    pub const FILE_EXISTS: &'static str = "file exists";
    pub const MISSING_IDENTIFIER: &'static str = "missing identifier";
    pub const DUPLICATE_IDENTIFIER: &'static str = "duplicate identifier";

    pub fn label(&self) -> &'static str {
        match self {
            Self::Ok(_) => "OK",
            Self::Failed(_) => "FAILED",
            Self::Skipped(_) => "SKIPPED",
        }
    }

    pub fn is_ok(&self) -> bool {
        matches!(self, Self::Ok(_))
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, Self::Failed(_))
    }

    pub fn is_skipped(&self) -> bool {
        matches!(self, Self::Skipped(_))
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ok(path) => write!(f, "OK ({})", path.display()),
            Self::Failed(reason) => write!(f, "FAILED ({})", reason),
            Self::Skipped(reason) => write!(f, "SKIPPED ({})", reason),
        }
    }
}

/// An outcome tied to the record it came from
#[derive(Debug, Clone)]
pub struct TaskOutcome {
    /// Identifier as written on the page, or the record URL when missing
    pub identifier: String,

    pub outcome: Outcome,
}

impl TaskOutcome {
    pub fn new(identifier: impl Into<String>, outcome: Outcome) -> Self {
        Self {
            identifier: identifier.into(),
            outcome,
        }
    }
}
