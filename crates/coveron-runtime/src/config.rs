//! Runtime configuration
//!
//! Everything here is decided when the instrumented program is built:
//!
//! - `COVERON_EXECUTION_COMMENT` (compile-time environment variable) sets
//!   the comment stamped into every execution marker.
//! - The `fresh-runs` feature turns off appending to a matching CRI file.
//! - The `statement`, `decision` and `condition` features compile the
//!   corresponding marker operations in or out.

use crate::cri::{EventMarker, ExecutionComment};
use serde::{Deserialize, Serialize};

/// How a handle treats an existing CRI file and what it stamps into it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuntimeConfig {
    /// Comment written into every execution marker
    pub comment: ExecutionComment,
    /// Append to a CRI file whose header matches instead of recreating it
    pub concatenate_executions: bool,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self::from_build()
    }
}

impl RuntimeConfig {
    /// Configuration baked in at build time
    #[must_use]
    pub const fn from_build() -> Self {
        let comment = match option_env!("COVERON_EXECUTION_COMMENT") {
            Some(text) => ExecutionComment::from_static(text),
            None => ExecutionComment::EMPTY,
        };
        Self {
            comment,
            concatenate_executions: !cfg!(feature = "fresh-runs"),
        }
    }

    /// Create the build-time configuration
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the execution comment
    #[must_use]
    pub fn with_comment(mut self, comment: ExecutionComment) -> Self {
        self.comment = comment;
        self
    }

    /// Enable or disable appending to a matching CRI file
    #[must_use]
    pub fn with_concatenated_executions(mut self, enabled: bool) -> Self {
        self.concatenate_executions = enabled;
        self
    }

    /// Always recreate the CRI file on first use
    #[must_use]
    pub fn fresh_runs(self) -> Self {
        self.with_concatenated_executions(false)
    }
}

/// Marker categories compiled into this build
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[allow(clippy::struct_excessive_bools)]
pub struct MarkerCategories {
    /// Statement markers available
    pub statement: bool,
    /// Decision markers available
    pub decision: bool,
    /// Condition markers available
    pub condition: bool,
}

impl MarkerCategories {
    /// Categories enabled through cargo features
    #[must_use]
    pub const fn compiled() -> Self {
        Self {
            statement: cfg!(feature = "statement"),
            decision: cfg!(feature = "decision"),
            condition: cfg!(feature = "condition"),
        }
    }

    /// Whether any marker can be emitted at all
    #[must_use]
    pub const fn any(self) -> bool {
        self.statement || self.decision || self.condition
    }

    /// Whether `marker` belongs to an enabled category
    #[must_use]
    pub const fn allows(self, marker: &EventMarker) -> bool {
        match marker {
            EventMarker::Statement(_) => self.statement,
            EventMarker::Decision(..) => self.decision,
            EventMarker::Condition(..) => self.condition,
        }
    }
}
