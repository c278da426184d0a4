//! Marker operations called from instrumented code.
//!
//! Decision and condition markers take the evaluated boolean and return it
//! unchanged, so the instrumenter can wrap each operand in place:
//!
//! ```
//! use coveron_runtime::{CoverageFile, CriIdentity, MarkerId};
//! # use coveron_runtime::MemoryStorage;
//!
//! # let storage = MemoryStorage::new();
//! # let mut cov = CoverageFile::with_storage(
//! #     CriIdentity::from_bytes([0; 32], [0; 16]), "doc.cri", storage);
//! let (a, b) = (4, 2);
//! let conditions = cov.condition(MarkerId::new(0x61, 0x62, 0x63, 0x64), a == 5)
//!     && cov.condition(MarkerId::new(0x71, 0x72, 0x73, 0x74), b == 2);
//! let taken = cov.decision(MarkerId::new(0x51, 0x52, 0x53, 0x54), conditions);
//! assert!(!taken);
//! ```
//!
//! Because each operand is its own call, `&&` and `||` keep their
//! short-circuit behavior: a skipped operand writes no record.
//!
//! Marker categories disabled at build time have no method at all;
//! [`CoverageFile::record`] drops markers of those categories.

#![cfg_attr(
    not(any(feature = "statement", feature = "decision", feature = "condition")),
    allow(unused_imports)
)]

use crate::config::MarkerCategories;
use crate::cri::{CriIdentity, EventMarker, MarkerId};
use crate::lifecycle::{CoverageFile, LifecycleState};
use crate::storage::CriStorage;
use std::sync::{Mutex, MutexGuard, PoisonError};

#[cfg(feature = "statement")]
use crate::cri::encode_statement;
#[cfg(any(feature = "decision", feature = "condition"))]
use crate::cri::encode_evaluation;

impl<S: CriStorage> CoverageFile<S> {
    /// Write a prebuilt marker
    #[inline]
    pub fn record(&mut self, marker: EventMarker) {
        if MarkerCategories::compiled().allows(&marker) {
            self.append(&marker.encode());
        }
    }

    /// Record that a statement was reached
    #[cfg(feature = "statement")]
    #[inline]
    pub fn statement(&mut self, id: MarkerId) {
        self.append(&encode_statement(id));
    }

    /// Record a decision outcome and pass it through
    #[cfg(feature = "decision")]
    #[inline]
    pub fn decision(&mut self, id: MarkerId, outcome: bool) -> bool {
        let (record, outcome) = encode_evaluation(id, outcome);
        self.append(&record);
        outcome
    }

    /// Record a condition outcome and pass it through
    #[cfg(feature = "condition")]
    #[inline]
    pub fn condition(&mut self, id: MarkerId, outcome: bool) -> bool {
        let (record, outcome) = encode_evaluation(id, outcome);
        self.append(&record);
        outcome
    }
}

/// A process-wide handle that can live in a `static`
///
/// Generated code declares one per instrumented source file and calls it
/// from every call site. The underlying [`CoverageFile`] is created on the
/// first marker and kept for the rest of the process; a mutex orders
/// records from concurrent threads. It does not coordinate processes.
///
/// ```
/// use coveron_runtime::{CriIdentity, MarkerId, StaticCoverageFile};
///
/// static COVERAGE: StaticCoverageFile = StaticCoverageFile::new(
///     CriIdentity::from_bytes([0xA0; 32], [0x50; 16]),
///     "target/doc_static.cri",
/// );
///
/// fn is_even(n: u32) -> bool {
///     COVERAGE.decision(MarkerId::new(0, 0, 0, 1), n % 2 == 0)
/// }
/// # let _ = is_even;
/// ```
#[derive(Debug)]
pub struct StaticCoverageFile {
    identity: CriIdentity,
    output_path: &'static str,
    handle: Mutex<Option<CoverageFile>>,
}

impl StaticCoverageFile {
    /// Declare a handle; nothing is opened until the first marker
    #[must_use]
    pub const fn new(identity: CriIdentity, output_path: &'static str) -> Self {
        Self {
            identity,
            output_path,
            handle: Mutex::new(None),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Option<CoverageFile>> {
        // A panic elsewhere while holding the lock leaves the handle usable
        self.handle.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn with_handle<R>(&self, f: impl FnOnce(&mut CoverageFile) -> R) -> R {
        let mut guard = self.lock();
        let handle =
            guard.get_or_insert_with(|| CoverageFile::new(self.identity, self.output_path));
        f(handle)
    }

    /// Identity written by this handle
    #[must_use]
    pub const fn identity(&self) -> &CriIdentity {
        &self.identity
    }

    /// Destination CRI file
    #[must_use]
    pub const fn output_path(&self) -> &'static str {
        self.output_path
    }

    /// Current lifecycle state
    #[must_use]
    pub fn state(&self) -> LifecycleState {
        self.lock()
            .as_ref()
            .map_or(LifecycleState::Uninitialized, CoverageFile::state)
    }

    /// Event records that could not be written completely
    #[must_use]
    pub fn write_failures(&self) -> u64 {
        self.lock().as_ref().map_or(0, CoverageFile::write_failures)
    }

    /// Write a prebuilt marker
    pub fn record(&self, marker: EventMarker) {
        self.with_handle(|file| file.record(marker));
    }

    /// Record that a statement was reached
    #[cfg(feature = "statement")]
    #[inline]
    pub fn statement(&self, id: MarkerId) {
        self.with_handle(|file| file.statement(id));
    }

    /// Record a decision outcome and pass it through
    #[cfg(feature = "decision")]
    #[inline]
    pub fn decision(&self, id: MarkerId, outcome: bool) -> bool {
        self.with_handle(|file| file.decision(id, outcome))
    }

    /// Record a condition outcome and pass it through
    #[cfg(feature = "condition")]
    #[inline]
    pub fn condition(&self, id: MarkerId, outcome: bool) -> bool {
        self.with_handle(|file| file.condition(id, outcome))
    }
}
