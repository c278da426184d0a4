//! Coveron runtime: coverage markers for instrumented programs
//!
//! The instrumenter rewrites each source file so that statements, decisions
//! and conditions call into this crate. Every call appends a small binary
//! record to the file's CRI (coverage run info) log; a separate analyzer
//! later matches those records against the instrumentation metadata.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                    Coveron Runtime                              │
//! ├─────────────────────────────────────────────────────────────────┤
//! │   ┌──────────────┐   ┌──────────────┐   ┌──────────────┐        │
//! │   │ Instrumented │   │ CoverageFile │   │ CriStorage   │        │
//! │   │ code         │──►│ (lifecycle,  │──►│ (fs, memory) │──► .cri│
//! │   │ markers      │   │  encoding)   │   │              │        │
//! │   └──────────────┘   └──────────────┘   └──────────────┘        │
//! │                                                                 │
//! │   ┌──────────────┐                                              │
//! │   │ CriReader    │◄── .cri   (analysis, `cri` CLI, tests)       │
//! │   └──────────────┘                                              │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Example
//!
//! ```no_run
//! use coveron_runtime::prelude::*;
//!
//! static COVERAGE: StaticCoverageFile = StaticCoverageFile::new(
//!     CriIdentity::from_bytes([0x11; 32], [0x22; 16]),
//!     "target/main.cri",
//! );
//!
//! fn clamp(value: i32) -> i32 {
//!     COVERAGE.statement(MarkerId::new(0, 0, 0, 1));
//!     if COVERAGE.decision(MarkerId::new(0, 0, 0, 2), value > 100) {
//!         return 100;
//!     }
//!     value
//! }
//! # let _ = clamp(7);
//! ```
//!
//! Marker calls never fail and never panic. If the log cannot be opened or
//! written, records are dropped and decisions still evaluate normally.

#![warn(missing_docs)]
// Lints are configured in workspace Cargo.toml [workspace.lints.clippy]
#![cfg_attr(test, allow(clippy::unwrap_used, clippy::expect_used, clippy::cast_possible_truncation))]

pub mod bytes;
mod config;
pub mod cri;
#[allow(clippy::missing_errors_doc)]
mod lifecycle;
mod markers;
mod result;
mod storage;

pub use config::{MarkerCategories, RuntimeConfig};
pub use cri::{
    encode_evaluation, encode_execution_marker, encode_header, encode_statement, header_matches,
    read_cri_file, CriHeader, CriIdentity, CriLog, CriReader, CriRecord, EventKind, EventMarker,
    ExecutionComment, ExecutionTrail, FormatVersion, InstrumentationRandom, MarkerId, SourceHash,
    CRI_EXTENSION, EVENT_LEN, HEADER_LEN, MAGIC_NUMBER,
};
pub use lifecycle::{CoverageFile, InitOutcome, LifecycleState};
pub use markers::StaticCoverageFile;
pub use result::{CriError, CriResult};
pub use storage::{CriStorage, CriStream, FsStorage, MemoryStorage, MemoryStream};

/// Everything instrumented code and tooling usually need
pub mod prelude {
    pub use super::config::*;
    pub use super::cri::{
        read_cri_file, CriHeader, CriIdentity, CriLog, CriReader, CriRecord, EventKind,
        EventMarker, ExecutionComment, InstrumentationRandom, MarkerId, SourceHash,
    };
    pub use super::lifecycle::*;
    pub use super::markers::*;
    pub use super::result::*;
    pub use super::storage::{CriStorage, CriStream, FsStorage, MemoryStorage};
}
