//! CRI (coverage run info) wire format
//!
//! ```text
//! ┌──────────────┬──────────────────┬───────┬───────┬─────┬──────────────────┬─────
//! │ header (59B) │ execution marker │ event │ event │ ... │ execution marker │ ...
//! └──────────────┴──────────────────┴───────┴───────┴─────┴──────────────────┴─────
//! ```
//!
//! The header is written once per file. Each process run appends one
//! execution marker followed by its events. All multi-byte fields are
//! opaque byte strings; nothing here has an endianness.

mod event;
mod execution;
mod header;
mod identity;
mod reader;

pub use event::{
    encode_evaluation, encode_statement, EventKind, EventMarker, EVENT_LEN, FALSE_TAG,
    STATEMENT_TAG, TRUE_TAG,
};
pub use execution::{
    encode_execution_marker, ExecutionComment, EXECUTION_MAGIC, EXECUTION_OVERHEAD,
    EXECUTION_PADDING,
};
pub use header::{encode_header, header_matches, CriHeader, FormatVersion, HEADER_LEN, MAGIC_NUMBER};
pub use identity::{CriIdentity, InstrumentationRandom, MarkerId, SourceHash};
pub use reader::{read_cri_file, CriLog, CriReader, CriRecord, ExecutionTrail};

/// Conventional CRI file extension
pub const CRI_EXTENSION: &str = "cri";
