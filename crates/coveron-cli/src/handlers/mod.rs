//! Command handlers - kept out of main.rs for testability
//!
//! Each handler module contains:
//! - The execution logic for a CLI command
//! - Pure helper functions
//! - Tests

pub mod inspect;
pub mod verify;

pub use inspect::{build_report, execute_inspect, format_record, render_json, InspectReport};
pub use verify::{describe_mismatch, execute_verify, parse_identity, verify_header};
