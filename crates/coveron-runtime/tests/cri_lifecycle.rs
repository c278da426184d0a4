//! End-to-end CRI log tests against the real filesystem.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::unreachable)]
#![cfg(all(feature = "statement", feature = "decision", feature = "condition"))]

use coveron_runtime::prelude::*;
use coveron_runtime::{encode_execution_marker, encode_header, encode_statement, HEADER_LEN};
use std::fs;
use std::path::Path;
use tempfile::TempDir;

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn identity() -> CriIdentity {
    CriIdentity::new(
        SourceHash::of_source("int main(void) { return 0; }\n"),
        InstrumentationRandom::new([
            0x50, 0x51, 0x52, 0x53, 0x54, 0x55, 0x56, 0x57, 0x58, 0x59, 0x5A, 0x5B, 0x5C, 0x5D,
            0x5E, 0x5F,
        ]),
    )
}

fn config(comment: &str) -> RuntimeConfig {
    RuntimeConfig::new()
        .with_comment(ExecutionComment::new(comment.to_string()).unwrap())
        .with_concatenated_executions(true)
}

/// One process run: open a handle, emit markers, drop it
fn run_program(path: &Path, comment: &str, inputs: &[i32]) {
    let mut cov = CoverageFile::new(identity(), path).with_config(config(comment));
    for &value in inputs {
        cov.statement(MarkerId::new(0, 0, 0, 1));
        let in_range = cov.condition(MarkerId::new(0, 0, 1, 1), value >= 0)
            && cov.condition(MarkerId::new(0, 0, 1, 2), value < 10);
        if cov.decision(MarkerId::new(0, 0, 1, 0), in_range) {
            cov.statement(MarkerId::new(0, 0, 0, 2));
        }
    }
}

#[test]
fn test_open_failure_recreates_with_header_and_execution() {
    init_tracing();
    let storage = MemoryStorage::new();
    storage.fail_open_append(true);
    let mut cov = CoverageFile::with_storage(identity(), "scenario.cri", storage.clone())
        .with_config(config("nightly"));

    assert_eq!(cov.initialize().unwrap(), InitOutcome::Recreated);

    let mut expected = encode_header(&identity()).to_vec();
    expected.extend_from_slice(&[0, 0, 0, 0, 0, 0x52, 0x55, 0x4E, 0x21]);
    expected.extend_from_slice(b"nightly\0\n");
    assert_eq!(storage.contents("scenario.cri").unwrap(), expected);
}

#[test]
fn test_matching_file_keeps_prior_records() {
    init_tracing();
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("prior.cri");

    let mut existing = encode_header(&identity()).to_vec();
    for i in 0..20u8 {
        existing.extend_from_slice(&encode_statement(MarkerId::new(1, 2, 3, i)));
    }
    assert_eq!(existing.len(), HEADER_LEN + 100);
    fs::write(&path, &existing).unwrap();

    let mut cov = CoverageFile::new(identity(), &path).with_config(config(""));
    assert_eq!(cov.initialize().unwrap(), InitOutcome::Appended);
    drop(cov);

    let contents = fs::read(&path).unwrap();
    assert_eq!(&contents[..existing.len()], &existing[..]);
    assert_eq!(
        &contents[existing.len()..],
        &encode_execution_marker(&ExecutionComment::EMPTY)[..]
    );
}

#[test]
fn test_concatenated_runs_decode_in_order() {
    init_tracing();
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("runs.cri");

    run_program(&path, "run-1", &[3]);
    run_program(&path, "run-2", &[42, -1]);

    let log = read_cri_file(&path).unwrap();
    assert_eq!(log.header.identity, identity());
    assert!(log.leading_events().is_empty());

    let runs = log.executions();
    assert_eq!(runs.len(), 2);
    assert_eq!(runs[0].comment, "run-1");
    assert_eq!(runs[1].comment, "run-2");

    // 3: statement, cond true, cond true, decision true, statement
    let first: Vec<_> = runs[0]
        .events
        .iter()
        .map(|record| match *record {
            CriRecord::Event { marker_id, kind, .. } => (marker_id, kind),
            CriRecord::Execution { .. } => unreachable!("events only"),
        })
        .collect();
    assert_eq!(
        first,
        vec![
            (MarkerId::new(0, 0, 0, 1), EventKind::Statement),
            (MarkerId::new(0, 0, 1, 1), EventKind::Evaluation(true)),
            (MarkerId::new(0, 0, 1, 2), EventKind::Evaluation(true)),
            (MarkerId::new(0, 0, 1, 0), EventKind::Evaluation(true)),
            (MarkerId::new(0, 0, 0, 2), EventKind::Statement),
        ]
    );

    // 42: four records (second condition false). -1: three (short-circuit).
    assert_eq!(runs[1].events.len(), 4 + 3);
}

#[test]
fn test_reinstrumentation_discards_old_runs() {
    init_tracing();
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("reinstrumented.cri");
    run_program(&path, "old", &[1, 2, 3]);

    let fresh = CriIdentity::new(identity().source_hash, InstrumentationRandom::generate());
    let mut cov = CoverageFile::new(fresh, &path).with_config(config("new"));
    cov.statement(MarkerId::new(9, 9, 9, 9));
    drop(cov);

    let log = read_cri_file(&path).unwrap();
    assert_eq!(log.header.identity, fresh);
    assert_eq!(log.execution_count(), 1);
    assert_eq!(log.executions()[0].comment, "new");
    assert_eq!(log.event_count(), 1);
}

#[test]
fn test_fresh_runs_replace_previous_runs() {
    init_tracing();
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("fresh.cri");
    run_program(&path, "first", &[5]);

    let mut cov = CoverageFile::new(identity(), &path)
        .with_config(config("second").fresh_runs());
    cov.statement(MarkerId::new(0, 0, 0, 1));
    drop(cov);

    let log = read_cri_file(&path).unwrap();
    assert_eq!(log.execution_count(), 1);
    assert_eq!(log.executions()[0].comment, "second");
}

#[test]
fn test_unwritable_location_leaves_program_unaffected() {
    init_tracing();
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("missing-dir").join("log.cri");

    let mut cov = CoverageFile::new(identity(), &path).with_config(config(""));
    assert!(cov.decision(MarkerId::new(0, 0, 0, 1), true));
    assert!(!cov.condition(MarkerId::new(0, 0, 0, 2), false));
    assert_eq!(cov.state(), LifecycleState::Uninitialized);
    assert_eq!(cov.init_failures(), 2);
    assert!(!path.exists());

    // Once the directory shows up, the next marker initializes
    fs::create_dir(dir.path().join("missing-dir")).unwrap();
    cov.statement(MarkerId::new(0, 0, 0, 3));
    assert!(cov.is_initialized());
    drop(cov);
    assert_eq!(read_cri_file(&path).unwrap().event_count(), 1);
}

#[test]
fn test_static_handle_across_threads() {
    static COVERAGE: StaticCoverageFile = StaticCoverageFile::new(
        CriIdentity::from_bytes([0x33; 32], [0x44; 16]),
        "target/coveron-runtime-static-threads.cri",
    );

    let _ = fs::create_dir_all("target");
    let _ = fs::remove_file(COVERAGE.output_path());

    let workers: Vec<_> = (0..4u8)
        .map(|t| {
            std::thread::spawn(move || {
                for i in 0..25u8 {
                    COVERAGE.statement(MarkerId::new(t + 1, 0, 0, i));
                }
            })
        })
        .collect();
    for worker in workers {
        worker.join().unwrap();
    }

    assert_eq!(COVERAGE.state(), LifecycleState::Initialized);
    let log = read_cri_file(COVERAGE.output_path()).unwrap();
    assert_eq!(log.execution_count(), 1);
    assert_eq!(log.event_count(), 100);
}
