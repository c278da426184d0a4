//! CRI File Lifecycle
//!
//! A [`CoverageFile`] starts `Uninitialized`. The first marker written
//! through it runs the open/validate/recreate sequence exactly once:
//!
//! ```text
//! open read+append ──fail──────────────────────────┐
//!      │                                            ▼
//! read 59 bytes ──short or differs──────────► truncate + write header
//!      │ matches                                    │
//! seek to end                                       │
//!      │                                            │
//!      └──────────► write execution marker ◄────────┘
//!                           │
//!                      Initialized
//! ```
//!
//! With concatenation disabled the sequence starts at the truncating open.
//! Once `Initialized`, every marker is a plain append with no further
//! checks. If the sequence fails, the handle stays `Uninitialized`, marker
//! calls write nothing, and the next marker call tries again.
//!
//! A record that fails partway is cut back off the file, so the log stays
//! decodable record by record. If even that fails, the next initialization
//! recreates the file instead of appending to it.
//!
//! One writer per output file: two handles (or two processes) appending to
//! the same path interleave their records. Keeping writers apart is the
//! caller's job.

use crate::config::RuntimeConfig;
use crate::cri::{encode_execution_marker, encode_header, header_matches, CriIdentity, HEADER_LEN};
use crate::result::CriResult;
use crate::storage::{CriStorage, CriStream, FsStorage};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::io::{self, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, info, trace, warn};

/// Lifecycle state of a handle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LifecycleState {
    /// Nothing written by this handle in this process yet
    Uninitialized,
    /// Stream open, positioned at the end of a file whose header matches
    Initialized,
}

/// How initialization went
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum InitOutcome {
    /// Existing file matched; a new execution was appended to it
    Appended,
    /// File was (re)created with a fresh header
    Recreated,
    /// The handle was already initialized; nothing happened
    AlreadyInitialized,
}

/// One instrumented source file's CRI log handle
pub struct CoverageFile<S: CriStorage = FsStorage> {
    identity: CriIdentity,
    output_path: PathBuf,
    config: RuntimeConfig,
    storage: S,
    /// `Some` exactly when initialized
    stream: Option<S::Stream>,
    /// Length of the file up to the last complete record
    committed_len: u64,
    /// A partial record could not be removed; start over on the next init
    damaged: bool,
    init_failures: u64,
    write_failures: u64,
}

impl CoverageFile<FsStorage> {
    /// Create a filesystem-backed handle using the build-time configuration
    #[must_use]
    pub fn new(identity: CriIdentity, output_path: impl Into<PathBuf>) -> Self {
        Self::with_storage(identity, output_path, FsStorage)
    }
}

impl<S: CriStorage> CoverageFile<S> {
    /// Create a handle on custom storage
    #[must_use]
    pub fn with_storage(identity: CriIdentity, output_path: impl Into<PathBuf>, storage: S) -> Self {
        Self {
            identity,
            output_path: output_path.into(),
            config: RuntimeConfig::from_build(),
            storage,
            stream: None,
            committed_len: 0,
            damaged: false,
            init_failures: 0,
            write_failures: 0,
        }
    }

    /// Replace the runtime configuration
    ///
    /// Only affects a handle that has not initialized yet.
    #[must_use]
    pub fn with_config(mut self, config: RuntimeConfig) -> Self {
        self.config = config;
        self
    }

    /// Identity this handle writes
    #[must_use]
    pub const fn identity(&self) -> &CriIdentity {
        &self.identity
    }

    /// Destination CRI file
    #[must_use]
    pub fn output_path(&self) -> &Path {
        &self.output_path
    }

    /// Active configuration
    #[must_use]
    pub const fn config(&self) -> &RuntimeConfig {
        &self.config
    }

    /// Current lifecycle state
    #[must_use]
    pub const fn state(&self) -> LifecycleState {
        if self.stream.is_some() {
            LifecycleState::Initialized
        } else {
            LifecycleState::Uninitialized
        }
    }

    /// Whether the open/validate/recreate sequence has completed
    #[must_use]
    pub const fn is_initialized(&self) -> bool {
        self.stream.is_some()
    }

    /// Failed initialization attempts so far
    #[must_use]
    pub const fn init_failures(&self) -> u64 {
        self.init_failures
    }

    /// Event records that could not be written completely
    #[must_use]
    pub const fn write_failures(&self) -> u64 {
        self.write_failures
    }

    /// Run the initialization sequence now instead of on the first marker.
    ///
    /// Idempotent: an initialized handle reports
    /// [`InitOutcome::AlreadyInitialized`]. A failure leaves the handle
    /// uninitialized and is counted like one triggered by a marker.
    pub fn initialize(&mut self) -> CriResult<InitOutcome> {
        if self.is_initialized() {
            return Ok(InitOutcome::AlreadyInitialized);
        }

        match self.setup() {
            Ok((stream, len, outcome)) => {
                self.stream = Some(stream);
                self.committed_len = len;
                self.damaged = false;
                Ok(outcome)
            }
            Err(e) => {
                self.init_failures += 1;
                if self.init_failures == 1 {
                    warn!(
                        path = %self.output_path.display(),
                        error = %e,
                        "Coverage log unavailable, markers will be dropped"
                    );
                } else {
                    debug!(
                        path = %self.output_path.display(),
                        error = %e,
                        attempts = self.init_failures,
                        "Coverage log still unavailable"
                    );
                }
                Err(e)
            }
        }
    }

    fn setup(&self) -> CriResult<(S::Stream, u64, InitOutcome)> {
        if !self.config.concatenate_executions || self.damaged {
            return self.recreated();
        }

        let mut stream = match self.storage.open_append(&self.output_path) {
            Ok(stream) => stream,
            Err(e) => {
                debug!(
                    path = %self.output_path.display(),
                    error = %e,
                    "Append open failed, recreating coverage log"
                );
                return self.recreated();
            }
        };

        if !self.existing_header_matches(&mut stream) {
            debug!(
                path = %self.output_path.display(),
                "Coverage log header is foreign or damaged, recreating"
            );
            drop(stream);
            return self.recreated();
        }

        let end = stream.seek(SeekFrom::End(0))?;
        let marker = encode_execution_marker(&self.config.comment);
        if let Err(e) = stream.write_all(&marker) {
            if let Err(rollback) = stream.set_len(end) {
                warn!(
                    path = %self.output_path.display(),
                    error = %rollback,
                    "Partial execution marker left behind, recreating coverage log"
                );
                drop(stream);
                return self.recreated();
            }
            return Err(e.into());
        }
        info!(
            path = %self.output_path.display(),
            previous_len = end,
            "Appending execution to coverage log"
        );
        Ok((stream, end + marker.len() as u64, InitOutcome::Appended))
    }

    fn recreated(&self) -> CriResult<(S::Stream, u64, InitOutcome)> {
        let (stream, len) = self.recreate()?;
        Ok((stream, len, InitOutcome::Recreated))
    }

    fn existing_header_matches(&self, stream: &mut S::Stream) -> bool {
        let mut candidate = Vec::with_capacity(HEADER_LEN);
        let read = stream.seek(SeekFrom::Start(0)).and_then(|_| {
            Read::by_ref(&mut *stream)
                .take(HEADER_LEN as u64)
                .read_to_end(&mut candidate)
        });

        match read {
            Ok(_) => header_matches(&candidate, &self.identity),
            Err(e) => {
                debug!(error = %e, "Reading coverage log header failed");
                false
            }
        }
    }

    fn recreate(&self) -> CriResult<(S::Stream, u64)> {
        let mut stream = self.storage.recreate(&self.output_path)?;

        let comment = &self.config.comment;
        let mut preamble = Vec::with_capacity(HEADER_LEN + comment.marker_len());
        preamble.extend_from_slice(&encode_header(&self.identity));
        preamble.extend_from_slice(&encode_execution_marker(comment));
        stream.write_all(&preamble)?;

        info!(path = %self.output_path.display(), "Created coverage log");
        Ok((stream, preamble.len() as u64))
    }

    /// Append one record, initializing first if needed.
    ///
    /// Never fails: without a usable stream the record is dropped.
    pub(crate) fn append(&mut self, record: &[u8]) {
        if self.stream.is_none() && self.initialize().is_err() {
            return;
        }
        let Some(stream) = self.stream.as_mut() else {
            return;
        };
        match stream.write_all(record) {
            Ok(()) => self.committed_len += record.len() as u64,
            Err(e) => {
                let rollback = stream.set_len(self.committed_len);
                self.note_write_failure(&e);
                if let Err(rollback) = rollback {
                    warn!(
                        path = %self.output_path.display(),
                        error = %rollback,
                        "Partial coverage record left behind, log will be recreated"
                    );
                    self.stream = None;
                    self.damaged = true;
                }
            }
        }
    }

    fn note_write_failure(&mut self, error: &io::Error) {
        self.write_failures += 1;
        if self.write_failures == 1 {
            warn!(
                path = %self.output_path.display(),
                error = %error,
                "Coverage record write failed, log may be incomplete"
            );
        } else {
            trace!(error = %error, failures = self.write_failures, "Coverage record write failed");
        }
    }
}

impl<S: CriStorage> fmt::Debug for CoverageFile<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CoverageFile")
            .field("identity", &self.identity)
            .field("output_path", &self.output_path)
            .field("config", &self.config)
            .field("state", &self.state())
            .field("init_failures", &self.init_failures)
            .field("write_failures", &self.write_failures)
            .finish_non_exhaustive()
    }
}
