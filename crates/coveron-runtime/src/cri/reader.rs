//! Positional CRI decoder.
//!
//! Splits a CRI file back into its header and record trail. This is an
//! inspection aid: it does not compute coverage.
//!
//! Records carry no length prefix. At each position, five zero bytes
//! followed by `RUN!` open an execution marker; anything else is a 5-byte
//! event. A statement with ID `00000000` directly followed by an event with
//! ID `52554E21` would be read as an execution marker; instrumenters do not
//! hand out ID zero.

use super::event::{EventKind, EVENT_LEN};
use super::execution::{EXECUTION_MAGIC, EXECUTION_PADDING};
use super::header::{header_matches, CriHeader, HEADER_LEN};
use super::identity::{CriIdentity, MarkerId};
use crate::result::{CriError, CriResult};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// One decoded record with its byte offset in the file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "record", rename_all = "snake_case")]
pub enum CriRecord {
    /// Start of an execution
    Execution {
        /// Byte offset of the marker
        offset: usize,
        /// Build-time comment
        comment: String,
    },
    /// Statement, decision or condition event
    Event {
        /// Byte offset of the record
        offset: usize,
        /// Marker ID
        marker_id: MarkerId,
        /// Record kind and outcome
        kind: EventKind,
    },
}

impl CriRecord {
    /// Byte offset of the record
    #[must_use]
    pub const fn offset(&self) -> usize {
        match self {
            Self::Execution { offset, .. } | Self::Event { offset, .. } => *offset,
        }
    }

    /// Whether this is an execution marker
    #[must_use]
    pub const fn is_execution(&self) -> bool {
        matches!(self, Self::Execution { .. })
    }
}

/// One execution and the events recorded during it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExecutionTrail<'a> {
    /// Byte offset of the execution marker
    pub offset: usize,
    /// Build-time comment of the execution
    pub comment: &'a str,
    /// Events in write order
    pub events: &'a [CriRecord],
}

/// A fully decoded CRI file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CriLog {
    /// File header
    pub header: CriHeader,
    /// Records in write order
    pub records: Vec<CriRecord>,
}

impl CriLog {
    /// Number of execution markers
    #[must_use]
    pub fn execution_count(&self) -> usize {
        self.records.iter().filter(|r| r.is_execution()).count()
    }

    /// Number of event records
    #[must_use]
    pub fn event_count(&self) -> usize {
        self.records.len() - self.execution_count()
    }

    /// Events written before any execution marker
    ///
    /// The runtime never produces these; a non-empty result means the file
    /// was written by something else.
    #[must_use]
    pub fn leading_events(&self) -> &[CriRecord] {
        let end = self
            .records
            .iter()
            .position(CriRecord::is_execution)
            .unwrap_or(self.records.len());
        &self.records[..end]
    }

    /// Group events by the execution they belong to
    #[must_use]
    pub fn executions(&self) -> Vec<ExecutionTrail<'_>> {
        let starts: Vec<usize> = self
            .records
            .iter()
            .enumerate()
            .filter_map(|(i, r)| r.is_execution().then_some(i))
            .collect();

        starts
            .iter()
            .enumerate()
            .filter_map(|(n, &start)| {
                let end = starts.get(n + 1).copied().unwrap_or(self.records.len());
                match &self.records[start] {
                    CriRecord::Execution { offset, comment } => Some(ExecutionTrail {
                        offset: *offset,
                        comment,
                        events: &self.records[start + 1..end],
                    }),
                    CriRecord::Event { .. } => None,
                }
            })
            .collect()
    }
}

/// Decoder over an in-memory CRI file
#[derive(Debug)]
pub struct CriReader<'a> {
    bytes: &'a [u8],
}

impl<'a> CriReader<'a> {
    /// Wrap raw file contents
    #[must_use]
    pub const fn new(bytes: &'a [u8]) -> Self {
        Self { bytes }
    }

    /// Decode the header only
    pub fn header(&self) -> CriResult<CriHeader> {
        CriHeader::decode(self.bytes)
    }

    /// Check the header against `identity` the way the lifecycle does
    ///
    /// Byte-exact over all 59 bytes, version included. Returns the decoded
    /// header on success.
    pub fn verify(&self, identity: &CriIdentity) -> CriResult<CriHeader> {
        if header_matches(self.bytes, identity) {
            return self.header();
        }
        // Prefer the structural error when the bytes are not a header at all
        self.header()?;
        Err(CriError::HeaderMismatch)
    }

    /// Decode header and every record
    pub fn decode(&self) -> CriResult<CriLog> {
        let header = self.header()?;
        let mut records = Vec::new();
        let mut offset = HEADER_LEN;

        while offset < self.bytes.len() {
            let (record, next) = self.record_at(offset)?;
            records.push(record);
            offset = next;
        }

        Ok(CriLog { header, records })
    }

    fn record_at(&self, offset: usize) -> CriResult<(CriRecord, usize)> {
        let rest = &self.bytes[offset..];
        let opens_execution = rest.len() >= EXECUTION_PADDING.len() + EXECUTION_MAGIC.len()
            && rest[..5] == EXECUTION_PADDING
            && rest[5..9] == EXECUTION_MAGIC;

        if opens_execution {
            return Self::execution_at(rest, offset);
        }

        let Some(record) = rest.get(..EVENT_LEN) else {
            return Err(CriError::TruncatedRecord {
                offset,
                needed: EVENT_LEN,
                available: rest.len(),
            });
        };
        let kind = EventKind::from_tag(record[4]).ok_or(CriError::UnknownTag {
            offset,
            tag: record[4],
        })?;
        let marker_id = MarkerId::new(record[0], record[1], record[2], record[3]);

        Ok((
            CriRecord::Event {
                offset,
                marker_id,
                kind,
            },
            offset + EVENT_LEN,
        ))
    }

    fn execution_at(rest: &[u8], offset: usize) -> CriResult<(CriRecord, usize)> {
        let body = &rest[9..];
        let Some(nul) = body.iter().position(|&b| b == 0) else {
            return Err(CriError::MalformedExecutionMarker {
                offset,
                message: "comment is not NUL terminated".to_string(),
            });
        };
        if body.get(nul + 1) != Some(&b'\n') {
            return Err(CriError::MalformedExecutionMarker {
                offset,
                message: "missing newline after comment".to_string(),
            });
        }

        let comment = String::from_utf8_lossy(&body[..nul]).into_owned();
        // padding + magic + comment + NUL + newline
        let len = 9 + nul + 2;
        Ok((CriRecord::Execution { offset, comment }, offset + len))
    }
}

/// Read and decode a CRI file from disk
pub fn read_cri_file(path: impl AsRef<Path>) -> CriResult<CriLog> {
    let bytes = std::fs::read(path)?;
    CriReader::new(&bytes).decode()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cri::{
        encode_evaluation, encode_execution_marker, encode_header, encode_statement,
        ExecutionComment,
    };

    fn identity() -> CriIdentity {
        CriIdentity::from_bytes([0x11; 32], [0x22; 16])
    }

    fn file_with(parts: &[&[u8]]) -> Vec<u8> {
        let mut bytes = encode_header(&identity()).to_vec();
        for part in parts {
            bytes.extend_from_slice(part);
        }
        bytes
    }

    #[test]
    fn test_verify_identity() {
        let bytes = file_with(&[&encode_statement(MarkerId::new(1, 2, 3, 4))]);
        let reader = CriReader::new(&bytes);

        assert_eq!(reader.verify(&identity()).unwrap().identity, identity());

        let other = CriIdentity::from_bytes([0x11; 32], [0x23; 16]);
        assert!(matches!(
            reader.verify(&other),
            Err(CriError::HeaderMismatch)
        ));
        assert!(matches!(
            CriReader::new(b"IMACRIF!").verify(&identity()),
            Err(CriError::InvalidLength { .. })
        ));
    }

    #[test]
    fn test_verify_rejects_foreign_version() {
        let mut bytes = file_with(&[]);
        bytes[9] = 0x02;
        assert!(matches!(
            CriReader::new(&bytes).verify(&identity()),
            Err(CriError::HeaderMismatch)
        ));
    }

    #[test]
    fn test_decode_header_only_file() {
        let bytes = file_with(&[]);
        let log = CriReader::new(&bytes).decode().unwrap();
        assert_eq!(log.header.identity, identity());
        assert!(log.records.is_empty());
        assert!(log.executions().is_empty());
    }

    #[test]
    fn test_decode_executions_and_events() {
        let first = encode_execution_marker(&ExecutionComment::EMPTY);
        let second = encode_execution_marker(&ExecutionComment::new("rerun").unwrap());
        let stmt = encode_statement(MarkerId::new(0xA1, 0xA2, 0xA3, 0xA4));
        let (yes, _) = encode_evaluation(MarkerId::new(0x51, 0x52, 0x53, 0x54), true);
        let (no, _) = encode_evaluation(MarkerId::new(0x61, 0x62, 0x63, 0x64), false);

        let bytes = file_with(&[&first, &stmt, &yes, &second, &no]);
        let log = CriReader::new(&bytes).decode().unwrap();

        assert_eq!(log.execution_count(), 2);
        assert_eq!(log.event_count(), 3);
        assert!(log.leading_events().is_empty());

        let runs = log.executions();
        assert_eq!(runs.len(), 2);
        assert_eq!(runs[0].offset, HEADER_LEN);
        assert_eq!(runs[0].comment, "");
        assert_eq!(runs[0].events.len(), 2);
        assert_eq!(runs[1].comment, "rerun");
        assert_eq!(
            runs[1].events,
            &[CriRecord::Event {
                offset: HEADER_LEN + first.len() + 10 + second.len(),
                marker_id: MarkerId::new(0x61, 0x62, 0x63, 0x64),
                kind: EventKind::Evaluation(false),
            }]
        );
    }

    #[test]
    fn test_decode_reports_truncated_event() {
        let marker = encode_execution_marker(&ExecutionComment::EMPTY);
        let bytes = file_with(&[&marker, &[0xA1, 0xA2]]);
        let err = CriReader::new(&bytes).decode().unwrap_err();
        assert!(matches!(
            err,
            CriError::TruncatedRecord {
                needed: 5,
                available: 2,
                ..
            }
        ));
    }

    #[test]
    fn test_decode_reports_unknown_tag() {
        let bytes = file_with(&[&[0x01, 0x02, 0x03, 0x04, 0x42]]);
        let err = CriReader::new(&bytes).decode().unwrap_err();
        assert!(matches!(
            err,
            CriError::UnknownTag {
                offset: HEADER_LEN,
                tag: 0x42
            }
        ));
    }

    #[test]
    fn test_decode_reports_unterminated_execution_marker() {
        let bytes = file_with(&[&[0, 0, 0, 0, 0, 0x52, 0x55, 0x4E, 0x21, b'x']]);
        assert!(matches!(
            CriReader::new(&bytes).decode(),
            Err(CriError::MalformedExecutionMarker { .. })
        ));

        let bytes = file_with(&[&[0, 0, 0, 0, 0, 0x52, 0x55, 0x4E, 0x21, b'x', 0, b'y']]);
        assert!(matches!(
            CriReader::new(&bytes).decode(),
            Err(CriError::MalformedExecutionMarker { .. })
        ));
    }

    #[test]
    fn test_leading_events_are_exposed() {
        let stmt = encode_statement(MarkerId::new(1, 2, 3, 4));
        let marker = encode_execution_marker(&ExecutionComment::EMPTY);
        let bytes = file_with(&[&stmt, &marker]);
        let log = CriReader::new(&bytes).decode().unwrap();
        assert_eq!(log.leading_events().len(), 1);
        assert_eq!(log.executions()[0].events.len(), 0);
    }

    #[test]
    fn test_records_serialize_with_tag() {
        let record = CriRecord::Event {
            offset: 70,
            marker_id: MarkerId::new(0xA1, 0xA2, 0xA3, 0xA4),
            kind: EventKind::Statement,
        };
        let json = serde_json::to_string(&record).unwrap();
        assert!(json.contains("\"record\":\"event\""));
        assert!(json.contains("\"a1a2a3a4\""));
    }
}
