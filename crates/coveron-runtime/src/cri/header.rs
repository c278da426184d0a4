//! CRI File Header
//!
//! Every CRI file starts with exactly one 59-byte header:
//!
//! ```text
//! offset  len  field
//!      0    8  magic number  49 4D 41 43 52 49 46 21  ("IMACRIF!")
//!      8    2  format version {major, minor}
//!     10   32  source hash
//!     42   16  instrumentation random
//!     58    1  newline 0x0A
//! ```
//!
//! Validation is byte-exact over all 59 bytes. There is no compatibility
//! mode between format versions.

use super::identity::{CriIdentity, InstrumentationRandom, SourceHash};
use crate::bytes::{copy_at, equal_prefix};
use crate::result::{CriError, CriResult};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Total header length in bytes
pub const HEADER_LEN: usize = 59;

/// Magic number opening every CRI file
pub const MAGIC_NUMBER: [u8; 8] = [0x49, 0x4D, 0x41, 0x43, 0x52, 0x49, 0x46, 0x21];

const VERSION_OFFSET: usize = 8;
const HASH_OFFSET: usize = 10;
const RANDOM_OFFSET: usize = 42;
const NEWLINE_OFFSET: usize = 58;

/// CRI format version
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct FormatVersion {
    /// High byte
    pub major: u8,
    /// Low byte
    pub minor: u8,
}

impl FormatVersion {
    /// Version written by this runtime
    pub const CURRENT: Self = Self { major: 0, minor: 1 };

    /// Wire bytes
    #[inline]
    #[must_use]
    pub const fn to_bytes(self) -> [u8; 2] {
        [self.major, self.minor]
    }
}

impl fmt::Display for FormatVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.major, self.minor)
    }
}

/// Encode the header for an identity.
#[must_use]
pub fn encode_header(identity: &CriIdentity) -> [u8; HEADER_LEN] {
    let mut header = [0u8; HEADER_LEN];
    let mut at = copy_at(&mut header, 0, &MAGIC_NUMBER);
    at = copy_at(&mut header, at, &FormatVersion::CURRENT.to_bytes());
    at = copy_at(&mut header, at, identity.source_hash.as_bytes());
    at = copy_at(&mut header, at, identity.instrumentation_random.as_bytes());
    debug_assert_eq!(at, NEWLINE_OFFSET);
    header[NEWLINE_OFFSET] = b'\n';
    header
}

/// Check whether `candidate` starts with the exact header for `identity`.
///
/// Fewer than 59 bytes is a mismatch.
#[must_use]
pub fn header_matches(candidate: &[u8], identity: &CriIdentity) -> bool {
    equal_prefix(candidate, &encode_header(identity), HEADER_LEN)
}

/// A decoded CRI header
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CriHeader {
    /// Format version found in the file
    pub version: FormatVersion,
    /// Identity the file belongs to
    pub identity: CriIdentity,
}

impl CriHeader {
    /// Header for the current format version
    #[must_use]
    pub const fn new(identity: CriIdentity) -> Self {
        Self {
            version: FormatVersion::CURRENT,
            identity,
        }
    }

    /// Decode the first 59 bytes of `bytes`.
    ///
    /// Checks the magic number and the trailing newline. The version is
    /// reported as found; deciding whether it is usable is up to the caller.
    pub fn decode(bytes: &[u8]) -> CriResult<Self> {
        let Some(header) = bytes.get(..HEADER_LEN) else {
            return Err(CriError::InvalidLength {
                field: "header",
                expected: HEADER_LEN,
                actual: bytes.len(),
            });
        };

        if !equal_prefix(header, &MAGIC_NUMBER, MAGIC_NUMBER.len()) {
            return Err(CriError::invalid_header("magic number mismatch"));
        }
        if header[NEWLINE_OFFSET] != b'\n' {
            return Err(CriError::invalid_header("missing newline after header"));
        }

        let version = FormatVersion {
            major: header[VERSION_OFFSET],
            minor: header[VERSION_OFFSET + 1],
        };
        let source_hash = SourceHash::from_slice(&header[HASH_OFFSET..RANDOM_OFFSET])?;
        let instrumentation_random =
            InstrumentationRandom::from_slice(&header[RANDOM_OFFSET..NEWLINE_OFFSET])?;

        Ok(Self {
            version,
            identity: CriIdentity::new(source_hash, instrumentation_random),
        })
    }

    /// Encode this header
    ///
    /// Uses the stored version, so a decoded foreign-version header
    /// re-encodes to the bytes it came from.
    #[must_use]
    pub fn encode(&self) -> [u8; HEADER_LEN] {
        let mut header = encode_header(&self.identity);
        copy_at(&mut header, VERSION_OFFSET, &self.version.to_bytes());
        header
    }

    /// Whether this header is what the runtime would write for `identity`
    #[must_use]
    pub fn matches(&self, identity: &CriIdentity) -> bool {
        self.version == FormatVersion::CURRENT && self.identity == *identity
    }
}
