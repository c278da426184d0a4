//! Type-Safe CRI Identities
//!
//! A CRI file belongs to exactly one (source hash, instrumentation random)
//! pair. Both are opaque byte strings supplied by the instrumenter; these
//! newtypes keep the two from being swapped and give them a hex form.

use crate::bytes::{from_hex, to_hex};
use crate::result::{CriError, CriResult};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;
use std::str::FromStr;

/// SHA-256 digest of the uninstrumented source (32 bytes)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct SourceHash([u8; 32]);

impl SourceHash {
    /// Byte length on the wire
    pub const LEN: usize = 32;

    /// Wrap a digest computed by the instrumenter
    #[inline]
    #[must_use]
    pub const fn new(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Hash source text the same way the instrumenter does
    #[must_use]
    pub fn of_source(source: impl AsRef<[u8]>) -> Self {
        let digest = Sha256::digest(source.as_ref());
        let mut bytes = [0u8; 32];
        bytes.copy_from_slice(&digest);
        Self(bytes)
    }

    /// Build from a slice, checking the length
    pub fn from_slice(bytes: &[u8]) -> CriResult<Self> {
        <[u8; 32]>::try_from(bytes)
            .map(Self)
            .map_err(|_| CriError::InvalidLength {
                field: "source hash",
                expected: Self::LEN,
                actual: bytes.len(),
            })
    }

    /// Raw bytes
    #[inline]
    #[must_use]
    pub const fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

impl fmt::Display for SourceHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&to_hex(&self.0))
    }
}

impl FromStr for SourceHash {
    type Err = CriError;

    fn from_str(s: &str) -> CriResult<Self> {
        from_hex("source hash", s).map(Self)
    }
}

impl TryFrom<String> for SourceHash {
    type Error = CriError;

    fn try_from(value: String) -> CriResult<Self> {
        value.parse()
    }
}

impl From<SourceHash> for String {
    fn from(value: SourceHash) -> Self {
        value.to_string()
    }
}

/// Random value generated once per instrumentation pass (16 bytes)
///
/// Two instrumentations of identical source differ only here, which keeps a
/// stale log from a previous pass from being appended to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct InstrumentationRandom([u8; 16]);

impl InstrumentationRandom {
    /// Byte length on the wire
    pub const LEN: usize = 16;

    /// Wrap a value chosen by the instrumenter
    #[inline]
    #[must_use]
    pub const fn new(bytes: [u8; 16]) -> Self {
        Self(bytes)
    }

    /// Generate a fresh random value
    #[must_use]
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().into_bytes())
    }

    /// Build from a slice, checking the length
    pub fn from_slice(bytes: &[u8]) -> CriResult<Self> {
        <[u8; 16]>::try_from(bytes)
            .map(Self)
            .map_err(|_| CriError::InvalidLength {
                field: "instrumentation random",
                expected: Self::LEN,
                actual: bytes.len(),
            })
    }

    /// Raw bytes
    #[inline]
    #[must_use]
    pub const fn as_bytes(&self) -> &[u8; 16] {
        &self.0
    }
}

impl fmt::Display for InstrumentationRandom {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&to_hex(&self.0))
    }
}

impl FromStr for InstrumentationRandom {
    type Err = CriError;

    fn from_str(s: &str) -> CriResult<Self> {
        from_hex("instrumentation random", s).map(Self)
    }
}

impl TryFrom<String> for InstrumentationRandom {
    type Error = CriError;

    fn try_from(value: String) -> CriResult<Self> {
        value.parse()
    }
}

impl From<InstrumentationRandom> for String {
    fn from(value: InstrumentationRandom) -> Self {
        value.to_string()
    }
}

/// Identity of one instrumented source file's CRI log
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CriIdentity {
    /// Hash of the uninstrumented source
    pub source_hash: SourceHash,
    /// Instrumentation pass random
    pub instrumentation_random: InstrumentationRandom,
}

impl CriIdentity {
    /// Create an identity
    #[inline]
    #[must_use]
    pub const fn new(source_hash: SourceHash, instrumentation_random: InstrumentationRandom) -> Self {
        Self {
            source_hash,
            instrumentation_random,
        }
    }

    /// Create an identity from the raw arrays emitted into instrumented code
    #[inline]
    #[must_use]
    pub const fn from_bytes(source_hash: [u8; 32], instrumentation_random: [u8; 16]) -> Self {
        Self::new(
            SourceHash::new(source_hash),
            InstrumentationRandom::new(instrumentation_random),
        )
    }
}

/// Opaque 4-byte marker ID assigned by the instrumenter
///
/// Uniqueness is the instrumenter's concern; every value is accepted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct MarkerId([u8; 4]);

impl MarkerId {
    /// Create from the four ID bytes in wire order
    #[inline]
    #[must_use]
    pub const fn new(b0: u8, b1: u8, b2: u8, b3: u8) -> Self {
        Self([b0, b1, b2, b3])
    }

    /// Create from a byte array in wire order
    #[inline]
    #[must_use]
    pub const fn from_bytes(bytes: [u8; 4]) -> Self {
        Self(bytes)
    }

    /// Create from an integer, most significant byte first
    #[inline]
    #[must_use]
    pub const fn from_u32_be(id: u32) -> Self {
        Self(id.to_be_bytes())
    }

    /// The ID bytes in wire order
    #[inline]
    #[must_use]
    pub const fn as_bytes(self) -> [u8; 4] {
        self.0
    }
}

impl fmt::Display for MarkerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&to_hex(&self.0))
    }
}

impl FromStr for MarkerId {
    type Err = CriError;

    fn from_str(s: &str) -> CriResult<Self> {
        from_hex("marker id", s).map(Self)
    }
}

impl TryFrom<String> for MarkerId {
    type Error = CriError;

    fn try_from(value: String) -> CriResult<Self> {
        value.parse()
    }
}

impl From<MarkerId> for String {
    fn from(value: MarkerId) -> Self {
        value.to_string()
    }
}
