//! Execution Markers
//!
//! Appended every time a handle finishes initialization, so concatenated
//! runs of the same binary can be told apart:
//!
//! ```text
//! 00 00 00 00 00   padding (reads as "not an event" to positional parsers)
//! 52 55 4E 21      "RUN!"
//! <comment> 00     build-time comment, NUL terminated
//! 0A               newline
//! ```

use crate::result::{CriError, CriResult};
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::fmt;

/// Zero padding opening an execution marker
pub const EXECUTION_PADDING: [u8; 5] = [0x00; 5];

/// Magic bytes following the padding
pub const EXECUTION_MAGIC: [u8; 4] = [0x52, 0x55, 0x4E, 0x21];

/// Fixed bytes around the comment: padding, magic and newline
pub const EXECUTION_OVERHEAD: usize = 10;

/// Comment embedded in every execution marker
///
/// Opaque text fixed at build time (a build or run identifier). It may be
/// empty but must not contain NUL, which terminates it on the wire.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ExecutionComment(Cow<'static, str>);

impl ExecutionComment {
    /// The empty comment
    pub const EMPTY: Self = Self(Cow::Borrowed(""));

    /// Create a comment, rejecting interior NUL bytes
    pub fn new(text: impl Into<Cow<'static, str>>) -> CriResult<Self> {
        let text = text.into();
        if let Some(pos) = text.bytes().position(|b| b == 0) {
            return Err(CriError::invalid_comment(format!(
                "NUL byte at position {pos}"
            )));
        }
        Ok(Self(text))
    }

    /// Comment taken from a compile-time constant.
    ///
    /// A constant containing NUL is cut at the first NUL, which is what a
    /// C-string reader would see anyway.
    #[must_use]
    pub const fn from_static(text: &'static str) -> Self {
        let bytes = text.as_bytes();
        let mut i = 0;
        while i < bytes.len() {
            if bytes[i] == 0 {
                let (head, _) = bytes.split_at(i);
                return match std::str::from_utf8(head) {
                    Ok(head) => Self(Cow::Borrowed(head)),
                    Err(_) => Self::EMPTY,
                };
            }
            i += 1;
        }
        Self(Cow::Borrowed(text))
    }

    /// Comment text
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether the comment is empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Length of the encoded marker carrying this comment
    #[must_use]
    pub fn marker_len(&self) -> usize {
        // Comment bytes plus their NUL terminator
        EXECUTION_OVERHEAD + self.0.len() + 1
    }
}

impl fmt::Display for ExecutionComment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for ExecutionComment {
    type Error = CriError;

    fn try_from(value: String) -> CriResult<Self> {
        Self::new(value)
    }
}

impl From<ExecutionComment> for String {
    fn from(value: ExecutionComment) -> Self {
        value.0.into_owned()
    }
}

/// Encode an execution marker carrying `comment`.
#[must_use]
pub fn encode_execution_marker(comment: &ExecutionComment) -> Vec<u8> {
    let mut marker = Vec::with_capacity(comment.marker_len());
    marker.extend_from_slice(&EXECUTION_PADDING);
    marker.extend_from_slice(&EXECUTION_MAGIC);
    marker.extend_from_slice(comment.as_str().as_bytes());
    marker.push(0x00);
    marker.push(b'\n');
    marker
}
