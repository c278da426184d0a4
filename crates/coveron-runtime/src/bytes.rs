//! Fixed-length byte primitives used when building and validating headers.

/// Compare the first `len` bytes of two buffers.
///
/// A buffer shorter than `len` never matches, so a truncated read can be
/// handed in directly.
#[inline]
#[must_use]
pub fn equal_prefix(left: &[u8], right: &[u8], len: usize) -> bool {
    match (left.get(..len), right.get(..len)) {
        (Some(l), Some(r)) => l == r,
        _ => false,
    }
}

/// Copy `src` into `dest` starting at `offset`.
///
/// Returns the offset just past the copied bytes, so consecutive fields
/// can be chained. Callers size `dest` for a fixed layout; bytes that would
/// fall outside it are not written.
#[inline]
pub fn copy_at(dest: &mut [u8], offset: usize, src: &[u8]) -> usize {
    let end = offset.saturating_add(src.len()).min(dest.len());
    if let Some(window) = dest.get_mut(offset..end) {
        window.copy_from_slice(&src[..window.len()]);
    }
    end
}

/// Lowercase hex rendering used for identities and marker IDs.
#[must_use]
pub fn to_hex(bytes: &[u8]) -> String {
    hex::encode(bytes)
}

/// Parse a hex string into exactly `N` bytes.
///
/// Accepts upper and lower case digits; surrounding whitespace is ignored.
pub fn from_hex<const N: usize>(field: &'static str, text: &str) -> crate::CriResult<[u8; N]> {
    let text = text.trim();
    let mut out = [0u8; N];
    hex::decode_to_slice(text, &mut out).map_err(|e| match e {
        hex::FromHexError::InvalidHexCharacter { .. } => crate::CriError::InvalidHex {
            field,
            message: e.to_string(),
        },
        _ => crate::CriError::InvalidLength {
            field,
            expected: N,
            actual: text.len() / 2,
        },
    })?;
    Ok(out)
}
