//! Primitive writers shared by the codec layers.

use crate::{WireError, MAX_ELEMENTS};

pub(crate) fn put_u16_le(buf: &mut Vec<u8>, value: u16) {
    buf.extend_from_slice(&value.to_le_bytes());
}

pub(crate) fn put_u16_be(buf: &mut Vec<u8>, value: u16) {
    buf.extend_from_slice(&value.to_be_bytes());
}

pub(crate) fn put_u32_be(buf: &mut Vec<u8>, value: u32) {
    buf.extend_from_slice(&value.to_be_bytes());
}

/// Writes a two-byte little-endian element count.
///
/// Counts above `u16::MAX` are a protocol limit, never truncated.
pub(crate) fn put_count(
    buf: &mut Vec<u8>,
    count: usize,
    what: &'static str,
) -> Result<(), WireError> {
    if count > MAX_ELEMENTS {
        return Err(WireError::CountOverflow { what, count });
    }
    put_u16_le(buf, count as u16);
    Ok(())
}

/// Writes `[len:4 LE][bytes]`.
pub(crate) fn put_prefixed(buf: &mut Vec<u8>, bytes: &[u8]) -> Result<(), WireError> {
    let len = u32::try_from(bytes.len()).map_err(|_| WireError::LengthOverflow(bytes.len()))?;
    buf.extend_from_slice(&len.to_le_bytes());
    buf.extend_from_slice(bytes);
    Ok(())
}
