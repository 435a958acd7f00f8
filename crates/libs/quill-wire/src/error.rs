/// Errors from encoding or decoding wire layouts.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[non_exhaustive]
pub enum WireError {
    #[error("invalid scalar value: {0}")]
    UnsupportedValue(String),

    #[error("bigint not supported, convert to text first")]
    BigIntUnsupported,

    #[error("cannot encode {found} value as {expected}")]
    TypeMismatch { expected: String, found: &'static str },

    #[error("unknown data type: {0}")]
    UnknownType(String),

    #[error("invalid uuid: {0}")]
    InvalidUuid(String),

    #[error("too many {what}: {count} (maximum 65535)")]
    CountOverflow { what: &'static str, count: usize },

    #[error("field too long: {0} bytes")]
    LengthOverflow(usize),

    #[error("invalid amount: {0}")]
    InvalidAmount(String),

    #[error("invalid account identifier: {0}")]
    InvalidAccount(String),

    #[error("input truncated: needed {needed} bytes at offset {offset}")]
    Truncated { offset: usize, needed: usize },

    #[error("trailing bytes after {context}: {remaining}")]
    TrailingBytes { context: &'static str, remaining: usize },

    #[error("unsupported {context} version: {version}")]
    UnsupportedVersion { context: &'static str, version: u16 },

    #[error("invalid flag byte 0x{0:02x}")]
    InvalidFlag(u8),

    #[error("invalid utf-8 in {0}")]
    InvalidUtf8(&'static str),

    #[error("base64 decode error: {0}")]
    Base64(String),
}

impl WireError {
    pub(crate) fn mismatch(expected: impl Into<String>, found: &'static str) -> Self {
        Self::TypeMismatch { expected: expected.into(), found }
    }
}

impl From<base64::DecodeError> for WireError {
    fn from(err: base64::DecodeError) -> Self {
        Self::Base64(err.to_string())
    }
}
