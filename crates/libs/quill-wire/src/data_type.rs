//! Data type descriptors and their binary form.
//!
//! Layout, all integers **big-endian**:
//!
//! ```text
//! [version:2][name_len:4][name][is_array:1][metadata0:2][metadata1:2]
//! ```
//!
//! Big-endian here is intentionally inconsistent with the little-endian
//! envelope and payload layers. It is verified against the engine's decoder and
//! must be preserved byte for byte.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::bytes::{put_u16_be, put_u32_be};
use crate::{WireError, DATA_TYPE_VERSION};

/// Scalar types the engine understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VarType {
    Text,
    Int8,
    Bool,
    Numeric,
    Uuid,
    Bytea,
    Null,
}

impl VarType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Int8 => "int8",
            Self::Bool => "bool",
            Self::Numeric => "numeric",
            Self::Uuid => "uuid",
            Self::Bytea => "bytea",
            Self::Null => "null",
        }
    }

    /// Parses an engine type name. Matching is case-insensitive.
    pub fn parse(name: &str) -> Result<Self, WireError> {
        match name.to_ascii_lowercase().as_str() {
            "text" => Ok(Self::Text),
            "int8" => Ok(Self::Int8),
            "bool" => Ok(Self::Bool),
            "numeric" => Ok(Self::Numeric),
            "uuid" => Ok(Self::Uuid),
            "bytea" => Ok(Self::Bytea),
            "null" => Ok(Self::Null),
            _ => Err(WireError::UnknownType(name.to_owned())),
        }
    }
}

impl fmt::Display for VarType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Declared type of an encoded value: name, array flag and numeric metadata.
///
/// Immutable once built. `metadata` is only carried for numeric types and is
/// written as `(0, 0)` when absent.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DataType {
    name: String,
    is_array: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    metadata: Option<(u16, u16)>,
}

impl DataType {
    pub fn new(var_type: VarType) -> Self {
        Self::from_parts(var_type.as_str().to_owned(), false, (0, 0))
    }

    /// Builds a descriptor from a raw engine type name.
    pub fn named(name: impl Into<String>) -> Result<Self, WireError> {
        let name = name.into();
        if name.is_empty() {
            return Err(WireError::UnknownType(name));
        }
        Ok(Self::from_parts(name, false, (0, 0)))
    }

    pub fn text() -> Self {
        Self::new(VarType::Text)
    }

    pub fn int8() -> Self {
        Self::new(VarType::Int8)
    }

    pub fn boolean() -> Self {
        Self::new(VarType::Bool)
    }

    pub fn numeric(precision: u16, scale: u16) -> Self {
        Self { metadata: Some((precision, scale)), ..Self::new(VarType::Numeric) }
    }

    pub fn uuid() -> Self {
        Self::new(VarType::Uuid)
    }

    pub fn bytea() -> Self {
        Self::new(VarType::Bytea)
    }

    pub fn null() -> Self {
        Self::new(VarType::Null)
    }

    /// Same type, flagged as an array.
    pub fn array(self) -> Self {
        Self { is_array: true, ..self }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_array(&self) -> bool {
        self.is_array
    }

    /// Precision and scale, `(0, 0)` when the type carries none.
    pub fn metadata(&self) -> (u16, u16) {
        self.metadata.unwrap_or((0, 0))
    }

    pub fn var_type(&self) -> Result<VarType, WireError> {
        VarType::parse(&self.name)
    }

    /// Encodes the descriptor in its big-endian layout.
    pub fn encode(&self) -> Result<Vec<u8>, WireError> {
        if self.name.is_empty() {
            return Err(WireError::UnknownType(String::new()));
        }
        let name = self.name.as_bytes();
        let name_len =
            u32::try_from(name.len()).map_err(|_| WireError::LengthOverflow(name.len()))?;
        let (meta0, meta1) = self.metadata();

        let mut buf = Vec::with_capacity(2 + 4 + name.len() + 1 + 4);
        put_u16_be(&mut buf, DATA_TYPE_VERSION);
        put_u32_be(&mut buf, name_len);
        buf.extend_from_slice(name);
        buf.push(u8::from(self.is_array));
        put_u16_be(&mut buf, meta0);
        put_u16_be(&mut buf, meta1);
        Ok(buf)
    }

    pub(crate) fn from_parts(name: String, is_array: bool, metadata: (u16, u16)) -> Self {
        let numeric = name.eq_ignore_ascii_case(VarType::Numeric.as_str());
        let metadata = (numeric || metadata != (0, 0)).then_some(metadata);
        Self { name, is_array, metadata }
    }

    pub(crate) fn with_array(mut self, is_array: bool) -> Self {
        self.is_array = is_array;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decode::decode_data_type;

    #[test]
    fn text_descriptor_layout() {
        let encoded = DataType::text().encode().expect("encode");
        assert_eq!(
            encoded,
            vec![
                0x00, 0x00, // version
                0x00, 0x00, 0x00, 0x04, // name length, big-endian
                b't', b'e', b'x', b't', //
                0x00, // not an array
                0x00, 0x00, 0x00, 0x00, // metadata
            ]
        );
    }

    #[test]
    fn numeric_metadata_is_big_endian() {
        let encoded = DataType::numeric(0x0102, 0x0003).array().encode().expect("encode");
        let tail = &encoded[encoded.len() - 5..];
        assert_eq!(tail, &[0x01, 0x01, 0x02, 0x00, 0x03]);
    }

    #[test]
    fn metadata_defaults_to_zero() {
        assert_eq!(DataType::int8().metadata(), (0, 0));
        assert_eq!(DataType::numeric(10, 2).metadata(), (10, 2));
    }

    #[test]
    fn numeric_descriptor_decodes_to_itself() {
        for data_type in [
            DataType::named("numeric").expect("named"),
            DataType::new(VarType::Numeric),
            DataType::named("NUMERIC").expect("named").array(),
        ] {
            assert_eq!(data_type.metadata(), (0, 0));
            let decoded = decode_data_type(&data_type.encode().expect("encode")).expect("decode");
            assert_eq!(decoded, data_type);
        }
        let text = DataType::named("text").expect("named");
        assert_eq!(text, DataType::text());
    }

    #[test]
    fn empty_name_is_rejected() {
        assert!(matches!(DataType::named(""), Err(WireError::UnknownType(_))));
    }

    #[test]
    fn var_type_parse_is_case_insensitive() {
        assert_eq!(VarType::parse("UUID").expect("parse"), VarType::Uuid);
        assert!(VarType::parse("int4").is_err());
    }
}
