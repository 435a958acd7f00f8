//! Reference decoders for the layouts in this crate.
//!
//! Strict by construction: a wrong version, a short read or leftover bytes is
//! an error. The engine is the authoritative decoder; these exist so clients
//! and tests can verify what they send.

use base64::engine::general_purpose::STANDARD as BASE64_STANDARD;
use base64::Engine as _;

use crate::account::{AccountId, KeyType};
use crate::data_type::DataType;
use crate::encoded_value::EncodedValue;
use crate::payload::{ActionCall, ActionExecution, NamedValue, RawStatement, TransferPayload};
use crate::{WireError, DATA_TYPE_VERSION, ENCODED_VALUE_VERSION, PAYLOAD_VERSION};

struct Reader<'a> {
    data: &'a [u8],
    offset: usize,
}

impl<'a> Reader<'a> {
    fn new(data: &'a [u8]) -> Self {
        Self { data, offset: 0 }
    }

    fn take(&mut self, n: usize) -> Result<&'a [u8], WireError> {
        let end = self
            .offset
            .checked_add(n)
            .filter(|end| *end <= self.data.len())
            .ok_or(WireError::Truncated { offset: self.offset, needed: n })?;
        let slice = &self.data[self.offset..end];
        self.offset = end;
        Ok(slice)
    }

    fn array<const N: usize>(&mut self) -> Result<[u8; N], WireError> {
        let mut out = [0u8; N];
        out.copy_from_slice(self.take(N)?);
        Ok(out)
    }

    fn u8(&mut self) -> Result<u8, WireError> {
        Ok(self.array::<1>()?[0])
    }

    fn u16_le(&mut self) -> Result<u16, WireError> {
        self.array().map(u16::from_le_bytes)
    }

    fn u16_be(&mut self) -> Result<u16, WireError> {
        self.array().map(u16::from_be_bytes)
    }

    fn u32_be(&mut self) -> Result<u32, WireError> {
        self.array().map(u32::from_be_bytes)
    }

    fn prefixed(&mut self) -> Result<&'a [u8], WireError> {
        let len = self.array().map(u32::from_le_bytes)?;
        self.take(len as usize)
    }

    fn prefixed_str(&mut self, context: &'static str) -> Result<String, WireError> {
        let bytes = self.prefixed()?;
        String::from_utf8(bytes.to_vec()).map_err(|_| WireError::InvalidUtf8(context))
    }

    fn version_le(&mut self, context: &'static str, expected: u16) -> Result<(), WireError> {
        let version = self.u16_le()?;
        if version != expected {
            return Err(WireError::UnsupportedVersion { context, version });
        }
        Ok(())
    }

    fn finish(&self, context: &'static str) -> Result<(), WireError> {
        let remaining = self.data.len() - self.offset;
        if remaining != 0 {
            return Err(WireError::TrailingBytes { context, remaining });
        }
        Ok(())
    }
}

/// Decodes a flagged value blob: `None` for null, the payload otherwise.
pub fn decode_value(blob: &[u8]) -> Result<Option<&[u8]>, WireError> {
    match blob.split_first() {
        Some((0x00, [])) => Ok(None),
        Some((0x00, rest)) => {
            Err(WireError::TrailingBytes { context: "null value", remaining: rest.len() })
        }
        Some((0x01, payload)) => Ok(Some(payload)),
        Some((flag, _)) => Err(WireError::InvalidFlag(*flag)),
        None => Err(WireError::Truncated { offset: 0, needed: 1 }),
    }
}

pub fn decode_data_type(bytes: &[u8]) -> Result<DataType, WireError> {
    let mut reader = Reader::new(bytes);
    let version = reader.u16_be()?;
    if version != DATA_TYPE_VERSION {
        return Err(WireError::UnsupportedVersion { context: "data type", version });
    }
    let name_len = reader.u32_be()? as usize;
    let name = String::from_utf8(reader.take(name_len)?.to_vec())
        .map_err(|_| WireError::InvalidUtf8("data type name"))?;
    let is_array = match reader.u8()? {
        0 => false,
        1 => true,
        other => return Err(WireError::InvalidFlag(other)),
    };
    let metadata = (reader.u16_be()?, reader.u16_be()?);
    reader.finish("data type")?;
    if name.is_empty() {
        return Err(WireError::UnknownType(name));
    }
    Ok(DataType::from_parts(name, is_array, metadata))
}

pub fn decode_encoded_value(bytes: &[u8]) -> Result<EncodedValue, WireError> {
    let mut reader = Reader::new(bytes);
    let value = read_encoded_value(&mut reader)?;
    reader.finish("encoded value")?;
    Ok(value)
}

fn read_encoded_value(reader: &mut Reader<'_>) -> Result<EncodedValue, WireError> {
    reader.version_le("encoded value", ENCODED_VALUE_VERSION)?;
    let data_type = decode_data_type(reader.prefixed()?)?;
    let count = reader.u16_le()?;
    let data = (0..count)
        .map(|_| reader.prefixed().map(<[u8]>::to_vec))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(EncodedValue::new(data_type, data))
}

fn read_envelopes(reader: &mut Reader<'_>) -> Result<Vec<EncodedValue>, WireError> {
    let count = reader.u16_le()?;
    (0..count).map(|_| decode_encoded_value(reader.prefixed()?)).collect()
}

pub fn decode_action_call(bytes: &[u8]) -> Result<ActionCall, WireError> {
    let mut reader = Reader::new(bytes);
    reader.version_le("action call", PAYLOAD_VERSION)?;
    let namespace = reader.prefixed_str("namespace")?;
    let action = reader.prefixed_str("action")?;
    let arguments = read_envelopes(&mut reader)?;
    reader.finish("action call")?;
    Ok(ActionCall { namespace, action, arguments })
}

pub fn decode_action_execution(bytes: &[u8]) -> Result<ActionExecution, WireError> {
    let mut reader = Reader::new(bytes);
    reader.version_le("action execution", PAYLOAD_VERSION)?;
    let namespace = reader.prefixed_str("namespace")?;
    let action = reader.prefixed_str("action")?;
    let groups = reader.u16_le()?;
    let arguments = (0..groups)
        .map(|_| read_envelopes(&mut reader))
        .collect::<Result<Vec<_>, _>>()?;
    reader.finish("action execution")?;
    Ok(ActionExecution { namespace, action, arguments })
}

pub fn decode_raw_statement(bytes: &[u8]) -> Result<RawStatement, WireError> {
    let mut reader = Reader::new(bytes);
    reader.version_le("raw statement", PAYLOAD_VERSION)?;
    let statement = reader.prefixed_str("statement")?;
    let count = reader.u16_le()?;
    let mut parameters = Vec::with_capacity(count as usize);
    for _ in 0..count {
        let name = reader.prefixed_str("parameter name")?;
        let value = decode_encoded_value(reader.prefixed()?)?;
        parameters.push(NamedValue { name, value });
    }
    reader.finish("raw statement")?;
    Ok(RawStatement { statement, parameters })
}

pub fn decode_transfer(bytes: &[u8]) -> Result<TransferPayload, WireError> {
    let mut reader = Reader::new(bytes);
    reader.version_le("transfer", PAYLOAD_VERSION)?;
    let mut account = Reader::new(reader.prefixed()?);
    let identifier = account.prefixed()?.to_vec();
    let key_type = account.prefixed_str("key type")?;
    account.finish("account id")?;
    let flag = reader.u8()?;
    if flag != 0x01 {
        return Err(WireError::InvalidFlag(flag));
    }
    let amount = reader.prefixed_str("amount")?;
    reader.finish("transfer")?;
    TransferPayload::new(AccountId::new(identifier, KeyType::from_name(key_type)), amount)
}

/// Unwraps the base64 rendering used for transport.
pub fn from_base64(encoded: &str) -> Result<Vec<u8>, WireError> {
    Ok(BASE64_STANDARD.decode(encoded)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Value;

    #[test]
    fn value_flags() {
        assert_eq!(decode_value(&[0x00]).expect("null"), None);
        assert_eq!(decode_value(&[0x01]).expect("empty"), Some(&[][..]));
        assert_eq!(decode_value(&[0x02, 0x00]), Err(WireError::InvalidFlag(0x02)));
        assert!(decode_value(&[]).is_err());
    }

    #[test]
    fn data_type_rejects_trailing_bytes() {
        let mut bytes = DataType::text().encode().expect("encode");
        bytes.push(0xff);
        assert!(matches!(decode_data_type(&bytes), Err(WireError::TrailingBytes { .. })));
    }

    #[test]
    fn encoded_value_rejects_truncation() {
        let envelope = EncodedValue::from_value(&Value::from("abc"), None).expect("encode");
        let bytes = envelope.encode().expect("encode");
        assert!(matches!(
            decode_encoded_value(&bytes[..bytes.len() - 1]),
            Err(WireError::Truncated { .. })
        ));
    }

    #[test]
    fn rejects_unknown_payload_version() {
        let bytes = [0x01, 0x00, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0];
        assert_eq!(
            decode_action_call(&bytes),
            Err(WireError::UnsupportedVersion { context: "action call", version: 1 })
        );
    }
}
