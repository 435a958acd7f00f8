//! Versioned envelope pairing a data type with its encoded value blobs.
//!
//! Layout, all integers **little-endian**:
//!
//! ```text
//! [version:2][type_len:4][data type][count:2]([len:4][value blob])*
//! ```

use crate::bytes::{put_count, put_prefixed, put_u16_le};
use crate::data_type::{DataType, VarType};
use crate::value::{decimal_metadata, encode_value, infer_data_type, whole_number, Value};
use crate::{WireError, ENCODED_VALUE_VERSION};

/// The atomic argument unit embedded in every payload.
///
/// Holds one blob for a scalar and one per element for an array; each blob
/// carries its own null flag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedValue {
    data_type: DataType,
    data: Vec<Vec<u8>>,
}

impl EncodedValue {
    /// Wraps already-encoded blobs.
    pub fn new(data_type: DataType, data: Vec<Vec<u8>>) -> Self {
        Self { data_type, data }
    }

    /// Encodes a value under `explicit`, or under its inferred type.
    pub fn from_value(value: &Value, explicit: Option<&DataType>) -> Result<Self, WireError> {
        match (value, explicit) {
            (Value::Array(items), Some(declared)) => {
                let var_type = declared.var_type()?;
                let data = items
                    .iter()
                    .map(|item| encode_value(item, Some(var_type)))
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(Self::new(declared.clone().with_array(true), data))
            }
            (Value::Array(items), None) => {
                let element_type = infer_element_type(items)?;
                let var_type = element_type.var_type()?;
                let data = items
                    .iter()
                    .map(|item| encode_value(item, Some(var_type)))
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(Self::new(element_type.array(), data))
            }
            (scalar, Some(declared)) => {
                let blob = encode_value(scalar, Some(declared.var_type()?))?;
                Ok(Self::new(declared.clone(), vec![blob]))
            }
            (scalar, None) => {
                let data_type = infer_data_type(scalar)?;
                Ok(Self::new(data_type, vec![encode_value(scalar, None)?]))
            }
        }
    }

    pub fn data_type(&self) -> &DataType {
        &self.data_type
    }

    pub fn data(&self) -> &[Vec<u8>] {
        &self.data
    }

    /// Encodes the envelope in its little-endian layout.
    pub fn encode(&self) -> Result<Vec<u8>, WireError> {
        let type_bytes = self.data_type.encode()?;
        let mut buf = Vec::with_capacity(
            2 + 4 + type_bytes.len() + 2 + self.data.iter().map(|d| 4 + d.len()).sum::<usize>(),
        );
        put_u16_le(&mut buf, ENCODED_VALUE_VERSION);
        put_prefixed(&mut buf, &type_bytes)?;
        put_count(&mut buf, self.data.len(), "values")?;
        for blob in &self.data {
            put_prefixed(&mut buf, blob)?;
        }
        Ok(buf)
    }
}

/// Element type of an inferred array.
///
/// Nulls are skipped. Integers widen into numeric, UUID text widens into
/// text; any other mix is a mismatch. Empty and all-null arrays are text.
fn infer_element_type(items: &[Value]) -> Result<DataType, WireError> {
    let mut merged: Option<DataType> = None;
    let mut int_digits = 0u16;
    let mut scale = 0u16;

    for item in items.iter().filter(|item| !item.is_null()) {
        if let Value::Array(_) = item {
            return Err(WireError::UnsupportedValue("nested array".into()));
        }
        let item_type = infer_data_type(item)?;
        let whole = match item {
            Value::Int(i) => Some(*i),
            Value::Number(n) => whole_number(*n),
            _ => None,
        };
        let (item_int_digits, item_scale) = match whole {
            Some(i) => (decimal_metadata(&i.to_string()).0, 0),
            None => {
                let (precision, item_scale) = item_type.metadata();
                (precision.saturating_sub(item_scale), item_scale)
            }
        };
        int_digits = int_digits.max(item_int_digits);
        scale = scale.max(item_scale);

        merged = Some(match merged {
            None => item_type,
            Some(current) => widen(current, item_type, item.kind())?,
        });
    }

    Ok(match merged {
        None => DataType::text(),
        Some(data_type) if data_type.var_type()? == VarType::Numeric => {
            DataType::numeric(int_digits.saturating_add(scale), scale)
        }
        Some(data_type) => data_type,
    })
}

fn widen(current: DataType, next: DataType, found: &'static str) -> Result<DataType, WireError> {
    use VarType::{Int8, Numeric, Text, Uuid};
    let pair = (current.var_type()?, next.var_type()?);
    match pair {
        (a, b) if a == b => Ok(current),
        (Int8, Numeric) | (Numeric, Int8) => Ok(DataType::numeric(0, 0)),
        (Uuid, Text) | (Text, Uuid) => Ok(DataType::text()),
        (a, _) => Err(WireError::mismatch(format!("{a} array element"), found)),
    }
}
