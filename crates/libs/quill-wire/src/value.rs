//! Application values and their flagged binary form.
//!
//! Every non-null value is written as `[0x01][payload]`; null is the single
//! byte `0x00`. The flag lets the engine tell an empty present value from an
//! absent one.

use serde_json::Value as JsonValue;
use uuid::Uuid;

use crate::data_type::{DataType, VarType};
use crate::WireError;

const NULL_MARKER: u8 = 0x00;
const PRESENT_MARKER: u8 = 0x01;

/// A single application value supplied to an action or statement.
///
/// `BigInt` exists so callers holding arbitrary-precision integers get a
/// clear rejection instead of a silent truncation; only an explicit numeric
/// type accepts it.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Text(String),
    Bool(bool),
    Int(i64),
    Number(f64),
    Bytes(Vec<u8>),
    BigInt(i128),
    Array(Vec<Value>),
}

impl Value {
    /// Collects values into [`Value::Array`].
    pub fn array<I, T>(values: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<Value>,
    {
        Self::Array(values.into_iter().map(Into::into).collect())
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Short name of the runtime shape, used in error messages.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Text(_) => "text",
            Self::Bool(_) => "bool",
            Self::Int(_) => "integer",
            Self::Number(_) => "number",
            Self::Bytes(_) => "bytes",
            Self::BigInt(_) => "bigint",
            Self::Array(_) => "array",
        }
    }

    /// Converts a JSON value. Integers beyond `i64` become [`Value::BigInt`].
    pub fn from_json(value: &JsonValue) -> Result<Self, WireError> {
        match value {
            JsonValue::Null => Ok(Self::Null),
            JsonValue::Bool(b) => Ok(Self::Bool(*b)),
            JsonValue::String(s) => Ok(Self::Text(s.clone())),
            JsonValue::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Ok(Self::Int(i))
                } else if let Some(u) = n.as_u64() {
                    Ok(Self::BigInt(i128::from(u)))
                } else {
                    n.as_f64()
                        .map(Self::Number)
                        .ok_or_else(|| WireError::UnsupportedValue(n.to_string()))
                }
            }
            JsonValue::Array(items) => {
                items.iter().map(Self::from_json).collect::<Result<Vec<_>, _>>().map(Self::Array)
            }
            JsonValue::Object(_) => Err(WireError::UnsupportedValue("object".into())),
        }
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Self::Text(value.to_owned())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Self::Int(i64::from(value))
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

impl From<Vec<u8>> for Value {
    fn from(value: Vec<u8>) -> Self {
        Self::Bytes(value)
    }
}

impl From<Uuid> for Value {
    fn from(value: Uuid) -> Self {
        Self::Text(value.hyphenated().to_string())
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Null, Into::into)
    }
}

/// Runtime shape selected by inference, in precedence order.
#[derive(Debug, Clone, PartialEq)]
enum Shape<'a> {
    Uuid(Uuid),
    Null,
    Bytes(&'a [u8]),
    Decimal(f64),
    Text(&'a str),
    Bool(bool),
    Int(i64),
}

type ShapeGuard = for<'a> fn(&'a Value) -> Option<Shape<'a>>;

/// UUID-shaped text must win over generic text, and fractional numbers over
/// integers. Reordering this table changes the wire output.
const INFERENCE_ORDER: [ShapeGuard; 7] =
    [uuid_text, null_value, byte_blob, fractional, plain_text, boolean, integer];

fn uuid_text(value: &Value) -> Option<Shape<'_>> {
    match value {
        Value::Text(s) => parse_uuid_text(s).map(Shape::Uuid),
        _ => None,
    }
}

fn null_value(value: &Value) -> Option<Shape<'_>> {
    value.is_null().then_some(Shape::Null)
}

fn byte_blob(value: &Value) -> Option<Shape<'_>> {
    match value {
        Value::Bytes(b) => Some(Shape::Bytes(b)),
        _ => None,
    }
}

fn fractional(value: &Value) -> Option<Shape<'_>> {
    match value {
        Value::Number(n) if n.is_finite() && n.fract() != 0.0 => Some(Shape::Decimal(*n)),
        _ => None,
    }
}

fn plain_text(value: &Value) -> Option<Shape<'_>> {
    match value {
        Value::Text(s) => Some(Shape::Text(s)),
        _ => None,
    }
}

fn boolean(value: &Value) -> Option<Shape<'_>> {
    match value {
        Value::Bool(b) => Some(Shape::Bool(*b)),
        _ => None,
    }
}

fn integer(value: &Value) -> Option<Shape<'_>> {
    match value {
        Value::Int(i) => Some(Shape::Int(*i)),
        Value::Number(n) => whole_number(*n).map(Shape::Int),
        _ => None,
    }
}

fn infer_shape(value: &Value) -> Result<Shape<'_>, WireError> {
    if let Some(shape) = INFERENCE_ORDER.iter().find_map(|guard| guard(value)) {
        return Ok(shape);
    }
    match value {
        Value::BigInt(_) => Err(WireError::BigIntUnsupported),
        Value::Number(n) => Err(WireError::UnsupportedValue(format!("number {n}"))),
        other => Err(WireError::UnsupportedValue(other.kind().to_owned())),
    }
}

/// Encodes one scalar value.
///
/// With `explicit`, dispatch follows the declared type; a null value still
/// encodes as the null marker. Without it, the type is inferred from the
/// runtime shape.
pub fn encode_value(value: &Value, explicit: Option<VarType>) -> Result<Vec<u8>, WireError> {
    match explicit {
        Some(var_type) => encode_as(value, var_type),
        None => encode_shape(infer_shape(value)?),
    }
}

fn encode_shape(shape: Shape<'_>) -> Result<Vec<u8>, WireError> {
    Ok(match shape {
        Shape::Uuid(uuid) => not_null(uuid.as_bytes()),
        Shape::Null => null(),
        Shape::Bytes(bytes) => not_null(bytes),
        Shape::Decimal(n) => not_null(n.to_string().as_bytes()),
        Shape::Text(s) => not_null(s.as_bytes()),
        Shape::Bool(b) => not_null(&[u8::from(b)]),
        Shape::Int(i) => not_null(&i.to_be_bytes()),
    })
}

fn encode_as(value: &Value, var_type: VarType) -> Result<Vec<u8>, WireError> {
    if value.is_null() {
        return Ok(null());
    }
    if let Value::Array(_) = value {
        return Err(WireError::UnsupportedValue("nested array".into()));
    }
    let mismatch = || WireError::mismatch(var_type.as_str(), value.kind());

    match var_type {
        VarType::Null => Ok(null()),
        VarType::Text => {
            let text = match value {
                Value::Text(s) => s.clone(),
                Value::Int(i) => i.to_string(),
                Value::Number(n) if n.is_finite() => n.to_string(),
                Value::Bool(b) => b.to_string(),
                Value::BigInt(_) => return Err(WireError::BigIntUnsupported),
                _ => return Err(mismatch()),
            };
            Ok(not_null(text.as_bytes()))
        }
        VarType::Int8 => {
            let int = match value {
                Value::Int(i) => *i,
                Value::Number(n) => whole_number(*n).ok_or_else(mismatch)?,
                Value::Text(s) => s.trim().parse::<i64>().map_err(|_| mismatch())?,
                Value::BigInt(_) => return Err(WireError::BigIntUnsupported),
                _ => return Err(mismatch()),
            };
            Ok(not_null(&int.to_be_bytes()))
        }
        VarType::Bool => {
            let flag = match value {
                Value::Bool(b) => *b,
                Value::Text(s) if s.eq_ignore_ascii_case("true") => true,
                Value::Text(s) if s.eq_ignore_ascii_case("false") => false,
                _ => return Err(mismatch()),
            };
            Ok(not_null(&[u8::from(flag)]))
        }
        VarType::Numeric => {
            let text = match value {
                Value::Int(i) => i.to_string(),
                Value::BigInt(i) => i.to_string(),
                Value::Number(n) if n.is_finite() => n.to_string(),
                Value::Text(s) if is_decimal_text(s) => s.clone(),
                _ => return Err(mismatch()),
            };
            Ok(not_null(text.as_bytes()))
        }
        VarType::Uuid => match value {
            Value::Text(s) => {
                let uuid = parse_uuid_text(s).ok_or_else(|| WireError::InvalidUuid(s.clone()))?;
                Ok(not_null(uuid.as_bytes()))
            }
            Value::Bytes(b) if b.len() == 16 => Ok(not_null(b)),
            _ => Err(mismatch()),
        },
        VarType::Bytea => match value {
            Value::Bytes(b) => Ok(not_null(b)),
            _ => Err(mismatch()),
        },
    }
}

/// Infers the declared type for a scalar, including numeric precision/scale.
pub(crate) fn infer_data_type(value: &Value) -> Result<DataType, WireError> {
    Ok(match infer_shape(value)? {
        Shape::Uuid(_) => DataType::uuid(),
        Shape::Null => DataType::null(),
        Shape::Bytes(_) => DataType::bytea(),
        Shape::Decimal(n) => {
            let (precision, scale) = decimal_metadata(&n.to_string());
            DataType::numeric(precision, scale)
        }
        Shape::Text(_) => DataType::text(),
        Shape::Bool(_) => DataType::boolean(),
        Shape::Int(_) => DataType::int8(),
    })
}

/// Precision is every digit of the rendering, scale the digits after the point.
pub(crate) fn decimal_metadata(rendered: &str) -> (u16, u16) {
    let digits = rendered.chars().filter(char::is_ascii_digit).count();
    let scale = rendered.find('.').map_or(0, |idx| rendered[idx + 1..].len());
    (saturate(digits), saturate(scale))
}

fn saturate(n: usize) -> u16 {
    u16::try_from(n).unwrap_or(u16::MAX)
}

/// Canonical hyphenated UUID text only; braced, urn and bare-hex forms are plain text.
pub(crate) fn parse_uuid_text(s: &str) -> Option<Uuid> {
    if s.len() != 36 {
        return None;
    }
    Uuid::parse_str(s).ok()
}

pub(crate) fn whole_number(n: f64) -> Option<i64> {
    // i64::MAX is not representable as f64; the bound is exclusive.
    if n.is_finite() && n.fract() == 0.0 && n >= i64::MIN as f64 && n < i64::MAX as f64 {
        Some(n as i64)
    } else {
        None
    }
}

fn is_decimal_text(s: &str) -> bool {
    let unsigned = s.strip_prefix('-').unwrap_or(s);
    let mut parts = unsigned.splitn(2, '.');
    let int_part = parts.next().unwrap_or_default();
    let frac_part = parts.next();
    let all_digits = |p: &str| p.chars().all(|c| c.is_ascii_digit());
    !int_part.is_empty()
        && all_digits(int_part)
        && frac_part.map_or(true, |f| !f.is_empty() && all_digits(f))
}

fn null() -> Vec<u8> {
    vec![NULL_MARKER]
}

fn not_null(payload: &[u8]) -> Vec<u8> {
    let mut buf = Vec::with_capacity(payload.len() + 1);
    buf.push(PRESENT_MARKER);
    buf.extend_from_slice(payload);
    buf
}
