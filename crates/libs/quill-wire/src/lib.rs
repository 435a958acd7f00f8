//! # quill-wire
//!
//! Binary codecs for requests submitted to the quill database network.
//!
//! The engine decodes these layouts byte for byte, so every function in this
//! crate must produce output identical to the engine's own marshalling. There
//! is no negotiation: a drifted prefix size or byte order is a rejected
//! transaction.
//!
//! ## Layers
//!
//! ```text
//! value        [flag:1][payload:n]                       0x00 alone = null
//! data type    [ver:2 BE][len:4 BE][name][array:1][meta0:2 BE][meta1:2 BE]
//! envelope     [ver:2 LE][len:4 LE][data type][count:2 LE]([len:4 LE][value])*
//! payloads     [ver:2 LE] length-prefixed fields, rendered as base64
//! ```
//!
//! The data type descriptor is big-endian while everything around it is
//! little-endian. That inconsistency comes from the engine and is verified
//! against it; do not "fix" it.
//!
//! ## Example
//!
//! ```rust
//! use quill_wire::{encode_value, EncodedValue, Value};
//!
//! let blob = encode_value(&Value::Bool(true), None).unwrap();
//! assert_eq!(blob, vec![0x01, 0x01]);
//!
//! let envelope = EncodedValue::from_value(&Value::Int(7), None).unwrap();
//! assert_eq!(envelope.data_type().name(), "int8");
//! ```

mod bytes;
pub mod account;
pub mod data_type;
pub mod decode;
pub mod encoded_value;
pub mod error;
pub mod payload;
pub mod value;

pub use account::{infer_key_type, AccountId, KeyType};
pub use data_type::{DataType, VarType};
pub use encoded_value::EncodedValue;
pub use error::WireError;
pub use payload::{
    ActionCall, ActionExecution, NamedValue, PayloadType, RawStatement, TransferPayload,
};
pub use value::{encode_value, Value};

/// Version written in front of every data type descriptor.
pub const DATA_TYPE_VERSION: u16 = 0;

/// Version written in front of every encoded value envelope.
pub const ENCODED_VALUE_VERSION: u16 = 0;

/// Version of the action-call, action-execution, raw-statement and transfer payloads.
pub const PAYLOAD_VERSION: u16 = 0;

/// Largest element or argument count a two-byte count field can carry.
pub const MAX_ELEMENTS: usize = u16::MAX as usize;
