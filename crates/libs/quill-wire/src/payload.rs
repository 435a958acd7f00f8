//! Transaction and message payloads.
//!
//! All four payloads share one skeleton: a little-endian `u16` version, then
//! length-prefixed fields in a fixed order. The finished bytes are rendered as
//! standard base64 before they reach the transport.

use base64::engine::general_purpose::STANDARD as BASE64_STANDARD;
use base64::Engine as _;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::account::AccountId;
use crate::bytes::{put_count, put_prefixed, put_u16_le};
use crate::encoded_value::EncodedValue;
use crate::{WireError, PAYLOAD_VERSION};

/// Transaction payload kinds understood by the network.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PayloadType {
    #[serde(rename = "execute")]
    ExecuteAction,
    CallAction,
    RawStatement,
    Transfer,
}

impl PayloadType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::ExecuteAction => "execute",
            Self::CallAction => "call_action",
            Self::RawStatement => "raw_statement",
            Self::Transfer => "transfer",
        }
    }
}

impl fmt::Display for PayloadType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Read-only call of a view action with exactly one argument set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionCall {
    pub namespace: String,
    pub action: String,
    pub arguments: Vec<EncodedValue>,
}

impl ActionCall {
    /// `[ver:2][ns][action][count:2]([len:4][envelope])*`
    pub fn encode(&self) -> Result<Vec<u8>, WireError> {
        let mut buf = header(&self.namespace, &self.action)?;
        put_count(&mut buf, self.arguments.len(), "arguments")?;
        for argument in &self.arguments {
            put_prefixed(&mut buf, &argument.encode()?)?;
        }
        Ok(buf)
    }

    pub fn to_base64(&self) -> Result<String, WireError> {
        self.encode().map(|bytes| BASE64_STANDARD.encode(bytes))
    }
}

/// State-changing execution, possibly bulk: one group per input set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionExecution {
    pub namespace: String,
    pub action: String,
    pub arguments: Vec<Vec<EncodedValue>>,
}

impl ActionExecution {
    /// `[ver:2][ns][action][groups:2]([count:2]([len:4][envelope])*)*`
    pub fn encode(&self) -> Result<Vec<u8>, WireError> {
        let mut buf = header(&self.namespace, &self.action)?;
        put_count(&mut buf, self.arguments.len(), "argument groups")?;
        for group in &self.arguments {
            put_count(&mut buf, group.len(), "arguments")?;
            for argument in group {
                put_prefixed(&mut buf, &argument.encode()?)?;
            }
        }
        Ok(buf)
    }

    pub fn to_base64(&self) -> Result<String, WireError> {
        self.encode().map(|bytes| BASE64_STANDARD.encode(bytes))
    }
}

/// A named statement parameter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamedValue {
    pub name: String,
    pub value: EncodedValue,
}

/// Ad-hoc SQL-like statement with named parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawStatement {
    pub statement: String,
    pub parameters: Vec<NamedValue>,
}

impl RawStatement {
    /// `[ver:2][statement][count:2]([name][len:4][envelope])*`
    pub fn encode(&self) -> Result<Vec<u8>, WireError> {
        let mut buf = Vec::new();
        put_u16_le(&mut buf, PAYLOAD_VERSION);
        put_prefixed(&mut buf, self.statement.as_bytes())?;
        put_count(&mut buf, self.parameters.len(), "parameters")?;
        for param in &self.parameters {
            put_prefixed(&mut buf, param.name.as_bytes())?;
            put_prefixed(&mut buf, &param.value.encode()?)?;
        }
        Ok(buf)
    }

    pub fn to_base64(&self) -> Result<String, WireError> {
        self.encode().map(|bytes| BASE64_STANDARD.encode(bytes))
    }
}

/// Balance transfer. The amount is always carried as base-10 text so
/// arbitrary-size balances survive intact.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferPayload {
    pub to: AccountId,
    amount: String,
}

impl TransferPayload {
    /// Accepts a non-empty string of ASCII digits.
    pub fn new(to: AccountId, amount: impl Into<String>) -> Result<Self, WireError> {
        let amount = amount.into();
        if amount.is_empty() || !amount.bytes().all(|b| b.is_ascii_digit()) {
            return Err(WireError::InvalidAmount(amount));
        }
        Ok(Self { to, amount })
    }

    pub fn from_amount(to: AccountId, amount: u128) -> Self {
        Self { to, amount: amount.to_string() }
    }

    pub fn amount(&self) -> &str {
        &self.amount
    }

    /// `[ver:2][len:4][account id][0x01][len:4][amount digits]`
    pub fn encode(&self) -> Result<Vec<u8>, WireError> {
        let mut buf = Vec::new();
        put_u16_le(&mut buf, PAYLOAD_VERSION);
        put_prefixed(&mut buf, &self.to.encode()?)?;
        buf.push(0x01);
        put_prefixed(&mut buf, self.amount.as_bytes())?;
        Ok(buf)
    }

    pub fn to_base64(&self) -> Result<String, WireError> {
        self.encode().map(|bytes| BASE64_STANDARD.encode(bytes))
    }
}

fn header(namespace: &str, action: &str) -> Result<Vec<u8>, WireError> {
    let mut buf = Vec::with_capacity(2 + 8 + namespace.len() + action.len());
    put_u16_le(&mut buf, PAYLOAD_VERSION);
    put_prefixed(&mut buf, namespace.as_bytes())?;
    put_prefixed(&mut buf, action.as_bytes())?;
    Ok(buf)
}
