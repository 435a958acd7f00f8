//! Account identifiers used as transfer recipients.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::bytes::put_prefixed;
use crate::WireError;

const STELLAR_ADDRESS_LEN: usize = 56;
const XRPL_ED25519_PREFIX: u8 = 0xed;

/// Key scheme of an account identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum KeyType {
    Secp256k1,
    Ed25519,
    #[serde(untagged)]
    Other(String),
}

impl KeyType {
    pub fn from_name(name: impl Into<String>) -> Self {
        let name = name.into();
        match name.as_str() {
            "secp256k1" => Self::Secp256k1,
            "ed25519" => Self::Ed25519,
            _ => Self::Other(name),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Secp256k1 => "secp256k1",
            Self::Ed25519 => "ed25519",
            Self::Other(name) => name,
        }
    }
}

impl fmt::Display for KeyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Raw identifier bytes plus the key scheme they belong to.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AccountId {
    pub identifier: Vec<u8>,
    pub key_type: KeyType,
}

impl AccountId {
    pub fn new(identifier: Vec<u8>, key_type: KeyType) -> Self {
        Self { identifier, key_type }
    }

    /// Parses a hex identifier (with or without `0x`).
    pub fn from_hex(identifier: &str, key_type: KeyType) -> Result<Self, WireError> {
        let trimmed = identifier.strip_prefix("0x").unwrap_or(identifier);
        let bytes =
            hex::decode(trimmed).map_err(|err| WireError::InvalidAccount(err.to_string()))?;
        Ok(Self::new(bytes, key_type))
    }

    /// Parses a hex identifier and infers its key type.
    pub fn from_hex_inferred(identifier: &str) -> Result<Self, WireError> {
        let account = Self::from_hex(identifier, KeyType::Secp256k1)?;
        let key_type = infer_key_type(&account.identifier)?;
        Ok(Self { key_type, ..account })
    }

    /// `[len:4 LE][identifier][len:4 LE][key type]`
    pub fn encode(&self) -> Result<Vec<u8>, WireError> {
        let key_type = self.key_type.as_str().as_bytes();
        let mut buf = Vec::with_capacity(8 + self.identifier.len() + key_type.len());
        put_prefixed(&mut buf, &self.identifier)?;
        put_prefixed(&mut buf, key_type)?;
        Ok(buf)
    }
}

/// Infers the key scheme from identifier bytes.
///
/// 32-byte keys, 33-byte XRPL keys starting with `0xED` and Stellar `G...`
/// addresses are ed25519; 20-byte addresses are secp256k1.
pub fn infer_key_type(identifier: &[u8]) -> Result<KeyType, WireError> {
    if identifier.len() == 32 || is_xrpl_key(identifier) || is_stellar_address(identifier) {
        return Ok(KeyType::Ed25519);
    }
    if identifier.len() == 20 {
        return Ok(KeyType::Secp256k1);
    }
    Err(WireError::InvalidAccount(format!(
        "cannot determine key type from {} byte identifier",
        identifier.len()
    )))
}

fn is_xrpl_key(identifier: &[u8]) -> bool {
    identifier.len() == 33 && identifier[0] == XRPL_ED25519_PREFIX
}

fn is_stellar_address(identifier: &[u8]) -> bool {
    identifier.len() == STELLAR_ADDRESS_LEN
        && identifier[0] == b'G'
        && identifier[1..].iter().all(|b| b.is_ascii_uppercase() || b.is_ascii_digit())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn infers_key_types() {
        assert_eq!(infer_key_type(&[0u8; 20]).expect("secp"), KeyType::Secp256k1);
        assert_eq!(infer_key_type(&[0u8; 32]).expect("ed"), KeyType::Ed25519);

        let mut xrpl = vec![0xed];
        xrpl.extend_from_slice(&[1u8; 32]);
        assert_eq!(infer_key_type(&xrpl).expect("xrpl"), KeyType::Ed25519);

        let stellar = format!("G{}", "A".repeat(55));
        assert_eq!(infer_key_type(stellar.as_bytes()).expect("stellar"), KeyType::Ed25519);

        assert!(infer_key_type(&[0u8; 7]).is_err());
    }

    #[test]
    fn from_hex_accepts_prefix() {
        let account = AccountId::from_hex_inferred("0xabababababababababababababababababababab")
            .expect("parse");
        assert_eq!(account.identifier, vec![0xab; 20]);
        assert_eq!(account.key_type, KeyType::Secp256k1);
        assert!(AccountId::from_hex("zz", KeyType::Ed25519).is_err());
    }

    #[test]
    fn encodes_identifier_then_key_type() {
        let account = AccountId::new(vec![0xaa, 0xbb], KeyType::Ed25519);
        let encoded = account.encode().expect("encode");
        assert_eq!(&encoded[..6], &[0x02, 0x00, 0x00, 0x00, 0xaa, 0xbb]);
        assert_eq!(&encoded[6..10], &[0x07, 0x00, 0x00, 0x00]);
        assert_eq!(&encoded[10..], b"ed25519");
    }

    #[test]
    fn key_type_serde_keeps_custom_names() {
        let custom: KeyType = serde_json::from_str("\"sr25519\"").expect("decode");
        assert_eq!(custom, KeyType::Other("sr25519".into()));
        let known: KeyType = serde_json::from_str("\"ed25519\"").expect("decode");
        assert_eq!(known, KeyType::Ed25519);
    }
}
