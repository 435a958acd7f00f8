//! The signing seam. This crate carries signer handles through to the
//! payload boundary and never signs anything itself.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[error("signing failed: {0}")]
pub struct SignerError(pub String);

/// Produces signatures over finished payload bytes.
pub trait Signer: Send + Sync {
    fn sign(&self, message: &[u8]) -> Result<Vec<u8>, SignerError>;
}

impl<F> Signer for F
where
    F: Fn(&[u8]) -> Result<Vec<u8>, SignerError> + Send + Sync,
{
    fn sign(&self, message: &[u8]) -> Result<Vec<u8>, SignerError> {
        self(message)
    }
}

/// Signature scheme tag sent alongside the signature.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SignatureType {
    #[serde(rename = "secp256k1_ep")]
    Secp256k1Personal,
    #[serde(rename = "ed25519")]
    Ed25519,
    #[serde(untagged)]
    Custom(String),
}

impl SignatureType {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Secp256k1Personal => "secp256k1_ep",
            Self::Ed25519 => "ed25519",
            Self::Custom(name) => name,
        }
    }
}

impl fmt::Display for SignatureType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A signer handle with the identity it signs for.
#[derive(Clone)]
pub struct SignerAttachment {
    pub signer: Arc<dyn Signer>,
    pub identifier: Vec<u8>,
    pub signature_type: SignatureType,
}

impl SignerAttachment {
    pub fn new(
        signer: Arc<dyn Signer>,
        identifier: impl Into<Vec<u8>>,
        signature_type: SignatureType,
    ) -> Self {
        Self { signer, identifier: identifier.into(), signature_type }
    }

    pub fn identifier_hex(&self) -> String {
        hex::encode(&self.identifier)
    }
}

impl fmt::Debug for SignerAttachment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SignerAttachment")
            .field("identifier", &self.identifier_hex())
            .field("signature_type", &self.signature_type)
            .finish_non_exhaustive()
    }
}

impl PartialEq for SignerAttachment {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.signer, &other.signer)
            && self.identifier == other.identifier
            && self.signature_type == other.signature_type
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn closures_are_signers() {
        let signer: Arc<dyn Signer> =
            Arc::new(|message: &[u8]| Ok::<_, SignerError>(message.to_vec()));
        assert_eq!(signer.sign(b"abc").expect("sign"), b"abc".to_vec());
    }

    #[test]
    fn signature_type_names() {
        assert_eq!(
            serde_json::to_string(&SignatureType::Secp256k1Personal).expect("serialize"),
            "\"secp256k1_ep\""
        );
        let custom: SignatureType = serde_json::from_str("\"sr25519\"").expect("decode");
        assert_eq!(custom, SignatureType::Custom("sr25519".into()));
    }

    #[test]
    fn debug_hides_the_handle() {
        let signer: Arc<dyn Signer> = Arc::new(|_: &[u8]| Ok::<_, SignerError>(Vec::new()));
        let attachment = SignerAttachment::new(signer, vec![0xab, 0xcd], SignatureType::Ed25519);
        let rendered = format!("{attachment:?}");
        assert!(rendered.contains("abcd"));
        assert!(rendered.contains("Ed25519"));
    }
}
