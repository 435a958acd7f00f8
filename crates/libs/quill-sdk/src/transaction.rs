//! Builder outputs handed to the signing and transport layers.

use quill_wire::decode::from_base64;
use quill_wire::{ActionCall, ActionExecution, PayloadType};

use crate::error::SdkError;
use crate::signer::SignerAttachment;

/// A state-changing transaction ready for signing.
#[derive(Clone, Debug, PartialEq)]
pub struct UnsignedTransaction {
    pub payload_type: PayloadType,
    pub payload: ActionExecution,
    /// Base64 rendering of the encoded payload.
    pub encoded_payload: String,
    pub chain_id: String,
    pub description: String,
    pub nonce: Option<u64>,
    pub signer: SignerAttachment,
}

impl UnsignedTransaction {
    pub fn payload_bytes(&self) -> Result<Vec<u8>, SdkError> {
        Ok(from_base64(&self.encoded_payload)?)
    }
}

/// A read-only call of a view action.
#[derive(Clone, Debug, PartialEq)]
pub struct CallMessage {
    pub payload: ActionCall,
    pub encoded_payload: String,
    pub challenge: Option<String>,
    pub signature: Option<String>,
    /// Present only when the builder had a signer set.
    pub auth: Option<SignerAttachment>,
}

impl CallMessage {
    pub fn payload_type(&self) -> PayloadType {
        PayloadType::CallAction
    }

    pub fn payload_bytes(&self) -> Result<Vec<u8>, SdkError> {
        Ok(from_base64(&self.encoded_payload)?)
    }

    pub fn is_authenticated(&self) -> bool {
        self.auth.is_some()
    }
}
