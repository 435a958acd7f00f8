//! Action and transaction builder for the quill database network.
//!
//! - **[`ActionBuilder`]** assembles execution transactions and view calls,
//!   validating inputs against the namespace schema
//! - **[`SchemaCatalog`]** fronts a [`SchemaSource`] with a per-namespace
//!   [`TtlCache`]
//! - **[`SignerAttachment`]** carries an external signer through to the
//!   payload boundary; nothing in this crate signs
//!
//! Byte layouts live in [`quill_wire`], re-exported here as [`wire`].

pub mod action;
pub mod cache;
pub mod config;
mod error;
pub mod inputs;
mod lifecycle;
pub mod schema;
pub mod signer;
pub mod transaction;

pub use quill_wire as wire;

pub use action::{ActionBuilder, ActionOptions};
pub use cache::{TtlCache, DEFAULT_TTL};
pub use config::SdkConfig;
pub use error::{code as error_code, SdkError};
pub use inputs::{ActionInputs, NamedParams, ParamTypes};
pub use quill_wire::{DataType, EncodedValue, Value, VarType};
pub use schema::{
    AccessModifier, InMemorySchemaSource, NamespaceAction, SchemaCatalog, SchemaSource,
};
pub use signer::{SignatureType, Signer, SignerAttachment, SignerError};
pub use transaction::{CallMessage, UnsignedTransaction};
