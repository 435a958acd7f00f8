//! The action builder: turns action inputs into execution and call payloads.
//!
//! A build moves the builder's inputs into a guard for its whole duration.
//! While the guard lives, every other method on the same builder fails with
//! [`SdkError::ConcurrentBuild`]; when it drops, on success, error or
//! cancellation, the inputs go back and the builder is idle again.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use quill_wire::{ActionCall, ActionExecution, EncodedValue, PayloadType, Value};

use crate::config::SdkConfig;
use crate::error::SdkError;
use crate::inputs::{ActionInputs, NamedParams, ParamTypes};
use crate::lifecycle::{BuilderMethod, Lifecycle};
use crate::schema::{bare_name, NamespaceAction, SchemaCatalog};
use crate::signer::SignerAttachment;
use crate::transaction::{CallMessage, UnsignedTransaction};

/// Everything a builder needs to assemble one action request.
#[derive(Clone, Debug, Default)]
pub struct ActionOptions {
    pub action_name: String,
    pub namespace: String,
    pub chain_id: String,
    pub description: String,
    pub inputs: ActionInputs,
    pub types: Option<ParamTypes>,
    pub signer: Option<SignerAttachment>,
    pub nonce: Option<u64>,
    pub challenge: Option<String>,
    pub signature: Option<String>,
}

impl ActionOptions {
    pub fn new(namespace: impl Into<String>, action_name: impl Into<String>) -> Self {
        Self { namespace: namespace.into(), action_name: action_name.into(), ..Self::default() }
    }

    /// Options carrying the configured chain id.
    pub fn from_config(
        config: &SdkConfig,
        namespace: impl Into<String>,
        action_name: impl Into<String>,
    ) -> Self {
        Self { chain_id: config.chain_id.clone(), ..Self::new(namespace, action_name) }
    }

    pub fn with_inputs(mut self, inputs: impl Into<ActionInputs>) -> Self {
        self.inputs = inputs.into();
        self
    }

    pub fn with_types(mut self, types: ParamTypes) -> Self {
        self.types = Some(types);
        self
    }

    pub fn with_signer(mut self, signer: SignerAttachment) -> Self {
        self.signer = Some(signer);
        self
    }

    pub fn with_chain_id(mut self, chain_id: impl Into<String>) -> Self {
        self.chain_id = chain_id.into();
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    fn validate(&self) -> Result<(), SdkError> {
        if self.namespace.is_empty() {
            return Err(SdkError::MissingField { field: "namespace", purpose: "build an action" });
        }
        if self.action_name.is_empty() {
            return Err(SdkError::MissingField {
                field: "action_name",
                purpose: "build an action",
            });
        }
        Ok(())
    }
}

#[derive(Debug)]
struct BuilderInner {
    options: ActionOptions,
    lifecycle: Lifecycle,
}

/// Builds execution transactions and call messages for one action.
///
/// Methods take `&self`, so a builder can be shared; at most one build runs
/// at a time per builder.
#[derive(Debug)]
pub struct ActionBuilder {
    catalog: Arc<SchemaCatalog>,
    inner: Mutex<BuilderInner>,
}

impl ActionBuilder {
    pub fn new(catalog: Arc<SchemaCatalog>, options: ActionOptions) -> Result<Self, SdkError> {
        options.validate()?;
        Ok(Self {
            catalog,
            inner: Mutex::new(BuilderInner { options, lifecycle: Lifecycle::default() }),
        })
    }

    pub fn namespace(&self) -> String {
        self.lock().options.namespace.clone()
    }

    pub fn action_name(&self) -> String {
        self.lock().options.action_name.clone()
    }

    pub fn is_building(&self) -> bool {
        self.lock().lifecycle.is_building()
    }

    /// A copy of the current inputs.
    pub fn inputs(&self) -> Result<ActionInputs, SdkError> {
        let inner = self.lock();
        inner.lifecycle.ensure_method_legal(BuilderMethod::Inputs)?;
        Ok(inner.options.inputs.clone())
    }

    pub fn set_inputs(&self, inputs: impl Into<ActionInputs>) -> Result<(), SdkError> {
        let inputs = inputs.into();
        self.update(BuilderMethod::SetInputs, |options| options.inputs = inputs)
    }

    pub fn set_types(&self, types: Option<ParamTypes>) -> Result<(), SdkError> {
        self.update(BuilderMethod::SetTypes, |options| options.types = types)
    }

    pub fn set_signer(&self, signer: Option<SignerAttachment>) -> Result<(), SdkError> {
        self.update(BuilderMethod::SetSigner, |options| options.signer = signer)
    }

    pub fn set_nonce(&self, nonce: Option<u64>) -> Result<(), SdkError> {
        self.update(BuilderMethod::SetNonce, |options| options.nonce = nonce)
    }

    pub fn set_description(&self, description: impl Into<String>) -> Result<(), SdkError> {
        let description = description.into();
        self.update(BuilderMethod::SetDescription, |options| options.description = description)
    }

    pub fn set_challenge(
        &self,
        challenge: Option<String>,
        signature: Option<String>,
    ) -> Result<(), SdkError> {
        self.update(BuilderMethod::SetChallenge, |options| {
            options.challenge = challenge;
            options.signature = signature;
        })
    }

    /// Builds a state-changing execution, one argument group per input set.
    ///
    /// Private mode skips the schema: types come from overrides or inference.
    /// Otherwise the action must exist, be public and not be a view. A signer
    /// is required either way.
    pub async fn build_execution_payload(
        &self,
        private_mode: bool,
    ) -> Result<UnsignedTransaction, SdkError> {
        let (guard, options) = self.begin(BuilderMethod::BuildExecution)?;
        log::debug!(
            "building execution of {}.{} (private_mode={private_mode})",
            options.namespace,
            options.action_name
        );

        let arguments = if private_mode {
            encode_sets(guard.inputs(), options.types.as_ref())?
        } else {
            let action = self.resolve_action(&options).await?;
            if action.is_view() {
                log::debug!("rejecting execution of view action {}", action.name);
                return Err(SdkError::validation(format!(
                    "action '{}' is a view action; use build_call_payload",
                    action.name
                )));
            }
            encode_validated_sets(&action, guard.inputs(), options.types.as_ref())?
        };

        let payload = ActionExecution {
            namespace: options.namespace,
            action: options.action_name,
            arguments,
        };
        let encoded_payload = payload.to_base64()?;
        let signer = options
            .signer
            .ok_or(SdkError::MissingField { field: "signer", purpose: "build a transaction" })?;

        log::debug!("built execution with {} argument groups", payload.arguments.len());
        Ok(UnsignedTransaction {
            payload_type: PayloadType::ExecuteAction,
            payload,
            encoded_payload,
            chain_id: options.chain_id,
            description: options.description,
            nonce: options.nonce,
            signer,
        })
    }

    /// Builds a read-only call of a view action from a single input set.
    ///
    /// The signer is carried along only if one was set; unsigned calls are
    /// allowed.
    pub async fn build_call_payload(&self, private_mode: bool) -> Result<CallMessage, SdkError> {
        let (guard, options) = self.begin(BuilderMethod::BuildCall)?;
        log::debug!(
            "building call of {}.{} (private_mode={private_mode})",
            options.namespace,
            options.action_name
        );

        let sets = guard.inputs().len();
        if sets > 1 {
            return Err(SdkError::validation(format!(
                "a call takes exactly one input set, got {sets}; calls cannot be bulk"
            )));
        }

        let groups = if private_mode {
            encode_sets(guard.inputs(), options.types.as_ref())?
        } else {
            let action = self.resolve_action(&options).await?;
            if !action.is_view() {
                log::debug!("rejecting call of non-view action {}", action.name);
                return Err(SdkError::validation(format!(
                    "action '{}' is not a view action; use build_execution_payload",
                    action.name
                )));
            }
            encode_validated_sets(&action, guard.inputs(), options.types.as_ref())?
        };

        let payload = ActionCall {
            namespace: options.namespace,
            action: options.action_name,
            arguments: groups.into_iter().next().unwrap_or_default(),
        };
        let encoded_payload = payload.to_base64()?;
        Ok(CallMessage {
            payload,
            encoded_payload,
            challenge: options.challenge,
            signature: options.signature,
            auth: options.signer,
        })
    }

    async fn resolve_action(&self, options: &ActionOptions) -> Result<NamespaceAction, SdkError> {
        let actions = self.catalog.actions(&options.namespace).await?;
        if actions.is_empty() {
            return Err(SdkError::schema_not_found(format!(
                "no actions found for namespace '{}'",
                options.namespace
            )));
        }
        let Some(action) = actions.into_iter().find(|action| action.name == options.action_name)
        else {
            return Err(SdkError::schema_not_found(format!(
                "action '{}' not found in namespace '{}'",
                options.action_name, options.namespace
            )));
        };
        if !action.is_public() {
            return Err(SdkError::validation(format!(
                "action '{}' is not a public action",
                action.name
            )));
        }
        Ok(action)
    }

    /// Enters the building state, moving the inputs into the returned guard.
    /// The returned options are a snapshot with empty inputs.
    fn begin(&self, method: BuilderMethod) -> Result<(BuildGuard<'_>, ActionOptions), SdkError> {
        let mut inner = self.lock();
        inner.lifecycle.mark_building(method)?;
        let inputs = std::mem::take(&mut inner.options.inputs);
        let options = inner.options.clone();
        Ok((BuildGuard { inner: &self.inner, inputs }, options))
    }

    fn update(
        &self,
        method: BuilderMethod,
        apply: impl FnOnce(&mut ActionOptions),
    ) -> Result<(), SdkError> {
        let mut inner = self.lock();
        inner.lifecycle.ensure_method_legal(method)?;
        apply(&mut inner.options);
        Ok(())
    }

    fn lock(&self) -> MutexGuard<'_, BuilderInner> {
        lock_inner(&self.inner)
    }
}

fn lock_inner(inner: &Mutex<BuilderInner>) -> MutexGuard<'_, BuilderInner> {
    inner.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Holds the inputs of an in-flight build and restores them on drop.
struct BuildGuard<'a> {
    inner: &'a Mutex<BuilderInner>,
    inputs: ActionInputs,
}

impl BuildGuard<'_> {
    fn inputs(&self) -> &ActionInputs {
        &self.inputs
    }
}

impl Drop for BuildGuard<'_> {
    fn drop(&mut self) {
        let mut inner = lock_inner(self.inner);
        inner.options.inputs = std::mem::take(&mut self.inputs);
        inner.lifecycle.mark_idle();
    }
}

/// Encodes every set as given, without a schema.
fn encode_sets(
    inputs: &ActionInputs,
    types: Option<&ParamTypes>,
) -> Result<Vec<Vec<EncodedValue>>, SdkError> {
    match inputs {
        ActionInputs::Named(sets) => sets
            .iter()
            .map(|set| {
                set.iter()
                    .enumerate()
                    .map(|(index, (name, value))| encode_one(value, types, index, Some(name)))
                    .collect::<Result<Vec<_>, _>>()
            })
            .collect(),
        ActionInputs::Positional(sets) => sets
            .iter()
            .map(|set| encode_positional(set, types, &[]))
            .collect(),
    }
}

/// Encodes every set against the action's declared parameters.
fn encode_validated_sets(
    action: &NamespaceAction,
    inputs: &ActionInputs,
    types: Option<&ParamTypes>,
) -> Result<Vec<Vec<EncodedValue>>, SdkError> {
    match inputs {
        ActionInputs::Named(sets) => {
            sets.iter().map(|set| encode_named(action, set, types)).collect()
        }
        ActionInputs::Positional(sets) => sets
            .iter()
            .map(|set| {
                let declared = action.parameter_names.len();
                if set.len() > declared {
                    return Err(SdkError::validation(format!(
                        "action '{}' takes {declared} parameters, got {} positional values",
                        action.name,
                        set.len()
                    )));
                }
                encode_positional(set, types, &action.parameter_names)
            })
            .collect(),
    }
}

/// Checks provided names against the declaration and lays the values out in
/// declared order. Omitted parameters before the last provided one become
/// nulls; trailing ones are left off so server defaults apply.
fn encode_named(
    action: &NamespaceAction,
    set: &NamedParams,
    types: Option<&ParamTypes>,
) -> Result<Vec<EncodedValue>, SdkError> {
    let unknown: Vec<String> = set
        .names()
        .filter(|name| action.parameter_index(name).is_none())
        .map(|name| bare_name(name).to_owned())
        .collect();
    if !unknown.is_empty() {
        log::debug!("rejecting unknown parameters {unknown:?} for {}", action.name);
        let message = if action.parameter_names.is_empty() {
            format!("action '{}' takes no parameters, got: {}", action.name, unknown.join(", "))
        } else {
            format!("incorrect parameters: {} for action '{}'", unknown.join(", "), action.name)
        };
        return Err(SdkError::invalid_parameters(message, unknown));
    }

    let Some(last) = set.names().filter_map(|name| action.parameter_index(name)).max() else {
        return Ok(Vec::new());
    };
    action.parameter_names[..=last]
        .iter()
        .enumerate()
        .map(|(index, declared)| {
            let value = set.get(declared).unwrap_or(&Value::Null);
            encode_one(value, types, index, Some(declared))
        })
        .collect()
}

fn encode_positional(
    set: &[Value],
    types: Option<&ParamTypes>,
    declared: &[String],
) -> Result<Vec<EncodedValue>, SdkError> {
    set.iter()
        .enumerate()
        .map(|(index, value)| {
            encode_one(value, types, index, declared.get(index).map(String::as_str))
        })
        .collect()
}

fn encode_one(
    value: &Value,
    types: Option<&ParamTypes>,
    index: usize,
    name: Option<&str>,
) -> Result<EncodedValue, SdkError> {
    let explicit = types.and_then(|types| types.lookup(index, name));
    Ok(EncodedValue::from_value(value, explicit)?)
}
