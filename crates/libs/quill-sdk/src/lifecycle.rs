//! Build state of a single builder.

use crate::error::SdkError;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum BuilderMethod {
    SetInputs,
    SetTypes,
    SetSigner,
    SetNonce,
    SetDescription,
    SetChallenge,
    Inputs,
    BuildExecution,
    BuildCall,
}

impl BuilderMethod {
    pub(crate) fn as_str(self) -> &'static str {
        match self {
            Self::SetInputs => "set_inputs",
            Self::SetTypes => "set_types",
            Self::SetSigner => "set_signer",
            Self::SetNonce => "set_nonce",
            Self::SetDescription => "set_description",
            Self::SetChallenge => "set_challenge",
            Self::Inputs => "inputs",
            Self::BuildExecution => "build_execution_payload",
            Self::BuildCall => "build_call_payload",
        }
    }

    pub(crate) fn is_build(self) -> bool {
        matches!(self, Self::BuildExecution | Self::BuildCall)
    }
}

/// Per-builder build marker. `Building` holds the build that owns the inputs.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub(crate) enum BuildState {
    #[default]
    Idle,
    Building(BuilderMethod),
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub(crate) struct Lifecycle {
    state: BuildState,
}

impl Lifecycle {
    pub(crate) fn is_building(&self) -> bool {
        matches!(self.state, BuildState::Building(_))
    }

    /// Every builder method, reads included, needs an idle builder.
    pub(crate) fn ensure_method_legal(&self, method: BuilderMethod) -> Result<(), SdkError> {
        match self.state {
            BuildState::Idle => Ok(()),
            BuildState::Building(active) => {
                log::debug!(
                    "rejecting {} while {} is in flight",
                    method.as_str(),
                    active.as_str()
                );
                Err(SdkError::ConcurrentBuild)
            }
        }
    }

    pub(crate) fn mark_building(&mut self, method: BuilderMethod) -> Result<(), SdkError> {
        self.ensure_method_legal(method)?;
        if !method.is_build() {
            return Err(SdkError::validation(format!("{} is not a build method", method.as_str())));
        }
        self.state = BuildState::Building(method);
        Ok(())
    }

    pub(crate) fn mark_idle(&mut self) {
        self.state = BuildState::Idle;
    }
}
