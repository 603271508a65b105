//! Error types for name binding.
//!
//! Every `bind_name` failure is a [`BindError`]. The first five variants are
//! structural: they are raised before anything is written, so the registry
//! is untouched. The last four are raised after a remote write failed; any
//! stage completed before that point stays in place, and a retry of the
//! whole operation picks up where this one stopped.

use alloy_primitives::Address;
use thiserror::Error;

use crate::binder::BindStage;
use crate::directory::NetworkId;
use crate::name::NameError;

/// Errors that can occur while binding a name.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BindError {
    /// The name is not of the form `label.parent`.
    #[error("invalid name format: {0}")]
    InvalidNameFormat(#[from] NameError),

    /// The target address is zero.
    #[error("invalid target: cannot bind a name to the zero address")]
    InvalidTarget,

    /// The chain directory has no registry for this network.
    #[error("unsupported network: {0}")]
    UnsupportedNetwork(NetworkId),

    /// The caller does not own the parent node.
    #[error("not authorized: {caller} does not own {parent}")]
    NotAuthorized {
        /// The parent name the caller tried to bind under.
        parent: String,
        /// The caller's identity.
        caller: Address,
    },

    /// The subname already exists and belongs to someone else.
    #[error("{name} is already owned by {owner}")]
    NodeOwnedByOther {
        /// The full name of the contested subname.
        name: String,
        /// Its current owner.
        owner: Address,
    },

    /// Neither the node nor the network has a resolver to write to.
    #[error("no resolver available for {name}")]
    ResolverUnavailable {
        /// The name whose records we needed to write.
        name: String,
    },

    /// Creating the subname failed remotely.
    #[error("failed to create subname {name}: {reason}")]
    SubnameCreationFailed {
        /// The full name of the subname.
        name: String,
        /// What the remote side said.
        reason: String,
    },

    /// Writing the forward address record failed.
    #[error("failed to set forward record for {name}: {reason}")]
    ForwardResolutionFailed {
        /// The name being resolved.
        name: String,
        /// What the remote side said.
        reason: String,
    },

    /// Writing the reverse (primary name) record failed.
    #[error("failed to set reverse record for {name}: {reason}")]
    ReverseResolutionFailed {
        /// The name being set as primary.
        name: String,
        /// What the remote side said.
        reason: String,
    },
}

impl BindError {
    /// The stage the operation was trying to reach when it failed.
    pub fn stage(&self) -> BindStage {
        match self {
            BindError::InvalidNameFormat(_)
            | BindError::InvalidTarget
            | BindError::UnsupportedNetwork(_) => BindStage::Parsed,
            BindError::NotAuthorized { .. } => BindStage::Authorized,
            BindError::NodeOwnedByOther { .. } | BindError::SubnameCreationFailed { .. } => {
                BindStage::SubnameReady
            }
            BindError::ResolverUnavailable { .. } | BindError::ForwardResolutionFailed { .. } => {
                BindStage::ForwardSet
            }
            BindError::ReverseResolutionFailed { .. } => BindStage::ReverseSet,
        }
    }

    /// Whether retrying the same call could succeed without anyone changing
    /// the inputs or the registry. Only remote write failures qualify.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            BindError::SubnameCreationFailed { .. }
                | BindError::ForwardResolutionFailed { .. }
                | BindError::ReverseResolutionFailed { .. }
        )
    }
}
