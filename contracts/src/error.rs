//! Revert reasons of the in-memory contracts.

use alloy_primitives::Address;
use thiserror::Error;

use ensbind_protocol::directory::NetworkId;
use ensbind_protocol::services::ServiceError;

/// Why an in-memory contract call reverted.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ContractError {
    /// Nothing is deployed at this address on this network.
    #[error("no contract at {address} on network {network}")]
    NoContract {
        /// The network the call was sent to.
        network: NetworkId,
        /// The address that was called.
        address: Address,
    },

    /// The caller is not allowed to touch this node or address.
    #[error("unauthorised: {caller} may not modify {subject}")]
    Unauthorised {
        /// Who called.
        caller: Address,
        /// What they tried to modify (node hash or address).
        subject: String,
    },

    /// The parent of a wrapped subname is not wrapped.
    #[error("parent {0} is not wrapped")]
    ParentNotWrapped(String),

    /// A reverse claim named the zero address as resolver.
    #[error("resolver must not be the zero address")]
    ZeroResolver,
}

impl From<ContractError> for ServiceError {
    fn from(err: ContractError) -> Self {
        match err {
            ContractError::NoContract { .. } => ServiceError::Transport(err.to_string()),
            other => ServiceError::Reverted(other.to_string()),
        }
    }
}
