//! # Ownership & Wrapping
//!
//! A node is owned either directly in the registry or, if wrapped, through
//! the name wrapper's ERC-1155 token `uint256(node)`. For a wrapped node the
//! registry reports the wrapper contract as owner, which is true and useless,
//! so we ask the wrapper instead.
//!
//! `is_wrapped` fails open: a missing or misbehaving wrapper means "not
//! wrapped", and the common path carries on through the registry.

use alloy_primitives::Address;
use tracing::{debug, warn};

use crate::name::{token_id, Node};
use crate::policy::{self, RemoteOp};
use crate::services::ServiceResult;
use crate::session::NetworkSession;

/// Whether `node` is held by the name wrapper. `false` when the network has
/// no wrapper or the wrapper can't be reached.
pub async fn is_wrapped(session: &NetworkSession, node: Node) -> bool {
    let Some(wrapper) = session.name_wrapper() else {
        return false;
    };
    policy::recover(RemoteOp::IsWrapped, wrapper.is_wrapped(node).await, false).unwrap_or(false)
}

/// The effective owner of `node`; the zero address if nobody owns it.
pub async fn owner_of(session: &NetworkSession, node: Node) -> ServiceResult<Address> {
    if is_wrapped(session, node).await {
        if let Some(wrapper) = session.name_wrapper() {
            return wrapper.owner_of(token_id(&node)).await;
        }
    }
    session.registry().owner(node).await
}

/// Authorization gate: does `caller` own `node`?
///
/// A failed ownership read is a denial.
pub async fn is_caller_owner(session: &NetworkSession, node: Node, caller: Address) -> bool {
    match owner_of(session, node).await {
        Ok(owner) => {
            debug!(%node, %owner, %caller, "ownership check");
            !caller.is_zero() && owner == caller
        }
        Err(err) => {
            warn!(
                op = ?RemoteOp::AuthorizationOwnerRead,
                %node,
                error = %err,
                "owner read failed, denying"
            );
            false
        }
    }
}
