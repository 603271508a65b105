//! # Remote Failure Policy
//!
//! Every remote call the core makes is listed here, together with what a
//! failure of that call turns into. Call sites don't improvise: they ask
//! [`recover`] or [`soft_fail`], and this table answers.
//!
//! | Operation | On failure |
//! |---|---|
//! | `is_wrapped` | fail open: not wrapped |
//! | registry `resolver` | fail open: network public resolver |
//! | owner read for authorization | fail closed: not authorized |
//! | owner read of the subname | fail closed: subname creation failed |
//! | subname creation | soft fail |
//! | `addr` read | fail open: no record |
//! | `setAddr` | soft fail |
//! | reverse node / name read | fail open: no record |
//! | reverse node lookup for the basename alias | soft fail |
//! | `setNameForAddr` | soft fail |
//! | `text` read | fail open: no record |
//! | `setText` | soft fail |

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::services::ServiceError;
use crate::writers::WriteOutcome;

/// A remote call the core may make.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RemoteOp {
    IsWrapped,
    ResolverLookup,
    AuthorizationOwnerRead,
    SubnameOwnerRead,
    CreateSubname,
    AddrRead,
    AddrWrite,
    ReverseRead,
    ReverseWrite,
    ReverseNodeLookup,
    TextRead,
    TextWrite,
}

impl RemoteOp {
    pub const ALL: [RemoteOp; 12] = [
        RemoteOp::IsWrapped,
        RemoteOp::ResolverLookup,
        RemoteOp::AuthorizationOwnerRead,
        RemoteOp::SubnameOwnerRead,
        RemoteOp::CreateSubname,
        RemoteOp::AddrRead,
        RemoteOp::AddrWrite,
        RemoteOp::ReverseRead,
        RemoteOp::ReverseWrite,
        RemoteOp::ReverseNodeLookup,
        RemoteOp::TextRead,
        RemoteOp::TextWrite,
    ];
}

/// What a failed remote call turns into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OnFailure {
    /// Substitute the documented default and carry on.
    FailOpen,
    /// Abort the operation with a structural error.
    FailClosed,
    /// The writer reports [`WriteOutcome::Failed`]; the orchestrator aborts
    /// the remaining stages.
    SoftFail,
}

/// The policy table.
pub const FAILURE_POLICY: [(RemoteOp, OnFailure); 12] = [
    (RemoteOp::IsWrapped, OnFailure::FailOpen),
    (RemoteOp::ResolverLookup, OnFailure::FailOpen),
    (RemoteOp::AuthorizationOwnerRead, OnFailure::FailClosed),
    (RemoteOp::SubnameOwnerRead, OnFailure::FailClosed),
    (RemoteOp::CreateSubname, OnFailure::SoftFail),
    (RemoteOp::AddrRead, OnFailure::FailOpen),
    (RemoteOp::AddrWrite, OnFailure::SoftFail),
    (RemoteOp::ReverseRead, OnFailure::FailOpen),
    (RemoteOp::ReverseWrite, OnFailure::SoftFail),
    (RemoteOp::ReverseNodeLookup, OnFailure::SoftFail),
    (RemoteOp::TextRead, OnFailure::FailOpen),
    (RemoteOp::TextWrite, OnFailure::SoftFail),
];

/// Look up the policy for an operation.
pub fn on_failure(op: RemoteOp) -> OnFailure {
    FAILURE_POLICY
        .iter()
        .find(|(candidate, _)| *candidate == op)
        .map(|(_, policy)| *policy)
        .unwrap_or(OnFailure::FailClosed)
}

/// Apply the policy to a read result. Fail-open operations yield `fallback`
/// on error; everything else hands the error back to the caller.
pub fn recover<T>(op: RemoteOp, result: Result<T, ServiceError>, fallback: T) -> Result<T, ServiceError> {
    match result {
        Ok(value) => Ok(value),
        Err(err) if on_failure(op) == OnFailure::FailOpen => {
            warn!(?op, error = %err, "remote read failed, using fallback");
            Ok(fallback)
        }
        Err(err) => Err(err),
    }
}

/// Convert a failed remote write into a [`WriteOutcome::Failed`].
pub fn soft_fail(op: RemoteOp, err: ServiceError) -> WriteOutcome {
    debug_assert_eq!(on_failure(op), OnFailure::SoftFail);
    warn!(?op, error = %err, "remote write failed");
    WriteOutcome::Failed(err.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_operation_has_exactly_one_policy() {
        for op in RemoteOp::ALL {
            let count = FAILURE_POLICY.iter().filter(|(o, _)| *o == op).count();
            assert_eq!(count, 1, "{op:?} listed {count} times");
        }
    }

    #[test]
    fn writes_soft_fail_and_authorization_fails_closed() {
        for op in [
            RemoteOp::CreateSubname,
            RemoteOp::AddrWrite,
            RemoteOp::ReverseWrite,
            RemoteOp::ReverseNodeLookup,
            RemoteOp::TextWrite,
        ] {
            assert_eq!(on_failure(op), OnFailure::SoftFail);
        }
        assert_eq!(on_failure(RemoteOp::AuthorizationOwnerRead), OnFailure::FailClosed);
        assert_eq!(on_failure(RemoteOp::IsWrapped), OnFailure::FailOpen);
    }

    #[test]
    fn recover_substitutes_only_for_fail_open() {
        fn down<T>() -> Result<T, ServiceError> {
            Err(ServiceError::Transport("rpc down".into()))
        }
        assert_eq!(recover(RemoteOp::IsWrapped, down(), false), Ok(false));
        assert!(recover(RemoteOp::AuthorizationOwnerRead, down(), 0u8).is_err());
        assert!(recover(RemoteOp::ReverseNodeLookup, down::<u8>(), 0).is_err());
        assert_eq!(recover(RemoteOp::AddrRead, Ok(7u8), 0), Ok(7));
    }

    #[test]
    fn soft_fail_carries_reason() {
        let outcome = soft_fail(RemoteOp::AddrWrite, ServiceError::Reverted("nope".into()));
        assert_eq!(outcome, WriteOutcome::Failed("call reverted: nope".into()));
    }
}
