//! # Name Binder
//!
//! The orchestrator. `bind_name` walks a fixed state machine:
//!
//! ```text
//! START ─parse─▶ PARSED ─owner check─▶ AUTHORIZED ─subname─▶ SUBNAME_READY
//!       ─forward record─▶ FORWARD_SET ─reverse record─▶ REVERSE_SET
//! ```
//!
//! Any transition can fail, and the failure names its stage (see
//! [`BindError::stage`]). Nothing is undone on failure: a subname created
//! before a failed forward write stays created and correctly owned, and the
//! next attempt walks straight past it.
//!
//! Reverse-write failures are hard failures. The operation is reported as
//! failed even though the forward record is in place; callers that don't
//! need a primary name should use [`NameBinder::bind_forward_only`].

use std::sync::Arc;

use alloy_primitives::Address;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::directory::{ChainDirectory, ChainFamily, NetworkId};
use crate::error::BindError;
use crate::name::{namehash, Node, ParsedName};
use crate::ownership;
use crate::policy::{self, RemoteOp};
use crate::services::Connector;
use crate::session::NetworkSession;
use crate::strategy::strategy_for;
use crate::writers::{RecordWriter, WriteOutcome};

/// Stages of a binding, in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BindStage {
    Start,
    Parsed,
    Authorized,
    SubnameReady,
    ForwardSet,
    ReverseSet,
}

impl std::fmt::Display for BindStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BindStage::Start => write!(f, "START"),
            BindStage::Parsed => write!(f, "PARSED"),
            BindStage::Authorized => write!(f, "AUTHORIZED"),
            BindStage::SubnameReady => write!(f, "SUBNAME_READY"),
            BindStage::ForwardSet => write!(f, "FORWARD_SET"),
            BindStage::ReverseSet => write!(f, "REVERSE_SET"),
        }
    }
}

/// What a successful binding (or dry run) did, record by record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BindReport {
    pub network: NetworkId,
    pub family: ChainFamily,
    pub name: String,
    pub node: Node,
    pub target: Address,
    pub caller: Address,
    pub dry_run: bool,
    /// The last stage reached.
    pub stage: BindStage,
    pub subname: Option<WriteOutcome>,
    pub forward: Option<WriteOutcome>,
    pub reverse: Option<WriteOutcome>,
    /// Base only: the `basename` text alias.
    pub alias: Option<WriteOutcome>,
}

impl BindReport {
    fn new(session: &NetworkSession, name: &ParsedName, target: Address, dry_run: bool) -> Self {
        Self {
            network: session.network(),
            family: session.family(),
            name: name.full.clone(),
            node: name.node,
            target,
            caller: session.caller(),
            dry_run,
            stage: BindStage::Parsed,
            subname: None,
            forward: None,
            reverse: None,
            alias: None,
        }
    }

    fn outcomes(&self) -> impl Iterator<Item = &WriteOutcome> {
        [&self.subname, &self.forward, &self.reverse, &self.alias]
            .into_iter()
            .flatten()
    }

    /// Number of mutating calls this binding actually made.
    pub fn writes(&self) -> usize {
        self.outcomes().filter(|o| o.wrote()).count()
    }

    /// Dry run: number of writes a real run would make.
    pub fn pending_writes(&self) -> usize {
        self.outcomes()
            .filter(|o| matches!(o, WriteOutcome::WouldWrite))
            .count()
    }

    /// `true` when every record was already in place.
    pub fn is_noop(&self) -> bool {
        self.outcomes().all(|o| *o == WriteOutcome::Unchanged)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Scope {
    ForwardOnly,
    Full,
}

/// Binds names on behalf of one caller.
///
/// Cheap to clone; the directory and connector are shared.
#[derive(Clone)]
pub struct NameBinder {
    directory: Arc<ChainDirectory>,
    connector: Arc<dyn Connector>,
}

impl NameBinder {
    pub fn new(directory: Arc<ChainDirectory>, connector: Arc<dyn Connector>) -> Self {
        Self {
            directory,
            connector,
        }
    }

    /// The authenticated identity this binder acts as.
    pub fn caller(&self) -> Address {
        self.connector.caller()
    }

    pub fn directory(&self) -> &ChainDirectory {
        &self.directory
    }

    /// Bind `full_name` to `target` in both directions.
    ///
    /// # Errors
    ///
    /// See [`BindError`]; the error's [`stage`](BindError::stage) says how far
    /// the binding got.
    pub async fn bind_name(
        &self,
        network: NetworkId,
        target: Address,
        full_name: &str,
    ) -> Result<BindReport, BindError> {
        self.run(network, target, full_name, Scope::Full, false).await
    }

    /// Bind `full_name` to `target`, forward direction only. On Base this
    /// also skips the basename alias.
    pub async fn bind_forward_only(
        &self,
        network: NetworkId,
        target: Address,
        full_name: &str,
    ) -> Result<BindReport, BindError> {
        self.run(network, target, full_name, Scope::ForwardOnly, false)
            .await
    }

    /// Walk the same stages read-only and report which records would be
    /// written. Structural errors surface exactly as in a real run.
    pub async fn plan(
        &self,
        network: NetworkId,
        target: Address,
        full_name: &str,
        forward_only: bool,
    ) -> Result<BindReport, BindError> {
        let scope = if forward_only {
            Scope::ForwardOnly
        } else {
            Scope::Full
        };
        self.run(network, target, full_name, scope, true).await
    }

    /// Forward lookup: the address `name` resolves to on `network`, through
    /// the same resolver fallback the writers use.
    pub async fn resolve_forward(
        &self,
        network: NetworkId,
        name: &str,
    ) -> Result<Option<Address>, BindError> {
        let session = self.open(network)?;
        let node = namehash(name);
        let Some(resolver) = session.resolver_for(node).await else {
            return Ok(None);
        };
        let bytes = session
            .resolver_at(resolver)
            .addr(node, session.coin_type())
            .await
            .map_err(|err| BindError::ForwardResolutionFailed {
                name: name.to_string(),
                reason: err.to_string(),
            })?;
        Ok((bytes.len() == 20).then(|| Address::from_slice(&bytes)))
    }

    /// Reverse lookup: `identity`'s primary name on `network`, if any.
    pub async fn primary_name(
        &self,
        network: NetworkId,
        identity: Address,
    ) -> Result<Option<String>, BindError> {
        let session = self.open(network)?;
        let writer = RecordWriter::new(&session);
        Ok(strategy_for(session.family())
            .primary_name(&writer, identity)
            .await)
    }

    fn open(&self, network: NetworkId) -> Result<NetworkSession, BindError> {
        NetworkSession::open(&self.directory, Arc::clone(&self.connector), network)
    }

    async fn run(
        &self,
        network: NetworkId,
        target: Address,
        full_name: &str,
        scope: Scope,
        dry_run: bool,
    ) -> Result<BindReport, BindError> {
        info!(%network, %target, name = full_name, ?scope, dry_run, "binding name");

        // START -> PARSED. No remote calls until this is done.
        let name = ParsedName::parse(full_name)?;
        if target.is_zero() {
            return Err(BindError::InvalidTarget);
        }
        let session = self.open(network)?;
        let strategy = strategy_for(session.family());
        let writer = if dry_run {
            RecordWriter::dry_run(&session)
        } else {
            RecordWriter::new(&session)
        };
        let mut report = BindReport::new(&session, &name, target, dry_run);
        debug!(name = %name, node = %name.node, family = %session.family(), "parsed");

        // PARSED -> AUTHORIZED
        let caller = session.caller();
        if !ownership::is_caller_owner(&session, name.parent_node, caller).await {
            return Err(BindError::NotAuthorized {
                parent: name.parent.clone(),
                caller,
            });
        }
        report.stage = BindStage::Authorized;
        debug!(parent = %name.parent, %caller, "authorized");

        // AUTHORIZED -> SUBNAME_READY
        let subname = strategy.ensure_subname(&writer, &name, caller).await?;
        if let Some(reason) = subname.failure() {
            return Err(BindError::SubnameCreationFailed {
                name: name.full.clone(),
                reason: reason.to_string(),
            });
        }
        report.subname = Some(subname);
        report.stage = BindStage::SubnameReady;
        debug!(name = %name, outcome = ?report.subname, "subname ready");

        // SUBNAME_READY -> FORWARD_SET
        let forward = strategy.ensure_forward(&writer, &name, target).await?;
        if let Some(reason) = forward.failure() {
            return Err(BindError::ForwardResolutionFailed {
                name: name.full.clone(),
                reason: reason.to_string(),
            });
        }
        report.forward = Some(forward);
        report.stage = BindStage::ForwardSet;
        debug!(name = %name, outcome = ?report.forward, "forward record set");

        if scope == Scope::ForwardOnly {
            info!(name = %name, writes = report.writes(), "forward binding complete");
            return Ok(report);
        }

        // FORWARD_SET -> REVERSE_SET
        let reverse = strategy.ensure_reverse(&writer, &name, target).await?;
        if let Some(reason) = reverse.failure() {
            warn!(
                name = %name,
                op = ?RemoteOp::ReverseWrite,
                policy = ?policy::on_failure(RemoteOp::ReverseWrite),
                "reverse record failed after forward record landed"
            );
            return Err(BindError::ReverseResolutionFailed {
                name: name.full.clone(),
                reason: reason.to_string(),
            });
        }
        report.reverse = Some(reverse.primary);
        report.alias = reverse.alias;
        report.stage = BindStage::ReverseSet;

        info!(
            name = %name,
            %target,
            writes = report.writes(),
            dry_run,
            "binding complete"
        );
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn report() -> BindReport {
        BindReport {
            network: NetworkId::MAINNET,
            family: ChainFamily::L1,
            name: "app.domain.eth".into(),
            node: namehash("app.domain.eth"),
            target: Address::repeat_byte(0xab),
            caller: Address::repeat_byte(0x01),
            dry_run: false,
            stage: BindStage::ReverseSet,
            subname: Some(WriteOutcome::Written),
            forward: Some(WriteOutcome::Unchanged),
            reverse: Some(WriteOutcome::Written),
            alias: None,
        }
    }

    #[test]
    fn stages_are_ordered() {
        assert!(BindStage::Start < BindStage::Parsed);
        assert!(BindStage::SubnameReady < BindStage::ForwardSet);
        assert!(BindStage::ForwardSet < BindStage::ReverseSet);
        assert_eq!(BindStage::SubnameReady.to_string(), "SUBNAME_READY");
    }

    #[test]
    fn report_counts_writes() {
        let r = report();
        assert_eq!(r.writes(), 2);
        assert_eq!(r.pending_writes(), 0);
        assert!(!r.is_noop());
    }

    #[test]
    fn report_serializes_with_snake_case_outcomes() {
        let json = serde_json::to_value(report()).unwrap();
        assert_eq!(json["stage"], "reverse_set");
        assert_eq!(json["subname"], "written");
        assert_eq!(json["family"], "l1");
        assert!(json["alias"].is_null());
    }
}
