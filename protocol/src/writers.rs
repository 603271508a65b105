//! # Idempotent Record Writers
//!
//! Four upserts, one template:
//!
//! 1. Read the current value.
//! 2. If it already matches, do nothing.
//! 3. Otherwise write, and report a failed write as [`WriteOutcome::Failed`]
//!    instead of an error.
//!
//! Calling any writer twice with the same arguments issues at most one
//! mutating call. That is what makes retrying a half-finished `bind_name`
//! safe: the stages that already landed read back as [`WriteOutcome::Unchanged`].
//!
//! In dry-run mode the writers stop after step 2 and report
//! [`WriteOutcome::WouldWrite`] where they would have written.

use alloy_primitives::Address;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::{BASENAME_TEXT_KEY, DEFAULT_EXPIRY, DEFAULT_FUSES, DEFAULT_TTL};
use crate::error::BindError;
use crate::name::{Node, ParsedName};
use crate::ownership;
use crate::policy::{self, RemoteOp};
use crate::services::ServiceError;
use crate::session::NetworkSession;

/// Result of one idempotent upsert.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WriteOutcome {
    /// The record already held the desired value. Nothing was sent.
    Unchanged,
    /// One mutating call was sent and accepted.
    Written,
    /// Dry run: a write would have been sent.
    WouldWrite,
    /// The mutating call failed. Carries the remote reason.
    Failed(String),
}

impl WriteOutcome {
    /// `false` only for [`WriteOutcome::Failed`].
    pub fn is_success(&self) -> bool {
        !matches!(self, WriteOutcome::Failed(_))
    }

    /// Whether a mutating call was actually accepted.
    pub fn wrote(&self) -> bool {
        matches!(self, WriteOutcome::Written)
    }

    /// The failure reason, if any.
    pub fn failure(&self) -> Option<&str> {
        match self {
            WriteOutcome::Failed(reason) => Some(reason),
            _ => None,
        }
    }
}

/// Runs the upserts against one network session.
pub struct RecordWriter<'a> {
    session: &'a NetworkSession,
    dry_run: bool,
}

impl<'a> RecordWriter<'a> {
    pub fn new(session: &'a NetworkSession) -> Self {
        Self {
            session,
            dry_run: false,
        }
    }

    /// A writer that reads everything and writes nothing.
    pub fn dry_run(session: &'a NetworkSession) -> Self {
        Self {
            session,
            dry_run: true,
        }
    }

    pub fn session(&self) -> &NetworkSession {
        self.session
    }

    pub fn is_dry_run(&self) -> bool {
        self.dry_run
    }

    /// Make sure `name` exists and belongs to `owner`.
    ///
    /// # Errors
    ///
    /// - [`BindError::NodeOwnedByOther`] if someone else already holds it.
    /// - [`BindError::SubnameCreationFailed`] if its current owner can't be read.
    pub async fn ensure_subname(
        &self,
        name: &ParsedName,
        owner: Address,
    ) -> Result<WriteOutcome, BindError> {
        let session = self.session;

        let existing = ownership::owner_of(session, name.node)
            .await
            .map_err(|err| BindError::SubnameCreationFailed {
                name: name.full.clone(),
                reason: err.to_string(),
            })?;

        if existing == owner {
            debug!(name = %name, %owner, "subname already owned by us");
            return Ok(WriteOutcome::Unchanged);
        }
        if !existing.is_zero() {
            return Err(BindError::NodeOwnedByOther {
                name: name.full.clone(),
                owner: existing,
            });
        }
        if self.dry_run {
            return Ok(WriteOutcome::WouldWrite);
        }

        let resolver = session
            .resolver_for(name.parent_node)
            .await
            .unwrap_or(Address::ZERO);

        let wrapper = if ownership::is_wrapped(session, name.parent_node).await {
            session.name_wrapper()
        } else {
            None
        };

        let result = match wrapper {
            Some(wrapper) => {
                debug!(name = %name, "creating wrapped subname");
                wrapper
                    .set_subnode_record(
                        name.parent_node,
                        &name.label,
                        owner,
                        resolver,
                        DEFAULT_TTL,
                        DEFAULT_FUSES,
                        DEFAULT_EXPIRY,
                    )
                    .await
            }
            None => {
                debug!(name = %name, "creating registry subname");
                session
                    .registry()
                    .set_subnode_record(
                        name.parent_node,
                        name.label_hash,
                        owner,
                        resolver,
                        DEFAULT_TTL,
                    )
                    .await
            }
        };

        Ok(finish(RemoteOp::CreateSubname, result))
    }

    /// Make sure the address record of `name` for `coin_type` is `target`.
    ///
    /// # Errors
    ///
    /// [`BindError::ResolverUnavailable`] if neither the node nor the network
    /// has a resolver.
    pub async fn ensure_forward_record(
        &self,
        name: &ParsedName,
        coin_type: u64,
        target: &[u8],
    ) -> Result<WriteOutcome, BindError> {
        let resolver_addr = self.session.resolver_for(name.node).await.ok_or_else(|| {
            BindError::ResolverUnavailable {
                name: name.full.clone(),
            }
        })?;
        let resolver = self.session.resolver_at(resolver_addr);

        let current = policy::recover(
            RemoteOp::AddrRead,
            resolver.addr(name.node, coin_type).await,
            Vec::new(),
        )
        .unwrap_or_default();

        if current == target {
            debug!(name = %name, coin_type, "forward record already current");
            return Ok(WriteOutcome::Unchanged);
        }
        if self.dry_run {
            return Ok(WriteOutcome::WouldWrite);
        }

        let result = resolver.set_addr(name.node, coin_type, target.to_vec()).await;
        Ok(finish(RemoteOp::AddrWrite, result))
    }

    /// L1-style primary name: make `identity`'s reverse record read `name`.
    ///
    /// # Errors
    ///
    /// [`BindError::ResolverUnavailable`] if there's no resolver to attach to
    /// the reverse node.
    pub async fn ensure_reverse_record(
        &self,
        identity: Address,
        name: &ParsedName,
    ) -> Result<WriteOutcome, BindError> {
        let Some(registrar) = self.session.reverse_registrar() else {
            return Ok(WriteOutcome::Failed("no reverse registrar on this network".into()));
        };

        if self.current_primary_name(identity).await.as_deref() == Some(name.full.as_str()) {
            debug!(name = %name, %identity, "reverse record already current");
            return Ok(WriteOutcome::Unchanged);
        }
        if self.dry_run {
            return Ok(WriteOutcome::WouldWrite);
        }

        let resolver = self.session.resolver_for(name.node).await.ok_or_else(|| {
            BindError::ResolverUnavailable {
                name: name.full.clone(),
            }
        })?;

        let result = registrar
            .set_name_for_addr(identity, self.session.caller(), resolver, name.full.clone())
            .await
            .map(|_| ());
        Ok(finish(RemoteOp::ReverseWrite, result))
    }

    /// ENSIP-19 primary name on an L2 reverse registrar.
    pub async fn ensure_l2_reverse_record(
        &self,
        identity: Address,
        name: &ParsedName,
    ) -> Result<WriteOutcome, BindError> {
        let Some(registrar) = self.session.l2_reverse_registrar() else {
            return Ok(WriteOutcome::Failed("no reverse registrar on this network".into()));
        };

        let current = policy::recover(
            RemoteOp::ReverseRead,
            registrar.name_for_addr(identity).await,
            String::new(),
        )
        .unwrap_or_default();

        if current == name.full {
            debug!(name = %name, %identity, "L2 primary name already current");
            return Ok(WriteOutcome::Unchanged);
        }
        if self.dry_run {
            return Ok(WriteOutcome::WouldWrite);
        }

        let result = registrar.set_name_for_addr(identity, name.full.clone()).await;
        Ok(finish(RemoteOp::ReverseWrite, result))
    }

    /// Base: the `basename` text record on `identity`'s reverse node, written
    /// through the network's public resolver.
    pub async fn ensure_basename_alias(
        &self,
        identity: Address,
        alias: &str,
    ) -> Result<WriteOutcome, BindError> {
        let (Some(registrar), Some(resolver)) = (
            self.session.reverse_registrar(),
            self.session.public_resolver(),
        ) else {
            return Ok(WriteOutcome::Failed(
                "basename alias needs a reverse registrar and a public resolver".into(),
            ));
        };

        let reverse_node = match registrar.node(identity).await {
            Ok(node) => node,
            Err(err) => return Ok(policy::soft_fail(RemoteOp::ReverseNodeLookup, err)),
        };

        let current = policy::recover(
            RemoteOp::TextRead,
            resolver.text(reverse_node, BASENAME_TEXT_KEY).await,
            String::new(),
        )
        .unwrap_or_default();

        if current == alias {
            debug!(%identity, alias, "basename alias already current");
            return Ok(WriteOutcome::Unchanged);
        }
        if self.dry_run {
            return Ok(WriteOutcome::WouldWrite);
        }

        let result = resolver
            .set_text(reverse_node, BASENAME_TEXT_KEY, alias.to_string())
            .await;
        Ok(finish(RemoteOp::TextWrite, result))
    }

    /// What `identity`'s L1-style reverse record currently says, if anything.
    /// Every read on the way fails open to `None`.
    pub async fn current_primary_name(&self, identity: Address) -> Option<String> {
        let registrar = self.session.reverse_registrar()?;
        let reverse_node = self.read_reverse(registrar.node(identity).await)?;
        self.name_record(reverse_node).await
    }

    async fn name_record(&self, reverse_node: Node) -> Option<String> {
        let resolver_addr =
            self.read_reverse(self.session.registry().resolver(reverse_node).await)?;
        if resolver_addr.is_zero() {
            return None;
        }
        let name = self.read_reverse(
            self.session
                .resolver_at(resolver_addr)
                .name(reverse_node)
                .await,
        )?;
        (!name.is_empty()).then_some(name)
    }

    fn read_reverse<T>(&self, result: Result<T, ServiceError>) -> Option<T> {
        policy::recover(RemoteOp::ReverseRead, result.map(Some), None)
            .ok()
            .flatten()
    }
}

fn finish(op: RemoteOp, result: Result<(), ServiceError>) -> WriteOutcome {
    match result {
        Ok(()) => WriteOutcome::Written,
        Err(err) => policy::soft_fail(op, err),
    }
}
