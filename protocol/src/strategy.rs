//! # Chain-Family Strategies
//!
//! The pipeline is the same everywhere: subname, forward record, reverse
//! record. Only the reverse leg differs by family:
//!
//! | Family | Reverse leg |
//! |---|---|
//! | L1 | `addr.reverse` via the reverse registrar + resolver `name` |
//! | L2 | ENSIP-19 `setNameForAddr(addr, name)` on the L2 reverse registrar |
//! | Base | L1-style primary name, then a `basename` text alias |
//!
//! Strategies are stateless. Pick one with [`strategy_for`].

use alloy_primitives::Address;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::directory::ChainFamily;
use crate::error::BindError;
use crate::name::ParsedName;
use crate::policy::{self, RemoteOp};
use crate::writers::{RecordWriter, WriteOutcome};

/// Outcome of the reverse leg. `alias` is only set by the Base strategy,
/// and stays `None` if the primary name write failed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReverseOutcome {
    pub primary: WriteOutcome,
    pub alias: Option<WriteOutcome>,
}

impl ReverseOutcome {
    /// The first failure reason across both records, if any.
    pub fn failure(&self) -> Option<&str> {
        self.primary
            .failure()
            .or_else(|| self.alias.as_ref().and_then(WriteOutcome::failure))
    }
}

/// How one chain family binds a name.
#[async_trait]
pub trait BindingStrategy: Send + Sync {
    fn family(&self) -> ChainFamily;

    /// Create `name` for `owner` if it isn't there yet.
    async fn ensure_subname(
        &self,
        writer: &RecordWriter<'_>,
        name: &ParsedName,
        owner: Address,
    ) -> Result<WriteOutcome, BindError> {
        writer.ensure_subname(name, owner).await
    }

    /// Point `name` at `target` using the network's coin type.
    async fn ensure_forward(
        &self,
        writer: &RecordWriter<'_>,
        name: &ParsedName,
        target: Address,
    ) -> Result<WriteOutcome, BindError> {
        let coin_type = writer.session().coin_type();
        writer
            .ensure_forward_record(name, coin_type, target.as_slice())
            .await
    }

    /// Make `name` the primary name of `target`.
    async fn ensure_reverse(
        &self,
        writer: &RecordWriter<'_>,
        name: &ParsedName,
        target: Address,
    ) -> Result<ReverseOutcome, BindError>;

    /// Read `identity`'s current primary name.
    async fn primary_name(&self, writer: &RecordWriter<'_>, identity: Address) -> Option<String>;
}

/// Registry + name wrapper, `addr.reverse` primary names.
#[derive(Debug, Default, Clone, Copy)]
pub struct L1Strategy;

/// ENSIP-19 L2 primary names.
#[derive(Debug, Default, Clone, Copy)]
pub struct L2Strategy;

/// Base basenames: primary name plus the `basename` text alias.
#[derive(Debug, Default, Clone, Copy)]
pub struct BaseStrategy;

#[async_trait]
impl BindingStrategy for L1Strategy {
    fn family(&self) -> ChainFamily {
        ChainFamily::L1
    }

    async fn ensure_reverse(
        &self,
        writer: &RecordWriter<'_>,
        name: &ParsedName,
        target: Address,
    ) -> Result<ReverseOutcome, BindError> {
        Ok(ReverseOutcome {
            primary: writer.ensure_reverse_record(target, name).await?,
            alias: None,
        })
    }

    async fn primary_name(&self, writer: &RecordWriter<'_>, identity: Address) -> Option<String> {
        writer.current_primary_name(identity).await
    }
}

#[async_trait]
impl BindingStrategy for L2Strategy {
    fn family(&self) -> ChainFamily {
        ChainFamily::L2
    }

    async fn ensure_reverse(
        &self,
        writer: &RecordWriter<'_>,
        name: &ParsedName,
        target: Address,
    ) -> Result<ReverseOutcome, BindError> {
        Ok(ReverseOutcome {
            primary: writer.ensure_l2_reverse_record(target, name).await?,
            alias: None,
        })
    }

    async fn primary_name(&self, writer: &RecordWriter<'_>, identity: Address) -> Option<String> {
        let registrar = writer.session().l2_reverse_registrar()?;
        let name = policy::recover(
            RemoteOp::ReverseRead,
            registrar.name_for_addr(identity).await,
            String::new(),
        )
        .unwrap_or_default();
        (!name.is_empty()).then_some(name)
    }
}

#[async_trait]
impl BindingStrategy for BaseStrategy {
    fn family(&self) -> ChainFamily {
        ChainFamily::Base
    }

    async fn ensure_reverse(
        &self,
        writer: &RecordWriter<'_>,
        name: &ParsedName,
        target: Address,
    ) -> Result<ReverseOutcome, BindError> {
        let primary = writer.ensure_reverse_record(target, name).await?;
        if !primary.is_success() {
            return Ok(ReverseOutcome {
                primary,
                alias: None,
            });
        }
        let alias = writer.ensure_basename_alias(target, &name.full).await?;
        Ok(ReverseOutcome {
            primary,
            alias: Some(alias),
        })
    }

    async fn primary_name(&self, writer: &RecordWriter<'_>, identity: Address) -> Option<String> {
        writer.current_primary_name(identity).await
    }
}

static L1: L1Strategy = L1Strategy;
static L2: L2Strategy = L2Strategy;
static BASE: BaseStrategy = BaseStrategy;

/// The strategy for a chain family.
pub fn strategy_for(family: ChainFamily) -> &'static dyn BindingStrategy {
    match family {
        ChainFamily::L1 => &L1,
        ChainFamily::L2 => &L2,
        ChainFamily::Base => &BASE,
    }
}
