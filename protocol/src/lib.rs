// Copyright (c) 2026 ALAS Technology. MIT License.
// See LICENSE for details.

//! # ensbind: Idempotent ENS Name Binding
//!
//! Binds a human-readable name like `app.domain.eth` to a deployed contract
//! address inside a shared ENS-style registry, and optionally binds the
//! reverse direction (address → name) so explorers and wallets show the
//! name instead of forty hex characters.
//!
//! The registry is shared, mutable, and lives on someone else's chain. Every
//! write can fail on its own, callers will retry, and three structurally
//! different registry deployments (L1 registry + name wrapper, ENSIP-19 L2s,
//! and Base basenames) must all look the same from the outside. Hence the
//! one rule this crate lives by: **read, compare, and only then write**.
//!
//! ## Architecture
//!
//! - **name**: Dotted-name grammar and the Keccak-256 namehash.
//! - **directory**: Static per-network table of service addresses and coin
//!   types, plus chain-family membership.
//! - **services**: Async capability traits for the external registry,
//!   resolver, name wrapper, and reverse registrars.
//! - **session**: One network's services, bound to one caller.
//! - **ownership**: Who owns a node, and whether that ownership is wrapped.
//! - **policy**: What each remote failure turns into. Written down, not
//!   scattered through `match` arms.
//! - **writers**: The idempotent upserts: subname, forward, reverse, alias.
//! - **strategy**: One binding strategy per chain family.
//! - **binder**: The orchestrator: `bind_name`, `bind_forward_only`, `plan`.
//! - **error**: The [`BindError`] taxonomy.
//! - **config**: Protocol constants.
//!
//! ## Design Philosophy
//!
//! 1. Structural errors abort before anything is written.
//! 2. Remote write failures are caught at the writer boundary and reported
//!    by stage. Completed stages are never rolled back; the next retry finds
//!    them through the idempotency checks and moves on.
//! 3. Never overwrite a node somebody else owns.

pub mod binder;
pub mod config;
pub mod directory;
pub mod error;
pub mod name;
pub mod ownership;
pub mod policy;
pub mod services;
pub mod session;
pub mod strategy;
pub mod writers;

pub use binder::{BindReport, BindStage, NameBinder};
pub use directory::{ChainDirectory, ChainFamily, NetworkId, ServiceSet};
pub use error::BindError;
pub use name::{namehash, ParsedName};
pub use writers::WriteOutcome;
