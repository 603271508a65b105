//! # ensbind Contracts
//!
//! In-memory versions of the contracts `ensbind` talks to, so the binder
//! can be exercised end to end without an RPC endpoint:
//!
//! - **Registry**: node owners and resolvers, `setSubnodeRecord`.
//! - **Resolver**: address, name, and text records.
//! - **Name Wrapper**: wrapped ownership through ERC-1155 token ids.
//! - **Reverse Registrars**: the L1 `addr.reverse` flavour and the
//!   ENSIP-19 L2 flavour.
//!
//! [`SimulatedChain`] holds one deployment per network, logs every call,
//! and injects failures on request. [`SimulatedConnector`] plugs it into a
//! `NameBinder`.
//!
//! ## Design Principles
//!
//! 1. Authorization is enforced the way the deployed contracts enforce it.
//!    A test that passes here does not pass because the fake is lenient.
//! 2. Every call, successful or not, lands in the call log. Idempotency is
//!    asserted by counting mutating calls, not by trusting reports.
//! 3. Calls to an address that hosts no such contract fail as transport
//!    errors, like a misconfigured RPC target would.

pub mod chain;
pub mod error;
pub mod name_wrapper;
pub mod registry;
pub mod resolver;
pub mod reverse_registrar;
pub mod state;

pub use chain::{CallRecord, Method, SimulatedChain, SimulatedConnector};
pub use error::ContractError;
pub use state::Deployment;
