//! # External Service Interfaces
//!
//! The registry, resolvers, name wrapper, and reverse registrars are
//! contracts somebody else deployed. We reach them only through these
//! traits, and only at addresses the [`ChainDirectory`] hands out.
//!
//! Every call is one round-trip, awaited before the next is issued. There is
//! no pipelining and no timeout in here; the transport behind a
//! [`Connector`] owns both.
//!
//! The method names follow the contracts' ABI (`setSubnodeRecord`,
//! `setNameForAddr`, ...) so anyone holding a block explorer can follow
//! along.
//!
//! [`ChainDirectory`]: crate::directory::ChainDirectory

use std::sync::Arc;

use alloy_primitives::{Address, B256, U256};
use async_trait::async_trait;
use thiserror::Error;

use crate::directory::NetworkId;
use crate::name::Node;

/// A failed remote call.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ServiceError {
    /// The contract rejected the call.
    #[error("call reverted: {0}")]
    Reverted(String),

    /// The call never got an answer (RPC down, nonce clash, dropped tx).
    #[error("transport error: {0}")]
    Transport(String),
}

/// Shorthand for remote call results.
pub type ServiceResult<T> = Result<T, ServiceError>;

/// The ENS registry: owners and resolvers of nodes.
#[async_trait]
pub trait Registry: Send + Sync {
    /// Owner of `node`; the zero address if it doesn't exist.
    async fn owner(&self, node: Node) -> ServiceResult<Address>;

    /// Resolver of `node`; the zero address if none is set.
    async fn resolver(&self, node: Node) -> ServiceResult<Address>;

    /// Create or overwrite `label` under `node` with the given owner and resolver.
    async fn set_subnode_record(
        &self,
        node: Node,
        label_hash: B256,
        owner: Address,
        resolver: Address,
        ttl: u64,
    ) -> ServiceResult<()>;

    /// Transfer `node` to `owner`.
    async fn set_owner(&self, node: Node, owner: Address) -> ServiceResult<()>;
}

/// A resolver holding records for nodes.
#[async_trait]
pub trait Resolver: Send + Sync {
    /// Address bytes for `(node, coin_type)`; empty if unset.
    async fn addr(&self, node: Node, coin_type: u64) -> ServiceResult<Vec<u8>>;

    async fn set_addr(&self, node: Node, coin_type: u64, addr: Vec<u8>) -> ServiceResult<()>;

    /// The `name` record (used on reverse nodes); empty if unset.
    async fn name(&self, node: Node) -> ServiceResult<String>;

    async fn set_name(&self, node: Node, name: String) -> ServiceResult<()>;

    /// A text record; empty if unset.
    async fn text(&self, node: Node, key: &str) -> ServiceResult<String>;

    async fn set_text(&self, node: Node, key: &str, value: String) -> ServiceResult<()>;
}

/// The ENS name wrapper (ERC-1155 over registry nodes).
#[async_trait]
pub trait NameWrapper: Send + Sync {
    /// Owner of the wrapped token `uint256(node)`.
    async fn owner_of(&self, token_id: U256) -> ServiceResult<Address>;

    async fn is_wrapped(&self, node: Node) -> ServiceResult<bool>;

    /// Create a wrapped subname. Takes the plain label, not its hash.
    #[allow(clippy::too_many_arguments)]
    async fn set_subnode_record(
        &self,
        parent: Node,
        label: &str,
        owner: Address,
        resolver: Address,
        ttl: u64,
        fuses: u32,
        expiry: u64,
    ) -> ServiceResult<()>;
}

/// L1-style reverse registrar (also what Base's basename registrar speaks).
#[async_trait]
pub trait ReverseRegistrar: Send + Sync {
    /// Reverse node for `addr`.
    async fn node(&self, addr: Address) -> ServiceResult<Node>;

    /// Claim the reverse node of `addr` for `owner`, point it at `resolver`,
    /// and set its name record.
    async fn set_name_for_addr(
        &self,
        addr: Address,
        owner: Address,
        resolver: Address,
        name: String,
    ) -> ServiceResult<Node>;
}

/// ENSIP-19 reverse registrar deployed on L2s.
#[async_trait]
pub trait L2ReverseRegistrar: Send + Sync {
    /// Current primary name of `addr`; empty if unset.
    async fn name_for_addr(&self, addr: Address) -> ServiceResult<String>;

    async fn set_name_for_addr(&self, addr: Address, name: String) -> ServiceResult<()>;
}

/// Binds the capability traits to contract addresses, on behalf of one
/// authenticated caller.
///
/// Implementations are typically a set of per-chain RPC clients sharing a
/// signer. The in-memory deployments in `ensbind-contracts` implement it
/// for tests and simulation.
pub trait Connector: Send + Sync {
    /// The identity every mutating call is sent from.
    fn caller(&self) -> Address;

    fn registry(&self, network: NetworkId, at: Address) -> Arc<dyn Registry>;

    fn resolver(&self, network: NetworkId, at: Address) -> Arc<dyn Resolver>;

    fn name_wrapper(&self, network: NetworkId, at: Address) -> Arc<dyn NameWrapper>;

    fn reverse_registrar(&self, network: NetworkId, at: Address) -> Arc<dyn ReverseRegistrar>;

    fn l2_reverse_registrar(&self, network: NetworkId, at: Address)
        -> Arc<dyn L2ReverseRegistrar>;
}
