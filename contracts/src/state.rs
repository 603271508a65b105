//! # Deployment State
//!
//! Everything the four contracts of one network remember, in one struct.
//! The contracts on a real chain share state through cross-contract calls
//! (the name wrapper owns registry nodes, the reverse registrar writes into
//! a resolver); here they simply share a `Deployment`.
//!
//! The call-level logic lives next to each contract's trait impl
//! (`registry.rs`, `resolver.rs`, ...). This file only holds the data and
//! the ownership rules they all agree on.

use std::collections::HashMap;

use alloy_primitives::Address;
use serde::{Deserialize, Serialize};

use ensbind_protocol::directory::ServiceSet;
use ensbind_protocol::name::Node;

/// A node's entry in the registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RegistryRecord {
    pub owner: Address,
    pub resolver: Address,
    pub ttl: u64,
}

/// The records one resolver holds.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolverRecords {
    /// `(node, coin_type) -> address bytes`
    pub addrs: HashMap<(Node, u64), Vec<u8>>,
    /// `node -> name` (reverse records)
    pub names: HashMap<Node, String>,
    /// `(node, key) -> value`
    pub texts: HashMap<(Node, String), String>,
}

/// A name held by the name wrapper.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WrappedName {
    pub owner: Address,
    pub fuses: u32,
    pub expiry: u64,
}

/// All state of the contracts deployed on one network.
#[derive(Debug, Clone, Default)]
pub struct Deployment {
    /// Where each contract lives.
    pub services: ServiceSet,
    /// Registry entries.
    pub records: HashMap<Node, RegistryRecord>,
    /// Resolvers deployed on this network, keyed by address. The public
    /// resolver is always present.
    pub resolvers: HashMap<Address, ResolverRecords>,
    /// Name wrapper tokens, keyed by node.
    pub wrapped: HashMap<Node, WrappedName>,
    /// ENSIP-19 primary names.
    pub l2_names: HashMap<Address, String>,
    /// `Ownable` contracts: contract address -> owner. Lets an owner claim
    /// the reverse record of a contract it deployed.
    pub contract_owners: HashMap<Address, Address>,
}

impl Deployment {
    /// A fresh deployment at the given addresses.
    pub fn new(services: ServiceSet) -> Self {
        let mut resolvers = HashMap::new();
        if let Some(public) = services.public_resolver {
            resolvers.insert(public, ResolverRecords::default());
        }
        Self {
            services,
            resolvers,
            ..Default::default()
        }
    }

    /// Owner as the registry sees it.
    pub fn registry_owner(&self, node: &Node) -> Address {
        self.records.get(node).map(|r| r.owner).unwrap_or_default()
    }

    /// Owner with wrapping taken into account: for a node the wrapper holds,
    /// the wrapper's token owner.
    pub fn effective_owner(&self, node: &Node) -> Address {
        let owner = self.registry_owner(node);
        match (self.services.name_wrapper, self.wrapped.get(node)) {
            (Some(wrapper), Some(token)) if owner == wrapper => token.owner,
            _ => owner,
        }
    }

    /// Whether `caller` may manage `node`'s records.
    pub fn can_manage(&self, node: &Node, caller: Address) -> bool {
        !caller.is_zero() && self.effective_owner(node) == caller
    }

    /// Whether `caller` may set the reverse record of `addr`: it is `addr`
    /// itself, or the `Ownable` owner of the contract at `addr`.
    pub fn can_claim_reverse(&self, addr: Address, caller: Address) -> bool {
        caller == addr || self.contract_owners.get(&addr) == Some(&caller)
    }

    /// The resolver at `at`, created on first write.
    pub fn resolver_mut(&mut self, at: Address) -> &mut ResolverRecords {
        self.resolvers.entry(at).or_default()
    }
}
