//! # Simulated Chain
//!
//! A process-local stand-in for every network in a [`ChainDirectory`]. It
//! holds one [`Deployment`] per network, logs every contract call, and can
//! be told to make specific calls fail. Hand a [`SimulatedConnector`] to a
//! `NameBinder` and it cannot tell the difference from the real thing,
//! minus the gas bill.
//!
//! All state sits behind one `parking_lot::Mutex`. A call takes the lock,
//! runs to completion, and releases it, so each call is atomic, exactly like
//! a single transaction against the real registry.

use std::collections::HashMap;
use std::sync::Arc;

use alloy_primitives::Address;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use ensbind_protocol::directory::{ChainDirectory, NetworkId, ServiceSet};
use ensbind_protocol::name::{namehash, reverse_node_for, Node};
use ensbind_protocol::services::{
    Connector, L2ReverseRegistrar, NameWrapper, Registry, Resolver, ReverseRegistrar,
    ServiceError, ServiceResult,
};

use crate::error::ContractError;
use crate::name_wrapper::InMemoryNameWrapper;
use crate::registry::InMemoryRegistry;
use crate::resolver::InMemoryResolver;
use crate::reverse_registrar::{InMemoryL2ReverseRegistrar, InMemoryReverseRegistrar};
use crate::state::{Deployment, RegistryRecord, WrappedName};

/// Every contract method the simulation implements.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Method {
    RegistryOwner,
    RegistryResolver,
    RegistrySetSubnodeRecord,
    RegistrySetOwner,
    ResolverAddr,
    ResolverSetAddr,
    ResolverName,
    ResolverSetName,
    ResolverText,
    ResolverSetText,
    WrapperOwnerOf,
    WrapperIsWrapped,
    WrapperSetSubnodeRecord,
    ReverseNode,
    ReverseSetNameForAddr,
    L2NameForAddr,
    L2SetNameForAddr,
}

/// Which contract a method belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ContractKind {
    Registry,
    Resolver,
    NameWrapper,
    ReverseRegistrar,
}

impl Method {
    /// Whether the method changes state.
    pub fn is_mutating(self) -> bool {
        matches!(
            self,
            Method::RegistrySetSubnodeRecord
                | Method::RegistrySetOwner
                | Method::ResolverSetAddr
                | Method::ResolverSetName
                | Method::ResolverSetText
                | Method::WrapperSetSubnodeRecord
                | Method::ReverseSetNameForAddr
                | Method::L2SetNameForAddr
        )
    }

    fn contract(self) -> ContractKind {
        match self {
            Method::RegistryOwner
            | Method::RegistryResolver
            | Method::RegistrySetSubnodeRecord
            | Method::RegistrySetOwner => ContractKind::Registry,
            Method::ResolverAddr
            | Method::ResolverSetAddr
            | Method::ResolverName
            | Method::ResolverSetName
            | Method::ResolverText
            | Method::ResolverSetText => ContractKind::Resolver,
            Method::WrapperOwnerOf | Method::WrapperIsWrapped | Method::WrapperSetSubnodeRecord => {
                ContractKind::NameWrapper
            }
            Method::ReverseNode
            | Method::ReverseSetNameForAddr
            | Method::L2NameForAddr
            | Method::L2SetNameForAddr => ContractKind::ReverseRegistrar,
        }
    }
}

/// One logged contract call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallRecord {
    pub network: NetworkId,
    pub caller: Address,
    pub contract: Address,
    pub method: Method,
    pub ok: bool,
}

#[derive(Debug, Clone)]
struct Fault {
    /// `None` fails forever.
    remaining: Option<u32>,
    error: ServiceError,
}

#[derive(Debug, Default)]
struct World {
    networks: HashMap<NetworkId, Deployment>,
    faults: HashMap<(NetworkId, Method), Fault>,
    log: Vec<CallRecord>,
}

impl World {
    fn take_fault(&mut self, network: NetworkId, method: Method) -> Option<ServiceError> {
        let key = (network, method);
        let fault = self.faults.get_mut(&key)?;
        let error = fault.error.clone();
        match fault.remaining {
            Some(n) if n <= 1 => {
                self.faults.remove(&key);
            }
            Some(n) => fault.remaining = Some(n - 1),
            None => {}
        }
        Some(error)
    }
}

/// Shared handle to the simulated networks. Clones share state.
#[derive(Debug, Clone, Default)]
pub struct SimulatedChain {
    inner: Arc<Mutex<World>>,
}

impl SimulatedChain {
    /// An empty simulation with no networks.
    pub fn new() -> Self {
        Self::default()
    }

    /// Deploy fresh contracts for every supported network in `directory`.
    pub fn from_directory(directory: &ChainDirectory) -> Self {
        let chain = Self::new();
        for (network, services) in directory.iter() {
            if services.is_supported() {
                chain.deploy(*network, *services);
            }
        }
        chain
    }

    /// Deploy (or redeploy, wiping state) the contracts of one network.
    pub fn deploy(&self, network: NetworkId, services: ServiceSet) {
        debug!(%network, "deploying simulated contracts");
        self.inner
            .lock()
            .networks
            .insert(network, Deployment::new(services));
    }

    /// Deploy an extra resolver at `at`, alongside the public one.
    pub fn deploy_resolver(&self, network: NetworkId, at: Address) {
        self.with_deployment(network, |dep| {
            dep.resolvers.entry(at).or_default();
        });
    }

    /// A connector that sends every call as `caller`.
    pub fn connect(&self, caller: Address) -> Arc<SimulatedConnector> {
        Arc::new(SimulatedConnector {
            chain: self.clone(),
            caller,
        })
    }

    // -----------------------------------------------------------------------
    // Genesis / out-of-band setup. These bypass authorization and the log.
    // -----------------------------------------------------------------------

    /// Register `name` to `owner` with the public resolver, the way a
    /// registrar would. Intermediate nodes are not created.
    pub fn register(&self, network: NetworkId, name: &str, owner: Address) -> Node {
        let node = namehash(name);
        self.with_deployment(network, |dep| {
            let resolver = dep.services.public_resolver.unwrap_or_default();
            dep.records.insert(
                node,
                RegistryRecord {
                    owner,
                    resolver,
                    ttl: 0,
                },
            );
        });
        node
    }

    /// Hand `name` to the name wrapper; its current owner becomes the
    /// token owner. No-op on networks without a wrapper.
    pub fn wrap(&self, network: NetworkId, name: &str) {
        let node = namehash(name);
        self.with_deployment(network, |dep| {
            let Some(wrapper) = dep.services.name_wrapper else {
                return;
            };
            let record = dep.records.entry(node).or_default();
            let owner = record.owner;
            record.owner = wrapper;
            dep.wrapped.insert(
                node,
                WrappedName {
                    owner,
                    fuses: 0,
                    expiry: 0,
                },
            );
        });
    }

    /// Point `name` at a specific resolver, or clear it with the zero address.
    pub fn set_resolver(&self, network: NetworkId, name: &str, resolver: Address) {
        let node = namehash(name);
        self.with_deployment(network, |dep| {
            dep.records.entry(node).or_default().resolver = resolver;
        });
    }

    /// Record `owner` as the `Ownable` owner of `contract`.
    pub fn set_contract_owner(&self, network: NetworkId, contract: Address, owner: Address) {
        self.with_deployment(network, |dep| {
            dep.contract_owners.insert(contract, owner);
        });
    }

    // -----------------------------------------------------------------------
    // Fault injection
    // -----------------------------------------------------------------------

    /// Make the next `times` calls of `method` on `network` fail with `error`.
    pub fn fail_times(&self, network: NetworkId, method: Method, times: u32, error: ServiceError) {
        self.inner.lock().faults.insert(
            (network, method),
            Fault {
                remaining: Some(times),
                error,
            },
        );
    }

    /// Make the next call of `method` fail with a revert.
    pub fn fail_once(&self, network: NetworkId, method: Method) {
        self.fail_times(
            network,
            method,
            1,
            ServiceError::Reverted(format!("injected failure: {method:?}")),
        );
    }

    /// Make every call of `method` fail until [`clear_faults`](Self::clear_faults).
    pub fn fail_always(&self, network: NetworkId, method: Method, error: ServiceError) {
        self.inner.lock().faults.insert(
            (network, method),
            Fault {
                remaining: None,
                error,
            },
        );
    }

    pub fn clear_faults(&self) {
        self.inner.lock().faults.clear();
    }

    // -----------------------------------------------------------------------
    // Inspection
    // -----------------------------------------------------------------------

    /// Every call made so far, in order.
    pub fn calls(&self) -> Vec<CallRecord> {
        self.inner.lock().log.clone()
    }

    /// Number of mutating calls attempted so far, failed ones included.
    pub fn mutating_calls(&self) -> usize {
        self.inner
            .lock()
            .log
            .iter()
            .filter(|c| c.method.is_mutating())
            .count()
    }

    /// Number of calls of one method made so far.
    pub fn count(&self, method: Method) -> usize {
        self.inner
            .lock()
            .log
            .iter()
            .filter(|c| c.method == method)
            .count()
    }

    /// Total number of calls of any kind.
    pub fn total_calls(&self) -> usize {
        self.inner.lock().log.len()
    }

    /// Effective owner of `name` (wrapper-aware).
    pub fn owner(&self, network: NetworkId, name: &str) -> Address {
        let node = namehash(name);
        self.read(network, |dep| dep.effective_owner(&node))
            .unwrap_or_default()
    }

    /// Whether `name` is held by the name wrapper.
    pub fn is_wrapped(&self, network: NetworkId, name: &str) -> bool {
        let node = namehash(name);
        self.read(network, |dep| dep.wrapped.contains_key(&node))
            .unwrap_or(false)
    }

    /// Resolver address recorded in the registry for `name`.
    pub fn resolver_of(&self, network: NetworkId, name: &str) -> Address {
        let node = namehash(name);
        self.read(network, |dep| {
            dep.records.get(&node).map(|r| r.resolver).unwrap_or_default()
        })
        .unwrap_or_default()
    }

    /// Address record of `name` for `coin_type`, read from its resolver.
    pub fn addr(&self, network: NetworkId, name: &str, coin_type: u64) -> Option<Vec<u8>> {
        let node = namehash(name);
        self.read(network, |dep| {
            let resolver = dep.records.get(&node)?.resolver;
            dep.resolvers
                .get(&resolver)?
                .addrs
                .get(&(node, coin_type))
                .cloned()
        })
        .flatten()
    }

    /// L1-style reverse name of `addr`.
    pub fn reverse_name(&self, network: NetworkId, addr: Address) -> Option<String> {
        let node = reverse_node_for(&addr);
        self.read(network, |dep| {
            let resolver = dep.records.get(&node)?.resolver;
            dep.resolvers.get(&resolver)?.names.get(&node).cloned()
        })
        .flatten()
    }

    /// Registry owner of `addr`'s reverse node.
    pub fn reverse_owner(&self, network: NetworkId, addr: Address) -> Address {
        let node = reverse_node_for(&addr);
        self.read(network, |dep| dep.registry_owner(&node))
            .unwrap_or_default()
    }

    /// ENSIP-19 primary name of `addr`.
    pub fn l2_name(&self, network: NetworkId, addr: Address) -> Option<String> {
        self.read(network, |dep| dep.l2_names.get(&addr).cloned())
            .flatten()
    }

    /// Text record `key` on `addr`'s reverse node, read from the public resolver.
    pub fn reverse_text(&self, network: NetworkId, addr: Address, key: &str) -> Option<String> {
        let node = reverse_node_for(&addr);
        self.read(network, |dep| {
            let public = dep.services.public_resolver?;
            dep.resolvers
                .get(&public)?
                .texts
                .get(&(node, key.to_string()))
                .cloned()
        })
        .flatten()
    }

    fn read<T>(&self, network: NetworkId, f: impl FnOnce(&Deployment) -> T) -> Option<T> {
        self.inner.lock().networks.get(&network).map(f)
    }

    fn with_deployment(&self, network: NetworkId, f: impl FnOnce(&mut Deployment)) {
        let mut world = self.inner.lock();
        let dep = world
            .networks
            .entry(network)
            .or_insert_with(|| Deployment::new(ServiceSet::unsupported()));
        f(dep);
    }

    /// Execute one contract call: fault check, address check, state
    /// transition, log entry. Holds the lock for the whole call.
    pub(crate) fn call<T>(
        &self,
        target: &ContractRef,
        method: Method,
        f: impl FnOnce(&mut Deployment, Address) -> Result<T, ContractError>,
    ) -> ServiceResult<T> {
        let mut world = self.inner.lock();

        let result = match world.take_fault(target.network, method) {
            Some(err) => Err(err),
            None => match world.networks.get_mut(&target.network) {
                Some(dep) if hosts(dep, method.contract(), target.address) => {
                    f(dep, target.caller).map_err(ServiceError::from)
                }
                _ => Err(ServiceError::from(ContractError::NoContract {
                    network: target.network,
                    address: target.address,
                })),
            },
        };

        trace!(network = %target.network, ?method, ok = result.is_ok(), "contract call");
        world.log.push(CallRecord {
            network: target.network,
            caller: target.caller,
            contract: target.address,
            method,
            ok: result.is_ok(),
        });
        result
    }
}

fn hosts(dep: &Deployment, kind: ContractKind, at: Address) -> bool {
    match kind {
        ContractKind::Registry => dep.services.registry == Some(at),
        ContractKind::Resolver => dep.resolvers.contains_key(&at),
        ContractKind::NameWrapper => dep.services.name_wrapper == Some(at),
        ContractKind::ReverseRegistrar => dep.services.reverse_registrar == Some(at),
    }
}

/// A contract address on a network, called as a specific caller.
#[derive(Debug, Clone)]
pub struct ContractRef {
    pub(crate) chain: SimulatedChain,
    pub(crate) network: NetworkId,
    pub(crate) address: Address,
    pub(crate) caller: Address,
}

impl ContractRef {
    pub(crate) fn call<T>(
        &self,
        method: Method,
        f: impl FnOnce(&mut Deployment, Address) -> Result<T, ContractError>,
    ) -> ServiceResult<T> {
        self.chain.call(self, method, f)
    }
}

/// [`Connector`] over a [`SimulatedChain`], acting as one caller.
#[derive(Debug, Clone)]
pub struct SimulatedConnector {
    chain: SimulatedChain,
    caller: Address,
}

impl SimulatedConnector {
    fn contract(&self, network: NetworkId, at: Address) -> ContractRef {
        ContractRef {
            chain: self.chain.clone(),
            network,
            address: at,
            caller: self.caller,
        }
    }

    pub fn chain(&self) -> &SimulatedChain {
        &self.chain
    }
}

impl Connector for SimulatedConnector {
    fn caller(&self) -> Address {
        self.caller
    }

    fn registry(&self, network: NetworkId, at: Address) -> Arc<dyn Registry> {
        Arc::new(InMemoryRegistry::new(self.contract(network, at)))
    }

    fn resolver(&self, network: NetworkId, at: Address) -> Arc<dyn Resolver> {
        Arc::new(InMemoryResolver::new(self.contract(network, at)))
    }

    fn name_wrapper(&self, network: NetworkId, at: Address) -> Arc<dyn NameWrapper> {
        Arc::new(InMemoryNameWrapper::new(self.contract(network, at)))
    }

    fn reverse_registrar(&self, network: NetworkId, at: Address) -> Arc<dyn ReverseRegistrar> {
        Arc::new(InMemoryReverseRegistrar::new(self.contract(network, at)))
    }

    fn l2_reverse_registrar(
        &self,
        network: NetworkId,
        at: Address,
    ) -> Arc<dyn L2ReverseRegistrar> {
        Arc::new(InMemoryL2ReverseRegistrar::new(self.contract(network, at)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chain_with_mainnet() -> (SimulatedChain, ServiceSet) {
        let services = ChainDirectory::builtin().services_for(NetworkId::MAINNET);
        let chain = SimulatedChain::new();
        chain.deploy(NetworkId::MAINNET, services);
        (chain, services)
    }

    #[tokio::test]
    async fn calls_to_unknown_addresses_are_transport_errors() {
        let (chain, _) = chain_with_mainnet();
        let conn = chain.connect(Address::repeat_byte(1));
        let registry = conn.registry(NetworkId::MAINNET, Address::repeat_byte(0x99));
        let err = registry.owner(Node::ZERO).await.unwrap_err();
        assert!(matches!(err, ServiceError::Transport(_)));
        assert_eq!(chain.total_calls(), 1);
    }

    #[tokio::test]
    async fn fail_once_fires_exactly_once() {
        let (chain, services) = chain_with_mainnet();
        let conn = chain.connect(Address::repeat_byte(1));
        let registry = conn.registry(NetworkId::MAINNET, services.registry.unwrap());

        chain.fail_once(NetworkId::MAINNET, Method::RegistryOwner);
        assert!(registry.owner(Node::ZERO).await.is_err());
        assert!(registry.owner(Node::ZERO).await.is_ok());
    }

    #[tokio::test]
    async fn fail_always_until_cleared() {
        let (chain, services) = chain_with_mainnet();
        let conn = chain.connect(Address::repeat_byte(1));
        let registry = conn.registry(NetworkId::MAINNET, services.registry.unwrap());

        chain.fail_always(
            NetworkId::MAINNET,
            Method::RegistryResolver,
            ServiceError::Transport("rpc down".into()),
        );
        for _ in 0..3 {
            assert!(registry.resolver(Node::ZERO).await.is_err());
        }
        chain.clear_faults();
        assert!(registry.resolver(Node::ZERO).await.is_ok());
    }

    #[test]
    fn wrap_moves_registry_ownership_to_wrapper() {
        let (chain, services) = chain_with_mainnet();
        let alice = Address::repeat_byte(0xaa);
        chain.register(NetworkId::MAINNET, "domain.eth", alice);
        chain.wrap(NetworkId::MAINNET, "domain.eth");

        assert!(chain.is_wrapped(NetworkId::MAINNET, "domain.eth"));
        assert_eq!(chain.owner(NetworkId::MAINNET, "domain.eth"), alice);
        let registry_owner = chain
            .read(NetworkId::MAINNET, |dep| dep.registry_owner(&namehash("domain.eth")))
            .unwrap();
        assert_eq!(Some(registry_owner), services.name_wrapper);
    }

    #[test]
    fn only_mutating_methods_count_as_writes() {
        assert!(Method::ResolverSetAddr.is_mutating());
        assert!(Method::L2SetNameForAddr.is_mutating());
        assert!(!Method::ResolverAddr.is_mutating());
        assert!(!Method::WrapperIsWrapped.is_mutating());
    }
}
