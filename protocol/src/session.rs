//! # Network Session
//!
//! The services of one network, bound to one caller's connector. Opened
//! once per operation. Opening makes no remote call: it only consults the
//! chain directory, so an unsupported network fails here for free.

use std::sync::Arc;

use alloy_primitives::Address;

use crate::directory::table::default_coin_type;
use crate::directory::{ChainDirectory, ChainFamily, NetworkId, ServiceSet};
use crate::error::BindError;
use crate::name::Node;
use crate::policy::{self, RemoteOp};
use crate::services::{
    Connector, L2ReverseRegistrar, NameWrapper, Registry, Resolver, ReverseRegistrar,
};

/// Resolved services for a single network.
pub struct NetworkSession {
    network: NetworkId,
    family: ChainFamily,
    services: ServiceSet,
    coin_type: u64,
    connector: Arc<dyn Connector>,
    registry: Arc<dyn Registry>,
}

impl NetworkSession {
    /// Look the network up in the directory and bind its registry.
    ///
    /// # Errors
    ///
    /// [`BindError::UnsupportedNetwork`] if the directory has no registry
    /// for `network`.
    pub fn open(
        directory: &ChainDirectory,
        connector: Arc<dyn Connector>,
        network: NetworkId,
    ) -> Result<Self, BindError> {
        let services = directory.services_for(network);
        let registry_addr = services
            .registry
            .ok_or(BindError::UnsupportedNetwork(network))?;
        let registry = connector.registry(network, registry_addr);

        Ok(Self {
            network,
            family: ChainFamily::for_network(network),
            coin_type: services
                .coin_type
                .unwrap_or_else(|| default_coin_type(network)),
            services,
            connector,
            registry,
        })
    }

    pub fn network(&self) -> NetworkId {
        self.network
    }

    pub fn family(&self) -> ChainFamily {
        self.family
    }

    pub fn services(&self) -> &ServiceSet {
        &self.services
    }

    /// Coin type for forward records on this network.
    pub fn coin_type(&self) -> u64 {
        self.coin_type
    }

    /// The identity mutating calls are sent from.
    pub fn caller(&self) -> Address {
        self.connector.caller()
    }

    pub fn registry(&self) -> &dyn Registry {
        self.registry.as_ref()
    }

    /// The name wrapper, if this network has one.
    pub fn name_wrapper(&self) -> Option<Arc<dyn NameWrapper>> {
        self.services
            .name_wrapper
            .map(|at| self.connector.name_wrapper(self.network, at))
    }

    pub fn resolver_at(&self, at: Address) -> Arc<dyn Resolver> {
        self.connector.resolver(self.network, at)
    }

    /// The network's default public resolver, if any.
    pub fn public_resolver(&self) -> Option<Arc<dyn Resolver>> {
        self.services.public_resolver.map(|at| self.resolver_at(at))
    }

    pub fn reverse_registrar(&self) -> Option<Arc<dyn ReverseRegistrar>> {
        self.services
            .reverse_registrar
            .map(|at| self.connector.reverse_registrar(self.network, at))
    }

    pub fn l2_reverse_registrar(&self) -> Option<Arc<dyn L2ReverseRegistrar>> {
        self.services
            .reverse_registrar
            .map(|at| self.connector.l2_reverse_registrar(self.network, at))
    }

    /// The resolver to use for `node`: its own if the registry has one,
    /// otherwise the network's public resolver (ENSIP-10 style discovery).
    /// `None` only when neither exists.
    pub async fn resolver_for(&self, node: Node) -> Option<Address> {
        let own = policy::recover(
            RemoteOp::ResolverLookup,
            self.registry.resolver(node).await,
            Address::ZERO,
        )
        .unwrap_or(Address::ZERO);

        if own.is_zero() {
            self.services.public_resolver
        } else {
            Some(own)
        }
    }
}
