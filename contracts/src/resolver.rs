//! # Public Resolver
//!
//! Address, name, and text records. Every resolver on a network shares the
//! network's registry for authorization: only the node's effective owner
//! may write its records.

use alloy_primitives::Address;
use async_trait::async_trait;
use tracing::debug;

use ensbind_protocol::name::Node;
use ensbind_protocol::services::{Resolver, ServiceResult};

use crate::chain::{ContractRef, Method};
use crate::error::ContractError;
use crate::state::{Deployment, ResolverRecords};

/// One resolver contract.
#[derive(Debug, Clone)]
pub struct InMemoryResolver {
    contract: ContractRef,
}

impl InMemoryResolver {
    pub(crate) fn new(contract: ContractRef) -> Self {
        Self { contract }
    }

    fn at(&self) -> Address {
        self.contract.address
    }

    fn read<T: Default>(
        &self,
        method: Method,
        f: impl FnOnce(&ResolverRecords) -> Option<T>,
    ) -> ServiceResult<T> {
        let at = self.at();
        self.contract.call(method, |dep, _| {
            Ok(dep.resolvers.get(&at).and_then(f).unwrap_or_default())
        })
    }

    fn write(
        &self,
        method: Method,
        node: Node,
        f: impl FnOnce(&mut ResolverRecords),
    ) -> ServiceResult<()> {
        let at = self.at();
        self.contract.call(method, |dep, caller| {
            authorise(dep, &node, caller)?;
            f(dep.resolver_mut(at));
            Ok(())
        })
    }
}

fn authorise(dep: &Deployment, node: &Node, caller: Address) -> Result<(), ContractError> {
    if dep.can_manage(node, caller) {
        Ok(())
    } else {
        Err(ContractError::Unauthorised {
            caller,
            subject: node.to_string(),
        })
    }
}

#[async_trait]
impl Resolver for InMemoryResolver {
    async fn addr(&self, node: Node, coin_type: u64) -> ServiceResult<Vec<u8>> {
        self.read(Method::ResolverAddr, |r| r.addrs.get(&(node, coin_type)).cloned())
    }

    async fn set_addr(&self, node: Node, coin_type: u64, addr: Vec<u8>) -> ServiceResult<()> {
        debug!(%node, coin_type, "resolver: setAddr");
        self.write(Method::ResolverSetAddr, node, |r| {
            r.addrs.insert((node, coin_type), addr);
        })
    }

    async fn name(&self, node: Node) -> ServiceResult<String> {
        self.read(Method::ResolverName, |r| r.names.get(&node).cloned())
    }

    async fn set_name(&self, node: Node, name: String) -> ServiceResult<()> {
        self.write(Method::ResolverSetName, node, |r| {
            r.names.insert(node, name);
        })
    }

    async fn text(&self, node: Node, key: &str) -> ServiceResult<String> {
        self.read(Method::ResolverText, |r| {
            r.texts.get(&(node, key.to_string())).cloned()
        })
    }

    async fn set_text(&self, node: Node, key: &str, value: String) -> ServiceResult<()> {
        let key = key.to_string();
        self.write(Method::ResolverSetText, node, |r| {
            r.texts.insert((node, key), value);
        })
    }
}
