//! # Reverse Registrars
//!
//! Two flavours live at the `reverse_registrar` slot of a deployment:
//!
//! - [`InMemoryReverseRegistrar`]: the L1 contract (also what Base's
//!   basename registrar speaks). Claims `<addr>.addr.reverse` in the
//!   registry and writes the `name` record into the chosen resolver.
//! - [`InMemoryL2ReverseRegistrar`]: ENSIP-19. Keeps `addr -> name`
//!   inside the registrar itself.
//!
//! Both accept a claim only from the address itself or from the `Ownable`
//! owner of the contract at that address.

use alloy_primitives::Address;
use async_trait::async_trait;
use tracing::debug;

use ensbind_protocol::name::{reverse_node_for, Node};
use ensbind_protocol::services::{L2ReverseRegistrar, ReverseRegistrar, ServiceResult};

use crate::chain::{ContractRef, Method};
use crate::error::ContractError;
use crate::state::{Deployment, RegistryRecord};

fn authorise(dep: &Deployment, addr: Address, caller: Address) -> Result<(), ContractError> {
    if dep.can_claim_reverse(addr, caller) {
        Ok(())
    } else {
        Err(ContractError::Unauthorised {
            caller,
            subject: addr.to_string(),
        })
    }
}

#[derive(Debug, Clone)]
pub struct InMemoryReverseRegistrar {
    contract: ContractRef,
}

impl InMemoryReverseRegistrar {
    pub(crate) fn new(contract: ContractRef) -> Self {
        Self { contract }
    }
}

#[async_trait]
impl ReverseRegistrar for InMemoryReverseRegistrar {
    async fn node(&self, addr: Address) -> ServiceResult<Node> {
        self.contract
            .call(Method::ReverseNode, |_, _| Ok(reverse_node_for(&addr)))
    }

    async fn set_name_for_addr(
        &self,
        addr: Address,
        owner: Address,
        resolver: Address,
        name: String,
    ) -> ServiceResult<Node> {
        self.contract
            .call(Method::ReverseSetNameForAddr, |dep, caller| {
                authorise(dep, addr, caller)?;
                if resolver.is_zero() {
                    return Err(ContractError::ZeroResolver);
                }
                let node = reverse_node_for(&addr);
                debug!(%addr, %owner, name = %name, "reverse: setNameForAddr");
                dep.records.insert(
                    node,
                    RegistryRecord {
                        owner,
                        resolver,
                        ttl: 0,
                    },
                );
                dep.resolver_mut(resolver).names.insert(node, name);
                Ok(node)
            })
    }
}

#[derive(Debug, Clone)]
pub struct InMemoryL2ReverseRegistrar {
    contract: ContractRef,
}

impl InMemoryL2ReverseRegistrar {
    pub(crate) fn new(contract: ContractRef) -> Self {
        Self { contract }
    }
}

#[async_trait]
impl L2ReverseRegistrar for InMemoryL2ReverseRegistrar {
    async fn name_for_addr(&self, addr: Address) -> ServiceResult<String> {
        self.contract.call(Method::L2NameForAddr, |dep, _| {
            Ok(dep.l2_names.get(&addr).cloned().unwrap_or_default())
        })
    }

    async fn set_name_for_addr(&self, addr: Address, name: String) -> ServiceResult<()> {
        self.contract.call(Method::L2SetNameForAddr, |dep, caller| {
            authorise(dep, addr, caller)?;
            debug!(%addr, name = %name, "l2 reverse: setNameForAddr");
            dep.l2_names.insert(addr, name);
            Ok(())
        })
    }
}
