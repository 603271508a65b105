//! # ENS Registry
//!
//! `owner`, `resolver`, `setSubnodeRecord`, `setOwner`. Writes are gated on
//! the effective owner of the node being written under, so a wrapped
//! parent's token holder can still create plain registry subnames.

use alloy_primitives::{Address, B256};
use async_trait::async_trait;
use tracing::debug;

use ensbind_protocol::name::{child_node, Node};
use ensbind_protocol::services::{Registry, ServiceResult};

use crate::chain::{ContractRef, Method};
use crate::error::ContractError;
use crate::state::RegistryRecord;

/// The registry contract of one simulated network.
#[derive(Debug, Clone)]
pub struct InMemoryRegistry {
    contract: ContractRef,
}

impl InMemoryRegistry {
    pub(crate) fn new(contract: ContractRef) -> Self {
        Self { contract }
    }
}

#[async_trait]
impl Registry for InMemoryRegistry {
    async fn owner(&self, node: Node) -> ServiceResult<Address> {
        self.contract
            .call(Method::RegistryOwner, |dep, _| Ok(dep.registry_owner(&node)))
    }

    async fn resolver(&self, node: Node) -> ServiceResult<Address> {
        self.contract.call(Method::RegistryResolver, |dep, _| {
            Ok(dep.records.get(&node).map(|r| r.resolver).unwrap_or_default())
        })
    }

    async fn set_subnode_record(
        &self,
        node: Node,
        label_hash: B256,
        owner: Address,
        resolver: Address,
        ttl: u64,
    ) -> ServiceResult<()> {
        self.contract
            .call(Method::RegistrySetSubnodeRecord, |dep, caller| {
                if !dep.can_manage(&node, caller) {
                    return Err(ContractError::Unauthorised {
                        caller,
                        subject: node.to_string(),
                    });
                }
                let child = child_node(&node, &label_hash);
                debug!(parent = %node, %child, %owner, "registry: setSubnodeRecord");
                dep.records.insert(
                    child,
                    RegistryRecord {
                        owner,
                        resolver,
                        ttl,
                    },
                );
                Ok(())
            })
    }

    async fn set_owner(&self, node: Node, owner: Address) -> ServiceResult<()> {
        self.contract.call(Method::RegistrySetOwner, |dep, caller| {
            if !dep.can_manage(&node, caller) {
                return Err(ContractError::Unauthorised {
                    caller,
                    subject: node.to_string(),
                });
            }
            dep.records.entry(node).or_default().owner = owner;
            Ok(())
        })
    }
}
