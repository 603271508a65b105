//! # Name Wrapper
//!
//! ERC-1155 wrapper over registry nodes. A wrapped node is owned by the
//! wrapper in the registry; the real owner holds token `uint256(node)`.

use alloy_primitives::{Address, U256};
use async_trait::async_trait;
use tracing::debug;

use ensbind_protocol::name::{child_node, labelhash, Node};
use ensbind_protocol::services::{NameWrapper, ServiceResult};

use crate::chain::{ContractRef, Method};
use crate::error::ContractError;
use crate::state::{RegistryRecord, WrappedName};

#[derive(Debug, Clone)]
pub struct InMemoryNameWrapper {
    contract: ContractRef,
}

impl InMemoryNameWrapper {
    pub(crate) fn new(contract: ContractRef) -> Self {
        Self { contract }
    }
}

#[async_trait]
impl NameWrapper for InMemoryNameWrapper {
    async fn owner_of(&self, token_id: U256) -> ServiceResult<Address> {
        let node = Node::from(token_id.to_be_bytes::<32>());
        self.contract.call(Method::WrapperOwnerOf, |dep, _| {
            Ok(dep.wrapped.get(&node).map(|t| t.owner).unwrap_or_default())
        })
    }

    async fn is_wrapped(&self, node: Node) -> ServiceResult<bool> {
        let wrapper = self.contract.address;
        self.contract.call(Method::WrapperIsWrapped, |dep, _| {
            Ok(dep.wrapped.contains_key(&node) && dep.registry_owner(&node) == wrapper)
        })
    }

    async fn set_subnode_record(
        &self,
        parent: Node,
        label: &str,
        owner: Address,
        resolver: Address,
        ttl: u64,
        fuses: u32,
        expiry: u64,
    ) -> ServiceResult<()> {
        let wrapper = self.contract.address;
        let child = child_node(&parent, &labelhash(label));
        self.contract
            .call(Method::WrapperSetSubnodeRecord, |dep, caller| {
                if !dep.wrapped.contains_key(&parent) {
                    return Err(ContractError::ParentNotWrapped(parent.to_string()));
                }
                if !dep.can_manage(&parent, caller) {
                    return Err(ContractError::Unauthorised {
                        caller,
                        subject: parent.to_string(),
                    });
                }
                debug!(%parent, label, %owner, "wrapper: setSubnodeRecord");
                dep.records.insert(
                    child,
                    RegistryRecord {
                        owner: wrapper,
                        resolver,
                        ttl,
                    },
                );
                dep.wrapped.insert(
                    child,
                    WrappedName {
                        owner,
                        fuses,
                        expiry,
                    },
                );
                Ok(())
            })
    }
}
