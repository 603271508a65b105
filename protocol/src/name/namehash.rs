//! # Namehash
//!
//! The ENS namehash (EIP-137): a right-to-left fold over the labels of a
//! dotted name, where each step is
//!
//! ```text
//! node = keccak256(node || keccak256(label))
//! ```
//!
//! starting from the zero node. The hash function is not negotiable. The
//! registry is shared with every other ENS client in existence, and a
//! namehash computed with anything other than Keccak-256 addresses a node
//! that nobody else will ever find.

use alloy_primitives::{keccak256, Address, B256, U256};

use crate::config::ADDR_REVERSE_SUFFIX;

/// A position in the name tree. `Node::ZERO` is the root.
pub type Node = B256;

/// Hash a single label: `keccak256(label)`.
pub fn labelhash(label: &str) -> B256 {
    keccak256(label.as_bytes())
}

/// Derive a child node from its parent node and the child's label hash.
///
/// This is the only place the `parent || label` concatenation is spelled
/// out. Everything else, the fold in [`namehash`] included, goes through here.
pub fn child_node(parent: &Node, label_hash: &B256) -> Node {
    let mut preimage = [0u8; 64];
    preimage[..32].copy_from_slice(parent.as_slice());
    preimage[32..].copy_from_slice(label_hash.as_slice());
    keccak256(preimage)
}

/// Compute the namehash of a dotted name. `namehash("")` is the zero node.
///
/// # Example
///
/// ```
/// use ensbind_protocol::name::{namehash, Node};
///
/// let eth: Node = "0x93cdeb708b7545dc668eb9280176169d1c33cfd8ed6f04690a0bcc88a93fc4ae"
///     .parse()
///     .unwrap();
/// assert_eq!(namehash("eth"), eth);
/// ```
pub fn namehash(name: &str) -> Node {
    if name.is_empty() {
        return Node::ZERO;
    }
    name.rsplit('.')
        .fold(Node::ZERO, |node, label| child_node(&node, &labelhash(label)))
}

/// The name wrapper keys its ERC-1155 tokens by `uint256(node)`.
pub fn token_id(node: &Node) -> U256 {
    U256::from_be_bytes(node.0)
}

/// `<lowercase hex address, no 0x>.addr.reverse`
pub fn reverse_name_for(addr: &Address) -> String {
    format!("{}.{}", hex::encode(addr.as_slice()), ADDR_REVERSE_SUFFIX)
}

/// The L1 reverse node for an address, as the reverse registrar computes it.
pub fn reverse_node_for(addr: &Address) -> Node {
    namehash(&reverse_name_for(addr))
}
