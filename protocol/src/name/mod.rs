//! # Name Grammar & Namehash
//!
//! Turns `app.domain.eth` into the coordinates the registry actually
//! understands: a label, a parent, and 32-byte node hashes.
//!
//! ```text
//! grammar.rs: split_name and ParsedName (label/parent/node, computed once)
//! namehash.rs: Keccak-256 namehash, labelhash, reverse-node helpers
//! ```

pub mod grammar;
pub mod namehash;

pub use grammar::{split_name, NameError, ParsedName};
pub use namehash::{
    child_node, labelhash, namehash, reverse_name_for, reverse_node_for, token_id, Node,
};
