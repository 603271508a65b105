//! # Chain Directory
//!
//! Which contracts to talk to on which network, and which family of
//! registry those contracts belong to.
//!
//! ```text
//! family.rs: NetworkId and ChainFamily membership (the strategy selector's input)
//! table.rs: ServiceSet per network, built-in table, JSON overrides
//! ```
//!
//! The two are separate: a network can belong to a family
//! without the built-in table knowing any of its addresses. Binding on such
//! a network fails fast with `UnsupportedNetwork` until an override file
//! supplies a registry.

pub mod family;
pub mod table;

pub use family::{ChainFamily, NetworkId};
pub use table::{ChainDirectory, DirectoryError, ServiceSet};
