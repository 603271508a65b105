//! Network identifiers and chain-family membership.

use serde::{Deserialize, Serialize};

use crate::config::*;

/// A target network, identified by its EVM chain id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NetworkId(pub u64);

impl NetworkId {
    pub const MAINNET: NetworkId = NetworkId(CHAIN_ID_MAINNET);
    pub const SEPOLIA: NetworkId = NetworkId(CHAIN_ID_SEPOLIA);
    pub const LINEA: NetworkId = NetworkId(CHAIN_ID_LINEA);
    pub const BASE: NetworkId = NetworkId(CHAIN_ID_BASE);
    pub const BASE_SEPOLIA: NetworkId = NetworkId(CHAIN_ID_BASE_SEPOLIA);

    /// The raw chain id.
    pub fn chain_id(self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for NetworkId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for NetworkId {
    fn from(chain_id: u64) -> Self {
        NetworkId(chain_id)
    }
}

const L1_NETWORKS: &[u64] = &[CHAIN_ID_MAINNET, CHAIN_ID_SEPOLIA, CHAIN_ID_HOLESKY];

const L2_NETWORKS: &[u64] = &[
    CHAIN_ID_OPTIMISM,
    CHAIN_ID_OPTIMISM_SEPOLIA,
    CHAIN_ID_ARBITRUM,
    CHAIN_ID_ARBITRUM_SEPOLIA,
    CHAIN_ID_LINEA,
    CHAIN_ID_LINEA_SEPOLIA,
    CHAIN_ID_SCROLL,
    CHAIN_ID_SCROLL_SEPOLIA,
];

const BASE_NETWORKS: &[u64] = &[CHAIN_ID_BASE, CHAIN_ID_BASE_SEPOLIA];

/// The registry family a network belongs to. Each family has its own
/// reverse-resolution mechanics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChainFamily {
    /// Registry + name wrapper, reverse names via `addr.reverse`.
    L1,
    /// ENSIP-19 rollups: primary names live in an L2 reverse registrar.
    L2,
    /// Base basenames: L1-style primary name plus a `basename` text alias.
    Base,
}

impl ChainFamily {
    /// Select the family for a network. The sets are disjoint, and anything
    /// we don't recognize is treated as L1.
    pub fn for_network(network: NetworkId) -> Self {
        let id = network.chain_id();
        if BASE_NETWORKS.contains(&id) {
            ChainFamily::Base
        } else if L2_NETWORKS.contains(&id) {
            ChainFamily::L2
        } else {
            if !L1_NETWORKS.contains(&id) {
                tracing::debug!(network = id, "unrecognized network, defaulting to L1 family");
            }
            ChainFamily::L1
        }
    }
}

impl std::fmt::Display for ChainFamily {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ChainFamily::L1 => write!(f, "L1"),
            ChainFamily::L2 => write!(f, "L2"),
            ChainFamily::Base => write!(f, "Base"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn families_are_disjoint() {
        for id in L1_NETWORKS {
            assert!(!L2_NETWORKS.contains(id) && !BASE_NETWORKS.contains(id));
        }
        for id in L2_NETWORKS {
            assert!(!BASE_NETWORKS.contains(id));
        }
    }

    #[test]
    fn selects_family_by_membership() {
        assert_eq!(ChainFamily::for_network(NetworkId::MAINNET), ChainFamily::L1);
        assert_eq!(ChainFamily::for_network(NetworkId::LINEA), ChainFamily::L2);
        assert_eq!(ChainFamily::for_network(NetworkId(CHAIN_ID_ARBITRUM)), ChainFamily::L2);
        assert_eq!(ChainFamily::for_network(NetworkId::BASE), ChainFamily::Base);
        assert_eq!(ChainFamily::for_network(NetworkId::BASE_SEPOLIA), ChainFamily::Base);
    }

    #[test]
    fn unknown_network_defaults_to_l1() {
        assert_eq!(ChainFamily::for_network(NetworkId(424_242)), ChainFamily::L1);
    }
}
