//! # Service Table
//!
//! The per-network addresses of the four external services, plus the coin
//! type used for forward address records on that network.
//!
//! The built-in table is the source of truth for well-known deployments.
//! Operators who need a network we don't ship (or a fork, or a local devnet)
//! load a JSON file and merge it over the built-ins once at startup. After
//! that the directory is immutable and shared behind an `Arc`.
//!
//! An absent address is `None`. A zero address in an override file is
//! rejected, since "deployed at 0x0" and "not deployed" must never be
//! confused.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use alloy_primitives::{address, Address};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::family::{ChainFamily, NetworkId};
use crate::config::{evm_coin_type, ETH_COIN_TYPE};

/// Errors raised while loading a directory override file.
#[derive(Debug, Error)]
pub enum DirectoryError {
    /// The file could not be read.
    #[error("failed to read chain directory {path}: {source}")]
    Io {
        /// The path we tried to read.
        path: PathBuf,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The document is not valid directory JSON.
    #[error("invalid chain directory: {0}")]
    Parse(#[from] serde_json::Error),

    /// The same chain id appears twice in one document.
    #[error("chain {0} is listed more than once")]
    DuplicateNetwork(u64),

    /// A service address was given as the zero address.
    #[error("chain {chain_id}: {service} must be omitted, not set to the zero address")]
    ZeroAddress {
        /// Offending chain id.
        chain_id: u64,
        /// Which service field.
        service: &'static str,
    },
}

/// The external services available on one network.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ServiceSet {
    /// The ENS registry. Absent means the network is unsupported.
    pub registry: Option<Address>,
    /// Default resolver used when a node has none of its own.
    pub public_resolver: Option<Address>,
    /// Name wrapper. Absent on networks that never deployed one (Base).
    pub name_wrapper: Option<Address>,
    /// Reverse registrar; L1-style or ENSIP-19 depending on the family.
    pub reverse_registrar: Option<Address>,
    /// Coin type for forward address records.
    pub coin_type: Option<u64>,
}

impl ServiceSet {
    /// Every field absent. What unknown networks resolve to.
    pub fn unsupported() -> Self {
        Self::default()
    }

    /// A network is usable only if it has a registry.
    pub fn is_supported(&self) -> bool {
        self.registry.is_some()
    }
}

/// One entry of a directory JSON document.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct NetworkEntry {
    chain_id: u64,
    #[serde(default)]
    registry: Option<Address>,
    #[serde(default)]
    public_resolver: Option<Address>,
    #[serde(default)]
    name_wrapper: Option<Address>,
    #[serde(default)]
    reverse_registrar: Option<Address>,
    #[serde(default)]
    coin_type: Option<u64>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct DirectoryDocument {
    networks: Vec<NetworkEntry>,
}

/// Coin type for a network when the table doesn't say otherwise. L1-style
/// deployments (unknown devnets included) and Base serve addresses from the
/// ETH slot; ENSIP-19 rollups use their ENSIP-11 coin type.
pub fn default_coin_type(network: NetworkId) -> u64 {
    match ChainFamily::for_network(network) {
        ChainFamily::L1 | ChainFamily::Base => ETH_COIN_TYPE,
        ChainFamily::L2 => evm_coin_type(network.chain_id()),
    }
}

/// Immutable map from network to [`ServiceSet`].
#[derive(Debug, Clone, Default)]
pub struct ChainDirectory {
    networks: BTreeMap<NetworkId, ServiceSet>,
}

impl ChainDirectory {
    /// A directory that knows no networks at all.
    pub fn empty() -> Self {
        Self::default()
    }

    /// The well-known deployments.
    pub fn builtin() -> Self {
        let mut dir = Self::empty();

        // ENS on Ethereum mainnet.
        dir.insert(
            NetworkId::MAINNET,
            ServiceSet {
                registry: Some(address!("00000000000C2E074eC69A0dFb2997BA6C7d2e1e")),
                public_resolver: Some(address!("231b0Ee14048e9dCcD1d247744d114a4EB5E8E63")),
                name_wrapper: Some(address!("D4416b13d2b3a9aBae7AcD5D6C2BbDBE25686401")),
                reverse_registrar: Some(address!("a58E81fe9b61B5c3fE2AFD33CF304c454AbFc7Cb")),
                coin_type: Some(ETH_COIN_TYPE),
            },
        );

        // ENS on Sepolia. Same registry address, everything else redeployed.
        dir.insert(
            NetworkId::SEPOLIA,
            ServiceSet {
                registry: Some(address!("00000000000C2E074eC69A0dFb2997BA6C7d2e1e")),
                public_resolver: Some(address!("8FADE66B79cC9f707aB26799354482EB93a5B7dD")),
                name_wrapper: Some(address!("0635513f179D50A207757E05759CbD106d7dFcE8")),
                reverse_registrar: Some(address!("A0a1AbcDAe1a2a4A2EF8e9113Ff0e02DD81DC0C6")),
                coin_type: Some(ETH_COIN_TYPE),
            },
        );

        // Linea Name Service.
        dir.insert(
            NetworkId::LINEA,
            ServiceSet {
                registry: Some(address!("50130b669B28C339991d8676FA73CF122a121267")),
                public_resolver: Some(address!("86c5AED9F27837074612288610fB98ccC1733126")),
                name_wrapper: Some(address!("A53cca02F98D590819141Aa85C891e2Af713C223")),
                reverse_registrar: Some(address!("0000000000D8e504002cC26E3Ec46D81971C1664")),
                coin_type: Some(evm_coin_type(NetworkId::LINEA.chain_id())),
            },
        );

        // Basenames. No name wrapper on Base.
        dir.insert(
            NetworkId::BASE,
            ServiceSet {
                registry: Some(address!("b94704422c2a1e396835a571837aa5ae53285a95")),
                public_resolver: Some(address!("C6d566A56A1aFf6508b41f6c90ff131615583BCD")),
                name_wrapper: None,
                reverse_registrar: Some(address!("79ea96012eea67a83431f1701b3dff7e37f9e282")),
                coin_type: Some(ETH_COIN_TYPE),
            },
        );

        dir.insert(
            NetworkId::BASE_SEPOLIA,
            ServiceSet {
                registry: Some(address!("1493b2567056c2181630115660963E13A8E32735")),
                public_resolver: Some(address!("6533C94869D28fAA8dF77cc63f9e2b2D6Cf77eBA")),
                name_wrapper: None,
                reverse_registrar: Some(address!("a0A8401ECF248a9375a0a71C4dedc263dA18dCd7")),
                coin_type: Some(ETH_COIN_TYPE),
            },
        );

        dir
    }

    /// Add or replace a network.
    pub fn insert(&mut self, network: NetworkId, services: ServiceSet) {
        self.networks.insert(network, services);
    }

    /// The services for a network; [`ServiceSet::unsupported`] if unknown.
    pub fn services_for(&self, network: NetworkId) -> ServiceSet {
        self.networks.get(&network).copied().unwrap_or_default()
    }

    /// Whether the directory has an entry for this network at all.
    pub fn contains(&self, network: NetworkId) -> bool {
        self.networks.contains_key(&network)
    }

    /// Iterate over every known network in chain-id order.
    pub fn iter(&self) -> impl Iterator<Item = (&NetworkId, &ServiceSet)> {
        self.networks.iter()
    }

    /// Merge `overrides` over `self`. Entries in `overrides` replace ours
    /// wholesale; we don't merge field by field.
    pub fn with_overrides(mut self, overrides: ChainDirectory) -> Self {
        self.networks.extend(overrides.networks);
        self
    }

    /// Parse a directory from a JSON document.
    ///
    /// ```
    /// use ensbind_protocol::directory::{ChainDirectory, NetworkId};
    ///
    /// let dir = ChainDirectory::from_json_str(r#"{
    ///     "networks": [{
    ///         "chain_id": 31337,
    ///         "registry": "0x5FbDB2315678afecb367f032d93F642f64180aa3"
    ///     }]
    /// }"#).unwrap();
    /// assert!(dir.services_for(NetworkId(31337)).is_supported());
    /// ```
    pub fn from_json_str(json: &str) -> Result<Self, DirectoryError> {
        let doc: DirectoryDocument = serde_json::from_str(json)?;
        let mut dir = Self::empty();

        for entry in doc.networks {
            let network = NetworkId(entry.chain_id);
            if dir.contains(network) {
                return Err(DirectoryError::DuplicateNetwork(entry.chain_id));
            }
            let services = ServiceSet {
                registry: non_zero(entry.chain_id, "registry", entry.registry)?,
                public_resolver: non_zero(
                    entry.chain_id,
                    "public_resolver",
                    entry.public_resolver,
                )?,
                name_wrapper: non_zero(entry.chain_id, "name_wrapper", entry.name_wrapper)?,
                reverse_registrar: non_zero(
                    entry.chain_id,
                    "reverse_registrar",
                    entry.reverse_registrar,
                )?,
                coin_type: Some(entry.coin_type.unwrap_or_else(|| default_coin_type(network))),
            };
            dir.insert(network, services);
        }

        Ok(dir)
    }

    /// Read and parse a directory JSON file.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, DirectoryError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|source| DirectoryError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&json)
    }
}

fn non_zero(
    chain_id: u64,
    service: &'static str,
    addr: Option<Address>,
) -> Result<Option<Address>, DirectoryError> {
    match addr {
        Some(a) if a.is_zero() => Err(DirectoryError::ZeroAddress { chain_id, service }),
        other => Ok(other),
    }
}
