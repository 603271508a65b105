//! # Protocol Configuration & Constants
//!
//! Every magic number in ensbind lives here. Most of them are not ours to
//! choose: they are fixed by ENSIP documents and by contracts that are
//! already deployed, so changing one is less "tuning" and more "breaking
//! interoperability with every wallet on the planet".

// ---------------------------------------------------------------------------
// Network Identifiers
// ---------------------------------------------------------------------------

/// Ethereum mainnet.
pub const CHAIN_ID_MAINNET: u64 = 1;

/// Sepolia testnet.
pub const CHAIN_ID_SEPOLIA: u64 = 11_155_111;

/// Holesky testnet. L1 family, but no deployment in the built-in table.
pub const CHAIN_ID_HOLESKY: u64 = 17_000;

/// Optimism mainnet.
pub const CHAIN_ID_OPTIMISM: u64 = 10;

/// Optimism Sepolia.
pub const CHAIN_ID_OPTIMISM_SEPOLIA: u64 = 11_155_420;

/// Arbitrum One.
pub const CHAIN_ID_ARBITRUM: u64 = 42_161;

/// Arbitrum Sepolia.
pub const CHAIN_ID_ARBITRUM_SEPOLIA: u64 = 421_614;

/// Linea mainnet.
pub const CHAIN_ID_LINEA: u64 = 59_144;

/// Linea Sepolia.
pub const CHAIN_ID_LINEA_SEPOLIA: u64 = 59_141;

/// Scroll mainnet.
pub const CHAIN_ID_SCROLL: u64 = 534_352;

/// Scroll Sepolia.
pub const CHAIN_ID_SCROLL_SEPOLIA: u64 = 534_351;

/// Base mainnet, home of the basenames.
pub const CHAIN_ID_BASE: u64 = 8_453;

/// Base Sepolia.
pub const CHAIN_ID_BASE_SEPOLIA: u64 = 84_532;

// ---------------------------------------------------------------------------
// Coin Types
// ---------------------------------------------------------------------------

/// SLIP-44 coin type for ETH. Used for address records on L1 and on Base,
/// whose resolver reads its default `addr(node)` slot.
pub const ETH_COIN_TYPE: u64 = 60;

/// ENSIP-11 marker bit. An EVM chain's coin type is `0x80000000 | chain_id`.
pub const ENSIP11_EVM_BIT: u64 = 0x8000_0000;

// ---------------------------------------------------------------------------
// Reverse Resolution
// ---------------------------------------------------------------------------

/// Parent of every L1 reverse node: `<hex address>.addr.reverse`.
pub const ADDR_REVERSE_SUFFIX: &str = "addr.reverse";

/// Text record key under which Base stores the basename alias.
pub const BASENAME_TEXT_KEY: &str = "basename";

// ---------------------------------------------------------------------------
// Subname Creation Defaults
// ---------------------------------------------------------------------------

/// TTL written with every new subnode record. Nobody reads it.
pub const DEFAULT_TTL: u64 = 0;

/// Name wrapper fuses burned on new subnames. None by default: burning
/// fuses is irreversible and not our call to make.
pub const DEFAULT_FUSES: u32 = 0;

/// Name wrapper expiry for new subnames. Zero lets the wrapper clamp it to
/// the parent's expiry.
pub const DEFAULT_EXPIRY: u64 = 0;

/// Returns the ENSIP-11 coin type for an EVM chain.
///
/// Mainnet is special-cased to `60` because ENSIP-11 says so.
pub fn evm_coin_type(chain_id: u64) -> u64 {
    if chain_id == CHAIN_ID_MAINNET {
        ETH_COIN_TYPE
    } else {
        ENSIP11_EVM_BIT | chain_id
    }
}
