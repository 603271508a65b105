//! # CLI Interface
//!
//! Defines the command-line argument structure for `ensbind` using `clap`
//! derive. Offline inspection commands (`namehash`, `split`, `services`,
//! `strategy`) plus `simulate`, which runs a full binding against
//! in-memory deployments.

use std::path::PathBuf;

use alloy_primitives::Address;
use clap::{Args, Parser, Subcommand};

use ensbind_protocol::config::{
    CHAIN_ID_BASE, CHAIN_ID_BASE_SEPOLIA, CHAIN_ID_LINEA, CHAIN_ID_MAINNET, CHAIN_ID_SEPOLIA,
};
use ensbind_protocol::directory::NetworkId;

use crate::logging::LogFormat;

/// Idempotent ENS name binding.
///
/// Binds `label.parent` names to contract addresses in both directions,
/// across L1, ENSIP-19 L2s, and Base.
#[derive(Parser, Debug)]
#[command(
    name = "ensbind",
    about = "Idempotent ENS name binding",
    version,
    propagate_version = true
)]
pub struct EnsbindCli {
    /// JSON file with chain directory overrides, merged over the built-ins.
    #[arg(long, global = true, env = "ENSBIND_DIRECTORY")]
    pub directory: Option<PathBuf>,

    /// Log output format.
    #[arg(
        long,
        global = true,
        env = "ENSBIND_LOG_FORMAT",
        value_enum,
        default_value_t = LogFormat::Pretty
    )]
    pub log_format: LogFormat,

    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level subcommands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Print the namehash (and wrapper token id) of a name.
    Namehash(NameArgs),
    /// Split a name into label and parent and print their hashes.
    Split(NameArgs),
    /// Print the service addresses and coin type of a network.
    Services(NetworkArgs),
    /// Print which binding strategy a network uses.
    Strategy(NetworkArgs),
    /// Bind a name against in-memory deployments and print the report.
    Simulate(SimulateArgs),
}

#[derive(Args, Debug)]
pub struct NameArgs {
    /// Dotted name, e.g. `app.domain.eth`.
    pub name: String,
}

#[derive(Args, Debug)]
pub struct NetworkArgs {
    /// Chain id or well-known name (mainnet, sepolia, linea, base, base-sepolia).
    #[arg(long, short = 'n', value_parser = parse_network, default_value = "mainnet")]
    pub network: NetworkId,
}

/// Arguments for the `simulate` subcommand.
#[derive(Args, Debug)]
pub struct SimulateArgs {
    /// Chain id or well-known name.
    #[arg(long, short = 'n', value_parser = parse_network, default_value = "mainnet")]
    pub network: NetworkId,

    /// Address the name should resolve to.
    #[arg(long, short = 't')]
    pub target: Address,

    /// Full name to bind, e.g. `app.domain.eth`.
    #[arg(long)]
    pub name: String,

    /// Identity the calls are sent from. It is given the parent name and
    /// ownership of the target before the first run.
    #[arg(long, default_value = "0x000000000000000000000000000000000000a11c")]
    pub caller: Address,

    /// Skip the reverse record (and the Base alias).
    #[arg(long)]
    pub forward_only: bool,

    /// Report what would be written, write nothing.
    #[arg(long)]
    pub dry_run: bool,

    /// Run the binding this many times against the same state.
    #[arg(long, default_value_t = 1, value_parser = clap::value_parser!(u32).range(1..))]
    pub repeat: u32,
}

/// Accepts a decimal chain id or one of the well-known network names.
pub fn parse_network(s: &str) -> Result<NetworkId, String> {
    let id = match s.to_ascii_lowercase().as_str() {
        "mainnet" | "ethereum" => CHAIN_ID_MAINNET,
        "sepolia" => CHAIN_ID_SEPOLIA,
        "linea" => CHAIN_ID_LINEA,
        "base" => CHAIN_ID_BASE,
        "base-sepolia" => CHAIN_ID_BASE_SEPOLIA,
        other => other
            .parse::<u64>()
            .map_err(|_| format!("unknown network '{s}': expected a chain id or a known name"))?,
    };
    Ok(NetworkId(id))
}
