// Copyright (c) 2026 ALAS Technology. MIT License.
// See LICENSE for details.

//! # ensbind
//!
//! Entry point for the `ensbind` binary. Parses CLI arguments, initializes
//! logging, loads the chain directory, and dispatches:
//!
//! - `namehash`: node hash and wrapper token id of a name
//! - `split`: label / parent decomposition with hashes
//! - `services`: a network's service addresses and coin type
//! - `strategy`: which binding strategy a network gets
//! - `simulate`: bind against in-memory deployments, print JSON reports

mod cli;
mod logging;

use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::Parser;
use serde::Serialize;

use ensbind_contracts::SimulatedChain;
use ensbind_protocol::directory::table::default_coin_type;
use ensbind_protocol::directory::{ChainDirectory, ChainFamily, NetworkId, ServiceSet};
use ensbind_protocol::name::{namehash, token_id, ParsedName};
use ensbind_protocol::{BindReport, NameBinder};

use cli::{Commands, EnsbindCli, NameArgs, NetworkArgs, SimulateArgs};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = EnsbindCli::parse();
    logging::init_logging(cli.log_format);

    let directory = Arc::new(load_directory(&cli)?);

    match cli.command {
        Commands::Namehash(args) => print_namehash(&args),
        Commands::Split(args) => print_split(&args),
        Commands::Services(args) => print_services(&directory, &args),
        Commands::Strategy(args) => {
            println!("{}", ChainFamily::for_network(args.network));
            Ok(())
        }
        Commands::Simulate(args) => simulate(directory, args).await,
    }
}

/// Built-in directory, with the override file merged over it if one was given.
fn load_directory(cli: &EnsbindCli) -> Result<ChainDirectory> {
    let builtin = ChainDirectory::builtin();
    let Some(path) = &cli.directory else {
        return Ok(builtin);
    };
    let overrides = ChainDirectory::from_json_file(path)
        .with_context(|| format!("failed to load chain directory {}", path.display()))?;
    tracing::info!(
        path = %path.display(),
        networks = overrides.iter().count(),
        "chain directory overrides loaded"
    );
    Ok(builtin.with_overrides(overrides))
}

fn print_namehash(args: &NameArgs) -> Result<()> {
    let node = namehash(&args.name);
    println!("node     {node}");
    println!("token_id {}", token_id(&node));
    Ok(())
}

fn print_split(args: &NameArgs) -> Result<()> {
    let name = ParsedName::parse(&args.name)
        .with_context(|| format!("cannot split '{}'", args.name))?;
    println!("label       {}", name.label);
    println!("parent      {}", name.parent);
    println!("label_hash  {}", name.label_hash);
    println!("parent_node {}", name.parent_node);
    println!("node        {}", name.node);
    Ok(())
}

#[derive(Serialize)]
struct ServicesView {
    network: NetworkId,
    family: ChainFamily,
    supported: bool,
    coin_type: u64,
    services: ServiceSet,
}

fn print_services(directory: &ChainDirectory, args: &NetworkArgs) -> Result<()> {
    let services = directory.services_for(args.network);
    let coin_type = services
        .coin_type
        .unwrap_or_else(|| default_coin_type(args.network));
    let view = ServicesView {
        network: args.network,
        family: ChainFamily::for_network(args.network),
        supported: services.is_supported(),
        coin_type,
        services,
    };
    println!("{}", serde_json::to_string_pretty(&view)?);
    Ok(())
}

#[derive(Serialize)]
struct SimulationRun {
    run: u32,
    /// Mutating contract calls this run sent, failed ones included.
    mutating_calls: usize,
    report: BindReport,
}

/// Deploy every directory network in memory, give the caller the parent
/// name and ownership of the target, then bind `repeat` times.
async fn simulate(directory: Arc<ChainDirectory>, args: SimulateArgs) -> Result<()> {
    let name = ParsedName::parse(&args.name)
        .with_context(|| format!("cannot bind '{}'", args.name))?;
    if !directory.services_for(args.network).is_supported() {
        bail!("network {} has no registry in the chain directory", args.network);
    }

    let chain = SimulatedChain::from_directory(&directory);
    chain.register(args.network, &name.parent, args.caller);
    if args.target != args.caller {
        chain.set_contract_owner(args.network, args.target, args.caller);
    }
    tracing::info!(
        network = %args.network,
        parent = %name.parent,
        caller = %args.caller,
        "simulated deployment seeded"
    );

    let binder = NameBinder::new(Arc::clone(&directory), chain.connect(args.caller));
    let mut runs = Vec::with_capacity(args.repeat as usize);

    for run in 1..=args.repeat {
        let before = chain.mutating_calls();
        let result = if args.dry_run {
            binder
                .plan(args.network, args.target, &args.name, args.forward_only)
                .await
        } else if args.forward_only {
            binder
                .bind_forward_only(args.network, args.target, &args.name)
                .await
        } else {
            binder.bind_name(args.network, args.target, &args.name).await
        };
        let report = result.with_context(|| format!("run {run} failed"))?;
        runs.push(SimulationRun {
            run,
            mutating_calls: chain.mutating_calls() - before,
            report,
        });
    }

    println!("{}", serde_json::to_string_pretty(&runs)?);
    Ok(())
}
