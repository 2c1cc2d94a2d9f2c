use alloy_primitives::{Address, U256};
use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "salvage", about = "Recover pool tokens, fees and rewards from concentrated-liquidity positions")]
pub struct Cli {
    /// RPC endpoint, falls back to the AVALANCHE_HTTP env var
    #[arg(long)]
    pub rpc_url: Option<String>,

    /// Position manager contract override
    #[arg(long)]
    pub position_manager: Option<Address>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// List every position an owner holds
    List {
        #[arg(long)]
        owner: Address,
    },
    /// Remove liquidity and collect everything owed in one atomic batch
    Remove {
        #[arg(long)]
        token_id: U256,
        /// Share of the position's liquidity to remove
        #[arg(long, default_value_t = 100, value_parser = clap::value_parser!(u8).range(1..=100))]
        percent: u8,
        /// Receive the native asset instead of its wrapped form
        #[arg(long)]
        unwrap: bool,
        /// Proceed even when an unclaimed reward would be forfeited
        #[arg(long)]
        force: bool,
    },
    /// Collect owed fees without touching liquidity
    Collect {
        #[arg(long)]
        token_id: U256,
        #[arg(long)]
        unwrap: bool,
    },
    /// Claim the pending incentive reward
    Claim {
        #[arg(long)]
        token_id: U256,
    },
}
