//! Definitions of CLI arguments and commands for the bridge management scripts

use alloy::providers::Provider;
use clap::{Args, Parser, Subcommand};

use crate::{
    commands::{claim_rewards, deploy_wrapped_token, set_treasury, update_facet, update_facets},
    diamond::CutAction,
    errors::ScriptError,
};

/// The CLI for the bridge management scripts
#[derive(Parser)]
pub struct Cli {
    /// Private key of the transaction signer
    // TODO: Better key management
    #[arg(short, long, env = "BRIDGE_PRIV_KEY")]
    pub priv_key: String,

    /// Network RPC URL
    #[arg(short, long)]
    pub rpc_url: String,

    /// The command to run
    #[command(subcommand)]
    pub command: Command,
}

/// The subcommands of the bridge management scripts
#[derive(Subcommand)]
pub enum Command {
    /// Plan a diamond cut for a single facet
    UpdateFacet(UpdateFacetArgs),
    /// Plan a diamond cut spanning multiple facets
    UpdateFacets(UpdateFacetsArgs),
    /// Update the router's treasury address and treasury fee percentage
    SetTreasury(SetTreasuryArgs),
    /// Claim a member's accrued fee rewards
    ClaimRewards(ClaimRewardsArgs),
    /// Deploy a bridge-wrapped token contract
    DeployWrappedToken(DeployWrappedTokenArgs),
}

impl Command {
    /// Run the command with the given client
    pub async fn run(self, client: &impl Provider) -> Result<(), ScriptError> {
        match self {
            Command::UpdateFacet(args) => update_facet(args, client).await,
            Command::UpdateFacets(args) => update_facets(args, client).await,
            Command::SetTreasury(args) => set_treasury(args, client).await,
            Command::ClaimRewards(args) => claim_rewards(args, client).await,
            Command::DeployWrappedToken(args) => deploy_wrapped_token(args, client).await,
        }
    }
}

/// Plan (and optionally submit) a diamond cut that adds, replaces, or removes
/// a single facet's function selectors on the router.
///
/// Prints the cut records as JSON along with the raw `diamondCut` calldata.
#[derive(Args)]
pub struct UpdateFacetArgs {
    /// Address of the router diamond proxy in hex
    #[arg(long)]
    pub router: String,

    /// Name of the facet contract
    #[arg(short, long)]
    pub name: String,

    /// Deployed facet contract address in hex
    #[arg(short, long)]
    pub facet_address: String,

    /// The cut action to apply to the signatures
    #[arg(short, long)]
    pub action: CutAction,

    /// Comma-separated list of canonical function signatures,
    /// e.g. "updateMember(address,address,bool),pause()".
    ///
    /// When omitted, requires --abi-path: every function the facet's ABI
    /// declares is cut.
    #[arg(short, long, required_unless_present = "abi_path")]
    pub signatures: Option<String>,

    /// Optional path to the facet's compilation artifact.
    ///
    /// When given alongside --signatures, selectors are resolved against the
    /// artifact's ABI and signatures absent from it are dropped; without
    /// --signatures, the whole interface is cut. Otherwise selectors are
    /// computed directly from the signature strings.
    #[arg(long)]
    pub abi_path: Option<String>,

    /// Submit the `diamondCut` transaction instead of only printing it
    #[arg(long)]
    pub submit: bool,
}

/// Plan (and optionally submit) a diamond cut spanning multiple facets,
/// described by a JSON config file.
///
/// The config is an ordered array of facets:
///
/// [{ "name": "...", "address": "0x...",
///    "entries": [{ "action": "add", "signature": "pause()" }] }]
#[derive(Args)]
pub struct UpdateFacetsArgs {
    /// Address of the router diamond proxy in hex
    #[arg(long)]
    pub router: String,

    /// Path to the facets config file
    #[arg(short, long)]
    pub config: String,

    /// Submit the `diamondCut` transaction instead of only printing it
    #[arg(long)]
    pub submit: bool,
}

/// Update the treasury the router collects fees for, then the percentage of
/// fees routed to it
#[derive(Args)]
pub struct SetTreasuryArgs {
    /// Address of the router diamond proxy in hex
    #[arg(long)]
    pub router: String,

    /// Address of the treasury in hex
    #[arg(short, long)]
    pub treasury: String,

    /// The percentage of collected fees routed to the treasury
    #[arg(short, long)]
    pub percentage: u64,
}

/// Claim a member's accrued fee rewards for a token
#[derive(Args)]
pub struct ClaimRewardsArgs {
    /// Address of the router diamond proxy in hex
    #[arg(long)]
    pub router: String,

    /// Address of the token to claim rewards in, in hex
    #[arg(long)]
    pub token: String,

    /// Address of the member claiming rewards, in hex
    #[arg(short, long)]
    pub member: String,
}

/// Deploy a bridge-wrapped token from a pre-compiled bytecode artifact
#[derive(Args)]
pub struct DeployWrappedTokenArgs {
    /// Path to the token's compiled bytecode, as a hex string
    #[arg(short, long)]
    pub bytecode_path: String,

    /// The token name
    #[arg(short, long)]
    pub name: String,

    /// The token symbol
    #[arg(short, long)]
    pub symbol: String,

    /// The token decimals
    #[arg(short, long)]
    pub decimals: u8,
}
