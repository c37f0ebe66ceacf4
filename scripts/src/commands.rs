//! Implementations of the various bridge management scripts

use std::fs;

use alloy::{
    network::TransactionBuilder,
    providers::Provider,
    rpc::types::TransactionRequest,
};
use alloy_primitives::{Address, U256};
use alloy_sol_types::{sol_data, SolCall, SolType};
use serde::Deserialize;
use tracing::info;

use crate::{
    cli::{
        ClaimRewardsArgs, DeployWrappedTokenArgs, SetTreasuryArgs, UpdateFacetArgs,
        UpdateFacetsArgs,
    },
    constants::{NUM_DEPLOY_CONFIRMATIONS, SIGNATURE_LIST_SEPARATOR},
    diamond::{build_cut_plan, CutAction, CutEntry, CutPlan, FacetDescriptor},
    errors::ScriptError,
    selectors::{interface_selectors, resolve_selector},
    solidity::{claimCall, setTreasuryPercentageCall, updateTreasuryCall},
    utils::{diamond_cut_calldata, parse_address, read_facet_abi, send_calldata},
};

/// A facet entry in the `update-facets` config file
#[derive(Deserialize)]
struct FacetConfig {
    /// The facet's contract name
    name: String,
    /// The facet's deployed address
    address: Address,
    /// The cut entries requested for the facet
    entries: Vec<FacetConfigEntry>,
}

/// A single (action, signature) pair in the `update-facets` config file
#[derive(Deserialize)]
struct FacetConfigEntry {
    /// The cut action
    action: CutAction,
    /// The canonical function signature
    signature: String,
}

/// Split a comma-separated signature list, dropping empty items.
///
/// A list with no signatures left is rejected: it would plan an empty cut,
/// which the router would accept as a no-op upgrade.
fn parse_signature_list(signatures: &str) -> Result<Vec<&str>, ScriptError> {
    let signatures: Vec<&str> = signatures
        .split(SIGNATURE_LIST_SEPARATOR)
        .filter(|signature| !signature.is_empty())
        .collect();

    if signatures.is_empty() {
        return Err(ScriptError::NoSelectors(
            "signature list is empty".to_string(),
        ));
    }
    Ok(signatures)
}

/// Convert a parsed `update-facets` config into facet descriptors.
///
/// Rejects an empty config and facets with no cut entries; both would plan
/// cuts that submit nothing.
fn facets_from_config(configs: Vec<FacetConfig>) -> Result<Vec<FacetDescriptor>, ScriptError> {
    if configs.is_empty() {
        return Err(ScriptError::NoSelectors(
            "config declares no facets".to_string(),
        ));
    }

    configs
        .into_iter()
        .map(|config| {
            if config.entries.is_empty() {
                return Err(ScriptError::NoSelectors(format!(
                    "facet `{}` has no cut entries",
                    config.name
                )));
            }

            Ok(FacetDescriptor {
                name: config.name,
                address: config.address,
                entries: config
                    .entries
                    .into_iter()
                    .map(|entry| CutEntry::signature(entry.action, entry.signature))
                    .collect(),
            })
        })
        .collect()
}

/// Print a cut plan and its `diamondCut` calldata, and submit the cut to the
/// router when requested.
///
/// The initializer address and calldata are always the zero address and empty
/// bytes; none of the bridge upgrades use a post-upgrade initializer call.
async fn report_and_submit(
    plan: &CutPlan,
    router: Address,
    submit: bool,
    client: &impl Provider,
) -> Result<(), ScriptError> {
    let records = serde_json::to_string_pretty(plan)
        .map_err(|e| ScriptError::CalldataConstruction(e.to_string()))?;
    println!("\ndiamondCut data:\n{records}");

    let calldata = diamond_cut_calldata(plan, Address::ZERO, Vec::new());
    println!("\nTX data:\n0x{}", hex::encode(&calldata));

    if submit {
        let receipt = send_calldata(client, router, calldata).await?;
        info!(
            "diamond cut [{:#x}] mined in block {:?}",
            receipt.transaction_hash, receipt.block_number
        );
    }

    Ok(())
}

/// Plan a cut for a single facet from CLI arguments
pub async fn update_facet(
    args: UpdateFacetArgs,
    client: &impl Provider,
) -> Result<(), ScriptError> {
    let router = parse_address(&args.router)?;
    let facet_address = parse_address(&args.facet_address)?;

    // With an ABI artifact at hand, resolve the listed selectors against the
    // deployed interface and drop signatures it does not declare, or cut the
    // whole interface when no list is given; without an artifact, hash the
    // signatures directly
    let entries: Vec<CutEntry> = match (&args.signatures, &args.abi_path) {
        (Some(signatures), Some(path)) => {
            let abi = read_facet_abi(path)?;
            parse_signature_list(signatures)?
                .into_iter()
                .map(|signature| CutEntry::resolved(args.action, resolve_selector(&abi, signature)))
                .collect()
        }
        (Some(signatures), None) => parse_signature_list(signatures)?
            .into_iter()
            .map(|signature| CutEntry::signature(args.action, signature))
            .collect(),
        (None, Some(path)) => {
            let abi = read_facet_abi(path)?;
            let selectors = interface_selectors(&abi);
            if selectors.is_empty() {
                return Err(ScriptError::NoSelectors(format!(
                    "interface of facet `{}` declares no functions",
                    args.name
                )));
            }
            selectors
                .into_iter()
                .map(|selector| CutEntry::resolved(args.action, Some(selector)))
                .collect()
        }
        // Unreachable behind clap's `required_unless_present`
        (None, None) => {
            return Err(ScriptError::CalldataConstruction(
                "one of --signatures or --abi-path must be supplied".to_string(),
            ))
        }
    };

    let facet = FacetDescriptor {
        name: args.name,
        address: facet_address,
        entries,
    };

    let plan = build_cut_plan(std::slice::from_ref(&facet))?;
    report_and_submit(&plan, router, args.submit, client).await
}

/// Plan a cut spanning multiple facets from a JSON config file
pub async fn update_facets(
    args: UpdateFacetsArgs,
    client: &impl Provider,
) -> Result<(), ScriptError> {
    let router = parse_address(&args.router)?;

    let contents =
        fs::read_to_string(&args.config).map_err(|e| ScriptError::ReadFile(e.to_string()))?;
    let configs: Vec<FacetConfig> =
        serde_json::from_str(&contents).map_err(|e| ScriptError::ReadFile(e.to_string()))?;

    let facets = facets_from_config(configs)?;
    let plan = build_cut_plan(&facets)?;
    report_and_submit(&plan, router, args.submit, client).await
}

/// Point the router at a new treasury, then update the treasury fee percentage
pub async fn set_treasury(
    args: SetTreasuryArgs,
    client: &impl Provider,
) -> Result<(), ScriptError> {
    let router = parse_address(&args.router)?;
    let treasury = parse_address(&args.treasury)?;

    let calldata = updateTreasuryCall {
        _treasury: treasury,
    }
    .abi_encode();
    let receipt = send_calldata(client, router, calldata).await?;
    println!(
        "Updated treasury [{treasury:#x}] on router [{router:#x}], TX [{:#x}]",
        receipt.transaction_hash
    );

    let calldata = setTreasuryPercentageCall {
        _treasuryPercentage: U256::from(args.percentage),
    }
    .abi_encode();
    let receipt = send_calldata(client, router, calldata).await?;
    println!(
        "Updated treasury percentage to [{}] on router [{router:#x}], TX [{:#x}]",
        args.percentage, receipt.transaction_hash
    );

    Ok(())
}

/// Claim a member's accrued fee rewards for a token
pub async fn claim_rewards(
    args: ClaimRewardsArgs,
    client: &impl Provider,
) -> Result<(), ScriptError> {
    let router = parse_address(&args.router)?;
    let token = parse_address(&args.token)?;
    let member = parse_address(&args.member)?;

    let calldata = claimCall {
        _token: token,
        _member: member,
    }
    .abi_encode();
    let receipt = send_calldata(client, router, calldata).await?;
    println!(
        "Claimed token [{token:#x}] to member [{member:#x}], TX [{:#x}]",
        receipt.transaction_hash
    );

    Ok(())
}

/// Deploy a bridge-wrapped token from a pre-compiled bytecode artifact
pub async fn deploy_wrapped_token(
    args: DeployWrappedTokenArgs,
    client: &impl Provider,
) -> Result<(), ScriptError> {
    let contents = fs::read_to_string(&args.bytecode_path)
        .map_err(|e| ScriptError::ReadFile(e.to_string()))?;
    let bytecode = hex::decode(contents.trim().trim_start_matches("0x"))
        .map_err(|e| ScriptError::ArtifactParsing(e.to_string()))?;

    // The token constructor takes (name, symbol, decimals)
    let constructor_args =
        <(sol_data::String, sol_data::String, sol_data::Uint<8>) as SolType>::abi_encode_params(
            &(args.name, args.symbol, args.decimals),
        );
    let deploy_code = [bytecode, constructor_args].concat();

    info!("deploying wrapped token, please wait...");
    let tx = TransactionRequest::default().with_deploy_code(deploy_code);
    let receipt = client
        .send_transaction(tx)
        .await
        .map_err(|e| ScriptError::ContractDeployment(e.to_string()))?
        .with_required_confirmations(NUM_DEPLOY_CONFIRMATIONS)
        .get_receipt()
        .await
        .map_err(|e| ScriptError::ContractDeployment(e.to_string()))?;

    let address = receipt
        .contract_address
        .ok_or_else(|| {
            ScriptError::ContractDeployment("no contract address in receipt".to_string())
        })?;
    println!("Wrapped token deployed to address {address:#x}");

    Ok(())
}
