//! Utilities for the bridge management scripts.

use std::{fs, str::FromStr};

use alloy::{
    network::{EthereumWallet, TransactionBuilder},
    providers::{Provider, ProviderBuilder},
    rpc::types::{TransactionReceipt, TransactionRequest},
    signers::local::PrivateKeySigner,
};
use alloy_json_abi::JsonAbi;
use alloy_primitives::Address;
use alloy_sol_types::SolCall;

use crate::{
    constants::ARTIFACT_ABI_KEY,
    diamond::CutPlan,
    errors::ScriptError,
    solidity::{diamondCutCall, FacetCut},
};

/// Sets up the client with which to interact with the router, signing
/// transactions with the given private key.
pub fn setup_client(priv_key: &str, rpc_url: &str) -> Result<impl Provider, ScriptError> {
    let signer = PrivateKeySigner::from_str(priv_key)
        .map_err(|e| ScriptError::ClientInitialization(e.to_string()))?;
    let url = rpc_url
        .parse()
        .map_err(|e| ScriptError::ClientInitialization(format!("invalid RPC url: {e}")))?;

    Ok(ProviderBuilder::new()
        .wallet(EthereumWallet::new(signer))
        .on_http(url))
}

/// Parse an address from a hex string
pub fn parse_address(address: &str) -> Result<Address, ScriptError> {
    Address::from_str(address).map_err(|e| ScriptError::CalldataConstruction(e.to_string()))
}

/// Read a facet's ABI from a compilation artifact.
///
/// Accepts both a hardhat-style artifact with the ABI nested under an `abi`
/// key, and a raw ABI array.
pub fn read_facet_abi(path: &str) -> Result<JsonAbi, ScriptError> {
    let contents = fs::read_to_string(path).map_err(|e| ScriptError::ReadFile(e.to_string()))?;
    let value: serde_json::Value =
        serde_json::from_str(&contents).map_err(|e| ScriptError::ArtifactParsing(e.to_string()))?;

    let abi = value.get(ARTIFACT_ABI_KEY).cloned().unwrap_or(value);
    serde_json::from_value(abi).map_err(|e| ScriptError::ArtifactParsing(e.to_string()))
}

/// Prepare calldata for the router's `diamondCut` method.
///
/// The initializer address and calldata are forwarded as-is; passing the zero
/// address and empty bytes means "no post-upgrade initializer call".
pub fn diamond_cut_calldata(
    plan: &CutPlan,
    initializer: Address,
    initializer_calldata: Vec<u8>,
) -> Vec<u8> {
    let cuts: Vec<FacetCut> = plan.records.iter().map(FacetCut::from).collect();

    diamondCutCall {
        _diamondCut: cuts,
        _init: initializer,
        _calldata: initializer_calldata.into(),
    }
    .abi_encode()
}

/// Submit a transaction carrying the given calldata to a contract and wait
/// for it to be mined
pub async fn send_calldata(
    client: &impl Provider,
    to: Address,
    calldata: Vec<u8>,
) -> Result<TransactionReceipt, ScriptError> {
    let tx = TransactionRequest::default().with_to(to).with_input(calldata);

    client
        .send_transaction(tx)
        .await
        .map_err(|e| ScriptError::ContractInteraction(e.to_string()))?
        .get_receipt()
        .await
        .map_err(|e| ScriptError::ContractInteraction(e.to_string()))
}
