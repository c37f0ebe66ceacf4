//! Constants used in the bridge management scripts

/// The number of bytes in a function selector
pub const NUM_BYTES_SELECTOR: usize = 4;

/// The separator between function signatures in a CLI signature list
pub const SIGNATURE_LIST_SEPARATOR: char = ',';

/// The key under which a hardhat-style compilation artifact stores its ABI
pub const ARTIFACT_ABI_KEY: &str = "abi";

/// The number of confirmations to wait for when deploying a wrapped token
pub const NUM_DEPLOY_CONFIRMATIONS: u64 = 10;
