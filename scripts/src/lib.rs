//! Scripts for administering the bridge router diamond and its facets.

#![deny(missing_docs)]
#![deny(clippy::missing_docs_in_private_items)]

pub mod cli;
mod commands;
pub mod constants;
pub mod diamond;
pub mod errors;
pub mod selectors;
mod solidity;
pub mod utils;
