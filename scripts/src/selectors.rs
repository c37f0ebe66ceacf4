//! Computation of 4-byte function selectors from canonical function signatures.
//!
//! The router diamond dispatches calls to facets by selector, so every cut
//! submitted to it is ultimately a set of selectors. Signatures must already be
//! in canonical ABI form (`name(type1,type2,...)`, no parameter names, no
//! whitespace, no type aliases); no normalization is performed here.

use alloy_json_abi::JsonAbi;
use alloy_primitives::{keccak256, Selector};

use crate::{constants::NUM_BYTES_SELECTOR, errors::ScriptError};

/// Compute the 4-byte selector for a canonical function signature.
///
/// This is the first 4 bytes of the keccak-256 hash of the UTF-8 bytes of the
/// signature string. Malformed signatures are rejected, never corrected.
pub fn compute_selector(signature: &str) -> Result<Selector, ScriptError> {
    validate_signature(signature)?;

    let digest = keccak256(signature.as_bytes());
    Ok(Selector::from_slice(&digest[..NUM_BYTES_SELECTOR]))
}

/// Resolve a signature against the published interface of a deployed facet.
///
/// Returns `None` when the interface declares no function with the given
/// canonical signature. Callers filter absent results out of a cut rather than
/// treating them as failures.
pub fn resolve_selector(abi: &JsonAbi, signature: &str) -> Option<Selector> {
    abi.functions()
        .find(|function| function.signature() == signature)
        .map(|function| function.selector())
}

/// The selectors of every function a facet's interface declares, one per
/// overload.
///
/// Used to cut a whole facet onto the router without listing its signatures.
pub fn interface_selectors(abi: &JsonAbi) -> Vec<Selector> {
    abi.functions().map(|function| function.selector()).collect()
}

/// Check that a signature matches the canonical `name(types)` grammar
fn validate_signature(signature: &str) -> Result<(), ScriptError> {
    /// Build the error for a malformed signature
    fn invalid(signature: &str, reason: &str) -> ScriptError {
        ScriptError::InvalidSignature(format!("{reason}: `{signature}`"))
    }

    let open = signature
        .find('(')
        .ok_or_else(|| invalid(signature, "missing parameter list"))?;

    let name = &signature[..open];
    if name.is_empty() {
        return Err(invalid(signature, "missing function name"));
    }
    let mut name_chars = name.chars();
    if !name_chars
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_' || c == '$')
        || !name_chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$')
    {
        return Err(invalid(signature, "malformed function name"));
    }

    let params = signature[open + 1..]
        .strip_suffix(')')
        .ok_or_else(|| invalid(signature, "unterminated parameter list"))?;

    // Scan the parameter list: balanced parentheses (tuple types) and square
    // brackets (array suffixes), a restricted character set, and no empty
    // parameter slots. Empty slots are only detected at the top nesting level.
    let mut depth = 0usize;
    let mut bracket_depth = 0usize;
    let mut segment_len = 0usize;
    let mut saw_separator = false;
    for c in params.chars() {
        match c {
            '(' => {
                depth += 1;
                segment_len += 1;
            }
            ')' => {
                depth = depth
                    .checked_sub(1)
                    .ok_or_else(|| invalid(signature, "unbalanced parentheses"))?;
                segment_len += 1;
            }
            '[' => {
                bracket_depth += 1;
                segment_len += 1;
            }
            ']' => {
                bracket_depth = bracket_depth
                    .checked_sub(1)
                    .ok_or_else(|| invalid(signature, "unbalanced brackets"))?;
                segment_len += 1;
            }
            ',' if bracket_depth > 0 => {
                return Err(invalid(signature, "invalid character in parameter list"))
            }
            ',' if depth == 0 => {
                if segment_len == 0 {
                    return Err(invalid(signature, "empty parameter"));
                }
                saw_separator = true;
                segment_len = 0;
            }
            c if c.is_ascii_alphanumeric() || matches!(c, '_' | '$' | ',') => {
                segment_len += 1;
            }
            _ => return Err(invalid(signature, "invalid character in parameter list")),
        }
    }
    if depth != 0 {
        return Err(invalid(signature, "unbalanced parentheses"));
    }
    if bracket_depth != 0 {
        return Err(invalid(signature, "unbalanced brackets"));
    }
    if saw_separator && segment_len == 0 {
        return Err(invalid(signature, "empty parameter"));
    }

    Ok(())
}
