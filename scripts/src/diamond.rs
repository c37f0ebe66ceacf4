//! Planning of diamond cuts against the bridge router.
//!
//! A cut is the unit of change applied to the router's dispatch table in one
//! upgrade transaction: add, replace, or remove a set of selectors for a given
//! facet. The planner here is pure; it computes the `diamondCut` argument and
//! leaves ABI encoding and submission to the surrounding script.

use alloy_primitives::{Address, Selector};
use clap::ValueEnum;
use itertools::Itertools;
use serde::{Deserialize, Serialize};
use std::fmt::{self, Display};

use crate::{errors::ScriptError, selectors::compute_selector};

/// The action a cut applies to its selectors.
///
/// The ordinals are fixed by the router's `IDiamondCut` ABI and must not be
/// reordered.
#[derive(ValueEnum, Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CutAction {
    /// Register selectors not yet present on the router
    Add = 0,
    /// Repoint selectors already registered on the router
    Replace = 1,
    /// Unregister selectors from the router
    Remove = 2,
}

impl Display for CutAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CutAction::Add => write!(f, "add"),
            CutAction::Replace => write!(f, "replace"),
            CutAction::Remove => write!(f, "remove"),
        }
    }
}

/// Where a cut entry's selector comes from
#[derive(Clone, Debug)]
pub enum SelectorSource {
    /// A canonical function signature, hashed locally.
    /// A malformed signature fails the whole plan.
    Signature(String),
    /// The completed result of a lookup on a deployed facet's interface.
    /// An absent result is dropped from its group rather than failing the plan.
    Resolved(Option<Selector>),
}

/// A single (action, selector source) entry requested for a facet
#[derive(Clone, Debug)]
pub struct CutEntry {
    /// The action under which the selector should be cut
    pub action: CutAction,
    /// The source of the selector
    pub source: SelectorSource,
}

impl CutEntry {
    /// A cut entry backed by a canonical signature string
    pub fn signature(action: CutAction, signature: impl Into<String>) -> Self {
        Self {
            action,
            source: SelectorSource::Signature(signature.into()),
        }
    }

    /// A cut entry backed by a completed interface lookup
    pub fn resolved(action: CutAction, selector: Option<Selector>) -> Self {
        Self {
            action,
            source: SelectorSource::Resolved(selector),
        }
    }
}

/// A named facet together with the cut entries requested for it
#[derive(Clone, Debug)]
pub struct FacetDescriptor {
    /// The facet's contract name, used only for reporting
    pub name: String,
    /// The facet's deployed address
    pub address: Address,
    /// The requested cut entries, in submission order
    pub entries: Vec<CutEntry>,
}

/// One element of the `diamondCut` argument: a facet address, an action, and
/// the selectors the action applies to.
///
/// The facet address is the zero address if and only if the action is
/// [`CutAction::Remove`]; removals address their targets purely through the
/// selectors already registered on the router.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CutRecord {
    /// The address of the facet implementing the selectors
    pub facet_address: Address,
    /// The action to apply
    pub action: CutAction,
    /// The selectors affected, deduplicated and in first-seen order
    pub function_selectors: Vec<Selector>,
}

/// An ordered sequence of cut records, ready for ABI encoding.
///
/// Constructed fresh per planning invocation and never mutated afterwards.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct CutPlan {
    /// The cut records, in facet order then per-facet action encounter order
    pub records: Vec<CutRecord>,
}

/// Build a cut plan from an ordered sequence of facet descriptors.
///
/// Facet order is preserved in the output, as it determines the on-chain
/// execution order of the sub-operations within one upgrade transaction.
/// Within a facet, entries are grouped by action in the order the actions are
/// first encountered, and each group's selectors are deduplicated preserving
/// first-seen order.
///
/// Fails with [`ScriptError::NoSelectors`] if any requested (facet, action)
/// group resolves to zero selectors: submitting an empty cut is meaningless
/// and almost certainly indicates a typo in the signature list. No partial
/// plan is ever returned.
pub fn build_cut_plan(facets: &[FacetDescriptor]) -> Result<CutPlan, ScriptError> {
    let mut records = Vec::new();

    for facet in facets {
        // Group selectors by action, preserving action encounter order.
        // A group is created as soon as an action is requested, so a group
        // whose entries all fail resolution is detectable below.
        let mut groups: Vec<(CutAction, Vec<Selector>)> = Vec::new();
        for entry in &facet.entries {
            let group = match groups.iter().position(|(action, _)| *action == entry.action) {
                Some(idx) => idx,
                None => {
                    groups.push((entry.action, Vec::new()));
                    groups.len() - 1
                }
            };

            let selector = match &entry.source {
                SelectorSource::Signature(signature) => Some(compute_selector(signature)?),
                SelectorSource::Resolved(selector) => *selector,
            };
            if let Some(selector) = selector {
                groups[group].1.push(selector);
            }
        }

        for (action, selectors) in groups {
            let function_selectors: Vec<Selector> = selectors.into_iter().unique().collect();
            if function_selectors.is_empty() {
                return Err(ScriptError::NoSelectors(format!(
                    "facet `{}` has no resolvable selectors for action `{}`",
                    facet.name, action
                )));
            }

            let facet_address = match action {
                // Removals are routed by selector alone; the router rejects a
                // nonzero facet address here, so it is always normalized
                CutAction::Remove => Address::ZERO,
                CutAction::Add | CutAction::Replace => {
                    if facet.address == Address::ZERO {
                        return Err(ScriptError::CalldataConstruction(format!(
                            "facet `{}` has the zero address for action `{}`",
                            facet.name, action
                        )));
                    }
                    facet.address
                }
            };

            records.push(CutRecord {
                facet_address,
                action,
                function_selectors,
            });
        }
    }

    Ok(CutPlan { records })
}

#[cfg(test)]
mod tests {
    use alloy_primitives::{address, Address};
    use alloy_sol_types::SolCall;

    use crate::{
        errors::ScriptError,
        selectors::compute_selector,
        solidity::diamondCutCall,
        utils::diamond_cut_calldata,
    };

    use super::{build_cut_plan, CutAction, CutEntry, FacetDescriptor};

    /// A fixed nonzero facet address for tests
    const FACET_ADDRESS: Address = address!("aaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa");

    /// Shorthand for a single-facet descriptor
    fn facet(name: &str, address: Address, entries: Vec<CutEntry>) -> FacetDescriptor {
        FacetDescriptor {
            name: name.to_string(),
            address,
            entries,
        }
    }

    #[test]
    fn test_grouping_by_action() {
        let descriptor = facet(
            "GovernanceFacet",
            FACET_ADDRESS,
            vec![
                CutEntry::signature(CutAction::Add, "a()"),
                CutEntry::signature(CutAction::Add, "b()"),
                CutEntry::signature(CutAction::Replace, "c()"),
            ],
        );

        let plan = build_cut_plan(&[descriptor]).unwrap();
        assert_eq!(plan.records.len(), 2);

        let add = &plan.records[0];
        assert_eq!(add.action, CutAction::Add);
        assert_eq!(add.facet_address, FACET_ADDRESS);
        assert_eq!(
            add.function_selectors,
            vec![
                compute_selector("a()").unwrap(),
                compute_selector("b()").unwrap()
            ]
        );

        let replace = &plan.records[1];
        assert_eq!(replace.action, CutAction::Replace);
        assert_eq!(
            replace.function_selectors,
            vec![compute_selector("c()").unwrap()]
        );
    }

    #[test]
    fn test_action_groups_in_encounter_order() {
        let descriptor = facet(
            "GovernanceFacet",
            FACET_ADDRESS,
            vec![
                CutEntry::signature(CutAction::Replace, "a()"),
                CutEntry::signature(CutAction::Add, "b()"),
                CutEntry::signature(CutAction::Replace, "c()"),
            ],
        );

        let plan = build_cut_plan(&[descriptor]).unwrap();
        let actions: Vec<_> = plan.records.iter().map(|r| r.action).collect();
        assert_eq!(actions, vec![CutAction::Replace, CutAction::Add]);
        assert_eq!(
            plan.records[0].function_selectors,
            vec![
                compute_selector("a()").unwrap(),
                compute_selector("c()").unwrap()
            ]
        );
    }

    #[test]
    fn test_duplicate_selectors_deduplicated() {
        let descriptor = facet(
            "PaymentFacet",
            FACET_ADDRESS,
            vec![
                CutEntry::signature(CutAction::Add, "a()"),
                CutEntry::signature(CutAction::Add, "a()"),
            ],
        );

        let plan = build_cut_plan(&[descriptor]).unwrap();
        assert_eq!(plan.records.len(), 1);
        assert_eq!(
            plan.records[0].function_selectors,
            vec![compute_selector("a()").unwrap()]
        );
    }

    #[test]
    fn test_remove_normalizes_facet_address_to_zero() {
        let descriptor = facet(
            "GovernanceFacet",
            FACET_ADDRESS,
            vec![CutEntry::signature(
                CutAction::Remove,
                "updateMember(address,address,bool)",
            )],
        );

        let plan = build_cut_plan(&[descriptor]).unwrap();
        assert_eq!(plan.records[0].facet_address, Address::ZERO);
        assert_eq!(plan.records[0].action, CutAction::Remove);
    }

    #[test]
    fn test_facet_order_preserved() {
        let first = facet(
            "FeeCalculatorFacet",
            FACET_ADDRESS,
            vec![
                CutEntry::signature(CutAction::Add, "a()"),
                CutEntry::signature(CutAction::Remove, "b()"),
            ],
        );
        let second_address = address!("bbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbb");
        let second = facet(
            "RouterFacet",
            second_address,
            vec![CutEntry::signature(CutAction::Add, "c()")],
        );

        let plan = build_cut_plan(&[first, second]).unwrap();
        assert_eq!(plan.records.len(), 3);
        assert_eq!(plan.records[0].facet_address, FACET_ADDRESS);
        assert_eq!(plan.records[1].facet_address, Address::ZERO);
        assert_eq!(plan.records[2].facet_address, second_address);
    }

    #[test]
    fn test_absent_resolutions_filtered() {
        let resolved = compute_selector("a()").unwrap();
        let descriptor = facet(
            "PaymentFacet",
            FACET_ADDRESS,
            vec![
                CutEntry::resolved(CutAction::Add, None),
                CutEntry::resolved(CutAction::Add, Some(resolved)),
            ],
        );

        let plan = build_cut_plan(&[descriptor]).unwrap();
        assert_eq!(plan.records[0].function_selectors, vec![resolved]);
    }

    #[test]
    fn test_empty_group_fails() {
        let descriptor = facet(
            "PaymentFacet",
            FACET_ADDRESS,
            vec![
                CutEntry::resolved(CutAction::Add, None),
                CutEntry::resolved(CutAction::Add, None),
            ],
        );

        let res = build_cut_plan(&[descriptor]);
        assert!(matches!(res, Err(ScriptError::NoSelectors(_))));
    }

    #[test]
    fn test_malformed_signature_fails_plan() {
        let descriptor = facet(
            "PaymentFacet",
            FACET_ADDRESS,
            vec![CutEntry::signature(CutAction::Add, "foo(")],
        );

        let res = build_cut_plan(&[descriptor]);
        assert!(matches!(res, Err(ScriptError::InvalidSignature(_))));
    }

    #[test]
    fn test_zero_facet_address_rejected_for_add() {
        let descriptor = facet(
            "PaymentFacet",
            Address::ZERO,
            vec![CutEntry::signature(CutAction::Add, "pay(address,uint256)")],
        );

        let res = build_cut_plan(&[descriptor]);
        assert!(matches!(res, Err(ScriptError::CalldataConstruction(_))));
    }

    #[test]
    fn test_single_facet_plan_and_calldata() {
        let descriptor = facet(
            "PaymentFacet",
            FACET_ADDRESS,
            vec![CutEntry::signature(CutAction::Add, "pay(address,uint256)")],
        );

        let plan = build_cut_plan(&[descriptor]).unwrap();
        assert_eq!(plan.records.len(), 1);
        assert_eq!(plan.records[0].facet_address, FACET_ADDRESS);
        assert_eq!(plan.records[0].action, CutAction::Add);
        assert_eq!(
            plan.records[0].function_selectors,
            vec![compute_selector("pay(address,uint256)").unwrap()]
        );

        let calldata = diamond_cut_calldata(&plan, Address::ZERO, Vec::new());

        // `diamondCut((address,uint8,bytes4[])[],address,bytes)` => 0x1f931c1c
        assert_eq!(&calldata[..4], [0x1f, 0x93, 0x1c, 0x1c]);
        assert_eq!(&calldata[..4], diamondCutCall::SELECTOR);

        let decoded = diamondCutCall::abi_decode(&calldata, true).unwrap();
        assert_eq!(decoded._diamondCut.len(), 1);
        assert_eq!(decoded._diamondCut[0].facetAddress, FACET_ADDRESS);
        assert_eq!(decoded._diamondCut[0].action, CutAction::Add as u8);
        assert_eq!(
            decoded._diamondCut[0].functionSelectors,
            plan.records[0].function_selectors
        );
        assert_eq!(decoded._init, Address::ZERO);
        assert!(decoded._calldata.is_empty());
    }
}
