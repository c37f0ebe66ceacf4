//! Definitions of the Solidity functions called on the bridge router

use alloy_sol_types::sol;

use crate::diamond::CutRecord;

sol! {
    #![sol(all_derives)]

    /// A single element of the `diamondCut` argument, as expected by the
    /// router's `IDiamondCut` interface
    struct FacetCut {
        /// The facet implementing the selectors, or the zero address for removals
        address facetAddress;
        /// The cut action ordinal: 0 = add, 1 = replace, 2 = remove
        uint8 action;
        /// The selectors the action applies to
        bytes4[] functionSelectors;
    }

    /// The router's upgrade entry point
    function diamondCut(FacetCut[] memory _diamondCut, address _init, bytes memory _calldata) external;

    /// `IGovernance`: point the router at a new treasury
    function updateTreasury(address _treasury) external;

    /// `IFeeCalculator`: set the percentage of collected fees routed to the treasury
    function setTreasuryPercentage(uint256 _treasuryPercentage) external;

    /// `IFeeCalculator`: claim a member's accrued rewards for a token
    function claim(address _token, address _member) external;
}

impl From<&CutRecord> for FacetCut {
    fn from(record: &CutRecord) -> Self {
        FacetCut {
            facetAddress: record.facet_address,
            action: record.action as u8,
            functionSelectors: record.function_selectors.clone(),
        }
    }
}
