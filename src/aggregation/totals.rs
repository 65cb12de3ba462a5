//! Grand totals across plate groups

use bigdecimal::BigDecimal;
use serde::{Deserialize, Serialize};

use crate::aggregation::{CategoryAccumulator, LineDetail, PlateGroups};
use crate::tax::{TaxBreakdown, TaxPolicy};
use crate::types::*;

/// Money figures and category quantities of a whole reconciliation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Totals<A> {
    pub subtotal: BigDecimal,
    pub vat: BigDecimal,
    /// Present only under a policy with withholding
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub withholding: Option<BigDecimal>,
    pub total: BigDecimal,
    /// Category quantities, rounded to two decimals
    pub quantities: A,
}

impl<A: CategoryAccumulator> Totals<A> {
    /// Combine a tax breakdown with the summed quantities
    pub fn from_breakdown(breakdown: TaxBreakdown, quantities: &A) -> Self {
        Self {
            subtotal: breakdown.subtotal,
            vat: breakdown.vat,
            withholding: breakdown.withholding,
            total: breakdown.total,
            quantities: quantities.rounded(),
        }
    }

    /// Money figures as persisted on a reconciliation, with quantities
    /// re-derived from the plate groups
    pub fn from_record(reconciliation: &Reconciliation, quantities: &A) -> Self {
        let draft = &reconciliation.draft;
        Self {
            subtotal: draft.subtotal.clone(),
            vat: draft.vat.clone(),
            withholding: draft.withholding.clone(),
            total: draft.total.clone(),
            quantities: quantities.rounded(),
        }
    }
}

/// Subtotal and quantities summed across every group, at full precision
pub fn sum_groups<L: LineDetail>(groups: &PlateGroups<L>) -> (BigDecimal, L::Accumulator) {
    groups.values().fold(
        (BigDecimal::from(0), L::Accumulator::default()),
        |(subtotal, quantities), group| {
            (subtotal + &group.subtotal, quantities.merge(&group.quantities))
        },
    )
}

/// Totals under the default tax policy of the voucher kind
pub fn calculate_totals<L: LineDetail>(groups: &PlateGroups<L>) -> Totals<L::Accumulator> {
    calculate_totals_with_policy(groups, &TaxPolicy::for_kind(L::KIND))
}

/// Totals under an explicit tax policy
pub fn calculate_totals_with_policy<L: LineDetail>(
    groups: &PlateGroups<L>,
    policy: &TaxPolicy,
) -> Totals<L::Accumulator> {
    let (subtotal, quantities) = sum_groups(groups);
    Totals::from_breakdown(policy.apply(&subtotal), &quantities)
}
