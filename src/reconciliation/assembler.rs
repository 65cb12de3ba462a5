//! Reconciliation assembly and regeneration

use serde::{Deserialize, Serialize};

use crate::aggregation::{group_by_plate, sum_groups, CategoryAccumulator, LineDetail, PlateGroups, Totals};
use crate::types::*;
use crate::utils::validation::validate_vouchers;

/// Everything a document formatter needs to render a reconciliation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(bound = "")]
pub struct ReconciliationDocument<L: LineDetail> {
    pub reconciliation: Reconciliation,
    pub plate_groups: PlateGroups<L>,
    pub totals: Totals<L::Accumulator>,
}

/// Build the persistable record for a validated voucher set.
///
/// The union picked in the filter (administrators) wins over `union_id`, the
/// caller's own union. The company comes from the first voucher. Nothing is
/// persisted here.
pub fn prepare_record<L: LineDetail>(
    vouchers: &[Voucher<L>],
    totals: &Totals<L::Accumulator>,
    filter: &FilterSelection,
    union_id: Option<&str>,
    requester_id: &str,
) -> ReconciliationResult<ReconciliationDraft> {
    let (week, worksite_id) = filter.resolved()?;
    validate_vouchers(vouchers)?;

    let company_id = vouchers.first().and_then(|v| v.company_id.clone());

    Ok(ReconciliationDraft {
        kind: L::KIND,
        worksite_id: worksite_id.to_string(),
        union_id: effective_union(filter, union_id),
        company_id,
        week,
        subtotal: totals.subtotal.clone(),
        vat: totals.vat.clone(),
        withholding: totals.withholding.clone(),
        total: totals.total.clone(),
        total_days: totals.quantities.total_days(),
        total_hours: totals.quantities.total_hours(),
        generated_by: requester_id.to_string(),
        status: ReconciliationStatus::Generated,
        voucher_ids: vouchers.iter().map(|v| v.id.clone()).collect(),
    })
}

/// A stored reconciliation with its plate groups rebuilt
#[derive(Debug, Clone, PartialEq)]
pub struct Rehydrated<L: LineDetail> {
    pub reconciliation: Reconciliation,
    pub plate_groups: PlateGroups<L>,
}

impl<L: LineDetail> Rehydrated<L> {
    /// Persisted money figures; only the quantities come from the groups
    pub fn totals(&self) -> Totals<L::Accumulator> {
        let (_, quantities) = sum_groups(&self.plate_groups);
        Totals::from_record(&self.reconciliation, &quantities)
    }

    /// Document view for re-rendering
    pub fn into_document(self) -> ReconciliationDocument<L> {
        let totals = self.totals();
        ReconciliationDocument {
            reconciliation: self.reconciliation,
            plate_groups: self.plate_groups,
            totals,
        }
    }
}

/// Rebuild the plate-group view of a stored reconciliation.
///
/// Totals are never recomputed: the vouchers may have changed since the
/// reconciliation was generated and the regenerated document must show what
/// was billed.
pub fn rehydrate<L: LineDetail>(
    stored: &Reconciliation,
    stored_vouchers: &[Voucher<L>],
) -> ReconciliationResult<Rehydrated<L>> {
    if stored.kind() != L::KIND {
        return Err(ReconciliationError::KindMismatch {
            expected: L::KIND,
            found: stored.kind(),
        });
    }

    validate_vouchers(stored_vouchers)?;

    Ok(Rehydrated {
        reconciliation: stored.clone(),
        plate_groups: group_by_plate(stored_vouchers),
    })
}
