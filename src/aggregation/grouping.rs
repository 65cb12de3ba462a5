//! Partition of a voucher list into per-plate groups

use bigdecimal::BigDecimal;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::aggregation::{CategoryAccumulator, LineDetail};
use crate::types::*;
use crate::utils::money::round2;

/// Vouchers of one vehicle plate with their running sums
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(bound = "")]
pub struct PlateGroup<L: LineDetail> {
    pub plate: String,
    /// Member vouchers, each listed once regardless of its line count
    pub vouchers: Vec<Voucher<L>>,
    /// Category quantities at full precision
    pub quantities: L::Accumulator,
    /// Sum of every line cost in the group, at full precision
    pub subtotal: BigDecimal,
}

impl<L: LineDetail> PlateGroup<L> {
    /// Empty group with zeroed accumulators
    pub fn new(plate: String) -> Self {
        Self {
            plate,
            vouchers: Vec::new(),
            quantities: L::Accumulator::default(),
            subtotal: BigDecimal::from(0),
        }
    }

    /// Fold a voucher into the group
    pub fn absorb(self, voucher: &Voucher<L>) -> Self {
        let (quantities, subtotal) = voucher.line_details.iter().fold(
            (self.quantities, self.subtotal),
            |(quantities, subtotal), line| {
                let subtotal = match line.computed_cost() {
                    Some(cost) => subtotal + cost,
                    None => subtotal,
                };
                (quantities.accumulate(line), subtotal)
            },
        );

        let mut vouchers = self.vouchers;
        vouchers.push(voucher.clone());

        Self {
            plate: self.plate,
            vouchers,
            quantities,
            subtotal,
        }
    }

    pub fn voucher_count(&self) -> usize {
        self.vouchers.len()
    }

    /// Number of line details across the group's vouchers
    pub fn line_count(&self) -> usize {
        self.vouchers.iter().map(|v| v.line_details.len()).sum()
    }

    /// Subtotal as printed
    pub fn rounded_subtotal(&self) -> BigDecimal {
        round2(&self.subtotal)
    }
}

/// Plate groups keyed by plate, in first-seen order
pub type PlateGroups<L> = IndexMap<String, PlateGroup<L>>;

/// Group vouchers by vehicle plate.
///
/// Plates keep the order in which they first appear in `vouchers` and are
/// compared as typed. Vouchers without a plate land in the [`NO_PLATE`] group.
pub fn group_by_plate<L: LineDetail>(vouchers: &[Voucher<L>]) -> PlateGroups<L> {
    let partitions: IndexMap<&str, Vec<&Voucher<L>>> =
        vouchers
            .iter()
            .fold(IndexMap::new(), |mut partitions, voucher| {
                partitions
                    .entry(voucher.plate())
                    .or_insert_with(Vec::new)
                    .push(voucher);
                partitions
            });

    partitions
        .into_iter()
        .map(|(plate, members)| {
            let group = members
                .into_iter()
                .fold(PlateGroup::new(plate.to_string()), PlateGroup::absorb);
            (plate.to_string(), group)
        })
        .collect()
}

/// Groups ordered by plate, for callers that need a deterministic listing
pub fn sorted_by_plate<L: LineDetail>(groups: &PlateGroups<L>) -> Vec<&PlateGroup<L>> {
    let mut sorted: Vec<&PlateGroup<L>> = groups.values().collect();
    sorted.sort_by(|a, b| a.plate.cmp(&b.plate));
    sorted
}

/// Sum of every priced line cost in `vouchers`
pub fn total_line_cost<L: LineDetail>(vouchers: &[Voucher<L>]) -> BigDecimal {
    vouchers.iter().map(Voucher::total_cost).sum()
}
