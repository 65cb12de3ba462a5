//! Per-kind category accumulators.
//!
//! Accumulators are immutable values: every reducer consumes the previous
//! value and returns the next one, so a plate group is a plain fold over its
//! line details.

use bigdecimal::BigDecimal;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fmt::Debug;

use crate::types::*;
use crate::utils::money::round2;

/// Quantity strategy for one kind of line detail
pub trait CategoryAccumulator:
    Debug + Clone + Default + PartialEq + Serialize + DeserializeOwned + Send + Sync + 'static
{
    /// Line detail type folded into this accumulator
    type Line;

    /// Fold one line detail in
    fn accumulate(self, line: &Self::Line) -> Self;

    /// Combine with the accumulator of another plate group
    fn merge(self, other: &Self) -> Self;

    /// Copy with every decimal quantity rounded to two places; counts stay exact
    fn rounded(&self) -> Self;

    /// Days figure stored on the reconciliation record, when the kind has one
    fn total_days(&self) -> Option<BigDecimal> {
        None
    }

    /// Hours figure stored on the reconciliation record, when the kind has one
    fn total_hours(&self) -> Option<BigDecimal> {
        None
    }
}

/// A priced line detail of one voucher kind
pub trait LineDetail:
    Debug + Clone + PartialEq + Serialize + DeserializeOwned + Send + Sync + 'static
{
    /// Voucher kind carried by this line type
    const KIND: VoucherKind;

    /// Quantity accumulator for this kind
    type Accumulator: CategoryAccumulator<Line = Self>;

    /// Material or equipment description
    fn material(&self) -> &str;

    /// Priced cost, when the pricing step ran
    fn computed_cost(&self) -> Option<&BigDecimal>;
}

impl LineDetail for RentalLine {
    const KIND: VoucherKind = VoucherKind::Rental;
    type Accumulator = RentalQuantities;

    fn material(&self) -> &str {
        &self.material
    }

    fn computed_cost(&self) -> Option<&BigDecimal> {
        self.computed_cost.as_ref()
    }
}

impl LineDetail for MaterialLine {
    const KIND: VoucherKind = VoucherKind::Material;
    type Accumulator = MaterialQuantities;

    fn material(&self) -> &str {
        &self.material
    }

    fn computed_cost(&self) -> Option<&BigDecimal> {
        self.computed_cost.as_ref()
    }
}

fn plus(total: BigDecimal, value: Option<&BigDecimal>) -> BigDecimal {
    match value {
        Some(value) => total + value,
        None => total,
    }
}

/// Rental quantities: days, hours and the trips logged on each line
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RentalQuantities {
    /// Sum of the explicit trip counts on the lines
    pub trips: u64,
    pub days: BigDecimal,
    pub hours: BigDecimal,
}

impl CategoryAccumulator for RentalQuantities {
    type Line = RentalLine;

    fn accumulate(self, line: &RentalLine) -> Self {
        Self {
            trips: self.trips + u64::from(line.number_of_trips),
            days: self.days + &line.total_days,
            hours: self.hours + &line.total_hours,
        }
    }

    fn merge(self, other: &Self) -> Self {
        Self {
            trips: self.trips + other.trips,
            days: self.days + &other.days,
            hours: self.hours + &other.hours,
        }
    }

    fn rounded(&self) -> Self {
        Self {
            trips: self.trips,
            days: round2(&self.days),
            hours: round2(&self.hours),
        }
    }

    fn total_days(&self) -> Option<BigDecimal> {
        Some(round2(&self.days))
    }

    fn total_hours(&self) -> Option<BigDecimal> {
        Some(round2(&self.hours))
    }
}

/// Measured aggregate loads (material types 1 and 2)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AggregateTotals {
    /// One trip per line detail
    pub trips: u64,
    /// Real measured volume
    pub volume_m3: BigDecimal,
    pub tons: BigDecimal,
}

impl AggregateTotals {
    fn add_load(self, line: &MaterialLine) -> Self {
        Self {
            trips: self.trips + 1,
            volume_m3: plus(self.volume_m3, line.real_volume_m3.as_ref()),
            tons: plus(self.tons, line.weight_tons.as_ref()),
        }
    }

    fn merge(self, other: &Self) -> Self {
        Self {
            trips: self.trips + other.trips,
            volume_m3: self.volume_m3 + &other.volume_m3,
            tons: self.tons + &other.tons,
        }
    }

    fn rounded(&self) -> Self {
        Self {
            trips: self.trips,
            volume_m3: round2(&self.volume_m3),
            tons: round2(&self.tons),
        }
    }
}

/// Cut product loads (material type 3); no tonnage
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CutProductTotals {
    /// One trip per line detail
    pub trips: u64,
    /// Requested volume, not the measured one
    pub volume_m3: BigDecimal,
}

impl CutProductTotals {
    fn add_load(self, line: &MaterialLine) -> Self {
        Self {
            trips: self.trips + 1,
            volume_m3: plus(self.volume_m3, line.requested_volume_m3.as_ref()),
        }
    }

    fn merge(self, other: &Self) -> Self {
        Self {
            trips: self.trips + other.trips,
            volume_m3: self.volume_m3 + &other.volume_m3,
        }
    }

    fn rounded(&self) -> Self {
        Self {
            trips: self.trips,
            volume_m3: round2(&self.volume_m3),
        }
    }
}

/// Material quantities split by material type
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MaterialQuantities {
    pub type_1: AggregateTotals,
    pub type_2: AggregateTotals,
    pub type_3: CutProductTotals,
}

impl MaterialQuantities {
    /// Trips across all three material types
    pub fn total_trips(&self) -> u64 {
        self.type_1.trips + self.type_2.trips + self.type_3.trips
    }
}

impl CategoryAccumulator for MaterialQuantities {
    type Line = MaterialLine;

    fn accumulate(self, line: &MaterialLine) -> Self {
        match line.material_type {
            MaterialType::Aggregate1 => Self {
                type_1: self.type_1.add_load(line),
                ..self
            },
            MaterialType::Aggregate2 => Self {
                type_2: self.type_2.add_load(line),
                ..self
            },
            MaterialType::CutProduct => Self {
                type_3: self.type_3.add_load(line),
                ..self
            },
        }
    }

    fn merge(self, other: &Self) -> Self {
        Self {
            type_1: self.type_1.merge(&other.type_1),
            type_2: self.type_2.merge(&other.type_2),
            type_3: self.type_3.merge(&other.type_3),
        }
    }

    fn rounded(&self) -> Self {
        Self {
            type_1: self.type_1.rounded(),
            type_2: self.type_2.rounded(),
            type_3: self.type_3.rounded(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dec(value: &str) -> BigDecimal {
        value.parse().unwrap()
    }

    #[test]
    fn test_rental_accumulates_days_hours_and_explicit_trips() {
        let line = RentalLine::daily("Excavadora".to_string(), dec("1.5"), dec("900"))
            .with_trips(3);
        let hourly = RentalLine::hourly("Retro".to_string(), dec("6"), dec("720"));

        let quantities = RentalQuantities::default()
            .accumulate(&line)
            .accumulate(&hourly);

        assert_eq!(quantities.trips, 3);
        assert_eq!(quantities.days, dec("1.5"));
        assert_eq!(quantities.hours, dec("6"));
    }

    #[test]
    fn test_material_type_1_counts_one_trip_per_line() {
        let line = MaterialLine::aggregate(
            "Grava".to_string(),
            MaterialType::Aggregate1,
            dec("10"),
            dec("15"),
            dec("500"),
        );

        let quantities = MaterialQuantities::default()
            .accumulate(&line)
            .accumulate(&line);

        assert_eq!(quantities.type_1.trips, 2);
        assert_eq!(quantities.type_1.volume_m3, dec("20"));
        assert_eq!(quantities.type_1.tons, dec("30"));
        assert_eq!(quantities.type_2, AggregateTotals::default());
    }

    #[test]
    fn test_cut_product_uses_requested_volume_and_ignores_weight() {
        let mut line = MaterialLine::cut_product("Adoquin".to_string(), dec("7.25"), dec("300"));
        line.real_volume_m3 = Some(dec("99"));
        line.weight_tons = Some(dec("40"));

        let quantities = MaterialQuantities::default().accumulate(&line);

        assert_eq!(quantities.type_3.trips, 1);
        assert_eq!(quantities.type_3.volume_m3, dec("7.25"));
        assert_eq!(quantities.type_1, AggregateTotals::default());
    }

    #[test]
    fn test_missing_quantities_count_as_zero() {
        let line = MaterialLine {
            material: "Tepetate".to_string(),
            material_type: MaterialType::Aggregate2,
            real_volume_m3: None,
            requested_volume_m3: None,
            weight_tons: None,
            computed_cost: Some(dec("100")),
        };

        let quantities = MaterialQuantities::default().accumulate(&line);

        assert_eq!(quantities.type_2.trips, 1);
        assert_eq!(quantities.type_2.volume_m3, dec("0"));
    }

    #[test]
    fn test_rounded_keeps_trip_counts_exact() {
        let quantities = MaterialQuantities {
            type_1: AggregateTotals {
                trips: 7,
                volume_m3: dec("10.005"),
                tons: dec("3.3333"),
            },
            ..Default::default()
        };

        let rounded = quantities.rounded();

        assert_eq!(rounded.type_1.trips, 7);
        assert_eq!(rounded.type_1.volume_m3, dec("10.01"));
        assert_eq!(rounded.type_1.tons, dec("3.33"));
    }
}
