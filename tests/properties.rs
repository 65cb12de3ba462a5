//! Property tests for the aggregation pipeline

use bigdecimal::{BigDecimal, Zero};
use chrono::NaiveDate;
use proptest::prelude::*;
use vale_conciliacion::utils::{has_two_decimals, round2};
use vale_conciliacion::{
    calculate_totals, group_by_plate, total_line_cost, validate_vouchers, MaterialLine,
    MaterialType, MaterialVoucher, RentalLine, RentalVoucher, VoucherBuilder,
};

const PLATES: [&str; 4] = ["ABC-123", "XYZ-987", "ABC-123 ", ""];

fn cents(value: i64) -> BigDecimal {
    BigDecimal::new(value.into(), 2)
}

fn date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 3, 12).unwrap()
}

/// (plate index, line costs in cents)
fn voucher_shapes() -> impl Strategy<Value = Vec<(usize, Vec<i64>)>> {
    prop::collection::vec(
        (0..PLATES.len(), prop::collection::vec(1i64..10_000_000, 1..4)),
        1..12,
    )
}

fn rental_vouchers(shapes: &[(usize, Vec<i64>)]) -> Vec<RentalVoucher> {
    shapes
        .iter()
        .enumerate()
        .map(|(i, (plate, costs))| {
            costs
                .iter()
                .fold(
                    VoucherBuilder::new(format!("R-{}", i), date())
                        .plate(PLATES[*plate].to_string()),
                    |builder, cost| {
                        builder.line(
                            RentalLine::daily("Grua".to_string(), BigDecimal::from(1), cents(*cost))
                                .with_trips(2),
                        )
                    },
                )
                .build()
        })
        .collect()
}

fn material_vouchers(shapes: &[(usize, Vec<i64>)]) -> Vec<MaterialVoucher> {
    shapes
        .iter()
        .enumerate()
        .map(|(i, (plate, costs))| {
            costs
                .iter()
                .enumerate()
                .fold(
                    VoucherBuilder::new(format!("M-{}", i), date())
                        .plate(PLATES[*plate].to_string()),
                    |builder, (j, cost)| {
                        let line = match j % 3 {
                            0 => MaterialLine::aggregate(
                                "Grava".to_string(),
                                MaterialType::Aggregate1,
                                cents(725),
                                cents(1050),
                                cents(*cost),
                            ),
                            1 => MaterialLine::aggregate(
                                "Arena".to_string(),
                                MaterialType::Aggregate2,
                                cents(700),
                                cents(980),
                                cents(*cost),
                            ),
                            _ => MaterialLine::cut_product(
                                "Adoquin".to_string(),
                                cents(333),
                                cents(*cost),
                            ),
                        };
                        builder.line(line)
                    },
                )
                .build()
        })
        .collect()
}

proptest! {
    /// Any non-empty set with priced lines passes validation.
    #[test]
    fn priced_sets_are_eligible(shapes in voucher_shapes()) {
        prop_assert!(validate_vouchers(&rental_vouchers(&shapes)).is_ok());
        prop_assert!(validate_vouchers(&material_vouchers(&shapes)).is_ok());
    }

    /// Grouping neither loses nor duplicates cost or vouchers.
    #[test]
    fn grouping_conserves_cost(shapes in voucher_shapes()) {
        let vouchers = material_vouchers(&shapes);
        let groups = group_by_plate(&vouchers);

        let grouped = groups
            .values()
            .fold(BigDecimal::zero(), |sum, group| sum + &group.subtotal);
        let voucher_count: usize = groups.values().map(|g| g.voucher_count()).sum();

        prop_assert_eq!(grouped, total_line_cost(&vouchers));
        prop_assert_eq!(voucher_count, vouchers.len());
    }

    /// The same input always yields the same totals.
    #[test]
    fn totals_are_deterministic(shapes in voucher_shapes()) {
        let vouchers = rental_vouchers(&shapes);
        prop_assert_eq!(
            calculate_totals(&group_by_plate(&vouchers)),
            calculate_totals(&group_by_plate(&vouchers))
        );
    }

    /// Rental totals carry no withholding and satisfy total = subtotal + vat.
    #[test]
    fn rental_totals_law(shapes in voucher_shapes()) {
        let vouchers = rental_vouchers(&shapes);
        let totals = calculate_totals(&group_by_plate(&vouchers));

        prop_assert!(totals.withholding.is_none());
        prop_assert!(has_two_decimals(&totals.subtotal));
        prop_assert!(has_two_decimals(&totals.vat));
        prop_assert!(has_two_decimals(&totals.total));
        prop_assert_eq!(&totals.total, &(&totals.subtotal + &totals.vat));
        prop_assert_eq!(totals.quantities.trips, 2 * shapes.iter().map(|(_, c)| c.len() as u64).sum::<u64>());
    }

    /// Material totals satisfy total = subtotal + vat - withholding at 16% and 4%.
    #[test]
    fn material_totals_law(shapes in voucher_shapes()) {
        let vouchers = material_vouchers(&shapes);
        let totals = calculate_totals(&group_by_plate(&vouchers));
        let withholding = totals.withholding.clone().unwrap_or_default();

        prop_assert!(totals.withholding.is_some());
        prop_assert!(has_two_decimals(&withholding));
        prop_assert_eq!(&totals.total, &(&totals.subtotal + &totals.vat - &withholding));

        let subtotal = total_line_cost(&vouchers);
        prop_assert_eq!(&totals.vat, &round2(&(&subtotal * BigDecimal::from(16) / BigDecimal::from(100))));
        prop_assert_eq!(&withholding, &round2(&(&subtotal * BigDecimal::from(4) / BigDecimal::from(100))));
        prop_assert_eq!(
            totals.quantities.total_trips(),
            shapes.iter().map(|(_, c)| c.len() as u64).sum::<u64>()
        );
    }
}
