//! Material haul reconciliation example

use bigdecimal::BigDecimal;
use chrono::NaiveDate;
use vale_conciliacion::{
    calculate_totals, check_eligibility, group_by_plate, prepare_record, rehydrate, FilterSelection,
    MaterialLine, MaterialType, Reconciliation, VoucherBuilder, Week,
};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("🚛 Vale Conciliacion - Material Statement Example\n");

    let day = NaiveDate::from_ymd_opt(2024, 3, 13).unwrap();
    let week = Week::containing(day);

    let mut vouchers = vec![
        VoucherBuilder::new("M-2001".to_string(), day)
            .plate("XYZ-987".to_string())
            .worksite("obra-centro".to_string(), "constructora-norte".to_string())
            .line(MaterialLine::aggregate(
                "Grava 3/4".to_string(),
                MaterialType::Aggregate1,
                BigDecimal::from(7),
                "10.5".parse()?,
                BigDecimal::from(1750),
            ))
            .line(MaterialLine::aggregate(
                "Arena".to_string(),
                MaterialType::Aggregate2,
                BigDecimal::from(7),
                "9.8".parse()?,
                BigDecimal::from(1400),
            ))
            .build(),
        VoucherBuilder::new("M-2002".to_string(), day)
            .plate("XYZ-987".to_string())
            .worksite("obra-centro".to_string(), "constructora-norte".to_string())
            .line(MaterialLine::cut_product(
                "Adoquin".to_string(),
                "3.25".parse()?,
                "1137.50".parse()?,
            ))
            .build(),
        VoucherBuilder::new("M-2003".to_string(), day)
            .plate("LMN-321".to_string())
            .worksite("obra-centro".to_string(), "constructora-norte".to_string())
            .line(MaterialLine::aggregate(
                "Grava 3/4".to_string(),
                MaterialType::Aggregate1,
                BigDecimal::from(14),
                BigDecimal::from(21),
                BigDecimal::from(3500),
            ))
            .build(),
    ];

    // 1. Eligibility
    let eligibility = check_eligibility(&vouchers);
    println!("✅ Eligible: {}\n", eligibility.valid);

    // 2. Group and total
    let groups = group_by_plate(&vouchers);
    let totals = calculate_totals(&groups);

    println!("📊 By plate:");
    for group in groups.values() {
        let q = &group.quantities;
        println!(
            "  {:<8} type 1: {} trips {} m3 {} t | type 2: {} trips {} m3 {} t | type 3: {} trips {} m3 | ${}",
            group.plate,
            q.type_1.trips,
            q.type_1.volume_m3,
            q.type_1.tons,
            q.type_2.trips,
            q.type_2.volume_m3,
            q.type_2.tons,
            q.type_3.trips,
            q.type_3.volume_m3,
            group.rounded_subtotal()
        );
    }
    println!();
    println!("  Subtotal:         ${}", totals.subtotal);
    println!("  VAT (16%):        ${}", totals.vat);
    if let Some(withholding) = &totals.withholding {
        println!("  Withholding (4%): ${}", withholding);
    }
    println!("  Total:            ${}", totals.total);
    println!();

    // 3. Assemble the record and regenerate it after a price correction
    let filter = FilterSelection::new(week, "obra-centro".to_string());
    let draft = prepare_record(&vouchers, &totals, &filter, Some("sindicato-7"), "residente-1")?;
    let stored = Reconciliation::from_draft(1, draft);

    vouchers[2].line_details[0].computed_cost = Some(BigDecimal::from(3800));
    let document = rehydrate(&stored, &vouchers)?.into_document();

    println!("🔁 Regenerated #{} after re-pricing M-2003:", document.reconciliation.folio);
    println!("  LMN-321 subtotal now: ${}", document.plate_groups["LMN-321"].rounded_subtotal());
    println!("  Billed total kept:    ${}", document.totals.total);

    Ok(())
}
