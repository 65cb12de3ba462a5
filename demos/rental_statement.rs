//! Weekly rental reconciliation example

use bigdecimal::BigDecimal;
use chrono::NaiveDate;
use vale_conciliacion::{
    sorted_by_plate, FilterSelection, MemoryStorage, ReconciliationConfig, ReconciliationService,
    RentalLine, VoucherBuilder, Week,
};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("🚜 Vale Conciliacion - Rental Statement Example\n");

    let monday = NaiveDate::from_ymd_opt(2024, 3, 11).unwrap();
    let week = Week::containing(monday);
    let storage = MemoryStorage::new();

    // 1. Verified vouchers for one worksite
    println!("📋 Loading vouchers for week {}...", week);
    let vouchers = [
        ("R-1001", Some("ABC-123"), RentalLine::daily("Excavadora".to_string(), BigDecimal::from(1), BigDecimal::from(4500))),
        ("R-1002", Some("ABC-123"), RentalLine::daily("Excavadora".to_string(), BigDecimal::from(2), BigDecimal::from(9000))),
        ("R-1003", Some("VOL-777"), RentalLine::hourly("Volteo".to_string(), BigDecimal::from(6), BigDecimal::from(2100)).with_trips(4)),
        ("R-1004", None, RentalLine::hourly("Bomba".to_string(), "2.5".parse()?, "937.50".parse()?)),
    ];

    for (folio, plate, line) in vouchers {
        let builder = match plate {
            Some(plate) => VoucherBuilder::new(folio.to_string(), monday).plate(plate.to_string()),
            None => VoucherBuilder::new(folio.to_string(), monday),
        };
        let voucher = builder
            .worksite("obra-centro".to_string(), "constructora-norte".to_string())
            .union("sindicato-7".to_string())
            .line(line)
            .build();
        println!("  ✓ {} on plate '{}' for ${}", voucher.folio, voucher.plate(), voucher.total_cost());
        storage.insert_rental_voucher(voucher)?;
    }
    println!();

    // 2. Generate the reconciliation
    let mut service = ReconciliationService::with_config(storage, ReconciliationConfig::from_env()?)?;
    let filter = FilterSelection::new(week, "obra-centro".to_string());
    let document = service
        .generate_rental(&filter, Some("sindicato-7"), "residente-1")
        .await?;

    println!("🧾 Reconciliation #{} ({})", document.reconciliation.folio, week);
    for group in sorted_by_plate(&document.plate_groups) {
        println!(
            "  {:<10} vouchers: {}  days: {}  hours: {}  trips: {}  subtotal: ${}",
            group.plate,
            group.voucher_count(),
            group.quantities.days,
            group.quantities.hours,
            group.quantities.trips,
            group.rounded_subtotal()
        );
    }
    println!();
    println!("  Subtotal:  ${}", document.totals.subtotal);
    println!("  VAT (16%): ${}", document.totals.vat);
    println!("  Total:     ${}", document.totals.total);
    println!();

    // 3. Nothing is left to reconcile for the same week
    match service
        .generate_rental(&filter, Some("sindicato-7"), "residente-1")
        .await
    {
        Ok(_) => println!("⚠️  Vouchers were reconciled twice"),
        Err(e) => println!("✅ Second run rejected: {} ({})", e, e.kind()),
    }

    Ok(())
}
