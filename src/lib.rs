//! # Vale Conciliacion
//!
//! Reconciliation engine for construction-logistics vouchers ("vales"):
//! verified rental and material-haul vouchers are grouped by vehicle plate,
//! totalled under the tax policy of their kind and assembled into a billable
//! reconciliation ("conciliación") per worksite, union and week.
//!
//! ## Features
//!
//! - **Eligibility validation**: empty sets, vouchers without line details and
//!   unpriced lines are rejected before anything is aggregated
//! - **Plate grouping**: per-plate running sums, split by material type for hauls
//! - **Totals**: 16% VAT, plus 4% withholding on material reconciliations,
//!   rounded to two decimals only at the boundary
//! - **Assembly**: persistable reconciliation drafts, and regeneration of stored
//!   reconciliations that keeps their billed totals
//! - **Storage abstraction**: async traits for the voucher source and the
//!   reconciliation store, with an in-memory implementation
//!
//! ## Quick Start
//!
//! ```rust
//! use vale_conciliacion::{calculate_totals, group_by_plate, validate_vouchers, RentalLine, VoucherBuilder};
//! use bigdecimal::BigDecimal;
//! use chrono::NaiveDate;
//!
//! let voucher = VoucherBuilder::new("R-1".to_string(), NaiveDate::from_ymd_opt(2024, 3, 12).unwrap())
//!     .plate("ABC-123".to_string())
//!     .line(RentalLine::daily("Excavadora".to_string(), BigDecimal::from(1), BigDecimal::from(1000)))
//!     .build();
//!
//! let vouchers = vec![voucher];
//! validate_vouchers(&vouchers).unwrap();
//! let totals = calculate_totals(&group_by_plate(&vouchers));
//! assert_eq!(totals.total, BigDecimal::from(1160));
//! ```

pub mod aggregation;
pub mod config;
pub mod reconciliation;
pub mod tax;
pub mod traits;
pub mod types;
pub mod utils;

// Re-export commonly used types
pub use aggregation::*;
pub use config::*;
pub use reconciliation::*;
pub use tax::*;
pub use traits::*;
pub use types::*;
pub use utils::{
    check_eligibility, validate_vouchers, Eligibility, MemoryStorage, StrictEligibilityValidator,
    VoucherBuilder, Week,
};
