//! Eligibility checks run before any aggregation

use bigdecimal::BigDecimal;
use serde::{Deserialize, Serialize};

use crate::aggregation::LineDetail;
use crate::traits::*;
use crate::types::*;

/// Whether a line carries a usable cost: present and not exactly zero
pub fn has_cost<L: LineDetail>(line: &L) -> bool {
    line.computed_cost()
        .is_some_and(|cost| *cost != BigDecimal::from(0))
}

/// Validate that a voucher set can be reconciled.
///
/// Fails with `EmptySet` for an empty slice, `MissingDetails` for the first
/// voucher without line details, then `MissingCost` for the first line whose
/// cost is absent or zero. Line numbers in errors start at 1.
pub fn validate_vouchers<L: LineDetail>(vouchers: &[Voucher<L>]) -> ReconciliationResult<()> {
    if vouchers.is_empty() {
        return Err(ReconciliationError::EmptySet);
    }

    if let Some(voucher) = vouchers.iter().find(|v| v.line_details.is_empty()) {
        return Err(ReconciliationError::MissingDetails {
            voucher_id: voucher.id.clone(),
            folio: voucher.folio.clone(),
        });
    }

    for voucher in vouchers {
        if let Some(index) = voucher.line_details.iter().position(|line| !has_cost(line)) {
            return Err(ReconciliationError::MissingCost {
                voucher_id: voucher.id.clone(),
                folio: voucher.folio.clone(),
                line: index + 1,
            });
        }
    }

    Ok(())
}

/// Outcome of an eligibility check in the `{valid, reason}` shape shown to users
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Eligibility {
    pub valid: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<ErrorKind>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl Eligibility {
    pub fn valid() -> Self {
        Self {
            valid: true,
            reason: None,
            message: None,
        }
    }

    pub fn invalid(error: &ReconciliationError) -> Self {
        Self {
            valid: false,
            reason: Some(error.kind()),
            message: Some(error.to_string()),
        }
    }
}

impl From<ReconciliationResult<()>> for Eligibility {
    fn from(result: ReconciliationResult<()>) -> Self {
        match result {
            Ok(()) => Eligibility::valid(),
            Err(error) => Eligibility::invalid(&error),
        }
    }
}

/// Check eligibility without failing
pub fn check_eligibility<L: LineDetail>(vouchers: &[Voucher<L>]) -> Eligibility {
    validate_vouchers(vouchers).into()
}

/// Validate that a folio is printable
pub fn validate_folio(folio: &str) -> ReconciliationResult<()> {
    if folio.trim().is_empty() {
        return Err(ReconciliationError::Validation(
            "Voucher folio cannot be empty".to_string(),
        ));
    }

    if folio.len() > 50 {
        return Err(ReconciliationError::Validation(
            "Voucher folio cannot exceed 50 characters".to_string(),
        ));
    }

    Ok(())
}

/// Validate that no line of the voucher carries a negative cost
pub fn validate_non_negative_costs<L: LineDetail>(voucher: &Voucher<L>) -> ReconciliationResult<()> {
    let zero = BigDecimal::from(0);
    for (index, line) in voucher.line_details.iter().enumerate() {
        if line.computed_cost().is_some_and(|cost| *cost < zero) {
            return Err(ReconciliationError::Validation(format!(
                "Voucher {} line {} has a negative cost",
                voucher.folio,
                index + 1
            )));
        }
    }
    Ok(())
}

/// Validate that the same voucher does not appear twice in a set
pub fn validate_unique_ids<L: LineDetail>(vouchers: &[Voucher<L>]) -> ReconciliationResult<()> {
    let mut seen = std::collections::HashSet::new();
    for voucher in vouchers {
        if !seen.insert(voucher.id.as_str()) {
            return Err(ReconciliationError::Validation(format!(
                "Voucher '{}' appears more than once in the set",
                voucher.id
            )));
        }
    }
    Ok(())
}

fn validate_strict<L: LineDetail>(vouchers: &[Voucher<L>]) -> ReconciliationResult<()> {
    validate_vouchers(vouchers)?;
    validate_unique_ids(vouchers)?;

    for voucher in vouchers {
        validate_folio(&voucher.folio)?;
        validate_non_negative_costs(voucher)?;
    }

    Ok(())
}

/// Strict validator: base rules plus folio, duplicate and negative cost checks
pub struct StrictEligibilityValidator;

impl EligibilityValidator for StrictEligibilityValidator {
    fn validate_rental(&self, vouchers: &[RentalVoucher]) -> ReconciliationResult<()> {
        validate_strict(vouchers)
    }

    fn validate_material(&self, vouchers: &[MaterialVoucher]) -> ReconciliationResult<()> {
        validate_strict(vouchers)?;

        let zero = BigDecimal::from(0);
        for voucher in vouchers {
            for line in &voucher.line_details {
                let negative = [&line.real_volume_m3, &line.requested_volume_m3, &line.weight_tons]
                    .into_iter()
                    .flatten()
                    .any(|quantity| *quantity < zero);
                if negative {
                    return Err(ReconciliationError::Validation(format!(
                        "Voucher {} has a negative volume or weight",
                        voucher.folio
                    )));
                }
            }
        }

        Ok(())
    }
}
