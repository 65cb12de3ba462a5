//! Tax policies applied to a reconciliation subtotal
//!
//! Rental reconciliations carry VAT only; material reconciliations carry VAT
//! and a withholding that is subtracted from the total.

use bigdecimal::BigDecimal;
use serde::{Deserialize, Serialize};

use crate::types::*;
use crate::utils::money::{percent_of, round2};

/// Standard VAT rate in percent
pub const VAT_RATE_PERCENT: u32 = 16;

/// Withholding rate applied to material reconciliations, in percent
pub const WITHHOLDING_RATE_PERCENT: u32 = 4;

/// Rates applied to a subtotal
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaxPolicy {
    /// VAT rate percentage (e.g. 16 for 16%)
    pub vat_rate: BigDecimal,
    /// Withholding rate percentage; `None` means the policy has no withholding
    pub withholding_rate: Option<BigDecimal>,
}

impl TaxPolicy {
    /// VAT only
    pub fn vat_only(vat_rate: BigDecimal) -> Self {
        Self {
            vat_rate,
            withholding_rate: None,
        }
    }

    /// VAT plus a withholding subtracted from the total
    pub fn vat_with_withholding(vat_rate: BigDecimal, withholding_rate: BigDecimal) -> Self {
        Self {
            vat_rate,
            withholding_rate: Some(withholding_rate),
        }
    }

    /// Default policy for a voucher kind
    pub fn for_kind(kind: VoucherKind) -> Self {
        match kind {
            VoucherKind::Rental => Self::vat_only(BigDecimal::from(VAT_RATE_PERCENT)),
            VoucherKind::Material => Self::vat_with_withholding(
                BigDecimal::from(VAT_RATE_PERCENT),
                BigDecimal::from(WITHHOLDING_RATE_PERCENT),
            ),
        }
    }

    /// Validate that every rate is a percentage between 0 and 100
    pub fn validate(&self) -> ReconciliationResult<()> {
        let zero = BigDecimal::from(0);
        let hundred = BigDecimal::from(100);

        if self.vat_rate < zero || self.vat_rate > hundred {
            return Err(ReconciliationError::Config(format!(
                "VAT rate must be between 0 and 100, got {}",
                self.vat_rate
            )));
        }

        if let Some(rate) = &self.withholding_rate {
            if *rate < zero || *rate > hundred {
                return Err(ReconciliationError::Config(format!(
                    "Withholding rate must be between 0 and 100, got {}",
                    rate
                )));
            }
        }

        Ok(())
    }

    /// Apply the policy to a full-precision subtotal
    pub fn apply(&self, subtotal: &BigDecimal) -> TaxBreakdown {
        TaxBreakdown::calculate(subtotal, self)
    }
}

/// Money figures of a reconciliation, rounded to two decimals
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaxBreakdown {
    pub subtotal: BigDecimal,
    pub vat: BigDecimal,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub withholding: Option<BigDecimal>,
    pub total: BigDecimal,
}

impl TaxBreakdown {
    /// Taxes are computed on the unrounded subtotal; the total is assembled
    /// from the rounded figures so that it always matches what is printed.
    pub fn calculate(subtotal: &BigDecimal, policy: &TaxPolicy) -> Self {
        let vat = round2(&percent_of(subtotal, &policy.vat_rate));
        let withholding = policy
            .withholding_rate
            .as_ref()
            .map(|rate| round2(&percent_of(subtotal, rate)));
        let subtotal = round2(subtotal);

        let gross = &subtotal + &vat;
        let total = match &withholding {
            Some(withholding) => round2(&(gross - withholding)),
            None => round2(&gross),
        };

        Self {
            subtotal,
            vat,
            withholding,
            total,
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
    fn test_rental_policy_is_vat_only() {
        let breakdown = TaxPolicy::for_kind(VoucherKind::Rental).apply(&BigDecimal::from(2000));

        assert_eq!(breakdown.subtotal, BigDecimal::from(2000));
        assert_eq!(breakdown.vat, BigDecimal::from(320));
        assert_eq!(breakdown.withholding, None);
        assert_eq!(breakdown.total, BigDecimal::from(2320));
    }

    #[test]
    fn test_material_policy_subtracts_withholding() {
        let breakdown = TaxPolicy::for_kind(VoucherKind::Material).apply(&BigDecimal::from(1000));

        assert_eq!(breakdown.vat, BigDecimal::from(160));
        assert_eq!(breakdown.withholding, Some(BigDecimal::from(40)));
        assert_eq!(breakdown.total, BigDecimal::from(1120));
    }

    #[test]
    fn test_taxes_use_unrounded_subtotal() {
        // 0.125 * 16% = 0.02 ; the rounded subtotal alone would give 0.13 * 16% = 0.0208
        let breakdown = TaxPolicy::for_kind(VoucherKind::Rental).apply(&dec("0.125"));

        assert_eq!(breakdown.subtotal, dec("0.13"));
        assert_eq!(breakdown.vat, dec("0.02"));
        assert_eq!(breakdown.total, dec("0.15"));
    }

    #[test]
    fn test_validate_rejects_out_of_range_rates() {
        assert!(TaxPolicy::for_kind(VoucherKind::Material).validate().is_ok());
        assert!(TaxPolicy::vat_only(BigDecimal::from(-1)).validate().is_err());
        assert!(
            TaxPolicy::vat_with_withholding(BigDecimal::from(16), BigDecimal::from(101))
                .validate()
                .is_err()
        );
    }
}
