//! Engine configuration

use bigdecimal::BigDecimal;
use serde::{Deserialize, Serialize};
use std::env;
use std::str::FromStr;

use crate::tax::{TaxPolicy, VAT_RATE_PERCENT, WITHHOLDING_RATE_PERCENT};
use crate::types::*;

fn default_vat_rate() -> BigDecimal {
    BigDecimal::from(VAT_RATE_PERCENT)
}

fn default_withholding_rate() -> BigDecimal {
    BigDecimal::from(WITHHOLDING_RATE_PERCENT)
}

/// Rates and validation mode used when generating reconciliations
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReconciliationConfig {
    /// VAT percentage applied to every reconciliation
    #[serde(default = "default_vat_rate")]
    pub vat_rate: BigDecimal,
    /// Withholding percentage applied to material reconciliations
    #[serde(default = "default_withholding_rate")]
    pub withholding_rate: BigDecimal,
    /// Use the strict eligibility validator
    #[serde(default)]
    pub strict_validation: bool,
}

impl Default for ReconciliationConfig {
    fn default() -> Self {
        Self {
            vat_rate: default_vat_rate(),
            withholding_rate: default_withholding_rate(),
            strict_validation: false,
        }
    }
}

fn env_rate(name: &str, default: BigDecimal) -> ReconciliationResult<BigDecimal> {
    match env::var(name) {
        Ok(value) => BigDecimal::from_str(value.trim()).map_err(|e| {
            ReconciliationError::Config(format!("{} is not a valid rate '{}': {}", name, value, e))
        }),
        Err(_) => Ok(default),
    }
}

fn parse_flag(name: &str, value: &str) -> ReconciliationResult<bool> {
    value.trim().parse().map_err(|_| {
        ReconciliationError::Config(format!(
            "{} must be 'true' or 'false', got '{}'",
            name, value
        ))
    })
}

fn env_flag(name: &str) -> ReconciliationResult<bool> {
    match env::var(name) {
        Ok(value) => parse_flag(name, &value),
        Err(_) => Ok(false),
    }
}

impl ReconciliationConfig {
    /// Load from `RECONCILIATION_VAT_RATE`, `RECONCILIATION_WITHHOLDING_RATE`
    /// and `RECONCILIATION_STRICT_VALIDATION`, falling back to the defaults
    pub fn from_env() -> ReconciliationResult<Self> {
        let config = Self {
            vat_rate: env_rate("RECONCILIATION_VAT_RATE", default_vat_rate())?,
            withholding_rate: env_rate(
                "RECONCILIATION_WITHHOLDING_RATE",
                default_withholding_rate(),
            )?,
            strict_validation: env_flag("RECONCILIATION_STRICT_VALIDATION")?,
        };

        config.validate()?;
        Ok(config)
    }

    /// Validate that both rates are percentages between 0 and 100
    pub fn validate(&self) -> ReconciliationResult<()> {
        TaxPolicy::vat_with_withholding(self.vat_rate.clone(), self.withholding_rate.clone())
            .validate()
    }

    /// Tax policy for a voucher kind under this configuration
    pub fn tax_policy(&self, kind: VoucherKind) -> TaxPolicy {
        match kind {
            VoucherKind::Rental => TaxPolicy::vat_only(self.vat_rate.clone()),
            VoucherKind::Material => {
                TaxPolicy::vat_with_withholding(self.vat_rate.clone(), self.withholding_rate.clone())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_matches_kind_policies() {
        let config = ReconciliationConfig::default();

        assert_eq!(
            config.tax_policy(VoucherKind::Rental),
            TaxPolicy::for_kind(VoucherKind::Rental)
        );
        assert_eq!(
            config.tax_policy(VoucherKind::Material),
            TaxPolicy::for_kind(VoucherKind::Material)
        );
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config: ReconciliationConfig =
            serde_json::from_str(r#"{"withholding_rate": "6"}"#).unwrap();

        assert_eq!(config.vat_rate, BigDecimal::from(16));
        assert_eq!(config.withholding_rate, BigDecimal::from(6));
        assert!(!config.strict_validation);
    }

    #[test]
    fn test_strict_flag_parsing() {
        let name = "RECONCILIATION_STRICT_VALIDATION";

        assert!(parse_flag(name, "true").unwrap());
        assert!(!parse_flag(name, " false ").unwrap());

        for bad in ["1", "yes", ""] {
            let error = parse_flag(name, bad).unwrap_err();
            assert_eq!(error.kind(), ErrorKind::Config);
            assert!(error.to_string().contains(name));
        }
    }

    #[test]
    fn test_out_of_range_rate_is_rejected() {
        let config = ReconciliationConfig {
            withholding_rate: BigDecimal::from(150),
            ..Default::default()
        };

        assert_eq!(config.validate().unwrap_err().kind(), ErrorKind::Config);
    }
}
