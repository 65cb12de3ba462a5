//! Traits for the external collaborators of the engine

use async_trait::async_trait;

use crate::aggregation::LineDetail;
use crate::reconciliation::ReconciliationDocument;
use crate::types::*;
use crate::utils::validation::validate_vouchers;
use crate::utils::week::Week;

/// Source of verified vouchers
///
/// The returned list is taken as the complete eligible set for the query;
/// the engine does not filter it again by date or worksite.
#[async_trait]
pub trait VoucherSource<L: LineDetail>: Send + Sync {
    /// Vouchers of one kind for a week and worksite, optionally one union
    async fn fetch_vouchers(&self, query: &VoucherQuery) -> ReconciliationResult<Vec<Voucher<L>>>;

    /// Vouchers linked to a stored reconciliation
    async fn fetch_reconciled_vouchers(&self, folio: u64) -> ReconciliationResult<Vec<Voucher<L>>>;
}

/// Sink for generated reconciliations
#[async_trait]
pub trait ReconciliationStore: Send + Sync {
    /// Persist a draft with its voucher linkage, assigning a folio
    async fn save_reconciliation(
        &mut self,
        draft: &ReconciliationDraft,
    ) -> ReconciliationResult<Reconciliation>;

    /// Get a reconciliation by folio
    async fn get_reconciliation(&self, folio: u64) -> ReconciliationResult<Option<Reconciliation>>;

    /// List reconciliations, optionally for one worksite and/or week
    async fn list_reconciliations(
        &self,
        worksite_id: Option<&str>,
        week: Option<&Week>,
    ) -> ReconciliationResult<Vec<Reconciliation>>;
}

/// Renders a reconciliation document (PDF, spreadsheet, ...)
pub trait DocumentFormatter<L: LineDetail>: Send + Sync {
    /// MIME type of the produced bytes
    fn content_type(&self) -> &str;

    /// Render the document
    fn format(&self, document: &ReconciliationDocument<L>) -> ReconciliationResult<Vec<u8>>;
}

/// Trait for implementing custom eligibility rules
pub trait EligibilityValidator: Send + Sync {
    /// Validate a rental voucher set before aggregation
    fn validate_rental(&self, vouchers: &[RentalVoucher]) -> ReconciliationResult<()>;

    /// Validate a material voucher set before aggregation
    fn validate_material(&self, vouchers: &[MaterialVoucher]) -> ReconciliationResult<()>;
}

/// Default validator: empty set, missing details and missing cost
pub struct DefaultEligibilityValidator;

impl EligibilityValidator for DefaultEligibilityValidator {
    fn validate_rental(&self, vouchers: &[RentalVoucher]) -> ReconciliationResult<()> {
        validate_vouchers(vouchers)
    }

    fn validate_material(&self, vouchers: &[MaterialVoucher]) -> ReconciliationResult<()> {
        validate_vouchers(vouchers)
    }
}

/// Routes a voucher set to the validator method of its kind
pub trait ValidateWith: LineDetail {
    fn validate_with(
        validator: &dyn EligibilityValidator,
        vouchers: &[Voucher<Self>],
    ) -> ReconciliationResult<()>;
}

impl ValidateWith for RentalLine {
    fn validate_with(
        validator: &dyn EligibilityValidator,
        vouchers: &[Voucher<Self>],
    ) -> ReconciliationResult<()> {
        validator.validate_rental(vouchers)
    }
}

impl ValidateWith for MaterialLine {
    fn validate_with(
        validator: &dyn EligibilityValidator,
        vouchers: &[Voucher<Self>],
    ) -> ReconciliationResult<()> {
        validator.validate_material(vouchers)
    }
}
