//! Reconciliation service that drives the engine against external storage

use tracing::{debug, info, instrument, warn};

use crate::aggregation::{calculate_totals_with_policy, group_by_plate, LineDetail};
use crate::config::ReconciliationConfig;
use crate::reconciliation::{prepare_record, rehydrate, ReconciliationDocument};
use crate::traits::*;
use crate::types::*;
use crate::utils::validation::StrictEligibilityValidator;
use crate::utils::week::Week;

/// Generates and regenerates reconciliations over a storage backend
pub struct ReconciliationService<S: ReconciliationStore> {
    storage: S,
    validator: Box<dyn EligibilityValidator>,
    config: ReconciliationConfig,
}

impl<S: ReconciliationStore> ReconciliationService<S> {
    /// Create a service with the default configuration and validator
    pub fn new(storage: S) -> Self {
        Self {
            storage,
            validator: Box::new(DefaultEligibilityValidator),
            config: ReconciliationConfig::default(),
        }
    }

    /// Create a service with a configuration; picks the strict validator
    /// when the configuration asks for it
    pub fn with_config(storage: S, config: ReconciliationConfig) -> ReconciliationResult<Self> {
        config.validate()?;
        let validator: Box<dyn EligibilityValidator> = if config.strict_validation {
            Box::new(StrictEligibilityValidator)
        } else {
            Box::new(DefaultEligibilityValidator)
        };

        Ok(Self {
            storage,
            validator,
            config,
        })
    }

    /// Create a service with a custom validator
    pub fn with_validator(
        storage: S,
        config: ReconciliationConfig,
        validator: Box<dyn EligibilityValidator>,
    ) -> ReconciliationResult<Self> {
        config.validate()?;
        Ok(Self {
            storage,
            validator,
            config,
        })
    }

    pub fn config(&self) -> &ReconciliationConfig {
        &self.config
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    /// Fetch, validate, aggregate, assemble and store a reconciliation
    #[instrument(skip(self, filter), fields(kind = %L::KIND))]
    pub async fn generate<L>(
        &mut self,
        filter: &FilterSelection,
        union_id: Option<&str>,
        requester_id: &str,
    ) -> ReconciliationResult<ReconciliationDocument<L>>
    where
        L: ValidateWith,
        S: VoucherSource<L>,
    {
        let query = VoucherQuery::from_filter(filter, union_id)?;
        let vouchers = <S as VoucherSource<L>>::fetch_vouchers(&self.storage, &query).await?;
        debug!(
            count = vouchers.len(),
            week = %query.week,
            worksite = %query.worksite_id,
            "Fetched vouchers"
        );

        if let Err(e) = L::validate_with(self.validator.as_ref(), &vouchers) {
            warn!(reason = %e.kind(), error = %e, "Voucher set rejected");
            return Err(e);
        }

        let plate_groups = group_by_plate(&vouchers);
        let totals =
            calculate_totals_with_policy(&plate_groups, &self.config.tax_policy(L::KIND));
        let draft = prepare_record(&vouchers, &totals, filter, union_id, requester_id)?;
        let reconciliation = self.storage.save_reconciliation(&draft).await?;

        info!(
            folio = reconciliation.folio,
            plates = plate_groups.len(),
            vouchers = vouchers.len(),
            total = %reconciliation.draft.total,
            "Reconciliation generated"
        );

        Ok(ReconciliationDocument {
            reconciliation,
            plate_groups,
            totals,
        })
    }

    /// Generate a rental reconciliation
    pub async fn generate_rental(
        &mut self,
        filter: &FilterSelection,
        union_id: Option<&str>,
        requester_id: &str,
    ) -> ReconciliationResult<ReconciliationDocument<RentalLine>>
    where
        S: VoucherSource<RentalLine>,
    {
        self.generate::<RentalLine>(filter, union_id, requester_id)
            .await
    }

    /// Generate a material reconciliation
    pub async fn generate_material(
        &mut self,
        filter: &FilterSelection,
        union_id: Option<&str>,
        requester_id: &str,
    ) -> ReconciliationResult<ReconciliationDocument<MaterialLine>>
    where
        S: VoucherSource<MaterialLine>,
    {
        self.generate::<MaterialLine>(filter, union_id, requester_id)
            .await
    }

    /// Reload a stored reconciliation for re-rendering, keeping its stored totals
    #[instrument(skip(self), fields(kind = %L::KIND))]
    pub async fn regenerate<L>(&self, folio: u64) -> ReconciliationResult<ReconciliationDocument<L>>
    where
        L: LineDetail,
        S: VoucherSource<L>,
    {
        let stored = self
            .storage
            .get_reconciliation(folio)
            .await?
            .ok_or(ReconciliationError::NotFound(folio))?;
        let vouchers =
            <S as VoucherSource<L>>::fetch_reconciled_vouchers(&self.storage, folio).await?;

        let document = rehydrate(&stored, &vouchers)?.into_document();
        debug!(
            plates = document.plate_groups.len(),
            vouchers = vouchers.len(),
            "Reconciliation rehydrated"
        );

        Ok(document)
    }

    /// Reload a stored rental reconciliation
    pub async fn regenerate_rental(
        &self,
        folio: u64,
    ) -> ReconciliationResult<ReconciliationDocument<RentalLine>>
    where
        S: VoucherSource<RentalLine>,
    {
        self.regenerate::<RentalLine>(folio).await
    }

    /// Reload a stored material reconciliation
    pub async fn regenerate_material(
        &self,
        folio: u64,
    ) -> ReconciliationResult<ReconciliationDocument<MaterialLine>>
    where
        S: VoucherSource<MaterialLine>,
    {
        self.regenerate::<MaterialLine>(folio).await
    }

    /// List stored reconciliations for a worksite and/or week
    pub async fn list_reconciliations(
        &self,
        worksite_id: Option<&str>,
        week: Option<&Week>,
    ) -> ReconciliationResult<Vec<Reconciliation>> {
        self.storage.list_reconciliations(worksite_id, week).await
    }

    /// Render a document through a formatter
    pub fn render<L, F>(
        &self,
        formatter: &F,
        document: &ReconciliationDocument<L>,
    ) -> ReconciliationResult<Vec<u8>>
    where
        L: LineDetail,
        F: DocumentFormatter<L>,
    {
        let bytes = formatter.format(document)?;
        debug!(
            folio = document.reconciliation.folio,
            content_type = formatter.content_type(),
            size = bytes.len(),
            "Reconciliation rendered"
        );
        Ok(bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::builder::VoucherBuilder;
    use crate::utils::memory_storage::MemoryStorage;
    use bigdecimal::BigDecimal;
    use chrono::NaiveDate;

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 12).unwrap()
    }

    fn seeded_storage() -> MemoryStorage {
        let storage = MemoryStorage::new();
        for folio in ["R-1", "R-2"] {
            storage
                .insert_rental_voucher(
                    VoucherBuilder::new(folio.to_string(), date())
                        .plate("ABC-123".to_string())
                        .worksite("obra-1".to_string(), "empresa-1".to_string())
                        .union("sindicato-1".to_string())
                        .line(RentalLine::daily(
                            "Excavadora".to_string(),
                            BigDecimal::from(1),
                            BigDecimal::from(1000),
                        ))
                        .build(),
                )
                .unwrap();
        }
        storage
    }

    #[tokio::test]
    async fn test_service_generates_and_regenerates() {
        let mut service = ReconciliationService::new(seeded_storage());
        let filter = FilterSelection::new(Week::containing(date()), "obra-1".to_string());

        let document = service
            .generate_rental(&filter, Some("sindicato-1"), "user-1")
            .await
            .unwrap();

        assert_eq!(document.reconciliation.folio, 1);
        assert_eq!(document.totals.total, BigDecimal::from(2320));
        assert_eq!(document.reconciliation.draft.total_days, Some(BigDecimal::from(2)));

        let again = service.regenerate_rental(1).await.unwrap();
        assert_eq!(again.totals, document.totals);
        assert_eq!(again.plate_groups, document.plate_groups);
    }

    #[tokio::test]
    async fn test_service_rejects_incomplete_filter_before_fetching() {
        let mut service = ReconciliationService::new(seeded_storage());
        let filter = FilterSelection::default();

        let error = service
            .generate_rental(&filter, None, "user-1")
            .await
            .unwrap_err();

        assert_eq!(error.kind(), ErrorKind::MissingWeekOrSite);
    }

    #[tokio::test]
    async fn test_service_reports_missing_reconciliation() {
        let service = ReconciliationService::new(MemoryStorage::new());

        let error = service.regenerate_material(42).await.unwrap_err();

        assert_eq!(error.kind(), ErrorKind::NotFound);
    }
}
