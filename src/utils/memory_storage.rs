//! In-memory storage implementation for testing

use async_trait::async_trait;
use std::collections::{BTreeMap, HashSet};
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::aggregation::LineDetail;
use crate::traits::*;
use crate::types::*;
use crate::utils::week::Week;

/// In-memory voucher source and reconciliation store for testing and development
#[derive(Debug, Clone)]
pub struct MemoryStorage {
    rental_vouchers: Arc<RwLock<Vec<RentalVoucher>>>,
    material_vouchers: Arc<RwLock<Vec<MaterialVoucher>>>,
    reconciliations: Arc<RwLock<BTreeMap<u64, Reconciliation>>>,
}

fn read<T>(lock: &RwLock<T>) -> ReconciliationResult<RwLockReadGuard<'_, T>> {
    lock.read()
        .map_err(|_| ReconciliationError::Storage("storage lock poisoned".to_string()))
}

fn write<T>(lock: &RwLock<T>) -> ReconciliationResult<RwLockWriteGuard<'_, T>> {
    lock.write()
        .map_err(|_| ReconciliationError::Storage("storage lock poisoned".to_string()))
}

impl MemoryStorage {
    /// Create a new memory storage instance
    pub fn new() -> Self {
        Self {
            rental_vouchers: Arc::new(RwLock::new(Vec::new())),
            material_vouchers: Arc::new(RwLock::new(Vec::new())),
            reconciliations: Arc::new(RwLock::new(BTreeMap::new())),
        }
    }

    /// Add a verified rental voucher
    pub fn insert_rental_voucher(&self, voucher: RentalVoucher) -> ReconciliationResult<()> {
        write(&self.rental_vouchers)?.push(voucher);
        Ok(())
    }

    /// Add a verified material voucher
    pub fn insert_material_voucher(&self, voucher: MaterialVoucher) -> ReconciliationResult<()> {
        write(&self.material_vouchers)?.push(voucher);
        Ok(())
    }

    /// Replace a stored voucher, as an upstream correction would
    pub fn replace_material_voucher(&self, voucher: MaterialVoucher) -> ReconciliationResult<()> {
        let mut vouchers = write(&self.material_vouchers)?;
        match vouchers.iter_mut().find(|v| v.id == voucher.id) {
            Some(existing) => {
                *existing = voucher;
                Ok(())
            }
            None => Err(ReconciliationError::Storage(format!(
                "Voucher not found: {}",
                voucher.id
            ))),
        }
    }

    /// Clear all data (useful for testing)
    pub fn clear(&self) -> ReconciliationResult<()> {
        write(&self.rental_vouchers)?.clear();
        write(&self.material_vouchers)?.clear();
        write(&self.reconciliations)?.clear();
        Ok(())
    }

    fn linked_ids(&self, kind: VoucherKind) -> ReconciliationResult<HashSet<String>> {
        Ok(read(&self.reconciliations)?
            .values()
            .filter(|r| r.kind() == kind)
            .flat_map(|r| r.draft.voucher_ids.iter().cloned())
            .collect())
    }

    fn select<L: LineDetail>(
        &self,
        vouchers: &[Voucher<L>],
        query: &VoucherQuery,
    ) -> ReconciliationResult<Vec<Voucher<L>>> {
        let linked = self.linked_ids(L::KIND)?;
        Ok(vouchers
            .iter()
            .filter(|v| query.week.contains(v.creation_date))
            .filter(|v| v.worksite_id.as_deref() == Some(query.worksite_id.as_str()))
            .filter(|v| {
                query
                    .union_id
                    .as_deref()
                    .is_none_or(|union_id| v.union_id.as_deref() == Some(union_id))
            })
            .filter(|v| !linked.contains(&v.id))
            .cloned()
            .collect())
    }

    fn linked<L: LineDetail>(
        &self,
        vouchers: &[Voucher<L>],
        folio: u64,
    ) -> ReconciliationResult<Vec<Voucher<L>>> {
        let reconciliations = read(&self.reconciliations)?;
        let reconciliation = reconciliations
            .get(&folio)
            .ok_or(ReconciliationError::NotFound(folio))?;

        // keep the linkage order recorded at generation time
        reconciliation
            .draft
            .voucher_ids
            .iter()
            .map(|id| {
                vouchers.iter().find(|v| &v.id == id).cloned().ok_or_else(|| {
                    ReconciliationError::Storage(format!(
                        "Voucher {} linked to reconciliation {} is missing",
                        id, folio
                    ))
                })
            })
            .collect()
    }
}

impl Default for MemoryStorage {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl VoucherSource<RentalLine> for MemoryStorage {
    async fn fetch_vouchers(&self, query: &VoucherQuery) -> ReconciliationResult<Vec<RentalVoucher>> {
        let vouchers = read(&self.rental_vouchers)?;
        self.select(&vouchers, query)
    }

    async fn fetch_reconciled_vouchers(&self, folio: u64) -> ReconciliationResult<Vec<RentalVoucher>> {
        let vouchers = read(&self.rental_vouchers)?;
        self.linked(&vouchers, folio)
    }
}

#[async_trait]
impl VoucherSource<MaterialLine> for MemoryStorage {
    async fn fetch_vouchers(
        &self,
        query: &VoucherQuery,
    ) -> ReconciliationResult<Vec<MaterialVoucher>> {
        let vouchers = read(&self.material_vouchers)?;
        self.select(&vouchers, query)
    }

    async fn fetch_reconciled_vouchers(
        &self,
        folio: u64,
    ) -> ReconciliationResult<Vec<MaterialVoucher>> {
        let vouchers = read(&self.material_vouchers)?;
        self.linked(&vouchers, folio)
    }
}

#[async_trait]
impl ReconciliationStore for MemoryStorage {
    async fn save_reconciliation(
        &mut self,
        draft: &ReconciliationDraft,
    ) -> ReconciliationResult<Reconciliation> {
        let mut reconciliations = write(&self.reconciliations)?;
        let folio = reconciliations.keys().next_back().map_or(1, |last| last + 1);
        let reconciliation = Reconciliation::from_draft(folio, draft.clone());
        reconciliations.insert(folio, reconciliation.clone());
        Ok(reconciliation)
    }

    async fn get_reconciliation(&self, folio: u64) -> ReconciliationResult<Option<Reconciliation>> {
        Ok(read(&self.reconciliations)?.get(&folio).cloned())
    }

    async fn list_reconciliations(
        &self,
        worksite_id: Option<&str>,
        week: Option<&Week>,
    ) -> ReconciliationResult<Vec<Reconciliation>> {
        Ok(read(&self.reconciliations)?
            .values()
            .filter(|r| worksite_id.is_none_or(|id| r.draft.worksite_id == id))
            .filter(|r| week.is_none_or(|week| &r.draft.week == week))
            .cloned()
            .collect())
    }
}
