//! Builder for voucher records

use chrono::NaiveDate;

use crate::types::*;

/// Builder pattern for creating vouchers
pub struct VoucherBuilder<L> {
    voucher: Voucher<L>,
}

impl<L> VoucherBuilder<L> {
    /// Start a voucher with a generated id
    pub fn new(folio: String, creation_date: NaiveDate) -> Self {
        Self {
            voucher: Voucher {
                id: uuid::Uuid::new_v4().to_string(),
                folio,
                vehicle_plate: None,
                worksite_id: None,
                company_id: None,
                union_id: None,
                creation_date,
                line_details: Vec::new(),
            },
        }
    }

    /// Use a known id instead of a generated one
    pub fn id(mut self, id: String) -> Self {
        self.voucher.id = id;
        self
    }

    /// Set the vehicle plate
    pub fn plate(mut self, plate: String) -> Self {
        self.voucher.vehicle_plate = Some(plate);
        self
    }

    /// Set the worksite and the company that owns it
    pub fn worksite(mut self, worksite_id: String, company_id: String) -> Self {
        self.voucher.worksite_id = Some(worksite_id);
        self.voucher.company_id = Some(company_id);
        self
    }

    /// Set the operator's union
    pub fn union(mut self, union_id: String) -> Self {
        self.voucher.union_id = Some(union_id);
        self
    }

    /// Add a line detail
    pub fn line(mut self, line: L) -> Self {
        self.voucher.line_details.push(line);
        self
    }

    /// Build the voucher. Eligibility is checked at reconciliation time, not here.
    pub fn build(self) -> Voucher<L> {
        self.voucher
    }
}
