//! Core types and data structures for the reconciliation engine

use bigdecimal::BigDecimal;
use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::aggregation::LineDetail;
use crate::utils::week::Week;

/// Group key used for vouchers that were captured without a vehicle plate
pub const NO_PLATE: &str = "NO PLATE";

/// The two kinds of voucher the back-office reconciles
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VoucherKind {
    /// Equipment rental, billed by day or by hour
    Rental,
    /// Material haul, billed per load
    Material,
}

impl VoucherKind {
    /// Stable lowercase name, as stored on reconciliation records
    pub fn as_str(&self) -> &'static str {
        match self {
            VoucherKind::Rental => "rental",
            VoucherKind::Material => "material",
        }
    }
}

impl fmt::Display for VoucherKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Material category of a haul line.
///
/// Decides which physical quantity is authoritative: aggregates are measured
/// (real volume and weight), cut product is billed on requested volume only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum MaterialType {
    /// Quarried aggregate, first sub-category (type id 1)
    Aggregate1,
    /// Quarried aggregate, second sub-category (type id 2)
    Aggregate2,
    /// Cut or finished product (type id 3)
    CutProduct,
}

impl MaterialType {
    /// Numeric id used by the voucher source
    pub fn id(&self) -> u8 {
        match self {
            MaterialType::Aggregate1 => 1,
            MaterialType::Aggregate2 => 2,
            MaterialType::CutProduct => 3,
        }
    }

    /// Whether tonnage is tracked for this category
    pub fn tracks_weight(&self) -> bool {
        match self {
            MaterialType::Aggregate1 | MaterialType::Aggregate2 => true,
            MaterialType::CutProduct => false,
        }
    }
}

impl TryFrom<u8> for MaterialType {
    type Error = ReconciliationError;

    fn try_from(id: u8) -> Result<Self, Self::Error> {
        match id {
            1 => Ok(MaterialType::Aggregate1),
            2 => Ok(MaterialType::Aggregate2),
            3 => Ok(MaterialType::CutProduct),
            other => Err(ReconciliationError::UnknownMaterialType(other)),
        }
    }
}

impl From<MaterialType> for u8 {
    fn from(material_type: MaterialType) -> Self {
        material_type.id()
    }
}

/// Line detail of an equipment rental voucher
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RentalLine {
    /// Equipment or service description
    pub material: String,
    /// Trips logged on this line (rental lines may carry several)
    #[serde(default)]
    pub number_of_trips: u32,
    /// Days billed
    #[serde(default)]
    pub total_days: BigDecimal,
    /// Hours billed
    #[serde(default)]
    pub total_hours: BigDecimal,
    /// Priced cost of the line, filled in by the upstream pricing step
    pub computed_cost: Option<BigDecimal>,
    /// True when the equipment is rented by the day rather than by the hour
    #[serde(default)]
    pub is_daily_rental: bool,
}

impl RentalLine {
    /// Create a line billed by the day
    pub fn daily(material: String, total_days: BigDecimal, computed_cost: BigDecimal) -> Self {
        Self {
            material,
            number_of_trips: 0,
            total_days,
            total_hours: BigDecimal::from(0),
            computed_cost: Some(computed_cost),
            is_daily_rental: true,
        }
    }

    /// Create a line billed by the hour
    pub fn hourly(material: String, total_hours: BigDecimal, computed_cost: BigDecimal) -> Self {
        Self {
            material,
            number_of_trips: 0,
            total_days: BigDecimal::from(0),
            total_hours,
            computed_cost: Some(computed_cost),
            is_daily_rental: false,
        }
    }

    /// Set the number of trips logged on the line
    pub fn with_trips(mut self, number_of_trips: u32) -> Self {
        self.number_of_trips = number_of_trips;
        self
    }
}

/// Line detail of a material haul voucher
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MaterialLine {
    /// Material description
    pub material: String,
    /// Category id (1, 2 or 3 on the wire)
    #[serde(rename = "material_type_id")]
    pub material_type: MaterialType,
    /// Measured volume in cubic metres
    pub real_volume_m3: Option<BigDecimal>,
    /// Volume requested on the order, in cubic metres
    pub requested_volume_m3: Option<BigDecimal>,
    /// Weighed tonnage
    pub weight_tons: Option<BigDecimal>,
    /// Priced cost of the line, filled in by the upstream pricing step
    pub computed_cost: Option<BigDecimal>,
}

impl MaterialLine {
    /// Create a measured aggregate load (type 1 or 2)
    pub fn aggregate(
        material: String,
        material_type: MaterialType,
        real_volume_m3: BigDecimal,
        weight_tons: BigDecimal,
        computed_cost: BigDecimal,
    ) -> Self {
        Self {
            material,
            material_type,
            real_volume_m3: Some(real_volume_m3),
            requested_volume_m3: None,
            weight_tons: Some(weight_tons),
            computed_cost: Some(computed_cost),
        }
    }

    /// Create a cut product load (type 3), billed on requested volume
    pub fn cut_product(
        material: String,
        requested_volume_m3: BigDecimal,
        computed_cost: BigDecimal,
    ) -> Self {
        Self {
            material,
            material_type: MaterialType::CutProduct,
            real_volume_m3: None,
            requested_volume_m3: Some(requested_volume_m3),
            weight_tons: None,
            computed_cost: Some(computed_cost),
        }
    }
}

/// A verified voucher; the line type fixes its kind
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Voucher<L> {
    /// Unique identifier of the voucher
    pub id: String,
    /// Printed folio
    pub folio: String,
    /// Plate of the hauling or rented vehicle, free text
    pub vehicle_plate: Option<String>,
    /// Worksite the voucher was issued for
    pub worksite_id: Option<String>,
    /// Company owning the worksite
    pub company_id: Option<String>,
    /// Union the operator belongs to
    pub union_id: Option<String>,
    /// Date the voucher was created
    pub creation_date: NaiveDate,
    /// Priced line details
    #[serde(default = "Vec::new")]
    pub line_details: Vec<L>,
}

impl<L: LineDetail> Voucher<L> {
    /// Kind of the voucher, fixed by its line type
    pub fn kind(&self) -> VoucherKind {
        L::KIND
    }

    /// Grouping key: the plate exactly as stored, or [`NO_PLATE`] when absent
    pub fn plate(&self) -> &str {
        self.vehicle_plate.as_deref().unwrap_or(NO_PLATE)
    }

    /// Sum of the priced line costs; unpriced lines contribute nothing
    pub fn total_cost(&self) -> BigDecimal {
        self.line_details
            .iter()
            .filter_map(|line| line.computed_cost())
            .sum()
    }
}

/// Rental voucher
pub type RentalVoucher = Voucher<RentalLine>;

/// Material haul voucher
pub type MaterialVoucher = Voucher<MaterialLine>;

/// Filter selection made on the reconciliation screen
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FilterSelection {
    /// Selected week
    pub week: Option<Week>,
    /// Selected worksite
    pub worksite_id: Option<String>,
    /// Union picked explicitly (administrators only)
    pub union_id: Option<String>,
}

impl FilterSelection {
    /// Create a selection for a week and worksite
    pub fn new(week: Week, worksite_id: String) -> Self {
        Self {
            week: Some(week),
            worksite_id: Some(worksite_id),
            union_id: None,
        }
    }

    /// Pin the selection to a union
    pub fn with_union(mut self, union_id: String) -> Self {
        self.union_id = Some(union_id);
        self
    }

    /// Selected week and worksite, when both are resolved
    pub fn resolved(&self) -> ReconciliationResult<(Week, &str)> {
        let worksite_id = self
            .worksite_id
            .as_deref()
            .map(str::trim)
            .filter(|id| !id.is_empty());

        match (self.week, worksite_id) {
            (Some(week), Some(worksite_id)) => Ok((week, worksite_id)),
            _ => Err(ReconciliationError::MissingWeekOrSite),
        }
    }
}

/// Query handed to the voucher source
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VoucherQuery {
    pub week: Week,
    pub worksite_id: String,
    pub union_id: Option<String>,
}

impl VoucherQuery {
    /// Build the query from a filter selection and the caller's own union
    pub fn from_filter(
        filter: &FilterSelection,
        own_union_id: Option<&str>,
    ) -> ReconciliationResult<Self> {
        let (week, worksite_id) = filter.resolved()?;
        Ok(Self {
            week,
            worksite_id: worksite_id.to_string(),
            union_id: effective_union(filter, own_union_id),
        })
    }
}

/// The union an administrator selected wins over the caller's own union
pub(crate) fn effective_union(filter: &FilterSelection, own_union_id: Option<&str>) -> Option<String> {
    filter
        .union_id
        .clone()
        .or_else(|| own_union_id.map(str::to_string))
}

/// Lifecycle status of a reconciliation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReconciliationStatus {
    Generated,
}

/// Reconciliation record ready to be persisted
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReconciliationDraft {
    pub kind: VoucherKind,
    pub worksite_id: String,
    pub union_id: Option<String>,
    pub company_id: Option<String>,
    pub week: Week,
    pub subtotal: BigDecimal,
    pub vat: BigDecimal,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub withholding: Option<BigDecimal>,
    pub total: BigDecimal,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_days: Option<BigDecimal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_hours: Option<BigDecimal>,
    /// User who requested the reconciliation
    pub generated_by: String,
    pub status: ReconciliationStatus,
    /// Vouchers linked to this reconciliation
    pub voucher_ids: Vec<String>,
}

/// Persisted reconciliation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reconciliation {
    /// Folio assigned by persistence
    pub folio: u64,
    #[serde(flatten)]
    pub draft: ReconciliationDraft,
    /// When the record was stored
    pub generated_at: NaiveDateTime,
}

impl Reconciliation {
    /// Attach the persistence-assigned folio and timestamp to a draft
    pub fn from_draft(folio: u64, draft: ReconciliationDraft) -> Self {
        Self {
            folio,
            draft,
            generated_at: chrono::Utc::now().naive_utc(),
        }
    }

    pub fn kind(&self) -> VoucherKind {
        self.draft.kind
    }
}

/// Machine-readable error kind, surfaced alongside the message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorKind {
    EmptySet,
    MissingDetails,
    MissingCost,
    MissingWeekOrSite,
    KindMismatch,
    UnknownMaterialType,
    NotFound,
    Storage,
    Config,
    Formatter,
    Validation,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::EmptySet => "EmptySet",
            ErrorKind::MissingDetails => "MissingDetails",
            ErrorKind::MissingCost => "MissingCost",
            ErrorKind::MissingWeekOrSite => "MissingWeekOrSite",
            ErrorKind::KindMismatch => "KindMismatch",
            ErrorKind::UnknownMaterialType => "UnknownMaterialType",
            ErrorKind::NotFound => "NotFound",
            ErrorKind::Storage => "Storage",
            ErrorKind::Config => "Config",
            ErrorKind::Formatter => "Formatter",
            ErrorKind::Validation => "Validation",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors that can occur while reconciling vouchers
#[derive(Debug, thiserror::Error)]
pub enum ReconciliationError {
    #[error("No vouchers to reconcile for the selected filters")]
    EmptySet,
    #[error("Voucher {folio} ({voucher_id}) has no line details, cannot reconcile, contact support")]
    MissingDetails { voucher_id: String, folio: String },
    #[error("Voucher {folio} ({voucher_id}) line {line} has no computed cost")]
    MissingCost {
        voucher_id: String,
        folio: String,
        line: usize,
    },
    #[error("Select a week and a worksite before generating the reconciliation")]
    MissingWeekOrSite,
    #[error("Expected a {expected} reconciliation, found {found}")]
    KindMismatch {
        expected: VoucherKind,
        found: VoucherKind,
    },
    #[error("Unknown material type id: {0}")]
    UnknownMaterialType(u8),
    #[error("Reconciliation not found: {0}")]
    NotFound(u64),
    #[error("Storage error: {0}")]
    Storage(String),
    #[error("Configuration error: {0}")]
    Config(String),
    #[error("Formatter error: {0}")]
    Formatter(String),
    #[error("Validation error: {0}")]
    Validation(String),
}

impl ReconciliationError {
    /// Machine-readable kind of the error
    pub fn kind(&self) -> ErrorKind {
        match self {
            ReconciliationError::EmptySet => ErrorKind::EmptySet,
            ReconciliationError::MissingDetails { .. } => ErrorKind::MissingDetails,
            ReconciliationError::MissingCost { .. } => ErrorKind::MissingCost,
            ReconciliationError::MissingWeekOrSite => ErrorKind::MissingWeekOrSite,
            ReconciliationError::KindMismatch { .. } => ErrorKind::KindMismatch,
            ReconciliationError::UnknownMaterialType(_) => ErrorKind::UnknownMaterialType,
            ReconciliationError::NotFound(_) => ErrorKind::NotFound,
            ReconciliationError::Storage(_) => ErrorKind::Storage,
            ReconciliationError::Config(_) => ErrorKind::Config,
            ReconciliationError::Formatter(_) => ErrorKind::Formatter,
            ReconciliationError::Validation(_) => ErrorKind::Validation,
        }
    }

    /// Whether the user can fix the problem by changing the filter selection
    pub fn is_user_correctable(&self) -> bool {
        matches!(
            self,
            ReconciliationError::EmptySet | ReconciliationError::MissingWeekOrSite
        )
    }
}

/// Result type for reconciliation operations
pub type ReconciliationResult<T> = Result<T, ReconciliationError>;
