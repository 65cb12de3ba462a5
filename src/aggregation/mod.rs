//! Aggregation pipeline: plate grouping and grand totals
//!
//! One pipeline serves both voucher kinds. The kind-specific parts are the
//! [`CategoryAccumulator`] selected by the line type and the [`TaxPolicy`]
//! used for the totals.
//!
//! [`TaxPolicy`]: crate::tax::TaxPolicy

pub mod accumulators;
pub mod grouping;
pub mod totals;

pub use accumulators::*;
pub use grouping::*;
pub use totals::*;
