//! Tax policies for reconciliation totals

pub mod policy;

pub use policy::*;
