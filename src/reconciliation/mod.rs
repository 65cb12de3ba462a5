//! Reconciliation assembly and the service that persists and reloads it

pub mod assembler;
pub mod service;

pub use assembler::*;
pub use service::*;
