//! Utility modules

pub mod builder;
pub mod memory_storage;
pub mod money;
pub mod validation;
pub mod week;

pub use builder::*;
pub use memory_storage::*;
pub use money::*;
pub use validation::*;
pub use week::*;
