pub mod appraisal;
pub mod comparison;
pub mod error;
pub mod time_value;
pub mod types;

pub use error::CapBudgetError;
pub use types::*;

/// Standard result type for all capital budgeting operations
pub type CapBudgetResult<T> = Result<T, CapBudgetError>;
