pub mod appraisal;
pub mod comparison;
