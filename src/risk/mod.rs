// Exposure limits and per-cycle investment budget
pub mod budget;
pub mod limits;

pub use budget::RiskBudget;
pub use limits::{RiskLimits, RiskRejection};
