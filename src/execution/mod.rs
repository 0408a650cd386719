// Decision engine and the per-cycle orchestrator
pub mod cycle;
pub mod executor;

pub use cycle::{CycleReport, CycleRunner, OrderMode, TickerOutcome};
pub use executor::{ExecutionAction, ExecutionDecision, Executor, TickerState};
