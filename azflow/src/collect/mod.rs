//! Collection runs: what to list and how the stages are wired.

mod orchestrator;
mod plan;
mod queries;

pub use orchestrator::collect;
pub use plan::CollectionPlan;
pub use queries::QuerySet;
