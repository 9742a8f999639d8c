//! Run identity and the per-run context handed to every stage.

mod identity;
mod run;

pub use identity::RunIdentity;
pub use run::RunContext;
