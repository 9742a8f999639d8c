//! Run-wide cancellation and stage task tracking.
//!
//! This module provides:
//! - CancellationToken, the single signal every stage watches
//! - StageTracker for awaiting the shutdown of every spawned stage
//! - cancel_on_interrupt to wire Ctrl-C to a token

mod signal;
mod task_group;
mod token;

pub use signal::cancel_on_interrupt;
pub use task_group::StageTracker;
pub use token::CancellationToken;
