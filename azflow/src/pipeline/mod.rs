//! The streaming pipeline substrate.
//!
//! This module provides:
//! - Stream conventions (`ItemResult`, `ItemStream`, handoff channels)
//! - `OrDone` cancellation-aware reads and `send_or_done` writes
//! - `tee` fan-out and `mux` fan-in
//! - The paginated fetch and dependent fetch stages
//! - Pure filter and tag stages

mod dependents;
mod mux;
mod or_done;
mod paginate;
mod stream;
mod tee;
mod transform;

pub use dependents::{dependents, Identified, ParentErrors};
pub use mux::mux;
pub use or_done::{deliver, send_or_done, Delivery, OrDone};
pub use paginate::{paginate, Page, PageSource};
pub use stream::{channel, from_items, ItemResult, ItemStream, HANDOFF_CAPACITY};
pub use tee::{tee, tee_n};
pub use transform::{filter_map, filter_map_with, tag};
