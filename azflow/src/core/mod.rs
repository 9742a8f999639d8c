//! Core record types shared by every stage.
//!
//! This module contains:
//! - `EntityKind`, the closed set of record kinds
//! - `Entity`, the sum of every typed payload
//! - `TaggedItem`, the unit merged into the output stream

mod kind;
mod tagged;

pub use kind::EntityKind;
pub use tagged::{Entity, TaggedItem};
