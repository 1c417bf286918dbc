//! Shared types and pure domain logic for the inventory replenishment core.
//!
//! This crate contains the types and calculations shared between the backend
//! services and their tests: stock evaluation, receipt arithmetic, the
//! approval state machine vocabulary, and notification preference resolution.
//! Nothing in here performs I/O.

pub mod ordering;
pub mod prefs;
pub mod stock;
pub mod types;

pub use ordering::*;
pub use prefs::*;
pub use stock::*;
pub use types::*;
