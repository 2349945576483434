//! Repository layer: entity-scoped database operations.
//!
//! Plain functions over a borrowed `Connection`, one sub-module per table.

mod diagnostic;
mod pond;

pub use diagnostic::*;
pub use pond::*;
