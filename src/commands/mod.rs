//! Command layer shared by the CLI.
//!
//! Each command validates its raw input, opens what it needs from
//! `CoreState` and surfaces failures as display strings.

pub mod advice;
pub mod diagnose;
pub mod records;
