//! Symptom-to-disease matching.
//!
//! Takes a `Selection` of organ/symptom observations and the static reference
//! catalog, scores every candidate disease, ranks them and shapes the result
//! into a single operator-facing `Diagnosis`. Pure and synchronous: no I/O
//! after the reference data is loaded.

pub mod engine;
pub mod helpers;
pub mod messages;
pub mod ranking;
pub mod reference;
pub mod scoring;
pub mod types;

pub use engine::DefaultDiagnosticEngine;
pub use reference::{Disease, MatchingTables, Organ, ReferenceData, SymptomCatalog};
pub use types::*;
