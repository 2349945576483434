use serde::Serialize;
use thiserror::Error;

use crate::models::enums::{MatchKind, Verdict};
use crate::models::{Diagnosis, Selection};

use super::reference::Disease;

// ---------------------------------------------------------------------------
// SymptomMatch
// ---------------------------------------------------------------------------

/// One selected symptom that contributed to a disease's score.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SymptomMatch {
    pub organ_id: Option<String>,
    pub symptom: String,
    pub kind: MatchKind,
}

// ---------------------------------------------------------------------------
// MatchResult
// ---------------------------------------------------------------------------

/// Scoring outcome for one candidate disease. Created fresh per run.
#[derive(Debug, Clone, Serialize)]
pub struct MatchResult<'r> {
    pub disease: &'r Disease,
    pub score: u32,
    /// Integer percentage in 0..=95.
    pub confidence: u8,
    pub exact_matches: usize,
    pub partial_matches: usize,
    /// Distinct organs with at least one match. Always 0 for flat selections.
    pub organ_matches: usize,
    pub symptom_matches: Vec<SymptomMatch>,
}

// ---------------------------------------------------------------------------
// DiagnosticReport
// ---------------------------------------------------------------------------

/// Everything one engine run produces: the verdict, the operator-facing
/// diagnosis and the ranked candidates behind it.
#[derive(Debug, Clone, Serialize)]
pub struct DiagnosticReport<'r> {
    pub verdict: Verdict,
    pub diagnosis: Diagnosis,
    pub candidates: Vec<MatchResult<'r>>,
}

impl DiagnosticReport<'_> {
    pub fn top_candidate(&self) -> Option<&MatchResult<'_>> {
        self.candidates.first()
    }
}

// ---------------------------------------------------------------------------
// ReferenceError
// ---------------------------------------------------------------------------

#[derive(Error, Debug)]
pub enum ReferenceError {
    #[error("Reference data load failed ({0}): {1}")]
    Load(String, String),

    #[error("Reference data parse failed ({0}): {1}")]
    Parse(String, String),
}

// ---------------------------------------------------------------------------
// DiagnosticEngine trait
// ---------------------------------------------------------------------------

/// Symptom-to-disease matching. Implementations hold no state between calls.
pub trait DiagnosticEngine {
    /// Score, rank and shape a diagnosis for one selection.
    fn diagnose(&self, selection: &Selection) -> DiagnosticReport<'_>;

    /// Ranked candidates with non-zero confidence, without the short-circuits.
    fn rank(&self, selection: &Selection) -> Vec<MatchResult<'_>>;
}
