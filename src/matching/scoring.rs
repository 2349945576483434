use crate::models::enums::MatchKind;
use crate::models::Selection;

use super::helpers::{is_exact_match, is_partial_match, normalize_symptom};
use super::reference::{Disease, MatchingTables};
use super::types::{MatchResult, SymptomMatch};

pub const EXACT_MATCH_POINTS: u32 = 20;
pub const PARTIAL_MATCH_POINTS: u32 = 10;

/// Confidence never claims certainty.
pub const MAX_CONFIDENCE: u8 = 95;

const EXACT_WEIGHT: f64 = 60.0;
const PARTIAL_WEIGHT: f64 = 30.0;
const ORGAN_BONUS_PER_EXTRA_ORGAN: f64 = 10.0;
const ORGAN_BONUS_CAP: f64 = 20.0;
const SMALL_CATALOG_SYMPTOMS: usize = 3;
const LARGE_SELECTION_SYMPTOMS: usize = 5;
const SMALL_CATALOG_PENALTY: f64 = 15.0;
const MULTI_ORGAN_BONUS: f64 = 15.0;

/// Raw match counts for one disease.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MatchCounts {
    pub exact: usize,
    pub partial: usize,
    pub organs: usize,
}

/// Score one disease against the whole selection.
pub fn score_disease<'r>(
    disease: &'r Disease,
    selection: &Selection,
    tables: &MatchingTables,
) -> MatchResult<'r> {
    let canonical: Vec<String> = disease
        .symptoms
        .iter()
        .filter(|s| !s.trim().is_empty())
        .map(|s| normalize_symptom(s))
        .collect();
    let grouped = selection.is_organ_grouped();

    let mut counts = MatchCounts::default();
    let mut score = 0u32;
    let mut matched_organs: Vec<&str> = Vec::new();
    let mut symptom_matches = Vec::new();

    for obs in &selection.observations {
        for symptom in &obs.symptoms {
            let Some(kind) = match_kind(symptom, &canonical, tables) else {
                continue;
            };

            match kind {
                MatchKind::Exact => {
                    counts.exact += 1;
                    score += EXACT_MATCH_POINTS;
                }
                MatchKind::Partial => {
                    counts.partial += 1;
                    score += PARTIAL_MATCH_POINTS;
                }
            }

            if grouped {
                if let Some(organ_id) = obs.organ_id.as_deref() {
                    if !matched_organs.contains(&organ_id) {
                        matched_organs.push(organ_id);
                    }
                }
            }

            symptom_matches.push(SymptomMatch {
                organ_id: obs.organ_id.clone(),
                symptom: symptom.clone(),
                kind,
            });
        }
    }
    counts.organs = matched_organs.len();

    let confidence = compute_confidence(counts, selection.total_symptoms(), disease, tables);

    MatchResult {
        disease,
        score,
        confidence,
        exact_matches: counts.exact,
        partial_matches: counts.partial,
        organ_matches: counts.organs,
        symptom_matches,
    }
}

/// How one selected symptom relates to a disease's normalized canonical symptoms.
///
/// Exact wins over partial; a symptom counts at most once per disease.
pub fn match_kind(symptom: &str, canonical: &[String], tables: &MatchingTables) -> Option<MatchKind> {
    if symptom.trim().is_empty() || canonical.is_empty() {
        return None;
    }
    let selected = normalize_symptom(symptom);

    if canonical.iter().any(|c| is_exact_match(&selected, c)) {
        return Some(MatchKind::Exact);
    }
    if canonical
        .iter()
        .any(|c| is_partial_match(&selected, c, &tables.anatomical_keywords))
    {
        return Some(MatchKind::Partial);
    }
    None
}

/// Convert match counts into a bounded integer confidence.
pub fn compute_confidence(
    counts: MatchCounts,
    total_selected: usize,
    disease: &Disease,
    tables: &MatchingTables,
) -> u8 {
    if total_selected == 0 {
        return 0;
    }
    let total = total_selected as f64;
    let mut confidence = 0.0;

    if counts.exact > 0 {
        confidence += counts.exact as f64 / total * EXACT_WEIGHT;
    }
    if counts.partial > 0 {
        confidence += counts.partial as f64 / total * PARTIAL_WEIGHT;
    }
    if counts.organs > 1 {
        confidence += ORGAN_BONUS_CAP.min((counts.organs - 1) as f64 * ORGAN_BONUS_PER_EXTRA_ORGAN);
    }
    if disease.symptoms.len() < SMALL_CATALOG_SYMPTOMS && total_selected > LARGE_SELECTION_SYMPTOMS {
        confidence = (confidence - SMALL_CATALOG_PENALTY).max(0.0);
    }
    if counts.organs > 1 && tables.is_multi_organ(&disease.id) {
        confidence += MULTI_ORGAN_BONUS;
    }

    confidence.round().clamp(0.0, f64::from(MAX_CONFIDENCE)) as u8
}
