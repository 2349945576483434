use std::cmp::Ordering;

use crate::models::enums::Verdict;
use crate::models::{Diagnosis, Selection};

use super::messages::MessageTemplates;
use super::reference::ReferenceData;
use super::types::MatchResult;

/// Below this top confidence, several candidates are reported together.
pub const LOW_CONFIDENCE_THRESHOLD: u8 = 30;

/// Candidates named in a low-confidence headline.
const MAX_POSSIBLE_DISEASES: usize = 3;

/// Drop zero-confidence results and order the rest best first.
///
/// The sort is stable: full ties keep catalog order.
pub fn rank_candidates(results: Vec<MatchResult<'_>>) -> Vec<MatchResult<'_>> {
    let mut ranked: Vec<MatchResult<'_>> = results.into_iter().filter(|r| r.confidence > 0).collect();
    ranked.sort_by(compare_results);
    ranked
}

fn compare_results(a: &MatchResult<'_>, b: &MatchResult<'_>) -> Ordering {
    b.confidence
        .cmp(&a.confidence)
        .then_with(|| b.exact_matches.cmp(&a.exact_matches))
        .then_with(|| b.organ_matches.cmp(&a.organ_matches))
        .then_with(|| b.score.cmp(&a.score))
}

/// Turn ranked candidates into the operator-facing diagnosis.
pub fn shape_diagnosis(
    candidates: &[MatchResult<'_>],
    selection: &Selection,
    reference: &ReferenceData,
) -> (Verdict, Diagnosis) {
    let Some(top) = candidates.first() else {
        return (
            Verdict::Unknown,
            Diagnosis {
                disease: MessageTemplates::UNKNOWN_DISEASE.into(),
                confidence: 0,
                treatment: MessageTemplates::UNKNOWN_TREATMENT.into(),
                dosage: MessageTemplates::UNKNOWN_DOSAGE.into(),
            },
        );
    };

    if top.confidence < LOW_CONFIDENCE_THRESHOLD && candidates.len() > 1 {
        let names: Vec<&str> = candidates
            .iter()
            .take(MAX_POSSIBLE_DISEASES)
            .map(|c| c.disease.name.as_str())
            .collect();
        return (
            Verdict::Ambiguous,
            Diagnosis {
                disease: MessageTemplates::possible_diseases(&names),
                confidence: top.confidence,
                treatment: MessageTemplates::primary_treatment(&top.disease.treatment),
                dosage: MessageTemplates::dosage_with_alternatives(&top.disease.dosage, &names[1..]),
            },
        );
    }

    let mut disease = top.disease.name.clone();
    if selection.is_organ_grouped() {
        let organs = selection.organs_with_symptoms();
        if organs.len() > 1 {
            let names: Vec<&str> = organs.iter().map(|id| reference.organ_name(id)).collect();
            disease.push_str(&MessageTemplates::organ_info(&names));
        }
    }

    let lines = match_lines(top, selection.is_organ_grouped(), reference);
    let dosage = if lines.is_empty() {
        top.disease.dosage.clone()
    } else {
        MessageTemplates::dosage_with_matches(&top.disease.dosage, &lines)
    };

    (
        Verdict::Matched,
        Diagnosis {
            disease,
            confidence: top.confidence,
            treatment: top.disease.treatment.clone(),
            dosage,
        },
    )
}

/// One line per contributing organ, or per contributing symptom for flat selections.
fn match_lines(top: &MatchResult<'_>, grouped: bool, reference: &ReferenceData) -> Vec<String> {
    if !grouped {
        return top
            .symptom_matches
            .iter()
            .map(|m| MessageTemplates::symptom_match_line(&m.symptom, m.kind.as_str()))
            .collect();
    }

    let mut by_organ: Vec<(&str, Vec<&str>)> = Vec::new();
    for m in &top.symptom_matches {
        let Some(organ_id) = m.organ_id.as_deref() else {
            continue;
        };
        match by_organ.iter_mut().find(|(id, _)| *id == organ_id) {
            Some((_, symptoms)) => symptoms.push(&m.symptom),
            None => by_organ.push((organ_id, vec![&m.symptom])),
        }
    }

    by_organ
        .into_iter()
        .map(|(id, symptoms)| MessageTemplates::organ_match_line(reference.organ_name(id), &symptoms))
        .collect()
}
