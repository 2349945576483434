use crate::models::enums::{SymptomClass, Verdict};
use crate::models::{Diagnosis, Selection};

use super::messages::MessageTemplates;
use super::ranking::{rank_candidates, shape_diagnosis};
use super::reference::ReferenceData;
use super::scoring::{score_disease, MAX_CONFIDENCE};
use super::types::{DiagnosticEngine, DiagnosticReport, MatchResult};

/// Default implementation of the diagnostic engine.
/// Holds only immutable reference data; every call is independent.
pub struct DefaultDiagnosticEngine {
    pub(crate) reference: ReferenceData,
}

impl DefaultDiagnosticEngine {
    pub fn new(reference: ReferenceData) -> Self {
        Self { reference }
    }

    pub fn reference(&self) -> &ReferenceData {
        &self.reference
    }

    /// True when every selected symptom positively classifies healthy.
    fn is_all_healthy(&self, selection: &Selection) -> bool {
        selection.observations.iter().all(|obs| {
            obs.symptoms.iter().all(|symptom| {
                self.reference.classify(obs.organ_id.as_deref(), symptom)
                    == Some(SymptomClass::Healthy)
            })
        })
    }
}

impl DiagnosticEngine for DefaultDiagnosticEngine {
    fn diagnose(&self, selection: &Selection) -> DiagnosticReport<'_> {
        if selection.is_empty() {
            tracing::debug!("Diagnosis requested without symptoms");
            return DiagnosticReport {
                verdict: Verdict::NoSelection,
                diagnosis: Diagnosis {
                    disease: MessageTemplates::NO_SELECTION_DISEASE.into(),
                    confidence: 0,
                    treatment: MessageTemplates::NO_SELECTION_TREATMENT.into(),
                    dosage: String::new(),
                },
                candidates: Vec::new(),
            };
        }

        if self.is_all_healthy(selection) {
            tracing::info!(
                symptoms = selection.total_symptoms(),
                "All selected symptoms are healthy"
            );
            return DiagnosticReport {
                verdict: Verdict::Healthy,
                diagnosis: Diagnosis {
                    disease: MessageTemplates::HEALTHY_DISEASE.into(),
                    confidence: MAX_CONFIDENCE,
                    treatment: MessageTemplates::HEALTHY_TREATMENT.into(),
                    dosage: MessageTemplates::HEALTHY_DOSAGE.into(),
                },
                candidates: Vec::new(),
            };
        }

        let candidates = self.rank(selection);
        let (verdict, diagnosis) = shape_diagnosis(&candidates, selection, &self.reference);

        tracing::info!(
            verdict = %verdict,
            symptoms = selection.total_symptoms(),
            organ_grouped = selection.is_organ_grouped(),
            candidates = candidates.len(),
            confidence = diagnosis.confidence,
            "Diagnosis complete"
        );

        DiagnosticReport {
            verdict,
            diagnosis,
            candidates,
        }
    }

    fn rank(&self, selection: &Selection) -> Vec<MatchResult<'_>> {
        let results = self
            .reference
            .candidate_diseases()
            .map(|disease| score_disease(disease, selection, &self.reference.tables))
            .collect();
        rank_candidates(results)
    }
}
