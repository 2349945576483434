use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::enums::TreatmentStatus;
use super::selection::Selection;
use crate::matching::reference::ReferenceData;

/// Treatment recommendation shown to the operator.
///
/// Produced by the engine, then freely editable before it is saved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnosis {
    pub disease: String,
    pub confidence: u8,
    pub treatment: String,
    pub dosage: String,
}

/// Operator overrides for a [`Diagnosis`]. `None` keeps the engine's value.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DiagnosisEdit {
    pub disease: Option<String>,
    pub confidence: Option<u8>,
    pub treatment: Option<String>,
    pub dosage: Option<String>,
}

impl DiagnosisEdit {
    pub fn is_empty(&self) -> bool {
        self.disease.is_none()
            && self.confidence.is_none()
            && self.treatment.is_none()
            && self.dosage.is_none()
    }
}

impl Diagnosis {
    /// Apply operator overrides. Returns the number of fields that changed.
    pub fn apply_edit(&mut self, edit: &DiagnosisEdit) -> usize {
        let mut changed = 0;

        if let Some(ref disease) = edit.disease {
            if *disease != self.disease {
                self.disease = disease.clone();
                changed += 1;
            }
        }
        if let Some(confidence) = edit.confidence {
            if confidence != self.confidence {
                self.confidence = confidence;
                changed += 1;
            }
        }
        if let Some(ref treatment) = edit.treatment {
            if *treatment != self.treatment {
                self.treatment = treatment.clone();
                changed += 1;
            }
        }
        if let Some(ref dosage) = edit.dosage {
            if *dosage != self.dosage {
                self.dosage = dosage.clone();
                changed += 1;
            }
        }

        changed
    }
}

/// Organ snapshot stored alongside a saved diagnostic.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectedOrgan {
    pub id: String,
    pub name: String,
    pub conditions: Vec<String>,
}

/// Payload for persisting an accepted (or edited) diagnosis.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewDiagnostic {
    pub pond_id: Uuid,
    pub disease_name: String,
    pub confidence_percentage: f64,
    pub recommended_treatment: String,
    pub dosage_application: String,
    pub selected_organs: Vec<SelectedOrgan>,
    pub selected_symptoms: Vec<String>,
    pub notes: String,
}

impl NewDiagnostic {
    /// Build the save payload from the diagnosis the operator accepted and the
    /// selection it was computed from.
    pub fn from_session(
        pond_id: Uuid,
        diagnosis: &Diagnosis,
        selection: &Selection,
        reference: &ReferenceData,
        notes: impl Into<String>,
    ) -> Self {
        let selected_organs = selection
            .observations
            .iter()
            .filter_map(|obs| {
                let id = obs.organ_id.as_deref()?;
                Some(SelectedOrgan {
                    id: id.to_string(),
                    name: reference.organ_name(id).to_string(),
                    conditions: obs.symptoms.clone(),
                })
            })
            .collect();

        Self {
            pond_id,
            disease_name: diagnosis.disease.clone(),
            confidence_percentage: f64::from(diagnosis.confidence),
            recommended_treatment: diagnosis.treatment.clone(),
            dosage_application: diagnosis.dosage.clone(),
            selected_organs,
            selected_symptoms: selection.symptoms().map(str::to_string).collect(),
            notes: notes.into(),
        }
    }
}

/// A diagnostic result owned by the record store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SavedDiagnostic {
    pub id: Uuid,
    pub pond_id: Uuid,
    pub pond_name: String,
    pub disease_name: String,
    pub confidence_percentage: f64,
    pub recommended_treatment: String,
    pub dosage_application: String,
    pub selected_organs: Vec<SelectedOrgan>,
    pub selected_symptoms: Vec<String>,
    pub notes: String,
    pub is_applied: bool,
    pub applied_at: Option<NaiveDateTime>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl SavedDiagnostic {
    pub fn status(&self) -> TreatmentStatus {
        if self.is_applied {
            TreatmentStatus::Applied
        } else {
            TreatmentStatus::Pending
        }
    }
}

/// Result of the "apply treatment" action.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApplyOutcome {
    pub diagnostic_id: Uuid,
    pub applied_at: NaiveDateTime,
    /// True when the treatment had already been applied; nothing was changed.
    pub already_applied: bool,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusCounts {
    pub applied: usize,
    pub pending: usize,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::selection::Observation;

    fn engine_output() -> Diagnosis {
        Diagnosis {
            disease: "Bacterial Ulcer".into(),
            confidence: 72,
            treatment: "OTC".into(),
            dosage: "50 mg/kg".into(),
        }
    }

    #[test]
    fn empty_edit_changes_nothing() {
        let mut diagnosis = engine_output();
        let edit = DiagnosisEdit::default();
        assert!(edit.is_empty());
        assert_eq!(diagnosis.apply_edit(&edit), 0);
        assert_eq!(diagnosis, engine_output());
    }

    #[test]
    fn edit_counts_only_changed_fields() {
        let mut diagnosis = engine_output();
        let edit = DiagnosisEdit {
            disease: Some("Bacterial Ulcer".into()),
            treatment: Some("Florfenicol".into()),
            confidence: Some(80),
            dosage: None,
        };
        assert_eq!(diagnosis.apply_edit(&edit), 2);
        assert_eq!(diagnosis.treatment, "Florfenicol");
        assert_eq!(diagnosis.confidence, 80);
        assert_eq!(diagnosis.dosage, "50 mg/kg");
    }

    #[test]
    fn from_session_resolves_organ_names() {
        let reference = ReferenceData::load_test();
        let selection = Selection::new(vec![
            Observation::for_organ("skin", ["Scale loss"]),
            Observation::for_organ("gill", ["Gasping", "Heavy mucus"]),
        ]);
        let pond_id = Uuid::new_v4();

        let new = NewDiagnostic::from_session(pond_id, &engine_output(), &selection, &reference, "");

        assert_eq!(new.pond_id, pond_id);
        assert_eq!(new.confidence_percentage, 72.0);
        assert_eq!(new.selected_organs.len(), 2);
        assert_eq!(new.selected_organs[0].name, "Skin");
        assert_eq!(new.selected_organs[1].conditions, vec!["Gasping", "Heavy mucus"]);
        assert_eq!(new.selected_symptoms, vec!["Scale loss", "Gasping", "Heavy mucus"]);
    }

    #[test]
    fn flat_session_stores_no_organs() {
        let reference = ReferenceData::load_test();
        let selection = Selection::flat(["Gasping"]);
        let new = NewDiagnostic::from_session(Uuid::new_v4(), &engine_output(), &selection, &reference, "quick");
        assert!(new.selected_organs.is_empty());
        assert_eq!(new.selected_symptoms, vec!["Gasping"]);
        assert_eq!(new.notes, "quick");
    }
}
