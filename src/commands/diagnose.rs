//! Diagnostic commands.
//!
//! - `list_organs`: organs with their selectable healthy/unhealthy symptoms
//! - `run_diagnosis`: score a selection against the disease catalog
//! - `save_diagnosis`: diagnose, apply operator edits, persist for a pond

use serde::Serialize;
use uuid::Uuid;

use crate::core_state::CoreState;
use crate::db;
use crate::matching::{DiagnosticEngine, DiagnosticReport};
use crate::models::{DiagnosisEdit, NewDiagnostic, SavedDiagnostic, Selection};

const MAX_NOTES_LEN: usize = 1000;

/// One organ as shown on the selection screen.
#[derive(Debug, Clone, Serialize)]
pub struct OrganView {
    pub id: String,
    pub name: String,
    pub icon: String,
    pub healthy: Vec<String>,
    pub unhealthy: Vec<String>,
}

pub fn list_organs(state: &CoreState) -> Vec<OrganView> {
    let reference = state.reference();
    reference
        .organs
        .iter()
        .map(|organ| {
            let entry = reference.catalog.organs.get(&organ.id);
            OrganView {
                id: organ.id.clone(),
                name: organ.name.clone(),
                icon: organ.icon.clone(),
                healthy: entry.map(|e| e.healthy.clone()).unwrap_or_default(),
                unhealthy: entry.map(|e| e.unhealthy.clone()).unwrap_or_default(),
            }
        })
        .collect()
}

/// Score a selection. Organ ids must exist in the reference data.
pub fn run_diagnosis<'s>(
    state: &'s CoreState,
    selection: &Selection,
) -> Result<DiagnosticReport<'s>, String> {
    validate_selection(state, selection)?;
    Ok(state.engine().diagnose(selection))
}

/// Diagnose, apply the operator's edits and save the result for a pond.
pub fn save_diagnosis(
    state: &CoreState,
    pond_id: String,
    selection: &Selection,
    edit: &DiagnosisEdit,
    notes: String,
) -> Result<SavedDiagnostic, String> {
    let pond_id = Uuid::parse_str(&pond_id).map_err(|e| format!("Invalid pond ID: {e}"))?;
    if edit.confidence.is_some_and(|c| c > 100) {
        return Err("Confidence must be between 0 and 100".into());
    }
    if notes.chars().count() > MAX_NOTES_LEN {
        return Err(format!("Notes must be {MAX_NOTES_LEN} characters or fewer"));
    }

    let report = run_diagnosis(state, selection)?;
    tracing::debug!(
        verdict = %report.verdict,
        top_disease = report.top_candidate().map(|c| c.disease.id.as_str()),
        "Diagnosis ready to save"
    );

    let mut diagnosis = report.diagnosis;
    if !edit.is_empty() {
        let changed = diagnosis.apply_edit(edit);
        tracing::info!(fields = changed, "Operator edited diagnosis before saving");
    }

    let new = NewDiagnostic::from_session(pond_id, &diagnosis, selection, state.reference(), notes);
    let conn = state.open_db().map_err(|e| e.to_string())?;
    db::insert_diagnostic(&conn, &new).map_err(|e| e.to_string())
}

fn validate_selection(state: &CoreState, selection: &Selection) -> Result<(), String> {
    for obs in &selection.observations {
        if let Some(ref organ_id) = obs.organ_id {
            if state.reference().organ(organ_id).is_none() {
                return Err(format!("Unknown organ: {organ_id}"));
            }
        }
    }
    Ok(())
}
