//! Feeding advice derived from a pond's recent diagnostics.

use chrono::Local;
use serde::Serialize;
use uuid::Uuid;

use crate::advisory::{self, MedicalAnalysis};
use crate::core_state::CoreState;
use crate::db::{self, RECENT_WINDOW_DAYS};
use crate::models::Pond;

const MAX_WINDOW_DAYS: i64 = 365;

#[derive(Debug, Clone, Serialize)]
pub struct MedicalAdvice {
    pub pond: Pond,
    pub window_days: i64,
    pub analysis: MedicalAnalysis,
    pub feed_multiplier: f64,
    pub considerations: String,
}

pub fn get_medical_advice(
    state: &CoreState,
    pond_id: String,
    days: Option<i64>,
) -> Result<MedicalAdvice, String> {
    let id = Uuid::parse_str(&pond_id).map_err(|e| format!("Invalid pond ID: {e}"))?;
    let window_days = days.unwrap_or(RECENT_WINDOW_DAYS);
    if !(1..=MAX_WINDOW_DAYS).contains(&window_days) {
        return Err(format!("Window must be between 1 and {MAX_WINDOW_DAYS} days"));
    }

    let conn = state.open_db().map_err(|e| e.to_string())?;
    let pond = db::get_pond(&conn, &id)
        .map_err(|e| e.to_string())?
        .ok_or_else(|| format!("Pond not found: {id}"))?;

    let analysis = advisory::analyze_pond(&conn, &id, window_days, Local::now().naive_local())
        .map_err(|e| e.to_string())?;

    Ok(MedicalAdvice {
        pond,
        window_days,
        feed_multiplier: analysis.feed_multiplier(),
        considerations: analysis.considerations(),
        analysis,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::advisory::DiseaseSeverity;
    use crate::commands::diagnose::save_diagnosis;
    use crate::commands::records::add_pond;
    use crate::matching::ReferenceData;
    use crate::models::{DiagnosisEdit, Observation, Selection};

    fn state(dir: &tempfile::TempDir) -> CoreState {
        CoreState::new(ReferenceData::load_test(), dir.path().join("farm.db"))
    }

    #[test]
    fn advice_reflects_saved_diagnosis() {
        let dir = tempfile::tempdir().unwrap();
        let state = state(&dir);
        let pond = add_pond(&state, "Pond A".into(), 10.0, None).unwrap();
        let selection = Selection::new(vec![
            Observation::for_organ("skin", ["Hemorrhages"]),
            Observation::for_organ("eye", ["Pop-eye"]),
        ]);
        save_diagnosis(&state, pond.id.to_string(), &selection, &DiagnosisEdit::default(), String::new()).unwrap();

        let advice = get_medical_advice(&state, pond.id.to_string(), None).unwrap();

        assert_eq!(advice.window_days, 30);
        assert_eq!(advice.analysis.severity, DiseaseSeverity::High);
        assert_eq!(advice.feed_multiplier, 0.5);
        assert!(advice.considerations.contains("Bacterial condition"));
    }

    #[test]
    fn pond_without_history_feeds_normally() {
        let dir = tempfile::tempdir().unwrap();
        let state = state(&dir);
        let pond = add_pond(&state, "Pond A".into(), 10.0, None).unwrap();

        let advice = get_medical_advice(&state, pond.id.to_string(), Some(7)).unwrap();
        assert_eq!(advice.analysis.severity, DiseaseSeverity::None);
        assert_eq!(advice.feed_multiplier, 1.0);
    }

    #[test]
    fn invalid_requests_are_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let state = state(&dir);
        assert!(get_medical_advice(&state, "x".into(), None).unwrap_err().starts_with("Invalid pond ID"));
        assert!(get_medical_advice(&state, Uuid::new_v4().to_string(), Some(0))
            .unwrap_err()
            .starts_with("Window must be"));
        assert!(get_medical_advice(&state, Uuid::new_v4().to_string(), None)
            .unwrap_err()
            .starts_with("Pond not found"));
    }
}
