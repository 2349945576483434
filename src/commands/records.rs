//! Pond and diagnostic history commands.

use chrono::{Local, NaiveDate};
use serde::Serialize;
use uuid::Uuid;

use crate::core_state::CoreState;
use crate::db;
use crate::models::enums::TreatmentStatus;
use crate::models::{ApplyOutcome, DiagnosticFilter, Pond, SavedDiagnostic, StatusCounts};

const MAX_POND_NAME_LEN: usize = 100;

/// Filter values as typed by the operator.
#[derive(Debug, Clone, Default)]
pub struct HistoryQuery {
    pub pond_id: Option<String>,
    pub date_from: Option<String>,
    pub date_to: Option<String>,
    pub status: Option<String>,
    pub search: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct DiagnosticHistory {
    pub diagnostics: Vec<SavedDiagnostic>,
    pub counts: StatusCounts,
    pub active_filters: usize,
}

pub fn add_pond(
    state: &CoreState,
    name: String,
    area_decimal: f64,
    location: Option<String>,
) -> Result<Pond, String> {
    let name = name.trim().to_string();
    if name.is_empty() {
        return Err("Pond name is required".into());
    }
    if name.chars().count() > MAX_POND_NAME_LEN {
        return Err(format!("Pond name must be {MAX_POND_NAME_LEN} characters or fewer"));
    }

    let pond = Pond {
        id: Uuid::new_v4(),
        name,
        area_decimal,
        location: location.filter(|l| !l.trim().is_empty()),
    };
    let conn = state.open_db().map_err(|e| e.to_string())?;
    db::insert_pond(&conn, &pond).map_err(|e| e.to_string())?;
    tracing::info!(pond_id = %pond.id, "Pond added");
    Ok(pond)
}

pub fn list_ponds(state: &CoreState) -> Result<Vec<Pond>, String> {
    let conn = state.open_db().map_err(|e| e.to_string())?;
    db::list_ponds(&conn).map_err(|e| e.to_string())
}

/// Saved diagnostics under the operator's filters, with applied/pending totals.
pub fn get_history(state: &CoreState, query: &HistoryQuery) -> Result<DiagnosticHistory, String> {
    let filter = parse_filter(query)?;
    let conn = state.open_db().map_err(|e| e.to_string())?;

    let diagnostics = db::list_diagnostics(&conn, &filter).map_err(|e| e.to_string())?;
    let counts = db::count_by_status(&conn, &filter).map_err(|e| e.to_string())?;

    Ok(DiagnosticHistory {
        diagnostics,
        counts,
        active_filters: filter.active_count(),
    })
}

pub fn apply_treatment(state: &CoreState, diagnostic_id: String) -> Result<ApplyOutcome, String> {
    let id = Uuid::parse_str(&diagnostic_id).map_err(|e| format!("Invalid diagnostic ID: {e}"))?;
    let conn = state.open_db().map_err(|e| e.to_string())?;
    db::apply_treatment(&conn, &id, Local::now().naive_local()).map_err(|e| e.to_string())
}

fn parse_filter(query: &HistoryQuery) -> Result<DiagnosticFilter, String> {
    let pond_id = query
        .pond_id
        .as_deref()
        .map(|id| Uuid::parse_str(id).map_err(|e| format!("Invalid pond ID: {e}")))
        .transpose()?;
    let date_from = query.date_from.as_deref().map(parse_date).transpose()?;
    let date_to = query.date_to.as_deref().map(parse_date).transpose()?;
    if let (Some(from), Some(to)) = (date_from, date_to) {
        if from > to {
            return Err("Start date must not be after end date".into());
        }
    }
    let status = query
        .status
        .as_deref()
        .filter(|s| *s != "all")
        .map(|s| s.parse::<TreatmentStatus>().map_err(|e| e.to_string()))
        .transpose()?;

    Ok(DiagnosticFilter {
        pond_id,
        date_from,
        date_to,
        status,
        search: query.search.clone(),
        created_after: None,
    })
}

fn parse_date(value: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .map_err(|_| format!("Invalid date {value} (expected YYYY-MM-DD)"))
}
