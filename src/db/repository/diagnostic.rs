use chrono::{Duration, Local, NaiveDateTime};
use rusqlite::{params, Connection, OptionalExtension};
use uuid::Uuid;

use crate::db::{DatabaseError, TIMESTAMP_FORMAT};
use crate::models::enums::TreatmentStatus;
use crate::models::{
    ApplyOutcome, DiagnosticFilter, NewDiagnostic, SavedDiagnostic, SelectedOrgan, StatusCounts,
};

use super::pond::get_pond;

/// Default look-back for "recent" diagnostics.
pub const RECENT_WINDOW_DAYS: i64 = 30;

const DIAGNOSTIC_COLUMNS: &str = "d.id, d.pond_id, p.name, d.disease_name, d.confidence_percentage,
     d.recommended_treatment, d.dosage_application, d.selected_organs, d.selected_symptoms,
     d.notes, d.is_applied, d.applied_at, d.created_at, d.updated_at";

/// Persist an accepted diagnosis, stamped with the current local time.
pub fn insert_diagnostic(conn: &Connection, new: &NewDiagnostic) -> Result<SavedDiagnostic, DatabaseError> {
    insert_diagnostic_at(conn, new, Local::now().naive_local())
}

/// Persist an accepted diagnosis with an explicit creation time.
pub fn insert_diagnostic_at(
    conn: &Connection,
    new: &NewDiagnostic,
    created_at: NaiveDateTime,
) -> Result<SavedDiagnostic, DatabaseError> {
    if !(0.0..=100.0).contains(&new.confidence_percentage) {
        return Err(DatabaseError::ConstraintViolation(format!(
            "Confidence must be between 0 and 100, got {}",
            new.confidence_percentage
        )));
    }
    if get_pond(conn, &new.pond_id)?.is_none() {
        return Err(DatabaseError::NotFound {
            entity_type: "Pond".into(),
            id: new.pond_id.to_string(),
        });
    }

    let id = Uuid::new_v4();
    let now = format_timestamp(created_at);
    let confidence = (new.confidence_percentage * 100.0).round() / 100.0;
    let organs_json = serde_json::to_string(&new.selected_organs)
        .map_err(|e| DatabaseError::ConstraintViolation(e.to_string()))?;
    let symptoms_json = serde_json::to_string(&new.selected_symptoms)
        .map_err(|e| DatabaseError::ConstraintViolation(e.to_string()))?;

    conn.execute(
        "INSERT INTO medical_diagnostics (id, pond_id, disease_name, confidence_percentage,
         recommended_treatment, dosage_application, selected_organs, selected_symptoms, notes,
         is_applied, applied_at, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, 0, NULL, ?10, ?10)",
        params![
            id.to_string(),
            new.pond_id.to_string(),
            new.disease_name,
            confidence,
            new.recommended_treatment,
            new.dosage_application,
            organs_json,
            symptoms_json,
            new.notes,
            now,
        ],
    )?;

    tracing::info!(
        diagnostic_id = %id,
        pond_id = %new.pond_id,
        confidence,
        "Diagnostic saved"
    );

    get_diagnostic(conn, &id)?.ok_or_else(|| DatabaseError::NotFound {
        entity_type: "MedicalDiagnostic".into(),
        id: id.to_string(),
    })
}

pub fn get_diagnostic(conn: &Connection, id: &Uuid) -> Result<Option<SavedDiagnostic>, DatabaseError> {
    let sql = format!(
        "SELECT {DIAGNOSTIC_COLUMNS}
         FROM medical_diagnostics d
         JOIN ponds p ON p.id = d.pond_id
         WHERE d.id = ?1"
    );
    let raw = conn
        .query_row(&sql, params![id.to_string()], read_raw)
        .optional()?;
    raw.map(RawDiagnostic::into_saved).transpose()
}

/// Diagnostics matching `filter`, newest first.
pub fn list_diagnostics(
    conn: &Connection,
    filter: &DiagnosticFilter,
) -> Result<Vec<SavedDiagnostic>, DatabaseError> {
    let (clause, params_vec) = filter_clause(filter);
    let sql = format!(
        "SELECT {DIAGNOSTIC_COLUMNS}
         FROM medical_diagnostics d
         JOIN ponds p ON p.id = d.pond_id
         WHERE 1=1{clause}
         ORDER BY d.created_at DESC, d.rowid DESC"
    );

    let param_refs: Vec<&dyn rusqlite::types::ToSql> =
        params_vec.iter().map(|p| p.as_ref()).collect();

    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map(param_refs.as_slice(), read_raw)?;

    let mut diagnostics = Vec::new();
    for row in rows {
        diagnostics.push(row?.into_saved()?);
    }
    Ok(diagnostics)
}

/// A pond's diagnostics created within the last `days` days of `now`.
pub fn list_recent_diagnostics(
    conn: &Connection,
    pond_id: &Uuid,
    days: i64,
    now: NaiveDateTime,
) -> Result<Vec<SavedDiagnostic>, DatabaseError> {
    let filter = DiagnosticFilter {
        pond_id: Some(*pond_id),
        created_after: Some(now - Duration::days(days)),
        ..DiagnosticFilter::default()
    };
    list_diagnostics(conn, &filter)
}

/// Applied and pending totals under `filter`, ignoring its status field.
pub fn count_by_status(conn: &Connection, filter: &DiagnosticFilter) -> Result<StatusCounts, DatabaseError> {
    let unfiltered_status = DiagnosticFilter {
        status: None,
        ..filter.clone()
    };
    let (clause, params_vec) = filter_clause(&unfiltered_status);
    let sql = format!(
        "SELECT COALESCE(SUM(d.is_applied), 0), COUNT(*)
         FROM medical_diagnostics d
         JOIN ponds p ON p.id = d.pond_id
         WHERE 1=1{clause}"
    );

    let param_refs: Vec<&dyn rusqlite::types::ToSql> =
        params_vec.iter().map(|p| p.as_ref()).collect();

    let (applied, total) = conn.query_row(&sql, param_refs.as_slice(), |row| {
        Ok((row.get::<_, i64>(0)?, row.get::<_, i64>(1)?))
    })?;

    Ok(StatusCounts {
        applied: applied as usize,
        pending: (total - applied) as usize,
    })
}

/// Mark a diagnostic's treatment as applied.
///
/// A second call changes nothing and reports the original `applied_at`.
pub fn apply_treatment(
    conn: &Connection,
    id: &Uuid,
    now: NaiveDateTime,
) -> Result<ApplyOutcome, DatabaseError> {
    let (is_applied, applied_at) = conn
        .query_row(
            "SELECT is_applied, applied_at FROM medical_diagnostics WHERE id = ?1",
            params![id.to_string()],
            |row| Ok((row.get::<_, i32>(0)? != 0, row.get::<_, Option<String>>(1)?)),
        )
        .optional()?
        .ok_or_else(|| DatabaseError::NotFound {
            entity_type: "MedicalDiagnostic".into(),
            id: id.to_string(),
        })?;

    if let (true, Some(existing)) = (is_applied, applied_at) {
        return Ok(ApplyOutcome {
            diagnostic_id: *id,
            applied_at: parse_timestamp(&existing)?,
            already_applied: true,
        });
    }

    let stamp = format_timestamp(now);
    conn.execute(
        "UPDATE medical_diagnostics SET is_applied = 1, applied_at = ?1, updated_at = ?1 WHERE id = ?2",
        params![stamp, id.to_string()],
    )?;

    tracing::info!(diagnostic_id = %id, applied_at = %stamp, "Treatment applied");

    Ok(ApplyOutcome {
        diagnostic_id: *id,
        applied_at: parse_timestamp(&stamp)?,
        already_applied: false,
    })
}

/// Build the `AND ...` conditions and their parameters for a filter.
fn filter_clause(filter: &DiagnosticFilter) -> (String, Vec<Box<dyn rusqlite::types::ToSql>>) {
    let mut sql = String::new();
    let mut params_vec: Vec<Box<dyn rusqlite::types::ToSql>> = Vec::new();
    let mut param_idx = 1u32;

    if let Some(pond_id) = filter.pond_id {
        sql.push_str(&format!(" AND d.pond_id = ?{param_idx}"));
        params_vec.push(Box::new(pond_id.to_string()));
        param_idx += 1;
    }
    if let Some(from) = filter.date_from {
        sql.push_str(&format!(" AND date(d.created_at) >= ?{param_idx}"));
        params_vec.push(Box::new(from.format("%Y-%m-%d").to_string()));
        param_idx += 1;
    }
    if let Some(to) = filter.date_to {
        sql.push_str(&format!(" AND date(d.created_at) <= ?{param_idx}"));
        params_vec.push(Box::new(to.format("%Y-%m-%d").to_string()));
        param_idx += 1;
    }
    if let Some(status) = filter.status {
        sql.push_str(&format!(" AND d.is_applied = ?{param_idx}"));
        params_vec.push(Box::new(i32::from(status == TreatmentStatus::Applied)));
        param_idx += 1;
    }
    if let Some(search) = filter.search.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
        // SQLite lower() folds ASCII only; fold the term with the same rule.
        sql.push_str(&format!(
            " AND (instr(lower(d.disease_name), ?{param_idx}) > 0
               OR instr(lower(p.name), ?{param_idx}) > 0
               OR instr(lower(d.recommended_treatment), ?{param_idx}) > 0
               OR instr(lower(d.dosage_application), ?{param_idx}) > 0)"
        ));
        params_vec.push(Box::new(search.to_ascii_lowercase()));
        param_idx += 1;
    }
    if let Some(after) = filter.created_after {
        sql.push_str(&format!(" AND d.created_at >= ?{param_idx}"));
        params_vec.push(Box::new(format_timestamp(after)));
    }

    (sql, params_vec)
}

/// Column values as stored, before parsing.
struct RawDiagnostic {
    id: String,
    pond_id: String,
    pond_name: String,
    disease_name: String,
    confidence_percentage: f64,
    recommended_treatment: String,
    dosage_application: String,
    selected_organs: String,
    selected_symptoms: String,
    notes: String,
    is_applied: bool,
    applied_at: Option<String>,
    created_at: String,
    updated_at: String,
}

fn read_raw(row: &rusqlite::Row<'_>) -> rusqlite::Result<RawDiagnostic> {
    Ok(RawDiagnostic {
        id: row.get(0)?,
        pond_id: row.get(1)?,
        pond_name: row.get(2)?,
        disease_name: row.get(3)?,
        confidence_percentage: row.get(4)?,
        recommended_treatment: row.get(5)?,
        dosage_application: row.get(6)?,
        selected_organs: row.get(7)?,
        selected_symptoms: row.get(8)?,
        notes: row.get(9)?,
        is_applied: row.get::<_, i32>(10)? != 0,
        applied_at: row.get(11)?,
        created_at: row.get(12)?,
        updated_at: row.get(13)?,
    })
}

impl RawDiagnostic {
    fn into_saved(self) -> Result<SavedDiagnostic, DatabaseError> {
        let selected_organs: Vec<SelectedOrgan> = serde_json::from_str(&self.selected_organs)
            .map_err(|e| DatabaseError::ConstraintViolation(format!("Invalid selected organs: {e}")))?;
        let selected_symptoms: Vec<String> = serde_json::from_str(&self.selected_symptoms)
            .map_err(|e| DatabaseError::ConstraintViolation(format!("Invalid selected symptoms: {e}")))?;

        Ok(SavedDiagnostic {
            id: parse_uuid(&self.id)?,
            pond_id: parse_uuid(&self.pond_id)?,
            pond_name: self.pond_name,
            disease_name: self.disease_name,
            confidence_percentage: self.confidence_percentage,
            recommended_treatment: self.recommended_treatment,
            dosage_application: self.dosage_application,
            selected_organs,
            selected_symptoms,
            notes: self.notes,
            is_applied: self.is_applied,
            applied_at: self.applied_at.as_deref().map(parse_timestamp).transpose()?,
            created_at: parse_timestamp(&self.created_at)?,
            updated_at: parse_timestamp(&self.updated_at)?,
        })
    }
}

fn parse_uuid(s: &str) -> Result<Uuid, DatabaseError> {
    Uuid::parse_str(s).map_err(|e| DatabaseError::ConstraintViolation(e.to_string()))
}

fn format_timestamp(dt: NaiveDateTime) -> String {
    dt.format(TIMESTAMP_FORMAT).to_string()
}

fn parse_timestamp(s: &str) -> Result<NaiveDateTime, DatabaseError> {
    NaiveDateTime::parse_from_str(s, TIMESTAMP_FORMAT)
        .map_err(|e| DatabaseError::ConstraintViolation(format!("Invalid timestamp {s}: {e}")))
}
