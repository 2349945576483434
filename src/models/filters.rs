use chrono::{NaiveDate, NaiveDateTime};
use uuid::Uuid;

use super::enums::TreatmentStatus;

#[derive(Debug, Default, Clone)]
pub struct DiagnosticFilter {
    pub pond_id: Option<Uuid>,
    /// Inclusive, compared against the creation date.
    pub date_from: Option<NaiveDate>,
    /// Inclusive, compared against the creation date.
    pub date_to: Option<NaiveDate>,
    pub status: Option<TreatmentStatus>,
    /// Text over disease, pond name, treatment and dosage. Case folding is ASCII only.
    pub search: Option<String>,
    pub created_after: Option<NaiveDateTime>,
}

impl DiagnosticFilter {
    pub fn for_pond(pond_id: Uuid) -> Self {
        Self {
            pond_id: Some(pond_id),
            ..Self::default()
        }
    }

    /// Number of user-facing filters in effect (shown next to the listing).
    pub fn active_count(&self) -> usize {
        [
            self.pond_id.is_some(),
            self.date_from.is_some(),
            self.date_to.is_some(),
            self.status.is_some(),
            self.search.as_deref().is_some_and(|s| !s.trim().is_empty()),
        ]
        .iter()
        .filter(|active| **active)
        .count()
    }
}
