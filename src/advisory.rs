//! Medical feeding advisory.
//!
//! Reads a pond's recent saved diagnostics and turns them into feeding
//! guidance: an overall disease severity, per-diagnostic feed reductions,
//! disease-specific feed changes and treatment reminders.

use chrono::NaiveDateTime;
use rusqlite::Connection;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::db::{self, DatabaseError};
use crate::models::SavedDiagnostic;

const HIGH_CONFIDENCE: f64 = 80.0;
const MEDIUM_CONFIDENCE: f64 = 60.0;

const HIGH_FEED_MULTIPLIER: f64 = 0.5;
const MEDIUM_FEED_MULTIPLIER: f64 = 0.7;
const NORMAL_FEED_MULTIPLIER: f64 = 1.0;

const BACTERIAL_KEYWORDS: &[&str] = &["bacterial", "infection", "septicemia"];
const PARASITIC_KEYWORDS: &[&str] = &["parasite", "worm", "gill"];
const FUNGAL_KEYWORDS: &[&str] = &["fungal", "mold"];

// ═══════════════════════════════════════════
// Types
// ═══════════════════════════════════════════

/// Ordered so that the worst severity compares greatest.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiseaseSeverity {
    #[default]
    None,
    Low,
    Medium,
    High,
}

impl DiseaseSeverity {
    pub fn from_confidence(confidence: f64) -> Self {
        if confidence >= HIGH_CONFIDENCE {
            Self::High
        } else if confidence >= MEDIUM_CONFIDENCE {
            Self::Medium
        } else {
            Self::Low
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeedingAction {
    ReduceFeed,
    Monitor,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeedingAdjustment {
    pub action: FeedingAction,
    /// Fraction of the normal ration to feed.
    pub multiplier: f64,
    pub reason: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActiveDisease {
    pub diagnostic_id: Uuid,
    pub disease_name: String,
    pub confidence: f64,
    pub is_applied: bool,
    pub created_at: NaiveDateTime,
    pub treatment: String,
    pub dosage: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MedicalAnalysis {
    pub active_diseases: Vec<ActiveDisease>,
    pub severity: DiseaseSeverity,
    pub feeding_adjustments: Vec<FeedingAdjustment>,
    pub warnings: Vec<String>,
    pub recommended_feed_changes: Vec<String>,
    pub treatment_considerations: Vec<String>,
}

// ═══════════════════════════════════════════
// Analysis
// ═══════════════════════════════════════════

impl MedicalAnalysis {
    /// Assess diagnostics, newest first as the record store returns them.
    pub fn assess(diagnostics: &[SavedDiagnostic]) -> Self {
        let mut analysis = Self::default();

        for diagnostic in diagnostics {
            let name = diagnostic.disease_name.as_str();
            let confidence = diagnostic.confidence_percentage;
            let severity = DiseaseSeverity::from_confidence(confidence);

            analysis.active_diseases.push(ActiveDisease {
                diagnostic_id: diagnostic.id,
                disease_name: diagnostic.disease_name.clone(),
                confidence,
                is_applied: diagnostic.is_applied,
                created_at: diagnostic.created_at,
                treatment: diagnostic.recommended_treatment.clone(),
                dosage: diagnostic.dosage_application.clone(),
            });

            analysis.severity = analysis.severity.max(severity);
            analysis.feeding_adjustments.push(adjustment_for(severity, name));
            analysis.warnings.push(warning_for(severity, name, confidence));

            if let Some(change) = feed_change_for(name) {
                if !analysis.recommended_feed_changes.iter().any(|c| c == change) {
                    analysis.recommended_feed_changes.push(change.to_string());
                }
            }

            analysis.treatment_considerations.push(if diagnostic.is_applied {
                format!("Treatment in progress: {}", diagnostic.recommended_treatment)
            } else {
                format!("Treatment pending: {}", diagnostic.recommended_treatment)
            });
        }

        analysis
    }

    /// Smallest ration fraction across all adjustments; 1.0 when healthy.
    pub fn feed_multiplier(&self) -> f64 {
        self.feeding_adjustments
            .iter()
            .map(|a| a.multiplier)
            .fold(NORMAL_FEED_MULTIPLIER, f64::min)
    }

    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }

    /// Human-readable summary for the feeding advice screen.
    pub fn considerations(&self) -> String {
        if self.active_diseases.is_empty() {
            return "No recent medical conditions - continue normal feeding".into();
        }

        let mut lines = vec!["Recent medical conditions:".to_string()];
        for disease in &self.active_diseases {
            let status = if disease.is_applied {
                "treatment applied"
            } else {
                "treatment pending"
            };
            lines.push(format!(
                "- {} ({:.0}% confidence) - {}",
                disease.disease_name, disease.confidence, status
            ));
        }

        if !self.recommended_feed_changes.is_empty() {
            lines.push("\nRecommended feed changes:".into());
            lines.extend(self.recommended_feed_changes.iter().map(|c| format!("- {c}")));
        }

        if !self.treatment_considerations.is_empty() {
            lines.push("\nTreatment considerations:".into());
            lines.extend(self.treatment_considerations.iter().map(|c| format!("- {c}")));
        }

        lines.join("\n")
    }
}

/// Load a pond's diagnostics from the last `days` days and assess them.
pub fn analyze_pond(
    conn: &Connection,
    pond_id: &Uuid,
    days: i64,
    now: NaiveDateTime,
) -> Result<MedicalAnalysis, DatabaseError> {
    let recent = db::list_recent_diagnostics(conn, pond_id, days, now)?;
    let analysis = MedicalAnalysis::assess(&recent);

    tracing::info!(
        pond_id = %pond_id,
        diagnostics = recent.len(),
        severity = analysis.severity.as_str(),
        feed_multiplier = analysis.feed_multiplier(),
        "Medical feeding analysis complete"
    );

    Ok(analysis)
}

fn adjustment_for(severity: DiseaseSeverity, disease_name: &str) -> FeedingAdjustment {
    match severity {
        DiseaseSeverity::High => FeedingAdjustment {
            action: FeedingAction::ReduceFeed,
            multiplier: HIGH_FEED_MULTIPLIER,
            reason: format!("High confidence disease: {disease_name}"),
        },
        DiseaseSeverity::Medium => FeedingAdjustment {
            action: FeedingAction::ReduceFeed,
            multiplier: MEDIUM_FEED_MULTIPLIER,
            reason: format!("Medium confidence disease: {disease_name}"),
        },
        DiseaseSeverity::Low | DiseaseSeverity::None => FeedingAdjustment {
            action: FeedingAction::Monitor,
            multiplier: NORMAL_FEED_MULTIPLIER,
            reason: format!("Low confidence disease: {disease_name}"),
        },
    }
}

fn warning_for(severity: DiseaseSeverity, disease_name: &str, confidence: f64) -> String {
    match severity {
        DiseaseSeverity::High => format!(
            "Serious condition: {disease_name} ({confidence:.0}%) - reduce feeding by 50%"
        ),
        DiseaseSeverity::Medium => format!(
            "Likely condition: {disease_name} ({confidence:.0}%) - reduce feeding by 30%"
        ),
        DiseaseSeverity::Low | DiseaseSeverity::None => {
            format!("Possible condition: {disease_name} - watch feeding response")
        }
    }
}

fn feed_change_for(disease_name: &str) -> Option<&'static str> {
    let name = disease_name.to_lowercase();
    let mentions = |keywords: &[&str]| keywords.iter().any(|k| name.contains(k));

    if mentions(BACTERIAL_KEYWORDS) {
        Some("Bacterial condition - use medicated, easily digestible feed")
    } else if mentions(PARASITIC_KEYWORDS) {
        Some("Parasitic or gill condition - reduce ration and keep feed fresh")
    } else if mentions(FUNGAL_KEYWORDS) {
        Some("Fungal condition - avoid spoiled or damp feed")
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;

    fn saved(name: &str, confidence: f64, is_applied: bool) -> SavedDiagnostic {
        let created = NaiveDate::from_ymd_opt(2026, 5, 10)
            .unwrap()
            .and_hms_opt(8, 0, 0)
            .unwrap();
        SavedDiagnostic {
            id: Uuid::new_v4(),
            pond_id: Uuid::new_v4(),
            pond_name: "Pond A".into(),
            disease_name: name.into(),
            confidence_percentage: confidence,
            recommended_treatment: format!("{name} treatment"),
            dosage_application: "as labelled".into(),
            selected_organs: vec![],
            selected_symptoms: vec![],
            notes: String::new(),
            is_applied,
            applied_at: None,
            created_at: created,
            updated_at: created,
        }
    }

    #[test]
    fn severity_thresholds() {
        assert_eq!(DiseaseSeverity::from_confidence(80.0), DiseaseSeverity::High);
        assert_eq!(DiseaseSeverity::from_confidence(79.99), DiseaseSeverity::Medium);
        assert_eq!(DiseaseSeverity::from_confidence(60.0), DiseaseSeverity::Medium);
        assert_eq!(DiseaseSeverity::from_confidence(59.0), DiseaseSeverity::Low);
        assert_eq!(DiseaseSeverity::from_confidence(0.0), DiseaseSeverity::Low);
    }

    #[test]
    fn empty_history_is_normal_feeding() {
        let analysis = MedicalAnalysis::assess(&[]);
        assert_eq!(analysis.severity, DiseaseSeverity::None);
        assert_eq!(analysis.feed_multiplier(), 1.0);
        assert!(!analysis.has_warnings());
        assert_eq!(
            analysis.considerations(),
            "No recent medical conditions - continue normal feeding"
        );
    }

    #[test]
    fn overall_severity_is_the_worst_seen() {
        let analysis = MedicalAnalysis::assess(&[
            saved("Ich", 40.0, false),
            saved("Bacterial Septicemia", 85.0, false),
            saved("Costia", 65.0, true),
        ]);
        assert_eq!(analysis.severity, DiseaseSeverity::High);
        assert_eq!(analysis.feed_multiplier(), 0.5);
        assert_eq!(analysis.feeding_adjustments.len(), 3);
        assert_eq!(analysis.feeding_adjustments[0].action, FeedingAction::Monitor);
        assert_eq!(analysis.feeding_adjustments[2].multiplier, 0.7);
    }

    #[test]
    fn feed_changes_follow_disease_keywords() {
        let analysis = MedicalAnalysis::assess(&[
            saved("Gill Flukes", 70.0, false),
            saved("Bacterial Ulcer", 70.0, false),
            saved("Saprolegnia (Fungal)", 70.0, false),
            saved("Ich", 70.0, false),
        ]);
        assert_eq!(
            analysis.recommended_feed_changes,
            vec![
                "Parasitic or gill condition - reduce ration and keep feed fresh",
                "Bacterial condition - use medicated, easily digestible feed",
                "Fungal condition - avoid spoiled or damp feed",
            ]
        );
    }

    #[test]
    fn repeated_feed_change_is_listed_once() {
        let analysis = MedicalAnalysis::assess(&[
            saved("Bacterial Ulcer", 70.0, false),
            saved("Bacterial Septicemia", 70.0, false),
        ]);
        assert_eq!(analysis.recommended_feed_changes.len(), 1);
    }

    #[test]
    fn treatment_considerations_reflect_status() {
        let analysis = MedicalAnalysis::assess(&[saved("Costia", 65.0, true), saved("Ich", 30.0, false)]);
        assert_eq!(
            analysis.treatment_considerations,
            vec!["Treatment in progress: Costia treatment", "Treatment pending: Ich treatment"]
        );
    }

    #[test]
    fn considerations_list_every_section() {
        let analysis = MedicalAnalysis::assess(&[saved("Gill Flukes", 82.4, true)]);
        let text = analysis.considerations();
        assert!(text.starts_with("Recent medical conditions:\n- Gill Flukes (82% confidence) - treatment applied"));
        assert!(text.contains("\nRecommended feed changes:\n- Parasitic"));
        assert!(text.contains("\nTreatment considerations:\n- Treatment in progress: Gill Flukes treatment"));
    }

    #[test]
    fn analyze_pond_reads_recent_diagnostics() {
        use crate::db::{insert_diagnostic_at, insert_pond, open_memory_database};
        use crate::models::{NewDiagnostic, Pond};

        let conn = open_memory_database().unwrap();
        let pond = Pond {
            id: Uuid::new_v4(),
            name: "Pond A".into(),
            area_decimal: 20.0,
            location: None,
        };
        insert_pond(&conn, &pond).unwrap();

        let day = |d: u32| NaiveDate::from_ymd_opt(2026, 5, d).unwrap().and_hms_opt(9, 0, 0).unwrap();
        let new = |name: &str, confidence: f64| NewDiagnostic {
            pond_id: pond.id,
            disease_name: name.into(),
            confidence_percentage: confidence,
            recommended_treatment: "Salt".into(),
            dosage_application: "3%".into(),
            selected_organs: vec![],
            selected_symptoms: vec![],
            notes: String::new(),
        };
        insert_diagnostic_at(&conn, &new("Costia", 65.0), day(20)).unwrap();

        let analysis = analyze_pond(&conn, &pond.id, 30, day(25)).unwrap();
        assert_eq!(analysis.severity, DiseaseSeverity::Medium);
        assert_eq!(analysis.feed_multiplier(), 0.7);

        let none = analyze_pond(&conn, &Uuid::new_v4(), 30, day(25)).unwrap();
        assert_eq!(none.severity, DiseaseSeverity::None);
    }
}
