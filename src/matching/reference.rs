use std::collections::BTreeMap;
use std::path::Path;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::models::enums::SymptomClass;

use super::types::ReferenceError;

/// Catalog id of the healthy pseudo-disease. Never scored as a candidate.
pub const HEALTHY_DISEASE_ID: &str = "healthy";

const ORGANS_FILE: &str = "organs.json";
const CATALOG_FILE: &str = "symptom_catalog.json";
const DISEASES_FILE: &str = "diseases.json";
const TABLES_FILE: &str = "matching_tables.json";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Organ {
    pub id: String,
    pub name: String,
    pub icon: String,
}

/// Selectable symptoms for one organ.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OrganSymptoms {
    pub healthy: Vec<String>,
    pub unhealthy: Vec<String>,
}

/// Per-organ healthy/unhealthy vocabularies, keyed by organ id.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SymptomCatalog {
    pub organs: BTreeMap<String, OrganSymptoms>,
}

impl SymptomCatalog {
    /// Classify a symptom for a known organ.
    ///
    /// Returns `None` when the organ has no catalog entry. A symptom missing
    /// from both lists of a known organ is treated as unhealthy.
    pub fn classify(&self, organ_id: &str, symptom: &str) -> Option<SymptomClass> {
        let entry = self.organs.get(organ_id)?;
        if entry.healthy.iter().any(|s| s == symptom) {
            Some(SymptomClass::Healthy)
        } else {
            Some(SymptomClass::Unhealthy)
        }
    }

    /// Classify a symptom picked without an organ: healthy when any organ
    /// lists it as healthy.
    pub fn classify_any(&self, symptom: &str) -> Option<SymptomClass> {
        if self.organs.is_empty() {
            return None;
        }
        let healthy = self
            .organs
            .values()
            .any(|entry| entry.healthy.iter().any(|s| s == symptom));
        Some(if healthy {
            SymptomClass::Healthy
        } else {
            SymptomClass::Unhealthy
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Disease {
    pub id: String,
    pub name: String,
    /// Canonical symptoms, unordered.
    pub symptoms: Vec<String>,
    pub treatment: String,
    pub dosage: String,
}

/// Fixed string tables consulted by the scorer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchingTables {
    /// Disease ids that typically present across several organs.
    pub multi_organ_diseases: Vec<String>,
    /// Anatomical keywords that make two symptom tokens match when both contain one.
    pub anatomical_keywords: Vec<String>,
}

impl Default for MatchingTables {
    fn default() -> Self {
        Self {
            multi_organ_diseases: [
                "bacterial_septicemia",
                "systemic_infection",
                "mixed_infection",
                "tilv",
                "iridovirus",
                "streptococcus",
                "edwardsiella",
            ]
            .into_iter()
            .map(String::from)
            .collect(),
            anatomical_keywords: [
                "gill",
                "eye",
                "skin",
                "liver",
                "intestine",
                "spleen",
                "kidney",
                "brain",
                "muscle",
            ]
            .into_iter()
            .map(String::from)
            .collect(),
        }
    }
}

impl MatchingTables {
    pub fn is_multi_organ(&self, disease_id: &str) -> bool {
        self.multi_organ_diseases.iter().any(|id| id == disease_id)
    }
}

/// A configuration problem found in the catalog. Logged, never fatal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReferenceIssue {
    OrganWithoutCatalog(String),
    DiseaseWithoutSymptoms(String),
    DuplicateDiseaseId(String),
}

/// Immutable reference snapshot consumed by the engine.
#[derive(Debug, Clone)]
pub struct ReferenceData {
    pub organs: Vec<Organ>,
    pub catalog: SymptomCatalog,
    pub diseases: Vec<Disease>,
    pub tables: MatchingTables,
}

impl ReferenceData {
    pub fn from_parts(
        organs: Vec<Organ>,
        catalog: SymptomCatalog,
        diseases: Vec<Disease>,
        tables: MatchingTables,
    ) -> Self {
        Self {
            organs,
            catalog,
            diseases,
            tables,
        }
    }

    /// Load reference data from JSON files in `dir`.
    ///
    /// `matching_tables.json` is optional; the built-in tables are used when absent.
    pub fn load(dir: &Path) -> Result<Self, ReferenceError> {
        let organs = read_json(dir, ORGANS_FILE)?;
        let catalog = read_json(dir, CATALOG_FILE)?;
        let diseases = read_json(dir, DISEASES_FILE)?;
        let tables = if dir.join(TABLES_FILE).exists() {
            read_json(dir, TABLES_FILE)?
        } else {
            MatchingTables::default()
        };

        let data = Self::from_parts(organs, catalog, diseases, tables);
        data.log_issues();
        tracing::info!(
            dir = %dir.display(),
            organs = data.organs.len(),
            diseases = data.diseases.len(),
            "Reference data loaded"
        );
        Ok(data)
    }

    /// Reference data compiled into the binary.
    pub fn bundled() -> Result<Self, ReferenceError> {
        let organs = parse_json(
            ORGANS_FILE,
            include_str!("../../resources/reference/organs.json"),
        )?;
        let catalog = parse_json(
            CATALOG_FILE,
            include_str!("../../resources/reference/symptom_catalog.json"),
        )?;
        let diseases = parse_json(
            DISEASES_FILE,
            include_str!("../../resources/reference/diseases.json"),
        )?;
        let tables = parse_json(
            TABLES_FILE,
            include_str!("../../resources/reference/matching_tables.json"),
        )?;

        let data = Self::from_parts(organs, catalog, diseases, tables);
        data.log_issues();
        Ok(data)
    }

    /// Small reference set for tests (no file I/O).
    #[cfg(test)]
    pub fn load_test() -> Self {
        fn strings(items: &[&str]) -> Vec<String> {
            items.iter().map(|s| s.to_string()).collect()
        }
        fn organ(id: &str, name: &str) -> Organ {
            Organ {
                id: id.into(),
                name: name.into(),
                icon: String::new(),
            }
        }
        fn disease(id: &str, name: &str, symptoms: &[&str], treatment: &str, dosage: &str) -> Disease {
            Disease {
                id: id.into(),
                name: name.into(),
                symptoms: strings(symptoms),
                treatment: treatment.into(),
                dosage: dosage.into(),
            }
        }

        let mut catalog = SymptomCatalog::default();
        catalog.organs.insert(
            "skin".into(),
            OrganSymptoms {
                healthy: strings(&["Smooth, shiny, intact scales", "Normal color", "No wounds"]),
                unhealthy: strings(&["Ulcers/wounds", "Hemorrhages", "Scale loss", "White spots", "Injury"]),
            },
        );
        catalog.organs.insert(
            "eye".into(),
            OrganSymptoms {
                healthy: strings(&["Clear, bright"]),
                unhealthy: strings(&["Cloudy", "Pop-eye", "Blood around eyes"]),
            },
        );
        catalog.organs.insert(
            "gill".into(),
            OrganSymptoms {
                healthy: strings(&["Bright red", "Normal color"]),
                unhealthy: strings(&["Gasping", "Heavy mucus", "Torn gills", "Pale/white (anemia)"]),
            },
        );
        catalog.organs.insert(
            "liver".into(),
            OrganSymptoms {
                healthy: strings(&["Reddish-brown"]),
                unhealthy: strings(&["Pale", "Enlarged"]),
            },
        );

        Self::from_parts(
            vec![
                organ("skin", "Skin"),
                organ("eye", "Eye"),
                organ("gill", "Gill"),
                organ("liver", "Liver"),
                organ("spleen", "Spleen"),
            ],
            catalog,
            vec![
                disease(
                    "bacterial_ulcer",
                    "Bacterial Ulcer",
                    &["Ulcers with red edges", "Scale loss"],
                    "Oxytetracycline, KMnO4",
                    "OTC 50-75 mg/kg/day for 5-7 days",
                ),
                disease(
                    "dactylogyrus",
                    "Gill Flukes",
                    &["Torn gills", "Thread-like worms", "Gasping"],
                    "Praziquantel, Salt",
                    "Praziquantel 2-5 mg/L bath",
                ),
                disease(
                    "costia",
                    "Costia",
                    &["Blue-gray patches", "Heavy mucus", "Costia sign"],
                    "Salt, KMnO4",
                    "Salt dip 3-5% for 5-10 minutes",
                ),
                disease(
                    "bacterial_septicemia",
                    "Bacterial Septicemia",
                    &["Hemorrhages", "Pop-eye", "Pale gills", "Enlarged"],
                    "Florfenicol, Probiotics",
                    "Florfenicol 10-15 mg/kg/day for 5 days",
                ),
                disease(
                    "ich",
                    "Ich",
                    &["White spots like salt grains on skin/fins"],
                    "Formalin, Salt",
                    "Formalin 25 ppm for 1 hour",
                ),
                disease(
                    HEALTHY_DISEASE_ID,
                    "Healthy Condition",
                    &[],
                    "No treatment needed",
                    "Maintain good feeding and care",
                ),
            ],
            MatchingTables::default(),
        )
    }

    pub fn organ(&self, id: &str) -> Option<&Organ> {
        self.organs.iter().find(|o| o.id == id)
    }

    /// Display name for an organ, falling back to its id.
    pub fn organ_name<'a>(&'a self, id: &'a str) -> &'a str {
        self.organ(id).map(|o| o.name.as_str()).unwrap_or(id)
    }

    pub fn disease(&self, id: &str) -> Option<&Disease> {
        self.diseases.iter().find(|d| d.id == id)
    }

    /// Diseases eligible for scoring, in catalog order.
    pub fn candidate_diseases(&self) -> impl Iterator<Item = &Disease> {
        self.diseases.iter().filter(|d| d.id != HEALTHY_DISEASE_ID)
    }

    /// Classify a selected symptom. `None` means no classification is available.
    pub fn classify(&self, organ_id: Option<&str>, symptom: &str) -> Option<SymptomClass> {
        match organ_id {
            Some(id) => self.catalog.classify(id, symptom),
            None => self.catalog.classify_any(symptom),
        }
    }

    /// Configuration problems in the catalog.
    pub fn validate(&self) -> Vec<ReferenceIssue> {
        let mut issues = Vec::new();

        for organ in &self.organs {
            if !self.catalog.organs.contains_key(&organ.id) {
                issues.push(ReferenceIssue::OrganWithoutCatalog(organ.id.clone()));
            }
        }

        let mut seen: Vec<&str> = Vec::new();
        for disease in &self.diseases {
            if seen.contains(&disease.id.as_str()) {
                issues.push(ReferenceIssue::DuplicateDiseaseId(disease.id.clone()));
            }
            seen.push(&disease.id);

            if disease.id != HEALTHY_DISEASE_ID
                && disease.symptoms.iter().all(|s| s.trim().is_empty())
            {
                issues.push(ReferenceIssue::DiseaseWithoutSymptoms(disease.id.clone()));
            }
        }

        issues
    }

    fn log_issues(&self) {
        for issue in self.validate() {
            match issue {
                ReferenceIssue::OrganWithoutCatalog(id) => {
                    tracing::warn!(organ_id = %id, "Organ has no symptom catalog entry")
                }
                ReferenceIssue::DiseaseWithoutSymptoms(id) => {
                    tracing::warn!(disease_id = %id, "Disease has no canonical symptoms, it can never match")
                }
                ReferenceIssue::DuplicateDiseaseId(id) => {
                    tracing::warn!(disease_id = %id, "Duplicate disease id in catalog")
                }
            }
        }
    }
}

fn read_json<T: DeserializeOwned>(dir: &Path, file: &str) -> Result<T, ReferenceError> {
    let path = dir.join(file);
    let json = std::fs::read_to_string(&path)
        .map_err(|e| ReferenceError::Load(path.display().to_string(), e.to_string()))?;
    parse_json(file, &json)
}

fn parse_json<T: DeserializeOwned>(file: &str, json: &str) -> Result<T, ReferenceError> {
    serde_json::from_str(json).map_err(|e| ReferenceError::Parse(file.into(), e.to_string()))
}
