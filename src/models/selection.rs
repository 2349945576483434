use serde::{Deserialize, Serialize};

/// Symptoms the operator selected for one organ.
///
/// `organ_id` is absent in the quick-diagnosis flow, where symptoms are
/// picked from a flat list without organ grouping.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Observation {
    #[serde(default)]
    pub organ_id: Option<String>,
    pub symptoms: Vec<String>,
}

impl Observation {
    pub fn for_organ<I, S>(organ_id: impl Into<String>, symptoms: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            organ_id: Some(organ_id.into()),
            symptoms: symptoms.into_iter().map(Into::into).collect(),
        }
    }

    pub fn ungrouped<I, S>(symptoms: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            organ_id: None,
            symptoms: symptoms.into_iter().map(Into::into).collect(),
        }
    }
}

/// All observations of one diagnostic session. Immutable input to the engine.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Selection {
    pub observations: Vec<Observation>,
}

impl Selection {
    pub fn new(observations: Vec<Observation>) -> Self {
        Self { observations }
    }

    /// Quick-diagnosis selection: symptoms with no organ dimension.
    pub fn flat<I, S>(symptoms: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            observations: vec![Observation::ungrouped(symptoms)],
        }
    }

    /// Count of every selected symptom string across observations, duplicates included.
    pub fn total_symptoms(&self) -> usize {
        self.observations.iter().map(|o| o.symptoms.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.total_symptoms() == 0
    }

    /// True when every observation names its organ.
    pub fn is_organ_grouped(&self) -> bool {
        !self.observations.is_empty() && self.observations.iter().all(|o| o.organ_id.is_some())
    }

    /// All selected symptom strings, in observation order.
    pub fn symptoms(&self) -> impl Iterator<Item = &str> {
        self.observations
            .iter()
            .flat_map(|o| o.symptoms.iter().map(String::as_str))
    }

    /// Distinct organ ids that carry at least one symptom, first-seen order.
    pub fn organs_with_symptoms(&self) -> Vec<&str> {
        let mut organs: Vec<&str> = Vec::new();
        for obs in &self.observations {
            if obs.symptoms.is_empty() {
                continue;
            }
            if let Some(id) = obs.organ_id.as_deref() {
                if !organs.contains(&id) {
                    organs.push(id);
                }
            }
        }
        organs
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_selection_has_no_symptoms() {
        let selection = Selection::default();
        assert!(selection.is_empty());
        assert!(!selection.is_organ_grouped());
    }

    #[test]
    fn organ_without_symptoms_is_still_empty() {
        let selection = Selection::new(vec![Observation::for_organ("skin", Vec::<String>::new())]);
        assert!(selection.is_empty());
        assert!(selection.organs_with_symptoms().is_empty());
    }

    #[test]
    fn total_counts_duplicates() {
        let selection = Selection::new(vec![
            Observation::for_organ("skin", ["Scale loss"]),
            Observation::for_organ("skin", ["Scale loss", "Injury"]),
        ]);
        assert_eq!(selection.total_symptoms(), 3);
        assert_eq!(selection.organs_with_symptoms(), vec!["skin"]);
    }

    #[test]
    fn flat_selection_is_not_grouped() {
        let selection = Selection::flat(["Gasping", "Lethargy"]);
        assert!(!selection.is_organ_grouped());
        assert_eq!(selection.symptoms().collect::<Vec<_>>(), vec!["Gasping", "Lethargy"]);
    }

    #[test]
    fn deserializes_from_observation_array() {
        let json = r#"[{"organ_id":"gill","symptoms":["Gasping"]},{"symptoms":["Lethargy"]}]"#;
        let selection: Selection = serde_json::from_str(json).unwrap();
        assert_eq!(selection.observations.len(), 2);
        assert_eq!(selection.observations[0].organ_id.as_deref(), Some("gill"));
        assert!(selection.observations[1].organ_id.is_none());
        assert!(!selection.is_organ_grouped());
    }
}
