/// Operator-facing wording for every diagnosis the engine can shape.
/// Plain language, treatment first; no internal scores.
pub struct MessageTemplates;

impl MessageTemplates {
    pub const NO_SELECTION_DISEASE: &'static str = "No symptoms selected";
    pub const NO_SELECTION_TREATMENT: &'static str = "Please select symptoms to continue";

    pub const HEALTHY_DISEASE: &'static str = "Healthy Condition";
    pub const HEALTHY_TREATMENT: &'static str = "No treatment needed. Maintain good feeding and care.";
    pub const HEALTHY_DOSAGE: &'static str = "Regular water changes and quality feed.";

    pub const UNKNOWN_DISEASE: &'static str = "Unknown Disease/Condition";
    pub const UNKNOWN_TREATMENT: &'static str = "Consult a veterinarian. Monitor symptoms more closely.";
    pub const UNKNOWN_DOSAGE: &'static str = "Check water quality and monitor fish behavior.";

    /// Low-confidence headline listing the leading candidates.
    pub fn possible_diseases(names: &[&str]) -> String {
        format!("Possible Diseases: {}", names.join(", "))
    }

    pub fn primary_treatment(treatment: &str) -> String {
        format!("Primary Treatment: {}", treatment)
    }

    pub fn dosage_with_alternatives(dosage: &str, others: &[&str]) -> String {
        format!("Dosage: {}. Other possibilities: {}", dosage, others.join(", "))
    }

    /// Suffix appended to the disease name when several organs are affected.
    pub fn organ_info(organ_names: &[&str]) -> String {
        format!(
            " ({} organs with symptoms: {})",
            organ_names.len(),
            organ_names.join(", ")
        )
    }

    /// Dosage text followed by the symptoms that produced the match.
    pub fn dosage_with_matches(dosage: &str, lines: &[String]) -> String {
        format!("{}\n\nMatching Symptoms:\n{}", dosage, lines.join("\n"))
    }

    /// "Organ: s1, s2" line for organ-grouped selections.
    pub fn organ_match_line(organ_name: &str, symptoms: &[&str]) -> String {
        format!("{}: {}", organ_name, symptoms.join(", "))
    }

    /// "symptom (kind)" line for flat selections.
    pub fn symptom_match_line(symptom: &str, kind: &str) -> String {
        format!("{} ({})", symptom, kind)
    }
}
