//! CLI - Command-line argument parsing and dispatch
//!
//! Defines the CLI structure using clap and prints command results.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use serde::Serialize;

use pondwatch_lib::commands::records::HistoryQuery;
use pondwatch_lib::commands::{advice, diagnose, records};
use pondwatch_lib::config;
use pondwatch_lib::core_state::CoreState;
use pondwatch_lib::matching::DiagnosticReport;
use pondwatch_lib::models::{DiagnosisEdit, Observation, Selection};

/// Pondwatch CLI
#[derive(Parser)]
#[command(name = "pondwatch")]
#[command(about = "Pondwatch - fish disease diagnosis and treatment records", long_about = None)]
#[command(version = config::APP_VERSION)]
pub struct Cli {
    /// Database file (overrides $PONDWATCH_DB and the default data directory)
    #[arg(long, global = true)]
    pub db: Option<PathBuf>,

    /// Reference data directory (overrides $PONDWATCH_REFERENCE_DIR and the bundled catalog)
    #[arg(long, global = true)]
    pub reference: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand)]
pub enum Commands {
    /// List organs and their selectable symptoms
    Organs {
        /// Output JSON only
        #[arg(long)]
        json: bool,
    },

    /// Diagnose a set of observed symptoms
    Diagnose {
        #[command(flatten)]
        input: SelectionArgs,

        /// Print the full report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Manage ponds
    Pond {
        #[command(subcommand)]
        action: PondCommands,
    },

    /// Diagnose and save the result for a pond
    Save {
        /// Pond ID
        #[arg(long)]
        pond: String,

        #[command(flatten)]
        input: SelectionArgs,

        /// Replace the diagnosed disease label
        #[arg(long)]
        disease: Option<String>,

        /// Replace the confidence (0-100)
        #[arg(long)]
        confidence: Option<u8>,

        /// Replace the recommended treatment
        #[arg(long)]
        treatment: Option<String>,

        /// Replace the dosage and application text
        #[arg(long)]
        dosage: Option<String>,

        /// Free-text notes
        #[arg(long, default_value = "")]
        notes: String,
    },

    /// List saved diagnostics, newest first
    History {
        /// Only this pond
        #[arg(long)]
        pond: Option<String>,

        /// From date (YYYY-MM-DD, inclusive)
        #[arg(long)]
        from: Option<String>,

        /// To date (YYYY-MM-DD, inclusive)
        #[arg(long)]
        to: Option<String>,

        /// applied, pending or all
        #[arg(long)]
        status: Option<String>,

        /// Search disease, pond, treatment and dosage
        #[arg(long)]
        search: Option<String>,

        /// Output JSON only
        #[arg(long)]
        json: bool,
    },

    /// Mark a saved diagnostic's treatment as applied
    Apply {
        /// Diagnostic ID
        id: String,
    },

    /// Feeding advice from a pond's recent diagnostics
    Advice {
        /// Pond ID
        #[arg(long)]
        pond: String,

        /// Look-back window in days (default 30)
        #[arg(long)]
        days: Option<i64>,

        /// Output JSON only
        #[arg(long)]
        json: bool,
    },
}

/// Pond subcommands
#[derive(Subcommand)]
pub enum PondCommands {
    /// Register a pond
    Add {
        #[arg(long)]
        name: String,

        /// Area in decimal units
        #[arg(long)]
        area: f64,

        #[arg(long)]
        location: Option<String>,
    },

    /// List ponds
    List {
        /// Output JSON only
        #[arg(long)]
        json: bool,
    },
}

/// Ways to describe what was observed.
#[derive(Args, Debug, Default)]
pub struct SelectionArgs {
    /// Organ-grouped symptom, repeatable (e.g. --observe "gill=Heavy mucus")
    #[arg(long = "observe", value_name = "ORGAN=SYMPTOM")]
    pub observe: Vec<String>,

    /// Symptom without an organ, repeatable (quick diagnosis)
    #[arg(long = "symptom", value_name = "TEXT")]
    pub symptom: Vec<String>,

    /// JSON file holding a selection: [{"organ_id": "...", "symptoms": [...]}]
    #[arg(long, conflicts_with_all = ["observe", "symptom"])]
    pub selection: Option<PathBuf>,
}

impl SelectionArgs {
    pub fn into_selection(self) -> Result<Selection, String> {
        if let Some(path) = self.selection {
            let json = std::fs::read_to_string(&path)
                .map_err(|e| format!("Cannot read {}: {e}", path.display()))?;
            return serde_json::from_str(&json)
                .map_err(|e| format!("Invalid selection file {}: {e}", path.display()));
        }

        let mut observations: Vec<Observation> = Vec::new();
        for entry in &self.observe {
            let (organ, symptom) = entry
                .split_once('=')
                .map(|(o, s)| (o.trim(), s.trim()))
                .filter(|(o, s)| !o.is_empty() && !s.is_empty())
                .ok_or_else(|| format!("Expected ORGAN=SYMPTOM, got: {entry}"))?;

            match observations
                .iter_mut()
                .find(|obs| obs.organ_id.as_deref() == Some(organ))
            {
                Some(obs) => obs.symptoms.push(symptom.to_string()),
                None => observations.push(Observation::for_organ(organ, [symptom])),
            }
        }
        if !self.symptom.is_empty() {
            observations.push(Observation::ungrouped(self.symptom));
        }

        Ok(Selection::new(observations))
    }
}

pub fn run(cli: Cli) -> Result<(), String> {
    let state = CoreState::load(cli.db, cli.reference).map_err(|e| e.to_string())?;

    match cli.command {
        Commands::Organs { json } => {
            let organs = diagnose::list_organs(&state);
            if json {
                return print_json(&organs);
            }
            for organ in organs {
                println!("{} ({})", organ.name, organ.id);
                println!("  healthy:   {}", organ.healthy.join("; "));
                println!("  unhealthy: {}", organ.unhealthy.join("; "));
            }
        }
        Commands::Diagnose { input, json } => {
            let selection = input.into_selection()?;
            let report = diagnose::run_diagnosis(&state, &selection)?;
            if json {
                return print_json(&report);
            }
            print_report(&report);
        }
        Commands::Pond { action } => match action {
            PondCommands::Add { name, area, location } => {
                let pond = records::add_pond(&state, name, area, location)?;
                println!("Added pond {} ({})", pond.name, pond.id);
            }
            PondCommands::List { json } => {
                let ponds = records::list_ponds(&state)?;
                if json {
                    return print_json(&ponds);
                }
                for pond in ponds {
                    println!(
                        "{}  {}  {} decimal  {}",
                        pond.id,
                        pond.name,
                        pond.area_decimal,
                        pond.location.unwrap_or_default()
                    );
                }
            }
        },
        Commands::Save {
            pond,
            input,
            disease,
            confidence,
            treatment,
            dosage,
            notes,
        } => {
            let selection = input.into_selection()?;
            let edit = DiagnosisEdit {
                disease,
                confidence,
                treatment,
                dosage,
            };
            let saved = diagnose::save_diagnosis(&state, pond, &selection, &edit, notes)?;
            println!(
                "Saved diagnostic {}: {} ({:.0}%) for {}",
                saved.id, saved.disease_name, saved.confidence_percentage, saved.pond_name
            );
        }
        Commands::History {
            pond,
            from,
            to,
            status,
            search,
            json,
        } => {
            let query = HistoryQuery {
                pond_id: pond,
                date_from: from,
                date_to: to,
                status,
                search,
            };
            let history = records::get_history(&state, &query)?;
            if json {
                return print_json(&history);
            }
            println!(
                "{} diagnostics ({} applied, {} pending, {} filters)",
                history.diagnostics.len(),
                history.counts.applied,
                history.counts.pending,
                history.active_filters
            );
            for d in history.diagnostics {
                println!(
                    "{}  {}  {}  {} ({:.0}%)  {}",
                    d.id,
                    d.created_at.format("%Y-%m-%d %H:%M"),
                    d.pond_name,
                    d.disease_name,
                    d.confidence_percentage,
                    d.status()
                );
            }
        }
        Commands::Apply { id } => {
            let outcome = records::apply_treatment(&state, id)?;
            if outcome.already_applied {
                println!("Treatment was already applied at {}", outcome.applied_at);
            } else {
                println!("Treatment applied at {}", outcome.applied_at);
            }
        }
        Commands::Advice { pond, days, json } => {
            let advice = advice::get_medical_advice(&state, pond, days)?;
            if json {
                return print_json(&advice);
            }
            println!(
                "{}: severity {}, feed at {:.0}% of normal ration",
                advice.pond.name,
                advice.analysis.severity.as_str(),
                advice.feed_multiplier * 100.0
            );
            if advice.analysis.has_warnings() {
                for warning in &advice.analysis.warnings {
                    println!("! {warning}");
                }
                println!();
            }
            println!("{}", advice.considerations);
        }
    }

    Ok(())
}

fn print_report(report: &DiagnosticReport<'_>) {
    let d = &report.diagnosis;
    println!("Diagnosis:  {}", d.disease);
    println!("Confidence: {}%", d.confidence);
    println!("Treatment:  {}", d.treatment);
    if !d.dosage.is_empty() {
        println!("Dosage:     {}", d.dosage);
    }
    if report.candidates.len() > 1 {
        println!("\nCandidates:");
        for (rank, c) in report.candidates.iter().enumerate() {
            println!(
                "{:>3}. {}  {}%  (exact {}, partial {}, organs {})",
                rank + 1,
                c.disease.name,
                c.confidence,
                c.exact_matches,
                c.partial_matches,
                c.organ_matches
            );
        }
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<(), String> {
    let json = serde_json::to_string_pretty(value).map_err(|e| format!("Serialize failed: {e}"))?;
    println!("{json}");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_definition_is_valid() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn observe_entries_group_by_organ() {
        let args = SelectionArgs {
            observe: vec![
                "skin=Ulcers/wounds".into(),
                "eye = Pop-eye".into(),
                "skin=Scale loss".into(),
            ],
            ..SelectionArgs::default()
        };
        let selection = args.into_selection().unwrap();
        assert!(selection.is_organ_grouped());
        assert_eq!(selection.observations.len(), 2);
        assert_eq!(selection.observations[0].symptoms, vec!["Ulcers/wounds", "Scale loss"]);
        assert_eq!(selection.observations[1].organ_id.as_deref(), Some("eye"));
    }

    #[test]
    fn symptoms_make_a_flat_selection() {
        let args = SelectionArgs {
            symptom: vec!["Gasping".into(), "Lethargy".into()],
            ..SelectionArgs::default()
        };
        let selection = args.into_selection().unwrap();
        assert!(!selection.is_organ_grouped());
        assert_eq!(selection.total_symptoms(), 2);
    }

    #[test]
    fn malformed_observe_is_rejected() {
        let args = SelectionArgs {
            observe: vec!["Gasping".into()],
            ..SelectionArgs::default()
        };
        assert_eq!(args.into_selection().unwrap_err(), "Expected ORGAN=SYMPTOM, got: Gasping");
    }

    #[test]
    fn selection_file_is_parsed() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("selection.json");
        std::fs::write(&path, r#"[{"organ_id":"gill","symptoms":["Gasping","Heavy mucus"]}]"#).unwrap();

        let args = SelectionArgs {
            selection: Some(path),
            ..SelectionArgs::default()
        };
        let selection = args.into_selection().unwrap();
        assert_eq!(selection.total_symptoms(), 2);
        assert!(selection.is_organ_grouped());
    }

    #[test]
    fn parses_save_with_overrides() {
        let cli = Cli::try_parse_from([
            "pondwatch",
            "--db",
            "/tmp/farm.db",
            "save",
            "--pond",
            "abc",
            "--observe",
            "gill=Gasping",
            "--confidence",
            "70",
        ])
        .unwrap();
        assert_eq!(cli.db, Some(PathBuf::from("/tmp/farm.db")));
        match cli.command {
            Commands::Save { pond, confidence, input, .. } => {
                assert_eq!(pond, "abc");
                assert_eq!(confidence, Some(70));
                assert_eq!(input.observe, vec!["gill=Gasping"]);
            }
            _ => panic!("expected save"),
        }
    }

    #[test]
    fn selection_file_conflicts_with_flags() {
        let result = Cli::try_parse_from([
            "pondwatch",
            "diagnose",
            "--selection",
            "s.json",
            "--symptom",
            "Gasping",
        ]);
        assert!(result.is_err());
    }
}
