pub mod advisory; // Feeding advice from recent diagnostics
pub mod commands;
pub mod config;
pub mod core_state;
pub mod db;
pub mod matching; // Symptom-to-disease matching engine
pub mod models;

use tracing_subscriber::EnvFilter;

/// Initialize tracing. Logs go to stderr so command output stays clean.
pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config::default_log_filter())),
        )
        .with_writer(std::io::stderr)
        .init();

    tracing::debug!("Pondwatch starting v{}", config::APP_VERSION);
}
