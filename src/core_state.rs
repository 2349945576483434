//! Shared application state for command handlers.
//!
//! Holds the diagnostic engine (with its immutable reference data) and the
//! database location. Each command opens its own connection.

use std::path::{Path, PathBuf};

use crate::config;
use crate::db;
use crate::matching::{DefaultDiagnosticEngine, ReferenceData, ReferenceError};

pub struct CoreState {
    engine: DefaultDiagnosticEngine,
    db_path: PathBuf,
}

impl CoreState {
    pub fn new(reference: ReferenceData, db_path: PathBuf) -> Self {
        Self {
            engine: DefaultDiagnosticEngine::new(reference),
            db_path,
        }
    }

    /// Resolve reference data and database location.
    ///
    /// Explicit arguments win over environment overrides, which win over
    /// the bundled catalog and the per-user data directory.
    pub fn load(db_path: Option<PathBuf>, reference_dir: Option<PathBuf>) -> Result<Self, CoreError> {
        let reference = match reference_dir.or_else(config::reference_dir) {
            Some(dir) => ReferenceData::load(&dir)?,
            None => ReferenceData::bundled()?,
        };
        let db_path = db_path.unwrap_or_else(config::database_path);
        Ok(Self::new(reference, db_path))
    }

    pub fn engine(&self) -> &DefaultDiagnosticEngine {
        &self.engine
    }

    pub fn reference(&self) -> &ReferenceData {
        self.engine.reference()
    }

    pub fn db_path(&self) -> &Path {
        &self.db_path
    }

    /// Open a connection to the record store, creating its directory on first use.
    pub fn open_db(&self) -> Result<rusqlite::Connection, CoreError> {
        if let Some(parent) = self.db_path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .map_err(|e| CoreError::DataDir(format!("{}: {e}", parent.display())))?;
        }
        db::open_database(&self.db_path).map_err(CoreError::Database)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Database error: {0}")]
    Database(#[from] db::DatabaseError),
    #[error("Reference data error: {0}")]
    Reference(#[from] ReferenceError),
    #[error("Cannot create data directory {0}")]
    DataDir(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn open_db_creates_missing_directory() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("farm.db");
        let state = CoreState::new(ReferenceData::load_test(), path.clone());

        let conn = state.open_db().unwrap();
        assert_eq!(db::count_tables(&conn).unwrap(), 3);
        assert_eq!(state.db_path(), path.as_path());
        assert!(path.exists());
    }

    #[test]
    fn load_uses_bundled_reference_without_directory() {
        let dir = tempfile::tempdir().unwrap();
        let state = CoreState::load(Some(dir.path().join("farm.db")), None);
        // PONDWATCH_REFERENCE_DIR may be set in the environment; only check success when it is not.
        if config::reference_dir().is_none() {
            assert_eq!(state.unwrap().reference().organs.len(), 10);
        }
    }

    #[test]
    fn load_reports_missing_reference_directory() {
        let dir = tempfile::tempdir().unwrap();
        let result = CoreState::load(Some(dir.path().join("farm.db")), Some(dir.path().join("absent")));
        assert!(matches!(result, Err(CoreError::Reference(_))));
    }
}
