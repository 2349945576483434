use std::ffi::OsString;
use std::path::PathBuf;

/// Application-level constants
pub const APP_NAME: &str = "Pondwatch";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Overrides the database location.
pub const DB_ENV_VAR: &str = "PONDWATCH_DB";
/// Points at a directory of reference JSON files to use instead of the bundled copy.
pub const REFERENCE_DIR_ENV_VAR: &str = "PONDWATCH_REFERENCE_DIR";

const DATABASE_FILE: &str = "pondwatch.db";

/// Log filter used when `RUST_LOG` is unset.
pub fn default_log_filter() -> &'static str {
    "pondwatch=info,pondwatch_lib=info"
}

/// Per-user data directory, falling back to the working directory.
pub fn app_data_dir() -> PathBuf {
    dirs::data_local_dir()
        .or_else(dirs::home_dir)
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_NAME)
}

/// Database file: `PONDWATCH_DB` when set, else inside the data directory.
pub fn database_path() -> PathBuf {
    database_path_from(std::env::var_os(DB_ENV_VAR))
}

/// Reference data directory from `PONDWATCH_REFERENCE_DIR`. `None` means bundled data.
pub fn reference_dir() -> Option<PathBuf> {
    non_empty_path(std::env::var_os(REFERENCE_DIR_ENV_VAR))
}

fn database_path_from(env_value: Option<OsString>) -> PathBuf {
    non_empty_path(env_value).unwrap_or_else(|| app_data_dir().join(DATABASE_FILE))
}

fn non_empty_path(value: Option<OsString>) -> Option<PathBuf> {
    value.filter(|v| !v.is_empty()).map(PathBuf::from)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn app_data_dir_ends_with_app_name() {
        assert!(app_data_dir().ends_with(APP_NAME));
    }

    #[test]
    fn database_defaults_to_data_dir() {
        let path = database_path_from(None);
        assert!(path.starts_with(app_data_dir()));
        assert!(path.ends_with(DATABASE_FILE));
    }

    #[test]
    fn database_env_override_wins() {
        let path = database_path_from(Some(OsString::from("/tmp/farm.db")));
        assert_eq!(path, PathBuf::from("/tmp/farm.db"));
    }

    #[test]
    fn empty_env_value_is_ignored() {
        assert!(non_empty_path(Some(OsString::new())).is_none());
    }

    #[test]
    fn default_filter_covers_library() {
        assert!(default_log_filter().contains("pondwatch_lib=info"));
    }

    #[test]
    fn app_name_is_pondwatch() {
        assert_eq!(APP_NAME, "Pondwatch");
    }
}
