use std::path::{Path, PathBuf};

/// Application-level constants
pub const APP_NAME: &str = "docvault";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Maximum accepted upload size (50 MiB), enforced at ingestion.
pub const MAX_UPLOAD_BYTES: u64 = 50 * 1024 * 1024;

/// Minimum number of significant (trimmed) characters an extraction must
/// produce before a document is persisted.
pub const MIN_EXTRACTED_CHARS: usize = 10;

/// Default and maximum page sizes for list/search endpoints.
pub const DEFAULT_PAGE_SIZE: u32 = 10;
pub const MAX_PAGE_SIZE: u32 = 50;

/// Language model handed to the OCR engine.
pub const DEFAULT_OCR_LANGUAGE: &str = "spa";

pub fn default_log_filter() -> String {
    format!("info,{APP_NAME}=debug")
}

/// Get the application data directory.
///
/// `DOCVAULT_DATA_DIR` overrides the default `~/.docvault`.
pub fn app_data_dir() -> PathBuf {
    if let Ok(dir) = std::env::var("DOCVAULT_DATA_DIR") {
        return PathBuf::from(dir);
    }
    let home = dirs::home_dir().expect("Cannot determine home directory");
    home.join(".docvault")
}

/// Path of the SQLite database inside a data directory.
pub fn database_path(data_dir: &Path) -> PathBuf {
    data_dir.join("docvault.db")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn database_path_under_data_dir() {
        let db = database_path(Path::new("/tmp/dv"));
        assert!(db.starts_with("/tmp/dv"));
        assert!(db.ends_with("docvault.db"));
    }

    #[test]
    fn app_version_matches_cargo() {
        assert_eq!(APP_VERSION, "0.1.0");
    }

    #[test]
    fn upload_limit_is_50_mib() {
        assert_eq!(MAX_UPLOAD_BYTES, 52_428_800);
    }
}
