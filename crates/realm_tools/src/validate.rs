//! Balance file validation.

use std::path::{Path, PathBuf};

use thiserror::Error;

use realm_core::config::BalanceConfig;
use realm_core::error::GameError;

/// Why a validation run failed.
#[derive(Debug, Error)]
pub enum ValidateError {
    /// Nothing at the given path.
    #[error("Path not found: {0}")]
    NotFound(String),
    /// A directory could not be listed.
    #[error("Failed to read directory: {0}")]
    Io(#[from] std::io::Error),
    /// The directory has no `.ron` files.
    #[error("No .ron files in {0}")]
    Empty(String),
    /// One or more files were rejected.
    #[error("{} of {checked} balance files failed validation", failures.len())]
    Failed {
        /// Files examined.
        checked: usize,
        /// Each rejected file and why.
        failures: Vec<(PathBuf, GameError)>,
    },
}

/// Parse and check one balance file.
///
/// # Errors
///
/// Returns the parse or validation error from [`BalanceConfig::load`].
pub fn validate_file(path: &Path) -> Result<BalanceConfig, GameError> {
    let config = BalanceConfig::load(path)?;
    tracing::debug!(path = %path.display(), radius = config.island_radius, "Balance file ok");
    Ok(config)
}

/// Validate a balance file, or every `.ron` file directly inside a directory.
///
/// Returns the number of files checked.
///
/// # Errors
///
/// Returns [`ValidateError::Failed`] listing every rejected file.
pub fn validate_path(path: &Path) -> Result<usize, ValidateError> {
    if !path.exists() {
        return Err(ValidateError::NotFound(path.display().to_string()));
    }

    let files = if path.is_dir() {
        let mut files: Vec<PathBuf> = std::fs::read_dir(path)?
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|p| p.extension().is_some_and(|ext| ext == "ron"))
            .collect();
        files.sort();
        if files.is_empty() {
            return Err(ValidateError::Empty(path.display().to_string()));
        }
        files
    } else {
        vec![path.to_path_buf()]
    };

    let mut failures = Vec::new();
    for file in &files {
        if let Err(e) = validate_file(file) {
            tracing::warn!(path = %file.display(), error = %e, "Invalid balance file");
            failures.push((file.clone(), e));
        }
    }

    if failures.is_empty() {
        Ok(files.len())
    } else {
        Err(ValidateError::Failed {
            checked: files.len(),
            failures,
        })
    }
}

/// The built-in balance table as pretty RON.
///
/// # Errors
///
/// Returns [`GameError::InvalidState`] if serialization fails.
pub fn default_balance_ron() -> Result<String, GameError> {
    BalanceConfig::default().to_ron_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_validate() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("balance.ron");
        std::fs::write(&path, default_balance_ron().unwrap()).unwrap();
        assert_eq!(validate_path(&path).unwrap(), 1);
        assert_eq!(validate_file(&path).unwrap(), BalanceConfig::default());
    }

    #[test]
    fn test_shipped_balance_matches_defaults() {
        let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("../../assets/balance.ron");
        assert_eq!(validate_file(&path).unwrap(), BalanceConfig::default());
    }

    #[test]
    fn test_partial_file_validates() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("small.ron");
        std::fs::write(&path, "(island_radius: 3)").unwrap();
        assert_eq!(validate_file(&path).unwrap().island_radius, 3);
    }

    #[test]
    fn test_directory_reports_every_failure() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("a.ron"), "(combat_speed: 0.0)").unwrap();
        std::fs::write(dir.path().join("b.ron"), "(island_radius: 4)").unwrap();
        std::fs::write(dir.path().join("c.ron"), "not ron at all").unwrap();
        std::fs::write(dir.path().join("notes.txt"), "ignored").unwrap();

        match validate_path(dir.path()) {
            Err(ValidateError::Failed { checked, failures }) => {
                assert_eq!(checked, 3);
                assert_eq!(failures.len(), 2);
                assert!(matches!(failures[0].1, GameError::InvalidConfig(_)));
                assert!(matches!(failures[1].1, GameError::ConfigParse(_)));
            }
            other => panic!("expected failures, got {other:?}"),
        }
    }

    #[test]
    fn test_missing_and_empty() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            validate_path(&dir.path().join("nope.ron")),
            Err(ValidateError::NotFound(_))
        ));
        assert!(matches!(
            validate_path(dir.path()),
            Err(ValidateError::Empty(_))
        ));
    }
}
