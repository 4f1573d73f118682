use super::types::{Ledger, LEDGER_VERSION};
use anyhow::{Context, Result};
use atomic_write_file::AtomicWriteFile;
use std::fs::File;
use std::path::Path;

/// Load the ledger from a JSON file
///
/// If the file doesn't exist, returns a new empty ledger.
/// If the file exists but has an unsupported version, returns an error.
pub fn load_ledger(path: &Path) -> Result<Ledger> {
    if !path.exists() {
        return Ok(Ledger::new());
    }

    let file = File::open(path)
        .with_context(|| format!("Failed to open ledger file at {}", path.display()))?;

    let ledger: Ledger = serde_json::from_reader(file)
        .with_context(|| format!("Failed to load ledger from {}", path.display()))?;

    if ledger.version != LEDGER_VERSION {
        anyhow::bail!("Unsupported ledger version: {}", ledger.version);
    }

    Ok(ledger)
}

/// Save the ledger to a JSON file atomically
///
/// The file is never left half-written. Creates the parent directory if needed.
pub fn save_ledger(path: &Path, ledger: &Ledger) -> Result<()> {
    crate::config::ensure_parent_dir(path)?;

    let mut file = AtomicWriteFile::open(path)
        .with_context(|| format!("Failed to open atomic write file at {}", path.display()))?;

    serde_json::to_writer_pretty(&mut file, ledger).context("Failed to serialize ledger")?;

    file.commit().context("Failed to save ledger")?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::Streak;
    use crate::prediction::Race;
    use chrono::{Duration, Utc};
    use std::env;

    #[test]
    fn test_load_missing_file_returns_empty() {
        let temp_path = env::temp_dir().join("apex_predict_test_missing_ledger.json");
        let _ = std::fs::remove_file(&temp_path);

        let ledger = load_ledger(&temp_path).unwrap();
        assert_eq!(ledger.version, 1);
        assert!(ledger.predictions.is_empty());
    }

    #[test]
    fn test_save_and_load_roundtrip() {
        let temp_path = env::temp_dir().join("apex_predict_test_ledger_roundtrip.json");
        let _ = std::fs::remove_file(&temp_path);

        let mut ledger = Ledger::new();
        let quali = Utc::now() + Duration::days(2);
        ledger.races.insert(
            3,
            Race {
                id: 3,
                name: "Japanese Grand Prix".to_string(),
                quali_time: quali,
                race_time: quali + Duration::days(1),
            },
        );
        ledger.streaks.insert("u1".to_string(), Streak { current: 4, best: 6 });

        save_ledger(&temp_path, &ledger).unwrap();
        let loaded = load_ledger(&temp_path).unwrap();

        assert_eq!(loaded, ledger);
        assert_eq!(loaded.current_streak("u1"), 4);

        let _ = std::fs::remove_file(&temp_path);
    }

    #[test]
    fn test_unsupported_version_rejected() {
        let temp_path = env::temp_dir().join("apex_predict_test_ledger_version.json");
        std::fs::write(&temp_path, r#"{"version": 7}"#).unwrap();

        let err = load_ledger(&temp_path).unwrap_err();
        assert!(err.to_string().contains("Unsupported ledger version"));

        let _ = std::fs::remove_file(&temp_path);
    }
}
